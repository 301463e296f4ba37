use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::leave::error::{LeaveError, Unavailability};
use crate::leave::sources::StaffDirectory;
use crate::leave::store::{LeaveStore, timed};
use crate::model::coverage::CoverageAssignment;
use crate::model::leave_request::LeaveRequest;

/// Validates a substitute against the target leave and builds the assignment.
pub struct CoverageBinder {
    store: Arc<dyn LeaveStore>,
    directory: Arc<dyn StaffDirectory>,
    store_timeout: Duration,
}

impl CoverageBinder {
    pub fn new(
        store: Arc<dyn LeaveStore>,
        directory: Arc<dyn StaffDirectory>,
        store_timeout: Duration,
    ) -> Self {
        Self {
            store,
            directory,
            store_timeout,
        }
    }

    /// Same exclusion rule as ranking, re-checked now because time may have
    /// passed since the candidate list was produced.
    pub async fn check_available(
        &self,
        request: &LeaveRequest,
        substitute_id: u64,
    ) -> Result<(), LeaveError> {
        if substitute_id == request.requester_id {
            return Err(LeaveError::Validation {
                field: "substitute_id",
                message: "a staff member cannot cover their own leave".to_string(),
            });
        }

        let profile = timed(
            "get_staff",
            self.store_timeout,
            self.directory.get_staff(substitute_id),
        )
        .await?
        .ok_or_else(|| LeaveError::not_found("staff", substitute_id))?;

        if !profile.is_active() {
            return Err(LeaveError::SubstituteUnavailable {
                substitute_id,
                reason: Unavailability::Inactive,
            });
        }

        let overlapping = timed(
            "approved_leave_overlapping",
            self.store_timeout,
            self.store
                .approved_leave_overlapping(request.span(), Some(substitute_id)),
        )
        .await?;

        if let Some(leave) = overlapping.first() {
            return Err(LeaveError::SubstituteUnavailable {
                substitute_id,
                reason: Unavailability::OnLeave {
                    leave_id: leave.leave_id,
                },
            });
        }

        Ok(())
    }

    pub fn assignment(
        request: &LeaveRequest,
        substitute_id: u64,
        assigned_by: u64,
        notes: Option<String>,
        at: DateTime<Utc>,
    ) -> CoverageAssignment {
        CoverageAssignment {
            leave_request_id: request.id,
            substitute_id,
            assigned_by,
            assigned_at: at,
            notes,
            active: true,
        }
    }
}
