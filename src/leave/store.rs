//! Persistence contract for the leave engine. Each call is one transaction;
//! `commit` is the only write path for lifecycle changes.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::leave::ledger::LedgerError;
use crate::leave::units::{DateSpan, LeaveUnits};
use crate::model::coverage::CoverageAssignment;
use crate::model::leave_balance::{BalanceKey, LeaveBalanceEntry};
use crate::model::leave_request::{
    ActionStamp, LeaveFilter, LeaveRequest, LeaveRequestDraft, LeaveStatus, Page,
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("{resource} {id} not found")]
    NotFound { resource: &'static str, id: String },
    #[error("{resource} {id} already exists")]
    Duplicate { resource: &'static str, id: String },
    /// The stored status no longer matches what the caller read.
    #[error("leave request {leave_id} is {current}")]
    StatusConflict { leave_id: u64, current: LeaveStatus },
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error("{operation} timed out after {after_ms} ms")]
    Timeout { operation: &'static str, after_ms: u64 },
    #[error("corrupt record: {0}")]
    Corrupt(String),
    #[error("backend failure: {0}")]
    Backend(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum LedgerChange {
    Debit { key: BalanceKey, units: LeaveUnits },
    Credit { key: BalanceKey, units: LeaveUnits },
}

#[derive(Debug, Clone, PartialEq)]
pub enum CoverageChange {
    /// Insert or replace the request's assignment.
    Bind(CoverageAssignment),
    /// Mark the current assignment inactive.
    Release,
}

/// One atomic lifecycle change: a status guard plus every side effect that
/// must land with it.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub request_id: u64,
    pub expected: LeaveStatus,
    pub next: LeaveStatus,
    pub review: Option<ActionStamp>,
    pub cancellation: Option<ActionStamp>,
    pub ledger: Option<LedgerChange>,
    pub coverage: Option<CoverageChange>,
    pub at: DateTime<Utc>,
}

impl Transition {
    pub fn new(request: &LeaveRequest, next: LeaveStatus, at: DateTime<Utc>) -> Self {
        Self {
            request_id: request.id,
            expected: request.status,
            next,
            review: None,
            cancellation: None,
            ledger: None,
            coverage: None,
            at,
        }
    }

    pub fn check(&self, current: &LeaveRequest) -> Result<(), StoreError> {
        if current.status != self.expected {
            return Err(StoreError::StatusConflict {
                leave_id: current.id,
                current: current.status,
            });
        }
        Ok(())
    }

    pub fn apply_to_request(&self, request: &mut LeaveRequest) {
        request.status = self.next;
        if let Some(review) = &self.review {
            request.review = Some(review.clone());
        }
        if let Some(cancellation) = &self.cancellation {
            request.cancellation = Some(cancellation.clone());
        }
        if let Some(CoverageChange::Bind(assignment)) = &self.coverage {
            request.substitute_id = Some(assignment.substitute_id);
            request.assignment = Some(ActionStamp {
                actor_id: assignment.assigned_by,
                at: assignment.assigned_at,
                notes: assignment.notes.clone(),
            });
        }
        request.updated_at = self.at;
    }
}

impl LedgerChange {
    pub fn key(&self) -> &BalanceKey {
        match self {
            LedgerChange::Debit { key, .. } | LedgerChange::Credit { key, .. } => key,
        }
    }

    /// Applies the change to the locked row. A debit against a missing row
    /// is an insufficient balance.
    pub fn apply(&self, entry: Option<&mut LeaveBalanceEntry>) -> Result<(), StoreError> {
        match (self, entry) {
            (LedgerChange::Debit { units, .. }, Some(entry)) => Ok(entry.debit(*units)?),
            (LedgerChange::Debit { units, .. }, None) => Err(LedgerError::InsufficientBalance {
                requested: *units,
                available: LeaveUnits::ZERO,
            }
            .into()),
            (LedgerChange::Credit { units, .. }, Some(entry)) => {
                entry.credit(*units);
                Ok(())
            }
            (LedgerChange::Credit { key, .. }, None) => Err(StoreError::NotFound {
                resource: "leave_balance",
                id: format!("{}/{}/{}", key.staff_id, key.category, key.period_id),
            }),
        }
    }
}

impl CoverageChange {
    pub fn apply(&self, existing: Option<CoverageAssignment>) -> Option<CoverageAssignment> {
        match self {
            CoverageChange::Bind(assignment) => Some(assignment.clone()),
            CoverageChange::Release => existing.map(|mut assignment| {
                assignment.active = false;
                assignment
            }),
        }
    }
}

/// An approved leave as seen by availability checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApprovedLeave {
    pub leave_id: u64,
    pub staff_id: u64,
}

#[async_trait]
pub trait LeaveStore: Send + Sync {
    async fn insert_request(&self, draft: LeaveRequestDraft) -> Result<LeaveRequest, StoreError>;

    async fn get_request(&self, id: u64) -> Result<Option<LeaveRequest>, StoreError>;

    /// Newest first.
    async fn list_requests(&self, filter: &LeaveFilter) -> Result<Page<LeaveRequest>, StoreError>;

    /// Re-reads the request under lock, checks `expected`, then applies the
    /// status change, ledger change and coverage change together or not at all.
    async fn commit(&self, transition: Transition) -> Result<LeaveRequest, StoreError>;

    /// Approved leave intersecting `span`, optionally for one staff member.
    async fn approved_leave_overlapping(
        &self,
        span: DateSpan,
        staff_id: Option<u64>,
    ) -> Result<Vec<ApprovedLeave>, StoreError>;

    async fn balance(&self, key: &BalanceKey) -> Result<Option<LeaveBalanceEntry>, StoreError>;

    async fn balances_for(
        &self,
        staff_id: u64,
        period_id: &str,
    ) -> Result<Vec<LeaveBalanceEntry>, StoreError>;

    /// Fails with `Duplicate` when the row already exists.
    async fn open_balance(&self, entry: LeaveBalanceEntry) -> Result<LeaveBalanceEntry, StoreError>;

    async fn assignment(
        &self,
        leave_request_id: u64,
    ) -> Result<Option<CoverageAssignment>, StoreError>;
}

/// Bounds a store call.
pub async fn timed<T, F>(operation: &'static str, limit: Duration, call: F) -> Result<T, StoreError>
where
    F: Future<Output = Result<T, StoreError>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => Err(StoreError::Timeout {
            operation,
            after_ms: u64::try_from(limit.as_millis()).unwrap_or(u64::MAX),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::leave_request::LeaveCategory;

    #[test]
    fn debit_on_missing_row_is_insufficient() {
        let change = LedgerChange::Debit {
            key: BalanceKey::new(3, LeaveCategory::Sick, "2026"),
            units: LeaveUnits::days(1),
        };
        assert!(matches!(
            change.apply(None),
            Err(StoreError::Ledger(LedgerError::InsufficientBalance { .. }))
        ));
    }

    #[test]
    fn release_keeps_the_row_inactive() {
        let assignment = CoverageAssignment {
            leave_request_id: 1,
            substitute_id: 2,
            assigned_by: 3,
            assigned_at: Utc::now(),
            notes: None,
            active: true,
        };
        let released = CoverageChange::Release
            .apply(Some(assignment.clone()))
            .expect("row kept");
        assert!(!released.active);
        assert_eq!(released.substitute_id, 2);
        assert_eq!(CoverageChange::Release.apply(None), None);
    }

    #[tokio::test]
    async fn timed_reports_operation_on_timeout() {
        let slow = async {
            tokio::time::sleep(Duration::from_millis(200)).await;
            Ok::<_, StoreError>(())
        };
        let err = timed("commit", Duration::from_millis(10), slow).await.unwrap_err();
        assert_eq!(
            err,
            StoreError::Timeout {
                operation: "commit",
                after_ms: 10
            }
        );
    }
}
