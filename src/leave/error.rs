use std::fmt;

use chrono::NaiveDate;
use thiserror::Error;

use crate::leave::state::LeaveAction;
use crate::leave::store::StoreError;
use crate::leave::units::LeaveUnits;
use crate::model::leave_request::{LeaveCategory, LeaveStatus};

/// Why a lifecycle action was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionBlock {
    /// The current status has no edge for the attempted action.
    StatusMismatch,
    /// Cancellation after the leave has begun.
    AlreadyStarted { start_date: NaiveDate, today: NaiveDate },
}

impl fmt::Display for TransitionBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransitionBlock::StatusMismatch => write!(f, "status does not allow it"),
            TransitionBlock::AlreadyStarted { start_date, today } => {
                write!(f, "leave started on {start_date} and today is {today}")
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unavailability {
    /// Holds approved leave overlapping the target range.
    OnLeave { leave_id: u64 },
    Inactive,
}

impl fmt::Display for Unavailability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Unavailability::OnLeave { leave_id } => {
                write!(f, "on approved leave {leave_id} during the requested dates")
            }
            Unavailability::Inactive => write!(f, "not an active staff member"),
        }
    }
}

#[derive(Debug, Error)]
pub enum LeaveError {
    #[error("invalid {field}: {message}")]
    Validation { field: &'static str, message: String },

    #[error(
        "insufficient {category} balance for staff {staff_id} in period {period_id}: requested {requested}, available {available}"
    )]
    InsufficientBalance {
        staff_id: u64,
        category: LeaveCategory,
        period_id: String,
        requested: LeaveUnits,
        available: LeaveUnits,
    },

    #[error("cannot {attempted} leave request {leave_id} while it is {current}: {reason}")]
    InvalidTransition {
        leave_id: u64,
        current: LeaveStatus,
        attempted: LeaveAction,
        reason: TransitionBlock,
    },

    #[error("leave request {leave_id} has conflicts and needs a bound substitute before approval")]
    SubstituteRequired { leave_id: u64 },

    #[error("staff {substitute_id} cannot cover: {reason}")]
    SubstituteUnavailable {
        substitute_id: u64,
        reason: Unavailability,
    },

    #[error("{resource} {id} not found")]
    NotFound { resource: &'static str, id: String },

    #[error("{resource} {id} already exists")]
    Conflict { resource: &'static str, id: String },

    #[error("store operation {operation} timed out after {after_ms} ms")]
    StoreTimeout { operation: &'static str, after_ms: u64 },

    #[error("store failure: {0}")]
    Store(String),
}

impl LeaveError {
    /// Stable machine-readable code for API bodies.
    pub fn code(&self) -> &'static str {
        match self {
            LeaveError::Validation { .. } => "validation_error",
            LeaveError::InsufficientBalance { .. } => "insufficient_balance",
            LeaveError::InvalidTransition { .. } => "invalid_transition",
            LeaveError::SubstituteRequired { .. } => "substitute_required",
            LeaveError::SubstituteUnavailable { .. } => "substitute_unavailable",
            LeaveError::NotFound { .. } => "not_found",
            LeaveError::Conflict { .. } => "conflict",
            LeaveError::StoreTimeout { .. } => "store_timeout",
            LeaveError::Store(_) => "store_error",
        }
    }

    pub(crate) fn not_found(resource: &'static str, id: impl ToString) -> Self {
        LeaveError::NotFound {
            resource,
            id: id.to_string(),
        }
    }
}

/// Generic mapping. Status and ledger conflicts need the caller's context and
/// are translated at the commit site before reaching this.
impl From<StoreError> for LeaveError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { resource, id } => LeaveError::NotFound { resource, id },
            StoreError::Duplicate { resource, id } => LeaveError::Conflict { resource, id },
            StoreError::Timeout {
                operation,
                after_ms,
            } => LeaveError::StoreTimeout {
                operation,
                after_ms,
            },
            other => LeaveError::Store(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_transition_names_status_and_action() {
        let err = LeaveError::InvalidTransition {
            leave_id: 9,
            current: LeaveStatus::Rejected,
            attempted: LeaveAction::Approve,
            reason: TransitionBlock::StatusMismatch,
        };
        assert_eq!(
            err.to_string(),
            "cannot approve leave request 9 while it is rejected: status does not allow it"
        );
        assert_eq!(err.code(), "invalid_transition");
    }

    #[test]
    fn insufficient_balance_formats_units() {
        let err = LeaveError::InsufficientBalance {
            staff_id: 4,
            category: LeaveCategory::Casual,
            period_id: "2026".to_string(),
            requested: LeaveUnits::days(3),
            available: LeaveUnits::from_half_days(3),
        };
        assert_eq!(
            err.to_string(),
            "insufficient casual balance for staff 4 in period 2026: requested 3, available 1.5"
        );
    }
}
