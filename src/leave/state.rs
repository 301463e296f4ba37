use std::fmt;

use serde::Serialize;
use strum::EnumIter;

use crate::leave::error::{LeaveError, TransitionBlock};
use crate::model::leave_request::{LeaveRequest, LeaveStatus};

/// Lifecycle actions a caller can attempt on a leave request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, EnumIter)]
#[serde(rename_all = "snake_case")]
pub enum LeaveAction {
    Approve,
    Reject,
    Cancel,
    BindSubstitute,
}

impl fmt::Display for LeaveAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = match self {
            LeaveAction::Approve => "approve",
            LeaveAction::Reject => "reject",
            LeaveAction::Cancel => "cancel",
            LeaveAction::BindSubstitute => "bind a substitute to",
        };
        f.write_str(verb)
    }
}

impl LeaveStatus {
    /// Transition table. `None` means the action has no edge from this status.
    /// Binding a substitute keeps the status as it is.
    pub fn next(self, action: LeaveAction) -> Option<LeaveStatus> {
        use LeaveAction::*;
        use LeaveStatus::*;

        match (self, action) {
            (Pending, Approve) => Some(Approved),
            (Pending, Reject) => Some(Rejected),
            (Approved, Cancel) => Some(Cancelled),
            (Pending, BindSubstitute) | (Approved, BindSubstitute) => Some(self),
            _ => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, LeaveStatus::Rejected | LeaveStatus::Cancelled)
    }
}

/// Resolves the target status for `action` or the error naming both sides.
pub fn guard(request: &LeaveRequest, action: LeaveAction) -> Result<LeaveStatus, LeaveError> {
    request
        .status
        .next(action)
        .ok_or(LeaveError::InvalidTransition {
            leave_id: request.id,
            current: request.status,
            attempted: action,
            reason: TransitionBlock::StatusMismatch,
        })
}
