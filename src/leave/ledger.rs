//! Leave balance ledger: sufficiency checks plus debit and credit on a single
//! balance row. Stores call these inside their transaction so the check and the
//! write see the same row.

use thiserror::Error;

use crate::leave::units::LeaveUnits;
use crate::model::leave_balance::{BalanceKey, LeaveBalanceEntry};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("requested {requested}, available {available}")]
    InsufficientBalance {
        requested: LeaveUnits,
        available: LeaveUnits,
    },
}

impl LeaveBalanceEntry {
    pub fn open(key: BalanceKey, allocated: LeaveUnits, carried_forward: LeaveUnits) -> Self {
        Self {
            key,
            allocated,
            carried_forward,
            consumed: LeaveUnits::ZERO,
        }
    }

    /// Upper bound for `available`.
    pub fn entitlement(&self) -> LeaveUnits {
        self.allocated + self.carried_forward
    }

    pub fn available(&self) -> LeaveUnits {
        self.entitlement().saturating_sub(self.consumed)
    }

    pub fn is_sufficient(&self, requested: LeaveUnits) -> bool {
        self.available() >= requested
    }

    /// Re-checks availability against the row as it is now.
    pub fn debit(&mut self, requested: LeaveUnits) -> Result<(), LedgerError> {
        if !self.is_sufficient(requested) {
            return Err(LedgerError::InsufficientBalance {
                requested,
                available: self.available(),
            });
        }
        self.consumed = self.consumed + requested;
        Ok(())
    }

    /// Returns units from a cancelled approval. Available never exceeds the entitlement.
    pub fn credit(&mut self, units: LeaveUnits) {
        self.consumed = self.consumed.saturating_sub(units);
    }
}

/// A missing row counts as nothing available.
pub fn check_sufficient(
    entry: Option<&LeaveBalanceEntry>,
    requested: LeaveUnits,
) -> Result<(), LedgerError> {
    match entry {
        Some(entry) if entry.is_sufficient(requested) => Ok(()),
        Some(entry) => Err(LedgerError::InsufficientBalance {
            requested,
            available: entry.available(),
        }),
        None => Err(LedgerError::InsufficientBalance {
            requested,
            available: LeaveUnits::ZERO,
        }),
    }
}
