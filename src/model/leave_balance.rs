use serde::{Deserialize, Serialize};

use crate::leave::units::LeaveUnits;
use crate::model::leave_request::LeaveCategory;

/// Ledger row identity: one row per staff member, category and accounting period.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BalanceKey {
    pub staff_id: u64,
    pub category: LeaveCategory,
    pub period_id: String,
}

impl BalanceKey {
    pub fn new(staff_id: u64, category: LeaveCategory, period_id: impl Into<String>) -> Self {
        Self {
            staff_id,
            category,
            period_id: period_id.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveBalanceEntry {
    pub key: BalanceKey,
    pub allocated: LeaveUnits,
    pub carried_forward: LeaveUnits,
    pub consumed: LeaveUnits,
}
