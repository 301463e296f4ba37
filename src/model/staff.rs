use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum StaffStatus {
    Active,
    Inactive,
    Suspended,
}

/// Directory view of a staff member, as much as the coverage ranking needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaffProfile {
    pub id: u64,
    pub status: StaffStatus,
    pub department: String,
    pub specialization: Option<String>,
    /// Committed periods per week.
    pub current_load: u32,
    pub max_load: u32,
    pub subjects: Vec<String>,
}

impl StaffProfile {
    pub fn is_active(&self) -> bool {
        self.status == StaffStatus::Active
    }

    pub fn has_headroom(&self) -> bool {
        self.current_load < self.max_load
    }

    /// Load as a percentage of capacity; `None` when capacity is zero.
    pub fn utilization_pct(&self) -> Option<f64> {
        if self.max_load == 0 {
            return None;
        }
        Some(f64::from(self.current_load) * 100.0 / f64::from(self.max_load))
    }
}
