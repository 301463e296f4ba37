use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A ranked substitute suggestion. Computed per review, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct CoverageCandidate {
    #[schema(example = 1042)]
    pub staff_id: u64,
    #[schema(example = 110)]
    pub score: u32,
    #[schema(example = json!(["Same department", "Good workload capacity"]))]
    pub reasons: Vec<String>,
}

/// Substitute bound to a leave request. One per request; rebinding replaces it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverageAssignment {
    pub leave_request_id: u64,
    pub substitute_id: u64,
    pub assigned_by: u64,
    pub assigned_at: DateTime<Utc>,
    pub notes: Option<String>,
    /// Cleared when the leave is cancelled; the row is kept.
    pub active: bool,
}
