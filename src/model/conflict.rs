use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display};
use utoipa::ToSchema;

use crate::model::commitment::{CommitmentItem, CommitmentKind};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema, Display, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Severity {
    Informational,
    Significant,
    Blocking,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FindingDetail {
    pub affected_count: usize,
    pub severity: Severity,
    pub summary: String,
    /// Bounded sample, not the full list of affected items.
    pub sample: Vec<CommitmentItem>,
}

/// One finding per commitment source that reported affected items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum ConflictFinding {
    Timetable(FindingDetail),
    Duty(FindingDetail),
    Event(FindingDetail),
}

impl ConflictFinding {
    pub fn new(kind: CommitmentKind, detail: FindingDetail) -> Self {
        match kind {
            CommitmentKind::Timetable => ConflictFinding::Timetable(detail),
            CommitmentKind::Duty => ConflictFinding::Duty(detail),
            CommitmentKind::Event => ConflictFinding::Event(detail),
        }
    }

    pub fn kind(&self) -> CommitmentKind {
        match self {
            ConflictFinding::Timetable(_) => CommitmentKind::Timetable,
            ConflictFinding::Duty(_) => CommitmentKind::Duty,
            ConflictFinding::Event(_) => CommitmentKind::Event,
        }
    }

    pub fn detail(&self) -> &FindingDetail {
        match self {
            ConflictFinding::Timetable(detail)
            | ConflictFinding::Duty(detail)
            | ConflictFinding::Event(detail) => detail,
        }
    }

    pub fn severity(&self) -> Severity {
        self.detail().severity
    }
}
