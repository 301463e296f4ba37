use chrono::{NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};
use utoipa::ToSchema;

/// Class of obligation a commitment source reports.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    ToSchema,
    Display,
    EnumString,
    AsRefStr,
    EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum CommitmentKind {
    /// Weekly recurring teaching period.
    Timetable,
    /// One-off proctoring or invigilation duty.
    Duty,
    /// Calendar event.
    Event,
}

/// A single scheduled obligation as returned by a commitment source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitmentItem {
    /// Stable reference in the owning system, e.g. `timetable:42`.
    pub reference: String,
    pub label: String,
    /// Set for dated commitments (duties, events).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    /// Set for recurring commitments.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weekday: Option<Weekday>,
}

impl CommitmentItem {
    pub fn recurring(reference: impl Into<String>, label: impl Into<String>, weekday: Weekday) -> Self {
        Self {
            reference: reference.into(),
            label: label.into(),
            date: None,
            weekday: Some(weekday),
        }
    }

    pub fn dated(reference: impl Into<String>, label: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            reference: reference.into(),
            label: label.into(),
            date: Some(date),
            weekday: None,
        }
    }
}
