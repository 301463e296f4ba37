use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};
use utoipa::ToSchema;

use crate::leave::units::{DateSpan, LeaveUnits, LeaveWindow};
use crate::model::commitment::CommitmentKind;
use crate::model::conflict::ConflictFinding;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
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
pub enum LeaveCategory {
    Sick,
    Casual,
    Earned,
    ParentalMaternal,
    ParentalPaternal,
    Unpaid,
    Compensatory,
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    ToSchema,
    Display,
    EnumString,
    AsRefStr,
    EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LeaveStatus {
    Pending,
    Approved,
    Rejected,
    Cancelled,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum HalfDaySegment {
    Morning,
    Afternoon,
}

/// Who did something to a request, when, and why.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionStamp {
    pub actor_id: u64,
    pub at: DateTime<Utc>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaveRequest {
    pub id: u64,
    pub requester_id: u64,
    pub category: LeaveCategory,
    /// Accounting period the request is charged against.
    pub period_id: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub half_day: Option<HalfDaySegment>,
    pub reason: String,
    pub attachments: Vec<String>,
    pub status: LeaveStatus,
    /// Frozen at creation, never recomputed.
    pub conflicts: Vec<ConflictFinding>,
    /// Commitment sources that could not be read while the snapshot was taken.
    pub degraded_sources: Vec<CommitmentKind>,
    pub substitute_id: Option<u64>,
    pub review: Option<ActionStamp>,
    pub assignment: Option<ActionStamp>,
    pub cancellation: Option<ActionStamp>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LeaveRequest {
    pub fn window(&self) -> LeaveWindow {
        LeaveWindow::from_parts(
            DateSpan::from_parts(self.start_date, self.end_date),
            self.half_day,
        )
    }

    pub fn span(&self) -> DateSpan {
        DateSpan::from_parts(self.start_date, self.end_date)
    }

    pub fn total_units(&self) -> LeaveUnits {
        self.window().units()
    }

    pub fn has_conflicts(&self) -> bool {
        !self.conflicts.is_empty()
    }

    pub fn is_degraded(&self) -> bool {
        !self.degraded_sources.is_empty()
    }
}

/// Everything needed to persist a new request; the store assigns the id.
#[derive(Debug, Clone)]
pub struct LeaveRequestDraft {
    pub requester_id: u64,
    pub category: LeaveCategory,
    pub period_id: String,
    pub window: LeaveWindow,
    pub reason: String,
    pub attachments: Vec<String>,
    pub conflicts: Vec<ConflictFinding>,
    pub degraded_sources: Vec<CommitmentKind>,
    pub created_at: DateTime<Utc>,
}

impl LeaveRequestDraft {
    pub fn into_request(self, id: u64) -> LeaveRequest {
        let span = self.window.span();
        LeaveRequest {
            id,
            requester_id: self.requester_id,
            category: self.category,
            period_id: self.period_id,
            start_date: span.start(),
            end_date: span.end(),
            half_day: self.window.half_day(),
            reason: self.reason,
            attachments: self.attachments,
            status: LeaveStatus::Pending,
            conflicts: self.conflicts,
            degraded_sources: self.degraded_sources,
            substitute_id: None,
            review: None,
            assignment: None,
            cancellation: None,
            created_at: self.created_at,
            updated_at: self.created_at,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct LeaveFilter {
    pub requester_id: Option<u64>,
    pub status: Option<LeaveStatus>,
    pub page: u64,
    pub per_page: u64,
}

impl LeaveFilter {
    pub const MAX_PER_PAGE: u64 = 100;

    /// 1-based page, per_page clamped to `1..=MAX_PER_PAGE`.
    pub fn new(
        requester_id: Option<u64>,
        status: Option<LeaveStatus>,
        page: Option<u64>,
        per_page: Option<u64>,
    ) -> Self {
        Self {
            requester_id,
            status,
            page: page.unwrap_or(1).max(1),
            per_page: per_page.unwrap_or(10).clamp(1, Self::MAX_PER_PAGE),
        }
    }

    /// Saturates, so an absurd page number lands past the end instead of overflowing.
    pub fn offset(&self) -> u64 {
        (self.page.max(1) - 1).saturating_mul(self.per_page)
    }

    pub fn matches(&self, request: &LeaveRequest) -> bool {
        self.requester_id.is_none_or(|id| id == request.requester_id)
            && self.status.is_none_or(|status| status == request.status)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub page: u64,
    pub per_page: u64,
    pub total: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn category_strings_use_snake_case() {
        assert_eq!(LeaveCategory::ParentalMaternal.to_string(), "parental_maternal");
        assert_eq!(
            LeaveCategory::from_str("compensatory").expect("known category"),
            LeaveCategory::Compensatory
        );
        assert!(LeaveCategory::from_str("vacation").is_err());
    }

    #[test]
    fn filter_clamps_pagination() {
        let filter = LeaveFilter::new(None, None, Some(0), Some(500));
        assert_eq!(filter.page, 1);
        assert_eq!(filter.per_page, LeaveFilter::MAX_PER_PAGE);
        assert_eq!(filter.offset(), 0);

        let filter = LeaveFilter::new(None, Some(LeaveStatus::Pending), Some(3), Some(20));
        assert_eq!(filter.offset(), 40);
    }

    #[test]
    fn huge_page_saturates_offset() {
        let filter = LeaveFilter::new(None, None, Some(u64::MAX), Some(100));
        assert_eq!(filter.page, u64::MAX);
        assert_eq!(filter.offset(), u64::MAX);
    }
}
