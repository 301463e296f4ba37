//! Read-only collaborators: the commitment repository with one adapter per
//! commitment kind, and the staff directory.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

use crate::leave::store::StoreError;
use crate::leave::units::DateSpan;
use crate::model::commitment::{CommitmentItem, CommitmentKind};
use crate::model::conflict::Severity;
use crate::model::staff::StaffProfile;

#[async_trait]
pub trait CommitmentRepository: Send + Sync {
    /// Weekly recurring commitments, independent of any date.
    async fn list_recurring_commitments(
        &self,
        staff_id: u64,
    ) -> Result<Vec<CommitmentItem>, StoreError>;

    /// Dated commitments of `kind` (duty or event) within `[start, end]`.
    async fn list_dated_commitments(
        &self,
        staff_id: u64,
        start: NaiveDate,
        end: NaiveDate,
        kind: CommitmentKind,
    ) -> Result<Vec<CommitmentItem>, StoreError>;
}

#[async_trait]
pub trait StaffDirectory: Send + Sync {
    async fn get_staff(&self, staff_id: u64) -> Result<Option<StaffProfile>, StoreError>;
    async fn list_staff(&self) -> Result<Vec<StaffProfile>, StoreError>;
}

/// A commitment source could not answer. Conflict detection degrades instead
/// of failing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} commitments unavailable: {cause}")]
pub struct SourceUnavailable {
    pub kind: CommitmentKind,
    pub cause: String,
}

/// One obligation class the conflict detector asks about.
#[async_trait]
pub trait CommitmentSource: Send + Sync {
    fn kind(&self) -> CommitmentKind;
    fn severity(&self) -> Severity;
    fn summarize(&self, count: usize) -> String;

    /// Items of this kind that the leave range collides with.
    async fn affected(
        &self,
        staff_id: u64,
        span: &DateSpan,
    ) -> Result<Vec<CommitmentItem>, StoreError>;
}

fn plural(count: usize, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("{count} {singular}")
    } else {
        format!("{count} {plural}")
    }
}

pub struct TimetableSource {
    repository: Arc<dyn CommitmentRepository>,
}

impl TimetableSource {
    pub fn new(repository: Arc<dyn CommitmentRepository>) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl CommitmentSource for TimetableSource {
    fn kind(&self) -> CommitmentKind {
        CommitmentKind::Timetable
    }

    fn severity(&self) -> Severity {
        Severity::Significant
    }

    fn summarize(&self, count: usize) -> String {
        format!(
            "{} recur during the leave",
            plural(count, "teaching period", "teaching periods")
        )
    }

    async fn affected(
        &self,
        staff_id: u64,
        span: &DateSpan,
    ) -> Result<Vec<CommitmentItem>, StoreError> {
        let items = self.repository.list_recurring_commitments(staff_id).await?;
        Ok(items
            .into_iter()
            .filter(|item| item.weekday.is_none_or(|weekday| span.covers_weekday(weekday)))
            .collect())
    }
}

pub struct DutySource {
    repository: Arc<dyn CommitmentRepository>,
}

impl DutySource {
    pub fn new(repository: Arc<dyn CommitmentRepository>) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl CommitmentSource for DutySource {
    fn kind(&self) -> CommitmentKind {
        CommitmentKind::Duty
    }

    fn severity(&self) -> Severity {
        Severity::Blocking
    }

    fn summarize(&self, count: usize) -> String {
        format!(
            "{} scheduled during the leave",
            plural(count, "invigilation duty", "invigilation duties")
        )
    }

    async fn affected(
        &self,
        staff_id: u64,
        span: &DateSpan,
    ) -> Result<Vec<CommitmentItem>, StoreError> {
        dated_within(&*self.repository, staff_id, span, CommitmentKind::Duty).await
    }
}

pub struct EventSource {
    repository: Arc<dyn CommitmentRepository>,
}

impl EventSource {
    pub fn new(repository: Arc<dyn CommitmentRepository>) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl CommitmentSource for EventSource {
    fn kind(&self) -> CommitmentKind {
        CommitmentKind::Event
    }

    fn severity(&self) -> Severity {
        Severity::Informational
    }

    fn summarize(&self, count: usize) -> String {
        format!(
            "{} during the leave",
            plural(count, "calendar event", "calendar events")
        )
    }

    async fn affected(
        &self,
        staff_id: u64,
        span: &DateSpan,
    ) -> Result<Vec<CommitmentItem>, StoreError> {
        dated_within(&*self.repository, staff_id, span, CommitmentKind::Event).await
    }
}

async fn dated_within(
    repository: &dyn CommitmentRepository,
    staff_id: u64,
    span: &DateSpan,
    kind: CommitmentKind,
) -> Result<Vec<CommitmentItem>, StoreError> {
    let items = repository
        .list_dated_commitments(staff_id, span.start(), span.end(), kind)
        .await?;
    // adapters are trusted to filter, but an undated or out-of-range row must not leak in
    Ok(items
        .into_iter()
        .filter(|item| item.date.is_some_and(|date| span.contains(date)))
        .collect())
}
