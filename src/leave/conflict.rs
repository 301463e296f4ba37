//! Conflict detection: asks every commitment source about a leave range and
//! folds the answers into one ordered report.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::leave::sources::{
    CommitmentRepository, CommitmentSource, DutySource, EventSource, SourceUnavailable,
    TimetableSource,
};
use crate::leave::units::DateSpan;
use crate::model::commitment::CommitmentKind;
use crate::model::conflict::{ConflictFinding, FindingDetail};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConflictReport {
    /// At most one finding per source, in timetable, duty, event order.
    pub findings: Vec<ConflictFinding>,
    pub degraded_sources: Vec<CommitmentKind>,
}

impl ConflictReport {
    pub fn has_conflicts(&self) -> bool {
        !self.findings.is_empty()
    }
}

pub struct ConflictDetector {
    timetable: TimetableSource,
    duties: DutySource,
    events: EventSource,
    timeout: Duration,
    sample_limit: usize,
}

impl ConflictDetector {
    pub fn new(
        commitments: Arc<dyn CommitmentRepository>,
        timeout: Duration,
        sample_limit: usize,
    ) -> Self {
        Self {
            timetable: TimetableSource::new(commitments.clone()),
            duties: DutySource::new(commitments.clone()),
            events: EventSource::new(commitments),
            timeout,
            sample_limit,
        }
    }

    /// Queries all sources concurrently. A failing source is logged and
    /// reported as degraded; it never fails detection as a whole.
    pub async fn detect(&self, staff_id: u64, span: &DateSpan) -> ConflictReport {
        let (timetable, duties, events) = futures::join!(
            self.query(&self.timetable, staff_id, span),
            self.query(&self.duties, staff_id, span),
            self.query(&self.events, staff_id, span),
        );

        let mut report = ConflictReport::default();
        for outcome in [timetable, duties, events] {
            match outcome {
                Ok(Some(finding)) => report.findings.push(finding),
                Ok(None) => {}
                Err(e) => {
                    warn!(staff_id, source = %e.kind, error = %e.cause, "Commitment source degraded");
                    report.degraded_sources.push(e.kind);
                }
            }
        }

        debug!(
            staff_id,
            findings = report.findings.len(),
            degraded = report.degraded_sources.len(),
            "Conflict detection finished"
        );
        report
    }

    async fn query<S: CommitmentSource>(
        &self,
        source: &S,
        staff_id: u64,
        span: &DateSpan,
    ) -> Result<Option<ConflictFinding>, SourceUnavailable> {
        let kind = source.kind();
        let items = match tokio::time::timeout(self.timeout, source.affected(staff_id, span)).await {
            Ok(Ok(items)) => items,
            Ok(Err(e)) => {
                return Err(SourceUnavailable {
                    kind,
                    cause: e.to_string(),
                });
            }
            Err(_) => {
                return Err(SourceUnavailable {
                    kind,
                    cause: format!("no answer within {} ms", self.timeout.as_millis()),
                });
            }
        };

        if items.is_empty() {
            return Ok(None);
        }

        let affected_count = items.len();
        Ok(Some(ConflictFinding::new(
            kind,
            FindingDetail {
                affected_count,
                severity: source.severity(),
                summary: source.summarize(affected_count),
                sample: items.into_iter().take(self.sample_limit).collect(),
            },
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::leave::store::StoreError;
    use crate::model::commitment::CommitmentItem;
    use crate::model::conflict::Severity;
    use async_trait::async_trait;
    use chrono::{NaiveDate, Weekday};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[derive(Default)]
    struct FakeCommitments {
        recurring: Vec<CommitmentItem>,
        duties: Vec<CommitmentItem>,
        events: Vec<CommitmentItem>,
        fail_duties: bool,
        slow_events: bool,
    }

    #[async_trait]
    impl CommitmentRepository for FakeCommitments {
        async fn list_recurring_commitments(
            &self,
            _staff_id: u64,
        ) -> Result<Vec<CommitmentItem>, StoreError> {
            Ok(self.recurring.clone())
        }

        async fn list_dated_commitments(
            &self,
            _staff_id: u64,
            start: NaiveDate,
            end: NaiveDate,
            kind: CommitmentKind,
        ) -> Result<Vec<CommitmentItem>, StoreError> {
            let items = match kind {
                CommitmentKind::Duty if self.fail_duties => {
                    return Err(StoreError::Backend("exam service down".to_string()));
                }
                CommitmentKind::Duty => &self.duties,
                CommitmentKind::Event => {
                    if self.slow_events {
                        tokio::time::sleep(Duration::from_millis(500)).await;
                    }
                    &self.events
                }
                CommitmentKind::Timetable => return Ok(Vec::new()),
            };
            Ok(items
                .iter()
                .filter(|item| item.date.is_some_and(|d| start <= d && d <= end))
                .cloned()
                .collect())
        }
    }

    fn detector(fake: FakeCommitments) -> ConflictDetector {
        ConflictDetector::new(Arc::new(fake), Duration::from_millis(50), 2)
    }

    // Monday 2026-03-02 .. Wednesday 2026-03-04
    fn mon_to_wed() -> DateSpan {
        DateSpan::new(date(2026, 3, 2), date(2026, 3, 4)).expect("valid span")
    }

    #[tokio::test]
    async fn findings_follow_source_order_with_fixed_severity() {
        let fake = FakeCommitments {
            recurring: vec![
                CommitmentItem::recurring("tt:1", "Physics 10A", Weekday::Mon),
                CommitmentItem::recurring("tt:2", "Physics 11B", Weekday::Fri),
            ],
            duties: vec![CommitmentItem::dated("duty:1", "Midterm hall 3", date(2026, 3, 3))],
            events: vec![
                CommitmentItem::dated("ev:1", "Staff meeting", date(2026, 3, 4)),
                CommitmentItem::dated("ev:2", "Open day", date(2026, 3, 10)),
            ],
            ..Default::default()
        };

        let report = detector(fake).detect(7, &mon_to_wed()).await;

        let kinds: Vec<_> = report.findings.iter().map(ConflictFinding::kind).collect();
        assert_eq!(
            kinds,
            vec![CommitmentKind::Timetable, CommitmentKind::Duty, CommitmentKind::Event]
        );
        let severities: Vec<_> = report.findings.iter().map(ConflictFinding::severity).collect();
        assert_eq!(
            severities,
            vec![Severity::Significant, Severity::Blocking, Severity::Informational]
        );
        // the Friday period does not recur inside Mon..Wed
        assert_eq!(report.findings[0].detail().affected_count, 1);
        assert_eq!(report.findings[2].detail().affected_count, 1);
        assert!(report.degraded_sources.is_empty());
    }

    #[tokio::test]
    async fn empty_sources_produce_no_findings() {
        let report = detector(FakeCommitments::default()).detect(7, &mon_to_wed()).await;
        assert!(!report.has_conflicts());
        assert!(report.degraded_sources.is_empty());
    }

    #[tokio::test]
    async fn sample_is_bounded_but_count_is_complete() {
        let fake = FakeCommitments {
            recurring: (0..6)
                .map(|i| CommitmentItem::recurring(format!("tt:{i}"), "Lab", Weekday::Tue))
                .collect(),
            ..Default::default()
        };

        let report = detector(fake).detect(7, &mon_to_wed()).await;
        let detail = report.findings[0].detail();
        assert_eq!(detail.affected_count, 6);
        assert_eq!(detail.sample.len(), 2);
        assert_eq!(detail.summary, "6 teaching periods recur during the leave");
    }

    #[tokio::test]
    async fn failing_and_slow_sources_degrade() {
        let fake = FakeCommitments {
            recurring: vec![CommitmentItem::recurring("tt:1", "Physics 10A", Weekday::Wed)],
            duties: vec![CommitmentItem::dated("duty:1", "Midterm", date(2026, 3, 3))],
            events: vec![CommitmentItem::dated("ev:1", "Assembly", date(2026, 3, 3))],
            fail_duties: true,
            slow_events: true,
        };

        let report = detector(fake).detect(7, &mon_to_wed()).await;
        assert_eq!(report.findings.len(), 1);
        assert_eq!(report.findings[0].kind(), CommitmentKind::Timetable);
        assert_eq!(
            report.degraded_sources,
            vec![CommitmentKind::Duty, CommitmentKind::Event]
        );
    }
}
