//! MySQL backend. Schema lives in `migrations/0001_leave_engine.sql`.

use std::collections::HashMap;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc, Weekday};
use sqlx::{FromRow, MySql, MySqlPool, Transaction};

use crate::leave::sources::{CommitmentRepository, StaffDirectory};
use crate::leave::store::{
    ApprovedLeave, CoverageChange, LeaveStore, StoreError, Transition,
};
use crate::leave::units::{DateSpan, LeaveUnits};
use crate::model::commitment::{CommitmentItem, CommitmentKind};
use crate::model::coverage::CoverageAssignment;
use crate::model::leave_balance::{BalanceKey, LeaveBalanceEntry};
use crate::model::leave_request::{
    ActionStamp, LeaveFilter, LeaveRequest, LeaveRequestDraft, LeaveStatus, Page,
};
use crate::model::staff::StaffProfile;

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Backend(err.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Corrupt(err.to_string())
    }
}

fn parse<T: FromStr>(column: &str, value: &str) -> Result<T, StoreError> {
    value
        .parse()
        .map_err(|_| StoreError::Corrupt(format!("unexpected {column} value '{value}'")))
}

const LEAVE_COLUMNS: &str = r#"
    id, employee_id, category, period_id, start_date, end_date, half_day, reason,
    attachments, status, conflicts, degraded_sources, substitute_id,
    reviewer_id, reviewed_at, review_notes,
    assigned_by, assigned_at, assignment_notes,
    cancelled_by, cancelled_at, cancellation_notes,
    created_at, updated_at
"#;

#[derive(FromRow)]
struct LeaveRow {
    id: u64,
    employee_id: u64,
    category: String,
    period_id: String,
    start_date: NaiveDate,
    end_date: NaiveDate,
    half_day: Option<String>,
    reason: String,
    attachments: String,
    status: String,
    conflicts: String,
    degraded_sources: String,
    substitute_id: Option<u64>,
    reviewer_id: Option<u64>,
    reviewed_at: Option<DateTime<Utc>>,
    review_notes: Option<String>,
    assigned_by: Option<u64>,
    assigned_at: Option<DateTime<Utc>>,
    assignment_notes: Option<String>,
    cancelled_by: Option<u64>,
    cancelled_at: Option<DateTime<Utc>>,
    cancellation_notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn stamp(
    actor_id: Option<u64>,
    at: Option<DateTime<Utc>>,
    notes: Option<String>,
) -> Option<ActionStamp> {
    match (actor_id, at) {
        (Some(actor_id), Some(at)) => Some(ActionStamp {
            actor_id,
            at,
            notes,
        }),
        _ => None,
    }
}

impl TryFrom<LeaveRow> for LeaveRequest {
    type Error = StoreError;

    fn try_from(row: LeaveRow) -> Result<Self, Self::Error> {
        Ok(LeaveRequest {
            id: row.id,
            requester_id: row.employee_id,
            category: parse("category", &row.category)?,
            period_id: row.period_id,
            start_date: row.start_date,
            end_date: row.end_date,
            half_day: row
                .half_day
                .as_deref()
                .map(|segment| parse("half_day", segment))
                .transpose()?,
            reason: row.reason,
            attachments: serde_json::from_str(&row.attachments)?,
            status: parse("status", &row.status)?,
            conflicts: serde_json::from_str(&row.conflicts)?,
            degraded_sources: serde_json::from_str(&row.degraded_sources)?,
            substitute_id: row.substitute_id,
            review: stamp(row.reviewer_id, row.reviewed_at, row.review_notes),
            assignment: stamp(row.assigned_by, row.assigned_at, row.assignment_notes),
            cancellation: stamp(row.cancelled_by, row.cancelled_at, row.cancellation_notes),
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(FromRow)]
struct BalanceRow {
    employee_id: u64,
    category: String,
    period_id: String,
    allocated_half_units: u32,
    carried_forward_half_units: u32,
    consumed_half_units: u32,
}

impl TryFrom<BalanceRow> for LeaveBalanceEntry {
    type Error = StoreError;

    fn try_from(row: BalanceRow) -> Result<Self, Self::Error> {
        Ok(LeaveBalanceEntry {
            key: BalanceKey::new(
                row.employee_id,
                parse("category", &row.category)?,
                row.period_id,
            ),
            allocated: LeaveUnits::from_half_days(row.allocated_half_units),
            carried_forward: LeaveUnits::from_half_days(row.carried_forward_half_units),
            consumed: LeaveUnits::from_half_days(row.consumed_half_units),
        })
    }
}

#[derive(FromRow)]
struct AssignmentRow {
    leave_request_id: u64,
    substitute_id: u64,
    assigned_by: u64,
    assigned_at: DateTime<Utc>,
    notes: Option<String>,
    active: bool,
}

impl From<AssignmentRow> for CoverageAssignment {
    fn from(row: AssignmentRow) -> Self {
        CoverageAssignment {
            leave_request_id: row.leave_request_id,
            substitute_id: row.substitute_id,
            assigned_by: row.assigned_by,
            assigned_at: row.assigned_at,
            notes: row.notes,
            active: row.active,
        }
    }
}

#[derive(FromRow)]
struct StaffRow {
    id: u64,
    status: String,
    department: String,
    specialization: Option<String>,
    current_load: u32,
    max_load: u32,
}

impl StaffRow {
    fn into_profile(self, subjects: Vec<String>) -> Result<StaffProfile, StoreError> {
        Ok(StaffProfile {
            id: self.id,
            status: parse("status", &self.status)?,
            department: self.department,
            specialization: self.specialization,
            current_load: self.current_load,
            max_load: self.max_load,
            subjects,
        })
    }
}

const STAFF_QUERY: &str = r#"
    SELECT e.id, e.status, d.name AS department, e.specialization, e.current_load, e.max_load
    FROM employees e
    JOIN departments d ON d.id = e.department_id
"#;

/// Weekdays are stored ISO style, 1 = Monday.
fn weekday_from_iso(day: u8) -> Result<Weekday, StoreError> {
    match day {
        1 => Ok(Weekday::Mon),
        2 => Ok(Weekday::Tue),
        3 => Ok(Weekday::Wed),
        4 => Ok(Weekday::Thu),
        5 => Ok(Weekday::Fri),
        6 => Ok(Weekday::Sat),
        7 => Ok(Weekday::Sun),
        _ => Err(StoreError::Corrupt(format!("unexpected weekday value '{day}'"))),
    }
}

// Helper enum for typed SQLx binding
enum FilterValue<'a> {
    U64(u64),
    Str(&'a str),
}

#[derive(Clone)]
pub struct MySqlStore {
    pool: MySqlPool,
}

impl MySqlStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    async fn lock_request(
        tx: &mut Transaction<'_, MySql>,
        id: u64,
    ) -> Result<LeaveRequest, StoreError> {
        let sql = format!("SELECT {LEAVE_COLUMNS} FROM leave_requests WHERE id = ? FOR UPDATE");
        let row = sqlx::query_as::<_, LeaveRow>(&sql)
            .bind(id)
            .fetch_optional(&mut **tx)
            .await?
            .ok_or_else(|| StoreError::NotFound {
                resource: "leave_request",
                id: id.to_string(),
            })?;
        row.try_into()
    }

    async fn lock_balance(
        tx: &mut Transaction<'_, MySql>,
        key: &BalanceKey,
    ) -> Result<Option<LeaveBalanceEntry>, StoreError> {
        sqlx::query_as::<_, BalanceRow>(
            r#"
            SELECT employee_id, category, period_id,
                   allocated_half_units, carried_forward_half_units, consumed_half_units
            FROM leave_balances
            WHERE employee_id = ? AND category = ? AND period_id = ?
            FOR UPDATE
            "#,
        )
        .bind(key.staff_id)
        .bind(key.category.as_ref())
        .bind(&key.period_id)
        .fetch_optional(&mut **tx)
        .await?
        .map(LeaveBalanceEntry::try_from)
        .transpose()
    }

    async fn subjects_for(&self, ids: &[u64]) -> Result<HashMap<u64, Vec<String>>, StoreError> {
        let mut subjects: HashMap<u64, Vec<String>> = HashMap::new();
        if ids.is_empty() {
            return Ok(subjects);
        }
        let placeholders = vec!["?"; ids.len()].join(", ");
        let sql = format!(
            "SELECT employee_id, subject_code FROM employee_subjects WHERE employee_id IN ({placeholders}) ORDER BY subject_code"
        );
        let mut query = sqlx::query_as::<_, (u64, String)>(&sql);
        for id in ids {
            query = query.bind(*id);
        }
        for (employee_id, subject) in query.fetch_all(&self.pool).await? {
            subjects.entry(employee_id).or_default().push(subject);
        }
        Ok(subjects)
    }
}

#[async_trait]
impl LeaveStore for MySqlStore {
    async fn insert_request(&self, draft: LeaveRequestDraft) -> Result<LeaveRequest, StoreError> {
        let span = draft.window.span();
        let result = sqlx::query(
            r#"
            INSERT INTO leave_requests
                (employee_id, category, period_id, start_date, end_date, half_day, reason,
                 attachments, status, conflicts, degraded_sources, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(draft.requester_id)
        .bind(draft.category.as_ref())
        .bind(&draft.period_id)
        .bind(span.start())
        .bind(span.end())
        .bind(draft.window.half_day().map(|segment| segment.to_string()))
        .bind(&draft.reason)
        .bind(serde_json::to_string(&draft.attachments)?)
        .bind(LeaveStatus::Pending.as_ref())
        .bind(serde_json::to_string(&draft.conflicts)?)
        .bind(serde_json::to_string(&draft.degraded_sources)?)
        .bind(draft.created_at)
        .bind(draft.created_at)
        .execute(&self.pool)
        .await?;

        Ok(draft.into_request(result.last_insert_id()))
    }

    async fn get_request(&self, id: u64) -> Result<Option<LeaveRequest>, StoreError> {
        let sql = format!("SELECT {LEAVE_COLUMNS} FROM leave_requests WHERE id = ?");
        sqlx::query_as::<_, LeaveRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(LeaveRequest::try_from)
            .transpose()
    }

    async fn list_requests(&self, filter: &LeaveFilter) -> Result<Page<LeaveRequest>, StoreError> {
        let mut where_sql = String::from(" WHERE 1=1");
        let mut args: Vec<FilterValue> = Vec::new();

        if let Some(requester_id) = filter.requester_id {
            where_sql.push_str(" AND employee_id = ?");
            args.push(FilterValue::U64(requester_id));
        }
        if let Some(status) = &filter.status {
            where_sql.push_str(" AND status = ?");
            args.push(FilterValue::Str(status.as_ref()));
        }

        let count_sql = format!("SELECT COUNT(*) FROM leave_requests{where_sql}");
        let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql);
        for arg in &args {
            count_q = match arg {
                FilterValue::U64(v) => count_q.bind(*v),
                FilterValue::Str(s) => count_q.bind(*s),
            };
        }
        let total = count_q.fetch_one(&self.pool).await?;

        let data_sql = format!(
            "SELECT {LEAVE_COLUMNS} FROM leave_requests{where_sql} ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?"
        );
        let mut data_q = sqlx::query_as::<_, LeaveRow>(&data_sql);
        for arg in args {
            data_q = match arg {
                FilterValue::U64(v) => data_q.bind(v),
                FilterValue::Str(s) => data_q.bind(s),
            };
        }
        let rows = data_q
            .bind(filter.per_page)
            .bind(filter.offset())
            .fetch_all(&self.pool)
            .await?;

        Ok(Page {
            data: rows
                .into_iter()
                .map(LeaveRequest::try_from)
                .collect::<Result<_, _>>()?,
            page: filter.page,
            per_page: filter.per_page,
            total: u64::try_from(total).unwrap_or_default(),
        })
    }

    async fn commit(&self, transition: Transition) -> Result<LeaveRequest, StoreError> {
        let mut tx = self.pool.begin().await?;
        let id = transition.request_id;

        let mut request = Self::lock_request(&mut tx, id).await?;
        transition.check(&request)?;

        if let Some(change) = &transition.ledger {
            let mut entry = Self::lock_balance(&mut tx, change.key()).await?;
            change.apply(entry.as_mut())?;
            if let Some(entry) = entry {
                sqlx::query(
                    r#"
                    UPDATE leave_balances
                    SET consumed_half_units = ?
                    WHERE employee_id = ? AND category = ? AND period_id = ?
                    "#,
                )
                .bind(entry.consumed.half_days())
                .bind(entry.key.staff_id)
                .bind(entry.key.category.as_ref())
                .bind(&entry.key.period_id)
                .execute(&mut *tx)
                .await?;
            }
        }

        match &transition.coverage {
            Some(CoverageChange::Bind(assignment)) => {
                sqlx::query(
                    r#"
                    INSERT INTO coverage_assignments
                        (leave_request_id, substitute_id, assigned_by, assigned_at, notes, active)
                    VALUES (?, ?, ?, ?, ?, TRUE)
                    ON DUPLICATE KEY UPDATE
                        substitute_id = VALUES(substitute_id),
                        assigned_by = VALUES(assigned_by),
                        assigned_at = VALUES(assigned_at),
                        notes = VALUES(notes),
                        active = TRUE
                    "#,
                )
                .bind(assignment.leave_request_id)
                .bind(assignment.substitute_id)
                .bind(assignment.assigned_by)
                .bind(assignment.assigned_at)
                .bind(&assignment.notes)
                .execute(&mut *tx)
                .await?;
            }
            Some(CoverageChange::Release) => {
                sqlx::query("UPDATE coverage_assignments SET active = FALSE WHERE leave_request_id = ?")
                    .bind(id)
                    .execute(&mut *tx)
                    .await?;
            }
            None => {}
        }

        transition.apply_to_request(&mut request);
        let review = request.review.as_ref();
        let assignment = request.assignment.as_ref();
        let cancellation = request.cancellation.as_ref();
        sqlx::query(
            r#"
            UPDATE leave_requests
            SET status = ?, substitute_id = ?,
                reviewer_id = ?, reviewed_at = ?, review_notes = ?,
                assigned_by = ?, assigned_at = ?, assignment_notes = ?,
                cancelled_by = ?, cancelled_at = ?, cancellation_notes = ?,
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(request.status.as_ref())
        .bind(request.substitute_id)
        .bind(review.map(|s| s.actor_id))
        .bind(review.map(|s| s.at))
        .bind(review.and_then(|s| s.notes.clone()))
        .bind(assignment.map(|s| s.actor_id))
        .bind(assignment.map(|s| s.at))
        .bind(assignment.and_then(|s| s.notes.clone()))
        .bind(cancellation.map(|s| s.actor_id))
        .bind(cancellation.map(|s| s.at))
        .bind(cancellation.and_then(|s| s.notes.clone()))
        .bind(request.updated_at)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(request)
    }

    async fn approved_leave_overlapping(
        &self,
        span: DateSpan,
        staff_id: Option<u64>,
    ) -> Result<Vec<ApprovedLeave>, StoreError> {
        let mut sql = String::from(
            "SELECT id, employee_id FROM leave_requests WHERE status = ? AND start_date <= ? AND end_date >= ?",
        );
        if staff_id.is_some() {
            sql.push_str(" AND employee_id = ?");
        }
        let mut query = sqlx::query_as::<_, (u64, u64)>(&sql)
            .bind(LeaveStatus::Approved.as_ref())
            .bind(span.end())
            .bind(span.start());
        if let Some(staff_id) = staff_id {
            query = query.bind(staff_id);
        }

        Ok(query
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(|(leave_id, staff_id)| ApprovedLeave { leave_id, staff_id })
            .collect())
    }

    async fn balance(&self, key: &BalanceKey) -> Result<Option<LeaveBalanceEntry>, StoreError> {
        sqlx::query_as::<_, BalanceRow>(
            r#"
            SELECT employee_id, category, period_id,
                   allocated_half_units, carried_forward_half_units, consumed_half_units
            FROM leave_balances
            WHERE employee_id = ? AND category = ? AND period_id = ?
            "#,
        )
        .bind(key.staff_id)
        .bind(key.category.as_ref())
        .bind(&key.period_id)
        .fetch_optional(&self.pool)
        .await?
        .map(LeaveBalanceEntry::try_from)
        .transpose()
    }

    async fn balances_for(
        &self,
        staff_id: u64,
        period_id: &str,
    ) -> Result<Vec<LeaveBalanceEntry>, StoreError> {
        sqlx::query_as::<_, BalanceRow>(
            r#"
            SELECT employee_id, category, period_id,
                   allocated_half_units, carried_forward_half_units, consumed_half_units
            FROM leave_balances
            WHERE employee_id = ? AND period_id = ?
            ORDER BY category
            "#,
        )
        .bind(staff_id)
        .bind(period_id)
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(LeaveBalanceEntry::try_from)
        .collect()
    }

    async fn open_balance(&self, entry: LeaveBalanceEntry) -> Result<LeaveBalanceEntry, StoreError> {
        let result = sqlx::query(
            r#"
            INSERT INTO leave_balances
                (employee_id, category, period_id,
                 allocated_half_units, carried_forward_half_units, consumed_half_units)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(entry.key.staff_id)
        .bind(entry.key.category.as_ref())
        .bind(&entry.key.period_id)
        .bind(entry.allocated.half_days())
        .bind(entry.carried_forward.half_days())
        .bind(entry.consumed.half_days())
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(entry),
            Err(sqlx::Error::Database(db_err)) if db_err.code().as_deref() == Some("23000") => {
                Err(StoreError::Duplicate {
                    resource: "leave_balance",
                    id: format!(
                        "{}/{}/{}",
                        entry.key.staff_id, entry.key.category, entry.key.period_id
                    ),
                })
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn assignment(
        &self,
        leave_request_id: u64,
    ) -> Result<Option<CoverageAssignment>, StoreError> {
        Ok(sqlx::query_as::<_, AssignmentRow>(
            r#"
            SELECT leave_request_id, substitute_id, assigned_by, assigned_at, notes, active
            FROM coverage_assignments
            WHERE leave_request_id = ?
            "#,
        )
        .bind(leave_request_id)
        .fetch_optional(&self.pool)
        .await?
        .map(CoverageAssignment::from))
    }
}

#[async_trait]
impl StaffDirectory for MySqlStore {
    async fn get_staff(&self, staff_id: u64) -> Result<Option<StaffProfile>, StoreError> {
        let sql = format!("{STAFF_QUERY} WHERE e.id = ?");
        let Some(row) = sqlx::query_as::<_, StaffRow>(&sql)
            .bind(staff_id)
            .fetch_optional(&self.pool)
            .await?
        else {
            return Ok(None);
        };
        let mut subjects = self.subjects_for(&[staff_id]).await?;
        row.into_profile(subjects.remove(&staff_id).unwrap_or_default())
            .map(Some)
    }

    async fn list_staff(&self) -> Result<Vec<StaffProfile>, StoreError> {
        let sql = format!("{STAFF_QUERY} ORDER BY e.id");
        let rows = sqlx::query_as::<_, StaffRow>(&sql)
            .fetch_all(&self.pool)
            .await?;
        let ids: Vec<u64> = rows.iter().map(|row| row.id).collect();
        let mut subjects = self.subjects_for(&ids).await?;

        rows.into_iter()
            .map(|row| {
                let own = subjects.remove(&row.id).unwrap_or_default();
                row.into_profile(own)
            })
            .collect()
    }
}

#[async_trait]
impl CommitmentRepository for MySqlStore {
    async fn list_recurring_commitments(
        &self,
        staff_id: u64,
    ) -> Result<Vec<CommitmentItem>, StoreError> {
        let rows = sqlx::query_as::<_, (u64, u8, String, String)>(
            r#"
            SELECT id, weekday, period_label, subject_code
            FROM timetable_slots
            WHERE employee_id = ?
            ORDER BY weekday, period_label
            "#,
        )
        .bind(staff_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|(id, weekday, period, subject)| {
                Ok(CommitmentItem {
                    reference: format!("timetable:{id}"),
                    label: format!("{subject} ({period})"),
                    date: None,
                    weekday: Some(weekday_from_iso(weekday)?),
                })
            })
            .collect()
    }

    async fn list_dated_commitments(
        &self,
        staff_id: u64,
        start: NaiveDate,
        end: NaiveDate,
        kind: CommitmentKind,
    ) -> Result<Vec<CommitmentItem>, StoreError> {
        let sql = match kind {
            CommitmentKind::Duty => {
                "SELECT id, duty_date, description FROM exam_duties WHERE employee_id = ? AND duty_date BETWEEN ? AND ? ORDER BY duty_date"
            }
            CommitmentKind::Event => {
                "SELECT id, event_date, title FROM calendar_events WHERE employee_id = ? AND event_date BETWEEN ? AND ? ORDER BY event_date"
            }
            CommitmentKind::Timetable => return Ok(Vec::new()),
        };

        let rows = sqlx::query_as::<_, (u64, NaiveDate, String)>(sql)
            .bind(staff_id)
            .bind(start)
            .bind(end)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(id, date, label)| CommitmentItem::dated(format!("{kind}:{id}"), label, date))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::leave_request::{HalfDaySegment, LeaveCategory};

    fn row() -> LeaveRow {
        let at = DateTime::parse_from_rfc3339("2026-02-20T08:30:00Z")
            .expect("valid timestamp")
            .with_timezone(&Utc);
        LeaveRow {
            id: 12,
            employee_id: 4,
            category: "earned".to_string(),
            period_id: "2025-26".to_string(),
            start_date: NaiveDate::from_ymd_opt(2026, 3, 2).expect("valid date"),
            end_date: NaiveDate::from_ymd_opt(2026, 3, 2).expect("valid date"),
            half_day: Some("afternoon".to_string()),
            reason: "Clinic visit".to_string(),
            attachments: r#"["doc:9"]"#.to_string(),
            status: "approved".to_string(),
            conflicts: "[]".to_string(),
            degraded_sources: r#"["event"]"#.to_string(),
            substitute_id: None,
            reviewer_id: Some(2),
            reviewed_at: Some(at),
            review_notes: None,
            assigned_by: None,
            assigned_at: None,
            assignment_notes: None,
            cancelled_by: None,
            cancelled_at: None,
            cancellation_notes: None,
            created_at: at,
            updated_at: at,
        }
    }

    #[test]
    fn leave_row_maps_to_request() {
        let request = LeaveRequest::try_from(row()).expect("valid row");
        assert_eq!(request.category, LeaveCategory::Earned);
        assert_eq!(request.status, LeaveStatus::Approved);
        assert_eq!(request.half_day, Some(HalfDaySegment::Afternoon));
        assert_eq!(request.total_units(), LeaveUnits::HALF_DAY);
        assert_eq!(request.degraded_sources, vec![CommitmentKind::Event]);
        assert_eq!(request.review.as_ref().map(|r| r.actor_id), Some(2));
        assert!(request.assignment.is_none());
    }

    #[test]
    fn unknown_status_is_corrupt() {
        let mut bad = row();
        bad.status = "archived".to_string();
        assert!(matches!(
            LeaveRequest::try_from(bad),
            Err(StoreError::Corrupt(_))
        ));
    }

    #[test]
    fn iso_weekdays() {
        assert_eq!(weekday_from_iso(1).expect("monday"), Weekday::Mon);
        assert_eq!(weekday_from_iso(7).expect("sunday"), Weekday::Sun);
        assert!(matches!(weekday_from_iso(0), Err(StoreError::Corrupt(_))));
        assert!(matches!(weekday_from_iso(8), Err(StoreError::Corrupt(_))));
    }
}
