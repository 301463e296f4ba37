//! In-process backend. One mutex guards all leave state so `commit` is atomic
//! the same way a database transaction would be.

use std::collections::{BTreeMap, HashMap, HashSet};

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::Mutex;

use crate::leave::sources::{CommitmentRepository, StaffDirectory};
use crate::leave::store::{ApprovedLeave, LeaveStore, StoreError, Transition};
use crate::leave::units::DateSpan;
use crate::model::commitment::{CommitmentItem, CommitmentKind};
use crate::model::coverage::CoverageAssignment;
use crate::model::leave_balance::{BalanceKey, LeaveBalanceEntry};
use crate::model::leave_request::{
    LeaveFilter, LeaveRequest, LeaveRequestDraft, LeaveStatus, Page,
};
use crate::model::staff::StaffProfile;

#[derive(Default)]
struct LeaveState {
    next_id: u64,
    requests: BTreeMap<u64, LeaveRequest>,
    balances: HashMap<BalanceKey, LeaveBalanceEntry>,
    assignments: HashMap<u64, CoverageAssignment>,
}

#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<LeaveState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LeaveStore for MemoryStore {
    async fn insert_request(&self, draft: LeaveRequestDraft) -> Result<LeaveRequest, StoreError> {
        let mut state = self.state.lock().await;
        state.next_id += 1;
        let request = draft.into_request(state.next_id);
        state.requests.insert(request.id, request.clone());
        Ok(request)
    }

    async fn get_request(&self, id: u64) -> Result<Option<LeaveRequest>, StoreError> {
        Ok(self.state.lock().await.requests.get(&id).cloned())
    }

    async fn list_requests(&self, filter: &LeaveFilter) -> Result<Page<LeaveRequest>, StoreError> {
        let state = self.state.lock().await;
        let mut matching: Vec<&LeaveRequest> = state
            .requests
            .values()
            .filter(|request| filter.matches(request))
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        let total = matching.len() as u64;
        let data = matching
            .into_iter()
            .skip(usize::try_from(filter.offset()).unwrap_or(usize::MAX))
            .take(usize::try_from(filter.per_page).unwrap_or(usize::MAX))
            .cloned()
            .collect();

        Ok(Page {
            data,
            page: filter.page,
            per_page: filter.per_page,
            total,
        })
    }

    async fn commit(&self, transition: Transition) -> Result<LeaveRequest, StoreError> {
        let mut state = self.state.lock().await;
        let id = transition.request_id;

        let mut request = state
            .requests
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                resource: "leave_request",
                id: id.to_string(),
            })?;
        transition.check(&request)?;

        // work on copies; nothing is written until every step has passed
        let balance = match &transition.ledger {
            Some(change) => {
                let mut entry = state.balances.get(change.key()).cloned();
                change.apply(entry.as_mut())?;
                entry
            }
            None => None,
        };
        let assignment = transition
            .coverage
            .as_ref()
            .and_then(|change| change.apply(state.assignments.get(&id).cloned()));
        transition.apply_to_request(&mut request);

        if let Some(entry) = balance {
            state.balances.insert(entry.key.clone(), entry);
        }
        if let Some(assignment) = assignment {
            state.assignments.insert(id, assignment);
        }
        state.requests.insert(id, request.clone());
        Ok(request)
    }

    async fn approved_leave_overlapping(
        &self,
        span: DateSpan,
        staff_id: Option<u64>,
    ) -> Result<Vec<ApprovedLeave>, StoreError> {
        let state = self.state.lock().await;
        Ok(state
            .requests
            .values()
            .filter(|request| request.status == LeaveStatus::Approved)
            .filter(|request| staff_id.is_none_or(|id| id == request.requester_id))
            .filter(|request| request.span().overlaps(&span))
            .map(|request| ApprovedLeave {
                leave_id: request.id,
                staff_id: request.requester_id,
            })
            .collect())
    }

    async fn balance(&self, key: &BalanceKey) -> Result<Option<LeaveBalanceEntry>, StoreError> {
        Ok(self.state.lock().await.balances.get(key).cloned())
    }

    async fn balances_for(
        &self,
        staff_id: u64,
        period_id: &str,
    ) -> Result<Vec<LeaveBalanceEntry>, StoreError> {
        let state = self.state.lock().await;
        let mut entries: Vec<LeaveBalanceEntry> = state
            .balances
            .values()
            .filter(|entry| entry.key.staff_id == staff_id && entry.key.period_id == period_id)
            .cloned()
            .collect();
        entries.sort_by(|a, b| a.key.category.as_ref().cmp(b.key.category.as_ref()));
        Ok(entries)
    }

    async fn open_balance(&self, entry: LeaveBalanceEntry) -> Result<LeaveBalanceEntry, StoreError> {
        let mut state = self.state.lock().await;
        if state.balances.contains_key(&entry.key) {
            return Err(StoreError::Duplicate {
                resource: "leave_balance",
                id: format!(
                    "{}/{}/{}",
                    entry.key.staff_id, entry.key.category, entry.key.period_id
                ),
            });
        }
        state.balances.insert(entry.key.clone(), entry.clone());
        Ok(entry)
    }

    async fn assignment(
        &self,
        leave_request_id: u64,
    ) -> Result<Option<CoverageAssignment>, StoreError> {
        Ok(self
            .state
            .lock()
            .await
            .assignments
            .get(&leave_request_id)
            .cloned())
    }
}

/// Read-only staff roster.
#[derive(Default)]
pub struct MemoryDirectory {
    staff: BTreeMap<u64, StaffProfile>,
}

impl MemoryDirectory {
    pub fn new(profiles: impl IntoIterator<Item = StaffProfile>) -> Self {
        Self {
            staff: profiles.into_iter().map(|p| (p.id, p)).collect(),
        }
    }

    /// Roster from a JSON array of staff profiles.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        let profiles: Vec<StaffProfile> = serde_json::from_str(raw)?;
        Ok(Self::new(profiles))
    }

    pub fn len(&self) -> usize {
        self.staff.len()
    }

    pub fn is_empty(&self) -> bool {
        self.staff.is_empty()
    }
}

#[async_trait]
impl StaffDirectory for MemoryDirectory {
    async fn get_staff(&self, staff_id: u64) -> Result<Option<StaffProfile>, StoreError> {
        Ok(self.staff.get(&staff_id).cloned())
    }

    async fn list_staff(&self) -> Result<Vec<StaffProfile>, StoreError> {
        Ok(self.staff.values().cloned().collect())
    }
}

/// Fixed commitment data, with switchable outages per kind.
#[derive(Default)]
pub struct MemoryCommitments {
    recurring: HashMap<u64, Vec<CommitmentItem>>,
    dated: HashMap<(u64, CommitmentKind), Vec<CommitmentItem>>,
    unavailable: HashSet<CommitmentKind>,
}

impl MemoryCommitments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_recurring(mut self, staff_id: u64, item: CommitmentItem) -> Self {
        self.recurring.entry(staff_id).or_default().push(item);
        self
    }

    pub fn with_dated(mut self, staff_id: u64, kind: CommitmentKind, item: CommitmentItem) -> Self {
        self.dated.entry((staff_id, kind)).or_default().push(item);
        self
    }

    pub fn with_outage(mut self, kind: CommitmentKind) -> Self {
        self.unavailable.insert(kind);
        self
    }

    fn outage(&self, kind: CommitmentKind) -> Result<(), StoreError> {
        if self.unavailable.contains(&kind) {
            return Err(StoreError::Backend(format!("{kind} source offline")));
        }
        Ok(())
    }
}

#[async_trait]
impl CommitmentRepository for MemoryCommitments {
    async fn list_recurring_commitments(
        &self,
        staff_id: u64,
    ) -> Result<Vec<CommitmentItem>, StoreError> {
        self.outage(CommitmentKind::Timetable)?;
        Ok(self.recurring.get(&staff_id).cloned().unwrap_or_default())
    }

    async fn list_dated_commitments(
        &self,
        staff_id: u64,
        start: NaiveDate,
        end: NaiveDate,
        kind: CommitmentKind,
    ) -> Result<Vec<CommitmentItem>, StoreError> {
        self.outage(kind)?;
        Ok(self
            .dated
            .get(&(staff_id, kind))
            .map(|items| {
                items
                    .iter()
                    .filter(|item| item.date.is_some_and(|date| start <= date && date <= end))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::staff::StaffStatus;

    #[tokio::test]
    async fn roster_loads_from_json() {
        let directory = MemoryDirectory::from_json(
            r#"[
                {"id": 2, "status": "active", "department": "Science",
                 "specialization": "Physics", "current_load": 6, "max_load": 20,
                 "subjects": ["PHY-10"]},
                {"id": 3, "status": "inactive", "department": "Humanities",
                 "specialization": null, "current_load": 0, "max_load": 20,
                 "subjects": []}
            ]"#,
        )
        .expect("valid roster");

        assert_eq!(directory.len(), 2);
        let inactive = directory.get_staff(3).await.expect("lookup").expect("present");
        assert_eq!(inactive.status, StaffStatus::Inactive);
        assert!(directory.get_staff(9).await.expect("lookup").is_none());
    }

    #[test]
    fn malformed_roster_is_rejected() {
        assert!(MemoryDirectory::from_json(r#"[{"id": 1}]"#).is_err());
        assert!(MemoryDirectory::from_json("[]").expect("empty roster").is_empty());
    }
}
