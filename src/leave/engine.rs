use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use tracing::{debug, info, instrument};

use crate::leave::binder::CoverageBinder;
use crate::leave::clock::Clock;
use crate::leave::conflict::ConflictDetector;
use crate::leave::error::{LeaveError, TransitionBlock};
use crate::leave::ledger::{self, LedgerError};
use crate::leave::ranker::{ScoringPolicy, SubstituteRanker};
use crate::leave::sources::{CommitmentRepository, StaffDirectory};
use crate::leave::state::{self, LeaveAction};
use crate::leave::store::{
    CoverageChange, LedgerChange, LeaveStore, StoreError, Transition, timed,
};
use crate::leave::units::{LeaveUnits, LeaveWindow};
use crate::model::coverage::{CoverageAssignment, CoverageCandidate};
use crate::model::leave_balance::{BalanceKey, LeaveBalanceEntry};
use crate::model::leave_request::{
    ActionStamp, HalfDaySegment, LeaveCategory, LeaveFilter, LeaveRequest, LeaveRequestDraft,
    Page,
};

#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub store_timeout: Duration,
    pub source_timeout: Duration,
    pub sample_limit: usize,
    pub scoring: ScoringPolicy,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            store_timeout: Duration::from_secs(5),
            source_timeout: Duration::from_secs(2),
            sample_limit: 5,
            scoring: ScoringPolicy::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewLeaveRequest {
    pub requester_id: u64,
    pub category: LeaveCategory,
    pub period_id: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub half_day: Option<HalfDaySegment>,
    pub reason: String,
    pub attachments: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct SubstituteChoice {
    pub substitute_id: u64,
    pub notes: Option<String>,
}

#[derive(Debug, Clone)]
pub enum ReviewDecision {
    /// `substitute` binds coverage in the same commit as the approval.
    Approve {
        reviewer_id: u64,
        notes: Option<String>,
        substitute: Option<SubstituteChoice>,
    },
    /// Notes are recommended; enforcing them is left to the caller.
    Reject {
        reviewer_id: u64,
        notes: Option<String>,
    },
}

/// Leave & coverage engine. Every public operation is one store transaction.
pub struct LeaveEngine {
    store: Arc<dyn LeaveStore>,
    directory: Arc<dyn StaffDirectory>,
    detector: ConflictDetector,
    ranker: SubstituteRanker,
    binder: CoverageBinder,
    clock: Arc<dyn Clock>,
    store_timeout: Duration,
}

impl LeaveEngine {
    pub fn new(
        store: Arc<dyn LeaveStore>,
        directory: Arc<dyn StaffDirectory>,
        commitments: Arc<dyn CommitmentRepository>,
        clock: Arc<dyn Clock>,
        settings: EngineSettings,
    ) -> Self {
        Self {
            detector: ConflictDetector::new(
                commitments,
                settings.source_timeout,
                settings.sample_limit,
            ),
            ranker: SubstituteRanker::new(settings.scoring),
            binder: CoverageBinder::new(store.clone(), directory.clone(), settings.store_timeout),
            store,
            directory,
            clock,
            store_timeout: settings.store_timeout,
        }
    }

    #[instrument(
        name = "create_leave_request",
        skip(self, input),
        fields(requester_id = input.requester_id, category = %input.category)
    )]
    pub async fn create_leave_request(
        &self,
        input: NewLeaveRequest,
    ) -> Result<LeaveRequest, LeaveError> {
        let window = LeaveWindow::new(input.start_date, input.end_date, input.half_day)?;
        let reason = required("reason", &input.reason)?;
        let period_id = required("period_id", &input.period_id)?;
        if input.attachments.iter().any(|a| a.trim().is_empty()) {
            return Err(LeaveError::Validation {
                field: "attachments",
                message: "attachment references cannot be blank".to_string(),
            });
        }

        timed(
            "get_staff",
            self.store_timeout,
            self.directory.get_staff(input.requester_id),
        )
        .await?
        .ok_or_else(|| LeaveError::not_found("staff", input.requester_id))?;

        let key = BalanceKey::new(input.requester_id, input.category, period_id.clone());
        let requested = window.units();
        let entry = timed("balance", self.store_timeout, self.store.balance(&key)).await?;
        ledger::check_sufficient(entry.as_ref(), requested)
            .map_err(|e| insufficient(&key, e))?;

        let report = self.detector.detect(input.requester_id, &window.span()).await;

        let draft = LeaveRequestDraft {
            requester_id: input.requester_id,
            category: input.category,
            period_id,
            window,
            reason,
            attachments: input.attachments,
            conflicts: report.findings,
            degraded_sources: report.degraded_sources,
            created_at: self.clock.now(),
        };
        let request = timed(
            "insert_request",
            self.store_timeout,
            self.store.insert_request(draft),
        )
        .await?;

        info!(
            leave_id = request.id,
            units = %request.total_units(),
            conflicts = request.conflicts.len(),
            degraded = request.is_degraded(),
            "Leave request created"
        );
        Ok(request)
    }

    #[instrument(name = "review_leave_request", skip(self, decision))]
    pub async fn review_leave_request(
        &self,
        leave_id: u64,
        decision: ReviewDecision,
    ) -> Result<LeaveRequest, LeaveError> {
        let request = self.load(leave_id).await?;
        let now = self.clock.now();

        match decision {
            ReviewDecision::Approve {
                reviewer_id,
                notes,
                substitute,
            } => {
                let next = state::guard(&request, LeaveAction::Approve)?;

                let coverage = match substitute {
                    Some(choice) => {
                        self.binder
                            .check_available(&request, choice.substitute_id)
                            .await?;
                        Some(CoverageChange::Bind(CoverageBinder::assignment(
                            &request,
                            choice.substitute_id,
                            reviewer_id,
                            choice.notes,
                            now,
                        )))
                    }
                    None => None,
                };

                if request.has_conflicts() && coverage.is_none() && request.substitute_id.is_none() {
                    return Err(LeaveError::SubstituteRequired { leave_id });
                }

                let key = balance_key(&request);
                let mut transition = Transition::new(&request, next, now);
                transition.review = Some(ActionStamp {
                    actor_id: reviewer_id,
                    at: now,
                    notes,
                });
                transition.ledger = Some(LedgerChange::Debit {
                    key: key.clone(),
                    units: request.total_units(),
                });
                transition.coverage = coverage;

                let approved = self
                    .commit(&request, LeaveAction::Approve, Some(&key), transition)
                    .await?;
                info!(leave_id, reviewer_id, substitute_id = ?approved.substitute_id, "Leave approved");
                Ok(approved)
            }
            ReviewDecision::Reject { reviewer_id, notes } => {
                let next = state::guard(&request, LeaveAction::Reject)?;
                let mut transition = Transition::new(&request, next, now);
                transition.review = Some(ActionStamp {
                    actor_id: reviewer_id,
                    at: now,
                    notes,
                });

                let rejected = self
                    .commit(&request, LeaveAction::Reject, None, transition)
                    .await?;
                info!(leave_id, reviewer_id, "Leave rejected");
                Ok(rejected)
            }
        }
    }

    /// Only approved leave that has not started yet can be cancelled.
    #[instrument(name = "cancel_leave_request", skip(self, notes))]
    pub async fn cancel_leave_request(
        &self,
        leave_id: u64,
        cancelled_by: u64,
        notes: Option<String>,
    ) -> Result<LeaveRequest, LeaveError> {
        let request = self.load(leave_id).await?;
        let next = state::guard(&request, LeaveAction::Cancel)?;

        let today = self.clock.today();
        if today >= request.start_date {
            return Err(LeaveError::InvalidTransition {
                leave_id,
                current: request.status,
                attempted: LeaveAction::Cancel,
                reason: TransitionBlock::AlreadyStarted {
                    start_date: request.start_date,
                    today,
                },
            });
        }

        let now = self.clock.now();
        let key = balance_key(&request);
        let mut transition = Transition::new(&request, next, now);
        transition.cancellation = Some(ActionStamp {
            actor_id: cancelled_by,
            at: now,
            notes,
        });
        transition.ledger = Some(LedgerChange::Credit {
            key: key.clone(),
            units: request.total_units(),
        });
        if request.substitute_id.is_some() {
            transition.coverage = Some(CoverageChange::Release);
        }

        let cancelled = self
            .commit(&request, LeaveAction::Cancel, Some(&key), transition)
            .await?;
        info!(leave_id, cancelled_by, "Leave cancelled");
        Ok(cancelled)
    }

    /// Candidates for a conflicted request. A request without conflicts needs
    /// no coverage and yields an empty list.
    #[instrument(name = "rank_substitutes", skip(self))]
    pub async fn rank_substitutes(
        &self,
        leave_id: u64,
    ) -> Result<Vec<CoverageCandidate>, LeaveError> {
        let request = self.load(leave_id).await?;
        state::guard(&request, LeaveAction::BindSubstitute)?;

        if !request.has_conflicts() {
            debug!(leave_id, "No conflicts, nothing to rank");
            return Ok(Vec::new());
        }

        let requester = timed(
            "get_staff",
            self.store_timeout,
            self.directory.get_staff(request.requester_id),
        )
        .await?
        .ok_or_else(|| LeaveError::not_found("staff", request.requester_id))?;

        let pool = timed("list_staff", self.store_timeout, self.directory.list_staff()).await?;
        let on_leave: HashSet<u64> = timed(
            "approved_leave_overlapping",
            self.store_timeout,
            self.store.approved_leave_overlapping(request.span(), None),
        )
        .await?
        .into_iter()
        .map(|leave| leave.staff_id)
        .collect();

        let candidates = self.ranker.rank(&requester, &pool, &on_leave);
        debug!(leave_id, candidates = candidates.len(), "Substitutes ranked");
        Ok(candidates)
    }

    /// Binds or replaces the substitute for a pending or approved request.
    #[instrument(name = "bind_substitute", skip(self, notes))]
    pub async fn bind_substitute(
        &self,
        leave_id: u64,
        substitute_id: u64,
        assigned_by: u64,
        notes: Option<String>,
    ) -> Result<CoverageAssignment, LeaveError> {
        let request = self.load(leave_id).await?;
        let next = state::guard(&request, LeaveAction::BindSubstitute)?;
        self.binder.check_available(&request, substitute_id).await?;

        let now = self.clock.now();
        let assignment =
            CoverageBinder::assignment(&request, substitute_id, assigned_by, notes, now);
        let mut transition = Transition::new(&request, next, now);
        transition.coverage = Some(CoverageChange::Bind(assignment.clone()));

        self.commit(&request, LeaveAction::BindSubstitute, None, transition)
            .await?;
        info!(leave_id, substitute_id, assigned_by, "Substitute bound");
        Ok(assignment)
    }

    pub async fn get_leave_balance(
        &self,
        staff_id: u64,
        period_id: &str,
    ) -> Result<Vec<LeaveBalanceEntry>, LeaveError> {
        let period_id = required("period_id", period_id)?;
        Ok(timed(
            "balances_for",
            self.store_timeout,
            self.store.balances_for(staff_id, &period_id),
        )
        .await?)
    }

    /// Opens the ledger row for one staff member, category and period.
    pub async fn open_leave_balance(
        &self,
        key: BalanceKey,
        allocated: LeaveUnits,
        carried_forward: LeaveUnits,
    ) -> Result<LeaveBalanceEntry, LeaveError> {
        required("period_id", &key.period_id)?;
        let entry = LeaveBalanceEntry::open(key, allocated, carried_forward);
        let opened = timed(
            "open_balance",
            self.store_timeout,
            self.store.open_balance(entry),
        )
        .await?;
        info!(
            staff_id = opened.key.staff_id,
            category = %opened.key.category,
            period_id = %opened.key.period_id,
            available = %opened.available(),
            "Leave balance opened"
        );
        Ok(opened)
    }

    pub async fn get_leave_request(&self, leave_id: u64) -> Result<LeaveRequest, LeaveError> {
        self.load(leave_id).await
    }

    pub async fn list_leave_requests(
        &self,
        filter: &LeaveFilter,
    ) -> Result<Page<LeaveRequest>, LeaveError> {
        Ok(timed(
            "list_requests",
            self.store_timeout,
            self.store.list_requests(filter),
        )
        .await?)
    }

    pub async fn coverage_assignment(
        &self,
        leave_id: u64,
    ) -> Result<Option<CoverageAssignment>, LeaveError> {
        Ok(timed(
            "assignment",
            self.store_timeout,
            self.store.assignment(leave_id),
        )
        .await?)
    }

    async fn load(&self, leave_id: u64) -> Result<LeaveRequest, LeaveError> {
        timed(
            "get_request",
            self.store_timeout,
            self.store.get_request(leave_id),
        )
        .await?
        .ok_or_else(|| LeaveError::not_found("leave_request", leave_id))
    }

    async fn commit(
        &self,
        request: &LeaveRequest,
        action: LeaveAction,
        key: Option<&BalanceKey>,
        transition: Transition,
    ) -> Result<LeaveRequest, LeaveError> {
        timed("commit", self.store_timeout, self.store.commit(transition))
            .await
            .map_err(|e| match (e, key) {
                (StoreError::StatusConflict { leave_id, current }, _) => {
                    LeaveError::InvalidTransition {
                        leave_id,
                        current,
                        attempted: action,
                        reason: TransitionBlock::StatusMismatch,
                    }
                }
                (StoreError::Ledger(e), Some(key)) => insufficient(key, e),
                (other, _) => {
                    debug!(leave_id = request.id, error = %other, "Commit failed");
                    other.into()
                }
            })
    }
}

fn balance_key(request: &LeaveRequest) -> BalanceKey {
    BalanceKey::new(request.requester_id, request.category, request.period_id.clone())
}

fn insufficient(key: &BalanceKey, err: LedgerError) -> LeaveError {
    match err {
        LedgerError::InsufficientBalance {
            requested,
            available,
        } => LeaveError::InsufficientBalance {
            staff_id: key.staff_id,
            category: key.category,
            period_id: key.period_id.clone(),
            requested,
            available,
        },
    }
}

fn required(field: &'static str, value: &str) -> Result<String, LeaveError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(LeaveError::Validation {
            field,
            message: format!("{field} is required"),
        });
    }
    Ok(trimmed.to_string())
}
