use crate::auth::auth::AuthUser;
use crate::leave::{LeaveEngine, LeaveError, NewLeaveRequest, ReviewDecision, SubstituteChoice};
use crate::model::commitment::CommitmentKind;
use crate::model::conflict::ConflictFinding;
use crate::model::coverage::{CoverageAssignment, CoverageCandidate};
use crate::model::leave_request::{
    HalfDaySegment, LeaveCategory, LeaveFilter, LeaveRequest, LeaveStatus,
};
use actix_web::{HttpResponse, Responder, web};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Deserialize, ToSchema)]
pub struct CreateLeave {
    #[schema(example = "casual")]
    pub category: LeaveCategory,
    /// Accounting period the leave is charged against
    #[schema(example = "2025-26")]
    pub period_id: String,
    #[schema(example = "2026-01-05", format = "date", value_type = String)]
    pub start_date: NaiveDate,
    #[schema(example = "2026-01-07", format = "date", value_type = String)]
    pub end_date: NaiveDate,
    /// Only for single-day requests
    #[schema(example = json!(null))]
    pub half_day: Option<HalfDaySegment>,
    #[schema(example = "Family function")]
    pub reason: String,
    #[serde(default)]
    #[schema(example = json!(["doc:118"]))]
    pub attachments: Vec<String>,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct LeaveListQuery {
    #[schema(example = 123)]
    /// Filter by employee ID (reviewers only, staff always see their own)
    pub employee_id: Option<u64>,
    #[schema(example = "pending")]
    /// Filter by leave status
    pub status: Option<LeaveStatus>,
    #[schema(example = 1)]
    /// Pagination page number (start with 1)
    pub page: Option<u64>,
    #[schema(example = 10)]
    /// Items per page, at most 100
    pub per_page: Option<u64>,
}

#[derive(Deserialize, ToSchema, Default)]
pub struct ReviewNotes {
    #[schema(example = "Enjoy the break")]
    pub notes: Option<String>,
}

#[derive(Deserialize, ToSchema, Default)]
pub struct ApproveLeave {
    #[schema(example = "Approved")]
    pub notes: Option<String>,
    /// Binds this substitute in the same step as the approval
    #[schema(example = 1042)]
    pub substitute_id: Option<u64>,
    pub substitute_notes: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct BindSubstitute {
    #[schema(example = 1042)]
    pub substitute_id: u64,
    #[schema(example = "Covers periods 2 and 5")]
    pub notes: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct LeaveResponse {
    #[schema(example = 1)]
    /// leave application id
    pub id: u64,
    /// employee id for whom the leave is applied
    #[schema(example = 1000)]
    pub employee_id: u64,
    #[schema(example = "casual")]
    pub category: LeaveCategory,
    #[schema(example = "2025-26")]
    pub period_id: String,
    #[schema(example = "2026-01-05", format = "date", value_type = String)]
    pub start_date: NaiveDate,
    #[schema(example = "2026-01-07", format = "date", value_type = String)]
    pub end_date: NaiveDate,
    pub half_day: Option<HalfDaySegment>,
    /// Leave quantity in days, in steps of 0.5
    #[schema(example = 3.0)]
    pub total_days: f64,
    pub reason: String,
    pub attachments: Vec<String>,
    #[schema(example = "pending")]
    pub status: LeaveStatus,
    /// Conflict snapshot taken when the request was filed
    #[schema(value_type = Vec<Object>)]
    pub conflicts: Vec<ConflictFinding>,
    /// Sources that could not be checked when the request was filed
    pub degraded_sources: Vec<CommitmentKind>,
    #[schema(example = json!(null))]
    pub substitute_id: Option<u64>,
    pub reviewed_by: Option<u64>,
    #[schema(format = "date-time", value_type = Option<String>)]
    pub reviewed_at: Option<DateTime<Utc>>,
    pub review_notes: Option<String>,
    pub cancelled_by: Option<u64>,
    #[schema(format = "date-time", value_type = Option<String>)]
    pub cancelled_at: Option<DateTime<Utc>>,
    #[schema(example = "2026-01-01T00:00:00Z", format = "date-time", value_type = String)]
    pub created_at: DateTime<Utc>,
    #[schema(example = "2026-01-01T00:00:00Z", format = "date-time", value_type = String)]
    pub updated_at: DateTime<Utc>,
}

impl From<LeaveRequest> for LeaveResponse {
    fn from(request: LeaveRequest) -> Self {
        let total_days = request.total_units().as_f64();
        let review = request.review;
        let cancellation = request.cancellation;
        Self {
            id: request.id,
            employee_id: request.requester_id,
            category: request.category,
            period_id: request.period_id,
            start_date: request.start_date,
            end_date: request.end_date,
            half_day: request.half_day,
            total_days,
            reason: request.reason,
            attachments: request.attachments,
            status: request.status,
            conflicts: request.conflicts,
            degraded_sources: request.degraded_sources,
            substitute_id: request.substitute_id,
            reviewed_by: review.as_ref().map(|s| s.actor_id),
            reviewed_at: review.as_ref().map(|s| s.at),
            review_notes: review.and_then(|s| s.notes),
            cancelled_by: cancellation.as_ref().map(|s| s.actor_id),
            cancelled_at: cancellation.as_ref().map(|s| s.at),
            created_at: request.created_at,
            updated_at: request.updated_at,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct LeaveListResponse {
    pub data: Vec<LeaveResponse>,
    #[schema(example = 1)]
    pub page: u64,
    #[schema(example = 10)]
    pub per_page: u64,
    #[schema(example = 1)]
    pub total: u64,
}

#[derive(Serialize, ToSchema)]
pub struct CoverageResponse {
    #[schema(example = 12)]
    pub leave_request_id: u64,
    #[schema(example = 1042)]
    pub substitute_id: u64,
    pub assigned_by: u64,
    #[schema(example = "2026-01-02T09:30:00Z", format = "date-time", value_type = String)]
    pub assigned_at: DateTime<Utc>,
    pub notes: Option<String>,
    pub active: bool,
}

impl From<CoverageAssignment> for CoverageResponse {
    fn from(assignment: CoverageAssignment) -> Self {
        Self {
            leave_request_id: assignment.leave_request_id,
            substitute_id: assignment.substitute_id,
            assigned_by: assignment.assigned_by,
            assigned_at: assignment.assigned_at,
            notes: assignment.notes,
            active: assignment.active,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct SubstituteListResponse {
    #[schema(example = 12)]
    pub leave_request_id: u64,
    /// Best first. Empty when the request has no conflicts.
    pub candidates: Vec<CoverageCandidate>,
}

/* =========================
Create leave request
========================= */
#[utoipa::path(
    post,
    path = "/api/leave",
    request_body(
        content = CreateLeave,
        description = "Leave request payload",
        content_type = "application/json"
    ),
    responses(
        (status = 201, description = "Leave request submitted", body = LeaveResponse),
        (status = 400, description = "Invalid dates, half-day or missing fields"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "No employee profile"),
        (status = 422, description = "Insufficient balance", body = Object, example = json!({
            "error": "insufficient_balance",
            "message": "insufficient casual balance for staff 1000 in period 2025-26: requested 3, available 1.5",
            "category": "casual",
            "period_id": "2025-26",
            "requested": 3.0,
            "available": 1.5
        }))
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn create_leave(
    auth: AuthUser,
    engine: web::Data<LeaveEngine>,
    payload: web::Json<CreateLeave>,
) -> actix_web::Result<impl Responder> {
    let employee_id = auth.employee()?;
    let payload = payload.into_inner();

    let created = engine
        .create_leave_request(NewLeaveRequest {
            requester_id: employee_id,
            category: payload.category,
            period_id: payload.period_id,
            start_date: payload.start_date,
            end_date: payload.end_date,
            half_day: payload.half_day,
            reason: payload.reason,
            attachments: payload.attachments,
        })
        .await?;

    Ok(HttpResponse::Created().json(LeaveResponse::from(created)))
}

/* =========================
Approve leave (HR/Admin)
========================= */
#[utoipa::path(
    put,
    path = "/api/leave/{leave_id}/approve",
    params(
        ("leave_id" = u64, Path, description = "ID of the leave request to approve")
    ),
    request_body(content = ApproveLeave, content_type = "application/json"),
    responses(
        (status = 200, description = "Leave approved", body = LeaveResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Leave request not found"),
        (status = 409, description = "Leave request already processed"),
        (status = 422, description = "Substitute required or balance insufficient")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn approve_leave(
    auth: AuthUser,
    engine: web::Data<LeaveEngine>,
    path: web::Path<u64>,
    payload: Option<web::Json<ApproveLeave>>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let leave_id = path.into_inner();
    let payload = payload.map(web::Json::into_inner).unwrap_or_default();

    let approved = engine
        .review_leave_request(
            leave_id,
            ReviewDecision::Approve {
                reviewer_id: auth.actor_id(),
                notes: payload.notes,
                substitute: payload.substitute_id.map(|substitute_id| SubstituteChoice {
                    substitute_id,
                    notes: payload.substitute_notes,
                }),
            },
        )
        .await?;

    Ok(HttpResponse::Ok().json(LeaveResponse::from(approved)))
}

/* =========================
Reject leave (HR/Admin)
========================= */
#[utoipa::path(
    put,
    path = "/api/leave/{leave_id}/reject",
    params(
        ("leave_id" = u64, Path, description = "ID of the leave request to reject")
    ),
    request_body(content = ReviewNotes, content_type = "application/json"),
    responses(
        (status = 200, description = "Leave rejected", body = LeaveResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Leave request not found"),
        (status = 409, description = "Leave request already processed")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn reject_leave(
    auth: AuthUser,
    engine: web::Data<LeaveEngine>,
    path: web::Path<u64>,
    payload: Option<web::Json<ReviewNotes>>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let leave_id = path.into_inner();
    let notes = payload.and_then(|p| p.into_inner().notes);
    if notes.is_none() {
        tracing::debug!(leave_id, "Rejecting without notes");
    }

    let rejected = engine
        .review_leave_request(
            leave_id,
            ReviewDecision::Reject {
                reviewer_id: auth.actor_id(),
                notes,
            },
        )
        .await?;

    Ok(HttpResponse::Ok().json(LeaveResponse::from(rejected)))
}

/* =========================
Cancel approved leave (HR/Admin or requester)
========================= */
#[utoipa::path(
    put,
    path = "/api/leave/{leave_id}/cancel",
    params(
        ("leave_id" = u64, Path, description = "ID of the approved leave to cancel")
    ),
    request_body(content = ReviewNotes, content_type = "application/json"),
    responses(
        (status = 200, description = "Leave cancelled and balance restored", body = LeaveResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Leave request not found"),
        (status = 409, description = "Not approved, or already started")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn cancel_leave(
    auth: AuthUser,
    engine: web::Data<LeaveEngine>,
    path: web::Path<u64>,
    payload: Option<web::Json<ReviewNotes>>,
) -> actix_web::Result<impl Responder> {
    let leave_id = path.into_inner();

    let request = engine.get_leave_request(leave_id).await?;
    auth.require_view(request.requester_id, leave_id)?;

    let cancelled = engine
        .cancel_leave_request(
            leave_id,
            auth.actor_id(),
            payload.and_then(|p| p.into_inner().notes),
        )
        .await?;

    Ok(HttpResponse::Ok().json(LeaveResponse::from(cancelled)))
}

/* =========================
Substitute suggestions (HR/Admin)
========================= */
#[utoipa::path(
    get,
    path = "/api/leave/{leave_id}/substitutes",
    params(
        ("leave_id" = u64, Path, description = "ID of the leave request needing cover")
    ),
    responses(
        (status = 200, description = "Ranked substitute candidates", body = SubstituteListResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Leave request not found"),
        (status = 409, description = "Leave request is no longer open")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Coverage"
)]
pub async fn list_substitutes(
    auth: AuthUser,
    engine: web::Data<LeaveEngine>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let leave_id = path.into_inner();
    let candidates = engine.rank_substitutes(leave_id).await?;

    Ok(HttpResponse::Ok().json(SubstituteListResponse {
        leave_request_id: leave_id,
        candidates,
    }))
}

/* =========================
Bind substitute (HR/Admin)
========================= */
#[utoipa::path(
    put,
    path = "/api/leave/{leave_id}/substitute",
    params(
        ("leave_id" = u64, Path, description = "ID of the leave request to cover")
    ),
    request_body(content = BindSubstitute, content_type = "application/json"),
    responses(
        (status = 200, description = "Substitute bound", body = CoverageResponse),
        (status = 400, description = "Requester cannot cover their own leave"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Leave request or staff not found"),
        (status = 409, description = "Leave request is no longer open"),
        (status = 422, description = "Substitute unavailable")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Coverage"
)]
pub async fn bind_substitute(
    auth: AuthUser,
    engine: web::Data<LeaveEngine>,
    path: web::Path<u64>,
    payload: web::Json<BindSubstitute>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let leave_id = path.into_inner();
    let payload = payload.into_inner();

    let assignment = engine
        .bind_substitute(leave_id, payload.substitute_id, auth.actor_id(), payload.notes)
        .await?;

    Ok(HttpResponse::Ok().json(CoverageResponse::from(assignment)))
}

/// for getting a leave application details endpoint
#[utoipa::path(
    get,
    path = "/api/leave/{leave_id}",
    params(
        ("leave_id" = u64, Path, description = "ID of the leave request to fetch")
    ),
    responses(
        (status = 200, description = "Leave request found", body = LeaveResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Leave request not found", body = Object, example = json!({
            "error": "not_found",
            "message": "leave_request 12 not found"
        }))
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn get_leave(
    auth: AuthUser,
    engine: web::Data<LeaveEngine>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let leave_id = path.into_inner();

    let leave = engine.get_leave_request(leave_id).await?;
    auth.require_view(leave.requester_id, leave_id)?;

    Ok(HttpResponse::Ok().json(LeaveResponse::from(leave)))
}

/// for getting leave applications endpoint
#[utoipa::path(
    get,
    path = "/api/leave",
    params(LeaveListQuery),
    responses(
        (status = 200, description = "Paginated leave list, newest first", body = LeaveListResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn leave_list(
    auth: AuthUser,
    engine: web::Data<LeaveEngine>,
    query: web::Query<LeaveListQuery>,
) -> actix_web::Result<impl Responder> {
    let query = query.into_inner();

    // Staff only ever see their own requests.
    let requester_id = if auth.role.can_review() {
        query.employee_id
    } else {
        Some(auth.employee()?)
    };

    let filter = LeaveFilter::new(requester_id, query.status, query.page, query.per_page);
    let page = engine.list_leave_requests(&filter).await?;

    Ok(HttpResponse::Ok().json(LeaveListResponse {
        data: page.data.into_iter().map(LeaveResponse::from).collect(),
        page: page.page,
        per_page: page.per_page,
        total: page.total,
    }))
}

/// Current coverage binding, including released ones.
#[utoipa::path(
    get,
    path = "/api/leave/{leave_id}/substitute",
    params(
        ("leave_id" = u64, Path, description = "ID of the leave request")
    ),
    responses(
        (status = 200, description = "Coverage assignment", body = CoverageResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "No substitute bound")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Coverage"
)]
pub async fn get_coverage(
    auth: AuthUser,
    engine: web::Data<LeaveEngine>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let leave_id = path.into_inner();

    let leave = engine.get_leave_request(leave_id).await?;
    auth.require_view(leave.requester_id, leave_id)?;

    let assignment = engine
        .coverage_assignment(leave_id)
        .await?
        .ok_or_else(|| LeaveError::NotFound {
            resource: "coverage_assignment",
            id: leave_id.to_string(),
        })?;

    Ok(HttpResponse::Ok().json(CoverageResponse::from(assignment)))
}
