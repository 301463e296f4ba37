use crate::auth::auth::AuthUser;
use crate::leave::LeaveEngine;
use crate::leave::units::LeaveUnits;
use crate::model::leave_balance::{BalanceKey, LeaveBalanceEntry};
use crate::model::leave_request::LeaveCategory;
use actix_web::{HttpResponse, Responder, web};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct BalanceQuery {
    /// Accounting period to report
    #[schema(example = "2025-26")]
    pub period_id: String,
}

#[derive(Deserialize, ToSchema)]
pub struct OpenBalance {
    #[schema(example = 1000)]
    pub employee_id: u64,
    #[schema(example = "earned")]
    pub category: LeaveCategory,
    #[schema(example = "2025-26")]
    pub period_id: String,
    /// Days granted for the period, in steps of 0.5
    #[schema(example = 12.0, value_type = f64)]
    pub allocated: LeaveUnits,
    #[serde(default)]
    #[schema(example = 2.5, value_type = f64)]
    pub carried_forward: LeaveUnits,
}

#[derive(Serialize, ToSchema)]
pub struct BalanceResponse {
    #[schema(example = 1000)]
    pub employee_id: u64,
    #[schema(example = "earned")]
    pub category: LeaveCategory,
    #[schema(example = "2025-26")]
    pub period_id: String,
    #[schema(example = 12.0)]
    pub allocated: f64,
    #[schema(example = 2.5)]
    pub carried_forward: f64,
    #[schema(example = 4.0)]
    pub consumed: f64,
    #[schema(example = 10.5)]
    pub available: f64,
}

impl From<LeaveBalanceEntry> for BalanceResponse {
    fn from(entry: LeaveBalanceEntry) -> Self {
        let available = entry.available().as_f64();
        Self {
            employee_id: entry.key.staff_id,
            category: entry.key.category,
            period_id: entry.key.period_id,
            allocated: entry.allocated.as_f64(),
            carried_forward: entry.carried_forward.as_f64(),
            consumed: entry.consumed.as_f64(),
            available,
        }
    }
}

/// Balances for every leave category an employee holds in a period.
#[utoipa::path(
    get,
    path = "/api/leave-balance/{employee_id}",
    params(
        ("employee_id" = u64, Path, description = "Employee whose balances to show"),
        BalanceQuery
    ),
    responses(
        (status = 200, description = "Balances per category", body = [BalanceResponse]),
        (status = 400, description = "Missing period"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Not visible to the caller")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave Balance"
)]
pub async fn get_balance(
    auth: AuthUser,
    engine: web::Data<LeaveEngine>,
    path: web::Path<u64>,
    query: web::Query<BalanceQuery>,
) -> actix_web::Result<impl Responder> {
    let employee_id = path.into_inner();
    if !auth.can_view(employee_id) {
        return Ok(HttpResponse::NotFound().json(serde_json::json!({
            "error": "not_found",
            "message": format!("employee {employee_id} not found")
        })));
    }

    let entries = engine
        .get_leave_balance(employee_id, &query.period_id)
        .await?;

    Ok(HttpResponse::Ok().json(
        entries
            .into_iter()
            .map(BalanceResponse::from)
            .collect::<Vec<_>>(),
    ))
}

/// Opens a category balance for a period (HR/Admin).
#[utoipa::path(
    post,
    path = "/api/leave-balance",
    request_body(content = OpenBalance, content_type = "application/json"),
    responses(
        (status = 201, description = "Balance opened", body = BalanceResponse),
        (status = 400, description = "Invalid payload"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 409, description = "Balance already exists for the period")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave Balance"
)]
pub async fn open_balance(
    auth: AuthUser,
    engine: web::Data<LeaveEngine>,
    payload: web::Json<OpenBalance>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let payload = payload.into_inner();
    let opened = engine
        .open_leave_balance(
            BalanceKey::new(payload.employee_id, payload.category, payload.period_id),
            payload.allocated,
            payload.carried_forward,
        )
        .await?;

    Ok(HttpResponse::Created().json(BalanceResponse::from(opened)))
}
