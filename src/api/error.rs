use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::{Value, json};

use crate::leave::LeaveError;

impl ResponseError for LeaveError {
    fn status_code(&self) -> StatusCode {
        match self {
            LeaveError::Validation { .. } => StatusCode::BAD_REQUEST,
            LeaveError::NotFound { .. } => StatusCode::NOT_FOUND,
            LeaveError::InvalidTransition { .. } | LeaveError::Conflict { .. } => {
                StatusCode::CONFLICT
            }
            LeaveError::InsufficientBalance { .. }
            | LeaveError::SubstituteRequired { .. }
            | LeaveError::SubstituteUnavailable { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            LeaveError::StoreTimeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            LeaveError::Store(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, code = self.code(), "Leave operation failed");
        }

        let mut body = json!({
            "error": self.code(),
            "message": self.public_message(),
        });
        if let (Value::Object(map), Value::Object(context)) = (&mut body, self.context()) {
            map.extend(context);
        }
        HttpResponse::build(status).json(body)
    }
}

impl LeaveError {
    /// Backend details stay in the log.
    fn public_message(&self) -> String {
        match self {
            LeaveError::Store(_) => "Storage is temporarily unavailable".to_string(),
            other => other.to_string(),
        }
    }

    fn context(&self) -> Value {
        match self {
            LeaveError::Validation { field, .. } => json!({ "field": field }),
            LeaveError::InsufficientBalance {
                category,
                period_id,
                requested,
                available,
                ..
            } => json!({
                "category": category,
                "period_id": period_id,
                "requested": requested.as_f64(),
                "available": available.as_f64(),
            }),
            LeaveError::InvalidTransition {
                leave_id,
                current,
                attempted,
                ..
            } => json!({
                "leave_id": leave_id,
                "current_status": current,
                "attempted": attempted,
            }),
            LeaveError::SubstituteRequired { leave_id } => json!({ "leave_id": leave_id }),
            LeaveError::SubstituteUnavailable { substitute_id, .. } => {
                json!({ "substitute_id": substitute_id })
            }
            _ => json!({}),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::leave::error::TransitionBlock;
    use crate::leave::state::LeaveAction;
    use crate::leave::units::LeaveUnits;
    use crate::model::leave_request::{LeaveCategory, LeaveStatus};
    use actix_web::body::to_bytes;

    async fn body_of(err: LeaveError) -> (StatusCode, Value) {
        let response = err.error_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body()).await.expect("body");
        (status, serde_json::from_slice(&bytes).expect("json body"))
    }

    #[actix_web::test]
    async fn insufficient_balance_is_unprocessable_with_amounts() {
        let (status, body) = body_of(LeaveError::InsufficientBalance {
            staff_id: 3,
            category: LeaveCategory::Sick,
            period_id: "2026".to_string(),
            requested: LeaveUnits::days(2),
            available: LeaveUnits::HALF_DAY,
        })
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"], "insufficient_balance");
        assert_eq!(body["requested"], 2.0);
        assert_eq!(body["available"], 0.5);
    }

    #[actix_web::test]
    async fn invalid_transition_is_conflict() {
        let (status, body) = body_of(LeaveError::InvalidTransition {
            leave_id: 5,
            current: LeaveStatus::Approved,
            attempted: LeaveAction::Reject,
            reason: TransitionBlock::StatusMismatch,
        })
        .await;

        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["current_status"], "approved");
        assert_eq!(body["attempted"], "reject");
    }

    #[actix_web::test]
    async fn store_failures_hide_backend_details() {
        let (status, body) = body_of(LeaveError::Store("connection reset by peer".into())).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error"], "store_error");
        assert_eq!(body["message"], "Storage is temporarily unavailable");

        let (status, _) = body_of(LeaveError::StoreTimeout {
            operation: "commit",
            after_ms: 5000,
        })
        .await;
        assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
    }
}
