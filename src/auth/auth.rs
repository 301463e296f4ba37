use crate::auth::jwt::verify_token;
use crate::config::Config;
use crate::leave::LeaveError;
use crate::model::role::Role;
use actix_web::{FromRequest, HttpRequest, dev::Payload, error::ErrorUnauthorized, web::Data};
use futures::future::{Ready, ready};
use serde_json::json;

#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: u64,
    pub username: String,
    pub role: Role,

    /// Present only if this user is linked to an employee record
    pub employee_id: Option<u64>,
}

impl FromRequest for AuthUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let token = match req
            .headers()
            .get("Authorization")
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "))
        {
            Some(t) => t,
            None => return ready(Err(ErrorUnauthorized(json!({"error": "Missing token"})))),
        };

        let config = match req.app_data::<Data<Config>>() {
            Some(c) => c,
            None => {
                return ready(Err(actix_web::error::ErrorInternalServerError(
                    "Config missing",
                )));
            }
        };

        let claims = match verify_token(token, &config.jwt_secret) {
            Ok(c) => c,
            Err(e) => {
                tracing::debug!(error = %e, "Rejected bearer token");
                return ready(Err(ErrorUnauthorized(
                    json!({"error": "Invalid or expired token"}),
                )));
            }
        };

        let role = match Role::from_id(claims.role) {
            Some(r) => r,
            None => return ready(Err(ErrorUnauthorized(json!({"error": "Invalid role"})))),
        };

        ready(Ok(AuthUser {
            user_id: claims.user_id,
            username: claims.sub,
            role,
            employee_id: claims.employee_id,
        }))
    }
}

impl AuthUser {
    pub fn require_hr_or_admin(&self) -> actix_web::Result<()> {
        if self.role.can_review() {
            Ok(())
        } else {
            Err(actix_web::error::ErrorForbidden(
                json!({"error": "HR/Admin only"}),
            ))
        }
    }

    /// Staff id the caller acts as. Falls back to the user id for accounts
    /// without an employee link.
    pub fn actor_id(&self) -> u64 {
        self.employee_id.unwrap_or(self.user_id)
    }

    /// Employee id of the caller, needed to file leave for oneself.
    pub fn employee(&self) -> actix_web::Result<u64> {
        self.employee_id
            .ok_or_else(|| actix_web::error::ErrorForbidden(json!({"error": "No employee profile"})))
    }

    /// Reviewers see everything; staff only their own requests.
    pub fn can_view(&self, requester_id: u64) -> bool {
        self.role.can_review() || self.employee_id == Some(requester_id)
    }

    pub fn require_view(&self, requester_id: u64, leave_id: u64) -> Result<(), LeaveError> {
        if self.can_view(requester_id) {
            Ok(())
        } else {
            // Hide existence of other people's requests.
            Err(LeaveError::NotFound {
                resource: "leave_request",
                id: leave_id.to_string(),
            })
        }
    }
}
