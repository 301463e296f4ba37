use crate::api::leave_balance::{BalanceQuery, BalanceResponse, OpenBalance};
use crate::api::leave_request::{
    ApproveLeave, BindSubstitute, CoverageResponse, CreateLeave, LeaveListQuery,
    LeaveListResponse, LeaveResponse, ReviewNotes, SubstituteListResponse,
};
use crate::model::commitment::CommitmentKind;
use crate::model::coverage::CoverageCandidate;
use crate::model::leave_request::{HalfDaySegment, LeaveCategory, LeaveStatus};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "HRM Leave & Coverage API",
        version = "1.0.0",
        description = r#"
## Leave & Coverage

Leave requests for teaching staff, with balance accounting and substitute cover.

### 🔹 Key Features
- **Leave Requests**
  - Apply for full or half-day leave, approve, reject or cancel
  - Conflict snapshot against timetable, exam duties and calendar events
- **Coverage**
  - Ranked substitute suggestions and substitute binding
- **Leave Balances**
  - Per category and accounting period, in steps of half a day

### 🔐 Security
All endpoints require a **JWT Bearer** access token.
Reviewing, ranking, binding and opening balances need the **HR** or **Admin** role.

### 📦 Response Format
- JSON-based RESTful responses
- Errors carry a stable `error` code and a readable `message`
"#,
    ),
    paths(
        crate::api::leave_request::leave_list,
        crate::api::leave_request::get_leave,
        crate::api::leave_request::create_leave,
        crate::api::leave_request::approve_leave,
        crate::api::leave_request::reject_leave,
        crate::api::leave_request::cancel_leave,

        crate::api::leave_request::list_substitutes,
        crate::api::leave_request::bind_substitute,
        crate::api::leave_request::get_coverage,

        crate::api::leave_balance::get_balance,
        crate::api::leave_balance::open_balance
    ),
    components(
        schemas(
            CreateLeave,
            LeaveListQuery,
            ReviewNotes,
            ApproveLeave,
            BindSubstitute,
            LeaveResponse,
            LeaveListResponse,
            CoverageResponse,
            SubstituteListResponse,
            CoverageCandidate,
            BalanceQuery,
            OpenBalance,
            BalanceResponse,
            LeaveCategory,
            LeaveStatus,
            HalfDaySegment,
            CommitmentKind
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Leave", description = "Leave request lifecycle APIs"),
        (name = "Coverage", description = "Substitute suggestion and binding APIs"),
        (name = "Leave Balance", description = "Leave balance APIs"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_leave_paths() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/api/leave"));
        assert!(doc.paths.paths.contains_key("/api/leave/{leave_id}/substitutes"));
        assert!(doc.paths.paths.contains_key("/api/leave-balance/{employee_id}"));
    }
}
