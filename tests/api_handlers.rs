use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::web::{self, Data};
use actix_web::{App, test};
use chrono::{NaiveDate, Weekday};
use hrm_leave::auth::jwt::{Claims, TokenType};
use hrm_leave::config::Config;
use hrm_leave::leave::clock::FixedClock;
use hrm_leave::leave::units::LeaveUnits;
use hrm_leave::leave::{EngineSettings, LeaveEngine};
use hrm_leave::model::commitment::CommitmentItem;
use hrm_leave::model::leave_balance::BalanceKey;
use hrm_leave::model::leave_request::LeaveCategory;
use hrm_leave::model::staff::{StaffProfile, StaffStatus};
use hrm_leave::routes;
use hrm_leave::store::{MemoryCommitments, MemoryDirectory, MemoryStore};
use jsonwebtoken::{EncodingKey, Header, encode};
use serde_json::{Value, json};

const SECRET: &str = "handler-test-secret";
const TEACHER: u64 = 1;
const COLLEAGUE: u64 = 2;

fn config() -> Config {
    Config::from_lookup(|name| match name {
        "SERVER_ADDR" => Some("127.0.0.1:0".to_string()),
        "JWT_SECRET" => Some(SECRET.to_string()),
        "STORE_BACKEND" => Some("memory".to_string()),
        _ => None,
    })
    .expect("test config")
}

fn token(role: u8, employee_id: Option<u64>) -> String {
    let claims = Claims {
        user_id: 500 + u64::from(role),
        sub: format!("user-{role}"),
        role,
        exp: 4_102_444_800, // 2100-01-01
        token_type: TokenType::Access,
        employee_id,
    };
    let jwt = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .expect("encodable claims");
    format!("Bearer {jwt}")
}

fn hr() -> String {
    token(2, Some(900))
}

fn staff_token(employee_id: u64) -> String {
    token(3, Some(employee_id))
}

fn profile(id: u64, load: u32) -> StaffProfile {
    StaffProfile {
        id,
        status: StaffStatus::Active,
        department: "Science".to_string(),
        specialization: Some("Chemistry".to_string()),
        current_load: load,
        max_load: 20,
        subjects: vec!["CHE-10".to_string()],
    }
}

async fn engine() -> LeaveEngine {
    let commitments = MemoryCommitments::new().with_recurring(
        TEACHER,
        CommitmentItem::recurring("timetable:1", "CHE-10 (P1)", Weekday::Mon),
    );
    let engine = LeaveEngine::new(
        Arc::new(MemoryStore::new()),
        Arc::new(MemoryDirectory::new([profile(TEACHER, 10), profile(COLLEAGUE, 4)])),
        Arc::new(commitments),
        Arc::new(FixedClock::on(
            NaiveDate::from_ymd_opt(2026, 3, 2).expect("valid date"),
        )),
        EngineSettings::default(),
    );
    for staff_id in [TEACHER, COLLEAGUE] {
        engine
            .open_leave_balance(
                BalanceKey::new(staff_id, LeaveCategory::Casual, "2025-26"),
                LeaveUnits::days(4),
                LeaveUnits::ZERO,
            )
            .await
            .expect("balance opens");
    }
    engine
}

macro_rules! app {
    () => {
        test::init_service(
            App::new()
                .app_data(Data::new(engine().await))
                .app_data(Data::new(config()))
                .service(web::scope("/api").configure(routes::leave_routes)),
        )
        .await
    };
}

fn leave_body(start: &str, end: &str) -> Value {
    json!({
        "category": "casual",
        "period_id": "2025-26",
        "start_date": start,
        "end_date": end,
        "reason": "Conference"
    })
}

#[actix_web::test]
async fn requests_without_token_are_unauthorized() {
    let app = app!();
    let req = test::TestRequest::get().uri("/api/leave").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn staff_files_leave_for_themselves() {
    let app = app!();

    // Tuesday, no teaching
    let req = test::TestRequest::post()
        .uri("/api/leave")
        .insert_header(("Authorization", staff_token(TEACHER)))
        .set_json(leave_body("2026-03-10", "2026-03-10"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["employee_id"], TEACHER);
    assert_eq!(body["status"], "pending");
    assert_eq!(body["total_days"], 1.0);
    assert_eq!(body["conflicts"], json!([]));
}

#[actix_web::test]
async fn invalid_dates_are_bad_requests() {
    let app = app!();
    let req = test::TestRequest::post()
        .uri("/api/leave")
        .insert_header(("Authorization", staff_token(TEACHER)))
        .set_json(leave_body("2026-03-12", "2026-03-10"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "validation_error");
    assert_eq!(body["field"], "end_date");
}

#[actix_web::test]
async fn overdrawn_balance_is_unprocessable() {
    let app = app!();
    let req = test::TestRequest::post()
        .uri("/api/leave")
        .insert_header(("Authorization", staff_token(TEACHER)))
        .set_json(leave_body("2026-03-10", "2026-03-16"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "insufficient_balance");
    assert_eq!(body["requested"], 7.0);
    assert_eq!(body["available"], 4.0);
}

#[actix_web::test]
async fn review_flow_with_substitute() {
    let app = app!();

    // Monday, clashes with the weekly CHE-10 period
    let req = test::TestRequest::post()
        .uri("/api/leave")
        .insert_header(("Authorization", staff_token(TEACHER)))
        .set_json(leave_body("2026-03-09", "2026-03-09"))
        .to_request();
    let created: Value = test::call_and_read_body_json(&app, req).await;
    let id = created["id"].as_u64().expect("id");
    assert_eq!(created["conflicts"][0]["source"], "timetable");

    // staff cannot review
    let req = test::TestRequest::put()
        .uri(&format!("/api/leave/{id}/approve"))
        .insert_header(("Authorization", staff_token(COLLEAGUE)))
        .set_json(json!({}))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);

    let req = test::TestRequest::put()
        .uri(&format!("/api/leave/{id}/approve"))
        .insert_header(("Authorization", hr()))
        .set_json(json!({}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "substitute_required");

    let req = test::TestRequest::get()
        .uri(&format!("/api/leave/{id}/substitutes"))
        .insert_header(("Authorization", hr()))
        .to_request();
    let ranked: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(ranked["candidates"][0]["staff_id"], COLLEAGUE);

    let req = test::TestRequest::put()
        .uri(&format!("/api/leave/{id}/substitute"))
        .insert_header(("Authorization", hr()))
        .set_json(json!({ "substitute_id": COLLEAGUE }))
        .to_request();
    let bound: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(bound["substitute_id"], COLLEAGUE);
    assert_eq!(bound["active"], true);

    let req = test::TestRequest::put()
        .uri(&format!("/api/leave/{id}/approve"))
        .insert_header(("Authorization", hr()))
        .set_json(json!({ "notes": "Covered" }))
        .to_request();
    let approved: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(approved["status"], "approved");
    assert_eq!(approved["review_notes"], "Covered");

    // second decision loses
    let req = test::TestRequest::put()
        .uri(&format!("/api/leave/{id}/reject"))
        .insert_header(("Authorization", hr()))
        .set_json(json!({}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["current_status"], "approved");

    let req = test::TestRequest::get()
        .uri(&format!("/api/leave-balance/{TEACHER}?period_id=2025-26"))
        .insert_header(("Authorization", staff_token(TEACHER)))
        .to_request();
    let balances: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(balances[0]["available"], 3.0);
}

#[actix_web::test]
async fn requester_cancels_future_leave() {
    let app = app!();

    let req = test::TestRequest::post()
        .uri("/api/leave")
        .insert_header(("Authorization", staff_token(COLLEAGUE)))
        .set_json(leave_body("2026-03-10", "2026-03-11"))
        .to_request();
    let created: Value = test::call_and_read_body_json(&app, req).await;
    let id = created["id"].as_u64().expect("id");

    let req = test::TestRequest::put()
        .uri(&format!("/api/leave/{id}/approve"))
        .insert_header(("Authorization", hr()))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    // someone else's leave is invisible
    let req = test::TestRequest::put()
        .uri(&format!("/api/leave/{id}/cancel"))
        .insert_header(("Authorization", staff_token(TEACHER)))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::put()
        .uri(&format!("/api/leave/{id}/cancel"))
        .insert_header(("Authorization", staff_token(COLLEAGUE)))
        .set_json(json!({ "notes": "Trip cancelled" }))
        .to_request();
    let cancelled: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(cancelled["status"], "cancelled");
    assert_eq!(cancelled["cancelled_by"], COLLEAGUE);
}

#[actix_web::test]
async fn staff_list_only_their_own_requests() {
    let app = app!();
    for (employee, start) in [(TEACHER, "2026-03-10"), (COLLEAGUE, "2026-03-11")] {
        let req = test::TestRequest::post()
            .uri("/api/leave")
            .insert_header(("Authorization", staff_token(employee)))
            .set_json(leave_body(start, start))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);
    }

    let req = test::TestRequest::get()
        .uri(&format!("/api/leave?employee_id={COLLEAGUE}"))
        .insert_header(("Authorization", staff_token(TEACHER)))
        .to_request();
    let mine: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(mine["total"], 1);
    assert_eq!(mine["data"][0]["employee_id"], TEACHER);

    let req = test::TestRequest::get()
        .uri("/api/leave?status=pending&per_page=500")
        .insert_header(("Authorization", hr()))
        .to_request();
    let all: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(all["total"], 2);
    assert_eq!(all["per_page"], 100);
}

#[actix_web::test]
async fn hr_opens_balances_once() {
    let app = app!();
    let payload = json!({
        "employee_id": TEACHER,
        "category": "earned",
        "period_id": "2025-26",
        "allocated": 12,
        "carried_forward": 2.5
    });

    let req = test::TestRequest::post()
        .uri("/api/leave-balance")
        .insert_header(("Authorization", staff_token(TEACHER)))
        .set_json(&payload)
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);

    let req = test::TestRequest::post()
        .uri("/api/leave-balance")
        .insert_header(("Authorization", hr()))
        .set_json(&payload)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["available"], 14.5);

    let req = test::TestRequest::post()
        .uri("/api/leave-balance")
        .insert_header(("Authorization", hr()))
        .set_json(&payload)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
}
