mod common;

use axum::http::StatusCode;
use common::{seed_salon, Salon, TestApp};
use salon_booking::domain::models::user::Role;
use serde_json::{json, Value};

async fn book(app: &TestApp, salon: &Salon, time: &str) -> String {
    let (status, body) = app.post("/api/v1/bookings", &salon.client.id, json!({
        "staff_id": salon.staff.id,
        "service_id": salon.service.id,
        "date": salon.date.to_string(),
        "time": time,
    })).await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_str().unwrap().to_string()
}

async fn set_status(app: &TestApp, user_id: &str, booking_id: &str, status: &str) -> (StatusCode, Value) {
    app.post(&format!("/api/v1/bookings/{}/status", booking_id), user_id, json!({ "status": status })).await
}

async fn history_actions(app: &TestApp, user_id: &str, booking_id: &str) -> Vec<String> {
    let (_, body) = app.get(&format!("/api/v1/bookings/{}/history", booking_id), Some(user_id)).await;
    body.as_array().unwrap().iter().map(|h| h["action"].as_str().unwrap().to_string()).collect()
}

#[tokio::test]
async fn test_staff_confirms_then_completes() {
    let app = TestApp::new().await;
    let salon = seed_salon(&app).await;
    let id = book(&app, &salon, "10:00").await;

    let (status, body) = set_status(&app, &salon.staff.id, &id, "confirmed").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "confirmed");

    let (status, body) = set_status(&app, &salon.staff.id, &id, "completed").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "completed");

    assert_eq!(history_actions(&app, &salon.staff.id, &id).await, vec!["completed", "confirmed", "created"]);

    // Terminal.
    let (status, _) = set_status(&app, &salon.staff.id, &id, "cancelled").await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_no_show_requires_confirmation_first() {
    let app = TestApp::new().await;
    let salon = seed_salon(&app).await;
    let id = book(&app, &salon, "10:00").await;

    let (status, body) = set_status(&app, &salon.admin.id, &id, "no_show").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Cannot change booking from pending to no_show");

    set_status(&app, &salon.admin.id, &id, "confirmed").await;
    let (status, body) = set_status(&app, &salon.admin.id, &id, "no_show").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "no_show");
    assert_eq!(history_actions(&app, &salon.admin.id, &id).await[0], "no_show");
}

#[tokio::test]
async fn test_only_assigned_staff_or_admin_change_status() {
    let app = TestApp::new().await;
    let salon = seed_salon(&app).await;
    let colleague = app.seed_user("colleague", Role::Staff).await;
    let id = book(&app, &salon, "10:00").await;

    let (status, _) = set_status(&app, &salon.client.id, &id, "confirmed").await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = set_status(&app, &colleague.id, &id, "confirmed").await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = set_status(&app, &salon.admin.id, &id, "confirmed").await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = set_status(&app, &salon.admin.id, "missing", "confirmed").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_client_cancels_own_booking() {
    let app = TestApp::new().await;
    let salon = seed_salon(&app).await;
    let stranger = app.seed_user("stranger", Role::Client).await;
    let id = book(&app, &salon, "10:00").await;
    let uri = format!("/api/v1/bookings/{}/cancel", id);

    let (status, _) = app.post(&uri, &stranger.id, json!({})).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app.post(&uri, &salon.client.id, json!({ "notes": "Feeling ill" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "cancelled");

    let (status, _) = app.post(&uri, &salon.client.id, json!({})).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, history) = app.get(&format!("/api/v1/bookings/{}/history", id), Some(salon.client.id.as_str())).await;
    assert_eq!(history[0]["action"], "cancelled");
    assert_eq!(history[0]["notes"], "Feeling ill");
}

#[tokio::test]
async fn test_reschedule_moves_booking_and_records_history() {
    let app = TestApp::new().await;
    let salon = seed_salon(&app).await;
    let id = book(&app, &salon, "10:00").await;

    let (status, body) = app.post(&format!("/api/v1/bookings/{}/reschedule", id), &salon.client.id, json!({
        "date": salon.date.to_string(),
        "time": "15:00",
    })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["appointment_time"], "15:00:00");
    assert_eq!(body["status"], "pending");

    let (_, history) = app.get(&format!("/api/v1/bookings/{}/history", id), Some(salon.client.id.as_str())).await;
    assert_eq!(history[0]["action"], "rescheduled");
    assert_eq!(history[0]["notes"], format!("{} 10:00 -> {} 15:00", salon.date, salon.date).as_str());

    // The old slot is free again.
    assert!(app.state.checker.is_available(&salon.staff.id, salon.date, common::t("10:00"), 60).await.unwrap());
}

#[tokio::test]
async fn test_reschedule_may_overlap_its_own_slot() {
    let app = TestApp::new().await;
    let salon = seed_salon(&app).await;
    let id = book(&app, &salon, "10:00").await;

    let (status, body) = app.post(&format!("/api/v1/bookings/{}/reschedule", id), &salon.staff.id, json!({
        "date": salon.date.to_string(),
        "time": "10:30",
    })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["appointment_time"], "10:30:00");
}

#[tokio::test]
async fn test_reschedule_rejections() {
    let app = TestApp::new().await;
    let salon = seed_salon(&app).await;
    let first = book(&app, &salon, "10:00").await;
    let second = book(&app, &salon, "13:00").await;
    let stranger = app.seed_user("stranger", Role::Client).await;
    let date = salon.date.to_string();

    let (status, _) = app.post(&format!("/api/v1/bookings/{}/reschedule", second), &salon.client.id,
        json!({ "date": date, "time": "10:30" })).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = app.post(&format!("/api/v1/bookings/{}/reschedule", second), &salon.client.id,
        json!({ "date": date, "time": "20:00" })).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = app.post(&format!("/api/v1/bookings/{}/reschedule", second), &stranger.id,
        json!({ "date": date, "time": "15:00" })).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app.post(&format!("/api/v1/bookings/{}/reschedule", second), &salon.client.id,
        json!({ "date": "2000-01-03", "time": "10:00" })).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["violations"][0]["code"], "past_date");

    app.post(&format!("/api/v1/bookings/{}/cancel", first), &salon.client.id, json!({})).await;
    let (status, _) = app.post(&format!("/api/v1/bookings/{}/reschedule", first), &salon.client.id,
        json!({ "date": date, "time": "16:00" })).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_booking_visibility() {
    let app = TestApp::new().await;
    let salon = seed_salon(&app).await;
    let stranger = app.seed_user("stranger", Role::Client).await;
    let colleague = app.seed_user("colleague", Role::Staff).await;
    let id = book(&app, &salon, "10:00").await;
    let uri = format!("/api/v1/bookings/{}", id);

    for viewer in [salon.client.id.as_str(), salon.staff.id.as_str(), salon.admin.id.as_str()] {
        let (status, body) = app.get(&uri, Some(viewer)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["id"], id.as_str());
    }
    for outsider in [stranger.id.as_str(), colleague.id.as_str()] {
        let (status, _) = app.get(&uri, Some(outsider)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        let (status, _) = app.get(&format!("{}/history", uri), Some(outsider)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    let (status, _) = app.get("/api/v1/bookings/missing", Some(salon.admin.id.as_str())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_cancel_without_body() {
    let app = TestApp::new().await;
    let salon = seed_salon(&app).await;
    let id = book(&app, &salon, "11:00").await;
    let uri = format!("/api/v1/bookings/{}/cancel", id);

    let (status, body) = app.request("POST", &uri, Some(salon.staff.id.as_str()), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "cancelled");

    let (_, history) = app.get(&format!("/api/v1/bookings/{}/history", id), Some(salon.staff.id.as_str())).await;
    assert_eq!(history[0]["action"], "cancelled");
    assert!(history[0]["notes"].is_null());

    // Errors keep the JSON shape even without a body.
    let (status, body) = app.request("POST", &uri, Some(salon.staff.id.as_str()), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_reschedule_after_service_deactivated() {
    let app = TestApp::new().await;
    let salon = seed_salon(&app).await;
    let id = book(&app, &salon, "10:00").await;

    let (status, _) = app.put(&format!("/api/v1/services/{}", salon.service.id), &salon.admin.id, json!({ "is_active": false })).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app.post(&format!("/api/v1/bookings/{}/reschedule", id), &salon.client.id, json!({
        "date": salon.date.to_string(),
        "time": "14:00",
    })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["appointment_time"], "14:00:00");

    // New bookings for the service are still refused.
    let (status, body) = app.post("/api/v1/bookings", &salon.client.id, json!({
        "staff_id": salon.staff.id,
        "service_id": salon.service.id,
        "date": salon.date.to_string(),
        "time": "16:00",
    })).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["violations"][0]["code"], "inactive_service");
}
