mod common;

use axum::http::StatusCode;
use common::{seed_salon, t, TestApp};
use salon_booking::domain::{
    models::user::Role,
    services::{availability::ConflictPolicy, booking_service::NewBookingRequest},
};

fn availability_uri(staff_id: &str, date: &str, time: &str, service_id: &str) -> String {
    format!("/api/v1/staff/{}/availability?date={}&time={}&service_id={}", staff_id, date, time, service_id)
}

#[tokio::test]
async fn test_working_hours_bounds_are_inclusive() {
    let app = TestApp::new().await;
    let salon = seed_salon(&app).await;
    let checker = &app.state.checker;

    assert!(checker.is_available(&salon.staff.id, salon.date, t("09:00"), 30).await.unwrap());
    assert!(checker.is_available(&salon.staff.id, salon.date, t("18:00"), 30).await.unwrap());
    assert!(!checker.is_available(&salon.staff.id, salon.date, t("08:59"), 30).await.unwrap());
}

#[tokio::test]
async fn test_staff_without_schedule_is_never_available() {
    let app = TestApp::new().await;
    let salon = seed_salon(&app).await;
    let idle = app.seed_user("idle", Role::Staff).await;

    for time in ["00:00", "09:00", "13:00", "18:00"] {
        assert!(!app.state.checker.is_available(&idle.id, salon.date, t(time), 30).await.unwrap());
    }
}

#[tokio::test]
async fn test_day_off_overrides_working_hours() {
    let app = TestApp::new().await;
    let salon = seed_salon(&app).await;
    app.seed_day_off(&salon.staff, salon.date).await;

    for (time, duration) in [("09:00", 30), ("12:00", 90), ("18:00", 15)] {
        assert!(!app.state.checker.is_available(&salon.staff.id, salon.date, t(time), duration).await.unwrap());
    }

    let (status, body) = app.get(&availability_uri(&salon.staff.id, &salon.date.to_string(), "12:00", &salon.service.id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["available"], false);
    assert_eq!(body["reason"], "day_off");
}

#[tokio::test]
async fn test_special_hours_narrow_the_day() {
    let app = TestApp::new().await;
    let salon = seed_salon(&app).await;
    app.seed_special_hours(&salon.staff, salon.date, "10:00", "12:00").await;

    let checker = &app.state.checker;
    assert!(!checker.is_available(&salon.staff.id, salon.date, t("09:30"), 30).await.unwrap());
    assert!(checker.is_available(&salon.staff.id, salon.date, t("10:30"), 30).await.unwrap());
    assert!(!checker.is_available(&salon.staff.id, salon.date, t("15:00"), 30).await.unwrap());

    let (_, body) = app.get(&format!("/api/v1/staff/{}/slots?date={}&service_id={}", salon.staff.id, salon.date, salon.service.id), None).await;
    let open: Vec<&str> = body["slots"].as_array().unwrap().iter()
        .filter(|s| s["available"] == true)
        .map(|s| s["time"].as_str().unwrap())
        .collect();
    assert_eq!(open, vec!["10:00", "11:00", "12:00"]);
}

#[tokio::test]
async fn test_existing_booking_blocks_until_cancelled() {
    let app = TestApp::new().await;
    let salon = seed_salon(&app).await;

    let booking = app.state.booking_service.create(&salon.client, NewBookingRequest {
        staff_id: salon.staff.id.clone(),
        service_id: salon.service.id.clone(),
        date: salon.date,
        time: t("10:00"),
        notes: None,
    }).await.unwrap();

    assert!(!app.state.checker.is_available(&salon.staff.id, salon.date, t("10:00"), 30).await.unwrap());

    let (_, body) = app.get(&availability_uri(&salon.staff.id, &salon.date.to_string(), "10:00", &salon.service.id), None).await;
    assert_eq!(body["reason"], "conflict");
    assert_eq!(body["conflicting_booking_id"], booking.id.as_str());

    app.state.booking_service.cancel(&salon.client, &booking.id, None).await.unwrap();
    assert!(app.state.checker.is_available(&salon.staff.id, salon.date, t("10:00"), 30).await.unwrap());
}

#[tokio::test]
async fn test_repeated_checks_agree() {
    let app = TestApp::new().await;
    let salon = seed_salon(&app).await;

    for time in ["08:00", "09:00", "14:30", "18:00", "19:00"] {
        let first = app.state.checker.check(&salon.staff.id, salon.date, t(time), 45).await.unwrap();
        let second = app.state.checker.check(&salon.staff.id, salon.date, t(time), 45).await.unwrap();
        assert_eq!(first, second);
    }
}

async fn long_booking_blocks_ten_oclock(policy: ConflictPolicy) -> bool {
    let app = TestApp::with_policy(policy).await;
    let salon = seed_salon(&app).await;
    let long = app.seed_service(&salon.category, "Colour", 120).await;

    app.state.booking_service.create(&salon.client, NewBookingRequest {
        staff_id: salon.staff.id.clone(),
        service_id: long.id.clone(),
        date: salon.date,
        time: t("09:00"),
        notes: None,
    }).await.unwrap();

    !app.state.checker.is_available(&salon.staff.id, salon.date, t("10:00"), 30).await.unwrap()
}

#[tokio::test]
async fn test_overlap_policy_sees_long_bookings() {
    assert!(long_booking_blocks_ten_oclock(ConflictPolicy::Overlap).await);
}

#[tokio::test]
async fn test_start_within_policy_ignores_booking_length() {
    assert!(!long_booking_blocks_ten_oclock(ConflictPolicy::StartWithin).await);
}

#[tokio::test]
async fn test_slot_grid_marks_booked_hours() {
    let app = TestApp::new().await;
    let salon = seed_salon(&app).await;

    app.state.booking_service.create(&salon.client, NewBookingRequest {
        staff_id: salon.staff.id.clone(),
        service_id: salon.service.id.clone(),
        date: salon.date,
        time: t("11:00"),
        notes: None,
    }).await.unwrap();

    let (status, body) = app.get(&format!("/api/v1/staff/{}/slots?date={}&service_id={}", salon.staff.id, salon.date, salon.service.id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["duration_minutes"], 60);

    let slots = body["slots"].as_array().unwrap();
    assert_eq!(slots.len(), 10);
    assert_eq!(slots[0]["time"], "09:00");
    assert_eq!(slots[2]["time"], "11:00");
    assert_eq!(slots[2]["available"], false);
    assert_eq!(slots[2]["reason"], "conflict");
    assert_eq!(slots[1]["available"], true);
    assert_eq!(slots[3]["available"], true);
}

#[tokio::test]
async fn test_availability_endpoint_input_errors() {
    let app = TestApp::new().await;
    let salon = seed_salon(&app).await;
    let date = salon.date.to_string();

    let (status, _) = app.get(&availability_uri(&salon.staff.id, "06/01/2025", "10:00", &salon.service.id), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.get(&availability_uri(&salon.staff.id, &date, "10am", &salon.service.id), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.get(&availability_uri("nobody", &date, "10:00", &salon.service.id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Clients are not bookable staff.
    let (status, _) = app.get(&availability_uri(&salon.client.id, &date, "10:00", &salon.service.id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.get(&availability_uri(&salon.staff.id, &date, "10:00", "missing"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_deactivated_staff_is_not_offered() {
    let app = TestApp::new().await;
    let salon = seed_salon(&app).await;
    let date = salon.date.to_string();

    sqlx::query("UPDATE users SET is_active = 0 WHERE id = ?")
        .bind(&salon.staff.id)
        .execute(&app.pool)
        .await
        .unwrap();

    let (status, body) = app.get(&availability_uri(&salon.staff.id, &date, "10:00", &salon.service.id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].is_string());

    let (status, _) = app.get(&format!("/api/v1/staff/{}/slots?date={}&service_id={}", salon.staff.id, date, salon.service.id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = app.post("/api/v1/bookings", &salon.client.id, serde_json::json!({
        "staff_id": salon.staff.id,
        "service_id": salon.service.id,
        "date": date,
        "time": "10:00",
    })).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["violations"][0]["code"], "inactive_staff");

    // Admins still manage the schedule of a deactivated staff member.
    let (status, _) = app.get(&format!("/api/v1/staff/{}/working-hours", salon.staff.id), Some(salon.admin.id.as_str())).await;
    assert_eq!(status, StatusCode::OK);
}
