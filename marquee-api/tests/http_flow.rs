use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use marquee_api::{app, AppState};
use marquee_engine::{EngineRules, InMemoryBookingRepository, ReservationEngine};
use marquee_layout::{generate, SectionSpec};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::util::ServiceExt;

fn test_app() -> axum::Router {
    let catalogue = Arc::new(generate(&[SectionSpec::new("Standard", 100, 2, 3)]).unwrap());
    let engine = Arc::new(ReservationEngine::new(
        catalogue,
        Arc::new(InMemoryBookingRepository::new()),
        EngineRules::default(),
    ));
    app(AppState { engine })
}

async fn send(app: &axum::Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn post(uri: &str, requester: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(r) = requester {
        builder = builder.header("x-requester-id", r);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

async fn register_show(app: &axum::Router) -> String {
    let (status, body) = send(
        app,
        post(
            "/v1/shows",
            None,
            json!({ "subject_id": "inception", "date": "2026-09-04", "time": "19:30:00" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["show_id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn register_show_is_idempotent() {
    let app = test_app();
    let first = register_show(&app).await;
    let second = register_show(&app).await;
    assert_eq!(first, second);
}

#[tokio::test]
async fn full_reserve_and_confirm_flow() {
    let app = test_app();
    let show_id = register_show(&app).await;

    // Reserve two seats.
    let (status, hold) = send(
        &app,
        post(
            "/v1/holds",
            Some("alice"),
            json!({ "show_id": show_id, "seat_ids": ["Standard-A-1", "Standard-A-2"] }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(hold["status"], "active");
    let hold_id = hold["hold_id"].as_str().unwrap().to_string();

    // Seat map reflects the hold from each viewer's perspective.
    let (status, map) = send(
        &app,
        Request::builder()
            .uri(format!("/v1/shows/{show_id}/seats"))
            .header("x-requester-id", "alice")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(map["seats"]["Standard-A-1"], "held_by_you");
    assert_eq!(map["seats"]["Standard-A-3"], "available");

    // Confirm into a booking.
    let (status, booking) = send(
        &app,
        post("/v1/bookings", Some("alice"), json!({ "hold_id": hold_id })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(booking["total_price_cents"], 200);
    assert_eq!(
        booking["seats"],
        json!(["Standard-A-1", "Standard-A-2"])
    );

    let booking_id = booking["booking_id"].as_str().unwrap();
    let (status, fetched) = send(
        &app,
        Request::builder()
            .uri(format!("/v1/bookings/{booking_id}"))
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["booking_id"].as_str().unwrap(), booking_id);
}

#[tokio::test]
async fn conflicting_reserve_returns_the_contested_seats() {
    let app = test_app();
    let show_id = register_show(&app).await;

    let (status, _) = send(
        &app,
        post(
            "/v1/holds",
            Some("alice"),
            json!({ "show_id": show_id, "seat_ids": ["Standard-B-1"] }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &app,
        post(
            "/v1/holds",
            Some("bob"),
            json!({ "show_id": show_id, "seat_ids": ["Standard-B-1", "Standard-B-2"] }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["reason"], "conflict");
    assert_eq!(body["unavailable_seats"], json!(["Standard-B-1"]));
}

#[tokio::test]
async fn cancel_frees_seats_and_is_owner_only() {
    let app = test_app();
    let show_id = register_show(&app).await;

    let (_, hold) = send(
        &app,
        post(
            "/v1/holds",
            Some("alice"),
            json!({ "show_id": show_id, "seat_ids": ["Standard-A-1"] }),
        ),
    )
    .await;
    let hold_id = hold["hold_id"].as_str().unwrap().to_string();

    // Bob cannot cancel Alice's hold.
    let (status, _) = send(
        &app,
        Request::builder()
            .method("DELETE")
            .uri(format!("/v1/holds/{hold_id}"))
            .header("x-requester-id", "bob")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        &app,
        Request::builder()
            .method("DELETE")
            .uri(format!("/v1/holds/{hold_id}"))
            .header("x-requester-id", "alice")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    // Seat is selectable again.
    let (status, _) = send(
        &app,
        post(
            "/v1/holds",
            Some("bob"),
            json!({ "show_id": show_id, "seat_ids": ["Standard-A-1"] }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn reserve_without_requester_header_is_rejected() {
    let app = test_app();
    let show_id = register_show(&app).await;

    let (status, _) = send(
        &app,
        post(
            "/v1/holds",
            None,
            json!({ "show_id": show_id, "seat_ids": ["Standard-A-1"] }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_seat_is_a_validation_error() {
    let app = test_app();
    let show_id = register_show(&app).await;

    let (status, body) = send(
        &app,
        post(
            "/v1/holds",
            Some("alice"),
            json!({ "show_id": show_id, "seat_ids": ["Balcony-Z-99"] }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["reason"], "validation");
}

#[tokio::test]
async fn confirm_on_unknown_hold_is_not_found() {
    let app = test_app();
    register_show(&app).await;

    let (status, body) = send(
        &app,
        post(
            "/v1/bookings",
            Some("alice"),
            json!({ "hold_id": uuid::Uuid::new_v4() }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["reason"], "hold-not-found");
}
