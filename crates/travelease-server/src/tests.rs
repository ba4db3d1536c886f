//! Server API tests

use super::*;
use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use travelease_core::db::Database;
use travelease_core::models::{NewExpense, NewTrip};
use travelease_core::RecordingRevalidator;
use tower::ServiceExt;

fn test_config() -> ServerConfig {
    ServerConfig {
        require_auth: false,
        allowed_origins: vec![],
        ..Default::default()
    }
}

fn setup_test_app() -> Router {
    let db = Database::in_memory().unwrap();
    create_router(db, None, test_config())
}

/// App with one trip (2025-01-01..2025-01-05, budget 500) and a recording revalidator
fn setup_with_trip() -> (Router, Database, Arc<RecordingRevalidator>, i64) {
    let db = Database::in_memory().unwrap();
    let trip_id = db
        .create_trip(&NewTrip {
            name: "Lisbon".to_string(),
            start_date: chrono::NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            end_date: chrono::NaiveDate::from_ymd_opt(2025, 1, 5).unwrap(),
            tourist_count: 2,
            tag: None,
            budget: Some(500.0),
            owner: Some("ana@example.com".to_string()),
            anonymous: false,
        })
        .unwrap();
    let revalidator = Arc::new(RecordingRevalidator::new());
    let app = create_router_with_revalidator(db.clone(), None, test_config(), revalidator.clone());
    (app, db, revalidator, trip_id)
}

async fn get_body_json(response: axum::response::Response) -> serde_json::Value {
    let body = response.into_body();
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

// ========== Auth ==========

#[tokio::test]
async fn test_auth_required_by_default() {
    let db = Database::in_memory().unwrap();
    let app = create_router(db, None, ServerConfig::default());

    let response = app.oneshot(get_request("/api/trips")).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = get_body_json(response).await;
    assert_eq!(json["error"], "Authentication required");
}

#[tokio::test]
async fn test_proxy_header_authenticates() {
    let db = Database::in_memory().unwrap();
    let app = create_router(db, None, ServerConfig::default());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/me")
                .header("x-forwarded-email", "ana@example.com")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json["user"], "ana@example.com");
    assert_eq!(json["auth_method"], "proxy_header");
    assert_eq!(json["signed_in"], true);
}

#[tokio::test]
async fn test_api_key_auth() {
    let db = Database::in_memory().unwrap();
    let config = ServerConfig {
        api_keys: vec!["secret-key".to_string()],
        ..Default::default()
    };
    let app = create_router(db, None, config);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/me")
                .header("authorization", "Bearer secret-key")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json["auth_method"], "api_key");

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/me")
                .header("authorization", "Bearer wrong-key")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_me_without_identity() {
    let app = setup_test_app();

    let response = app.oneshot(get_request("/api/me")).await.unwrap();

    let json = get_body_json(response).await;
    assert_eq!(json["user"], "local-dev");
    assert_eq!(json["signed_in"], false);
}

#[test]
fn test_validate_api_key() {
    let keys = vec!["abc".to_string(), "defgh".to_string()];
    assert!(validate_api_key("abc", &keys));
    assert!(validate_api_key("defgh", &keys));
    assert!(!validate_api_key("abd", &keys));
    assert!(!validate_api_key("", &keys));
    assert!(!validate_api_key("abc", &[]));
}

#[test]
fn test_parse_list() {
    assert_eq!(
        parse_list(" a, b ,,c "),
        vec!["a".to_string(), "b".to_string(), "c".to_string()]
    );
    assert!(parse_list("").is_empty());
}

// ========== Trips ==========

#[tokio::test]
async fn test_create_trip_envelope() {
    let app = setup_test_app();

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/trips",
            serde_json::json!({
                "name": "Kyoto",
                "start_date": "2025-04-01",
                "end_date": "2025-04-04",
                "tourist_count": 3,
                "budget": "1000"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json["status"], "success");
    assert_eq!(json["message"], "Trip created");
    assert_eq!(json["data"]["name"], "Kyoto");
    assert_eq!(json["data"]["budget"], 1000.0);
    assert_eq!(json["data"]["anonymous"], true);
}

#[tokio::test]
async fn test_create_trip_records_owner() {
    let db = Database::in_memory().unwrap();
    let app = create_router(db.clone(), None, test_config());

    let mut request = json_request(
        "POST",
        "/api/trips",
        serde_json::json!({
            "name": "Oslo",
            "start_date": "2025-06-01",
            "end_date": "2025-06-02"
        }),
    );
    request
        .headers_mut()
        .insert("x-forwarded-email", "bo@example.com".parse().unwrap());

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let trips = db.list_trips(Some("bo@example.com")).unwrap();
    assert_eq!(trips.len(), 1);
    assert!(!trips[0].anonymous);
    assert_eq!(trips[0].tourist_count, 1);
}

#[tokio::test]
async fn test_create_trip_rejects_backwards_dates() {
    let app = setup_test_app();

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/trips",
            serde_json::json!({
                "name": "Backwards",
                "start_date": "2025-04-04",
                "end_date": "2025-04-01"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = get_body_json(response).await;
    assert_eq!(json["status"], "error");
    assert!(json["message"]
        .as_str()
        .unwrap()
        .starts_with("Failed to create trip: "));
}

#[tokio::test]
async fn test_create_trip_rejects_unbounded_span() {
    let db = Database::in_memory().unwrap();
    let app = create_router(db.clone(), None, test_config());

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/trips",
            serde_json::json!({
                "name": "Forever",
                "start_date": "2025-01-01",
                "end_date": "9999-12-31"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = get_body_json(response).await;
    assert_eq!(json["status"], "error");
    assert!(json["message"]
        .as_str()
        .unwrap()
        .contains("longer than 366 days"));
    assert!(db.list_trips(None).unwrap().is_empty());
}

#[tokio::test]
async fn test_create_trip_rejects_negative_budget() {
    let app = setup_test_app();

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/trips",
            serde_json::json!({
                "name": "Refund",
                "start_date": "2025-04-01",
                "end_date": "2025-04-02",
                "budget": -10
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_trip_bad_date_format() {
    let app = setup_test_app();

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/trips",
            serde_json::json!({
                "name": "Sloppy",
                "start_date": "01/04/2025",
                "end_date": "2025-04-01"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = get_body_json(response).await;
    assert_eq!(
        json["message"],
        "Failed to create trip: Invalid start_date format (use YYYY-MM-DD)"
    );
}

#[tokio::test]
async fn test_get_trip_not_found() {
    let app = setup_test_app();

    let response = app.oneshot(get_request("/api/trips/999")).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = get_body_json(response).await;
    assert_eq!(json["error"], "Trip not found");
}

#[tokio::test]
async fn test_update_trip_clears_tag() {
    let (app, db, revalidator, trip_id) = setup_with_trip();
    db.update_trip(
        trip_id,
        &travelease_core::models::TripUpdate {
            tag: Some(Some("family".to_string())),
            ..Default::default()
        },
    )
    .unwrap();

    let response = app
        .oneshot(json_request(
            "PATCH",
            &format!("/api/trips/{}", trip_id),
            serde_json::json!({ "tag": null, "name": "Lisbon again" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json["data"]["name"], "Lisbon again");
    assert!(json["data"]["tag"].is_null());
    assert_eq!(json["data"]["budget"], 500.0);
    assert_eq!(revalidator.paths(), vec![format!("/trips/{}", trip_id)]);
}

#[tokio::test]
async fn test_set_trip_budget() {
    let (app, _db, _revalidator, trip_id) = setup_with_trip();

    let response = app
        .oneshot(json_request(
            "PUT",
            &format!("/api/trips/{}/budget", trip_id),
            serde_json::json!({ "budget": " 750.50 " }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json["data"]["budget"], 750.5);
}

#[tokio::test]
async fn test_set_trip_budget_rejects_text() {
    let (app, _db, _revalidator, trip_id) = setup_with_trip();

    let response = app
        .oneshot(json_request(
            "PUT",
            &format!("/api/trips/{}/budget", trip_id),
            serde_json::json!({ "budget": "lots" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = get_body_json(response).await;
    assert_eq!(json["status"], "error");
}

#[tokio::test]
async fn test_delete_trip() {
    let (app, db, _revalidator, trip_id) = setup_with_trip();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/trips/{}", trip_id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json["status"], "success");
    assert!(json.get("data").is_none());
    assert!(db.get_trip(trip_id).unwrap().is_none());

    let response = app
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/trips/{}", trip_id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = get_body_json(response).await;
    assert_eq!(json["message"], "Failed to delete trip: Trip not found");
}

// ========== Bookings ==========

#[tokio::test]
async fn test_flight_booking_lifecycle() {
    let (app, _db, revalidator, trip_id) = setup_with_trip();

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/api/trips/{}/flights", trip_id),
            serde_json::json!({
                "airline": "TAP",
                "flight_number": "TP1351",
                "departure_airport": "LHR",
                "arrival_airport": "LIS",
                "departure_time": "2025-01-01T09:30:00",
                "arrival_time": "2025-01-01T12:05:00",
                "booking_reference": null,
                "price": 120.0
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json["data"]["flight_number"], "TP1351");
    let flight_id = json["data"]["id"].as_i64().unwrap();

    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/api/flights/{}", flight_id),
            serde_json::json!({
                "airline": "TAP",
                "flight_number": "TP1353",
                "departure_airport": "LHR",
                "arrival_airport": "LIS",
                "departure_time": null,
                "arrival_time": null,
                "booking_reference": "XYZ",
                "price": null
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json["data"]["flight_number"], "TP1353");
    assert!(json["data"]["price"].is_null());

    let response = app
        .oneshot(get_request(&format!("/api/trips/{}/flights", trip_id)))
        .await
        .unwrap();
    let json = get_body_json(response).await;
    assert_eq!(json.as_array().unwrap().len(), 1);

    assert_eq!(revalidator.paths().len(), 2);
    assert!(revalidator
        .paths()
        .iter()
        .all(|p| p == &format!("/trips/{}/bookings", trip_id)));
}

#[tokio::test]
async fn test_accommodation_shares_location_with_itinerary() {
    let (app, db, _revalidator, trip_id) = setup_with_trip();

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/api/trips/{}/accommodations", trip_id),
            serde_json::json!({
                "name": "Hotel Avenida",
                "location": { "name": "Chiado", "coordinate": "38.7107,-9.1426" },
                "check_in": "2025-01-01",
                "check_out": "2025-01-05",
                "booking_reference": null,
                "price": 400
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(json_request(
            "PUT",
            &format!("/api/trips/{}/itinerary/Day%201", trip_id),
            serde_json::json!({ "places": ["Chiado"] }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let locations = db.list_locations().unwrap();
    assert_eq!(locations.len(), 1);
    assert_eq!(locations[0].coordinate, "38.7107,-9.1426");
}

#[tokio::test]
async fn test_activity_booking_unknown_trip() {
    let app = setup_test_app();

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/trips/42/activities",
            serde_json::json!({
                "name": "Fado night",
                "location": "Clube de Fado",
                "date": "2025-01-02",
                "start_time": "20:00:00",
                "end_time": null,
                "booking_reference": null,
                "price": null
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = get_body_json(response).await;
    assert_eq!(
        json["message"],
        "Failed to create activity booking: Trip not found"
    );
}

// ========== Locations ==========

#[tokio::test]
async fn test_resolve_location_twice() {
    let app = setup_test_app();

    let mut ids = Vec::new();
    for _ in 0..2 {
        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/locations/resolve",
                serde_json::json!({ "name": "Rossio" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = get_body_json(response).await;
        assert_eq!(json["coordinate"], "0,0");
        ids.push(json["id"].as_i64().unwrap());
    }
    assert_eq!(ids[0], ids[1]);

    let response = app.oneshot(get_request("/api/locations")).await.unwrap();
    let json = get_body_json(response).await;
    assert_eq!(json.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_resolve_blank_location() {
    let app = setup_test_app();

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/locations/resolve",
            serde_json::json!("   "),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ========== Itinerary ==========

#[tokio::test]
async fn test_save_itinerary_day() {
    let (app, _db, revalidator, trip_id) = setup_with_trip();

    let response = app
        .oneshot(json_request(
            "PUT",
            &format!("/api/trips/{}/itinerary/Day%203", trip_id),
            serde_json::json!({
                "places": [
                    "Alfama",
                    { "name": "Belém Tower", "coordinate": { "lat": 38.6916, "lng": -9.216 }, "placeId": "p1" },
                    ""
                ]
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    let days = json["days"].as_array().unwrap();
    assert_eq!(days.len(), 5);
    assert_eq!(days[2]["label"], "Day 3");
    assert_eq!(days[2]["date"], "2025-01-03");

    let places = days[2]["places"].as_array().unwrap();
    assert_eq!(places.len(), 2);
    assert_eq!(places[0]["name"], "Alfama");
    assert_eq!(places[1]["place_id"], "p1");
    assert_eq!(days[2]["markers"].as_array().unwrap().len(), 1);

    assert_eq!(
        revalidator.paths(),
        vec![format!("/trips/{}/itinerary", trip_id)]
    );
}

#[tokio::test]
async fn test_reorder_itinerary_day() {
    let (app, _db, _revalidator, trip_id) = setup_with_trip();

    app.clone()
        .oneshot(json_request(
            "PUT",
            &format!("/api/trips/{}/itinerary/2", trip_id),
            serde_json::json!({ "places": ["A", "B", "C"] }),
        ))
        .await
        .unwrap();

    let response = app
        .oneshot(json_request(
            "POST",
            &format!("/api/trips/{}/itinerary/Day%202/reorder", trip_id),
            serde_json::json!({ "places": ["C", "A", "B"] }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    let names: Vec<&str> = json["days"][1]["places"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["C", "A", "B"]);
}

#[tokio::test]
async fn test_itinerary_unknown_trip_uses_error_shape() {
    let app = setup_test_app();

    let response = app
        .oneshot(json_request(
            "PUT",
            "/api/trips/404/itinerary/Day%201",
            serde_json::json!({ "places": ["A"] }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = get_body_json(response).await;
    assert_eq!(json["error"], "Trip not found");
    assert!(json.get("status").is_none());
}

#[tokio::test]
async fn test_itinerary_bad_day_label() {
    let (app, _db, _revalidator, trip_id) = setup_with_trip();

    let response = app
        .oneshot(json_request(
            "PUT",
            &format!("/api/trips/{}/itinerary/tomorrow", trip_id),
            serde_json::json!({ "places": ["A"] }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_itinerary_day_past_calendar_end() {
    let (app, db, revalidator, trip_id) = setup_with_trip();

    for (method, uri) in [
        ("PUT", format!("/api/trips/{}/itinerary/Day%201000000000", trip_id)),
        (
            "POST",
            format!("/api/trips/{}/itinerary/Day%201000000000/reorder", trip_id),
        ),
    ] {
        let response = app
            .clone()
            .oneshot(json_request(
                method,
                &uri,
                serde_json::json!({ "places": ["A"] }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = get_body_json(response).await;
        assert!(json["error"]
            .as_str()
            .unwrap()
            .starts_with("Invalid day label"));
    }

    let response = app
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/trips/{}/itinerary/Day%209223372036854775807", trip_id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    assert!(db.list_locations().unwrap().is_empty());
    assert!(revalidator.paths().is_empty());
}

#[tokio::test]
async fn test_delete_missing_itinerary_day() {
    let (app, _db, revalidator, trip_id) = setup_with_trip();

    let response = app
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/trips/{}/itinerary/Day%204", trip_id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json["days"].as_array().unwrap().len(), 5);
    assert!(revalidator.paths().is_empty());
}

// ========== Expenses ==========

#[tokio::test]
async fn test_expense_summary_groups_categories() {
    let (app, _db, _revalidator, trip_id) = setup_with_trip();

    for (amount, category) in [
        (serde_json::json!(100), "fnb"),
        (serde_json::json!("50"), "FnB"),
        (serde_json::json!(20), "transportation"),
    ] {
        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                &format!("/api/trips/{}/expenses", trip_id),
                serde_json::json!({
                    "date": "2025-01-02",
                    "amount": amount,
                    "category": category
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = app
        .oneshot(get_request(&format!(
            "/api/trips/{}/expenses/summary",
            trip_id
        )))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json["total_spent"], 170.0);
    assert_eq!(json["balance"], 330.0);
    assert_eq!(json["by_category"]["fnb"], 150.0);
    assert_eq!(json["by_category"]["transportation"], 20.0);
}

#[tokio::test]
async fn test_create_expense_rejects_bad_amount() {
    let (app, _db, _revalidator, trip_id) = setup_with_trip();

    let response = app
        .oneshot(json_request(
            "POST",
            &format!("/api/trips/{}/expenses", trip_id),
            serde_json::json!({
                "date": "2025-01-02",
                "amount": "ten",
                "category": "fnb"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = get_body_json(response).await;
    assert_eq!(
        json["message"],
        "Failed to create expense: Invalid amount: ten"
    );
}

#[tokio::test]
async fn test_patch_expense_keeps_other_fields() {
    let (app, db, _revalidator, trip_id) = setup_with_trip();
    let id = db
        .create_expense(
            trip_id,
            &NewExpense {
                date: chrono::NaiveDate::from_ymd_opt(2025, 1, 2).unwrap(),
                amount: 12.0,
                category: "fnb".to_string(),
                remarks: Some("Pastéis".to_string()),
            },
        )
        .unwrap();

    let response = app
        .oneshot(json_request(
            "PATCH",
            &format!("/api/expenses/{}", id),
            serde_json::json!({ "amount": 14.5 }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json["data"]["amount"], 14.5);
    assert_eq!(json["data"]["remarks"], "Pastéis");
    assert_eq!(json["data"]["category"], "fnb");
}

#[tokio::test]
async fn test_export_expenses_csv() {
    let (app, db, _revalidator, trip_id) = setup_with_trip();
    db.create_expense(
        trip_id,
        &NewExpense {
            date: chrono::NaiveDate::from_ymd_opt(2025, 1, 3).unwrap(),
            amount: 9.0,
            category: "Shopping".to_string(),
            remarks: None,
        },
    )
    .unwrap();

    let response = app
        .oneshot(get_request(&format!(
            "/api/trips/{}/expenses/export",
            trip_id
        )))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("content-type").unwrap(),
        "text/csv; charset=utf-8"
    );
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let csv = String::from_utf8(bytes.to_vec()).unwrap();
    assert_eq!(csv, "date,category,amount,remarks\n2025-01-03,shopping,9.00,\n");
}

#[tokio::test]
async fn test_export_trip_json() {
    let (app, _db, _revalidator, trip_id) = setup_with_trip();

    let response = app
        .oneshot(get_request(&format!("/api/trips/{}/export", trip_id)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json["trip"]["name"], "Lisbon");
    assert_eq!(json["itinerary"]["days"].as_array().unwrap().len(), 5);
    assert_eq!(json["summary"]["balance"], 500.0);
}

// ========== Audit ==========

#[tokio::test]
async fn test_audit_log_records_calls() {
    let (app, _db, _revalidator, trip_id) = setup_with_trip();

    app.clone()
        .oneshot(get_request(&format!("/api/trips/{}", trip_id)))
        .await
        .unwrap();

    let response = app.oneshot(get_request("/api/audit?limit=5")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    let entries = json.as_array().unwrap();
    assert!(entries
        .iter()
        .any(|e| e["action"] == "read" && e["entity_type"] == "trip"));
}

#[tokio::test]
async fn test_security_headers() {
    let app = setup_test_app();

    let response = app.oneshot(get_request("/api/me")).await.unwrap();

    assert_eq!(
        response.headers().get("x-content-type-options").unwrap(),
        "nosniff"
    );
    assert_eq!(response.headers().get("x-frame-options").unwrap(), "DENY");
}
