//! Flight, accommodation and activity booking handlers
//!
//! Updates replace every editable field of a booking. Accommodation and
//! activity locations go through the location resolver, so a booking and an
//! itinerary day naming the same place share one location row.

use std::sync::Arc;

use axum::{
    extract::{Path, Request, State},
    http::HeaderMap,
    Json,
};

use super::trips::require_trip;
use crate::{get_user, read_json, AppError, AppState, Envelope, OrFailed};
use travelease_core::models::{
    AccommodationBooking, AccommodationDetails, ActivityBooking, ActivityDetails, FlightBooking,
    FlightDetails, TripBookings,
};
use travelease_core::revalidate::bookings_path;

/// GET /api/trips/:id/bookings - All bookings of a trip
pub async fn list_trip_bookings(
    State(state): State<Arc<AppState>>,
    Path(trip_id): Path<i64>,
    headers: HeaderMap,
) -> Result<Json<TripBookings>, AppError> {
    let user = get_user(&headers);
    require_trip(&state, trip_id)?;

    let bookings = state.db.list_trip_bookings(trip_id)?;

    state
        .db
        .log_audit(&user, "list", Some("bookings"), Some(trip_id), None)?;

    Ok(Json(bookings))
}

// ========== Flights ==========

/// GET /api/trips/:id/flights
pub async fn list_flights(
    State(state): State<Arc<AppState>>,
    Path(trip_id): Path<i64>,
    headers: HeaderMap,
) -> Result<Json<Vec<FlightBooking>>, AppError> {
    let user = get_user(&headers);
    require_trip(&state, trip_id)?;

    let flights = state.db.list_flight_bookings(trip_id)?;

    state.db.log_audit(
        &user,
        "list",
        Some("flight_bookings"),
        Some(trip_id),
        Some(&format!("count={}", flights.len())),
    )?;

    Ok(Json(flights))
}

/// POST /api/trips/:id/flights
pub async fn create_flight(
    State(state): State<Arc<AppState>>,
    Path(trip_id): Path<i64>,
    request: Request,
) -> Result<Json<Envelope<FlightBooking>>, AppError> {
    let user = get_user(request.headers());
    let action = "create flight booking";

    let details: FlightDetails = read_json(request).await.or_failed(action)?;
    let id = state
        .db
        .create_flight_booking(trip_id, &details)
        .or_failed(action)?;
    let flight = state
        .db
        .get_flight_booking(id)?
        .ok_or_else(|| AppError::internal("Failed to fetch created booking"))?;

    state.db.log_audit(
        &user,
        "create",
        Some("flight_booking"),
        Some(id),
        Some(&format!("flight={}", flight.details.flight_number)),
    )?;
    state.revalidator.revalidate(&bookings_path(trip_id));

    Ok(Envelope::success("Flight booking created", flight))
}

/// GET /api/flights/:id
pub async fn get_flight(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Result<Json<FlightBooking>, AppError> {
    let user = get_user(&headers);

    let flight = state
        .db
        .get_flight_booking(id)?
        .ok_or_else(|| AppError::not_found("Flight booking not found"))?;

    state
        .db
        .log_audit(&user, "read", Some("flight_booking"), Some(id), None)?;

    Ok(Json(flight))
}

/// PUT /api/flights/:id
pub async fn update_flight(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    request: Request,
) -> Result<Json<Envelope<FlightBooking>>, AppError> {
    let user = get_user(request.headers());
    let action = "update flight booking";

    let details: FlightDetails = read_json(request).await.or_failed(action)?;
    let flight = state
        .db
        .update_flight_booking(id, &details)
        .or_failed(action)?;

    state
        .db
        .log_audit(&user, "update", Some("flight_booking"), Some(id), None)?;
    state.revalidator.revalidate(&bookings_path(flight.trip_id));

    Ok(Envelope::success("Flight booking updated", flight))
}

/// DELETE /api/flights/:id
pub async fn delete_flight(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Result<Json<Envelope<()>>, AppError> {
    let user = get_user(&headers);
    let action = "delete flight booking";

    let flight = state
        .db
        .get_flight_booking(id)
        .or_failed(action)?
        .ok_or_else(|| AppError::not_found("Flight booking not found").failed(action))?;
    state.db.delete_flight_booking(id).or_failed(action)?;

    state
        .db
        .log_audit(&user, "delete", Some("flight_booking"), Some(id), None)?;
    state.revalidator.revalidate(&bookings_path(flight.trip_id));

    Ok(Envelope::done("Flight booking deleted"))
}

// ========== Accommodations ==========

/// GET /api/trips/:id/accommodations
pub async fn list_accommodations(
    State(state): State<Arc<AppState>>,
    Path(trip_id): Path<i64>,
    headers: HeaderMap,
) -> Result<Json<Vec<AccommodationBooking>>, AppError> {
    let user = get_user(&headers);
    require_trip(&state, trip_id)?;

    let stays = state.db.list_accommodation_bookings(trip_id)?;

    state.db.log_audit(
        &user,
        "list",
        Some("accommodation_bookings"),
        Some(trip_id),
        Some(&format!("count={}", stays.len())),
    )?;

    Ok(Json(stays))
}

/// POST /api/trips/:id/accommodations
pub async fn create_accommodation(
    State(state): State<Arc<AppState>>,
    Path(trip_id): Path<i64>,
    request: Request,
) -> Result<Json<Envelope<AccommodationBooking>>, AppError> {
    let user = get_user(request.headers());
    let action = "create accommodation booking";

    let details: AccommodationDetails = read_json(request).await.or_failed(action)?;
    let id = state
        .db
        .create_accommodation_booking(trip_id, &details)
        .or_failed(action)?;
    let stay = state
        .db
        .get_accommodation_booking(id)?
        .ok_or_else(|| AppError::internal("Failed to fetch created booking"))?;

    state.db.log_audit(
        &user,
        "create",
        Some("accommodation_booking"),
        Some(id),
        Some(&format!("location={}", stay.location_name)),
    )?;
    state.revalidator.revalidate(&bookings_path(trip_id));

    Ok(Envelope::success("Accommodation booking created", stay))
}

/// GET /api/accommodations/:id
pub async fn get_accommodation(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Result<Json<AccommodationBooking>, AppError> {
    let user = get_user(&headers);

    let stay = state
        .db
        .get_accommodation_booking(id)?
        .ok_or_else(|| AppError::not_found("Accommodation booking not found"))?;

    state.db.log_audit(
        &user,
        "read",
        Some("accommodation_booking"),
        Some(id),
        None,
    )?;

    Ok(Json(stay))
}

/// PUT /api/accommodations/:id
pub async fn update_accommodation(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    request: Request,
) -> Result<Json<Envelope<AccommodationBooking>>, AppError> {
    let user = get_user(request.headers());
    let action = "update accommodation booking";

    let details: AccommodationDetails = read_json(request).await.or_failed(action)?;
    let stay = state
        .db
        .update_accommodation_booking(id, &details)
        .or_failed(action)?;

    state.db.log_audit(
        &user,
        "update",
        Some("accommodation_booking"),
        Some(id),
        None,
    )?;
    state.revalidator.revalidate(&bookings_path(stay.trip_id));

    Ok(Envelope::success("Accommodation booking updated", stay))
}

/// DELETE /api/accommodations/:id
pub async fn delete_accommodation(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Result<Json<Envelope<()>>, AppError> {
    let user = get_user(&headers);
    let action = "delete accommodation booking";

    let stay = state
        .db
        .get_accommodation_booking(id)
        .or_failed(action)?
        .ok_or_else(|| AppError::not_found("Accommodation booking not found").failed(action))?;
    state.db.delete_accommodation_booking(id).or_failed(action)?;

    state.db.log_audit(
        &user,
        "delete",
        Some("accommodation_booking"),
        Some(id),
        None,
    )?;
    state.revalidator.revalidate(&bookings_path(stay.trip_id));

    Ok(Envelope::done("Accommodation booking deleted"))
}

// ========== Activities ==========

/// GET /api/trips/:id/activities
pub async fn list_activities(
    State(state): State<Arc<AppState>>,
    Path(trip_id): Path<i64>,
    headers: HeaderMap,
) -> Result<Json<Vec<ActivityBooking>>, AppError> {
    let user = get_user(&headers);
    require_trip(&state, trip_id)?;

    let activities = state.db.list_activity_bookings(trip_id)?;

    state.db.log_audit(
        &user,
        "list",
        Some("activity_bookings"),
        Some(trip_id),
        Some(&format!("count={}", activities.len())),
    )?;

    Ok(Json(activities))
}

/// POST /api/trips/:id/activities
pub async fn create_activity(
    State(state): State<Arc<AppState>>,
    Path(trip_id): Path<i64>,
    request: Request,
) -> Result<Json<Envelope<ActivityBooking>>, AppError> {
    let user = get_user(request.headers());
    let action = "create activity booking";

    let details: ActivityDetails = read_json(request).await.or_failed(action)?;
    let id = state
        .db
        .create_activity_booking(trip_id, &details)
        .or_failed(action)?;
    let activity = state
        .db
        .get_activity_booking(id)?
        .ok_or_else(|| AppError::internal("Failed to fetch created booking"))?;

    state.db.log_audit(
        &user,
        "create",
        Some("activity_booking"),
        Some(id),
        Some(&format!("name={}", activity.name)),
    )?;
    state.revalidator.revalidate(&bookings_path(trip_id));

    Ok(Envelope::success("Activity booking created", activity))
}

/// GET /api/activities/:id
pub async fn get_activity(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Result<Json<ActivityBooking>, AppError> {
    let user = get_user(&headers);

    let activity = state
        .db
        .get_activity_booking(id)?
        .ok_or_else(|| AppError::not_found("Activity booking not found"))?;

    state
        .db
        .log_audit(&user, "read", Some("activity_booking"), Some(id), None)?;

    Ok(Json(activity))
}

/// PUT /api/activities/:id
pub async fn update_activity(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    request: Request,
) -> Result<Json<Envelope<ActivityBooking>>, AppError> {
    let user = get_user(request.headers());
    let action = "update activity booking";

    let details: ActivityDetails = read_json(request).await.or_failed(action)?;
    let activity = state
        .db
        .update_activity_booking(id, &details)
        .or_failed(action)?;

    state
        .db
        .log_audit(&user, "update", Some("activity_booking"), Some(id), None)?;
    state.revalidator.revalidate(&bookings_path(activity.trip_id));

    Ok(Envelope::success("Activity booking updated", activity))
}

/// DELETE /api/activities/:id
pub async fn delete_activity(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Result<Json<Envelope<()>>, AppError> {
    let user = get_user(&headers);
    let action = "delete activity booking";

    let activity = state
        .db
        .get_activity_booking(id)
        .or_failed(action)?
        .ok_or_else(|| AppError::not_found("Activity booking not found").failed(action))?;
    state.db.delete_activity_booking(id).or_failed(action)?;

    state
        .db
        .log_audit(&user, "delete", Some("activity_booking"), Some(id), None)?;
    state.revalidator.revalidate(&bookings_path(activity.trip_id));

    Ok(Envelope::done("Activity booking deleted"))
}
