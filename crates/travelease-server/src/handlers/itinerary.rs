//! Itinerary handlers
//!
//! These return the recomputed itinerary on success and `{error}` on
//! failure, unlike the envelope-shaped trip and booking mutations.

use std::sync::Arc;

use axum::{
    extract::{Path, Request, State},
    http::HeaderMap,
    Json,
};
use serde::Deserialize;

use crate::{get_user, read_json, AppError, AppState};
use travelease_core::models::{Itinerary, PlaceInput};
use travelease_core::ItineraryPlanner;

/// Places for one day, in display order
#[derive(Debug, Deserialize)]
pub struct DayPlacesRequest {
    pub places: Vec<PlaceInput>,
}

fn planner(state: &AppState) -> ItineraryPlanner<'_> {
    ItineraryPlanner::new(&state.db, state.revalidator.as_ref())
}

/// GET /api/trips/:id/itinerary - Whole itinerary, one entry per day
pub async fn get_itinerary(
    State(state): State<Arc<AppState>>,
    Path(trip_id): Path<i64>,
    headers: HeaderMap,
) -> Result<Json<Itinerary>, AppError> {
    let user = get_user(&headers);
    super::trips::require_trip(&state, trip_id)?;

    let itinerary = planner(&state).get(trip_id)?;

    state
        .db
        .log_audit(&user, "read", Some("itinerary"), Some(trip_id), None)?;

    Ok(Json(itinerary))
}

/// PUT /api/trips/:id/itinerary/:day - Replace one day's places
pub async fn save_itinerary_day(
    State(state): State<Arc<AppState>>,
    Path((trip_id, day)): Path<(i64, String)>,
    request: Request,
) -> Result<Json<Itinerary>, AppError> {
    let user = get_user(request.headers());

    let body: DayPlacesRequest = read_json(request).await?;
    let itinerary = planner(&state).save_day(trip_id, &day, &body.places)?;

    state.db.log_audit(
        &user,
        "save_day",
        Some("itinerary"),
        Some(trip_id),
        Some(&format!("day={}, places={}", day, body.places.len())),
    )?;

    Ok(Json(itinerary))
}

/// POST /api/trips/:id/itinerary/:day/reorder - Store a new order for a day
pub async fn reorder_itinerary_day(
    State(state): State<Arc<AppState>>,
    Path((trip_id, day)): Path<(i64, String)>,
    request: Request,
) -> Result<Json<Itinerary>, AppError> {
    let user = get_user(request.headers());

    let body: DayPlacesRequest = read_json(request).await?;
    let itinerary = planner(&state).reorder_day(trip_id, &day, &body.places)?;

    state.db.log_audit(
        &user,
        "reorder_day",
        Some("itinerary"),
        Some(trip_id),
        Some(&format!("day={}", day)),
    )?;

    Ok(Json(itinerary))
}

/// DELETE /api/trips/:id/itinerary/:day - Clear one day
pub async fn delete_itinerary_day(
    State(state): State<Arc<AppState>>,
    Path((trip_id, day)): Path<(i64, String)>,
    headers: HeaderMap,
) -> Result<Json<Itinerary>, AppError> {
    let user = get_user(&headers);

    let itinerary = planner(&state).delete_day(trip_id, &day)?;

    state.db.log_audit(
        &user,
        "delete_day",
        Some("itinerary"),
        Some(trip_id),
        Some(&format!("day={}", day)),
    )?;

    Ok(Json(itinerary))
}
