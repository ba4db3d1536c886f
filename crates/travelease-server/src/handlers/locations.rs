//! Location handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Request, State},
    http::HeaderMap,
    Json,
};

use crate::{get_user, read_json, AppError, AppState};
use travelease_core::models::{Location, PlaceInput};

/// GET /api/locations - List all known locations
pub async fn list_locations(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<Location>>, AppError> {
    let user = get_user(&headers);

    let locations = state.db.list_locations()?;

    state.db.log_audit(
        &user,
        "list",
        Some("locations"),
        None,
        Some(&format!("count={}", locations.len())),
    )?;

    Ok(Json(locations))
}

/// GET /api/locations/:id - Get a single location
pub async fn get_location(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Result<Json<Location>, AppError> {
    let user = get_user(&headers);

    let location = state
        .db
        .get_location(id)?
        .ok_or_else(|| AppError::not_found("Location not found"))?;

    state
        .db
        .log_audit(&user, "read", Some("location"), Some(id), None)?;

    Ok(Json(location))
}

/// POST /api/locations/resolve - Find or create a location by name
///
/// Accepts a bare name or `{name, coordinate, placeId, formattedAddress}`.
pub async fn resolve_location(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<Location>, AppError> {
    let user = get_user(request.headers());

    let place: PlaceInput = read_json(request).await?;
    if place.is_blank() {
        return Err(AppError::bad_request("Location name is required"));
    }

    let id = state.db.resolve_location(&place.to_new_location())?;
    let location = state
        .db
        .get_location(id)?
        .ok_or_else(|| AppError::internal("Failed to fetch resolved location"))?;

    state.db.log_audit(
        &user,
        "resolve",
        Some("location"),
        Some(id),
        Some(&format!("name={}", location.name)),
    )?;

    Ok(Json(location))
}
