//! Trip management handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Query, Request, State},
    http::HeaderMap,
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::info;

use crate::{
    double_option, get_identity, get_user, read_json, AppError, AppState, Envelope, OrFailed,
};
use travelease_core::models::{NewTrip, Trip, TripUpdate};
use travelease_core::revalidate::trip_path;
use travelease_core::AmountInput;

#[derive(Debug, Deserialize)]
pub struct CreateTripRequest {
    pub name: String,
    pub start_date: String,
    pub end_date: String,
    #[serde(default = "default_tourist_count")]
    pub tourist_count: i64,
    pub tag: Option<String>,
    pub budget: Option<AmountInput>,
}

fn default_tourist_count() -> i64 {
    1
}

#[derive(Debug, Deserialize)]
pub struct UpdateTripRequest {
    pub name: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub tourist_count: Option<i64>,
    #[serde(default, deserialize_with = "double_option")]
    pub tag: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub budget: Option<Option<AmountInput>>,
}

#[derive(Debug, Deserialize)]
pub struct BudgetRequest {
    pub budget: Option<AmountInput>,
}

#[derive(Debug, Deserialize)]
pub struct ListTripsQuery {
    /// Only trips owned by the caller
    #[serde(default)]
    pub mine: bool,
}

pub(crate) fn parse_date(value: &str, field: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| {
        AppError::bad_request(&format!("Invalid {} format (use YYYY-MM-DD)", field))
    })
}

fn parse_budget(budget: Option<&AmountInput>) -> Result<Option<f64>, AppError> {
    budget
        .map(|b| b.to_amount())
        .transpose()
        .map_err(AppError::from)
}

/// Load a trip or fail with 404
pub(crate) fn require_trip(state: &AppState, id: i64) -> Result<Trip, AppError> {
    state
        .db
        .get_trip(id)?
        .ok_or_else(|| AppError::not_found("Trip not found"))
}

/// POST /api/trips - Create a new trip
pub async fn create_trip(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<Envelope<Trip>>, AppError> {
    let user = get_user(request.headers());
    let owner = get_identity(request.headers());
    let action = "create trip";

    let body: CreateTripRequest = read_json(request).await.or_failed(action)?;

    let new_trip = NewTrip {
        name: body.name.trim().to_string(),
        start_date: parse_date(&body.start_date, "start_date").or_failed(action)?,
        end_date: parse_date(&body.end_date, "end_date").or_failed(action)?,
        tourist_count: body.tourist_count,
        tag: body.tag,
        budget: parse_budget(body.budget.as_ref()).or_failed(action)?,
        anonymous: owner.is_none(),
        owner,
    };

    let trip_id = state.db.create_trip(&new_trip).or_failed(action)?;
    let trip = require_trip(&state, trip_id).or_failed(action)?;

    state.db.log_audit(
        &user,
        "create",
        Some("trip"),
        Some(trip_id),
        Some(&format!("name={}", trip.name)),
    )?;
    info!(trip_id, user = %user, "Created trip");
    state.revalidator.revalidate("/trips");

    Ok(Envelope::success("Trip created", trip))
}

/// GET /api/trips - List trips
pub async fn list_trips(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(params): Query<ListTripsQuery>,
) -> Result<Json<Vec<Trip>>, AppError> {
    let user = get_user(&headers);

    let owner = if params.mine {
        Some(get_identity(&headers).ok_or_else(|| AppError::bad_request("No signed-in user"))?)
    } else {
        None
    };
    let trips = state.db.list_trips(owner.as_deref())?;

    state.db.log_audit(
        &user,
        "list",
        Some("trips"),
        None,
        Some(&format!("count={}", trips.len())),
    )?;

    Ok(Json(trips))
}

/// GET /api/trips/:id - Get a single trip
pub async fn get_trip(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Result<Json<Trip>, AppError> {
    let user = get_user(&headers);

    let trip = require_trip(&state, id)?;

    state
        .db
        .log_audit(&user, "read", Some("trip"), Some(id), None)?;

    Ok(Json(trip))
}

/// PATCH /api/trips/:id - Update a trip
pub async fn update_trip(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    request: Request,
) -> Result<Json<Envelope<Trip>>, AppError> {
    let user = get_user(request.headers());
    let action = "update trip";

    let body: UpdateTripRequest = read_json(request).await.or_failed(action)?;

    let update = TripUpdate {
        name: body.name.map(|n| n.trim().to_string()),
        start_date: body
            .start_date
            .map(|d| parse_date(&d, "start_date"))
            .transpose()
            .or_failed(action)?,
        end_date: body
            .end_date
            .map(|d| parse_date(&d, "end_date"))
            .transpose()
            .or_failed(action)?,
        tourist_count: body.tourist_count,
        tag: body.tag,
        budget: body
            .budget
            .map(|b| parse_budget(b.as_ref()))
            .transpose()
            .or_failed(action)?,
    };

    let trip = state.db.update_trip(id, &update).or_failed(action)?;

    state
        .db
        .log_audit(&user, "update", Some("trip"), Some(id), None)?;
    state.revalidator.revalidate(&trip_path(id));

    Ok(Envelope::success("Trip updated", trip))
}

/// PUT /api/trips/:id/budget - Set or clear a trip's budget
pub async fn set_trip_budget(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    request: Request,
) -> Result<Json<Envelope<Trip>>, AppError> {
    let user = get_user(request.headers());
    let action = "update budget";

    let body: BudgetRequest = read_json(request).await.or_failed(action)?;
    let budget = parse_budget(body.budget.as_ref()).or_failed(action)?;

    let trip = state.db.set_trip_budget(id, budget).or_failed(action)?;

    state.db.log_audit(
        &user,
        "update_budget",
        Some("trip"),
        Some(id),
        Some(&format!("budget={:?}", budget)),
    )?;
    state.revalidator.revalidate(&trip_path(id));

    Ok(Envelope::success("Budget updated", trip))
}

/// DELETE /api/trips/:id - Delete a trip with its bookings, itinerary and expenses
pub async fn delete_trip(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Result<Json<Envelope<()>>, AppError> {
    let user = get_user(&headers);
    let action = "delete trip";

    if !state.db.delete_trip(id).or_failed(action)? {
        return Err(AppError::not_found("Trip not found").failed(action));
    }

    state
        .db
        .log_audit(&user, "delete", Some("trip"), Some(id), None)?;
    info!(trip_id = id, user = %user, "Deleted trip");
    state.revalidator.revalidate("/trips");

    Ok(Envelope::done("Trip deleted"))
}
