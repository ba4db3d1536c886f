//! Export handlers

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, HeaderMap, Response, StatusCode},
};
use tracing::info;

use super::trips::require_trip;
use crate::{get_user, AppError, AppState};

/// GET /api/trips/:id/expenses/export - Expenses as CSV
pub async fn export_expenses_csv(
    State(state): State<Arc<AppState>>,
    Path(trip_id): Path<i64>,
    headers: HeaderMap,
) -> Result<Response<Body>, AppError> {
    let user = get_user(&headers);
    require_trip(&state, trip_id)?;

    let csv = state.db.export_expenses_csv(trip_id)?;
    let lines = csv.lines().count().saturating_sub(1);
    info!(trip_id, "Exported {} expenses to CSV", lines);

    state.db.log_audit(
        &user,
        "export_expenses",
        Some("trip"),
        Some(trip_id),
        Some(&format!("rows={}", lines)),
    )?;

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/csv; charset=utf-8")
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"trip-{}-expenses.csv\"", trip_id),
        )
        .body(Body::from(csv))
        .map_err(|e| AppError::internal(&e.to_string()))
}

/// GET /api/trips/:id/export - Full trip snapshot as JSON
pub async fn export_trip(
    State(state): State<Arc<AppState>>,
    Path(trip_id): Path<i64>,
    headers: HeaderMap,
) -> Result<Response<Body>, AppError> {
    let user = get_user(&headers);

    let export = state.db.export_trip(trip_id)?;

    state.db.log_audit(
        &user,
        "export_trip",
        Some("trip"),
        Some(trip_id),
        Some(&format!(
            "days={}, expenses={}",
            export.itinerary.days.len(),
            export.expenses.len()
        )),
    )?;

    let json =
        serde_json::to_string_pretty(&export).map_err(|e| AppError::internal(&e.to_string()))?;

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/json")
        .header(
            header::CONTENT_DISPOSITION,
            format!(
                "attachment; filename=\"travelease-trip-{}-{}.json\"",
                trip_id,
                chrono::Utc::now().format("%Y-%m-%d")
            ),
        )
        .body(Body::from(json))
        .map_err(|e| AppError::internal(&e.to_string()))
}
