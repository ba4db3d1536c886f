//! TravelEase Web Server
//!
//! Axum-based REST API for the TravelEase trip planner.
//!
//! Security features:
//! - Identity proxy header or bearer API key (secure by default, use --no-auth for local dev)
//! - Restrictive CORS policy
//! - Audit logging for every API call
//! - Sanitized error responses

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, HeaderValue, Method, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Deserializer, Serialize};
use tower_http::{
    cors::CorsLayer, services::ServeDir, set_header::SetResponseHeaderLayer, trace::TraceLayer,
};
use tracing::{error, info, warn};

use travelease_core::db::Database;
use travelease_core::{LogRevalidator, PathRevalidator};

mod handlers;

/// Maximum JSON request body (64 KB)
pub const MAX_BODY_SIZE: usize = 64 * 1024;

/// Maximum pagination limit
pub const MAX_PAGE_LIMIT: i64 = 1000;

/// Header set by the identity proxy in front of the server
const FORWARDED_EMAIL_HEADER: &str = "x-forwarded-email";

/// Authorization header for API key auth
const AUTHORIZATION_HEADER: &str = "authorization";

/// Server configuration
#[derive(Clone)]
pub struct ServerConfig {
    /// Whether authentication is required (secure by default)
    pub require_auth: bool,
    /// Allowed CORS origins (empty = same-origin only)
    pub allowed_origins: Vec<String>,
    /// API keys for service access, sent as "Bearer <key>"
    pub api_keys: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            require_auth: true,
            allowed_origins: vec![],
            api_keys: vec![],
        }
    }
}

/// Shared application state
pub struct AppState {
    pub db: Database,
    pub config: ServerConfig,
    /// Invalidates cached pages after mutations
    pub revalidator: Arc<dyn PathRevalidator>,
}

/// Authentication middleware - accepts the identity proxy header or a valid API key
///
/// The proxy header is only safe when the server is reachable exclusively
/// through a proxy that strips and rewrites it. API keys are compared in
/// constant time.
async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    if !state.config.require_auth {
        return next.run(request).await;
    }

    if let Some(email) = forwarded_email(request.headers()) {
        info!(user = %email, path = %request.uri().path(), "Authenticated via proxy header");
        return next.run(request).await;
    }

    let api_key_valid = bearer_token(request.headers())
        .map(|key| validate_api_key(key, &state.config.api_keys))
        .unwrap_or(false);

    if api_key_valid {
        info!(user = "api-key", path = %request.uri().path(), "Authenticated via API key");
        return next.run(request).await;
    }

    warn!(path = %request.uri().path(), "Unauthorized request - no valid auth");
    (
        StatusCode::UNAUTHORIZED,
        Json(serde_json::json!({
            "error": "Authentication required"
        })),
    )
        .into_response()
}

/// Validate an API key against the configured keys using constant-time comparison
fn validate_api_key(provided: &str, valid_keys: &[String]) -> bool {
    use subtle::ConstantTimeEq;

    let provided_bytes = provided.as_bytes();

    valid_keys.iter().any(|key| {
        let key_bytes = key.as_bytes();
        // Lengths leak, contents don't
        provided_bytes.len() == key_bytes.len() && bool::from(provided_bytes.ct_eq(key_bytes))
    })
}

fn forwarded_email(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(FORWARDED_EMAIL_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|auth| auth.strip_prefix("Bearer "))
}

/// The signed-in user's email, if the request carries one
pub fn get_identity(headers: &HeaderMap) -> Option<String> {
    forwarded_email(headers).map(str::to_string)
}

/// Extract the caller for audit logging
/// Returns the proxy email, "api-key" for API key auth, or "local-dev" for unauthenticated
pub fn get_user(headers: &HeaderMap) -> String {
    if let Some(email) = forwarded_email(headers) {
        return email.to_string();
    }

    if bearer_token(headers).is_some() {
        return "api-key".to_string();
    }

    "local-dev".to_string()
}

/// Parse a comma-separated list (API keys, CORS origins) from configuration
pub fn parse_list(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Read and parse a JSON request body
pub(crate) async fn read_json<T: serde::de::DeserializeOwned>(
    request: Request,
) -> Result<T, AppError> {
    let bytes = axum::body::to_bytes(request.into_body(), MAX_BODY_SIZE)
        .await
        .map_err(|_| AppError::bad_request("Invalid request body"))?;
    serde_json::from_slice(&bytes).map_err(|e| AppError::bad_request(&format!("Invalid JSON: {}", e)))
}

/// Deserialize a field that may be absent, null or set
///
/// Absent → `None`, `null` → `Some(None)`, value → `Some(Some(v))`.
/// Use together with `#[serde(default)]`.
pub(crate) fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Status envelope returned by trip, booking and expense mutations
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub status: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    pub fn success(message: impl Into<String>, data: T) -> Json<Self> {
        Json(Self {
            status: "success",
            message: message.into(),
            data: Some(data),
        })
    }
}

impl Envelope<()> {
    pub fn done(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            status: "success",
            message: message.into(),
            data: None,
        })
    }
}

/// Create the application router
pub fn create_router(db: Database, static_dir: Option<&str>, config: ServerConfig) -> Router {
    create_router_with_revalidator(db, static_dir, config, Arc::new(LogRevalidator))
}

/// Create the application router with a custom revalidator (for testing)
pub fn create_router_with_revalidator(
    db: Database,
    static_dir: Option<&str>,
    config: ServerConfig,
    revalidator: Arc<dyn PathRevalidator>,
) -> Router {
    let state = Arc::new(AppState {
        db,
        config: config.clone(),
        revalidator,
    });

    let api_routes = Router::new()
        // Auth
        .route("/me", get(handlers::get_me))
        // Trips
        .route(
            "/trips",
            get(handlers::list_trips).post(handlers::create_trip),
        )
        .route(
            "/trips/:id",
            get(handlers::get_trip)
                .patch(handlers::update_trip)
                .delete(handlers::delete_trip),
        )
        .route("/trips/:id/budget", put(handlers::set_trip_budget))
        // Bookings
        .route("/trips/:id/bookings", get(handlers::list_trip_bookings))
        .route(
            "/trips/:id/flights",
            get(handlers::list_flights).post(handlers::create_flight),
        )
        .route(
            "/flights/:id",
            get(handlers::get_flight)
                .put(handlers::update_flight)
                .delete(handlers::delete_flight),
        )
        .route(
            "/trips/:id/accommodations",
            get(handlers::list_accommodations).post(handlers::create_accommodation),
        )
        .route(
            "/accommodations/:id",
            get(handlers::get_accommodation)
                .put(handlers::update_accommodation)
                .delete(handlers::delete_accommodation),
        )
        .route(
            "/trips/:id/activities",
            get(handlers::list_activities).post(handlers::create_activity),
        )
        .route(
            "/activities/:id",
            get(handlers::get_activity)
                .put(handlers::update_activity)
                .delete(handlers::delete_activity),
        )
        // Locations
        .route("/locations", get(handlers::list_locations))
        .route("/locations/resolve", post(handlers::resolve_location))
        .route("/locations/:id", get(handlers::get_location))
        // Itinerary
        .route("/trips/:id/itinerary", get(handlers::get_itinerary))
        .route(
            "/trips/:id/itinerary/:day",
            put(handlers::save_itinerary_day).delete(handlers::delete_itinerary_day),
        )
        .route(
            "/trips/:id/itinerary/:day/reorder",
            post(handlers::reorder_itinerary_day),
        )
        // Expenses
        .route(
            "/trips/:id/expenses",
            get(handlers::list_expenses).post(handlers::create_expense),
        )
        .route(
            "/trips/:id/expenses/summary",
            get(handlers::get_expense_summary),
        )
        .route(
            "/trips/:id/expenses/export",
            get(handlers::export_expenses_csv),
        )
        .route(
            "/expenses/:id",
            get(handlers::get_expense)
                .patch(handlers::update_expense)
                .delete(handlers::delete_expense),
        )
        // Export
        .route("/trips/:id/export", get(handlers::export_trip))
        // Audit log
        .route("/audit", get(handlers::list_audit_log));

    let methods = [
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::PATCH,
        Method::DELETE,
        Method::OPTIONS,
    ];

    // Build CORS layer
    let cors = if config.allowed_origins.is_empty() {
        // Restrictive default: only allow same-origin
        CorsLayer::new()
            .allow_methods(methods)
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
    } else {
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
    };

    // CSP: same-origin scripts, inline styles, map tiles as images
    let csp_value = HeaderValue::from_static(
        "default-src 'self'; script-src 'self'; style-src 'self' 'unsafe-inline'; img-src 'self' blob: data: https:; font-src 'self'; connect-src 'self'; frame-ancestors 'none'"
    );

    let mut app = Router::new()
        .nest("/api", api_routes)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        // Security headers
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::CONTENT_SECURITY_POLICY,
            csp_value,
        ));

    // Serve the web client if a directory is provided
    if let Some(dir) = static_dir {
        app = app.fallback_service(ServeDir::new(dir));
    }

    app
}

/// Start the server
pub async fn serve(
    db: Database,
    host: &str,
    port: u16,
    static_dir: Option<&str>,
) -> anyhow::Result<()> {
    serve_with_config(db, host, port, static_dir, ServerConfig::default()).await
}

/// Start the server with custom configuration
pub async fn serve_with_config(
    db: Database,
    host: &str,
    port: u16,
    static_dir: Option<&str>,
    config: ServerConfig,
) -> anyhow::Result<()> {
    if !config.require_auth {
        warn!("⚠️  Authentication disabled - do not expose to network!");
    } else if config.api_keys.is_empty() {
        info!("No API keys configured; only proxy-authenticated requests are accepted");
    }

    let app = create_router(db, static_dir, config);
    let addr = format!("{}:{}", host, port);

    info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ============================================================================
// Error Handling
// ============================================================================

/// Application error type with proper HTTP status codes
pub struct AppError {
    status: StatusCode,
    message: String,
    internal: Option<anyhow::Error>,
    /// Render as a `{status: "error", message}` envelope instead of `{error}`
    envelope: bool,
}

impl AppError {
    fn new(status: StatusCode, msg: &str) -> Self {
        Self {
            status,
            message: msg.to_string(),
            internal: None,
            envelope: false,
        }
    }

    pub fn bad_request(msg: &str) -> Self {
        Self::new(StatusCode::BAD_REQUEST, msg)
    }

    pub fn not_found(msg: &str) -> Self {
        Self::new(StatusCode::NOT_FOUND, msg)
    }

    pub fn internal(msg: &str) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, msg)
    }

    /// Report as a failed envelope: "Failed to <action>: <message>"
    pub fn failed(mut self, action: &str) -> Self {
        self.message = format!("Failed to {}: {}", action, self.message);
        self.envelope = true;
        self
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

/// Attach the envelope shape to any fallible mutation
pub(crate) trait OrFailed<T> {
    fn or_failed(self, action: &str) -> Result<T, AppError>;
}

impl<T, E: Into<AppError>> OrFailed<T> for Result<T, E> {
    fn or_failed(self, action: &str) -> Result<T, AppError> {
        self.map_err(|e| e.into().failed(action))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log the full internal error if present
        if let Some(err) = &self.internal {
            error!(error = %err, "Internal error");
        }

        let body = if self.envelope {
            Json(serde_json::json!({
                "status": "error",
                "message": self.message
            }))
        } else {
            Json(serde_json::json!({
                "error": self.message
            }))
        };

        (self.status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        let err = err.into();

        // Caller mistakes keep their message; everything else is sanitized
        if let Some(core) = err.downcast_ref::<travelease_core::Error>() {
            match core {
                travelease_core::Error::NotFound(msg) => return Self::not_found(msg),
                travelease_core::Error::InvalidData(msg) => return Self::bad_request(msg),
                _ => {}
            }
        }

        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: "An unexpected error occurred".to_string(),
            internal: Some(err),
            envelope: false,
        }
    }
}

#[cfg(test)]
mod tests;
