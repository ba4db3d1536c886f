//! Authentication-related handlers

use axum::{http::HeaderMap, Json};
use serde::Serialize;

use crate::get_user;

/// Response for the /api/me endpoint
#[derive(Serialize)]
pub struct MeResponse {
    /// The caller's email or identifier
    pub user: String,
    /// How the caller was identified
    pub auth_method: String,
    /// False when no identity accompanied the request
    pub signed_in: bool,
}

/// Get the current caller, derived from this request only
pub async fn get_me(headers: HeaderMap) -> Json<MeResponse> {
    let user = get_user(&headers);

    let auth_method = match user.as_str() {
        "api-key" => "api_key",
        "local-dev" => "none",
        _ => "proxy_header",
    };

    Json(MeResponse {
        signed_in: auth_method == "proxy_header",
        user,
        auth_method: auth_method.to_string(),
    })
}
