//! Health check endpoint for monitoring and readiness probes

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};

use crate::api::routes::ApiState;

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// Service status (always "ok" when responding)
    pub status: String,

    pub version: String,

    /// Own instance of the loaded global configuration
    pub instance: String,

    /// False once the global configuration has expired or is inconsistent
    pub global_conf_valid: bool,
}

/// Health check endpoint
///
/// Returns 200 OK while the API server is operational, including when the
/// global configuration is stale.
pub async fn health_handler(State(state): State<ApiState>) -> (StatusCode, Json<HealthResponse>) {
    let global_conf = state.global_conf.current();
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok".to_string(),
            version: crate::VERSION.to_string(),
            instance: global_conf.instance_identifier(),
            global_conf_valid: global_conf.verify_validity().is_ok(),
        }),
    )
}
