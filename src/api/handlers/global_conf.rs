//! Read-only views of the current global configuration.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::{
    api::{error::ApiError, routes::ApiState},
    services::{GlobalConfService, ImportError},
};

/// An approved certificate authority of this instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateAuthorityResponse {
    pub name: String,
    pub authentication_only: bool,
}

fn verified(state: &ApiState) -> Result<GlobalConfService, ApiError> {
    let global_conf = GlobalConfService::new(state.global_conf.current());
    global_conf.verify_validity().map_err(ImportError::from)?;
    Ok(global_conf)
}

#[instrument(skip(state))]
pub async fn list_certificate_authorities_handler(
    State(state): State<ApiState>,
) -> Result<Json<Vec<CertificateAuthorityResponse>>, ApiError> {
    let global_conf = verified(&state)?;
    let cas = global_conf
        .approved_cas_for_this_instance()
        .into_iter()
        .map(|ca| CertificateAuthorityResponse {
            name: ca.name,
            authentication_only: ca.authentication_only,
        })
        .collect();
    Ok(Json(cas))
}

#[instrument(skip(state))]
pub async fn list_member_classes_handler(
    State(state): State<ApiState>,
) -> Result<Json<Vec<String>>, ApiError> {
    let global_conf = verified(&state)?;
    Ok(Json(global_conf.member_classes_for_this_instance().into_iter().collect()))
}
