//! Token certificate import and lookup endpoints.

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header, StatusCode},
    Json,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::{
    api::{error::ApiError, routes::ApiState},
    domain::{CertificateRecord, CertificateStatus, CertificateUsage},
    services::{GlobalConfService, ImportRequest},
    utils::certificates::parse_certificate,
};

/// Query parameters accepted by the upload endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImportQuery {
    /// Reject the certificate unless it has this usage
    pub usage: Option<CertificateUsage>,
}

/// Details read from the certificate itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateDetails {
    pub subject: String,
    pub issuer: String,
    pub serial: String,
    pub not_before: DateTime<Utc>,
    pub not_after: DateTime<Utc>,
}

/// A certificate on a token key.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenCertificateResponse {
    pub hash: String,
    pub token_id: String,
    pub key_id: String,
    pub usage: CertificateUsage,
    pub status: CertificateStatus,
    pub saved: bool,
    pub active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub csr_id: Option<String>,
    /// Absent when the stored bytes cannot be parsed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<CertificateDetails>,
    /// Base64 encoded DER
    pub certificate: String,
}

impl From<CertificateRecord> for TokenCertificateResponse {
    fn from(record: CertificateRecord) -> Self {
        let details = parse_certificate(&record.certificate).ok().map(|parsed| {
            CertificateDetails {
                subject: parsed.subject,
                issuer: parsed.issuer,
                serial: parsed.serial,
                not_before: parsed.not_before,
                not_after: parsed.not_after,
            }
        });

        Self {
            hash: record.hash,
            token_id: record.token_id.to_string(),
            key_id: record.key_id.to_string(),
            usage: record.usage,
            status: record.status,
            saved: record.saved,
            active: record.active,
            owner: record.owner.map(|owner| owner.to_string()),
            csr_id: record.csr_id.map(|id| id.to_string()),
            details,
            certificate: STANDARD.encode(&record.certificate),
        }
    }
}

type Created = (StatusCode, [(header::HeaderName, String); 1], Json<TokenCertificateResponse>);

fn created(record: CertificateRecord) -> Created {
    let location = format!("/api/token-certificates/{}", record.hash);
    (StatusCode::CREATED, [(header::LOCATION, location)], Json(record.into()))
}

/// Import a DER or PEM certificate sent as the raw request body.
#[instrument(skip(state, body), fields(bytes = body.len()))]
pub async fn import_certificate_handler(
    State(state): State<ApiState>,
    Query(query): Query<ImportQuery>,
    body: Bytes,
) -> Result<Created, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(ApiError::bad_request("Certificate body is empty"));
    }

    let global_conf = GlobalConfService::new(state.global_conf.current());
    let mut request = ImportRequest::new(body.to_vec());
    if let Some(usage) = query.usage {
        request = request.with_expected_usage(usage);
    }

    let record = state.certificates.import_certificate(&global_conf, request).await?;
    Ok(created(record))
}

/// Import a certificate already present on a token.
#[instrument(skip(state))]
pub async fn import_certificate_from_token_handler(
    State(state): State<ApiState>,
    Path(hash): Path<String>,
) -> Result<Created, ApiError> {
    let global_conf = GlobalConfService::new(state.global_conf.current());
    let record =
        state.certificates.import_certificate_from_token(&global_conf, &hash, None).await?;
    Ok(created(record))
}

#[instrument(skip(state))]
pub async fn get_certificate_handler(
    State(state): State<ApiState>,
    Path(hash): Path<String>,
) -> Result<Json<TokenCertificateResponse>, ApiError> {
    let record = state.certificates.get_certificate(&hash).await?;
    Ok(Json(record.into()))
}
