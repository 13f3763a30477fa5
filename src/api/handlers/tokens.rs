//! Token listing endpoint.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::{
    api::{error::ApiError, routes::ApiState},
    domain::{CertificateStatus, CertificateUsage, CsrInfo, KeyInfo, TokenInfo, TokenType},
    services::ImportError,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateSummary {
    pub hash: String,
    pub usage: CertificateUsage,
    pub status: CertificateStatus,
    pub saved: bool,
    pub active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CsrSummary {
    pub id: String,
    pub subject: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub member_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyResponse {
    pub id: String,
    pub label: Option<String>,
    pub usage: Option<CertificateUsage>,
    pub saved_to_configuration: bool,
    pub certificates: Vec<CertificateSummary>,
    pub certificate_signing_requests: Vec<CsrSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub id: String,
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub token_type: TokenType,
    pub logged_in: bool,
    pub available: bool,
    pub read_only: bool,
    pub saved_to_configuration: bool,
    pub keys: Vec<KeyResponse>,
}

impl From<&CsrInfo> for CsrSummary {
    fn from(csr: &CsrInfo) -> Self {
        Self {
            id: csr.id.to_string(),
            subject: csr.subject.clone(),
            member_id: csr.member_id.as_ref().map(ToString::to_string),
        }
    }
}

impl From<&KeyInfo> for KeyResponse {
    fn from(key: &KeyInfo) -> Self {
        Self {
            id: key.id.to_string(),
            label: key.label.clone(),
            usage: key.usage,
            saved_to_configuration: key.is_saved_to_configuration(),
            certificates: key
                .certificates
                .iter()
                .map(|cert| CertificateSummary {
                    hash: cert.hash.clone(),
                    usage: cert.usage,
                    status: cert.status,
                    saved: cert.saved,
                    active: cert.active,
                    owner: cert.owner.as_ref().map(ToString::to_string),
                })
                .collect(),
            certificate_signing_requests: key.csrs.iter().map(CsrSummary::from).collect(),
        }
    }
}

impl From<&TokenInfo> for TokenResponse {
    fn from(token: &TokenInfo) -> Self {
        Self {
            id: token.id.to_string(),
            name: token.friendly_name.clone(),
            token_type: token.token_type,
            logged_in: token.active,
            available: token.available,
            read_only: token.read_only,
            saved_to_configuration: token.is_saved_to_configuration(),
            keys: token.keys.iter().map(KeyResponse::from).collect(),
        }
    }
}

#[instrument(skip(state))]
pub async fn list_tokens_handler(
    State(state): State<ApiState>,
) -> Result<Json<Vec<TokenResponse>>, ApiError> {
    let tokens = state.signer.tokens().await.map_err(ImportError::signer_fault)?;
    Ok(Json(tokens.iter().map(TokenResponse::from).collect()))
}
