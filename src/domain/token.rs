//! Tokens, keys and pending certificate requests as seen through the signer.

use serde::{Deserialize, Serialize};

use super::certificate::{CertificateRecord, CertificateUsage};
use super::id::{ClientId, CsrId, KeyId, TokenId};

/// Kind of cryptographic module backing a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TokenType {
    Software,
    Hardware,
}

/// A pending certificate signing request on a key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CsrInfo {
    pub id: CsrId,

    /// Subject distinguished name requested, in `C=FI, O=GOV, CN=M1` form
    pub subject: String,

    /// Member the request was generated for (signing requests)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub member_id: Option<ClientId>,
}

/// A key on a token together with its certificates and pending requests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyInfo {
    pub id: KeyId,
    pub token_id: TokenId,

    #[serde(default)]
    pub label: Option<String>,

    /// Usage assigned when the first request or certificate was bound to the key
    #[serde(default)]
    pub usage: Option<CertificateUsage>,

    /// DER encoded SubjectPublicKeyInfo
    #[serde(with = "crate::utils::serde_base64")]
    pub public_key: Vec<u8>,

    #[serde(default)]
    pub certificates: Vec<CertificateRecord>,

    #[serde(default)]
    pub csrs: Vec<CsrInfo>,
}

impl KeyInfo {
    /// A key counts as saved to configuration when it holds a saved
    /// certificate or has a pending request.
    pub fn is_saved_to_configuration(&self) -> bool {
        !self.csrs.is_empty() || self.certificates.iter().any(|cert| cert.saved)
    }
}

/// A hardware or software token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenInfo {
    pub id: TokenId,

    #[serde(default)]
    pub friendly_name: Option<String>,

    pub token_type: TokenType,

    /// Logged in
    #[serde(default)]
    pub active: bool,

    #[serde(default = "default_true")]
    pub available: bool,

    #[serde(default)]
    pub read_only: bool,

    #[serde(default)]
    pub keys: Vec<KeyInfo>,
}

fn default_true() -> bool {
    true
}

impl TokenInfo {
    pub fn is_saved_to_configuration(&self) -> bool {
        self.keys.iter().any(KeyInfo::is_saved_to_configuration)
    }

    pub fn certificates(&self) -> impl Iterator<Item = &CertificateRecord> {
        self.keys.iter().flat_map(|key| key.certificates.iter())
    }
}
