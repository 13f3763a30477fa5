//! Certificates bound to token keys.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::id::{ClientId, CsrId, KeyId, TokenId};

/// What a certificate (and the key it sits on) is used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CertificateUsage {
    /// Transport (TLS) authentication of the security server
    Authentication,
    /// Message signing on behalf of a member
    Signing,
}

impl fmt::Display for CertificateUsage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CertificateUsage::Authentication => write!(f, "authentication"),
            CertificateUsage::Signing => write!(f, "signing"),
        }
    }
}

/// Registration status of a certificate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CertificateStatus {
    Saved,
    RegistrationInProgress,
    Registered,
    DeletionInProgress,
    GlobalError,
}

impl CertificateStatus {
    /// Status assigned on a successful import.
    ///
    /// Authentication certificates still have to be registered with the central
    /// server; signing certificates are usable as soon as they are stored.
    pub fn initial_for(usage: CertificateUsage) -> Self {
        match usage {
            CertificateUsage::Authentication => CertificateStatus::Saved,
            CertificateUsage::Signing => CertificateStatus::Registered,
        }
    }
}

/// One certificate bound to one key on one token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateRecord {
    pub token_id: TokenId,
    pub key_id: KeyId,

    /// DER encoded certificate
    #[serde(with = "crate::utils::serde_base64")]
    pub certificate: Vec<u8>,

    pub usage: CertificateUsage,

    /// Lowercase hex SHA-256 of the DER bytes
    pub hash: String,

    /// True once durably stored in the signer configuration
    pub saved: bool,

    pub active: bool,
    pub status: CertificateStatus,

    /// Member the certificate was issued to (signing certificates)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<ClientId>,

    /// Pending request this certificate fulfilled
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub csr_id: Option<CsrId>,
}

impl CertificateRecord {
    pub fn matches_hash(&self, hash: &str) -> bool {
        self.hash.eq_ignore_ascii_case(hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_status() {
        assert_eq!(
            CertificateStatus::initial_for(CertificateUsage::Authentication),
            CertificateStatus::Saved
        );
        assert_eq!(
            CertificateStatus::initial_for(CertificateUsage::Signing),
            CertificateStatus::Registered
        );
    }

    #[test]
    fn test_usage_serialization() {
        assert_eq!(
            serde_json::to_string(&CertificateUsage::Authentication).unwrap(),
            "\"AUTHENTICATION\""
        );
        let usage: CertificateUsage = serde_json::from_str("\"SIGNING\"").unwrap();
        assert_eq!(usage, CertificateUsage::Signing);
    }
}
