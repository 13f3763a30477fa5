//! # Signing Backend
//!
//! Tokens, keys, certificates and pending requests live in the signing backend.
//! The import pipeline reaches it only through the [`SignerBackend`] trait, and
//! its only write is [`SignerBackend::store_certificate`].
//!
//! [`MemorySigner`] keeps the whole backend state in memory and can be seeded
//! from a JSON file of [`TokenInfo`] entries.

pub mod memory;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{
    CertificateRecord, CertificateUsage, CsrId, CsrInfo, KeyId, KeyInfo, TokenInfo,
};

pub use memory::MemorySigner;

/// Errors reported by a signing backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignerError {
    /// A saved certificate with the same hash already exists.
    #[error("Certificate {hash} already exists")]
    DuplicateCertificate { hash: String },

    #[error("Key not found: {key_id}")]
    KeyNotFound { key_id: KeyId },

    #[error("Certificate request not found: {csr_id}")]
    CsrNotFound { csr_id: CsrId },

    /// The key is already bound to the other usage.
    #[error("Key {key_id} is a {bound} key, certificate is for {requested}")]
    KeyUsageMismatch { key_id: KeyId, bound: CertificateUsage, requested: CertificateUsage },

    /// Any other backend failure.
    #[error("Signer backend error ({code}): {message}")]
    Backend { code: String, message: String },
}

impl SignerError {
    pub fn backend(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Backend { code: code.into(), message: message.into() }
    }

    /// Machine readable fault code.
    pub fn code(&self) -> &str {
        match self {
            SignerError::DuplicateCertificate { .. } => "duplicate_certificate",
            SignerError::KeyNotFound { .. } => "key_not_found",
            SignerError::CsrNotFound { .. } => "csr_not_found",
            SignerError::KeyUsageMismatch { .. } => "key_usage_mismatch",
            SignerError::Backend { code, .. } => code,
        }
    }
}

/// A certificate to bind to a key.
#[derive(Debug, Clone)]
pub struct StoreCertificate {
    pub key_id: KeyId,

    /// Record to store; the backend fills in the owning token and marks it saved.
    pub record: CertificateRecord,

    /// Pending request consumed by this certificate
    pub csr_id: Option<CsrId>,
}

/// Access to the signing backend.
///
/// Lookups by hash expect a normalized lowercase hex hash.
#[async_trait]
pub trait SignerBackend: Send + Sync {
    async fn tokens(&self) -> Result<Vec<TokenInfo>, SignerError>;

    /// Find a certificate by hash on any key. A saved copy is returned in
    /// preference to a staged one.
    async fn certificate_by_hash(&self, hash: &str)
        -> Result<Option<CertificateRecord>, SignerError>;

    /// Find the key whose DER encoded SubjectPublicKeyInfo equals `public_key`.
    async fn key_by_public_key(&self, public_key: &[u8]) -> Result<Option<KeyInfo>, SignerError>;

    async fn key(&self, key_id: &KeyId) -> Result<Option<KeyInfo>, SignerError>;

    /// Find a pending request on the key whose subject equals `subject`.
    async fn find_csr(&self, key_id: &KeyId, subject: &str)
        -> Result<Option<CsrInfo>, SignerError>;

    /// Durably bind a certificate to a key and consume its request.
    ///
    /// The write is atomic. It fails with
    /// [`SignerError::DuplicateCertificate`] when a saved certificate with the
    /// same hash exists anywhere, so concurrent imports of one certificate
    /// resolve to a single success.
    async fn store_certificate(
        &self,
        request: StoreCertificate,
    ) -> Result<CertificateRecord, SignerError>;
}
