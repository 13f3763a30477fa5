//! In-memory signing backend.

use async_trait::async_trait;
use std::path::Path;
use tokio::sync::RwLock;
use tracing::{debug, info};

use super::{SignerBackend, SignerError, StoreCertificate};
use crate::domain::{CertificateRecord, CsrInfo, KeyId, KeyInfo, TokenInfo};
use crate::errors::{Error, Result};

/// Signing backend holding all tokens in memory.
///
/// Writes take the lock exclusively, so the duplicate check and the insert in
/// [`SignerBackend::store_certificate`] happen as one step.
#[derive(Debug, Default)]
pub struct MemorySigner {
    tokens: RwLock<Vec<TokenInfo>>,
}

impl MemorySigner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tokens(tokens: Vec<TokenInfo>) -> Self {
        Self { tokens: RwLock::new(tokens) }
    }

    /// Load tokens from a JSON array of token descriptions.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            Error::io(e, format!("Failed to read signer state {}", path.display()))
        })?;
        let tokens: Vec<TokenInfo> = serde_json::from_str(&contents)
            .map_err(|e| Error::serialization(e, "Failed to parse signer state"))?;
        info!(path = %path.display(), tokens = tokens.len(), "Loaded signer state");
        Ok(Self::with_tokens(tokens))
    }

    pub async fn add_token(&self, token: TokenInfo) {
        self.tokens.write().await.push(token);
    }
}

fn find_key<'a>(tokens: &'a [TokenInfo], key_id: &KeyId) -> Option<(&'a TokenInfo, &'a KeyInfo)> {
    tokens
        .iter()
        .find_map(|token| token.keys.iter().find(|key| &key.id == key_id).map(|key| (token, key)))
}

#[async_trait]
impl SignerBackend for MemorySigner {
    async fn tokens(&self) -> std::result::Result<Vec<TokenInfo>, SignerError> {
        Ok(self.tokens.read().await.clone())
    }

    async fn certificate_by_hash(
        &self,
        hash: &str,
    ) -> std::result::Result<Option<CertificateRecord>, SignerError> {
        let tokens = self.tokens.read().await;
        let mut staged = None;
        for cert in tokens.iter().flat_map(TokenInfo::certificates) {
            if cert.matches_hash(hash) {
                if cert.saved {
                    return Ok(Some(cert.clone()));
                }
                staged.get_or_insert_with(|| cert.clone());
            }
        }
        Ok(staged)
    }

    async fn key_by_public_key(
        &self,
        public_key: &[u8],
    ) -> std::result::Result<Option<KeyInfo>, SignerError> {
        let tokens = self.tokens.read().await;
        Ok(tokens
            .iter()
            .flat_map(|token| token.keys.iter())
            .find(|key| key.public_key == public_key)
            .cloned())
    }

    async fn key(&self, key_id: &KeyId) -> std::result::Result<Option<KeyInfo>, SignerError> {
        let tokens = self.tokens.read().await;
        Ok(find_key(&tokens, key_id).map(|(_, key)| key.clone()))
    }

    async fn find_csr(
        &self,
        key_id: &KeyId,
        subject: &str,
    ) -> std::result::Result<Option<CsrInfo>, SignerError> {
        let tokens = self.tokens.read().await;
        Ok(find_key(&tokens, key_id)
            .and_then(|(_, key)| key.csrs.iter().find(|csr| csr.subject == subject).cloned()))
    }

    async fn store_certificate(
        &self,
        request: StoreCertificate,
    ) -> std::result::Result<CertificateRecord, SignerError> {
        let StoreCertificate { key_id, mut record, csr_id } = request;
        let mut tokens = self.tokens.write().await;

        if tokens
            .iter()
            .flat_map(TokenInfo::certificates)
            .any(|cert| cert.saved && cert.matches_hash(&record.hash))
        {
            return Err(SignerError::DuplicateCertificate { hash: record.hash });
        }

        let token = tokens
            .iter_mut()
            .find(|token| token.keys.iter().any(|key| key.id == key_id))
            .ok_or_else(|| SignerError::KeyNotFound { key_id: key_id.clone() })?;
        if !token.available {
            return Err(SignerError::backend(
                "token_not_available",
                format!("Token {} is not available", token.id),
            ));
        }
        let token_id = token.id.clone();
        let key = token
            .keys
            .iter_mut()
            .find(|key| key.id == key_id)
            .ok_or_else(|| SignerError::KeyNotFound { key_id: key_id.clone() })?;
        if let Some(bound) = key.usage {
            if bound != record.usage {
                return Err(SignerError::KeyUsageMismatch {
                    key_id,
                    bound,
                    requested: record.usage,
                });
            }
        }

        if let Some(csr_id) = &csr_id {
            let position = key
                .csrs
                .iter()
                .position(|csr| &csr.id == csr_id)
                .ok_or_else(|| SignerError::CsrNotFound { csr_id: csr_id.clone() })?;
            key.csrs.remove(position);
        }

        record.token_id = token_id;
        record.key_id = key_id;
        record.saved = true;
        record.csr_id = csr_id;
        key.usage.get_or_insert(record.usage);

        // A staged copy on the key is promoted in place.
        match key.certificates.iter_mut().find(|cert| cert.matches_hash(&record.hash)) {
            Some(staged) => *staged = record.clone(),
            None => key.certificates.push(record.clone()),
        }

        debug!(
            hash = %record.hash,
            key_id = %record.key_id,
            token_id = %record.token_id,
            usage = %record.usage,
            "Stored certificate"
        );
        Ok(record)
    }
}
