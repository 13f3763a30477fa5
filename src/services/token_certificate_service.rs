//! Token certificate import and lookup
//!
//! Imports run a fail-fast pipeline. Each stage either passes or rejects the
//! certificate with exactly one [`ImportError`]:
//!
//! 1. parse the certificate (PEM or DER)
//! 2. check that the global configuration is still valid
//! 3. classify usage from the key usage extension
//! 4. authentication certificates need an approved CA of this instance
//! 5. signing certificates need a registered owner
//! 6. resolve the key the certificate belongs to
//! 7. reject certificates that are already saved
//! 8. match a pending certificate request
//! 9. commit through the signer backend
//!
//! Only the commit writes, so a rejected or abandoned import leaves no state behind.

use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn, Instrument};

use super::global_conf_service::GlobalConfService;
use super::import_error::ImportError;
use crate::{
    domain::{CertificateRecord, CertificateStatus, CertificateUsage, KeyId, KeyInfo},
    signer::{SignerBackend, SignerError, StoreCertificate},
    utils::{
        certificates::{parse_certificate, ParsedCertificate},
        normalize_hash,
    },
};

/// Import policy switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportPolicy {
    /// Signing certificates must fulfil a pending certificate request.
    pub require_csr_for_signing: bool,
}

impl Default for ImportPolicy {
    fn default() -> Self {
        Self { require_csr_for_signing: true }
    }
}

impl ImportPolicy {
    pub fn requires_csr(&self, usage: CertificateUsage) -> bool {
        usage == CertificateUsage::Signing && self.require_csr_for_signing
    }
}

/// A certificate submitted for import.
#[derive(Debug, Clone)]
pub struct ImportRequest {
    /// PEM or DER encoded certificate
    pub certificate: Vec<u8>,

    /// Usage the caller expects; a mismatch rejects the import
    pub expected_usage: Option<CertificateUsage>,
}

impl ImportRequest {
    pub fn new(certificate: impl Into<Vec<u8>>) -> Self {
        Self { certificate: certificate.into(), expected_usage: None }
    }

    pub fn with_expected_usage(mut self, usage: CertificateUsage) -> Self {
        self.expected_usage = Some(usage);
        self
    }
}

/// Where the key for an imported certificate comes from.
#[derive(Debug)]
enum KeySource {
    /// The key whose public key matches the certificate
    PublicKey,
    /// The key already holding a staged copy of the certificate
    Holder(KeyId),
}

/// Service for importing certificates onto token keys
pub struct TokenCertificateService {
    signer: Arc<dyn SignerBackend>,
    policy: ImportPolicy,
}

impl TokenCertificateService {
    pub fn new(signer: Arc<dyn SignerBackend>) -> Self {
        Self { signer, policy: ImportPolicy::default() }
    }

    pub fn with_policy(mut self, policy: ImportPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> ImportPolicy {
        self.policy
    }

    /// Import certificate bytes onto the key matching their public key.
    pub async fn import_certificate(
        &self,
        global_conf: &GlobalConfService,
        request: ImportRequest,
    ) -> Result<CertificateRecord, ImportError> {
        let span = crate::import_span!("upload");
        async move {
            let parsed = parse_certificate(&request.certificate).map_err(|err| {
                warn!(error = %err, "Rejected unparseable certificate");
                ImportError::from(err)
            })?;
            self.run(global_conf, parsed, request.expected_usage, KeySource::PublicKey).await
        }
        .instrument(span)
        .await
    }

    /// Import a certificate already present on a token, identified by its hash.
    pub async fn import_certificate_from_token(
        &self,
        global_conf: &GlobalConfService,
        hash: &str,
        expected_usage: Option<CertificateUsage>,
    ) -> Result<CertificateRecord, ImportError> {
        let span = crate::import_span!("token", requested_hash = %hash);
        async move {
            let hash = normalize_hash(hash);
            let Some(staged) = self
                .signer
                .certificate_by_hash(&hash)
                .await
                .map_err(ImportError::signer_fault)?
            else {
                warn!("Certificate not found on any token");
                return Err(ImportError::CertificateNotFound { hash });
            };

            let parsed = parse_certificate(&staged.certificate)?;
            self.run(global_conf, parsed, expected_usage, KeySource::Holder(staged.key_id)).await
        }
        .instrument(span)
        .await
    }

    /// Look up a certificate by hash, ignoring case.
    #[instrument(skip(self))]
    pub async fn get_certificate(&self, hash: &str) -> Result<CertificateRecord, ImportError> {
        let hash = normalize_hash(hash);
        self.signer
            .certificate_by_hash(&hash)
            .await
            .map_err(ImportError::signer_fault)?
            .ok_or(ImportError::CertificateNotFound { hash })
    }

    async fn run(
        &self,
        global_conf: &GlobalConfService,
        parsed: ParsedCertificate,
        expected_usage: Option<CertificateUsage>,
        source: KeySource,
    ) -> Result<CertificateRecord, ImportError> {
        tracing::Span::current().record("hash", parsed.hash.as_str());

        let result = self.run_stages(global_conf, parsed, expected_usage, source).await;
        match &result {
            Ok(record) => info!(
                key_id = %record.key_id,
                token_id = %record.token_id,
                usage = %record.usage,
                status = ?record.status,
                "Certificate imported"
            ),
            Err(ImportError::UnrecoverableFault { collaborator, code, message }) => error!(
                collaborator = %collaborator,
                fault_code = code.as_deref().unwrap_or("none"),
                message = %message,
                "Certificate import failed on collaborator fault"
            ),
            Err(err) => warn!(code = err.code(), error = %err, "Certificate import rejected"),
        }
        result
    }

    async fn run_stages(
        &self,
        global_conf: &GlobalConfService,
        parsed: ParsedCertificate,
        expected_usage: Option<CertificateUsage>,
        source: KeySource,
    ) -> Result<CertificateRecord, ImportError> {
        global_conf.verify_validity()?;

        let usage = classify_usage(&parsed, expected_usage)?;
        tracing::Span::current().record("usage", tracing::field::display(usage));

        let owner = match usage {
            CertificateUsage::Authentication => {
                verify_authentication_eligible(global_conf, &parsed)?;
                None
            }
            CertificateUsage::Signing => {
                let owner = parsed.signing_owner()?;
                if !global_conf.member_identifiers_exist(std::slice::from_ref(&owner)) {
                    return Err(ImportError::ClientNotFound { client_id: owner });
                }
                Some(owner)
            }
        };

        let key = self.resolve_key(&parsed, source).await?;
        if let Some(key_usage) = key.usage {
            if key_usage != usage {
                return Err(ImportError::WrongCertificateUsage {
                    reason: format!("Key {} is a {key_usage} key, certificate is for {usage}", key.id),
                });
            }
        }

        if let Some(existing) = self
            .signer
            .certificate_by_hash(&parsed.hash)
            .await
            .map_err(ImportError::signer_fault)?
        {
            if existing.saved {
                return Err(ImportError::CertificateAlreadyExists { hash: parsed.hash });
            }
        }

        let csr = self
            .signer
            .find_csr(&key.id, &parsed.subject)
            .await
            .map_err(ImportError::signer_fault)?;
        if csr.is_none() && self.policy.requires_csr(usage) {
            return Err(ImportError::CsrNotFound { key_id: key.id, subject: parsed.subject });
        }
        debug!(key_id = %key.id, csr_id = ?csr.as_ref().map(|c| &c.id), "Committing certificate");

        let KeyInfo { id: key_id, token_id, .. } = key;
        let subject = parsed.subject;
        let record = CertificateRecord {
            token_id,
            key_id: key_id.clone(),
            certificate: parsed.der,
            usage,
            hash: parsed.hash,
            saved: false,
            active: true,
            status: CertificateStatus::initial_for(usage),
            owner,
            csr_id: None,
        };
        let request =
            StoreCertificate { key_id: key_id.clone(), record, csr_id: csr.map(|csr| csr.id) };

        self.signer.store_certificate(request).await.map_err(|err| match err {
            SignerError::DuplicateCertificate { hash } => {
                ImportError::CertificateAlreadyExists { hash }
            }
            SignerError::KeyNotFound { key_id } => ImportError::KeyNotFound {
                reason: format!("Key {key_id} disappeared before the certificate was stored"),
            },
            SignerError::CsrNotFound { .. } => ImportError::CsrNotFound { key_id, subject },
            err @ SignerError::KeyUsageMismatch { .. } => {
                ImportError::WrongCertificateUsage { reason: err.to_string() }
            }
            other => ImportError::signer_fault(other),
        })
    }

    async fn resolve_key(
        &self,
        parsed: &ParsedCertificate,
        source: KeySource,
    ) -> Result<KeyInfo, ImportError> {
        match source {
            KeySource::PublicKey => self
                .signer
                .key_by_public_key(&parsed.public_key)
                .await
                .map_err(ImportError::signer_fault)?
                .ok_or_else(|| ImportError::KeyNotFound {
                    reason: "No token key matches the certificate public key".to_string(),
                }),
            KeySource::Holder(key_id) => self
                .signer
                .key(&key_id)
                .await
                .map_err(ImportError::signer_fault)?
                .ok_or_else(|| ImportError::KeyNotFound {
                    reason: format!("Key {key_id} holding the certificate does not exist"),
                }),
        }
    }
}

/// Usage from the key usage bits, checked against what the caller expected.
fn classify_usage(
    parsed: &ParsedCertificate,
    expected: Option<CertificateUsage>,
) -> Result<CertificateUsage, ImportError> {
    let usage = parsed.usage().ok_or_else(|| ImportError::WrongCertificateUsage {
        reason: "Key usage marks neither a signing nor an authentication certificate".to_string(),
    })?;
    match expected {
        Some(expected) if expected != usage => Err(ImportError::WrongCertificateUsage {
            reason: format!("Expected a {expected} certificate, got a {usage} certificate"),
        }),
        _ => Ok(usage),
    }
}

/// Authentication certificates must come from a CA approved for this instance.
fn verify_authentication_eligible(
    global_conf: &GlobalConfService,
    parsed: &ParsedCertificate,
) -> Result<(), ImportError> {
    let approved = global_conf.approved_cas_for_this_instance();
    if approved.iter().any(|ca| parsed.issued_by(&ca.name)) {
        return Ok(());
    }
    Err(ImportError::AuthCertificateNotSupported {
        issuer: parsed.issuer_common_name.clone().unwrap_or_else(|| parsed.issuer.clone()),
    })
}
