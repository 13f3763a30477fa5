//! Failure taxonomy of the certificate import pipeline.

use std::fmt;
use thiserror::Error;

use crate::domain::{ClientId, KeyId};
use crate::errors::CertificateError;
use crate::globalconf::GlobalConfError;
use crate::signer::SignerError;

use super::global_conf_service::ValidityError;

/// External component a fatal fault came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collaborator {
    GlobalConf,
    Signer,
}

impl fmt::Display for Collaborator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Collaborator::GlobalConf => write!(f, "global_conf"),
            Collaborator::Signer => write!(f, "signer"),
        }
    }
}

/// How a failure propagates to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropagationClass {
    /// The caller can fix the input and retry.
    ClientCorrectable,
    /// A referenced entity does not exist.
    NotFound,
    /// The request conflicts with current state.
    Conflict,
    /// Unexpected collaborator failure; never reclassified.
    Fatal,
}

/// Why an import or lookup was rejected. Exactly one kind per outcome.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImportError {
    #[error("Invalid certificate: {reason}")]
    InvalidCertificate { reason: String },

    #[error("Global configuration is outdated: {message}")]
    ConfigurationOutdated { message: String },

    #[error("Wrong certificate usage: {reason}")]
    WrongCertificateUsage { reason: String },

    #[error("Authentication certificates issued by '{issuer}' are not supported")]
    AuthCertificateNotSupported { issuer: String },

    #[error("Client {client_id} not found in global configuration")]
    ClientNotFound { client_id: ClientId },

    #[error("Key not found: {reason}")]
    KeyNotFound { reason: String },

    #[error("Certificate {hash} already exists")]
    CertificateAlreadyExists { hash: String },

    #[error("No certificate request for '{subject}' on key {key_id}")]
    CsrNotFound { key_id: KeyId, subject: String },

    #[error("Certificate {hash} not found")]
    CertificateNotFound { hash: String },

    #[error("Unrecoverable {collaborator} fault{}: {message}", code_suffix(.code))]
    UnrecoverableFault { collaborator: Collaborator, code: Option<String>, message: String },
}

fn code_suffix(code: &Option<String>) -> String {
    code.as_ref().map(|c| format!(" ({c})")).unwrap_or_default()
}

impl ImportError {
    /// Stable machine-readable error code.
    pub fn code(&self) -> &'static str {
        match self {
            ImportError::InvalidCertificate { .. } => "invalid_cert",
            ImportError::ConfigurationOutdated { .. } => "global_conf_outdated",
            ImportError::WrongCertificateUsage { .. } => "wrong_cert_usage",
            ImportError::AuthCertificateNotSupported { .. } => "auth_cert_not_supported",
            ImportError::ClientNotFound { .. } => "client_not_found",
            ImportError::KeyNotFound { .. } => "key_not_found",
            ImportError::CertificateAlreadyExists { .. } => "certificate_already_exists",
            ImportError::CsrNotFound { .. } => "csr_not_found",
            ImportError::CertificateNotFound { .. } => "certificate_not_found",
            ImportError::UnrecoverableFault { .. } => "internal_error",
        }
    }

    /// Variant name, used as the error kind at the API boundary.
    pub fn kind(&self) -> &'static str {
        match self {
            ImportError::InvalidCertificate { .. } => "InvalidCertificate",
            ImportError::ConfigurationOutdated { .. } => "ConfigurationOutdated",
            ImportError::WrongCertificateUsage { .. } => "WrongCertificateUsage",
            ImportError::AuthCertificateNotSupported { .. } => "AuthCertificateNotSupported",
            ImportError::ClientNotFound { .. } => "ClientNotFound",
            ImportError::KeyNotFound { .. } => "KeyNotFound",
            ImportError::CertificateAlreadyExists { .. } => "CertificateAlreadyExists",
            ImportError::CsrNotFound { .. } => "CsrNotFound",
            ImportError::CertificateNotFound { .. } => "CertificateNotFound",
            ImportError::UnrecoverableFault { .. } => "UnrecoverableFault",
        }
    }

    pub fn class(&self) -> PropagationClass {
        match self {
            ImportError::InvalidCertificate { .. }
            | ImportError::WrongCertificateUsage { .. }
            | ImportError::AuthCertificateNotSupported { .. } => {
                PropagationClass::ClientCorrectable
            }
            ImportError::ClientNotFound { .. }
            | ImportError::KeyNotFound { .. }
            | ImportError::CsrNotFound { .. }
            | ImportError::CertificateNotFound { .. } => PropagationClass::NotFound,
            ImportError::CertificateAlreadyExists { .. }
            | ImportError::ConfigurationOutdated { .. } => PropagationClass::Conflict,
            ImportError::UnrecoverableFault { .. } => PropagationClass::Fatal,
        }
    }

    pub fn is_fatal(&self) -> bool {
        self.class() == PropagationClass::Fatal
    }

    pub(crate) fn global_conf_fault(err: GlobalConfError) -> Self {
        ImportError::UnrecoverableFault {
            collaborator: Collaborator::GlobalConf,
            code: err.code,
            message: err.message,
        }
    }

    pub(crate) fn signer_fault(err: SignerError) -> Self {
        ImportError::UnrecoverableFault {
            collaborator: Collaborator::Signer,
            code: Some(err.code().to_string()),
            message: err.to_string(),
        }
    }
}

impl From<CertificateError> for ImportError {
    fn from(err: CertificateError) -> Self {
        ImportError::InvalidCertificate { reason: err.to_string() }
    }
}

impl From<ValidityError> for ImportError {
    fn from(err: ValidityError) -> Self {
        match err {
            ValidityError::Outdated { message } => ImportError::ConfigurationOutdated { message },
            ValidityError::Fault(fault) => ImportError::global_conf_fault(fault),
        }
    }
}
