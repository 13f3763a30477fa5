use thiserror::Error;

/// Errors surfaced while decoding submitted certificate material.
#[derive(Debug, Error)]
pub enum CertificateError {
    /// No certificate bytes were supplied.
    #[error("Certificate content is empty")]
    Empty,

    /// The input looked like PEM but could not be decoded.
    #[error("Certificate is not a valid PEM: {reason}")]
    InvalidPem { reason: String },

    /// The PEM block does not hold a certificate.
    #[error("PEM block has label '{label}', expected CERTIFICATE")]
    UnexpectedPemLabel { label: String },

    /// The DER contents are not an X.509 certificate.
    #[error("Certificate is not a valid X.509 DER structure: {reason}")]
    InvalidDer { reason: String },

    /// Extra bytes follow the certificate structure.
    #[error("Certificate is followed by {count} unexpected trailing bytes")]
    TrailingData { count: usize },

    /// A certificate extension could not be decoded.
    #[error("Certificate extension '{extension}' is malformed: {reason}")]
    MalformedExtension { extension: &'static str, reason: String },

    /// A subject attribute required to derive the owner is missing or unreadable.
    #[error("Certificate subject is missing attribute '{attribute}'")]
    MissingSubjectAttribute { attribute: &'static str },
}
