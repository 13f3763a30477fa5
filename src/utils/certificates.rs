use chrono::{DateTime, TimeZone, Utc};
use sha2::{Digest, Sha256};
use x509_parser::{pem::parse_x509_pem, prelude::*};

use crate::{
    domain::{CertificateUsage, ClientId},
    errors::CertificateError,
};

/// Key usage bits that decide what a certificate is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyUsageFlags {
    pub digital_signature: bool,
    pub non_repudiation: bool,
}

/// Subject attributes used to derive the owner of a signing certificate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubjectAttributes {
    pub country: Option<String>,
    pub organization: Option<String>,
    pub organizational_unit: Option<String>,
    pub common_name: Option<String>,
}

/// Metadata extracted from a submitted certificate. Owns its data so it can
/// outlive the input buffer.
#[derive(Debug, Clone)]
pub struct ParsedCertificate {
    pub der: Vec<u8>,
    pub hash: String,
    pub subject: String,
    pub issuer: String,
    pub issuer_common_name: Option<String>,
    pub serial: String,
    pub not_before: DateTime<Utc>,
    pub not_after: DateTime<Utc>,
    /// DER encoded SubjectPublicKeyInfo
    pub public_key: Vec<u8>,
    /// None when the certificate has no key usage extension
    pub key_usage: Option<KeyUsageFlags>,
    pub subject_attributes: SubjectAttributes,
}

impl ParsedCertificate {
    /// Classify the certificate from its key usage bits.
    ///
    /// Non-repudiation marks a signing certificate. Digital signature without
    /// non-repudiation marks an authentication certificate. Anything else has
    /// no usage this gateway can accept.
    pub fn usage(&self) -> Option<CertificateUsage> {
        let flags = self.key_usage?;
        if flags.non_repudiation {
            Some(CertificateUsage::Signing)
        } else if flags.digital_signature {
            Some(CertificateUsage::Authentication)
        } else {
            None
        }
    }

    /// Owner of a signing certificate: `C` is the instance, `O` the member
    /// class, `CN` the member code and an optional `OU` the subsystem.
    pub fn signing_owner(&self) -> Result<ClientId, CertificateError> {
        let attrs = &self.subject_attributes;
        let instance = attrs
            .country
            .clone()
            .ok_or(CertificateError::MissingSubjectAttribute { attribute: "C" })?;
        let member_class = attrs
            .organization
            .clone()
            .ok_or(CertificateError::MissingSubjectAttribute { attribute: "O" })?;
        let member_code = attrs
            .common_name
            .clone()
            .ok_or(CertificateError::MissingSubjectAttribute { attribute: "CN" })?;

        Ok(ClientId {
            instance,
            member_class,
            member_code,
            subsystem_code: attrs.organizational_unit.clone(),
        })
    }

    /// Whether an approved CA entry names this certificate's issuer. The CA
    /// name is compared against the issuer common name, or the full issuer
    /// name when the issuer has no common name.
    pub fn issued_by(&self, ca_name: &str) -> bool {
        let ca_name = ca_name.trim();
        match &self.issuer_common_name {
            Some(common_name) => common_name == ca_name || self.issuer == ca_name,
            None => self.issuer == ca_name,
        }
    }
}

/// Decode submitted bytes into DER. PEM input is unwrapped; anything else is
/// taken as DER.
pub fn decode_certificate(input: &[u8]) -> Result<Vec<u8>, CertificateError> {
    let trimmed = input.trim_ascii_start();
    if trimmed.is_empty() {
        return Err(CertificateError::Empty);
    }

    if !trimmed.starts_with(b"-----BEGIN") {
        return Ok(input.to_vec());
    }

    let (_, pem) = parse_x509_pem(trimmed)
        .map_err(|err| CertificateError::InvalidPem { reason: err.to_string() })?;
    if pem.label != "CERTIFICATE" {
        return Err(CertificateError::UnexpectedPemLabel { label: pem.label });
    }
    Ok(pem.contents)
}

/// Lowercase hex SHA-256 of the DER bytes; the external identity of a certificate.
pub fn certificate_hash(der: &[u8]) -> String {
    hex::encode(Sha256::digest(der))
}

/// Parse PEM or DER certificate bytes.
pub fn parse_certificate(input: &[u8]) -> Result<ParsedCertificate, CertificateError> {
    let der = decode_certificate(input)?;
    let parsed = read_certificate(&der)?;
    Ok(ParsedCertificate { der, ..parsed })
}

fn read_certificate(der: &[u8]) -> Result<ParsedCertificate, CertificateError> {
    let (remaining, cert) = X509Certificate::from_der(der)
        .map_err(|err| CertificateError::InvalidDer { reason: err.to_string() })?;
    if !remaining.is_empty() {
        return Err(CertificateError::TrailingData { count: remaining.len() });
    }

    let key_usage = cert
        .key_usage()
        .map_err(|err| CertificateError::MalformedExtension {
            extension: "keyUsage",
            reason: err.to_string(),
        })?
        .map(|ext| KeyUsageFlags {
            digital_signature: ext.value.digital_signature(),
            non_repudiation: ext.value.non_repudiation(),
        });

    let subject = cert.subject();
    let subject_attributes = SubjectAttributes {
        country: first_attribute(subject.iter_country()),
        organization: first_attribute(subject.iter_organization()),
        organizational_unit: first_attribute(subject.iter_organizational_unit()),
        common_name: first_attribute(subject.iter_common_name()),
    };

    Ok(ParsedCertificate {
        der: Vec::new(),
        hash: certificate_hash(der),
        subject: subject.to_string(),
        issuer: cert.issuer().to_string(),
        issuer_common_name: first_attribute(cert.issuer().iter_common_name()),
        serial: cert.raw_serial_as_string(),
        not_before: asn1_time_to_chrono(&cert.validity().not_before),
        not_after: asn1_time_to_chrono(&cert.validity().not_after),
        public_key: cert.public_key().raw.to_vec(),
        key_usage,
        subject_attributes,
    })
}

fn first_attribute<'s, 'a: 's>(
    mut values: impl Iterator<Item = &'s AttributeTypeAndValue<'a>>,
) -> Option<String> {
    values.next().and_then(|attr| attr.as_str().ok()).map(str::to_string)
}

fn asn1_time_to_chrono(time: &ASN1Time) -> DateTime<Utc> {
    Utc.timestamp_opt(time.timestamp(), 0).single().unwrap_or(DateTime::<Utc>::MIN_UTC)
}
