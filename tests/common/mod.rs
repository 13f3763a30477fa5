//! Shared fixtures for certgate integration tests.
#![allow(dead_code)]

use std::collections::{BTreeSet, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use chrono::{Duration, Utc};
use rcgen::{
    BasicConstraints, Certificate, CertificateParams, DistinguishedName, DnType, IsCa, Issuer,
    KeyPair, KeyUsagePurpose, PublicKeyData, SerialNumber,
};

use certgate::{
    domain::{
        CertificateRecord, CertificateStatus, CertificateUsage, ClientId, CsrId, CsrInfo, KeyId,
        KeyInfo, SecurityServerId, TokenId, TokenInfo, TokenType,
    },
    globalconf::{
        ApprovedCa, GlobalConfError, GlobalConfFacade, GlobalGroupInfo, MemberInfo, TrustSnapshot,
    },
    services::GlobalConfService,
    signer::{SignerBackend, SignerError, StoreCertificate},
    utils::certificates::{certificate_hash, parse_certificate},
};

pub const TEST_CA: &str = "Test CA";
pub const FOREIGN_CA: &str = "Foreign CA";

static SERIAL: AtomicU64 = AtomicU64::new(1);

/// A certificate authority minting test certificates.
pub struct TestCa {
    cert: Certificate,
    issuer: Issuer<'static, KeyPair>,
}

impl TestCa {
    pub fn new(common_name: &str) -> anyhow::Result<Self> {
        let key = KeyPair::generate().context("generate CA key")?;
        let mut params = CertificateParams::new(Vec::<String>::new()).context("CA params")?;
        params.distinguished_name = DistinguishedName::new();
        params.distinguished_name.push(DnType::CountryName, "FI");
        params.distinguished_name.push(DnType::CommonName, common_name);
        params.is_ca = IsCa::Ca(BasicConstraints::Unconstrained);
        params.key_usages = vec![KeyUsagePurpose::KeyCertSign, KeyUsagePurpose::CrlSign];
        let cert = params.self_signed(&key).context("self-sign CA")?;
        Ok(Self { cert, issuer: Issuer::new(params, key) })
    }

    /// Issue a certificate for `key` with the given subject and key usages.
    pub fn issue(
        &self,
        key: &KeyPair,
        subject: &[(DnType, &str)],
        usages: Vec<KeyUsagePurpose>,
    ) -> anyhow::Result<Certificate> {
        let mut params = CertificateParams::new(Vec::<String>::new()).context("leaf params")?;
        params.distinguished_name = DistinguishedName::new();
        for (ty, value) in subject {
            params.distinguished_name.push(ty.clone(), *value);
        }
        params.key_usages = usages;
        params.serial_number = Some(SerialNumber::from(SERIAL.fetch_add(1, Ordering::SeqCst)));
        params.signed_by(key, &self.issuer).context("sign leaf certificate")
    }

    /// Signing certificate whose subject names `owner`.
    pub fn signing_cert(&self, key: &KeyPair, owner: &ClientId) -> anyhow::Result<Vec<u8>> {
        let mut subject = vec![
            (DnType::CountryName, owner.instance.as_str()),
            (DnType::OrganizationName, owner.member_class.as_str()),
            (DnType::CommonName, owner.member_code.as_str()),
        ];
        if let Some(subsystem) = &owner.subsystem_code {
            subject.push((DnType::OrganizationalUnitName, subsystem.as_str()));
        }
        let cert = self.issue(
            key,
            &subject,
            vec![KeyUsagePurpose::DigitalSignature, KeyUsagePurpose::ContentCommitment],
        )?;
        Ok(cert.der().to_vec())
    }

    /// Authentication certificate for a security server.
    pub fn auth_cert(&self, key: &KeyPair, server_name: &str) -> anyhow::Result<Vec<u8>> {
        let cert = self.issue(
            key,
            &[(DnType::CountryName, "FI"), (DnType::CommonName, server_name)],
            vec![KeyUsagePurpose::DigitalSignature],
        )?;
        Ok(cert.der().to_vec())
    }

    pub fn auth_cert_pem(&self, key: &KeyPair, server_name: &str) -> anyhow::Result<String> {
        let cert = self.issue(
            key,
            &[(DnType::CountryName, "FI"), (DnType::CommonName, server_name)],
            vec![KeyUsagePurpose::DigitalSignature],
        )?;
        Ok(cert.pem())
    }
}

pub fn member() -> ClientId {
    ClientId::member("FI", "GOV", "M1")
}

pub fn subsystem() -> ClientId {
    ClientId::subsystem("FI", "GOV", "M1", "SS1")
}

/// Snapshot for instance FI. `Test CA` is approved in FI; `Foreign CA` only in EE.
pub fn snapshot() -> TrustSnapshot {
    TrustSnapshot::new("FI", Utc::now() + Duration::hours(1))
        .with_instance("EE")
        .with_member(member(), "Member 1")
        .with_member(subsystem(), "Member 1 subsystem")
        .with_member(ClientId::member("EE", "COM", "E1"), "Estonian member")
        .with_security_server(SecurityServerId::new("FI", "GOV", "M1", "SS0"))
        .with_member_class("FI", "GOV")
        .with_member_class("FI", "COM")
        .with_member_class("EE", "COM")
        .with_approved_ca("FI", ApprovedCa { name: TEST_CA.into(), authentication_only: false })
        .with_approved_ca("EE", ApprovedCa { name: FOREIGN_CA.into(), authentication_only: true })
}

pub fn expired_snapshot() -> TrustSnapshot {
    TrustSnapshot { expires_at: Utc::now() - Duration::minutes(5), ..snapshot() }
}

pub fn global_conf(snapshot: TrustSnapshot) -> GlobalConfService {
    GlobalConfService::new(Arc::new(snapshot))
}

pub fn key_info(id: &str, key: &KeyPair) -> KeyInfo {
    KeyInfo {
        id: KeyId::new(id),
        token_id: TokenId::new("0"),
        label: Some(format!("{id} label")),
        usage: None,
        public_key: key.subject_public_key_info(),
        certificates: vec![],
        csrs: vec![],
    }
}

pub fn software_token(keys: Vec<KeyInfo>) -> TokenInfo {
    TokenInfo {
        id: TokenId::new("0"),
        friendly_name: Some("softToken-0".into()),
        token_type: TokenType::Software,
        active: true,
        available: true,
        read_only: false,
        keys,
    }
}

/// A pending request whose subject matches the certificate.
pub fn csr_for(id: &str, certificate: &[u8]) -> anyhow::Result<CsrInfo> {
    let parsed = parse_certificate(certificate).context("parse certificate for CSR")?;
    Ok(CsrInfo { id: CsrId::new(id), subject: parsed.subject, member_id: None })
}

/// An unsaved copy of the certificate already sitting on a key.
pub fn staged_record(key_id: &str, certificate: &[u8], usage: CertificateUsage) -> CertificateRecord {
    CertificateRecord {
        token_id: TokenId::new("0"),
        key_id: KeyId::new(key_id),
        certificate: certificate.to_vec(),
        usage,
        hash: certificate_hash(certificate),
        saved: false,
        active: false,
        status: CertificateStatus::Saved,
        owner: None,
        csr_id: None,
    }
}

/// Facade returning a fixed validity fault on top of a normal snapshot.
pub struct FaultyFacade {
    pub inner: TrustSnapshot,
    pub fault: GlobalConfError,
}

impl GlobalConfFacade for FaultyFacade {
    fn instance_identifier(&self) -> String {
        self.inner.instance_identifier()
    }
    fn instance_identifiers(&self) -> HashSet<String> {
        self.inner.instance_identifiers()
    }
    fn exists_security_server(&self, id: &SecurityServerId) -> Result<bool, GlobalConfError> {
        self.inner.exists_security_server(id)
    }
    fn global_groups(&self) -> Vec<GlobalGroupInfo> {
        self.inner.global_groups()
    }
    fn members(&self) -> Vec<MemberInfo> {
        self.inner.members()
    }
    fn member_classes(&self, instance: &str) -> BTreeSet<String> {
        self.inner.member_classes(instance)
    }
    fn approved_cas(&self, instance: &str) -> Vec<ApprovedCa> {
        self.inner.approved_cas(instance)
    }
    fn verify_validity(&self) -> Result<(), GlobalConfError> {
        Err(self.fault.clone())
    }
}

/// Signer that fails the test if the pipeline ever reaches it.
pub struct PanickingSigner;

#[async_trait]
impl SignerBackend for PanickingSigner {
    async fn tokens(&self) -> Result<Vec<TokenInfo>, SignerError> {
        panic!("signer backend must not be reached")
    }
    async fn certificate_by_hash(
        &self,
        _hash: &str,
    ) -> Result<Option<CertificateRecord>, SignerError> {
        panic!("signer backend must not be reached")
    }
    async fn key_by_public_key(&self, _public_key: &[u8]) -> Result<Option<KeyInfo>, SignerError> {
        panic!("signer backend must not be reached")
    }
    async fn key(&self, _key_id: &KeyId) -> Result<Option<KeyInfo>, SignerError> {
        panic!("signer backend must not be reached")
    }
    async fn find_csr(
        &self,
        _key_id: &KeyId,
        _subject: &str,
    ) -> Result<Option<CsrInfo>, SignerError> {
        panic!("signer backend must not be reached")
    }
    async fn store_certificate(
        &self,
        _request: StoreCertificate,
    ) -> Result<CertificateRecord, SignerError> {
        panic!("signer backend must not be reached")
    }
}
