//! Immutable global configuration snapshot.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::path::Path;
use tracing::debug;

use super::{
    ApprovedCa, GlobalConfError, GlobalConfFacade, GlobalGroupInfo, MemberInfo, INTERNAL_ERROR,
    MALFORMED_GLOBALCONF, OUTDATED_GLOBALCONF,
};
use crate::domain::{ClientId, GlobalGroupId, SecurityServerId};
use crate::errors::Error;

/// One generation of the global configuration.
///
/// Loaded from a JSON document of the form:
///
/// ```json
/// {
///   "instanceIdentifier": "FI",
///   "instanceIdentifiers": ["FI", "EE"],
///   "expiresAt": "2030-01-01T00:00:00Z",
///   "members": [{ "id": "FI:GOV:M1", "name": "Member 1" }],
///   "securityServers": ["FI:GOV:M1:SS0"],
///   "globalGroups": [{ "id": "FI:security-server-owners", "description": "Owners" }],
///   "memberClasses": { "FI": ["GOV", "COM"] },
///   "approvedCas": { "FI": [{ "name": "Test CA", "authenticationOnly": false }] }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrustSnapshot {
    pub instance_identifier: String,

    #[serde(default)]
    pub instance_identifiers: BTreeSet<String>,

    pub expires_at: DateTime<Utc>,

    #[serde(default)]
    pub members: Vec<MemberInfo>,

    #[serde(default)]
    pub security_servers: BTreeSet<SecurityServerId>,

    #[serde(default)]
    pub global_groups: Vec<GlobalGroupInfo>,

    #[serde(default)]
    pub member_classes: BTreeMap<String, BTreeSet<String>>,

    #[serde(default)]
    pub approved_cas: BTreeMap<String, Vec<ApprovedCa>>,
}

impl TrustSnapshot {
    /// Create an empty snapshot for `instance` that is valid until `expires_at`.
    pub fn new(instance: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        let instance = instance.into();
        Self {
            instance_identifiers: BTreeSet::from([instance.clone()]),
            instance_identifier: instance,
            expires_at,
            members: Vec::new(),
            security_servers: BTreeSet::new(),
            global_groups: Vec::new(),
            member_classes: BTreeMap::new(),
            approved_cas: BTreeMap::new(),
        }
    }

    /// Parse a snapshot document. The own instance is always one of the
    /// configured instances, whether or not `instanceIdentifiers` lists it.
    pub fn from_json(json: &str) -> crate::Result<Self> {
        let mut snapshot: Self = serde_json::from_str(json).map_err(|e| {
            Error::serialization(e, "Failed to parse global configuration snapshot")
        })?;
        snapshot.instance_identifiers.insert(snapshot.instance_identifier.clone());
        Ok(snapshot)
    }

    pub fn from_file(path: impl AsRef<Path>) -> crate::Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            Error::io(e, format!("Failed to read global configuration {}", path.display()))
        })?;
        let snapshot = Self::from_json(&contents)?;
        debug!(
            path = %path.display(),
            instance = %snapshot.instance_identifier,
            members = snapshot.members.len(),
            expires_at = %snapshot.expires_at,
            "Loaded global configuration snapshot"
        );
        Ok(snapshot)
    }

    pub fn with_instance(mut self, instance: impl Into<String>) -> Self {
        self.instance_identifiers.insert(instance.into());
        self
    }

    pub fn with_member(mut self, id: ClientId, name: impl Into<String>) -> Self {
        self.members.push(MemberInfo { id, name: name.into() });
        self
    }

    pub fn with_security_server(mut self, id: SecurityServerId) -> Self {
        self.security_servers.insert(id);
        self
    }

    pub fn with_global_group(mut self, id: GlobalGroupId, description: impl Into<String>) -> Self {
        self.global_groups.push(GlobalGroupInfo { id, description: description.into() });
        self
    }

    pub fn with_member_class(mut self, instance: &str, member_class: impl Into<String>) -> Self {
        self.member_classes.entry(instance.to_string()).or_default().insert(member_class.into());
        self
    }

    pub fn with_approved_ca(mut self, instance: &str, ca: ApprovedCa) -> Self {
        self.approved_cas.entry(instance.to_string()).or_default().push(ca);
        self
    }
}

impl GlobalConfFacade for TrustSnapshot {
    fn instance_identifier(&self) -> String {
        self.instance_identifier.clone()
    }

    fn instance_identifiers(&self) -> HashSet<String> {
        self.instance_identifiers.iter().cloned().collect()
    }

    fn exists_security_server(&self, id: &SecurityServerId) -> Result<bool, GlobalConfError> {
        if !self.instance_identifiers.contains(&id.instance) {
            return Err(GlobalConfError::coded(
                INTERNAL_ERROR,
                format!("Invalid instance identifier: {}", id.instance),
            ));
        }
        Ok(self.security_servers.contains(id))
    }

    fn global_groups(&self) -> Vec<GlobalGroupInfo> {
        self.global_groups.clone()
    }

    fn members(&self) -> Vec<MemberInfo> {
        self.members.clone()
    }

    fn member_classes(&self, instance: &str) -> BTreeSet<String> {
        self.member_classes.get(instance).cloned().unwrap_or_default()
    }

    fn approved_cas(&self, instance: &str) -> Vec<ApprovedCa> {
        self.approved_cas.get(instance).cloned().unwrap_or_default()
    }

    fn verify_validity(&self) -> Result<(), GlobalConfError> {
        if !self.instance_identifiers.contains(&self.instance_identifier) {
            return Err(GlobalConfError::coded(
                MALFORMED_GLOBALCONF,
                format!(
                    "Own instance {} is not among the configured instances",
                    self.instance_identifier
                ),
            ));
        }
        if Utc::now() >= self.expires_at {
            return Err(GlobalConfError::coded(
                OUTDATED_GLOBALCONF,
                format!("Global configuration expired at {}", self.expires_at),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn snapshot() -> TrustSnapshot {
        TrustSnapshot::new("FI", Utc::now() + Duration::hours(1))
            .with_member(ClientId::subsystem("FI", "GOV", "M1", "SS1"), "Member 1")
            .with_security_server(SecurityServerId::new("FI", "GOV", "M1", "SS0"))
            .with_member_class("FI", "GOV")
            .with_member_class("FI", "COM")
    }

    #[test]
    fn test_exists_security_server() {
        let snapshot = snapshot();
        assert!(snapshot
            .exists_security_server(&SecurityServerId::new("FI", "GOV", "M1", "SS0"))
            .unwrap());
        assert!(!snapshot
            .exists_security_server(&SecurityServerId::new("FI", "GOV", "M1", "SS9"))
            .unwrap());

        let err = snapshot
            .exists_security_server(&SecurityServerId::new("EE", "GOV", "M1", "SS0"))
            .unwrap_err();
        assert_eq!(err.code.as_deref(), Some(INTERNAL_ERROR));
    }

    #[test]
    fn test_member_classes_and_cas_default_empty() {
        let snapshot = snapshot();
        assert_eq!(snapshot.member_classes("FI").len(), 2);
        assert!(snapshot.member_classes("EE").is_empty());
        assert!(snapshot.approved_cas("FI").is_empty());
    }

    #[test]
    fn test_verify_validity() {
        assert!(snapshot().verify_validity().is_ok());

        let expired = TrustSnapshot::new("FI", Utc::now() - Duration::minutes(1));
        assert!(expired.verify_validity().unwrap_err().is_outdated());

        let mut malformed = snapshot();
        malformed.instance_identifiers.clear();
        let err = malformed.verify_validity().unwrap_err();
        assert_eq!(err.code.as_deref(), Some(MALFORMED_GLOBALCONF));
    }

    #[test]
    fn test_from_json() {
        let json = r#"{
            "instanceIdentifier": "FI",
            "instanceIdentifiers": ["FI", "EE"],
            "expiresAt": "2099-01-01T00:00:00Z",
            "members": [{ "id": "FI:GOV:M1", "name": "Member 1" }],
            "securityServers": ["FI:GOV:M1:SS0"],
            "globalGroups": [{ "id": "FI:security-server-owners" }],
            "memberClasses": { "FI": ["GOV"] },
            "approvedCas": { "FI": [{ "name": "Test CA", "authenticationOnly": true }] }
        }"#;

        let snapshot = TrustSnapshot::from_json(json).unwrap();
        assert_eq!(snapshot.instance_identifiers.len(), 2);
        assert_eq!(snapshot.members[0].id, ClientId::member("FI", "GOV", "M1"));
        assert!(snapshot.approved_cas("FI")[0].authentication_only);
        assert!(snapshot.verify_validity().is_ok());
    }

    #[test]
    fn test_from_json_adds_own_instance() {
        let json = r#"{
            "instanceIdentifier": "FI",
            "expiresAt": "2099-01-01T00:00:00Z",
            "securityServers": ["FI:GOV:M1:SS0"]
        }"#;

        let snapshot = TrustSnapshot::from_json(json).unwrap();
        assert!(snapshot.instance_identifiers.contains("FI"));
        assert!(snapshot.verify_validity().is_ok());
        assert!(snapshot
            .exists_security_server(&SecurityServerId::new("FI", "GOV", "M1", "SS0"))
            .unwrap());
    }

    #[test]
    fn test_from_json_rejects_bad_identifiers() {
        let json = r#"{
            "instanceIdentifier": "FI",
            "expiresAt": "2099-01-01T00:00:00Z",
            "members": [{ "id": "FI:GOV" }]
        }"#;
        assert!(matches!(TrustSnapshot::from_json(json), Err(Error::Serialization { .. })));
    }
}
