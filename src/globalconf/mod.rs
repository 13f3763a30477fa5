//! Global configuration view.
//!
//! The global configuration is distributed and refreshed by an external
//! collaborator. This module only reads an already-fetched snapshot through
//! the [`GlobalConfFacade`] trait:
//!
//! - [`TrustSnapshot`]: immutable snapshot loaded from a JSON document
//! - [`SharedGlobalConf`]: holder of the current snapshot generation
//!
//! Callers acquire one generation per request with [`SharedGlobalConf::current`]
//! and pass it explicitly, so a concurrent refresh is never observed halfway
//! through a decision.

pub mod shared;
pub mod snapshot;

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use thiserror::Error;

use crate::domain::{ClientId, GlobalGroupId, SecurityServerId};

pub use shared::SharedGlobalConf;
pub use snapshot::TrustSnapshot;

/// Fault code reported when the snapshot is past its validity.
pub const OUTDATED_GLOBALCONF: &str = "OutdatedGlobalConf";

/// Fault code reported for queries the snapshot cannot answer.
pub const INTERNAL_ERROR: &str = "InternalError";

/// Fault code reported for structurally inconsistent snapshots.
pub const MALFORMED_GLOBALCONF: &str = "MalformedGlobalConf";

/// Fault raised by the global configuration collaborator. The code is
/// machine-readable; only [`OUTDATED_GLOBALCONF`] has a distinguished meaning.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}{message}", code_prefix(.code))]
pub struct GlobalConfError {
    pub code: Option<String>,
    pub message: String,
}

fn code_prefix(code: &Option<String>) -> String {
    code.as_ref().map(|c| format!("{c}: ")).unwrap_or_default()
}

impl GlobalConfError {
    pub fn coded(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self { code: Some(code.into()), message: message.into() }
    }

    pub fn uncoded(message: impl Into<String>) -> Self {
        Self { code: None, message: message.into() }
    }

    pub fn is_outdated(&self) -> bool {
        self.code.as_deref() == Some(OUTDATED_GLOBALCONF)
    }
}

/// A member (or subsystem) listed in the global configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberInfo {
    pub id: ClientId,
    #[serde(default)]
    pub name: String,
}

/// A global group listed in the global configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalGroupInfo {
    pub id: GlobalGroupId,
    #[serde(default)]
    pub description: String,
}

/// A certificate authority approved for an instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovedCa {
    pub name: String,
    #[serde(default)]
    pub authentication_only: bool,
}

/// Read-only queries over one global configuration generation.
pub trait GlobalConfFacade: Send + Sync {
    /// Identifier of the instance this gateway belongs to
    fn instance_identifier(&self) -> String;

    /// All instance identifiers known to the snapshot
    fn instance_identifiers(&self) -> HashSet<String>;

    /// Whether the server is registered.
    ///
    /// # Errors
    ///
    /// Fails with code [`INTERNAL_ERROR`] when the server's instance is unknown.
    fn exists_security_server(&self, id: &SecurityServerId) -> Result<bool, GlobalConfError>;

    fn global_groups(&self) -> Vec<GlobalGroupInfo>;

    fn members(&self) -> Vec<MemberInfo>;

    fn member_classes(&self, instance: &str) -> BTreeSet<String>;

    fn approved_cas(&self, instance: &str) -> Vec<ApprovedCa>;

    /// Check that the snapshot is still valid for use.
    fn verify_validity(&self) -> Result<(), GlobalConfError>;
}
