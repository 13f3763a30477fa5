//! Existence and validity checks over one global configuration generation.

use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

use crate::{
    domain::{ClientId, GlobalGroupId, SecurityServerId},
    globalconf::{ApprovedCa, GlobalConfError, GlobalConfFacade},
};

/// Outcome of a failed validity check.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidityError {
    /// The snapshot has expired; retry after the next distribution.
    #[error("Global configuration is outdated: {message}")]
    Outdated { message: String },

    /// Any other fault, passed through unchanged.
    #[error("Global configuration fault: {0}")]
    Fault(GlobalConfError),
}

/// Service answering global configuration questions for one request.
///
/// Holds a single snapshot generation for its whole lifetime.
pub struct GlobalConfService {
    facade: Arc<dyn GlobalConfFacade>,
}

impl GlobalConfService {
    pub fn new(facade: Arc<dyn GlobalConfFacade>) -> Self {
        Self { facade }
    }

    pub fn instance_identifier(&self) -> String {
        self.facade.instance_identifier()
    }

    /// Whether the security server is registered.
    ///
    /// A server of an unknown instance does not exist; the facade is not
    /// queried for it.
    pub fn security_server_exists(&self, id: &SecurityServerId) -> Result<bool, GlobalConfError> {
        if !self.facade.instance_identifiers().contains(&id.instance) {
            debug!(server = %id, "Security server belongs to an unknown instance");
            return Ok(false);
        }
        self.facade.exists_security_server(id)
    }

    /// Whether every group is defined. True for an empty request.
    pub fn global_group_identifiers_exist(&self, ids: &[GlobalGroupId]) -> bool {
        if ids.is_empty() {
            return true;
        }
        let known: HashSet<GlobalGroupId> =
            self.facade.global_groups().into_iter().map(|group| group.id).collect();
        ids.iter().all(|id| known.contains(id))
    }

    /// Whether every member or subsystem is registered. True for an empty request.
    pub fn member_identifiers_exist(&self, ids: &[ClientId]) -> bool {
        if ids.is_empty() {
            return true;
        }
        let known: HashSet<ClientId> =
            self.facade.members().into_iter().map(|member| member.id).collect();
        ids.iter().all(|id| known.contains(id))
    }

    pub fn member_classes_for_this_instance(&self) -> BTreeSet<String> {
        self.facade.member_classes(&self.facade.instance_identifier())
    }

    pub fn approved_cas_for_this_instance(&self) -> Vec<ApprovedCa> {
        self.facade.approved_cas(&self.facade.instance_identifier())
    }

    /// Check that the snapshot may be used.
    ///
    /// Only the `OutdatedGlobalConf` code maps to [`ValidityError::Outdated`].
    pub fn verify_validity(&self) -> Result<(), ValidityError> {
        self.facade.verify_validity().map_err(|err| {
            if err.is_outdated() {
                warn!(message = %err.message, "Global configuration is outdated");
                ValidityError::Outdated { message: err.message }
            } else {
                ValidityError::Fault(err)
            }
        })
    }
}
