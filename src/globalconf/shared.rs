//! Holder of the current global configuration generation.

use std::sync::{Arc, RwLock};
use tracing::info;

use super::{GlobalConfFacade, TrustSnapshot};

/// Shares the current [`TrustSnapshot`] between requests.
///
/// Readers take an `Arc` to one generation; [`SharedGlobalConf::replace`]
/// swaps in a new generation without disturbing readers that still hold the
/// old one.
#[derive(Debug)]
pub struct SharedGlobalConf {
    current: RwLock<Arc<TrustSnapshot>>,
}

impl SharedGlobalConf {
    pub fn new(snapshot: TrustSnapshot) -> Self {
        Self { current: RwLock::new(Arc::new(snapshot)) }
    }

    /// The generation to use for the whole of one request.
    pub fn current(&self) -> Arc<dyn GlobalConfFacade> {
        self.snapshot()
    }

    /// The current generation as its concrete type.
    pub fn snapshot(&self) -> Arc<TrustSnapshot> {
        // A poisoned lock still holds a complete Arc; the writer never leaves it torn.
        let guard = self.current.read().unwrap_or_else(|poisoned| poisoned.into_inner());
        Arc::clone(&guard)
    }

    /// Install a freshly distributed snapshot.
    pub fn replace(&self, snapshot: TrustSnapshot) {
        info!(
            instance = %snapshot.instance_identifier,
            expires_at = %snapshot.expires_at,
            "Installing new global configuration generation"
        );
        let mut guard = self.current.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = Arc::new(snapshot);
    }
}
