//! # certgate
//!
//! Certificate administration core for a security gateway. It imports
//! certificates onto the keys of hardware and software tokens and gates those
//! imports on the freshness of the global configuration snapshot.
//!
//! ## Architecture
//!
//! ```text
//! REST API (axum) → TokenCertificateService → GlobalConfService → TrustSnapshot
//!                              ↓
//!                        SignerBackend (tokens, keys, certificates, CSRs)
//! ```
//!
//! ## Core Components
//!
//! - **GlobalConfService**: existence and validity checks over one snapshot generation
//! - **TokenCertificateService**: the fail-fast import pipeline and certificate lookup
//! - **SignerBackend**: durable certificate store with a conflict-on-duplicate commit
//! - **API**: boundary adapter mapping every [`ImportError`] to exactly one status
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use certgate::{
//!     globalconf::{SharedGlobalConf, TrustSnapshot},
//!     services::{GlobalConfService, ImportRequest, TokenCertificateService},
//!     signer::MemorySigner,
//! };
//!
//! # async fn run(der: Vec<u8>) -> certgate::Result<()> {
//! let snapshot = TrustSnapshot::from_file("globalconf.json")?;
//! let shared = SharedGlobalConf::new(snapshot);
//! let service = TokenCertificateService::new(Arc::new(MemorySigner::new()));
//!
//! let global_conf = GlobalConfService::new(shared.current());
//! match service.import_certificate(&global_conf, ImportRequest::new(der)).await {
//!     Ok(record) => println!("imported {}", record.hash),
//!     Err(err) => println!("rejected: {}", err.code()),
//! }
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod config;
pub mod domain;
pub mod errors;
pub mod globalconf;
pub mod observability;
pub mod services;
pub mod signer;
pub mod utils;

// Re-export commonly used types and traits
pub use config::AppConfig;
pub use errors::{Error, Result};
pub use observability::init_logging;
pub use services::ImportError;

/// Application version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name from Cargo.toml
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
