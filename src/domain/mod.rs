//! Domain layer
//!
//! Pure domain entities shared by the global configuration view, the signer
//! backend and the import pipeline. Nothing here touches HTTP or storage.
//!
//! ## Module Organization
//!
//! - `id`: signer identifiers and global configuration identifiers
//! - `certificate`: certificate records, usage and status
//! - `token`: tokens, keys and pending certificate requests

pub mod certificate;
pub mod id;
pub mod token;

pub use certificate::{CertificateRecord, CertificateStatus, CertificateUsage};
pub use id::{ClientId, CsrId, GlobalGroupId, IdentifierError, KeyId, SecurityServerId, TokenId};
pub use token::{CsrInfo, KeyInfo, TokenInfo, TokenType};
