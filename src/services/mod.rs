//! Business logic services
//!
//! This module contains the certificate import pipeline and the global
//! configuration checks it depends on, separated from HTTP concerns.

pub mod global_conf_service;
pub mod import_error;
pub mod token_certificate_service;

pub use global_conf_service::{GlobalConfService, ValidityError};
pub use import_error::{Collaborator, ImportError, PropagationClass};
pub use token_certificate_service::{ImportPolicy, ImportRequest, TokenCertificateService};
