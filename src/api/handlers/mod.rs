//! HTTP request handlers organized by resource type

pub mod global_conf;
pub mod health;
pub mod token_certificates;
pub mod tokens;

pub use global_conf::{list_certificate_authorities_handler, list_member_classes_handler};
pub use health::health_handler;
pub use token_certificates::{
    get_certificate_handler, import_certificate_from_token_handler, import_certificate_handler,
};
pub use tokens::list_tokens_handler;
