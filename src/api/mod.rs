//! REST API
//!
//! axum boundary over the certificate services. Every [`crate::ImportError`]
//! maps to exactly one status in [`error::ApiError`].

pub mod error;
pub mod handlers;
pub mod routes;
pub mod server;

pub use error::ApiError;
pub use routes::{build_router, build_router_with_limit, ApiState};
pub use server::start_api_server;
