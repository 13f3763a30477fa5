use std::sync::Arc;

use axum::{
    body::Body,
    extract::DefaultBodyLimit,
    http::Request,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::{
    globalconf::SharedGlobalConf,
    services::{ImportPolicy, TokenCertificateService},
    signer::SignerBackend,
};

use super::handlers::{
    get_certificate_handler, health_handler, import_certificate_from_token_handler,
    import_certificate_handler, list_certificate_authorities_handler, list_member_classes_handler,
    list_tokens_handler,
};

/// Upload limit when the router is built without server configuration
pub const DEFAULT_MAX_BODY_SIZE: usize = 256 * 1024;

#[derive(Clone)]
pub struct ApiState {
    pub global_conf: Arc<SharedGlobalConf>,
    pub certificates: Arc<TokenCertificateService>,
    pub signer: Arc<dyn SignerBackend>,
}

impl ApiState {
    pub fn new(
        global_conf: Arc<SharedGlobalConf>,
        signer: Arc<dyn SignerBackend>,
        policy: ImportPolicy,
    ) -> Self {
        let certificates =
            Arc::new(TokenCertificateService::new(signer.clone()).with_policy(policy));
        Self { global_conf, certificates, signer }
    }
}

pub fn build_router(state: ApiState) -> Router {
    build_router_with_limit(state, DEFAULT_MAX_BODY_SIZE)
}

pub fn build_router_with_limit(state: ApiState, max_body_size: usize) -> Router {
    let api = Router::new()
        .route("/api/token-certificates", post(import_certificate_handler))
        .route("/api/token-certificates/{hash}", get(get_certificate_handler))
        .route("/api/token-certificates/{hash}/import", post(import_certificate_from_token_handler))
        .route("/api/tokens", get(list_tokens_handler))
        .route("/api/certificate-authorities", get(list_certificate_authorities_handler))
        .route("/api/member-classes", get(list_member_classes_handler))
        .route("/health", get(health_handler));

    api.with_state(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                crate::request_span!(request.method(), request.uri().path())
            }))
            .layer(DefaultBodyLimit::max(max_body_size)),
    )
}
