//! HTTP boundary tests for the token certificate API.

mod common;

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, Response, StatusCode},
    Router,
};
use axum_test::TestServer;
use rcgen::KeyPair;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tower::ServiceExt;

use certgate::{
    api::{build_router, build_router_with_limit, ApiState},
    domain::TokenInfo,
    globalconf::{SharedGlobalConf, TrustSnapshot},
    services::ImportPolicy,
    signer::MemorySigner,
};
use common::*;

struct App {
    router: Router,
    global_conf: Arc<SharedGlobalConf>,
}

fn app_with(snapshot: TrustSnapshot, tokens: Vec<TokenInfo>) -> App {
    let global_conf = Arc::new(SharedGlobalConf::new(snapshot));
    let signer = Arc::new(MemorySigner::with_tokens(tokens));
    let state = ApiState::new(global_conf.clone(), signer, ImportPolicy::default());
    App { router: build_router(state), global_conf }
}

async fn send(app: &App, method: Method, uri: &str, body: Vec<u8>) -> Response<Body> {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/octet-stream")
        .body(Body::from(body))
        .expect("build request");
    app.router.clone().oneshot(request).await.expect("request")
}

async fn read_json<T: DeserializeOwned>(response: Response<Body>) -> T {
    let bytes =
        to_bytes(response.into_body(), usize::MAX).await.expect("read response body as bytes");
    serde_json::from_slice(&bytes).expect("parse json response")
}

struct Material {
    ca: TestCa,
    key: KeyPair,
}

impl Material {
    fn new() -> Self {
        Self {
            ca: TestCa::new(TEST_CA).expect("create CA"),
            key: KeyPair::generate().expect("generate key"),
        }
    }

    fn tokens(&self) -> Vec<TokenInfo> {
        vec![software_token(vec![key_info("key-1", &self.key)])]
    }

    fn auth_cert(&self) -> Vec<u8> {
        self.ca.auth_cert(&self.key, "ss0.example.org").expect("issue certificate")
    }
}

#[tokio::test]
async fn upload_creates_certificate() {
    let material = Material::new();
    let app = app_with(snapshot(), material.tokens());

    let response = send(&app, Method::POST, "/api/token-certificates", material.auth_cert()).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let location = response
        .headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
        .expect("location header");
    let body: Value = read_json(response).await;

    let hash = body["hash"].as_str().expect("hash");
    assert_eq!(location, format!("/api/token-certificates/{hash}"));
    assert_eq!(body["usage"], "AUTHENTICATION");
    assert_eq!(body["status"], "SAVED");
    assert_eq!(body["saved"], true);
    assert_eq!(body["keyId"], "key-1");
    assert!(body["details"]["issuer"].as_str().unwrap_or_default().contains(TEST_CA));

    let response = send(&app, Method::GET, &location, vec![]).await;
    assert_eq!(response.status(), StatusCode::OK);
    let fetched: Value = read_json(response).await;
    assert_eq!(fetched["hash"], hash);
}

#[tokio::test]
async fn upload_rejects_empty_body() {
    let material = Material::new();
    let app = app_with(snapshot(), material.tokens());

    let response = send(&app, Method::POST, "/api/token-certificates", b"  \n".to_vec()).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = read_json(response).await;
    assert_eq!(body["code"], "bad_request");
}

#[tokio::test]
async fn upload_rejects_garbage_with_error_body() {
    let material = Material::new();
    let app = app_with(snapshot(), material.tokens());

    let response =
        send(&app, Method::POST, "/api/token-certificates", b"garbage".to_vec()).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = read_json(response).await;
    assert_eq!(body["error"], "InvalidCertificate");
    assert_eq!(body["code"], "invalid_cert");
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn duplicate_upload_conflicts() {
    let material = Material::new();
    let app = app_with(snapshot(), material.tokens());
    let cert = material.auth_cert();

    let first = send(&app, Method::POST, "/api/token-certificates", cert.clone()).await;
    assert_eq!(first.status(), StatusCode::CREATED);

    let second = send(&app, Method::POST, "/api/token-certificates", cert).await;
    assert_eq!(second.status(), StatusCode::CONFLICT);
    let body: Value = read_json(second).await;
    assert_eq!(body["error"], "CertificateAlreadyExists");
    assert_eq!(body["code"], "certificate_already_exists");
}

#[tokio::test]
async fn upload_honours_expected_usage() {
    let material = Material::new();
    let app = app_with(snapshot(), material.tokens());

    let response = send(
        &app,
        Method::POST,
        "/api/token-certificates?usage=SIGNING",
        material.auth_cert(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = read_json(response).await;
    assert_eq!(body["code"], "wrong_cert_usage");
}

#[tokio::test]
async fn outdated_configuration_is_reported() {
    let material = Material::new();
    let app = app_with(expired_snapshot(), material.tokens());

    let response = send(&app, Method::POST, "/api/token-certificates", material.auth_cert()).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = read_json(response).await;
    assert_eq!(body["error"], "ConfigurationOutdated");
    assert_eq!(body["code"], "global_conf_outdated");

    app.global_conf.replace(snapshot());
    let response = send(&app, Method::POST, "/api/token-certificates", material.auth_cert()).await;
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn unknown_certificate_is_not_found() {
    let material = Material::new();
    let app = app_with(snapshot(), material.tokens());

    let response = send(&app, Method::GET, "/api/token-certificates/abcdef", vec![]).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = read_json(response).await;
    assert_eq!(body["error"], "CertificateNotFound");

    let response =
        send(&app, Method::POST, "/api/token-certificates/abcdef/import", vec![]).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn staged_certificate_imports_from_token() {
    let material = Material::new();
    let cert = material.auth_cert();
    let hash = certgate::utils::certificates::certificate_hash(&cert);

    let mut tokens = material.tokens();
    tokens[0].keys[0]
        .certificates
        .push(staged_record("key-1", &cert, certgate::domain::CertificateUsage::Authentication));
    let app = app_with(snapshot(), tokens);

    let uri = format!("/api/token-certificates/{hash}/import");
    let response = send(&app, Method::POST, &uri, vec![]).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = read_json(response).await;
    assert_eq!(body["saved"], true);

    let response = send(&app, Method::POST, &uri, vec![]).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn oversized_upload_is_rejected() {
    let material = Material::new();
    let global_conf = Arc::new(SharedGlobalConf::new(snapshot()));
    let signer = Arc::new(MemorySigner::with_tokens(material.tokens()));
    let state = ApiState::new(global_conf.clone(), signer, ImportPolicy::default());
    let app = App { router: build_router_with_limit(state, 64), global_conf };

    let response = send(&app, Method::POST, "/api/token-certificates", vec![0x30; 1024]).await;
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn tokens_list_shows_imported_certificates() {
    let material = Material::new();
    let app = app_with(snapshot(), material.tokens());
    let server = TestServer::new(app.router.clone()).expect("test server");

    server
        .post("/api/token-certificates")
        .bytes(material.auth_cert().into())
        .await
        .assert_status(StatusCode::CREATED);

    let response = server.get("/api/tokens").await;
    response.assert_status_ok();
    let tokens: Value = response.json();
    let token = &tokens[0];
    assert_eq!(token["type"], "SOFTWARE");
    assert_eq!(token["savedToConfiguration"], true);
    assert_eq!(token["keys"][0]["usage"], "AUTHENTICATION");
    assert_eq!(token["keys"][0]["certificates"].as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn global_configuration_views() {
    let app = app_with(snapshot(), vec![]);
    let server = TestServer::new(app.router.clone()).expect("test server");

    let response = server.get("/api/certificate-authorities").await;
    response.assert_status_ok();
    let cas: Value = response.json();
    assert_eq!(cas, serde_json::json!([{ "name": TEST_CA, "authenticationOnly": false }]));

    let response = server.get("/api/member-classes").await;
    response.assert_status_ok();
    let classes: Vec<String> = response.json();
    assert_eq!(classes, vec!["COM".to_string(), "GOV".to_string()]);

    app.global_conf.replace(expired_snapshot());
    server.get("/api/member-classes").await.assert_status_bad_request();
}

#[tokio::test]
async fn health_reports_configuration_validity() {
    let app = app_with(expired_snapshot(), vec![]);
    let server = TestServer::new(app.router.clone()).expect("test server");

    let response = server.get("/health").await;
    response.assert_status_ok();
    let health: Value = response.json();
    assert_eq!(health["status"], "ok");
    assert_eq!(health["instance"], "FI");
    assert_eq!(health["globalConfValid"], false);

    app.global_conf.replace(snapshot());
    let health: Value = server.get("/health").await.json();
    assert_eq!(health["globalConfValid"], true);
}
