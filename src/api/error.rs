use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;

use crate::errors::Error;
use crate::services::ImportError;

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Internal(String),

    /// Import pipeline rejection carrying its kind and stable code
    Rejected { status: StatusCode, kind: &'static str, code: &'static str, message: String },
}

impl ApiError {
    pub fn bad_request<S: Into<String>>(msg: S) -> Self {
        ApiError::BadRequest(msg.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Rejected { status, .. } => *status,
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
    code: &'static str,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        let body = match self {
            ApiError::BadRequest(message) => {
                ErrorBody { error: "bad_request", code: "bad_request", message }
            }
            ApiError::Internal(message) => {
                ErrorBody { error: "internal_error", code: "internal_error", message }
            }
            ApiError::Rejected { kind, code, message, .. } => {
                ErrorBody { error: kind, code, message }
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<ImportError> for ApiError {
    fn from(err: ImportError) -> Self {
        let status = match &err {
            ImportError::InvalidCertificate { .. }
            | ImportError::ConfigurationOutdated { .. }
            | ImportError::WrongCertificateUsage { .. }
            | ImportError::AuthCertificateNotSupported { .. }
            | ImportError::ClientNotFound { .. }
            | ImportError::KeyNotFound { .. } => StatusCode::BAD_REQUEST,
            ImportError::CertificateAlreadyExists { .. } | ImportError::CsrNotFound { .. } => {
                StatusCode::CONFLICT
            }
            ImportError::CertificateNotFound { .. } => StatusCode::NOT_FOUND,
            ImportError::UnrecoverableFault { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };

        ApiError::Rejected { status, kind: err.kind(), code: err.code(), message: err.to_string() }
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        match err {
            Error::Validation(msg) => ApiError::BadRequest(msg),
            other => ApiError::Internal(other.to_string()),
        }
    }
}
