//! # Structured Logging
//!
//! Span macros and startup logging helpers built on the tracing ecosystem.

/// Create a tracing span for one certificate import.
///
/// The span declares empty `hash` and `usage` fields that the pipeline
/// records once it knows them.
///
/// ```rust,ignore
/// let span = import_span!("upload");
/// let span = import_span!("token", requested_hash = %hash);
/// ```
#[macro_export]
macro_rules! import_span {
    ($source:expr) => {
        tracing::info_span!(
            "certificate_import",
            source = %$source,
            import_id = %uuid::Uuid::new_v4(),
            hash = tracing::field::Empty,
            usage = tracing::field::Empty
        )
    };
    ($source:expr, $($field:tt)*) => {
        tracing::info_span!(
            "certificate_import",
            source = %$source,
            import_id = %uuid::Uuid::new_v4(),
            hash = tracing::field::Empty,
            usage = tracing::field::Empty,
            $($field)*
        )
    };
}

/// Create a tracing span for request tracking
#[macro_export]
macro_rules! request_span {
    ($method:expr, $path:expr) => {
        tracing::info_span!(
            "http_request",
            method = %$method,
            path = %$path,
            request_id = %uuid::Uuid::new_v4()
        )
    };
    ($method:expr, $path:expr, $($field:tt)*) => {
        tracing::info_span!(
            "http_request",
            method = %$method,
            path = %$path,
            request_id = %uuid::Uuid::new_v4(),
            $($field)*
        )
    };
}

/// Log configuration at startup
pub fn log_config_info(config: &crate::config::AppConfig) {
    tracing::info!(
        server_address = %config.server.bind_address(),
        snapshot_path = %config.trust.snapshot_path.display(),
        signer_state = ?config.trust.signer_state_path,
        require_csr_for_signing = config.import.require_csr_for_signing,
        json_logging = config.observability.json_logging,
        "certgate configuration"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_macros_compile() {
        let _span = import_span!("upload");
        let _span = import_span!("token", requested_hash = "ab:cd");
        let _span = request_span!("GET", "/api/tokens");
        let _span = request_span!("POST", "/api/token-certificates", bytes = 512);
    }

    #[test]
    fn test_log_config_info() {
        let config = crate::config::AppConfig::default();

        // This should not panic
        log_config_info(&config);
    }
}
