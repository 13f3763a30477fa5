//! # Configuration Management
//!
//! Configuration is read from `CERTGATE_*` environment variables (a `.env` file
//! is loaded by the binary) and validated before the service starts.
//!
//! | Variable | Default |
//! |---|---|
//! | `CERTGATE_HOST` | `127.0.0.1` |
//! | `CERTGATE_PORT` | `4000` |
//! | `CERTGATE_TIMEOUT_SECONDS` | `30` |
//! | `CERTGATE_MAX_BODY_SIZE` | `262144` |
//! | `CERTGATE_SERVICE_NAME` | `certgate` |
//! | `CERTGATE_LOG_LEVEL` | `info` |
//! | `CERTGATE_JSON_LOGGING` | `false` |
//! | `CERTGATE_GLOBALCONF_PATH` | `./data/globalconf.json` |
//! | `CERTGATE_SIGNER_STATE_PATH` | unset |
//! | `CERTGATE_REQUIRE_CSR_FOR_SIGNING` | `true` |

pub mod settings;

pub use settings::{
    AppConfig, ImportPolicyConfig, ObservabilityConfig, ServerConfig, TrustConfig,
};
