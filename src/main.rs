use std::path::PathBuf;
use std::sync::Arc;

use certgate::{
    api::{start_api_server, ApiState},
    globalconf::{GlobalConfFacade, SharedGlobalConf, TrustSnapshot},
    observability::log_config_info,
    signer::{MemorySigner, SignerBackend},
    AppConfig, Result, APP_NAME, VERSION,
};
use clap::Parser;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "certgate")]
#[command(about = "Token certificate administration service")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    /// Bind host override
    #[arg(long)]
    host: Option<String>,

    /// Bind port override
    #[arg(long)]
    port: Option<u16>,

    /// Global configuration snapshot (JSON)
    #[arg(long, value_name = "PATH")]
    globalconf: Option<PathBuf>,

    /// Signer state seeding the in-memory token store (JSON)
    #[arg(long, value_name = "PATH")]
    signer_state: Option<PathBuf>,

    /// Log level or filter directive
    #[arg(long)]
    log_level: Option<String>,

    /// Emit JSON logs
    #[arg(long)]
    json_logs: bool,
}

impl Cli {
    fn apply(self, config: &mut AppConfig) {
        if let Some(host) = self.host {
            config.server.host = host;
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(path) = self.globalconf {
            config.trust.snapshot_path = path;
        }
        if let Some(path) = self.signer_state {
            config.trust.signer_state_path = Some(path);
        }
        if let Some(level) = self.log_level {
            config.observability.log_level = level;
        }
        if self.json_logs {
            config.observability.json_logging = true;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (optional - won't fail if missing)
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("Warning: Error loading .env file: {}", e);
        }
    }

    let cli = Cli::parse();
    let mut config = AppConfig::from_env()?;
    cli.apply(&mut config);
    config.validate()?;

    certgate::init_logging(&config.observability)?;
    info!(app_name = APP_NAME, version = VERSION, "Starting certgate");
    log_config_info(&config);

    let snapshot = TrustSnapshot::from_file(&config.trust.snapshot_path)?;
    if let Err(e) = snapshot.verify_validity() {
        warn!(error = %e, "Global configuration is not valid; imports will be rejected");
    }
    let global_conf = Arc::new(SharedGlobalConf::new(snapshot));

    let signer: Arc<dyn SignerBackend> = match &config.trust.signer_state_path {
        Some(path) => Arc::new(MemorySigner::from_file(path)?),
        None => {
            info!("No signer state configured, starting with an empty token store");
            Arc::new(MemorySigner::new())
        }
    };

    let state = ApiState::new(global_conf, signer, config.import.into());
    start_api_server(&config.server, state).await
}
