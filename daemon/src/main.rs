//! eotsd — the EOTS manager daemon for finality providers.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use eots_manager::{EotsManager, EotsManagerConfig, LocalEotsManager};
use eots_rpc::RpcServer;

#[derive(Parser)]
#[command(name = "eotsd", about = "EOTS key and randomness manager daemon")]
struct Cli {
    /// Path to a TOML configuration file. If provided, file settings are
    /// used as the base; CLI flags and env vars override them.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory for the key and randomness databases.
    #[arg(long, env = "EOTSD_DB_PATH")]
    db_path: Option<PathBuf>,

    /// Address the RPC server listens on.
    #[arg(long, env = "EOTSD_RPC_LISTEN_ADDR")]
    rpc_listen_addr: Option<String>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "EOTSD_LOG_LEVEL")]
    log_level: Option<String>,

    /// Subcommand.
    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Run the manager and serve RPC requests until interrupted.
    Start,
}

/// Initialize the tracing subscriber. `RUST_LOG` takes precedence over the
/// configured level.
fn init_tracing(level: &str) {
    use tracing_subscriber::EnvFilter;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let file_config: Option<EotsManagerConfig> = if let Some(ref config_path) = cli.config {
        match std::fs::read_to_string(config_path) {
            Ok(contents) => match EotsManagerConfig::from_toml_str(&contents) {
                Ok(cfg) => Some(cfg),
                Err(e) => {
                    eprintln!("failed to parse config file: {e}, using defaults");
                    None
                }
            },
            Err(e) => {
                eprintln!(
                    "failed to read config file {}: {e}, using defaults",
                    config_path.display()
                );
                None
            }
        }
    } else {
        None
    };

    let base = file_config.unwrap_or_default();
    let config = EotsManagerConfig {
        db_path: cli.db_path.unwrap_or(base.db_path.clone()),
        rpc_listen_addr: cli.rpc_listen_addr.unwrap_or(base.rpc_listen_addr.clone()),
        log_level: cli.log_level.unwrap_or(base.log_level.clone()),
        ..base
    };

    init_tracing(&config.log_level);

    match cli.command {
        Command::Start => {
            tracing::info!(
                db_path = %config.db_path.display(),
                rpc = %config.rpc_listen_addr,
                "starting EOTS manager daemon"
            );

            let manager = Arc::new(LocalEotsManager::open(&config)?);
            let listener = tokio::net::TcpListener::bind(&config.rpc_listen_addr).await?;
            let server = RpcServer::new(Arc::clone(&manager) as Arc<dyn EotsManager>);

            tokio::select! {
                result = server.serve(listener) => {
                    result?;
                }
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("shutdown signal received — closing stores");
                }
            }

            manager.close()?;
            tracing::info!("eotsd exited cleanly");
        }
    }

    Ok(())
}
