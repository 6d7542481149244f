use anyhow::{anyhow, Result};
use bus_stop_gateway::config::credentials::ProviderSecrets;
use bus_stop_gateway::server;
use bus_stop_gateway::utils::config_loader;
use bus_stop_gateway::utils::logging;
use bus_stop_gateway::utils::logging::LogLevel;
use clap::Parser;
use tracing::info;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, env = "CONFIG", default_value = "bus-stop-gateway.yaml")]
    config: String,
    #[arg(long, env = "LOG_LEVEL", value_enum)]
    log_level: Option<LogLevel>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // -------------------------------
    // 1. Load YAML config, init logging
    // -------------------------------

    let args = Args::parse();
    let service_config = config_loader::run(&args.config).await?;
    logging::run(&service_config, args.log_level)?;

    // -------------------------------
    // 2. Provider credentials, fail fast when missing
    // -------------------------------

    let provider_type = service_config.provider.provider_type;
    let secrets = ProviderSecrets::from_env(provider_type)
        .map_err(|e| anyhow!("{} provider credentials: {}", provider_type.as_str(), e))?;

    // -------------------------------
    // 3. Initial token fetch and refresh loop (transit only)
    // -------------------------------

    let bootstrapped = server::bootstrap::build(&service_config, secrets).await?;

    // -------------------------------
    // 4. Start http server
    // -------------------------------

    info!("Service starting...");
    let served = server::server::start(
        &service_config.settings,
        bootstrapped.gateway.clone(),
        shutdown_signal(),
    )
    .await;

    bootstrapped.shutdown();
    info!("Service stopped");
    served
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("cannot listen for ctrl-c: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("cannot listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("shutdown signal received");
}
