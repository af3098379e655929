//! Endpoint pool watcher.
//!
//! Loads a pool configuration, then behaves like a client of the pool:
//! every request interval it selects an endpoint, sends a GET to the
//! configured heartbeat path and blacklists the endpoint if that fails.
//! The heartbeat restores endpoints in the background.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;

use endpoint_pool::config::loader::load_config;
use endpoint_pool::observability::{logging, metrics};
use endpoint_pool::{AvailabilityStrategy, EndpointPool, EndpointPoolFactory, HttpAvailabilityStrategy};

#[derive(Parser)]
#[command(name = "endpoint-pool")]
#[command(about = "Watch a health-checked pool of backend endpoints", long_about = None)]
struct Cli {
    /// Path to the pool configuration (TOML).
    #[arg(short, long)]
    config: PathBuf,

    /// Seconds between requests issued through the pool.
    #[arg(short, long, default_value_t = 5)]
    request_interval_secs: u64,

    /// Print pool status as JSON after every request.
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_config(&cli.config)?;

    logging::init_logging(&config.observability.log_level);
    tracing::info!("endpoint-pool v{} starting", env!("CARGO_PKG_VERSION"));

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    let client = reqwest::Client::builder()
        .user_agent(format!("endpoint-pool/{}", config.transport_id))
        .timeout(config.heartbeat.timeout())
        .build()?;
    let strategy: Arc<dyn AvailabilityStrategy<reqwest::Client>> = Arc::new(HttpAvailabilityStrategy::new(
        config.heartbeat.path.clone(),
        config.heartbeat.timeout(),
    ));

    let factory = EndpointPoolFactory::from_runtime()?;
    let pool = factory.create_from_config(&config, client.clone(), strategy)?;

    tracing::info!(
        endpoints = pool.size(),
        transport = %config.transport_id,
        heartbeat_interval_secs = config.heartbeat.interval_secs,
        "Pool ready"
    );

    let mut ticker = tokio::time::interval(Duration::from_secs(cli.request_interval_secs.max(1)));
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                send_one(&pool, &client, &config.heartbeat.path).await;
                report(&pool, cli.json)?;
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupt received, shutting down");
                break;
            }
        }
    }

    pool.close();
    tracing::info!("Shutdown complete");
    Ok(())
}

async fn send_one(pool: &EndpointPool, client: &reqwest::Client, path: &str) {
    let Some(endpoint) = pool.get() else {
        tracing::warn!(total = pool.size(), "No endpoint currently available");
        return;
    };

    let uri = endpoint.build_uri(&[path]);
    let failure = match client.get(&uri).send().await {
        Ok(response) if response.status().is_server_error() => Some(response.status().to_string()),
        Ok(response) => {
            tracing::debug!(endpoint = %endpoint, status = %response.status(), "Request succeeded");
            None
        }
        Err(e) => Some(e.to_string()),
    };

    if let Some(reason) = failure {
        tracing::warn!(endpoint = %endpoint, reason = %reason, "Request failed");
        if !pool.blacklist(&endpoint) {
            tracing::error!("All endpoints are blacklisted; waiting for heartbeat recovery");
        }
    }
}

fn report(pool: &EndpointPool, json: bool) -> Result<(), serde_json::Error> {
    let status = pool.status();
    if json {
        println!("{}", serde_json::to_string(&status)?);
    } else {
        tracing::info!(
            available = status.available.len(),
            blacklisted = status.blacklisted.len(),
            total = status.total,
            "Pool status"
        );
    }
    Ok(())
}
