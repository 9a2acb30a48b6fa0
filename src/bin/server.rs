//! Kraftlet server binary.
//!
//! Environment:
//! - KRAFTLET_ADDR (default 0.0.0.0:9092)
//! - KRAFTLET_LOG_DIR (default /tmp/kraft-combined-logs)
//! - KRAFTLET_MAX_CONNECTIONS (default unbounded)
//! - KRAFTLET_MAX_FRAME_BYTES (default 100MB)

use kraftlet::observability::observability;
use kraftlet::{server, Broker, BrokerConfig};
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn env_parse<T: FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|s| s.parse::<T>().ok())
}

fn config_from_env() -> BrokerConfig {
    let defaults = BrokerConfig::default();
    BrokerConfig {
        log_dir: std::env::var("KRAFTLET_LOG_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.log_dir),
        max_connections: env_parse("KRAFTLET_MAX_CONNECTIONS"),
        max_frame_len: env_parse("KRAFTLET_MAX_FRAME_BYTES").unwrap_or(defaults.max_frame_len),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("kraftlet=info".parse()?))
        .init();

    let config = config_from_env();
    let addr = std::env::var("KRAFTLET_ADDR").unwrap_or_else(|_| "0.0.0.0:9092".to_string());
    let broker = Arc::new(Broker::new(config));

    tokio::select! {
        res = server::run_kafka_server(broker, &addr) => res?,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("shutting down\n{}", observability().render_prometheus());
        }
    }
    Ok(())
}
