//! Service entry-point: tracing, configuration, storage wiring, HTTP server.

use std::net::{Ipv4Addr, SocketAddr};

use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use beacon::config::DatabaseSettings;
use beacon::outbound::persistence::{DbPool, PoolSettings};
use beacon::server::{ServerConfig, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = DatabaseSettings::load_from_iter(std::env::args_os())
        .map_err(|e| std::io::Error::other(format!("configuration error: {e}")))?;

    let bind_addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, 8080));
    let mut config = ServerConfig::new(bind_addr);

    match settings.connection_url() {
        Some(url) => match DbPool::connect(PoolSettings::new(url)).await {
            Ok(pool) => {
                info!("engagement store connected");
                config = config.with_db_pool(pool);
            }
            Err(error) => {
                warn!(%error, "database unavailable; recording engagement in memory only");
            }
        },
        None => warn!("database not configured; recording engagement in memory only"),
    }

    info!(%bind_addr, "starting tracking server");
    create_server(config)?.await
}
