use anyhow::Context;
use log::{info, warn};
use rating_party_collab::{MemoryDatabase, Party, PgDatabase};
use rating_party_server::run_server;

use crate::{config::Config, logging::init_logger};

mod config;
mod logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env().context("Could not read configuration")?;
    init_logger(config.log_level).context("Could not initialize logging")?;

    if config.uses_default_secrets {
        warn!("ADMIN_PASSCODE or ADMIN_JWT_SECRET is not set, falling back to the defaults");
    }

    let party = match &config.database_url {
        Some(url) => {
            info!("Connecting to database...");

            let database = PgDatabase::new(url, config.database_max_connections)
                .await
                .context("Could not connect to database")?;

            Party::new(database, config.auth.clone())
        }
        None => {
            warn!("DATABASE_URL is not set, games are kept in memory and lost on exit");
            Party::new(MemoryDatabase::new(), config.auth.clone())
        }
    };

    info!(
        "Starting rating party in {:?} mode on port {}",
        config.environment, config.port
    );

    run_server(party, config.port)
        .await
        .context("Server stopped unexpectedly")
}
