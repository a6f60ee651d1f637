use database::{DatabaseConnectionInfo, PgDatabase};
use railway::memory::MemoryDatabase;
use tracing_subscriber::EnvFilter;
use web::{config::WebConfig, start_web_server, WebState};

#[tokio::main]
async fn main() {
    // also receives the `log` records of the library crates
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = WebConfig::from_env();

    let result = match DatabaseConnectionInfo::from_env() {
        Some(database_connection_info) => {
            match PgDatabase::connect(database_connection_info).await {
                Ok(database) => start_web_server(WebState::new(database), config).await,
                Err(why) => {
                    tracing::error!("could not connect to database: {}", why);
                    return;
                }
            }
        }
        None => {
            tracing::warn!("no database configured, all data is kept in memory");
            start_web_server(WebState::new(MemoryDatabase::new()), config).await
        }
    };

    if let Err(why) = result {
        tracing::error!("web server stopped: {}", why);
    }
}
