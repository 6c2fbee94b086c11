//! Geoloc Server binary.
//!
//! Exits non-zero when configuration is missing, the database is unreachable
//! or the port cannot be bound.

use server::ServerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Best effort; real environment variables win over .env entries
    let dotenv = dotenvy::dotenv();

    let config = ServerConfig::load()?;
    server::init_tracing(&config.log_level);

    match dotenv {
        Ok(path) => tracing::debug!(path = %path.display(), "Loaded .env file"),
        Err(_) => tracing::debug!("No .env file found, reading environment variables from system"),
    }

    server::start_server(config).await?;

    Ok(())
}
