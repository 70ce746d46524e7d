//! SehatYaad Server - HTTP API for prescription extraction

use server::ServerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine; real deployments use the environment.
    dotenvy::dotenv().ok();

    let config = ServerConfig::load()?;
    config.validate()?;

    server::start_server(config).await?;

    Ok(())
}
