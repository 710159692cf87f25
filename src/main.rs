use anyhow::Result;
use skycast_core::Config;
use skycast_server::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // .env is optional; real environment variables win
    dotenvy::dotenv().ok();

    skycast_core::init()?;

    let (config, _validation) = Config::load_validated()?;
    tracing::info!(
        "Serving client from {}",
        config.server.static_dir.display()
    );

    let state = AppState::from_config(config)?;
    skycast_server::serve(state).await?;

    tracing::info!("Skycast stopped");
    Ok(())
}
