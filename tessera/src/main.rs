use anyhow::Result;

use tessera::config::ServerConfig;

#[tokio::main]
async fn main() -> Result<()> {
    let config = ServerConfig::load_or_default()?;
    common::log_setup::setup_logging(&config.log_level, &config.log_dir, "tessera")?;

    tracing::info!(
        "Starting with storage root {} and {}x{} tiles",
        config.storage_root.display(),
        config.tile_width,
        config.tile_height
    );

    tessera::server::run_server(&config).await
}
