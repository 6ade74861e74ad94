//! Space Apples Playground - Main Entry Point

use anyhow::Context;
use playground::{init_logging, run, PlaygroundConfig};
use std::path::PathBuf;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = std::env::var_os("PLAYGROUND_CONFIG").map(PathBuf::from);
    let config = PlaygroundConfig::load(config_path.as_deref())
        .context("loading playground configuration")?;

    init_logging(&config.log_level)?;

    info!("=== Space Apples Playground v{} ===", env!("CARGO_PKG_VERSION"));
    info!(
        "Play area {}x{}, estimator every {} frames",
        config.game.play_width, config.game.play_height, config.signals.throttle_every
    );

    let summary = run(config).await?;

    info!("Final score: {}", summary.game.label);
    if let Some(stats) = summary.extraction {
        info!(
            "Processed {} frames, {} landmark passes",
            stats.frames_seen, stats.estimator_calls
        );
    }

    Ok(())
}
