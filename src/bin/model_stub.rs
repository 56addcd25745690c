//! Stand-alone model service answering with the offline responders.
//!
//! Point the game at it with `BEAR_MODEL_HOST`/`BEAR_MODEL_PORT`, or replace
//! it with a service backed by real models that speaks the same protocol.

use std::sync::Arc;

use anyhow::Result;

use tui_bear::models::{run_server, ModelConfig, OfflineResponder};

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = ModelConfig::from_env();
    log::info!("serving offline models on {}", config.endpoint());
    run_server(config, Arc::new(OfflineResponder::new()), None).await
}
