//! Fetch and convert the default NHANES cycles into `data/raw`

use nhanes_dl::{Config, Pipeline};
use tracing::error;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let pipeline = match Pipeline::new(Config::default()) {
        Ok(pipeline) => pipeline,
        Err(e) => {
            error!(error = %e, "failed to start");
            return;
        }
    };

    pipeline.run().await;
}
