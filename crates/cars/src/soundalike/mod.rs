pub mod datamuse;
pub mod noop;
pub mod provider;

pub use provider::{ScoredWord, SoundsLikeProvider};

use crate::services::SoundsLikeConfig;
use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;

/// Create a sound-alike provider from configuration
pub fn create_provider(config: &SoundsLikeConfig) -> Result<Arc<dyn SoundsLikeProvider>> {
    match config.provider.as_str() {
        "datamuse" => {
            let provider = datamuse::DatamuseClient::new(
                &config.base_url,
                Duration::from_millis(config.timeout_ms),
            )
            .context("Failed to initialize Datamuse client")?;
            Ok(Arc::new(provider))
        },
        "none" => Ok(Arc::new(noop::NoopSoundsLike)),
        _ => Err(anyhow::anyhow!(
            "Unknown sounds-like provider: {}",
            config.provider
        )),
    }
}
