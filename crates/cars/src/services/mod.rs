pub mod car;
pub mod config;
pub mod types;

pub use car::{CarService, ENRICHMENT_CONCURRENCY, SOUND_ALIKE_LIMIT};
pub use config::ConfigService;
pub use types::{
    AppConfig, Car, CarRequest, CarView, ModelView, PartialCarRequest, PatchOutcome,
    ServerConfig, SoundsLikeConfig, StorageConfig, UpdateMode, UpdateOutcome, ValidationError,
};

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("No car found for id: {0}")]
    NotFound(String),

    #[error("{0}")]
    Unexpected(#[from] anyhow::Error),
}
