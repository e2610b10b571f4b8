use anyhow::Result;
use cars::db::lance::LanceCarStore;
use cars::db::CarStore;
use cars::services::{AppConfig, CarService};
use cars::soundalike;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub car_service: Arc<CarService>,
    pub config: AppConfig,
}

impl AppState {
    pub fn new(car_service: CarService, config: AppConfig) -> Self {
        Self {
            car_service: Arc::new(car_service),
            config,
        }
    }

    /// Open the store and sounds-like provider described by `config`
    pub async fn from_config(config: AppConfig) -> Result<Self> {
        let lance = LanceCarStore::new(&config.storage.uri).await?;
        lance.init().await?;
        let store: Arc<dyn CarStore> = Arc::new(lance);

        let sounds_like = soundalike::create_provider(&config.sounds_like)?;
        tracing::info!(
            "Using storage {} with {} sound-alikes, update mode {}",
            config.storage.uri,
            sounds_like.name(),
            config.update_mode
        );

        let car_service = CarService::new(store, sounds_like).with_update_mode(config.update_mode);

        Ok(Self::new(car_service, config))
    }
}
