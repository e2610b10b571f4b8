use super::types::{
    Car, CarRequest, CarView, PartialCarRequest, PatchOutcome, UpdateMode, UpdateOutcome,
};
use super::ServiceError;
use crate::db::CarStore;
use crate::soundalike::{ScoredWord, SoundsLikeProvider};
use anyhow::Context;
use futures::StreamExt;
use std::sync::Arc;

/// Maximum number of sound-alike words shown on a view
pub const SOUND_ALIKE_LIMIT: usize = 5;

/// Maximum sound-alike lookups in flight while enriching a result list
pub const ENRICHMENT_CONCURRENCY: usize = 8;

/// Service for car CRUD operations and read-time enrichment
pub struct CarService {
    store: Arc<dyn CarStore>,
    sounds_like: Arc<dyn SoundsLikeProvider>,
    update_mode: UpdateMode,
}

impl CarService {
    /// Create a new car service with strict full updates
    pub fn new(store: Arc<dyn CarStore>, sounds_like: Arc<dyn SoundsLikeProvider>) -> Self {
        Self {
            store,
            sounds_like,
            update_mode: UpdateMode::default(),
        }
    }

    /// Choose how `update` treats an ID with no stored car
    pub fn with_update_mode(mut self, update_mode: UpdateMode) -> Self {
        self.update_mode = update_mode;
        self
    }

    /// Add a new car under a freshly generated ID
    pub async fn add(&self, request: CarRequest) -> Result<CarView, ServiceError> {
        let car = Car::new(request);

        self.store
            .save(&car)
            .await
            .context("Failed to save car")?;

        Ok(self.to_view(car).await)
    }

    /// Replace every field of a car.
    ///
    /// In [`UpdateMode::Upsert`] a missing car is created under `id`; in
    /// [`UpdateMode::Strict`] it is a not-found error. An existing car is
    /// always written, even when the values are unchanged.
    pub async fn update(
        &self,
        id: &str,
        request: CarRequest,
    ) -> Result<UpdateOutcome, ServiceError> {
        let stored = self.store.get(id).await.context("Failed to get car")?;

        let (car, outcome) = match stored {
            Some(mut car) => {
                car.overwrite(request);
                (car, UpdateOutcome::Updated)
            },
            None if self.update_mode == UpdateMode::Upsert => {
                (Car::with_id(id.to_string(), request), UpdateOutcome::Created)
            },
            None => return Err(ServiceError::NotFound(id.to_string())),
        };

        self.store
            .save(&car)
            .await
            .context("Failed to save car")?;

        Ok(outcome)
    }

    /// Merge the present fields of `request` into an existing car.
    ///
    /// Nothing is written when the merged car equals the stored one.
    pub async fn partial_update(
        &self,
        id: &str,
        request: PartialCarRequest,
    ) -> Result<PatchOutcome, ServiceError> {
        let existing = self
            .store
            .get(id)
            .await
            .context("Failed to get car")?
            .ok_or_else(|| ServiceError::NotFound(id.to_string()))?;

        let merged = merge(&existing, request);
        if merged == existing {
            tracing::debug!("Partial update of car {} changed nothing, skipping write", id);
            return Ok(PatchOutcome::Unchanged);
        }

        self.store
            .save(&merged)
            .await
            .context("Failed to save car")?;

        Ok(PatchOutcome::Updated)
    }

    /// Get a car by ID
    pub async fn get(&self, id: &str) -> Result<Option<CarView>, ServiceError> {
        match self.store.get(id).await.context("Failed to get car")? {
            Some(car) => Ok(Some(self.to_view(car).await)),
            None => Ok(None),
        }
    }

    /// Remove a car. A missing car is a not-found error.
    pub async fn remove(&self, id: &str) -> Result<(), ServiceError> {
        let deleted = self
            .store
            .delete(id)
            .await
            .context("Failed to delete car")?;

        if !deleted {
            tracing::debug!("No car with id {} found for delete", id);
            return Err(ServiceError::NotFound(id.to_string()));
        }
        Ok(())
    }

    /// Cars with exactly this make
    pub async fn find_by_make(&self, make: &str) -> Result<Vec<CarView>, ServiceError> {
        let cars = self
            .store
            .find_by_make(make)
            .await
            .context("Failed to find cars by make")?;

        Ok(self.to_views(cars).await)
    }

    /// Cars with exactly this make and model
    pub async fn find_by_make_and_model(
        &self,
        make: &str,
        model: &str,
    ) -> Result<Vec<CarView>, ServiceError> {
        let cars = self
            .store
            .find_by_make_and_model(make, model)
            .await
            .context("Failed to find cars by make and model")?;

        Ok(self.to_views(cars).await)
    }

    async fn to_view(&self, car: Car) -> CarView {
        let words = self.sounds_like.sounds_like(&car.model).await;
        CarView::from_car(car, join_sound_alikes(&words))
    }

    /// Enrich with bounded concurrency; output keeps the store's order
    async fn to_views(&self, cars: Vec<Car>) -> Vec<CarView> {
        futures::stream::iter(cars)
            .map(|car| self.to_view(car))
            .buffered(ENRICHMENT_CONCURRENCY)
            .collect()
            .await
    }
}

/// First [`SOUND_ALIKE_LIMIT`] words in provider order, joined with ", "
pub fn join_sound_alikes(words: &[ScoredWord]) -> String {
    words
        .iter()
        .take(SOUND_ALIKE_LIMIT)
        .map(|w| w.word.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

fn merge(existing: &Car, request: PartialCarRequest) -> Car {
    Car {
        id: existing.id.clone(),
        make: resolve(request.make, &existing.make),
        model: resolve(request.model, &existing.model),
        colour: resolve(request.colour, &existing.colour),
        year: resolve(request.year, &existing.year),
    }
}

/// Requested value if present, otherwise the current one
fn resolve<T: Clone>(requested: Option<T>, current: &T) -> T {
    requested.unwrap_or_else(|| current.clone())
}
