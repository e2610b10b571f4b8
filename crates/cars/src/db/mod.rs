pub mod lance;
pub mod schema;

use crate::services::Car;
use anyhow::Result;

/// Storage trait for car records
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CarStore: Send + Sync {
    /// Insert or replace the car with the same ID
    async fn save(&self, car: &Car) -> Result<()>;

    /// Get a car by ID
    async fn get(&self, id: &str) -> Result<Option<Car>>;

    /// Delete a car. Returns false when nothing was stored under `id`.
    async fn delete(&self, id: &str) -> Result<bool>;

    /// Cars whose make matches exactly
    async fn find_by_make(&self, make: &str) -> Result<Vec<Car>>;

    /// Cars whose make and model both match exactly
    async fn find_by_make_and_model(&self, make: &str, model: &str) -> Result<Vec<Car>>;
}
