//! Test utilities for the cars crate
//!
//! Reusable test doubles for unit and integration testing: an in-memory
//! `CarStore` that counts writes and a `SoundsLikeProvider` with canned answers.

use crate::db::CarStore;
use crate::services::Car;
use crate::soundalike::{ScoredWord, SoundsLikeProvider};
use anyhow::Result;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// In-memory store keeping insertion order.
///
/// Thread-safe via Mutex, suitable for unit tests.
pub struct TestStore {
    cars: Mutex<Vec<Car>>,
    saves: AtomicUsize,
}

impl TestStore {
    pub fn new() -> Self {
        Self {
            cars: Mutex::new(Vec::new()),
            saves: AtomicUsize::new(0),
        }
    }

    /// Store pre-populated with `cars`; seeding does not count as a save
    pub fn with_cars(cars: Vec<Car>) -> Self {
        let store = Self::new();
        *store.cars.lock().unwrap() = cars;
        store
    }

    /// Number of `save` calls made through the trait
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    pub fn snapshot(&self) -> Vec<Car> {
        self.cars.lock().unwrap().clone()
    }
}

impl Default for TestStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl CarStore for TestStore {
    async fn save(&self, car: &Car) -> Result<()> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        let mut cars = self.cars.lock().unwrap();
        match cars.iter_mut().find(|c| c.id == car.id) {
            Some(existing) => *existing = car.clone(),
            None => cars.push(car.clone()),
        }
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<Car>> {
        Ok(self.cars.lock().unwrap().iter().find(|c| c.id == id).cloned())
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let mut cars = self.cars.lock().unwrap();
        let before = cars.len();
        cars.retain(|c| c.id != id);
        Ok(cars.len() != before)
    }

    async fn find_by_make(&self, make: &str) -> Result<Vec<Car>> {
        Ok(self
            .cars
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.make == make)
            .cloned()
            .collect())
    }

    async fn find_by_make_and_model(&self, make: &str, model: &str) -> Result<Vec<Car>> {
        Ok(self
            .cars
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.make == make && c.model == model)
            .cloned()
            .collect())
    }
}

/// Provider with canned answers per word. Unknown words get nothing.
pub struct TestSoundsLike {
    words: HashMap<String, Vec<ScoredWord>>,
}

impl TestSoundsLike {
    /// Provider that knows nothing, like a failing upstream
    pub fn empty() -> Self {
        Self {
            words: HashMap::new(),
        }
    }

    /// Answer `input` with `words`, scored in descending order
    pub fn with_words(mut self, input: &str, words: &[&str]) -> Self {
        let scored = words
            .iter()
            .enumerate()
            .map(|(i, w)| ScoredWord::new(*w, (words.len() - i) as i64 * 10, 1))
            .collect();
        self.words.insert(input.to_string(), scored);
        self
    }
}

#[async_trait::async_trait]
impl SoundsLikeProvider for TestSoundsLike {
    async fn sounds_like(&self, word: &str) -> Vec<ScoredWord> {
        self.words.get(word).cloned().unwrap_or_default()
    }

    fn name(&self) -> &str {
        "test"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::CarRequest;

    #[tokio::test]
    async fn store_crud() {
        let store = TestStore::new();
        let car = Car::new(CarRequest::new("Ford", "Focus", "Black", 2020));

        store.save(&car).await.unwrap();
        assert_eq!(store.get(&car.id).await.unwrap(), Some(car.clone()));
        assert_eq!(store.save_count(), 1);

        assert!(store.delete(&car.id).await.unwrap());
        assert!(store.get(&car.id).await.unwrap().is_none());
        assert!(!store.delete(&car.id).await.unwrap());
    }

    #[tokio::test]
    async fn store_save_replaces_in_place() {
        let first = Car::with_id("1".to_string(), CarRequest::new("Ford", "Focus", "Black", 2020));
        let second = Car::with_id("2".to_string(), CarRequest::new("Ford", "Puma", "Blue", 2021));
        let store = TestStore::with_cars(vec![first.clone(), second.clone()]);

        let repainted = Car {
            colour: "Red".to_string(),
            ..first
        };
        store.save(&repainted).await.unwrap();

        assert_eq!(store.snapshot(), vec![repainted, second]);
    }

    #[tokio::test]
    async fn sounds_like_unknown_word_is_empty() {
        let provider = TestSoundsLike::empty().with_words("Focus", &["focus", "fokus"]);

        assert_eq!(provider.sounds_like("Focus").await.len(), 2);
        assert!(provider.sounds_like("Leaf").await.is_empty());
    }
}
