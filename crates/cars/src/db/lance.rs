use super::{schema, CarStore};
use crate::services::Car;
use anyhow::{Context, Result};
use arrow_array::{cast::AsArray, Array, Int32Array, RecordBatch, RecordBatchIterator};
use futures::TryStreamExt;
use lancedb::query::{ExecutableQuery, QueryBase};
use std::path::Path;
use tokio::sync::RwLock;

const TABLE_NAME: &str = "cars";

/// LanceDB implementation supporting local paths and S3 URIs
pub struct LanceCarStore {
    uri: String,
    connection: RwLock<Option<lancedb::Connection>>,
}

impl LanceCarStore {
    /// Create a new store from a URI (local path or s3://...)
    pub async fn new(uri: &str) -> Result<Self> {
        if !uri.starts_with("s3://") {
            let path = Path::new(uri);
            if let Some(parent) = path.parent() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .context("Failed to create database directory")?;
            }
        }

        Ok(Self {
            uri: uri.to_string(),
            connection: RwLock::new(None),
        })
    }

    /// Connect and create the cars table if it doesn't exist
    pub async fn init(&self) -> Result<()> {
        if !self.uri.starts_with("s3://") {
            tokio::fs::create_dir_all(&self.uri)
                .await
                .context("Failed to create database directory")?;
        }

        let db = lancedb::connect(&self.uri)
            .execute()
            .await
            .context("Failed to connect to LanceDB")?;

        let table_names = db.table_names().execute().await?;
        if !table_names.contains(&TABLE_NAME.to_string()) {
            db.create_empty_table(TABLE_NAME, schema::create_schema())
                .execute()
                .await
                .context("Failed to create cars table")?;
        }

        *self.connection.write().await = Some(db);
        Ok(())
    }

    /// Get or create a connection
    async fn get_connection(&self) -> Result<lancedb::Connection> {
        let conn = self.connection.read().await;
        if let Some(ref db) = *conn {
            return Ok(db.clone());
        }
        drop(conn);

        let db = lancedb::connect(&self.uri)
            .execute()
            .await
            .context("Failed to connect to LanceDB")?;

        *self.connection.write().await = Some(db.clone());
        Ok(db)
    }

    async fn open_table(&self) -> Result<lancedb::Table> {
        let db = self.get_connection().await?;
        db.open_table(TABLE_NAME)
            .execute()
            .await
            .context("Failed to open cars table")
    }

    /// Run a filtered scan and collect every matching car
    async fn query(&self, filter: String) -> Result<Vec<Car>> {
        let table = self.open_table().await?;
        let mut stream = table.query().only_if(filter).execute().await?;

        let mut cars = Vec::new();
        while let Some(batch) = stream.try_next().await? {
            cars.extend(Self::batch_to_cars(&batch)?);
        }
        Ok(cars)
    }

    /// Convert RecordBatch rows to cars
    fn batch_to_cars(batch: &RecordBatch) -> Result<Vec<Car>> {
        let ids = batch.column(0).as_string::<i32>();
        let makes = batch.column(1).as_string::<i32>();
        let models = batch.column(2).as_string::<i32>();
        let colours = batch.column(3).as_string::<i32>();
        let years = batch
            .column(4)
            .as_any()
            .downcast_ref::<Int32Array>()
            .context("Failed to cast year column")?;

        Ok((0..batch.num_rows())
            .map(|i| Car {
                id: ids.value(i).to_string(),
                make: makes.value(i).to_string(),
                model: models.value(i).to_string(),
                colour: colours.value(i).to_string(),
                year: years.value(i),
            })
            .collect())
    }
}

fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

#[async_trait::async_trait]
impl CarStore for LanceCarStore {
    async fn save(&self, car: &Car) -> Result<()> {
        let table = self.open_table().await?;
        let batch = schema::cars_to_batch(std::slice::from_ref(car))?;
        let schema = batch.schema();

        // Upsert keyed on id, committed as a single table version
        let mut merge = table.merge_insert(&["id"]);
        merge
            .when_matched_update_all(None)
            .when_not_matched_insert_all();
        merge
            .execute(Box::new(RecordBatchIterator::new(vec![Ok(batch)], schema)))
            .await
            .context("Failed to save car")?;

        tracing::debug!("Saved car: {}", car.id);
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<Car>> {
        let cars = self.query(format!("id = {}", quote(id))).await?;
        Ok(cars.into_iter().next())
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        if self.get(id).await?.is_none() {
            return Ok(false);
        }

        let table = self.open_table().await?;
        table
            .delete(&format!("id = {}", quote(id)))
            .await
            .context("Failed to delete car")?;

        tracing::debug!("Deleted car: {}", id);
        Ok(true)
    }

    async fn find_by_make(&self, make: &str) -> Result<Vec<Car>> {
        self.query(format!("make = {}", quote(make)))
            .await
            .context("Failed to query cars by make")
    }

    async fn find_by_make_and_model(&self, make: &str, model: &str) -> Result<Vec<Car>> {
        self.query(format!("make = {} AND model = {}", quote(make), quote(model)))
            .await
            .context("Failed to query cars by make and model")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::CarRequest;
    use tempfile::TempDir;

    async fn open_store(temp_dir: &TempDir) -> LanceCarStore {
        let db_path = temp_dir.path().join("cars.lance");
        let store = LanceCarStore::new(db_path.to_str().unwrap()).await.unwrap();
        store.init().await.unwrap();
        store
    }

    fn car(make: &str, model: &str) -> Car {
        Car::new(CarRequest::new(make, model, "Black", 2020))
    }

    #[tokio::test]
    async fn save_then_get_round_trips_all_fields() {
        let temp_dir = TempDir::new().unwrap();
        let store = open_store(&temp_dir).await;
        let focus = car("Ford", "Focus");

        store.save(&focus).await.unwrap();

        assert_eq!(store.get(&focus.id).await.unwrap(), Some(focus));
    }

    #[tokio::test]
    async fn get_missing_returns_none() {
        let temp_dir = TempDir::new().unwrap();
        let store = open_store(&temp_dir).await;

        assert!(store.get("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn save_replaces_existing_row() {
        let temp_dir = TempDir::new().unwrap();
        let store = open_store(&temp_dir).await;
        let mut focus = car("Ford", "Focus");
        store.save(&focus).await.unwrap();

        focus.colour = "Red".to_string();
        store.save(&focus).await.unwrap();

        let found = store.find_by_make("Ford").await.unwrap();
        assert_eq!(found, vec![focus]);
    }

    #[tokio::test]
    async fn repeated_saves_keep_a_single_row() {
        let temp_dir = TempDir::new().unwrap();
        let store = open_store(&temp_dir).await;
        let mut focus = car("Ford", "Focus");

        for year in 2020..2024 {
            focus.year = year;
            store.save(&focus).await.unwrap();
        }

        let table = store.open_table().await.unwrap();
        assert_eq!(table.count_rows(None).await.unwrap(), 1);
        assert_eq!(store.get(&focus.id).await.unwrap(), Some(focus));
    }

    #[tokio::test]
    async fn save_of_new_id_leaves_other_rows_untouched() {
        let temp_dir = TempDir::new().unwrap();
        let store = open_store(&temp_dir).await;
        let focus = car("Ford", "Focus");
        let fiesta = car("Ford", "Fiesta");
        store.save(&focus).await.unwrap();

        store.save(&fiesta).await.unwrap();

        assert_eq!(store.get(&focus.id).await.unwrap(), Some(focus));
        assert_eq!(store.get(&fiesta.id).await.unwrap(), Some(fiesta));
    }

    #[tokio::test]
    async fn delete_reports_whether_a_row_existed() {
        let temp_dir = TempDir::new().unwrap();
        let store = open_store(&temp_dir).await;
        let focus = car("Ford", "Focus");
        store.save(&focus).await.unwrap();

        assert!(store.delete(&focus.id).await.unwrap());
        assert!(store.get(&focus.id).await.unwrap().is_none());
        assert!(!store.delete(&focus.id).await.unwrap());
    }

    #[tokio::test]
    async fn find_by_make_is_exact_and_case_sensitive() {
        let temp_dir = TempDir::new().unwrap();
        let store = open_store(&temp_dir).await;
        store.save(&car("Ford", "Focus")).await.unwrap();
        store.save(&car("Ford", "Fiesta")).await.unwrap();
        store.save(&car("Nissan", "Leaf")).await.unwrap();

        assert_eq!(store.find_by_make("Ford").await.unwrap().len(), 2);
        assert!(store.find_by_make("ford").await.unwrap().is_empty());
        assert!(store.find_by_make("Toyota").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn find_by_make_and_model_filters_both() {
        let temp_dir = TempDir::new().unwrap();
        let store = open_store(&temp_dir).await;
        let focus = car("Ford", "Focus");
        store.save(&focus).await.unwrap();
        store.save(&car("Ford", "Fiesta")).await.unwrap();

        let found = store.find_by_make_and_model("Ford", "Focus").await.unwrap();
        assert_eq!(found, vec![focus]);
    }

    #[tokio::test]
    async fn quotes_in_filters_are_escaped() {
        let temp_dir = TempDir::new().unwrap();
        let store = open_store(&temp_dir).await;
        let odd = car("O'Neil", "It's");
        store.save(&odd).await.unwrap();

        let found = store.find_by_make_and_model("O'Neil", "It's").await.unwrap();
        assert_eq!(found, vec![odd]);
    }

    #[tokio::test]
    async fn init_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let store = open_store(&temp_dir).await;
        let focus = car("Ford", "Focus");
        store.save(&focus).await.unwrap();

        store.init().await.unwrap();

        assert!(store.get(&focus.id).await.unwrap().is_some());
    }

    #[test]
    fn quote_doubles_single_quotes() {
        assert_eq!(quote("O'Neil"), "'O''Neil'");
    }
}
