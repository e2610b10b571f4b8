use crate::services::Car;
use arrow_array::{ArrayRef, Int32Array, RecordBatch, StringArray};
use arrow_schema::{DataType, Field, Schema};
use std::sync::Arc;

/// Create the Arrow schema for cars
pub fn create_schema() -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new("id", DataType::Utf8, false),
        Field::new("make", DataType::Utf8, false),
        Field::new("model", DataType::Utf8, false),
        Field::new("colour", DataType::Utf8, false),
        Field::new("year", DataType::Int32, false),
    ]))
}

/// Convert cars to Arrow RecordBatch
pub fn cars_to_batch(cars: &[Car]) -> anyhow::Result<RecordBatch> {
    let schema = create_schema();

    let ids: ArrayRef = Arc::new(StringArray::from(
        cars.iter().map(|c| c.id.as_str()).collect::<Vec<_>>(),
    ));
    let makes: ArrayRef = Arc::new(StringArray::from(
        cars.iter().map(|c| c.make.as_str()).collect::<Vec<_>>(),
    ));
    let models: ArrayRef = Arc::new(StringArray::from(
        cars.iter().map(|c| c.model.as_str()).collect::<Vec<_>>(),
    ));
    let colours: ArrayRef = Arc::new(StringArray::from(
        cars.iter().map(|c| c.colour.as_str()).collect::<Vec<_>>(),
    ));
    let years: ArrayRef = Arc::new(Int32Array::from(
        cars.iter().map(|c| c.year).collect::<Vec<_>>(),
    ));

    RecordBatch::try_new(schema, vec![ids, makes, models, colours, years])
        .map_err(|e| anyhow::anyhow!("Failed to create record batch: {}", e))
}
