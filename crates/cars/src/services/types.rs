use serde::{Deserialize, Serialize};

/// Stored car record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Car {
    pub id: String,
    pub make: String,
    pub model: String,
    pub colour: String,
    pub year: i32,
}

impl Car {
    /// Generate a new 10-character ID using reduced alphabet
    pub fn generate_id() -> String {
        const ALPHABET: &[char] = &[
            '2', '3', '4', '5', '6', '7', '8', '9', 'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'j',
            'k', 'm', 'n', 'p', 'q', 'r', 's', 't', 'u', 'v', 'w', 'x', 'y', 'z',
        ];
        nanoid::nanoid!(10, ALPHABET)
    }

    /// Create a new car with a freshly generated ID
    pub fn new(request: CarRequest) -> Self {
        Self::with_id(Self::generate_id(), request)
    }

    /// Create a car under a caller-supplied ID
    pub fn with_id(id: String, request: CarRequest) -> Self {
        Self {
            id,
            make: request.make,
            model: request.model,
            colour: request.colour,
            year: request.year,
        }
    }

    /// Overwrite every mutable field from a full request
    pub fn overwrite(&mut self, request: CarRequest) {
        self.make = request.make;
        self.model = request.model;
        self.colour = request.colour;
        self.year = request.year;
    }
}

/// Body of a create or full update
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarRequest {
    pub make: String,
    pub model: String,
    pub colour: String,
    pub year: i32,
}

impl CarRequest {
    pub fn new(
        make: impl Into<String>,
        model: impl Into<String>,
        colour: impl Into<String>,
        year: i32,
    ) -> Self {
        Self {
            make: make.into(),
            model: model.into(),
            colour: colour.into(),
            year,
        }
    }

    /// Check that every text field is non-blank and the year is positive
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_non_blank("make", &self.make)?;
        require_non_blank("model", &self.model)?;
        require_non_blank("colour", &self.colour)?;
        require_positive_year(self.year)
    }
}

/// Body of a partial update. Absent fields keep their stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartialCarRequest {
    #[serde(default)]
    pub make: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub colour: Option<String>,
    #[serde(default)]
    pub year: Option<i32>,
}

impl PartialCarRequest {
    /// Check only the fields that are present
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(make) = &self.make {
            require_non_blank("make", make)?;
        }
        if let Some(model) = &self.model {
            require_non_blank("model", model)?;
        }
        if let Some(colour) = &self.colour {
            require_non_blank("colour", colour)?;
        }
        if let Some(year) = self.year {
            require_positive_year(year)?;
        }
        Ok(())
    }
}

fn require_non_blank(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Blank(field));
    }
    Ok(())
}

fn require_positive_year(year: i32) -> Result<(), ValidationError> {
    if year <= 0 {
        return Err(ValidationError::NonPositiveYear(year));
    }
    Ok(())
}

/// Rejected request body
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("'{0}' must not be blank")]
    Blank(&'static str),

    #[error("'year' must be positive, got {0}")]
    NonPositiveYear(i32),
}

/// Read-time projection of a car, enriched with sound-alike words
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarView {
    pub id: String,
    pub make: String,
    pub model: ModelView,
    pub colour: String,
    pub year: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelView {
    pub name: String,
    /// Comma-joined, at most five words
    pub related_sound_alikes: String,
}

impl CarView {
    pub fn from_car(car: Car, related_sound_alikes: String) -> Self {
        Self {
            id: car.id,
            make: car.make,
            model: ModelView {
                name: car.model,
                related_sound_alikes,
            },
            colour: car.colour,
            year: car.year,
        }
    }
}

/// How a full update treats an ID with no stored car
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UpdateMode {
    /// Missing car is a not-found error
    #[default]
    Strict,
    /// Missing car is created under the supplied ID
    Upsert,
}

impl std::fmt::Display for UpdateMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            UpdateMode::Strict => "strict",
            UpdateMode::Upsert => "upsert",
        };
        write!(f, "{}", s)
    }
}

impl std::str::FromStr for UpdateMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "strict" => Ok(UpdateMode::Strict),
            "upsert" => Ok(UpdateMode::Upsert),
            _ => Err(anyhow::anyhow!("Invalid update mode: {}", s)),
        }
    }
}

impl<'de> Deserialize<'de> for UpdateMode {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Result of a full update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    Created,
    Updated,
}

impl UpdateOutcome {
    pub fn created(&self) -> bool {
        matches!(self, UpdateOutcome::Created)
    }
}

/// Result of a partial update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchOutcome {
    Updated,
    /// Merged values matched the stored car, nothing was written
    Unchanged,
}

/// Configuration for the sound-alike provider
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SoundsLikeConfig {
    pub provider: String,
    pub base_url: String,
    pub timeout_ms: u64,
}

impl Default for SoundsLikeConfig {
    fn default() -> Self {
        Self {
            provider: "datamuse".to_string(),
            base_url: "https://api.datamuse.com".to_string(),
            timeout_ms: 2000,
        }
    }
}

/// Configuration for storage backend
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Storage URI: local path or s3://bucket/path
    pub uri: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            uri: ".cars/db/cars.lance".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub update_mode: UpdateMode,
    #[serde(default)]
    pub sounds_like: SoundsLikeConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub server: ServerConfig,
}
