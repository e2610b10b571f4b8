use super::types::AppConfig;
use anyhow::{Context, Result};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use std::path::PathBuf;

/// Environment variable prefix; nested keys use `__`, e.g. `CARS_STORAGE__URI`
pub const ENV_PREFIX: &str = "CARS_";

/// Service for configuration management
pub struct ConfigService {
    config_path: PathBuf,
}

impl ConfigService {
    /// Create a config service backed by the TOML file at `config_path`
    pub fn new(config_path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
        }
    }

    pub fn exists(&self) -> bool {
        self.config_path.exists()
    }

    /// Initialize configuration with defaults
    pub fn init(&self) -> Result<AppConfig> {
        let config = AppConfig::default();
        self.save(&config)?;
        Ok(config)
    }

    /// Load configuration: defaults, then the file if present, then env vars
    pub fn load(&self) -> Result<AppConfig> {
        self.figment()
            .extract()
            .context("Failed to load configuration")
    }

    /// Save configuration to file
    pub fn save(&self, config: &AppConfig) -> Result<()> {
        let content = toml::to_string_pretty(config).context("Failed to serialize config")?;

        if let Some(parent) = self.config_path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        std::fs::write(&self.config_path, content).context("Failed to write config file")?;
        Ok(())
    }

    fn figment(&self) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(AppConfig::default()));

        if self.exists() {
            figment = figment.merge(Toml::file(&self.config_path));
        }

        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }
}
