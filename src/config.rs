//! Runtime settings for the generator.
//!
//! Values come from built-in defaults, then an optional TOML file, then
//! `FLASHGEN_*` environment variables, later sources winning.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;

use crate::utils::get_data_dir;

pub const DEFAULT_CONFIG_FILE: &str = "flashgen.toml";
pub const DEFAULT_MODEL: &str = "openai/gpt-4o-mini";
pub const DEFAULT_API_BASE: &str = "https://openrouter.ai/api/v1";
pub const DEMO_USER_ID: &str = "00000000-0000-0000-0000-000000000001";

const ENV_PREFIX: &str = "FLASHGEN";
const DATABASE_FILE_NAME: &str = "generations.db";

#[derive(Debug, Clone, Deserialize)]
pub struct GeneratorConfig {
    pub model: String,
    pub temperature: f32,
    pub top_p: f32,
    pub timeout_secs: u64,
    pub api_base: String,
    pub user_id: String,
    #[serde(default)]
    pub database_path: Option<PathBuf>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.7,
            top_p: 1.0,
            timeout_secs: 60,
            api_base: DEFAULT_API_BASE.to_string(),
            user_id: DEMO_USER_ID.to_string(),
            database_path: None,
        }
    }
}

impl GeneratorConfig {
    /// Load from `path` if it exists. A missing file is not an error.
    pub fn load(path: &Path) -> Result<Self> {
        Self::load_with(path, Environment::with_prefix(ENV_PREFIX))
    }

    /// Like [`GeneratorConfig::load`], with an explicit environment source.
    pub fn load_with(path: &Path, env: Environment) -> Result<Self> {
        let defaults = Self::default();
        let settings = Config::builder()
            .set_default("model", defaults.model)?
            .set_default("temperature", f64::from(defaults.temperature))?
            .set_default("top_p", f64::from(defaults.top_p))?
            .set_default("timeout_secs", defaults.timeout_secs)?
            .set_default("api_base", defaults.api_base)?
            .set_default("user_id", defaults.user_id)?
            .add_source(File::from(path).format(FileFormat::Toml).required(false))
            .add_source(env.try_parsing(true))
            .build()
            .with_context(|| format!("Failed to load config from {}", path.display()))?;

        settings
            .try_deserialize()
            .with_context(|| format!("Invalid config in {}", path.display()))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn database_path(&self) -> Result<PathBuf> {
        match &self.database_path {
            Some(path) => Ok(path.clone()),
            None => Ok(get_data_dir()?.join(DATABASE_FILE_NAME)),
        }
    }
}
