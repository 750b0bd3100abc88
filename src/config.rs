//! Generator configuration.
//!
//! Loaded from a TOML document where every section and key is optional, then
//! overridden by `SNAPCHAIN_*` environment variables.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CodegenConfig {
    #[serde(default)]
    pub emitter: EmitterConfig,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    #[serde(default)]
    pub refinement: RefinementConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmitterConfig {
    /// Spaces per indentation level.
    #[serde(default = "default_indent_width")]
    pub indent_width: usize,
}

impl Default for EmitterConfig {
    fn default() -> Self {
        Self {
            indent_width: default_indent_width(),
        }
    }
}

impl EmitterConfig {
    pub fn indent_unit(&self) -> String {
        " ".repeat(self.indent_width)
    }
}

fn default_indent_width() -> usize {
    4
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Nodes processed between cooperative yields.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Pause after each batch. Zero only yields.
    #[serde(default = "default_batch_delay_ms")]
    pub batch_delay_ms: u64,
    /// Quiet window before a burst of edits triggers one generation.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            batch_delay_ms: default_batch_delay_ms(),
            debounce_ms: default_debounce_ms(),
        }
    }
}

impl SchedulerConfig {
    pub fn batch_delay(&self) -> Duration {
        Duration::from_millis(self.batch_delay_ms)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

fn default_batch_size() -> usize {
    25
}

fn default_batch_delay_ms() -> u64 {
    10
}

fn default_debounce_ms() -> u64 {
    300
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefinementConfig {
    /// Base URL of an OpenAI-compatible chat completion API.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_model")]
    pub model: String,
    /// Name of the environment variable holding the bearer key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_referer")]
    pub referer: String,
    #[serde(default = "default_title")]
    pub title: String,
}

impl Default for RefinementConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            model: default_model(),
            api_key_env: default_api_key_env(),
            timeout_secs: default_timeout_secs(),
            temperature: default_temperature(),
            referer: default_referer(),
            title: default_title(),
        }
    }
}

impl RefinementConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_endpoint() -> String {
    "https://openrouter.ai/api/v1".to_string()
}

fn default_model() -> String {
    "openai/gpt-oss-120b:free".to_string()
}

fn default_api_key_env() -> String {
    "OPENROUTER_API_KEY".to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_temperature() -> f32 {
    0.2
}

fn default_referer() -> String {
    "http://localhost:3000".to_string()
}

fn default_title() -> String {
    "Snapchain Smart Contract Builder".to_string()
}

impl CodegenConfig {
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    /// Reads `path` if given, otherwise starts from defaults, then applies the
    /// process environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env_overrides(|name| std::env::var(name).ok())?;
        Ok(config)
    }

    /// Applies `SNAPCHAIN_*` overrides read through `lookup`.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        override_parsed(&lookup, "SNAPCHAIN_INDENT_WIDTH", &mut self.emitter.indent_width)?;
        override_parsed(&lookup, "SNAPCHAIN_BATCH_SIZE", &mut self.scheduler.batch_size)?;
        override_parsed(&lookup, "SNAPCHAIN_BATCH_DELAY_MS", &mut self.scheduler.batch_delay_ms)?;
        override_parsed(&lookup, "SNAPCHAIN_DEBOUNCE_MS", &mut self.scheduler.debounce_ms)?;
        override_parsed(&lookup, "SNAPCHAIN_REFINE_TIMEOUT_SECS", &mut self.refinement.timeout_secs)?;
        override_parsed(&lookup, "SNAPCHAIN_REFINE_TEMPERATURE", &mut self.refinement.temperature)?;
        override_parsed(&lookup, "SNAPCHAIN_REFINE_ENDPOINT", &mut self.refinement.endpoint)?;
        override_parsed(&lookup, "SNAPCHAIN_REFINE_MODEL", &mut self.refinement.model)?;
        override_parsed(&lookup, "SNAPCHAIN_REFINE_API_KEY_ENV", &mut self.refinement.api_key_env)?;
        self.validate()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.emitter.indent_width == 0 {
            return Err(ConfigError::Invalid(
                "emitter.indent_width must be at least 1".to_string(),
            ));
        }
        if self.scheduler.batch_size == 0 {
            return Err(ConfigError::Invalid(
                "scheduler.batch_size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

fn override_parsed<F, T>(lookup: &F, name: &str, target: &mut T) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    let Some(raw) = lookup(name) else {
        return Ok(());
    };
    *target = raw.trim().parse().map_err(|_| ConfigError::InvalidEnv {
        name: name.to_string(),
        value: raw.clone(),
    })?;
    Ok(())
}
