use crate::{
    constants::{
        APP_NAME, CONFIG_FILE_NAME, DEFAULT_API_URL, DEFAULT_SPEAKING_SETTLE_MS,
        DEFAULT_TICK_RATE_MS, TOKEN_FILE_NAME,
    },
    errors::{GltchError, GltchResult},
};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::{
    env, fs,
    path::{Path, PathBuf},
    time::Duration,
};

const LOG_LEVELS: &[&str] = &["off", "error", "warn", "info", "debug", "trace"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_base_url: String,
    /// Token file; defaults to `auth_token` next to the config file.
    pub token_path: Option<PathBuf>,
    pub speaking_settle_ms: u64,
    pub tick_rate_ms: u64,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.to_string(),
            token_path: None,
            speaking_settle_ms: DEFAULT_SPEAKING_SETTLE_MS,
            tick_rate_ms: DEFAULT_TICK_RATE_MS,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    pub fn speaking_settle(&self) -> Duration {
        Duration::from_millis(self.speaking_settle_ms)
    }

    pub fn tick_rate(&self) -> Duration {
        Duration::from_millis(self.tick_rate_ms)
    }

    pub fn resolved_token_path(&self) -> GltchResult<PathBuf> {
        match &self.token_path {
            Some(path) => Ok(path.clone()),
            None => Ok(config_dir()?.join(TOKEN_FILE_NAME)),
        }
    }

    /// Applies `GLTCH_API_URL` and `GLTCH_LOG_LEVEL` on top of the file values.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("GLTCH_API_URL") {
            self.api_base_url = url;
        }
        if let Some(level) = lookup("GLTCH_LOG_LEVEL") {
            self.log_level = level;
        }
    }
}

pub fn config_dir() -> GltchResult<PathBuf> {
    let base = dirs::config_dir()
        .ok_or_else(|| GltchError::config_error("Could not determine config directory"))?;
    Ok(base.join(APP_NAME))
}

pub fn get_config_path() -> GltchResult<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Loads the config at `path`, writing the defaults there first if it does not exist.
pub fn load_config(path: &Path) -> GltchResult<Config> {
    if path.exists() {
        let config_str = fs::read_to_string(path)
            .map_err(|e| GltchError::config_error(format!("Failed to read config file: {}", e)))?;

        let config: Config = serde_json::from_str(&config_str)
            .map_err(|e| GltchError::config_error(format!("Failed to parse config: {}", e)))?;

        validate_config(&config)?;
        Ok(config)
    } else {
        let config = Config::default();
        save_config(path, &config)?;
        Ok(config)
    }
}

/// Loads the file config, layers the environment on top and validates the result.
pub fn load_effective_config(path: &Path) -> GltchResult<Config> {
    let mut config = load_config(path)?;
    config.apply_env_overrides();
    validate_config(&config)?;
    Ok(config)
}

pub fn save_config(path: &Path, config: &Config) -> GltchResult<()> {
    validate_config(config)?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            GltchError::config_error(format!("Failed to create config directory: {}", e))
        })?;
    }

    let config_str = serde_json::to_string_pretty(config)
        .map_err(|e| GltchError::config_error(format!("Failed to serialize config: {}", e)))?;

    fs::write(path, config_str)
        .map_err(|e| GltchError::config_error(format!("Failed to write config file: {}", e)))?;

    Ok(())
}

pub fn validate_config(config: &Config) -> GltchResult<()> {
    let url = Url::parse(&config.api_base_url).map_err(|e| {
        GltchError::config_error(format!("Invalid api_base_url '{}': {}", config.api_base_url, e))
    })?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(GltchError::config_error(
            "api_base_url must use http or https",
        ));
    }

    if config.tick_rate_ms == 0 {
        return Err(GltchError::config_error("tick_rate_ms must be greater than 0"));
    }

    if !LOG_LEVELS.contains(&config.log_level.to_ascii_lowercase().as_str()) {
        return Err(GltchError::config_error(format!(
            "Unknown log_level '{}'",
            config.log_level
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_validate_config_valid() {
        let config = Config::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validate_config_invalid_url() {
        let mut config = Config::default();
        config.api_base_url = "not a url".to_string();
        assert!(validate_config(&config).is_err());

        config.api_base_url = "ftp://example.com/api".to_string();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_config_zero_tick_rate() {
        let mut config = Config::default();
        config.tick_rate_ms = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_config_unknown_log_level() {
        let mut config = Config::default();
        config.log_level = "loud".to_string();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_overrides_are_validated() {
        let mut config = Config::default();
        config.apply_overrides(|key| match key {
            "GLTCH_API_URL" => Some("garbage".to_string()),
            _ => None,
        });
        assert_eq!(config.api_base_url, "garbage");
        assert!(validate_config(&config).is_err());

        let mut config = Config::default();
        config.apply_overrides(|key| match key {
            "GLTCH_LOG_LEVEL" => Some("loud".to_string()),
            _ => None,
        });
        assert!(validate_config(&config).is_err());

        let mut config = Config::default();
        config.apply_overrides(|key| match key {
            "GLTCH_API_URL" => Some("https://cloud.gltch.app/api".to_string()),
            "GLTCH_LOG_LEVEL" => Some("debug".to_string()),
            _ => None,
        });
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_load_config_creates_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("gltch").join("config.json");

        let config = load_config(&path).unwrap();
        assert_eq!(config, Config::default());
        assert!(path.exists());

        let reloaded = load_config(&path).unwrap();
        assert_eq!(reloaded, config);
    }

    #[test]
    fn test_load_config_fills_missing_fields() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "api_base_url": "https://cloud.gltch.app/api" }"#).unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.api_base_url, "https://cloud.gltch.app/api");
        assert_eq!(config.speaking_settle_ms, DEFAULT_SPEAKING_SETTLE_MS);
    }
}
