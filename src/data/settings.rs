use crate::core::error::ReplayError;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_TICK_MS: u64 = 650;
const DEFAULT_API_URL: &str = "http://localhost:7070/api";
const DEFAULT_TIMEOUT_MS: u64 = 10_000;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiSettings {
    pub base_url: String,
    pub timeout_ms: u64,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplaySettings {
    pub tick_interval_ms: u64,
}

impl Default for ReplaySettings {
    fn default() -> Self {
        Self {
            tick_interval_ms: DEFAULT_TICK_MS,
        }
    }
}

impl ReplaySettings {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub api: ApiSettings,
    pub replay: ReplaySettings,
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api: ApiSettings::default(),
            replay: ReplaySettings::default(),
            log_level: "info".to_string(),
        }
    }
}

impl Settings {
    pub fn load_from_yaml_str(yaml: &str) -> Result<Self, ReplayError> {
        let settings: Settings =
            serde_yaml::from_str(yaml).map_err(|err| ReplayError::Config(err.to_string()))?;
        settings.validate()
    }

    pub fn load_from_file(path: &Path) -> Result<Self, ReplayError> {
        let yaml = fs::read_to_string(path)
            .map_err(|err| ReplayError::Config(format!("{}: {}", path.display(), err)))?;
        Self::load_from_yaml_str(&yaml)
    }

    /// Defaults, then `path` if it exists, then `.env` / process environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ReplayError> {
        dotenv::dotenv().ok();
        let base = match path {
            Some(path) if path.exists() => Self::load_from_file(path)?,
            _ => Self::default(),
        };
        base.apply_env(|key| env::var(key).ok())
    }

    pub fn apply_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ReplayError> {
        if let Some(url) = lookup("API_URL") {
            self.api.base_url = url;
        }
        if let Some(tick) = lookup("REPLAY_TICK_MS") {
            self.replay.tick_interval_ms = tick
                .trim()
                .parse()
                .map_err(|_| ReplayError::Config(format!("REPLAY_TICK_MS is not a number: {}", tick)))?;
        }
        if let Some(level) = lookup("LOG_LEVEL") {
            self.log_level = level;
        }
        self.validate()
    }

    fn validate(mut self) -> Result<Self, ReplayError> {
        if self.replay.tick_interval_ms == 0 {
            return Err(ReplayError::Config("tick_interval_ms must be positive".to_string()));
        }
        while self.api.base_url.ends_with('/') {
            self.api.base_url.pop();
        }
        if self.api.base_url.is_empty() {
            return Err(ReplayError::Config("api.base_url is empty".to_string()));
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_yaml_overrides_defaults() {
        let settings = Settings::load_from_yaml_str(
            "api:\n  base_url: https://example.test/api/\nreplay:\n  tick_interval_ms: 100\n",
        )
        .expect("parse");
        assert_eq!(settings.api.base_url, "https://example.test/api");
        assert_eq!(settings.api.timeout_ms, DEFAULT_TIMEOUT_MS);
        assert_eq!(settings.replay.tick_interval(), Duration::from_millis(100));
        assert_eq!(settings.log_level, "info");
    }

    #[test]
    fn test_env_overrides_yaml() {
        let vars: HashMap<&str, &str> = [("API_URL", "http://env.test"), ("REPLAY_TICK_MS", "200")]
            .into_iter()
            .collect();
        let settings = Settings::default()
            .apply_env(|key| vars.get(key).map(|v| v.to_string()))
            .expect("apply env");
        assert_eq!(settings.api.base_url, "http://env.test");
        assert_eq!(settings.replay.tick_interval_ms, 200);
    }

    #[test]
    fn test_zero_tick_rejected() {
        let err = Settings::load_from_yaml_str("replay:\n  tick_interval_ms: 0\n").unwrap_err();
        assert!(matches!(err, ReplayError::Config(_)));
    }

    #[test]
    fn test_bad_tick_env_rejected() {
        let err = Settings::default()
            .apply_env(|key| (key == "REPLAY_TICK_MS").then(|| "fast".to_string()))
            .unwrap_err();
        assert!(err.to_string().contains("REPLAY_TICK_MS"));
    }
}
