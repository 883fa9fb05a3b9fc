//! Configuration system (layered: defaults < TOML file < environment).

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{GeneratorError, Result};

/// Default backend when nothing is configured.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";
/// Number of pages the advice search should scrape.
pub const DEFAULT_SEARCH_LIMIT: u32 = 5;
/// Number of ad images requested per run.
pub const DEFAULT_NUM_PROMPTS: u32 = 4;
/// Delay before a read form record is removed from the store.
pub const DEFAULT_CLEANUP_DELAY: Duration = Duration::from_secs(1);

const ENV_API_URL: &str = "PITCHCRAFT_API_URL";
const ENV_TIMEOUT_SECS: &str = "PITCHCRAFT_TIMEOUT_SECS";
const ENV_SEARCH_LIMIT: &str = "PITCHCRAFT_SEARCH_LIMIT";

/// Runtime configuration shared by the backend and the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorConfig {
    /// Base URL for all three endpoints, without a trailing slash.
    pub api_base_url: String,
    /// Per-request limit. `None` waits indefinitely.
    pub request_timeout: Option<Duration>,
    pub search_limit: u32,
    pub num_prompts: u32,
    pub cleanup_delay: Duration,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            request_timeout: None,
            search_limit: DEFAULT_SEARCH_LIMIT,
            num_prompts: DEFAULT_NUM_PROMPTS,
            cleanup_delay: DEFAULT_CLEANUP_DELAY,
        }
    }
}

/// On-disk shape. Every field is optional so a file can override just one.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    api_base_url: Option<String>,
    timeout_secs: Option<u64>,
    search_limit: Option<u32>,
    num_prompts: Option<u32>,
    cleanup_delay_ms: Option<u64>,
}

impl GeneratorConfig {
    /// Point at a specific backend, keeping other defaults.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: base_url.into(),
            ..Self::default()
        }
        .normalized()
    }

    /// Defaults overridden by environment variables (`.env` is loaded first).
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv(); // load .env if present, ignore error
        Self::default().merge_env(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by a TOML file, then by the environment.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let _ = dotenvy::dotenv();
        let raw = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&raw)?.merge_env(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by a TOML document.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let file: ConfigFile = toml::from_str(raw)
            .map_err(|e| GeneratorError::Configuration(format!("invalid config file: {e}")))?;

        let mut config = Self::default();
        if let Some(url) = file.api_base_url {
            config.api_base_url = url;
        }
        if let Some(secs) = file.timeout_secs {
            config.request_timeout = timeout_from_secs(secs);
        }
        if let Some(limit) = file.search_limit {
            config.search_limit = limit;
        }
        if let Some(n) = file.num_prompts {
            config.num_prompts = n;
        }
        if let Some(ms) = file.cleanup_delay_ms {
            config.cleanup_delay = Duration::from_millis(ms);
        }
        config.normalized().validated()
    }

    /// Apply environment overrides through `lookup`, so tests need not touch
    /// the process environment.
    pub fn merge_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(url) = lookup(ENV_API_URL) {
            self.api_base_url = url;
        }
        if let Some(raw) = lookup(ENV_TIMEOUT_SECS) {
            let secs: u64 = raw.trim().parse().map_err(|_| {
                GeneratorError::Configuration(format!("{ENV_TIMEOUT_SECS} must be a number of seconds, got '{raw}'"))
            })?;
            self.request_timeout = timeout_from_secs(secs);
        }
        if let Some(raw) = lookup(ENV_SEARCH_LIMIT) {
            self.search_limit = raw.trim().parse().map_err(|_| {
                GeneratorError::Configuration(format!("{ENV_SEARCH_LIMIT} must be a positive integer, got '{raw}'"))
            })?;
        }
        self.normalized().validated()
    }

    fn normalized(mut self) -> Self {
        self.api_base_url = self.api_base_url.trim().trim_end_matches('/').to_string();
        self
    }

    fn validated(self) -> Result<Self> {
        if self.api_base_url.is_empty() {
            return Err(GeneratorError::Configuration(
                "API base URL must not be empty".into(),
            ));
        }
        if !(self.api_base_url.starts_with("http://") || self.api_base_url.starts_with("https://")) {
            return Err(GeneratorError::Configuration(format!(
                "API base URL must start with http:// or https://, got '{}'",
                self.api_base_url
            )));
        }
        if self.search_limit == 0 {
            return Err(GeneratorError::Configuration(
                "search limit must be at least 1".into(),
            ));
        }
        Ok(self)
    }
}

/// Zero seconds means "no timeout".
fn timeout_from_secs(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_have_no_timeout() {
        let config = GeneratorConfig::default();
        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
        assert_eq!(config.request_timeout, None);
        assert_eq!(config.search_limit, 5);
        assert_eq!(config.num_prompts, 4);
    }

    #[test]
    fn env_overrides_defaults() {
        let config = GeneratorConfig::default()
            .merge_env(env(&[
                ("PITCHCRAFT_API_URL", "https://api.example.test/"),
                ("PITCHCRAFT_TIMEOUT_SECS", "30"),
                ("PITCHCRAFT_SEARCH_LIMIT", "8"),
            ]))
            .unwrap();
        assert_eq!(config.api_base_url, "https://api.example.test");
        assert_eq!(config.request_timeout, Some(Duration::from_secs(30)));
        assert_eq!(config.search_limit, 8);
    }

    #[test]
    fn zero_timeout_disables_it() {
        let config = GeneratorConfig::default()
            .merge_env(env(&[("PITCHCRAFT_TIMEOUT_SECS", "0")]))
            .unwrap();
        assert_eq!(config.request_timeout, None);
    }

    #[test]
    fn bad_env_values_are_configuration_errors() {
        let err = GeneratorConfig::default()
            .merge_env(env(&[("PITCHCRAFT_TIMEOUT_SECS", "soon")]))
            .unwrap_err();
        assert!(matches!(err, GeneratorError::Configuration(_)));

        let err = GeneratorConfig::default()
            .merge_env(env(&[("PITCHCRAFT_API_URL", "   ")]))
            .unwrap_err();
        assert!(err.to_string().contains("must not be empty"));
    }

    #[test]
    fn toml_file_overrides_selected_fields() {
        let config = GeneratorConfig::from_toml_str(
            r#"
            api_base_url = "https://marketing.example.test"
            timeout_secs = 90
            cleanup_delay_ms = 250
            "#,
        )
        .unwrap();
        assert_eq!(config.api_base_url, "https://marketing.example.test");
        assert_eq!(config.request_timeout, Some(Duration::from_secs(90)));
        assert_eq!(config.cleanup_delay, Duration::from_millis(250));
        assert_eq!(config.num_prompts, DEFAULT_NUM_PROMPTS);
    }

    #[test]
    fn toml_rejects_unknown_keys() {
        let err = GeneratorConfig::from_toml_str("base = \"x\"").unwrap_err();
        assert!(matches!(err, GeneratorError::Configuration(_)));
    }

    #[test]
    fn load_reads_file_from_disk() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("pitchcraft.toml");
        std::fs::write(&path, "num_prompts = 2\n").unwrap();

        let config = GeneratorConfig::load(&path).unwrap();
        assert_eq!(config.num_prompts, 2);
    }
}
