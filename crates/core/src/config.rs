//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into core services, so
//! nothing reads process-wide environment variables while a workflow is running.

use crate::constants::{DEFAULT_DATA_DIR, DEFAULT_SIMULATED_LATENCY_MS, LOCAL_STORAGE_FILENAME};
use crate::error::ConfigError;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    data_dir: PathBuf,
    simulated_latency: Duration,
    api_base_url: Option<String>,
    api_token: Option<String>,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Empty`] if `data_dir` is empty.
    pub fn new(data_dir: PathBuf, simulated_latency: Duration) -> Result<Self, ConfigError> {
        if data_dir.as_os_str().is_empty() {
            return Err(ConfigError::Empty("data_dir"));
        }

        Ok(Self {
            data_dir,
            simulated_latency,
            api_base_url: None,
            api_token: None,
        })
    }

    /// Point HTTP-backed services at `base_url` instead of the in-process simulation.
    pub fn with_api_base_url(mut self, base_url: Option<String>) -> Self {
        self.api_base_url = base_url
            .map(|u| u.trim().trim_end_matches('/').to_string())
            .filter(|u| !u.is_empty());
        self
    }

    pub fn with_api_token(mut self, token: Option<String>) -> Self {
        self.api_token = token.filter(|t| !t.trim().is_empty());
        self
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn local_storage_path(&self) -> PathBuf {
        self.data_dir.join(LOCAL_STORAGE_FILENAME)
    }

    pub fn simulated_latency(&self) -> Duration {
        self.simulated_latency
    }

    pub fn api_base_url(&self) -> Option<&str> {
        self.api_base_url.as_deref()
    }

    pub fn api_token(&self) -> Option<&str> {
        self.api_token.as_deref()
    }
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            simulated_latency: Duration::from_millis(DEFAULT_SIMULATED_LATENCY_MS),
            api_base_url: None,
            api_token: None,
        }
    }
}

/// Resolve the data directory from an optional environment value.
pub fn data_dir_from_env_value(value: Option<String>) -> PathBuf {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR))
}

/// Parse the simulated latency (milliseconds) from an optional environment value.
///
/// If `value` is `None` or empty/whitespace, returns the default latency.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidValue`] if `value` is not a whole number of milliseconds.
pub fn simulated_latency_from_env_value(value: Option<String>) -> Result<Duration, ConfigError> {
    let value = value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());

    match value {
        None => Ok(Duration::from_millis(DEFAULT_SIMULATED_LATENCY_MS)),
        Some(v) => v
            .parse::<u64>()
            .map(Duration::from_millis)
            .map_err(|_| ConfigError::InvalidValue {
                key: "CHORDS_SIMULATED_LATENCY_MS",
                value: v,
            }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latency_defaults_when_unset_or_blank() {
        let default = Duration::from_millis(DEFAULT_SIMULATED_LATENCY_MS);
        assert_eq!(simulated_latency_from_env_value(None).unwrap(), default);
        assert_eq!(
            simulated_latency_from_env_value(Some("  ".into())).unwrap(),
            default
        );
    }

    #[test]
    fn latency_rejects_non_numeric_values() {
        let err = simulated_latency_from_env_value(Some("fast".into())).unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidValue {
                key: "CHORDS_SIMULATED_LATENCY_MS",
                value: "fast".into()
            }
        );
    }

    #[test]
    fn base_url_is_normalised() {
        let cfg = CoreConfig::new(PathBuf::from("/tmp/chords"), Duration::ZERO)
            .unwrap()
            .with_api_base_url(Some(" http://localhost:3000/ ".into()))
            .with_api_token(Some(" ".into()));
        assert_eq!(cfg.api_base_url(), Some("http://localhost:3000"));
        assert_eq!(cfg.api_token(), None);
        assert_eq!(
            cfg.local_storage_path(),
            PathBuf::from("/tmp/chords/local_storage.json")
        );
    }

    #[test]
    fn empty_data_dir_is_rejected() {
        let err = CoreConfig::new(PathBuf::new(), Duration::ZERO).unwrap_err();
        assert_eq!(err, ConfigError::Empty("data_dir"));
    }
}
