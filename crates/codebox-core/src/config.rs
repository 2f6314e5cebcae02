//! Client configuration.
//!
//! Configuration is loaded from environment variables (optionally backed by a
//! `.env` file) with sensible defaults, or assembled explicitly through
//! [`CodeBoxConfig::builder`].

use crate::error::ConfigError;
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

/// Default remote API root.
pub const DEFAULT_BASE_URL: &str = "https://codeboxapi.com/api/v1";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

/// Configuration for a [`CodeBox`](crate::CodeBox) session client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeBoxConfig {
    /// Remote API root, e.g. `https://codeboxapi.com/api/v1`.
    pub base_url: String,
    /// Bearer credential sent with every request.
    pub api_key: Option<String>,
    /// Per-request timeout (default: 20s).
    pub timeout: Duration,
    /// Enable diagnostic logging.
    pub verbose: bool,
    /// Enable informational logging.
    pub show_info: bool,
}

impl Default for CodeBoxConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            timeout: DEFAULT_TIMEOUT,
            verbose: false,
            show_info: false,
        }
    }
}

impl CodeBoxConfig {
    /// Create a new config builder.
    pub fn builder() -> CodeBoxConfigBuilder {
        CodeBoxConfigBuilder::default()
    }

    /// Load configuration from environment variables.
    ///
    /// | Variable | Default |
    /// |----------|---------|
    /// | `CODEBOX_BASE_URL` | `https://codeboxapi.com/api/v1` |
    /// | `CODEBOX_API_KEY` | none |
    /// | `CODEBOX_TIMEOUT` | `20` (seconds) |
    /// | `VERBOSE` | `false` |
    /// | `SHOW_INFO` | `false` |
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from the environment, falling back to a `.env` file.
    ///
    /// Variables already set in the process environment win over the file.
    /// A missing file is not an error; an unreadable or malformed one is.
    pub fn from_env_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let file_vars: HashMap<String, String> = match dotenvy::from_path_iter(path) {
            Ok(iter) => {
                let vars: HashMap<String, String> = iter
                    .collect::<Result<_, _>>()
                    .map_err(|e| env_file_error(path, e))?;
                tracing::debug!(path = %path.display(), vars = vars.len(), "Env file loaded");
                vars
            }
            Err(e) if e.not_found() => {
                tracing::debug!(path = %path.display(), "No env file found");
                HashMap::new()
            }
            Err(e) => return Err(env_file_error(path, e)),
        };

        Ok(Self::from_lookup(|key| {
            std::env::var(key)
                .ok()
                .or_else(|| file_vars.get(key).cloned())
        }))
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let default = Self::default();

        Self {
            base_url: lookup("CODEBOX_BASE_URL")
                .filter(|v| !v.is_empty())
                .unwrap_or(default.base_url),
            api_key: lookup("CODEBOX_API_KEY").filter(|v| !v.is_empty()),
            timeout: lookup("CODEBOX_TIMEOUT")
                .and_then(|v| v.trim().parse::<u64>().ok())
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs)
                .unwrap_or(default.timeout),
            verbose: lookup("VERBOSE").map(|v| v == "true").unwrap_or(false),
            show_info: lookup("SHOW_INFO").map(|v| v == "true").unwrap_or(false),
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_url.trim().is_empty() {
            return Err(ConfigError::EmptyBaseUrl);
        }
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ConfigError::InvalidBaseUrl(self.base_url.clone()));
        }
        if self.timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(())
    }

    /// Log warnings for settings that are valid but likely to fail remotely.
    pub fn validate_warn(&self) {
        if self.api_key.is_none() {
            tracing::warn!("CODEBOX_API_KEY not set, requests will be unauthenticated");
        }
    }

    /// Default tracing filter level implied by the verbosity flags.
    pub fn log_directive(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else if self.show_info {
            "info"
        } else {
            "warn"
        }
    }
}

fn env_file_error(path: &Path, err: dotenvy::Error) -> ConfigError {
    ConfigError::EnvFile {
        path: path.to_path_buf(),
        message: err.to_string(),
    }
}

/// Builder for CodeBoxConfig.
#[derive(Debug, Default)]
pub struct CodeBoxConfigBuilder {
    config: CodeBoxConfig,
}

impl CodeBoxConfigBuilder {
    /// Set the remote API root.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into();
        self
    }

    /// Set the bearer credential.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = Some(key.into());
        self
    }

    /// Set the per-request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.config.verbose = verbose;
        self
    }

    pub fn show_info(mut self, show_info: bool) -> Self {
        self.config.show_info = show_info;
        self
    }

    /// Build the configuration, validating all fields.
    pub fn build(self) -> Result<CodeBoxConfig, ConfigError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_config_defaults() {
        let config = CodeBoxConfig::default();
        assert_eq!(config.base_url, "https://codeboxapi.com/api/v1");
        assert_eq!(config.timeout, Duration::from_secs(20));
        assert!(config.api_key.is_none());
        assert!(!config.verbose);
        assert!(!config.show_info);
    }

    #[test]
    fn test_from_lookup_uses_defaults() {
        let config = CodeBoxConfig::from_lookup(lookup(&[]));
        assert_eq!(config, CodeBoxConfig::default());
    }

    #[test]
    fn test_from_lookup_reads_variables() {
        let config = CodeBoxConfig::from_lookup(lookup(&[
            ("CODEBOX_BASE_URL", "http://localhost:8080/api/v1"),
            ("CODEBOX_API_KEY", "sk-test"),
            ("CODEBOX_TIMEOUT", "5"),
            ("VERBOSE", "true"),
            ("SHOW_INFO", "yes"),
        ]));
        assert_eq!(config.base_url, "http://localhost:8080/api/v1");
        assert_eq!(config.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert!(config.verbose);
        // only the literal "true" enables a flag
        assert!(!config.show_info);
    }

    #[test]
    fn test_from_lookup_bad_timeout_falls_back() {
        let config = CodeBoxConfig::from_lookup(lookup(&[("CODEBOX_TIMEOUT", "soon")]));
        assert_eq!(config.timeout, DEFAULT_TIMEOUT);

        let config = CodeBoxConfig::from_lookup(lookup(&[("CODEBOX_TIMEOUT", "0")]));
        assert_eq!(config.timeout, DEFAULT_TIMEOUT);
    }

    #[test]
    fn test_from_env_file_reads_dotenv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        std::fs::write(
            &path,
            "# local settings\nCODEBOX_BASE_URL=http://127.0.0.1:7000/api/v1\nCODEBOX_TIMEOUT=7\n",
        )
        .unwrap();

        let config = CodeBoxConfig::from_env_file(&path).unwrap();
        assert_eq!(config.base_url, "http://127.0.0.1:7000/api/v1");
        assert_eq!(config.timeout, Duration::from_secs(7));
    }

    #[test]
    fn test_from_env_file_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = CodeBoxConfig::from_env_file(dir.path().join(".env")).unwrap();
        assert_eq!(config.timeout, DEFAULT_TIMEOUT);
    }

    #[test]
    fn test_from_env_file_rejects_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        std::fs::write(&path, "NOT VALID\n").unwrap();
        assert!(matches!(
            CodeBoxConfig::from_env_file(&path),
            Err(ConfigError::EnvFile { .. })
        ));
    }

    #[test]
    fn test_builder_validation() {
        assert!(matches!(
            CodeBoxConfig::builder().base_url("").build(),
            Err(ConfigError::EmptyBaseUrl)
        ));
        assert!(matches!(
            CodeBoxConfig::builder().base_url("ftp://example.com").build(),
            Err(ConfigError::InvalidBaseUrl(_))
        ));
        assert!(matches!(
            CodeBoxConfig::builder().timeout(Duration::ZERO).build(),
            Err(ConfigError::ZeroTimeout)
        ));
    }

    #[test]
    fn test_builder_success() {
        let config = CodeBoxConfig::builder()
            .base_url("http://127.0.0.1:9000")
            .api_key("secret")
            .timeout(Duration::from_secs(60))
            .verbose(true)
            .build()
            .expect("should build successfully");

        assert_eq!(config.base_url, "http://127.0.0.1:9000");
        assert_eq!(config.api_key.as_deref(), Some("secret"));
        assert_eq!(config.timeout, Duration::from_secs(60));
        assert_eq!(config.log_directive(), "debug");
    }

    #[test]
    fn test_log_directive() {
        let mut config = CodeBoxConfig::default();
        assert_eq!(config.log_directive(), "warn");
        config.show_info = true;
        assert_eq!(config.log_directive(), "info");
        config.verbose = true;
        assert_eq!(config.log_directive(), "debug");
    }
}
