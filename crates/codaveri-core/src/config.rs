//! Configuration for the execution backend connection
//!
//! The configuration is built once at startup, validated, and then handed to
//! [`crate::client::ExecutionClient`]. It can come from the environment alone
//! or from a YAML file with environment overrides applied on top.

use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::path::Path;
use std::time::Duration;
use tokio::fs;

use crate::errors::CodaveriError;

pub const ENV_BASE_URL: &str = "CODAVERI_API_BASE_URL";
pub const ENV_API_KEY: &str = "API_KEY";
pub const ENV_API_VERSION: &str = "CODAVERI_API_VERSION";
pub const ENV_POLL_INTERVAL_MS: &str = "CODAVERI_POLL_INTERVAL_MS";
pub const ENV_POLL_TIMEOUT_SECS: &str = "CODAVERI_POLL_TIMEOUT_SECS";
pub const ENV_MAX_POLL_ATTEMPTS: &str = "CODAVERI_MAX_POLL_ATTEMPTS";
pub const ENV_REQUEST_TIMEOUT_SECS: &str = "CODAVERI_REQUEST_TIMEOUT_SECS";

pub const DEFAULT_API_VERSION: &str = "2.1";

/// How the completion poller paces and bounds its status queries
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollPolicy {
    #[serde(default = "default_poll_interval_ms")]
    pub interval_ms: u64,
    /// Overall deadline for one job; 0 waits forever
    #[serde(default = "default_poll_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub max_attempts: Option<u32>,
}

impl PollPolicy {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }

    /// No deadline and no attempt cap
    pub fn unbounded(interval: Duration) -> Self {
        Self {
            interval_ms: interval.as_millis() as u64,
            timeout_secs: 0,
            max_attempts: None,
        }
    }
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval_ms: default_poll_interval_ms(),
            timeout_secs: default_poll_timeout_secs(),
            max_attempts: None,
        }
    }
}

fn default_poll_interval_ms() -> u64 {
    1000
}

fn default_poll_timeout_secs() -> u64 {
    300
}

fn default_api_version() -> String {
    DEFAULT_API_VERSION.to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

#[derive(Clone, Serialize, Deserialize)]
pub struct ExecutionConfig {
    #[serde(default)]
    pub base_url: String,
    #[serde(default)]
    pub api_key: String,
    /// Name of an environment variable holding the key, checked when
    /// `api_key` is empty
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key_env: Option<String>,
    #[serde(default = "default_api_version")]
    pub api_version: String,
    #[serde(default)]
    pub poll: PollPolicy,
    /// Per-request transport timeout; 0 disables it
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl ExecutionConfig {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            api_key_env: None,
            api_version: default_api_version(),
            poll: PollPolicy::default(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }

    pub fn with_poll_policy(mut self, poll: PollPolicy) -> Self {
        self.poll = poll;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll.interval_ms = interval.as_millis() as u64;
        self
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_secs > 0).then(|| Duration::from_secs(self.request_timeout_secs))
    }

    /// Base URL without a trailing slash
    pub fn base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    pub fn execute_url(&self) -> String {
        format!("{}/execute", self.base_url())
    }

    /// Build and validate the configuration from process environment
    /// variables only
    pub fn from_env() -> Result<Self, CodaveriError> {
        let mut config = Self::default();
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    pub fn apply_env_overrides(&mut self) -> Result<(), CodaveriError> {
        self.apply_overrides_from(|key| env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable lookup. Unset or empty
    /// variables leave the current value untouched.
    pub fn apply_overrides_from<F>(&mut self, lookup: F) -> Result<(), CodaveriError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(base_url) = get(ENV_BASE_URL) {
            self.base_url = base_url;
        }
        if let Some(api_key) = get(ENV_API_KEY) {
            self.api_key = api_key;
        }
        if self.api_key.is_empty() {
            if let Some(var) = self.api_key_env.as_deref() {
                if let Some(api_key) = get(var) {
                    self.api_key = api_key;
                }
            }
        }
        if let Some(version) = get(ENV_API_VERSION) {
            self.api_version = version;
        }
        if let Some(value) = get(ENV_POLL_INTERVAL_MS) {
            self.poll.interval_ms = parse_number(ENV_POLL_INTERVAL_MS, &value)?;
        }
        if let Some(value) = get(ENV_POLL_TIMEOUT_SECS) {
            self.poll.timeout_secs = parse_number(ENV_POLL_TIMEOUT_SECS, &value)?;
        }
        if let Some(value) = get(ENV_MAX_POLL_ATTEMPTS) {
            self.poll.max_attempts = Some(parse_number(ENV_MAX_POLL_ATTEMPTS, &value)?);
        }
        if let Some(value) = get(ENV_REQUEST_TIMEOUT_SECS) {
            self.request_timeout_secs = parse_number(ENV_REQUEST_TIMEOUT_SECS, &value)?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), CodaveriError> {
        if self.api_key.trim().is_empty() {
            return Err(CodaveriError::ConfigError(format!(
                "{} is not set",
                self.api_key_env.as_deref().unwrap_or(ENV_API_KEY)
            )));
        }
        if self.base_url().trim().is_empty() {
            return Err(CodaveriError::ConfigError(format!("{} is not set", ENV_BASE_URL)));
        }
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(CodaveriError::ConfigError(format!(
                "Base URL must start with http:// or https://, got '{}'",
                self.base_url
            )));
        }
        if self.poll.interval_ms == 0 {
            return Err(CodaveriError::ConfigError(
                "Poll interval must be greater than zero".to_string(),
            ));
        }
        if self.poll.max_attempts == Some(0) {
            return Err(CodaveriError::ConfigError(
                "max_attempts must be at least 1 when set".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self::new(String::new(), String::new())
    }
}

impl fmt::Debug for ExecutionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutionConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"***REDACTED***")
            .field("api_key_env", &self.api_key_env)
            .field("api_version", &self.api_version)
            .field("poll", &self.poll)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, CodaveriError> {
    value.trim().parse::<T>().map_err(|_| {
        CodaveriError::ConfigError(format!("{} must be a non-negative integer, got '{}'", key, value))
    })
}

/// Loads [`ExecutionConfig`] from YAML files.
///
/// Environment overrides are applied but the result is not validated, so
/// callers can layer command-line values on top first.
pub struct ConfigLoader;

impl ConfigLoader {
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<ExecutionConfig, CodaveriError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).await.map_err(|e| {
            CodaveriError::ConfigError(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;
        log::debug!("Loaded configuration file {}", path.display());
        Self::from_str(&content)
    }

    pub fn from_str(content: &str) -> Result<ExecutionConfig, CodaveriError> {
        let mut config: ExecutionConfig = serde_yaml::from_str(content)
            .map_err(|e| CodaveriError::ConfigError(format!("Failed to parse YAML: {}", e)))?;
        config.apply_env_overrides()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::collections::HashMap;
    use std::io::Write;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    fn clear_env() {
        for key in [
            ENV_BASE_URL,
            ENV_API_KEY,
            ENV_API_VERSION,
            ENV_POLL_INTERVAL_MS,
            ENV_POLL_TIMEOUT_SECS,
            ENV_MAX_POLL_ATTEMPTS,
            ENV_REQUEST_TIMEOUT_SECS,
            "CODAVERI_TEST_KEY",
        ] {
            env::remove_var(key);
        }
    }

    #[test]
    fn test_defaults() {
        let config = ExecutionConfig::new("https://api.example.com/", "secret");
        assert_eq!(config.api_version, "2.1");
        assert_eq!(config.poll.interval(), Duration::from_secs(1));
        assert_eq!(config.poll.timeout(), Some(Duration::from_secs(300)));
        assert_eq!(config.poll.max_attempts, None);
        assert_eq!(config.request_timeout(), Some(Duration::from_secs(30)));
        assert_eq!(config.execute_url(), "https://api.example.com/execute");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_overrides_from_lookup() {
        let mut config = ExecutionConfig::new("", "");
        config
            .apply_overrides_from(lookup(&[
                (ENV_BASE_URL, "http://localhost:9000"),
                (ENV_API_KEY, "k-123"),
                (ENV_POLL_INTERVAL_MS, "250"),
                (ENV_POLL_TIMEOUT_SECS, "0"),
                (ENV_MAX_POLL_ATTEMPTS, "12"),
                (ENV_REQUEST_TIMEOUT_SECS, "0"),
            ]))
            .unwrap();

        assert_eq!(config.base_url(), "http://localhost:9000");
        assert_eq!(config.api_key, "k-123");
        assert_eq!(config.poll.interval(), Duration::from_millis(250));
        assert_eq!(config.poll.timeout(), None);
        assert_eq!(config.poll.max_attempts, Some(12));
        assert_eq!(config.request_timeout(), None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_request_timeout_in_whole_seconds() {
        let mut config = ExecutionConfig::new("http://localhost", "k");
        config
            .apply_overrides_from(lookup(&[(ENV_REQUEST_TIMEOUT_SECS, "1")]))
            .unwrap();
        assert_eq!(config.request_timeout(), Some(Duration::from_secs(1)));

        let result = config.apply_overrides_from(lookup(&[(ENV_REQUEST_TIMEOUT_SECS, "0.5")]));
        assert!(matches!(result, Err(CodaveriError::ConfigError(_))));
        assert_eq!(config.request_timeout(), Some(Duration::from_secs(1)));
    }

    #[test]
    fn test_invalid_number_is_config_error() {
        let mut config = ExecutionConfig::new("http://localhost", "k");
        let result = config.apply_overrides_from(lookup(&[(ENV_POLL_INTERVAL_MS, "soon")]));
        assert!(matches!(result, Err(CodaveriError::ConfigError(m)) if m.contains(ENV_POLL_INTERVAL_MS)));
    }

    #[test]
    fn test_missing_credential_is_fatal() {
        let config = ExecutionConfig::new("http://localhost", "");
        match config.validate() {
            Err(CodaveriError::ConfigError(message)) => assert!(message.contains("API_KEY")),
            other => panic!("expected ConfigError, got {:?}", other),
        }
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        assert!(ExecutionConfig::new("", "k").validate().is_err());
        assert!(ExecutionConfig::new("localhost:8080", "k").validate().is_err());
        assert!(ExecutionConfig::new("http://localhost", "k")
            .with_poll_interval(Duration::ZERO)
            .validate()
            .is_err());

        let mut capped = ExecutionConfig::new("http://localhost", "k");
        capped.poll.max_attempts = Some(0);
        assert!(capped.validate().is_err());
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let config = ExecutionConfig::new("http://localhost", "super-secret-key");
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("super-secret-key"));
        assert!(rendered.contains("REDACTED"));
    }

    #[test]
    #[serial]
    fn test_from_env() {
        clear_env();
        env::set_var(ENV_BASE_URL, "https://codaveri.example.com");
        env::set_var(ENV_API_KEY, "env-key");

        let config = ExecutionConfig::from_env().unwrap();
        assert_eq!(config.base_url(), "https://codaveri.example.com");
        assert_eq!(config.api_key, "env-key");

        env::remove_var(ENV_API_KEY);
        assert!(matches!(
            ExecutionConfig::from_env(),
            Err(CodaveriError::ConfigError(_))
        ));
        clear_env();
    }

    #[tokio::test]
    #[serial]
    async fn test_load_yaml_with_api_key_env() {
        clear_env();
        env::set_var("CODAVERI_TEST_KEY", "from-named-var");

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
base_url: "http://127.0.0.1:8080/"
api_key_env: CODAVERI_TEST_KEY
poll:
  interval_ms: 50
  max_attempts: 5
request_timeout_secs: 10
"#
        )
        .unwrap();

        let config = ConfigLoader::from_file(file.path()).await.unwrap();
        assert_eq!(config.execute_url(), "http://127.0.0.1:8080/execute");
        assert_eq!(config.api_key, "from-named-var");
        assert_eq!(config.api_version, "2.1");
        assert_eq!(config.poll.interval(), Duration::from_millis(50));
        assert_eq!(config.poll.timeout(), Some(Duration::from_secs(300)));
        assert_eq!(config.poll.max_attempts, Some(5));
        assert_eq!(config.request_timeout(), Some(Duration::from_secs(10)));
        clear_env();
    }

    #[tokio::test]
    #[serial]
    async fn test_env_overrides_yaml() {
        clear_env();
        env::set_var(ENV_BASE_URL, "https://override.example.com");

        let config = ConfigLoader::from_str(
            "base_url: http://file.example.com\napi_key: file-key\napi_version: \"2.2\"\n",
        )
        .unwrap();
        assert_eq!(config.base_url(), "https://override.example.com");
        assert_eq!(config.api_key, "file-key");
        assert_eq!(config.api_version, "2.2");
        clear_env();
    }

    #[tokio::test]
    #[serial]
    async fn test_yaml_without_key_fails_validation() {
        clear_env();
        let config = ConfigLoader::from_str("base_url: http://file.example.com\n").unwrap();
        assert!(config.api_key.is_empty());
        assert!(matches!(config.validate(), Err(CodaveriError::ConfigError(_))));
    }

    #[tokio::test]
    async fn test_missing_file() {
        let result = ConfigLoader::from_file("/nonexistent/codaveri.yaml").await;
        assert!(matches!(result, Err(CodaveriError::ConfigError(m)) if m.contains("Failed to read")));
    }
}
