//! Client configuration.
//!
//! The base URL and timeout are passed to `Transport` explicitly; nothing is
//! kept in a process-wide client.

use std::time::Duration;

use crate::error::ConfigError;

/// Timeout applied to every request unless overridden at construction.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

pub const BASE_URL_VAR: &str = "ALIST_BASE_URL";
pub const TIMEOUT_VAR: &str = "ALIST_TIMEOUT_SECS";

/// Fixed configuration for one `Transport`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl ClientConfig {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Read `ALIST_BASE_URL` and the optional `ALIST_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let base_url = lookup(BASE_URL_VAR)
            .filter(|url| !url.trim().is_empty())
            .ok_or(ConfigError::Missing(BASE_URL_VAR))?;
        let config = Self::new(base_url.trim());

        match lookup(TIMEOUT_VAR) {
            None => Ok(config),
            Some(raw) => {
                let secs = raw
                    .trim()
                    .parse::<u64>()
                    .ok()
                    .filter(|secs| *secs > 0)
                    .ok_or(ConfigError::Invalid {
                        name: TIMEOUT_VAR,
                        value: raw.clone(),
                    })?;
                Ok(config.with_timeout(Duration::from_secs(secs)))
            }
        }
    }

    /// Join the base URL with an endpoint path such as `/api/me`.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn trailing_slash_is_stripped() {
        let config = ClientConfig::new("http://localhost:5244/");
        assert_eq!(config.url("/api/me"), "http://localhost:5244/api/me");
        assert_eq!(config.timeout, DEFAULT_TIMEOUT);
    }

    #[test]
    fn from_env_reads_base_url_and_timeout() {
        let config = ClientConfig::from_lookup(lookup(&[
            (BASE_URL_VAR, "https://files.example.com/"),
            (TIMEOUT_VAR, "5"),
        ]))
        .unwrap();
        assert_eq!(config.base_url, "https://files.example.com");
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn from_env_requires_base_url() {
        let err = ClientConfig::from_lookup(lookup(&[])).unwrap_err();
        assert_eq!(err, ConfigError::Missing(BASE_URL_VAR));
    }

    #[test]
    fn from_env_rejects_bad_timeout() {
        let err = ClientConfig::from_lookup(lookup(&[
            (BASE_URL_VAR, "http://localhost"),
            (TIMEOUT_VAR, "soon"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: TIMEOUT_VAR, .. }));
    }
}
