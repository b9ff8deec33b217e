//! Grader configuration
//!
//! Defines the configurable parameters of the grading pipeline: judge
//! connection, polling budget, resource limits and the Firestore project.

use anyhow::Context;
use brainbox_core::domain::judge::{DEFAULT_MEMORY_LIMIT_KB, DEFAULT_TIME_LIMIT_SECONDS};
use std::time::Duration;

use crate::scheduler::PollPolicy;
use crate::scheduler::poller::{DEFAULT_FETCH_TIMEOUT, DEFAULT_INTERVAL, DEFAULT_MAX_ATTEMPTS};
use crate::service::Limits;

/// Grader configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Judge submissions endpoint
    pub judge_url: String,

    /// Judge API secret; judge calls fail with a configuration error without it
    pub client_secret: Option<String>,

    /// Delay between status polls
    pub poll_interval: Duration,

    /// Status polls before giving up
    pub max_poll_attempts: u32,

    /// Time limit on a single status poll
    pub status_timeout: Duration,

    /// CPU time limit per run, in seconds
    pub time_limit_seconds: u32,

    /// Memory limit per run, in kilobytes
    pub memory_limit_kb: u32,

    /// Firestore project; required by every command that reads problems
    pub firestore_project_id: Option<String>,

    /// Firebase web API key
    pub firestore_api_key: Option<String>,

    /// Firebase ID token of the signed-in user
    pub firestore_id_token: Option<String>,
}

impl Config {
    /// Creates a new configuration with defaults
    pub fn new(judge_url: String, client_secret: Option<String>) -> Self {
        Self {
            judge_url,
            client_secret,
            poll_interval: DEFAULT_INTERVAL,
            max_poll_attempts: DEFAULT_MAX_ATTEMPTS,
            status_timeout: DEFAULT_FETCH_TIMEOUT,
            time_limit_seconds: DEFAULT_TIME_LIMIT_SECONDS,
            memory_limit_kb: DEFAULT_MEMORY_LIMIT_KB,
            firestore_project_id: None,
            firestore_api_key: None,
            firestore_id_token: None,
        }
    }

    /// Creates configuration from environment variables
    ///
    /// Expected environment variables:
    /// - HACKEREARTH_CLIENT_SECRET (needed for judge calls)
    /// - JUDGE_URL (optional, default: HackerEarth v4 submissions endpoint)
    /// - POLL_INTERVAL_MS (optional, default: 2000)
    /// - MAX_POLL_ATTEMPTS (optional, default: 15)
    /// - STATUS_TIMEOUT_MS (optional, default: 10000)
    /// - TIME_LIMIT_SECONDS (optional, default: 5)
    /// - MEMORY_LIMIT_KB (optional, default: 262144)
    /// - FIRESTORE_PROJECT_ID, FIRESTORE_API_KEY, FIRESTORE_ID_TOKEN (optional)
    ///
    /// Numeric variables that are set but unparsable are rejected rather
    /// than silently replaced by the default.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let judge_url =
            non_empty("JUDGE_URL").unwrap_or_else(|| brainbox_judge::DEFAULT_ENDPOINT.to_string());
        let mut config = Self::new(judge_url, non_empty("HACKEREARTH_CLIENT_SECRET"));

        if let Some(ms) = non_empty("POLL_INTERVAL_MS") {
            let ms: u64 = ms.trim().parse().context("POLL_INTERVAL_MS must be an integer")?;
            config.poll_interval = Duration::from_millis(ms);
        }

        if let Some(attempts) = non_empty("MAX_POLL_ATTEMPTS") {
            config.max_poll_attempts = attempts
                .trim()
                .parse()
                .context("MAX_POLL_ATTEMPTS must be an integer")?;
        }

        if let Some(ms) = non_empty("STATUS_TIMEOUT_MS") {
            let ms: u64 = ms.trim().parse().context("STATUS_TIMEOUT_MS must be an integer")?;
            config.status_timeout = Duration::from_millis(ms);
        }

        if let Some(seconds) = non_empty("TIME_LIMIT_SECONDS") {
            config.time_limit_seconds = seconds
                .trim()
                .parse()
                .context("TIME_LIMIT_SECONDS must be an integer")?;
        }

        if let Some(kb) = non_empty("MEMORY_LIMIT_KB") {
            config.memory_limit_kb = kb
                .trim()
                .parse()
                .context("MEMORY_LIMIT_KB must be an integer")?;
        }

        config.firestore_project_id = non_empty("FIRESTORE_PROJECT_ID");
        config.firestore_api_key = non_empty("FIRESTORE_API_KEY");
        config.firestore_id_token = non_empty("FIRESTORE_ID_TOKEN");

        Ok(config)
    }

    /// Polling budget derived from this configuration
    pub fn poll_policy(&self) -> PollPolicy {
        PollPolicy::new(self.max_poll_attempts, self.poll_interval)
            .with_fetch_timeout(self.status_timeout)
    }

    /// Resource limits derived from this configuration
    pub fn limits(&self) -> Limits {
        Limits {
            time_limit_seconds: self.time_limit_seconds,
            memory_limit_kb: self.memory_limit_kb,
        }
    }

    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.judge_url.is_empty() {
            anyhow::bail!("judge_url cannot be empty");
        }

        if !self.judge_url.starts_with("http://") && !self.judge_url.starts_with("https://") {
            anyhow::bail!("judge_url must start with http:// or https://");
        }

        if self.poll_interval.is_zero() {
            anyhow::bail!("poll_interval must be greater than 0");
        }

        if self.max_poll_attempts == 0 {
            anyhow::bail!("max_poll_attempts must be greater than 0");
        }

        if self.status_timeout.is_zero() {
            anyhow::bail!("status_timeout must be greater than 0");
        }

        if self.time_limit_seconds == 0 {
            anyhow::bail!("time_limit_seconds must be greater than 0");
        }

        if self.memory_limit_kb == 0 {
            anyhow::bail!("memory_limit_kb must be greater than 0");
        }

        if self.firestore_project_id.as_deref() == Some("") {
            anyhow::bail!("firestore_project_id cannot be empty");
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(brainbox_judge::DEFAULT_ENDPOINT.to_string(), None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.poll_interval, Duration::from_millis(2000));
        assert_eq!(config.max_poll_attempts, 15);
        assert_eq!(config.time_limit_seconds, 5);
        assert_eq!(config.memory_limit_kb, 262_144);
        assert!(config.client_secret.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();

        assert!(config.validate().is_ok());

        config.judge_url = "not-a-url".to_string();
        assert!(config.validate().is_err());

        config.judge_url = "http://localhost:9000".to_string();
        assert!(config.validate().is_ok());

        config.max_poll_attempts = 0;
        assert!(config.validate().is_err());

        config.max_poll_attempts = 3;
        config.poll_interval = Duration::ZERO;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_lookup_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("HACKEREARTH_CLIENT_SECRET", "s3cret"),
            ("POLL_INTERVAL_MS", "500"),
            ("MAX_POLL_ATTEMPTS", "4"),
            ("STATUS_TIMEOUT_MS", "3000"),
            ("FIRESTORE_PROJECT_ID", "brainbox"),
        ]))
        .unwrap();

        assert_eq!(config.client_secret.as_deref(), Some("s3cret"));
        assert_eq!(config.judge_url, brainbox_judge::DEFAULT_ENDPOINT);
        assert_eq!(
            config.poll_policy(),
            PollPolicy::new(4, Duration::from_millis(500))
                .with_fetch_timeout(Duration::from_secs(3))
        );
        assert_eq!(config.firestore_project_id.as_deref(), Some("brainbox"));
        assert!(config.firestore_api_key.is_none());
    }

    #[test]
    fn test_blank_secret_is_absent() {
        let config = Config::from_lookup(lookup(&[("HACKEREARTH_CLIENT_SECRET", "  ")])).unwrap();
        assert!(config.client_secret.is_none());
    }

    #[test]
    fn test_unparsable_number_rejected() {
        let err = Config::from_lookup(lookup(&[("MAX_POLL_ATTEMPTS", "many")])).unwrap_err();
        assert!(err.to_string().contains("MAX_POLL_ATTEMPTS"));
    }

    #[test]
    fn test_limits() {
        let mut config = Config::default();
        config.time_limit_seconds = 2;
        assert_eq!(
            config.limits(),
            Limits {
                time_limit_seconds: 2,
                memory_limit_kb: 262_144
            }
        );
    }
}
