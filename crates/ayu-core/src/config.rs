//! Configuration module
//!
//! Endpoint location, per-category file limits and feedback timings, read from
//! the environment (optionally seeded from a `.env` file).

use std::env;
use std::time::Duration;

use crate::constants::{
    DEFAULT_API_URL, DEFAULT_MAX_FILES, DEFAULT_MAX_FILE_SIZE_BYTES, DEFAULT_SUBMIT_PATH,
    RESET_DELAY, SUCCESS_CLEAR_DELAY,
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IntakeConfig {
    pub api_url: String,
    pub submit_path: String,
    pub max_files: usize,
    pub max_file_size_bytes: u64,
    /// Client-side request timeout. `None` waits for the transport to resolve.
    pub request_timeout: Option<Duration>,
    /// Delay between a successful submission and the form reset.
    pub reset_delay: Duration,
    /// Lifetime of an untouched success notice.
    pub success_clear_delay: Duration,
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            submit_path: DEFAULT_SUBMIT_PATH.to_string(),
            max_files: DEFAULT_MAX_FILES,
            max_file_size_bytes: DEFAULT_MAX_FILE_SIZE_BYTES,
            request_timeout: None,
            reset_delay: RESET_DELAY,
            success_clear_delay: SUCCESS_CLEAR_DELAY,
        }
    }
}

impl IntakeConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let defaults = Self::default();
        let config = Self {
            api_url: env::var("AYU_API_URL")
                .ok()
                .filter(|s| !s.is_empty())
                .unwrap_or(defaults.api_url),
            submit_path: env::var("AYU_SUBMIT_PATH")
                .ok()
                .filter(|s| !s.is_empty())
                .unwrap_or(defaults.submit_path),
            max_files: parse_var("AYU_MAX_FILES")?.unwrap_or(defaults.max_files),
            max_file_size_bytes: parse_var("AYU_MAX_FILE_SIZE_BYTES")?
                .unwrap_or(defaults.max_file_size_bytes),
            request_timeout: parse_var::<u64>("AYU_REQUEST_TIMEOUT_SECS")?
                .filter(|&secs| secs > 0)
                .map(Duration::from_secs),
            reset_delay: parse_var("AYU_RESET_DELAY_MS")?
                .map(Duration::from_millis)
                .unwrap_or(defaults.reset_delay),
            success_clear_delay: parse_var("AYU_SUCCESS_CLEAR_MS")?
                .map(Duration::from_millis)
                .unwrap_or(defaults.success_clear_delay),
        };

        config.validate()?;
        tracing::debug!(
            api_url = %config.api_url,
            submit_path = %config.submit_path,
            max_files = config.max_files,
            max_file_size_bytes = config.max_file_size_bytes,
            "Loaded intake configuration"
        );
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if !(self.api_url.starts_with("http://") || self.api_url.starts_with("https://")) {
            return Err(anyhow::anyhow!(
                "AYU_API_URL must be an http:// or https:// URL"
            ));
        }

        if !self.submit_path.starts_with('/') {
            return Err(anyhow::anyhow!("AYU_SUBMIT_PATH must start with '/'"));
        }

        if self.max_files == 0 {
            return Err(anyhow::anyhow!("AYU_MAX_FILES must be greater than 0"));
        }

        if self.max_file_size_bytes == 0 {
            return Err(anyhow::anyhow!(
                "AYU_MAX_FILE_SIZE_BYTES must be greater than 0"
            ));
        }

        Ok(())
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Result<Option<T>, anyhow::Error> {
    match env::var(name) {
        Ok(raw) if raw.trim().is_empty() => Ok(None),
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| anyhow::anyhow!("{} has an invalid value: {}", name, raw)),
        Err(_) => Ok(None),
    }
}
