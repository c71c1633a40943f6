use dotenv::dotenv;
use std::env;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

use crate::errors::AppError;

pub const DEFAULT_CREDENTIALS_PATH: &str = ".intellidesk/credentials.json";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq)]
pub struct PortalConfig {
    pub api_url: Url,
    pub credentials_path: PathBuf,
    pub request_timeout: Duration,
    pub max_results: Option<u32>,
}

impl PortalConfig {
    pub fn new(api_url: Url) -> Self {
        PortalConfig {
            api_url,
            credentials_path: PathBuf::from(DEFAULT_CREDENTIALS_PATH),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_results: None,
        }
    }

    /// Reads `INTELLIDESK_*` variables, loading a `.env` file first if present.
    pub fn from_env() -> Result<Self, AppError> {
        dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw_url = lookup("INTELLIDESK_API_URL")
            .filter(|value| !value.trim().is_empty())
            .ok_or_else(|| AppError::Config("INTELLIDESK_API_URL must be set".to_string()))?;
        let api_url = Url::parse(raw_url.trim())
            .map_err(|err| AppError::Config(format!("INTELLIDESK_API_URL: {}", err)))?;

        let mut config = PortalConfig::new(api_url);

        if let Some(path) = lookup("INTELLIDESK_CREDENTIALS_PATH").filter(|v| !v.trim().is_empty()) {
            config.credentials_path = PathBuf::from(path);
        }
        if let Some(secs) = lookup("INTELLIDESK_REQUEST_TIMEOUT_SECS") {
            let secs: u64 = secs.trim().parse().map_err(|_| {
                AppError::Config(format!("INTELLIDESK_REQUEST_TIMEOUT_SECS is not a number: {}", secs))
            })?;
            if secs == 0 {
                return Err(AppError::Config(
                    "INTELLIDESK_REQUEST_TIMEOUT_SECS cannot be zero".to_string(),
                ));
            }
            config.request_timeout = Duration::from_secs(secs);
        }
        if let Some(max) = lookup("INTELLIDESK_MAX_RESULTS") {
            let max: u32 = max.trim().parse().map_err(|_| {
                AppError::Config(format!("INTELLIDESK_MAX_RESULTS is not a number: {}", max))
            })?;
            config.max_results = Some(max);
        }

        Ok(config)
    }
}

/// Starts `env_logger` honoring `RUST_LOG`. Safe to call more than once.
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).try_init();
}
