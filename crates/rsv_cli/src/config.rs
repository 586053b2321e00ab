use std::time::Duration;

use tcmrsv::{ClientConfig, DEFAULT_BASE_URL, LoginParams};
use thiserror::Error;

/// Environment variable holding the portal login id
pub const USER_ID_VAR: &str = "USER_ID";
/// Environment variable holding the portal password
pub const USER_PW_VAR: &str = "USER_PW";
/// Optional override of the portal host
pub const BASE_URL_VAR: &str = "TCMRSV_BASE_URL";
/// Optional request timeout in seconds; `0` disables the timeout
pub const TIMEOUT_VAR: &str = "TCMRSV_TIMEOUT_SECS";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} environment variable not set")]
    Missing(&'static str),

    #[error("{var} must be a whole number of seconds, got '{value}'")]
    InvalidTimeout { var: &'static str, value: String },
}

/// Settings read from the environment (and `.env`)
#[derive(Debug, Clone)]
pub struct Config {
    pub user_id: Option<String>,
    pub password: Option<String>,
    pub client: ClientConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from any key lookup; blank values count as unset
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let mut client = ClientConfig {
            base_url: get(BASE_URL_VAR).unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            ..Default::default()
        };

        if let Some(value) = get(TIMEOUT_VAR) {
            let secs: u64 = value.trim().parse().map_err(|_| ConfigError::InvalidTimeout {
                var: TIMEOUT_VAR,
                value: value.clone(),
            })?;
            client.timeout = (secs > 0).then(|| Duration::from_secs(secs));
        }

        Ok(Self {
            user_id: get(USER_ID_VAR),
            password: get(USER_PW_VAR),
            client,
        })
    }

    /// Credentials for commands that need a session
    pub fn credentials(&self) -> Result<LoginParams, ConfigError> {
        let user_id = self.user_id.clone().ok_or(ConfigError::Missing(USER_ID_VAR))?;
        let password = self.password.clone().ok_or(ConfigError::Missing(USER_PW_VAR))?;

        Ok(LoginParams { user_id, password })
    }
}
