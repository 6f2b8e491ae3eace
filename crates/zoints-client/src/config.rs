//! Client configuration.
//!
//! Provides [`ClientConfig`] with defaults and an environment loader.
//! Command-line flags override whatever is loaded here.

use std::fmt;
use std::str::FromStr;

use zoints_core::address::Address;

use crate::error::ClientError;

pub const ENV_PROGRAM_ID: &str = "ZOINTS_PROGRAM_ID";
pub const ENV_LOG_LEVEL: &str = "ZOINTS_LOG_LEVEL";
pub const ENV_LOG_FORMAT: &str = "ZOINTS_LOG_FORMAT";

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(ClientError::Config(format!(
                "log format must be text or json, got {other:?}"
            ))),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Text => "text",
            Self::Json => "json",
        })
    }
}

/// Configuration for a staking client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Deployed staking program. Needed for derivation and instruction building.
    pub program_id: Option<Address>,
    /// Log level filter string (e.g. "info", "debug", "zoints_client=trace").
    pub log_level: String,
    pub log_format: LogFormat,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            program_id: None,
            log_level: "info".to_string(),
            log_format: LogFormat::Text,
        }
    }
}

impl ClientConfig {
    /// Load from the process environment, falling back to defaults.
    pub fn from_env() -> Result<Self, ClientError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using `lookup` in place of the environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ClientError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let program_id = lookup(ENV_PROGRAM_ID)
            .map(|s| {
                Address::from_base58(s.trim())
                    .map_err(|e| ClientError::Config(format!("{ENV_PROGRAM_ID}: {e}")))
            })
            .transpose()?;

        let log_level = lookup(ENV_LOG_LEVEL).unwrap_or(defaults.log_level);

        let log_format = match lookup(ENV_LOG_FORMAT) {
            Some(s) => s.parse()?,
            None => defaults.log_format,
        };

        Ok(Self {
            program_id,
            log_level,
            log_format,
        })
    }

    /// The program id, or a config error naming the variable to set.
    pub fn require_program_id(&self) -> Result<Address, ClientError> {
        self.program_id.ok_or_else(|| {
            ClientError::Config(format!("program id not set (use --program-id or {ENV_PROGRAM_ID})"))
        })
    }
}
