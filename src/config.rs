//! Application configuration module
//!
//! Handles loading and validating configuration from environment variables.

use crate::identity::Address;
use serde::Deserialize;
use std::net::Ipv4Addr;
use thiserror::Error;

/// Default proposal lifetime: 7 days
pub const DEFAULT_PROPOSAL_EXPIRATION_SECS: i64 = 7 * 24 * 60 * 60;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load environment variables: {0}")]
    EnvLoad(#[from] dotenvy::Error),

    #[error("Missing required environment variable: {0}")]
    MissingVar(String),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

/// Server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: Ipv4Addr,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: Ipv4Addr::new(0, 0, 0, 0),
            port: 3000,
        }
    }
}

/// CORS configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

/// Deployment parameters of the governance gate
#[derive(Debug, Clone, Deserialize)]
pub struct GovernanceConfig {
    pub signers: Vec<Address>,
    pub vote_threshold: usize,
    pub admin: Address,
    pub proposal_expiration_secs: i64,
}

impl GovernanceConfig {
    /// The expiration window. A value chrono cannot represent saturates,
    /// and proposal creation then rejects it.
    pub fn proposal_expiration(&self) -> chrono::Duration {
        chrono::Duration::try_seconds(self.proposal_expiration_secs).unwrap_or(chrono::Duration::MAX)
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

/// Complete application settings
#[derive(Debug, Clone)]
pub struct Settings {
    pub server: ServerConfig,
    pub cors: CorsConfig,
    pub governance: GovernanceConfig,
    pub log_format: LogFormat,
}

impl Settings {
    /// Load settings from environment variables
    pub fn load() -> Result<Self, ConfigError> {
        // A missing .env is fine; a malformed one is not
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                return Err(e.into());
            }
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let server = ServerConfig {
            host: lookup("HOST")
                .and_then(|h| h.parse().ok())
                .unwrap_or_else(|| ServerConfig::default().host),
            port: lookup("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or_else(|| ServerConfig::default().port),
        };

        let cors = CorsConfig {
            allowed_origins: lookup("ALLOWED_ORIGINS")
                .map(|s| {
                    s.split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
        };

        let log_format = match lookup("LOG_FORMAT").as_deref().map(str::trim) {
            Some(f) if f.eq_ignore_ascii_case("json") => LogFormat::Json,
            _ => LogFormat::Compact,
        };

        Ok(Self {
            server,
            cors,
            governance: Self::parse_governance(&lookup)?,
            log_format,
        })
    }

    fn parse_governance<F>(lookup: &F) -> Result<GovernanceConfig, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let require = |key: &str| lookup(key).ok_or_else(|| ConfigError::MissingVar(key.to_string()));

        let signers = require("GATE_SIGNERS")?
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| {
                s.parse::<Address>()
                    .map_err(|e| ConfigError::InvalidValue(format!("GATE_SIGNERS entry '{}': {}", s, e)))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let vote_threshold = require("GATE_VOTE_THRESHOLD")?
            .trim()
            .parse::<usize>()
            .map_err(|e| ConfigError::InvalidValue(format!("GATE_VOTE_THRESHOLD: {}", e)))?;

        let admin_raw = require("GATE_ADMIN")?;
        let admin = admin_raw
            .parse::<Address>()
            .map_err(|e| ConfigError::InvalidValue(format!("GATE_ADMIN '{}': {}", admin_raw, e)))?;

        let proposal_expiration_secs = match lookup("GATE_PROPOSAL_EXPIRATION_SECS") {
            Some(raw) => raw
                .trim()
                .parse::<i64>()
                .map_err(|e| ConfigError::InvalidValue(format!("GATE_PROPOSAL_EXPIRATION_SECS: {}", e)))?,
            None => DEFAULT_PROPOSAL_EXPIRATION_SECS,
        };
        if proposal_expiration_secs <= 0 {
            return Err(ConfigError::InvalidValue(
                "GATE_PROPOSAL_EXPIRATION_SECS must be positive".to_string(),
            ));
        }
        let window_fits = chrono::Duration::try_seconds(proposal_expiration_secs)
            .and_then(|window| chrono::Utc::now().checked_add_signed(window))
            .is_some();
        if !window_fits {
            return Err(ConfigError::InvalidValue(format!(
                "GATE_PROPOSAL_EXPIRATION_SECS {} is too large",
                proposal_expiration_secs
            )));
        }

        Ok(GovernanceConfig {
            signers,
            vote_threshold,
            admin,
            proposal_expiration_secs,
        })
    }
}
