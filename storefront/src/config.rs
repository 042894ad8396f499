//! Environment-based configuration.
//!
//! | Variable                  | Default                         |
//! |---------------------------|---------------------------------|
//! | `STOREFRONT_API_ORIGIN`   | `http://localhost:3000`         |
//! | `STOREFRONT_API_URL`      | `{origin}/api/weblarek`         |
//! | `STOREFRONT_CDN_URL`      | `{origin}/content/weblarek`     |
//! | `STOREFRONT_EMAIL_POLICY` | `presence` (or `format`)        |
//! | `STOREFRONT_LOG_LEVEL`    | `info`                          |
//! | `STOREFRONT_OFFLINE`      | `false`: use the HTTP gateway   |
//!
//! ```no_run
//! use storefront::config::Config;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::from_env()?;
//! println!("API: {}", config.api_url);
//! # Ok(())
//! # }
//! ```

use crate::validation::EmailPolicy;
use thiserror::Error;

/// Default API origin
pub const DEFAULT_ORIGIN: &str = "http://localhost:3000";

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Configuration error
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A variable holds a value that cannot be used
    #[error("invalid {key}=`{value}`: {reason}")]
    InvalidValue {
        /// Variable name
        key: &'static str,
        /// Offending value
        value: String,
        /// What was expected
        reason: String,
    },
}

/// Storefront configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Origin the API and CDN defaults derive from
    pub api_origin: String,
    /// Base URL of the product/order API
    pub api_url: String,
    /// Base URL image paths are prefixed with
    pub cdn_url: String,
    /// Email check for the contact step
    pub email_policy: EmailPolicy,
    /// Default log filter when `RUST_LOG` is unset
    pub log_level: String,
    /// Serve the bundled sample catalog instead of calling the API
    pub offline: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_origin: DEFAULT_ORIGIN.to_string(),
            api_url: format!("{DEFAULT_ORIGIN}/api/weblarek"),
            cdn_url: format!("{DEFAULT_ORIGIN}/content/weblarek"),
            email_policy: EmailPolicy::default(),
            log_level: "info".to_string(),
            offline: false,
        }
    }
}

impl Config {
    /// Load configuration from the process environment
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if any variable is malformed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if any variable is malformed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let api_origin = var("STOREFRONT_API_ORIGIN").unwrap_or_else(|| DEFAULT_ORIGIN.to_string());
        let api_origin = url("STOREFRONT_API_ORIGIN", &api_origin)?;

        let api_url = match var("STOREFRONT_API_URL") {
            Some(value) => url("STOREFRONT_API_URL", &value)?,
            None => format!("{api_origin}/api/weblarek"),
        };
        let cdn_url = match var("STOREFRONT_CDN_URL") {
            Some(value) => url("STOREFRONT_CDN_URL", &value)?,
            None => format!("{api_origin}/content/weblarek"),
        };

        let email_policy = match var("STOREFRONT_EMAIL_POLICY") {
            Some(value) => value.parse::<EmailPolicy>().map_err(|reason| ConfigError::InvalidValue {
                key: "STOREFRONT_EMAIL_POLICY",
                value,
                reason,
            })?,
            None => EmailPolicy::default(),
        };

        let log_level = var("STOREFRONT_LOG_LEVEL").map_or_else(|| "info".to_string(), |v| v.to_ascii_lowercase());
        if !LOG_LEVELS.contains(&log_level.as_str()) {
            return Err(ConfigError::InvalidValue {
                key: "STOREFRONT_LOG_LEVEL",
                value: log_level,
                reason: format!("expected one of {}", LOG_LEVELS.join(", ")),
            });
        }

        let offline = match var("STOREFRONT_OFFLINE") {
            Some(value) => flag("STOREFRONT_OFFLINE", &value)?,
            None => false,
        };

        Ok(Self {
            api_origin,
            api_url,
            cdn_url,
            email_policy,
            log_level,
            offline,
        })
    }
}

fn url(key: &'static str, value: &str) -> Result<String, ConfigError> {
    let value = value.trim();
    if value.starts_with("http://") || value.starts_with("https://") {
        Ok(value.trim_end_matches('/').to_string())
    } else {
        Err(ConfigError::InvalidValue {
            key,
            value: value.to_string(),
            reason: "expected an http(s) URL".to_string(),
        })
    }
}

fn flag(key: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key,
            value: value.to_string(),
            reason: "expected true or false".to_string(),
        }),
    }
}
