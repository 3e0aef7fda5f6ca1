//! uptick configuration parser.
//!
//! The document is TOML by default; a `.json` file is read as JSON so
//! existing `config.json` files load unchanged.

use std::path::Path;
use std::time::Duration;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};
use crate::types::Service;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UptickConfig {
    #[serde(default = "default_check_interval_minutes")]
    pub check_interval_minutes: u64,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: f64,
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,
    #[serde(default = "default_request_delay_seconds")]
    pub request_delay_seconds: f64,
    #[serde(default = "default_retry_base_delay_seconds")]
    pub retry_base_delay_seconds: f64,
    #[serde(default = "default_max_retry_delay_seconds")]
    pub max_retry_delay_seconds: f64,
    pub user_agents: Vec<String>,
    /// Service name → definition, in document order.
    pub services: IndexMap<String, ServiceConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    #[serde(default)]
    pub description: String,
    pub endpoints: Vec<String>,
}

fn default_check_interval_minutes() -> u64 { 15 }
fn default_timeout_seconds() -> f64 { 10.0 }
fn default_retry_attempts() -> u32 { 3 }
fn default_request_delay_seconds() -> f64 { 2.0 }
fn default_retry_base_delay_seconds() -> f64 { 1.0 }
fn default_max_retry_delay_seconds() -> f64 { 60.0 }

impl UptickConfig {
    /// Load and validate a config file. `.json` files are parsed as JSON,
    /// everything else as TOML.
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        if is_json {
            Self::from_json_str(&content)
        } else {
            Self::from_toml_str(&content)
        }
    }

    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        let config: UptickConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_str(content: &str) -> ConfigResult<Self> {
        let config: UptickConfig = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every field against its allowed range.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.check_interval_minutes == 0 {
            return Err(invalid("check_interval_minutes must be positive"));
        }
        if seconds("timeout_seconds", self.timeout_seconds)?.is_zero() {
            return Err(invalid("timeout_seconds must be a positive number"));
        }
        if self.retry_attempts == 0 {
            return Err(invalid("retry_attempts must be at least 1"));
        }
        seconds("request_delay_seconds", self.request_delay_seconds)?;
        seconds("retry_base_delay_seconds", self.retry_base_delay_seconds)?;
        seconds("max_retry_delay_seconds", self.max_retry_delay_seconds)?;
        if self.max_retry_delay_seconds < self.retry_base_delay_seconds {
            return Err(invalid(
                "max_retry_delay_seconds must not be below retry_base_delay_seconds",
            ));
        }

        if self.user_agents.is_empty() {
            return Err(invalid("user_agents must list at least one entry"));
        }
        if self.user_agents.iter().any(|ua| ua.trim().is_empty()) {
            return Err(invalid("user_agents must not contain blank entries"));
        }

        if self.services.is_empty() {
            return Err(invalid("no services configured"));
        }
        for (name, service) in &self.services {
            if name.trim().is_empty() {
                return Err(invalid("service names must not be blank"));
            }
            if service.endpoints.is_empty() {
                return Err(invalid(format!("service {name:?} has no endpoints")));
            }
            for url in &service.endpoints {
                if !is_http_url(url) {
                    return Err(invalid(format!(
                        "service {name:?}: endpoint {url:?} is not an http(s) URL"
                    )));
                }
            }
        }

        Ok(())
    }

    /// Services in configured order.
    pub fn services(&self) -> Vec<Service> {
        self.services
            .iter()
            .map(|(name, svc)| Service {
                name: name.clone(),
                description: svc.description.clone(),
                endpoints: svc.endpoints.clone(),
            })
            .collect()
    }

    pub fn endpoint_count(&self) -> usize {
        self.services.values().map(|s| s.endpoints.len()).sum()
    }

    pub fn check_interval(&self) -> Duration {
        Duration::from_secs(self.check_interval_minutes.saturating_mul(60))
    }

    pub fn timeout(&self) -> Duration {
        clamp_secs(self.timeout_seconds)
    }

    pub fn request_delay(&self) -> Duration {
        clamp_secs(self.request_delay_seconds)
    }

    pub fn retry_base_delay(&self) -> Duration {
        clamp_secs(self.retry_base_delay_seconds)
    }

    pub fn max_retry_delay(&self) -> Duration {
        clamp_secs(self.max_retry_delay_seconds)
    }
}

fn invalid(msg: impl Into<String>) -> ConfigError {
    ConfigError::Invalid(msg.into())
}

/// Convert a seconds field, rejecting values a `Duration` cannot hold.
fn seconds(field: &str, value: f64) -> ConfigResult<Duration> {
    Duration::try_from_secs_f64(value)
        .map_err(|e| invalid(format!("{field} = {value} is not a usable duration: {e}")))
}

/// Lossy conversion for accessors; `validate` rejects these inputs up front.
fn clamp_secs(value: f64) -> Duration {
    if value.is_nan() || value <= 0.0 {
        return Duration::ZERO;
    }
    Duration::try_from_secs_f64(value).unwrap_or(Duration::MAX)
}

fn is_http_url(url: &str) -> bool {
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"));
    match rest {
        Some(rest) => {
            let host = rest.split(['/', '?', '#']).next().unwrap_or_default();
            !host.is_empty() && !url.chars().any(char::is_whitespace)
        }
        None => false,
    }
}
