//! lingua.toml configuration parser.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default loopback host for the local translation service.
pub const DEFAULT_HOST: &str = "127.0.0.1";
/// Ports the local translation service binds to, in priority order.
pub const DEFAULT_PORTS: [u16; 3] = [5002, 5003, 5004];
/// Default text-generation model requested by the gateway.
pub const DEFAULT_MODEL: &str = "openai/gpt-4o-mini";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("invalid lingua.toml: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to render lingua.toml: {0}")]
    Render(#[from] toml::ser::Error),

    #[error("invalid duration for {field}: {value:?}")]
    Duration { field: &'static str, value: String },

    #[error("invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LinguaConfig {
    pub backend: Option<BackendConfig>,
    pub invoke: Option<InvokeConfig>,
    pub gateway: Option<GatewayConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BackendConfig {
    pub host: Option<String>,
    pub ports: Option<Vec<u16>>,
    pub probe_timeout: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct InvokeConfig {
    pub timeout: Option<String>,
    pub attempts: Option<u32>,
    pub backoff: Option<String>,
    pub max_backoff: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct GatewayConfig {
    pub listen: Option<String>,
    pub generator: Option<String>,
    pub model: Option<String>,
    pub api_key_env: Option<String>,
}

/// Resolved `[backend]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct BackendSettings {
    pub host: String,
    pub ports: Vec<u16>,
    pub probe_timeout: Duration,
}

/// Resolved `[invoke]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct InvokeSettings {
    pub timeout: Duration,
    pub attempts: u32,
    pub backoff: Duration,
    pub max_backoff: Duration,
}

/// Resolved `[gateway]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct GatewaySettings {
    pub listen: String,
    /// `host:port` of an OpenAI-compatible chat-completions server.
    pub generator: String,
    pub model: String,
    pub api_key_env: String,
}

impl LinguaConfig {
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn to_toml_string(&self) -> ConfigResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Scaffold a lingua.toml with every default spelled out.
    pub fn scaffold() -> Self {
        LinguaConfig {
            backend: Some(BackendConfig {
                host: Some(DEFAULT_HOST.to_string()),
                ports: Some(DEFAULT_PORTS.to_vec()),
                probe_timeout: Some("1s".to_string()),
            }),
            invoke: Some(InvokeConfig {
                timeout: Some("5s".to_string()),
                attempts: Some(3),
                backoff: Some("500ms".to_string()),
                max_backoff: Some("10s".to_string()),
            }),
            gateway: Some(GatewayConfig {
                listen: Some("127.0.0.1:3000".to_string()),
                generator: Some("127.0.0.1:11434".to_string()),
                model: Some(DEFAULT_MODEL.to_string()),
                api_key_env: Some("LINGUA_API_KEY".to_string()),
            }),
        }
    }

    pub fn backend_settings(&self) -> ConfigResult<BackendSettings> {
        let section = self.backend.clone().unwrap_or_default();
        let ports = section.ports.unwrap_or_else(|| DEFAULT_PORTS.to_vec());
        if ports.is_empty() {
            return Err(ConfigError::Invalid {
                field: "backend.ports",
                reason: "at least one candidate port is required".to_string(),
            });
        }
        Ok(BackendSettings {
            host: section.host.unwrap_or_else(|| DEFAULT_HOST.to_string()),
            ports,
            probe_timeout: duration_or(
                "backend.probe_timeout",
                section.probe_timeout.as_deref(),
                Duration::from_secs(1),
            )?,
        })
    }

    pub fn invoke_settings(&self) -> ConfigResult<InvokeSettings> {
        let section = self.invoke.clone().unwrap_or_default();
        let attempts = section.attempts.unwrap_or(3);
        if attempts == 0 {
            return Err(ConfigError::Invalid {
                field: "invoke.attempts",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(InvokeSettings {
            timeout: duration_or("invoke.timeout", section.timeout.as_deref(), Duration::from_secs(5))?,
            attempts,
            backoff: duration_or(
                "invoke.backoff",
                section.backoff.as_deref(),
                Duration::from_millis(500),
            )?,
            max_backoff: duration_or(
                "invoke.max_backoff",
                section.max_backoff.as_deref(),
                Duration::from_secs(10),
            )?,
        })
    }

    pub fn gateway_settings(&self) -> GatewaySettings {
        let section = self.gateway.clone().unwrap_or_default();
        GatewaySettings {
            listen: section.listen.unwrap_or_else(|| "127.0.0.1:3000".to_string()),
            generator: section.generator.unwrap_or_else(|| "127.0.0.1:11434".to_string()),
            model: section.model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            api_key_env: section.api_key_env.unwrap_or_else(|| "LINGUA_API_KEY".to_string()),
        }
    }
}

fn duration_or(field: &'static str, value: Option<&str>, default: Duration) -> ConfigResult<Duration> {
    match value {
        None => Ok(default),
        Some(raw) => parse_duration(raw).ok_or_else(|| ConfigError::Duration {
            field,
            value: raw.to_string(),
        }),
    }
}

/// Parse a duration string like "5s", "500ms", "1m". A bare number is seconds.
pub fn parse_duration(s: &str) -> Option<Duration> {
    let s = s.trim();
    if let Some(secs) = s.strip_suffix('s') {
        if let Some(ms) = secs.strip_suffix('m') {
            ms.parse::<u64>().ok().map(Duration::from_millis)
        } else {
            secs.parse::<u64>().ok().map(Duration::from_secs)
        }
    } else if let Some(mins) = s.strip_suffix('m') {
        mins.parse::<u64>().ok()?.checked_mul(60).map(Duration::from_secs)
    } else {
        s.parse::<u64>().ok().map(Duration::from_secs)
    }
}
