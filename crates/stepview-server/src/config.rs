//! Environment-driven configuration.
//!
//! - `STEPVIEW_API_KEY`: credential for the remote assistant (blank or unset
//!   means none)
//! - `STEPVIEW_API_BASE_URL`: OpenAI-compatible base URL
//! - `STEPVIEW_MODEL`: chat model name
//! - `STEPVIEW_TIMEOUT_SECS`: request timeout
//! - `STEPVIEW_PORT`: server listen port
//! - `STEPVIEW_SESSION_TTL_SECS`: idle time before a playback session is swept

use std::str::FromStr;
use std::time::Duration;

use tracing::warn;

pub const DEFAULT_API_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_MODEL: &str = "llama3-70b-8192";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_SESSION_TTL_SECS: u64 = 1800;

/// Remote assistant settings.
#[derive(Debug, Clone, PartialEq)]
pub struct AssistantConfig {
    pub api_key: Option<String>,
    pub api_base_url: String,
    pub model: String,
    pub timeout: Duration,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        AssistantConfig {
            api_key: None,
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl AssistantConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the config from a variable lookup, falling back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = AssistantConfig::default();
        AssistantConfig {
            api_key: lookup("STEPVIEW_API_KEY"),
            api_base_url: lookup("STEPVIEW_API_BASE_URL").unwrap_or(defaults.api_base_url),
            model: lookup("STEPVIEW_MODEL").unwrap_or(defaults.model),
            timeout: Duration::from_secs(parse_or("STEPVIEW_TIMEOUT_SECS", &lookup, DEFAULT_TIMEOUT_SECS)),
        }
        .normalize()
    }

    /// Trims fields; a blank key becomes `None` and blank settings revert to
    /// their defaults.
    pub fn normalize(mut self) -> Self {
        self.api_key = self
            .api_key
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty());

        let base_url = self.api_base_url.trim().trim_end_matches('/');
        self.api_base_url = if base_url.is_empty() {
            DEFAULT_API_BASE_URL.to_string()
        } else {
            base_url.to_string()
        };

        let model = self.model.trim();
        self.model = if model.is_empty() {
            DEFAULT_MODEL.to_string()
        } else {
            model.to_string()
        };
        self
    }

    /// Whether a credential is present.
    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    pub fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.api_base_url.trim_end_matches('/'))
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub port: u16,
    pub session_ttl: Duration,
    pub assistant: AssistantConfig,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        ServerConfig {
            port: parse_or("STEPVIEW_PORT", &lookup, DEFAULT_PORT),
            session_ttl: Duration::from_secs(parse_or(
                "STEPVIEW_SESSION_TTL_SECS",
                &lookup,
                DEFAULT_SESSION_TTL_SECS,
            )),
            assistant: AssistantConfig::from_lookup(&lookup),
        }
    }
}

fn parse_or<T: FromStr + Copy>(name: &str, lookup: &impl Fn(&str) -> Option<String>, default: T) -> T {
    match lookup(name) {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("ignoring invalid {}={:?}, using default", name, raw);
            default
        }),
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
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn defaults_without_environment() {
        let config = ServerConfig::from_lookup(lookup(&[]));
        assert_eq!(config.port, 3000);
        assert_eq!(config.session_ttl, Duration::from_secs(1800));
        assert_eq!(config.assistant, AssistantConfig::default());
        assert!(!config.assistant.is_configured());
    }

    #[test]
    fn blank_key_is_no_credential() {
        let config = AssistantConfig::from_lookup(lookup(&[("STEPVIEW_API_KEY", "   ")]));
        assert_eq!(config.api_key, None);

        let config = AssistantConfig::from_lookup(lookup(&[("STEPVIEW_API_KEY", " gsk_123 ")]));
        assert_eq!(config.api_key.as_deref(), Some("gsk_123"));
        assert!(config.is_configured());
    }

    #[test]
    fn overrides_and_endpoint() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("STEPVIEW_API_BASE_URL", "http://localhost:8080/v1/"),
            ("STEPVIEW_MODEL", "tiny"),
            ("STEPVIEW_TIMEOUT_SECS", "5"),
            ("STEPVIEW_PORT", "8081"),
        ]));
        assert_eq!(config.port, 8081);
        assert_eq!(config.assistant.model, "tiny");
        assert_eq!(config.assistant.timeout, Duration::from_secs(5));
        assert_eq!(config.assistant.endpoint(), "http://localhost:8080/v1/chat/completions");
    }

    #[test]
    fn invalid_numbers_fall_back_to_defaults() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("STEPVIEW_PORT", "eighty"),
            ("STEPVIEW_SESSION_TTL_SECS", "-1"),
        ]));
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.session_ttl, Duration::from_secs(DEFAULT_SESSION_TTL_SECS));
    }
}
