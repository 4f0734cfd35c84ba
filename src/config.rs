//! Service configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `DATABASE_URL` - `PostgreSQL` connection string
//!
//! ## Optional
//! - `HOST` - Bind address (default: 0.0.0.0)
//! - `PORT` - Listen port (default: 8083)
//! - `NATS_URL` - NATS server for domain events (disabled when unset)
//! - `AI_GATEWAY_URL` - OpenAI-compatible chat completions endpoint
//! - `AI_GATEWAY_API_KEY` - Bearer key for the gateway (chat disabled when unset)
//! - `AI_MODEL` - Model requested from the gateway
//! - `SESSION_TTL_HOURS` - Lifetime of a sign-in session (default: 720)
//! - `SHIPPING_FLAT_FEE` - Shipping fee below the free threshold (default: 7)
//! - `FREE_SHIPPING_THRESHOLD` - Subtotal from which shipping is free (default: 200)

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::str::FromStr;

use rust_decimal::Decimal;
use secrecy::SecretString;
use thiserror::Error;

use crate::domain::pricing::ShippingPolicy;

pub const DEFAULT_PORT: u16 = 8083;
pub const DEFAULT_SESSION_TTL_HOURS: i64 = 720;
pub const DEFAULT_AI_GATEWAY_URL: &str = "https://ai.gateway.lovable.dev/v1/chat/completions";
pub const DEFAULT_AI_MODEL: &str = "google/gemini-3-flash-preview";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: SecretString,
    pub host: IpAddr,
    pub port: u16,
    pub nats_url: Option<String>,
    pub session_ttl: chrono::Duration,
    pub shipping: ShippingPolicy,
    pub chat: ChatConfig,
}

#[derive(Debug, Clone)]
pub struct ChatConfig {
    pub gateway_url: String,
    pub api_key: Option<SecretString>,
    pub model: String,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self { gateway_url: DEFAULT_AI_GATEWAY_URL.to_string(), api_key: None, model: DEFAULT_AI_MODEL.to_string() }
    }
}

impl AppConfig {
    /// Load configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a required variable is missing or a value
    /// cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Same as [`AppConfig::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let database_url = get("DATABASE_URL").ok_or_else(|| ConfigError::MissingEnvVar("DATABASE_URL".into()))?;
        let host = parse_or(get("HOST"), "HOST", IpAddr::V4(Ipv4Addr::UNSPECIFIED))?;
        let port = parse_or(get("PORT"), "PORT", DEFAULT_PORT)?;
        let ttl_hours: i64 = parse_or(get("SESSION_TTL_HOURS"), "SESSION_TTL_HOURS", DEFAULT_SESSION_TTL_HOURS)?;
        if ttl_hours <= 0 {
            return Err(ConfigError::InvalidEnvVar("SESSION_TTL_HOURS".into(), "must be positive".into()));
        }

        let defaults = ShippingPolicy::default();
        let shipping = ShippingPolicy {
            flat_fee: parse_or::<Decimal>(get("SHIPPING_FLAT_FEE"), "SHIPPING_FLAT_FEE", defaults.flat_fee)?,
            free_threshold: parse_or::<Decimal>(get("FREE_SHIPPING_THRESHOLD"), "FREE_SHIPPING_THRESHOLD", defaults.free_threshold)?,
        };
        if shipping.flat_fee.is_sign_negative() || shipping.free_threshold.is_sign_negative() {
            return Err(ConfigError::InvalidEnvVar("SHIPPING_FLAT_FEE".into(), "shipping amounts cannot be negative".into()));
        }

        let chat = ChatConfig {
            gateway_url: get("AI_GATEWAY_URL").unwrap_or_else(|| DEFAULT_AI_GATEWAY_URL.to_string()),
            api_key: get("AI_GATEWAY_API_KEY").map(SecretString::from),
            model: get("AI_MODEL").unwrap_or_else(|| DEFAULT_AI_MODEL.to_string()),
        };

        Ok(Self {
            database_url: SecretString::from(database_url),
            host,
            port,
            nats_url: get("NATS_URL"),
            session_ttl: chrono::Duration::hours(ttl_hours),
            shipping,
            chat,
        })
    }

    pub fn socket_addr(&self) -> SocketAddr { SocketAddr::new(self.host, self.port) }
}

fn parse_or<T: FromStr>(value: Option<String>, key: &str, default: T) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match value {
        Some(v) => v.parse().map_err(|e: T::Err| ConfigError::InvalidEnvVar(key.to_string(), e.to_string())),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_lookup(lookup(&[("DATABASE_URL", "postgres://localhost/fgs")])).unwrap();
        assert_eq!(config.database_url.expose_secret(), "postgres://localhost/fgs");
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.socket_addr().to_string(), "0.0.0.0:8083");
        assert_eq!(config.shipping, ShippingPolicy::default());
        assert_eq!(config.session_ttl, chrono::Duration::hours(720));
        assert!(config.chat.api_key.is_none());
        assert_eq!(config.chat.model, DEFAULT_AI_MODEL);
        assert!(config.nats_url.is_none());
    }

    #[test]
    fn test_missing_database_url() {
        let err = AppConfig::from_lookup(lookup(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(ref k) if k == "DATABASE_URL"));
    }

    #[test]
    fn test_overrides() {
        let config = AppConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://db/fgs"),
            ("HOST", "127.0.0.1"),
            ("PORT", "9000"),
            ("SHIPPING_FLAT_FEE", "8.500"),
            ("FREE_SHIPPING_THRESHOLD", "150"),
            ("AI_GATEWAY_API_KEY", "key-123"),
            ("NATS_URL", "nats://localhost:4222"),
        ]))
        .unwrap();
        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:9000");
        assert_eq!(config.shipping.flat_fee, Decimal::new(8_500, 3));
        assert_eq!(config.shipping.free_threshold, Decimal::new(150, 0));
        assert_eq!(config.chat.api_key.as_ref().map(|k| k.expose_secret().to_string()), Some("key-123".into()));
        assert_eq!(config.nats_url.as_deref(), Some("nats://localhost:4222"));
    }

    #[test]
    fn test_invalid_values() {
        let err = AppConfig::from_lookup(lookup(&[("DATABASE_URL", "postgres://db"), ("PORT", "eighty")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref k, _) if k == "PORT"));
        let err = AppConfig::from_lookup(lookup(&[("DATABASE_URL", "postgres://db"), ("SESSION_TTL_HOURS", "0")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref k, _) if k == "SESSION_TTL_HOURS"));
    }
}
