use std::{fmt::Display, net::IpAddr, str::FromStr};

use chrono::Duration;
use tracing::{info, warn};

/// Startup configuration, read once and handed to the services that need it.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub database_url: Option<String>,
    pub token_secret: String,
    pub token_ttl: Duration,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("invalid {key} value {value:?}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let token_secret = lookup("TOKEN_SECRET")
            .filter(|s| !s.trim().is_empty())
            .ok_or(ConfigError::Missing("TOKEN_SECRET"))?;

        let database_url = lookup("DATABASE_URL").filter(|s| !s.trim().is_empty());
        if database_url.is_none() {
            warn!("DATABASE_URL not set, records will only live in memory");
        }

        let ttl_hours: i64 = parse_or(&lookup, "TOKEN_TTL_HOURS", "10")?;
        if ttl_hours <= 0 {
            return Err(ConfigError::Invalid {
                key: "TOKEN_TTL_HOURS",
                value: ttl_hours.to_string(),
                reason: "must be positive".to_string(),
            });
        }

        Ok(Self {
            host: parse_or(&lookup, "HOST", "127.0.0.1")?,
            port: parse_or(&lookup, "PORT", "5000")?,
            database_url,
            token_secret,
            token_ttl: Duration::hours(ttl_hours),
        })
    }
}

fn parse_or<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: &str,
) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    let raw = lookup(key).unwrap_or_else(|| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });
    raw.parse().map_err(|e: T::Err| ConfigError::Invalid {
        key,
        reason: e.to_string(),
        value: raw.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply() {
        let cfg = Config::from_lookup(lookup_from(&[("TOKEN_SECRET", "s3cret")])).unwrap();
        assert_eq!(cfg.port, 5000);
        assert_eq!(cfg.host.to_string(), "127.0.0.1");
        assert_eq!(cfg.token_ttl, Duration::hours(10));
        assert!(cfg.database_url.is_none());
    }

    #[test]
    fn secret_is_required() {
        let err = Config::from_lookup(lookup_from(&[("PORT", "8080")])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("TOKEN_SECRET")));
    }

    #[test]
    fn bad_port_is_rejected() {
        let err = Config::from_lookup(lookup_from(&[("TOKEN_SECRET", "s"), ("PORT", "http")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "PORT", .. }));
    }

    #[test]
    fn ttl_must_be_positive() {
        let err = Config::from_lookup(lookup_from(&[("TOKEN_SECRET", "s"), ("TOKEN_TTL_HOURS", "0")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "TOKEN_TTL_HOURS", .. }));
    }
}
