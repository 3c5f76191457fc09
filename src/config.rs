use crate::game::{Difficulty, UnknownDifficulty};
use crate::pokedex::api::DEFAULT_BASE_URL;
use crate::pokedex::{FetchSettings, RetryPolicy};

use std::env;
use std::num::ParseIntError;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid {var}: {source}")]
    Number {
        var: &'static str,
        source: ParseIntError,
    },
    #[error("invalid WHOSTHAT_DIFFICULTY: {0}")]
    Difficulty(#[from] UnknownDifficulty),
    #[error("{0} must be at least 1")]
    Zero(&'static str),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub api_base: String,
    pub roster_size: u32,
    pub max_lookup_attempts: u32,
    pub http_timeout: Duration,
    pub difficulty: Difficulty,
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_BASE_URL.to_string(),
            roster_size: 898,
            max_lookup_attempts: 5,
            http_timeout: Duration::from_secs(5),
            difficulty: Difficulty::Normal,
            log_filter: "info".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|name| env::var(name).ok())
    }

    /// Build from any variable source; unset variables keep their defaults
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let number = |name: &'static str, default: u32| -> Result<u32, ConfigError> {
            match var(name) {
                Some(raw) => {
                    let value: u32 = raw
                        .trim()
                        .parse()
                        .map_err(|source| ConfigError::Number { var: name, source })?;
                    if value == 0 {
                        return Err(ConfigError::Zero(name));
                    }
                    Ok(value)
                }
                None => Ok(default),
            }
        };

        Ok(Self {
            api_base: var("WHOSTHAT_API_BASE").unwrap_or(defaults.api_base),
            roster_size: number("WHOSTHAT_ROSTER_SIZE", defaults.roster_size)?,
            max_lookup_attempts: number(
                "WHOSTHAT_MAX_LOOKUP_ATTEMPTS",
                defaults.max_lookup_attempts,
            )?,
            http_timeout: Duration::from_secs(
                number("WHOSTHAT_HTTP_TIMEOUT_SECS", defaults.http_timeout.as_secs() as u32)?
                    .into(),
            ),
            difficulty: match var("WHOSTHAT_DIFFICULTY") {
                Some(raw) => raw.parse()?,
                None => defaults.difficulty,
            },
            log_filter: var("WHOSTHAT_LOG").unwrap_or(defaults.log_filter),
        })
    }

    pub fn fetch_settings(&self) -> FetchSettings {
        FetchSettings {
            roster_size: self.roster_size,
            retry: RetryPolicy {
                max_attempts: self.max_lookup_attempts,
                ..RetryPolicy::default()
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = Config::from_vars(vars(&[])).unwrap();
        assert_eq!(config.api_base, "https://pokeapi.co/api/v2");
        assert_eq!(config.roster_size, 898);
        assert_eq!(config.max_lookup_attempts, 5);
        assert_eq!(config.http_timeout, Duration::from_secs(5));
        assert_eq!(config.difficulty, Difficulty::Normal);
        assert_eq!(config.log_filter, "info");
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_vars(vars(&[
            ("WHOSTHAT_API_BASE", "http://localhost:9000/api/v2"),
            ("WHOSTHAT_ROSTER_SIZE", "151"),
            ("WHOSTHAT_MAX_LOOKUP_ATTEMPTS", "3"),
            ("WHOSTHAT_HTTP_TIMEOUT_SECS", "10"),
            ("WHOSTHAT_DIFFICULTY", "Hard"),
            ("WHOSTHAT_LOG", "whosthat=debug"),
        ]))
        .unwrap();

        assert_eq!(config.api_base, "http://localhost:9000/api/v2");
        assert_eq!(config.roster_size, 151);
        assert_eq!(config.http_timeout, Duration::from_secs(10));
        assert_eq!(config.difficulty, Difficulty::Hard);
        assert_eq!(config.log_filter, "whosthat=debug");

        let settings = config.fetch_settings();
        assert_eq!(settings.roster_size, 151);
        assert_eq!(settings.retry.max_attempts, 3);
    }

    #[test]
    fn test_malformed_number() {
        let error = Config::from_vars(vars(&[("WHOSTHAT_ROSTER_SIZE", "lots")])).unwrap_err();
        assert!(matches!(
            error,
            ConfigError::Number {
                var: "WHOSTHAT_ROSTER_SIZE",
                ..
            }
        ));
    }

    #[test]
    fn test_zero_rejected() {
        let error =
            Config::from_vars(vars(&[("WHOSTHAT_MAX_LOOKUP_ATTEMPTS", "0")])).unwrap_err();
        assert!(matches!(error, ConfigError::Zero("WHOSTHAT_MAX_LOOKUP_ATTEMPTS")));
    }

    #[test]
    fn test_unknown_difficulty() {
        let error = Config::from_vars(vars(&[("WHOSTHAT_DIFFICULTY", "nightmare")])).unwrap_err();
        assert!(matches!(error, ConfigError::Difficulty(_)));
    }
}
