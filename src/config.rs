use std::env;
use std::str::FromStr;
use std::time::Duration;

use dotenvy::dotenv;
use strum::{Display, EnumString};
use thiserror::Error;

use crate::leave::EngineSettings;
use crate::leave::ranker::ScoringPolicy;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} has an invalid value '{value}'")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum StoreBackend {
    Mysql,
    Memory,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server_addr: String,
    /// Required for the mysql backend only.
    pub database_url: Option<String>,
    pub jwt_secret: String,
    pub api_prefix: String,
    pub rate_protected_per_min: u32,

    pub store_backend: StoreBackend,
    /// JSON staff roster for the memory backend; without it the directory is empty.
    pub staff_roster_file: Option<String>,
    pub store_timeout_ms: u64,
    pub source_timeout_ms: u64,
    pub conflict_sample_limit: usize,
    pub scoring: ScoringPolicy,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the config from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = ScoringPolicy::default();
        let store_backend = parse_or(&lookup, "STORE_BACKEND", StoreBackend::Mysql)?;
        let database_url = lookup("DATABASE_URL");
        if store_backend == StoreBackend::Mysql && database_url.is_none() {
            return Err(ConfigError::Missing("DATABASE_URL"));
        }

        Ok(Self {
            server_addr: required(&lookup, "SERVER_ADDR")?,
            database_url,
            jwt_secret: required(&lookup, "JWT_SECRET")?,
            api_prefix: lookup("API_PREFIX").unwrap_or_else(|| "/api".to_string()),
            rate_protected_per_min: parse_or(&lookup, "RATE_PROTECTED_PER_MIN", 1000)?,

            store_backend,
            staff_roster_file: lookup("STAFF_ROSTER_FILE"),
            store_timeout_ms: parse_or(&lookup, "STORE_TIMEOUT_MS", 5000)?,
            source_timeout_ms: parse_or(&lookup, "SOURCE_TIMEOUT_MS", 2000)?,
            conflict_sample_limit: parse_or(&lookup, "CONFLICT_SAMPLE_LIMIT", 5)?,
            scoring: ScoringPolicy {
                same_department: parse_or(
                    &lookup,
                    "SCORE_SAME_DEPARTMENT",
                    defaults.same_department,
                )?,
                same_specialization: parse_or(
                    &lookup,
                    "SCORE_SAME_SPECIALIZATION",
                    defaults.same_specialization,
                )?,
                low_utilization: parse_or(
                    &lookup,
                    "SCORE_LOW_UTILIZATION",
                    defaults.low_utilization,
                )?,
                medium_utilization: parse_or(
                    &lookup,
                    "SCORE_MEDIUM_UTILIZATION",
                    defaults.medium_utilization,
                )?,
                high_utilization: parse_or(
                    &lookup,
                    "SCORE_HIGH_UTILIZATION",
                    defaults.high_utilization,
                )?,
                per_common_subject: parse_or(
                    &lookup,
                    "SCORE_PER_COMMON_SUBJECT",
                    defaults.per_common_subject,
                )?,
                low_utilization_below_pct: parse_or(
                    &lookup,
                    "UTILIZATION_LOW_BELOW_PCT",
                    defaults.low_utilization_below_pct,
                )?,
                high_utilization_above_pct: parse_or(
                    &lookup,
                    "UTILIZATION_HIGH_ABOVE_PCT",
                    defaults.high_utilization_above_pct,
                )?,
            },
        })
    }

    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            store_timeout: Duration::from_millis(self.store_timeout_ms),
            source_timeout: Duration::from_millis(self.source_timeout_ms),
            sample_limit: self.conflict_sample_limit,
            scoring: self.scoring.clone(),
        }
    }
}

fn required<F>(lookup: &F, name: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name).ok_or(ConfigError::Missing(name))
}

fn parse_or<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(name) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn memory_backend_needs_no_database() {
        let config = Config::from_lookup(lookup(&[
            ("SERVER_ADDR", "127.0.0.1:8080"),
            ("JWT_SECRET", "secret"),
            ("STORE_BACKEND", "memory"),
        ]))
        .expect("valid config");

        assert_eq!(config.store_backend, StoreBackend::Memory);
        assert_eq!(config.database_url, None);
        assert_eq!(config.staff_roster_file, None);
        assert_eq!(config.api_prefix, "/api");
        assert_eq!(config.scoring, ScoringPolicy::default());

        let settings = config.engine_settings();
        assert_eq!(settings.store_timeout, Duration::from_millis(5000));
        assert_eq!(settings.source_timeout, Duration::from_millis(2000));
        assert_eq!(settings.sample_limit, 5);
    }

    #[test]
    fn memory_backend_takes_a_roster_file() {
        let config = Config::from_lookup(lookup(&[
            ("SERVER_ADDR", "127.0.0.1:8080"),
            ("JWT_SECRET", "secret"),
            ("STORE_BACKEND", "memory"),
            ("STAFF_ROSTER_FILE", "staff.json"),
        ]))
        .expect("valid config");
        assert_eq!(config.staff_roster_file.as_deref(), Some("staff.json"));
    }

    #[test]
    fn mysql_backend_requires_database_url() {
        let err = Config::from_lookup(lookup(&[
            ("SERVER_ADDR", "127.0.0.1:8080"),
            ("JWT_SECRET", "secret"),
        ]))
        .unwrap_err();
        assert_eq!(err, ConfigError::Missing("DATABASE_URL"));
    }

    #[test]
    fn malformed_values_are_reported() {
        let err = Config::from_lookup(lookup(&[
            ("SERVER_ADDR", "127.0.0.1:8080"),
            ("JWT_SECRET", "secret"),
            ("STORE_BACKEND", "memory"),
            ("SCORE_SAME_DEPARTMENT", "lots"),
        ]))
        .unwrap_err();
        assert_eq!(
            err,
            ConfigError::Invalid {
                name: "SCORE_SAME_DEPARTMENT",
                value: "lots".to_string()
            }
        );
    }

    #[test]
    fn scoring_weights_override_defaults() {
        let config = Config::from_lookup(lookup(&[
            ("SERVER_ADDR", "0.0.0.0:80"),
            ("JWT_SECRET", "secret"),
            ("STORE_BACKEND", "memory"),
            ("SCORE_PER_COMMON_SUBJECT", "15"),
            ("UTILIZATION_HIGH_ABOVE_PCT", "80.5"),
        ]))
        .expect("valid config");
        assert_eq!(config.scoring.per_common_subject, 15);
        assert_eq!(config.scoring.high_utilization_above_pct, 80.5);
        assert_eq!(config.scoring.same_department, 30);
    }
}
