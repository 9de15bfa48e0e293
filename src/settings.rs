//! Process settings read once from the environment (`.env` supported).

use crate::error::ConfigError;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_SCHOOL_DB_URL: &str = "sqlite://school.db";
pub const DEFAULT_SPIN_DB_URL: &str = "sqlite://spin.db";

#[derive(Clone, Debug)]
pub struct Settings {
    pub school_db_url: String,
    pub spin_db_url: String,
    pub bind_addr: String,
    pub max_connections: u32,
    pub stream_interval: Duration,
    pub body_limit_bytes: usize,
    pub catalog_path: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            school_db_url: DEFAULT_SCHOOL_DB_URL.into(),
            spin_db_url: DEFAULT_SPIN_DB_URL.into(),
            bind_addr: "127.0.0.1:3000".into(),
            max_connections: 5,
            stream_interval: Duration::from_secs(5),
            body_limit_bytes: 64 * 1024,
            catalog_path: None,
        }
    }
}

impl Settings {
    /// Load `.env` if present, then read variables over the defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Settings::default();
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        Ok(Settings {
            school_db_url: var("SCHOOL_DB_URL").unwrap_or(defaults.school_db_url),
            spin_db_url: var("SPIN_DB_URL").unwrap_or(defaults.spin_db_url),
            bind_addr: var("BIND_ADDR").unwrap_or(defaults.bind_addr),
            max_connections: parse_or("DB_MAX_CONNECTIONS", var("DB_MAX_CONNECTIONS"), defaults.max_connections)?,
            stream_interval: Duration::from_secs(parse_or(
                "STREAM_INTERVAL_SECS",
                var("STREAM_INTERVAL_SECS"),
                defaults.stream_interval.as_secs(),
            )?),
            body_limit_bytes: parse_or("BODY_LIMIT_BYTES", var("BODY_LIMIT_BYTES"), defaults.body_limit_bytes)?,
            catalog_path: var("CATALOG_PATH").map(PathBuf::from),
        })
    }
}

fn parse_or<T: FromStr>(key: &str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match raw {
        None => Ok(default),
        Some(s) => s
            .parse()
            .map_err(|e| ConfigError::Load(format!("invalid {} value '{}': {}", key, s, e))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_unset() {
        let s = Settings::from_lookup(lookup(&[])).expect("settings");
        assert_eq!(s.school_db_url, DEFAULT_SCHOOL_DB_URL);
        assert_eq!(s.stream_interval, Duration::from_secs(5));
        assert!(s.catalog_path.is_none());
    }

    #[test]
    fn overrides_are_read() {
        let s = Settings::from_lookup(lookup(&[
            ("SPIN_DB_URL", "sqlite::memory:"),
            ("STREAM_INTERVAL_SECS", "2"),
            ("CATALOG_PATH", "catalog.json"),
        ]))
        .expect("settings");
        assert_eq!(s.spin_db_url, "sqlite::memory:");
        assert_eq!(s.stream_interval, Duration::from_secs(2));
        assert_eq!(s.catalog_path, Some(PathBuf::from("catalog.json")));
    }

    #[test]
    fn invalid_number_is_a_load_error() {
        let err = Settings::from_lookup(lookup(&[("DB_MAX_CONNECTIONS", "many")])).unwrap_err();
        assert!(matches!(err, ConfigError::Load(_)));
    }
}
