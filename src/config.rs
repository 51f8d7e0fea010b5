//! Run configuration.
//!
//! Built once at startup from the process environment (after `.env` has been
//! loaded) and passed by reference. Command-line flags are applied on top via
//! the `with_*` builders.

use crate::error::ConfigError;
use crate::source::Encoding;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

pub const DEFAULT_CSV_PATH: &str = "data/DataCoSupplyChainDataset.csv";
pub const DEFAULT_BATCH_SIZE: usize = 1000;

/// Connection settings for the destination database.
#[derive(Clone, PartialEq, Eq)]
pub struct DatabaseSettings {
    pub host: String,
    pub port: u16,
    pub name: String,
    pub user: String,
    pub password: String,
    pub max_connections: u32,
    pub connection_timeout_secs: u64,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5432,
            name: "supply_chain_analytics".to_string(),
            user: "postgres".to_string(),
            password: String::new(),
            max_connections: 2,
            connection_timeout_secs: 30,
        }
    }
}

/// Quote a value for a libpq key/value connection string.
fn quote_conninfo(value: &str) -> String {
    let escaped = value.replace('\\', "\\\\").replace('\'', "\\'");
    format!("'{}'", escaped)
}

impl DatabaseSettings {
    /// libpq key/value connection string.
    ///
    /// Contains the password; never log it.
    pub fn connection_string(&self) -> String {
        let mut conninfo = format!(
            "host={} port={} dbname={} user={}",
            quote_conninfo(&self.host),
            self.port,
            quote_conninfo(&self.name),
            quote_conninfo(&self.user)
        );
        if !self.password.is_empty() {
            conninfo.push_str(" password=");
            conninfo.push_str(&quote_conninfo(&self.password));
        }
        conninfo
    }
}

impl fmt::Debug for DatabaseSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("name", &self.name)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("max_connections", &self.max_connections)
            .field("connection_timeout_secs", &self.connection_timeout_secs)
            .finish()
    }
}

/// Complete configuration of one import run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    pub source_path: PathBuf,
    pub encoding: Encoding,
    pub database: DatabaseSettings,
    /// Successful inserts between commits.
    pub batch_size: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            source_path: PathBuf::from(DEFAULT_CSV_PATH),
            encoding: Encoding::default(),
            database: DatabaseSettings::default(),
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

fn parse_var<T>(key: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
        key,
        value: raw.to_string(),
        reason: e.to_string(),
    })
}

/// Reject zero for settings that count or time something.
fn positive<T>(key: &'static str, value: T) -> Result<T, ConfigError>
where
    T: Default + PartialEq + fmt::Display,
{
    if value == T::default() {
        return Err(ConfigError::InvalidValue {
            key,
            value: value.to_string(),
            reason: "must be at least 1".to_string(),
        });
    }
    Ok(value)
}

impl PipelineConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration from an arbitrary key lookup. Unset keys take defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let db = &mut config.database;

        if let Some(path) = lookup("CSV_FILE_PATH") {
            config.source_path = PathBuf::from(path);
        }
        if let Some(raw) = lookup("SOURCE_ENCODING") {
            config.encoding = parse_var("SOURCE_ENCODING", &raw)?;
        }
        if let Some(host) = lookup("DB_HOST") {
            db.host = host;
        }
        if let Some(raw) = lookup("DB_PORT") {
            db.port = parse_var("DB_PORT", &raw)?;
        }
        if let Some(name) = lookup("DB_NAME") {
            db.name = name;
        }
        if let Some(user) = lookup("DB_USER") {
            db.user = user;
        }
        if let Some(password) = lookup("DB_PASSWORD") {
            db.password = password;
        }
        if let Some(raw) = lookup("DB_POOL_MAX") {
            db.max_connections = positive("DB_POOL_MAX", parse_var("DB_POOL_MAX", &raw)?)?;
        }
        if let Some(raw) = lookup("DB_CONNECT_TIMEOUT_SECS") {
            db.connection_timeout_secs = positive(
                "DB_CONNECT_TIMEOUT_SECS",
                parse_var("DB_CONNECT_TIMEOUT_SECS", &raw)?,
            )?;
        }
        if let Some(raw) = lookup("BATCH_SIZE") {
            config.batch_size = positive("BATCH_SIZE", parse_var("BATCH_SIZE", &raw)?)?;
        }

        Ok(config)
    }

    pub fn with_source_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.source_path = path.into();
        self
    }

    pub fn with_encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Result<Self, ConfigError> {
        self.batch_size = positive("BATCH_SIZE", batch_size)?;
        Ok(self)
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
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config, PipelineConfig::default());
        assert_eq!(config.batch_size, 1000);
        assert_eq!(config.encoding, Encoding::Latin1);
        assert_eq!(config.database.port, 5432);
        assert_eq!(config.database.name, "supply_chain_analytics");
    }

    #[test]
    fn test_overrides_from_environment() {
        let config = PipelineConfig::from_lookup(lookup(&[
            ("CSV_FILE_PATH", "/tmp/orders.csv"),
            ("SOURCE_ENCODING", "utf-8"),
            ("DB_HOST", "db.internal"),
            ("DB_PORT", "6543"),
            ("BATCH_SIZE", "250"),
        ]))
        .unwrap();

        assert_eq!(config.source_path, PathBuf::from("/tmp/orders.csv"));
        assert_eq!(config.encoding, Encoding::Utf8);
        assert_eq!(config.database.host, "db.internal");
        assert_eq!(config.database.port, 6543);
        assert_eq!(config.batch_size, 250);
    }

    #[test]
    fn test_invalid_port() {
        let err = PipelineConfig::from_lookup(lookup(&[("DB_PORT", "five")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key: "DB_PORT", .. }));
    }

    #[test]
    fn test_zero_batch_size_rejected() {
        let err = PipelineConfig::from_lookup(lookup(&[("BATCH_SIZE", "0")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key: "BATCH_SIZE", .. }));
        assert!(PipelineConfig::default().with_batch_size(0).is_err());
    }

    #[test]
    fn test_zero_pool_size_rejected() {
        let err = PipelineConfig::from_lookup(lookup(&[("DB_POOL_MAX", "0")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key: "DB_POOL_MAX", .. }));
    }

    #[test]
    fn test_zero_connect_timeout_rejected() {
        let err = PipelineConfig::from_lookup(lookup(&[("DB_CONNECT_TIMEOUT_SECS", "0")]))
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue { key: "DB_CONNECT_TIMEOUT_SECS", .. }
        ));
    }

    #[test]
    fn test_positive_pool_settings_accepted() {
        let config = PipelineConfig::from_lookup(lookup(&[
            ("DB_POOL_MAX", "4"),
            ("DB_CONNECT_TIMEOUT_SECS", "5"),
        ]))
        .unwrap();
        assert_eq!(config.database.max_connections, 4);
        assert_eq!(config.database.connection_timeout_secs, 5);
    }

    #[test]
    fn test_connection_string_quotes_values() {
        let settings = DatabaseSettings {
            password: "it's a \\secret".to_string(),
            ..Default::default()
        };
        assert_eq!(
            settings.connection_string(),
            "host='localhost' port=5432 dbname='supply_chain_analytics' user='postgres' \
             password='it\\'s a \\\\secret'"
        );
    }

    #[test]
    fn test_connection_string_without_password() {
        let settings = DatabaseSettings::default();
        assert!(!settings.connection_string().contains("password"));
    }

    #[test]
    fn test_debug_redacts_password() {
        let settings = DatabaseSettings {
            password: "hunter2".to_string(),
            ..Default::default()
        };
        let rendered = format!("{:?}", settings);
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("<redacted>"));
    }
}
