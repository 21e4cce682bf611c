//! Settings for the `splitter` binary.
//!
//! Values come from an optional TOML file and are overridden by environment
//! variables prefixed with `SPLITTER__`, e.g. `SPLITTER__SERVER__PORT=8080`.
//!
//! ```toml
//! [app]
//! level = "info"
//!
//! [server]
//! bind = "0.0.0.0"
//! port = 3000
//!
//! [database]
//! sqlite = "splitter.db"
//!
//! [cache]
//! backend = "redis"
//! redis_url = "redis://127.0.0.1/"
//! ttl_seconds = 5
//! invalidate_participants = false
//! ```
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct App {
    #[serde(default = "default_level")]
    pub level: String,
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}

#[derive(Debug, Deserialize)]
pub struct Server {
    pub bind: Option<String>,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for Server {
    fn default() -> Self {
        Self {
            bind: None,
            port: default_port(),
        }
    }
}

fn default_port() -> u16 {
    3000
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    #[default]
    Memory,
    Sqlite(String),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    #[default]
    Memory,
    Redis,
}

#[derive(Debug, Deserialize)]
pub struct Cache {
    #[serde(default)]
    pub backend: CacheBackend,
    pub redis_url: Option<String>,
    #[serde(default = "default_ttl_seconds")]
    pub ttl_seconds: u64,
    #[serde(default)]
    pub invalidate_participants: bool,
}

impl Default for Cache {
    fn default() -> Self {
        Self {
            backend: CacheBackend::default(),
            redis_url: None,
            ttl_seconds: default_ttl_seconds(),
            invalidate_participants: false,
        }
    }
}

fn default_ttl_seconds() -> u64 {
    5
}

#[derive(Debug, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub app: App,
    #[serde(default)]
    pub server: Server,
    #[serde(default)]
    pub database: Database,
    #[serde(default)]
    pub cache: Cache,
}

impl Settings {
    pub fn new(path: &str) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(Environment::with_prefix("SPLITTER").separator("__"))
            .build()?;

        Self::from_config(settings)
    }

    fn from_config(config: Config) -> Result<Self, ConfigError> {
        let settings: Self = config.try_deserialize()?;
        if settings.cache.ttl_seconds == 0 {
            return Err(ConfigError::Message(
                "cache.ttl_seconds must be at least 1".to_string(),
            ));
        }
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use config::FileFormat;

    use super::*;

    fn try_parse(toml: &str) -> Result<Settings, ConfigError> {
        let config = Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()?;
        Settings::from_config(config)
    }

    fn parse(toml: &str) -> Settings {
        try_parse(toml).unwrap()
    }

    #[test]
    fn empty_file_uses_defaults() {
        let settings = parse("");
        assert_eq!(settings.app.level, "info");
        assert_eq!(settings.server.port, 3000);
        assert!(matches!(settings.database, Database::Memory));
        assert_eq!(settings.cache.backend, CacheBackend::Memory);
        assert_eq!(settings.cache.ttl_seconds, 5);
        assert!(!settings.cache.invalidate_participants);
    }

    #[test]
    fn full_file() {
        let settings = parse(
            r#"
            [app]
            level = "debug"

            [server]
            bind = "0.0.0.0"
            port = 8080

            [database]
            sqlite = "splitter.db"

            [cache]
            backend = "redis"
            redis_url = "redis://127.0.0.1/"
            ttl_seconds = 30
            invalidate_participants = true
            "#,
        );
        assert_eq!(settings.app.level, "debug");
        assert_eq!(settings.server.bind.as_deref(), Some("0.0.0.0"));
        assert_eq!(settings.server.port, 8080);
        assert!(matches!(settings.database, Database::Sqlite(ref path) if path == "splitter.db"));
        assert_eq!(settings.cache.backend, CacheBackend::Redis);
        assert_eq!(settings.cache.redis_url.as_deref(), Some("redis://127.0.0.1/"));
        assert_eq!(settings.cache.ttl_seconds, 30);
        assert!(settings.cache.invalidate_participants);
    }

    #[test]
    fn memory_database_as_plain_string() {
        let settings = parse(r#"database = "memory""#);
        assert!(matches!(settings.database, Database::Memory));
    }

    #[test]
    fn zero_ttl_is_rejected() {
        let err = try_parse(
            r#"
            [cache]
            ttl_seconds = 0
            "#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("ttl_seconds"), "{err}");
    }
}
