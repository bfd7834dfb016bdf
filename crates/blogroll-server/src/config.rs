//! Server configuration loaded from environment variables.
//!
//! All settings have sensible defaults so the server can start with zero
//! configuration for local development.

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

/// Where the SQLite database lives, derived from `DATABASE_URL`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseLocation {
    /// Platform data directory (`DATABASE_URL` unset).
    Default,
    /// Private in-memory database (`DATABASE_URL=:memory:`).
    InMemory,
    /// Explicit file path, with an optional `sqlite://` prefix stripped.
    File(PathBuf),
}

impl DatabaseLocation {
    pub fn parse(url: &str) -> Self {
        let url = url.trim();
        let path = url.strip_prefix("sqlite://").unwrap_or(url);
        if path.is_empty() {
            Self::Default
        } else if path == ":memory:" {
            Self::InMemory
        } else {
            Self::File(PathBuf::from(path))
        }
    }
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Database location.
    /// Env: `DATABASE_URL`
    /// Default: `blogroll.db` in the platform data directory.
    pub database: DatabaseLocation,

    /// Interface the HTTP listener binds to.
    /// Env: `HOST`
    /// Default: `0.0.0.0`
    pub host: IpAddr,

    /// Port the HTTP listener binds to.  `0` asks the OS for a free port.
    /// Env: `PORT`
    /// Default: `8080`
    pub port: u16,

    /// Maximum accepted request body size in bytes.
    /// Env: `MAX_BODY_SIZE`
    /// Default: 1 MiB
    pub max_body_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            database: DatabaseLocation::Default,
            host: IpAddr::from([0, 0, 0, 0]),
            port: 8080,
            max_body_size: 1024 * 1024, // 1 MiB
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary key lookup.  `from_env` is
    /// this with `std::env::var`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(url) = lookup("DATABASE_URL") {
            config.database = DatabaseLocation::parse(&url);
        }

        if let Some(host) = lookup("HOST") {
            match host.trim().parse::<IpAddr>() {
                Ok(parsed) => config.host = parsed,
                Err(_) => {
                    tracing::warn!(value = %host, "Invalid HOST, using default");
                }
            }
        }

        if let Some(port) = lookup("PORT") {
            match port.trim().parse::<u16>() {
                Ok(parsed) => config.port = parsed,
                Err(_) => {
                    tracing::warn!(value = %port, "Invalid PORT, using default");
                }
            }
        }

        if let Some(val) = lookup("MAX_BODY_SIZE") {
            if let Ok(n) = val.trim().parse::<usize>() {
                config.max_body_size = n;
            }
        }

        // RUST_LOG is handled directly by tracing-subscriber's EnvFilter,
        // so we do not store it here.

        config
    }

    /// Socket address for the HTTP listener.
    pub fn http_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// A configuration for tests: in-memory database, loopback, OS-chosen port.
    pub fn ephemeral() -> Self {
        Self {
            database: DatabaseLocation::InMemory,
            host: IpAddr::from([127, 0, 0, 1]),
            port: 0,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.http_addr(), ([0, 0, 0, 0], 8080).into());
        assert_eq!(config.database, DatabaseLocation::Default);
    }

    #[test]
    fn test_reads_database_url_and_port() {
        let config = ServerConfig::from_lookup(lookup_from(&[
            ("DATABASE_URL", "sqlite:///tmp/blog.db"),
            ("PORT", "3000"),
            ("HOST", "127.0.0.1"),
        ]));
        assert_eq!(
            config.database,
            DatabaseLocation::File(PathBuf::from("/tmp/blog.db"))
        );
        assert_eq!(config.http_addr(), ([127, 0, 0, 1], 3000).into());
    }

    #[test]
    fn test_invalid_port_keeps_default() {
        let config = ServerConfig::from_lookup(lookup_from(&[("PORT", "eighty")]));
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn test_database_location_parse() {
        assert_eq!(DatabaseLocation::parse(":memory:"), DatabaseLocation::InMemory);
        assert_eq!(
            DatabaseLocation::parse("sqlite://:memory:"),
            DatabaseLocation::InMemory
        );
        assert_eq!(DatabaseLocation::parse("  "), DatabaseLocation::Default);
        assert_eq!(
            DatabaseLocation::parse("blog.db"),
            DatabaseLocation::File(PathBuf::from("blog.db"))
        );
    }
}
