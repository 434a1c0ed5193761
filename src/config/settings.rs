//! Application settings and configuration structures.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// Root configuration structure containing all application settings.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Server configuration (host, port)
    pub server: ServerSettings,

    /// Database configuration (PostgreSQL)
    pub database: DatabaseSettings,

    /// Background event queue
    pub events: EventSettings,

    /// List endpoint paging limits
    pub pagination: PaginationSettings,

    /// CORS configuration
    pub cors: CorsSettings,

    /// Current environment (development, staging, production)
    pub environment: String,
}

/// Server binding configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    /// Host address to bind to (e.g., "0.0.0.0")
    pub host: String,

    /// Port number to listen on
    pub port: u16,
}

/// PostgreSQL database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    /// Database connection URL
    pub url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of connections to maintain
    pub min_connections: u32,

    /// Connection acquire timeout in seconds
    pub acquire_timeout: u64,

    /// Apply pending migrations at startup
    pub run_migrations: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventSettings {
    /// Bounded queue size; producers wait once it is full
    pub queue_capacity: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PaginationSettings {
    /// Page size used when a request gives no `limit`
    pub default_limit: i64,

    /// Largest page size a request may ask for
    pub max_limit: i64,
}

/// CORS configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CorsSettings {
    /// Allowed origins (comma-separated in env)
    pub allowed_origins: Vec<String>,
}

impl Settings {
    /// Load settings from environment variables and configuration files.
    ///
    /// The loading order is:
    /// 1. config/default.toml (base configuration)
    /// 2. config/{RUN_ENV}.toml (environment-specific overrides)
    /// 3. Environment variables (highest priority)
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if configuration cannot be loaded or parsed,
    /// or if the paging limits are inconsistent.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let environment = std::env::var("RUN_ENV").unwrap_or_else(|_| "development".into());

        Config::builder()
            .set_default("environment", environment.clone())?
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 2)?
            .set_default("database.acquire_timeout", 30)?
            .set_default("database.run_migrations", true)?
            .set_default("events.queue_capacity", 100)?
            .set_default("pagination.default_limit", 20)?
            .set_default("pagination.max_limit", 100)?
            .set_default("cors.allowed_origins", vec!["http://localhost:3000"])?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // APP__SERVER__PORT=3000 -> server.port = 3000
            .add_source(
                Environment::default()
                    .prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("server.host", std::env::var("SERVER_HOST").ok())?
            .set_override_option("server.port", std::env::var("SERVER_PORT").ok())?
            .set_override_option("database.url", std::env::var("DATABASE_URL").ok())?
            .build()?
            .try_deserialize()
            .and_then(|settings: Self| {
                settings.validate()?;
                Ok(settings)
            })
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.events.queue_capacity == 0 {
            return Err(ConfigError::Message(
                "events.queue_capacity must be greater than zero".into(),
            ));
        }
        if self.pagination.default_limit < 1 || self.pagination.max_limit < self.pagination.default_limit {
            return Err(ConfigError::Message(format!(
                "pagination limits are inconsistent: default {} / max {}",
                self.pagination.default_limit, self.pagination.max_limit
            )));
        }
        Ok(())
    }

    /// Get the full server address as a string.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl PaginationSettings {
    /// Resolve a requested page size: missing means default, anything above
    /// the maximum is clamped, and `-1` stays unbounded.
    pub fn resolve_limit(&self, requested: Option<i64>) -> i64 {
        match requested {
            None => self.default_limit,
            Some(-1) => -1,
            Some(limit) => limit.min(self.max_limit),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn pagination() -> PaginationSettings {
        PaginationSettings {
            default_limit: 20,
            max_limit: 100,
        }
    }

    #[test_case(None, 20 ; "missing uses default")]
    #[test_case(Some(5), 5 ; "within bounds")]
    #[test_case(Some(500), 100 ; "clamped to max")]
    #[test_case(Some(-1), -1 ; "unbounded")]
    #[test_case(Some(-7), -7 ; "invalid passes through")]
    fn test_resolve_limit(requested: Option<i64>, expected: i64) {
        assert_eq!(pagination().resolve_limit(requested), expected);
    }

    #[test]
    fn test_validate_rejects_zero_capacity() {
        let settings = Settings {
            server: ServerSettings {
                host: "127.0.0.1".into(),
                port: 0,
            },
            database: DatabaseSettings {
                url: "postgres://localhost/institute".into(),
                max_connections: 1,
                min_connections: 1,
                acquire_timeout: 1,
                run_migrations: false,
            },
            events: EventSettings { queue_capacity: 0 },
            pagination: pagination(),
            cors: CorsSettings {
                allowed_origins: vec![],
            },
            environment: "test".into(),
        };
        assert!(settings.validate().is_err());
        assert_eq!(settings.server_addr(), "127.0.0.1:0");
    }
}
