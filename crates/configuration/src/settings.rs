use serde::Deserialize;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigError;

/// The root configuration structure for the entire application.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub market: MarketSettings,
    pub logging: LoggingSettings,
}

/// Where the REST API listens.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: IpAddr,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: IpAddr::from([0, 0, 0, 0]),
            port: 5000,
        }
    }
}

impl ServerSettings {
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

/// PostgreSQL connection pool settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    /// Connection string. Falls back to the `DATABASE_URL` environment variable when unset.
    pub url: Option<String>,
    pub max_connections: u32,
    pub acquire_timeout_ms: u64,
    pub idle_timeout_ms: u64,
    /// Apply pending migrations on startup.
    pub run_migrations: bool,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: 20,
            acquire_timeout_ms: 2_000,
            idle_timeout_ms: 30_000,
            run_migrations: true,
        }
    }
}

impl DatabaseSettings {
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_millis(self.acquire_timeout_ms)
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_millis(self.idle_timeout_ms)
    }
}

/// Defaults for the market data endpoints.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MarketSettings {
    /// Days of history returned when a request does not say.
    pub default_history_days: u32,
    /// Upper bound on the `days` a request may ask for.
    pub max_history_days: u32,
    pub sma_short_period: usize,
    pub sma_long_period: usize,
}

impl Default for MarketSettings {
    fn default() -> Self {
        Self {
            default_history_days: 30,
            max_history_days: 3_650,
            sma_short_period: 20,
            sma_long_period: 50,
        }
    }
}

impl MarketSettings {
    /// Resolves a requested history length: the default when absent, clamped to `[1, max]`.
    pub fn history_days(&self, requested: Option<u32>) -> u32 {
        requested
            .unwrap_or(self.default_history_days)
            .clamp(1, self.max_history_days.max(1))
    }
}

/// How log lines are rendered on stdout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum LogFormat {
    #[default]
    Full,
    Compact,
    Pretty,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Default filter directive; `RUST_LOG` takes precedence.
    pub level: String,
    pub format: LogFormat,
    /// When set, logs are also written to a daily rolling file in this directory.
    pub directory: Option<PathBuf>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
            directory: None,
        }
    }
}

impl Config {
    /// Checks cross-field constraints that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::ValidationError(
                "server.port must be non-zero".to_string(),
            ));
        }
        if self.database.max_connections == 0 {
            return Err(ConfigError::ValidationError(
                "database.max_connections must be at least 1".to_string(),
            ));
        }

        let market = &self.market;
        if market.default_history_days == 0 {
            return Err(ConfigError::ValidationError(
                "market.default_history_days must be at least 1".to_string(),
            ));
        }
        if market.default_history_days > market.max_history_days {
            return Err(ConfigError::ValidationError(format!(
                "market.default_history_days ({}) exceeds market.max_history_days ({})",
                market.default_history_days, market.max_history_days
            )));
        }
        if market.sma_short_period == 0 || market.sma_short_period >= market.sma_long_period {
            return Err(ConfigError::ValidationError(format!(
                "market.sma_short_period ({}) must be positive and below market.sma_long_period ({})",
                market.sma_short_period, market.sma_long_period
            )));
        }
        Ok(())
    }
}
