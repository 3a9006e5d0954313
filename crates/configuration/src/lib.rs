use crate::error::ConfigError;
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use settings::{
    Config, DatabaseSettings, LogFormat, LoggingSettings, MarketSettings, ServerSettings,
};

/// Prefix for environment overrides, e.g. `TICKERBOARD__SERVER__PORT=8080`.
pub const ENV_PREFIX: &str = "TICKERBOARD";

/// Loads the application configuration.
///
/// Values come from the TOML file at `path` (optional; every setting has a
/// default) overlaid by `TICKERBOARD__SECTION__KEY` environment variables.
/// The merged result is validated before it is returned.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let builder = config::Config::builder()
        .add_source(config::File::from(path).required(false))
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    // Attempt to deserialize the entire configuration into our `Config` struct
    let config = builder.try_deserialize::<Config>()?;
    config.validate()?;

    tracing::debug!(path = %path.display(), "Configuration loaded.");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempdir().unwrap();
        let config = load_config(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.database.max_connections, 20);
        assert_eq!(config.market.default_history_days, 30);
        assert_eq!(config.market.sma_long_period, 50);
        assert_eq!(config.logging.format, LogFormat::Full);
    }

    #[test]
    fn file_values_override_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
            [server]
            host = "127.0.0.1"
            port = 8080

            [market]
            default_history_days = 90
            sma_short_period = 10

            [logging]
            level = "debug"
            format = "compact"
            "#,
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.server.socket_addr().to_string(), "127.0.0.1:8080");
        assert_eq!(config.market.default_history_days, 90);
        assert_eq!(config.market.sma_short_period, 10);
        assert_eq!(config.market.sma_long_period, 50);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, LogFormat::Compact);
    }

    #[test]
    fn inverted_sma_periods_are_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[market]\nsma_short_period = 60\nsma_long_period = 50\n").unwrap();

        let err = load_config(&path).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn history_days_are_defaulted_and_clamped() {
        let market = MarketSettings::default();
        assert_eq!(market.history_days(None), 30);
        assert_eq!(market.history_days(Some(0)), 1);
        assert_eq!(market.history_days(Some(7)), 7);
        assert_eq!(market.history_days(Some(100_000)), 3_650);
    }
}
