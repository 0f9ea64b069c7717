use crate::error::ConfigError;
use config::builder::DefaultState;
use config::{ConfigBuilder, Environment, File, FileFormat};
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use settings::{
    Config, DashboardSettings, DatabaseSettings, DateRangeArgs, SampleDataSettings, ServerSettings,
};

/// The file `load_config` reads when no path is given.
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Loads the application configuration from the `config.toml` file.
///
/// This function is the primary entry point for this crate. It reads the configuration file,
/// deserializes it into our strongly-typed `Config` struct, validates it, and returns it.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(Path::new(DEFAULT_CONFIG_PATH))
}

/// Loads configuration from `path`, layered with environment overrides.
///
/// Precedence, lowest first: built-in defaults, the TOML file (optional),
/// `DASHBOARD__SECTION__KEY` variables, and finally `DATABASE_URL` (a `.env`
/// file is honoured).
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    dotenvy::dotenv().ok();

    if !path.exists() {
        tracing::warn!(path = %path.display(), "Configuration file not found; using defaults");
    }

    let mut builder = config::Config::builder()
        .add_source(File::from(path).required(false))
        .add_source(
            Environment::with_prefix("DASHBOARD")
                .separator("__")
                .try_parsing(true),
        );

    if let Ok(url) = std::env::var("DATABASE_URL") {
        builder = builder.set_override("database.url", url)?;
    }

    finish(builder)
}

/// Parses configuration from TOML text alone, without consulting the environment.
pub fn parse_config(toml: &str) -> Result<Config, ConfigError> {
    finish(config::Config::builder().add_source(File::from_str(toml, FileFormat::Toml)))
}

fn finish(builder: ConfigBuilder<DefaultState>) -> Result<Config, ConfigError> {
    // Attempt to deserialize the entire configuration into our `Config` struct
    let config = builder.build()?.try_deserialize::<Config>()?;
    config.validate()?;
    tracing::debug!(?config, "Configuration loaded");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::{DeltaMode, StdDenominator};
    use chrono::NaiveDate;

    #[test]
    fn empty_file_yields_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config.database.url, "sqlite://database.sqlite");
        assert_eq!(config.dashboard.moving_average_window, 7);
        assert_eq!(config.dashboard.std_denominator, StdDenominator::Sample);
        assert_eq!(config.dashboard.delta_mode, DeltaMode::LastRow);
        assert_eq!(config.sample_data.seed, 42);
        assert_eq!(config.sample_data.days, 100);
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn sections_override_defaults() {
        let config = parse_config(
            r#"
            [dashboard]
            start_date = "2023-02-01"
            end_date = "2023-02-28"
            moving_average_window = 3
            std_denominator = "population"
            delta_mode = "range_mean"

            [server]
            host = "127.0.0.1"
            port = 8080
            "#,
        )
        .unwrap();

        assert_eq!(
            config.dashboard.start_date,
            NaiveDate::from_ymd_opt(2023, 2, 1).unwrap()
        );
        let options = config.dashboard.options();
        assert_eq!(options.moving_average_window, 3);
        assert_eq!(options.std_denominator, StdDenominator::Population);
        assert_eq!(options.delta_mode, DeltaMode::RangeMean);
        assert_eq!(
            config.server.socket_addr().unwrap().to_string(),
            "127.0.0.1:8080"
        );
    }

    #[test]
    fn zero_window_is_rejected() {
        let err = parse_config("[dashboard]\nmoving_average_window = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(msg) if msg.contains("moving_average_window")));
    }

    #[test]
    fn inverted_default_range_is_rejected() {
        let err = parse_config(
            "[dashboard]\nstart_date = \"2023-05-01\"\nend_date = \"2023-04-01\"\n",
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn command_line_dates_take_precedence() {
        let dashboard = DashboardSettings::default();
        let args = DateRangeArgs {
            from: NaiveDate::from_ymd_opt(2023, 3, 1),
            to: None,
        };
        let (start, end) = args.resolve(&dashboard);
        assert_eq!(start, NaiveDate::from_ymd_opt(2023, 3, 1).unwrap());
        assert_eq!(end, dashboard.end_date);
    }
}
