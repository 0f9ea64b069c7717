use crate::error::ConfigError;
use core_types::{DashboardOptions, DeltaMode, StdDenominator};
use chrono::NaiveDate;
use serde::Deserialize;
use std::net::SocketAddr;

/// The root configuration structure for the entire application.
///
/// Every section is optional in `config.toml`; missing sections fall back to
/// the defaults below.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub database: DatabaseSettings,
    pub dashboard: DashboardSettings,
    pub sample_data: SampleDataSettings,
    pub server: ServerSettings,
}

impl Config {
    /// Rejects settings that would make every later step fail.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database.max_connections == 0 {
            return Err(ConfigError::ValidationError(
                "database.max_connections must be at least 1".to_string(),
            ));
        }
        self.dashboard.validate()?;
        if self.sample_data.days == 0 {
            return Err(ConfigError::ValidationError(
                "sample_data.days must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Where the SQLite file lives and how many connections the pool may open.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    /// An sqlx connection string, e.g. `sqlite://database.sqlite`.
    pub url: String,
    pub max_connections: u32,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            url: "sqlite://database.sqlite".to_string(),
            max_connections: 5,
        }
    }
}

/// Parameters for a dashboard computation run.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DashboardSettings {
    /// The default start of the selected date range.
    pub start_date: NaiveDate,
    /// The default end of the selected date range (inclusive).
    pub end_date: NaiveDate,
    pub moving_average_window: usize,
    /// "sample" (n - 1) or "population" (n).
    pub std_denominator: StdDenominator,
    /// "last_row" or "range_mean".
    pub delta_mode: DeltaMode,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        let options = DashboardOptions::default();
        Self {
            start_date: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap_or_default(),
            end_date: NaiveDate::from_ymd_opt(2023, 4, 10).unwrap_or_default(),
            moving_average_window: options.moving_average_window,
            std_denominator: options.std_denominator,
            delta_mode: options.delta_mode,
        }
    }
}

impl DashboardSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.moving_average_window == 0 {
            return Err(ConfigError::ValidationError(
                "dashboard.moving_average_window must be at least 1".to_string(),
            ));
        }
        if self.start_date > self.end_date {
            return Err(ConfigError::ValidationError(format!(
                "dashboard.start_date ({}) is after dashboard.end_date ({})",
                self.start_date, self.end_date
            )));
        }
        Ok(())
    }

    /// The engine options these settings describe.
    pub fn options(&self) -> DashboardOptions {
        DashboardOptions {
            moving_average_window: self.moving_average_window,
            std_denominator: self.std_denominator,
            delta_mode: self.delta_mode,
        }
    }
}

/// Parameters for the seeded sample-data generator.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SampleDataSettings {
    /// The same seed always yields the same snapshot.
    pub seed: u64,
    /// First day of the daily series; the twelve months start at its month.
    pub start_date: NaiveDate,
    /// Number of daily sales records.
    pub days: usize,
}

impl Default for SampleDataSettings {
    fn default() -> Self {
        Self {
            seed: 42,
            start_date: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap_or_default(),
            days: 100,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

impl ServerSettings {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| {
                ConfigError::ValidationError(format!(
                    "invalid server address {}:{}: {}",
                    self.host, self.port, e
                ))
            })
    }
}

/// Command-line overrides for the dashboard date range.
#[cfg_attr(feature = "clap", derive(clap::Args))]
#[derive(Debug, Clone, Default)]
pub struct DateRangeArgs {
    /// Start of the date range (format: YYYY-MM-DD).
    #[cfg_attr(feature = "clap", arg(long))]
    pub from: Option<NaiveDate>,

    /// End of the date range, inclusive (format: YYYY-MM-DD).
    #[cfg_attr(feature = "clap", arg(long))]
    pub to: Option<NaiveDate>,
}

impl DateRangeArgs {
    /// Resolves the range, falling back to the configured defaults for missing bounds.
    pub fn resolve(&self, dashboard: &DashboardSettings) -> (NaiveDate, NaiveDate) {
        (
            self.from.unwrap_or(dashboard.start_date),
            self.to.unwrap_or(dashboard.end_date),
        )
    }
}
