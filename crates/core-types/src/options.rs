use serde::{Deserialize, Serialize};

/// Which denominator the standard deviation uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StdDenominator {
    /// n − 1 (Bessel's correction).
    #[default]
    Sample,
    /// n.
    Population,
}

/// How a tile's delta is summarised over the selected range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeltaMode {
    /// Change of the last row against the row before it.
    #[default]
    LastRow,
    /// Mean of every defined row-over-row change in the range.
    RangeMean,
}

/// Knobs that shape a dashboard computation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardOptions {
    pub moving_average_window: usize,
    /// Applied to every column of one run.
    pub std_denominator: StdDenominator,
    pub delta_mode: DeltaMode,
}

impl Default for DashboardOptions {
    fn default() -> Self {
        Self {
            moving_average_window: 7,
            std_denominator: StdDenominator::default(),
            delta_mode: DeltaMode::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_read_from_snake_case_names() {
        let options: DashboardOptions = serde_json::from_str(
            r#"{"moving_average_window":3,"std_denominator":"population","delta_mode":"range_mean"}"#,
        )
        .unwrap();
        assert_eq!(options.moving_average_window, 3);
        assert_eq!(options.std_denominator, StdDenominator::Population);
        assert_eq!(options.delta_mode, DeltaMode::RangeMean);
    }
}
