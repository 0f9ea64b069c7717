//! Descriptive statistics and Pearson correlation over numeric columns.

use crate::error::AnalyticsError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

pub use core_types::StdDenominator;

/// First quartile, median and third quartile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quartiles {
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryStatistics {
    pub count: usize,
    pub mean: Option<f64>,
    /// `None` for an empty column, or a single value under the sample denominator.
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub quartiles: Option<Quartiles>,
}

/// Count, mean, standard deviation, extremes and quartiles of a column.
pub fn summary_statistics(values: &[f64], denominator: StdDenominator) -> SummaryStatistics {
    let count = values.len();
    if count == 0 {
        return SummaryStatistics {
            count,
            mean: None,
            std: None,
            min: None,
            max: None,
            quartiles: None,
        };
    }

    let mean = values.iter().sum::<f64>() / count as f64;
    let squared_deviations: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
    let divisor = match denominator {
        StdDenominator::Sample => count.saturating_sub(1),
        StdDenominator::Population => count,
    };
    let std = (divisor > 0).then(|| (squared_deviations / divisor as f64).sqrt());

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    SummaryStatistics {
        count,
        mean: Some(mean),
        std,
        min: sorted.first().copied(),
        max: sorted.last().copied(),
        quartiles: Some(Quartiles {
            q1: quantile_sorted(&sorted, 0.25),
            median: quantile_sorted(&sorted, 0.5),
            q3: quantile_sorted(&sorted, 0.75),
        }),
    }
}

/// Quantile of a sorted, non-empty slice, interpolating linearly between closest ranks.
fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    let position = q * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * fraction
}

/// A named numeric column, the unit of input for correlation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub values: Vec<f64>,
}

impl Column {
    pub fn new(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }
}

/// Pairwise Pearson coefficients, indexed in the order the columns were given.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    /// `values[i][j]` correlates `columns[i]` with `columns[j]`.
    pub values: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    /// The coefficient for a pair of columns.
    ///
    /// `None` if either name is unknown or the correlation is undefined.
    pub fn coefficient(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.columns.iter().position(|c| c == a)?;
        let j = self.columns.iter().position(|c| c == b)?;
        self.values[i][j]
    }
}

/// Pearson correlation between every pair of columns, the diagonal included.
///
/// Entries involving a constant column (zero variance) are `None`.
pub fn correlation_matrix(columns: &[Column]) -> Result<CorrelationMatrix, AnalyticsError> {
    let mut seen = HashSet::new();
    for column in columns {
        if !seen.insert(column.name.as_str()) {
            return Err(AnalyticsError::DuplicateColumn(column.name.clone()));
        }
    }
    if let Some(first) = columns.first() {
        let expected = first.values.len();
        if let Some(bad) = columns.iter().find(|c| c.values.len() != expected) {
            return Err(AnalyticsError::LengthMismatch {
                column: bad.name.clone(),
                expected,
                actual: bad.values.len(),
            });
        }
    }

    let k = columns.len();
    let centered: Vec<Option<Vec<f64>>> = columns.iter().map(|c| centered(&c.values)).collect();
    let mut values = vec![vec![None; k]; k];

    // Fill the upper triangle and mirror it so the matrix is exactly symmetric.
    for i in 0..k {
        for j in i..k {
            let r = match (&centered[i], &centered[j]) {
                (Some(_), Some(_)) if i == j => Some(1.0),
                (Some(a), Some(b)) => Some(pearson(a, b)),
                _ => None,
            };
            values[i][j] = r;
            values[j][i] = r;
        }
    }

    Ok(CorrelationMatrix {
        columns: columns.iter().map(|c| c.name.clone()).collect(),
        values,
    })
}

/// Deviations from the mean, or `None` if the column cannot vary.
fn centered(values: &[f64]) -> Option<Vec<f64>> {
    let first = *values.first()?;
    if values.len() < 2 || values.iter().all(|&v| v == first) {
        return None;
    }
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    Some(values.iter().map(|v| v - mean).collect())
}

fn pearson(a: &[f64], b: &[f64]) -> f64 {
    let covariance: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f64>().sqrt();
    let norm_b = b.iter().map(|y| y * y).sum::<f64>().sqrt();
    (covariance / (norm_a * norm_b)).clamp(-1.0, 1.0)
}
