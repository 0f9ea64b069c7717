//! Row- and column-level transforms over the daily sales series.
//!
//! Every function here is pure: inputs are borrowed, outputs are freshly
//! allocated, and an undefined value is reported as `None` rather than NaN.

use crate::error::AnalyticsError;
use chrono::NaiveDate;
use core_types::{SalesField, SalesRecord, Timestamped};
use serde::{Deserialize, Serialize};

/// A sales record together with the columns derived from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedSalesRecord {
    #[serde(flatten)]
    pub record: SalesRecord,
    /// Sales minus expenses.
    pub revenue: f64,
    /// Net profit over sales. `None` when sales is zero.
    pub profit_ratio: Option<f64>,
}

/// Returns the records whose timestamp lies in `[start, end]`, in their original order.
///
/// An inverted range is rejected rather than swapped. An empty result is not an error.
pub fn filter_by_range<R>(
    records: &[R],
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<R>, AnalyticsError>
where
    R: Timestamped + Clone,
{
    if start > end {
        return Err(AnalyticsError::InvalidRange { start, end });
    }

    Ok(records
        .iter()
        .filter(|r| {
            let ts = r.timestamp();
            ts >= start && ts <= end
        })
        .cloned()
        .collect())
}

/// Adds revenue and profit ratio to every record.
pub fn derive_columns(records: &[SalesRecord]) -> Vec<DerivedSalesRecord> {
    records
        .iter()
        .map(|record| DerivedSalesRecord {
            revenue: record.value(SalesField::Revenue),
            profit_ratio: safe_ratio(record.net_profit as f64, record.sales as f64),
            record: record.clone(),
        })
        .collect()
}

/// `numerator / denominator`, or `None` when the denominator is zero.
pub fn safe_ratio(numerator: f64, denominator: f64) -> Option<f64> {
    if denominator == 0.0 {
        None
    } else {
        Some(numerator / denominator)
    }
}

/// Extracts one named column from the sales series.
pub fn column(records: &[SalesRecord], field: SalesField) -> Vec<f64> {
    records.iter().map(|r| r.value(field)).collect()
}

/// Resolves a column name such as `"net_profit"` to its field.
pub fn parse_field(name: &str) -> Result<SalesField, AnalyticsError> {
    name.parse::<SalesField>()
        .map_err(|_| AnalyticsError::UnknownField(name.to_string()))
}

/// Period-over-period fractional change. `0.25` means +25%.
///
/// The output has the same length as the input. The first position is `None`,
/// as is any position whose previous value is zero.
pub fn percent_change(values: &[f64]) -> Vec<Option<f64>> {
    let sparse: Vec<Option<f64>> = values.iter().copied().map(Some).collect();
    percent_change_sparse(&sparse)
}

/// Like [`percent_change`], for a column that already carries sentinels.
///
/// A `None` on either side of a step yields `None` for that step.
pub fn percent_change_sparse(values: &[Option<f64>]) -> Vec<Option<f64>> {
    let mut changes = Vec::with_capacity(values.len());
    if values.is_empty() {
        return changes;
    }

    changes.push(None);
    for pair in values.windows(2) {
        let change = match (pair[0], pair[1]) {
            (Some(prev), Some(curr)) => safe_ratio(curr - prev, prev),
            _ => None,
        };
        changes.push(change);
    }
    changes
}

/// Trailing arithmetic mean over `window` values.
///
/// Positions before the window is first filled are `None`.
pub fn moving_average(values: &[f64], window: usize) -> Result<Vec<Option<f64>>, AnalyticsError> {
    if window == 0 {
        return Err(AnalyticsError::InvalidWindow(window));
    }

    let mut sum = CompensatedSum::default();
    Ok(values
        .iter()
        .enumerate()
        .map(|(i, &v)| {
            sum.add(v);
            if i >= window {
                sum.add(-values[i - window]);
            }
            if i + 1 >= window {
                Some(sum.value() / window as f64)
            } else {
                None
            }
        })
        .collect())
}

/// Running sum with Neumaier compensation.
///
/// A value that slides out of the window is subtracted exactly, so one large
/// outlier does not leave rounding error in every later average.
#[derive(Debug, Default)]
struct CompensatedSum {
    sum: f64,
    compensation: f64,
}

impl CompensatedSum {
    fn add(&mut self, x: f64) {
        let t = self.sum + x;
        if self.sum.abs() >= x.abs() {
            self.compensation += (self.sum - t) + x;
        } else {
            self.compensation += (x - t) + self.sum;
        }
        self.sum = t;
    }

    fn value(&self) -> f64 {
        self.sum + self.compensation
    }
}

/// Mean of the defined values, `None` if there are none.
pub fn mean_defined(values: &[Option<f64>]) -> Option<f64> {
    let defined: Vec<f64> = values.iter().flatten().copied().collect();
    if defined.is_empty() {
        None
    } else {
        Some(defined.iter().sum::<f64>() / defined.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 1, d).unwrap()
    }

    fn record(d: u32, sales: i64, expenses: i64) -> SalesRecord {
        SalesRecord {
            date: day(d),
            sales,
            deliveries: 100,
            net_profit: sales / 2,
            expenses,
            delivery_time: 2.0,
        }
    }

    fn three_days() -> Vec<SalesRecord> {
        vec![
            record(1, 1000, 200),
            record(2, 2000, 400),
            record(3, 1500, 300),
        ]
    }

    #[test]
    fn revenue_and_percent_change_for_three_days() {
        let records = three_days();
        let derived = derive_columns(&records);
        let revenue: Vec<f64> = derived.iter().map(|r| r.revenue).collect();
        assert_eq!(revenue, vec![800.0, 1600.0, 1200.0]);

        let changes = percent_change(&column(&records, SalesField::Sales));
        assert_eq!(changes.len(), 3);
        assert_eq!(changes[0], None);
        assert_abs_diff_eq!(changes[1].unwrap(), 1.0);
        assert_abs_diff_eq!(changes[2].unwrap(), -0.25);
    }

    #[test]
    fn profit_ratio_is_none_when_sales_are_zero() {
        let derived = derive_columns(&[record(1, 0, 100), record(2, 1000, 100)]);
        assert_eq!(derived[0].profit_ratio, None);
        assert_abs_diff_eq!(derived[1].profit_ratio.unwrap(), 0.5);
    }

    #[test]
    fn percent_change_after_a_zero_is_undefined() {
        let changes = percent_change(&[5.0, 0.0, 3.0, 6.0]);
        assert_eq!(changes[1], Some(-1.0));
        assert_eq!(changes[2], None);
        assert_eq!(changes[3], Some(1.0));
    }

    #[test]
    fn percent_change_of_empty_and_single_inputs() {
        assert!(percent_change(&[]).is_empty());
        assert_eq!(percent_change(&[42.0]), vec![None]);
    }

    #[test]
    fn sparse_percent_change_propagates_gaps() {
        let changes = percent_change_sparse(&[Some(1.0), None, Some(2.0), Some(3.0)]);
        assert_eq!(changes, vec![None, None, None, Some(0.5)]);
    }

    #[test]
    fn moving_average_fills_after_the_window() {
        let averages = moving_average(&[1.0, 2.0, 3.0, 4.0, 5.0], 3).unwrap();
        assert_eq!(averages.len(), 5);
        assert_eq!(averages[0], None);
        assert_eq!(averages[1], None);
        assert_abs_diff_eq!(averages[2].unwrap(), 2.0);
        assert_abs_diff_eq!(averages[3].unwrap(), 3.0);
        assert_abs_diff_eq!(averages[4].unwrap(), 4.0);
    }

    #[test]
    fn moving_average_with_window_one_is_the_input() {
        let values = [3.5, -1.0, 8.25];
        let averages = moving_average(&values, 1).unwrap();
        for (avg, v) in averages.iter().zip(values) {
            assert_abs_diff_eq!(avg.unwrap(), v);
        }
    }

    #[test]
    fn moving_average_longer_than_the_series_is_all_sentinels() {
        let averages = moving_average(&[1.0, 2.0], 5).unwrap();
        assert_eq!(averages, vec![None, None]);
    }

    #[test]
    fn moving_average_recovers_after_a_large_outlier() {
        let averages = moving_average(&[1e17, 1.0, 1.0, 1.0], 2).unwrap();
        assert_eq!(averages[0], None);
        assert_abs_diff_eq!(averages[1].unwrap(), 5e16);
        assert_eq!(averages[2], Some(1.0));
        assert_eq!(averages[3], Some(1.0));

        let mixed = [1e16, 3.0, 5.0, 7.0, 1e16, 2.0, 4.0, 6.0];
        let averages = moving_average(&mixed, 2).unwrap();
        assert_eq!(averages[2], Some(4.0));
        assert_eq!(averages[3], Some(6.0));
        assert_eq!(averages[6], Some(3.0));
        assert_eq!(averages[7], Some(5.0));
    }

    #[test]
    fn moving_average_rejects_a_zero_window() {
        assert_eq!(
            moving_average(&[1.0, 2.0], 0),
            Err(AnalyticsError::InvalidWindow(0))
        );
    }

    #[test]
    fn filter_keeps_the_inclusive_range_in_order() {
        let records = three_days();
        let filtered = filter_by_range(&records, day(2), day(3)).unwrap();
        assert_eq!(filtered, records[1..].to_vec());

        let again = filter_by_range(&filtered, day(2), day(3)).unwrap();
        assert_eq!(again, filtered);
    }

    #[test]
    fn filter_with_no_matches_is_empty_not_an_error() {
        let filtered = filter_by_range(&three_days(), day(10), day(20)).unwrap();
        assert!(filtered.is_empty());
    }

    #[test]
    fn filter_rejects_an_inverted_range() {
        let err = filter_by_range(&three_days(), day(3), day(1)).unwrap_err();
        assert_eq!(
            err,
            AnalyticsError::InvalidRange {
                start: day(3),
                end: day(1)
            }
        );
    }

    #[test]
    fn unknown_columns_are_reported_by_name() {
        assert_eq!(parse_field("revenue"), Ok(SalesField::Revenue));
        assert_eq!(
            parse_field("volume"),
            Err(AnalyticsError::UnknownField("volume".to_string()))
        );
    }

    #[test]
    fn mean_ignores_sentinels() {
        assert_eq!(mean_defined(&[Some(1.0), None, Some(3.0)]), Some(2.0));
        assert_eq!(mean_defined(&[None, None]), None);
    }
}
