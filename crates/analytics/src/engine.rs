use crate::aggregation::{GroupOrder, Measure, aggregate_by_category, total};
use crate::error::AnalyticsError;
use crate::report::{
    ColumnStatistics, DashboardReport, DateRange, DeltaMode, InventoryToSalesRow, MetricTile,
    MovingAverageSeries, SeriesPoint, StatusBreakdown, TileUnit,
};
use crate::series::{
    DerivedSalesRecord, column, derive_columns, filter_by_range, mean_defined, moving_average,
    percent_change_sparse, safe_ratio,
};
use crate::statistics::{Column, CorrelationMatrix, correlation_matrix, summary_statistics};
use chrono::NaiveDate;
use core_types::{DashboardSnapshot, DeliveryStatus, InventoryToSales, SalesField, SalesRecord};

pub use core_types::DashboardOptions;

/// A stateless calculator that turns a snapshot of raw tables into the dashboard's figures.
#[derive(Debug, Default, Clone)]
pub struct AnalyticsEngine {
    options: DashboardOptions,
}

impl AnalyticsEngine {
    pub fn new(options: DashboardOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &DashboardOptions {
        &self.options
    }

    /// The main entry point: computes every dashboard figure for `[start, end]`.
    ///
    /// # Arguments
    ///
    /// * `snapshot` - All raw tables, as loaded from the data source.
    /// * `start`, `end` - Inclusive date range applied to the daily sales series.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `DashboardReport` or an `AnalyticsError` for an
    /// inverted range or an invalid moving-average window.
    pub fn build_dashboard(
        &self,
        snapshot: &DashboardSnapshot,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<DashboardReport, AnalyticsError> {
        let sales = filter_by_range(&snapshot.sales, start, end)?;
        tracing::debug!(
            rows = sales.len(),
            total = snapshot.sales.len(),
            %start,
            %end,
            "Filtered sales series to range"
        );
        if sales.is_empty() {
            tracing::warn!(%start, %end, "No sales records in range; tiles will be empty");
        }

        let window = self.options.moving_average_window;
        let moving_averages = vec![
            self.moving_average_series(&sales, SalesField::Sales, window)?,
            self.moving_average_series(&sales, SalesField::Revenue, window)?,
        ];

        Ok(DashboardReport {
            range: DateRange { start, end },
            tiles: self.tiles(&sales),
            moving_averages,
            statistics: self.column_statistics(&sales),
            correlation: self.sales_correlation(&sales)?,
            sales: derive_columns(&sales),
            delivery_status: self.status_breakdown(&snapshot.delivery_status),
            order_accuracy: snapshot.order_accuracy.clone(),
            inventory_to_sales: self.inventory_to_sales(&snapshot.inventory_to_sales),
            loading_time_weight: snapshot.loading_time_weight.clone(),
            delivery_locations: snapshot.delivery_locations.clone(),
        })
    }

    /// Filters the sales series to a range and adds the derived columns.
    pub fn sales_in_range(
        &self,
        records: &[SalesRecord],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DerivedSalesRecord>, AnalyticsError> {
        let filtered = filter_by_range(records, start, end)?;
        Ok(derive_columns(&filtered))
    }

    /// The four headline tiles: total sales, total expenses, net profit ratio and
    /// average delivery time, each with its delta.
    pub fn tiles(&self, records: &[SalesRecord]) -> Vec<MetricTile> {
        let derived = derive_columns(records);
        let dense = |field: SalesField| -> Vec<Option<f64>> {
            column(records, field).into_iter().map(Some).collect()
        };

        let sales = dense(SalesField::Sales);
        let expenses = dense(SalesField::Expenses);
        let ratios: Vec<Option<f64>> = derived.iter().map(|r| r.profit_ratio).collect();
        let delivery_times = dense(SalesField::DeliveryTime);

        vec![
            MetricTile {
                id: "total_sales".to_string(),
                label: "Total Sales".to_string(),
                unit: TileUnit::Currency,
                value: Some(sales.iter().flatten().sum()),
                delta: self.delta(&sales),
            },
            MetricTile {
                id: "total_expenses".to_string(),
                label: "Total Expenses".to_string(),
                unit: TileUnit::Currency,
                value: Some(expenses.iter().flatten().sum()),
                delta: self.delta(&expenses),
            },
            MetricTile {
                id: "net_profit_ratio".to_string(),
                label: "Net Profit Ratio".to_string(),
                unit: TileUnit::Ratio,
                value: mean_defined(&ratios),
                delta: self.delta(&ratios),
            },
            MetricTile {
                id: "average_delivery_time".to_string(),
                label: "Average Delivery Time".to_string(),
                unit: TileUnit::Days,
                value: mean_defined(&delivery_times),
                delta: self.delta(&delivery_times),
            },
        ]
    }

    /// Summarises a column's row-over-row changes according to the configured `DeltaMode`.
    pub fn delta(&self, values: &[Option<f64>]) -> Option<f64> {
        let changes = percent_change_sparse(values);
        match self.options.delta_mode {
            DeltaMode::LastRow => changes.last().copied().flatten(),
            DeltaMode::RangeMean => mean_defined(&changes),
        }
    }

    pub fn moving_average_series(
        &self,
        records: &[SalesRecord],
        field: SalesField,
        window: usize,
    ) -> Result<MovingAverageSeries, AnalyticsError> {
        let averages = moving_average(&column(records, field), window)?;
        let points = records
            .iter()
            .zip(averages)
            .map(|(r, value)| SeriesPoint {
                date: r.date,
                value,
            })
            .collect();

        Ok(MovingAverageSeries {
            field,
            window,
            points,
        })
    }

    /// Summary statistics for every sales column, revenue included.
    pub fn column_statistics(&self, records: &[SalesRecord]) -> Vec<ColumnStatistics> {
        SalesField::ALL
            .into_iter()
            .map(|field| ColumnStatistics {
                field,
                statistics: summary_statistics(
                    &column(records, field),
                    self.options.std_denominator,
                ),
            })
            .collect()
    }

    /// Pearson correlation across every sales column, revenue included.
    pub fn sales_correlation(
        &self,
        records: &[SalesRecord],
    ) -> Result<CorrelationMatrix, AnalyticsError> {
        let columns: Vec<Column> = SalesField::ALL
            .into_iter()
            .map(|field| Column::new(field.as_str(), column(records, field)))
            .collect();
        correlation_matrix(&columns)
    }

    /// Orders per delivery status, in the order the statuses were recorded.
    pub fn status_breakdown(&self, statuses: &[DeliveryStatus]) -> StatusBreakdown {
        let measures = [Measure::sum("orders", |s: &DeliveryStatus| s.orders as f64)];
        let groups = aggregate_by_category(
            statuses,
            |s: &DeliveryStatus| s.status.as_str(),
            &measures,
            GroupOrder::FirstSeen,
        );
        let total_orders = total(&groups, "orders");
        StatusBreakdown {
            statuses: groups,
            total_orders,
        }
    }

    pub fn inventory_to_sales(&self, rows: &[InventoryToSales]) -> Vec<InventoryToSalesRow> {
        rows.iter()
            .map(|row| InventoryToSalesRow {
                month: row.month.clone(),
                inventory: row.inventory,
                sales: row.sales,
                ratio: safe_ratio(row.inventory as f64, row.sales as f64),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 1, d).unwrap()
    }

    fn record(d: u32, sales: i64, net_profit: i64, expenses: i64, delivery_time: f64) -> SalesRecord {
        SalesRecord {
            date: day(d),
            sales,
            deliveries: 60 + d as i64,
            net_profit,
            expenses,
            delivery_time,
        }
    }

    fn snapshot() -> DashboardSnapshot {
        DashboardSnapshot {
            sales: vec![
                record(1, 1000, 500, 200, 2.0),
                record(2, 2000, 800, 400, 3.0),
                record(3, 1500, 600, 300, 4.0),
                record(4, 4000, 1000, 1000, 1.0),
            ],
            delivery_status: vec![
                DeliveryStatus { status: "Delivered".to_string(), orders: 450 },
                DeliveryStatus { status: "In Transit".to_string(), orders: 120 },
                DeliveryStatus { status: "Cancelled".to_string(), orders: 30 },
            ],
            inventory_to_sales: vec![
                InventoryToSales { month: "Jan".to_string(), inventory: 10000, sales: 2500 },
                InventoryToSales { month: "Feb".to_string(), inventory: 8000, sales: 0 },
            ],
            ..Default::default()
        }
    }

    #[test]
    fn dashboard_for_the_first_three_days() {
        let engine = AnalyticsEngine::new(DashboardOptions {
            moving_average_window: 2,
            ..Default::default()
        });
        let report = engine.build_dashboard(&snapshot(), day(1), day(3)).unwrap();

        assert_eq!(report.sales.len(), 3);
        let revenue: Vec<f64> = report.sales.iter().map(|r| r.revenue).collect();
        assert_eq!(revenue, vec![800.0, 1600.0, 1200.0]);

        let sales_tile = report.tile("total_sales").unwrap();
        assert_eq!(sales_tile.value, Some(4500.0));
        assert_abs_diff_eq!(sales_tile.delta.unwrap(), -0.25);

        let ratio_tile = report.tile("net_profit_ratio").unwrap();
        assert_abs_diff_eq!(ratio_tile.value.unwrap(), (0.5 + 0.4 + 0.4) / 3.0);
        assert_abs_diff_eq!(ratio_tile.delta.unwrap(), 0.0);

        let time_tile = report.tile("average_delivery_time").unwrap();
        assert_abs_diff_eq!(time_tile.value.unwrap(), 3.0);
        assert_abs_diff_eq!(time_tile.delta.unwrap(), 1.0 / 3.0);

        let sales_ma = &report.moving_averages[0];
        assert_eq!(sales_ma.field, SalesField::Sales);
        assert_eq!(sales_ma.points[0].value, None);
        assert_abs_diff_eq!(sales_ma.points[1].value.unwrap(), 1500.0);
        assert_abs_diff_eq!(sales_ma.points[2].value.unwrap(), 1750.0);

        assert_eq!(report.statistics.len(), SalesField::ALL.len());
        assert_eq!(report.correlation.coefficient("sales", "sales"), Some(1.0));
        assert_abs_diff_eq!(
            report.correlation.coefficient("sales", "revenue").unwrap(),
            1.0,
            epsilon = 1e-9
        );

        assert_eq!(report.delivery_status.total_orders, 600.0);
        assert_eq!(report.inventory_to_sales[0].ratio, Some(4.0));
        assert_eq!(report.inventory_to_sales[1].ratio, None);
    }

    #[test]
    fn range_mean_delta_averages_every_step() {
        let engine = AnalyticsEngine::new(DashboardOptions {
            delta_mode: DeltaMode::RangeMean,
            ..Default::default()
        });
        let delta = engine.delta(&[Some(1000.0), Some(2000.0), Some(1500.0)]);
        assert_abs_diff_eq!(delta.unwrap(), (1.0 - 0.25) / 2.0);
    }

    #[test]
    fn an_empty_range_yields_empty_tiles() {
        let engine = AnalyticsEngine::default();
        let report = engine.build_dashboard(&snapshot(), day(20), day(25)).unwrap();

        assert!(report.sales.is_empty());
        let sales_tile = report.tile("total_sales").unwrap();
        assert_eq!(sales_tile.value, Some(0.0));
        assert_eq!(sales_tile.delta, None);
        assert_eq!(report.tile("average_delivery_time").unwrap().value, None);
        assert_eq!(report.correlation.coefficient("sales", "sales"), None);
    }

    #[test]
    fn invalid_arguments_abort_the_dashboard() {
        let engine = AnalyticsEngine::default();
        assert!(matches!(
            engine.build_dashboard(&snapshot(), day(3), day(1)),
            Err(AnalyticsError::InvalidRange { .. })
        ));

        let zero_window = AnalyticsEngine::new(DashboardOptions {
            moving_average_window: 0,
            ..Default::default()
        });
        assert_eq!(
            zero_window.build_dashboard(&snapshot(), day(1), day(3)),
            Err(AnalyticsError::InvalidWindow(0))
        );
    }
}
