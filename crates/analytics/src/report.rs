use crate::aggregation::CategoryRecord;
use crate::series::DerivedSalesRecord;
use crate::statistics::{CorrelationMatrix, SummaryStatistics};
use chrono::NaiveDate;
use core_types::{DeliveryLocation, LoadingTimeWeight, OrderAccuracy, SalesField};
use serde::{Deserialize, Serialize};

pub use core_types::DeltaMode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TileUnit {
    Currency,
    Ratio,
    Days,
}

/// A headline number with its period-over-period delta.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricTile {
    pub id: String,
    pub label: String,
    pub unit: TileUnit,
    pub value: Option<f64>,
    /// Fractional change (`0.1` is +10%); `None` when it cannot be computed.
    pub delta: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub date: NaiveDate,
    pub value: Option<f64>,
}

/// A trailing moving average of one sales column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovingAverageSeries {
    pub field: SalesField,
    pub window: usize,
    pub points: Vec<SeriesPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnStatistics {
    pub field: SalesField,
    #[serde(flatten)]
    pub statistics: SummaryStatistics,
}

/// Orders per delivery status, plus the total shown in the middle of the donut.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusBreakdown {
    pub statuses: Vec<CategoryRecord>,
    pub total_orders: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryToSalesRow {
    pub month: String,
    pub inventory: i64,
    pub sales: i64,
    /// Inventory over sales. `None` when sales is zero.
    pub ratio: Option<f64>,
}

/// Everything the dashboard page renders, as plain tables.
///
/// This struct is the final output of the `AnalyticsEngine` and the data transfer
/// object handed to the web server and the terminal report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardReport {
    pub range: DateRange,
    pub tiles: Vec<MetricTile>,
    pub sales: Vec<DerivedSalesRecord>,
    pub moving_averages: Vec<MovingAverageSeries>,
    pub statistics: Vec<ColumnStatistics>,
    pub correlation: CorrelationMatrix,
    pub delivery_status: StatusBreakdown,
    pub order_accuracy: Vec<OrderAccuracy>,
    pub inventory_to_sales: Vec<InventoryToSalesRow>,
    pub loading_time_weight: Vec<LoadingTimeWeight>,
    pub delivery_locations: Vec<DeliveryLocation>,
}

impl DashboardReport {
    pub fn tile(&self, id: &str) -> Option<&MetricTile> {
        self.tiles.iter().find(|t| t.id == id)
    }
}
