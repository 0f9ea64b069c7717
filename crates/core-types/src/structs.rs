use crate::enums::{SalesField, TableName};
use crate::error::CoreError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Anything positioned on the dashboard's time axis.
///
/// Range filtering only needs this, not the concrete record type.
pub trait Timestamped {
    fn timestamp(&self) -> NaiveDate;
}

/// One day of sales activity. This is the time series the metrics engine works on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct SalesRecord {
    pub date: NaiveDate,
    pub sales: i64,
    pub deliveries: i64,
    pub net_profit: i64,
    pub expenses: i64,
    /// Average delivery time for the day, in days.
    pub delivery_time: f64,
}

impl SalesRecord {
    /// Returns the value of a named column as `f64`.
    ///
    /// `Revenue` is derived on the fly (sales minus expenses).
    pub fn value(&self, field: SalesField) -> f64 {
        match field {
            SalesField::Sales => self.sales as f64,
            SalesField::Deliveries => self.deliveries as f64,
            SalesField::NetProfit => self.net_profit as f64,
            SalesField::Expenses => self.expenses as f64,
            SalesField::DeliveryTime => self.delivery_time,
            SalesField::Revenue => self.sales as f64 - self.expenses as f64,
        }
    }
}

impl Timestamped for SalesRecord {
    fn timestamp(&self) -> NaiveDate {
        self.date
    }
}

/// Order accuracy for a month, as a percentage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct OrderAccuracy {
    pub month: String,
    pub accuracy: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct InventoryToSales {
    pub month: String,
    pub inventory: i64,
    pub sales: i64,
}

/// Order count for one delivery status (e.g. "In Transit").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct DeliveryStatus {
    pub status: String,
    pub orders: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct LoadingTimeWeight {
    pub month: String,
    pub loading_time: f64,
    pub weight: i64,
}

/// A delivery destination plotted on the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct DeliveryLocation {
    pub location: String,
    pub latitude: f64,
    pub longitude: f64,
    pub deliveries: i64,
}

impl DeliveryLocation {
    /// Builds a location, rejecting coordinates outside the valid ranges.
    pub fn new(
        location: impl Into<String>,
        latitude: f64,
        longitude: f64,
        deliveries: i64,
    ) -> Result<Self, CoreError> {
        let location = Self {
            location: location.into(),
            latitude,
            longitude,
            deliveries,
        };
        location.validate()?;
        Ok(location)
    }

    /// Checks latitude is within [-90, 90] and longitude within [-180, 180].
    pub fn validate(&self) -> Result<(), CoreError> {
        if !(-90.0..=90.0).contains(&self.latitude) {
            return Err(CoreError::InvalidInput(
                format!("latitude of {}", self.location),
                self.latitude.to_string(),
            ));
        }
        if !(-180.0..=180.0).contains(&self.longitude) {
            return Err(CoreError::InvalidInput(
                format!("longitude of {}", self.location),
                self.longitude.to_string(),
            ));
        }
        Ok(())
    }
}

/// The rows of a single logical table, as handed out by a data source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "table", content = "rows", rename_all = "snake_case")]
pub enum Table {
    SalesData(Vec<SalesRecord>),
    OrderAccuracy(Vec<OrderAccuracy>),
    InventoryToSales(Vec<InventoryToSales>),
    DeliveryStatus(Vec<DeliveryStatus>),
    LoadingTimeWeight(Vec<LoadingTimeWeight>),
    DeliveryLocations(Vec<DeliveryLocation>),
}

impl Table {
    pub fn name(&self) -> TableName {
        match self {
            Table::SalesData(_) => TableName::SalesData,
            Table::OrderAccuracy(_) => TableName::OrderAccuracy,
            Table::InventoryToSales(_) => TableName::InventoryToSales,
            Table::DeliveryStatus(_) => TableName::DeliveryStatus,
            Table::LoadingTimeWeight(_) => TableName::LoadingTimeWeight,
            Table::DeliveryLocations(_) => TableName::DeliveryLocations,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Table::SalesData(rows) => rows.len(),
            Table::OrderAccuracy(rows) => rows.len(),
            Table::InventoryToSales(rows) => rows.len(),
            Table::DeliveryStatus(rows) => rows.len(),
            Table::LoadingTimeWeight(rows) => rows.len(),
            Table::DeliveryLocations(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One consistent copy of every table the dashboard reads.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardSnapshot {
    pub sales: Vec<SalesRecord>,
    pub order_accuracy: Vec<OrderAccuracy>,
    pub inventory_to_sales: Vec<InventoryToSales>,
    pub delivery_status: Vec<DeliveryStatus>,
    pub loading_time_weight: Vec<LoadingTimeWeight>,
    pub delivery_locations: Vec<DeliveryLocation>,
}

impl DashboardSnapshot {
    /// Returns a copy of one table.
    pub fn table(&self, name: TableName) -> Table {
        match name {
            TableName::SalesData => Table::SalesData(self.sales.clone()),
            TableName::OrderAccuracy => Table::OrderAccuracy(self.order_accuracy.clone()),
            TableName::InventoryToSales => {
                Table::InventoryToSales(self.inventory_to_sales.clone())
            }
            TableName::DeliveryStatus => Table::DeliveryStatus(self.delivery_status.clone()),
            TableName::LoadingTimeWeight => {
                Table::LoadingTimeWeight(self.loading_time_weight.clone())
            }
            TableName::DeliveryLocations => {
                Table::DeliveryLocations(self.delivery_locations.clone())
            }
        }
    }

    /// Consumes the snapshot, yielding each table in `TableName::ALL` order.
    pub fn into_tables(self) -> Vec<Table> {
        vec![
            Table::SalesData(self.sales),
            Table::OrderAccuracy(self.order_accuracy),
            Table::InventoryToSales(self.inventory_to_sales),
            Table::DeliveryStatus(self.delivery_status),
            Table::LoadingTimeWeight(self.loading_time_weight),
            Table::DeliveryLocations(self.delivery_locations),
        ]
    }

    /// Rebuilds a snapshot from individual tables. Missing tables stay empty.
    pub fn from_tables(tables: impl IntoIterator<Item = Table>) -> Self {
        let mut snapshot = Self::default();
        for table in tables {
            match table {
                Table::SalesData(rows) => snapshot.sales = rows,
                Table::OrderAccuracy(rows) => snapshot.order_accuracy = rows,
                Table::InventoryToSales(rows) => snapshot.inventory_to_sales = rows,
                Table::DeliveryStatus(rows) => snapshot.delivery_status = rows,
                Table::LoadingTimeWeight(rows) => snapshot.loading_time_weight = rows,
                Table::DeliveryLocations(rows) => snapshot.delivery_locations = rows,
            }
        }
        snapshot
    }

    pub fn total_rows(&self) -> usize {
        self.sales.len()
            + self.order_accuracy.len()
            + self.inventory_to_sales.len()
            + self.delivery_status.len()
            + self.loading_time_weight.len()
            + self.delivery_locations.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 1, d).unwrap()
    }

    #[test]
    fn revenue_is_derived_from_sales_and_expenses() {
        let record = SalesRecord {
            date: day(1),
            sales: 1000,
            deliveries: 80,
            net_profit: 600,
            expenses: 200,
            delivery_time: 2.5,
        };
        assert_eq!(record.value(SalesField::Revenue), 800.0);
        assert_eq!(record.value(SalesField::DeliveryTime), 2.5);
        assert_eq!(record.timestamp(), day(1));
    }

    #[test]
    fn revenue_of_extreme_rows_does_not_overflow() {
        let record = SalesRecord {
            date: day(2),
            sales: i64::MAX,
            deliveries: 0,
            net_profit: 0,
            expenses: i64::MIN,
            delivery_time: 1.0,
        };
        let revenue = record.value(SalesField::Revenue);
        assert!(revenue.is_finite());
        assert_eq!(revenue, i64::MAX as f64 * 2.0);
    }

    #[test]
    fn locations_outside_the_globe_are_rejected() {
        assert!(DeliveryLocation::new("Kampala", 0.3476, 32.5825, 150).is_ok());
        assert!(DeliveryLocation::new("Nowhere", 91.0, 0.0, 1).is_err());
        assert!(DeliveryLocation::new("Nowhere", 0.0, -180.5, 1).is_err());
    }

    #[test]
    fn snapshot_survives_splitting_into_tables() {
        let snapshot = DashboardSnapshot {
            delivery_status: vec![DeliveryStatus {
                status: "Delivered".to_string(),
                orders: 450,
            }],
            ..Default::default()
        };
        let tables = snapshot.clone().into_tables();
        assert_eq!(tables.len(), TableName::ALL.len());
        assert_eq!(tables[3].name(), TableName::DeliveryStatus);
        assert_eq!(tables[3].len(), 1);
        assert_eq!(DashboardSnapshot::from_tables(tables), snapshot);
    }
}
