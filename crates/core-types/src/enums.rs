use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The logical tables a dashboard snapshot is made of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableName {
    SalesData,
    OrderAccuracy,
    InventoryToSales,
    DeliveryStatus,
    LoadingTimeWeight,
    DeliveryLocations,
}

impl TableName {
    /// Every table, in the order the dashboard lays them out.
    pub const ALL: [TableName; 6] = [
        TableName::SalesData,
        TableName::OrderAccuracy,
        TableName::InventoryToSales,
        TableName::DeliveryStatus,
        TableName::LoadingTimeWeight,
        TableName::DeliveryLocations,
    ];

    /// The SQL table name backing this logical table.
    pub fn as_str(&self) -> &'static str {
        match self {
            TableName::SalesData => "sales_data",
            TableName::OrderAccuracy => "order_accuracy",
            TableName::InventoryToSales => "inventory_to_sales",
            TableName::DeliveryStatus => "delivery_status",
            TableName::LoadingTimeWeight => "loading_time_weight",
            TableName::DeliveryLocations => "delivery_locations",
        }
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TableName {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Accept the URL-friendly spelling too (`sales-data`).
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        TableName::ALL
            .into_iter()
            .find(|t| t.as_str() == normalized)
            .ok_or_else(|| CoreError::UnknownTable(s.to_string()))
    }
}

/// The named numeric columns of the daily sales table, including the derived revenue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SalesField {
    Sales,
    Deliveries,
    NetProfit,
    Expenses,
    DeliveryTime,
    Revenue,
}

impl SalesField {
    /// The raw columns stored in the database.
    pub const RAW: [SalesField; 5] = [
        SalesField::Sales,
        SalesField::Deliveries,
        SalesField::NetProfit,
        SalesField::Expenses,
        SalesField::DeliveryTime,
    ];

    /// Raw columns plus revenue, the set the dashboard correlates.
    pub const ALL: [SalesField; 6] = [
        SalesField::Sales,
        SalesField::Deliveries,
        SalesField::NetProfit,
        SalesField::Expenses,
        SalesField::DeliveryTime,
        SalesField::Revenue,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SalesField::Sales => "sales",
            SalesField::Deliveries => "deliveries",
            SalesField::NetProfit => "net_profit",
            SalesField::Expenses => "expenses",
            SalesField::DeliveryTime => "delivery_time",
            SalesField::Revenue => "revenue",
        }
    }
}

impl fmt::Display for SalesField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SalesField {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        SalesField::ALL
            .into_iter()
            .find(|f| f.as_str() == normalized)
            .ok_or_else(|| CoreError::UnknownField(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_names_parse_both_spellings() {
        assert_eq!("sales_data".parse::<TableName>(), Ok(TableName::SalesData));
        assert_eq!(
            "Delivery-Locations".parse::<TableName>(),
            Ok(TableName::DeliveryLocations)
        );
        assert!(matches!(
            "trades".parse::<TableName>(),
            Err(CoreError::UnknownTable(name)) if name == "trades"
        ));
    }

    #[test]
    fn sales_fields_round_trip_through_their_names() {
        for field in SalesField::ALL {
            assert_eq!(field.as_str().parse::<SalesField>(), Ok(field));
        }
        assert!("volume".parse::<SalesField>().is_err());
    }
}
