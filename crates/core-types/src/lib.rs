//! # Core Types
//!
//! Plain data records shared by every crate in the dashboard workspace: the daily
//! sales time series, the monthly and categorical tables, and the snapshot that
//! groups them. Nothing here performs I/O.

pub mod enums;
pub mod error;
pub mod options;
pub mod structs;

// Re-export the core types to provide a clean public API.
pub use enums::{SalesField, TableName};
pub use error::CoreError;
pub use options::{DashboardOptions, DeltaMode, StdDenominator};
pub use structs::{
    DashboardSnapshot, DeliveryLocation, DeliveryStatus, InventoryToSales, LoadingTimeWeight,
    OrderAccuracy, SalesRecord, Table, Timestamped,
};
