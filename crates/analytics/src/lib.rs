//! # Dashboard Analytics Engine
//!
//! This crate turns raw, time-indexed logistics records into the statistics and
//! aggregates the dashboard displays.
//!
//! ## Architectural Principles
//!
//! - **Layer 1 Logic:** This is a pure logic crate. It has no knowledge of the
//!   database or the web server. It depends only on `core-types` (Layer 0).
//! - **Stateless Calculation:** Every transform borrows its input and returns a new
//!   table. Nothing is mutated in place and nothing is global, so the functions can
//!   be called from any thread.
//! - **Sentinels, not panics:** A value that is mathematically undefined (a ratio
//!   over zero sales, a moving average without enough history, a correlation
//!   against a constant column) is `None`. Only malformed arguments return an
//!   `AnalyticsError`.
//!
//! ## Public API
//!
//! - Series transforms: `filter_by_range`, `derive_columns`, `percent_change`,
//!   `moving_average`.
//! - Statistics: `summary_statistics`, `correlation_matrix`.
//! - Grouping: `aggregate_by_category`.
//! - `AnalyticsEngine`: assembles a full `DashboardReport` from a snapshot.

// Declare the modules that constitute this crate.
pub mod aggregation;
pub mod engine;
pub mod error;
pub mod report;
pub mod series;
pub mod statistics;

// Re-export the key components to create a clean, public-facing API.
pub use aggregation::{CategoryRecord, GroupOrder, Measure, Reducer, aggregate_by_category};
pub use engine::{AnalyticsEngine, DashboardOptions};
pub use error::AnalyticsError;
pub use report::{DashboardReport, DeltaMode, MetricTile, TileUnit};
pub use series::{
    DerivedSalesRecord, derive_columns, filter_by_range, moving_average, percent_change,
};
pub use statistics::{
    Column, CorrelationMatrix, StdDenominator, SummaryStatistics, correlation_matrix,
    summary_statistics,
};
