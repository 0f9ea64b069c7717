use crate::{AppState, error::AppError};
use analytics::report::{ColumnStatistics, MovingAverageSeries, StatusBreakdown};
use analytics::series::parse_field;
use analytics::{CorrelationMatrix, DashboardReport, DerivedSalesRecord};
use axum::{
    Json,
    extract::{Path, Query, State},
};
use chrono::NaiveDate;
use core_types::{Table, TableName};
use serde::Deserialize;
use std::sync::Arc;

/// An optional inclusive date range; missing bounds fall back to the configured defaults.
#[derive(Debug, Default, Deserialize)]
pub struct RangeQuery {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl RangeQuery {
    fn resolve(&self, state: &AppState) -> (NaiveDate, NaiveDate) {
        (
            self.start.unwrap_or(state.dashboard.start_date),
            self.end.unwrap_or(state.dashboard.end_date),
        )
    }
}

#[derive(Debug, Deserialize)]
pub struct MovingAverageQuery {
    #[serde(default = "default_field")]
    pub field: String,
    pub window: Option<usize>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

fn default_field() -> String {
    "sales".to_string()
}

/// # GET /api/tables/:table
/// Raw rows of one table, e.g. `/api/tables/delivery_locations`.
pub async fn get_table(
    Path(table): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Table>, AppError> {
    let name: TableName = table
        .parse()
        .map_err(|e: core_types::CoreError| AppError::BadRequest(e.to_string()))?;
    let rows = state.db_repo.fetch_all(name).await?;
    Ok(Json(rows))
}

/// # GET /api/dashboard
/// Every figure of the dashboard page for the selected range.
pub async fn get_dashboard(
    State(state): State<Arc<AppState>>,
    Query(range): Query<RangeQuery>,
) -> Result<Json<DashboardReport>, AppError> {
    let (start, end) = range.resolve(&state);
    let snapshot = state.db_repo.load_snapshot().await?;
    let report = state.engine.build_dashboard(&snapshot, start, end)?;
    Ok(Json(report))
}

/// # GET /api/sales
/// Daily sales with revenue and profit ratio.
pub async fn get_sales(
    State(state): State<Arc<AppState>>,
    Query(range): Query<RangeQuery>,
) -> Result<Json<Vec<DerivedSalesRecord>>, AppError> {
    let (start, end) = range.resolve(&state);
    let records = state.db_repo.get_sales_by_date_range(start, end).await?;
    // The engine re-applies the range, which is where an inverted one is rejected.
    let rows = state.engine.sales_in_range(&records, start, end)?;
    Ok(Json(rows))
}

/// # GET /api/sales/moving-average
/// Trailing moving average of one column, e.g. `?field=revenue&window=14`.
pub async fn get_moving_average(
    State(state): State<Arc<AppState>>,
    Query(query): Query<MovingAverageQuery>,
) -> Result<Json<MovingAverageSeries>, AppError> {
    let field = parse_field(&query.field)?;
    let window = query
        .window
        .unwrap_or(state.engine.options().moving_average_window);
    let range = RangeQuery {
        start: query.start,
        end: query.end,
    };
    let (start, end) = range.resolve(&state);

    let records = state.db_repo.get_sales_by_date_range(start, end).await?;
    let records = analytics::filter_by_range(&records, start, end)?;
    let series = state.engine.moving_average_series(&records, field, window)?;
    Ok(Json(series))
}

/// # GET /api/sales/statistics
pub async fn get_statistics(
    State(state): State<Arc<AppState>>,
    Query(range): Query<RangeQuery>,
) -> Result<Json<Vec<ColumnStatistics>>, AppError> {
    let (start, end) = range.resolve(&state);
    let records = state.db_repo.get_sales_by_date_range(start, end).await?;
    let records = analytics::filter_by_range(&records, start, end)?;
    Ok(Json(state.engine.column_statistics(&records)))
}

/// # GET /api/sales/correlation
pub async fn get_correlation(
    State(state): State<Arc<AppState>>,
    Query(range): Query<RangeQuery>,
) -> Result<Json<CorrelationMatrix>, AppError> {
    let (start, end) = range.resolve(&state);
    let records = state.db_repo.get_sales_by_date_range(start, end).await?;
    let records = analytics::filter_by_range(&records, start, end)?;
    Ok(Json(state.engine.sales_correlation(&records)?))
}

/// # GET /api/delivery-status
/// Orders per status plus the overall total.
pub async fn get_delivery_status(
    State(state): State<Arc<AppState>>,
) -> Result<Json<StatusBreakdown>, AppError> {
    let statuses = state.db_repo.fetch_delivery_status().await?;
    Ok(Json(state.engine.status_breakdown(&statuses)))
}
