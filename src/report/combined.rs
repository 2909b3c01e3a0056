//! All three monthly reports in one response.

use axum::{
    Json,
    extract::{Query, State},
};
use rusqlite::Connection;
use serde::Serialize;

use crate::{
    Error,
    month::{MonthQuery, SaleMonth},
};

use super::{
    BarChartEntry, CategoryCount, ReportState, Statistics, get_bar_chart, get_pie_chart,
    get_statistics,
};

/// The statistics, bar chart and pie chart for one month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CombinedReport {
    /// The sale totals.
    pub statistics: Statistics,
    /// The counts per price range.
    pub barchart: Vec<BarChartEntry>,
    /// The counts per category.
    pub piechart: Vec<CategoryCount>,
}

/// Build every report for `month` from the same connection.
///
/// # Errors
/// Returns [Error::StoreFailure] if any of the SQL queries fail.
pub fn get_combined_report(
    month: SaleMonth,
    connection: &Connection,
) -> Result<CombinedReport, Error> {
    Ok(CombinedReport {
        statistics: get_statistics(month, connection)?,
        barchart: get_bar_chart(month, connection)?,
        piechart: get_pie_chart(month, connection)?,
    })
}

/// Get every report for the requested month.
///
/// The database lock is held for all three queries, so a concurrent reseed
/// cannot change the data between them.
pub async fn combined_endpoint(
    State(state): State<ReportState>,
    Query(query): Query<MonthQuery>,
) -> Result<Json<CombinedReport>, Error> {
    let month = query.month()?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    get_combined_report(month, &connection).map(Json)
}
