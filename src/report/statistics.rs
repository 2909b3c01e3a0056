//! Sale totals for a month.

use axum::{
    Json,
    extract::{Query, State},
};
use rusqlite::Connection;
use serde::Serialize;

use crate::{
    Error,
    month::{MonthQuery, SaleMonth},
    transaction::SALE_MONTH_CONDITION,
};

use super::ReportState;

/// The sale totals for a month.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    /// The sum of the prices of all transactions in the month, sold or not.
    pub total_sale_amount: f64,
    /// The number of transactions in the month that were sold.
    pub sold_items_count: u32,
    /// The number of transactions in the month that were not sold.
    pub not_sold_items_count: u32,
}

/// Compute the sale totals for `month`.
///
/// Months without any transactions give all zeros.
///
/// # Errors
/// Returns [Error::StoreFailure] if the SQL query fails.
pub fn get_statistics(month: SaleMonth, connection: &Connection) -> Result<Statistics, Error> {
    let query = format!(
        "SELECT COALESCE(SUM(price), 0.0), \
            COALESCE(SUM(CASE WHEN sold THEN 1 ELSE 0 END), 0), \
            COALESCE(SUM(CASE WHEN sold THEN 0 ELSE 1 END), 0) \
        FROM product_transaction WHERE {SALE_MONTH_CONDITION}"
    );

    connection
        .query_row(&query, [month.number()], |row| {
            Ok(Statistics {
                total_sale_amount: row.get(0)?,
                sold_items_count: row.get(1)?,
                not_sold_items_count: row.get(2)?,
            })
        })
        .map_err(Error::from)
}

/// Get the sale totals for the requested month.
pub async fn statistics_endpoint(
    State(state): State<ReportState>,
    Query(query): Query<MonthQuery>,
) -> Result<Json<Statistics>, Error> {
    let month = query.month()?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    get_statistics(month, &connection).map(Json)
}
