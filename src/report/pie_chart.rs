//! Counts of the transactions in a month by category.

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

/// The number of transactions in one category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryCount {
    /// The category label.
    pub category: String,
    /// How many transactions of the month have this category.
    pub count: u32,
}

/// Count the transactions of `month` per category, ordered by category.
///
/// Only categories with at least one transaction in the month are returned.
///
/// # Errors
/// Returns [Error::StoreFailure] if the SQL query fails.
pub fn get_pie_chart(
    month: SaleMonth,
    connection: &Connection,
) -> Result<Vec<CategoryCount>, Error> {
    let query = format!(
        "SELECT category, COUNT(*) FROM product_transaction \
        WHERE {SALE_MONTH_CONDITION} GROUP BY category ORDER BY category ASC"
    );

    connection
        .prepare(&query)?
        .query_map([month.number()], |row| {
            Ok(CategoryCount {
                category: row.get(0)?,
                count: row.get(1)?,
            })
        })?
        .map(|row| row.map_err(Error::from))
        .collect()
}

/// Get the category counts for the requested month.
pub async fn pie_chart_endpoint(
    State(state): State<ReportState>,
    Query(query): Query<MonthQuery>,
) -> Result<Json<Vec<CategoryCount>>, Error> {
    let month = query.month()?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    get_pie_chart(month, &connection).map(Json)
}
