//! Counts of the transactions in a month by price range.

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

/// A price range of the bar chart.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceBucket {
    /// The label shown for the range, e.g. "101-200".
    pub label: &'static str,
    /// The largest price in the range, `None` for the open ended last range.
    pub upper_bound: Option<f64>,
}

/// The fixed price ranges of the bar chart, in display order.
///
/// A price belongs to the first bucket whose upper bound is at least the
/// price, so the buckets cover every non-negative price exactly once.
pub const PRICE_BUCKETS: [PriceBucket; 10] = [
    PriceBucket {
        label: "0-100",
        upper_bound: Some(100.0),
    },
    PriceBucket {
        label: "101-200",
        upper_bound: Some(200.0),
    },
    PriceBucket {
        label: "201-300",
        upper_bound: Some(300.0),
    },
    PriceBucket {
        label: "301-400",
        upper_bound: Some(400.0),
    },
    PriceBucket {
        label: "401-500",
        upper_bound: Some(500.0),
    },
    PriceBucket {
        label: "501-600",
        upper_bound: Some(600.0),
    },
    PriceBucket {
        label: "601-700",
        upper_bound: Some(700.0),
    },
    PriceBucket {
        label: "701-800",
        upper_bound: Some(800.0),
    },
    PriceBucket {
        label: "801-900",
        upper_bound: Some(900.0),
    },
    PriceBucket {
        label: "901-above",
        upper_bound: None,
    },
];

/// The number of transactions in one price range.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarChartEntry {
    /// The label of the price range.
    pub range: String,
    /// How many transactions fall in the range.
    pub count: u32,
}

/// SQL expression giving the index into [PRICE_BUCKETS] for `price`.
fn bucket_index_expression() -> String {
    let mut expression = String::from("CASE");
    let mut open_index = PRICE_BUCKETS.len() - 1;

    for (index, bucket) in PRICE_BUCKETS.iter().enumerate() {
        match bucket.upper_bound {
            Some(upper_bound) => {
                expression.push_str(&format!(" WHEN price <= {upper_bound:.1} THEN {index}"))
            }
            None => open_index = index,
        }
    }

    expression.push_str(&format!(" ELSE {open_index} END"));
    expression
}

/// Count the transactions of `month` in each of the [PRICE_BUCKETS].
///
/// Every bucket is returned in order, including empty ones.
///
/// # Errors
/// Returns [Error::StoreFailure] if the SQL query fails.
pub fn get_bar_chart(
    month: SaleMonth,
    connection: &Connection,
) -> Result<Vec<BarChartEntry>, Error> {
    let query = format!(
        "SELECT {} AS bucket, COUNT(*) FROM product_transaction \
        WHERE {SALE_MONTH_CONDITION} GROUP BY bucket",
        bucket_index_expression()
    );

    let mut counts = [0u32; PRICE_BUCKETS.len()];

    let mut statement = connection.prepare(&query)?;
    let rows = statement.query_map([month.number()], |row| {
        Ok((row.get::<_, i64>(0)?, row.get::<_, u32>(1)?))
    })?;

    for row in rows {
        let (index, count) = row?;
        let slot = usize::try_from(index)
            .ok()
            .and_then(|index| counts.get_mut(index));
        if let Some(slot) = slot {
            *slot = count;
        }
    }

    Ok(PRICE_BUCKETS
        .iter()
        .zip(counts)
        .map(|(bucket, count)| BarChartEntry {
            range: bucket.label.to_owned(),
            count,
        })
        .collect())
}

/// Get the price range counts for the requested month.
pub async fn bar_chart_endpoint(
    State(state): State<ReportState>,
    Query(query): Query<MonthQuery>,
) -> Result<Json<Vec<BarChartEntry>>, Error> {
    let month = query.month()?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    get_bar_chart(month, &connection).map(Json)
}
