//! Database query for searching and paging through transactions.

use rusqlite::{Connection, functions::FunctionFlags, params_from_iter, types::Value};

use crate::{Error, month::SaleMonth, pagination::PageRequest};

use super::core::{TRANSACTION_COLUMNS, Transaction, map_transaction_row};

/// The SQL function `contains_text(haystack, needle)` registered by [register_search_function].
const CONTAINS_TEXT_FUNCTION: &str = "contains_text";

/// Narrows down which transactions are listed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionFilter {
    /// Free text matched against the title, description and price.
    pub search: Option<String>,
    /// Only list transactions sold in this month, in any year.
    pub month: Option<SaleMonth>,
}

/// Get one page of the transactions that match `filter`.
///
/// A transaction matches the search text if its title or description
/// contains the text (ignoring case, including non-ASCII letters), or if its price equals the
/// number at the start of the text (zero if there is none). The month
/// filter must match as well when it is set.
///
/// Results are sorted by the external ID, then by the order they were
/// stored in, so consecutive pages never overlap.
///
/// # Errors
/// Returns [Error::StoreFailure] if the SQL query fails or a row is malformed.
pub fn get_transactions_page(
    filter: &TransactionFilter,
    page: PageRequest,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    let mut conditions = Vec::new();
    let mut params = Vec::new();

    if let Some(month) = filter.month {
        params.push(Value::Integer(i64::from(month.number())));
        conditions.push(format!(
            "CAST(strftime('%m', date_of_sale) AS INTEGER) = ?{}",
            params.len()
        ));
    }

    if let Some(search) = filter.search.as_deref().filter(|search| !search.is_empty()) {
        params.push(Value::Text(search.to_lowercase()));
        let search_index = params.len();
        params.push(Value::Real(parse_search_price(search)));
        let price_index = params.len();

        conditions.push(format!(
            "({CONTAINS_TEXT_FUNCTION}(title, ?{search_index}) \
            OR {CONTAINS_TEXT_FUNCTION}(description, ?{search_index}) \
            OR price = ?{price_index})"
        ));
    }

    let where_clause = if conditions.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };

    params.push(Value::Integer(to_sql_integer(page.limit())));
    let limit_index = params.len();
    params.push(Value::Integer(to_sql_integer(page.offset())));
    let offset_index = params.len();

    let query = format!(
        "SELECT {TRANSACTION_COLUMNS} FROM product_transaction {where_clause} \
        ORDER BY id ASC, row_id ASC LIMIT ?{limit_index} OFFSET ?{offset_index}"
    );

    connection
        .prepare(&query)?
        .query_map(params_from_iter(params), map_transaction_row)?
        .map(|transaction_result| transaction_result.map_err(Error::from))
        .collect()
}

fn to_sql_integer(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

/// Register `contains_text(haystack, needle)` on `connection`.
///
/// The function is true when the lowercased `haystack` contains `needle`,
/// which must already be lowercase. Unlike `LIKE`, this folds the case of
/// every Unicode letter and treats `%` and `_` literally.
///
/// Functions are not stored in the database, so this must be called on
/// every new connection.
///
/// # Errors
/// Returns an error if SQLite rejects the function.
pub(crate) fn register_search_function(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.create_scalar_function(
        CONTAINS_TEXT_FUNCTION,
        2,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |context| {
            let haystack = context.get::<String>(0)?;
            let needle = context.get::<String>(1)?;

            Ok(haystack.to_lowercase().contains(&needle))
        },
    )
}

/// Read the decimal number at the start of `search`, ignoring leading whitespace.
///
/// Text that does not start with a number, such as "abc", gives zero.
/// Trailing text is ignored, so "12.5kg" gives 12.5.
pub(crate) fn parse_search_price(search: &str) -> f64 {
    let text = search.trim_start();
    let bytes = text.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }

    let integer_start = end;
    while bytes.get(end).is_some_and(u8::is_ascii_digit) {
        end += 1;
    }
    let mut digit_count = end - integer_start;

    if bytes.get(end) == Some(&b'.') {
        let fraction_start = end + 1;
        let mut fraction_end = fraction_start;
        while bytes.get(fraction_end).is_some_and(u8::is_ascii_digit) {
            fraction_end += 1;
        }

        if digit_count > 0 || fraction_end > fraction_start {
            digit_count += fraction_end - fraction_start;
            end = fraction_end;
        }
    }

    if digit_count == 0 {
        return 0.0;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exponent_end = end + 1;
        if matches!(bytes.get(exponent_end), Some(b'+' | b'-')) {
            exponent_end += 1;
        }
        let exponent_digits_start = exponent_end;
        while bytes.get(exponent_end).is_some_and(u8::is_ascii_digit) {
            exponent_end += 1;
        }
        if exponent_end > exponent_digits_start {
            end = exponent_end;
        }
    }

    match text[..end].parse::<f64>() {
        Ok(number) if number.is_finite() => number,
        _ => 0.0,
    }
}
