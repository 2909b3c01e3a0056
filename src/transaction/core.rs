//! Defines the core data model and database queries for sale transactions.

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};
use time::{OffsetDateTime, UtcOffset};

use crate::Error;

// ============================================================================
// MODELS
// ============================================================================

/// The name of the table holding the live transaction collection.
pub const TRANSACTION_TABLE: &str = "product_transaction";

/// SQL condition that matches rows sold in the month bound to `?1`, in any year.
pub(crate) const SALE_MONTH_CONDITION: &str =
    "CAST(strftime('%m', date_of_sale) AS INTEGER) = ?1";

/// The columns selected by [map_transaction_row], in order.
pub(crate) const TRANSACTION_COLUMNS: &str =
    "id, title, description, price, category, date_of_sale, sold";

/// A product sale, as supplied by the seed source and returned by the API.
///
/// To create a new `Transaction` in code, use [Transaction::build].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// The externally supplied identifier. This is not the storage key and
    /// is not guaranteed to be unique.
    pub id: i64,
    /// The product name.
    pub title: String,
    /// A text description of the product.
    pub description: String,
    /// The sale price. Never negative.
    pub price: f64,
    /// A short label such as "electronics".
    pub category: String,
    /// When the sale happened. Only the month is used by the reports.
    #[serde(with = "time::serde::rfc3339")]
    pub date_of_sale: OffsetDateTime,
    /// Whether the product was sold.
    pub sold: bool,
}

impl Transaction {
    /// Create a new transaction.
    ///
    /// Shortcut for [TransactionBuilder] for discoverability.
    pub fn build(id: i64, price: f64, date_of_sale: OffsetDateTime) -> TransactionBuilder {
        TransactionBuilder {
            id,
            title: format!("Product #{id}"),
            description: String::new(),
            price,
            category: "uncategorized".to_owned(),
            date_of_sale,
            sold: false,
        }
    }
}

/// A builder for creating [Transaction] instances with sensible defaults.
///
/// # Examples
///
/// ```
/// use sale_ledger::Transaction;
/// use time::macros::datetime;
///
/// let transaction = Transaction::build(1, 329.85, datetime!(2021-11-27 14:59:54 UTC))
///     .title("Fjallraven Backpack")
///     .category("men's clothing")
///     .sold(true)
///     .finish();
///
/// assert_eq!(transaction.title, "Fjallraven Backpack");
/// assert!(transaction.sold);
/// ```
#[derive(Debug, PartialEq, Clone)]
pub struct TransactionBuilder {
    id: i64,
    title: String,
    description: String,
    price: f64,
    category: String,
    date_of_sale: OffsetDateTime,
    sold: bool,
}

impl TransactionBuilder {
    /// Set the product name.
    pub fn title(mut self, title: &str) -> Self {
        self.title = title.to_owned();
        self
    }

    /// Set the product description.
    pub fn description(mut self, description: &str) -> Self {
        self.description = description.to_owned();
        self
    }

    /// Set the category label.
    pub fn category(mut self, category: &str) -> Self {
        self.category = category.to_owned();
        self
    }

    /// Set whether the product was sold.
    pub fn sold(mut self, sold: bool) -> Self {
        self.sold = sold;
        self
    }

    /// Create the [Transaction].
    pub fn finish(self) -> Transaction {
        Transaction {
            id: self.id,
            title: self.title,
            description: self.description,
            price: self.price,
            category: self.category,
            date_of_sale: self.date_of_sale,
            sold: self.sold,
        }
    }
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Create the transaction table named `table_name` without any indexes.
///
/// `table_name` must be a trusted identifier, it is not escaped.
pub(crate) fn create_transaction_table_named(
    table_name: &str,
    connection: &Connection,
) -> Result<(), rusqlite::Error> {
    connection.execute(
        &format!(
            "CREATE TABLE IF NOT EXISTS {table_name} (
                row_id INTEGER PRIMARY KEY,
                id INTEGER NOT NULL,
                title TEXT NOT NULL,
                description TEXT NOT NULL,
                price REAL NOT NULL CHECK (price >= 0),
                category TEXT NOT NULL,
                date_of_sale TEXT NOT NULL,
                sold INTEGER NOT NULL
                )"
        ),
        (),
    )?;

    Ok(())
}

/// Create the indexes on the live transaction table.
pub(crate) fn create_transaction_indexes(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_product_transaction_id ON product_transaction(id);",
        (),
    )?;

    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_product_transaction_category \
        ON product_transaction(category);",
        (),
    )?;

    Ok(())
}

/// Create the live transaction table and its indexes in the database.
///
/// # Errors
/// Returns an error if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    create_transaction_table_named(TRANSACTION_TABLE, connection)?;
    create_transaction_indexes(connection)
}

/// Insert `transactions` into the table named `table_name`, in order.
///
/// Sale dates are converted to UTC before they are stored so that SQLite's
/// date functions see the same month for every stored row.
///
/// # Errors
/// Returns an [Error::StoreFailure] if a row could not be inserted.
pub(crate) fn insert_transactions_into(
    table_name: &str,
    transactions: &[Transaction],
    connection: &Connection,
) -> Result<usize, Error> {
    let mut statement = connection.prepare(&format!(
        "INSERT INTO {table_name} (id, title, description, price, category, date_of_sale, sold)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"
    ))?;

    for transaction in transactions {
        statement.execute((
            transaction.id,
            &transaction.title,
            &transaction.description,
            transaction.price,
            &transaction.category,
            transaction.date_of_sale.to_offset(UtcOffset::UTC),
            transaction.sold,
        ))?;
    }

    Ok(transactions.len())
}

/// Insert `transactions` into the live transaction table.
///
/// # Errors
/// Returns an [Error::StoreFailure] if a row could not be inserted.
pub fn insert_transactions(
    transactions: &[Transaction],
    connection: &Connection,
) -> Result<usize, Error> {
    insert_transactions_into(TRANSACTION_TABLE, transactions, connection)
}

/// Get the total number of transactions in the database.
///
/// # Errors
/// This function will return a [Error::StoreFailure] there is some SQL error.
#[cfg(test)]
pub fn count_transactions(connection: &Connection) -> Result<u32, Error> {
    connection
        .query_row("SELECT COUNT(row_id) FROM product_transaction;", [], |row| {
            row.get(0)
        })
        .map_err(|error| error.into())
}

/// Map a database row to a Transaction.
///
/// The row must contain the columns listed in [TRANSACTION_COLUMNS].
pub fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    Ok(Transaction {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        price: row.get(3)?,
        category: row.get(4)?,
        date_of_sale: row.get(5)?,
        sold: row.get(6)?,
    })
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod database_tests {
    use time::macros::datetime;

    use crate::{
        test_utils::get_test_connection,
        transaction::{Transaction, count_transactions, insert_transactions},
    };

    use super::{TRANSACTION_COLUMNS, map_transaction_row};

    #[test]
    fn insert_succeeds() {
        let conn = get_test_connection();
        let transactions = [
            Transaction::build(1, 12.3, datetime!(2022-03-05 10:00 UTC)).finish(),
            Transaction::build(2, 45.6, datetime!(2022-04-05 10:00 UTC)).finish(),
        ];

        let inserted = insert_transactions(&transactions, &conn).unwrap();

        assert_eq!(inserted, 2);
        assert_eq!(count_transactions(&conn).unwrap(), 2);
    }

    #[test]
    fn insert_allows_duplicate_ids() {
        let conn = get_test_connection();
        let transaction = Transaction::build(7, 1.0, datetime!(2022-03-05 10:00 UTC)).finish();

        insert_transactions(&[transaction.clone(), transaction], &conn).unwrap();

        assert_eq!(count_transactions(&conn).unwrap(), 2);
    }

    #[test]
    fn insert_rejects_negative_price() {
        let conn = get_test_connection();
        let transaction = Transaction::build(1, -1.0, datetime!(2022-03-05 10:00 UTC)).finish();

        let result = insert_transactions(&[transaction], &conn);

        assert!(result.is_err());
        assert_eq!(count_transactions(&conn).unwrap(), 0);
    }

    #[test]
    fn round_trips_dates_in_utc() {
        let conn = get_test_connection();
        let want = Transaction::build(3, 99.99, datetime!(2021-11-27 20:29:54 +05:30))
            .title("Backpack")
            .description("Fits 15 inch laptops")
            .category("men's clothing")
            .sold(true)
            .finish();
        insert_transactions(&[want.clone()], &conn).unwrap();

        let got = conn
            .query_row(
                &format!("SELECT {TRANSACTION_COLUMNS} FROM product_transaction"),
                [],
                map_transaction_row,
            )
            .unwrap();

        // Equality on OffsetDateTime compares the instant, not the offset.
        assert_eq!(got, want);
        assert_eq!(got.date_of_sale.offset(), time::UtcOffset::UTC);
        let (utc_date, month): (String, u8) = conn
            .query_row(
                "SELECT strftime('%Y-%m-%d %H:%M:%S', date_of_sale), \
                CAST(strftime('%m', date_of_sale) AS INTEGER) FROM product_transaction",
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .unwrap();
        assert_eq!(utc_date, "2021-11-27 14:59:54");
        assert_eq!(month, 11);
    }

    #[test]
    fn deserializes_seed_record() {
        let json = r#"{
            "id": 1,
            "title": "Fjallraven  Foldsack No 1 Backpack",
            "price": 329.85,
            "description": "Your perfect pack for everyday use",
            "category": "men's clothing",
            "image": "https://fakestoreapi.com/img/81fPKd-2AYL._AC_SL1500_.jpg",
            "sold": false,
            "dateOfSale": "2021-11-27T20:29:54+05:30"
        }"#;

        let transaction: Transaction = serde_json::from_str(json).unwrap();

        assert_eq!(transaction.id, 1);
        assert_eq!(transaction.price, 329.85);
        assert_eq!(transaction.category, "men's clothing");
        assert!(!transaction.sold);
        assert_eq!(transaction.date_of_sale, datetime!(2021-11-27 14:59:54 UTC));
    }

    #[test]
    fn serializes_with_camel_case_fields() {
        let transaction = Transaction::build(5, 10.0, datetime!(2022-03-01 00:00 UTC))
            .sold(true)
            .finish();

        let value = serde_json::to_value(&transaction).unwrap();

        assert_eq!(value["dateOfSale"], "2022-03-01T00:00:00Z");
        assert_eq!(value["sold"], true);
        assert!(value.get("date_of_sale").is_none());
    }
}
