//! Replaces the transaction collection with data from a seed source.
//!
//! The new rows are written to a staging table which is then swapped in for
//! the live table within one SQL transaction, so readers never observe an
//! empty or partially written collection.

use std::{
    path::PathBuf,
    sync::{Arc, Mutex},
};

use axum::{
    Json,
    extract::{FromRef, State},
};
use rusqlite::{Connection, Transaction as SqlTransaction, TransactionBehavior};
use serde::Serialize;

use crate::{
    AppState, Error,
    transaction::{
        TRANSACTION_TABLE, Transaction, create_transaction_indexes,
        create_transaction_table_named, insert_transactions_into,
    },
};

/// The public JSON file holding the product transactions.
pub const DEFAULT_SEED_URL: &str = "https://s3.amazonaws.com/roxiler.com/product_transaction.json";

const STAGING_TABLE: &str = "product_transaction_staging";

/// Where the seed data is loaded from.
///
/// Both sources must hold a JSON array of transaction objects.
#[derive(Debug, Clone)]
pub enum SeedSource {
    /// Fetch the seed data over HTTP(S).
    Url {
        /// The client used for the request.
        client: reqwest::Client,
        /// The URL of the JSON document.
        url: String,
    },
    /// Read the seed data from a local file.
    File(PathBuf),
}

impl SeedSource {
    /// Create a source that fetches `url` with a default HTTP client.
    pub fn url(url: &str) -> Self {
        Self::Url {
            client: reqwest::Client::new(),
            url: url.to_owned(),
        }
    }

    /// Load and validate the seed transactions.
    ///
    /// # Errors
    /// Returns [Error::UpstreamFailure] if the source cannot be read, returns a
    /// non-success status, holds malformed JSON, or holds a transaction with
    /// a negative price.
    pub async fn fetch(&self) -> Result<Vec<Transaction>, Error> {
        let transactions: Vec<Transaction> = match self {
            SeedSource::Url { client, url } => {
                tracing::info!("Fetching seed data from {url}");

                client
                    .get(url)
                    .send()
                    .await
                    .and_then(|response| response.error_for_status())
                    .map_err(|error| {
                        Error::UpstreamFailure(format!("request to {url} failed: {error}"))
                    })?
                    .json()
                    .await
                    .map_err(|error| {
                        Error::UpstreamFailure(format!("invalid seed data from {url}: {error}"))
                    })?
            }
            SeedSource::File(path) => {
                tracing::info!("Reading seed data from {}", path.display());

                let bytes = tokio::fs::read(path).await.map_err(|error| {
                    Error::UpstreamFailure(format!("could not read {}: {error}", path.display()))
                })?;

                serde_json::from_slice(&bytes).map_err(|error| {
                    Error::UpstreamFailure(format!(
                        "invalid seed data in {}: {error}",
                        path.display()
                    ))
                })?
            }
        };

        validate_prices(&transactions)?;

        Ok(transactions)
    }
}

fn validate_prices(transactions: &[Transaction]) -> Result<(), Error> {
    match transactions
        .iter()
        .find(|transaction| transaction.price < 0.0 || !transaction.price.is_finite())
    {
        Some(transaction) => Err(Error::UpstreamFailure(format!(
            "transaction {} has an invalid price {}",
            transaction.id, transaction.price
        ))),
        None => Ok(()),
    }
}

/// Replace every stored transaction with `transactions`.
///
/// The rows are written to a staging table that replaces the live table in
/// the same SQL transaction. If anything fails the live table is left as it
/// was.
///
/// # Errors
/// Returns [Error::StoreFailure] if any SQL statement fails.
pub fn replace_all_transactions(
    transactions: &[Transaction],
    connection: &Connection,
) -> Result<usize, Error> {
    let sql_transaction =
        SqlTransaction::new_unchecked(connection, TransactionBehavior::Immediate)?;

    sql_transaction.execute(&format!("DROP TABLE IF EXISTS {STAGING_TABLE}"), ())?;
    create_transaction_table_named(STAGING_TABLE, &sql_transaction)?;
    let count = insert_transactions_into(STAGING_TABLE, transactions, &sql_transaction)?;

    sql_transaction.execute(&format!("DROP TABLE IF EXISTS {TRANSACTION_TABLE}"), ())?;
    sql_transaction.execute(
        &format!("ALTER TABLE {STAGING_TABLE} RENAME TO {TRANSACTION_TABLE}"),
        (),
    )?;
    create_transaction_indexes(&sql_transaction)?;

    sql_transaction.commit()?;

    Ok(count)
}

/// Load the seed data from `source` and swap it in for the stored transactions.
///
/// The database lock is only taken once the seed data has been loaded.
///
/// # Errors
/// Returns [Error::UpstreamFailure] if the seed data cannot be loaded, or
/// [Error::StoreFailure] if it cannot be stored. The stored transactions are
/// unchanged in both cases.
pub async fn reseed(
    source: &SeedSource,
    db_connection: &Mutex<Connection>,
) -> Result<usize, Error> {
    let transactions = source.fetch().await?;

    let connection = db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let count = replace_all_transactions(&transactions, &connection)?;
    tracing::info!("Replaced the transaction collection with {count} transactions");

    Ok(count)
}

/// The state needed for reseeding the database.
#[derive(Debug, Clone)]
pub struct SeedState {
    /// The database connection for storing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// Where to load the seed data from.
    pub seed_source: SeedSource,
}

impl FromRef<AppState> for SeedState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            seed_source: state.seed_source.clone(),
        }
    }
}

/// The response body for a successful reseed.
#[derive(Debug, Serialize)]
pub struct SeedResponse {
    /// A confirmation message.
    pub message: String,
    /// The number of transactions now stored.
    pub count: usize,
}

/// Replace the stored transactions with the data from the seed source.
pub async fn initialize_database_endpoint(
    State(state): State<SeedState>,
) -> Result<Json<SeedResponse>, Error> {
    let count = reseed(&state.seed_source, &state.db_connection).await?;

    Ok(Json(SeedResponse {
        message: "Database initialized with seed data".to_owned(),
        count,
    }))
}

#[cfg(test)]
mod tests {
    use std::{
        path::PathBuf,
        sync::{Arc, Mutex},
    };

    use axum::{Router, http::StatusCode, routing::get};
    use axum_test::TestServer;
    use serde_json::Value;
    use time::macros::datetime;

    use crate::{
        Error, endpoints,
        pagination::{PageRequest, PaginationConfig},
        test_utils::{get_test_connection, write_seed_file},
        transaction::{
            Transaction, TransactionFilter, count_transactions, get_transactions_page,
            insert_transactions,
        },
    };

    use super::{
        SeedSource, SeedState, initialize_database_endpoint, replace_all_transactions, reseed,
    };

    const SEED_JSON: &str = r#"[
        {"id": 1, "title": "Backpack", "price": 109.95, "description": "Everyday pack",
         "category": "men's clothing", "image": "https://example.com/1.jpg",
         "sold": false, "dateOfSale": "2021-11-27T20:29:54+05:30"},
        {"id": 2, "title": "T-Shirt", "price": 22.3, "description": "Slim fit",
         "category": "men's clothing", "image": "https://example.com/2.jpg",
         "sold": true, "dateOfSale": "2022-03-27T20:29:54+05:30"}
    ]"#;

    fn all_transactions(connection: &rusqlite::Connection) -> Vec<Transaction> {
        let page = PageRequest::new(Some(1), Some(100), &PaginationConfig::default()).unwrap();
        get_transactions_page(&TransactionFilter::default(), page, connection).unwrap()
    }

    #[test]
    fn replaces_existing_transactions() {
        let conn = get_test_connection();
        insert_transactions(
            &[Transaction::build(99, 1.0, datetime!(2020-01-01 00:00 UTC)).finish()],
            &conn,
        )
        .unwrap();
        let new_transactions = [
            Transaction::build(1, 10.0, datetime!(2022-03-01 00:00 UTC)).finish(),
            Transaction::build(2, 20.0, datetime!(2022-04-01 00:00 UTC)).finish(),
        ];

        let count = replace_all_transactions(&new_transactions, &conn).unwrap();

        assert_eq!(count, 2);
        assert_eq!(all_transactions(&conn), new_transactions);
    }

    #[test]
    fn failed_replace_keeps_existing_transactions() {
        let conn = get_test_connection();
        let existing = Transaction::build(99, 1.0, datetime!(2020-01-01 00:00 UTC)).finish();
        insert_transactions(&[existing.clone()], &conn).unwrap();
        // The CHECK constraint rejects the second row after the first was staged.
        let new_transactions = [
            Transaction::build(1, 10.0, datetime!(2022-03-01 00:00 UTC)).finish(),
            Transaction::build(2, -20.0, datetime!(2022-04-01 00:00 UTC)).finish(),
        ];

        let result = replace_all_transactions(&new_transactions, &conn);

        assert!(matches!(result, Err(Error::StoreFailure(_))));
        assert_eq!(all_transactions(&conn), [existing]);
    }

    #[test]
    fn replace_keeps_indexes() {
        let conn = get_test_connection();

        replace_all_transactions(&[], &conn).unwrap();

        let index_count: u32 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master \
                WHERE type = 'index' AND tbl_name = 'product_transaction' \
                AND name LIKE 'idx_%'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(index_count, 2);
    }

    #[tokio::test]
    async fn reseed_is_idempotent() {
        let path = write_seed_file("idempotent", SEED_JSON);
        let source = SeedSource::File(path);
        let db_connection = Mutex::new(get_test_connection());

        reseed(&source, &db_connection).await.unwrap();
        let first = all_transactions(&db_connection.lock().unwrap());
        reseed(&source, &db_connection).await.unwrap();
        let second = all_transactions(&db_connection.lock().unwrap());

        assert_eq!(first.len(), 2);
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn rejects_negative_prices_before_touching_the_store() {
        let path = write_seed_file(
            "negative_price",
            r#"[{"id": 1, "title": "a", "price": -1, "description": "b",
                "category": "c", "sold": true, "dateOfSale": "2022-03-01T00:00:00Z"}]"#,
        );
        let conn = get_test_connection();
        insert_transactions(
            &[Transaction::build(5, 5.0, datetime!(2022-03-01 00:00 UTC)).finish()],
            &conn,
        )
        .unwrap();
        let db_connection = Mutex::new(conn);

        let result = reseed(&SeedSource::File(path), &db_connection).await;

        assert!(matches!(result, Err(Error::UpstreamFailure(_))));
        assert_eq!(count_transactions(&db_connection.lock().unwrap()).unwrap(), 1);
    }

    fn get_test_server(seed_source: SeedSource) -> (TestServer, Arc<Mutex<rusqlite::Connection>>) {
        let db_connection = Arc::new(Mutex::new(get_test_connection()));
        let state = SeedState {
            db_connection: db_connection.clone(),
            seed_source,
        };
        let app = Router::new()
            .route(endpoints::INITIALIZE_DATABASE, get(initialize_database_endpoint))
            .with_state(state);

        (
            TestServer::try_new(app).expect("Could not create test server."),
            db_connection,
        )
    }

    #[tokio::test]
    async fn endpoint_reports_success() {
        let path = write_seed_file("endpoint_success", SEED_JSON);
        let (server, db_connection) = get_test_server(SeedSource::File(path));

        let response = server.get(endpoints::INITIALIZE_DATABASE).await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["message"], "Database initialized with seed data");
        assert_eq!(body["count"], 2);
        assert_eq!(count_transactions(&db_connection.lock().unwrap()).unwrap(), 2);
    }

    #[tokio::test]
    async fn endpoint_reports_missing_file() {
        let path = PathBuf::from("/definitely/not/a/real/seed.json");
        let (server, _) = get_test_server(SeedSource::File(path));

        let response = server
            .get(endpoints::INITIALIZE_DATABASE)
            .expect_failure()
            .await;

        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = response.json();
        assert_eq!(body["error"], "Failed to initialize database");
        assert!(body["details"].as_str().unwrap().contains("could not read"));
    }

    #[tokio::test]
    async fn endpoint_reports_malformed_json() {
        let path = write_seed_file("malformed", r#"{"not": "an array"}"#);
        let (server, _) = get_test_server(SeedSource::File(path));

        let response = server
            .get(endpoints::INITIALIZE_DATABASE)
            .expect_failure()
            .await;

        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = response.json();
        assert!(body["details"].as_str().unwrap().contains("invalid seed data"));
    }

    #[tokio::test]
    async fn endpoint_reports_unreachable_url() {
        // Nothing listens on port 1, so the connection is refused.
        let (server, _) = get_test_server(SeedSource::url("http://127.0.0.1:1/seed.json"));

        let response = server
            .get(endpoints::INITIALIZE_DATABASE)
            .expect_failure()
            .await;

        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = response.json();
        assert!(body["details"].as_str().unwrap().contains("request to"));
    }
}
