//! Defines the JSON endpoint for searching and paging through transactions.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Query, State},
};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error,
    month::SaleMonth,
    pagination::{PageRequest, PaginationConfig},
};

use super::{
    core::Transaction,
    query::{TransactionFilter, get_transactions_page},
};

/// The state needed for listing transactions.
#[derive(Debug, Clone)]
pub struct TransactionListState {
    /// The database connection for reading transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The defaults for `page` and `perPage`.
    pub pagination_config: PaginationConfig,
}

impl FromRef<AppState> for TransactionListState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            pagination_config: state.pagination_config.clone(),
        }
    }
}

/// The query string for the transaction listing.
///
/// Values are kept as raw text so that malformed values are reported as
/// [Error::InvalidArgument].
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    /// The page number to return. Starts from 1.
    pub page: Option<String>,
    /// The maximum number of transactions per page.
    pub per_page: Option<String>,
    /// Free text to search for.
    pub search: Option<String>,
    /// A month name such as "March", or a month number.
    pub month: Option<String>,
}

impl ListQuery {
    fn filter(&self) -> Result<TransactionFilter, Error> {
        let month = match self.month.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(month) => Some(SaleMonth::from_name_or_number(month)?),
        };

        Ok(TransactionFilter {
            search: self.search.clone().filter(|search| !search.is_empty()),
            month,
        })
    }
}

/// List one page of transactions, optionally narrowed down by a search text and a month.
///
/// No total count is returned. A page with fewer than `perPage` transactions is the last page.
pub async fn list_transactions_endpoint(
    State(state): State<TransactionListState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Transaction>>, Error> {
    let page = PageRequest::from_query(
        query.page.as_deref(),
        query.per_page.as_deref(),
        &state.pagination_config,
    )?;
    let filter = query.filter()?;

    tracing::debug!("Listing transactions {page:?} with {filter:?}");

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let transactions = get_transactions_page(&filter, page, &connection)
        .inspect_err(|error| tracing::error!("could not list transactions: {error}"))?;

    Ok(Json(transactions))
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{Router, http::StatusCode, routing::get};
    use axum_test::TestServer;
    use serde_json::Value;
    use time::macros::datetime;

    use crate::{
        endpoints,
        pagination::PaginationConfig,
        test_utils::get_test_connection,
        transaction::{Transaction, insert_transactions},
    };

    use super::{TransactionListState, list_transactions_endpoint};

    fn get_test_server(transactions: &[Transaction]) -> TestServer {
        let connection = get_test_connection();
        insert_transactions(transactions, &connection).unwrap();

        let state = TransactionListState {
            db_connection: Arc::new(Mutex::new(connection)),
            pagination_config: PaginationConfig::default(),
        };
        let app = Router::new()
            .route(endpoints::TRANSACTIONS_API, get(list_transactions_endpoint))
            .with_state(state);

        TestServer::try_new(app).expect("Could not create test server.")
    }

    fn fifteen_transactions() -> Vec<Transaction> {
        (1..=15)
            .map(|id| {
                Transaction::build(id, id as f64, datetime!(2022-03-01 00:00 UTC))
                    .title(&format!("Item {id}"))
                    .finish()
            })
            .collect()
    }

    #[tokio::test]
    async fn returns_first_page_by_default() {
        let server = get_test_server(&fifteen_transactions());

        let response = server.get(endpoints::TRANSACTIONS_API).await;

        response.assert_status_ok();
        let body: Vec<Value> = response.json();
        assert_eq!(body.len(), 10);
        assert_eq!(body[0]["id"], 1);
        assert_eq!(body[0]["title"], "Item 1");
        assert_eq!(body[0]["dateOfSale"], "2022-03-01T00:00:00Z");
    }

    #[tokio::test]
    async fn second_page_holds_the_remainder() {
        let server = get_test_server(&fifteen_transactions());

        let response = server
            .get(endpoints::TRANSACTIONS_API)
            .add_query_param("page", 2)
            .add_query_param("perPage", 10)
            .await;

        response.assert_status_ok();
        let body: Vec<Value> = response.json();
        let ids: Vec<_> = body.iter().map(|t| t["id"].as_i64().unwrap()).collect();
        assert_eq!(ids, (11..=15).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn filters_by_month_name_and_search() {
        let server = get_test_server(&[
            Transaction::build(1, 5.0, datetime!(2022-03-01 00:00 UTC))
                .title("Red shirt")
                .finish(),
            Transaction::build(2, 5.0, datetime!(2022-05-01 00:00 UTC))
                .title("Red hat")
                .finish(),
            Transaction::build(3, 5.0, datetime!(2021-03-01 00:00 UTC))
                .title("Blue shirt")
                .finish(),
        ]);

        let response = server
            .get(endpoints::TRANSACTIONS_API)
            .add_query_param("month", "March")
            .add_query_param("search", "red")
            .await;

        response.assert_status_ok();
        let body: Vec<Value> = response.json();
        assert_eq!(body.len(), 1);
        assert_eq!(body[0]["id"], 1);
    }

    #[tokio::test]
    async fn empty_parameters_are_ignored() {
        let server = get_test_server(&fifteen_transactions());

        let response = server
            .get(&format!(
                "{}?page=&perPage=&search=&month=",
                endpoints::TRANSACTIONS_API
            ))
            .await;

        response.assert_status_ok();
        let body: Vec<Value> = response.json();
        assert_eq!(body.len(), 10);
    }

    #[tokio::test]
    async fn rejects_invalid_month_name() {
        let server = get_test_server(&[]);

        let response = server
            .get(endpoints::TRANSACTIONS_API)
            .add_query_param("month", "Smarch")
            .expect_failure()
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["error"], "Invalid month");
    }

    #[tokio::test]
    async fn rejects_page_zero() {
        let server = get_test_server(&[]);

        let response = server
            .get(endpoints::TRANSACTIONS_API)
            .add_query_param("page", 0)
            .expect_failure()
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["error"], "Invalid page");
    }
}
