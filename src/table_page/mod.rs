//! The page that pages through every transaction, ten at a time.
//!
//! Each request fetches its page from the database again, there is no
//! caching of previously visited pages.

mod state;
mod view;

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error,
    pagination::{PageRequest, PaginationConfig},
    transaction::{Transaction, TransactionFilter, get_transactions_page},
};

use state::{PER_PAGE, TransactionTable};

use view::transaction_table_view;

const FETCH_ERROR_MESSAGE: &str = "Failed to fetch transactions";

/// The state needed for the transaction table page.
#[derive(Debug, Clone)]
pub struct TablePageState {
    /// The database connection for reading transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for TablePageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The query string for the transaction table page.
#[derive(Debug, Default, Deserialize)]
pub struct TablePageQuery {
    /// The page number, starting from 1.
    pub page: Option<String>,
}

/// Render one page of the transaction table.
///
/// An invalid page number gives a 400 error page. If the transactions cannot
/// be fetched the table is shown with an error alert and a 500 status.
pub async fn get_transaction_table_page(
    State(state): State<TablePageState>,
    Query(query): Query<TablePageQuery>,
) -> Response {
    let config = PaginationConfig {
        default_page: 1,
        default_page_size: PER_PAGE,
    };
    let page = match PageRequest::from_query(query.page.as_deref(), None, &config) {
        Ok(page) => page,
        Err(error) => return error.into_page_response(),
    };

    let table = TransactionTable::new(page.page);

    match fetch_page(page, &state.db_connection) {
        Ok(transactions) => transaction_table_view(&table.loaded(transactions)).into_response(),
        Err(error) => {
            tracing::error!("could not fetch page {} of transactions: {error}", page.page);

            (
                StatusCode::INTERNAL_SERVER_ERROR,
                transaction_table_view(&table.failed(FETCH_ERROR_MESSAGE)),
            )
                .into_response()
        }
    }
}

fn fetch_page(
    page: PageRequest,
    db_connection: &Mutex<Connection>,
) -> Result<Vec<Transaction>, Error> {
    let connection = db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    get_transactions_page(&TransactionFilter::default(), page, &connection)
}
