//! Sets up the schema of the application's SQLite database.

use rusqlite::{Connection, Transaction as SqlTransaction, TransactionBehavior};

use crate::{
    Error,
    transaction::{create_transaction_table, register_search_function},
};

/// Create the tables and indexes the application needs, if they do not exist yet,
/// and register the SQL functions used by the transaction search.
///
/// Existing data is left untouched, so this is safe to call on every start-up.
///
/// # Errors
/// Returns [Error::StoreFailure] if there is an SQL error.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    register_search_function(connection)?;

    let transaction = SqlTransaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    create_transaction_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}
