//! Sale transactions.
//!
//! This module contains everything related to the transaction collection:
//! - The `Transaction` model and its builder for creating transactions
//! - Database functions for storing, querying, and paging through transactions
//! - The JSON endpoint for listing transactions

mod core;
mod list_endpoint;
mod query;

pub use core::{TRANSACTION_TABLE, Transaction, create_transaction_table, insert_transactions};
pub use list_endpoint::list_transactions_endpoint;
pub use query::{TransactionFilter, get_transactions_page};

pub(crate) use core::{
    SALE_MONTH_CONDITION, create_transaction_indexes, create_transaction_table_named,
    insert_transactions_into,
};
pub(crate) use query::register_search_function;

#[cfg(test)]
pub(crate) use core::count_transactions;
