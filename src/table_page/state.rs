//! The state of the transaction table as the reader pages through it.

use crate::transaction::Transaction;

/// The number of transactions shown on each page of the table.
pub const PER_PAGE: u64 = 10;

/// What the transaction table shows for one page.
///
/// A table starts out loading with [TransactionTable::new] and then moves to
/// either [TransactionTable::loaded] or [TransactionTable::failed].
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionTable {
    /// The page number, starting from 1.
    pub page: u64,
    /// The transactions on the page, empty until loaded.
    pub transactions: Vec<Transaction>,
    /// Whether the page was full, which suggests there is another page.
    pub has_next_page: bool,
    /// Whether the transactions are still being fetched.
    ///
    /// The page is only rendered after [TransactionTable::loaded] or
    /// [TransactionTable::failed], so a rendered table is never loading.
    pub loading: bool,
    /// The message to show if fetching the transactions failed.
    pub error: Option<String>,
}

impl TransactionTable {
    /// Start loading `page`. Pages below 1 are treated as page 1.
    pub fn new(page: u64) -> Self {
        Self {
            page: page.max(1),
            transactions: Vec::new(),
            has_next_page: false,
            loading: true,
            error: None,
        }
    }

    /// Show `transactions` as the content of the page.
    pub fn loaded(self, transactions: Vec<Transaction>) -> Self {
        Self {
            has_next_page: transactions.len() as u64 == PER_PAGE,
            transactions,
            loading: false,
            error: None,
            ..self
        }
    }

    /// Stop loading and show `message` instead of the transactions.
    pub fn failed(self, message: &str) -> Self {
        Self {
            transactions: Vec::new(),
            has_next_page: false,
            loading: false,
            error: Some(message.to_owned()),
            ..self
        }
    }

    /// Whether there is a page before this one.
    pub fn has_previous_page(&self) -> bool {
        self.page > 1
    }

    /// The page to go to for "previous", never lower than 1.
    pub fn previous_page(&self) -> u64 {
        self.page.saturating_sub(1).max(1)
    }

    /// The page to go to for "next". Stays on this page when it is the last one.
    pub fn next_page(&self) -> u64 {
        if self.has_next_page {
            self.page + 1
        } else {
            self.page
        }
    }
}
