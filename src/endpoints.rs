//! The page and API endpoint URIs.

/// The root route which shows the transaction table.
pub const ROOT: &str = "/";
/// The page for paging through the transactions.
pub const TRANSACTIONS_VIEW: &str = "/transactions";
/// The page showing the reports for a month.
pub const DASHBOARD_VIEW: &str = "/dashboard";

/// The route that replaces the transactions with the seed data.
pub const INITIALIZE_DATABASE: &str = "/api/initializeDatabase";
/// The route for listing transactions.
pub const TRANSACTIONS_API: &str = "/api/transactions";
/// The route for the sale totals of a month.
pub const STATISTICS: &str = "/api/statistics";
/// The route for the price range counts of a month.
pub const BAR_CHART: &str = "/api/barchart";
/// The route for the category counts of a month.
pub const PIE_CHART: &str = "/api/piechart";
/// The route for all reports of a month.
pub const COMBINED: &str = "/api/combined";

/// Append `?page=N` to `endpoint_path`.
pub fn with_page(endpoint_path: &str, page: u64) -> String {
    format!("{endpoint_path}?page={page}")
}
