//! Monthly reports over the transaction collection.
//!
//! Every report takes a month number and matches the month of the sale date
//! in any year. The month is validated before the database is touched.

mod bar_chart;
mod combined;
mod pie_chart;
mod statistics;

use std::sync::{Arc, Mutex};

use axum::extract::FromRef;
use rusqlite::Connection;

use crate::AppState;

pub use bar_chart::{BarChartEntry, bar_chart_endpoint, get_bar_chart};
pub use combined::{CombinedReport, combined_endpoint, get_combined_report};
pub use pie_chart::{CategoryCount, get_pie_chart, pie_chart_endpoint};
pub use statistics::{Statistics, get_statistics, statistics_endpoint};

/// The state needed for the report endpoints.
#[derive(Debug, Clone)]
pub struct ReportState {
    /// The database connection for reading transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ReportState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}
