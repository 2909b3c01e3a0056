//! Dashboard module
//!
//! Provides a page with the statistics, price ranges and categories of the
//! sales in a month.

mod charts;
mod handlers;
mod tables;

pub use handlers::get_dashboard_page;
