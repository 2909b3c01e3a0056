//! Application router configuration.

use axum::{Router, routing::get};
use tower_http::cors::CorsLayer;

use crate::{
    AppState,
    dashboard::get_dashboard_page,
    endpoints,
    not_found::get_404_not_found,
    report::{bar_chart_endpoint, combined_endpoint, pie_chart_endpoint, statistics_endpoint},
    seed::initialize_database_endpoint,
    table_page::get_transaction_table_page,
    transaction::list_transactions_endpoint,
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let page_routes = Router::new()
        .route(endpoints::ROOT, get(get_transaction_table_page))
        .route(endpoints::TRANSACTIONS_VIEW, get(get_transaction_table_page))
        .route(endpoints::DASHBOARD_VIEW, get(get_dashboard_page));

    let api_routes = Router::new()
        .route(
            endpoints::INITIALIZE_DATABASE,
            get(initialize_database_endpoint),
        )
        .route(endpoints::TRANSACTIONS_API, get(list_transactions_endpoint))
        .route(endpoints::STATISTICS, get(statistics_endpoint))
        .route(endpoints::BAR_CHART, get(bar_chart_endpoint))
        .route(endpoints::PIE_CHART, get(pie_chart_endpoint))
        .route(endpoints::COMBINED, get(combined_endpoint));

    page_routes
        .merge(api_routes)
        .fallback(get_404_not_found)
        .layer(CorsLayer::permissive())
        .with_state(state)
}
