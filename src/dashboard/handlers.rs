//! Dashboard HTTP handler and view rendering.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    dashboard::{
        charts::{DashboardChart, category_chart, charts_script, charts_view, price_range_chart},
        tables::statistics_table,
    },
    endpoints,
    html::{BUTTON_SECONDARY_STYLE, FORM_LABEL_STYLE, FORM_SELECT_STYLE, HeadElement, base},
    month::{MonthQuery, SaleMonth},
    navigation::NavBar,
    report::{CombinedReport, get_combined_report},
};

const ECHARTS_URL: &str = "https://cdn.jsdelivr.net/npm/echarts@6.0.0/dist/echarts.min.js";

/// The state needed for displaying the dashboard page.
#[derive(Debug, Clone)]
pub struct DashboardState {
    /// The database connection for reading transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Display the reports for a month, March if no month is given.
pub async fn get_dashboard_page(
    State(state): State<DashboardState>,
    Query(query): Query<MonthQuery>,
) -> Response {
    match build_dashboard(&state, &query) {
        Ok(markup) => markup.into_response(),
        Err(error) => error.into_page_response(),
    }
}

fn build_dashboard(state: &DashboardState, query: &MonthQuery) -> Result<Markup, Error> {
    let month = match query.month.as_deref() {
        None => SaleMonth::default(),
        Some(_) => query.month()?,
    };

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let report = get_combined_report(month, &connection)
        .inspect_err(|error| tracing::error!("could not build the report for {month}: {error}"))?;

    Ok(dashboard_view(month, &report))
}

fn build_dashboard_charts(month_name: &str, report: &CombinedReport) -> [DashboardChart; 2] {
    [
        DashboardChart {
            id: "price-range-chart",
            options: price_range_chart(month_name, &report.barchart).to_string(),
        },
        DashboardChart {
            id: "category-chart",
            options: category_chart(month_name, &report.piechart).to_string(),
        },
    ]
}

fn month_selector(selected: SaleMonth) -> Markup {
    html! {
        form method="get" action=(endpoints::DASHBOARD_VIEW) class="flex items-end gap-2"
        {
            div
            {
                label for="month" class=(FORM_LABEL_STYLE) { "Month" }

                select id="month" name="month" class=(FORM_SELECT_STYLE)
                {
                    @for month in SaleMonth::all() {
                        option value=(month.number()) selected[month == selected] { (month) }
                    }
                }
            }

            button type="submit" class=(BUTTON_SECONDARY_STYLE) { "Show" }
        }
    }
}

fn dashboard_view(month: SaleMonth, report: &CombinedReport) -> Markup {
    let nav_bar = NavBar::new(endpoints::DASHBOARD_VIEW).into_html();
    let month_name = month.name();
    let charts = build_dashboard_charts(&month_name, report);

    let content = html!(
        (nav_bar)

        div
            id="dashboard-content"
            class="flex flex-col items-center gap-4 px-2 lg:px-6 lg:py-8 mx-auto
                max-w-screen-xl text-gray-900 dark:text-white"
        {
            header class="w-full flex justify-between flex-wrap items-end gap-4"
            {
                h1 class="text-xl font-bold" { "Sales in " (month_name) }

                (month_selector(month))
            }

            (statistics_table(&month_name, &report.statistics))

            (charts_view(&charts))
        }
    );

    let scripts = [
        HeadElement::ScriptLink(ECHARTS_URL.to_owned()),
        charts_script(&charts),
    ];

    base("Dashboard", &scripts, &content)
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        extract::{Query, State},
        http::StatusCode,
    };
    use rusqlite::Connection;
    use scraper::{Html, Selector};
    use time::macros::datetime;

    use crate::{
        month::MonthQuery,
        test_utils::{assert_valid_html, get_test_connection, parse_html_document},
        transaction::{Transaction, insert_transactions},
    };

    use super::{DashboardState, get_dashboard_page};

    fn get_state() -> DashboardState {
        let conn = get_test_connection();
        insert_transactions(
            &[
                Transaction::build(1, 50.0, datetime!(2022-03-01 00:00 UTC))
                    .category("electronics")
                    .sold(true)
                    .finish(),
                Transaction::build(2, 150.5, datetime!(2022-03-02 00:00 UTC))
                    .category("jewelery")
                    .finish(),
                Transaction::build(3, 75.0, datetime!(2022-07-02 00:00 UTC))
                    .category("jewelery")
                    .sold(true)
                    .finish(),
            ],
            &conn,
        )
        .unwrap();

        DashboardState {
            db_connection: Arc::new(Mutex::new(conn)),
        }
    }

    fn month_query(month: Option<&str>) -> Query<MonthQuery> {
        Query(MonthQuery {
            month: month.map(str::to_owned),
        })
    }

    #[track_caller]
    fn get_statistics_cells(html: &Html) -> Vec<String> {
        let selector = Selector::parse("#statistics td").unwrap();

        html.select(&selector)
            .map(|cell| cell.text().collect::<String>().trim().to_owned())
            .collect()
    }

    #[track_caller]
    fn assert_chart_exists(html: &Html, chart_id: &str) {
        let selector = Selector::parse(&format!("#{}", chart_id)).unwrap();
        assert!(
            html.select(&selector).next().is_some(),
            "Chart with id '{}' not found",
            chart_id
        );
    }

    #[track_caller]
    fn get_selected_month(html: &Html) -> String {
        let selector = Selector::parse("select[name=month] option[selected]").unwrap();

        html.select(&selector)
            .next()
            .and_then(|option| option.value().attr("value"))
            .expect("No selected month found")
            .to_owned()
    }

    #[tokio::test]
    async fn defaults_to_march() {
        let response = get_dashboard_page(State(get_state()), month_query(None)).await;

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        assert_eq!(get_statistics_cells(&html), ["$200.50", "1", "1"]);
        assert_eq!(get_selected_month(&html), "3");
        assert_chart_exists(&html, "price-range-chart");
        assert_chart_exists(&html, "category-chart");
    }

    #[tokio::test]
    async fn shows_requested_month() {
        let response = get_dashboard_page(State(get_state()), month_query(Some("7"))).await;

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        assert_eq!(get_statistics_cells(&html), ["$75.00", "1", "0"]);
        assert_eq!(get_selected_month(&html), "7");
    }

    #[tokio::test]
    async fn invalid_month_is_bad_request() {
        let response = get_dashboard_page(State(get_state()), month_query(Some("13"))).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn store_failure_is_server_error() {
        let state = DashboardState {
            db_connection: Arc::new(Mutex::new(Connection::open_in_memory().unwrap())),
        };

        let response = get_dashboard_page(State(state), month_query(Some("3"))).await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
