//! Chart generation and rendering for the dashboard.
//!
//! This module creates interactive ECharts visualizations for a month:
//! - **Price Range Chart**: Bar chart of the number of sales per price range
//! - **Category Chart**: Pie chart of the number of sales per category
//!
//! Each chart is generated as JSON configuration for the ECharts library and
//! rendered with corresponding HTML containers and JavaScript initialization code.

use charming::{
    Chart,
    component::{Axis, Grid, Legend, Title},
    element::{AxisPointer, AxisPointerType, AxisType, Tooltip, Trigger},
    series::{Pie, bar},
};
use maud::{Markup, PreEscaped, html};

use crate::{
    html::HeadElement,
    report::{BarChartEntry, CategoryCount},
};

/// A dashboard chart with its HTML container ID and ECharts configuration.
pub(super) struct DashboardChart {
    /// The HTML element ID to use for the chart (kebab-case)
    pub id: &'static str,
    /// The ECharts configuration as a JSON string
    pub options: String,
}

/// Renders the HTML containers for dashboard charts.
pub(super) fn charts_view(charts: &[DashboardChart]) -> Markup {
    html!(
        section
            id="charts"
            class="w-full mx-auto mb-4"
        {
            div class="grid grid-cols-1 xl:grid-cols-2 gap-4"
            {
                @for chart in charts {
                    div
                        id=(chart.id)
                        class="min-h-[380px] rounded dark:bg-gray-100"
                    {}
                }
            }
        }
    )
}

/// Generates JavaScript initialization code for dashboard charts.
///
/// Creates scripts that initialize ECharts instances with dark mode support
/// and responsive resizing.
pub(super) fn charts_script(charts: &[DashboardChart]) -> HeadElement {
    let script_content = charts
        .iter()
        .map(|chart| {
            format!(
                r#"(function() {{
                    const chartDom = document.getElementById("{}");
                    const chart = echarts.init(chartDom);
                    const option = {};
                    chart.setOption(option);

                    window.addEventListener('resize', chart.resize);

                    const darkModeMediaQuery = window.matchMedia('(prefers-color-scheme: dark)');
                    const updateTheme = () => {{
                        const isDarkMode = darkModeMediaQuery.matches;
                        chart.setTheme(isDarkMode ? 'dark' : 'default');
                    }}
                    darkModeMediaQuery.addEventListener('change', updateTheme);
                    updateTheme();
                }})();"#,
                chart.id, chart.options
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let wrapped_script = format!(
        "document.addEventListener('DOMContentLoaded', function() {{\n{}\n}});",
        script_content
    );

    HeadElement::ScriptSource(PreEscaped(wrapped_script))
}

pub(super) fn price_range_chart(month_name: &str, entries: &[BarChartEntry]) -> Chart {
    let labels: Vec<String> = entries.iter().map(|entry| entry.range.clone()).collect();
    let counts: Vec<i64> = entries.iter().map(|entry| i64::from(entry.count)).collect();

    Chart::new()
        .title(
            Title::new()
                .text("Sales by price range")
                .subtext(format!("{month_name}, all years")),
        )
        .tooltip(
            Tooltip::new()
                .trigger(Trigger::Axis)
                .axis_pointer(AxisPointer::new().type_(AxisPointerType::Shadow)),
        )
        .grid(
            Grid::new()
                .left("3%")
                .right("4%")
                .bottom("3%")
                .contain_label(true),
        )
        .x_axis(Axis::new().type_(AxisType::Category).data(labels))
        .y_axis(Axis::new().type_(AxisType::Value))
        .series(bar::Bar::new().name("Transactions").data(counts))
}

pub(super) fn category_chart(month_name: &str, categories: &[CategoryCount]) -> Chart {
    let data: Vec<(i64, &str)> = categories
        .iter()
        .map(|category| (i64::from(category.count), category.category.as_str()))
        .collect();

    Chart::new()
        .title(
            Title::new()
                .text("Sales by category")
                .subtext(format!("{month_name}, all years")),
        )
        .tooltip(Tooltip::new().trigger(Trigger::Item))
        .legend(Legend::new().top("bottom"))
        .series(Pie::new().name("Transactions").radius("55%").data(data))
}

#[cfg(test)]
mod tests {
    use crate::{
        html::HeadElement,
        report::{BarChartEntry, CategoryCount},
    };

    use super::{DashboardChart, category_chart, charts_script, price_range_chart};

    #[test]
    fn price_range_chart_contains_labels_and_counts() {
        let entries = [
            BarChartEntry {
                range: "0-100".to_owned(),
                count: 4,
            },
            BarChartEntry {
                range: "901-above".to_owned(),
                count: 1,
            },
        ];

        let options = price_range_chart("March", &entries).to_string();

        assert!(options.contains("\"0-100\""), "{options}");
        assert!(options.contains("\"901-above\""), "{options}");
        assert!(options.contains("Sales by price range"), "{options}");
    }

    #[test]
    fn category_chart_contains_categories() {
        let categories = [CategoryCount {
            category: "electronics".to_owned(),
            count: 3,
        }];

        let options = category_chart("March", &categories).to_string();

        assert!(options.contains("electronics"), "{options}");
        assert!(options.contains("Sales by category"), "{options}");
    }

    #[test]
    fn script_initialises_every_chart() {
        let charts = [
            DashboardChart {
                id: "first-chart",
                options: "{}".to_owned(),
            },
            DashboardChart {
                id: "second-chart",
                options: "{}".to_owned(),
            },
        ];

        let HeadElement::ScriptSource(script) = charts_script(&charts) else {
            panic!("want a script source");
        };

        assert!(script.0.contains("getElementById(\"first-chart\")"));
        assert!(script.0.contains("getElementById(\"second-chart\")"));
    }
}
