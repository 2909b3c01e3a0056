//! Table views for dashboard data display.

use maud::{Markup, html};

use crate::{
    html::{TABLE_CELL_STYLE, TABLE_ROW_STYLE, format_currency},
    report::Statistics,
};

const TABLE_HEADER_CELL_STYLE: &str =
    "px-6 py-4 font-medium text-gray-900 dark:text-white whitespace-nowrap";

/// Renders a table with the sale totals of a month.
pub(super) fn statistics_table(month_name: &str, statistics: &Statistics) -> Markup {
    let rows = [
        ("Total sale amount", format_currency(statistics.total_sale_amount)),
        ("Total sold items", statistics.sold_items_count.to_string()),
        ("Total not sold items", statistics.not_sold_items_count.to_string()),
    ];

    html! {
        div class="w-full" id="statistics" {
            h3 class="text-xl font-semibold mb-4" { "Statistics - " (month_name) }

            div class="overflow-x-auto rounded-lg shadow" {
                table class="w-full text-sm text-left text-gray-500 dark:text-gray-400" {
                    tbody {
                        @for (label, value) in rows {
                            tr class=(TABLE_ROW_STYLE) {
                                th scope="row" class=(TABLE_HEADER_CELL_STYLE) { (label) }
                                td class={(TABLE_CELL_STYLE) " text-right tabular-nums"} { (value) }
                            }
                        }
                    }
                }
            }
        }
    }
}
