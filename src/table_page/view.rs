use maud::{Markup, html};

use crate::{
    endpoints,
    html::{
        BUTTON_DISABLED_STYLE, BUTTON_SECONDARY_STYLE, NOT_SOLD_BADGE_STYLE,
        PAGE_CONTAINER_STYLE, SOLD_BADGE_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE,
        TABLE_ROW_STYLE, base, error_alert, format_currency,
    },
    navigation::NavBar,
    transaction::Transaction,
};

use super::state::TransactionTable;

const COLUMN_COUNT: usize = 6;

pub(crate) fn transaction_table_view(table: &TransactionTable) -> Markup {
    let nav_bar = NavBar::new(endpoints::TRANSACTIONS_VIEW).into_html();

    let content = html! {
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4 w-full lg:max-w-5xl"
            {
                header class="flex justify-between flex-wrap items-end"
                {
                    h1 class="text-xl font-bold" { "Transactions" }
                }

                @if let Some(error) = &table.error {
                    (error_alert(error))
                }

                div class="relative overflow-x-auto rounded"
                {
                    table class="w-full my-2 text-sm text-left rtl:text-right
                        text-gray-500 dark:text-gray-400"
                    {
                        thead class=(TABLE_HEADER_STYLE)
                        {
                            tr
                            {
                                th scope="col" class=(TABLE_CELL_STYLE) { "ID" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Title" }
                                th scope="col" class="px-6 py-4 text-right" { "Price" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Date of Sale" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Sold" }
                            }
                        }

                        tbody
                        {
                            @for transaction in &table.transactions {
                                (transaction_row_view(transaction))
                            }

                            @if table.transactions.is_empty() && table.error.is_none() {
                                tr
                                {
                                    td
                                        colspan=(COLUMN_COUNT)
                                        data-empty-state="true"
                                        class="px-6 py-4 text-center"
                                    {
                                        "No transactions found"
                                    }
                                }
                            }
                        }
                    }
                }

                (pagination_view(table))
            }
        }
    };

    base("Transactions", &[], &content)
}

fn transaction_row_view(transaction: &Transaction) -> Markup {
    html! {
        tr class=(TABLE_ROW_STYLE) data-transaction-row="true"
        {
            td class=(TABLE_CELL_STYLE) { (transaction.id) }
            th scope="row" class="px-6 py-4 font-medium text-gray-900 dark:text-white"
            {
                (transaction.title)
            }
            td class="px-6 py-4 text-right tabular-nums"
            {
                (format_currency(transaction.price))
            }
            td class=(TABLE_CELL_STYLE) { (transaction.category) }
            td class=(TABLE_CELL_STYLE)
            {
                time datetime=(transaction.date_of_sale.date()) { (transaction.date_of_sale.date()) }
            }
            td class=(TABLE_CELL_STYLE)
            {
                @if transaction.sold {
                    span class=(SOLD_BADGE_STYLE) { "Yes" }
                } @else {
                    span class=(NOT_SOLD_BADGE_STYLE) { "No" }
                }
            }
        }
    }
}

fn pagination_view(table: &TransactionTable) -> Markup {
    html! {
        nav class="flex items-center justify-between" aria-label="Pagination"
        {
            @if table.has_previous_page() {
                a
                    href=(endpoints::with_page(endpoints::TRANSACTIONS_VIEW, table.previous_page()))
                    class=(BUTTON_SECONDARY_STYLE)
                    rel="prev"
                {
                    "Previous"
                }
            } @else {
                button type="button" class=(BUTTON_DISABLED_STYLE) disabled { "Previous" }
            }

            span class="text-sm" { "Page " (table.page) }

            @if table.has_next_page {
                a
                    href=(endpoints::with_page(endpoints::TRANSACTIONS_VIEW, table.next_page()))
                    class=(BUTTON_SECONDARY_STYLE)
                    rel="next"
                {
                    "Next"
                }
            } @else {
                button type="button" class=(BUTTON_DISABLED_STYLE) disabled { "Next" }
            }
        }
    }
}
