//! Shared page chrome, styles and formatting helpers for the HTML pages.

use maud::{DOCTYPE, Markup, PreEscaped, html};

use std::sync::OnceLock;

use numfmt::{Formatter, Precision};

// Button styles
pub const BUTTON_SECONDARY_STYLE: &str = "py-2.5 px-5 text-sm font-medium \
    text-gray-900 bg-white rounded border border-gray-200 hover:bg-gray-100 \
    hover:text-blue-700 focus:z-10 dark:bg-gray-800 dark:text-gray-400 \
    dark:border-gray-600 dark:hover:text-white dark:hover:bg-gray-700";

pub const BUTTON_DISABLED_STYLE: &str = "py-2.5 px-5 text-sm font-medium \
    text-gray-400 bg-gray-100 rounded border border-gray-200 cursor-not-allowed \
    dark:bg-gray-700 dark:text-gray-500 dark:border-gray-600";

// Form styles
pub const FORM_LABEL_STYLE: &str = "block mb-2 text-sm font-medium text-gray-900 dark:text-white";
pub const FORM_SELECT_STYLE: &str = "block p-2.5 rounded text-sm \
    text-gray-900 dark:text-white bg-gray-50 dark:bg-gray-700 border \
    border-gray-300 dark:border-gray-600 focus:ring-blue-600 focus:border-blue-600";

// Table styles
pub const TABLE_HEADER_STYLE: &str = "text-xs text-gray-700 uppercase \
    bg-gray-50 dark:bg-gray-700 dark:text-gray-400";

pub const TABLE_ROW_STYLE: &str = "bg-white border-b dark:bg-gray-800 dark:border-gray-700";

pub const TABLE_CELL_STYLE: &str = "px-6 py-4";

// Badge styles
pub const SOLD_BADGE_STYLE: &str = "inline-flex items-center px-2.5 py-0.5 \
    text-xs font-semibold text-green-800 bg-green-100 rounded-full \
    dark:bg-green-900 dark:text-green-300";

pub const NOT_SOLD_BADGE_STYLE: &str = "inline-flex items-center px-2.5 py-0.5 \
    text-xs font-semibold text-gray-800 bg-gray-100 rounded-full \
    dark:bg-gray-700 dark:text-gray-300";

// Page container
pub const PAGE_CONTAINER_STYLE: &str =
    "flex flex-col items-center px-6 py-8 mx-auto lg:py-5 text-gray-900 dark:text-white";

/// Extra elements to place in the page's `<head>`.
pub enum HeadElement {
    /// The file path or URL to a JavaScript script.
    ScriptLink(String),
    /// JavaScript source code.
    ScriptSource(PreEscaped<String>),
}

/// Wrap `content` in the HTML document shared by every page.
pub fn base(title: &str, head_elements: &[HeadElement], content: &Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en"
        {
            head
            {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) " - Sale Ledger" }

                script src="https://cdn.tailwindcss.com" {}

                @for element in head_elements
                {
                    @match element
                    {
                        HeadElement::ScriptSource(text) => script { (text) }
                        HeadElement::ScriptLink(path) => script src=(path) {}
                    }
                }
            }

            body class="container max-w-full min-h-screen bg-gray-50 dark:bg-gray-900"
            {
                (content)
            }
        }
    }
}

/// A full page explaining that something went wrong.
pub fn error_view(title: &str, header: &str, description: &str, fix: &str) -> Markup {
    // Template adapted from https://flowbite.com/blocks/marketing/404/
    let content = html!(
        section class="bg-white dark:bg-gray-900"
        {
            div class="py-8 px-4 mx-auto max-w-screen-xl lg:py-16 lg:px-6"
            {
                div class="mx-auto max-w-screen-sm text-center"
                {
                    h1
                        class="mb-4 text-7xl tracking-tight font-extrabold
                            lg:text-9xl text-blue-600 dark:text-blue-500"
                    {
                        (header)
                    }

                    p
                        class="mb-4 text-3xl md:text-4xl tracking-tight
                            font-bold text-gray-900 dark:text-white"
                    {
                        (description)
                    }

                    p
                        class="mb-4 text-1xl md:text-2xl tracking-tight
                            text-gray-900 dark:text-white"
                    {
                        (fix)
                    }

                    a
                        href="/"
                        class="inline-flex text-white bg-blue-600
                            hover:bg-blue-800 focus:ring-4 focus:outline-hidden
                            focus:ring-blue-300 font-medium rounded text-sm px-5
                            py-2.5 text-center dark:focus:ring-blue-900 my-4"
                    {
                        "Back to Homepage"
                    }
                }
            }
        }
    );

    base(title, &[], &content)
}

/// An inline alert box for errors shown inside a page.
pub fn error_alert(message: &str) -> Markup {
    html! {
        div
            role="alert"
            class="w-full p-4 mb-4 text-sm text-red-800 rounded-lg bg-red-50
                dark:bg-gray-800 dark:text-red-400"
        {
            (message)
        }
    }
}

/// Format `number` as dollars with two decimal places, e.g. "$1,234.50".
pub fn format_currency(number: f64) -> String {
    static FMT: OnceLock<Option<Formatter>> = OnceLock::new();

    let fmt = FMT.get_or_init(|| {
        Formatter::currency("$")
            .map(|fmt| fmt.precision(Precision::Decimals(2)))
            .inspect_err(|error| tracing::error!("could not create currency formatter: {error:?}"))
            .ok()
    });

    let formatted_string = match fmt {
        // Zero is hardcoded as "0", so we must specify the formatted string for zero
        Some(_) if number == 0.0 => return "$0.00".to_owned(),
        Some(fmt) if number > 0.0 => fmt.fmt_string(number),
        Some(fmt) => format!("-{}", fmt.fmt_string(number.abs())),
        None => return format!("${number:.2}"),
    };

    // numfmt drops trailing zeros, e.g. "12.30" is rendered as "$12.3"
    match formatted_string.rfind('.') {
        Some(index) => {
            let decimals = formatted_string.len() - index - 1;
            format!("{formatted_string}{}", "0".repeat(2usize.saturating_sub(decimals)))
        }
        None => format!("{formatted_string}.00"),
    }
}
