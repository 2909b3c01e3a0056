//! Parsing of the `month` query parameter.
//!
//! The report endpoints take a month number, the transaction listing also
//! accepts month names. Both ignore the year: a month selects every sale
//! made in that calendar month of any year.

use std::fmt::Display;

use serde::Deserialize;
use time::Month;

use crate::Error;

const MONTH_NAMES: [&str; 12] = [
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

/// A calendar month, independent of the year.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaleMonth(Month);

impl SaleMonth {
    /// Parse a month number between 1 and 12 (inclusive).
    ///
    /// # Errors
    /// Returns [Error::InvalidArgument] if `text` is empty, not a base-10
    /// integer, or outside of 1 to 12.
    pub fn from_number(text: &str) -> Result<Self, Error> {
        let number: u8 = text
            .trim()
            .parse()
            .map_err(|_| invalid_month(format!("\"{text}\" is not a month number")))?;

        Month::try_from(number)
            .map(Self)
            .map_err(|_| invalid_month(format!("{number} is not between 1 and 12")))
    }

    /// Parse a month name ("March"), a three letter abbreviation ("Mar") or
    /// a month number. Names are matched case-insensitively.
    ///
    /// # Errors
    /// Returns [Error::InvalidArgument] if `text` is none of the above.
    pub fn from_name_or_number(text: &str) -> Result<Self, Error> {
        let trimmed = text.trim();

        if trimmed.chars().all(|c| c.is_ascii_digit()) {
            return Self::from_number(trimmed);
        }

        let lowercase = trimmed.to_lowercase();
        let position = MONTH_NAMES.iter().position(|name| {
            *name == lowercase || (lowercase.len() == 3 && name.starts_with(&lowercase))
        });

        match position {
            Some(index) => Self::from_number(&(index + 1).to_string()),
            None => Err(invalid_month(format!("\"{text}\" is not a month name"))),
        }
    }

    /// Every month from January to December.
    pub fn all() -> impl Iterator<Item = SaleMonth> {
        (1..=12u8)
            .filter_map(|number| Month::try_from(number).ok())
            .map(Self)
    }

    /// The month number, January is 1.
    pub fn number(self) -> u8 {
        self.0 as u8
    }

    /// The full English name of the month, e.g. "March".
    pub fn name(self) -> String {
        self.0.to_string()
    }
}

impl Default for SaleMonth {
    fn default() -> Self {
        Self(Month::March)
    }
}

impl Display for SaleMonth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn invalid_month(reason: String) -> Error {
    Error::InvalidArgument {
        name: "month",
        reason: format!("{reason}, month must be an integer between 1 and 12"),
    }
}

/// The query string for the report endpoints.
///
/// The month is kept as raw text so that a missing or malformed value is
/// reported through [Error::InvalidArgument] instead of an extractor rejection.
#[derive(Debug, Default, Deserialize)]
pub struct MonthQuery {
    /// The month number, 1 to 12.
    pub month: Option<String>,
}

impl MonthQuery {
    /// Validate the month.
    ///
    /// # Errors
    /// Returns [Error::InvalidArgument] if the month is missing or invalid.
    pub fn month(&self) -> Result<SaleMonth, Error> {
        match &self.month {
            Some(month) => SaleMonth::from_number(month),
            None => Err(Error::InvalidArgument {
                name: "month",
                reason: "the month query parameter is required".to_owned(),
            }),
        }
    }
}
