//! Subscription end-date arithmetic over Russian date phrases.
//!
//! A start date such as `"31 января 2024"` plus a subscription length in
//! months yields the end date as another phrase (`"29 февраля 2024"`). Days
//! that do not exist in the target month are clamped to its last day.
//! [`SubscriptionGate`] puts a payment check in front of the computation.

mod consts;
mod gate;
mod locale;
mod prelude;
mod types;

pub use consts::*;
pub use gate::{GateError, PaymentLookup, SubscriptionGate, Transaction, TransactionStatus};
pub use locale::{MONTH_NAMES_GENITIVE, month_name, month_number};
pub use types::{DateParts, SubscriptionDuration, days_in_month, is_leap_year, is_valid_date};

use crate::prelude::*;
use std::str::FromStr;

/// A real date in the proleptic Gregorian calendar.
///
/// Values come from [`CalendarDate::new`], parsing, or month arithmetic on an
/// existing date, so the day always exists in its month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display)]
#[display(fmt = "{}", "format_date(*day, *month, *year)")]
pub struct CalendarDate {
    year: i64,
    month: u8,
    day: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DateError {
    #[error("Недопустимая длительность подписки: {0}")]
    InvalidDuration(i32),
    #[error("Неверный формат даты: {0:?}")]
    InvalidFormat(String),
    #[error("Некорректные значения даты: {0:?}")]
    InvalidValue(String),
    #[error("Некорректная дата начала: {day} {month} {year}")]
    InvalidStartDate { day: i64, month: u8, year: i64 },
}

impl CalendarDate {
    /// Creates a date, checking it against the calendar
    ///
    /// # Errors
    /// Returns `DateError::InvalidStartDate` if the day does not exist.
    pub fn new(day: u8, month: u8, year: i64) -> Result<Self, DateError> {
        Self::try_from(DateParts {
            day: i64::from(day),
            month,
            year,
        })
    }

    pub const fn day(&self) -> u8 {
        self.day
    }

    pub const fn month(&self) -> u8 {
        self.month
    }

    pub const fn year(&self) -> i64 {
        self.year
    }

    /// Genitive name of this date's month
    pub fn month_name(&self) -> &'static str {
        month_name(self.month).unwrap_or_default()
    }

    /// Moves the date by a whole number of months, clamping the day to the
    /// length of the target month (31 January + 1 month is 28 or 29 February).
    ///
    /// Negative offsets move backwards and may produce a year before 1; an
    /// offset past `MAX_YEAR` yields a year above it. Years only saturate at
    /// `i64::MAX` after repeated offsets, never from a single call on a date
    /// built by [`CalendarDate::new`] or parsing.
    pub fn add_months(self, months: i32) -> Self {
        let per_year = i128::from(MONTHS_PER_YEAR);
        let absolute = i128::from(self.year) * per_year
            + i128::from(self.month - JANUARY)
            + i128::from(months);

        let year = i64::try_from(absolute.div_euclid(per_year)).unwrap_or(i64::MAX);
        let month = u8::try_from(absolute.rem_euclid(per_year))
            .map_or(DECEMBER, |index| index + JANUARY);
        let day = self.day.min(days_in_month(month, year));

        Self { year, month, day }
    }
}

impl TryFrom<DateParts> for CalendarDate {
    type Error = DateError;

    fn try_from(parts: DateParts) -> Result<Self, Self::Error> {
        let invalid = || DateError::InvalidStartDate {
            day: parts.day,
            month: parts.month,
            year: parts.year,
        };
        if !parts.is_valid() {
            return Err(invalid());
        }
        let day = u8::try_from(parts.day).map_err(|_| invalid())?;
        Ok(Self {
            year: parts.year,
            month: parts.month,
            day,
        })
    }
}

/// Splits a date phrase into day, month and year.
///
/// Each token only has to convert: the day and year must be non-zero
/// integers and the month a known genitive name. Whether the result is a
/// real date is left to [`DateParts::is_valid`], so `"10 марта -2024"`
/// parses here and is rejected later.
///
/// # Errors
/// `DateError::InvalidFormat` unless there are exactly three tokens,
/// `DateError::InvalidValue` if a token does not convert.
pub fn parse_date(text: &str) -> Result<DateParts, DateError> {
    let lowered = text.trim().to_lowercase();
    let tokens: Vec<&str> = lowered.split_whitespace().collect();

    let [day, month, year] = tokens[..] else {
        return Err(DateError::InvalidFormat(text.to_owned()));
    };

    let day = parse_component(day)?;
    let month = month_number(month).ok_or_else(|| DateError::InvalidValue(month.to_owned()))?;
    let year = parse_component(year)?;

    Ok(DateParts { day, month, year })
}

/// Parses a day or year token; zero counts as missing.
/// Only plain integers are accepted, so `"1e1"` and `"2024.0"` are rejected.
fn parse_component(token: &str) -> Result<i64, DateError> {
    token
        .parse::<i64>()
        .ok()
        .filter(|value| *value != 0)
        .ok_or_else(|| DateError::InvalidValue(token.to_owned()))
}

/// Renders `"<day> <genitive month> <year>"`.
///
/// The month is not validated; a number outside 1-12 is printed as is.
pub fn format_date(day: u8, month: u8, year: i64) -> String {
    match month_name(month) {
        Some(name) => format!("{day} {name} {year}"),
        None => format!("{day} {month} {year}"),
    }
}

/// Computes when a subscription of `duration_months` bought on `start` ends.
///
/// # Errors
/// `DateError::InvalidDuration` before anything else if the duration is not
/// 1, 3, 6 or 12; then any `parse_date` error; then
/// `DateError::InvalidStartDate` if the start date does not exist.
pub fn compute_end_date(start: &str, duration_months: i32) -> Result<String, DateError> {
    let duration = SubscriptionDuration::new(duration_months)?;
    let start_date = CalendarDate::try_from(parse_date(start)?)?;
    let end_date = start_date.add_months(i32::from(duration.months()));

    tracing::debug!(
        start = %start_date,
        end = %end_date,
        months = duration.months(),
        "computed subscription end date"
    );

    Ok(end_date.to_string())
}

impl FromStr for CalendarDate {
    type Err = DateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_from(parse_date(s)?)
    }
}

impl serde::Serialize for CalendarDate {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> serde::Deserialize<'de> for CalendarDate {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
