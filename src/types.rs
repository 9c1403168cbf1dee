use crate::DateError;
use crate::consts::{
    ALLOWED_DURATIONS, CENTURY_CYCLE, DAYS_IN_MONTH, FEBRUARY, FEBRUARY_DAYS_LEAP,
    GREGORIAN_CYCLE, LEAP_YEAR_CYCLE, MAX_YEAR, MIN_DAY, MONTHS_PER_YEAR,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The three components of a date phrase after token conversion.
///
/// Every component is non-zero and the month is a known month number, but
/// nothing has been checked against the calendar yet: a negative year or
/// the 31st of February are representable here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DateParts {
    pub day: i64,
    pub month: u8,
    pub year: i64,
}

impl DateParts {
    /// Whether the parts name a real Gregorian date
    pub fn is_valid(&self) -> bool {
        is_valid_date(self.day, i64::from(self.month), self.year)
    }
}

/// A subscription length guaranteed to be one of `ALLOWED_DURATIONS` months
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "u8")]
pub struct SubscriptionDuration(u8);

impl SubscriptionDuration {
    /// Creates a new duration, validating it against `ALLOWED_DURATIONS`
    ///
    /// # Errors
    /// Returns `DateError::InvalidDuration` for any other month count,
    /// including zero and negative values.
    pub fn new(months: i32) -> Result<Self, DateError> {
        u8::try_from(months)
            .ok()
            .filter(|m| ALLOWED_DURATIONS.contains(m))
            .map(Self)
            .ok_or(DateError::InvalidDuration(months))
    }

    /// Returns the number of months
    #[inline]
    pub const fn months(self) -> u8 {
        self.0
    }
}

impl TryFrom<i32> for SubscriptionDuration {
    type Error = DateError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<SubscriptionDuration> for u8 {
    fn from(duration: SubscriptionDuration) -> Self {
        duration.0
    }
}

impl fmt::Display for SubscriptionDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// Calendar helpers

pub const fn is_leap_year(year: i64) -> bool {
    (year % LEAP_YEAR_CYCLE == 0 && year % CENTURY_CYCLE != 0) || (year % GREGORIAN_CYCLE == 0)
}

/// Number of days in `month` of `year`, or 0 when `month` is not 1-12.
pub const fn days_in_month(month: u8, year: i64) -> u8 {
    if month == 0 || month > MONTHS_PER_YEAR {
        return 0;
    }

    if month == FEBRUARY && is_leap_year(year) {
        FEBRUARY_DAYS_LEAP
    } else {
        DAYS_IN_MONTH[month as usize]
    }
}

/// Checks whether `day`/`month`/`year` is a real date in the proleptic
/// Gregorian calendar. Years outside `1..=MAX_YEAR` are rejected.
pub fn is_valid_date(day: i64, month: i64, year: i64) -> bool {
    if !(1..=MAX_YEAR).contains(&year) {
        return false;
    }
    let Ok(month) = u8::try_from(month) else {
        return false;
    };
    if month == 0 || month > MONTHS_PER_YEAR {
        return false;
    }
    if day < i64::from(MIN_DAY) {
        return false;
    }

    day <= i64::from(days_in_month(month, year))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leap_years() {
        assert!(is_leap_year(2024));
        assert!(is_leap_year(2000));
        assert!(is_leap_year(1600));
        assert!(!is_leap_year(2023));
        assert!(!is_leap_year(1900));
        assert!(!is_leap_year(2100));
    }

    #[test]
    fn test_days_in_month() {
        assert_eq!(days_in_month(1, 2023), 31);
        assert_eq!(days_in_month(2, 2023), 28);
        assert_eq!(days_in_month(2, 2024), 29);
        assert_eq!(days_in_month(2, 1900), 28);
        assert_eq!(days_in_month(2, 2000), 29);
        assert_eq!(days_in_month(4, 2024), 30);
        assert_eq!(days_in_month(11, 2024), 30);
        assert_eq!(days_in_month(12, 2024), 31);
    }

    #[test]
    fn test_days_in_month_out_of_range() {
        assert_eq!(days_in_month(0, 2024), 0);
        assert_eq!(days_in_month(13, 2024), 0);
    }

    #[test]
    fn test_is_valid_date_rejects_bad_months() {
        for month in [0, -3, 13, 15] {
            assert!(!is_valid_date(10, month, 2024), "month {month}");
        }
    }

    #[test]
    fn test_is_valid_date_rejects_bad_days() {
        for day in [0, -1] {
            assert!(!is_valid_date(day, 3, 2024), "day {day}");
        }
        assert!(!is_valid_date(32, 1, 2024));
        assert!(!is_valid_date(31, 4, 2024));
        assert!(!is_valid_date(30, 2, 2024));
        assert!(!is_valid_date(29, 2, 2023));
    }

    #[test]
    fn test_is_valid_date_rejects_years_before_one() {
        assert!(!is_valid_date(10, 3, 0));
        assert!(!is_valid_date(10, 3, -2024));
        assert!(!is_valid_date(1, 1, i64::MIN));
    }

    #[test]
    fn test_is_valid_date_rejects_years_after_max() {
        assert!(is_valid_date(31, 12, MAX_YEAR));
        assert!(!is_valid_date(1, 1, MAX_YEAR + 1));
        assert!(!is_valid_date(31, 12, i64::MAX));
    }

    #[test]
    fn test_is_valid_date_accepts_every_real_day() {
        for year in [1, 1900, 2000, 2023, 2024, 9999] {
            for month in 1..=MONTHS_PER_YEAR {
                for day in 1..=days_in_month(month, year) {
                    assert!(
                        is_valid_date(i64::from(day), i64::from(month), year),
                        "{day}.{month}.{year}"
                    );
                }
            }
        }
    }

    #[test]
    fn test_date_parts_is_valid() {
        let parts = DateParts {
            day: 29,
            month: 2,
            year: 2024,
        };
        assert!(parts.is_valid());

        let parts = DateParts {
            day: 10,
            month: 3,
            year: -2024,
        };
        assert!(!parts.is_valid());
    }

    #[test]
    fn test_duration_allowed_values() {
        for months in [1, 3, 6, 12] {
            let duration = SubscriptionDuration::new(months).unwrap();
            assert_eq!(i32::from(duration.months()), months);
        }
    }

    #[test]
    fn test_duration_rejected_values() {
        for months in [-12, -1, 0, 2, 4, 5, 7, 11, 13, 24, 256 + 1, i32::MAX, i32::MIN] {
            let result = SubscriptionDuration::new(months);
            assert!(
                matches!(result, Err(DateError::InvalidDuration(m)) if m == months),
                "duration {months}"
            );
        }
    }

    #[test]
    fn test_duration_try_from_and_into() {
        let duration: SubscriptionDuration = 6.try_into().unwrap();
        let value: u8 = duration.into();
        assert_eq!(value, 6);
        assert_eq!(duration.to_string(), "6");

        let result: Result<SubscriptionDuration, _> = 2.try_into();
        assert!(result.is_err());
    }

    #[test]
    fn test_duration_serde() {
        let duration = SubscriptionDuration::new(12).unwrap();
        let json = serde_json::to_string(&duration).unwrap();
        assert_eq!(json, "12");

        let parsed: SubscriptionDuration = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, duration);

        assert!(serde_json::from_str::<SubscriptionDuration>("2").is_err());
        assert!(serde_json::from_str::<SubscriptionDuration>("-1").is_err());
    }
}
