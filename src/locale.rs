//! Russian month names in the genitive case, as they appear in a date
//! phrase such as "14 марта 2025".

use crate::consts::MONTHS_PER_YEAR;

/// Genitive month names, January first.
pub const MONTH_NAMES_GENITIVE: [&str; MONTHS_PER_YEAR as usize] = [
    "января",
    "февраля",
    "марта",
    "апреля",
    "мая",
    "июня",
    "июля",
    "августа",
    "сентября",
    "октября",
    "ноября",
    "декабря",
];

/// Looks up the month number (1-12) for a genitive month name.
/// Matching ignores case and surrounding whitespace.
pub fn month_number(name: &str) -> Option<u8> {
    let name = name.trim().to_lowercase();
    MONTH_NAMES_GENITIVE
        .iter()
        .position(|candidate| *candidate == name)
        .and_then(|index| u8::try_from(index + 1).ok())
}

/// Returns the genitive name for a month number, or `None` outside 1-12.
pub fn month_name(month: u8) -> Option<&'static str> {
    let index = usize::from(month).checked_sub(1)?;
    MONTH_NAMES_GENITIVE.get(index).copied()
}
