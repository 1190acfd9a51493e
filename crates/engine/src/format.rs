//! Display formatting in the Indonesian (`id-ID`) locale.
//!
//! All functions are pure. Instants are converted to the caller's display
//! time zone before any calendar field is read.

use chrono::{DateTime, Datelike, Timelike, Utc};
use chrono_tz::Tz;

use crate::Rupiah;

const MONTHS_FULL: [&str; 12] = [
    "Januari",
    "Februari",
    "Maret",
    "April",
    "Mei",
    "Juni",
    "Juli",
    "Agustus",
    "September",
    "Oktober",
    "November",
    "Desember",
];

const MONTHS_SHORT: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "Mei", "Jun", "Jul", "Agu", "Sep", "Okt", "Nov", "Des",
];

/// Which month name variant to render.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MonthStyle {
    #[default]
    Full,
    Short,
}

/// Formats an amount as Indonesian rupiah with no decimals.
///
/// `Rp`, a non-breaking space, then the digits grouped by `.`; negative
/// amounts get a leading `-`.
#[must_use]
pub fn format_idr(amount: Rupiah) -> String {
    let value = amount.value();
    let digits = value.unsigned_abs().to_string();

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }

    let sign = if value < 0 { "-" } else { "" };
    format!("{sign}Rp\u{a0}{grouped}")
}

/// Formats the calendar date of `instant`, e.g. `10 Mar 2024`.
#[must_use]
pub fn format_date(instant: DateTime<Utc>, tz: Tz) -> String {
    let local = instant.with_timezone(&tz);
    format!(
        "{:02} {} {}",
        local.day(),
        month_name(local.month0(), MonthStyle::Short),
        local.year()
    )
}

/// Formats the wall-clock time of `instant` as 24-hour `HH.MM`.
#[must_use]
pub fn format_time(instant: DateTime<Utc>, tz: Tz) -> String {
    let local = instant.with_timezone(&tz);
    format!("{:02}.{:02}", local.hour(), local.minute())
}

/// Returns the Indonesian month name for a 0-based month index.
///
/// Indices past December roll over into the next year's months, the way the
/// host calendar treats an out-of-range month.
#[must_use]
pub fn month_name(month0: u32, style: MonthStyle) -> &'static str {
    let index = (month0 % 12) as usize;
    match style {
        MonthStyle::Full => MONTHS_FULL[index],
        MonthStyle::Short => MONTHS_SHORT[index],
    }
}
