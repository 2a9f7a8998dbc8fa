// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for date/time handling and Spanish date formatting.

use chrono::{DateTime, Datelike, NaiveDate, Utc};

/// Spanish month names, indexed by `month0`.
const MONTHS_ES: [&str; 12] = [
    "enero",
    "febrero",
    "marzo",
    "abril",
    "mayo",
    "junio",
    "julio",
    "agosto",
    "septiembre",
    "octubre",
    "noviembre",
    "diciembre",
];

/// Format a date in long Spanish form, e.g. `15 de junio de 2025`.
pub fn format_date_es(date: NaiveDate) -> String {
    format!(
        "{} de {} de {}",
        date.day(),
        MONTHS_ES[date.month0() as usize],
        date.year()
    )
}

/// Half-open UTC bounds of a calendar year: `[Jan 1 Y, Jan 1 Y+1)`.
///
/// `None` for years outside the chrono-representable range.
pub fn year_bounds(year: i32) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let start = NaiveDate::from_ymd_opt(year, 1, 1)?
        .and_hms_opt(0, 0, 0)?
        .and_utc();
    let end = NaiveDate::from_ymd_opt(year + 1, 1, 1)?
        .and_hms_opt(0, 0, 0)?
        .and_utc();
    Some((start, end))
}

/// Whether a timestamp falls inside a calendar year.
pub fn in_year(date: DateTime<Utc>, year: i32) -> bool {
    match year_bounds(year) {
        Some((start, end)) => date >= start && date < end,
        None => false,
    }
}

/// This year's occurrence of a birth date.
///
/// Feb 29 birthdays fall back to Mar 1 in non-leap years.
pub fn birthday_occurrence(birth_date: NaiveDate, today: NaiveDate) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(today.year(), birth_date.month(), birth_date.day())
        .or_else(|| NaiveDate::from_ymd_opt(today.year(), 3, 1))
}

/// Whole days from `today` until `date` (negative when past).
pub fn days_until(date: NaiveDate, today: NaiveDate) -> i64 {
    (date - today).num_days()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_format_date_es() {
        assert_eq!(format_date_es(date(2025, 6, 15)), "15 de junio de 2025");
        assert_eq!(format_date_es(date(2024, 1, 1)), "1 de enero de 2024");
        assert_eq!(
            format_date_es(date(2023, 12, 31)),
            "31 de diciembre de 2023"
        );
    }

    #[test]
    fn test_year_bounds_are_half_open() {
        // End of Dec 31 is inside the year, start of next Jan 1 is not.
        let last_instant = date(2024, 12, 31)
            .and_hms_milli_opt(23, 59, 59, 999)
            .unwrap()
            .and_utc();
        let next_year = date(2025, 1, 1).and_hms_opt(0, 0, 0).unwrap().and_utc();

        assert!(in_year(last_instant, 2024));
        assert!(!in_year(next_year, 2024));
        assert!(in_year(next_year, 2025));
    }

    #[test]
    fn test_birthday_occurrence_regular() {
        let birth = date(1990, 6, 15);
        let today = date(2025, 6, 1);
        assert_eq!(birthday_occurrence(birth, today), Some(date(2025, 6, 15)));
    }

    #[test]
    fn test_birthday_occurrence_leap_day() {
        let birth = date(1992, 2, 29);
        // 2025 is not a leap year: falls back to Mar 1.
        assert_eq!(
            birthday_occurrence(birth, date(2025, 1, 10)),
            Some(date(2025, 3, 1))
        );
        // 2024 is a leap year: Feb 29 exists.
        assert_eq!(
            birthday_occurrence(birth, date(2024, 1, 10)),
            Some(date(2024, 2, 29))
        );
    }

    #[test]
    fn test_days_until() {
        let today = date(2025, 3, 10);
        assert_eq!(days_until(date(2025, 3, 17), today), 7);
        assert_eq!(days_until(date(2025, 3, 11), today), 1);
        assert_eq!(days_until(today, today), 0);
        assert_eq!(days_until(date(2025, 3, 9), today), -1);
    }
}
