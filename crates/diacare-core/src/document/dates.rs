//! Date formats recognised in medical documents.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

const MONTHS: [&str; 12] = [
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

/// Field order of a written date.
///
/// Numeric day/month ambiguity is settled by the format a rule declares,
/// never by guessing from the values.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DateFormat {
    /// 14/06/2003
    Dmy,
    /// 06/14/2003
    Mdy,
    /// 2003-06-14
    Ymd,
    /// 14 June 2003
    DayMonthYear,
    /// June 14, 2003
    MonthDayYear,
}

impl DateFormat {
    /// Regex fragment matching a date written in this format.
    pub fn pattern(&self) -> &'static str {
        match self {
            DateFormat::Dmy | DateFormat::Mdy => r"\d{1,2}[/\-.]\d{1,2}[/\-.]\d{4}\b",
            DateFormat::Ymd => r"\d{4}[/\-.]\d{1,2}[/\-.]\d{1,2}\b",
            DateFormat::DayMonthYear => r"\d{1,2}(?:st|nd|rd|th)?\s+[A-Za-z]{3,9}\.?,?\s+\d{4}\b",
            DateFormat::MonthDayYear => r"[A-Za-z]{3,9}\.?\s+\d{1,2}(?:st|nd|rd|th)?,?\s+\d{4}\b",
        }
    }

    /// Parse `raw` as a calendar date. Returns `None` for impossible dates
    /// such as 31/02.
    pub fn parse(&self, raw: &str) -> Option<NaiveDate> {
        let tokens: Vec<&str> = raw
            .split(|c: char| !c.is_ascii_alphanumeric())
            .filter(|t| !t.is_empty())
            .collect();
        let [a, b, c] = tokens.as_slice() else {
            return None;
        };

        let (day, month, year) = match self {
            DateFormat::Dmy => (leading_number(a)?, leading_number(b)?, leading_number(c)?),
            DateFormat::Mdy => (leading_number(b)?, leading_number(a)?, leading_number(c)?),
            DateFormat::Ymd => (leading_number(c)?, leading_number(b)?, leading_number(a)?),
            DateFormat::DayMonthYear => (leading_number(a)?, month_from_name(b)?, leading_number(c)?),
            DateFormat::MonthDayYear => (leading_number(b)?, month_from_name(a)?, leading_number(c)?),
        };

        if !(1..=31).contains(&day) || !(1..=12).contains(&month) {
            return None;
        }
        NaiveDate::from_ymd_opt(i32::try_from(year).ok()?, month, day)
    }
}

/// `14th` -> 14
fn leading_number(token: &str) -> Option<u32> {
    let digits: String = token.chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse().ok()
}

/// Full month names and prefixes of at least three letters (`Jun`, `Sept`).
pub fn month_from_name(token: &str) -> Option<u32> {
    let lower = token.to_ascii_lowercase();
    if lower.len() < 3 {
        return None;
    }
    MONTHS
        .iter()
        .position(|m| m.starts_with(&lower))
        .map(|idx| idx as u32 + 1)
}

/// Whether the year falls inside the plausible window.
pub fn year_in_window(date: &NaiveDate, min_year: i32, max_year: i32) -> bool {
    (min_year..=max_year).contains(&date.year())
}

pub fn format_iso(date: &NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_numeric_formats_follow_declared_order() {
        assert_eq!(DateFormat::Dmy.parse("04/06/2003"), Some(ymd(2003, 6, 4)));
        assert_eq!(DateFormat::Mdy.parse("04/06/2003"), Some(ymd(2003, 4, 6)));
        assert_eq!(DateFormat::Ymd.parse("2003-06-04"), Some(ymd(2003, 6, 4)));
        assert_eq!(DateFormat::Dmy.parse("14.06.2003"), Some(ymd(2003, 6, 14)));
    }

    #[test]
    fn test_month_names() {
        assert_eq!(DateFormat::DayMonthYear.parse("14 June 2003"), Some(ymd(2003, 6, 14)));
        assert_eq!(DateFormat::DayMonthYear.parse("1st Sept, 1987"), Some(ymd(1987, 9, 1)));
        assert_eq!(DateFormat::MonthDayYear.parse("March 3rd, 1990"), Some(ymd(1990, 3, 3)));
        assert_eq!(DateFormat::MonthDayYear.parse("Foo 3, 1990"), None);
    }

    #[test]
    fn test_impossible_dates_rejected() {
        assert_eq!(DateFormat::Dmy.parse("31/02/2000"), None);
        assert_eq!(DateFormat::Dmy.parse("00/01/2000"), None);
        assert_eq!(DateFormat::Mdy.parse("13/01/2000"), None);
        assert_eq!(DateFormat::Dmy.parse("12/2000"), None);
    }

    #[test]
    fn test_month_prefixes() {
        assert_eq!(month_from_name("Jan"), Some(1));
        assert_eq!(month_from_name("SEPT"), Some(9));
        assert_eq!(month_from_name("ma"), None);
        assert_eq!(month_from_name("mayday"), None);
    }

    #[test]
    fn test_year_window() {
        let date = ymd(1899, 12, 31);
        assert!(!year_in_window(&date, 1900, 2024));
        assert!(year_in_window(&ymd(1900, 1, 1), 1900, 2024));
        assert_eq!(format_iso(&ymd(2003, 6, 4)), "2003-06-04");
    }
}
