use chrono::{Datelike, NaiveDate};

use crate::model::attendance::DateRange;

/// Expands `YYYY`, `YYYY-MM` or `YYYY-MM-DD` into the inclusive range of days
/// it names. Returns `None` for anything else.
pub fn parse_period(raw: &str) -> Option<DateRange> {
    let raw = raw.trim();
    let parts: Vec<&str> = raw.split('-').collect();

    let (start, end) = match parts.as_slice() {
        [y] if y.len() == 4 => {
            let year = y.parse().ok()?;
            (
                NaiveDate::from_ymd_opt(year, 1, 1)?,
                NaiveDate::from_ymd_opt(year, 12, 31)?,
            )
        }
        [y, m] if y.len() == 4 && m.len() == 2 => {
            let first = NaiveDate::from_ymd_opt(y.parse().ok()?, m.parse().ok()?, 1)?;
            (first, last_day_of_month(first)?)
        }
        [y, m, d] if y.len() == 4 && m.len() == 2 && d.len() == 2 => {
            let day = NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()?;
            (day, day)
        }
        _ => return None,
    };

    Some(DateRange {
        start: Some(start),
        end: Some(end),
    })
}

fn last_day_of_month(first: NaiveDate) -> Option<NaiveDate> {
    let (year, month) = if first.month() == 12 {
        (first.year() + 1, 1)
    } else {
        (first.year(), first.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)?.pred_opt()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn whole_year() {
        let r = parse_period("2025").unwrap();
        assert_eq!(r.start, Some(ymd(2025, 1, 1)));
        assert_eq!(r.end, Some(ymd(2025, 12, 31)));
    }

    #[test]
    fn month_handles_leap_february_and_december() {
        assert_eq!(parse_period("2024-02").unwrap().end, Some(ymd(2024, 2, 29)));
        assert_eq!(parse_period("2025-02").unwrap().end, Some(ymd(2025, 2, 28)));
        assert_eq!(parse_period("2025-12").unwrap().end, Some(ymd(2025, 12, 31)));
    }

    #[test]
    fn single_day() {
        let r = parse_period("2026-01-15").unwrap();
        assert_eq!(r.start, r.end);
        assert!(r.contains(ymd(2026, 1, 15)));
        assert!(!r.contains(ymd(2026, 1, 16)));
    }

    #[test]
    fn rejects_malformed() {
        for raw in ["", "25", "2025-1", "2025-13", "2025-02-30", "2025/01/01", "abcd"] {
            assert!(parse_period(raw).is_none(), "{raw:?} should be rejected");
        }
    }
}
