use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::LedgerError;

/// A calendar month of a given year - the unit every payment row is keyed by
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Period {
    // Field order matters for the derived Ord: year first, then month.
    pub year: i32,
    pub month: u32,
}

impl Period {
    pub fn new(month: u32, year: i32) -> Result<Self, LedgerError> {
        if !(1..=12).contains(&month) {
            return Err(LedgerError::InvalidMonth(month));
        }
        Ok(Self { year, month })
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Exactly one calendar month earlier, rolling January back into December
    pub fn previous(&self) -> Self {
        if self.month == 1 {
            Self { year: self.year - 1, month: 12 }
        } else {
            Self { year: self.year, month: self.month - 1 }
        }
    }

    pub fn next(&self) -> Self {
        if self.month == 12 {
            Self { year: self.year + 1, month: 1 }
        } else {
            Self { year: self.year, month: self.month + 1 }
        }
    }

    /// `count` consecutive periods starting at (and including) `start`
    pub fn series(start: Period, count: u32) -> Vec<Period> {
        let mut out = Vec::with_capacity(count as usize);
        let mut current = start;
        for _ in 0..count {
            out.push(current);
            current = current.next();
        }
        out
    }

    pub fn first_day(&self) -> NaiveDate {
        // month is validated on construction
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    pub fn last_day(&self) -> NaiveDate {
        self.next()
            .first_day()
            .pred_opt()
            .unwrap_or_else(|| self.first_day())
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn previous_rolls_over_year_boundary() {
        let jan = Period::new(1, 2025).unwrap();
        assert_eq!(jan.previous(), Period::new(12, 2024).unwrap());
        assert_eq!(Period::new(7, 2025).unwrap().previous(), Period::new(6, 2025).unwrap());
    }

    #[test]
    fn series_crosses_into_next_year() {
        let start = Period::new(11, 2024).unwrap();
        let months: Vec<String> = Period::series(start, 4).iter().map(|p| p.to_string()).collect();
        assert_eq!(months, vec!["2024-11", "2024-12", "2025-01", "2025-02"]);
    }

    #[test]
    fn rejects_out_of_range_month() {
        assert!(Period::new(0, 2025).is_err());
        assert!(Period::new(13, 2025).is_err());
    }

    #[test]
    fn last_day_handles_leap_february() {
        assert_eq!(Period::new(2, 2024).unwrap().last_day().day(), 29);
        assert_eq!(Period::new(2, 2025).unwrap().last_day().day(), 28);
        assert_eq!(Period::new(12, 2025).unwrap().last_day().day(), 31);
    }
}
