use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;

pub const MIN_YEAR: u16 = 1900;
pub const MAX_YEAR: u16 = 2100;

/// A calendar month of a given year, written as `MM-YYYY`.
///
/// Field order matters: the derived `Ord` compares the year first, so
/// sorting periods is chronological. The raw `MM-YYYY` text is not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Period {
    year: u16,
    month: u8,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PeriodError {
    #[error("date must be in MM-YYYY format")]
    InvalidFormat,
    #[error("month must be between 01 and 12, got {0:02}")]
    MonthOutOfRange(u8),
    #[error("year must be between 1900 and 2100, got {0}")]
    YearOutOfRange(u16),
}

fn period_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    // ASCII classes on purpose: `\d` would also accept non-ASCII digits.
    PATTERN.get_or_init(|| Regex::new(r"^([0-9]{2})-([0-9]{4})$").expect("valid period regex"))
}

impl Period {
    pub fn new(month: u8, year: u16) -> Result<Self, PeriodError> {
        if !(1..=12).contains(&month) {
            return Err(PeriodError::MonthOutOfRange(month));
        }
        if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
            return Err(PeriodError::YearOutOfRange(year));
        }
        Ok(Self { year, month })
    }

    pub fn parse(s: &str) -> Result<Self, PeriodError> {
        let captures = period_pattern()
            .captures(s)
            .ok_or(PeriodError::InvalidFormat)?;

        let month = captures[1]
            .parse::<u8>()
            .map_err(|_| PeriodError::InvalidFormat)?;
        let year = captures[2]
            .parse::<u16>()
            .map_err(|_| PeriodError::InvalidFormat)?;

        Self::new(month, year)
    }

    pub fn month(&self) -> u8 {
        self.month
    }

    pub fn year(&self) -> u16 {
        self.year
    }

    /// `YYYYMM`; lexicographic order on this text is chronological.
    pub fn sort_key(&self) -> String {
        format!("{:04}{:02}", self.year, self.month)
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}-{:04}", self.month, self.year)
    }
}

impl FromStr for Period {
    type Err = PeriodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Classifies `s`; never fails.
pub fn is_valid_period(s: &str) -> bool {
    Period::parse(s).is_ok()
}

/// Whether `b` falls in the same month as `a` or later.
///
/// Returns false when either side is not a valid period.
pub fn period_greater_or_equal(a: &str, b: &str) -> bool {
    match (Period::parse(a), Period::parse(b)) {
        (Ok(a), Ok(b)) => b >= a,
        _ => false,
    }
}
