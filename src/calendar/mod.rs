//! Bikram Sambat calendar engine.
//!
//! This module isolates every other component from calendar complexity:
//! BS↔Gregorian conversion, day arithmetic performed in BS-date space, and
//! the month metadata a date-picker grid needs. The BS calendar has
//! irregular, table-defined month lengths (see [`table`]), so all
//! arithmetic routes through a day offset from the table's anchor date.
//!
//! Two API levels are exposed: a typed [`BsDate`] core returning `Result`,
//! and lenient string helpers ([`current_date_str`], [`add_days_str`],
//! [`days_between_str`]) that fail closed with `""`/`0` sentinels for
//! callers juggling raw date strings from forms or imported backups.

mod table;

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Local, NaiveDate};
use thiserror::Error;

pub use table::{FIRST_YEAR, LAST_YEAR};

/// BS month names, Baisakh (index 0) through Chaitra (index 11).
pub const MONTH_NAMES: [&str; 12] = [
    "Baisakh", "Jestha", "Ashad", "Shrawan", "Bhadra", "Ashwin",
    "Kartik", "Mangsir", "Poush", "Magh", "Falgun", "Chaitra",
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CalendarError {
    #[error("malformed BS date '{0}', expected YYYY-MM-DD")]
    Malformed(String),
    #[error("BS year {0} is outside the supported range {FIRST_YEAR}-{LAST_YEAR}")]
    YearOutOfRange(i32),
    #[error("BS {year}-{month:02} has no day {day}")]
    InvalidDay { year: i32, month: u32, day: u32 },
    #[error("Gregorian date {0} is outside the supported BS table range")]
    UnmappedGregorian(NaiveDate),
}

/// A date in the Bikram Sambat calendar.
///
/// Always holds a valid table-backed date; construction goes through
/// [`BsDate::new`] or [`FromStr`]. Canonical text form is zero-padded
/// `YYYY-MM-DD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BsDate {
    year: i32,
    month: u32,
    day: u32,
}

impl BsDate {
    /// Build a BS date, checking it against the month-length table.
    /// `month` and `day` are 1-based.
    pub fn new(year: i32, month: u32, day: u32) -> Result<Self, CalendarError> {
        let len = days_in_month(year, month)?;
        if day == 0 || day > len {
            return Err(CalendarError::InvalidDay { year, month, day });
        }
        Ok(Self { year, month, day })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    /// 1-based month (1 = Baisakh).
    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn day(&self) -> u32 {
        self.day
    }

    /// Name of this date's month.
    pub fn month_name(&self) -> &'static str {
        MONTH_NAMES[(self.month - 1) as usize]
    }

    /// Today's date on the BS calendar, from the local Gregorian clock.
    pub fn today() -> Result<Self, CalendarError> {
        Self::from_gregorian(Local::now().date_naive())
    }

    /// Convert a Gregorian date into its BS equivalent.
    pub fn from_gregorian(date: NaiveDate) -> Result<Self, CalendarError> {
        let mut remaining = (date - table::anchor()).num_days();
        if remaining < 0 {
            return Err(CalendarError::UnmappedGregorian(date));
        }
        for year in FIRST_YEAR..=LAST_YEAR {
            let row = table::year_row(year).ok_or(CalendarError::YearOutOfRange(year))?;
            for (idx, len) in row.iter().enumerate() {
                let len = i64::from(*len);
                if remaining < len {
                    return Ok(Self {
                        year,
                        month: idx as u32 + 1,
                        day: remaining as u32 + 1,
                    });
                }
                remaining -= len;
            }
        }
        Err(CalendarError::UnmappedGregorian(date))
    }

    /// Convert this BS date into its Gregorian equivalent.
    pub fn to_gregorian(&self) -> Result<NaiveDate, CalendarError> {
        Ok(table::anchor() + chrono::Duration::days(self.day_offset()?))
    }

    /// Advance (or rewind, for negative `n`) by whole calendar days,
    /// rolling over month and year boundaries per the table.
    pub fn add_days(&self, n: i64) -> Result<Self, CalendarError> {
        let date = self
            .to_gregorian()?
            .checked_add_signed(chrono::Duration::days(n))
            .ok_or(CalendarError::YearOutOfRange(self.year))?;
        Self::from_gregorian(date)
    }

    /// Weekday of this date, 0 = Sunday through 6 = Saturday.
    pub fn weekday(&self) -> Result<u32, CalendarError> {
        Ok(self.to_gregorian()?.weekday().num_days_from_sunday())
    }

    /// Days elapsed since the table anchor (1 Baisakh 2000).
    fn day_offset(&self) -> Result<i64, CalendarError> {
        let mut days: i64 = 0;
        for year in FIRST_YEAR..self.year {
            let row = table::year_row(year).ok_or(CalendarError::YearOutOfRange(self.year))?;
            days += row.iter().map(|d| i64::from(*d)).sum::<i64>();
        }
        let row = table::year_row(self.year).ok_or(CalendarError::YearOutOfRange(self.year))?;
        for idx in 0..(self.month - 1) as usize {
            days += i64::from(row[idx]);
        }
        Ok(days + i64::from(self.day) - 1)
    }
}

impl fmt::Display for BsDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

impl FromStr for BsDate {
    type Err = CalendarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || CalendarError::Malformed(s.to_string());
        let mut parts = s.trim().splitn(3, '-');
        let year = parts
            .next()
            .and_then(|p| p.parse::<i32>().ok())
            .ok_or_else(malformed)?;
        let month = parts
            .next()
            .and_then(|p| p.parse::<u32>().ok())
            .ok_or_else(malformed)?;
        let day = parts
            .next()
            .and_then(|p| p.parse::<u32>().ok())
            .ok_or_else(malformed)?;
        BsDate::new(year, month, day)
    }
}

/// Absolute number of calendar days between two BS dates.
pub fn days_between(a: &BsDate, b: &BsDate) -> Result<i64, CalendarError> {
    Ok((b.day_offset()? - a.day_offset()?).abs())
}

/// Number of days in the given BS month (1-based). Looked up, not computed:
/// BS months have no fixed-length formula.
pub fn days_in_month(year: i32, month: u32) -> Result<u32, CalendarError> {
    let row = table::year_row(year).ok_or(CalendarError::YearOutOfRange(year))?;
    if !(1..=12).contains(&month) {
        return Err(CalendarError::InvalidDay { year, month, day: 0 });
    }
    Ok(u32::from(row[(month - 1) as usize]))
}

/// Name of a BS month by 0-based index (0 = Baisakh .. 11 = Chaitra).
pub fn month_name(index: usize) -> Option<&'static str> {
    MONTH_NAMES.get(index).copied()
}

/// Weekday of a BS date, 0 = Sunday through 6 = Saturday.
pub fn weekday_of(year: i32, month: u32, day: u32) -> Result<u32, CalendarError> {
    BsDate::new(year, month, day)?.weekday()
}

/// Metadata for rendering one BS month as a calendar grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthGrid {
    pub year: i32,
    /// 1-based month.
    pub month: u32,
    /// Weekday of day 1 (0 = Sunday); the number of leading blank cells.
    pub first_weekday: u32,
    pub days_in_month: u32,
}

/// Grid metadata for a BS month: how many days it has and where day 1
/// falls in the week, for left-padding the first row.
pub fn month_grid(year: i32, month: u32) -> Result<MonthGrid, CalendarError> {
    let days = days_in_month(year, month)?;
    let first_weekday = BsDate::new(year, month, 1)?.weekday()?;
    Ok(MonthGrid {
        year,
        month,
        first_weekday,
        days_in_month: days,
    })
}

/// Today as a canonical BS date string, or `""` if the clock falls outside
/// the table range.
pub fn current_date_str() -> String {
    BsDate::today().map(|d| d.to_string()).unwrap_or_default()
}

/// Add days to a BS date string. Fails closed: any conversion error yields
/// `""`, which callers must treat as unknown/unset.
pub fn add_days_str(base: &str, n: i64) -> String {
    base.parse::<BsDate>()
        .and_then(|d| d.add_days(n))
        .map(|d| d.to_string())
        .unwrap_or_default()
}

/// Absolute day difference between two BS date strings; `b` defaults to
/// today. Returns 0 on any conversion error.
pub fn days_between_str(a: &str, b: Option<&str>) -> i64 {
    let parsed_a = match a.parse::<BsDate>() {
        Ok(d) => d,
        Err(_) => return 0,
    };
    let parsed_b = match b {
        Some(s) => match s.parse::<BsDate>() {
            Ok(d) => d,
            Err(_) => return 0,
        },
        None => match BsDate::today() {
            Ok(d) => d,
            Err(_) => return 0,
        },
    };
    days_between(&parsed_a, &parsed_b).unwrap_or(0)
}
