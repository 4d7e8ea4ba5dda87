mod consts;
mod dispatch;
mod parse;
mod prelude;
mod range;
mod selection;
mod types;
mod view;

pub use consts::*;
pub use dispatch::{DragDispatcher, DragMode, WidgetId};
pub use parse::{parse_multi, parse_single};
pub use range::{DateRange, RangeError, collapse};
pub use selection::{Selection, SelectionConfig};
pub use types::{DayOfMonth, Month, Year, day_of_week, days_in_month, is_leap_year};
pub use view::VisibleWindow;

use crate::prelude::*;
use chrono::{Datelike, Utc};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

/// A calendar day with no time-of-day component.
///
/// Equality and ordering are by calendar date. The component types validate
/// on construction, so a `Day` holding an impossible date (February 30th,
/// month 13) is unrepresentable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Day {
    year: Year,
    month: Month,
    day: DayOfMonth,
}

#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum ParseError {
    #[display(fmt = "Invalid date format: {_0}")]
    InvalidFormat(String),
    #[display(fmt = "Invalid year: {} (must be 1-{})", "_0", MAX_YEAR)]
    InvalidYear(u16),
    #[display(fmt = "Invalid month: {} (must be 1-{})", "_0", MAX_MONTH)]
    InvalidMonth(u8),
    #[display(fmt = "Invalid day {day} for month {year}-{month:02}")]
    InvalidDay { year: u16, month: u8, day: u8 },
    #[display(fmt = "Empty date string")]
    EmptyInput,
}

impl std::error::Error for ParseError {}

impl Day {
    /// The earliest representable day, 0001-01-01.
    pub const MIN: Self = Self {
        year: Year::MIN,
        month: Month::JANUARY,
        day: DayOfMonth::FIRST,
    };

    /// The latest representable day, 9999-12-31.
    pub const MAX: Self = Self {
        year: Year::MAX,
        month: Month::DECEMBER,
        day: DayOfMonth::THIRTY_FIRST,
    };

    /// Builds a day from raw year/month/day values.
    ///
    /// # Errors
    /// Returns a `ParseError` if any component is out of range for the
    /// others (month length is checked against the year).
    pub fn from_ymd(year: u16, month: u8, day: u8) -> Result<Self, ParseError> {
        let year = Year::new(year)?;
        let month = Month::new(month)?;
        let day = DayOfMonth::new(year.get(), month.get(), day)?;
        Ok(Self { year, month, day })
    }

    /// Returns the year as u16
    #[inline]
    pub const fn year(&self) -> u16 {
        self.year.get()
    }

    /// Returns the month as u8
    #[inline]
    pub const fn month(&self) -> u8 {
        self.month.get()
    }

    /// Returns the day of the month as u8
    #[inline]
    pub const fn day(&self) -> u8 {
        self.day.get()
    }

    /// The following calendar day, rolling over month and year ends.
    /// `None` past [`Day::MAX`].
    pub fn next(self) -> Option<Self> {
        let (y, m, d) = (self.year(), self.month(), self.day());
        if d < days_in_month(y, m) {
            Self::from_ymd(y, m, d + 1).ok()
        } else if m < DECEMBER {
            Self::from_ymd(y, m + 1, MIN_DAY).ok()
        } else if y < MAX_YEAR {
            Self::from_ymd(y + 1, JANUARY, MIN_DAY).ok()
        } else {
            None
        }
    }

    /// The preceding calendar day. `None` before [`Day::MIN`].
    pub fn prev(self) -> Option<Self> {
        let (y, m, d) = (self.year(), self.month(), self.day());
        if d > MIN_DAY {
            Self::from_ymd(y, m, d - 1).ok()
        } else if m > JANUARY {
            Self::from_ymd(y, m - 1, days_in_month(y, m - 1)).ok()
        } else if y > 1 {
            Self::from_ymd(y - 1, DECEMBER, days_in_month(y - 1, DECEMBER)).ok()
        } else {
            None
        }
    }

    /// The day `n` days away, stepping one day at a time and saturating at
    /// the representable bounds.
    pub fn add_days(self, n: i64) -> Self {
        let mut out = self;
        if n >= 0 {
            for _ in 0..n {
                match out.next() {
                    Some(next) => out = next,
                    None => break,
                }
            }
        } else {
            for _ in 0..n.unsigned_abs() {
                match out.prev() {
                    Some(prev) => out = prev,
                    None => break,
                }
            }
        }
        out
    }

    /// The day `n` months away, saturating at the representable bounds.
    ///
    /// The day-of-month carries into the following month when it passes the
    /// target month's end, matching plain calendar arithmetic: January 31
    /// plus one month is March 2 (leap year) or March 3.
    pub fn add_months(self, n: i64) -> Self {
        let index = i64::from(self.year() - 1) * 12 + i64::from(self.month() - 1);
        let target = index
            .saturating_add(n)
            .clamp(0, i64::from(MAX_YEAR) * 12 - 1);
        let mut year = (target / 12 + 1) as u16;
        let mut month = (target % 12 + 1) as u8;
        let mut day = self.day();
        while day > days_in_month(year, month) {
            day -= days_in_month(year, month);
            if month < DECEMBER {
                month += 1;
            } else if year < MAX_YEAR {
                year += 1;
                month = JANUARY;
            } else {
                return Self::MAX;
            }
        }
        Self::from_ymd(year, month, day).unwrap_or(Self::MAX)
    }

    /// The day `n` years away, with the same overflow rule as
    /// [`Day::add_months`]: February 29 carries to March 1 in a non-leap
    /// year.
    pub fn add_years(self, n: i64) -> Self {
        self.add_months(n.saturating_mul(12))
    }

    /// The first day of this day's month.
    pub fn first_of_month(self) -> Self {
        Self::from_ymd(self.year(), self.month(), MIN_DAY).unwrap_or(self)
    }

    /// The last day of this day's month.
    pub fn last_of_month(self) -> Self {
        let (y, m) = (self.year(), self.month());
        Self::from_ymd(y, m, days_in_month(y, m)).unwrap_or(self)
    }

    /// Day of the week, 0 = Sunday through 6 = Saturday.
    pub const fn weekday(self) -> u8 {
        day_of_week(self.year(), self.month(), self.day())
    }

    /// The nearest Sunday on or before this day (clamped at [`Day::MIN`]).
    pub fn start_of_week(self) -> Self {
        let mut out = self;
        while out.weekday() != SUNDAY {
            match out.prev() {
                Some(prev) => out = prev,
                None => break,
            }
        }
        out
    }

    /// The nearest Saturday on or after this day (clamped at [`Day::MAX`]).
    pub fn end_of_week(self) -> Self {
        let mut out = self;
        while out.weekday() != SATURDAY {
            match out.next() {
                Some(next) => out = next,
                None => break,
            }
        }
        out
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02}",
            self.year(),
            self.month(),
            self.day()
        )
    }
}

fn take_digits(bytes: &[u8], count: usize) -> Option<(u32, &[u8])> {
    if bytes.len() < count {
        return None;
    }
    let (head, rest) = bytes.split_at(count);
    let mut value: u32 = 0;
    for &byte in head {
        if !byte.is_ascii_digit() {
            return None;
        }
        value = value * 10 + u32::from(byte - b'0');
    }
    Some((value, rest))
}

fn skip_non_digits(bytes: &[u8]) -> &[u8] {
    let mut rest = bytes;
    while let [first, tail @ ..] = rest {
        if first.is_ascii_digit() {
            break;
        }
        rest = tail;
    }
    rest
}

impl FromStr for Day {
    type Err = ParseError;

    /// Parses the canonical pattern: exactly four digits, two digits, two
    /// digits, separated by any non-digit run (including none). Trailing
    /// text is ignored unless it continues the final digit group, so
    /// `"2024-01-05T10:30"` and `"20240105"` parse while `"202401059"`
    /// does not.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(ParseError::EmptyInput);
        }
        let invalid = || ParseError::InvalidFormat(trimmed.to_owned());

        let (year, rest) = take_digits(trimmed.as_bytes(), 4).ok_or_else(invalid)?;
        let (month, rest) = take_digits(skip_non_digits(rest), 2).ok_or_else(invalid)?;
        let (day, rest) = take_digits(skip_non_digits(rest), 2).ok_or_else(invalid)?;
        if rest.first().is_some_and(u8::is_ascii_digit) {
            return Err(invalid());
        }

        Self::from_ymd(year as u16, month as u8, day as u8)
    }
}

impl serde::Serialize for Day {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> serde::Deserialize<'de> for Day {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

static TODAY: OnceLock<Day> = OnceLock::new();

/// The current UTC calendar day, read from the system clock the first time
/// it is needed and fixed for the rest of the process.
pub fn today() -> Day {
    *TODAY.get_or_init(|| {
        let now = Utc::now().date_naive();
        let year = u16::try_from(now.year()).unwrap_or(MAX_YEAR).min(MAX_YEAR);
        let month = u8::try_from(now.month()).unwrap_or(JANUARY);
        let day = u8::try_from(now.day()).unwrap_or(MIN_DAY);
        Day::from_ymd(year, month, day).unwrap_or(Day::MIN)
    })
}
