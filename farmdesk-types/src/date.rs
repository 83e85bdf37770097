//! Calendar dates and reporting periods.
//!
//! Every record date is stored as `YYYY-MM-DD`. Month and year filters
//! rely on that fixed format, so [`IsoDate`] only accepts it.

use crate::Error;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

const FORMAT: &str = "%Y-%m-%d";

/// A calendar day, serialized as `YYYY-MM-DD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IsoDate(NaiveDate);

impl IsoDate {
    /// Builds a date from its components.
    pub fn from_ymd(year: i32, month: u32, day: u32) -> crate::Result<Self> {
        NaiveDate::from_ymd_opt(year, month, day)
            .map(Self)
            .ok_or_else(|| Error::InvalidDate(format!("{year:04}-{month:02}-{day:02}")))
    }

    /// Parses a strict `YYYY-MM-DD` string.
    pub fn parse(s: &str) -> crate::Result<Self> {
        let s = s.trim();
        // chrono accepts unpadded fields; the stored format does not.
        if s.len() != 10 {
            return Err(Error::InvalidDate(s.to_string()));
        }
        NaiveDate::parse_from_str(s, FORMAT)
            .map(Self)
            .map_err(|_| Error::InvalidDate(s.to_string()))
    }

    /// Today's date in UTC.
    #[must_use]
    pub fn today() -> Self {
        Self(chrono::Utc::now().date_naive())
    }

    #[must_use]
    pub fn year(&self) -> i32 {
        self.0.year()
    }

    /// Month number, 1 to 12.
    #[must_use]
    pub fn month(&self) -> u32 {
        self.0.month()
    }

    #[must_use]
    pub fn day(&self) -> u32 {
        self.0.day()
    }

    #[must_use]
    pub const fn as_naive(&self) -> NaiveDate {
        self.0
    }
}

impl From<NaiveDate> for IsoDate {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

impl fmt::Display for IsoDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(FORMAT))
    }
}

impl FromStr for IsoDate {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for IsoDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for IsoDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// A reporting window over record dates.
///
/// Parsed from the selector strings used by the list and report views:
/// `"07"` (July of any year), `"2025-07"`, `"2025"` or `"ALL"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    /// Every record.
    All,
    /// A month number in any year.
    Month(u32),
    /// A whole year.
    Year(i32),
    /// One month of one year.
    YearMonth { year: i32, month: u32 },
}

impl Period {
    /// Returns true if `date` falls inside this period.
    #[must_use]
    pub fn contains(&self, date: &IsoDate) -> bool {
        match *self {
            Period::All => true,
            Period::Month(month) => date.month() == month,
            Period::Year(year) => date.year() == year,
            Period::YearMonth { year, month } => date.year() == year && date.month() == month,
        }
    }

    /// The month containing `date`, in that year.
    #[must_use]
    pub fn month_of(date: &IsoDate) -> Self {
        Period::YearMonth {
            year: date.year(),
            month: date.month(),
        }
    }
}

fn parse_month(s: &str) -> Option<u32> {
    if s.is_empty() || s.len() > 2 || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok().filter(|m| (1..=12).contains(m))
}

impl FromStr for Period {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let invalid = || Error::InvalidPeriod(s.to_string());

        if s.eq_ignore_ascii_case("all") {
            return Ok(Period::All);
        }
        if let Some((year, month)) = s.split_once('-') {
            let year = year.parse().map_err(|_| invalid())?;
            let month = parse_month(month).ok_or_else(invalid)?;
            return Ok(Period::YearMonth { year, month });
        }
        match s.len() {
            1 | 2 => parse_month(s).map(Period::Month).ok_or_else(invalid),
            4 => s.parse().map(Period::Year).map_err(|_| invalid()),
            _ => Err(invalid()),
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Period::All => f.write_str("ALL"),
            Period::Month(month) => write!(f, "{month:02}"),
            Period::Year(year) => write!(f, "{year}"),
            Period::YearMonth { year, month } => write!(f, "{year}-{month:02}"),
        }
    }
}
