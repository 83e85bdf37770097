//! Predicates for listing records.
//!
//! Each function returns a closure suitable for a store's `list` call, so
//! callers can combine them with `&&` in their own closure when needed.

use crate::{GreenhouseNumber, IsoDate, Period, Record};

/// Records dated inside `period`.
pub fn in_period<T: Record>(period: Period) -> impl Fn(&T) -> bool {
    move |record| period.contains(&record.date())
}

/// Records from one greenhouse. Kinds without a greenhouse never match.
pub fn in_greenhouse<T: Record>(greenhouse: GreenhouseNumber) -> impl Fn(&T) -> bool {
    move |record| record.greenhouse() == Some(greenhouse)
}

/// Records dated exactly `date`.
pub fn on_date<T: Record>(date: IsoDate) -> impl Fn(&T) -> bool {
    move |record| record.date() == date
}

/// Matches everything.
pub fn any<T: Record>(_: &T) -> bool {
    true
}
