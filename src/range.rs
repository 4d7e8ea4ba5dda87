use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::{Day, ParseError, prelude::*};

/// One entry of a chosen set: a single day, or an inclusive span of days.
///
/// A span always covers at least two days; collapsing stores a one-day span
/// as `Single` so the representation stays canonical.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum DateRange {
    #[display(fmt = "{_0}")]
    Single(Day),
    #[display(fmt = "{start}/{end}")]
    Span { start: Day, end: Day },
}

/// Error type for date range operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RangeError {
    /// Start date is after end date.
    #[error("Invalid date range: start ({start}) is after end ({end})")]
    InvalidRange { start: Day, end: Day },

    /// Error parsing a date inside a range.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Input that is not a day or a two-element range.
    #[error("Invalid range value: {0}")]
    InvalidFormat(String),
}

impl DateRange {
    /// Creates an inclusive range with validation, normalizing a one-day
    /// span to `Single`.
    ///
    /// # Errors
    /// Returns `RangeError::InvalidRange` if start > end.
    pub fn span(start: Day, end: Day) -> Result<Self, RangeError> {
        if start > end {
            return Err(RangeError::InvalidRange { start, end });
        }
        Ok(Self::from_endpoints(start, end))
    }

    /// Builds the canonical variant from ordered endpoints.
    pub(crate) fn from_endpoints(start: Day, end: Day) -> Self {
        debug_assert!(start <= end);
        if start == end {
            Self::Single(start)
        } else {
            Self::Span { start, end }
        }
    }

    /// Returns the first day covered by the range
    pub const fn start(&self) -> Day {
        match *self {
            Self::Single(day) => day,
            Self::Span { start, .. } => start,
        }
    }

    /// Returns the last day covered by the range
    pub const fn end(&self) -> Day {
        match *self {
            Self::Single(day) => day,
            Self::Span { end, .. } => end,
        }
    }

    /// Checks whether `day` falls within the range, both endpoints
    /// inclusive.
    pub fn contains(&self, day: Day) -> bool {
        self.start() <= day && day <= self.end()
    }

    /// Checks whether two ranges share any day.
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start() <= other.end() && other.start() <= self.end()
    }
}

impl From<Day> for DateRange {
    fn from(day: Day) -> Self {
        Self::Single(day)
    }
}

impl PartialOrd for DateRange {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for DateRange {
    fn cmp(&self, other: &Self) -> Ordering {
        // Compare start days first, then end days
        match self.start().cmp(&other.start()) {
            Ordering::Equal => self.end().cmp(&other.end()),
            ord => ord,
        }
    }
}

/// Merges a list of days and spans into the canonical chosen-set form:
/// sorted ascending by start, pairwise disjoint, immediately adjacent
/// entries merged, one-day spans reduced to `Single`.
///
/// A range merges into its predecessor exactly when its start is on or
/// before the predecessor's end plus one day, so overlapping and
/// back-to-back entries both collapse. Collapsing is idempotent.
pub fn collapse(mut ranges: Vec<DateRange>) -> Vec<DateRange> {
    ranges.sort();

    let mut collapsed: Vec<DateRange> = Vec::with_capacity(ranges.len());
    for range in ranges {
        let Some(prev) = collapsed.last().copied() else {
            collapsed.push(DateRange::from_endpoints(range.start(), range.end()));
            continue;
        };

        let mergeable = match prev.end().next() {
            Some(bound) => range.start() <= bound,
            None => true,
        };
        if mergeable {
            // sorted order guarantees prev.start() <= range.start()
            let end = prev.end().max(range.end());
            if let Some(last) = collapsed.last_mut() {
                *last = DateRange::from_endpoints(prev.start(), end);
            }
        } else {
            collapsed.push(DateRange::from_endpoints(range.start(), range.end()));
        }
    }

    collapsed
}

impl Serialize for DateRange {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeTuple;

        match self {
            Self::Single(day) => day.serialize(serializer),
            Self::Span { start, end } => {
                let mut pair = serializer.serialize_tuple(2)?;
                pair.serialize_element(start)?;
                pair.serialize_element(end)?;
                pair.end()
            }
        }
    }
}

/// Wire shape of a range entry: an ISO day string, or a two-element
/// `[start, end]` array of ISO day strings.
#[derive(Deserialize)]
#[serde(untagged)]
enum RangeRepr {
    Single(Day),
    Pair(Day, Day),
}

impl<'de> Deserialize<'de> for DateRange {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        match RangeRepr::deserialize(deserializer)? {
            RangeRepr::Single(day) => Ok(Self::Single(day)),
            RangeRepr::Pair(start, end) => {
                Self::span(start, end).map_err(serde::de::Error::custom)
            }
        }
    }
}
