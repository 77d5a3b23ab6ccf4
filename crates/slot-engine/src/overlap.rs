//! Half-open interval overlap.
//!
//! One predicate serves both exclusion passes of the engine: the lunch window
//! and the existing bookings. Intervals are `[start, end)`, so two intervals
//! that only touch at an endpoint do not overlap and a slot ending exactly when
//! a booking starts stays free.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::SlotError;
use crate::time_repr::Instant;

/// True iff `[a_start, a_end)` and `[b_start, b_end)` share at least one point.
///
/// # Examples
///
/// ```
/// use slot_engine::overlap::overlaps;
///
/// assert!(overlaps(9, 10, 9, 11));
/// assert!(!overlaps(9, 10, 10, 11)); // touching
/// ```
pub fn overlaps<T: PartialOrd>(a_start: T, a_end: T, b_start: T, b_end: T) -> bool {
    a_start < b_end && b_start < a_end
}

/// An absolute `[start, end)` interval.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Interval {
    /// Inclusive.
    pub start: Instant,
    /// Exclusive.
    pub end: Instant,
}

impl fmt::Debug for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}..{:?}", self.start, self.end)
    }
}

impl Interval {
    pub const fn new(start: Instant, end: Instant) -> Self {
        Self { start, end }
    }

    pub fn overlaps(&self, other: &Interval) -> bool {
        overlaps(self.start, self.end, other.start, other.end)
    }

    /// True when `other` lies entirely within this interval.
    pub fn contains(&self, other: &Interval) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

/// An existing appointment as stored by the persistence layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawBookedInterval")]
pub struct BookedInterval {
    pub start: Instant,
    pub end: Instant,
}

#[derive(Deserialize)]
struct RawBookedInterval {
    start: Instant,
    end: Instant,
}

impl TryFrom<RawBookedInterval> for BookedInterval {
    type Error = SlotError;

    fn try_from(raw: RawBookedInterval) -> Result<Self, Self::Error> {
        BookedInterval::new(raw.start, raw.end)
    }
}

impl BookedInterval {
    /// A booking must end strictly after it starts.
    pub fn new(start: Instant, end: Instant) -> Result<Self, SlotError> {
        if start < end {
            Ok(Self { start, end })
        } else {
            Err(SlotError::InvalidTime(format!(
                "booking must end after it starts: {} .. {}",
                start.to_rfc3339(),
                end.to_rfc3339()
            )))
        }
    }

    pub fn interval(&self) -> Interval {
        Interval::new(self.start, self.end)
    }
}

/// The first booking in `booked` that overlaps `candidate`, if any.
pub fn first_overlapping<'a>(
    candidate: &Interval,
    booked: &'a [BookedInterval],
) -> Option<&'a BookedInterval> {
    booked.iter().find(|b| candidate.overlaps(&b.interval()))
}
