//! The availability engine: bookable slot starts for one calendar day.
//!
//! The computation is a pipeline over immutable values:
//!
//! 1. bound the requested date in the business timezone,
//! 2. anchor work and lunch hours onto that date,
//! 3. step candidate starts across the day at a fixed granularity,
//! 4. reject candidates outside working hours, overlapping lunch, or
//!    overlapping an existing booking,
//! 5. render the survivors for display.
//!
//! Nothing here performs I/O or keeps state between calls. The configuration
//! and the booked intervals are snapshots owned by the caller.

use chrono::{Duration, NaiveDate, TimeZone};
use chrono_tz::Tz;
use serde::Serialize;
use tracing::{debug, trace};

use crate::calendar::{anchor, day_bounds, AnchoredHours, BusinessCalendarConfig, DayBounds};
use crate::error::{Result, SlotError};
use crate::overlap::{first_overlapping, BookedInterval, Interval};
use crate::time_repr::{format_display, to_local, Instant, LocalDateTime};

/// Minutes between consecutive candidate starts.
pub const GRANULARITY_MINUTES: i64 = 15;

const MINUTES_PER_DAY: i64 = 24 * 60;

/// Longest appointment length carried into instant arithmetic. No day holds
/// more than 25 hours, so anything longer yields no slot either way.
const MAX_DURATION_MINUTES: i64 = 2 * MINUTES_PER_DAY;

// ── Request / options ───────────────────────────────────────────────────────

/// A request for the open slots of one date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AvailabilityRequest {
    pub date: NaiveDate,
    pub duration_minutes: i64,
}

impl AvailabilityRequest {
    pub fn new(date: NaiveDate, duration_minutes: i64) -> Self {
        Self {
            date,
            duration_minutes,
        }
    }

    /// The appointment length, rejecting non-positive values.
    ///
    /// Lengths over two days are capped at two days.
    pub fn duration(&self) -> Result<Duration> {
        if self.duration_minutes <= 0 {
            return Err(SlotError::InvalidDuration(format!(
                "duration must be positive, got {} minutes",
                self.duration_minutes
            )));
        }
        Ok(Duration::minutes(self.duration_minutes.min(MAX_DURATION_MINUTES)))
    }
}

/// Parse a textual minute count, as received from a form field or query string.
pub fn parse_duration_minutes(s: &str) -> Result<i64> {
    let minutes: i64 = s.trim().parse().map_err(|_| {
        SlotError::InvalidDuration(format!("'{s}' is not a whole number of minutes"))
    })?;
    if minutes <= 0 {
        return Err(SlotError::InvalidDuration(format!(
            "duration must be positive, got {minutes} minutes"
        )));
    }
    Ok(minutes)
}

/// Options for [`compute_slots_with_options`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotOptions {
    /// Minutes between candidate starts. Must divide a day evenly.
    pub granularity_minutes: i64,
}

impl Default for SlotOptions {
    fn default() -> Self {
        Self {
            granularity_minutes: GRANULARITY_MINUTES,
        }
    }
}

impl SlotOptions {
    /// Check that the granularity is a positive divisor of a day.
    ///
    /// # Errors
    ///
    /// [`SlotError::InvalidDuration`] otherwise.
    pub fn validate(&self) -> Result<()> {
        let g = self.granularity_minutes;
        if g <= 0 || MINUTES_PER_DAY % g != 0 {
            return Err(SlotError::InvalidDuration(format!(
                "granularity must be a positive divisor of {MINUTES_PER_DAY} minutes, got {g}"
            )));
        }
        Ok(())
    }

    fn step(&self) -> Result<Duration> {
        self.validate()?;
        Ok(Duration::minutes(self.granularity_minutes))
    }
}

// ── Candidates and slots ────────────────────────────────────────────────────

/// A possible appointment, in both absolute and local form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotCandidate {
    pub start_instant: Instant,
    pub end_instant: Instant,
    pub start_local: LocalDateTime,
    pub end_local: LocalDateTime,
}

impl SlotCandidate {
    pub fn new(start: Instant, duration: Duration, timezone: &Tz) -> Self {
        let end = start + duration;
        Self {
            start_instant: start,
            end_instant: end,
            start_local: to_local(start, timezone),
            end_local: to_local(end, timezone),
        }
    }

    pub fn interval(&self) -> Interval {
        Interval::new(self.start_instant, self.end_instant)
    }

    fn into_slot(self) -> Slot {
        Slot {
            display: format_display(&self.start_local),
            start: self.start_instant,
            end: self.end_instant,
        }
    }
}

/// A bookable slot.
///
/// `display` is the value shown to customers; `start`/`end` let a caller book
/// the slot without parsing the display string back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Slot {
    pub display: String,
    pub start: Instant,
    pub end: Instant,
}

/// Why a candidate was not offered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum Rejection {
    OutsideWorkingHours,
    OverlapsLunch,
    OverlapsBooking { start: Instant, end: Instant },
}

/// Candidate starts from local midnight stepping by `step`, up to the last
/// start whose full duration still ends by the next local midnight.
///
/// On a fall-back day the repeated hour is walked once: starts on its second
/// pass share their display strings with the first pass and are skipped.
pub fn candidates(
    day: &DayBounds,
    duration: Duration,
    step: Duration,
    timezone: &Tz,
) -> impl Iterator<Item = SlotCandidate> {
    let last_start = day.end.checked_sub_signed(duration);
    let tz = *timezone;
    std::iter::successors(Some(day.start), move |s| s.checked_add_signed(step))
        .take_while(move |s| last_start.is_some_and(|last| *s <= last))
        .map(move |s| SlotCandidate::new(s, duration, &tz))
        .filter(move |c| is_first_wall_clock_pass(c, &tz))
}

/// Whether the candidate's start is the earliest instant its wall-clock time
/// names, which is the instant a booking for that display string resolves to.
fn is_first_wall_clock_pass(candidate: &SlotCandidate, timezone: &Tz) -> bool {
    timezone
        .from_local_datetime(&candidate.start_local.naive_local())
        .earliest()
        .is_some_and(|earliest| earliest == candidate.start_local)
}

/// The first rule `candidate` breaks, or `None` if it can be offered.
///
/// Rules are checked in order: working hours, lunch, then each booking.
/// Working hours are compared by the instant each boundary denotes.
pub fn rejection(
    candidate: &SlotCandidate,
    hours: &AnchoredHours,
    booked: &[BookedInterval],
) -> Option<Rejection> {
    let interval = candidate.interval();
    if !hours.work().contains(&interval) {
        return Some(Rejection::OutsideWorkingHours);
    }
    if hours.lunch().is_some_and(|lunch| interval.overlaps(&lunch)) {
        return Some(Rejection::OverlapsLunch);
    }
    first_overlapping(&interval, booked).map(|b| Rejection::OverlapsBooking {
        start: b.start,
        end: b.end,
    })
}

#[derive(Debug, Default)]
struct RejectionCounts {
    outside_hours: usize,
    lunch: usize,
    booked: usize,
}

impl RejectionCounts {
    fn record(&mut self, rejection: &Rejection) {
        match rejection {
            Rejection::OutsideWorkingHours => self.outside_hours += 1,
            Rejection::OverlapsLunch => self.lunch += 1,
            Rejection::OverlapsBooking { .. } => self.booked += 1,
        }
    }
}

// ── compute_slots ───────────────────────────────────────────────────────────

/// Compute the bookable slots of a date at the default 15-minute granularity.
///
/// # Errors
///
/// [`SlotError::InvalidDuration`] for a non-positive duration and
/// [`SlotError::InvalidConfig`] for a config that breaks its invariants. A
/// fully booked or closed day is an empty `Vec`, not an error.
///
/// # Examples
///
/// ```
/// use chrono::{NaiveDate, NaiveTime};
/// use slot_engine::{compute_slots, AvailabilityRequest, BusinessCalendarConfig};
///
/// let hm = |h, m| NaiveTime::from_hms_opt(h, m, 0).unwrap();
/// let config = BusinessCalendarConfig::new(hm(9, 0), hm(10, 0), "America/Chicago").unwrap();
/// let request = AvailabilityRequest::new(NaiveDate::from_ymd_opt(2026, 5, 4).unwrap(), 30);
///
/// let slots = compute_slots(&request, &config, &[]).unwrap();
/// let shown: Vec<_> = slots.iter().map(|s| s.display.as_str()).collect();
/// assert_eq!(shown, ["9:00 AM", "9:15 AM", "9:30 AM"]);
/// ```
pub fn compute_slots(
    request: &AvailabilityRequest,
    config: &BusinessCalendarConfig,
    booked: &[BookedInterval],
) -> Result<Vec<Slot>> {
    compute_slots_with_options(request, config, booked, &SlotOptions::default())
}

/// Compute the bookable slots of a date with explicit options.
pub fn compute_slots_with_options(
    request: &AvailabilityRequest,
    config: &BusinessCalendarConfig,
    booked: &[BookedInterval],
    options: &SlotOptions,
) -> Result<Vec<Slot>> {
    let duration = request.duration()?;
    let step = options.step()?;
    let tz = config.timezone;

    let day = day_bounds(request.date, &tz)?;
    let hours = anchor(request.date, config)?;

    let mut generated = 0usize;
    let mut counts = RejectionCounts::default();
    let slots: Vec<Slot> = candidates(&day, duration, step, &tz)
        .filter_map(|candidate| {
            generated += 1;
            match rejection(&candidate, &hours, booked) {
                Some(reason) => {
                    trace!(start = %candidate.start_local, ?reason, "candidate rejected");
                    counts.record(&reason);
                    None
                }
                None => Some(candidate.into_slot()),
            }
        })
        .collect();

    debug_assert!(
        slots.windows(2).all(|w| w[0].start < w[1].start),
        "slots must be strictly ascending"
    );

    debug!(
        date = %request.date,
        timezone = tz.name(),
        day_minutes = day.length().num_minutes(),
        has_lunch = config.has_lunch(),
        duration_minutes = request.duration_minutes,
        booked = booked.len(),
        generated,
        offered = slots.len(),
        outside_hours = counts.outside_hours,
        lunch = counts.lunch,
        overlapping = counts.booked,
        "computed slots"
    );

    Ok(slots)
}
