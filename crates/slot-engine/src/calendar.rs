//! Business hours anchored onto a calendar date.
//!
//! A [`BusinessCalendarConfig`] only knows times of day ("open 09:00, close
//! 17:00, lunch 12:00-13:00") and a timezone. [`anchor`] projects those onto a
//! specific date, producing absolute instants that the engine compares
//! candidates against.

use chrono::{Duration, NaiveDate, NaiveTime, Utc};
use chrono_tz::Tz;
use serde::Serialize;

use crate::error::{Result, SlotError};
use crate::overlap::Interval;
use crate::time_repr::{parse_timezone, resolve_local_lenient, Instant};

/// Working hours, an optional lunch closure, and the business timezone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusinessCalendarConfig {
    pub work_start: NaiveTime,
    pub work_end: NaiveTime,
    pub lunch_start: Option<NaiveTime>,
    pub lunch_end: Option<NaiveTime>,
    pub timezone: Tz,
}

impl BusinessCalendarConfig {
    /// Working hours with no lunch closure.
    ///
    /// # Errors
    ///
    /// [`SlotError::UnknownTimezone`] for a bad zone name, and
    /// [`SlotError::InvalidConfig`] unless `work_start < work_end`.
    pub fn new(work_start: NaiveTime, work_end: NaiveTime, timezone: &str) -> Result<Self> {
        let config = Self {
            work_start,
            work_end,
            lunch_start: None,
            lunch_end: None,
            timezone: parse_timezone(timezone)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Add a lunch closure. It must start before it ends.
    pub fn with_lunch(mut self, lunch_start: NaiveTime, lunch_end: NaiveTime) -> Result<Self> {
        self.lunch_start = Some(lunch_start);
        self.lunch_end = Some(lunch_end);
        self.validate()?;
        Ok(self)
    }

    /// Check the ordering and pairing invariants.
    pub fn validate(&self) -> Result<()> {
        if self.work_start >= self.work_end {
            return Err(SlotError::InvalidConfig(format!(
                "work_start {} must be before work_end {}",
                self.work_start.format("%H:%M"),
                self.work_end.format("%H:%M")
            )));
        }
        match (self.lunch_start, self.lunch_end) {
            (None, None) => Ok(()),
            (Some(start), Some(end)) if start < end => Ok(()),
            (Some(start), Some(end)) => Err(SlotError::InvalidConfig(format!(
                "lunch_start {} must be before lunch_end {}",
                start.format("%H:%M"),
                end.format("%H:%M")
            ))),
            _ => Err(SlotError::InvalidConfig(
                "lunch_start and lunch_end must be set together".to_string(),
            )),
        }
    }

    pub fn has_lunch(&self) -> bool {
        self.lunch_start.is_some() && self.lunch_end.is_some()
    }
}

/// The absolute instants bounding one calendar date in a timezone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DayBounds {
    /// Local midnight at the start of the date.
    pub start: Instant,
    /// Local midnight at the start of the next date.
    pub end: Instant,
}

impl DayBounds {
    pub fn interval(&self) -> Interval {
        Interval::new(self.start, self.end)
    }

    /// Physical length of the day (23 or 25 hours on DST transition days).
    pub fn length(&self) -> Duration {
        self.end - self.start
    }
}

/// Business boundaries of one date as absolute instants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AnchoredHours {
    pub work_start: Instant,
    pub work_end: Instant,
    pub lunch_start: Option<Instant>,
    pub lunch_end: Option<Instant>,
}

impl AnchoredHours {
    pub fn work(&self) -> Interval {
        Interval::new(self.work_start, self.work_end)
    }

    pub fn lunch(&self) -> Option<Interval> {
        match (self.lunch_start, self.lunch_end) {
            (Some(start), Some(end)) => Some(Interval::new(start, end)),
            _ => None,
        }
    }
}

/// Compute the instants bounding `date` in `timezone`.
pub fn day_bounds(date: NaiveDate, timezone: &Tz) -> Result<DayBounds> {
    let next = date
        .succ_opt()
        .ok_or_else(|| SlotError::InvalidTime(format!("no day follows {date}")))?;
    Ok(DayBounds {
        start: local_instant(date, NaiveTime::MIN, timezone),
        end: local_instant(next, NaiveTime::MIN, timezone),
    })
}

/// Project the configured work and lunch times onto `date`.
///
/// Each boundary is resolved with the UTC offset in force at that moment of
/// the day, so 09:00 means 09:00 on the wall clock even on a DST transition
/// day. A boundary that falls inside a DST gap lands on local midnight plus
/// the elapsed wall-clock time.
///
/// # Errors
///
/// [`SlotError::InvalidConfig`] if the config breaks its invariants.
///
/// # Examples
///
/// ```
/// use chrono::{NaiveDate, NaiveTime, TimeZone, Utc};
/// use slot_engine::calendar::{anchor, BusinessCalendarConfig};
///
/// let hm = |h, m| NaiveTime::from_hms_opt(h, m, 0).unwrap();
/// let config = BusinessCalendarConfig::new(hm(9, 0), hm(17, 0), "Europe/London").unwrap();
/// let date = NaiveDate::from_ymd_opt(2026, 7, 1).unwrap();
///
/// let hours = anchor(date, &config).unwrap();
/// // London is on BST (UTC+1) in July
/// assert_eq!(hours.work_start, Utc.with_ymd_and_hms(2026, 7, 1, 8, 0, 0).unwrap());
/// assert!(hours.lunch().is_none());
/// ```
pub fn anchor(date: NaiveDate, config: &BusinessCalendarConfig) -> Result<AnchoredHours> {
    config.validate()?;
    let tz = &config.timezone;
    Ok(AnchoredHours {
        work_start: local_instant(date, config.work_start, tz),
        work_end: local_instant(date, config.work_end, tz),
        lunch_start: config.lunch_start.map(|t| local_instant(date, t, tz)),
        lunch_end: config.lunch_end.map(|t| local_instant(date, t, tz)),
    })
}

fn local_instant(date: NaiveDate, time: NaiveTime, tz: &Tz) -> Instant {
    resolve_local_lenient(tz, date.and_time(time)).with_timezone(&Utc)
}
