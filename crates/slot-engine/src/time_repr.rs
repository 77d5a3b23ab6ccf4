//! Conversions between the four representations of a booking moment.
//!
//! A slot start travels through several shapes on its way from storage to the
//! booking page and back:
//!
//! - an absolute [`Instant`] (what the persistence layer stores),
//! - a [`LocalDateTime`] in the business timezone (what the wall clock says),
//! - a 12-hour display string such as `"2:15 PM"` (what the customer sees),
//! - a 24-hour canonical string such as `"14:15"` (what gets written back).
//!
//! Every conversion is strict. A display string carries exactly one meridiem
//! marker; anything else is rejected with [`SlotError::MalformedTimeString`]
//! instead of being repaired.

use std::fmt;

use chrono::{
    DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeZone, Timelike, Utc,
};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SlotError};

/// An absolute point in time, independent of timezone.
pub type Instant = DateTime<Utc>;

/// A wall-clock date and time as observed in a specific timezone.
pub type LocalDateTime = DateTime<Tz>;

// ── Meridiem ────────────────────────────────────────────────────────────────

/// The AM/PM half of a 12-hour clock reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Meridiem {
    Am,
    Pm,
}

impl Meridiem {
    /// The uppercase marker as rendered in display strings.
    pub fn as_str(self) -> &'static str {
        match self {
            Meridiem::Am => "AM",
            Meridiem::Pm => "PM",
        }
    }

    fn parse(marker: &str, policy: MeridiemPolicy) -> Option<Self> {
        match (marker, policy) {
            ("AM", _) => Some(Meridiem::Am),
            ("PM", _) => Some(Meridiem::Pm),
            ("am", MeridiemPolicy::CaseInsensitive) => Some(Meridiem::Am),
            ("pm", MeridiemPolicy::CaseInsensitive) => Some(Meridiem::Pm),
            _ => None,
        }
    }
}

impl fmt::Display for Meridiem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which meridiem spellings [`parse_display_with_policy`] accepts.
///
/// Formatting always emits uppercase; the policy only widens what is read back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MeridiemPolicy {
    /// Only `AM` and `PM`.
    #[default]
    Strict,
    /// `AM`/`PM` or `am`/`pm`. Mixed case (`Am`) is still rejected.
    CaseInsensitive,
}

// ── DisplayTime ─────────────────────────────────────────────────────────────

/// A parsed 12-hour clock reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct DisplayTime {
    /// 1 through 12.
    pub hour12: u32,
    /// 0 through 59.
    pub minute: u32,
    pub meridiem: Meridiem,
}

impl DisplayTime {
    /// Build a display time from a wall-clock time of day.
    pub fn from_time(time: NaiveTime) -> Self {
        let (is_pm, hour12) = time.hour12();
        DisplayTime {
            hour12,
            minute: time.minute(),
            meridiem: if is_pm { Meridiem::Pm } else { Meridiem::Am },
        }
    }

    /// The canonical `"HH:MM"` form of this reading.
    pub fn to_24_hour(&self) -> Result<String> {
        to_24_hour(self.hour12, self.minute, self.meridiem)
    }

    /// The wall-clock time of day this reading denotes.
    pub fn to_time(&self) -> Result<NaiveTime> {
        let hour24 = hour12_to_24(self.hour12, self.meridiem)?;
        NaiveTime::from_hms_opt(hour24, self.minute, 0).ok_or_else(|| {
            SlotError::InvalidTime(format!("minute {} out of range 0-59", self.minute))
        })
    }
}

impl fmt::Display for DisplayTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{:02} {}", self.hour12, self.minute, self.meridiem)
    }
}

/// A wall-clock time resolved for persistence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CanonicalTime {
    /// The 24-hour `"HH:MM"` wall-clock string.
    pub time_24h: String,
    /// The absolute instant on the requested date in the business timezone.
    pub instant: Instant,
}

// ── Timezone and local time ─────────────────────────────────────────────────

/// Parse an IANA timezone string into `Tz`.
pub fn parse_timezone(s: &str) -> Result<Tz> {
    s.parse::<Tz>()
        .map_err(|_| SlotError::UnknownTimezone(format!("'{}'", s)))
}

/// Express an instant on the wall clock of `timezone`.
///
/// The offset is looked up at the instant itself, so values on either side of a
/// DST transition get their own offset.
pub fn to_local(instant: Instant, timezone: &Tz) -> LocalDateTime {
    instant.with_timezone(timezone)
}

/// Resolve a wall-clock reading to an instant without failing.
///
/// Ambiguous readings (DST fall-back) take the earlier instant. Readings inside
/// a DST gap are interpreted with the offset in force before the gap, which is
/// the same as adding the elapsed wall-clock time to the preceding midnight.
pub(crate) fn resolve_local_lenient(timezone: &Tz, naive: NaiveDateTime) -> LocalDateTime {
    if let Some(dt) = timezone.from_local_datetime(&naive).earliest() {
        return dt;
    }
    let before_gap = timezone
        .offset_from_utc_datetime(&(naive - Duration::days(1)))
        .fix();
    let utc = naive - Duration::seconds(i64::from(before_gap.local_minus_utc()));
    Utc.from_utc_datetime(&utc).with_timezone(timezone)
}

// ── 12-hour display ─────────────────────────────────────────────────────────

/// Format a local datetime as `H:MM AM` / `H:MM PM`.
///
/// No leading zero on the hour, minutes always two digits, and exactly one
/// meridiem marker.
///
/// # Examples
///
/// ```
/// use chrono::TimeZone;
/// use slot_engine::time_repr::{format_display, parse_timezone};
///
/// let tz = parse_timezone("America/New_York").unwrap();
/// let local = tz.with_ymd_and_hms(2026, 3, 10, 14, 15, 0).unwrap();
/// assert_eq!(format_display(&local), "2:15 PM");
/// ```
pub fn format_display(local: &LocalDateTime) -> String {
    format_time_of_day(local.time())
}

/// Format a bare time of day in display form.
pub fn format_time_of_day(time: NaiveTime) -> String {
    time.format("%-I:%M %p").to_string()
}

/// Parse a display string with the [`MeridiemPolicy::Strict`] policy.
pub fn parse_display(s: &str) -> Result<DisplayTime> {
    parse_display_with_policy(s, MeridiemPolicy::Strict)
}

/// Parse a display string of the exact shape `H:MM AM` or `H:MM PM`.
///
/// The hour has one or two digits and no leading zero, the minutes exactly
/// two digits, and a single space separates the marker. Surrounding whitespace,
/// a missing or doubled marker, or any other deviation is
/// [`SlotError::MalformedTimeString`]. Well-shaped values outside 1-12 / 0-59
/// are [`SlotError::InvalidTime`].
pub fn parse_display_with_policy(s: &str, policy: MeridiemPolicy) -> Result<DisplayTime> {
    let malformed = || SlotError::MalformedTimeString(format!("expected 'H:MM AM|PM', got '{s}'"));

    let (clock, marker) = s.split_once(' ').ok_or_else(malformed)?;
    let meridiem = Meridiem::parse(marker, policy).ok_or_else(malformed)?;
    let (hour, minute) = clock.split_once(':').ok_or_else(malformed)?;

    if hour.is_empty() || hour.len() > 2 || hour.starts_with('0') || !is_ascii_digits(hour) {
        return Err(malformed());
    }
    if minute.len() != 2 || !is_ascii_digits(minute) {
        return Err(malformed());
    }

    let hour12: u32 = hour.parse().map_err(|_| malformed())?;
    let minute: u32 = minute.parse().map_err(|_| malformed())?;

    check_hour12(hour12)?;
    check_minute(minute)?;

    Ok(DisplayTime {
        hour12,
        minute,
        meridiem,
    })
}

// ── 24-hour canonical ───────────────────────────────────────────────────────

/// Convert a 12-hour reading to the canonical `"HH:MM"` string.
///
/// `12 AM` is `00`, `12 PM` is `12`, `1-11 AM` keep their hour and `1-11 PM`
/// add twelve.
///
/// # Errors
///
/// Returns [`SlotError::InvalidTime`] if the hour is outside 1-12 or the minute
/// outside 0-59.
pub fn to_24_hour(hour12: u32, minute: u32, meridiem: Meridiem) -> Result<String> {
    let hour24 = hour12_to_24(hour12, meridiem)?;
    check_minute(minute)?;
    Ok(format!("{hour24:02}:{minute:02}"))
}

/// Parse a canonical `"HH:MM"` string (two digits each, 00:00 through 23:59).
pub fn parse_24_hour(s: &str) -> Result<NaiveTime> {
    let malformed = || SlotError::MalformedTimeString(format!("expected 'HH:MM', got '{s}'"));

    let (hour, minute) = s.split_once(':').ok_or_else(malformed)?;
    if hour.len() != 2 || minute.len() != 2 || !is_ascii_digits(hour) || !is_ascii_digits(minute) {
        return Err(malformed());
    }
    let hour: u32 = hour.parse().map_err(|_| malformed())?;
    let minute: u32 = minute.parse().map_err(|_| malformed())?;

    if hour > 23 {
        return Err(SlotError::InvalidTime(format!("hour {hour} out of range 0-23")));
    }
    check_minute(minute)?;

    NaiveTime::from_hms_opt(hour, minute, 0)
        .ok_or_else(|| SlotError::InvalidTime(format!("'{s}'")))
}

/// Combine a date, a 24-hour wall-clock string and a timezone into an instant.
///
/// An ambiguous wall-clock time (DST fall-back) resolves to the earlier
/// instant. A wall-clock time that does not exist on that date (DST gap) is an
/// error rather than being shifted.
///
/// # Errors
///
/// [`SlotError::MalformedTimeString`] or [`SlotError::InvalidTime`] for a bad
/// time string, [`SlotError::UnknownTimezone`] for a bad zone, and
/// [`SlotError::InvalidTime`] for a nonexistent local time.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use slot_engine::time_repr::to_canonical_timestamp;
///
/// let date = NaiveDate::from_ymd_opt(2026, 3, 10).unwrap();
/// let instant = to_canonical_timestamp(date, "14:15", "America/New_York").unwrap();
/// assert_eq!(instant.to_rfc3339(), "2026-03-10T18:15:00+00:00");
/// ```
pub fn to_canonical_timestamp(date: NaiveDate, hh24mm: &str, timezone: &str) -> Result<Instant> {
    let time = parse_24_hour(hh24mm)?;
    let tz = parse_timezone(timezone)?;
    local_to_instant(date, time, &tz)
}

/// Parse a display string and resolve it on `date` for persistence.
pub fn display_to_canonical(
    date: NaiveDate,
    display: &str,
    timezone: &str,
    policy: MeridiemPolicy,
) -> Result<CanonicalTime> {
    let parsed = parse_display_with_policy(display, policy)?;
    let time_24h = parsed.to_24_hour()?;
    let instant = to_canonical_timestamp(date, &time_24h, timezone)?;
    Ok(CanonicalTime { time_24h, instant })
}

pub(crate) fn local_to_instant(date: NaiveDate, time: NaiveTime, tz: &Tz) -> Result<Instant> {
    let naive = date.and_time(time);
    tz.from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| {
            SlotError::InvalidTime(format!(
                "{naive} does not exist in {} (DST gap)",
                tz.name()
            ))
        })
}

// ── Internal helpers ────────────────────────────────────────────────────────

fn hour12_to_24(hour12: u32, meridiem: Meridiem) -> Result<u32> {
    check_hour12(hour12)?;
    Ok(match (hour12, meridiem) {
        (12, Meridiem::Am) => 0,
        (12, Meridiem::Pm) => 12,
        (h, Meridiem::Am) => h,
        (h, Meridiem::Pm) => h + 12,
    })
}

fn check_hour12(hour12: u32) -> Result<()> {
    if (1..=12).contains(&hour12) {
        Ok(())
    } else {
        Err(SlotError::InvalidTime(format!("hour {hour12} out of range 1-12")))
    }
}

fn check_minute(minute: u32) -> Result<()> {
    if minute <= 59 {
        Ok(())
    } else {
        Err(SlotError::InvalidTime(format!("minute {minute} out of range 0-59")))
    }
}

fn is_ascii_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

// ── Tests ───────────────────────────────────────────────────────────────────
