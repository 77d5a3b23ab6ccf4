//! Admission check for a booking chosen from the displayed slots.
//!
//! The customer picks a display string such as `"2:15 PM"`. Before it is
//! written, the string is resolved back to an instant on the requested date and
//! run through the same rules the engine used to offer it, against a fresh
//! snapshot of the booked intervals. This narrows the window for two customers
//! taking the same slot; the persistence layer's overlap constraint remains the
//! final guard.

use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

use crate::calendar::{anchor, BusinessCalendarConfig};
use crate::engine::{rejection, AvailabilityRequest, Rejection, SlotCandidate};
use crate::error::Result;
use crate::overlap::BookedInterval;
use crate::time_repr::{local_to_instant, parse_display_with_policy, MeridiemPolicy, Instant};

/// A booking the customer asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingRequest {
    pub date: NaiveDate,
    /// The slot as displayed, e.g. `"2:15 PM"`.
    pub display_slot: String,
    pub duration_minutes: i64,
}

impl BookingRequest {
    pub fn new(date: NaiveDate, display_slot: impl Into<String>, duration_minutes: i64) -> Self {
        Self {
            date,
            display_slot: display_slot.into(),
            duration_minutes,
        }
    }
}

/// Outcome of [`check_booking`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BookingDecision {
    /// The slot is free; these are the values to persist.
    Accepted {
        start: Instant,
        end: Instant,
        /// 24-hour `"HH:MM"` wall-clock start.
        canonical_time: String,
    },
    /// The slot cannot be booked.
    Conflict { conflict: Rejection },
}

impl BookingDecision {
    pub fn is_accepted(&self) -> bool {
        matches!(self, BookingDecision::Accepted { .. })
    }
}

/// Decide whether `request` can be booked given the current bookings.
///
/// # Errors
///
/// Malformed display strings, non-positive durations, a wall-clock time that
/// does not exist on the date, and invalid configs are errors. A taken or
/// out-of-hours slot is a [`BookingDecision::Conflict`], not an error.
pub fn check_booking(
    request: &BookingRequest,
    config: &BusinessCalendarConfig,
    booked: &[BookedInterval],
    policy: MeridiemPolicy,
) -> Result<BookingDecision> {
    let duration = AvailabilityRequest::new(request.date, request.duration_minutes).duration()?;
    let parsed = parse_display_with_policy(&request.display_slot, policy)?;
    let canonical_time = parsed.to_24_hour()?;
    let start = local_to_instant(request.date, parsed.to_time()?, &config.timezone)?;

    let hours = anchor(request.date, config)?;
    let candidate = SlotCandidate::new(start, duration, &config.timezone);

    let decision = match rejection(&candidate, &hours, booked) {
        Some(conflict) => BookingDecision::Conflict { conflict },
        None => BookingDecision::Accepted {
            start: candidate.start_instant,
            end: candidate.end_instant,
            canonical_time,
        },
    };

    debug!(
        date = %request.date,
        slot = %request.display_slot,
        duration_minutes = request.duration_minutes,
        accepted = decision.is_accepted(),
        "checked booking"
    );

    Ok(decision)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::compute_slots;
    use crate::error::SlotError;
    use chrono::{NaiveTime, TimeZone, Utc};

    fn hm(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, 20).unwrap()
    }

    fn config() -> BusinessCalendarConfig {
        BusinessCalendarConfig::new(hm(9, 0), hm(17, 0), "America/Los_Angeles")
            .unwrap()
            .with_lunch(hm(12, 0), hm(13, 0))
            .unwrap()
    }

    /// Wall-clock time on `day()` in Los Angeles (UTC-8 in January).
    fn la(h: u32, m: u32) -> Instant {
        Utc.with_ymd_and_hms(2026, 1, 20, h + 8, m, 0).unwrap()
    }

    #[test]
    fn test_free_slot_is_accepted() {
        let request = BookingRequest::new(day(), "2:15 PM", 30);
        let decision = check_booking(&request, &config(), &[], MeridiemPolicy::Strict).unwrap();
        assert_eq!(
            decision,
            BookingDecision::Accepted {
                start: la(14, 15),
                end: la(14, 45),
                canonical_time: "14:15".to_string(),
            }
        );
    }

    #[test]
    fn test_taken_slot_conflicts() {
        let booked = [BookedInterval::new(la(14, 0), la(14, 30)).unwrap()];
        let request = BookingRequest::new(day(), "2:15 PM", 15);
        let decision = check_booking(&request, &config(), &booked, MeridiemPolicy::Strict).unwrap();
        assert_eq!(
            decision,
            BookingDecision::Conflict {
                conflict: Rejection::OverlapsBooking {
                    start: la(14, 0),
                    end: la(14, 30)
                }
            }
        );
    }

    #[test]
    fn test_adjacent_slot_is_accepted() {
        let booked = [BookedInterval::new(la(14, 0), la(14, 30)).unwrap()];
        let request = BookingRequest::new(day(), "2:30 PM", 15);
        let decision = check_booking(&request, &config(), &booked, MeridiemPolicy::Strict).unwrap();
        assert!(decision.is_accepted());
    }

    #[test]
    fn test_lunch_conflicts() {
        let request = BookingRequest::new(day(), "11:45 AM", 30);
        let decision = check_booking(&request, &config(), &[], MeridiemPolicy::Strict).unwrap();
        assert_eq!(
            decision,
            BookingDecision::Conflict {
                conflict: Rejection::OverlapsLunch
            }
        );
    }

    #[test]
    fn test_after_hours_conflicts() {
        let request = BookingRequest::new(day(), "4:45 PM", 30);
        let decision = check_booking(&request, &config(), &[], MeridiemPolicy::Strict).unwrap();
        assert_eq!(
            decision,
            BookingDecision::Conflict {
                conflict: Rejection::OutsideWorkingHours
            }
        );
    }

    #[test]
    fn test_doubled_meridiem_is_an_error() {
        let request = BookingRequest::new(day(), "2:15 PM PM", 30);
        let result = check_booking(&request, &config(), &[], MeridiemPolicy::Strict);
        assert!(matches!(result, Err(SlotError::MalformedTimeString(_))));
    }

    #[test]
    fn test_lowercase_respects_policy() {
        let request = BookingRequest::new(day(), "2:15 pm", 30);
        assert!(check_booking(&request, &config(), &[], MeridiemPolicy::Strict).is_err());
        let decision =
            check_booking(&request, &config(), &[], MeridiemPolicy::CaseInsensitive).unwrap();
        assert!(decision.is_accepted());
    }

    #[test]
    fn test_invalid_duration_is_an_error() {
        let request = BookingRequest::new(day(), "2:15 PM", 0);
        let result = check_booking(&request, &config(), &[], MeridiemPolicy::Strict);
        assert!(matches!(result, Err(SlotError::InvalidDuration(_))));
    }

    #[test]
    fn test_enormous_duration_conflicts_not_errors() {
        for minutes in [1_000_000_000_000, i64::MAX] {
            let request = BookingRequest::new(day(), "9:00 AM", minutes);
            let decision =
                check_booking(&request, &config(), &[], MeridiemPolicy::Strict).unwrap();
            assert_eq!(
                decision,
                BookingDecision::Conflict {
                    conflict: Rejection::OutsideWorkingHours
                },
                "{minutes} minutes"
            );
        }
    }

    #[test]
    fn test_listed_fall_back_slots_are_all_admitted() {
        let config =
            BusinessCalendarConfig::new(hm(0, 0), hm(6, 0), "America/New_York").unwrap();
        let fall_back = NaiveDate::from_ymd_opt(2026, 11, 1).unwrap();
        // 1:30-2:00 AM EDT
        let booked = [BookedInterval::new(
            Utc.with_ymd_and_hms(2026, 11, 1, 5, 30, 0).unwrap(),
            Utc.with_ymd_and_hms(2026, 11, 1, 6, 0, 0).unwrap(),
        )
        .unwrap()];
        let slots =
            compute_slots(&AvailabilityRequest::new(fall_back, 30), &config, &booked).unwrap();
        assert!(!slots.is_empty());

        for slot in &slots {
            let request = BookingRequest::new(fall_back, slot.display.clone(), 30);
            let decision =
                check_booking(&request, &config, &booked, MeridiemPolicy::Strict).unwrap();
            match decision {
                BookingDecision::Accepted { start, end, .. } => {
                    assert_eq!((start, end), (slot.start, slot.end), "{}", slot.display);
                }
                BookingDecision::Conflict { conflict } => {
                    panic!("{} listed but refused: {conflict:?}", slot.display)
                }
            }
        }

        let request = BookingRequest::new(fall_back, "1:30 AM", 30);
        let decision = check_booking(&request, &config, &booked, MeridiemPolicy::Strict).unwrap();
        assert!(matches!(
            decision,
            BookingDecision::Conflict {
                conflict: Rejection::OverlapsBooking { .. }
            }
        ));
    }

    #[test]
    fn test_decision_serializes_with_status_tag() {
        let request = BookingRequest::new(day(), "11:45 AM", 30);
        let decision = check_booking(&request, &config(), &[], MeridiemPolicy::Strict).unwrap();
        let json = serde_json::to_value(&decision).unwrap();
        assert_eq!(json["status"], "conflict");
        assert_eq!(json["conflict"]["reason"], "overlaps_lunch");
    }
}
