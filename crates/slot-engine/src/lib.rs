//! # slot-engine
//!
//! Deterministic appointment availability for a single calendar day.
//!
//! Given a service duration, a business's working hours, an optional lunch
//! closure and the intervals already booked, the engine computes the ordered
//! list of start times a customer can choose from. It also owns the
//! conversions between stored instants, local wall-clock times, 12-hour
//! display strings and 24-hour canonical strings.
//!
//! ## Modules
//!
//! - [`time_repr`] — instant / local / display / 24-hour conversions
//! - [`calendar`] — business hours anchored onto a date
//! - [`overlap`] — half-open interval overlap
//! - [`engine`] — slot computation
//! - [`booking`] — admission check for a chosen slot
//! - [`provider`] — config and booking collaborator traits, in-memory impls
//! - [`config`] — TOML configuration
//! - [`error`] — Error types

pub mod booking;
pub mod calendar;
pub mod config;
pub mod engine;
pub mod error;
pub mod overlap;
pub mod provider;
pub mod time_repr;

pub use booking::{check_booking, BookingDecision, BookingRequest};
pub use calendar::{anchor, day_bounds, AnchoredHours, BusinessCalendarConfig, DayBounds};
pub use config::{load_config, parse_config, SlotConfig};
pub use engine::{
    compute_slots, compute_slots_with_options, parse_duration_minutes, AvailabilityRequest,
    Rejection, Slot, SlotCandidate, SlotOptions, GRANULARITY_MINUTES,
};
pub use error::SlotError;
pub use overlap::{overlaps, BookedInterval, Interval};
pub use provider::{
    AvailabilityService, BookingRepository, ConfigProvider, InMemoryBookingRepository,
    StaticConfigProvider,
};
pub use time_repr::{
    display_to_canonical, format_display, parse_display, parse_display_with_policy,
    parse_timezone, to_24_hour, to_canonical_timestamp, to_local, CanonicalTime, DisplayTime,
    Instant, LocalDateTime, Meridiem, MeridiemPolicy,
};
