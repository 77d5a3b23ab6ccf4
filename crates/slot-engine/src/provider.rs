//! Collaborator seams and the service that wires them to the engine.
//!
//! The engine itself takes plain snapshots. Config storage and the booking
//! store live behind [`ConfigProvider`] and [`BookingRepository`] so a host
//! application can back them with whatever persistence it has; the in-memory
//! implementations here serve tests and the CLI.

use chrono::NaiveDate;
use chrono_tz::Tz;
use tracing::{debug, instrument};

use crate::booking::{check_booking, BookingDecision, BookingRequest};
use crate::calendar::{day_bounds, BusinessCalendarConfig};
use crate::engine::{compute_slots_with_options, AvailabilityRequest, Slot, SlotOptions};
use crate::error::{Result, SlotError};
use crate::overlap::BookedInterval;
use crate::time_repr::MeridiemPolicy;

/// Source of the current business calendar settings.
pub trait ConfigProvider {
    /// # Errors
    ///
    /// [`SlotError::MissingBusinessConfig`] if nothing is configured.
    fn business_calendar_config(&self) -> Result<BusinessCalendarConfig>;
}

/// Source of existing appointments.
pub trait BookingRepository {
    /// Every booking whose interval intersects `date` in `timezone`.
    fn booked_intervals(&self, date: NaiveDate, timezone: &Tz) -> Result<Vec<BookedInterval>>;
}

/// A fixed, possibly absent, configuration.
#[derive(Debug, Clone, Default)]
pub struct StaticConfigProvider {
    config: Option<BusinessCalendarConfig>,
}

impl StaticConfigProvider {
    pub fn new(config: BusinessCalendarConfig) -> Self {
        Self {
            config: Some(config),
        }
    }

    /// A provider with nothing configured.
    pub fn unset() -> Self {
        Self::default()
    }
}

impl ConfigProvider for StaticConfigProvider {
    fn business_calendar_config(&self) -> Result<BusinessCalendarConfig> {
        self.config.ok_or_else(|| {
            SlotError::MissingBusinessConfig("no business calendar is configured".to_string())
        })
    }
}

/// Bookings held in a `Vec`.
#[derive(Debug, Clone, Default)]
pub struct InMemoryBookingRepository {
    bookings: Vec<BookedInterval>,
}

impl InMemoryBookingRepository {
    pub fn new(bookings: Vec<BookedInterval>) -> Self {
        Self { bookings }
    }

    pub fn insert(&mut self, booking: BookedInterval) {
        self.bookings.push(booking);
    }

    pub fn bookings(&self) -> &[BookedInterval] {
        &self.bookings
    }
}

impl BookingRepository for InMemoryBookingRepository {
    fn booked_intervals(&self, date: NaiveDate, timezone: &Tz) -> Result<Vec<BookedInterval>> {
        let day = day_bounds(date, timezone)?.interval();
        Ok(self
            .bookings
            .iter()
            .filter(|b| b.interval().overlaps(&day))
            .copied()
            .collect())
    }
}

/// Slot listing and booking admission over a config provider and a booking
/// repository.
///
/// Each call fetches a fresh config and booking snapshot; nothing is cached.
#[derive(Debug, Clone)]
pub struct AvailabilityService<C, B> {
    config: C,
    bookings: B,
    options: SlotOptions,
    policy: MeridiemPolicy,
}

impl<C: ConfigProvider, B: BookingRepository> AvailabilityService<C, B> {
    pub fn new(config: C, bookings: B) -> Self {
        Self {
            config,
            bookings,
            options: SlotOptions::default(),
            policy: MeridiemPolicy::default(),
        }
    }

    pub fn with_options(mut self, options: SlotOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_policy(mut self, policy: MeridiemPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Open slots on `date` for an appointment of `duration_minutes`.
    #[instrument(skip(self))]
    pub fn available_slots(&self, date: NaiveDate, duration_minutes: i64) -> Result<Vec<Slot>> {
        let request = AvailabilityRequest::new(date, duration_minutes);
        request.duration()?;

        let config = self.config.business_calendar_config()?;
        let booked = self.bookings.booked_intervals(date, &config.timezone)?;
        debug!(booked = booked.len(), "loaded booking snapshot");

        compute_slots_with_options(&request, &config, &booked, &self.options)
    }

    /// Display strings of the open slots, as a booking page lists them.
    pub fn available_slot_displays(
        &self,
        date: NaiveDate,
        duration_minutes: i64,
    ) -> Result<Vec<String>> {
        Ok(self
            .available_slots(date, duration_minutes)?
            .into_iter()
            .map(|slot| slot.display)
            .collect())
    }

    /// Check a chosen display slot against a fresh booking snapshot.
    #[instrument(skip(self))]
    pub fn request_booking(
        &self,
        date: NaiveDate,
        display_slot: &str,
        duration_minutes: i64,
    ) -> Result<BookingDecision> {
        let config = self.config.business_calendar_config()?;
        let booked = self.bookings.booked_intervals(date, &config.timezone)?;
        let request = BookingRequest::new(date, display_slot, duration_minutes);
        check_booking(&request, &config, &booked, self.policy)
    }
}
