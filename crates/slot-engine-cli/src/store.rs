//! JSON file of booked intervals.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use chrono_tz::Tz;
use slot_engine::error;
use slot_engine::{BookedInterval, BookingRepository, InMemoryBookingRepository, SlotError};
use tracing::debug;

/// Bookings stored as a JSON array of `{"start", "end"}` objects.
///
/// The file is read on every query, so a check made after another command
/// recorded a booking sees it. No path, or a file that does not exist yet,
/// means no bookings.
#[derive(Debug, Clone, Default)]
pub struct BookingFile {
    path: Option<PathBuf>,
}

impl BookingFile {
    pub fn new(path: Option<&Path>) -> Self {
        Self {
            path: path.map(Path::to_path_buf),
        }
    }

    fn load(&self) -> error::Result<InMemoryBookingRepository> {
        let Some(path) = self.path.as_deref() else {
            return Ok(InMemoryBookingRepository::default());
        };
        if !path.exists() {
            debug!(path = %path.display(), "bookings file absent, starting empty");
            return Ok(InMemoryBookingRepository::default());
        }
        let text = fs::read_to_string(path)
            .map_err(|e| SlotError::Repository(format!("reading {}: {e}", path.display())))?;
        let bookings: Vec<BookedInterval> = serde_json::from_str(&text)
            .map_err(|e| SlotError::Repository(format!("parsing {}: {e}", path.display())))?;
        debug!(path = %path.display(), count = bookings.len(), "loaded bookings");
        Ok(InMemoryBookingRepository::new(bookings))
    }

    /// Add `booking` to the file, creating it if needed.
    ///
    /// # Errors
    ///
    /// [`SlotError::Repository`] if the file cannot be read, parsed or written,
    /// or if no path was given.
    pub fn append(&self, booking: BookedInterval) -> error::Result<()> {
        let Some(path) = self.path.as_deref() else {
            return Err(SlotError::Repository("no bookings file to record into".to_string()));
        };
        let mut repo = self.load()?;
        repo.insert(booking);
        let json = serde_json::to_string_pretty(repo.bookings())
            .map_err(|e| SlotError::Repository(e.to_string()))?;
        fs::write(path, json + "\n")
            .map_err(|e| SlotError::Repository(format!("writing {}: {e}", path.display())))?;
        debug!(path = %path.display(), count = repo.bookings().len(), "recorded booking");
        Ok(())
    }
}

impl BookingRepository for BookingFile {
    fn booked_intervals(
        &self,
        date: NaiveDate,
        timezone: &Tz,
    ) -> error::Result<Vec<BookedInterval>> {
        self.load()?.booked_intervals(date, timezone)
    }
}
