//! TOML configuration.
//!
//! ```toml
//! [business]
//! work_start = "09:00"
//! work_end = "17:00"
//! lunch_start = "12:00"
//! lunch_end = "13:00"
//! timezone = "America/New_York"
//!
//! [display]
//! meridiem = "strict"
//!
//! [slots]
//! granularity_minutes = 15
//! ```
//!
//! Only `[business]` is required. Times are 24-hour `"HH:MM"` strings.

use std::path::Path;

use serde::Deserialize;

use crate::calendar::BusinessCalendarConfig;
use crate::engine::{SlotOptions, GRANULARITY_MINUTES};
use crate::error::{Result, SlotError};
use crate::provider::ConfigProvider;
use crate::time_repr::{parse_24_hour, MeridiemPolicy};

/// Everything a deployment configures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotConfig {
    pub business: BusinessCalendarConfig,
    pub policy: MeridiemPolicy,
    pub options: SlotOptions,
}

impl ConfigProvider for SlotConfig {
    fn business_calendar_config(&self) -> Result<BusinessCalendarConfig> {
        Ok(self.business)
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SlotConfigToml {
    business: Option<BusinessToml>,
    #[serde(default)]
    display: DisplayToml,
    #[serde(default)]
    slots: SlotsToml,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct BusinessToml {
    work_start: String,
    work_end: String,
    lunch_start: Option<String>,
    lunch_end: Option<String>,
    timezone: String,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct DisplayToml {
    #[serde(default)]
    meridiem: MeridiemPolicy,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SlotsToml {
    #[serde(default = "default_granularity")]
    granularity_minutes: i64,
}

impl Default for SlotsToml {
    fn default() -> Self {
        Self {
            granularity_minutes: default_granularity(),
        }
    }
}

fn default_granularity() -> i64 {
    GRANULARITY_MINUTES
}

impl BusinessToml {
    fn into_config(self) -> Result<BusinessCalendarConfig> {
        let config = BusinessCalendarConfig::new(
            parse_24_hour(&self.work_start)?,
            parse_24_hour(&self.work_end)?,
            &self.timezone,
        )?;
        match (self.lunch_start, self.lunch_end) {
            (None, None) => Ok(config),
            (Some(start), Some(end)) => {
                config.with_lunch(parse_24_hour(&start)?, parse_24_hour(&end)?)
            }
            _ => Err(SlotError::InvalidConfig(
                "lunch_start and lunch_end must be set together".to_string(),
            )),
        }
    }
}

/// Parse configuration from TOML text.
///
/// # Errors
///
/// [`SlotError::MissingBusinessConfig`] without a `[business]` table,
/// [`SlotError::InvalidConfig`] for TOML that does not match the schema,
/// hours that break an ordering invariant, or a slot granularity that does not
/// divide a day. The time and timezone errors of individual fields pass
/// through.
pub fn parse_config(text: &str) -> Result<SlotConfig> {
    let raw: SlotConfigToml =
        toml::from_str(text).map_err(|e| SlotError::InvalidConfig(e.to_string()))?;

    let business = raw
        .business
        .ok_or_else(|| SlotError::MissingBusinessConfig("no [business] table".to_string()))?
        .into_config()?;

    let options = SlotOptions {
        granularity_minutes: raw.slots.granularity_minutes,
    };
    options.validate().map_err(|e| SlotError::InvalidConfig(format!("[slots] {e}")))?;

    Ok(SlotConfig {
        business,
        policy: raw.display.meridiem,
        options,
    })
}

/// Read and parse a configuration file.
pub fn load_config(path: &Path) -> Result<SlotConfig> {
    let text = std::fs::read_to_string(path).map_err(|e| {
        SlotError::MissingBusinessConfig(format!("cannot read {}: {e}", path.display()))
    })?;
    parse_config(&text)
}
