use anyhow::{Context, Result};
use slot_engine::{
    display_to_canonical, load_config, parse_duration_minutes, AvailabilityService,
    BookedInterval, BookingDecision, MeridiemPolicy, Rejection, SlotConfig,
};
use tracing::info;

use crate::cli::{BookArgs, ConvertArgs, ListArgs, StoreArgs};
use crate::store::BookingFile;
use crate::Outcome;

type Service = AvailabilityService<SlotConfig, BookingFile>;

fn service(store_args: &StoreArgs) -> Result<Service> {
    let config = load_config(&store_args.config)
        .with_context(|| format!("loading config {}", store_args.config.display()))?;
    let bookings = BookingFile::new(store_args.bookings.as_deref());
    Ok(AvailabilityService::new(config, bookings)
        .with_options(config.options)
        .with_policy(config.policy))
}

/// Run the `list` subcommand.
pub fn list(args: ListArgs) -> Result<Outcome> {
    let duration = parse_duration_minutes(&args.duration)?;
    let service = service(&args.store)?;

    let slots = service.available_slot_displays(args.date, duration)?;
    info!(date = %args.date, duration, count = slots.len(), "listed slots");

    if args.json {
        println!("{}", serde_json::to_string_pretty(&slots)?);
    } else {
        for slot in &slots {
            println!("{slot}");
        }
    }
    Ok(Outcome::Done)
}

/// Run the `book` subcommand.
pub fn book(args: BookArgs) -> Result<Outcome> {
    let duration = parse_duration_minutes(&args.duration)?;
    let service = service(&args.store)?;

    let decision = service.request_booking(args.date, &args.slot, duration)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&decision)?);
    } else {
        match &decision {
            BookingDecision::Accepted {
                start,
                end,
                canonical_time,
            } => println!(
                "accepted {} ({canonical_time}) {} .. {}",
                args.slot,
                start.to_rfc3339(),
                end.to_rfc3339()
            ),
            BookingDecision::Conflict { conflict } => {
                println!("conflict: {}", describe(conflict))
            }
        }
    }

    match decision {
        BookingDecision::Accepted { start, end, .. } => {
            if args.commit {
                let bookings = BookingFile::new(args.store.bookings.as_deref());
                bookings.append(BookedInterval::new(start, end)?)?;
                info!(slot = %args.slot, "recorded booking");
            }
            Ok(Outcome::Done)
        }
        BookingDecision::Conflict { .. } => Ok(Outcome::Conflict),
    }
}

/// Run the `convert` subcommand.
pub fn convert(args: ConvertArgs) -> Result<Outcome> {
    let policy = if args.case_insensitive {
        MeridiemPolicy::CaseInsensitive
    } else {
        MeridiemPolicy::Strict
    };
    let canonical = display_to_canonical(args.date, &args.slot, &args.timezone, policy)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&canonical)?);
    } else {
        println!("{} {}", canonical.time_24h, canonical.instant.to_rfc3339());
    }
    Ok(Outcome::Done)
}

fn describe(conflict: &Rejection) -> String {
    match conflict {
        Rejection::OutsideWorkingHours => "outside working hours".to_string(),
        Rejection::OverlapsLunch => "overlaps the lunch closure".to_string(),
        Rejection::OverlapsBooking { start, end } => format!(
            "overlaps booking {} .. {}",
            start.to_rfc3339(),
            end.to_rfc3339()
        ),
    }
}
