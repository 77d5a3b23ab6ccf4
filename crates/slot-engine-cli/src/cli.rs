use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

/// Appointment slot availability.
#[derive(Parser)]
#[command(
    name = "slots",
    version,
    about = "List bookable appointment slots and check bookings"
)]
pub struct Cli {
    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands.
#[derive(Subcommand)]
pub enum Command {
    /// List the open slots of a date.
    List(ListArgs),
    /// Check a displayed slot against current bookings, optionally recording it.
    Book(BookArgs),
    /// Convert a displayed slot to its 24-hour form and UTC instant.
    Convert(ConvertArgs),
}

/// Configuration and booking store shared by `list` and `book`.
#[derive(clap::Args)]
pub struct StoreArgs {
    /// Path to TOML configuration file.
    #[arg(short, long, default_value = "slots.toml")]
    pub config: PathBuf,

    /// Path to JSON file of existing bookings (`[{"start": ..., "end": ...}]`).
    #[arg(short, long)]
    pub bookings: Option<PathBuf>,
}

/// Arguments for the `list` subcommand.
#[derive(clap::Args)]
pub struct ListArgs {
    #[command(flatten)]
    pub store: StoreArgs,

    /// Calendar date (YYYY-MM-DD) in the business timezone.
    #[arg(short, long)]
    pub date: NaiveDate,

    /// Appointment length in minutes.
    #[arg(long, allow_hyphen_values = true)]
    pub duration: String,

    /// Print a JSON array instead of one slot per line.
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `book` subcommand.
#[derive(clap::Args)]
pub struct BookArgs {
    #[command(flatten)]
    pub store: StoreArgs,

    /// Calendar date (YYYY-MM-DD) in the business timezone.
    #[arg(short, long)]
    pub date: NaiveDate,

    /// Slot as displayed, e.g. "2:15 PM".
    #[arg(short, long)]
    pub slot: String,

    /// Appointment length in minutes.
    #[arg(long, allow_hyphen_values = true)]
    pub duration: String,

    /// Append the accepted booking to the bookings file.
    #[arg(long, requires = "bookings")]
    pub commit: bool,

    /// Print the decision as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `convert` subcommand.
#[derive(clap::Args)]
pub struct ConvertArgs {
    /// Calendar date (YYYY-MM-DD).
    #[arg(short, long)]
    pub date: NaiveDate,

    /// Slot as displayed, e.g. "2:15 PM".
    #[arg(short, long)]
    pub slot: String,

    /// IANA timezone name.
    #[arg(short, long)]
    pub timezone: String,

    /// Also accept lowercase "am"/"pm".
    #[arg(long)]
    pub case_insensitive: bool,

    /// Print the result as JSON.
    #[arg(long)]
    pub json: bool,
}
