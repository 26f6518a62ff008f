//! `slot-check`: prints the bookable slots for a service on a date.
//!
//! ```text
//! slot-check <service> <YYYY-MM-DD> [technician-id|any] [--now YYYY-MM-DDTHH:MM] [--book HH:MM]
//! ```
//!
//! Data comes from the JSON snapshot named by `FIELDBOOK_SNAPSHOT`. With
//! `--book` the slot is committed and the snapshot is written back.

use std::{path::PathBuf, sync::Arc};

use chrono::{Local, NaiveDate, NaiveDateTime};
use color_eyre::eyre::{eyre, Result, WrapErr};
use dotenv::dotenv;
use fieldbook_core::{calendar::TimeSlot, models::booking::TechnicianSelector};
use fieldbook_service::{AvailabilityService, ServiceConfig, SlotQuery};
use fieldbook_store::{load_snapshot, snapshot::save_snapshot, InMemoryStore};
use tracing::info;
use tracing_subscriber::FmtSubscriber;

const USAGE: &str =
    "usage: slot-check <service> <YYYY-MM-DD> [technician-id|any] [--now YYYY-MM-DDTHH:MM] [--book HH:MM]";

struct Args {
    service: String,
    date: NaiveDate,
    technician: TechnicianSelector,
    now: Option<NaiveDateTime>,
    book: Option<TimeSlot>,
}

fn parse_args(mut raw: impl Iterator<Item = String>) -> Result<Args> {
    let mut positional = Vec::new();
    let mut now = None;
    let mut book = None;

    while let Some(arg) = raw.next() {
        match arg.as_str() {
            "--now" => {
                let value = raw.next().ok_or_else(|| eyre!("--now needs a value\n{}", USAGE))?;
                now = Some(
                    NaiveDateTime::parse_from_str(&value, "%Y-%m-%dT%H:%M")
                        .wrap_err_with(|| format!("Invalid --now value: {}", value))?,
                );
            }
            "--book" => {
                let value = raw.next().ok_or_else(|| eyre!("--book needs a slot\n{}", USAGE))?;
                book = Some(TimeSlot::parse(&value)?);
            }
            _ => positional.push(arg),
        }
    }

    let mut positional = positional.into_iter();
    let service = positional.next().ok_or_else(|| eyre!(USAGE))?;
    let date = positional.next().ok_or_else(|| eyre!(USAGE))?;
    let date = NaiveDate::parse_from_str(&date, "%Y-%m-%d")
        .wrap_err_with(|| format!("Invalid date: {}", date))?;
    let technician = match positional.next() {
        Some(value) => value.parse::<TechnicianSelector>()?,
        None => TechnicianSelector::Any,
    };

    Ok(Args {
        service,
        date,
        technician,
        now,
        book,
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    // Load environment variables
    dotenv().ok();

    let config = ServiceConfig::from_env()?;

    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.log_level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = parse_args(std::env::args().skip(1))?;

    let snapshot_path: PathBuf = config
        .snapshot_path
        .clone()
        .ok_or_else(|| eyre!("FIELDBOOK_SNAPSHOT must point at a snapshot file"))?;
    let store = Arc::new(InMemoryStore::from_snapshot(load_snapshot(&snapshot_path)?));
    let service = AvailabilityService::with_store(Arc::clone(&store), &config);

    let now = args.now.unwrap_or_else(|| Local::now().naive_local());
    let query = SlotQuery::new(args.service, args.technician, args.date);

    match args.book {
        Some(slot) => {
            let window = service.book(&query, slot, now).await?;
            save_snapshot(&snapshot_path, &store.snapshot().await)?;
            info!("Snapshot {} updated", snapshot_path.display());
            println!("{}", serde_json::to_string_pretty(&window)?);
        }
        None => {
            let report = service.eligible_slots(&query, now).await?;
            let warnings: Vec<String> = report.warnings.iter().map(ToString::to_string).collect();
            let output = serde_json::json!({
                "service": query.service_name,
                "technician": query.technician.to_string(),
                "date": query.date,
                "slots": report.slots,
                "warnings": warnings,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}
