//! travelog: command-line front end for the Travelog journal
//!
//! Each subcommand plays the part of one screen:
//! - `new`: the create form
//! - `list`: records, most recent first
//! - `edit`: the create form seeded from a listed record
//! - `delete`: remove a listed record
//! - `map`: record pins around the current position
//!
//! Indices accepted by `edit` and `delete` are the ones `list` prints.

use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use chrono::{Local, Utc};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};
use travelog_core::config::MapConfig;
use travelog_core::storage::open_file_store;
use travelog_core::{
    Address, EditSession, FixedLocator, FixedPower, GeoPoint, Journal, ListEntry,
    ListView, MapView, PathImageSource, PowerSource, RecordStore, SaveOutcome, SysfsPower,
    TravelogConfig,
};

// ============================================================================
// CLI Definition
// ============================================================================

#[derive(Debug, Parser)]
#[command(name = "travelog", version, about = "Personal travel journal")]
struct Cli {
    /// Config file (TOML). Missing files fall back to defaults.
    #[arg(short, long, env = "TRAVELOG_CONFIG", default_value = "travelog.toml")]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

/// Stand-in for the device location service.
#[derive(Debug, Args, Default)]
struct LocationArgs {
    /// Latitude in degrees
    #[arg(long, requires = "lon", allow_negative_numbers = true, value_parser = finite_degrees)]
    lat: Option<f64>,

    /// Longitude in degrees
    #[arg(long, requires = "lat", allow_negative_numbers = true, value_parser = finite_degrees)]
    lon: Option<f64>,

    /// City name the position reverse-geocodes to
    #[arg(long)]
    city: Option<String>,

    /// Region used when no city is known
    #[arg(long)]
    region: Option<String>,
}

fn finite_degrees(raw: &str) -> Result<f64, String> {
    let value: f64 = raw.parse().map_err(|e| format!("{e}"))?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(format!("{raw} is not a finite number of degrees"))
    }
}

impl LocationArgs {
    fn locator(&self) -> FixedLocator {
        match (self.lat, self.lon) {
            (Some(lat), Some(lon)) => {
                let locator = FixedLocator::new(GeoPoint::new(lat, lon));
                if self.city.is_some() || self.region.is_some() {
                    locator.with_address(Address {
                        city: self.city.clone(),
                        region: self.region.clone(),
                    })
                } else {
                    locator
                }
            }
            _ => FixedLocator::denied(),
        }
    }

    fn is_set(&self) -> bool {
        self.lat.is_some() && self.lon.is_some()
    }
}

/// Stand-in for the gallery and camera pickers.
#[derive(Debug, Args, Default)]
struct ImageArgs {
    /// Image file to attach
    #[arg(long)]
    image: Option<PathBuf>,

    /// Treat the image as a fresh camera capture instead of a gallery pick
    #[arg(long, requires = "image")]
    camera: bool,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Record a new entry
    New {
        /// What you are thinking right now
        #[arg(short, long)]
        thoughts: String,

        #[command(flatten)]
        location: LocationArgs,

        #[command(flatten)]
        image: ImageArgs,

        /// Battery fraction 0.0–1.0; read from the system when omitted
        #[arg(long)]
        battery: Option<f64>,
    },

    /// List entries, most recent first
    List {
        /// Output entries as a JSON array
        #[arg(long)]
        json: bool,
    },

    /// Edit a listed entry
    Edit {
        /// Index shown by `list`
        index: usize,

        /// Replacement thoughts
        #[arg(short, long)]
        thoughts: Option<String>,

        #[command(flatten)]
        location: LocationArgs,

        #[command(flatten)]
        image: ImageArgs,
    },

    /// Delete a listed entry
    Delete {
        /// Index shown by `list`
        index: usize,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Show record pins and the region around the current position
    Map {
        #[command(flatten)]
        location: LocationArgs,

        /// Output the map view as JSON
        #[arg(long)]
        json: bool,
    },
}

// ============================================================================
// Rendering
// ============================================================================

/// Human-readable block for one list row.
fn format_entry(entry: &ListEntry) -> String {
    let r = &entry.record;
    let city = if r.city.is_empty() { "(unknown place)" } else { r.city.as_str() };
    format!(
        "[{}] {}\n    Longitude: {:.4} Latitude: {:.4}\n    {}\n    Battery: {}%  {}",
        entry.display_index,
        city,
        r.longitude,
        r.latitude,
        r.thoughts,
        r.battery_level,
        r.timestamp.with_timezone(&Local).format("%Y-%m-%d %H:%M"),
    )
}

fn format_list(view: &ListView) -> String {
    if view.is_empty() {
        return "No records yet. Create one with `travelog new`.".to_string();
    }
    view.entries()
        .iter()
        .map(format_entry)
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn format_map(view: &MapView, config: &MapConfig) -> String {
    let mut lines = Vec::new();
    match view.initial_region(config) {
        Some(region) => lines.push(format!(
            "Current location: {:.4}, {:.4} (span {} x {})",
            region.latitude, region.longitude, region.latitude_delta, region.longitude_delta
        )),
        None => lines.push("Current location: unavailable".to_string()),
    }
    for pin in &view.record_pins {
        let label = if pin.label.is_empty() { "-" } else { pin.label.as_str() };
        lines.push(format!(
            "  {:>9.4} {:>10.4}  {}  {}",
            pin.latitude, pin.longitude, label, pin.image
        ));
    }
    lines.join("\n")
}

// ============================================================================
// Commands
// ============================================================================

fn power_source(battery: Option<f64>, config: &TravelogConfig) -> Box<dyn PowerSource> {
    match battery {
        Some(level) => Box::new(FixedPower(level)),
        None => Box::new(SysfsPower::new(config.device.battery_fallback)),
    }
}

async fn attach_image(session: &mut EditSession, args: &ImageArgs) -> anyhow::Result<()> {
    let source = PathImageSource::new(args.image.clone());
    if args.camera {
        session.take_photo(&source).await?;
    } else {
        session.pick_image(&source).await?;
    }
    Ok(())
}

async fn do_new(
    journal: &Journal,
    config: &TravelogConfig,
    thoughts: String,
    location: &LocationArgs,
    image: &ImageArgs,
    battery: Option<f64>,
) -> anyhow::Result<()> {
    let mut session = EditSession::new();
    session.set_thoughts(thoughts);
    session
        .capture_location(&location.locator())
        .await
        .context("location is required (pass --lat and --lon)")?;
    attach_image(&mut session, image)
        .await
        .context("an image is required (pass --image)")?;

    let power = power_source(battery, config);
    match session.save(journal, Some(power.as_ref()), Utc::now()).await {
        Ok(outcome) => {
            println!("Record saved ({})", outcome.record().id);
            Ok(())
        }
        Err(failure) => Err(anyhow::anyhow!("Failed to save record: {}", failure.error)),
    }
}

async fn do_list(journal: &Journal, json: bool) -> anyhow::Result<()> {
    let view = journal.list().await;
    if json {
        println!("{}", serde_json::to_string_pretty(view.entries())?);
    } else {
        println!("{}", format_list(&view));
    }
    Ok(())
}

async fn do_edit(
    journal: &Journal,
    index: usize,
    thoughts: Option<String>,
    location: &LocationArgs,
    image: &ImageArgs,
) -> anyhow::Result<()> {
    let view = journal.list().await;
    let mut session = view.edit_session(index)?;
    let seeded = session.draft().clone();

    if let Some(thoughts) = thoughts {
        session.set_thoughts(thoughts);
    }
    if location.is_set() {
        session.capture_location(&location.locator()).await?;
    }
    if image.image.is_some() {
        attach_image(&mut session, image).await?;
    }

    if session.draft() == &seeded {
        session.discard();
        println!("Nothing to change");
        return Ok(());
    }

    // battery is never re-read for an edit
    match session.save(journal, None, Utc::now()).await {
        Ok(SaveOutcome::Updated(record)) | Ok(SaveOutcome::Created(record)) => {
            println!("Record updated ({})", record.id);
            Ok(())
        }
        Err(failure) => Err(anyhow::anyhow!("Failed to update record: {}", failure.error)),
    }
}

fn confirm(prompt: &str) -> anyhow::Result<bool> {
    print!("{prompt} [y/N] ");
    std::io::stdout().flush()?;
    let mut answer = String::new();
    std::io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}

async fn do_delete(journal: &Journal, index: usize, yes: bool) -> anyhow::Result<()> {
    let view = journal.list().await;
    let entry = view.get(index)?;
    let seen = entry.record.id;

    if !yes {
        println!("{}", format_entry(entry));
        if !confirm("Are you sure you want to delete this record?")? {
            println!("Cancelled");
            return Ok(());
        }
    }

    let removed = journal.delete_listed(index, seen).await?;
    println!("Record deleted ({})", removed.id);
    Ok(())
}

async fn do_map(
    journal: &Journal,
    config: &TravelogConfig,
    location: &LocationArgs,
    json: bool,
) -> anyhow::Result<()> {
    let view = journal.map(&location.locator()).await;
    if json {
        let body = serde_json::json!({
            "region": view.initial_region(&config.map),
            "user_pin": view.user_pin,
            "record_pins": view.record_pins,
        });
        println!("{}", serde_json::to_string_pretty(&body)?);
    } else {
        println!("{}", format_map(&view, &config.map));
    }
    Ok(())
}

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = match TravelogConfig::load(&cli.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("travelog: failed to load config from {}: {}", cli.config, e);
            std::process::exit(1);
        }
    };

    // RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.service.log_level));
    fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    let backend = Arc::new(open_file_store(&config.storage));
    tracing::debug!("Using data directory {}", backend.root().display());
    let journal = Journal::new(RecordStore::new(backend, config.storage.slot.clone()));

    let result = match cli.command {
        Commands::New {
            thoughts,
            location,
            image,
            battery,
        } => do_new(&journal, &config, thoughts, &location, &image, battery).await,
        Commands::List { json } => do_list(&journal, json).await,
        Commands::Edit {
            index,
            thoughts,
            location,
            image,
        } => do_edit(&journal, index, thoughts, &location, &image).await,
        Commands::Delete { index, yes } => do_delete(&journal, index, yes).await,
        Commands::Map { location, json } => do_map(&journal, &config, &location, json).await,
    };

    if let Err(e) = result {
        eprintln!("travelog: {:#}", e);
        std::process::exit(1);
    }
}

// ============================================================================
// Tests
// ============================================================================
