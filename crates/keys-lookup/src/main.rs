//! Keys Probe
//!
//! Loads a model data directory, reports the model the registry finds,
//! and optionally resolves a single probe location from command-line
//! fields.
//!
//! Usage:
//!   keys-probe --data-dir data/terraquake
//!   keys-probe --country TR --city Istanbul --lat 41.0082 --lon 28.9784

use anyhow::Result;
use clap::Parser;
use keys_lookup::{BatchSummary, LookupRegistry, RawRow};
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(
    name = "keys-probe",
    about = "Validate model reference data and probe single locations"
)]
struct Args {
    /// Model data directory holding the reference CSV files
    #[arg(short, long, default_value = "data/terraquake")]
    data_dir: PathBuf,

    /// Item ID for the probe record
    #[arg(long, default_value_t = 1)]
    item_id: i64,

    /// Country of the probe location
    #[arg(long)]
    country: Option<String>,

    /// City of the probe location
    #[arg(long)]
    city: Option<String>,

    /// Province or state of the probe location
    #[arg(long)]
    state: Option<String>,

    /// Latitude of the probe location
    #[arg(long)]
    lat: Option<f64>,

    /// Longitude of the probe location
    #[arg(long)]
    lon: Option<f64>,

    /// Construction scheme, e.g. RMS
    #[arg(long)]
    bldgscheme: Option<String>,

    /// Building class within the construction scheme
    #[arg(long)]
    bldgclass: Option<String>,

    /// Occupancy scheme, e.g. ATC
    #[arg(long)]
    occscheme: Option<String>,

    /// Occupancy type within the occupancy scheme
    #[arg(long)]
    occtype: Option<i64>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    /// Probe row from the optional location fields; `None` when no field
    /// was given and there is nothing to resolve.
    fn probe_row(&self) -> Option<RawRow> {
        let mut row = RawRow::new().with("item_id", self.item_id.to_string());
        let mut any = false;

        let text_fields = [
            ("country", &self.country),
            ("city", &self.city),
            ("state", &self.state),
            ("bldgscheme", &self.bldgscheme),
            ("bldgclass", &self.bldgclass),
            ("occscheme", &self.occscheme),
        ];
        for (column, value) in text_fields {
            if let Some(value) = value {
                row.set(column, value.clone());
                any = true;
            }
        }
        if let Some(lat) = self.lat {
            row.set("latitude", lat.to_string());
            any = true;
        }
        if let Some(lon) = self.lon {
            row.set("longitude", lon.to_string());
            any = true;
        }
        if let Some(occtype) = self.occtype {
            row.set("occtype", occtype.to_string());
            any = true;
        }

        if any {
            Some(row)
        } else {
            None
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // Build the lookup for whatever model the data directory names
    let registry = LookupRegistry::builtin();
    let lookup = registry.create(&args.data_dir)?;
    let model = lookup.model();
    info!("model: {} {} v{}", model.supplier, model.name, model.version);

    match args.probe_row() {
        Some(row) => {
            let results = lookup.process_locations(&[row]);
            let summary = BatchSummary::tally(1, &results);
            println!("{}", serde_json::to_string_pretty(&results)?);
            info!(
                "probe summary: {} result(s), {} success, {} nomatch, {} fail at {}",
                summary.results, summary.success, summary.nomatch, summary.fail,
                summary.generated_at
            );
        }
        None => {
            info!("no probe fields given; reference data loads cleanly");
        }
    }

    Ok(())
}
