//! Reference Data for Catastrophe Model Keys Resolution
//!
//! Loads the static tables the keys lookup needs and holds them in memory
//! for the lifetime of the process. All tables come from CSV files in a
//! single model data directory:
//!
//! | Table | File | Presence |
//! |-------|------|----------|
//! | Area zones | `DictAreaPeril.csv` | required |
//! | Vulnerability IDs | `DictVULNERABILITY.csv` | required |
//! | Model identity | `ModelVersion.csv` | required |
//! | Place-name mappings | `LocationMapping_AREA_LEVEL_{1,2,5}.csv` | optional |
//! | Occupancy schemes | `{ATC,SIC,IFM,RMS IND} OCCUPANCY SCHEME.csv` | optional |
//! | Construction schemes | `{ATC,ISO EQ,RMS} CONSTRUCTION CLASS.csv` | optional |
//!
//! Everything is loaded once by [`ReferenceData::load`] and is immutable
//! afterwards; resolvers borrow the tables and never mutate them. A failed
//! load is fatal to startup and reported as [`DataLoadError`] with the file
//! and line that broke.
//!
//! Name and code matching downstream is case-insensitive: the loaders
//! upper-case every name and code column on the way in, and the lookup
//! methods upper-case their probes.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub mod loader;
pub mod mappings;
pub mod parse;
pub mod vulnerability;
pub mod zones;

pub use mappings::{
    ConstructionClass, ConstructionMap, ConstructionScheme, LocationNameMap, OccupancyClass,
    OccupancyMap, OccupancyScheme,
};
pub use vulnerability::VulnerabilityTable;
pub use zones::{AggregationLevel, AreaZone};

#[derive(Error, Debug)]
pub enum DataLoadError {
    #[error("missing reference file: {}", .0.display())]
    MissingFile(PathBuf),
    #[error("CSV error in {}: {source}", .file.display())]
    Csv {
        file: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("{}:{line}: {reason}", .file.display())]
    Malformed {
        file: PathBuf,
        line: u64,
        reason: String,
    },
}

pub type Result<T> = std::result::Result<T, DataLoadError>;

/// Supplier, model name and version as shipped in `ModelVersion.csv`.
///
/// The model name is what a lookup registry dispatches on; supplier and
/// version are informational.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub supplier: String,
    pub name: String,
    pub version: String,
}

/// Every table a lookup needs, loaded once at startup.
#[derive(Debug, Clone)]
pub struct ReferenceData {
    pub model: ModelInfo,
    pub zones: Vec<AreaZone>,
    pub vulnerabilities: VulnerabilityTable,
    pub location_names: LocationNameMap,
    pub occupancy: OccupancyMap,
    pub construction: ConstructionMap,
}

impl ReferenceData {
    /// Load all reference tables from the model data directory.
    pub fn load(dir: impl AsRef<Path>) -> Result<Self> {
        loader::load_reference_data(dir.as_ref())
    }
}
