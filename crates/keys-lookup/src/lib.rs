//! Keys Lookup for the Quake Model
//!
//! Resolves insured-location records to the pair of identifiers the
//! catastrophe model keys everything on: an area-peril ID (where the risk
//! sits) and a vulnerability ID (how the insured object responds), for
//! the earthquake peril. Each input row yields one result per coverage
//! type, buildings before contents, in input order.
//!
//! # Resolution Pipeline
//!
//! ```text
//! RawRow --normalize--> LocationRecord
//!     LocationRecord --resolve_area_peril-------> area-peril ID + diagnostics
//!     LocationRecord --resolve_vulnerability----> vulnerability ID per coverage
//!     QuakeKeysLookup --process_locations-------> two ExposureResults per row
//! ```
//!
//! # Area-Peril Fallback Tiers
//!
//! | Tier | Zones       | Match rule                                          |
//! |------|-------------|-----------------------------------------------------|
//! | 1    | VRG         | nearest zone by great-circle distance, under 15 km  |
//! | 2    | AREALEVEL_5 | exact city name                                     |
//! | 3    | AREALEVEL_2 | exact province name                                 |
//! | 4    | AREALEVEL_1 | exact country name                                  |
//!
//! Tiers 1 to 3 additionally require the matched zone to sit in the
//! record's country. The first matching tier wins; diagnostics from every
//! attempted tier accumulate in the result message so a consumer can see
//! how far the fallback had to go.

pub mod areaperil;
pub mod lookup;
pub mod record;
pub mod registry;
pub mod vulnerability;

pub use lookup::{QuakeKeysLookup, QUAKE_MODEL_NAME};
pub use record::{normalize, LocationRecord, RawRow, RecordParseError};
pub use registry::{KeysLookup, LookupFactory, LookupRegistry};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Sentinel for identifiers that could not be resolved.
pub const UNKNOWN_ID: i64 = -1;

/// Oasis peril ID for earthquake.
pub const QUAKE_PERIL_ID: i64 = 3;

/// A VRG zone only matches when the record's coordinates fall within this
/// distance of the zone centroid.
pub const VRG_MATCH_RADIUS_KM: f64 = 15.0;

/// Spherical earth radius in km used for the VRG distance test.
pub const EARTH_RADIUS_KM: f64 = 6378.137;

/// Errors building a keys lookup.
#[derive(Error, Debug)]
pub enum LookupError {
    #[error("no lookup registered for model '{0}'")]
    UnknownModel(String),

    #[error(transparent)]
    Data(#[from] keys_data::DataLoadError),
}

pub type Result<T> = std::result::Result<T, LookupError>;

/// The two coverage types resolved for every record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "i64", try_from = "i64")]
pub enum CoverageType {
    Building,
    Contents,
}

impl CoverageType {
    /// Both coverage types, in resolution order.
    pub const ALL: [CoverageType; 2] = [CoverageType::Building, CoverageType::Contents];

    /// Numeric coverage code used on the wire.
    pub fn oasis_code(&self) -> i64 {
        match self {
            CoverageType::Building => 1,
            CoverageType::Contents => 3,
        }
    }

    /// Single-letter token carried inside vulnerability composite codes.
    pub fn key_code(&self) -> &'static str {
        match self {
            CoverageType::Building => "B",
            CoverageType::Contents => "C",
        }
    }
}

impl From<CoverageType> for i64 {
    fn from(coverage: CoverageType) -> Self {
        coverage.oasis_code()
    }
}

impl TryFrom<i64> for CoverageType {
    type Error = String;

    fn try_from(code: i64) -> std::result::Result<Self, Self::Error> {
        match code {
            1 => Ok(CoverageType::Building),
            3 => Ok(CoverageType::Contents),
            other => Err(format!("unknown coverage code {other}")),
        }
    }
}

/// Outcome classification for one exposure result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LookupStatus {
    Success,
    NoMatch,
    Fail,
}

impl LookupStatus {
    /// Success unless either ID is unresolved.
    pub fn from_ids(area_peril_id: i64, vulnerability_id: i64) -> Self {
        if area_peril_id == UNKNOWN_ID || vulnerability_id == UNKNOWN_ID {
            LookupStatus::NoMatch
        } else {
            LookupStatus::Success
        }
    }
}

/// One resolution outcome for a record and coverage type.
///
/// Serializes to exactly the seven keys downstream consumers rely on;
/// `coverage` carries the numeric coverage code, `status` the lower-case
/// status word.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExposureResult {
    pub id: i64,
    pub peril_id: i64,
    #[serde(rename = "coverage")]
    pub coverage_type: CoverageType,
    pub area_peril_id: i64,
    pub vulnerability_id: i64,
    pub status: LookupStatus,
    pub message: String,
}

impl ExposureResult {
    /// Result for a record that went through both resolution stages.
    pub fn resolved(
        id: i64,
        coverage_type: CoverageType,
        area_peril_id: i64,
        vulnerability_id: i64,
        message: String,
    ) -> Self {
        Self {
            id,
            peril_id: QUAKE_PERIL_ID,
            coverage_type,
            area_peril_id,
            vulnerability_id,
            status: LookupStatus::from_ids(area_peril_id, vulnerability_id),
            message,
        }
    }

    /// Result for a row that could not even be parsed.
    pub fn failed(id: i64, message: String) -> Self {
        Self {
            id,
            peril_id: QUAKE_PERIL_ID,
            coverage_type: CoverageType::Building,
            area_peril_id: UNKNOWN_ID,
            vulnerability_id: UNKNOWN_ID,
            status: LookupStatus::Fail,
            message,
        }
    }
}

/// Tallies for one processed batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchSummary {
    pub rows: usize,
    pub results: usize,
    pub success: usize,
    pub nomatch: usize,
    pub fail: usize,
    pub generated_at: String,
}

impl BatchSummary {
    pub fn tally(rows: usize, results: &[ExposureResult]) -> Self {
        let mut summary = Self {
            rows,
            results: results.len(),
            success: 0,
            nomatch: 0,
            fail: 0,
            generated_at: chrono::Utc::now().to_rfc3339(),
        };
        for result in results {
            match result.status {
                LookupStatus::Success => summary.success += 1,
                LookupStatus::NoMatch => summary.nomatch += 1,
                LookupStatus::Fail => summary.fail += 1,
            }
        }
        summary
    }
}

/// Great-circle distance in km between two lat/lon points on a spherical
/// earth of radius [`EARTH_RADIUS_KM`]: the chord between the surface
/// points, converted back to arc length.
pub fn great_circle_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let (phi1, theta1) = (lat1.to_radians(), lon1.to_radians());
    let (phi2, theta2) = (lat2.to_radians(), lon2.to_radians());

    let x1 = EARTH_RADIUS_KM * phi1.cos() * theta1.cos();
    let y1 = EARTH_RADIUS_KM * phi1.cos() * theta1.sin();
    let z1 = EARTH_RADIUS_KM * phi1.sin();
    let x2 = EARTH_RADIUS_KM * phi2.cos() * theta2.cos();
    let y2 = EARTH_RADIUS_KM * phi2.cos() * theta2.sin();
    let z2 = EARTH_RADIUS_KM * phi2.sin();

    let chord = ((x1 - x2).powi(2) + (y1 - y2).powi(2) + (z1 - z2).powi(2)).sqrt();
    2.0 * (chord / (2.0 * EARTH_RADIUS_KM)).asin() * EARTH_RADIUS_KM
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_great_circle_distance() {
        // Paris to London is roughly 344 km centre to centre.
        let dist = great_circle_km(48.8566, 2.3522, 51.5074, -0.1278);
        assert!((dist - 344.0).abs() < 5.0, "got {dist}");

        let dist = great_circle_km(41.0, 29.0, 41.0, 29.0);
        assert!(dist.abs() < 1e-9);
    }

    #[test]
    fn test_small_offsets_stay_inside_vrg_radius() {
        let dist = great_circle_km(50.0, 10.0, 50.001, 10.001);
        assert!(dist > 0.0);
        assert!(dist < 1.0);
    }

    #[test]
    fn test_coverage_codes() {
        assert_eq!(CoverageType::Building.oasis_code(), 1);
        assert_eq!(CoverageType::Contents.oasis_code(), 3);
        assert_eq!(CoverageType::Building.key_code(), "B");
        assert_eq!(CoverageType::Contents.key_code(), "C");
        assert_eq!(CoverageType::try_from(3).unwrap(), CoverageType::Contents);
        assert!(CoverageType::try_from(2).is_err());
    }

    #[test]
    fn test_status_wire_names() {
        assert_eq!(
            serde_json::to_value(LookupStatus::Success).unwrap(),
            json!("success")
        );
        assert_eq!(
            serde_json::to_value(LookupStatus::NoMatch).unwrap(),
            json!("nomatch")
        );
        assert_eq!(
            serde_json::to_value(LookupStatus::Fail).unwrap(),
            json!("fail")
        );
    }

    #[test]
    fn test_status_from_ids() {
        assert_eq!(LookupStatus::from_ids(10, 20), LookupStatus::Success);
        assert_eq!(LookupStatus::from_ids(UNKNOWN_ID, 20), LookupStatus::NoMatch);
        assert_eq!(LookupStatus::from_ids(10, UNKNOWN_ID), LookupStatus::NoMatch);
    }

    #[test]
    fn test_exposure_result_wire_contract() {
        let result = ExposureResult::resolved(
            17,
            CoverageType::Contents,
            102,
            9,
            "Mapped by Lon/Lat! areaperil_id 102 at 0.132 km.".to_string(),
        );
        let value = serde_json::to_value(&result).unwrap();
        let object = value.as_object().unwrap();

        let mut keys: Vec<&str> = object.keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(
            keys,
            [
                "area_peril_id",
                "coverage",
                "id",
                "message",
                "peril_id",
                "status",
                "vulnerability_id"
            ]
        );
        assert_eq!(object["coverage"], json!(3));
        assert_eq!(object["peril_id"], json!(3));
        assert_eq!(object["status"], json!("success"));
        assert_eq!(object["id"], json!(17));
    }

    #[test]
    fn test_exposure_result_round_trips() {
        let result = ExposureResult::failed(-1, "missing required field 'item_id'".to_string());
        let text = serde_json::to_string(&result).unwrap();
        let back: ExposureResult = serde_json::from_str(&text).unwrap();
        assert_eq!(back, result);
        assert_eq!(back.status, LookupStatus::Fail);
    }

    #[test]
    fn test_batch_summary_tally() {
        let results = vec![
            ExposureResult::resolved(1, CoverageType::Building, 102, 9, String::new()),
            ExposureResult::resolved(1, CoverageType::Contents, 102, UNKNOWN_ID, String::new()),
            ExposureResult::failed(UNKNOWN_ID, "missing required field 'item_id'".to_string()),
        ];
        let summary = BatchSummary::tally(2, &results);
        assert_eq!(summary.rows, 2);
        assert_eq!(summary.results, 3);
        assert_eq!(summary.success, 1);
        assert_eq!(summary.nomatch, 1);
        assert_eq!(summary.fail, 1);
        assert!(!summary.generated_at.is_empty());
    }
}
