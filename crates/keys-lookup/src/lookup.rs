//! Batch orchestration: normalize each row once, resolve the area peril
//! once, then emit one result per coverage type.

use crate::areaperil::resolve_area_peril;
use crate::record::{normalize, RawRow};
use crate::registry::KeysLookup;
use crate::vulnerability::resolve_vulnerability;
use crate::{CoverageType, ExposureResult, Result, UNKNOWN_ID};
use keys_data::{ModelInfo, ReferenceData};
use std::path::Path;
use tracing::{debug, info, warn};

/// Model name the built-in quake lookup registers under.
pub const QUAKE_MODEL_NAME: &str = "TERRAQUAKE";

/// The built-in earthquake keys lookup over an owned set of reference
/// tables.
pub struct QuakeKeysLookup {
    data: ReferenceData,
}

impl QuakeKeysLookup {
    pub fn new(data: ReferenceData) -> Self {
        Self { data }
    }

    /// Load the reference tables from `dir` and build the lookup.
    pub fn from_dir(dir: impl AsRef<Path>) -> Result<Self> {
        let data = ReferenceData::load(dir)?;
        Ok(Self::new(data))
    }

    pub fn reference_data(&self) -> &ReferenceData {
        &self.data
    }

    /// Resolve one row into its results. A row that fails to parse emits
    /// a single fail result instead of one per coverage type.
    fn process_row(&self, row: &RawRow, results: &mut Vec<ExposureResult>) {
        let mut record = match normalize(row, &self.data.location_names) {
            Ok(record) => record,
            Err(err) => {
                warn!("row failed to parse: {err}");
                results.push(ExposureResult::failed(salvage_item_id(row), err.to_string()));
                return;
            }
        };

        // The area peril does not depend on coverage; resolve it once.
        let (area_peril_id, area_message) = resolve_area_peril(&record, &self.data.zones);

        for coverage in CoverageType::ALL {
            record.coverage_type = Some(coverage);
            let (vulnerability_id, vulnerability_message) = resolve_vulnerability(
                &record,
                coverage,
                &self.data.vulnerabilities,
                &self.data.occupancy,
                &self.data.construction,
            );
            debug!(
                "item {} coverage {:?}: areaperil {} vulnerability {}",
                record.item_id, coverage, area_peril_id, vulnerability_id
            );
            results.push(ExposureResult::resolved(
                record.item_id,
                coverage,
                area_peril_id,
                vulnerability_id,
                join_messages(&area_message, &vulnerability_message),
            ));
        }
    }
}

impl KeysLookup for QuakeKeysLookup {
    fn model(&self) -> &ModelInfo {
        &self.data.model
    }

    fn process_locations(&self, rows: &[RawRow]) -> Vec<ExposureResult> {
        let mut results = Vec::with_capacity(rows.len() * 2);
        for row in rows {
            self.process_row(row, &mut results);
        }
        info!("processed {} rows into {} results", rows.len(), results.len());
        results
    }
}

/// Best-effort item ID for a row that failed to parse.
fn salvage_item_id(row: &RawRow) -> i64 {
    row.get("item_id")
        .and_then(|raw| raw.parse().ok())
        .unwrap_or(UNKNOWN_ID)
}

fn join_messages(first: &str, second: &str) -> String {
    match (first.is_empty(), second.is_empty()) {
        (true, _) => second.to_string(),
        (_, true) => first.to_string(),
        _ => format!("{first} {second}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LookupStatus;
    use keys_data::{
        AggregationLevel, AreaZone, ConstructionMap, LocationNameMap, OccupancyMap,
        VulnerabilityTable,
    };

    fn country_zone(id: i64, country: &str) -> AreaZone {
        AreaZone {
            areaperil_id: id,
            area_id: id,
            longitude: None,
            latitude: None,
            population: None,
            admin_level_0: String::new(),
            admin_level_1: country.to_string(),
            admin_level_2: String::new(),
            admin_level_3: String::new(),
            admin_level_4: String::new(),
            admin_level_5: String::new(),
            aggregation_level: AggregationLevel::Level1,
        }
    }

    fn test_lookup() -> QuakeKeysLookup {
        let mut vulnerabilities = VulnerabilityTable::new();
        vulnerabilities.insert("TR-EQ-C-B-XXX-XX-MQU", 9);
        vulnerabilities.insert("TR-EQ-C-C-XXX-XX-MQU", 10);

        QuakeKeysLookup::new(ReferenceData {
            model: ModelInfo {
                supplier: "Meridian Risk".to_string(),
                name: QUAKE_MODEL_NAME.to_string(),
                version: "0.0.0.1".to_string(),
            },
            zones: vec![country_zone(401, "TR")],
            vulnerabilities,
            location_names: LocationNameMap::new(),
            occupancy: OccupancyMap::new(),
            construction: ConstructionMap::new(),
        })
    }

    fn row(item_id: &str) -> RawRow {
        RawRow::new().with("item_id", item_id).with("country", "TR")
    }

    #[test]
    fn test_two_results_per_row_in_fixed_order() {
        let lookup = test_lookup();
        assert_eq!(lookup.reference_data().model.name, QUAKE_MODEL_NAME);

        let results = lookup.process_locations(&[row("1")]);

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].coverage_type, CoverageType::Building);
        assert_eq!(results[1].coverage_type, CoverageType::Contents);
        assert_eq!(results[0].status, LookupStatus::Success);
        assert_eq!(results[0].area_peril_id, 401);
        assert_eq!(results[1].area_peril_id, 401);
        assert_eq!(results[0].vulnerability_id, 9);
        assert_eq!(results[1].vulnerability_id, 10);
    }

    #[test]
    fn test_parse_failure_yields_single_fail_result() {
        let lookup = test_lookup();
        let rows = vec![
            row("1"),
            RawRow::new().with("country", "TR"),
            row("3"),
        ];
        let results = lookup.process_locations(&rows);

        assert_eq!(results.len(), 5);
        assert_eq!(
            results.iter().map(|r| r.id).collect::<Vec<_>>(),
            vec![1, 1, UNKNOWN_ID, 3, 3]
        );
        assert_eq!(results[2].status, LookupStatus::Fail);
        assert_eq!(results[2].area_peril_id, UNKNOWN_ID);
        assert_eq!(results[2].vulnerability_id, UNKNOWN_ID);
        assert!(results[2].message.contains("item_id"), "got: {}", results[2].message);
        assert_eq!(results[4].status, LookupStatus::Success);
    }

    #[test]
    fn test_fail_salvages_parseable_item_id() {
        let lookup = test_lookup();
        let results = lookup.process_locations(&[row("7").with("latitude", "not-a-number")]);

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, 7);
        assert_eq!(results[0].status, LookupStatus::Fail);
        assert!(results[0].message.contains("latitude"), "got: {}", results[0].message);
    }

    #[test]
    fn test_nomatch_when_vulnerability_unresolved() {
        let lookup = test_lookup();
        let results = lookup.process_locations(&[row("1")
            .with("occscheme", "ATC")
            .with("occtype", "99")]);

        assert_eq!(results[0].status, LookupStatus::NoMatch);
        assert_eq!(results[0].area_peril_id, 401);
        assert_eq!(results[0].vulnerability_id, UNKNOWN_ID);
        assert!(
            results[0].message.contains("no vulnerability id"),
            "got: {}",
            results[0].message
        );
    }

    #[test]
    fn test_messages_concatenate_area_and_vulnerability() {
        let lookup = test_lookup();
        let results = lookup.process_locations(&[row("1")
            .with("occscheme", "SIC")
            .with("occtype", "42")]);

        assert!(
            results[0].message.contains("Mapped by country name"),
            "got: {}",
            results[0].message
        );
        assert!(
            results[0].message.contains("no vulnerability id"),
            "got: {}",
            results[0].message
        );
    }

    #[test]
    fn test_batch_is_repeatable_and_order_preserving() {
        let lookup = test_lookup();
        let rows = vec![row("5"), row("2"), row("8")];

        let first = lookup.process_locations(&rows);
        let second = lookup.process_locations(&rows);
        assert_eq!(first, second);
        assert_eq!(
            first.iter().map(|r| r.id).collect::<Vec<_>>(),
            vec![5, 5, 2, 2, 8, 8]
        );
    }
}
