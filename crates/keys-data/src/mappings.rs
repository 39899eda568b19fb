//! Classification and name mappings: occupancy schemes, construction
//! schemes and place-name canonicalization.

use crate::zones::AggregationLevel;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Occupancy classification schemes understood by the lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OccupancyScheme {
    Atc,
    Sic,
    Ifm,
    RmsInd,
}

impl OccupancyScheme {
    pub const ALL: [OccupancyScheme; 4] = [
        OccupancyScheme::Atc,
        OccupancyScheme::Sic,
        OccupancyScheme::Ifm,
        OccupancyScheme::RmsInd,
    ];

    /// Scheme name as it appears in record fields and file names.
    pub fn name(&self) -> &'static str {
        match self {
            OccupancyScheme::Atc => "ATC",
            OccupancyScheme::Sic => "SIC",
            OccupancyScheme::Ifm => "IFM",
            OccupancyScheme::RmsInd => "RMS IND",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|scheme| scheme.name().eq_ignore_ascii_case(name))
    }
}

/// Construction classification schemes understood by the lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConstructionScheme {
    Atc,
    IsoEq,
    Rms,
}

impl ConstructionScheme {
    pub const ALL: [ConstructionScheme; 3] = [
        ConstructionScheme::Atc,
        ConstructionScheme::IsoEq,
        ConstructionScheme::Rms,
    ];

    /// Scheme name as it appears in record fields and file names.
    pub fn name(&self) -> &'static str {
        match self {
            ConstructionScheme::Atc => "ATC",
            ConstructionScheme::IsoEq => "ISO EQ",
            ConstructionScheme::Rms => "RMS",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|scheme| scheme.name().eq_ignore_ascii_case(name))
    }
}

/// Risk and quality codes for one occupancy type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OccupancyClass {
    pub risk_code: String,
    pub quality_code: String,
}

/// Per-scheme occupancy tables keyed by numeric occupancy type.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OccupancyMap {
    tables: HashMap<OccupancyScheme, HashMap<i64, OccupancyClass>>,
}

impl OccupancyMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a class. The first occurrence of a duplicate type wins.
    pub fn insert(&mut self, scheme: OccupancyScheme, occupancy_type: i64, class: OccupancyClass) {
        self.tables
            .entry(scheme)
            .or_default()
            .entry(occupancy_type)
            .or_insert(class);
    }

    pub fn class_for(&self, scheme: OccupancyScheme, occupancy_type: i64) -> Option<&OccupancyClass> {
        self.tables.get(&scheme)?.get(&occupancy_type)
    }

    pub fn scheme_len(&self, scheme: OccupancyScheme) -> usize {
        self.tables.get(&scheme).map_or(0, HashMap::len)
    }
}

/// Structural fields and quality code for one building class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstructionClass {
    pub structural_type: String,
    pub structural_height: String,
    pub quality_code: String,
}

/// Per-scheme construction tables keyed by building class.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConstructionMap {
    tables: HashMap<ConstructionScheme, HashMap<String, ConstructionClass>>,
}

impl ConstructionMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a class. The first occurrence of a duplicate wins.
    pub fn insert(&mut self, scheme: ConstructionScheme, class_key: &str, class: ConstructionClass) {
        self.tables
            .entry(scheme)
            .or_default()
            .entry(class_key.trim().to_uppercase())
            .or_insert(class);
    }

    pub fn class_for(&self, scheme: ConstructionScheme, building_class: &str) -> Option<&ConstructionClass> {
        self.tables
            .get(&scheme)?
            .get(&building_class.trim().to_uppercase())
    }

    pub fn scheme_len(&self, scheme: ConstructionScheme) -> usize {
        self.tables.get(&scheme).map_or(0, HashMap::len)
    }
}

/// Place-name canonicalization for admin levels 1 (country), 2 (province)
/// and 5 (city). Keys are upper-cased name variants, values the canonical
/// name the normalizer substitutes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LocationNameMap {
    tables: HashMap<AggregationLevel, HashMap<String, String>>,
}

impl LocationNameMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a name variant. The first mapping for a variant wins.
    pub fn insert(&mut self, level: AggregationLevel, variant: &str, canonical: &str) {
        self.tables
            .entry(level)
            .or_default()
            .entry(variant.trim().to_uppercase())
            .or_insert_with(|| canonical.trim().to_uppercase());
    }

    /// Canonical name for `raw` at `level`, if a variant matches.
    pub fn canonical(&self, level: AggregationLevel, raw: &str) -> Option<&str> {
        self.tables
            .get(&level)?
            .get(&raw.trim().to_uppercase())
            .map(String::as_str)
    }

    pub fn level_len(&self, level: AggregationLevel) -> usize {
        self.tables.get(&level).map_or(0, HashMap::len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scheme_names() {
        assert_eq!(OccupancyScheme::from_name("ATC"), Some(OccupancyScheme::Atc));
        assert_eq!(OccupancyScheme::from_name("rms ind"), Some(OccupancyScheme::RmsInd));
        assert_eq!(OccupancyScheme::from_name("RMS"), None);
        assert_eq!(ConstructionScheme::from_name("ISO EQ"), Some(ConstructionScheme::IsoEq));
        assert_eq!(ConstructionScheme::from_name(" rms "), Some(ConstructionScheme::Rms));
        assert_eq!(ConstructionScheme::from_name("IFM"), None);
    }

    #[test]
    fn test_occupancy_lookup() {
        let mut map = OccupancyMap::new();
        map.insert(
            OccupancyScheme::Atc,
            11,
            OccupancyClass {
                risk_code: "IND".to_string(),
                quality_code: "HQU".to_string(),
            },
        );

        let class = map.class_for(OccupancyScheme::Atc, 11).unwrap();
        assert_eq!(class.risk_code, "IND");
        assert!(map.class_for(OccupancyScheme::Atc, 12).is_none());
        assert!(map.class_for(OccupancyScheme::Sic, 11).is_none());
    }

    #[test]
    fn test_construction_lookup_is_case_insensitive() {
        let mut map = ConstructionMap::new();
        map.insert(
            ConstructionScheme::Rms,
            "4b",
            ConstructionClass {
                structural_type: "RC".to_string(),
                structural_height: "LR".to_string(),
                quality_code: "BQU".to_string(),
            },
        );

        assert!(map.class_for(ConstructionScheme::Rms, "4b").is_some());
        assert!(map.class_for(ConstructionScheme::Rms, " 4B ").is_some());
        assert!(map.class_for(ConstructionScheme::Atc, "4B").is_none());
    }

    #[test]
    fn test_name_map_first_mapping_wins() {
        let mut names = LocationNameMap::new();
        names.insert(AggregationLevel::Level5, "Istanbul", "Istanbul City");
        names.insert(AggregationLevel::Level5, "ISTANBUL", "Somewhere Else");

        assert_eq!(
            names.canonical(AggregationLevel::Level5, "istanbul"),
            Some("ISTANBUL CITY")
        );
        assert_eq!(names.canonical(AggregationLevel::Level1, "ISTANBUL"), None);
        assert_eq!(names.level_len(AggregationLevel::Level5), 1);
    }
}
