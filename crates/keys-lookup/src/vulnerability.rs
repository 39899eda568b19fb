//! Vulnerability resolution: derive risk and quality codes from the
//! record's occupancy and construction classifications, compose the
//! vulnerability code, and look it up in the dictionary.

use crate::record::LocationRecord;
use crate::{CoverageType, UNKNOWN_ID};
use keys_data::{
    ConstructionMap, ConstructionScheme, OccupancyMap, OccupancyScheme, VulnerabilityTable,
};

/// Structural type placeholder for records without a usable construction
/// class.
const UNKNOWN_STRUCTURAL_TYPE: &str = "XXX";

/// Structural height placeholder to go with [`UNKNOWN_STRUCTURAL_TYPE`].
const UNKNOWN_STRUCTURAL_HEIGHT: &str = "XX";

/// Quality derivation outcome. Sentinels flow into the composite code as
/// text, which guarantees a dictionary miss that names the gap.
#[derive(Debug, Clone, PartialEq, Eq)]
enum QualityTag {
    Code(String),
    NoBuildingClass,
    NoBuildingClassMatch,
    NoOccupancyClass,
    NoOccupancyMatch,
}

impl QualityTag {
    fn as_key_text(&self) -> &str {
        match self {
            QualityTag::Code(code) => code,
            QualityTag::NoBuildingClass => "NO BUILDING CLASS",
            QualityTag::NoBuildingClassMatch => "NO BUILDING CLASS MATCH",
            QualityTag::NoOccupancyClass => "NO OCCUPANCY CLASS",
            QualityTag::NoOccupancyMatch => "NO OCCUPANCY MATCH",
        }
    }
}

/// Resolve the vulnerability ID for one record and coverage type.
///
/// The composite code is
/// `{country}-EQ-{risk}-{coverage}-{structural type}-{structural height}-{quality}`
/// and must match the vulnerability dictionary exactly. A record with no
/// usable classification at all composes the minimum-quality code ending
/// in `MQU`, which a complete dictionary carries for every country. A
/// miss returns [`UNKNOWN_ID`] and a message naming the absent code.
pub fn resolve_vulnerability(
    record: &LocationRecord,
    coverage: CoverageType,
    vulnerabilities: &VulnerabilityTable,
    occupancy: &OccupancyMap,
    construction: &ConstructionMap,
) -> (i64, String) {
    let risk_code = derive_risk_code(record, occupancy);
    let (structural_type, structural_height, quality_first) =
        derive_structure(record, construction);
    let quality = derive_quality_fallback(record, occupancy, quality_first);

    let quality_text = match quality {
        // Only a complete occupancy blank degrades to the minimum
        // quality code; the other sentinels stay visible in the key.
        QualityTag::NoOccupancyClass => "MQU".to_string(),
        other => other.as_key_text().to_string(),
    };

    let code = format!(
        "{}-EQ-{}-{}-{}-{}-{}",
        record.country,
        risk_code,
        coverage.key_code(),
        structural_type,
        structural_height,
        quality_text
    );

    match vulnerabilities.id_for(&code) {
        Some(id) => (id, String::new()),
        None => (
            UNKNOWN_ID,
            format!("There is no vulnerability id for {}.", code),
        ),
    }
}

/// Risk code from the occupancy classification. Defaults to the contents
/// coverage token when the record carries no usable occupancy.
fn derive_risk_code(record: &LocationRecord, occupancy: &OccupancyMap) -> String {
    let default = CoverageType::Contents.key_code().to_string();

    let occupancy_type = match record.occupancy_type {
        Some(code) if code != 0 => code,
        _ => return default,
    };
    let scheme = match OccupancyScheme::from_name(&record.occupancy_scheme) {
        Some(scheme) => scheme,
        None => return default,
    };

    if let Some(class) = occupancy.class_for(scheme, occupancy_type) {
        return class.risk_code.clone();
    }
    // The RMS industrial scheme shares type codes with IFM.
    if scheme == OccupancyScheme::RmsInd {
        if let Some(class) = occupancy.class_for(OccupancyScheme::Ifm, occupancy_type) {
            return class.risk_code.clone();
        }
    }
    default
}

/// Structural type, structural height and the first quality tag from the
/// construction classification.
fn derive_structure(
    record: &LocationRecord,
    construction: &ConstructionMap,
) -> (String, String, QualityTag) {
    let default_type = UNKNOWN_STRUCTURAL_TYPE.to_string();
    let default_height = UNKNOWN_STRUCTURAL_HEIGHT.to_string();

    if record.building_class == "0" {
        return (default_type, default_height, QualityTag::NoBuildingClass);
    }

    let scheme = match ConstructionScheme::from_name(&record.building_scheme) {
        Some(scheme) => scheme,
        None => return (default_type, default_height, QualityTag::NoBuildingClassMatch),
    };

    match construction.class_for(scheme, &record.building_class) {
        Some(class) => (
            class.structural_type.clone(),
            class.structural_height.clone(),
            QualityTag::Code(class.quality_code.clone()),
        ),
        None => (default_type, default_height, QualityTag::NoBuildingClassMatch),
    }
}

/// Final quality tag: keeps a real construction quality code, otherwise
/// falls back to the occupancy classification's quality code.
fn derive_quality_fallback(
    record: &LocationRecord,
    occupancy: &OccupancyMap,
    quality_first: QualityTag,
) -> QualityTag {
    if let QualityTag::Code(_) = quality_first {
        return quality_first;
    }

    let occupancy_type = match record.occupancy_type {
        // Zero or absent occupancy means no class at all.
        Some(code) if code != 0 => code,
        _ => return QualityTag::NoOccupancyClass,
    };
    let scheme = match OccupancyScheme::from_name(&record.occupancy_scheme) {
        Some(scheme) => scheme,
        None => return QualityTag::NoOccupancyMatch,
    };
    match occupancy.class_for(scheme, occupancy_type) {
        Some(class) => QualityTag::Code(class.quality_code.clone()),
        None => QualityTag::NoOccupancyMatch,
    }
}
