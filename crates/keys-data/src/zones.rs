//! Geocoded area zones from the area-peril dictionary.

use serde::{Deserialize, Serialize};

/// Spatial resolution of a zone.
///
/// `Vrg` zones are variable-resolution grid cells matched by coordinate;
/// the numbered levels are admin hierarchy tiers matched by name
/// (1 = country, 2 = province, 5 = city).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AggregationLevel {
    Vrg,
    Level1,
    Level2,
    Level5,
}

impl AggregationLevel {
    /// Label as it appears in the `aggregation_level` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            AggregationLevel::Vrg => "VRG",
            AggregationLevel::Level1 => "AREALEVEL_1",
            AggregationLevel::Level2 => "AREALEVEL_2",
            AggregationLevel::Level5 => "AREALEVEL_5",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_uppercase().as_str() {
            "VRG" => Some(AggregationLevel::Vrg),
            "AREALEVEL_1" => Some(AggregationLevel::Level1),
            "AREALEVEL_2" => Some(AggregationLevel::Level2),
            "AREALEVEL_5" => Some(AggregationLevel::Level5),
            _ => None,
        }
    }
}

/// One row of the area-peril dictionary.
///
/// Coordinates and population may be `NULL` in the source data; name-level
/// zones usually carry no coordinates at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AreaZone {
    pub areaperil_id: i64,
    pub area_id: i64,
    pub longitude: Option<f64>,
    pub latitude: Option<f64>,
    pub population: Option<f64>,
    pub admin_level_0: String,
    pub admin_level_1: String,
    pub admin_level_2: String,
    pub admin_level_3: String,
    pub admin_level_4: String,
    pub admin_level_5: String,
    pub aggregation_level: AggregationLevel,
}

impl AreaZone {
    /// Country name (admin level 1).
    pub fn country(&self) -> &str {
        &self.admin_level_1
    }

    /// Province or state name (admin level 2).
    pub fn province(&self) -> &str {
        &self.admin_level_2
    }

    /// City name (admin level 5).
    pub fn city(&self) -> &str {
        &self.admin_level_5
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_label() {
        assert_eq!(AggregationLevel::from_label("VRG"), Some(AggregationLevel::Vrg));
        assert_eq!(
            AggregationLevel::from_label(" arealevel_1 "),
            Some(AggregationLevel::Level1)
        );
        assert_eq!(
            AggregationLevel::from_label("AREALEVEL_5"),
            Some(AggregationLevel::Level5)
        );
        assert_eq!(AggregationLevel::from_label("AREALEVEL_3"), None);
        assert_eq!(AggregationLevel::from_label(""), None);
    }

    #[test]
    fn test_label_round_trip() {
        for level in [
            AggregationLevel::Vrg,
            AggregationLevel::Level1,
            AggregationLevel::Level2,
            AggregationLevel::Level5,
        ] {
            assert_eq!(AggregationLevel::from_label(level.as_str()), Some(level));
        }
    }
}
