//! Area-peril resolution: four fallback tiers, from a coordinate match
//! against the variable-resolution grid down to a country-level match.

use crate::record::LocationRecord;
use crate::{great_circle_km, UNKNOWN_ID, VRG_MATCH_RADIUS_KM};
use keys_data::{AggregationLevel, AreaZone};
use std::cmp::Ordering;

type TierFn = fn(&LocationRecord, &[&AreaZone]) -> (Option<i64>, Option<String>);

/// Resolve the area-peril ID for a record.
///
/// Tiers run in order (VRG coordinates, city, province, country); the
/// first success wins and resolution stops. Every attempted tier may add
/// a fragment to the diagnostic message, so the caller can see how far
/// the fallback went. Returns [`UNKNOWN_ID`] when no tier matches.
pub fn resolve_area_peril(record: &LocationRecord, zones: &[AreaZone]) -> (i64, String) {
    if record.country.is_empty() {
        return (UNKNOWN_ID, "The country code must not be empty.".to_string());
    }

    let tiers: [(AggregationLevel, TierFn); 4] = [
        (AggregationLevel::Vrg, match_by_lonlat),
        (AggregationLevel::Level5, match_by_city),
        (AggregationLevel::Level2, match_by_province),
        (AggregationLevel::Level1, match_by_country),
    ];

    let mut fragments: Vec<String> = Vec::new();
    for (level, tier) in tiers {
        let tier_zones: Vec<&AreaZone> = zones
            .iter()
            .filter(|zone| zone.aggregation_level == level)
            .collect();
        let (id, fragment) = tier(record, &tier_zones);
        if let Some(fragment) = fragment {
            fragments.push(fragment);
        }
        if let Some(id) = id {
            return (id, fragments.join(" "));
        }
    }

    (UNKNOWN_ID, fragments.join(" "))
}

fn same_country(record: &LocationRecord, zone: &AreaZone) -> bool {
    record.country.eq_ignore_ascii_case(zone.country())
}

/// Tier 1: nearest VRG zone by great-circle distance. Skipped silently
/// when the record carries no usable coordinates.
fn match_by_lonlat(record: &LocationRecord, zones: &[&AreaZone]) -> (Option<i64>, Option<String>) {
    let (lat, lon) = match (record.latitude, record.longitude) {
        (Some(lat), Some(lon)) => (lat, lon),
        _ => return (None, None),
    };

    let mut nearest: Option<(&AreaZone, f64)> = None;
    for &zone in zones {
        let (zone_lat, zone_lon) = match (zone.latitude, zone.longitude) {
            (Some(zone_lat), Some(zone_lon)) => (zone_lat, zone_lon),
            // Zones without a centroid cannot be measured against.
            _ => continue,
        };
        let distance = great_circle_km(lat, lon, zone_lat, zone_lon);
        let closer = match nearest {
            None => true,
            Some((_, best)) => distance.partial_cmp(&best) == Some(Ordering::Less),
        };
        if closer {
            nearest = Some((zone, distance));
        }
    }

    let (zone, distance) = match nearest {
        Some(found) => found,
        None => return (None, Some("No VRG zone available.".to_string())),
    };

    if distance >= VRG_MATCH_RADIUS_KM {
        return (
            None,
            Some(format!(
                "No VRG zone within {} km (nearest at {:.3} km).",
                VRG_MATCH_RADIUS_KM, distance
            )),
        );
    }
    if !same_country(record, zone) {
        return (
            None,
            Some(format!(
                "Given Lon/Lat is not in the country! found areaperil_id {}.",
                zone.areaperil_id
            )),
        );
    }

    (
        Some(zone.areaperil_id),
        Some(format!(
            "Mapped by Lon/Lat! areaperil_id {} at {:.3} km.",
            zone.areaperil_id, distance
        )),
    )
}

/// Tier 2: exact city name match, silent when the record has no city or
/// the city is unknown.
fn match_by_city(record: &LocationRecord, zones: &[&AreaZone]) -> (Option<i64>, Option<String>) {
    if record.city.is_empty() {
        return (None, None);
    }
    match zones
        .iter()
        .find(|zone| record.city.eq_ignore_ascii_case(zone.city()))
    {
        Some(zone) if same_country(record, zone) => (
            Some(zone.areaperil_id),
            Some(format!(
                "Mapped by city name! areaperil_id {}.",
                zone.areaperil_id
            )),
        ),
        Some(zone) => (
            None,
            Some(format!(
                "Given city is in another country! found areaperil_id {}.",
                zone.areaperil_id
            )),
        ),
        None => (None, None),
    }
}

/// Tier 3: exact province name match against the record's state field.
fn match_by_province(
    record: &LocationRecord,
    zones: &[&AreaZone],
) -> (Option<i64>, Option<String>) {
    if record.state.is_empty() {
        return (None, None);
    }
    match zones
        .iter()
        .find(|zone| record.state.eq_ignore_ascii_case(zone.province()))
    {
        Some(zone) if same_country(record, zone) => (
            Some(zone.areaperil_id),
            Some(format!(
                "Mapped by province name! areaperil_id {}.",
                zone.areaperil_id
            )),
        ),
        Some(zone) => (
            None,
            Some(format!(
                "Given province is in another country! found areaperil_id {}.",
                zone.areaperil_id
            )),
        ),
        None => (None, None),
    }
}

/// Tier 4: exact country name match, the last resort.
fn match_by_country(record: &LocationRecord, zones: &[&AreaZone]) -> (Option<i64>, Option<String>) {
    match zones
        .iter()
        .find(|zone| record.country.eq_ignore_ascii_case(zone.country()))
    {
        Some(zone) => (
            Some(zone.areaperil_id),
            Some(format!(
                "Mapped by country name! areaperil_id {}.",
                zone.areaperil_id
            )),
        ),
        None => (
            None,
            Some(format!(
                "Country name was not found for {}.",
                record.country
            )),
        ),
    }
}
