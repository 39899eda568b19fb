//! Reference table loading from the model data directory.

use crate::parse;
use crate::{
    AggregationLevel, AreaZone, ConstructionClass, ConstructionMap, ConstructionScheme,
    DataLoadError, LocationNameMap, ModelInfo, OccupancyClass, OccupancyMap, OccupancyScheme,
    ReferenceData, Result, VulnerabilityTable,
};
use csv::{ReaderBuilder, StringRecord};
use std::fs::File;
use std::path::Path;
use tracing::{debug, info};

/// Files that must exist in every model data directory.
pub const AREA_PERIL_FILE: &str = "DictAreaPeril.csv";
pub const VULNERABILITY_FILE: &str = "DictVULNERABILITY.csv";
pub const MODEL_VERSION_FILE: &str = "ModelVersion.csv";

const NAME_MAPPING_FILES: [(AggregationLevel, &str); 3] = [
    (AggregationLevel::Level1, "LocationMapping_AREA_LEVEL_1.csv"),
    (AggregationLevel::Level2, "LocationMapping_AREA_LEVEL_2.csv"),
    (AggregationLevel::Level5, "LocationMapping_AREA_LEVEL_5.csv"),
];

/// Load every reference table from `dir`.
pub fn load_reference_data(dir: &Path) -> Result<ReferenceData> {
    let model = load_model_info(dir.join(MODEL_VERSION_FILE))?;
    info!(
        "loading reference data for {} {} v{} from {}",
        model.supplier,
        model.name,
        model.version,
        dir.display()
    );

    let zones = load_area_zones(dir.join(AREA_PERIL_FILE))?;
    let vulnerabilities = load_vulnerabilities(dir.join(VULNERABILITY_FILE))?;
    let location_names = load_location_names(dir)?;
    let occupancy = load_occupancy_schemes(dir)?;
    let construction = load_construction_schemes(dir)?;

    Ok(ReferenceData {
        model,
        zones,
        vulnerabilities,
        location_names,
        occupancy,
        construction,
    })
}

/// Load the model identity. `ModelVersion.csv` carries no header row, just
/// `supplier, model name, version`.
pub fn load_model_info(path: impl AsRef<Path>) -> Result<ModelInfo> {
    let path = path.as_ref();
    let mut reader = open_reader(path, false)?;

    let record = match reader.records().next() {
        Some(row) => row.map_err(|e| csv_error(path, e))?,
        None => {
            return Err(DataLoadError::Malformed {
                file: path.to_path_buf(),
                line: 1,
                reason: "model version file is empty".to_string(),
            })
        }
    };

    Ok(ModelInfo {
        supplier: field(&record, 0, path)?.trim().to_string(),
        name: field(&record, 1, path)?.trim().to_string(),
        version: field(&record, 2, path)?.trim().to_string(),
    })
}

/// Load the area-peril dictionary.
pub fn load_area_zones(path: impl AsRef<Path>) -> Result<Vec<AreaZone>> {
    let path = path.as_ref();
    let mut reader = open_reader(path, true)?;

    let mut zones = Vec::new();
    for row in reader.records() {
        let record = row.map_err(|e| csv_error(path, e))?;
        let level_raw = field(&record, 11, path)?;
        let aggregation_level = AggregationLevel::from_label(level_raw).ok_or_else(|| {
            malformed(
                path,
                &record,
                format!("unknown aggregation level '{}'", level_raw.trim()),
            )
        })?;

        zones.push(AreaZone {
            areaperil_id: req_int_field(&record, 0, "areaperil_id", path)?,
            area_id: req_int_field(&record, 1, "area_id", path)?,
            longitude: opt_float_field(&record, 2, "lon", path)?,
            latitude: opt_float_field(&record, 3, "lat", path)?,
            population: opt_float_field(&record, 4, "population", path)?,
            admin_level_0: text_field(&record, 5, path)?,
            admin_level_1: text_field(&record, 6, path)?,
            admin_level_2: text_field(&record, 7, path)?,
            admin_level_3: text_field(&record, 8, path)?,
            admin_level_4: text_field(&record, 9, path)?,
            admin_level_5: text_field(&record, 10, path)?,
            aggregation_level,
        });
    }

    info!("loaded {} area zones from {}", zones.len(), path.display());
    Ok(zones)
}

/// Load the vulnerability dictionary.
pub fn load_vulnerabilities(path: impl AsRef<Path>) -> Result<VulnerabilityTable> {
    let path = path.as_ref();
    let mut reader = open_reader(path, true)?;

    let mut table = VulnerabilityTable::new();
    for row in reader.records() {
        let record = row.map_err(|e| csv_error(path, e))?;
        let id = req_int_field(&record, 0, "vulnerability id", path)?;
        let code = field(&record, 1, path)?;
        table.insert(code, id);
    }

    info!(
        "loaded {} vulnerability codes from {}",
        table.len(),
        path.display()
    );
    Ok(table)
}

/// Load whichever of the per-level name mapping files exist.
pub fn load_location_names(dir: &Path) -> Result<LocationNameMap> {
    let mut names = LocationNameMap::new();
    for (level, file_name) in NAME_MAPPING_FILES {
        let path = dir.join(file_name);
        if !path.is_file() {
            debug!("no {} in {}, skipping", file_name, dir.display());
            continue;
        }

        let mut reader = open_reader(&path, true)?;
        let mut count = 0usize;
        for row in reader.records() {
            let record = row.map_err(|e| csv_error(&path, e))?;
            let variant = field(&record, 0, &path)?;
            // column 1 is a country key the rewriter does not use
            let canonical = field(&record, 2, &path)?;
            names.insert(level, variant, canonical);
            count += 1;
        }
        info!("loaded {} name mappings from {}", count, path.display());
    }
    Ok(names)
}

/// Load whichever of the occupancy scheme files exist. Rows whose
/// occupancy type column is null are skipped.
pub fn load_occupancy_schemes(dir: &Path) -> Result<OccupancyMap> {
    let mut map = OccupancyMap::new();
    for scheme in OccupancyScheme::ALL {
        let path = dir.join(format!("{} OCCUPANCY SCHEME.csv", scheme.name()));
        if !path.is_file() {
            debug!("no occupancy scheme file for {}, skipping", scheme.name());
            continue;
        }

        let mut reader = open_reader(&path, true)?;
        let mut count = 0usize;
        let mut skipped = 0usize;
        for row in reader.records() {
            let record = row.map_err(|e| csv_error(&path, e))?;
            let occupancy_type = match opt_int_field(&record, 0, "occupancy type", &path)? {
                Some(code) => code,
                None => {
                    skipped += 1;
                    continue;
                }
            };
            map.insert(
                scheme,
                occupancy_type,
                OccupancyClass {
                    risk_code: text_field(&record, 1, &path)?,
                    quality_code: text_field(&record, 2, &path)?,
                },
            );
            count += 1;
        }
        info!(
            "loaded {} occupancy classes for {} ({} skipped without type)",
            count,
            scheme.name(),
            skipped
        );
    }
    Ok(map)
}

/// Load whichever of the construction class files exist.
pub fn load_construction_schemes(dir: &Path) -> Result<ConstructionMap> {
    let mut map = ConstructionMap::new();
    for scheme in ConstructionScheme::ALL {
        let path = dir.join(format!("{} CONSTRUCTION CLASS.csv", scheme.name()));
        if !path.is_file() {
            debug!("no construction class file for {}, skipping", scheme.name());
            continue;
        }

        let mut reader = open_reader(&path, true)?;
        let mut count = 0usize;
        for row in reader.records() {
            let record = row.map_err(|e| csv_error(&path, e))?;
            let class_key = field(&record, 0, &path)?;
            let class = ConstructionClass {
                structural_type: text_field(&record, 1, &path)?,
                structural_height: text_field(&record, 2, &path)?,
                quality_code: text_field(&record, 3, &path)?,
            };
            map.insert(scheme, class_key, class);
            count += 1;
        }
        info!(
            "loaded {} construction classes for {}",
            count,
            scheme.name()
        );
    }
    Ok(map)
}

fn open_reader(path: &Path, has_headers: bool) -> Result<csv::Reader<File>> {
    if !path.is_file() {
        return Err(DataLoadError::MissingFile(path.to_path_buf()));
    }
    ReaderBuilder::new()
        .has_headers(has_headers)
        .flexible(true)
        .from_path(path)
        .map_err(|e| csv_error(path, e))
}

fn csv_error(path: &Path, source: csv::Error) -> DataLoadError {
    DataLoadError::Csv {
        file: path.to_path_buf(),
        source,
    }
}

fn line_of(record: &StringRecord) -> u64 {
    record.position().map_or(0, |pos| pos.line())
}

fn malformed(path: &Path, record: &StringRecord, reason: String) -> DataLoadError {
    DataLoadError::Malformed {
        file: path.to_path_buf(),
        line: line_of(record),
        reason,
    }
}

fn field<'r>(record: &'r StringRecord, idx: usize, path: &Path) -> Result<&'r str> {
    record.get(idx).ok_or_else(|| {
        malformed(
            path,
            record,
            format!("expected at least {} columns, found {}", idx + 1, record.len()),
        )
    })
}

fn text_field(record: &StringRecord, idx: usize, path: &Path) -> Result<String> {
    Ok(field(record, idx, path)?.trim().to_uppercase())
}

fn req_int_field(record: &StringRecord, idx: usize, name: &str, path: &Path) -> Result<i64> {
    let raw = field(record, idx, path)?;
    parse::req_int(raw).map_err(|_| {
        malformed(path, record, format!("invalid integer {} '{}'", name, raw.trim()))
    })
}

fn opt_int_field(record: &StringRecord, idx: usize, name: &str, path: &Path) -> Result<Option<i64>> {
    let raw = field(record, idx, path)?;
    parse::opt_int(raw).map_err(|_| {
        malformed(path, record, format!("invalid integer {} '{}'", name, raw.trim()))
    })
}

fn opt_float_field(record: &StringRecord, idx: usize, name: &str, path: &Path) -> Result<Option<f64>> {
    let raw = field(record, idx, path)?;
    parse::opt_float(raw).map_err(|_| {
        malformed(path, record, format!("invalid number {} '{}'", name, raw.trim()))
    })
}
