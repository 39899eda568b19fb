//! Raw location rows and their normalized, typed form.

use crate::CoverageType;
use keys_data::parse;
use keys_data::{AggregationLevel, LocationNameMap};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Errors turning a raw row into a [`LocationRecord`].
#[derive(Error, Debug, PartialEq, Eq)]
pub enum RecordParseError {
    #[error("missing required field '{0}'")]
    MissingField(&'static str),

    #[error("invalid integer in '{field}': '{value}'")]
    InvalidInt { field: &'static str, value: String },

    #[error("invalid number in '{field}': '{value}'")]
    InvalidFloat { field: &'static str, value: String },
}

/// One untyped location row: column name to raw cell text.
///
/// Column names are lower-cased on insert, so callers can use whatever
/// casing their transport delivered. An absent column and an empty cell
/// read the same.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawRow {
    cells: HashMap<String, String>,
}

impl RawRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a cell, replacing any previous value for the column.
    pub fn set(&mut self, column: &str, value: impl Into<String>) {
        self.cells.insert(column.trim().to_lowercase(), value.into());
    }

    /// Builder-style [`set`](Self::set).
    pub fn with(mut self, column: &str, value: impl Into<String>) -> Self {
        self.set(column, value);
        self
    }

    /// Trimmed cell text; `None` when the column is absent or blank.
    pub fn get(&self, column: &str) -> Option<&str> {
        let text = self.cells.get(&column.trim().to_lowercase())?.trim();
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

/// A location record with typed fields, trimmed and upper-cased, place
/// names rewritten to the canonical forms the zone dictionary uses.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocationRecord {
    pub item_id: i64,
    pub account: String,
    pub location_number: Option<i64>,
    pub city: String,
    pub state: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub address_match: Option<i64>,
    pub country: String,
    pub building_count: Option<i64>,
    pub building_scheme: String,
    pub building_class: String,
    pub occupancy_scheme: String,
    pub occupancy_type: Option<i64>,
    pub country_scheme: String,
    pub country_code: String,
    pub building_value: Option<f64>,
    pub contents_value: Option<f64>,
    pub row_locator: Option<i64>,
    /// Tagged by the orchestrator for the coverage pass in flight.
    pub coverage_type: Option<CoverageType>,
}

/// Convert a raw row into a typed record.
///
/// Expects the canonical lower-cased column names: `item_id`, `accntnum`,
/// `locnum`, `city`, `state`, `latitude`, `longitude`, `addrmatch`,
/// `country`, `numbldgs`, `bldgscheme`, `bldgclass`, `occscheme`,
/// `occtype`, `cntryscheme`, `cntrycode`, `eqcv1val`, `eqcv2val` and
/// `locfilerowlocator`. Text fields are trimmed and upper-cased; numeric
/// fields honour the `n/a` and `NULL` null markers; `item_id` is the only
/// required field. City, state and country are rewritten to canonical
/// names when the location mappings know the variant.
pub fn normalize(
    row: &RawRow,
    names: &LocationNameMap,
) -> Result<LocationRecord, RecordParseError> {
    let item_id_raw = row
        .get("item_id")
        .ok_or(RecordParseError::MissingField("item_id"))?;
    let item_id = parse::req_int(item_id_raw).map_err(|_| RecordParseError::InvalidInt {
        field: "item_id",
        value: item_id_raw.to_string(),
    })?;

    let mut record = LocationRecord {
        item_id,
        account: text(row, "accntnum"),
        location_number: int(row, "locnum")?,
        city: text(row, "city"),
        state: text(row, "state"),
        latitude: float(row, "latitude")?,
        longitude: float(row, "longitude")?,
        address_match: int(row, "addrmatch")?,
        country: text(row, "country"),
        building_count: int(row, "numbldgs")?,
        building_scheme: text(row, "bldgscheme"),
        building_class: text(row, "bldgclass"),
        occupancy_scheme: text(row, "occscheme"),
        occupancy_type: int(row, "occtype")?,
        country_scheme: text(row, "cntryscheme"),
        country_code: text(row, "cntrycode"),
        building_value: float(row, "eqcv1val")?,
        contents_value: float(row, "eqcv2val")?,
        row_locator: int(row, "locfilerowlocator")?,
        coverage_type: None,
    };

    apply_name_fixes(&mut record, names);
    Ok(record)
}

fn text(row: &RawRow, column: &str) -> String {
    row.get(column).map(str::to_uppercase).unwrap_or_default()
}

fn int(row: &RawRow, column: &'static str) -> Result<Option<i64>, RecordParseError> {
    match row.get(column) {
        None => Ok(None),
        Some(raw) => parse::opt_int(raw).map_err(|_| RecordParseError::InvalidInt {
            field: column,
            value: raw.to_string(),
        }),
    }
}

fn float(row: &RawRow, column: &'static str) -> Result<Option<f64>, RecordParseError> {
    match row.get(column) {
        None => Ok(None),
        Some(raw) => parse::opt_float(raw).map_err(|_| RecordParseError::InvalidFloat {
            field: column,
            value: raw.to_string(),
        }),
    }
}

/// Rewrite city, state and country to the canonical names used by the
/// zone dictionary. Unknown names pass through untouched.
fn apply_name_fixes(record: &mut LocationRecord, names: &LocationNameMap) {
    if !record.city.is_empty() {
        if let Some(canonical) = names.canonical(AggregationLevel::Level5, &record.city) {
            record.city = canonical.to_string();
        }
    }
    if !record.state.is_empty() {
        if let Some(canonical) = names.canonical(AggregationLevel::Level2, &record.state) {
            record.state = canonical.to_string();
        }
    }
    if !record.country.is_empty() {
        if let Some(canonical) = names.canonical(AggregationLevel::Level1, &record.country) {
            record.country = canonical.to_string();
        }
    }
}
