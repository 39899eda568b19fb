//! Vulnerability ID dictionary.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Map from composite vulnerability code to vulnerability ID.
///
/// Codes look like `US-EQ-C-B-XXX-XX-MQU`; the resolver assembles one from
/// record fields and expects an exact match here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VulnerabilityTable {
    by_code: HashMap<String, i64>,
}

impl VulnerabilityTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a code, upper-cased. The first occurrence of a duplicate wins.
    pub fn insert(&mut self, code: &str, id: i64) {
        self.by_code.entry(code.trim().to_uppercase()).or_insert(id);
    }

    /// Exact-match lookup.
    pub fn id_for(&self, code: &str) -> Option<i64> {
        self.by_code.get(code).copied()
    }

    pub fn len(&self) -> usize {
        self.by_code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_code.is_empty()
    }
}
