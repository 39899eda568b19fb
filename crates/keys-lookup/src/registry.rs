//! Lookup registry: model name to lookup factory.
//!
//! A model data directory names its model in `ModelVersion.csv`. The
//! registry reads that identity and dispatches to whichever factory is
//! registered for the name, so an embedder can serve several models from
//! one binary without hard-coding any of them.

use crate::lookup::{QuakeKeysLookup, QUAKE_MODEL_NAME};
use crate::record::RawRow;
use crate::{ExposureResult, LookupError, Result};
use keys_data::{loader, ModelInfo};
use std::collections::HashMap;
use std::path::Path;
use tracing::info;

/// A keys lookup for one model.
pub trait KeysLookup: Send + Sync {
    /// Identity of the model this lookup serves.
    fn model(&self) -> &ModelInfo;

    /// Resolve a batch of location rows, two results per parseable row,
    /// in input order.
    fn process_locations(&self, rows: &[RawRow]) -> Vec<ExposureResult>;
}

/// Factory building a lookup from a model data directory.
pub type LookupFactory = fn(&Path) -> Result<Box<dyn KeysLookup>>;

/// Registry of lookup factories keyed by model name, case-insensitive.
pub struct LookupRegistry {
    factories: HashMap<String, LookupFactory>,
}

impl LookupRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// A registry with the built-in quake model registered.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register(QUAKE_MODEL_NAME, |dir| {
            Ok(Box::new(QuakeKeysLookup::from_dir(dir)?))
        });
        registry
    }

    /// Register a factory for a model name, replacing any previous one.
    pub fn register(&mut self, model_name: &str, factory: LookupFactory) {
        self.factories
            .insert(model_name.trim().to_uppercase(), factory);
    }

    /// Read `ModelVersion.csv` under `dir` and build the lookup
    /// registered for the model it names.
    pub fn create(&self, dir: &Path) -> Result<Box<dyn KeysLookup>> {
        let model = loader::load_model_info(dir.join(loader::MODEL_VERSION_FILE))?;
        let factory = self
            .factories
            .get(&model.name.trim().to_uppercase())
            .ok_or_else(|| LookupError::UnknownModel(model.name.clone()))?;
        info!(
            "creating keys lookup for model {} {} v{}",
            model.supplier, model.name, model.version
        );
        factory(dir)
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl Default for LookupRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_data_dir(model_name: &str) -> TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("ModelVersion.csv"),
            format!("Meridian Risk,{model_name},0.0.0.1\n"),
        )
        .unwrap();
        fs::write(
            dir.path().join("DictAreaPeril.csv"),
            "AREAPERIL_ID,AREA_ID,LON,LAT,POPULATION,A0,A1,A2,A3,A4,A5,AGG_LEVEL\n\
             401,4,NULL,NULL,NULL,,TR,,,,,AREALEVEL_1\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("DictVULNERABILITY.csv"),
            "VULNERABILITY_ID,VUL_CODE\n9,TR-EQ-C-B-XXX-XX-MQU\n",
        )
        .unwrap();
        dir
    }

    #[test]
    fn test_builtin_dispatches_by_model_name() {
        // Matching is case-insensitive on the model name.
        let dir = write_data_dir("TerraQuake");
        let lookup = LookupRegistry::builtin().create(dir.path()).unwrap();
        assert_eq!(lookup.model().name, "TerraQuake");

        let rows = vec![RawRow::new().with("item_id", "1").with("country", "TR")];
        let results = lookup.process_locations(&rows);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].area_peril_id, 401);
        assert_eq!(results[0].vulnerability_id, 9);
    }

    #[test]
    fn test_unknown_model_is_an_error() {
        let dir = write_data_dir("SOME OTHER MODEL");
        let err = LookupRegistry::builtin().create(dir.path()).err().unwrap();
        match err {
            LookupError::UnknownModel(name) => assert_eq!(name, "SOME OTHER MODEL"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_empty_registry_knows_nothing() {
        let dir = write_data_dir(QUAKE_MODEL_NAME);
        let registry = LookupRegistry::new();
        assert!(registry.is_empty());
        assert!(matches!(
            registry.create(dir.path()),
            Err(LookupError::UnknownModel(_))
        ));
    }

    #[test]
    fn test_missing_reference_files_surface_as_data_errors() {
        let dir = tempfile::tempdir().unwrap();
        let err = LookupRegistry::builtin().create(dir.path()).err().unwrap();
        assert!(matches!(err, LookupError::Data(_)));
    }

    #[test]
    fn test_register_replaces_existing_factory() {
        let mut registry = LookupRegistry::builtin();
        assert_eq!(registry.len(), 1);
        registry.register("terraquake", |dir| {
            Ok(Box::new(QuakeKeysLookup::from_dir(dir)?))
        });
        assert_eq!(registry.len(), 1);
    }
}
