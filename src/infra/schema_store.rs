//! Loading frontmatter schemas from disk.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, warn};

use crate::domain::FrontmatterValidator;
use crate::infra::{has_url_scheme, JsonSchema};

/// Errors while loading a schema. For collection and `--schema` schemas
/// any of these aborts a run before validation starts.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("remote schema not supported: {reference}")]
    Remote { reference: String },

    #[error("schema not found: {path}")]
    NotFound { path: PathBuf },

    #[error("failed to read schema {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON schema {path}: {source}")]
    InvalidJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid YAML schema {path}: {source}")]
    InvalidYaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Schemas keyed by the path they were referenced with.
#[derive(Default, Clone)]
pub struct SchemaStore {
    root: PathBuf,
    schemas: HashMap<String, Arc<dyn FrontmatterValidator>>,
    failures: HashMap<String, String>,
}

impl std::fmt::Debug for SchemaStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaStore")
            .field("root", &self.root)
            .field("schemas", &self.schemas.keys().collect::<Vec<_>>())
            .field("failures", &self.failures)
            .finish()
    }
}

impl SchemaStore {
    /// Creates a store resolving schema paths against `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            schemas: HashMap::new(),
            failures: HashMap::new(),
        }
    }

    /// Loads the schema at `reference` (relative to the root) unless it is
    /// already present.
    pub fn load(&mut self, reference: &str) -> Result<(), SchemaError> {
        if self.schemas.contains_key(reference) {
            return Ok(());
        }
        if has_url_scheme(reference) {
            return Err(SchemaError::Remote {
                reference: reference.to_string(),
            });
        }
        let path = self.root.join(reference);
        let schema = read_schema(&path)?;
        debug!(schema = reference, "loaded frontmatter schema");
        self.schemas.insert(reference.to_string(), Arc::new(schema));
        Ok(())
    }

    /// Loads every reference, stopping at the first failure.
    pub fn load_all<'a, I>(&mut self, references: I) -> Result<(), SchemaError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        references.into_iter().try_for_each(|r| self.load(r))
    }

    /// Loads `reference`, recording a failure instead of returning it.
    ///
    /// Used for schemas a single document asserts for itself; the
    /// validator reports the recorded failure on that document.
    pub fn try_load(&mut self, reference: &str) -> bool {
        if self.failures.contains_key(reference) {
            return false;
        }
        match self.load(reference) {
            Ok(()) => true,
            Err(err) => {
                warn!(schema = reference, error = %err, "schema could not be loaded");
                self.failures.insert(reference.to_string(), err.to_string());
                false
            }
        }
    }

    /// Why `reference` failed to load, if [`try_load`](Self::try_load) failed.
    pub fn load_error(&self, reference: &str) -> Option<&str> {
        self.failures.get(reference).map(String::as_str)
    }

    /// Registers a validator supplied by the caller under `reference`.
    pub fn insert(&mut self, reference: impl Into<String>, validator: Arc<dyn FrontmatterValidator>) {
        self.schemas.insert(reference.into(), validator);
    }

    pub fn get(&self, reference: &str) -> Option<&dyn FrontmatterValidator> {
        self.schemas.get(reference).map(Arc::as_ref)
    }

    pub fn contains(&self, reference: &str) -> bool {
        self.schemas.contains_key(reference)
    }
}

fn read_schema(path: &Path) -> Result<JsonSchema, SchemaError> {
    let text = std::fs::read_to_string(path).map_err(|source| match source.kind() {
        std::io::ErrorKind::NotFound => SchemaError::NotFound { path: path.into() },
        _ => SchemaError::Io {
            path: path.into(),
            source,
        },
    })?;

    let is_yaml = path
        .extension()
        .is_some_and(|ext| ext == "yaml" || ext == "yml");
    if is_yaml {
        JsonSchema::from_yaml_str(&text).map_err(|source| SchemaError::InvalidYaml {
            path: path.into(),
            source,
        })
    } else {
        JsonSchema::from_json_str(&text).map_err(|source| SchemaError::InvalidJson {
            path: path.into(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Frontmatter, ValidationMode};
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, content: &str) {
        let path = dir.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, content).unwrap();
    }

    #[test]
    fn loads_json_and_yaml() {
        let dir = TempDir::new().unwrap();
        write(&dir, "schemas/a.json", r#"{"required": ["title"]}"#);
        write(&dir, "schemas/b.yaml", "required: [name]\n");

        let mut store = SchemaStore::new(dir.path());
        store
            .load_all(["schemas/a.json", "schemas/b.yaml"])
            .unwrap();

        let a = store.get("schemas/a.json").unwrap();
        assert_eq!(
            a.validate(&Frontmatter::new(), ValidationMode::Permissive),
            vec!["missing required field 'title'"]
        );
        assert!(store.contains("schemas/b.yaml"));
    }

    #[test]
    fn missing_schema_is_not_found() {
        let dir = TempDir::new().unwrap();
        let mut store = SchemaStore::new(dir.path());
        let err = store.load("nope.json").unwrap_err();
        assert!(matches!(err, SchemaError::NotFound { .. }));
    }

    #[test]
    fn malformed_schema_is_reported() {
        let dir = TempDir::new().unwrap();
        write(&dir, "bad.json", "{ not json");
        let mut store = SchemaStore::new(dir.path());
        assert!(matches!(
            store.load("bad.json"),
            Err(SchemaError::InvalidJson { .. })
        ));
    }

    #[test]
    fn loading_twice_is_a_no_op() {
        let dir = TempDir::new().unwrap();
        write(&dir, "a.json", "{}");
        let mut store = SchemaStore::new(dir.path());
        store.load("a.json").unwrap();
        std::fs::remove_file(dir.path().join("a.json")).unwrap();
        assert!(store.load("a.json").is_ok());
    }

    #[test]
    fn try_load_records_failures() {
        let dir = TempDir::new().unwrap();
        write(&dir, "ok.json", "{}");
        let mut store = SchemaStore::new(dir.path());

        assert!(store.try_load("ok.json"));
        assert!(!store.try_load("missing.json"));
        assert!(!store.try_load("https://example.com/s.json"));

        assert_eq!(store.load_error("ok.json"), None);
        assert!(store.load_error("missing.json").unwrap().contains("schema not found"));
        assert_eq!(
            store.load_error("https://example.com/s.json"),
            Some("remote schema not supported: https://example.com/s.json")
        );
        assert!(!store.contains("missing.json"));
    }
}
