//! Contract document loading and caching
//!
//! Contracts live under a base directory as `<name>.json`, `<name>.yaml`
//! or `<name>.yml`. Each document is parsed once and shared as `Arc<Value>`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use openapi_contract_core::Config;

/// Extensions tried, in order, when resolving a contract name.
const EXTENSIONS: &[&str] = &["json", "yaml", "yml"];

/// Loads contract documents by name and caches them for the store's lifetime.
#[derive(Debug, Default)]
pub struct SpecStore {
    base_path: Option<PathBuf>,
    strip_prefixes: Vec<String>,
    cache: Mutex<HashMap<String, Arc<serde_json::Value>>>,
}

impl SpecStore {
    /// An unconfigured store; [`SpecStore::load`] fails until [`SpecStore::configure`] is called.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn configured(base_path: impl Into<PathBuf>, strip_prefixes: Vec<String>) -> Self {
        let mut store = Self::new();
        store.configure(base_path, strip_prefixes);
        store
    }

    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::configured(&config.spec_base_path, config.strip_prefixes.clone())
    }

    /// Set the contract directory and the request-path prefixes to strip.
    ///
    /// Documents already cached stay cached.
    pub fn configure(&mut self, base_path: impl Into<PathBuf>, strip_prefixes: Vec<String>) {
        self.base_path = Some(base_path.into());
        self.strip_prefixes = strip_prefixes;
    }

    /// # Errors
    ///
    /// Returns [`StoreError::NotConfigured`] if no base path was set.
    pub fn base_path(&self) -> Result<&Path, StoreError> {
        self.base_path.as_deref().ok_or(StoreError::NotConfigured)
    }

    #[must_use]
    pub fn strip_prefixes(&self) -> &[String] {
        &self.strip_prefixes
    }

    /// Load the contract called `name`, parsing it on first access.
    ///
    /// # Errors
    ///
    /// Returns error if the store is unconfigured, or the contract file is
    /// missing, unreadable or not valid JSON/YAML.
    pub fn load(&self, name: &str) -> Result<Arc<serde_json::Value>, StoreError> {
        if let Some(document) = self.lock_cache().get(name) {
            return Ok(Arc::clone(document));
        }

        let base = self.base_path()?;
        let path = locate(base, name)?;
        let content = std::fs::read_to_string(&path)
            .map_err(|e| StoreError::Io(path.clone(), e.to_string()))?;
        let document = Arc::new(parse_spec(&path, &content)?);
        tracing::debug!(contract = name, path = %path.display(), "contract loaded");

        // First writer wins; a concurrent load of the same name reuses it
        let mut cache = self.lock_cache();
        let cached = cache.entry(name.to_string()).or_insert(document);
        Ok(Arc::clone(cached))
    }

    /// Forget configuration and every cached document.
    pub fn reset(&mut self) {
        self.base_path = None;
        self.strip_prefixes.clear();
        self.lock_cache().clear();
    }

    fn lock_cache(&self) -> std::sync::MutexGuard<'_, HashMap<String, Arc<serde_json::Value>>> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn locate(base: &Path, name: &str) -> Result<PathBuf, StoreError> {
    EXTENSIONS
        .iter()
        .map(|ext| base.join(format!("{name}.{ext}")))
        .find(|candidate| candidate.is_file())
        .ok_or_else(|| StoreError::NotFound(base.join(format!("{name}.json"))))
}

/// Parse an OpenAPI document from JSON or YAML.
///
/// Detection strategy: try extension first (`.yaml`/`.yml`), then fall back to
/// content sniffing (leading `{` → JSON, otherwise YAML).
pub(crate) fn parse_spec(path: &Path, content: &str) -> Result<serde_json::Value, StoreError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let parse_json = || -> Result<serde_json::Value, StoreError> {
        serde_json::from_str(content)
            .map_err(|e| StoreError::Parse(path.to_path_buf(), format!("Invalid JSON: {e}")))
    };
    let parse_yaml = || -> Result<serde_json::Value, StoreError> {
        serde_yml::from_str(content)
            .map_err(|e| StoreError::Parse(path.to_path_buf(), format!("Invalid YAML: {e}")))
    };

    match ext.as_str() {
        "yaml" | "yml" => parse_yaml(),
        "json" => parse_json(),
        _ if content.trim_start().starts_with('{') => parse_json(),
        _ => parse_yaml(),
    }
}

/// Contract could not be provided. Fatal to the calling operation.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error(
        "Contract store base path not configured. Call SpecStore::configure() or set spec_base_path in the config file."
    )]
    NotConfigured,
    #[error("OpenAPI contract not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("Cannot read {}: {}", .0.display(), .1)]
    Io(PathBuf, String),
    #[error("Parse error in {}: {}", .0.display(), .1)]
    Parse(PathBuf, String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &Path, file: &str, content: &str) {
        std::fs::write(dir.join(file), content).unwrap();
    }

    #[test]
    fn unconfigured_store_fails() {
        let store = SpecStore::new();
        let err = store.load("front").unwrap_err();
        assert!(matches!(err, StoreError::NotConfigured));
        assert!(err.to_string().contains("not configured"));
    }

    #[test]
    fn missing_contract_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = SpecStore::configured(dir.path(), vec![]);
        let err = store.load("missing").unwrap_err();
        match err {
            StoreError::NotFound(path) => assert!(path.ends_with("missing.json")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn loads_json_contract() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "front.json", r#"{"openapi": "3.0.3", "paths": {}}"#);
        let store = SpecStore::configured(dir.path(), vec![]);
        let doc = store.load("front").unwrap();
        assert_eq!(doc["openapi"], "3.0.3");
    }

    #[test]
    fn loads_yaml_contract() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "admin.yaml", "openapi: '3.1.0'\npaths: {}\n");
        let store = SpecStore::configured(dir.path(), vec![]);
        assert_eq!(store.load("admin").unwrap()["openapi"], "3.1.0");
    }

    #[test]
    fn json_preferred_over_yaml() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "front.json", r#"{"openapi": "3.0.0"}"#);
        write(dir.path(), "front.yml", "openapi: '3.1.0'\n");
        let store = SpecStore::configured(dir.path(), vec![]);
        assert_eq!(store.load("front").unwrap()["openapi"], "3.0.0");
    }

    #[test]
    fn documents_are_cached() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "front.json", r#"{"openapi": "3.0.0"}"#);
        let store = SpecStore::configured(dir.path(), vec![]);

        let first = store.load("front").unwrap();
        // Changing the file does not affect the cached document
        write(dir.path(), "front.json", r#"{"openapi": "3.1.0"}"#);
        let second = store.load("front").unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second["openapi"], "3.0.0");
    }

    #[test]
    fn reset_clears_cache_and_configuration() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "front.json", r#"{"openapi": "3.0.0"}"#);
        let mut store = SpecStore::configured(dir.path(), vec!["/api".into()]);
        store.load("front").unwrap();

        store.reset();
        assert!(store.strip_prefixes().is_empty());
        assert!(matches!(store.load("front"), Err(StoreError::NotConfigured)));
    }

    #[test]
    fn invalid_json_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "front.json", "{ invalid json");
        let store = SpecStore::configured(dir.path(), vec![]);
        let err = store.load("front").unwrap_err();
        assert!(matches!(err, StoreError::Parse(..)));
        assert!(err.to_string().contains("Invalid JSON"));
    }

    #[test]
    fn io_and_parse_errors_name_the_file() {
        let io = StoreError::Io(PathBuf::from("/srv/front.json"), "permission denied".into());
        assert_eq!(io.to_string(), "Cannot read /srv/front.json: permission denied");
        let parse = StoreError::Parse(PathBuf::from("front.yaml"), "Invalid YAML: eof".into());
        assert_eq!(parse.to_string(), "Parse error in front.yaml: Invalid YAML: eof");
    }

    #[test]
    fn from_config_uses_base_path_and_prefixes() {
        let config = Config {
            spec_base_path: PathBuf::from("/srv/contracts"),
            strip_prefixes: vec!["/api".into()],
            ..Config::default()
        };
        let store = SpecStore::from_config(&config);
        assert_eq!(store.base_path().unwrap(), Path::new("/srv/contracts"));
        assert_eq!(store.strip_prefixes(), ["/api".to_string()]);
    }

    #[test]
    fn parse_spec_sniff_json() {
        let v = parse_spec(Path::new("spec"), r#"{"openapi": "3.1.0"}"#).unwrap();
        assert_eq!(v["openapi"], "3.1.0");
    }

    #[test]
    fn parse_spec_sniff_yaml() {
        let v = parse_spec(Path::new("spec.txt"), "openapi: '3.1.0'\n").unwrap();
        assert_eq!(v["openapi"], "3.1.0");
    }

    #[test]
    fn parse_spec_invalid_yaml_error() {
        let bad = ":\n  :\n    - [invalid";
        let err = parse_spec(Path::new("spec.yaml"), bad).unwrap_err();
        assert!(err.to_string().contains("Invalid YAML"));
    }
}
