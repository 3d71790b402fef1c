//! Endpoint coverage bookkeeping
//!
//! A [`CoverageStore`] remembers which `"METHOD /template"` operations were
//! exercised, per contract. Reports are computed against the operations a
//! contract document declares.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Methods counted as endpoints for coverage.
pub const COVERED_METHODS: &[&str] = &["GET", "POST", "PUT", "PATCH", "DELETE"];

/// Exercised operations, grouped by contract name.
///
/// Only grows through [`CoverageStore::record`]; cleared by [`CoverageStore::reset`].
#[derive(Debug, Clone, Default)]
pub struct CoverageStore {
    covered: HashMap<String, HashSet<String>>,
}

impl CoverageStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `METHOD template_path` as exercised for `contract`. Idempotent.
    pub fn record(&mut self, contract: &str, method: &str, template_path: &str) {
        let key = operation_key(method, template_path);
        let inserted = self
            .covered
            .entry(contract.to_string())
            .or_default()
            .insert(key);
        if inserted {
            tracing::debug!(contract, method, path = template_path, "coverage recorded");
        }
    }

    /// Recorded operation keys for `contract`, sorted.
    #[must_use]
    pub fn covered(&self, contract: &str) -> BTreeSet<&str> {
        self.covered
            .get(contract)
            .map(|set| set.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Whether anything was recorded for `contract`.
    #[must_use]
    pub fn has_coverage(&self, contract: &str) -> bool {
        self.covered.get(contract).is_some_and(|set| !set.is_empty())
    }

    /// Forget everything recorded for every contract.
    pub fn reset(&mut self) {
        self.covered.clear();
    }

    /// Partition the document's declared operations into covered and uncovered.
    #[must_use]
    pub fn report(&self, contract: &str, document: &serde_json::Value) -> CoverageReport {
        let endpoints = declared_operations(document);
        let recorded = self.covered.get(contract);

        let (covered, uncovered): (Vec<String>, Vec<String>) = endpoints
            .into_iter()
            .partition(|endpoint| recorded.is_some_and(|set| set.contains(endpoint)));

        CoverageReport {
            contract: contract.to_string(),
            total: covered.len() + uncovered.len(),
            covered_count: covered.len(),
            covered,
            uncovered,
        }
    }
}

/// `"GET /v1/pets"` style key.
#[must_use]
pub fn operation_key(method: &str, template_path: &str) -> String {
    format!("{} {template_path}", method.to_uppercase())
}

/// Every declared GET/POST/PUT/PATCH/DELETE operation as an operation key, sorted.
#[must_use]
pub fn declared_operations(document: &serde_json::Value) -> Vec<String> {
    let Some(paths) = document.get("paths").and_then(|p| p.as_object()) else {
        return Vec::new();
    };

    let mut endpoints: Vec<String> = paths
        .iter()
        .filter_map(|(path, item)| item.as_object().map(|methods| (path, methods)))
        .flat_map(|(path, methods)| {
            methods.keys().filter_map(move |method| {
                let upper = method.to_uppercase();
                COVERED_METHODS
                    .contains(&upper.as_str())
                    .then(|| format!("{upper} {path}"))
            })
        })
        .collect();

    endpoints.sort();
    endpoints
}

/// Coverage of one contract's declared operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CoverageReport {
    /// Contract name
    pub contract: String,
    /// Exercised operations, sorted
    pub covered: Vec<String>,
    /// Operations never exercised, sorted
    pub uncovered: Vec<String>,
    /// Number of declared operations
    pub total: usize,
    /// Number of exercised operations
    pub covered_count: usize,
}

impl CoverageReport {
    /// Covered share in percent, rounded to one decimal. 0 when nothing is declared.
    #[must_use]
    pub fn percentage(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        #[allow(clippy::cast_precision_loss)]
        let pct = self.covered_count as f64 / self.total as f64 * 100.0;
        (pct * 10.0).round() / 10.0
    }
}

/// Reports for several contracts, keyed by contract name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CoverageSummary {
    pub contracts: BTreeMap<String, CoverageReport>,
}

impl CoverageSummary {
    pub fn insert(&mut self, report: CoverageReport) {
        self.contracts.insert(report.contract.clone(), report);
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.contracts.is_empty()
    }

    pub fn reports(&self) -> impl Iterator<Item = &CoverageReport> {
        self.contracts.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn petstore() -> serde_json::Value {
        json!({
            "openapi": "3.0.3",
            "paths": {
                "/v1/pets": {
                    "get": {"responses": {}},
                    "post": {"responses": {}},
                    "parameters": []
                },
                "/v1/pets/{petId}": {
                    "get": {"responses": {}},
                    "delete": {"responses": {}},
                    "summary": "A pet"
                },
                "/v1/health": {
                    "get": {"responses": {}},
                    "head": {"responses": {}},
                    "options": {"responses": {}}
                }
            }
        })
    }

    #[test]
    fn record_uppercases_method() {
        let mut store = CoverageStore::new();
        store.record("petstore", "get", "/v1/pets");
        assert!(store.covered("petstore").contains("GET /v1/pets"));
    }

    #[test]
    fn record_is_idempotent() {
        let mut store = CoverageStore::new();
        store.record("petstore", "GET", "/v1/pets");
        store.record("petstore", "get", "/v1/pets");
        assert_eq!(store.covered("petstore").len(), 1);
    }

    #[test]
    fn contracts_are_independent() {
        let mut store = CoverageStore::new();
        store.record("front", "GET", "/v1/pets");
        assert!(store.has_coverage("front"));
        assert!(!store.has_coverage("admin"));
        assert!(store.covered("admin").is_empty());
    }

    #[test]
    fn reset_clears_all_contracts() {
        let mut store = CoverageStore::new();
        store.record("front", "GET", "/a");
        store.record("admin", "GET", "/b");
        store.reset();
        assert!(!store.has_coverage("front"));
        assert!(!store.has_coverage("admin"));
    }

    #[test]
    fn declared_operations_filters_and_sorts() {
        assert_eq!(
            declared_operations(&petstore()),
            vec![
                "DELETE /v1/pets/{petId}",
                "GET /v1/health",
                "GET /v1/pets",
                "GET /v1/pets/{petId}",
                "POST /v1/pets",
            ]
        );
    }

    #[test]
    fn declared_operations_without_paths() {
        assert!(declared_operations(&json!({"openapi": "3.0.0"})).is_empty());
    }

    #[test]
    fn report_partitions_covered_and_uncovered() {
        let mut store = CoverageStore::new();
        store.record("petstore", "GET", "/v1/pets");
        store.record("petstore", "POST", "/v1/pets");

        let report = store.report("petstore", &petstore());
        assert_eq!(report.total, 5);
        assert_eq!(report.covered_count, 2);
        assert_eq!(report.covered, vec!["GET /v1/pets", "POST /v1/pets"]);
        assert_eq!(
            report.uncovered,
            vec![
                "DELETE /v1/pets/{petId}",
                "GET /v1/health",
                "GET /v1/pets/{petId}",
            ]
        );
    }

    #[test]
    fn report_with_no_coverage() {
        let report = CoverageStore::new().report("petstore", &petstore());
        assert_eq!(report.total, 5);
        assert_eq!(report.covered_count, 0);
        assert!(report.covered.is_empty());
        assert_eq!(report.uncovered.len(), 5);
        assert!((report.percentage() - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn report_ignores_other_contracts() {
        let mut store = CoverageStore::new();
        store.record("other", "GET", "/v1/pets");
        let report = store.report("petstore", &petstore());
        assert_eq!(report.covered_count, 0);
    }

    #[test]
    fn percentage_rounds_to_one_decimal() {
        let report = CoverageReport {
            contract: "x".into(),
            covered: vec!["GET /a".into()],
            uncovered: vec!["GET /b".into(), "GET /c".into()],
            total: 3,
            covered_count: 1,
        };
        assert!((report.percentage() - 33.3).abs() < 1e-9);
    }

    #[test]
    fn percentage_of_empty_contract_is_zero() {
        let report = CoverageStore::new().report("empty", &json!({"paths": {}}));
        assert_eq!(report.total, 0);
        assert!((report.percentage() - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn summary_orders_contracts_by_name() {
        let store = CoverageStore::new();
        let mut summary = CoverageSummary::default();
        summary.insert(store.report("zeta", &petstore()));
        summary.insert(store.report("alpha", &petstore()));
        let names: Vec<&str> = summary.reports().map(|r| r.contract.as_str()).collect();
        assert_eq!(names, vec!["alpha", "zeta"]);
    }
}
