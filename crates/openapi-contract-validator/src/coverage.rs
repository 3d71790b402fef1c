//! Coverage against contracts loaded from a store

use openapi_contract_core::{CoverageReport, CoverageStore};

use crate::store::{SpecStore, StoreError};

/// Load `contract` and partition its declared operations by what `coverage` recorded.
///
/// # Errors
///
/// Returns [`StoreError`] if the contract cannot be loaded.
pub fn compute_coverage(
    store: &SpecStore,
    coverage: &CoverageStore,
    contract: &str,
) -> Result<CoverageReport, StoreError> {
    let document = store.load(contract)?;
    let report = coverage.report(contract, &document);
    tracing::debug!(
        contract,
        covered = report.covered_count,
        total = report.total,
        "coverage computed"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn five_operations_two_covered() {
        let dir = tempfile::tempdir().unwrap();
        let doc = json!({
            "openapi": "3.0.3",
            "paths": {
                "/v1/pets": {"get": {}, "post": {}},
                "/v1/pets/{petId}": {"get": {}, "put": {}, "delete": {}, "parameters": []},
                "/v1/ping": {"head": {}, "options": {}}
            }
        });
        std::fs::write(dir.path().join("petstore.json"), doc.to_string()).unwrap();
        let store = SpecStore::configured(dir.path(), vec![]);

        let mut coverage = CoverageStore::new();
        coverage.record("petstore", "get", "/v1/pets");
        coverage.record("petstore", "POST", "/v1/pets");
        coverage.record("other", "GET", "/v1/pets/{petId}");

        let report = compute_coverage(&store, &coverage, "petstore").unwrap();
        assert_eq!(report.total, 5);
        assert_eq!(report.covered_count, 2);
        assert_eq!(report.covered, ["GET /v1/pets", "POST /v1/pets"]);
        assert_eq!(
            report.uncovered,
            [
                "DELETE /v1/pets/{petId}",
                "GET /v1/pets/{petId}",
                "PUT /v1/pets/{petId}"
            ]
        );
    }

    #[test]
    fn unknown_contract_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = SpecStore::configured(dir.path(), vec![]);
        assert!(compute_coverage(&store, &CoverageStore::new(), "front").is_err());
    }
}
