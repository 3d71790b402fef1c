//! Test-suite adapter
//!
//! [`ContractHarness`] owns a [`SpecStore`] and a [`CoverageStore`] for the
//! length of a test run. Tests hand it captured [`Exchange`]s; coverage is
//! recorded for every response whose path matched, pass or fail.

use openapi_contract_core::config::DEFAULT_MAX_ERRORS;
use openapi_contract_core::{
    Config, CoverageReport, CoverageStore, Exchange, ExchangeError, ValidationVerdict,
};

use crate::coverage::compute_coverage;
use crate::store::{SpecStore, StoreError};
use crate::validator::{ObservedResponse, ResponseValidator};

#[derive(Debug)]
pub struct ContractHarness {
    store: SpecStore,
    coverage: CoverageStore,
    max_errors: usize,
    default_spec: Option<String>,
}

impl ContractHarness {
    #[must_use]
    pub fn new(store: SpecStore) -> Self {
        Self {
            store,
            coverage: CoverageStore::new(),
            max_errors: DEFAULT_MAX_ERRORS,
            default_spec: None,
        }
    }

    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_errors: config.max_errors,
            default_spec: config.default_spec.clone(),
            ..Self::new(SpecStore::from_config(config))
        }
    }

    #[must_use]
    pub fn with_max_errors(mut self, max_errors: usize) -> Self {
        self.max_errors = max_errors;
        self
    }

    /// Contract used by [`Self::check_exchange`] when the exchange names none.
    #[must_use]
    pub fn with_default_spec(mut self, spec: impl Into<String>) -> Self {
        self.default_spec = Some(spec.into());
        self
    }

    #[must_use]
    pub fn store(&self) -> &SpecStore {
        &self.store
    }

    #[must_use]
    pub fn coverage(&self) -> &CoverageStore {
        &self.coverage
    }

    /// Validate `exchange` against `contract` and record coverage on a path match.
    ///
    /// # Errors
    ///
    /// Returns error if the contract cannot be loaded or the body is not valid JSON.
    pub fn check(
        &mut self,
        contract: &str,
        exchange: &Exchange,
    ) -> Result<ValidationVerdict, HarnessError> {
        let body = exchange.json_body()?;
        let observed = ObservedResponse {
            method: &exchange.method,
            path: &exchange.path,
            status_code: exchange.status_code,
            body: body.as_ref(),
            content_type: exchange.content_type(),
        };

        let verdict = ResponseValidator::new(&self.store)
            .with_max_errors(self.max_errors)
            .validate_and_record(&mut self.coverage, contract, &observed)?;

        if !verdict.is_valid() {
            tracing::debug!(
                contract,
                method = %exchange.method,
                path = %exchange.path,
                status = exchange.status_code,
                "exchange violates contract"
            );
        }
        Ok(verdict)
    }

    /// [`Self::check`] against the exchange's own `spec`, else the default contract.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::NoContract`] if neither names a contract.
    pub fn check_exchange(
        &mut self,
        exchange: &Exchange,
    ) -> Result<(String, ValidationVerdict), HarnessError> {
        let contract = exchange
            .spec
            .clone()
            .or_else(|| self.default_spec.clone())
            .ok_or(HarnessError::NoContract)?;
        let verdict = self.check(&contract, exchange)?;
        Ok((contract, verdict))
    }

    /// Panic with the validator's errors unless `exchange` conforms to `contract`.
    ///
    /// # Panics
    ///
    /// Panics on a failing verdict, an unusable contract or an unparsable body.
    #[track_caller]
    pub fn assert_conforms(&mut self, contract: &str, exchange: &Exchange) {
        match self.check(contract, exchange) {
            Ok(verdict) if verdict.is_valid() => {}
            Ok(verdict) => panic!(
                "OpenAPI schema validation failed for {} {} (spec: {contract}):\n{}",
                exchange.method.to_ascii_uppercase(),
                exchange.path,
                verdict.error_message()
            ),
            Err(e) => panic!(
                "OpenAPI contract check could not run for {} {} (spec: {contract}): {e}",
                exchange.method.to_ascii_uppercase(),
                exchange.path
            ),
        }
    }

    /// Reports for `specs`, in the given order.
    ///
    /// Contracts that cannot be loaded are skipped with a warning.
    #[must_use]
    pub fn coverage_reports<S: AsRef<str>>(&self, specs: &[S]) -> Vec<CoverageReport> {
        specs
            .iter()
            .filter_map(|spec| {
                let spec = spec.as_ref();
                compute_coverage(&self.store, &self.coverage, spec)
                    .inspect_err(|e| {
                        tracing::warn!(contract = spec, error = %e, "skipping coverage report");
                    })
                    .ok()
            })
            .collect()
    }

    /// Forget recorded coverage. Loaded contracts stay cached.
    pub fn reset_coverage(&mut self) {
        self.coverage.reset();
    }
}

#[derive(Debug, thiserror::Error)]
pub enum HarnessError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Exchange(#[from] ExchangeError),
    #[error("No contract named for exchange and no default_spec configured")]
    NoContract,
}
