//! openapi-contract-validator: check HTTP responses against OpenAPI contracts
//!
//! Contracts are loaded by name from a [`SpecStore`]; a [`ResponseValidator`]
//! resolves the exercised operation and delegates body checks to a
//! [`SchemaEngine`]. [`ContractHarness`] bundles both with a coverage store
//! for use from test suites.

pub mod coverage;
pub mod engine;
pub mod harness;
pub mod store;
pub mod validator;

pub use coverage::compute_coverage;
pub use engine::{JsonSchemaEngine, SchemaEngine, SchemaViolation};
pub use harness::{ContractHarness, HarnessError};
pub use store::{SpecStore, StoreError};
pub use validator::{ObservedResponse, ResponseValidator};
