//! openapi-contract-core: pure building blocks for OpenAPI contract tests
//!
//! Path-template matching, OpenAPI → Draft-07 schema conversion, validation
//! verdicts, endpoint coverage bookkeeping and report rendering. Nothing here
//! reads contract files or evaluates JSON Schema; see `openapi-contract-validator`.

pub mod config;
pub mod convert;
pub mod coverage;
pub mod path_matcher;
pub mod report;
pub mod schema;
pub mod verdict;
pub mod version;

pub use config::{Config, ConfigError};
pub use convert::convert_schema;
pub use coverage::{CoverageReport, CoverageStore, CoverageSummary};
pub use path_matcher::PathMatcher;
pub use schema::{Exchange, ExchangeError};
pub use verdict::{FailureKind, ValidationVerdict};
pub use version::OpenApiVersion;
