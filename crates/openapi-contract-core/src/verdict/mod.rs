//! Verdict module - validation outcome and failure classification

mod failure;
mod result;

pub use failure::FailureKind;
pub use result::ValidationVerdict;
