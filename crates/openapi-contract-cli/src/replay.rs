//! Replaying recorded exchanges (`*.jsonl`) against contracts

use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::Serialize;

use openapi_contract_core::Exchange;
use openapi_contract_validator::{ContractHarness, HarnessError};

/// Recorded exchanges with their 1-based line numbers. Blank lines are skipped.
pub fn load_exchanges(path: &Path) -> Result<Vec<(usize, Exchange)>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Cannot read exchange log {}", path.display()))?;

    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(idx, line)| {
            let exchange = serde_json::from_str::<Exchange>(line)
                .with_context(|| format!("{}:{}: invalid exchange", path.display(), idx + 1))?;
            Ok((idx + 1, exchange))
        })
        .collect()
}

/// One exchange that did not conform.
#[derive(Debug, Serialize)]
pub struct ReplayFailure {
    pub line: usize,
    pub contract: String,
    pub method: String,
    pub path: String,
    pub status_code: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_path: Option<String>,
    pub errors: Vec<String>,
}

#[derive(Debug, Default, Serialize)]
pub struct ReplayOutcome {
    pub total: usize,
    pub passed: usize,
    pub failures: Vec<ReplayFailure>,
    /// Contracts exercised, in first-seen order
    #[serde(skip)]
    pub contracts: Vec<String>,
}

impl ReplayOutcome {
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        i32::from(!self.failures.is_empty())
    }
}

/// Check every exchange, recording coverage in `harness`.
///
/// Unparsable bodies count as failures; an unusable contract aborts the replay.
pub fn replay(harness: &mut ContractHarness, exchanges: &[(usize, Exchange)]) -> Result<ReplayOutcome> {
    let mut outcome = ReplayOutcome::default();

    for (line, exchange) in exchanges {
        outcome.total += 1;
        let failure = |contract: &str, matched_path: Option<&str>, errors: Vec<String>| ReplayFailure {
            line: *line,
            contract: contract.to_string(),
            method: exchange.method.to_ascii_uppercase(),
            path: exchange.path.clone(),
            status_code: exchange.status_code,
            matched_path: matched_path.map(str::to_string),
            errors,
        };

        match harness.check_exchange(exchange) {
            Ok((contract, verdict)) => {
                if !outcome.contracts.contains(&contract) {
                    outcome.contracts.push(contract.clone());
                }
                if verdict.is_valid() {
                    outcome.passed += 1;
                } else {
                    outcome.failures.push(failure(
                        &contract,
                        verdict.matched_path(),
                        verdict.errors().to_vec(),
                    ));
                }
            }
            Err(HarnessError::Exchange(e)) => {
                let contract = exchange.spec.as_deref().unwrap_or("-");
                outcome.failures.push(failure(contract, None, vec![e.to_string()]));
            }
            Err(e) => bail!("line {line}: {e}"),
        }
    }

    tracing::debug!(
        total = outcome.total,
        failures = outcome.failures.len(),
        "replay finished"
    );
    Ok(outcome)
}
