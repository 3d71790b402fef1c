//! Project configuration for contract testing

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default cap on reported schema violations per response.
pub const DEFAULT_MAX_ERRORS: usize = 20;

/// Project configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding bundled contracts (`<name>.json` / `<name>.yaml`)
    #[serde(default = "default_spec_base_path")]
    pub spec_base_path: PathBuf,

    /// Prefixes removed from request paths before matching (first match only)
    #[serde(default)]
    pub strip_prefixes: Vec<String>,

    /// Contracts included in coverage reports
    #[serde(default = "default_specs")]
    pub specs: Vec<String>,

    /// Contract used when an exchange does not name one
    #[serde(default)]
    pub default_spec: Option<String>,

    /// Max schema violations reported per response (0 = unlimited)
    #[serde(default = "default_max_errors")]
    pub max_errors: usize,
}

fn default_spec_base_path() -> PathBuf {
    PathBuf::from("openapi")
}

fn default_specs() -> Vec<String> {
    vec!["front".to_string()]
}

const fn default_max_errors() -> usize {
    DEFAULT_MAX_ERRORS
}

impl Default for Config {
    fn default() -> Self {
        Self {
            spec_base_path: default_spec_base_path(),
            strip_prefixes: Vec::new(),
            specs: default_specs(),
            default_spec: None,
            max_errors: DEFAULT_MAX_ERRORS,
        }
    }
}

impl Config {
    /// Load config from file
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read or parsed
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e.to_string()))?;

        if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
        } else {
            toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
        }
    }

    /// Load from default location (.openapi-contract.toml)
    ///
    /// # Errors
    ///
    /// Returns error if a candidate file exists but cannot be read or parsed
    pub fn load_default() -> Result<Self, ConfigError> {
        let candidates = [
            ".openapi-contract.toml",
            ".openapi-contract.json",
            "openapi-contract.toml",
        ];

        for name in candidates {
            let path = Path::new(name);
            if path.exists() {
                return Self::load(path);
            }
        }

        // No config file, return default
        Ok(Self::default())
    }

    /// Resolve `spec_base_path` against `cwd` when it is relative.
    #[must_use]
    pub fn resolved_base_path(&self, cwd: &Path) -> PathBuf {
        if self.spec_base_path.is_absolute() {
            self.spec_base_path.clone()
        } else {
            cwd.join(&self.spec_base_path)
        }
    }

    /// Create example config file
    pub fn example() -> &'static str {
        r#"# openapi-contract configuration

# Directory with bundled contracts: <spec_base_path>/<name>.json (or .yaml)
spec_base_path = "openapi"

# Prefixes stripped from request paths before matching (first match wins)
strip_prefixes = ["/api"]

# Contracts reported in the coverage summary
specs = ["front"]

# Contract used for exchanges that do not name one
# default_spec = "front"

# Max schema violations reported per response (0 = unlimited)
max_errors = 20
"#
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Cannot read {0}: {1}")]
    Io(PathBuf, String),
    #[error("Parse error: {0}")]
    Parse(String),
}
