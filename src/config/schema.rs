//! Configuration data structures for toolgate.
//!
//! Defines the YAML config format: lint command, timeout, extension
//! allow-list, and log directory. Designed for multi-source loading with
//! serde. The package-manager rule table is deliberately NOT configurable;
//! it is the policy the hook exists to enforce.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Root configuration for toolgate.
///
/// Loaded from YAML files and environment variables, merged with
/// well-defined priority.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolgateConfig {
    /// Config format version (currently "1.0").
    #[serde(default = "default_version")]
    pub version: String,

    /// Lint gate settings.
    #[serde(default)]
    pub lint: LintConfig,

    /// Where the log files live. Defaults to `.claude/hooks/` under the
    /// project the agent is working in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<PathBuf>,
}

impl Default for ToolgateConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            lint: LintConfig::default(),
            log_dir: None,
        }
    }
}

impl ToolgateConfig {
    /// Resolve the log directory for a given project root.
    pub fn log_dir_in(&self, project_dir: &Path) -> PathBuf {
        match &self.log_dir {
            Some(dir) => dir.clone(),
            None => project_dir.join(".claude").join("hooks"),
        }
    }
}

// ---------------------------------------------------------------------------
// LintConfig
// ---------------------------------------------------------------------------

/// Settings for the lint gate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LintConfig {
    /// Linter program and leading arguments; the edited file is appended.
    #[serde(default = "default_lint_command")]
    pub command: Vec<String>,

    /// Bound on the linter's wall-clock time.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// File extensions (without the dot) the gate applies to.
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
}

impl Default for LintConfig {
    fn default() -> Self {
        Self {
            command: default_lint_command(),
            timeout_secs: default_timeout_secs(),
            extensions: default_extensions(),
        }
    }
}

impl LintConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Whether the gate applies to `path`, by extension.
    pub fn covers(&self, path: &Path) -> bool {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) => self.extensions.iter().any(|e| e == ext),
            None => false,
        }
    }
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

pub(crate) fn default_version() -> String {
    "1.0".to_string()
}

pub(crate) fn default_lint_command() -> Vec<String> {
    vec!["eslint".to_string()]
}

pub(crate) fn default_timeout_secs() -> u64 {
    30
}

pub(crate) fn default_extensions() -> Vec<String> {
    ["ts", "tsx", "js", "jsx", "mjs", "cjs"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
