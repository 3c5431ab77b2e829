//! Append-only JSON-array log files.
//!
//! Each filter records its rejections in a flat JSON array on disk, one
//! sibling file per filter in the hook installation directory. A missing
//! file is equivalent to an empty array. Every append is one
//! read-all / push / write-all cycle; concurrent invocations racing on the
//! same file can lose entries. That race is a documented property of the
//! format, not something this module defends against.

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Result, ToolgateError};

/// Policy log file name, relative to the hook installation directory.
pub const POLICY_LOG_FILE: &str = "blocked-commands.json";

/// Lint log file name, relative to the hook installation directory.
pub const LINT_LOG_FILE: &str = "lint-errors.json";

/// One blocked package-manager command.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PolicyLogEntry {
    pub session_id: Option<String>,
    pub blocked_command: String,
    pub suggested_command: String,
}

/// One failing lint run against an edited file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LintLogEntry {
    pub file_path: String,
    pub errors: String,
    pub session_id: Option<String>,
}

/// Handle to one append-only log file.
pub struct LogStore {
    path: PathBuf,
}

impl LogStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every entry. A missing file reads as empty; a file that is not
    /// a JSON array is an error rather than silently overwritten.
    pub fn read_all<T: DeserializeOwned>(&self) -> Result<Vec<T>> {
        match self.read_array()? {
            Some(values) => values
                .into_iter()
                .map(|v| serde_json::from_value(v).map_err(ToolgateError::from))
                .collect(),
            None => Ok(Vec::new()),
        }
    }

    /// Append one entry, creating the file (and its parent directory) if
    /// needed. The file always round-trips as a JSON array afterwards.
    pub fn append<T: Serialize>(&self, entry: &T) -> Result<()> {
        let mut values = self.read_array()?.unwrap_or_default();
        values.push(serde_json::to_value(entry)?);

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let pretty = serde_json::to_string_pretty(&Value::Array(values))?;
        fs::write(&self.path, pretty)?;
        Ok(())
    }

    /// Raw array contents, or `None` when the file does not exist.
    fn read_array(&self) -> Result<Option<Vec<Value>>> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_str::<Value>(&contents)? {
            Value::Array(values) => Ok(Some(values)),
            _ => Err(ToolgateError::MalformedLog(self.path.clone())),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
