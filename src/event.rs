//! Typed hook event — the JSON document the agent pipes to stdin.
//!
//! Absent fields are a valid, non-error state (the filter simply does not
//! apply); malformed JSON is a hard error surfaced as exit code 1. The two
//! cases must never be conflated, so parsing is strict and field access
//! returns `Option`.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::Result;

/// One tool-call event as delivered by the agent host.
///
/// Unknown fields are ignored; the host sends more than we consume.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HookEvent {
    /// Opaque conversation identifier, carried through to log entries.
    #[serde(default)]
    pub session_id: Option<String>,

    /// Project directory the agent is operating in.
    #[serde(default)]
    pub cwd: Option<PathBuf>,

    /// Parameters of the tool call being filtered.
    #[serde(default)]
    pub tool_input: ToolInput,
}

/// The subset of tool parameters the filters care about.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ToolInput {
    /// Shell command (Bash tool calls).
    #[serde(default)]
    pub command: Option<String>,

    /// Edit target (Write/Edit tool calls).
    #[serde(default)]
    pub file_path: Option<String>,
}

impl HookEvent {
    /// Parse a raw stdin payload. Malformed JSON is an error, not a no-op.
    pub fn parse(input: &str) -> Result<Self> {
        Ok(serde_json::from_str(input)?)
    }

    /// The shell command, if present and non-empty.
    pub fn command(&self) -> Option<&str> {
        self.tool_input
            .command
            .as_deref()
            .filter(|c| !c.trim().is_empty())
    }

    /// The edit target, if present.
    pub fn file_path(&self) -> Option<&Path> {
        self.tool_input.file_path.as_deref().map(Path::new)
    }

    /// Resolve the working directory from the event's `cwd` field,
    /// falling back to `std::env::current_dir()`.
    pub fn resolve_cwd(&self) -> PathBuf {
        self.cwd
            .clone()
            .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_event() {
        let event = HookEvent::parse(
            r#"{"session_id": "abc-123", "cwd": "/tmp/project",
                "tool_input": {"command": "npm install"}}"#,
        )
        .unwrap();

        assert_eq!(event.session_id.as_deref(), Some("abc-123"));
        assert_eq!(event.resolve_cwd(), PathBuf::from("/tmp/project"));
        assert_eq!(event.command(), Some("npm install"));
        assert!(event.file_path().is_none());
    }

    #[test]
    fn missing_fields_are_not_errors() {
        let event = HookEvent::parse("{}").unwrap();
        assert!(event.session_id.is_none());
        assert!(event.command().is_none());
        assert!(event.file_path().is_none());
    }

    #[test]
    fn empty_command_reads_as_absent() {
        let event = HookEvent::parse(r#"{"tool_input": {"command": "   "}}"#).unwrap();
        assert!(event.command().is_none());
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(HookEvent::parse("{not json").is_err());
        assert!(HookEvent::parse("").is_err());
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let event = HookEvent::parse(
            r#"{"hook_event_name": "PreToolUse", "tool_name": "Bash",
                "tool_input": {"command": "ls", "description": "list files"}}"#,
        )
        .unwrap();
        assert_eq!(event.command(), Some("ls"));
    }

    #[test]
    fn resolve_cwd_falls_back_to_current_dir() {
        let event = HookEvent::parse("{}").unwrap();
        assert!(!event.resolve_cwd().as_os_str().is_empty());
    }
}
