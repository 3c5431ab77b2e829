//! Hook runtime handlers.
//!
//! Each handler reads one JSON event from stdin, evaluates it, and signals
//! its decision through the process exit code. Diagnostics and correction
//! messages go to stderr; stdout stays silent.
//!
//! # Contract
//!
//! - **Exit 0** — allow (not applicable, clean, or infrastructure missing).
//! - **Exit 1** — internal error (malformed input, unexpected failure).
//! - **Exit 2** — reject; the agent should correct its action and retry.
//! - **Never panic.** Handler glue wraps evaluation in `catch_unwind` and
//!   turns panics into exit 1.

use std::io::Read;
use std::path::PathBuf;

use crate::config::{load_config, ToolgateConfig};
use crate::error::Result;
use crate::event::HookEvent;
use crate::lint::{run_linter, LintOutcome};
use crate::policy::{self, PolicyViolation};
use crate::store::{LintLogEntry, LogStore, PolicyLogEntry, LINT_LOG_FILE, POLICY_LOG_FILE};

/// Exit code: let the tool call proceed.
pub const EXIT_ALLOW: i32 = 0;
/// Exit code: the hook itself failed.
pub const EXIT_ERROR: i32 = 1;
/// Exit code: block the tool call and ask the agent to correct it.
pub const EXIT_REJECT: i32 = 2;

/// Header printed above captured linter output on a rejection.
pub const LINT_HEADER: &str = "Lint problems in edited file — fix these before continuing:";

// ---------------------------------------------------------------------------
// Decision
// ---------------------------------------------------------------------------

/// What a filter decided about one tool call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Proceed unchanged, silently.
    Allow,
    /// Proceed, but surface a notice on stderr.
    AllowWithNotice(String),
    /// Block; the message tells the agent how to correct the action.
    Reject(String),
}

impl Decision {
    pub fn exit_code(&self) -> i32 {
        match self {
            Decision::Allow | Decision::AllowWithNotice(_) => EXIT_ALLOW,
            Decision::Reject(_) => EXIT_REJECT,
        }
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            Decision::Allow => None,
            Decision::AllowWithNotice(msg) | Decision::Reject(msg) => Some(msg),
        }
    }
}

// ---------------------------------------------------------------------------
// HookContext
// ---------------------------------------------------------------------------

/// Everything an evaluation needs beyond the event itself.
pub struct HookContext {
    pub config: ToolgateConfig,
    pub log_dir: PathBuf,
}

impl HookContext {
    /// Build a context for an incoming event: load config layered on the
    /// event's project directory and resolve the log directory.
    pub fn from_event(event: &HookEvent) -> Self {
        let cwd = event.resolve_cwd();
        let config = load_config(Some(&cwd));
        let log_dir = config.log_dir_in(&cwd);
        Self { config, log_dir }
    }

    fn policy_store(&self) -> LogStore {
        LogStore::new(self.log_dir.join(POLICY_LOG_FILE))
    }

    fn lint_store(&self) -> LogStore {
        LogStore::new(self.log_dir.join(LINT_LOG_FILE))
    }
}

// ---------------------------------------------------------------------------
// Command-policy filter
// ---------------------------------------------------------------------------

/// Evaluate a shell command against the package-manager policy.
///
/// A violation is logged and rejected with a correction message; anything
/// else is allowed silently.
pub fn evaluate_package_policy(event: &HookEvent, ctx: &HookContext) -> Result<Decision> {
    let command = match event.command() {
        Some(c) => c,
        None => return Ok(Decision::Allow),
    };

    let violation = match policy::evaluate_command(command) {
        Some(v) => v,
        None => return Ok(Decision::Allow),
    };

    tracing::debug!(program = violation.program, "blocking package-manager command");

    ctx.policy_store().append(&PolicyLogEntry {
        session_id: event.session_id.clone(),
        blocked_command: command.to_string(),
        suggested_command: violation.suggested.clone(),
    })?;

    Ok(Decision::Reject(correction_message(&violation)))
}

fn correction_message(violation: &PolicyViolation) -> String {
    format!(
        "This repository uses yarn as its package manager; `{}` is not allowed.\n\
         Run this instead:\n  {}",
        violation.program, violation.suggested,
    )
}

// ---------------------------------------------------------------------------
// Lint-gate filter
// ---------------------------------------------------------------------------

/// Evaluate a file edit against the lint gate.
///
/// Non-script files, missing files, a missing linter, and timeouts all
/// allow; only a real lint failure with output rejects.
pub fn evaluate_lint_gate(event: &HookEvent, ctx: &HookContext) -> Result<Decision> {
    let path = match event.file_path() {
        Some(p) => p,
        None => return Ok(Decision::Allow),
    };

    if !ctx.config.lint.covers(path) {
        return Ok(Decision::Allow);
    }
    if !path.exists() {
        return Ok(Decision::Allow);
    }

    match run_linter(&ctx.config.lint.command, path, ctx.config.lint.timeout())? {
        LintOutcome::Clean => Ok(Decision::Allow),
        LintOutcome::ToolMissing => {
            tracing::debug!("linter not installed; skipping check");
            Ok(Decision::Allow)
        }
        LintOutcome::TimedOut => Ok(Decision::AllowWithNotice(format!(
            "[toolgate] lint timed out after {}s for {}; allowing the edit",
            ctx.config.lint.timeout_secs,
            path.display(),
        ))),
        LintOutcome::Violations { output } => {
            ctx.lint_store().append(&LintLogEntry {
                file_path: path.to_string_lossy().into_owned(),
                errors: output.clone(),
                session_id: event.session_id.clone(),
            })?;
            Ok(Decision::Reject(format!("{LINT_HEADER}\n{output}")))
        }
    }
}

// ---------------------------------------------------------------------------
// Binary glue
// ---------------------------------------------------------------------------

/// **Hook: `PreToolUse` (Bash)** — package-manager policy.
pub fn handle_package_policy() -> i32 {
    run_handler("package-policy", evaluate_package_policy)
}

/// **Hook: `PostToolUse` (Write|Edit|MultiEdit)** — lint gate.
pub fn handle_lint_gate() -> i32 {
    run_handler("lint-gate", evaluate_lint_gate)
}

/// Read stdin, parse, evaluate, and map the result onto the exit-code
/// contract. Every failure path lands on `EXIT_ERROR` with a diagnostic.
fn run_handler(name: &str, eval: fn(&HookEvent, &HookContext) -> Result<Decision>) -> i32 {
    let result = std::panic::catch_unwind(|| {
        let mut input = String::new();
        if let Err(e) = std::io::stdin().read_to_string(&mut input) {
            eprintln!("[toolgate] {name}: cannot read stdin: {e}");
            return EXIT_ERROR;
        }

        let event = match HookEvent::parse(&input) {
            Ok(event) => event,
            Err(e) => {
                eprintln!("[toolgate] {name}: malformed input: {e}");
                return EXIT_ERROR;
            }
        };

        let ctx = HookContext::from_event(&event);
        match eval(&event, &ctx) {
            Ok(decision) => {
                if let Some(msg) = decision.message() {
                    eprintln!("{msg}");
                }
                decision.exit_code()
            }
            Err(e) => {
                eprintln!("[toolgate] {name}: {e}");
                EXIT_ERROR
            }
        }
    });

    result.unwrap_or_else(|_| {
        eprintln!("[toolgate] {name}: caught panic");
        EXIT_ERROR
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LintConfig;
    use tempfile::TempDir;

    fn test_ctx(tmp: &TempDir) -> HookContext {
        HookContext {
            config: ToolgateConfig::default(),
            log_dir: tmp.path().join(".claude/hooks"),
        }
    }

    fn event(json: &str) -> HookEvent {
        HookEvent::parse(json).unwrap()
    }

    fn policy_entries(ctx: &HookContext) -> Vec<PolicyLogEntry> {
        ctx.policy_store().read_all().unwrap()
    }

    fn lint_entries(ctx: &HookContext) -> Vec<LintLogEntry> {
        ctx.lint_store().read_all().unwrap()
    }

    // -- package policy ----------------------------------------------------

    #[test]
    fn policy_allows_missing_command() {
        let tmp = TempDir::new().unwrap();
        let ctx = test_ctx(&tmp);

        let decision = evaluate_package_policy(&event("{}"), &ctx).unwrap();
        assert_eq!(decision, Decision::Allow);
        assert!(policy_entries(&ctx).is_empty(), "no-op must not grow the log");
    }

    #[test]
    fn policy_allows_clean_command() {
        let tmp = TempDir::new().unwrap();
        let ctx = test_ctx(&tmp);

        let decision = evaluate_package_policy(
            &event(r#"{"tool_input": {"command": "yarn install"}}"#),
            &ctx,
        )
        .unwrap();
        assert_eq!(decision, Decision::Allow);
        assert!(policy_entries(&ctx).is_empty());
    }

    #[test]
    fn policy_rejects_npm_and_logs() {
        let tmp = TempDir::new().unwrap();
        let ctx = test_ctx(&tmp);

        let decision = evaluate_package_policy(
            &event(r#"{"session_id": "s1", "tool_input": {"command": "npm install lodash"}}"#),
            &ctx,
        )
        .unwrap();

        assert_eq!(decision.exit_code(), EXIT_REJECT);
        let msg = decision.message().unwrap();
        assert!(msg.contains("yarn install lodash"));

        let entries = policy_entries(&ctx);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].session_id.as_deref(), Some("s1"));
        assert_eq!(entries[0].blocked_command, "npm install lodash");
        assert_eq!(entries[0].suggested_command, "yarn install lodash");
    }

    #[test]
    fn policy_allows_pnpm_lock_substring() {
        let tmp = TempDir::new().unwrap();
        let ctx = test_ctx(&tmp);

        let decision = evaluate_package_policy(
            &event(r#"{"tool_input": {"command": "echo pnpm-lock.yaml"}}"#),
            &ctx,
        )
        .unwrap();
        assert_eq!(decision, Decision::Allow);
        assert!(policy_entries(&ctx).is_empty());
    }

    #[test]
    fn policy_logs_accumulate_across_invocations() {
        let tmp = TempDir::new().unwrap();
        let ctx = test_ctx(&tmp);

        for cmd in ["npm install", "pnpm add react", "bunx vitest"] {
            let json = format!(r#"{{"tool_input": {{"command": "{cmd}"}}}}"#);
            let decision = evaluate_package_policy(&event(&json), &ctx).unwrap();
            assert_eq!(decision.exit_code(), EXIT_REJECT);
        }

        assert_eq!(policy_entries(&ctx).len(), 3);
    }

    #[test]
    fn policy_without_session_id_logs_null() {
        let tmp = TempDir::new().unwrap();
        let ctx = test_ctx(&tmp);

        evaluate_package_policy(&event(r#"{"tool_input": {"command": "npm ci"}}"#), &ctx).unwrap();

        let entries = policy_entries(&ctx);
        assert_eq!(entries[0].session_id, None);
    }

    // -- lint gate ----------------------------------------------------------

    fn lint_ctx(tmp: &TempDir, command: &[&str]) -> HookContext {
        HookContext {
            config: ToolgateConfig {
                lint: LintConfig {
                    command: command.iter().map(|s| s.to_string()).collect(),
                    ..Default::default()
                },
                ..Default::default()
            },
            log_dir: tmp.path().join(".claude/hooks"),
        }
    }

    fn edit_event(tmp: &TempDir, file_name: &str) -> (HookEvent, PathBuf) {
        let path = tmp.path().join(file_name);
        std::fs::write(&path, "export const x = 1\n").unwrap();
        let json = format!(
            r#"{{"session_id": "s2", "tool_input": {{"file_path": "{}"}}}}"#,
            path.display()
        );
        (event(&json), path)
    }

    #[test]
    fn lint_allows_missing_file_path() {
        let tmp = TempDir::new().unwrap();
        let ctx = lint_ctx(&tmp, &["true"]);
        let decision = evaluate_lint_gate(&event("{}"), &ctx).unwrap();
        assert_eq!(decision, Decision::Allow);
    }

    #[test]
    fn lint_allows_non_script_extension() {
        let tmp = TempDir::new().unwrap();
        // A failing linter proves the tool is never invoked for .py files.
        let ctx = lint_ctx(&tmp, &["bash", "-c", "echo problems; exit 1"]);
        let (ev, _) = edit_event(&tmp, "script.py");

        let decision = evaluate_lint_gate(&ev, &ctx).unwrap();
        assert_eq!(decision, Decision::Allow);
        assert!(lint_entries(&ctx).is_empty());
    }

    #[test]
    fn lint_allows_nonexistent_file() {
        let tmp = TempDir::new().unwrap();
        let ctx = lint_ctx(&tmp, &["bash", "-c", "echo problems; exit 1"]);
        let json = format!(
            r#"{{"tool_input": {{"file_path": "{}"}}}}"#,
            tmp.path().join("ghost.ts").display()
        );

        let decision = evaluate_lint_gate(&event(&json), &ctx).unwrap();
        assert_eq!(decision, Decision::Allow);
        assert!(lint_entries(&ctx).is_empty());
    }

    #[test]
    fn lint_rejects_failing_file_and_logs() {
        let tmp = TempDir::new().unwrap();
        let ctx = lint_ctx(&tmp, &["bash", "-c", "echo '1 problem (no-explicit-any)'; exit 1"]);
        let (ev, path) = edit_event(&tmp, "app.ts");

        let decision = evaluate_lint_gate(&ev, &ctx).unwrap();
        assert_eq!(decision.exit_code(), EXIT_REJECT);

        let msg = decision.message().unwrap();
        assert!(msg.starts_with(LINT_HEADER));
        assert!(msg.contains("no-explicit-any"));

        let entries = lint_entries(&ctx);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].file_path, path.to_string_lossy());
        assert_eq!(entries[0].session_id.as_deref(), Some("s2"));
        assert!(entries[0].errors.contains("no-explicit-any"));
    }

    #[test]
    fn lint_allows_clean_file_without_logging() {
        let tmp = TempDir::new().unwrap();
        let ctx = lint_ctx(&tmp, &["true"]);
        let (ev, _) = edit_event(&tmp, "app.ts");

        let decision = evaluate_lint_gate(&ev, &ctx).unwrap();
        assert_eq!(decision, Decision::Allow);
        assert!(lint_entries(&ctx).is_empty());
    }

    #[test]
    fn lint_allows_when_tool_missing() {
        let tmp = TempDir::new().unwrap();
        let ctx = lint_ctx(&tmp, &["definitely-not-an-installed-linter"]);
        let (ev, _) = edit_event(&tmp, "app.tsx");

        let decision = evaluate_lint_gate(&ev, &ctx).unwrap();
        assert_eq!(decision, Decision::Allow);
    }

    #[test]
    fn lint_timeout_allows_with_notice() {
        let tmp = TempDir::new().unwrap();
        let mut ctx = lint_ctx(&tmp, &["bash", "-c", "sleep 30"]);
        ctx.config.lint.timeout_secs = 0;
        let (ev, _) = edit_event(&tmp, "app.ts");

        let decision = evaluate_lint_gate(&ev, &ctx).unwrap();
        assert_eq!(decision.exit_code(), EXIT_ALLOW);
        assert!(decision.message().unwrap().contains("timed out"));
        assert!(lint_entries(&ctx).is_empty());
    }

    #[test]
    fn lint_nonzero_without_output_allows() {
        let tmp = TempDir::new().unwrap();
        let ctx = lint_ctx(&tmp, &["false"]);
        let (ev, _) = edit_event(&tmp, "app.ts");

        let decision = evaluate_lint_gate(&ev, &ctx).unwrap();
        assert_eq!(decision, Decision::Allow);
        assert!(lint_entries(&ctx).is_empty());
    }

    // -- decision mapping ----------------------------------------------------

    #[test]
    fn decision_exit_codes_match_contract() {
        assert_eq!(Decision::Allow.exit_code(), 0);
        assert_eq!(Decision::AllowWithNotice("n".into()).exit_code(), 0);
        assert_eq!(Decision::Reject("r".into()).exit_code(), 2);
    }
}
