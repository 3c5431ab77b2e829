//! External lint invocation — runs the configured linter against one file
//! with a bounded wait.
//!
//! The linter is infrastructure, not policy: if it is missing the check
//! degrades to allow, and if it hangs the timeout turns into an allow with
//! a notice. Only a real non-zero exit with output blocks the edit.

use std::io::ErrorKind;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use crate::error::{Result, ToolgateError};

/// Outcome of one linter run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LintOutcome {
    /// Linter exited zero, or non-zero without producing any output.
    Clean,
    /// Linter exited non-zero and reported problems.
    Violations { output: String },
    /// Linter did not finish within the timeout.
    TimedOut,
    /// Linter program is not installed.
    ToolMissing,
}

/// Run `command` (program + leading args) with `file` appended, capturing
/// combined stdout+stderr, waiting at most `timeout`.
///
/// The child is spawned under a minimal current-thread runtime; on timeout
/// it is killed via `kill_on_drop` so nothing outlives the hook process.
pub fn run_linter(command: &[String], file: &Path, timeout: Duration) -> Result<LintOutcome> {
    let (program, args) = match command.split_first() {
        Some(split) => split,
        // An empty lint command means linting is effectively disabled.
        None => return Ok(LintOutcome::ToolMissing),
    };

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    rt.block_on(async {
        let mut cmd = tokio::process::Command::new(program);
        cmd.args(args)
            .arg(file)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let child = match cmd.spawn() {
            Ok(child) => child,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(LintOutcome::ToolMissing),
            Err(e) => return Err(ToolgateError::Io(e)),
        };

        match tokio::time::timeout(timeout, child.wait_with_output()).await {
            // Dropping the future kills the child (kill_on_drop).
            Err(_) => Ok(LintOutcome::TimedOut),
            Ok(output) => {
                let output = output?;
                let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
                combined.push_str(&String::from_utf8_lossy(&output.stderr));

                if output.status.success() || combined.trim().is_empty() {
                    Ok(LintOutcome::Clean)
                } else {
                    Ok(LintOutcome::Violations { output: combined })
                }
            }
        }
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const TIMEOUT: Duration = Duration::from_secs(30);

    fn cmd(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn clean_when_linter_exits_zero() {
        // `true` ignores its file argument and exits 0.
        let outcome = run_linter(&cmd(&["true"]), Path::new("x.ts"), TIMEOUT).unwrap();
        assert_eq!(outcome, LintOutcome::Clean);
    }

    #[test]
    fn violations_when_linter_fails_with_output() {
        let outcome = run_linter(
            &cmd(&["bash", "-c", "echo 'x.ts: unexpected any'; exit 1"]),
            Path::new("x.ts"),
            TIMEOUT,
        )
        .unwrap();

        match outcome {
            LintOutcome::Violations { output } => {
                assert!(output.contains("unexpected any"));
            }
            other => panic!("expected violations, got {other:?}"),
        }
    }

    #[test]
    fn stderr_counts_as_output() {
        let outcome = run_linter(
            &cmd(&["bash", "-c", "echo 'parse error' >&2; exit 2"]),
            Path::new("x.ts"),
            TIMEOUT,
        )
        .unwrap();

        match outcome {
            LintOutcome::Violations { output } => assert!(output.contains("parse error")),
            other => panic!("expected violations, got {other:?}"),
        }
    }

    #[test]
    fn clean_when_nonzero_but_silent() {
        // Non-zero exit without output is not a lint finding.
        let outcome = run_linter(&cmd(&["false"]), Path::new("x.ts"), TIMEOUT).unwrap();
        assert_eq!(outcome, LintOutcome::Clean);
    }

    #[test]
    fn tool_missing_when_program_not_installed() {
        let outcome = run_linter(
            &cmd(&["definitely-not-an-installed-linter"]),
            Path::new("x.ts"),
            TIMEOUT,
        )
        .unwrap();
        assert_eq!(outcome, LintOutcome::ToolMissing);
    }

    #[test]
    fn tool_missing_when_command_empty() {
        let outcome = run_linter(&[], Path::new("x.ts"), TIMEOUT).unwrap();
        assert_eq!(outcome, LintOutcome::ToolMissing);
    }

    #[test]
    fn times_out_on_hanging_linter() {
        // The file path lands in $0 of the -c script, so sleep gets no
        // extra operand.
        let outcome = run_linter(
            &cmd(&["bash", "-c", "sleep 30"]),
            Path::new("x.ts"),
            Duration::from_millis(200),
        )
        .unwrap();
        assert_eq!(outcome, LintOutcome::TimedOut);
    }

    #[test]
    fn file_path_is_passed_to_linter() {
        let outcome = run_linter(
            &cmd(&["bash", "-c", r#"echo "checking $1"; exit 1"#, "lint"]),
            &PathBuf::from("src/app.ts"),
            TIMEOUT,
        )
        .unwrap();

        match outcome {
            LintOutcome::Violations { output } => assert!(output.contains("checking src/app.ts")),
            other => panic!("expected violations, got {other:?}"),
        }
    }
}
