//! Hook installation — writes shell scripts and config entries for the
//! agent host.
//!
//! [`install_hooks`] performs two non-destructive operations:
//!
//! 1. **Shell scripts** — writes two executable bash scripts into
//!    `.claude/hooks/` that delegate to `toolgate hook-*` subcommands. The
//!    scripts `exec` the binary so its exit code reaches the host intact.
//! 2. **`settings.json`** — appends matching hook entries into
//!    `.claude/settings.json` so the host invokes the scripts around Bash
//!    commands and file edits.
//!
//! All JSON edits are additive and idempotent: existing entries outside the
//! toolgate namespace are preserved verbatim, and installing twice changes
//! nothing. [`uninstall_hooks`] reverses both steps, stripping only our
//! entries.

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;

use serde_json::{json, Map, Value};

use crate::error::{Result, ToolgateError};

// ---------------------------------------------------------------------------
// Hook table
// ---------------------------------------------------------------------------

/// Metadata for a single hook script.
struct HookScript {
    filename: &'static str,
    subcommand: &'static str,
    /// Host lifecycle event the hook attaches to.
    event: &'static str,
    /// Tool-name matcher within that event.
    matcher: &'static str,
    comment: &'static str,
}

/// All hook scripts to install.
const HOOK_SCRIPTS: &[HookScript] = &[
    HookScript {
        filename: "package-policy.sh",
        subcommand: "hook-package-policy",
        event: "PreToolUse",
        matcher: "Bash",
        comment: "toolgate package-policy hook — enforce yarn for package commands",
    },
    HookScript {
        filename: "lint-gate.sh",
        subcommand: "hook-lint-gate",
        event: "PostToolUse",
        matcher: "Write|Edit|MultiEdit",
        comment: "toolgate lint-gate hook — lint edited script files",
    },
];

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Install toolgate hooks and settings entries into `project_dir`.
///
/// - `project_dir` — root of the project (where `.claude/` lives).
/// - `binary_path` — path or name of the `toolgate` binary.
///
/// This function is idempotent: running it twice produces the same result.
pub fn install_hooks(project_dir: &Path, binary_path: &str) -> Result<()> {
    let hooks_dir = project_dir.join(".claude").join("hooks");
    let settings_path = project_dir.join(".claude").join("settings.json");

    write_shell_scripts(&hooks_dir, binary_path)?;
    merge_settings(&settings_path)?;

    eprintln!("[toolgate] Hooks installed successfully.");
    Ok(())
}

/// Remove the toolgate scripts and strip our entries from settings.json.
///
/// Entries written by anything else are left untouched; a missing
/// installation is a silent no-op.
pub fn uninstall_hooks(project_dir: &Path) -> Result<()> {
    let hooks_dir = project_dir.join(".claude").join("hooks");
    for hook in HOOK_SCRIPTS {
        let path = hooks_dir.join(hook.filename);
        if path.exists() {
            fs::remove_file(&path)?;
            eprintln!("[toolgate] Removed {}", path.display());
        }
    }

    let settings_path = project_dir.join(".claude").join("settings.json");
    if settings_path.exists() {
        strip_settings(&settings_path)?;
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Shell scripts
// ---------------------------------------------------------------------------

/// Render a hook script body.
///
/// `exec` keeps the subcommand's exit code as the script's exit code —
/// the host reads the decision from it.
fn render_script(hook: &HookScript, binary_path: &str) -> String {
    format!(
        r#"#!/usr/bin/env bash
# {comment}
TOOLGATE_BIN="${{TOOLGATE_BIN:-{binary_path}}}"
exec "$TOOLGATE_BIN" {subcommand}
"#,
        comment = hook.comment,
        binary_path = binary_path,
        subcommand = hook.subcommand,
    )
}

/// Write all hook shell scripts into `hooks_dir`, creating it if needed.
fn write_shell_scripts(hooks_dir: &Path, binary_path: &str) -> Result<()> {
    fs::create_dir_all(hooks_dir)?;

    for hook in HOOK_SCRIPTS {
        let path = hooks_dir.join(hook.filename);
        fs::write(&path, render_script(hook, binary_path))?;
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755))?;
        eprintln!("[toolgate] Wrote {}", path.display());
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// settings.json merge
// ---------------------------------------------------------------------------

/// The command string registered for a hook in settings.json.
fn hook_command(hook: &HookScript) -> String {
    format!("bash .claude/hooks/{}", hook.filename)
}

/// Whether a settings entry already references one of our script files.
fn references_script(entry: &Value, filename: &str) -> bool {
    entry["hooks"]
        .as_array()
        .map(|inner| {
            inner.iter().any(|h| {
                h["command"]
                    .as_str()
                    .is_some_and(|cmd| cmd.contains(filename))
            })
        })
        .unwrap_or(false)
}

/// Read, merge, and write `.claude/settings.json`.
///
/// Our entries are appended to the per-event arrays only when absent;
/// everything else in the file is preserved.
fn merge_settings(settings_path: &Path) -> Result<()> {
    let mut root = read_json_or_empty_object(settings_path)?;
    let map = root
        .as_object_mut()
        .ok_or_else(|| ToolgateError::Other("settings.json is not a JSON object".to_string()))?;

    let hooks = map
        .entry("hooks")
        .or_insert_with(|| json!({}))
        .as_object_mut()
        .ok_or_else(|| ToolgateError::Other("settings.json `hooks` is not an object".to_string()))?;

    for hook in HOOK_SCRIPTS {
        let entries = hooks
            .entry(hook.event)
            .or_insert_with(|| json!([]))
            .as_array_mut()
            .ok_or_else(|| {
                ToolgateError::Other(format!("settings.json hooks.{} is not an array", hook.event))
            })?;

        if entries.iter().any(|e| references_script(e, hook.filename)) {
            continue;
        }

        entries.push(json!({
            "matcher": hook.matcher,
            "hooks": [{
                "type": "command",
                "command": hook_command(hook),
            }]
        }));
    }

    if let Some(parent) = settings_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(settings_path, serde_json::to_string_pretty(&root)?)?;
    eprintln!("[toolgate] Merged hooks into {}", settings_path.display());
    Ok(())
}

/// Remove our entries from the per-event arrays, dropping arrays (and the
/// `hooks` object) that end up empty because of it.
fn strip_settings(settings_path: &Path) -> Result<()> {
    let mut root = read_json_or_empty_object(settings_path)?;
    let hooks_empty = match root.get_mut("hooks").and_then(|h| h.as_object_mut()) {
        Some(hooks) => {
            for hook in HOOK_SCRIPTS {
                if let Some(entries) = hooks.get_mut(hook.event).and_then(|e| e.as_array_mut()) {
                    entries.retain(|e| !references_script(e, hook.filename));
                }
            }
            hooks.retain(|_, v| v.as_array().map(|a| !a.is_empty()).unwrap_or(true));
            hooks.is_empty()
        }
        None => return Ok(()),
    };

    if hooks_empty {
        if let Some(map) = root.as_object_mut() {
            map.remove("hooks");
        }
    }

    fs::write(settings_path, serde_json::to_string_pretty(&root)?)?;
    eprintln!("[toolgate] Stripped hooks from {}", settings_path.display());
    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Read a JSON file and parse it as `Value`, returning an empty object if
/// the file doesn't exist or is empty.
fn read_json_or_empty_object(path: &Path) -> Result<Value> {
    match fs::read_to_string(path) {
        Ok(contents) if !contents.trim().is_empty() => Ok(serde_json::from_str(&contents)?),
        _ => Ok(Value::Object(Map::new())),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
