//! Multi-source config loading with priority merging.
//!
//! Priority order (highest wins):
//!   Environment vars > Project config > User config > Defaults

use std::path::Path;

use super::schema::{
    default_extensions, default_lint_command, default_timeout_secs, ToolgateConfig,
};

/// Load configuration from all available sources and merge them.
///
/// Sources (low → high priority):
///   1. Built-in defaults
///   2. User config (`~/.config/toolgate/config.yaml`)
///   3. Project config (`.toolgate.yaml` in `project_dir`)
///   4. Environment variables (`TOOLGATE_*`)
pub fn load_config(project_dir: Option<&Path>) -> ToolgateConfig {
    let mut config = ToolgateConfig::default();

    if let Some(user) = load_user_config() {
        config = merge_configs(config, user);
    }

    if let Some(dir) = project_dir {
        if let Some(project) = load_project_config(dir) {
            config = merge_configs(config, project);
        }
    }

    load_env_overrides(&mut config);

    config
}

/// Load user config from the platform-specific config directory.
///
/// Returns `None` if the file does not exist or is unparseable.
pub fn load_user_config() -> Option<ToolgateConfig> {
    let path = directories::ProjectDirs::from("dev", "toolgate", "toolgate")
        .map(|dirs| dirs.config_dir().join("config.yaml"))?;
    load_config_file(&path)
}

/// Load project config from `.toolgate.yaml` in the given directory.
///
/// Returns `None` if the file does not exist or is unparseable.
pub fn load_project_config(dir: &Path) -> Option<ToolgateConfig> {
    load_config_file(&dir.join(".toolgate.yaml"))
}

/// Apply environment variable overrides to a config in place.
///
/// Supported variables:
/// - `TOOLGATE_LINT_COMMAND` — whitespace-separated linter command
/// - `TOOLGATE_LINT_TIMEOUT_SECS` — linter timeout in seconds
/// - `TOOLGATE_LOG_DIR` — log directory override
pub fn load_env_overrides(config: &mut ToolgateConfig) {
    if let Ok(val) = std::env::var("TOOLGATE_LINT_COMMAND") {
        let command: Vec<String> = val.split_whitespace().map(String::from).collect();
        if !command.is_empty() {
            config.lint.command = command;
        }
    }

    if let Ok(val) = std::env::var("TOOLGATE_LINT_TIMEOUT_SECS") {
        if let Ok(secs) = val.trim().parse::<u64>() {
            config.lint.timeout_secs = secs;
        }
    }

    if let Ok(val) = std::env::var("TOOLGATE_LOG_DIR") {
        if !val.trim().is_empty() {
            config.log_dir = Some(val.into());
        }
    }
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

/// Try to load and parse a YAML config file. Returns `None` on any error.
fn load_config_file(path: &Path) -> Option<ToolgateConfig> {
    let contents = std::fs::read_to_string(path).ok()?;
    serde_yaml::from_str(&contents).ok()
}

/// Merge two configs: `overlay` fields take priority over `base`.
///
/// A field that still holds its built-in default is treated as "not set in
/// the overlay" — we cannot distinguish an explicit default from an omitted
/// key, and the layering order makes that the right call.
fn merge_configs(mut base: ToolgateConfig, overlay: ToolgateConfig) -> ToolgateConfig {
    if overlay.version != "1.0" {
        base.version = overlay.version;
    }
    if overlay.lint.command != default_lint_command() {
        base.lint.command = overlay.lint.command;
    }
    if overlay.lint.timeout_secs != default_timeout_secs() {
        base.lint.timeout_secs = overlay.lint.timeout_secs;
    }
    if overlay.lint.extensions != default_extensions() {
        base.lint.extensions = overlay.lint.extensions;
    }
    if overlay.log_dir.is_some() {
        base.log_dir = overlay.log_dir;
    }
    base
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
