//! Configuration system — YAML config, env overrides, priority merging.

pub mod loader;
pub mod schema;

// Re-export the most commonly used types.
pub use loader::{load_config, load_project_config, load_user_config};
pub use schema::{LintConfig, ToolgateConfig};
