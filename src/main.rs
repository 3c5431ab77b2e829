use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};

use toolgate::config::load_config;
use toolgate::hooks::handlers;
use toolgate::hooks::install::{install_hooks, uninstall_hooks};
use toolgate::observability::init_logging;
use toolgate::store::{LintLogEntry, LogStore, PolicyLogEntry, LINT_LOG_FILE, POLICY_LOG_FILE};

#[derive(Parser)]
#[command(name = "toolgate")]
#[command(version, about = "Tool-call hooks for coding agents — package-manager policy and lint gate")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Install the hook scripts and settings entries into a project
    Install {
        /// Project directory (default: current dir)
        #[arg(default_value = ".")]
        directory: String,
    },
    /// Remove the hook scripts and settings entries
    Uninstall {
        /// Project directory (default: current dir)
        #[arg(default_value = ".")]
        directory: String,
    },
    /// Show recorded log entries
    Logs {
        /// Which log to show
        #[arg(value_enum)]
        kind: LogKind,
        /// Project directory (default: current dir)
        #[arg(long, default_value = ".")]
        directory: String,
        /// Print raw JSON instead of a summary
        #[arg(long)]
        json: bool,
    },
    /// Internal: PreToolUse hook handler (Bash commands)
    HookPackagePolicy,
    /// Internal: PostToolUse hook handler (file edits)
    HookLintGate,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogKind {
    /// Blocked package-manager commands
    Policy,
    /// Failing lint runs
    Lint,
}

fn main() {
    init_logging();
    let cli = Cli::parse();

    match cli.command {
        Commands::Install { directory } => cmd_install(&directory),
        Commands::Uninstall { directory } => cmd_uninstall(&directory),
        Commands::Logs {
            kind,
            directory,
            json,
        } => cmd_logs(kind, &directory, json),
        Commands::HookPackagePolicy => process::exit(handlers::handle_package_policy()),
        Commands::HookLintGate => process::exit(handlers::handle_lint_gate()),
    }
}

// ---------------------------------------------------------------------------
// CLI command implementations
// ---------------------------------------------------------------------------

fn resolve_dir(directory: &str) -> PathBuf {
    PathBuf::from(directory).canonicalize().unwrap_or_else(|e| {
        eprintln!("Error: cannot resolve directory '{}': {}", directory, e);
        process::exit(1);
    })
}

fn cmd_install(directory: &str) {
    let root = resolve_dir(directory);

    // Use the current binary's path as the default binary reference
    let binary_path = std::env::current_exe()
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_else(|_| "toolgate".to_string());

    install_hooks(&root, &binary_path).unwrap_or_else(|e| {
        eprintln!("Error: failed to install hooks: {}", e);
        process::exit(1);
    });

    eprintln!("[toolgate] Hooks installed in {}", root.display());
}

fn cmd_uninstall(directory: &str) {
    let root = resolve_dir(directory);

    uninstall_hooks(&root).unwrap_or_else(|e| {
        eprintln!("Error: failed to uninstall hooks: {}", e);
        process::exit(1);
    });

    eprintln!("[toolgate] Hooks removed from {}", root.display());
}

fn cmd_logs(kind: LogKind, directory: &str, json: bool) {
    let root = resolve_dir(directory);
    let config = load_config(Some(&root));
    let log_dir = config.log_dir_in(&root);

    match kind {
        LogKind::Policy => {
            let store = LogStore::new(log_dir.join(POLICY_LOG_FILE));
            let entries: Vec<PolicyLogEntry> = read_entries(&store);

            if json {
                print_json(&entries);
                return;
            }
            if entries.is_empty() {
                println!("No blocked commands recorded.");
                return;
            }
            println!("Blocked commands ({}):", entries.len());
            for (i, e) in entries.iter().enumerate() {
                println!(
                    "{}. {} → {}  [session: {}]",
                    i + 1,
                    e.blocked_command,
                    e.suggested_command,
                    e.session_id.as_deref().unwrap_or("-"),
                );
            }
        }
        LogKind::Lint => {
            let store = LogStore::new(log_dir.join(LINT_LOG_FILE));
            let entries: Vec<LintLogEntry> = read_entries(&store);

            if json {
                print_json(&entries);
                return;
            }
            if entries.is_empty() {
                println!("No lint failures recorded.");
                return;
            }
            println!("Lint failures ({}):", entries.len());
            for (i, e) in entries.iter().enumerate() {
                println!(
                    "{}. {}  [session: {}]",
                    i + 1,
                    e.file_path,
                    e.session_id.as_deref().unwrap_or("-"),
                );
                for line in e.errors.lines() {
                    println!("   {}", line);
                }
            }
        }
    }
}

fn read_entries<T: serde::de::DeserializeOwned>(store: &LogStore) -> Vec<T> {
    store.read_all().unwrap_or_else(|e| {
        eprintln!("Error: cannot read log {}: {}", store.path().display(), e);
        process::exit(1);
    })
}

fn print_json<T: serde::Serialize>(entries: &[T]) {
    match serde_json::to_string_pretty(entries) {
        Ok(out) => println!("{}", out),
        Err(e) => {
            eprintln!("Error: cannot serialize log entries: {}", e);
            process::exit(1);
        }
    }
}
