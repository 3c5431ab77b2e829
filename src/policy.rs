//! Package-manager policy — detects disallowed package-manager invocations
//! and computes the yarn-based replacement command.
//!
//! Matching is case-sensitive and whole-word, where a word is a
//! whitespace-delimited token: `pnpm-lock.yaml` contains no whole-word
//! `pnpm` and must not trigger. Rules are checked in fixed priority order
//! and the first hit wins.

use regex::{Captures, Regex};

/// Disallowed program → approved replacement, in priority order.
const RULE_TABLE: &[(&str, &str)] = &[
    ("npm", "yarn"),
    ("npx", "yarn dlx"),
    ("bun", "yarn"),
    ("bunx", "yarn dlx"),
    ("pnpm", "yarn"),
];

/// A single compiled policy rule.
pub struct PolicyRule {
    /// The disallowed program name.
    pub program: &'static str,
    /// What the program is rewritten to.
    pub replacement: &'static str,
    pattern: Regex,
}

impl PolicyRule {
    fn new(program: &'static str, replacement: &'static str) -> Self {
        // (^|\s)...(\s|$) rather than \b: a '-' is a \b boundary, which
        // would make `pnpm-lock.yaml` a false positive.
        let pattern = Regex::new(&format!(r"(^|\s){}(\s|$)", regex::escape(program)))
            .expect("rule table patterns are statically valid");
        Self {
            program,
            replacement,
            pattern,
        }
    }

    /// Whether `command` contains a whole-word occurrence of the program.
    pub fn matches(&self, command: &str) -> bool {
        self.pattern.is_match(command)
    }

    /// Replace every whole-word occurrence of the program, leaving all
    /// surrounding text (including whitespace) unchanged.
    pub fn suggest(&self, command: &str) -> String {
        let mut current = command.to_string();
        loop {
            // A match consumes its trailing separator, so back-to-back
            // occurrences need another pass.
            let next = self
                .pattern
                .replace_all(&current, |caps: &Captures| {
                    format!("{}{}{}", &caps[1], self.replacement, &caps[2])
                })
                .into_owned();
            if next == current {
                return current;
            }
            current = next;
        }
    }
}

/// All policy rules, compiled, in priority order.
pub fn rules() -> Vec<PolicyRule> {
    RULE_TABLE
        .iter()
        .map(|&(program, replacement)| PolicyRule::new(program, replacement))
        .collect()
}

/// A detected policy violation: which program matched and what to run instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyViolation {
    pub program: &'static str,
    pub suggested: String,
}

/// Check a command against the rule table. Returns the first violation in
/// priority order, or `None` when the command is allowed.
pub fn evaluate_command(command: &str) -> Option<PolicyViolation> {
    rules().into_iter().find(|r| r.matches(command)).map(|r| {
        let suggested = r.suggest(command);
        PolicyViolation {
            program: r.program,
            suggested,
        }
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
