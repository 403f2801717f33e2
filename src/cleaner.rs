//! Post-processing for text and markdown payloads.
//!
//! A fixed, ordered list of [`CleanupRule`]s. Each rule is a pure transform,
//! and the whole chain is idempotent: cleaning already-cleaned output is a
//! no-op. Binary formats and HTML never pass through here.

use regex::Regex;
use std::sync::LazyLock;

use crate::request::OutputFormat;

/// Three or more newlines, allowing horizontal whitespace on the blank lines
static EXCESS_BLANK_LINES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\n(?:[ \t]*\n){2,}").expect("EXCESS_BLANK_LINES: hardcoded regex is valid")
});

/// Backslash-escaped `*` or `_`. Escaped backslashes are matched as pairs
/// so a literal `\\` before the punctuation survives.
static OVER_ESCAPED_PUNCTUATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\\\\)|\\([*_])").expect("OVER_ESCAPED_PUNCTUATION: hardcoded regex is valid")
});

/// Line holding nothing but a number (page footers)
static NUMBER_ONLY_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*\d+\s*$").expect("NUMBER_ONLY_LINE: hardcoded regex is valid")
});

static BLANK_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*$").expect("BLANK_LINE: hardcoded regex is valid"));

/// Which payloads a rule applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleScope {
    /// Text and markdown
    All,
    /// Plain text only
    TextOnly,
}

/// What a rule does with its matches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleAction {
    /// Replace every match; `$1` style group references are expanded
    Replace(&'static str),
    /// Remove every line the pattern matches
    DropLines,
}

/// One step of the cleanup chain
#[derive(Debug, Clone, Copy)]
pub struct CleanupRule {
    pub name: &'static str,
    pub scope: RuleScope,
    pub pattern: &'static LazyLock<Regex>,
    pub action: RuleAction,
}

impl CleanupRule {
    #[must_use]
    pub fn applies_to(&self, format: OutputFormat) -> bool {
        match self.scope {
            RuleScope::All => format.is_textual(),
            RuleScope::TextOnly => format == OutputFormat::Text,
        }
    }

    #[must_use]
    pub fn apply(&self, input: &str) -> String {
        let pattern: &Regex = self.pattern;
        match self.action {
            RuleAction::Replace(replacement) => pattern.replace_all(input, replacement).into_owned(),
            RuleAction::DropLines => input
                .split('\n')
                .filter(|line| !pattern.is_match(line))
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}

/// The cleanup chain, in application order
pub static RULES: [CleanupRule; 4] = [
    CleanupRule {
        name: "collapse_blank_lines",
        scope: RuleScope::All,
        pattern: &EXCESS_BLANK_LINES,
        action: RuleAction::Replace("\n\n"),
    },
    CleanupRule {
        name: "unescape_punctuation",
        scope: RuleScope::All,
        pattern: &OVER_ESCAPED_PUNCTUATION,
        action: RuleAction::Replace("$1$2"),
    },
    CleanupRule {
        name: "strip_page_numbers",
        scope: RuleScope::TextOnly,
        pattern: &NUMBER_ONLY_LINE,
        action: RuleAction::DropLines,
    },
    CleanupRule {
        name: "strip_blank_lines",
        scope: RuleScope::TextOnly,
        pattern: &BLANK_LINE,
        action: RuleAction::DropLines,
    },
];

/// Run every rule that applies to `format`, in order.
///
/// Non-textual formats are returned unchanged.
#[must_use]
pub fn clean(content: &str, format: OutputFormat) -> String {
    RULES
        .iter()
        .filter(|rule| rule.applies_to(format))
        .fold(content.to_string(), |acc, rule| rule.apply(&acc))
}
