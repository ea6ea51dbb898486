//! Static checks over a grammar.
//!
//! Validation never parses anything. It walks the symbol arena and reports
//! problems that would otherwise only surface at match time, or not at all:
//! references to undefined rules, repetitions that can only ever match once
//! because their item matches the empty string, and left recursion that the
//! simple engine cannot handle.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::grammar::Grammar;
use crate::symbol::{SymbolId, SymbolKind};

static RULE_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("rule name pattern is valid")
});

// ============================================================================
// REPORT
// ============================================================================

/// Sink for validation findings, by severity.
pub trait ValidationReporter {
    fn report_error(&mut self, message: impl Into<String>);
    fn report_warning(&mut self, message: impl Into<String>);
    fn report_suggestion(&mut self, message: impl Into<String>);
}

/// Findings of [`Grammar::validate`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GrammarReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub suggestions: Vec<String>,
}

impl GrammarReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when there are no errors. Warnings and suggestions do not count.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// True when there is nothing at all to report.
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty() && self.warnings.is_empty() && self.suggestions.is_empty()
    }
}

impl ValidationReporter for GrammarReport {
    fn report_error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    fn report_warning(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    fn report_suggestion(&mut self, message: impl Into<String>) {
        self.suggestions.push(message.into());
    }
}

// ============================================================================
// CHECKS
// ============================================================================

impl Grammar {
    /// Runs every static check.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rdparse::{rule, Grammar};
    /// let mut g = Grammar::new();
    /// g.define("Start", (rule("Missing"), "x")).unwrap();
    /// let report = g.validate();
    /// assert!(!report.is_valid());
    /// assert!(report.errors[0].contains("Missing"));
    /// ```
    pub fn validate(&self) -> GrammarReport {
        let mut report = GrammarReport::new();
        let nullable = nullable_set(self);

        check_rule_names(self, &mut report);
        check_redefinitions(self, &mut report);
        check_references(self, &mut report);
        check_nullable_repeats(self, &nullable, &mut report);
        check_left_recursion(self, &nullable, &mut report);

        report
    }
}

fn check_rule_names(grammar: &Grammar, report: &mut impl ValidationReporter) {
    for (name, _) in grammar.rules() {
        if !RULE_NAME.is_match(name) {
            report.report_warning(format!("rule name '{name}' is not an identifier"));
        }
    }
}

fn check_redefinitions(grammar: &Grammar, report: &mut impl ValidationReporter) {
    let mut seen = HashSet::new();
    for name in grammar.redefined() {
        if seen.insert(name.as_str()) {
            report.report_warning(format!(
                "rule '{name}' is defined more than once; the last definition wins"
            ));
        }
    }
}

fn check_references(grammar: &Grammar, report: &mut impl ValidationReporter) {
    for id in grammar.ids() {
        if let SymbolKind::Reference(name) = grammar.node(id).kind() {
            if grammar.body(name).is_none() {
                report.report_error(format!("rule '{name}' is referenced but never defined"));
            }
        }
    }
}

fn check_nullable_repeats(
    grammar: &Grammar,
    nullable: &HashSet<SymbolId>,
    report: &mut impl ValidationReporter,
) {
    for id in grammar.ids() {
        if let SymbolKind::Repeat { inner, bounds } = grammar.node(id).kind() {
            if bounds.max.is_none() && nullable.contains(inner) {
                report.report_warning(format!(
                    "{} repeats a symbol that can match the empty string; it stops after the first empty match",
                    grammar.dump_expr(id)
                ));
            }
        }
    }
}

fn check_left_recursion(
    grammar: &Grammar,
    nullable: &HashSet<SymbolId>,
    report: &mut impl ValidationReporter,
) {
    for (name, body) in grammar.rules() {
        if reaches_leftmost(grammar, nullable, body, name) {
            report.report_suggestion(format!(
                "rule '{name}' is left-recursive; parse it with the packrat engine"
            ));
        }
    }
}

// ============================================================================
// ANALYSIS
// ============================================================================

/// Ids of every node that can match without consuming input.
fn nullable_set(grammar: &Grammar) -> HashSet<SymbolId> {
    let mut nullable = HashSet::new();
    loop {
        let mut changed = false;
        for id in grammar.ids() {
            if nullable.contains(&id) {
                continue;
            }
            let is_nullable = match grammar.node(id).kind() {
                SymbolKind::Literal(text) => text.is_empty(),
                SymbolKind::Pattern(pattern) => pattern.is_nullable(),
                SymbolKind::Empty => true,
                SymbolKind::Sequence(children) => children.iter().all(|c| nullable.contains(c)),
                SymbolKind::Alternation(children) => children.iter().any(|c| nullable.contains(c)),
                SymbolKind::Repeat { inner, bounds } => bounds.min == 0 || nullable.contains(inner),
                SymbolKind::Reference(name) => grammar
                    .body(name)
                    .is_some_and(|body| nullable.contains(&body)),
                SymbolKind::Fail(_) => false,
            };
            if is_nullable {
                nullable.insert(id);
                changed = true;
            }
        }
        if !changed {
            return nullable;
        }
    }
}

/// Whether `target` can be reached from `start` without consuming input.
fn reaches_leftmost(
    grammar: &Grammar,
    nullable: &HashSet<SymbolId>,
    start: SymbolId,
    target: &str,
) -> bool {
    let mut visited = HashSet::new();
    let mut pending = vec![start];

    while let Some(id) = pending.pop() {
        if !visited.insert(id) {
            continue;
        }
        match grammar.node(id).kind() {
            SymbolKind::Sequence(children) => {
                for &child in children {
                    pending.push(child);
                    if !nullable.contains(&child) {
                        break;
                    }
                }
            }
            SymbolKind::Alternation(children) => pending.extend(children.iter().copied()),
            SymbolKind::Repeat { inner, bounds } if bounds.max != Some(0) => pending.push(*inner),
            SymbolKind::Reference(name) => {
                if name == target {
                    return true;
                }
                if let Some(body) = grammar.body(name) {
                    pending.push(body);
                }
            }
            _ => {}
        }
    }
    false
}
