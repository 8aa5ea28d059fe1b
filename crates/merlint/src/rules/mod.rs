//! Rule framework and per-dialect rule catalogs.
//!
//! A [`Rule`] is a name plus a plain function from one dialect's diagram to diagnostics. Function
//! pointers cannot capture state, so rules cannot observe each other or keep anything between
//! runs. A [`Validator`] runs its rules in list order and concatenates their findings.

pub mod class;
pub mod flowchart;
pub mod sequence;
pub mod state;

use merlint_core::Diagnostic;
use std::fmt;

pub type CheckFn<D> = fn(diagram: &D) -> Vec<Diagnostic>;

pub struct Rule<D> {
    pub name: &'static str,
    pub check: CheckFn<D>,
}

impl<D> Rule<D> {
    pub const fn new(name: &'static str, check: CheckFn<D>) -> Self {
        Self { name, check }
    }

    pub fn run(&self, diagram: &D) -> Vec<Diagnostic> {
        (self.check)(diagram)
    }
}

// Derives would require `D: Clone` / `D: Debug`; only the function pointer is stored.
impl<D> Clone for Rule<D> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<D> Copy for Rule<D> {}

impl<D> fmt::Debug for Rule<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule").field("name", &self.name).finish()
    }
}

/// Which catalog of a dialect to run. Strict is always a superset of default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Catalog {
    #[default]
    Default,
    Strict,
}

impl Catalog {
    pub fn from_strict(strict: bool) -> Self {
        if strict { Self::Strict } else { Self::Default }
    }
}

/// An ordered list of rules for one dialect.
pub struct Validator<D> {
    rules: Vec<Rule<D>>,
}

impl<D> Validator<D> {
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    pub fn with_rules(rules: impl IntoIterator<Item = Rule<D>>) -> Self {
        Self {
            rules: rules.into_iter().collect(),
        }
    }

    pub fn add(&mut self, rule: Rule<D>) {
        self.rules.push(rule);
    }

    pub fn add_fn(&mut self, name: &'static str, check: CheckFn<D>) {
        self.add(Rule::new(name, check));
    }

    pub fn rules(&self) -> &[Rule<D>] {
        &self.rules
    }

    /// Drops every rule whose name `keep` rejects, preserving the order of the rest.
    pub fn retain(&mut self, mut keep: impl FnMut(&str) -> bool) {
        self.rules.retain(|rule| keep(rule.name));
    }

    /// Runs every rule in order. Never stops early.
    pub fn validate(&self, diagram: &D) -> Vec<Diagnostic> {
        let mut out = Vec::new();
        for rule in &self.rules {
            let found = rule.run(diagram);
            tracing::trace!(rule = rule.name, diagnostics = found.len(), "rule finished");
            out.extend(found);
        }
        out
    }
}

impl<D> Default for Validator<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D> Clone for Validator<D> {
    fn clone(&self) -> Self {
        Self {
            rules: self.rules.clone(),
        }
    }
}

impl<D> fmt::Debug for Validator<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.rules.iter().map(|rule| rule.name))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use merlint_core::{Diagnostic, Position, Severity};

    struct Doc(usize);

    fn count(doc: &Doc) -> Vec<Diagnostic> {
        (0..doc.0)
            .map(|i| Diagnostic::info(Position::new(i + 1, 1), format!("item {i}")))
            .collect()
    }

    fn always(_: &Doc) -> Vec<Diagnostic> {
        vec![Diagnostic::warning(Position::start(), "always")]
    }

    #[test]
    fn diagnostics_follow_rule_order_then_statement_order() {
        let mut validator = Validator::new();
        validator.add_fn("always", always);
        validator.add(Rule::new("count", count));

        let out = validator.validate(&Doc(2));
        let messages: Vec<_> = out.iter().map(Diagnostic::message).collect();
        assert_eq!(messages, ["always", "item 0", "item 1"]);
        assert_eq!(out[0].severity(), Severity::Warning);
        assert_eq!(validator.validate(&Doc(2)), out);
    }

    #[test]
    fn retain_keeps_relative_order() {
        let mut validator = Validator::with_rules([
            Rule::new("a", always),
            Rule::new("b", count),
            Rule::new("c", always),
        ]);
        validator.retain(|name| name != "b");
        let names: Vec<_> = validator.rules().iter().map(|r| r.name).collect();
        assert_eq!(names, ["a", "c"]);
        assert_eq!(format!("{validator:?}"), r#"["a", "c"]"#);
    }

    #[test]
    fn empty_validator_reports_nothing() {
        assert!(Validator::<Doc>::default().validate(&Doc(3)).is_empty());
        assert_eq!(Catalog::from_strict(true), Catalog::Strict);
        assert_eq!(Catalog::default(), Catalog::Default);
    }
}
