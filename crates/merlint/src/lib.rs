#![forbid(unsafe_code)]

//! `merlint` checks Mermaid-style diagrams against per-dialect rule catalogs.
//!
//! Parsing comes from `merlint-core` (re-exported here). Validation runs the rules of the parsed
//! dialect in catalog order and returns every finding; it never stops early and never fails.
//! Whether a warning should fail a build is up to the caller (see [`Severity::is_error`]).
//!
//! ```
//! let diagram = merlint::parse("graph XY\nA --> B").unwrap();
//! let found = merlint::validate(&diagram, false);
//! assert_eq!(found.len(), 1);
//! assert!(found[0].to_string().starts_with("line 1, col 7: error: invalid direction"));
//! ```

pub use merlint_core::*;

pub mod config;
pub mod rules;

pub use config::{ConfigError, ValidateOptions};
pub use rules::{Catalog, Rule, Validator};

fn run<D>(
    dialect: &str,
    rules: Vec<Rule<D>>,
    diagram: &D,
    opts: &ValidateOptions,
) -> Vec<Diagnostic> {
    let mut validator = Validator::with_rules(rules);
    validator.retain(|name| opts.is_enabled(name));
    tracing::debug!(
        dialect,
        strict = opts.strict,
        rules = validator.rules().len(),
        "selected rule catalog"
    );
    validator.validate(diagram)
}

/// Runs the default or strict catalog of the diagram's dialect.
pub fn validate(diagram: &Diagram, strict: bool) -> Vec<Diagnostic> {
    let opts = ValidateOptions {
        strict,
        ..ValidateOptions::default()
    };
    validate_with(diagram, &opts)
}

/// Runs the catalog `opts` selects, minus any disabled rules. Generic diagrams have no rules.
pub fn validate_with(diagram: &Diagram, opts: &ValidateOptions) -> Vec<Diagnostic> {
    let catalog = opts.catalog();
    let dialect = diagram.dialect();
    match diagram {
        Diagram::Flowchart(d) => run(dialect, rules::flowchart::rules(catalog), d, opts),
        Diagram::Sequence(d) => run(dialect, rules::sequence::rules(catalog), d, opts),
        Diagram::Class(d) => run(dialect, rules::class::rules(catalog), d, opts),
        Diagram::State(d) => run(dialect, rules::state::rules(catalog), d, opts),
        Diagram::Generic(_) => {
            tracing::debug!(dialect, "no rules for diagram");
            Vec::new()
        }
    }
}

/// Parses `source` and validates the result.
pub fn check(
    source: &str,
    opts: &ValidateOptions,
) -> std::result::Result<Vec<Diagnostic>, ParseError> {
    let diagram = parse(source)?;
    Ok(validate_with(&diagram, opts))
}
