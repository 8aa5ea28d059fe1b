use super::{Catalog, Rule};
use merlint_core::diagrams::state::{StateDiagram, StateStmt, walk};
use merlint_core::{Diagnostic, Position};
use rustc_hash::{FxHashMap, FxHashSet};

pub const NO_DUPLICATE_STATES: Rule<StateDiagram> =
    Rule::new("no-duplicate-states", no_duplicate_states);
pub const VALID_STATE_REFERENCES: Rule<StateDiagram> =
    Rule::new("valid-state-references", valid_state_references);

pub fn default_rules() -> Vec<Rule<StateDiagram>> {
    vec![NO_DUPLICATE_STATES, VALID_STATE_REFERENCES]
}

pub fn strict_rules() -> Vec<Rule<StateDiagram>> {
    default_rules()
}

pub fn rules(catalog: Catalog) -> Vec<Rule<StateDiagram>> {
    match catalog {
        Catalog::Default => default_rules(),
        Catalog::Strict => strict_rules(),
    }
}

/// State ids share one namespace, including the bodies of composite states. A plain declaration
/// and a composite body with the same id are one state; two of the same kind are a duplicate.
fn no_duplicate_states(diagram: &StateDiagram) -> Vec<Diagnostic> {
    let mut plain: FxHashMap<&str, Position> = FxHashMap::default();
    let mut composite: FxHashMap<&str, Position> = FxHashMap::default();
    let mut out = Vec::new();
    walk(&diagram.statements, &mut |stmt| {
        let StateStmt::State(state) = stmt else {
            return;
        };
        let first = if state.body.is_some() {
            &mut composite
        } else {
            &mut plain
        };
        match first.get(state.id.as_str()) {
            Some(pos) => out.push(Diagnostic::error(
                state.pos,
                format!(
                    "duplicate state ID {:?} (first defined at line {})",
                    state.id, pos.line
                ),
            )),
            None => {
                first.insert(state.id.as_str(), state.pos);
            }
        }
    });
    out
}

/// Declared states, pseudostates and transition endpoints form one implicit namespace, so every
/// reference resolves and this rule never reports anything.
fn valid_state_references(diagram: &StateDiagram) -> Vec<Diagnostic> {
    let mut known: FxHashSet<&str> = FxHashSet::default();
    walk(&diagram.statements, &mut |stmt| match stmt {
        StateStmt::State(state) => {
            known.insert(state.id.as_str());
        }
        StateStmt::Fork(p) | StateStmt::Join(p) | StateStmt::Choice(p) => {
            known.insert(p.id.as_str());
        }
        StateStmt::Transition(t) => {
            known.insert(t.from.as_str());
            known.insert(t.to.as_str());
        }
        StateStmt::Start(start) => {
            known.insert(start.to.as_str());
        }
        StateStmt::End(end) => {
            known.insert(end.from.as_str());
        }
        _ => {}
    });
    tracing::trace!(states = known.len(), "collected state ids");
    Vec::new()
}
