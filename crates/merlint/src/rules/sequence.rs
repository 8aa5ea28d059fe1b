use super::{Catalog, Rule};
use indexmap::IndexMap;
use merlint_core::diagrams::sequence::{ActivationKind, SeqStmt, SequenceDiagram, walk};
use merlint_core::{Diagnostic, Position};
use rustc_hash::FxHashSet;

pub const BALANCED_ACTIVATIONS: Rule<SequenceDiagram> =
    Rule::new("balanced-activations", balanced_activations);
pub const NO_UNDECLARED_PARTICIPANTS: Rule<SequenceDiagram> =
    Rule::new("no-undeclared-participants", no_undeclared_participants);

pub fn default_rules() -> Vec<Rule<SequenceDiagram>> {
    vec![BALANCED_ACTIVATIONS]
}

pub fn strict_rules() -> Vec<Rule<SequenceDiagram>> {
    vec![BALANCED_ACTIVATIONS, NO_UNDECLARED_PARTICIPANTS]
}

pub fn rules(catalog: Catalog) -> Vec<Rule<SequenceDiagram>> {
    match catalog {
        Catalog::Default => default_rules(),
        Catalog::Strict => strict_rules(),
    }
}

/// Open activations per participant, keyed in first-activation order.
#[derive(Debug, Default)]
struct Activations<'a> {
    open: IndexMap<&'a str, Vec<Position>>,
}

impl<'a> Activations<'a> {
    fn activate(&mut self, participant: &'a str, pos: Position) {
        self.open.entry(participant).or_default().push(pos);
    }

    fn deactivate(&mut self, participant: &'a str, pos: Position, out: &mut Vec<Diagnostic>) {
        let popped = self
            .open
            .get_mut(participant)
            .and_then(|stack| stack.pop());
        if popped.is_none() {
            out.push(Diagnostic::error(
                pos,
                format!("participant {participant:?} is deactivated but not active"),
            ));
        }
    }
}

/// `activate`/`deactivate` statements and the `+`/`-` message markers must pair up. `+`
/// activates the receiver, `-` deactivates the sender.
fn balanced_activations(diagram: &SequenceDiagram) -> Vec<Diagnostic> {
    let mut state = Activations::default();
    let mut out = Vec::new();
    walk(&diagram.statements, &mut |stmt| match stmt {
        SeqStmt::Activation(act) => match act.kind {
            ActivationKind::Activate => state.activate(&act.participant, act.pos),
            ActivationKind::Deactivate => state.deactivate(&act.participant, act.pos, &mut out),
        },
        SeqStmt::Message(msg) => match msg.activation {
            Some(ActivationKind::Activate) => state.activate(&msg.to, msg.pos),
            Some(ActivationKind::Deactivate) => state.deactivate(&msg.from, msg.pos, &mut out),
            None => {}
        },
        _ => {}
    });

    for (participant, stack) in &state.open {
        if let Some(last) = stack.last() {
            out.push(Diagnostic::warning(
                *last,
                format!("participant {participant:?} is still active at the end of the diagram"),
            ));
        }
    }
    out
}

/// Every participant referenced by a message, note or activation should be declared with
/// `participant` or `actor` somewhere in the diagram. One warning per id, at its first use.
fn no_undeclared_participants(diagram: &SequenceDiagram) -> Vec<Diagnostic> {
    let mut declared: FxHashSet<&str> = FxHashSet::default();
    walk(&diagram.statements, &mut |stmt| {
        if let SeqStmt::Participant(p) = stmt {
            declared.insert(p.id.as_str());
        }
    });

    let mut uses: Vec<(&str, Position)> = Vec::new();
    walk(&diagram.statements, &mut |stmt| match stmt {
        SeqStmt::Message(msg) => {
            uses.push((msg.from.as_str(), msg.pos));
            uses.push((msg.to.as_str(), msg.pos));
        }
        SeqStmt::Activation(act) => uses.push((act.participant.as_str(), act.pos)),
        SeqStmt::Note(note) => {
            uses.extend(note.participants.iter().map(|p| (p.as_str(), note.pos)));
        }
        _ => {}
    });

    let mut reported: FxHashSet<&str> = FxHashSet::default();
    let mut out = Vec::new();
    for (id, pos) in uses {
        if declared.contains(id) || !reported.insert(id) {
            continue;
        }
        out.push(Diagnostic::warning(
            pos,
            format!("participant {id:?} is used without a participant or actor declaration"),
        ));
    }
    out
}
