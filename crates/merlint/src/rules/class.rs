use super::{Catalog, Rule};
use merlint_core::diagrams::class::{ClassDiagram, ClassMember, ClassStmt, VISIBILITIES, walk};
use merlint_core::{Diagnostic, Position};
use rustc_hash::{FxHashMap, FxHashSet};

pub const NO_DUPLICATE_CLASSES: Rule<ClassDiagram> =
    Rule::new("no-duplicate-classes", no_duplicate_classes);
pub const VALID_CLASS_REFERENCES: Rule<ClassDiagram> =
    Rule::new("valid-class-references", valid_class_references);
pub const VALID_MEMBER_VISIBILITY: Rule<ClassDiagram> =
    Rule::new("valid-member-visibility", valid_member_visibility);
pub const VALID_RELATIONSHIP_TYPE: Rule<ClassDiagram> =
    Rule::new("valid-relationship-type", valid_relationship_type);

pub fn default_rules() -> Vec<Rule<ClassDiagram>> {
    vec![
        NO_DUPLICATE_CLASSES,
        VALID_CLASS_REFERENCES,
        VALID_MEMBER_VISIBILITY,
        VALID_RELATIONSHIP_TYPE,
    ]
}

pub fn strict_rules() -> Vec<Rule<ClassDiagram>> {
    default_rules()
}

pub fn rules(catalog: Catalog) -> Vec<Rule<ClassDiagram>> {
    match catalog {
        Catalog::Default => default_rules(),
        Catalog::Strict => strict_rules(),
    }
}

fn no_duplicate_classes(diagram: &ClassDiagram) -> Vec<Diagnostic> {
    let mut first: FxHashMap<&str, Position> = FxHashMap::default();
    let mut out = Vec::new();
    walk(&diagram.statements, &mut |stmt| {
        let ClassStmt::Class(class) = stmt else {
            return;
        };
        match first.get(class.name.as_str()) {
            Some(pos) => out.push(Diagnostic::error(
                class.pos,
                format!(
                    "duplicate class {:?} (first defined at line {})",
                    class.name, pos.line
                ),
            )),
            None => {
                first.insert(class.name.as_str(), class.pos);
            }
        }
    });
    out
}

/// A note may name any class that is declared, given members or an annotation, or used as a
/// relationship endpoint anywhere in the diagram.
fn valid_class_references(diagram: &ClassDiagram) -> Vec<Diagnostic> {
    let mut known: FxHashSet<&str> = FxHashSet::default();
    walk(&diagram.statements, &mut |stmt| match stmt {
        ClassStmt::Class(class) => {
            known.insert(class.name.as_str());
        }
        ClassStmt::Member(line) => {
            known.insert(line.class_name.as_str());
        }
        ClassStmt::Annotation(annotation) => {
            known.insert(annotation.class_name.as_str());
        }
        ClassStmt::Relationship(rel) => {
            known.insert(rel.from.as_str());
            known.insert(rel.to.as_str());
        }
        _ => {}
    });

    let mut out = Vec::new();
    walk(&diagram.statements, &mut |stmt| {
        if let ClassStmt::Note(note) = stmt {
            if let Some(name) = &note.class_name {
                if !known.contains(name.as_str()) {
                    out.push(Diagnostic::error(
                        note.pos,
                        format!("note references undefined class {name:?}"),
                    ));
                }
            }
        }
    });
    out
}

fn check_member(class_name: &str, member: &ClassMember, out: &mut Vec<Diagnostic>) {
    if member.visibility.is_empty() || VISIBILITIES.contains(&member.visibility.as_str()) {
        return;
    }
    out.push(Diagnostic::error(
        member.pos,
        format!(
            "invalid visibility {:?} on member {:?} of class {:?} (expected one of {})",
            member.visibility,
            member.name,
            class_name,
            VISIBILITIES.join(", ")
        ),
    ));
}

fn valid_member_visibility(diagram: &ClassDiagram) -> Vec<Diagnostic> {
    let mut out = Vec::new();
    walk(&diagram.statements, &mut |stmt| match stmt {
        ClassStmt::Class(class) => {
            for member in &class.members {
                check_member(&class.name, member, &mut out);
            }
        }
        ClassStmt::Member(line) => check_member(&line.class_name, &line.member, &mut out),
        _ => {}
    });
    out
}

fn valid_relationship_type(diagram: &ClassDiagram) -> Vec<Diagnostic> {
    let mut out = Vec::new();
    walk(&diagram.statements, &mut |stmt| {
        if let ClassStmt::Relationship(rel) = stmt {
            if !rel.kind.is_recognized() {
                out.push(Diagnostic::error(
                    rel.pos,
                    format!(
                        "unrecognized relationship {:?} between {:?} and {:?}",
                        rel.glyph, rel.from, rel.to
                    ),
                ));
            }
        }
    });
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use merlint_core::diagrams::class::{Class, ClassNote, Relationship, RelationshipKind};
    use merlint_core::{Diagram, parse};

    fn diagram(source: &str) -> ClassDiagram {
        match parse(source).unwrap() {
            Diagram::Class(diagram) => diagram,
            other => panic!("expected a class diagram, got {:?}", other.kind()),
        }
    }

    fn with_statements(statements: Vec<ClassStmt>) -> ClassDiagram {
        ClassDiagram {
            source: String::new(),
            pos: Position::start(),
            statements,
        }
    }

    fn class(name: &str, line: usize) -> ClassStmt {
        ClassStmt::Class(Class {
            name: name.to_string(),
            generic: None,
            label: None,
            annotations: Vec::new(),
            members: Vec::new(),
            pos: Position::new(line, 1),
        })
    }

    fn note(class_name: &str, line: usize) -> ClassStmt {
        ClassStmt::Note(ClassNote {
            class_name: Some(class_name.to_string()),
            text: "Note text".to_string(),
            pos: Position::new(line, 1),
        })
    }

    fn relationship(from: &str, to: &str, kind: RelationshipKind) -> ClassStmt {
        ClassStmt::Relationship(Relationship {
            from: from.to_string(),
            to: to.to_string(),
            glyph: "--".to_string(),
            kind,
            from_cardinality: None,
            to_cardinality: None,
            label: None,
            pos: Position::new(2, 1),
        })
    }

    #[test]
    fn duplicate_classes() {
        let unique = with_statements(vec![class("Animal", 2), class("Dog", 3)]);
        assert!(no_duplicate_classes(&unique).is_empty());

        let twice = with_statements(vec![class("Animal", 2), class("Animal", 3)]);
        let found = no_duplicate_classes(&twice);
        assert_eq!(found.len(), 1);
        assert_eq!(
            found[0].message(),
            r#"duplicate class "Animal" (first defined at line 2)"#
        );

        let nested = diagram("classDiagram\nclass Duck\nnamespace Birds {\n  class Duck\n}");
        assert_eq!(no_duplicate_classes(&nested).len(), 1);
    }

    #[test]
    fn class_references() {
        let declared = with_statements(vec![class("Animal", 2), note("Animal", 3)]);
        assert!(valid_class_references(&declared).is_empty());

        let undefined = with_statements(vec![note("UndefinedClass", 2)]);
        let found = valid_class_references(&undefined);
        assert_eq!(found.len(), 1);
        assert_eq!(
            found[0].message(),
            r#"note references undefined class "UndefinedClass""#
        );

        let implicit = with_statements(vec![
            relationship("A", "B", RelationshipKind::Inheritance),
            note("A", 3),
        ]);
        assert!(valid_class_references(&implicit).is_empty());

        let parsed = diagram(
            "classDiagram\nnote for Later \"forward reference\"\nnote \"free note\"\nLater : +run()",
        );
        assert!(valid_class_references(&parsed).is_empty());

        let generic = diagram(
            "classDiagram\n  class Shape~T~\n  Shape~T~ <|-- Square\n  note for Square \"x\"",
        );
        assert!(matches!(
            &generic.statements[1],
            ClassStmt::Relationship(rel) if rel.from == "Shape" && rel.to == "Square"
        ));
        assert!(valid_class_references(&generic).is_empty());
    }

    #[test]
    fn member_visibility() {
        let valid = diagram(
            "classDiagram\nclass Animal {\n    +name\n    -age\n    #weight\n    ~height\n    plain\n}",
        );
        assert!(valid_member_visibility(&valid).is_empty());

        let invalid = diagram("classDiagram\nclass Animal {\n    *name\n}\nAnimal : ^legs");
        let found = valid_member_visibility(&invalid);
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].position(), Position::new(3, 5));
        assert_eq!(
            found[0].message(),
            r#"invalid visibility "*" on member "name" of class "Animal" (expected one of +, -, #, ~)"#
        );
        assert_eq!(found[1].position(), Position::new(5, 10));
    }

    #[test]
    fn relationship_types() {
        let valid = with_statements(vec![
            relationship("A", "B", RelationshipKind::Inheritance),
            relationship("B", "C", RelationshipKind::Composition),
            relationship("C", "D", RelationshipKind::Aggregation),
            relationship("D", "E", RelationshipKind::Association),
            relationship("E", "F", RelationshipKind::Dependency),
            relationship("F", "G", RelationshipKind::Realization),
        ]);
        assert!(valid_relationship_type(&valid).is_empty());

        let invalid = with_statements(vec![relationship("A", "B", RelationshipKind::Unrecognized)]);
        assert_eq!(valid_relationship_type(&invalid).len(), 1);

        let parsed = diagram("classDiagram\nA <|-- B\nC *--o D");
        let found = valid_relationship_type(&parsed);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].line(), 3);
    }

    #[test]
    fn catalogs_match() {
        assert_eq!(default_rules().len(), 4);
        assert_eq!(strict_rules().len(), 4);
        assert_eq!(rules(Catalog::Strict)[3].name, "valid-relationship-type");
    }
}
