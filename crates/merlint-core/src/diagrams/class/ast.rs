use crate::{HasPosition, Position};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassDiagram {
    pub source: String,
    pub pos: Position,
    pub statements: Vec<ClassStmt>,
}

/// Visibility symbols understood by class diagrams: public, private, protected, package.
pub const VISIBILITIES: [&str; 4] = ["+", "-", "#", "~"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassMember {
    /// The raw leading symbol run, possibly empty. Not normalized.
    pub visibility: String,
    pub name: String,
    pub is_method: bool,
    pub pos: Position,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Class {
    pub name: String,
    /// The `~T~` generic parameter, without tildes.
    pub generic: Option<String>,
    pub label: Option<String>,
    /// `<<interface>>`-style annotations written inside the class body.
    pub annotations: Vec<String>,
    pub members: Vec<ClassMember>,
    pub pos: Position,
}

/// `ClassName : member` written outside a class body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemberLine {
    pub class_name: String,
    pub member: ClassMember,
    pub pos: Position,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RelationshipKind {
    Inheritance,
    Composition,
    Aggregation,
    Association,
    Dependency,
    Realization,
    /// A glyph that combines heads no single kind describes, e.g. `*--o` or `()--`.
    Unrecognized,
}

impl RelationshipKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Inheritance => "inheritance",
            Self::Composition => "composition",
            Self::Aggregation => "aggregation",
            Self::Association => "association",
            Self::Dependency => "dependency",
            Self::Realization => "realization",
            Self::Unrecognized => "unrecognized",
        }
    }

    pub fn is_recognized(self) -> bool {
        !matches!(self, Self::Unrecognized)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Relationship {
    pub from: String,
    pub to: String,
    /// The connector as written, e.g. `<|--`, `*--`, `..>`.
    pub glyph: String,
    pub kind: RelationshipKind,
    pub from_cardinality: Option<String>,
    pub to_cardinality: Option<String>,
    pub label: Option<String>,
    pub pos: Position,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassNote {
    /// `None` for a free-floating `note "text"`.
    pub class_name: Option<String>,
    pub text: String,
    pub pos: Position,
}

/// `<<annotation>> ClassName` written outside a class body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Annotation {
    pub class_name: String,
    pub annotation: String,
    pub pos: Position,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Namespace {
    pub name: String,
    pub statements: Vec<ClassStmt>,
    pub pos: Position,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClassStmt {
    Class(Class),
    Member(MemberLine),
    Relationship(Relationship),
    Note(ClassNote),
    Annotation(Annotation),
    Namespace(Namespace),
    Direction { text: String, pos: Position },
    Style { pos: Position },
    Comment { pos: Position },
    Unknown { text: String, pos: Position },
}

impl HasPosition for ClassStmt {
    fn position(&self) -> Position {
        match self {
            Self::Class(c) => c.pos,
            Self::Member(m) => m.pos,
            Self::Relationship(r) => r.pos,
            Self::Note(n) => n.pos,
            Self::Annotation(a) => a.pos,
            Self::Namespace(n) => n.pos,
            Self::Direction { pos, .. }
            | Self::Style { pos }
            | Self::Comment { pos }
            | Self::Unknown { pos, .. } => *pos,
        }
    }
}

impl HasPosition for ClassDiagram {
    fn position(&self) -> Position {
        self.pos
    }
}

/// Visits every statement in source order, descending into namespaces.
pub fn walk<'a>(statements: &'a [ClassStmt], visit: &mut impl FnMut(&'a ClassStmt)) {
    for stmt in statements {
        visit(stmt);
        if let ClassStmt::Namespace(ns) = stmt {
            walk(&ns.statements, visit);
        }
    }
}
