//! Term identifiers and kinds.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Interned term ID (4 bytes instead of 24+ for String).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[repr(transparent)]
pub struct TermId(u32);

impl TermId {
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u32 {
        self.0
    }

    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// The four term kinds of the modeling language.
///
/// Entities may specialize several supertypes (a DAG); the member kinds are
/// required to form single-rooted specialization trees, which the closure
/// engine validates before aggregating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TermKind {
    Entity,
    ScalarProperty,
    StructuredProperty,
    Relation,
}

impl TermKind {
    /// The restrictable member kind this term kind corresponds to, if any.
    pub fn member_kind(self) -> Option<MemberKind> {
        match self {
            TermKind::Entity => None,
            TermKind::ScalarProperty => Some(MemberKind::Scalar),
            TermKind::StructuredProperty => Some(MemberKind::Structured),
            TermKind::Relation => Some(MemberKind::Relation),
        }
    }
}

impl fmt::Display for TermKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TermKind::Entity => "entity",
            TermKind::ScalarProperty => "scalar property",
            TermKind::StructuredProperty => "structured property",
            TermKind::Relation => "relation",
        };
        f.write_str(s)
    }
}

/// The three member kinds: everything restrictable and specializable except
/// entities themselves. Each kind counts a different value type (literals,
/// structure instances, linked named instances) but shares one aggregation
/// algorithm.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum MemberKind {
    Scalar,
    Structured,
    Relation,
}

impl MemberKind {
    pub const ALL: [MemberKind; 3] =
        [MemberKind::Scalar, MemberKind::Structured, MemberKind::Relation];

    pub fn term_kind(self) -> TermKind {
        match self {
            MemberKind::Scalar => TermKind::ScalarProperty,
            MemberKind::Structured => TermKind::StructuredProperty,
            MemberKind::Relation => TermKind::Relation,
        }
    }
}

impl fmt::Display for MemberKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.term_kind().fmt(f)
    }
}

/// A named term in the bundle's vocabulary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Term {
    pub name: String,
    pub kind: TermKind,
}
