//! Named instances, anonymous structure instances, and literal values.

use crate::term::TermId;
use serde::{Deserialize, Serialize};

/// Interned named-instance ID.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[repr(transparent)]
pub struct InstanceId(u32);

impl InstanceId {
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

/// Interned anonymous structure-instance ID.
///
/// Structure instances behave like anonymous individuals: two assertions of
/// the *same* `StructureId` are one value, while two structure instances
/// with identical attributes remain two distinct values.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[repr(transparent)]
pub struct StructureId(u32);

impl StructureId {
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

/// A literal scalar value: lexical form plus optional datatype or language
/// tag. Distinctness is value equality over all three fields.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Literal {
    pub lexical: String,
    pub datatype: Option<String>,
    pub language: Option<String>,
}

impl Literal {
    /// A plain string literal.
    pub fn string(lexical: impl Into<String>) -> Self {
        Self {
            lexical: lexical.into(),
            datatype: None,
            language: None,
        }
    }

    /// A literal with an explicit datatype.
    pub fn typed(lexical: impl Into<String>, datatype: impl Into<String>) -> Self {
        Self {
            lexical: lexical.into(),
            datatype: Some(datatype.into()),
            language: None,
        }
    }

    /// A language-tagged string literal.
    pub fn tagged(lexical: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            lexical: lexical.into(),
            datatype: None,
            language: Some(language.into()),
        }
    }
}

/// A named individual with its directly asserted entity types.
///
/// Types are direct assertions only; the closure engine expands them through
/// the entity subtype closure when it needs the transitive view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamedInstance {
    pub name: String,
    pub types: Vec<TermId>,
}

/// An anonymous structure instance: the value of a structured property.
///
/// The attribute list is carried for downstream emitters; this subsystem
/// only ever counts structure instances by identity.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StructureInstance {
    pub attrs: Vec<(String, Literal)>,
}
