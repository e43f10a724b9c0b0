//! Cardinality and range restrictions declared on entities.

use crate::term::TermId;
use serde::{Deserialize, Serialize};

/// The restriction kinds of the modeling language.
///
/// Under open-world semantics a reasoner can never conclude that a `Min`,
/// `Exactly`, or `SomeValues` restriction is *satisfied* from asserted data
/// alone: there may always be further unknown values. Those three kinds are
/// what the closure engine synthesizes upper bounds for. `Max` and
/// `AllValues` violations are already entailable from explicit data, so they
/// never require closure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "tag", rename_all = "snake_case")]
pub enum RestrictionKind {
    Min { bound: u32 },
    Max { bound: u32 },
    Exactly { bound: u32 },
    SomeValues,
    AllValues,
}

impl RestrictionKind {
    /// Whether this restriction leaves satisfaction open under open-world
    /// reading, and therefore needs a synthesized upper bound.
    pub fn requires_closure(self) -> bool {
        matches!(
            self,
            RestrictionKind::Min { .. }
                | RestrictionKind::Exactly { .. }
                | RestrictionKind::SomeValues
        )
    }
}

/// One restriction: declared directly on `entity`, constraining `member`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Restriction {
    pub entity: TermId,
    pub member: TermId,
    pub kind: RestrictionKind,
}
