//! Typed errors for bundle construction.

use crate::term::TermKind;
use thiserror::Error;

/// A structural defect detected while assembling a description bundle.
///
/// Every variant names the offending term/instance so the bundle author can
/// fix the input; none of these are retryable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("duplicate term `{name}`")]
    DuplicateTerm { name: String },

    #[error("duplicate named instance `{name}`")]
    DuplicateInstance { name: String },

    #[error("unknown term `{name}`")]
    UnknownTerm { name: String },

    #[error(
        "specialization between mismatched kinds: `{sub}` is a {sub_kind}, `{sup}` is a {sup_kind}"
    )]
    SpecializationKindMismatch {
        sub: String,
        sub_kind: TermKind,
        sup: String,
        sup_kind: TermKind,
    },

    #[error("`{name}` cannot specialize itself")]
    SelfSpecialization { name: String },

    #[error("restriction declared on `{entity}`, which is a {kind}, not an entity")]
    RestrictionOnNonEntity { entity: String, kind: TermKind },

    #[error("restriction member `{member}` is an entity and cannot carry restrictions")]
    RestrictionOnEntityMember { member: String },

    #[error("instance `{instance}` typed by `{ty}`, which is a {kind}, not an entity")]
    TypeNotEntity {
        instance: String,
        ty: String,
        kind: TermKind,
    },

    #[error("{expected} assertion on `{member}`, which is a {actual}")]
    AssertionKindMismatch {
        member: String,
        expected: TermKind,
        actual: TermKind,
    },
}
