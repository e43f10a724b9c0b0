//! Typed errors for closure runs.

use thiserror::Error;
use worldclose_model::MemberKind;

/// A fatal defect in the closure run's input, or a sink failure.
///
/// Specialization-shape errors name every offending member so the bundle
/// author can repair the hierarchy; they abort the run for that member kind
/// and are never retried (the computation is deterministic).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClosureError {
    /// Every member of the component has a generalization, so the
    /// specialization edges must contain a cycle.
    #[error("specialization cycle among {kind} members: {}", .members.join(", "))]
    CyclicSpecialization {
        kind: MemberKind,
        members: Vec<String>,
    },

    /// A connected specialization component with more than one root:
    /// member families must have a single most-general member.
    #[error(
        "multiply-rooted {kind} family [{}]: candidate roots {}",
        .members.join(", "),
        .roots.join(", ")
    )]
    MultiplyRootedFamily {
        kind: MemberKind,
        members: Vec<String>,
        roots: Vec<String>,
    },

    /// A member with more than one direct generalization; member
    /// specialization must stay tree-shaped.
    #[error(
        "{kind} `{member}` has multiple direct generalizations: {}",
        .parents.join(", ")
    )]
    MultipleGeneralizations {
        kind: MemberKind,
        member: String,
        parents: Vec<String>,
    },

    /// The output collaborator refused a closing fact.
    #[error("failed to emit closure of `{member}` for `{subject}`: {message}")]
    Sink {
        subject: String,
        member: String,
        message: String,
    },
}
