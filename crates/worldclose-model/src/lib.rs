//! Worldclose description-bundle model.
//!
//! A *description bundle* pairs a set of named instances (with their value
//! and link assertions) with the vocabulary that restricts them. This crate
//! holds the read-only snapshot of one bundle that the closure engine
//! (`worldclose-closure`) queries:
//!
//! - the term arena (entities, scalar/structured properties, relations),
//! - specialization edges among terms of the same kind,
//! - cardinality/range restrictions declared on entities,
//! - named instances with their direct type assertions, and
//! - deduplicated value assertions per `(instance, member)` pair.
//!
//! The snapshot is assembled once through [`BundleBuilder`], which validates
//! every cross-reference on the way in (fail-closed), and is immutable
//! afterwards. Nothing here performs inference; the bundle only answers
//! direct, non-transitive queries plus the precomputed entity subtype
//! closure.

pub mod bundle;
pub mod error;
pub mod instance;
pub mod restriction;
pub mod term;

pub use bundle::{BundleBuilder, DescriptionBundle};
pub use error::ModelError;
pub use instance::{InstanceId, Literal, NamedInstance, StructureId, StructureInstance};
pub use restriction::{Restriction, RestrictionKind};
pub use term::{MemberKind, Term, TermId, TermKind};
