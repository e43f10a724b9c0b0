//! Worldclose closure synthesis.
//!
//! Description-logic reasoners work under the open-world assumption: a
//! declared minimum or exact cardinality on a property is never *satisfied*
//! by asserted data alone, because nothing rules out further unknown values.
//! This crate closes the world per individual and per restricted member by
//! synthesizing explicit upper-bound (max-cardinality) facts pinned to the
//! number of distinct values actually asserted, directly or through any
//! specialization of the member.
//!
//! The pipeline over one description bundle, leaves first:
//!
//! 1. [`restriction_scan`]: which entities restrict which members with
//!    MIN / EXACTLY / SOME.
//! 2. [`specialization_forest`]: validated single-rooted trees over the
//!    member specialization edges (cycles and multi-root families rejected).
//! 3. [`entity_expand`]: restricted entities expanded to all instances of
//!    themselves or a transitive subtype.
//! 4. [`aggregate`]: per instance, bottom-up merge of distinct value sets
//!    along each restricted member's subtree.
//! 5. [`emit`]: one closing fact per `(instance, member)` count.
//!
//! The same generic aggregation runs three times, once per member kind
//! (literals, structure instances, linked instances). The three runs are
//! independent; [`close_bundle`] executes them on rayon. No inference
//! happens anywhere here: the engine only counts and emits bounds.

pub mod aggregate;
pub mod emit;
pub mod entity_expand;
pub mod error;
pub mod pipeline;
pub mod restriction_scan;
pub mod specialization_forest;

pub use aggregate::{aggregate_counts, CountTable};
pub use emit::{ClosingFact, ClosureSink, CollectedClosure};
pub use entity_expand::expanded_instances;
pub use error::ClosureError;
pub use pipeline::{close_bundle, close_member_kind, BundleClosure, ClosureSummary};
pub use restriction_scan::restricted_members;
pub use specialization_forest::{SpecializationForest, SpecializationTree};
