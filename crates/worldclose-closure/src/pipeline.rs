//! The per-bundle closure pipeline.
//!
//! `close_member_kind` runs scan → forest → expand → aggregate → emit for
//! one member kind against one immutable bundle snapshot. `close_bundle`
//! runs the three kinds on rayon; they share nothing but the read-only
//! bundle, and every derived structure (trees, instance sets, count tables)
//! is owned by its run and dropped with it.

use crate::aggregate::{aggregate_counts, CountTable};
use crate::emit::{emit_counts, ClosingFact, ClosureSink, CollectedClosure};
use crate::entity_expand::expanded_instances;
use crate::error::ClosureError;
use crate::restriction_scan::restricted_members;
use crate::specialization_forest::SpecializationForest;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use worldclose_model::{DescriptionBundle, InstanceId, MemberKind, TermId};

/// Countable summary of one member-kind run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClosureSummary {
    pub kind: MemberKind,
    pub restricted_entity_count: u32,
    pub restricted_member_count: u32,
    pub instance_count: u32,
    pub fact_count: u32,
}

/// Close one member kind of `bundle` into `sink`.
///
/// Emission order is deterministic: ascending `(instance, member)`. An
/// instance restricted through several entities for the same member yields
/// exactly one fact.
pub fn close_member_kind(
    bundle: &DescriptionBundle,
    kind: MemberKind,
    sink: &mut dyn ClosureSink,
) -> Result<ClosureSummary, ClosureError> {
    let restricted = restricted_members(bundle, kind);
    let forest = SpecializationForest::build(bundle, kind)?;
    let expanded: BTreeMap<TermId, BTreeSet<InstanceId>> = restricted
        .keys()
        .map(|&entity| (entity, expanded_instances(bundle, entity)))
        .collect();

    let member_count = restricted
        .values()
        .flat_map(|members| members.iter())
        .collect::<BTreeSet<_>>()
        .len();
    let instance_count = expanded
        .values()
        .flat_map(|instances| instances.iter())
        .collect::<BTreeSet<_>>()
        .len();
    tracing::debug!(
        kind = %kind,
        entities = restricted.len(),
        members = member_count,
        instances = instance_count,
        trees = forest.trees().len(),
        "closing member kind"
    );

    let counts = aggregate_for_kind(bundle, kind, &restricted, &expanded, &forest);

    let fact_count = emit_counts(&counts, sink).map_err(|(subject, member, error)| {
        ClosureError::Sink {
            subject: bundle.instance_name(subject).to_string(),
            member: bundle.term_name(member).to_string(),
            message: error.to_string(),
        }
    })?;

    Ok(ClosureSummary {
        kind,
        restricted_entity_count: restricted.len() as u32,
        restricted_member_count: member_count as u32,
        instance_count: instance_count as u32,
        fact_count: fact_count as u32,
    })
}

/// Instantiate the generic aggregation with the value type of `kind`.
fn aggregate_for_kind(
    bundle: &DescriptionBundle,
    kind: MemberKind,
    restricted: &BTreeMap<TermId, BTreeSet<TermId>>,
    expanded: &BTreeMap<TermId, BTreeSet<InstanceId>>,
    forest: &SpecializationForest,
) -> CountTable {
    match kind {
        MemberKind::Scalar => aggregate_counts(restricted, expanded, forest, |i, m| {
            bundle
                .scalar_values_of(i, m)
                .map(|values| values.iter().cloned().collect())
                .unwrap_or_default()
        }),
        MemberKind::Structured => aggregate_counts(restricted, expanded, forest, |i, m| {
            bundle
                .structure_values_of(i, m)
                .map(|values| values.iter().copied().collect())
                .unwrap_or_default()
        }),
        MemberKind::Relation => aggregate_counts(restricted, expanded, forest, |i, m| {
            bundle
                .link_targets_of(i, m)
                .map(|targets| targets.iter().copied().collect())
                .unwrap_or_default()
        }),
    }
}

/// The collected closure of one bundle across all three member kinds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BundleClosure {
    pub scalar: Vec<ClosingFact>,
    pub structured: Vec<ClosingFact>,
    pub relation: Vec<ClosingFact>,
    pub summaries: [ClosureSummary; 3],
}

impl BundleClosure {
    pub fn facts(&self, kind: MemberKind) -> &[ClosingFact] {
        match kind {
            MemberKind::Scalar => &self.scalar,
            MemberKind::Structured => &self.structured,
            MemberKind::Relation => &self.relation,
        }
    }

    pub fn all_facts(&self) -> impl Iterator<Item = &ClosingFact> {
        self.scalar
            .iter()
            .chain(self.structured.iter())
            .chain(self.relation.iter())
    }
}

/// Close all three member kinds of `bundle`, in parallel.
///
/// The first failing kind's error is reported, scalar before structured
/// before relation.
pub fn close_bundle(bundle: &DescriptionBundle) -> Result<BundleClosure, ClosureError> {
    let run = |kind: MemberKind| -> Result<(ClosureSummary, Vec<ClosingFact>), ClosureError> {
        let mut sink = CollectedClosure::new(kind);
        let summary = close_member_kind(bundle, kind, &mut sink)?;
        Ok((summary, sink.into_facts()))
    };

    let ((scalar, structured), relation) = rayon::join(
        || rayon::join(|| run(MemberKind::Scalar), || run(MemberKind::Structured)),
        || run(MemberKind::Relation),
    );
    let (scalar_summary, scalar) = scalar?;
    let (structured_summary, structured) = structured?;
    let (relation_summary, relation) = relation?;

    tracing::debug!(
        scalar = scalar.len(),
        structured = structured.len(),
        relation = relation.len(),
        "bundle closed"
    );

    Ok(BundleClosure {
        scalar,
        structured,
        relation,
        summaries: [scalar_summary, structured_summary, relation_summary],
    })
}
