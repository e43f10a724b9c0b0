//! Closing-fact emission.

use crate::aggregate::CountTable;
use serde::{Deserialize, Serialize};
use worldclose_model::{InstanceId, MemberKind, TermId};

/// One synthesized upper-bound fact: `subject`'s distinct values of
/// `member`, counted across the member's whole specialization subtree, are
/// exactly `count`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct ClosingFact {
    pub subject: InstanceId,
    pub member: TermId,
    pub kind: MemberKind,
    pub count: usize,
}

/// Output-emission collaborator. The implementor renders each fact into the
/// target constraint language (e.g. an upper-bound class-membership fact
/// keyed by subject, member, and integer bound); this subsystem never
/// serializes anything itself.
pub trait ClosureSink {
    fn emit_max_cardinality_closure(
        &mut self,
        subject: InstanceId,
        member: TermId,
        count: usize,
    ) -> anyhow::Result<()>;
}

/// Default sink: collects the facts of one member kind in memory.
#[derive(Debug, Clone)]
pub struct CollectedClosure {
    kind: MemberKind,
    facts: Vec<ClosingFact>,
}

impl CollectedClosure {
    pub fn new(kind: MemberKind) -> Self {
        Self {
            kind,
            facts: Vec::new(),
        }
    }

    pub fn kind(&self) -> MemberKind {
        self.kind
    }

    pub fn len(&self) -> usize {
        self.facts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }

    /// The collected facts, sorted by subject then member.
    pub fn into_facts(mut self) -> Vec<ClosingFact> {
        self.facts.sort();
        self.facts
    }
}

impl ClosureSink for CollectedClosure {
    fn emit_max_cardinality_closure(
        &mut self,
        subject: InstanceId,
        member: TermId,
        count: usize,
    ) -> anyhow::Result<()> {
        self.facts.push(ClosingFact {
            subject,
            member,
            kind: self.kind,
            count,
        });
        Ok(())
    }
}

/// Drain a completed count table into a sink, one fact per entry.
pub(crate) fn emit_counts(
    counts: &CountTable,
    sink: &mut dyn ClosureSink,
) -> Result<usize, (InstanceId, TermId, anyhow::Error)> {
    let mut emitted = 0usize;
    for (&(subject, member), &count) in counts {
        sink.emit_max_cardinality_closure(subject, member, count)
            .map_err(|e| (subject, member, e))?;
        emitted += 1;
    }
    Ok(emitted)
}
