//! Restriction scanning: which entities need closure for which members.

use std::collections::{BTreeMap, BTreeSet};
use worldclose_model::{DescriptionBundle, MemberKind, TermId};

/// Members of `kind` restricted by each entity with MIN, EXACTLY, or SOME.
///
/// MAX and ALL restrictions are skipped: their violations are entailable
/// from explicit data without closing the world. Entities with no
/// qualifying restriction of this kind are absent from the map.
pub fn restricted_members(
    bundle: &DescriptionBundle,
    kind: MemberKind,
) -> BTreeMap<TermId, BTreeSet<TermId>> {
    let mut out: BTreeMap<TermId, BTreeSet<TermId>> = BTreeMap::new();
    for entity in bundle.restricted_entities() {
        let mut members = BTreeSet::new();
        for restriction in bundle.restrictions_of(entity) {
            if !restriction.kind.requires_closure() {
                continue;
            }
            if bundle.term_kind(restriction.member).member_kind() != Some(kind) {
                continue;
            }
            members.insert(restriction.member);
        }
        if !members.is_empty() {
            out.insert(entity, members);
        }
    }
    out
}
