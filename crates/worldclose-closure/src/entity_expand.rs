//! Entity expansion: restricted entities to their instance sets.

use std::collections::BTreeSet;
use worldclose_model::{DescriptionBundle, InstanceId, TermId};

/// All named instances typed by `entity` or any transitive subtype of it.
///
/// An entity with no instances expands to the empty set; that is a result,
/// not an error.
pub fn expanded_instances(bundle: &DescriptionBundle, entity: TermId) -> BTreeSet<InstanceId> {
    let mut out = BTreeSet::new();
    for &subtype in bundle.transitive_subtypes_of(entity).into_iter().flatten() {
        if let Some(instances) = bundle.instances_typed_by(subtype) {
            out.extend(instances.iter().copied());
        }
    }
    out
}
