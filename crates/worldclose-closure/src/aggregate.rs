//! Bottom-up aggregation of distinct value counts.
//!
//! One generic routine covers all three member kinds; only the counted value
//! type differs (literals, structure ids, instance ids), and it is required
//! to carry nothing beyond equality and hashing.
//!
//! A fact asserted through a specialization of a member counts as a fact of
//! that member, transitively through arbitrarily many levels. The walk is
//! therefore strictly post-order: a node's value set is read by its parent
//! only after the node has absorbed all of its own descendants. A preorder
//! pass would under-count every ancestor above depth two.

use crate::specialization_forest::SpecializationForest;
use ahash::{AHashMap, AHashSet};
use std::collections::{BTreeMap, BTreeSet};
use std::hash::Hash;
use worldclose_model::{InstanceId, TermId};

/// Distinct-value counts per `(instance, restricted member)` pair.
pub type CountTable = BTreeMap<(InstanceId, TermId), usize>;

/// Aggregate distinct-value counts for every restricted member of every
/// expanded instance.
///
/// `restricted` maps each entity to its restricted members of one kind,
/// `expanded` maps the same entities to their expanded instance sets, and
/// `direct_values` returns the distinct values asserted *directly* on an
/// `(instance, member)` pair. Instances are independent; an instance with no
/// assertions anywhere in a member's subtree is recorded with count zero,
/// which downstream consumers still need (it closes the member and makes an
/// unmet minimum visible).
pub fn aggregate_counts<V, F>(
    restricted: &BTreeMap<TermId, BTreeSet<TermId>>,
    expanded: &BTreeMap<TermId, BTreeSet<InstanceId>>,
    forest: &SpecializationForest,
    direct_values: F,
) -> CountTable
where
    V: Eq + Hash + Clone,
    F: Fn(InstanceId, TermId) -> Vec<V>,
{
    let mut counts = CountTable::new();
    for (entity, members) in restricted {
        let Some(instances) = expanded.get(entity) else {
            continue;
        };
        for &instance in instances {
            // Fully merged value sets per member, shared across the
            // restricted members of this instance (their subtrees may
            // overlap). A set is inserted only once all of its descendants
            // have been merged in, so it is final from then on.
            let mut merged: AHashMap<TermId, AHashSet<V>> = AHashMap::new();
            for &member in members {
                // The scanner and the forest are built from the same
                // snapshot, so every restricted member of this kind has a
                // component tree.
                let Some(tree) = forest.tree_of(member) else {
                    continue;
                };
                for node in tree.post_order_from(member) {
                    if merged.contains_key(&node) {
                        continue;
                    }
                    let mut values: AHashSet<V> =
                        direct_values(instance, node).into_iter().collect();
                    for &child in tree.children_of(node) {
                        if let Some(child_values) = merged.get(&child) {
                            values.extend(child_values.iter().cloned());
                        }
                    }
                    merged.insert(node, values);
                }
                counts.insert((instance, member), merged[&member].len());
            }
        }
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::restriction_scan::restricted_members;
    use worldclose_model::{
        BundleBuilder, DescriptionBundle, Literal, MemberKind, RestrictionKind,
    };

    fn run_scalar(builder: BundleBuilder) -> (DescriptionBundle, CountTable) {
        let bundle = builder.build();
        let restricted = restricted_members(&bundle, MemberKind::Scalar);
        let forest = SpecializationForest::build(&bundle, MemberKind::Scalar).expect("forest");
        let expanded = restricted
            .keys()
            .map(|&e| (e, crate::entity_expand::expanded_instances(&bundle, e)))
            .collect();
        let counts = aggregate_counts(&restricted, &expanded, &forest, |i, m| {
            bundle
                .scalar_values_of(i, m)
                .map(|values| values.iter().cloned().collect())
                .unwrap_or_default()
        });
        (bundle, counts)
    }

    #[test]
    fn identical_values_count_once() {
        let mut builder = DescriptionBundle::builder();
        let component = builder.entity("Component").expect("entity");
        let id = builder.scalar_property("hasIdentifier").expect("property");
        let short_id = builder.scalar_property("hasShortIdentifier").expect("property");
        builder.specializes(short_id, id).expect("⊑");
        builder
            .restrict(component, id, RestrictionKind::Min { bound: 1 })
            .expect("restrict");
        let c1 = builder.instance("c1", &[component]).expect("instance");
        // The same value through the property and through its specialization.
        builder
            .assert_scalar(c1, id, Literal::string("C-001"))
            .expect("assert");
        builder
            .assert_scalar(c1, short_id, Literal::string("C-001"))
            .expect("assert");

        let (_, counts) = run_scalar(builder);
        assert_eq!(counts[&(c1, id)], 1);
    }

    #[test]
    fn specialized_assertion_counts_toward_the_general_member() {
        let mut builder = DescriptionBundle::builder();
        let component = builder.entity("Component").expect("entity");
        let id = builder.scalar_property("hasIdentifier").expect("property");
        let short_id = builder.scalar_property("hasShortIdentifier").expect("property");
        builder.specializes(short_id, id).expect("⊑");
        builder
            .restrict(component, id, RestrictionKind::Exactly { bound: 2 })
            .expect("restrict");
        let c1 = builder.instance("c1", &[component]).expect("instance");
        builder
            .assert_scalar(c1, id, Literal::string("C-001"))
            .expect("assert");
        builder
            .assert_scalar(c1, short_id, Literal::string("C1"))
            .expect("assert");

        let (_, counts) = run_scalar(builder);
        assert_eq!(counts[&(c1, id)], 2);
    }

    #[test]
    fn deep_chain_propagates_across_intermediate_levels() {
        // p3 ⊑ p2 ⊑ p1 with the only assertion at the most specific level:
        // the value must surface at the root through both hops.
        let mut builder = DescriptionBundle::builder();
        let component = builder.entity("Component").expect("entity");
        let p1 = builder.scalar_property("hasIdentifier").expect("property");
        let p2 = builder.scalar_property("hasShortIdentifier").expect("property");
        let p3 = builder.scalar_property("hasAcronym").expect("property");
        builder.specializes(p2, p1).expect("⊑");
        builder.specializes(p3, p2).expect("⊑");
        builder
            .restrict(component, p1, RestrictionKind::Min { bound: 1 })
            .expect("restrict");
        let c1 = builder.instance("c1", &[component]).expect("instance");
        builder
            .assert_scalar(c1, p3, Literal::string("ACME"))
            .expect("assert");

        let (_, counts) = run_scalar(builder);
        assert_eq!(counts[&(c1, p1)], 1);
    }

    #[test]
    fn interior_member_sums_only_its_own_subtree() {
        let mut builder = DescriptionBundle::builder();
        let component = builder.entity("Component").expect("entity");
        let p1 = builder.scalar_property("hasIdentifier").expect("property");
        let p2 = builder.scalar_property("hasShortIdentifier").expect("property");
        let p3 = builder.scalar_property("hasAcronym").expect("property");
        builder.specializes(p2, p1).expect("⊑");
        builder.specializes(p3, p2).expect("⊑");
        builder
            .restrict(component, p2, RestrictionKind::Min { bound: 1 })
            .expect("restrict");
        let c1 = builder.instance("c1", &[component]).expect("instance");
        builder
            .assert_scalar(c1, p1, Literal::string("root-only"))
            .expect("assert");
        builder
            .assert_scalar(c1, p3, Literal::string("ACME"))
            .expect("assert");

        let (_, counts) = run_scalar(builder);
        // The ancestor's own value does not leak downward.
        assert_eq!(counts[&(c1, p2)], 1);
        assert!(!counts.contains_key(&(c1, p1)));
    }

    #[test]
    fn instance_without_assertions_is_recorded_with_zero() {
        let mut builder = DescriptionBundle::builder();
        let component = builder.entity("Component").expect("entity");
        let id = builder.scalar_property("hasIdentifier").expect("property");
        builder
            .restrict(component, id, RestrictionKind::Min { bound: 1 })
            .expect("restrict");
        let c1 = builder.instance("c1", &[component]).expect("instance");

        let (_, counts) = run_scalar(builder);
        assert_eq!(counts[&(c1, id)], 0);
    }

    #[test]
    fn instances_do_not_share_values() {
        let mut builder = DescriptionBundle::builder();
        let component = builder.entity("Component").expect("entity");
        let id = builder.scalar_property("hasIdentifier").expect("property");
        builder
            .restrict(component, id, RestrictionKind::Min { bound: 1 })
            .expect("restrict");
        let c1 = builder.instance("c1", &[component]).expect("instance");
        let c2 = builder.instance("c2", &[component]).expect("instance");
        builder
            .assert_scalar(c1, id, Literal::string("C-001"))
            .expect("assert");
        builder
            .assert_scalar(c1, id, Literal::string("C-002"))
            .expect("assert");

        let (_, counts) = run_scalar(builder);
        assert_eq!(counts[&(c1, id)], 2);
        assert_eq!(counts[&(c2, id)], 0);
    }
}
