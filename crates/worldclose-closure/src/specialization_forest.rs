//! Validated specialization forests for one member kind.
//!
//! Properties and relations must form single-rooted trees within each
//! connected specialization component. That shape is a hard precondition of
//! the bottom-up aggregation, so it is checked here at construction rather
//! than assumed:
//!
//! - a component where every member has a generalization hides a cycle,
//! - a component with several parentless members is ambiguously rooted, and
//! - a member with several direct generalizations breaks the tree shape.
//!
//! A connected component passing all three checks has exactly `n - 1` edges
//! with one parentless vertex, which is a tree, so no further validation is
//! needed before traversal.

use crate::error::ClosureError;
use ahash::{AHashMap, AHashSet};
use std::collections::{BTreeSet, VecDeque};
use worldclose_model::{DescriptionBundle, MemberKind, TermId};

/// One validated specialization tree: a connected component of the member
/// specialization graph with its single root.
#[derive(Debug, Clone)]
pub struct SpecializationTree {
    root: TermId,
    members: BTreeSet<TermId>,
    children: AHashMap<TermId, Vec<TermId>>,
    parent: AHashMap<TermId, TermId>,
}

impl SpecializationTree {
    pub fn root(&self) -> TermId {
        self.root
    }

    pub fn members(&self) -> &BTreeSet<TermId> {
        &self.members
    }

    pub fn contains(&self, member: TermId) -> bool {
        self.members.contains(&member)
    }

    /// Direct specializations of `member`, in declaration order.
    pub fn children_of(&self, member: TermId) -> &[TermId] {
        self.children
            .get(&member)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// The nearest generalization of `member` inside this tree.
    pub fn parent_of(&self, member: TermId) -> Option<TermId> {
        self.parent.get(&member).copied()
    }

    /// Post-order walk of the subtree rooted at `member`: every node appears
    /// after all of its descendants. Aggregation depends on this order to
    /// read child value sets only once they are fully merged.
    pub fn post_order_from(&self, member: TermId) -> Vec<TermId> {
        let mut out = Vec::new();
        let mut stack = vec![(member, false)];
        while let Some((node, expanded)) = stack.pop() {
            if expanded {
                out.push(node);
                continue;
            }
            stack.push((node, true));
            for &child in self.children_of(node) {
                stack.push((child, false));
            }
        }
        out
    }
}

/// All specialization trees of one member kind, indexed by member.
///
/// Every member of the kind maps to the tree of its connected component;
/// members with no specialization edges form singleton trees.
#[derive(Debug, Clone)]
pub struct SpecializationForest {
    kind: MemberKind,
    trees: Vec<SpecializationTree>,
    by_member: AHashMap<TermId, usize>,
}

impl SpecializationForest {
    /// Partition the `kind` members of `bundle` into validated trees.
    pub fn build(
        bundle: &DescriptionBundle,
        kind: MemberKind,
    ) -> Result<Self, ClosureError> {
        let vertices: Vec<TermId> = bundle.terms_of_kind(kind.term_kind()).collect();
        // Re-asserting an edge is semantically one specialization.
        let mut edges = bundle.specialization_edges(kind.term_kind());
        edges.sort();
        edges.dedup();

        let mut parents_of: AHashMap<TermId, Vec<TermId>> = AHashMap::new();
        let mut children_of: AHashMap<TermId, Vec<TermId>> = AHashMap::new();
        let mut neighbors: AHashMap<TermId, Vec<TermId>> = AHashMap::new();
        for &(sub, sup) in &edges {
            parents_of.entry(sub).or_default().push(sup);
            children_of.entry(sub).or_default();
            children_of.entry(sup).or_default().push(sub);
            neighbors.entry(sub).or_default().push(sup);
            neighbors.entry(sup).or_default().push(sub);
        }

        let names = |members: &BTreeSet<TermId>| -> Vec<String> {
            members
                .iter()
                .map(|&m| bundle.term_name(m).to_string())
                .collect()
        };

        let mut trees: Vec<SpecializationTree> = Vec::new();
        let mut by_member: AHashMap<TermId, usize> = AHashMap::new();
        let mut seen: AHashSet<TermId> = AHashSet::new();

        for &start in &vertices {
            if !seen.insert(start) {
                continue;
            }

            // Connected component of the undirected specialization view.
            let mut component: BTreeSet<TermId> = BTreeSet::new();
            component.insert(start);
            let mut queue = VecDeque::from([start]);
            while let Some(member) = queue.pop_front() {
                for &next in neighbors.get(&member).map(Vec::as_slice).unwrap_or_default() {
                    if seen.insert(next) {
                        component.insert(next);
                        queue.push_back(next);
                    }
                }
            }

            let roots: Vec<TermId> = component
                .iter()
                .copied()
                .filter(|m| parents_of.get(m).map_or(true, |parents| parents.is_empty()))
                .collect();

            if roots.is_empty() {
                return Err(ClosureError::CyclicSpecialization {
                    kind,
                    members: names(&component),
                });
            }
            if roots.len() > 1 {
                return Err(ClosureError::MultiplyRootedFamily {
                    kind,
                    members: names(&component),
                    roots: roots
                        .iter()
                        .map(|&m| bundle.term_name(m).to_string())
                        .collect(),
                });
            }

            let mut parent: AHashMap<TermId, TermId> = AHashMap::new();
            for &member in &component {
                let direct = parents_of.get(&member).map(Vec::as_slice).unwrap_or_default();
                match direct {
                    [] => {}
                    [sup] => {
                        parent.insert(member, *sup);
                    }
                    many => {
                        let mut sups: Vec<String> =
                            many.iter().map(|&m| bundle.term_name(m).to_string()).collect();
                        sups.sort();
                        sups.dedup();
                        return Err(ClosureError::MultipleGeneralizations {
                            kind,
                            member: bundle.term_name(member).to_string(),
                            parents: sups,
                        });
                    }
                }
            }

            let mut children: AHashMap<TermId, Vec<TermId>> = AHashMap::new();
            for &member in &component {
                let mut kids = children_of
                    .get(&member)
                    .cloned()
                    .unwrap_or_default();
                kids.sort();
                kids.dedup();
                children.insert(member, kids);
            }

            let index = trees.len();
            for &member in &component {
                by_member.insert(member, index);
            }
            trees.push(SpecializationTree {
                root: roots[0],
                members: component,
                children,
                parent,
            });
        }

        Ok(Self {
            kind,
            trees,
            by_member,
        })
    }

    pub fn kind(&self) -> MemberKind {
        self.kind
    }

    pub fn trees(&self) -> &[SpecializationTree] {
        &self.trees
    }

    /// The tree of `member`'s connected component. Total over the members
    /// of this forest's kind in the bundle it was built from.
    pub fn tree_of(&self, member: TermId) -> Option<&SpecializationTree> {
        self.by_member.get(&member).map(|&i| &self.trees[i])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use worldclose_model::DescriptionBundle;

    #[test]
    fn isolated_members_form_singleton_trees() {
        let mut builder = DescriptionBundle::builder();
        let mass = builder.scalar_property("hasMass").expect("property");
        let id = builder.scalar_property("hasIdentifier").expect("property");
        let bundle = builder.build();

        let forest = SpecializationForest::build(&bundle, MemberKind::Scalar).expect("forest");
        assert_eq!(forest.trees().len(), 2);
        let tree = forest.tree_of(mass).expect("tree");
        assert_eq!(tree.root(), mass);
        assert!(tree.children_of(mass).is_empty());
        assert_eq!(forest.tree_of(id).expect("tree").root(), id);
    }

    #[test]
    fn chain_builds_one_tree_with_postorder_children_first() {
        let mut builder = DescriptionBundle::builder();
        let p1 = builder.scalar_property("hasIdentifier").expect("property");
        let p2 = builder.scalar_property("hasShortIdentifier").expect("property");
        let p3 = builder.scalar_property("hasAcronym").expect("property");
        builder.specializes(p2, p1).expect("p2 ⊑ p1");
        builder.specializes(p3, p2).expect("p3 ⊑ p2");
        let bundle = builder.build();

        let forest = SpecializationForest::build(&bundle, MemberKind::Scalar).expect("forest");
        let tree = forest.tree_of(p3).expect("tree");
        assert_eq!(tree.root(), p1);
        assert_eq!(tree.parent_of(p3), Some(p2));
        assert_eq!(tree.post_order_from(p1), vec![p3, p2, p1]);
        assert_eq!(tree.post_order_from(p2), vec![p3, p2]);
    }

    #[test]
    fn cyclic_family_is_rejected_with_named_members() {
        // X ⊑ Z and Y ⊑ Z while Z ⊑ X: the X/Z loop means no member of the
        // component is parentless.
        let mut builder = DescriptionBundle::builder();
        let x = builder.relation("feeds").expect("relation");
        let y = builder.relation("powers").expect("relation");
        let z = builder.relation("suppliesTo").expect("relation");
        builder.specializes(x, z).expect("x ⊑ z");
        builder.specializes(y, z).expect("y ⊑ z");
        builder.specializes(z, x).expect("z ⊑ x");
        let bundle = builder.build();

        let err = SpecializationForest::build(&bundle, MemberKind::Relation).unwrap_err();
        match err {
            ClosureError::CyclicSpecialization { kind, members } => {
                assert_eq!(kind, MemberKind::Relation);
                assert_eq!(members, vec!["feeds", "powers", "suppliesTo"]);
            }
            other => panic!("expected cycle error, got {other}"),
        }
    }

    #[test]
    fn multiply_rooted_family_is_rejected_with_named_roots() {
        let mut builder = DescriptionBundle::builder();
        let a = builder.relation("contains").expect("relation");
        let b = builder.relation("supplies").expect("relation");
        let d = builder.relation("hosts").expect("relation");
        builder.specializes(d, a).expect("d ⊑ a");
        builder.specializes(d, b).expect("d ⊑ b");
        let bundle = builder.build();

        let err = SpecializationForest::build(&bundle, MemberKind::Relation).unwrap_err();
        match err {
            ClosureError::MultiplyRootedFamily { roots, members, .. } => {
                assert_eq!(roots, vec!["contains", "supplies"]);
                assert_eq!(members.len(), 3);
            }
            other => panic!("expected multi-root error, got {other}"),
        }
    }

    #[test]
    fn diamond_under_one_root_is_rejected() {
        // b ⊑ a, c ⊑ a, d ⊑ b, d ⊑ c: one root, but d has two parents.
        let mut builder = DescriptionBundle::builder();
        let a = builder.relation("contains").expect("relation");
        let b = builder.relation("assembles").expect("relation");
        let c = builder.relation("hosts").expect("relation");
        let d = builder.relation("mounts").expect("relation");
        builder.specializes(b, a).expect("b ⊑ a");
        builder.specializes(c, a).expect("c ⊑ a");
        builder.specializes(d, b).expect("d ⊑ b");
        builder.specializes(d, c).expect("d ⊑ c");
        let bundle = builder.build();

        let err = SpecializationForest::build(&bundle, MemberKind::Relation).unwrap_err();
        match err {
            ClosureError::MultipleGeneralizations { member, parents, .. } => {
                assert_eq!(member, "mounts");
                assert_eq!(parents, vec!["assembles", "hosts"]);
            }
            other => panic!("expected multiple-generalizations error, got {other}"),
        }
    }
}
