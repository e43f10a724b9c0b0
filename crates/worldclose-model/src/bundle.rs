//! The description-bundle snapshot and its builder.
//!
//! A [`DescriptionBundle`] is an immutable, internally consistent snapshot:
//! every id handed out by the builder points into the bundle's arenas, and
//! every kind constraint (entities type instances, members carry
//! restrictions, specializations stay within one kind) was checked when the
//! fact was added. Downstream passes can therefore treat dangling
//! references as impossible by construction.

use crate::error::ModelError;
use crate::instance::{InstanceId, Literal, NamedInstance, StructureId, StructureInstance};
use crate::restriction::{Restriction, RestrictionKind};
use crate::term::{Term, TermId, TermKind};
use ahash::{AHashMap, AHashSet};
use std::collections::BTreeSet;

/// Read-only snapshot of one description bundle.
#[derive(Debug, Clone, Default)]
pub struct DescriptionBundle {
    terms: Vec<Term>,
    term_ids: AHashMap<String, TermId>,
    /// Specialization edges `(sub, sup)`, kind-homogeneous.
    specializations: Vec<(TermId, TermId)>,
    /// Reflexive-transitive subtype closure, entities only.
    entity_subtypes: AHashMap<TermId, AHashSet<TermId>>,
    restrictions: AHashMap<TermId, Vec<Restriction>>,
    instances: Vec<NamedInstance>,
    instance_ids: AHashMap<String, InstanceId>,
    /// Direct typing index: entity -> instances asserted to have that type.
    instances_by_type: AHashMap<TermId, BTreeSet<InstanceId>>,
    structures: Vec<StructureInstance>,
    scalar_assertions: AHashMap<(InstanceId, TermId), BTreeSet<Literal>>,
    structure_assertions: AHashMap<(InstanceId, TermId), BTreeSet<StructureId>>,
    link_assertions: AHashMap<(InstanceId, TermId), BTreeSet<InstanceId>>,
}

impl DescriptionBundle {
    pub fn builder() -> BundleBuilder {
        BundleBuilder::default()
    }

    pub fn term(&self, id: TermId) -> &Term {
        &self.terms[id.index()]
    }

    pub fn term_name(&self, id: TermId) -> &str {
        &self.terms[id.index()].name
    }

    pub fn term_kind(&self, id: TermId) -> TermKind {
        self.terms[id.index()].kind
    }

    pub fn lookup(&self, name: &str) -> Option<TermId> {
        self.term_ids.get(name).copied()
    }

    pub fn term_count(&self) -> usize {
        self.terms.len()
    }

    /// All terms of one kind, in declaration order.
    pub fn terms_of_kind(&self, kind: TermKind) -> impl Iterator<Item = TermId> + '_ {
        self.terms
            .iter()
            .enumerate()
            .filter(move |(_, t)| t.kind == kind)
            .map(|(i, _)| TermId::new(i as u32))
    }

    /// Restrictions declared directly on `entity` (non-transitive).
    pub fn restrictions_of(&self, entity: TermId) -> &[Restriction] {
        self.restrictions
            .get(&entity)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Entities carrying at least one direct restriction.
    pub fn restricted_entities(&self) -> impl Iterator<Item = TermId> + '_ {
        self.restrictions.keys().copied()
    }

    /// Specialization edges `(sub, sup)` among terms of `kind`.
    pub fn specialization_edges(&self, kind: TermKind) -> Vec<(TermId, TermId)> {
        self.specializations
            .iter()
            .copied()
            .filter(|&(sub, _)| self.term_kind(sub) == kind)
            .collect()
    }

    /// Reflexive-transitive subtypes of `entity` (includes `entity` itself).
    /// `None` for terms that are not entities.
    pub fn transitive_subtypes_of(&self, entity: TermId) -> Option<&AHashSet<TermId>> {
        self.entity_subtypes.get(&entity)
    }

    /// Instances directly typed by `entity` (no subtype expansion).
    pub fn instances_typed_by(&self, entity: TermId) -> Option<&BTreeSet<InstanceId>> {
        self.instances_by_type.get(&entity)
    }

    pub fn instance(&self, id: InstanceId) -> &NamedInstance {
        &self.instances[id.index()]
    }

    pub fn lookup_instance(&self, name: &str) -> Option<InstanceId> {
        self.instance_ids.get(name).copied()
    }

    pub fn instance_name(&self, id: InstanceId) -> &str {
        &self.instances[id.index()].name
    }

    pub fn instance_count(&self) -> usize {
        self.instances.len()
    }

    pub fn structure(&self, id: StructureId) -> &StructureInstance {
        &self.structures[id.index()]
    }

    /// Distinct literal values asserted directly on `(instance, property)`.
    pub fn scalar_values_of(
        &self,
        instance: InstanceId,
        property: TermId,
    ) -> Option<&BTreeSet<Literal>> {
        self.scalar_assertions.get(&(instance, property))
    }

    /// Distinct structure instances asserted directly on `(instance, property)`.
    pub fn structure_values_of(
        &self,
        instance: InstanceId,
        property: TermId,
    ) -> Option<&BTreeSet<StructureId>> {
        self.structure_assertions.get(&(instance, property))
    }

    /// Distinct link targets asserted directly on `(instance, relation)`.
    pub fn link_targets_of(
        &self,
        instance: InstanceId,
        relation: TermId,
    ) -> Option<&BTreeSet<InstanceId>> {
        self.link_assertions.get(&(instance, relation))
    }
}

/// Mutable assembly side of [`DescriptionBundle`].
///
/// All cross-references are validated as they are added, so `build` never
/// fails: a builder that accepted every call produces a consistent snapshot.
#[derive(Debug, Default)]
pub struct BundleBuilder {
    bundle: DescriptionBundle,
}

impl BundleBuilder {
    /// Declare an entity term.
    pub fn entity(&mut self, name: impl Into<String>) -> Result<TermId, ModelError> {
        self.declare(name.into(), TermKind::Entity)
    }

    /// Declare a scalar property term.
    pub fn scalar_property(&mut self, name: impl Into<String>) -> Result<TermId, ModelError> {
        self.declare(name.into(), TermKind::ScalarProperty)
    }

    /// Declare a structured property term.
    pub fn structured_property(
        &mut self,
        name: impl Into<String>,
    ) -> Result<TermId, ModelError> {
        self.declare(name.into(), TermKind::StructuredProperty)
    }

    /// Declare a relation term.
    pub fn relation(&mut self, name: impl Into<String>) -> Result<TermId, ModelError> {
        self.declare(name.into(), TermKind::Relation)
    }

    fn declare(&mut self, name: String, kind: TermKind) -> Result<TermId, ModelError> {
        if self.bundle.term_ids.contains_key(&name) {
            return Err(ModelError::DuplicateTerm { name });
        }
        let id = TermId::new(self.bundle.terms.len() as u32);
        self.bundle.term_ids.insert(name.clone(), id);
        self.bundle.terms.push(Term { name, kind });
        Ok(id)
    }

    /// Resolve a previously declared term by name.
    pub fn resolve(&self, name: &str) -> Result<TermId, ModelError> {
        self.bundle
            .lookup(name)
            .ok_or_else(|| ModelError::UnknownTerm {
                name: name.to_string(),
            })
    }

    /// Assert `sub ⊑ sup`. Both terms must be of the same kind.
    pub fn specializes(&mut self, sub: TermId, sup: TermId) -> Result<(), ModelError> {
        if sub == sup {
            return Err(ModelError::SelfSpecialization {
                name: self.bundle.term_name(sub).to_string(),
            });
        }
        let sub_kind = self.bundle.term_kind(sub);
        let sup_kind = self.bundle.term_kind(sup);
        if sub_kind != sup_kind {
            return Err(ModelError::SpecializationKindMismatch {
                sub: self.bundle.term_name(sub).to_string(),
                sub_kind,
                sup: self.bundle.term_name(sup).to_string(),
                sup_kind,
            });
        }
        self.bundle.specializations.push((sub, sup));
        Ok(())
    }

    /// Declare a restriction of `kind` on `member`, scoped to `entity`.
    pub fn restrict(
        &mut self,
        entity: TermId,
        member: TermId,
        kind: RestrictionKind,
    ) -> Result<(), ModelError> {
        let entity_kind = self.bundle.term_kind(entity);
        if entity_kind != TermKind::Entity {
            return Err(ModelError::RestrictionOnNonEntity {
                entity: self.bundle.term_name(entity).to_string(),
                kind: entity_kind,
            });
        }
        if self.bundle.term_kind(member).member_kind().is_none() {
            return Err(ModelError::RestrictionOnEntityMember {
                member: self.bundle.term_name(member).to_string(),
            });
        }
        self.bundle
            .restrictions
            .entry(entity)
            .or_default()
            .push(Restriction {
                entity,
                member,
                kind,
            });
        Ok(())
    }

    /// Declare a named instance with its direct entity types.
    pub fn instance(
        &mut self,
        name: impl Into<String>,
        types: &[TermId],
    ) -> Result<InstanceId, ModelError> {
        let name = name.into();
        if self.bundle.instance_ids.contains_key(&name) {
            return Err(ModelError::DuplicateInstance { name });
        }
        for &ty in types {
            let kind = self.bundle.term_kind(ty);
            if kind != TermKind::Entity {
                return Err(ModelError::TypeNotEntity {
                    instance: name,
                    ty: self.bundle.term_name(ty).to_string(),
                    kind,
                });
            }
        }
        let id = InstanceId::new(self.bundle.instances.len() as u32);
        self.bundle.instance_ids.insert(name.clone(), id);
        self.bundle.instances.push(NamedInstance {
            name,
            types: types.to_vec(),
        });
        for &ty in types {
            self.bundle
                .instances_by_type
                .entry(ty)
                .or_default()
                .insert(id);
        }
        Ok(id)
    }

    /// Create an anonymous structure instance.
    pub fn structure(&mut self, attrs: Vec<(String, Literal)>) -> StructureId {
        let id = StructureId::new(self.bundle.structures.len() as u32);
        self.bundle.structures.push(StructureInstance { attrs });
        id
    }

    /// Assert a literal value of a scalar property.
    pub fn assert_scalar(
        &mut self,
        subject: InstanceId,
        property: TermId,
        value: Literal,
    ) -> Result<(), ModelError> {
        self.check_member(property, TermKind::ScalarProperty)?;
        self.bundle
            .scalar_assertions
            .entry((subject, property))
            .or_default()
            .insert(value);
        Ok(())
    }

    /// Assert a structure-instance value of a structured property.
    pub fn assert_structure(
        &mut self,
        subject: InstanceId,
        property: TermId,
        value: StructureId,
    ) -> Result<(), ModelError> {
        self.check_member(property, TermKind::StructuredProperty)?;
        self.bundle
            .structure_assertions
            .entry((subject, property))
            .or_default()
            .insert(value);
        Ok(())
    }

    /// Assert a link from `subject` to `target` through `relation`.
    pub fn assert_link(
        &mut self,
        subject: InstanceId,
        relation: TermId,
        target: InstanceId,
    ) -> Result<(), ModelError> {
        self.check_member(relation, TermKind::Relation)?;
        self.bundle
            .link_assertions
            .entry((subject, relation))
            .or_default()
            .insert(target);
        Ok(())
    }

    fn check_member(&self, member: TermId, expected: TermKind) -> Result<(), ModelError> {
        let actual = self.bundle.term_kind(member);
        if actual != expected {
            return Err(ModelError::AssertionKindMismatch {
                member: self.bundle.term_name(member).to_string(),
                expected,
                actual,
            });
        }
        Ok(())
    }

    /// Freeze the snapshot, precomputing the entity subtype closure.
    pub fn build(mut self) -> DescriptionBundle {
        self.bundle.entity_subtypes = compute_entity_subtype_closure(&self.bundle);
        self.bundle
    }
}

/// Reflexive-transitive subtype closure over the entity specialization DAG.
fn compute_entity_subtype_closure(
    bundle: &DescriptionBundle,
) -> AHashMap<TermId, AHashSet<TermId>> {
    let mut direct_subs: AHashMap<TermId, Vec<TermId>> = AHashMap::new();
    for &(sub, sup) in &bundle.specializations {
        if bundle.term_kind(sub) == TermKind::Entity {
            direct_subs.entry(sup).or_default().push(sub);
        }
    }

    let mut subtypes_of: AHashMap<TermId, AHashSet<TermId>> = AHashMap::new();
    for ty in bundle.terms_of_kind(TermKind::Entity) {
        let mut subs = AHashSet::new();
        subs.insert(ty);
        let mut stack: Vec<TermId> = direct_subs.get(&ty).cloned().unwrap_or_default();
        while let Some(sub) = stack.pop() {
            if subs.insert(sub) {
                if let Some(next) = direct_subs.get(&sub) {
                    stack.extend(next.iter().copied());
                }
            }
        }
        subtypes_of.insert(ty, subs);
    }

    subtypes_of
}
