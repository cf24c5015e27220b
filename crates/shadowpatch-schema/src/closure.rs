//! Closure resolution: the transitive set of types that need a shadow
//! schema, starting from the root entry-point types.

use crate::{
    build::SchemaBuildError,
    classify::{Classifier, ConstructorPlan, Eligibility},
    error::ErrorTree,
    node::{MemberDescriptor, TypeRef},
};
use std::collections::{BTreeMap, BTreeSet, VecDeque};

///
/// ClosureEntry
///
/// Classification output for one closure type, kept so synthesis does not
/// classify again.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ClosureEntry {
    pub constructor: ConstructorPlan,
    pub members: Vec<MemberDescriptor>,
}

///
/// Closure
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Closure {
    order: Vec<TypeRef>,
    entries: BTreeMap<TypeRef, ClosureEntry>,
}

impl Closure {
    /// Closure members as a set; independent of visitation order.
    #[must_use]
    pub fn types(&self) -> BTreeSet<TypeRef> {
        self.entries.keys().cloned().collect()
    }

    /// Discovery order. Callers must not depend on it beyond stability.
    #[must_use]
    pub fn order(&self) -> &[TypeRef] {
        &self.order
    }

    #[must_use]
    pub fn entry(&self, ty: &TypeRef) -> Option<&ClosureEntry> {
        self.entries.get(ty)
    }

    #[must_use]
    pub fn contains(&self, ty: &TypeRef) -> bool {
        self.entries.contains_key(ty)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// Resolve the closure of `roots` over nested, map-value and list-element
/// edges. Every failure is reported once, routed by the offending type.
pub fn resolve(classifier: &Classifier<'_>, roots: &BTreeSet<TypeRef>) -> Result<Closure, ErrorTree> {
    let mut closure = Closure::default();
    let mut errs = ErrorTree::new();
    let mut reported = BTreeSet::new();

    let mut seen: BTreeSet<TypeRef> = roots.iter().cloned().collect();
    let mut queue: VecDeque<TypeRef> = roots.iter().cloned().collect();

    while let Some(ty) = queue.pop_front() {
        let entry = match visit(classifier, &ty, roots.contains(&ty)) {
            Ok(Some(entry)) => entry,
            Ok(None) => continue,
            Err(err) => {
                report(&mut errs, &mut reported, &err);
                continue;
            }
        };

        // Phase 2: enqueue patchable edges not yet seen.
        for member in &entry.members {
            if let Some(target) = member.classification.patchable_target()
                && seen.insert(target.clone())
            {
                queue.push_back(target.clone());
            }
        }

        closure.order.push(ty.clone());
        closure.entries.insert(ty, entry);
    }

    errs.result().map(|()| closure)
}

// Phase 1: eligibility + member classification for a single type.
fn visit(
    classifier: &Classifier<'_>,
    ty: &TypeRef,
    is_root: bool,
) -> Result<Option<ClosureEntry>, SchemaBuildError> {
    let constructor = match classifier.eligibility(ty)? {
        Eligibility::Eligible(plan) => plan,
        Eligibility::Ineligible(reason) if is_root => {
            return Err(SchemaBuildError::IneligibleRoot {
                ty: ty.clone(),
                reason,
            });
        }
        // non-roots only get here through an eligible classification
        Eligibility::Ineligible(_) => return Ok(None),
    };
    let members = classifier.describe_members(ty)?;

    Ok(Some(ClosureEntry {
        constructor,
        members,
    }))
}

fn report(errs: &mut ErrorTree, reported: &mut BTreeSet<String>, err: &SchemaBuildError) {
    let route = err.ty().to_string();
    let message = err.to_string();

    if reported.insert(format!("{route}\u{0}{message}")) {
        errs.add_for(route, message);
    }
}

///
/// TESTS
///
