//! Type classification.
//!
//! Every member type is sorted into exactly one `Classification`, computed
//! once at schema build time and carried on the member descriptor. The
//! merge engine dispatches on the derived strategy and never re-inspects
//! types.

use crate::{
    build::SchemaBuildError,
    node::{MemberAccess, MemberDescriptor, TypeDef, TypeGraph, TypeKind, TypeRef, TypeShape},
};
use derive_more::Display;
use serde::Serialize;

///
/// Classification
///

#[derive(Clone, Debug, Eq, Hash, PartialEq, Serialize)]
pub enum Classification {
    /// Reference-type scalar; assigned as-is, null clears.
    Scalar,

    /// Non-nullable value-type scalar; shadowed as an explicit nullable.
    ScalarNeedsNullable,

    /// Shape-eligible record merged recursively.
    Nested(TypeRef),

    MapOfScalar { key: TypeRef, value: TypeRef },

    MapOfPatchable { key: TypeRef, value: TypeRef },

    ListOfPatchable(TypeRef),

    ListOfScalar(TypeRef),

    /// Unsupported shape; carried through unpatched.
    Opaque,
}

impl Classification {
    /// The type that must itself receive a shadow schema, if any.
    #[must_use]
    pub const fn patchable_target(&self) -> Option<&TypeRef> {
        match self {
            Self::Nested(ty) | Self::ListOfPatchable(ty) | Self::MapOfPatchable { value: ty, .. } => {
                Some(ty)
            }
            _ => None,
        }
    }

    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Scalar => "scalar",
            Self::ScalarNeedsNullable => "scalar (nullable conversion)",
            Self::Nested(_) => "nested",
            Self::MapOfScalar { .. } => "map of scalar",
            Self::MapOfPatchable { .. } => "map of patchable",
            Self::ListOfPatchable(_) => "list of patchable",
            Self::ListOfScalar(_) => "list of scalar",
            Self::Opaque => "opaque",
        }
    }
}

///
/// IneligibleReason
///

#[derive(Clone, Copy, Debug, Display, Eq, PartialEq, Serialize)]
pub enum IneligibleReason {
    #[display("abstract type")]
    Abstract,
    #[display("anonymous type")]
    Anonymous,
    #[display("builtin container")]
    Container,
    #[display("enumeration")]
    Enum,
    #[display("interface")]
    Interface,
    #[display("no usable constructor")]
    NoUsableConstructor,
    #[display("builtin primitive")]
    Primitive,
    #[display("generic parameters not bound")]
    UnboundGeneric,
    #[display("unknown type")]
    Unknown,
}

///
/// ConstructorKind
///

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub enum ConstructorKind {
    ZeroArg,
    Greediest,
}

///
/// PlannedParam
///
/// A constructor parameter and the settable member it initialises, if any.
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct PlannedParam {
    pub name: String,
    pub ty: TypeRef,
    pub member: Option<String>,
}

///
/// ConstructorPlan
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct ConstructorPlan {
    pub kind: ConstructorKind,
    pub params: Vec<PlannedParam>,
}

impl ConstructorPlan {
    #[must_use]
    pub const fn zero_arg() -> Self {
        Self {
            kind: ConstructorKind::ZeroArg,
            params: Vec::new(),
        }
    }
}

///
/// Eligibility
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Eligibility {
    Eligible(ConstructorPlan),
    Ineligible(IneligibleReason),
}

impl Eligibility {
    #[must_use]
    pub const fn is_eligible(&self) -> bool {
        matches!(self, Self::Eligible(_))
    }
}

///
/// Classifier
///

#[derive(Clone, Copy, Debug)]
pub struct Classifier<'a> {
    graph: &'a TypeGraph,
}

impl<'a> Classifier<'a> {
    #[must_use]
    pub const fn new(graph: &'a TypeGraph) -> Self {
        Self { graph }
    }

    #[must_use]
    pub const fn graph(&self) -> &'a TypeGraph {
        self.graph
    }

    /// Decide whether `ty` can receive a shadow schema, and how instances
    /// of it are constructed.
    pub fn eligibility(&self, ty: &TypeRef) -> Result<Eligibility, SchemaBuildError> {
        let reason = match ty.shape() {
            TypeShape::Named(_) => None,
            TypeShape::Primitive(_) => Some(IneligibleReason::Primitive),
            TypeShape::List(_)
            | TypeShape::Map(..)
            | TypeShape::Nullable(_)
            | TypeShape::Malformed => Some(IneligibleReason::Container),
        };
        if let Some(reason) = reason {
            return Ok(Eligibility::Ineligible(reason));
        }

        let Some(def) = self.graph.resolve(ty) else {
            return Ok(Eligibility::Ineligible(IneligibleReason::Unknown));
        };
        if let Some(reason) = Self::definition_rejection(def, ty) {
            return Ok(Eligibility::Ineligible(reason));
        }

        let ctors = def.usable_constructors();
        if ctors.is_empty() {
            return Ok(Eligibility::Ineligible(IneligibleReason::NoUsableConstructor));
        }

        self.plan_constructor(ty, def, &ctors).map(Eligibility::Eligible)
    }

    fn definition_rejection(def: &TypeDef, ty: &TypeRef) -> Option<IneligibleReason> {
        match def.kind {
            TypeKind::Enum => return Some(IneligibleReason::Enum),
            TypeKind::Interface => return Some(IneligibleReason::Interface),
            TypeKind::Record | TypeKind::Struct => {}
        }
        if def.is_abstract {
            return Some(IneligibleReason::Abstract);
        }
        if def.is_anonymous {
            return Some(IneligibleReason::Anonymous);
        }
        if def.generic_params.len() != ty.args.len() {
            return Some(IneligibleReason::UnboundGeneric);
        }

        None
    }

    // Zero-argument wins outright; otherwise the single greediest
    // constructor. A tie at the top arity is a build error.
    fn plan_constructor(
        &self,
        ty: &TypeRef,
        def: &TypeDef,
        ctors: &[crate::node::ConstructorDef],
    ) -> Result<ConstructorPlan, SchemaBuildError> {
        if ctors.iter().any(|ctor| ctor.arity() == 0) {
            return Ok(ConstructorPlan::zero_arg());
        }

        let arity = ctors.iter().map(|ctor| ctor.arity()).max().unwrap_or(0);
        let mut greediest = ctors.iter().filter(|ctor| ctor.arity() == arity);
        let (Some(chosen), None) = (greediest.next(), greediest.next()) else {
            return Err(SchemaBuildError::AmbiguousConstructor {
                ty: ty.clone(),
                arity,
            });
        };

        let members = self.graph.settable_members(ty)?;
        let params = chosen
            .params
            .iter()
            .map(|param| PlannedParam {
                name: param.name.clone(),
                ty: param.ty.substitute(&def.generic_params, &ty.args),
                member: members
                    .iter()
                    .find(|(_, m)| m.name.eq_ignore_ascii_case(&param.name))
                    .map(|(_, m)| m.name.clone()),
            })
            .collect();

        Ok(ConstructorPlan {
            kind: ConstructorKind::Greediest,
            params,
        })
    }

    /// Classify a declared member type.
    pub fn classify(&self, ty: &TypeRef) -> Result<Classification, SchemaBuildError> {
        let classification = match ty.shape() {
            TypeShape::Malformed => {
                return Err(SchemaBuildError::Invariant {
                    ty: ty.clone(),
                    message: "builtin container has the wrong number of type arguments".into(),
                });
            }
            TypeShape::Nullable(inner) => match self.classify(inner)? {
                // already nullable, no conversion needed
                Classification::ScalarNeedsNullable => Classification::Scalar,
                other => other,
            },
            TypeShape::Primitive(prim) => {
                if prim.is_value_type() {
                    Classification::ScalarNeedsNullable
                } else {
                    Classification::Scalar
                }
            }
            TypeShape::List(elem) => match self.patchable_target(elem)? {
                Some(target) => Classification::ListOfPatchable(target),
                None => Classification::ListOfScalar(elem.clone()),
            },
            TypeShape::Map(key, value) => {
                if !self.is_keyable(key) {
                    Classification::Opaque
                } else if let Some(target) = self.patchable_target(value)? {
                    Classification::MapOfPatchable {
                        key: key.clone(),
                        value: target,
                    }
                } else {
                    Classification::MapOfScalar {
                        key: key.clone(),
                        value: value.clone(),
                    }
                }
            }
            TypeShape::Named(named) => match self.graph.resolve(named) {
                None => Classification::Opaque,
                Some(def) if def.kind == TypeKind::Enum => {
                    if def.variants.is_empty() {
                        Classification::Opaque
                    } else {
                        Classification::ScalarNeedsNullable
                    }
                }
                Some(_) => match self.eligibility(named)? {
                    Eligibility::Eligible(_) => Classification::Nested(named.clone()),
                    Eligibility::Ineligible(_) => Classification::Opaque,
                },
            },
        };

        Ok(classification)
    }

    // The element type to shadow when `ty` is (a nullable of) an eligible record.
    fn patchable_target(&self, ty: &TypeRef) -> Result<Option<TypeRef>, SchemaBuildError> {
        match ty.shape() {
            TypeShape::Nullable(inner) => self.patchable_target(inner),
            TypeShape::Named(named) => Ok(self
                .eligibility(named)?
                .is_eligible()
                .then(|| named.clone())),
            _ => Ok(None),
        }
    }

    fn is_keyable(&self, ty: &TypeRef) -> bool {
        match ty.shape() {
            TypeShape::Primitive(prim) => prim.is_keyable(),
            TypeShape::Named(named) => self
                .graph
                .resolve(named)
                .is_some_and(|def| def.kind == TypeKind::Enum && !def.variants.is_empty()),
            _ => false,
        }
    }

    /// Whether the storage for `ty` always holds a value.
    #[must_use]
    pub fn is_value_type(&self, ty: &TypeRef) -> bool {
        match ty.shape() {
            TypeShape::Primitive(prim) => prim.is_value_type(),
            TypeShape::Nullable(inner) => self.is_value_type(inner),
            TypeShape::Named(named) => self
                .graph
                .resolve(named)
                .is_some_and(|def| def.kind.is_value_type()),
            TypeShape::List(_) | TypeShape::Map(..) | TypeShape::Malformed => false,
        }
    }

    /// Classify every settable member of `ty`, in presence order.
    pub fn describe_members(&self, ty: &TypeRef) -> Result<Vec<MemberDescriptor>, SchemaBuildError> {
        self.graph
            .settable_members(ty)?
            .into_iter()
            .map(|(owner, member)| {
                Ok(MemberDescriptor {
                    classification: self.classify(&member.ty)?,
                    is_value_type: self.is_value_type(&member.ty),
                    is_explicitly_nullable: member.ty.is_nullable(),
                    immutable_construction_only: member.access == MemberAccess::InitOnly,
                    owner,
                    name: member.name,
                    declared_type: member.ty,
                })
            })
            .collect()
    }
}

///
/// TESTS
///
