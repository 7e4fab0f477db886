//! Symbol bindings computed by the upstream analyzer.

use crate::base::TypeId;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BindingKind {
    Local,
    Parameter,
    Field,
    Property,
    Method,
    Constructor,
    Type,
    #[default]
    None,
}

/// What a `Reference`, `MemberAccess` or `Invocation` target resolves to.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Binding {
    pub kind: BindingKind,
    #[serde(default)]
    pub is_static: bool,
    /// Declared type of the symbol; the return type for methods.
    #[serde(default)]
    pub ty: TypeId,
    /// Parameter types of a bound method or constructor.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub param_types: Vec<TypeId>,
}

impl Binding {
    pub fn new(kind: BindingKind, ty: TypeId) -> Self {
        Binding {
            kind,
            is_static: false,
            ty,
            param_types: Vec::new(),
        }
    }

    pub fn local(ty: TypeId) -> Self {
        Binding::new(BindingKind::Local, ty)
    }

    pub fn parameter(ty: TypeId) -> Self {
        Binding::new(BindingKind::Parameter, ty)
    }

    pub fn field(ty: TypeId) -> Self {
        Binding::new(BindingKind::Field, ty)
    }

    pub fn static_field(ty: TypeId) -> Self {
        Binding {
            is_static: true,
            ..Binding::field(ty)
        }
    }

    pub fn method(return_type: TypeId, param_types: Vec<TypeId>) -> Self {
        Binding {
            param_types,
            ..Binding::new(BindingKind::Method, return_type)
        }
    }

    pub fn constructor(param_types: Vec<TypeId>) -> Self {
        Binding {
            param_types,
            ..Binding::new(BindingKind::Constructor, TypeId::NONE)
        }
    }

    /// Locals, parameters and fields can be read again without side effects.
    pub fn is_variable(&self) -> bool {
        matches!(
            self.kind,
            BindingKind::Local | BindingKind::Parameter | BindingKind::Field
        )
    }
}
