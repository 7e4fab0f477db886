//! Resolved syntax tree and symbol model.
//!
//! This crate holds the data the transformation passes operate on:
//! - `NodeArena` with index-based parent links
//! - `NodeKind` and the operator enums
//! - `TypeTable` with numeric widening rules and well-known types
//! - `Binding` symbol information computed upstream
//! - `TreeBuilder` and the JSON interchange loader

pub mod base;
pub use base::{NodeIndex, TypeId};

pub mod operators;
pub use operators::{BinaryOperator, UnaryOperator, precedence};

pub mod types;
pub use types::{NumericKind, TypeFlags, TypeInfo, TypeTable, well_known};

pub mod symbols;
pub use symbols::{Binding, BindingKind};

pub mod node;
pub use node::{
    AttachedComment, Literal, Modifiers, Node, NodeKind, TypeDefKind, Visibility,
};

// Exhaustive child enumeration for NodeKind
mod children;

pub mod arena;
pub use arena::{ChildList, NodeArena};

pub mod builder;
pub use builder::TreeBuilder;

pub mod interchange;
pub use interchange::{InterchangeError, ResolvedModule};

#[cfg(test)]
#[path = "../tests/children_tests.rs"]
mod children_tests;
