//! Tree rewrite passes.
//!
//! Each pass mutates the module arena in place and reports what it cannot
//! handle through the `EmitContext`. Structural passes fail closed: a shape
//! that does not match exactly is left untouched.

pub mod boolean_coercion;
pub mod callable_types;
pub mod cast_injection;
pub mod closure_capture;
pub mod reserved_words;
pub mod switch_reconstruction;
pub mod value_type_assignment;
pub mod visibility;

mod tree_utils;

pub use boolean_coercion::BooleanCoercion;
pub use callable_types::CallableTypeNormalizer;
pub use cast_injection::CastInjector;
pub use closure_capture::ClosureCaptureRewriter;
pub use reserved_words::{ReservedWordRenamer, is_reserved_word};
pub use switch_reconstruction::SwitchReconstructor;
pub use value_type_assignment::ValueTypeAssignmentExpander;
pub use visibility::fix_top_level_visibility;
