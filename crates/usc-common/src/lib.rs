//! Common types and utilities for the usc converter.
//!
//! This crate provides foundational types used across all usc crates:
//! - Source positions (`SourceSpan`, `SourcePosition`)
//! - Comment tokenization for the anchor index (`CommentIndex`)
//! - Per-module diagnostics records
//! - Synthetic-name helpers shared by the rewrite passes
//! - Traversal limits

// Line/column source locations
pub mod position;
pub use position::{SourcePosition, SourceSpan};

// Comment tokenization (built from raw source, independent of the tree)
pub mod comments;
pub use comments::{AnchorSide, CommentIndex, CommentKind, CommentToken};

// Diagnostics accumulated during a module run
pub mod diagnostics;
pub use diagnostics::{ModuleDiagnostics, OrphanComment, UnsupportedConstruct, Warning};

// Synthetic names produced by the upstream compiler
pub mod names;
pub use names::{NameScope, is_synthetic_name, sanitize_synthetic_name};

// Centralized limits and thresholds
pub mod limits;
