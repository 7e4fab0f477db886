//! Rewrite passes and C# emission for the usc converter.
//!
//! This crate turns a `ResolvedModule` into C# source text:
//! - Structural rewrites (switch reconstruction, closure capture, value-type
//!   member assignment)
//! - Type-gap bridging (delegate normalization, casts, boolean coercion)
//! - Lexical fixups (reserved words, top-level visibility)
//! - Comment attachment and the printer
//! - `transpile_module`, which runs all of the above in order

// Options and per-module state
pub mod emit_context;
pub use emit_context::{EmitContext, NewLine, TranspileOptions};

// Indentation-aware output buffer
pub mod source_writer;
pub use source_writer::SourceWriter;

// Tree rewrite passes
pub mod transforms;

// Comment anchoring against the final tree
pub mod comment_attachment;
pub use comment_attachment::attach_comments;

// C# printer
pub mod emitter;
pub use emitter::Printer;

// Module pipeline
pub mod pipeline;
pub use pipeline::{ModuleOutput, PipelineError, transpile_module};
