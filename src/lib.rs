//! usc: converts resolved scripting-language trees into C# source.
//!
//! The work happens in the member crates; this package re-exports them and
//! adds the batch CLI.
//!
//! - [`ast`]: arena tree, symbol bindings, type table, JSON interchange
//! - [`common`]: positions, comment scanning, diagnostics
//! - [`emitter`]: rewrite passes, comment attachment, printer, pipeline

pub use usc_ast as ast;
pub use usc_common as common;
pub use usc_emitter as emitter;

pub use usc_emitter::{ModuleOutput, PipelineError, TranspileOptions, transpile_module};

pub mod tracing_config;

pub mod cli;
