//! Options and per-module state shared by the passes.

use serde::{Deserialize, Serialize};
use usc_ast::{NodeArena, NodeIndex};
use usc_common::{ModuleDiagnostics, SourcePosition};

/// Newline sequence written by the emitter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NewLine {
    #[default]
    Lf,
    Crlf,
}

impl NewLine {
    pub fn as_str(self) -> &'static str {
        match self {
            NewLine::Lf => "\n",
            NewLine::Crlf => "\r\n",
        }
    }
}

/// Options controlling one module run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TranspileOptions {
    /// Proceed even when the upstream analyzer reported errors.
    pub best_effort: bool,
    /// Skip comment attachment; no comments are emitted or reported.
    pub remove_comments: bool,
    /// Spaces per indent level.
    pub indent_size: u32,
    pub new_line: NewLine,
    /// Escape prepended to identifiers that collide with reserved words.
    pub reserved_word_prefix: String,
}

impl Default for TranspileOptions {
    fn default() -> Self {
        TranspileOptions {
            best_effort: false,
            remove_comments: false,
            indent_size: 4,
            new_line: NewLine::Lf,
            reserved_word_prefix: "@".to_string(),
        }
    }
}

/// Context threaded through every pass of one module run.
pub struct EmitContext {
    pub file_name: String,
    pub options: TranspileOptions,
    pub diagnostics: ModuleDiagnostics,
}

impl EmitContext {
    pub fn new(file_name: impl Into<String>, options: TranspileOptions) -> Self {
        EmitContext {
            file_name: file_name.into(),
            options,
            diagnostics: ModuleDiagnostics::new(),
        }
    }

    pub fn position(&self, arena: &NodeArena, idx: NodeIndex) -> Option<SourcePosition> {
        arena
            .get(idx)
            .and_then(|n| n.pos)
            .map(|span| SourcePosition::from_span(&self.file_name, span))
    }

    /// Record a node that no pass or emission rule handles.
    pub fn report_unsupported(&mut self, arena: &NodeArena, idx: NodeIndex) {
        let Some(node) = arena.get(idx) else {
            return;
        };
        let position = self.position(arena, idx);
        let kind = node.kind.name();
        let description = arena.describe(idx);
        tracing::warn!(
            kind,
            description = %description,
            file = %self.file_name,
            "unsupported construct"
        );
        self.diagnostics.unsupported(kind, description, position);
    }

    pub fn warn(&mut self, arena: &NodeArena, idx: NodeIndex, message: impl Into<String>) {
        let position = self.position(arena, idx);
        self.diagnostics.warn(message, position);
    }
}
