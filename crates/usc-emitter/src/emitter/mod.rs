//! C# Printer
//!
//! A single recursive walk over the transformed tree. Statements end their
//! own line; expressions never write newlines except inside closure bodies.
//! Attached comments are written around the node they belong to (see
//! `comments.rs`).
//!
//! The printer never fails: a node without an emission rule is reported as
//! unsupported and produces no text.

use crate::emit_context::EmitContext;
use crate::source_writer::SourceWriter;
use usc_ast::{NodeArena, NodeIndex};
use usc_common::CommentIndex;
use usc_common::limits::MAX_TREE_DEPTH;

mod comments;
mod declarations;
mod expressions;
mod helpers;
mod literals;
mod statements;

pub use literals::{escape_char, escape_string, format_float};

pub struct Printer<'a> {
    arena: &'a NodeArena,
    comments: &'a CommentIndex,
    ctx: &'a mut EmitContext,
    writer: SourceWriter,
    /// Current recursion depth, bounded by `MAX_TREE_DEPTH`.
    depth: u32,
}

impl<'a> Printer<'a> {
    pub fn new(arena: &'a NodeArena, comments: &'a CommentIndex, ctx: &'a mut EmitContext) -> Self {
        let writer = SourceWriter::new(ctx.options.indent_size, ctx.options.new_line);
        Printer {
            arena,
            comments,
            ctx,
            writer,
            depth: 0,
        }
    }

    /// Print a whole module rooted at a `SourceFile`.
    #[tracing::instrument(level = "debug", skip(self), fields(file = %self.ctx.file_name))]
    pub fn print_module(mut self, root: NodeIndex) -> String {
        self.emit_source_file(root);
        self.writer.finish()
    }

    /// Print a single statement or declaration. Used by tests and tools that
    /// render fragments.
    pub fn print_statement(mut self, idx: NodeIndex) -> String {
        self.emit_statement(idx);
        self.writer.finish()
    }

    /// Print a single expression.
    pub fn print_expression(mut self, idx: NodeIndex) -> String {
        self.emit_expression(idx);
        self.writer.finish()
    }

    /// Enter one recursion level; reports the node and returns `false` when
    /// the tree is too deep.
    pub(super) fn enter(&mut self, idx: NodeIndex) -> bool {
        if self.depth >= MAX_TREE_DEPTH {
            self.ctx.report_unsupported(self.arena, idx);
            return false;
        }
        self.depth += 1;
        true
    }

    pub(super) fn leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }
}
