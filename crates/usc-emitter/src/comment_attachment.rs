//! Comment attachment.
//!
//! Comments come from the pre-transform source (`CommentIndex`) and are
//! matched against the final tree by position. The walk is pre-order and
//! skips synthetic nodes, which have no position.
//!
//! For each comment the best candidate so far is kept:
//!
//! - Above: the first statement-like node starting on a later line, or an
//!   expression or parameter that opens a later line of its statement. This
//!   is the weakest anchor; any same-line candidate replaces it.
//! - Left: a node starting on the comment's line, after the comment.
//! - Right: a node ending on the comment's line, before the comment.
//!
//! Same-line candidates compete on column distance. Only a strictly smaller
//! distance replaces the current candidate, so on a tie the first node
//! visited (the outermost) keeps the comment.
//!
//! When a method, type or the module closes, comments inside it that are
//! still unclaimed become `Trailing` comments of the last statement-like
//! node visited in that scope. Whatever remains is an orphan: reported,
//! never emitted.

use crate::emit_context::EmitContext;
use usc_ast::{AttachedComment, NodeArena, NodeIndex, NodeKind};
use usc_common::limits::MAX_TREE_DEPTH;
use usc_common::{AnchorSide, CommentIndex, SourcePosition, SourceSpan};

#[derive(Clone, Copy)]
struct Candidate {
    node: NodeIndex,
    anchor: AnchorSide,
    distance: u32,
}

impl Candidate {
    const NONE: Candidate = Candidate {
        node: NodeIndex::NONE,
        anchor: AnchorSide::None,
        distance: u32::MAX,
    };

    fn is_none(&self) -> bool {
        self.node.is_none()
    }
}

/// Attach every comment of `comments` to a node below `root`. Returns the
/// number of attached comments; the rest are reported as orphans.
#[tracing::instrument(level = "debug", skip_all, fields(file = %ctx.file_name, comments = comments.len()))]
pub fn attach_comments(
    arena: &mut NodeArena,
    root: NodeIndex,
    comments: &CommentIndex,
    ctx: &mut EmitContext,
) -> usize {
    if comments.is_empty() {
        return 0;
    }
    let mut attacher = CommentAttacher {
        arena,
        comments,
        ctx,
        candidates: vec![Candidate::NONE; comments.len()],
        cursor: 0,
        last_statement: NodeIndex::NONE,
        statement_line: u32::MAX,
    };
    attacher.visit(root, 0);

    // Module scope: the source file's span, or the whole file.
    let module_span = attacher.arena.get(root).and_then(|n| n.pos);
    let last = attacher.last_statement;
    if last.is_some() {
        attacher.close_scope(module_span, last);
    }
    attacher.commit()
}

struct CommentAttacher<'a> {
    arena: &'a mut NodeArena,
    comments: &'a CommentIndex,
    ctx: &'a mut EmitContext,
    candidates: Vec<Candidate>,
    /// First comment not yet passed by an above-anchor scan.
    cursor: usize,
    last_statement: NodeIndex,
    /// Start line of the innermost enclosing statement-like node.
    statement_line: u32,
}

impl CommentAttacher<'_> {
    fn visit(&mut self, idx: NodeIndex, depth: u32) {
        if depth > MAX_TREE_DEPTH {
            self.ctx.report_unsupported(self.arena, idx);
            return;
        }
        let Some(node) = self.arena.get(idx) else {
            return;
        };
        let pos = node.pos;
        let is_scope = matches!(node.kind, NodeKind::Method { .. } | NodeKind::TypeDef { .. });
        let statement_like = is_statement_like(&node.kind);
        let inline = is_inline(&node.kind);
        let is_source_file = matches!(node.kind, NodeKind::SourceFile { .. });

        if let Some(span) = pos
            && !is_source_file
        {
            if statement_like {
                self.claim_above(idx, span);
                self.last_statement = idx;
            } else if inline && span.line > self.statement_line {
                self.claim_above(idx, span);
            }
            self.claim_same_line(idx, span);
        }

        let outer_last = self.last_statement;
        let outer_line = self.statement_line;
        if statement_like && let Some(span) = pos {
            self.statement_line = span.line;
        }
        for child in self.arena.children(idx) {
            self.visit(child, depth + 1);
        }
        self.statement_line = outer_line;

        if is_scope && let Some(span) = pos {
            // The last statement visited inside, or the declaration itself.
            let target = if self.last_statement != outer_last {
                self.last_statement
            } else {
                idx
            };
            self.close_scope(Some(span), target);
            self.last_statement = idx;
        }
    }

    /// Unclaimed comments ending before `span` starts become above-comments.
    fn claim_above(&mut self, idx: NodeIndex, span: SourceSpan) {
        while let Some(comment) = self.comments.get(self.cursor) {
            if comment.span.end_line >= span.line {
                break;
            }
            let candidate = &mut self.candidates[self.cursor];
            if candidate.is_none() {
                *candidate = Candidate {
                    node: idx,
                    anchor: AnchorSide::Above,
                    distance: u32::MAX,
                };
            }
            self.cursor += 1;
        }
    }

    fn claim_same_line(&mut self, idx: NodeIndex, span: SourceSpan) {
        let first = self
            .comments
            .comments
            .partition_point(|c| c.span.line < span.line);
        for (i, comment) in self.comments.comments.iter().enumerate().skip(first) {
            if comment.span.line > span.end_line {
                break;
            }
            let c = comment.span;
            let proposal = if c.line == span.line
                && c.end_line == span.line
                && c.end_column <= span.column
            {
                Some((AnchorSide::Left, span.column - c.end_column))
            } else if c.line == span.end_line && c.column >= span.end_column {
                Some((AnchorSide::Right, c.column - span.end_column))
            } else {
                None
            };
            let Some((anchor, distance)) = proposal else {
                continue;
            };
            let current = &mut self.candidates[i];
            if distance < current.distance {
                *current = Candidate {
                    node: idx,
                    anchor,
                    distance,
                };
            }
        }
    }

    /// Give unclaimed comments inside `span` (everything when `None`) to
    /// `target` as trailing comments.
    fn close_scope(&mut self, span: Option<SourceSpan>, target: NodeIndex) {
        let (start, end) = match span {
            Some(s) => (s.line, s.end_line),
            None => (0, u32::MAX),
        };
        for (i, comment) in self.comments.iter().enumerate() {
            let candidate = &mut self.candidates[i];
            if candidate.is_none() && comment.span.line >= start && comment.span.end_line <= end {
                *candidate = Candidate {
                    node: target,
                    anchor: AnchorSide::Trailing,
                    distance: u32::MAX,
                };
            }
        }
    }

    /// Store the winners on their nodes, in comment order, and report
    /// orphans.
    fn commit(self) -> usize {
        let mut attached = 0;
        for (i, candidate) in self.candidates.iter().enumerate() {
            let Some(comment) = self.comments.get(i) else {
                continue;
            };
            match self.arena.get_mut(candidate.node) {
                Some(node) => {
                    node.comments.push(AttachedComment {
                        comment: i as u32,
                        anchor: candidate.anchor,
                    });
                    attached += 1;
                }
                None => {
                    tracing::debug!(line = comment.span.line, "orphan comment");
                    self.ctx.diagnostics.orphan(
                        comment.text.clone(),
                        SourcePosition::from_span(&self.ctx.file_name, comment.span),
                    );
                }
            }
        }
        attached
    }
}

/// Nodes printed on their own line, which can carry above and trailing
/// comments.
fn is_statement_like(kind: &NodeKind) -> bool {
    matches!(
        kind,
        NodeKind::TypeDef { .. }
            | NodeKind::Method { .. }
            | NodeKind::Field { .. }
            | NodeKind::Declaration { .. }
            | NodeKind::ExpressionStatement { .. }
            | NodeKind::If { .. }
            | NodeKind::While { .. }
            | NodeKind::For { .. }
            | NodeKind::ForEach { .. }
            | NodeKind::Goto { .. }
            | NodeKind::Label { .. }
            | NodeKind::Return { .. }
            | NodeKind::Break
            | NodeKind::Continue
            | NodeKind::Throw { .. }
            | NodeKind::Switch { .. }
    )
}

/// Nodes printed inside a statement's text that still print their own
/// above comments on a fresh line.
fn is_inline(kind: &NodeKind) -> bool {
    matches!(
        kind,
        NodeKind::Parameter { .. }
            | NodeKind::BinaryOp { .. }
            | NodeKind::UnaryOp { .. }
            | NodeKind::Invocation { .. }
            | NodeKind::MemberAccess { .. }
            | NodeKind::ElementAccess { .. }
            | NodeKind::Reference { .. }
            | NodeKind::SelfReference { .. }
            | NodeKind::Literal(_)
            | NodeKind::Cast { .. }
            | NodeKind::Closure { .. }
            | NodeKind::ObjectCreation { .. }
            | NodeKind::ArrayCreation { .. }
            | NodeKind::Conditional { .. }
            | NodeKind::DefaultValue { .. }
    )
}
