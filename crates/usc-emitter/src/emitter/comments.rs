//! Emission of attached comments.

use super::Printer;
use usc_ast::{AttachedComment, NodeIndex};
use usc_common::AnchorSide;
use usc_common::comments::format_block_comment;

impl<'a> Printer<'a> {
    fn attached(&self, idx: NodeIndex, anchor: AnchorSide) -> Vec<AttachedComment> {
        self.arena
            .get(idx)
            .map(|n| {
                n.comments
                    .iter()
                    .filter(|c| c.anchor == anchor)
                    .copied()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Above comments on their own lines, then left comments inline.
    pub(super) fn emit_leading_comments(&mut self, idx: NodeIndex) {
        for comment in self.attached(idx, AnchorSide::Above) {
            self.writer.ensure_line_start();
            self.write_comment_text(comment.comment);
            self.write_line();
        }
        for comment in self.attached(idx, AnchorSide::Left) {
            self.write_comment_text(comment.comment);
            self.write_space();
        }
    }

    /// Right comments: block comments inline, line comments at the end of
    /// the current output line.
    pub(super) fn emit_right_comments(&mut self, idx: NodeIndex) {
        for comment in self.attached(idx, AnchorSide::Right) {
            let Some(token) = self.comments.get(comment.comment as usize) else {
                continue;
            };
            if token.is_line_comment() {
                self.writer.defer_line_comment(&token.text);
            } else {
                self.write_space();
                self.write_comment_text(comment.comment);
            }
        }
    }

    /// Trailing comments, each on its own line after the node.
    pub(super) fn emit_trailing_comments(&mut self, idx: NodeIndex) {
        for comment in self.attached(idx, AnchorSide::Trailing) {
            self.writer.ensure_line_start();
            self.write_comment_text(comment.comment);
            self.write_line();
        }
    }

    /// Write a comment, re-indenting continuation lines of block comments.
    fn write_comment_text(&mut self, index: u32) {
        let Some(token) = self.comments.get(index as usize) else {
            return;
        };
        if token.is_line_comment() {
            let text = token.text.trim_end();
            self.write(text);
            return;
        }
        let formatted = format_block_comment(&token.text, "");
        for (i, line) in formatted.split('\n').enumerate() {
            if i > 0 {
                self.write_line();
            }
            self.write(line);
        }
    }
}
