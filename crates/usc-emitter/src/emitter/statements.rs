use super::Printer;
use crate::transforms::value_type_assignment::ASSIGN_VALUE_TYPE_MEMBER;
use usc_ast::{AttachedComment, NodeIndex, NodeKind};
use usc_common::AnchorSide;

impl<'a> Printer<'a> {
    /// Emit one statement on its own line(s), with its comments.
    pub(super) fn emit_statement(&mut self, idx: NodeIndex) {
        if idx.is_none() || self.skip_statement(idx) || !self.enter(idx) {
            return;
        }
        self.writer.ensure_line_start();
        self.emit_leading_comments(idx);
        self.emit_statement_text(idx);
        self.emit_right_comments(idx);
        self.write_line();
        self.emit_trailing_comments(idx);
        self.leave();
    }

    /// Statements left without output: expression statements around an
    /// unsupported construct. The construct itself is reported here, once.
    fn skip_statement(&mut self, idx: NodeIndex) -> bool {
        let arena = self.arena;
        let Some(NodeKind::ExpressionStatement { expression }) = arena.kind(idx) else {
            return false;
        };
        match arena.kind(*expression) {
            Some(NodeKind::MacroCall { name, .. }) if name == ASSIGN_VALUE_TYPE_MEMBER => true,
            Some(NodeKind::MacroCall { .. } | NodeKind::Unsupported { .. }) => {
                self.ctx.report_unsupported(arena, *expression);
                true
            }
            _ => false,
        }
    }

    /// The statement itself, without the final line break.
    fn emit_statement_text(&mut self, idx: NodeIndex) {
        let arena = self.arena;
        let Some(node) = arena.get(idx) else {
            return;
        };
        match &node.kind {
            NodeKind::ExpressionStatement { expression } => {
                self.emit_expression(*expression);
                self.write(";");
            }
            NodeKind::Declaration { .. } => {
                self.emit_local_declaration(idx);
                self.write(";");
            }
            NodeKind::Block { .. } => self.emit_braced_body(idx),
            NodeKind::If {
                condition,
                then_branch,
                else_branch,
            } => {
                self.write("if (");
                self.emit_expression(*condition);
                self.write(") ");
                self.emit_body(*then_branch);
                if else_branch.is_some() {
                    self.write(" else ");
                    if self.is_inline_else_if(*else_branch) {
                        self.emit_leading_comments(*else_branch);
                        self.emit_statement_text(*else_branch);
                        self.emit_right_comments(*else_branch);
                    } else {
                        self.emit_body(*else_branch);
                    }
                }
            }
            NodeKind::While {
                condition,
                body,
                do_while: false,
            } => {
                self.write("while (");
                self.emit_expression(*condition);
                self.write(") ");
                self.emit_body(*body);
            }
            NodeKind::While {
                condition,
                body,
                do_while: true,
            } => {
                self.write("do ");
                self.emit_body(*body);
                self.write(" while (");
                self.emit_expression(*condition);
                self.write(");");
            }
            NodeKind::For {
                initializers,
                condition,
                incrementors,
                body,
            } => {
                self.write("for (");
                self.emit_for_clauses(initializers);
                self.write(";");
                if condition.is_some() {
                    self.write(" ");
                    self.emit_expression(*condition);
                }
                self.write(";");
                if !incrementors.is_empty() {
                    self.write(" ");
                    self.emit_for_clauses(incrementors);
                }
                self.write(") ");
                self.emit_body(*body);
            }
            NodeKind::ForEach {
                variable,
                iterable,
                body,
            } => {
                self.write("foreach (");
                self.emit_header_declaration(*variable);
                self.write(" in ");
                self.emit_expression(*iterable);
                self.write(") ");
                self.emit_body(*body);
            }
            NodeKind::Goto { label } => {
                self.ctx
                    .warn(arena, idx, format!("goto {label} survived switch reconstruction"));
                self.write("goto ");
                self.write_name(label);
                self.write(";");
            }
            NodeKind::Label { name } => {
                self.write_name(name);
                // A label must be followed by a statement.
                if self.is_last_statement(idx) {
                    self.write(": ;");
                } else {
                    self.write(":");
                }
            }
            NodeKind::Return { expression } => self.emit_keyword_statement("return", *expression),
            NodeKind::Throw { expression } => self.emit_keyword_statement("throw", *expression),
            NodeKind::Break => self.write("break;"),
            NodeKind::Continue => self.write("continue;"),
            NodeKind::Switch {
                discriminant,
                sections,
            } => {
                self.write("switch (");
                self.emit_expression(*discriminant);
                self.write(") {");
                self.write_line();
                self.increase_indent();
                for &section in sections {
                    self.emit_switch_section(section);
                }
                self.decrease_indent();
                self.write("}");
            }
            NodeKind::TypeDef { .. } | NodeKind::Method { .. } | NodeKind::Field { .. } => {
                self.emit_member_text(idx);
            }
            _ => self.ctx.report_unsupported(arena, idx),
        }
    }

    /// Body of a compound statement, closure or method, with the block's
    /// own comments.
    pub(super) fn emit_body(&mut self, idx: NodeIndex) {
        let is_block = matches!(self.arena.kind(idx), Some(NodeKind::Block { .. }));
        if is_block {
            self.emit_leading_comments(idx);
        }
        self.emit_braced_body(idx);
        if is_block {
            self.emit_right_comments(idx);
        }
    }

    /// `{ ... }` around a block, or around a single non-block statement.
    /// Leaves the writer after the closing brace.
    fn emit_braced_body(&mut self, idx: NodeIndex) {
        let arena = self.arena;
        self.write("{");
        self.write_line();
        self.increase_indent();
        match arena.kind(idx) {
            Some(NodeKind::Block { statements }) => {
                for &stmt in statements {
                    self.emit_statement(stmt);
                }
            }
            Some(_) => self.emit_statement(idx),
            None => {}
        }
        self.decrease_indent();
        self.write("}");
    }

    fn emit_switch_section(&mut self, section: NodeIndex) {
        let arena = self.arena;
        let Some(NodeKind::SwitchSection {
            labels,
            is_default,
            statements,
        }) = arena.kind(section)
        else {
            self.ctx.report_unsupported(arena, section);
            return;
        };
        self.emit_leading_comments(section);
        for &label in labels {
            self.write("case ");
            self.emit_expression(label);
            self.write(":");
            self.write_line();
        }
        if *is_default {
            self.write("default:");
            self.write_line();
        }
        self.increase_indent();
        for &stmt in statements {
            self.emit_statement(stmt);
        }
        self.decrease_indent();
    }

    /// `T name = init` without the semicolon.
    pub(super) fn emit_local_declaration(&mut self, idx: NodeIndex) {
        let arena = self.arena;
        let Some(NodeKind::Declaration {
            name,
            decl_type,
            initializer,
        }) = arena.kind(idx)
        else {
            self.ctx.report_unsupported(arena, idx);
            return;
        };
        self.write_type(*decl_type);
        self.write(" ");
        self.write_name(name);
        if initializer.is_some() {
            self.write(" = ");
            self.emit_expression(*initializer);
        }
    }

    /// A declaration inside a `for` or `foreach` header. Statement-level
    /// declarations get their comments from `emit_statement`.
    fn emit_header_declaration(&mut self, idx: NodeIndex) {
        self.emit_leading_comments(idx);
        self.emit_local_declaration(idx);
        self.emit_right_comments(idx);
    }

    /// Initializer or incrementor list of a `for` header.
    fn emit_for_clauses(&mut self, clauses: &[NodeIndex]) {
        let arena = self.arena;
        let mut declared_type = None;
        for (i, &clause) in clauses.iter().enumerate() {
            if i > 0 {
                self.write(", ");
            }
            match arena.kind(clause) {
                Some(NodeKind::Declaration {
                    name,
                    decl_type,
                    initializer,
                }) => {
                    // Later declarators of the same type share the first's.
                    if declared_type == Some(*decl_type) {
                        self.emit_leading_comments(clause);
                        self.write_name(name);
                        if initializer.is_some() {
                            self.write(" = ");
                            self.emit_expression(*initializer);
                        }
                        self.emit_right_comments(clause);
                    } else {
                        self.emit_header_declaration(clause);
                        declared_type = Some(*decl_type);
                    }
                }
                Some(NodeKind::ExpressionStatement { expression }) => {
                    self.emit_leading_comments(clause);
                    self.emit_expression(*expression);
                    self.emit_right_comments(clause);
                }
                Some(_) => self.emit_expression(clause),
                None => {}
            }
        }
    }

    fn emit_keyword_statement(&mut self, keyword: &str, expression: NodeIndex) {
        self.write(keyword);
        if expression.is_some() {
            self.write(" ");
            self.emit_expression(expression);
        }
        self.write(";");
    }

    /// An `else if` prints inline unless comments need their own line.
    fn is_inline_else_if(&self, idx: NodeIndex) -> bool {
        let Some(node) = self.arena.get(idx) else {
            return false;
        };
        matches!(node.kind, NodeKind::If { .. })
            && !node.comments.iter().any(|c: &AttachedComment| {
                matches!(c.anchor, AnchorSide::Above | AnchorSide::Trailing)
            })
    }

    fn is_last_statement(&self, idx: NodeIndex) -> bool {
        match self.arena.statement_position(idx) {
            Some((container, at)) => at + 1 == self.arena.statements(container).len(),
            None => true,
        }
    }
}
