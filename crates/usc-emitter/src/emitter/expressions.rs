//! Expression emission with precedence-driven parenthesization.

use super::Printer;
use crate::transforms::value_type_assignment::ASSIGN_VALUE_TYPE_MEMBER;
use usc_ast::{Literal, NodeIndex, NodeKind, TypeId, UnaryOperator, precedence};

impl<'a> Printer<'a> {
    pub(super) fn emit_expression(&mut self, idx: NodeIndex) {
        self.emit_expression_at(idx, precedence::ASSIGNMENT);
    }

    /// Emit `idx` in a context that binds at least as tight as
    /// `min_precedence`, adding parentheses when the node binds looser.
    pub(super) fn emit_expression_at(&mut self, idx: NodeIndex, min_precedence: u8) {
        if idx.is_none() || !self.enter(idx) {
            return;
        }
        self.emit_leading_comments(idx);
        let parenthesize = self.precedence_of(idx) < min_precedence;
        if parenthesize {
            self.write("(");
        }
        self.emit_expression_kind(idx);
        if parenthesize {
            self.write(")");
        }
        self.emit_right_comments(idx);
        self.leave();
    }

    fn precedence_of(&self, idx: NodeIndex) -> u8 {
        match self.arena.kind(idx) {
            Some(NodeKind::BinaryOp { op, .. }) => op.precedence(),
            Some(NodeKind::UnaryOp { op, .. }) => op.precedence(),
            Some(NodeKind::Cast { .. }) => precedence::UNARY,
            Some(NodeKind::Conditional { .. }) => precedence::CONDITIONAL,
            Some(NodeKind::Closure { .. }) => precedence::ASSIGNMENT,
            _ => precedence::PRIMARY,
        }
    }

    fn emit_expression_kind(&mut self, idx: NodeIndex) {
        let arena = self.arena;
        let Some(node) = arena.get(idx) else {
            return;
        };
        match &node.kind {
            NodeKind::BinaryOp { op, left, right } => {
                let prec = op.precedence();
                let (left_min, right_min) = if op.is_right_associative() {
                    (prec + 1, prec)
                } else {
                    (prec, prec + 1)
                };
                self.emit_expression_at(*left, left_min);
                self.write(" ");
                self.write(op.token());
                self.write(" ");
                self.emit_expression_at(*right, right_min);
            }
            NodeKind::UnaryOp { op, operand } => {
                if op.is_postfix() {
                    self.emit_expression_at(*operand, precedence::PRIMARY);
                    self.write(op.token());
                } else {
                    self.write(op.token());
                    if self.starts_with_sign(*operand, op.token()) {
                        self.write("(");
                        self.emit_expression(*operand);
                        self.write(")");
                    } else {
                        self.emit_expression_at(*operand, precedence::UNARY);
                    }
                }
            }
            NodeKind::Cast {
                target_type,
                expression,
            } => {
                self.write("(");
                self.write_type(*target_type);
                self.write(")");
                // `(T)-x` parses as a subtraction for non-keyword types.
                if self.starts_with_sign(*expression, "-") || self.starts_with_sign(*expression, "+") {
                    self.write("(");
                    self.emit_expression(*expression);
                    self.write(")");
                } else {
                    self.emit_expression_at(*expression, precedence::UNARY);
                }
            }
            NodeKind::Conditional {
                condition,
                when_true,
                when_false,
            } => {
                self.emit_expression_at(*condition, precedence::CONDITIONAL + 1);
                self.write(" ? ");
                self.emit_expression_at(*when_true, precedence::CONDITIONAL);
                self.write(" : ");
                self.emit_expression_at(*when_false, precedence::CONDITIONAL);
            }
            NodeKind::Invocation {
                target,
                arguments,
                type_arguments,
            } => {
                self.emit_expression_at(*target, precedence::PRIMARY);
                self.write_type_arguments(type_arguments);
                self.write("(");
                self.write_comma_list(arguments, |p, arg| p.emit_expression(arg));
                self.write(")");
            }
            NodeKind::MemberAccess { target, name } => {
                if target.is_some() {
                    self.emit_expression_at(*target, precedence::PRIMARY);
                    self.write(".");
                }
                self.write_name(name);
            }
            NodeKind::ElementAccess { target, indices } => {
                self.emit_expression_at(*target, precedence::PRIMARY);
                self.write("[");
                self.write_comma_list(indices, |p, index| p.emit_expression(index));
                self.write("]");
            }
            NodeKind::Reference { name } => self.write_name(name),
            NodeKind::SelfReference { is_base } => self.write(if *is_base { "base" } else { "this" }),
            NodeKind::Literal(literal) => self.emit_literal(literal, node.ty),
            NodeKind::ObjectCreation {
                created_type,
                arguments,
            } => {
                self.write("new ");
                self.write_type(*created_type);
                self.write("(");
                self.write_comma_list(arguments, |p, arg| p.emit_expression(arg));
                self.write(")");
            }
            NodeKind::ArrayCreation {
                array_type,
                sizes,
                elements,
            } => self.emit_array_creation(*array_type, sizes, elements),
            NodeKind::DefaultValue { value_type } => {
                self.write("default(");
                self.write_type(*value_type);
                self.write(")");
            }
            NodeKind::Closure { params, body, .. } => {
                self.write("(");
                self.write_comma_list(params, |p, param| p.emit_parameter(param));
                self.write(") => ");
                if matches!(arena.kind(*body), Some(NodeKind::Block { .. })) {
                    self.emit_body(*body);
                } else {
                    self.emit_expression(*body);
                }
            }
            NodeKind::MacroCall { name, .. } if name == ASSIGN_VALUE_TYPE_MEMBER => {
                // Already reported by the expander.
            }
            _ => self.ctx.report_unsupported(arena, idx),
        }
    }

    /// `new int[n, m][]` or `new int[] { a, b }`.
    fn emit_array_creation(&mut self, array_type: TypeId, sizes: &[NodeIndex], elements: &[NodeIndex]) {
        self.write("new ");
        if sizes.is_empty() {
            self.write_type(array_type);
            if elements.is_empty() {
                self.write(" {}");
                return;
            }
            self.write(" { ");
            self.write_comma_list(elements, |p, element| p.emit_expression(element));
            self.write(" }");
            return;
        }

        // Peel the outer rank; the sizes go there and nested ranks follow.
        let types = &self.arena.types;
        let mut nested_ranks = Vec::new();
        let mut element = types.get(array_type).map_or(TypeId::NONE, |info| info.element);
        while let Some(info) = types.get(element)
            && info.is_array()
        {
            nested_ranks.push(info.array_rank);
            element = info.element;
        }
        self.write_type(element);
        self.write("[");
        self.write_comma_list(sizes, |p, size| p.emit_expression(size));
        self.write("]");
        for rank in nested_ranks {
            self.write("[");
            for _ in 1..rank {
                self.write(",");
            }
            self.write("]");
        }
    }

    fn write_type_arguments(&mut self, type_arguments: &[TypeId]) {
        if type_arguments.is_empty() {
            return;
        }
        self.write("<");
        for (i, ty) in type_arguments.iter().enumerate() {
            if i > 0 {
                self.write(", ");
            }
            self.write_type(*ty);
        }
        self.write(">");
    }

    /// Whether `idx` prints with a leading `sign` (`-x`, `--x`, `-1`), which
    /// would fuse with a preceding sign or cast.
    fn starts_with_sign(&self, idx: NodeIndex, sign: &str) -> bool {
        match self.arena.kind(idx) {
            Some(NodeKind::UnaryOp { op, .. }) => {
                !op.is_postfix() && op.token().starts_with(sign) && *op != UnaryOperator::LogicalNot
            }
            Some(NodeKind::Literal(Literal::Int(value))) => sign == "-" && *value < 0,
            Some(NodeKind::Literal(Literal::Float(value))) => sign == "-" && value.is_sign_negative(),
            _ => false,
        }
    }
}
