//! Boolean Coercion
//!
//! The source language tests any value for truthiness; C# only accepts
//! `bool` in conditions. Non-boolean conditions become explicit comparisons:
//!
//! - references, arrays, strings, delegates: `x != null`
//! - integers: `x != 0`
//! - floating point: `x != 0.0`
//! - enums: `x != E.Zero` (the zero-valued member), or `x != (E) 0`
//!
//! A `!` applied to a non-boolean collapses into the `==` form, so `!obj`
//! becomes `obj == null`.

use crate::emit_context::EmitContext;
use usc_ast::well_known;
use usc_ast::{
    BinaryOperator, Binding, BindingKind, Literal, Node, NodeArena, NodeIndex, NodeKind, TypeId,
    UnaryOperator,
};

pub struct BooleanCoercion<'a> {
    arena: &'a mut NodeArena,
    ctx: &'a mut EmitContext,
    coerced: usize,
}

impl<'a> BooleanCoercion<'a> {
    pub fn new(arena: &'a mut NodeArena, ctx: &'a mut EmitContext) -> Self {
        BooleanCoercion {
            arena,
            ctx,
            coerced: 0,
        }
    }

    #[tracing::instrument(level = "debug", skip(self), fields(file = %self.ctx.file_name))]
    pub fn run(mut self, root: NodeIndex) -> usize {
        // Negations first: a collapsed `!x` is already boolean and must not
        // be coerced a second time below.
        for idx in self.arena.descendants(root) {
            self.collapse_negation(idx);
        }

        for idx in self.arena.descendants(root) {
            let Some(kind) = self.arena.kind(idx) else {
                continue;
            };
            match kind {
                NodeKind::If { condition, .. }
                | NodeKind::While { condition, .. }
                | NodeKind::Conditional { condition, .. } => {
                    let condition = *condition;
                    self.coerce(condition);
                }
                NodeKind::For { condition, .. } if condition.is_some() => {
                    let condition = *condition;
                    self.coerce(condition);
                }
                NodeKind::BinaryOp { op, left, right } if op.is_logical() => {
                    let (left, right) = (*left, *right);
                    self.coerce(left);
                    self.coerce(right);
                }
                _ => {}
            }
        }
        self.coerced
    }

    /// Rewrite `!x` on a non-boolean `x` into `x == zero` in place.
    fn collapse_negation(&mut self, idx: NodeIndex) {
        let Some(NodeKind::UnaryOp {
            op: UnaryOperator::LogicalNot,
            operand,
        }) = self.arena.kind(idx)
        else {
            return;
        };
        let operand = *operand;
        if !self.needs_coercion(operand) {
            return;
        }
        let Some(zero) = self.zero_for(self.arena.type_of(operand)) else {
            self.ctx.report_unsupported(self.arena, operand);
            return;
        };
        self.arena.set_kind(
            idx,
            NodeKind::BinaryOp {
                op: BinaryOperator::Equality,
                left: operand,
                right: zero,
            },
        );
        if let Some(node) = self.arena.get_mut(idx) {
            node.ty = well_known::BOOL;
        }
        self.coerced += 1;
    }

    fn coerce(&mut self, idx: NodeIndex) {
        if !self.needs_coercion(idx) {
            return;
        }
        let Some(zero) = self.zero_for(self.arena.type_of(idx)) else {
            self.ctx.report_unsupported(self.arena, idx);
            return;
        };
        self.arena.wrap(idx, |operand| {
            Node::new(NodeKind::BinaryOp {
                op: BinaryOperator::Inequality,
                left: operand,
                right: zero,
            })
            .with_type(well_known::BOOL)
        });
        self.coerced += 1;
    }

    fn needs_coercion(&self, idx: NodeIndex) -> bool {
        let ty = self.arena.type_of(idx);
        ty.is_some() && !self.arena.types.is_boolean(ty)
    }

    /// The value a truthiness test compares against, or `None` for types
    /// without one (structs).
    fn zero_for(&mut self, ty: TypeId) -> Option<NodeIndex> {
        let types = &self.arena.types;
        let node = if types.is_enum(ty) {
            match types.zero_enum_member(ty) {
                Some(member) => {
                    let member = member.to_string();
                    let type_name = types.get(ty).map(|t| t.name.clone()).unwrap_or_default();
                    let target = self.arena.add(
                        Node::new(NodeKind::Reference { name: type_name })
                            .with_type(ty)
                            .with_binding(Binding::new(BindingKind::Type, ty)),
                    );
                    Node::new(NodeKind::MemberAccess {
                        target,
                        name: member,
                    })
                    .with_type(ty)
                    .with_binding(Binding::static_field(ty))
                }
                None => {
                    let zero = self.arena.add(
                        Node::new(NodeKind::Literal(Literal::Int(0))).with_type(well_known::INT),
                    );
                    Node::new(NodeKind::Cast {
                        target_type: ty,
                        expression: zero,
                    })
                    .with_type(ty)
                }
            }
        } else if types.is_reference_type(ty) {
            Node::new(NodeKind::Literal(Literal::Null)).with_type(well_known::OBJECT)
        } else if let Some(kind) = types.numeric_kind(ty) {
            // decimal does not mix with double literals
            if kind.is_floating() && ty != well_known::DECIMAL {
                Node::new(NodeKind::Literal(Literal::Float(0.0))).with_type(well_known::DOUBLE)
            } else {
                Node::new(NodeKind::Literal(Literal::Int(0))).with_type(well_known::INT)
            }
        } else {
            return None;
        };
        Some(self.arena.add(node))
    }
}
