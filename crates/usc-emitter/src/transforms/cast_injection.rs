//! Cast Injection
//!
//! The source language converts freely between numeric types, enums and
//! `object`; C# requires explicit casts for narrowing and for every
//! enum/integer conversion. This pass wraps the source side of each
//! assignment-like site in a `Cast` node when the conversion is not implicit
//! in C#.
//!
//! Sites: `=` assignments, local and field initializers, call and
//! constructor arguments, returns, and comparisons between an enum and an
//! integer.

use crate::emit_context::EmitContext;
use usc_ast::well_known;
use usc_ast::{
    BinaryOperator, Literal, Node, NodeArena, NodeIndex, NodeKind, NumericKind, TypeId, UnaryOperator,
};

pub struct CastInjector<'a> {
    arena: &'a mut NodeArena,
    ctx: &'a mut EmitContext,
    inserted: usize,
}

impl<'a> CastInjector<'a> {
    pub fn new(arena: &'a mut NodeArena, ctx: &'a mut EmitContext) -> Self {
        CastInjector {
            arena,
            ctx,
            inserted: 0,
        }
    }

    /// Insert casts below `root`. Returns the number of casts inserted.
    #[tracing::instrument(level = "debug", skip(self), fields(file = %self.ctx.file_name))]
    pub fn run(mut self, root: NodeIndex) -> usize {
        for idx in self.arena.descendants(root) {
            self.visit(idx);
        }
        self.inserted
    }

    fn visit(&mut self, idx: NodeIndex) {
        let Some(node) = self.arena.get(idx) else {
            return;
        };
        match &node.kind {
            NodeKind::BinaryOp {
                op: BinaryOperator::Assign,
                left,
                right,
            } => {
                let (left, right) = (*left, *right);
                self.bridge(right, self.arena.type_of(left));
            }
            NodeKind::BinaryOp { op, left, right } if op.is_comparison() => {
                let (left, right) = (*left, *right);
                self.bridge_enum_comparison(left, right);
            }
            NodeKind::Declaration {
                decl_type,
                initializer,
                ..
            } => {
                let (target, init) = (*decl_type, *initializer);
                self.bridge(init, target);
            }
            NodeKind::Field {
                field_type,
                initializer,
                ..
            } => {
                let (target, init) = (*field_type, *initializer);
                self.bridge(init, target);
            }
            NodeKind::Invocation {
                target, arguments, ..
            } => {
                let params = self
                    .arena
                    .get(*target)
                    .and_then(|t| t.binding.as_ref())
                    .map(|b| b.param_types.clone())
                    .unwrap_or_default();
                let arguments = arguments.clone();
                self.bridge_arguments(&arguments, &params);
            }
            NodeKind::ObjectCreation { arguments, .. } => {
                let params = node
                    .binding
                    .as_ref()
                    .map(|b| b.param_types.clone())
                    .unwrap_or_default();
                let arguments = arguments.clone();
                self.bridge_arguments(&arguments, &params);
            }
            NodeKind::Return { expression } if expression.is_some() => {
                let expression = *expression;
                if let Some(target) = self.return_type(idx)
                    && target != well_known::VOID
                {
                    self.bridge(expression, target);
                }
            }
            _ => {}
        }
    }

    fn bridge_arguments(&mut self, arguments: &[NodeIndex], params: &[TypeId]) {
        for (&arg, &param) in arguments.iter().zip(params) {
            self.bridge(arg, param);
        }
    }

    /// Cast the integer side of an enum/integer comparison to the enum.
    fn bridge_enum_comparison(&mut self, left: NodeIndex, right: NodeIndex) {
        let types = &self.arena.types;
        let (lt, rt) = (self.arena.type_of(left), self.arena.type_of(right));
        if types.is_enum(lt) && types.is_numeric(rt) {
            self.insert_cast(right, lt);
        } else if types.is_enum(rt) && types.is_numeric(lt) {
            self.insert_cast(left, rt);
        }
    }

    /// Return type of the closest method or closure.
    fn return_type(&self, idx: NodeIndex) -> Option<TypeId> {
        let owner = self.arena.find_ancestor(idx, |k| {
            matches!(k, NodeKind::Method { .. } | NodeKind::Closure { .. })
        })?;
        match self.arena.kind(owner)? {
            NodeKind::Method { return_type, .. } | NodeKind::Closure { return_type, .. } => {
                Some(*return_type)
            }
            _ => None,
        }
    }

    fn bridge(&mut self, source: NodeIndex, target: TypeId) {
        if self.needs_cast(source, target) {
            self.insert_cast(source, target);
        }
    }

    fn insert_cast(&mut self, source: NodeIndex, target: TypeId) {
        tracing::trace!(
            from = %self.arena.types.display(self.arena.type_of(source)),
            to = %self.arena.types.display(target),
            "cast inserted"
        );
        self.arena.wrap(source, |expression| {
            Node::new(NodeKind::Cast {
                target_type: target,
                expression,
            })
            .with_type(target)
        });
        self.inserted += 1;
    }

    /// Whether assigning `source` to a `target` slot needs an explicit cast.
    fn needs_cast(&self, source: NodeIndex, target: TypeId) -> bool {
        let from = self.arena.type_of(source);
        if from.is_none() || target.is_none() || from == target {
            return false;
        }
        if matches!(self.arena.kind(source), Some(NodeKind::Literal(Literal::Null))) {
            return false;
        }
        let types = &self.arena.types;

        match (types.is_enum(from), types.is_enum(target)) {
            (true, true) => return true,
            (true, false) => return types.is_numeric(target),
            (false, true) => return types.is_numeric(from) || types.is_object(from),
            (false, false) => {}
        }
        if types.is_object(from) {
            return !types.is_object(target);
        }
        match (types.numeric_kind(from), types.numeric_kind(target)) {
            (Some(f), Some(t)) => {
                if f.is_widening_to(t) {
                    return false;
                }
                // Only `int` constants narrow implicitly, and `long` ones to `ulong`.
                match (f, integer_literal(self.arena, source)) {
                    (NumericKind::Int, Some(v)) => !t.fits_literal(v),
                    (NumericKind::Long, Some(v)) => !(t == NumericKind::ULong && v >= 0),
                    _ => true,
                }
            }
            (Some(_), None) | (None, Some(_)) => !types.is_object(target),
            (None, None) => false,
        }
    }
}

/// Value of an integer literal, optionally negated.
fn integer_literal(arena: &NodeArena, idx: NodeIndex) -> Option<i64> {
    match arena.kind(idx)? {
        NodeKind::Literal(Literal::Int(v)) => Some(*v),
        NodeKind::UnaryOp {
            op: UnaryOperator::UnaryNegation,
            operand,
        } => match arena.kind(*operand)? {
            NodeKind::Literal(Literal::Int(v)) => v.checked_neg(),
            _ => None,
        },
        _ => None,
    }
}
