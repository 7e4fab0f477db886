//! Ordered child enumeration.
//!
//! Both walkers match exhaustively over `NodeKind`, so a new node kind does
//! not compile until its children are listed here.

use crate::base::NodeIndex;
use crate::node::NodeKind;

impl NodeKind {
    /// Visit every non-`NONE` child in source order.
    pub fn for_each_child(&self, f: &mut dyn FnMut(NodeIndex)) {
        let mut visit = |idx: NodeIndex| {
            if idx.is_some() {
                f(idx);
            }
        };
        match self {
            NodeKind::SourceFile { members, .. } | NodeKind::TypeDef { members, .. } => {
                members.iter().copied().for_each(visit)
            }
            NodeKind::Method { params, body, .. } => {
                params.iter().copied().for_each(&mut visit);
                visit(*body);
            }
            NodeKind::Field { initializer, .. } | NodeKind::Declaration { initializer, .. } => {
                visit(*initializer)
            }
            NodeKind::Block { statements } => statements.iter().copied().for_each(visit),
            NodeKind::ExpressionStatement { expression }
            | NodeKind::Return { expression }
            | NodeKind::Throw { expression }
            | NodeKind::Cast { expression, .. } => visit(*expression),
            NodeKind::If {
                condition,
                then_branch,
                else_branch,
            } => {
                visit(*condition);
                visit(*then_branch);
                visit(*else_branch);
            }
            NodeKind::While {
                condition,
                body,
                do_while,
            } => {
                if *do_while {
                    visit(*body);
                    visit(*condition);
                } else {
                    visit(*condition);
                    visit(*body);
                }
            }
            NodeKind::For {
                initializers,
                condition,
                incrementors,
                body,
            } => {
                initializers.iter().copied().for_each(&mut visit);
                visit(*condition);
                incrementors.iter().copied().for_each(&mut visit);
                visit(*body);
            }
            NodeKind::ForEach {
                variable,
                iterable,
                body,
            } => {
                visit(*variable);
                visit(*iterable);
                visit(*body);
            }
            NodeKind::Switch {
                discriminant,
                sections,
            } => {
                visit(*discriminant);
                sections.iter().copied().for_each(visit);
            }
            NodeKind::SwitchSection {
                labels, statements, ..
            } => {
                labels.iter().copied().for_each(&mut visit);
                statements.iter().copied().for_each(visit);
            }
            NodeKind::BinaryOp { left, right, .. } => {
                visit(*left);
                visit(*right);
            }
            NodeKind::UnaryOp { operand, .. } => visit(*operand),
            NodeKind::Invocation {
                target, arguments, ..
            } => {
                visit(*target);
                arguments.iter().copied().for_each(visit);
            }
            NodeKind::MemberAccess { target, .. } => visit(*target),
            NodeKind::ElementAccess { target, indices } => {
                visit(*target);
                indices.iter().copied().for_each(visit);
            }
            NodeKind::Closure { params, body, .. } => {
                params.iter().copied().for_each(&mut visit);
                visit(*body);
            }
            NodeKind::ObjectCreation { arguments, .. } | NodeKind::MacroCall { arguments, .. } => {
                arguments.iter().copied().for_each(visit)
            }
            NodeKind::ArrayCreation {
                sizes, elements, ..
            } => {
                sizes.iter().copied().for_each(&mut visit);
                elements.iter().copied().for_each(visit);
            }
            NodeKind::Conditional {
                condition,
                when_true,
                when_false,
            } => {
                visit(*condition);
                visit(*when_true);
                visit(*when_false);
            }
            NodeKind::Parameter { .. }
            | NodeKind::Goto { .. }
            | NodeKind::Label { .. }
            | NodeKind::Break
            | NodeKind::Continue
            | NodeKind::Reference { .. }
            | NodeKind::SelfReference { .. }
            | NodeKind::Literal(_)
            | NodeKind::DefaultValue { .. }
            | NodeKind::Unsupported { .. } => {}
        }
    }

    /// Visit every child slot mutably, including `NONE` slots of single
    /// children. List slots are visited element by element.
    pub fn for_each_child_slot(&mut self, f: &mut dyn FnMut(&mut NodeIndex)) {
        match self {
            NodeKind::SourceFile { members, .. } | NodeKind::TypeDef { members, .. } => {
                members.iter_mut().for_each(f)
            }
            NodeKind::Method { params, body, .. } => {
                params.iter_mut().for_each(&mut *f);
                f(body);
            }
            NodeKind::Field { initializer, .. } | NodeKind::Declaration { initializer, .. } => {
                f(initializer)
            }
            NodeKind::Block { statements } => statements.iter_mut().for_each(f),
            NodeKind::ExpressionStatement { expression }
            | NodeKind::Return { expression }
            | NodeKind::Throw { expression }
            | NodeKind::Cast { expression, .. } => f(expression),
            NodeKind::If {
                condition,
                then_branch,
                else_branch,
            } => {
                f(condition);
                f(then_branch);
                f(else_branch);
            }
            NodeKind::While {
                condition, body, ..
            } => {
                f(condition);
                f(body);
            }
            NodeKind::For {
                initializers,
                condition,
                incrementors,
                body,
            } => {
                initializers.iter_mut().for_each(&mut *f);
                f(condition);
                incrementors.iter_mut().for_each(&mut *f);
                f(body);
            }
            NodeKind::ForEach {
                variable,
                iterable,
                body,
            } => {
                f(variable);
                f(iterable);
                f(body);
            }
            NodeKind::Switch {
                discriminant,
                sections,
            } => {
                f(discriminant);
                sections.iter_mut().for_each(f);
            }
            NodeKind::SwitchSection {
                labels, statements, ..
            } => {
                labels.iter_mut().for_each(&mut *f);
                statements.iter_mut().for_each(f);
            }
            NodeKind::BinaryOp { left, right, .. } => {
                f(left);
                f(right);
            }
            NodeKind::UnaryOp { operand, .. } => f(operand),
            NodeKind::Invocation {
                target, arguments, ..
            } => {
                f(target);
                arguments.iter_mut().for_each(f);
            }
            NodeKind::MemberAccess { target, .. } => f(target),
            NodeKind::ElementAccess { target, indices } => {
                f(target);
                indices.iter_mut().for_each(f);
            }
            NodeKind::Closure { params, body, .. } => {
                params.iter_mut().for_each(&mut *f);
                f(body);
            }
            NodeKind::ObjectCreation { arguments, .. } | NodeKind::MacroCall { arguments, .. } => {
                arguments.iter_mut().for_each(f)
            }
            NodeKind::ArrayCreation {
                sizes, elements, ..
            } => {
                sizes.iter_mut().for_each(&mut *f);
                elements.iter_mut().for_each(f);
            }
            NodeKind::Conditional {
                condition,
                when_true,
                when_false,
            } => {
                f(condition);
                f(when_true);
                f(when_false);
            }
            NodeKind::Parameter { .. }
            | NodeKind::Goto { .. }
            | NodeKind::Label { .. }
            | NodeKind::Break
            | NodeKind::Continue
            | NodeKind::Reference { .. }
            | NodeKind::SelfReference { .. }
            | NodeKind::Literal(_)
            | NodeKind::DefaultValue { .. }
            | NodeKind::Unsupported { .. } => {}
        }
    }

    /// Visit every list-valued child slot.
    pub fn for_each_child_list(&mut self, f: &mut dyn FnMut(&mut Vec<NodeIndex>)) {
        match self {
            NodeKind::SourceFile { members, .. } | NodeKind::TypeDef { members, .. } => f(members),
            NodeKind::Method { params, .. } | NodeKind::Closure { params, .. } => f(params),
            NodeKind::Block { statements } => f(statements),
            NodeKind::For {
                initializers,
                incrementors,
                ..
            } => {
                f(initializers);
                f(incrementors);
            }
            NodeKind::Switch { sections, .. } => f(sections),
            NodeKind::SwitchSection {
                labels, statements, ..
            } => {
                f(labels);
                f(statements);
            }
            NodeKind::Invocation { arguments, .. }
            | NodeKind::ObjectCreation { arguments, .. }
            | NodeKind::MacroCall { arguments, .. } => f(arguments),
            NodeKind::ElementAccess { indices, .. } => f(indices),
            NodeKind::ArrayCreation {
                sizes, elements, ..
            } => {
                f(sizes);
                f(elements);
            }
            _ => {}
        }
    }

    /// The statement/member list of container nodes.
    pub fn statement_list(&self) -> Option<&Vec<NodeIndex>> {
        match self {
            NodeKind::Block { statements } | NodeKind::SwitchSection { statements, .. } => {
                Some(statements)
            }
            NodeKind::SourceFile { members, .. } | NodeKind::TypeDef { members, .. } => {
                Some(members)
            }
            _ => None,
        }
    }

    pub fn statement_list_mut(&mut self) -> Option<&mut Vec<NodeIndex>> {
        match self {
            NodeKind::Block { statements } | NodeKind::SwitchSection { statements, .. } => {
                Some(statements)
            }
            NodeKind::SourceFile { members, .. } | NodeKind::TypeDef { members, .. } => {
                Some(members)
            }
            _ => None,
        }
    }
}
