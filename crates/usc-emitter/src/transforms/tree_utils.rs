//! Helpers shared by the rewrite passes.

use usc_ast::{
    BinaryOperator, Binding, BindingKind, Node, NodeArena, NodeIndex, NodeKind, TypeId,
};
use usc_common::NameScope;
use usc_common::limits::MAX_MEMBER_CHAIN_DEPTH;

/// Name of a `Reference` node.
pub(crate) fn reference_name(arena: &NodeArena, idx: NodeIndex) -> Option<&str> {
    match arena.kind(idx)? {
        NodeKind::Reference { name } => Some(name),
        _ => None,
    }
}

/// `(left, right)` of an `=` assignment expression.
pub(crate) fn as_assignment(arena: &NodeArena, idx: NodeIndex) -> Option<(NodeIndex, NodeIndex)> {
    match arena.kind(idx)? {
        NodeKind::BinaryOp {
            op: BinaryOperator::Assign,
            left,
            right,
        } => Some((*left, *right)),
        _ => None,
    }
}

/// `(left, right)` of an expression statement wrapping an `=` assignment.
pub(crate) fn as_assignment_statement(
    arena: &NodeArena,
    stmt: NodeIndex,
) -> Option<(NodeIndex, NodeIndex)> {
    match arena.kind(stmt)? {
        NodeKind::ExpressionStatement { expression } => as_assignment(arena, *expression),
        _ => None,
    }
}

/// Expressions that can be evaluated again without observable effects:
/// names, literals, `this`, and member chains over them.
pub(crate) fn is_side_effect_free(arena: &NodeArena, idx: NodeIndex) -> bool {
    let mut current = idx;
    for _ in 0..MAX_MEMBER_CHAIN_DEPTH {
        match arena.kind(current) {
            Some(NodeKind::Reference { .. })
            | Some(NodeKind::Literal(_))
            | Some(NodeKind::SelfReference { .. }) => return true,
            Some(NodeKind::MemberAccess { target, .. }) => {
                if target.is_none() {
                    return true;
                }
                current = *target;
            }
            _ => return false,
        }
    }
    false
}

/// Whether the last statement of `stmts` leaves the current flow.
pub(crate) fn ends_in_jump(arena: &NodeArena, stmts: &[NodeIndex]) -> bool {
    stmts
        .last()
        .and_then(|&s| arena.kind(s))
        .is_some_and(NodeKind::is_jump)
}

/// Statements of a branch: the block's list, or the statement itself.
pub(crate) fn branch_statements(arena: &NodeArena, branch: NodeIndex) -> Vec<NodeIndex> {
    match arena.kind(branch) {
        Some(NodeKind::Block { statements }) => statements.clone(),
        Some(_) => vec![branch],
        None => Vec::new(),
    }
}

/// The method (or the root when there is none) a node belongs to.
pub(crate) fn enclosing_method(arena: &NodeArena, idx: NodeIndex, root: NodeIndex) -> NodeIndex {
    arena
        .find_ancestor(idx, |k| matches!(k, NodeKind::Method { .. }))
        .unwrap_or(root)
}

/// Every name declared or referenced unqualified below `scope_root`.
pub(crate) fn collect_scope_names(arena: &NodeArena, scope_root: NodeIndex) -> NameScope {
    let mut scope = NameScope::new();
    for idx in arena.descendants(scope_root) {
        match arena.kind(idx) {
            Some(NodeKind::Declaration { name, .. })
            | Some(NodeKind::Parameter { name, .. })
            | Some(NodeKind::Reference { name })
            | Some(NodeKind::Field { name, .. }) => scope.reserve(name.clone()),
            // Only an unqualified member can be shadowed by a local.
            Some(NodeKind::MemberAccess { target, name }) if target.is_none() => {
                scope.reserve(name.clone())
            }
            _ => {}
        }
    }
    scope
}

pub(crate) fn make_reference(arena: &mut NodeArena, name: &str, ty: TypeId) -> NodeIndex {
    arena.add(
        Node::new(NodeKind::Reference {
            name: name.to_string(),
        })
        .with_type(ty)
        .with_binding(Binding::local(ty)),
    )
}

pub(crate) fn make_declaration(
    arena: &mut NodeArena,
    name: &str,
    ty: TypeId,
    initializer: NodeIndex,
) -> NodeIndex {
    arena.add(
        Node::new(NodeKind::Declaration {
            name: name.to_string(),
            decl_type: ty,
            initializer,
        })
        .with_type(ty)
        .with_binding(Binding::local(ty)),
    )
}

/// Rename every local `Reference` to `from` below `root`.
pub(crate) fn rename_references(arena: &mut NodeArena, root: NodeIndex, from: &str, to: &str) {
    for idx in arena.descendants(root) {
        let Some(node) = arena.get_mut(idx) else {
            continue;
        };
        if let NodeKind::Reference { name } = &mut node.kind
            && name == from
            && node
                .binding
                .as_ref()
                .is_none_or(|b| matches!(b.kind, BindingKind::Local | BindingKind::None))
        {
            *name = to.to_string();
        }
    }
}

/// Local references named `name` below `root`.
pub(crate) fn find_references(arena: &NodeArena, root: NodeIndex, name: &str) -> Vec<NodeIndex> {
    arena
        .descendants(root)
        .into_iter()
        .filter(|&idx| reference_name(arena, idx) == Some(name))
        .collect()
}
