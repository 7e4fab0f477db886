//! Tests for arena edits and parent-link maintenance.

use usc_ast::{NodeIndex, NodeKind, TreeBuilder, well_known};
use usc_common::SourceSpan;

#[test]
fn test_add_sets_parent_links() {
    let mut b = TreeBuilder::new("test.us");
    let one = b.int(1);
    let ret = b.ret(one);
    let body = b.block(vec![ret]);

    let arena = b.arena();
    assert_eq!(arena.parent_of(one), ret);
    assert_eq!(arena.parent_of(ret), body);
    assert!(arena.parent_of(body).is_none());
}

#[test]
fn test_replace_in_parent_relinks_both_nodes() {
    let mut b = TreeBuilder::new("test.us");
    let one = b.int(1);
    let two = b.int(2);
    let ret = b.ret(one);
    let arena = b.arena_mut();

    assert!(arena.replace_in_parent(one, two));
    assert_eq!(arena.parent_of(two), ret);
    assert!(arena.parent_of(one).is_none());
    assert_eq!(arena.children(ret).as_slice(), &[two]);
}

#[test]
fn test_replace_in_parent_of_root_is_noop() {
    let mut b = TreeBuilder::new("test.us");
    let root = b.block(vec![]);
    let other = b.block(vec![]);
    assert!(!b.arena_mut().replace_in_parent(root, other));
}

#[test]
fn test_remove_from_parent_shrinks_statement_list() {
    let mut b = TreeBuilder::new("test.us");
    let a = b.brk();
    let c = b.cont();
    let body = b.block(vec![a, c]);
    let arena = b.arena_mut();

    assert!(arena.remove_from_parent(a));
    assert_eq!(arena.statements(body), &[c]);
    assert!(arena.parent_of(a).is_none());
    assert!(!arena.remove_from_parent(a));
}

#[test]
fn test_remove_from_parent_clears_single_slot() {
    let mut b = TreeBuilder::new("test.us");
    let one = b.int(1);
    let ret = b.ret(one);
    let arena = b.arena_mut();

    assert!(arena.remove_from_parent(one));
    assert!(matches!(
        arena.kind(ret),
        Some(NodeKind::Return { expression }) if expression.is_none()
    ));
}

#[test]
fn test_insert_statements_clamps_position() {
    let mut b = TreeBuilder::new("test.us");
    let a = b.brk();
    let body = b.block(vec![a]);
    let c = b.cont();
    let d = b.cont();
    let arena = b.arena_mut();

    arena.insert_statements(body, 0, &[c]);
    arena.insert_statements(body, 99, &[d]);
    assert_eq!(arena.statements(body), &[c, a, d]);
    assert_eq!(arena.parent_of(d), body);
    assert_eq!(arena.statement_position(a), Some((body, 1)));
}

#[test]
fn test_clone_subtree_is_synthetic_and_deep() {
    let mut b = TreeBuilder::new("test.us");
    let x = b.local("x", well_known::INT);
    b.at_line(x, 3, 5, 6);
    let one = b.int(1);
    let sum = b.binary(usc_ast::BinaryOperator::Add, x, one, well_known::INT);
    b.at(sum, SourceSpan::on_line(3, 5, 10));
    let arena = b.arena_mut();

    let copy = arena.clone_subtree(sum);
    assert_ne!(copy, sum);
    assert!(arena.is_synthetic(copy));
    let children = arena.children(copy);
    assert_eq!(children.len(), 2);
    assert!(!children.contains(&x));
    assert!(children.iter().all(|&c| arena.is_synthetic(c)));
    assert!(children.iter().all(|&c| arena.parent_of(c) == copy));
    // original untouched
    assert_eq!(arena.parent_of(x), sum);
}

#[test]
fn test_descendants_pre_order() {
    let mut b = TreeBuilder::new("test.us");
    let one = b.int(1);
    let ret = b.ret(one);
    let brk = b.brk();
    let body = b.block(vec![ret, brk]);

    assert_eq!(b.arena().descendants(body), vec![body, ret, one, brk]);
}

#[test]
fn test_fix_parents_detaches_unreachable_nodes() {
    let mut b = TreeBuilder::new("test.us");
    let one = b.int(1);
    let ret = b.ret(one);
    let body = b.block(vec![ret]);
    let stray = b.brk();
    let arena = b.arena_mut();

    if let Some(node) = arena.get_mut(one) {
        node.parent = NodeIndex(999);
    }
    arena.fix_parents(body);
    assert_eq!(arena.parent_of(one), ret);
    assert!(arena.parent_of(stray).is_none());
}

#[test]
fn test_set_kind_detaches_dropped_children() {
    let mut b = TreeBuilder::new("test.us");
    let one = b.int(1);
    let stmt = b.expr_stmt(one);
    let two = b.int(2);
    let arena = b.arena_mut();

    arena.set_kind(stmt, NodeKind::Return { expression: two });
    assert!(arena.parent_of(one).is_none());
    assert_eq!(arena.parent_of(two), stmt);
}

#[test]
fn test_describe_member_call() {
    let mut b = TreeBuilder::new("test.us");
    let this = b.this(well_known::OBJECT);
    let target = b.member(
        this,
        "Move",
        usc_ast::Binding::method(well_known::VOID, vec![well_known::INT]),
    );
    let arg = b.int(5);
    let call = b.call(target, vec![arg]);

    assert_eq!(b.arena().describe(call), "this.Move(5)");
}

#[test]
fn test_find_ancestor() {
    let mut b = TreeBuilder::new("test.us");
    let brk = b.brk();
    let body = b.block(vec![brk]);
    let cond = b.bool(true);
    let lp = b.while_(cond, body);
    let outer = b.block(vec![lp]);

    let arena = b.arena();
    assert_eq!(arena.find_ancestor(brk, NodeKind::is_breakable), Some(lp));
    assert_eq!(
        arena.find_ancestor(brk, |k| matches!(k, NodeKind::Block { .. })),
        Some(body)
    );
    assert_eq!(arena.find_ancestor(outer, |_| true), None);
}
