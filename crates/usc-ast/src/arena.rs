//! Node storage with index-based parent links.
//!
//! All structural edits go through the arena so that parent links stay in
//! sync with child slots: a node that is detached has `parent == NONE` and is
//! no longer reachable from the root.

use crate::base::{NodeIndex, TypeId};
use crate::node::{Literal, Node, NodeKind};
use crate::types::TypeTable;
use smallvec::SmallVec;
use usc_common::limits::{MAX_DESCRIPTION_LEN, MAX_TREE_DEPTH};

pub type ChildList = SmallVec<[NodeIndex; 8]>;

#[derive(Clone, Debug, Default)]
pub struct NodeArena {
    pub nodes: Vec<Node>,
    pub types: TypeTable,
}

impl NodeArena {
    pub fn new() -> NodeArena {
        NodeArena::default()
    }

    pub fn with_types(types: TypeTable) -> NodeArena {
        NodeArena {
            nodes: Vec::new(),
            types,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Add a node and point its children back at it.
    pub fn add(&mut self, node: Node) -> NodeIndex {
        let idx = NodeIndex(self.nodes.len() as u32);
        let mut children = ChildList::new();
        node.kind.for_each_child(&mut |c| children.push(c));
        self.nodes.push(node);
        for child in children {
            self.set_parent(child, idx);
        }
        idx
    }

    #[inline]
    pub fn get(&self, idx: NodeIndex) -> Option<&Node> {
        if idx.is_none() {
            return None;
        }
        self.nodes.get(idx.index())
    }

    #[inline]
    pub fn get_mut(&mut self, idx: NodeIndex) -> Option<&mut Node> {
        if idx.is_none() {
            return None;
        }
        self.nodes.get_mut(idx.index())
    }

    #[inline]
    pub fn kind(&self, idx: NodeIndex) -> Option<&NodeKind> {
        self.get(idx).map(|n| &n.kind)
    }

    /// Static type of a node, `NONE` for unknown nodes.
    #[inline]
    pub fn type_of(&self, idx: NodeIndex) -> TypeId {
        self.get(idx).map(|n| n.ty).unwrap_or(TypeId::NONE)
    }

    #[inline]
    pub fn parent_of(&self, idx: NodeIndex) -> NodeIndex {
        self.get(idx).map(|n| n.parent).unwrap_or(NodeIndex::NONE)
    }

    pub fn is_synthetic(&self, idx: NodeIndex) -> bool {
        self.get(idx).is_some_and(Node::is_synthetic)
    }

    fn set_parent(&mut self, child: NodeIndex, parent: NodeIndex) {
        if let Some(node) = self.get_mut(child) {
            node.parent = parent;
        }
    }

    /// Ordered children of a node.
    pub fn children(&self, idx: NodeIndex) -> ChildList {
        let mut out = ChildList::new();
        if let Some(node) = self.get(idx) {
            node.kind.for_each_child(&mut |c| out.push(c));
        }
        out
    }

    /// Replace the kind of a node in place, re-parenting the new children.
    /// Children of the old kind that the new kind no longer references are
    /// detached.
    pub fn set_kind(&mut self, idx: NodeIndex, kind: NodeKind) {
        let old = self.children(idx);
        let Some(node) = self.get_mut(idx) else {
            return;
        };
        node.kind = kind;
        let new = self.children(idx);
        for child in old {
            if !new.contains(&child) && self.parent_of(child) == idx {
                self.set_parent(child, NodeIndex::NONE);
            }
        }
        for child in new {
            self.set_parent(child, idx);
        }
    }

    /// Put `new` into the child slot currently holding `old`.
    ///
    /// Returns `false` when `old` has no parent (the root, or already
    /// detached); nothing is changed in that case.
    pub fn replace_in_parent(&mut self, old: NodeIndex, new: NodeIndex) -> bool {
        let parent = self.parent_of(old);
        let Some(parent_node) = self.get_mut(parent) else {
            return false;
        };
        let mut replaced = false;
        parent_node.kind.for_each_child_slot(&mut |slot| {
            if !replaced && *slot == old {
                *slot = new;
                replaced = true;
            }
        });
        if replaced {
            self.set_parent(old, NodeIndex::NONE);
            // `new` may have been attached elsewhere
            let previous = self.parent_of(new);
            if previous.is_some() && previous != parent {
                self.detach_from(previous, new);
            }
            self.set_parent(new, parent);
        }
        replaced
    }

    /// Insert a new node between `idx` and its parent. `make` receives
    /// `idx` and builds the wrapper, which takes over `idx`'s slot.
    pub fn wrap(&mut self, idx: NodeIndex, make: impl FnOnce(NodeIndex) -> Node) -> NodeIndex {
        let parent = self.parent_of(idx);
        let wrapper = self.add(make(idx));
        if let Some(parent_node) = self.get_mut(parent) {
            let mut done = false;
            parent_node.kind.for_each_child_slot(&mut |slot| {
                if !done && *slot == idx {
                    *slot = wrapper;
                    done = true;
                }
            });
            self.set_parent(wrapper, parent);
        }
        wrapper
    }

    /// Unlink `idx` from its parent. List slots shrink; single slots
    /// become `NONE`.
    pub fn remove_from_parent(&mut self, idx: NodeIndex) -> bool {
        let parent = self.parent_of(idx);
        if parent.is_none() {
            return false;
        }
        self.detach_from(parent, idx);
        self.set_parent(idx, NodeIndex::NONE);
        true
    }

    fn detach_from(&mut self, parent: NodeIndex, child: NodeIndex) {
        let Some(parent_node) = self.get_mut(parent) else {
            return;
        };
        let mut in_list = false;
        parent_node.kind.for_each_child_list(&mut |list| {
            if let Some(pos) = list.iter().position(|&c| c == child) {
                list.remove(pos);
                in_list = true;
            }
        });
        if !in_list {
            parent_node.kind.for_each_child_slot(&mut |slot| {
                if *slot == child {
                    *slot = NodeIndex::NONE;
                }
            });
        }
    }

    /// Insert statements into a container's statement list at `at`
    /// (clamped to the list length).
    pub fn insert_statements(&mut self, container: NodeIndex, at: usize, stmts: &[NodeIndex]) {
        let Some(list) = self
            .get_mut(container)
            .and_then(|n| n.kind.statement_list_mut())
        else {
            return;
        };
        let at = at.min(list.len());
        list.splice(at..at, stmts.iter().copied());
        for &stmt in stmts {
            self.set_parent(stmt, container);
        }
    }

    /// Replace a container's whole statement list. Statements not carried
    /// over are detached.
    pub fn set_statements(&mut self, container: NodeIndex, stmts: Vec<NodeIndex>) {
        let Some(list) = self
            .get_mut(container)
            .and_then(|n| n.kind.statement_list_mut())
        else {
            return;
        };
        let old = std::mem::replace(list, stmts.clone());
        for stmt in old {
            if !stmts.contains(&stmt) {
                self.set_parent(stmt, NodeIndex::NONE);
            }
        }
        for stmt in stmts {
            self.set_parent(stmt, container);
        }
    }

    pub fn statements(&self, container: NodeIndex) -> &[NodeIndex] {
        self.get(container)
            .and_then(|n| n.kind.statement_list())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// The container holding `idx` in its statement list, with the position.
    pub fn statement_position(&self, idx: NodeIndex) -> Option<(NodeIndex, usize)> {
        let parent = self.parent_of(idx);
        let pos = self.statements(parent).iter().position(|&s| s == idx)?;
        Some((parent, pos))
    }

    /// Nearest ancestor (excluding `idx`) satisfying `pred`.
    pub fn find_ancestor(
        &self,
        idx: NodeIndex,
        mut pred: impl FnMut(&NodeKind) -> bool,
    ) -> Option<NodeIndex> {
        let mut current = self.parent_of(idx);
        let mut depth = 0;
        while let Some(node) = self.get(current) {
            if pred(&node.kind) {
                return Some(current);
            }
            depth += 1;
            if depth > MAX_TREE_DEPTH {
                return None;
            }
            current = node.parent;
        }
        None
    }

    /// Deep copy of a subtree. The copies are synthetic: no position and no
    /// attached comments.
    pub fn clone_subtree(&mut self, idx: NodeIndex) -> NodeIndex {
        self.clone_at_depth(idx, 0)
    }

    fn clone_at_depth(&mut self, idx: NodeIndex, depth: usize) -> NodeIndex {
        if self.get(idx).is_none() {
            return NodeIndex::NONE;
        }
        if depth >= MAX_TREE_DEPTH as usize {
            return self.add(Node::new(NodeKind::Unsupported {
                description: "subtree exceeds maximum depth".to_string(),
            }));
        }
        let mut copy = self.nodes[idx.index()].clone();
        copy.pos = None;
        copy.parent = NodeIndex::NONE;
        copy.comments.clear();

        let originals = self.children(idx);
        let clones: ChildList = originals
            .iter()
            .map(|&c| self.clone_at_depth(c, depth + 1))
            .collect();
        let mut next = clones.into_iter();
        copy.kind.for_each_child_slot(&mut |slot| {
            if slot.is_some()
                && let Some(c) = next.next()
            {
                *slot = c;
            }
        });
        self.add(copy)
    }

    /// Pre-order walk of the subtree rooted at `root`, `root` included.
    pub fn descendants(&self, root: NodeIndex) -> Vec<NodeIndex> {
        let mut out = Vec::new();
        let mut stack = vec![root];
        while let Some(idx) = stack.pop() {
            if self.get(idx).is_none() {
                continue;
            }
            out.push(idx);
            let children = self.children(idx);
            stack.extend(children.iter().rev().copied());
        }
        out
    }

    /// Recompute parent links for every node reachable from `root`.
    /// Unreachable nodes end up detached.
    pub fn fix_parents(&mut self, root: NodeIndex) {
        for node in &mut self.nodes {
            node.parent = NodeIndex::NONE;
        }
        let mut stack = vec![root];
        while let Some(idx) = stack.pop() {
            for child in self.children(idx) {
                if self.parent_of(child).is_none() && child != root {
                    self.set_parent(child, idx);
                    stack.push(child);
                }
            }
        }
    }

    /// Short textual form of a node for diagnostics.
    pub fn describe(&self, idx: NodeIndex) -> String {
        let mut out = String::new();
        self.write_description(idx, &mut out, 0);
        if out.chars().count() > MAX_DESCRIPTION_LEN {
            out = out.chars().take(MAX_DESCRIPTION_LEN - 3).collect();
            out.push_str("...");
        }
        out
    }

    fn write_description(&self, idx: NodeIndex, out: &mut String, depth: usize) {
        let Some(node) = self.get(idx) else {
            return;
        };
        if depth > 8 || out.len() > MAX_DESCRIPTION_LEN {
            out.push_str("...");
            return;
        }
        match &node.kind {
            NodeKind::Reference { name } | NodeKind::Label { name } => out.push_str(name),
            NodeKind::Goto { label } => {
                out.push_str("goto ");
                out.push_str(label);
            }
            NodeKind::SelfReference { is_base } => {
                out.push_str(if *is_base { "base" } else { "this" })
            }
            NodeKind::Literal(lit) => match lit {
                Literal::Int(v) => out.push_str(&v.to_string()),
                Literal::Float(v) => out.push_str(&v.to_string()),
                Literal::Bool(v) => out.push_str(if *v { "true" } else { "false" }),
                Literal::String(s) => {
                    out.push('"');
                    out.push_str(s);
                    out.push('"');
                }
                Literal::Char(c) => {
                    out.push('\'');
                    out.push(*c);
                    out.push('\'');
                }
                Literal::Null => out.push_str("null"),
            },
            NodeKind::MemberAccess { target, name } => {
                if target.is_some() {
                    self.write_description(*target, out, depth + 1);
                    out.push('.');
                }
                out.push_str(name);
            }
            NodeKind::Invocation {
                target, arguments, ..
            } => {
                self.write_description(*target, out, depth + 1);
                self.write_argument_list(arguments, out, depth);
            }
            NodeKind::MacroCall { name, arguments } => {
                out.push_str(name);
                self.write_argument_list(arguments, out, depth);
            }
            NodeKind::BinaryOp { op, left, right } => {
                self.write_description(*left, out, depth + 1);
                out.push(' ');
                out.push_str(op.token());
                out.push(' ');
                self.write_description(*right, out, depth + 1);
            }
            NodeKind::UnaryOp { op, operand } => {
                if op.is_postfix() {
                    self.write_description(*operand, out, depth + 1);
                    out.push_str(op.token());
                } else {
                    out.push_str(op.token());
                    self.write_description(*operand, out, depth + 1);
                }
            }
            NodeKind::ExpressionStatement { expression } => {
                self.write_description(*expression, out, depth + 1)
            }
            NodeKind::Unsupported { description } => out.push_str(description),
            NodeKind::TypeDef { name, .. }
            | NodeKind::Method { name, .. }
            | NodeKind::Field { name, .. }
            | NodeKind::Parameter { name, .. }
            | NodeKind::Declaration { name, .. } => {
                out.push_str(node.kind.name());
                out.push(' ');
                out.push_str(name);
            }
            other => out.push_str(other.name()),
        }
    }

    fn write_argument_list(&self, args: &[NodeIndex], out: &mut String, depth: usize) {
        out.push('(');
        for (i, &arg) in args.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            self.write_description(arg, out, depth + 1);
        }
        out.push(')');
    }
}
