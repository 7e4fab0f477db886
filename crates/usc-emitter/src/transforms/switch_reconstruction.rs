//! Switch Reconstruction
//!
//! The upstream compiler lowers `switch` into a goto chain:
//!
//! ```text
//! {
//!     $switch$1 = expr;
//!     if ($switch$1 == 1) { ...; goto End; }
//!     if ($switch$1 == a || $switch$1 == 2) { ...; goto End; }
//!     ...default body...
//!     End:
//! }
//! ```
//!
//! This pass recognizes that exact shape and rebuilds a native `switch`.
//! Case tests that compare against something other than a literal or an
//! enum member cannot become `case` labels; they are relocated, in order,
//! to the start of the `default:` section as `if` statements.
//!
//! Detection is a read-only analysis returning `Option<SwitchShape>`; the
//! tree is only touched once a complete shape has been found, so a block
//! that merely resembles the pattern is never partially rewritten.

use super::tree_utils::{
    as_assignment_statement, branch_statements, collect_scope_names, ends_in_jump,
    enclosing_method, find_references, is_side_effect_free, make_declaration, make_reference,
    reference_name, rename_references,
};
use crate::emit_context::EmitContext;
use rustc_hash::FxHashSet;
use smallvec::SmallVec;
use usc_ast::{
    BinaryOperator, BindingKind, Literal, Node, NodeArena, NodeIndex, NodeKind, TypeId,
    UnaryOperator,
};
use usc_common::limits::MAX_TREE_DEPTH;
use usc_common::{is_synthetic_name, sanitize_synthetic_name};

/// Operands of one `||` chain; rarely more than a handful.
type CaseOperands = SmallVec<[NodeIndex; 4]>;

enum CaseKind {
    /// Literal or enum-member operands, one `case` label each.
    Constant(CaseOperands),
    /// At least one operand is not a compile-time constant.
    NonConstant,
}

struct CaseShape {
    if_stmt: NodeIndex,
    then_branch: NodeIndex,
    kind: CaseKind,
}

struct SwitchShape {
    block: NodeIndex,
    head: NodeIndex,
    temp: String,
    temp_type: TypeId,
    discriminant: NodeIndex,
    end_label: String,
    cases: Vec<CaseShape>,
    default_body: Vec<NodeIndex>,
}

pub struct SwitchReconstructor<'a> {
    arena: &'a mut NodeArena,
    ctx: &'a mut EmitContext,
    rewritten: usize,
}

impl<'a> SwitchReconstructor<'a> {
    pub fn new(arena: &'a mut NodeArena, ctx: &'a mut EmitContext) -> Self {
        SwitchReconstructor {
            arena,
            ctx,
            rewritten: 0,
        }
    }

    /// Rewrite every recognized switch below `root`. Returns the number of
    /// blocks rewritten.
    #[tracing::instrument(level = "debug", skip(self), fields(file = %self.ctx.file_name))]
    pub fn run(mut self, root: NodeIndex) -> usize {
        // Inner blocks first, so an outer case body sees finished switches.
        let blocks: Vec<NodeIndex> = self
            .arena
            .descendants(root)
            .into_iter()
            .filter(|&idx| matches!(self.arena.kind(idx), Some(NodeKind::Block { .. })))
            .collect();
        for &block in blocks.iter().rev() {
            if let Some(shape) = self.analyze(block) {
                self.apply(shape, root);
                self.rewritten += 1;
            }
        }
        self.rewritten
    }

    // =========================================================================
    // Analysis (read-only)
    // =========================================================================

    fn analyze(&self, block: NodeIndex) -> Option<SwitchShape> {
        let stmts = match self.arena.kind(block)? {
            NodeKind::Block { statements } if statements.len() >= 2 => statements.clone(),
            _ => return None,
        };
        let head = stmts[0];
        let (temp, temp_type, discriminant) = self.temp_assignment(head)?;
        let end_label = match self.arena.kind(*stmts.last()?)? {
            NodeKind::Label { name } => name.clone(),
            _ => return None,
        };

        let body = &stmts[1..stmts.len() - 1];
        let mut cases = Vec::new();
        for &stmt in body {
            match self.analyze_case(stmt, &temp, &end_label) {
                Some(case) => cases.push(case),
                None => break,
            }
        }
        let default_body = body[cases.len()..].to_vec();

        if cases.is_empty() {
            // Only-default: the body runs unconditionally outside any switch,
            // so only trailing `goto End` markers can be dropped.
            let kept = strip_trailing_gotos(self.arena, &default_body, &end_label);
            if kept
                .iter()
                .any(|&s| self.contains_goto(s, &end_label, 0))
            {
                return None;
            }
        } else {
            let kept = strip_trailing_gotos(self.arena, &default_body, &end_label);
            if !kept
                .iter()
                .all(|&s| self.is_valid_section_statement(s, &end_label, false, 0))
            {
                return None;
            }
            if self.has_duplicate_labels(&cases) {
                return None;
            }
        }

        if !self.temp_is_read_only(block, head, &temp) {
            return None;
        }

        tracing::trace!(
            block = block.0,
            cases = cases.len(),
            "switch shape recognized"
        );
        Some(SwitchShape {
            block,
            head,
            temp,
            temp_type,
            discriminant,
            end_label,
            cases,
            default_body,
        })
    }

    /// `$tmp = expr;` or `T $tmp = expr;` with a synthetic name.
    fn temp_assignment(&self, stmt: NodeIndex) -> Option<(String, TypeId, NodeIndex)> {
        if let Some((left, right)) = as_assignment_statement(self.arena, stmt) {
            let name = reference_name(self.arena, left)?;
            if !is_synthetic_name(name) || right.is_none() {
                return None;
            }
            let mut ty = self.arena.type_of(left);
            if ty.is_none() {
                ty = self.arena.type_of(right);
            }
            return Some((name.to_string(), ty, right));
        }
        match self.arena.kind(stmt)? {
            NodeKind::Declaration {
                name,
                decl_type,
                initializer,
            } if is_synthetic_name(name) && initializer.is_some() => {
                Some((name.clone(), *decl_type, *initializer))
            }
            _ => None,
        }
    }

    fn analyze_case(&self, stmt: NodeIndex, temp: &str, end_label: &str) -> Option<CaseShape> {
        let NodeKind::If {
            condition,
            then_branch,
            else_branch,
        } = self.arena.kind(stmt)?
        else {
            return None;
        };
        if else_branch.is_some() {
            return None;
        }

        let mut operands = CaseOperands::new();
        self.collect_or_operands(*condition, temp, &mut operands, 0)?;
        let kind = if operands.iter().all(|&op| self.is_case_constant(op)) {
            CaseKind::Constant(operands)
        } else {
            CaseKind::NonConstant
        };

        let body = branch_statements(self.arena, *then_branch);
        // The body must leave the case: `goto End` or another jump.
        let last = *body.last()?;
        let exits = match self.arena.kind(last)? {
            NodeKind::Goto { label } if label == end_label => true,
            NodeKind::Break => false,
            other => other.is_jump(),
        };
        if !exits {
            return None;
        }
        if !body
            .iter()
            .all(|&s| self.is_valid_section_statement(s, end_label, false, 0))
        {
            return None;
        }

        Some(CaseShape {
            if_stmt: stmt,
            then_branch: *then_branch,
            kind,
        })
    }

    /// Collect `x` from an `||` chain of `$tmp == x` tests.
    fn collect_or_operands(
        &self,
        idx: NodeIndex,
        temp: &str,
        out: &mut CaseOperands,
        depth: u32,
    ) -> Option<()> {
        if depth > MAX_TREE_DEPTH {
            return None;
        }
        match self.arena.kind(idx)? {
            NodeKind::BinaryOp {
                op: BinaryOperator::LogicalOr,
                left,
                right,
            } => {
                self.collect_or_operands(*left, temp, out, depth + 1)?;
                self.collect_or_operands(*right, temp, out, depth + 1)
            }
            NodeKind::BinaryOp {
                op: BinaryOperator::Equality,
                left,
                right,
            } => {
                if reference_name(self.arena, *left) == Some(temp) {
                    out.push(*right);
                } else if reference_name(self.arena, *right) == Some(temp) {
                    out.push(*left);
                } else {
                    return None;
                }
                Some(())
            }
            _ => None,
        }
    }

    /// Literals, negated numeric literals, and enum members.
    fn is_case_constant(&self, idx: NodeIndex) -> bool {
        let Some(node) = self.arena.get(idx) else {
            return false;
        };
        match &node.kind {
            NodeKind::Literal(_) => true,
            NodeKind::UnaryOp {
                op: UnaryOperator::UnaryNegation,
                operand,
            } => matches!(
                self.arena.kind(*operand),
                Some(NodeKind::Literal(Literal::Int(_) | Literal::Float(_)))
            ),
            NodeKind::MemberAccess { .. } => node.binding.as_ref().is_some_and(|b| {
                b.kind == BindingKind::Field && b.is_static && self.arena.types.is_enum(b.ty)
            }),
            _ => false,
        }
    }

    /// A statement may sit in a switch section: `goto End` never inside a
    /// nested loop or switch (it would become a `break` of that construct),
    /// and no `break` that would now bind to the switch.
    fn is_valid_section_statement(
        &self,
        idx: NodeIndex,
        end_label: &str,
        nested_breakable: bool,
        depth: u32,
    ) -> bool {
        if depth > MAX_TREE_DEPTH {
            return false;
        }
        let Some(kind) = self.arena.kind(idx) else {
            return true;
        };
        match kind {
            NodeKind::Goto { label } if label == end_label => return !nested_breakable,
            NodeKind::Break => return nested_breakable,
            NodeKind::Closure { .. } => return true,
            _ => {}
        }
        let nested = nested_breakable || kind.is_breakable();
        self.arena
            .children(idx)
            .iter()
            .all(|&c| self.is_valid_section_statement(c, end_label, nested, depth + 1))
    }

    fn contains_goto(&self, idx: NodeIndex, end_label: &str, depth: u32) -> bool {
        if depth > MAX_TREE_DEPTH {
            return true;
        }
        match self.arena.kind(idx) {
            Some(NodeKind::Goto { label }) => label == end_label,
            Some(NodeKind::Closure { .. }) | None => false,
            Some(_) => self
                .arena
                .children(idx)
                .iter()
                .any(|&c| self.contains_goto(c, end_label, depth + 1)),
        }
    }

    /// Duplicate `case` labels do not compile.
    fn has_duplicate_labels(&self, cases: &[CaseShape]) -> bool {
        let mut seen = FxHashSet::default();
        for case in cases {
            if let CaseKind::Constant(labels) = &case.kind {
                for &label in labels {
                    if !seen.insert(self.arena.describe(label)) {
                        return true;
                    }
                }
            }
        }
        false
    }

    /// The temp is only assigned by the head statement.
    fn temp_is_read_only(&self, block: NodeIndex, head: NodeIndex, temp: &str) -> bool {
        find_references(self.arena, block, temp).into_iter().all(|r| {
            let parent = self.arena.parent_of(r);
            if self.arena.parent_of(parent) == head {
                return true;
            }
            match self.arena.kind(parent) {
                Some(NodeKind::BinaryOp { op, left, .. }) => {
                    !(op.is_assignment() && *left == r)
                }
                Some(NodeKind::UnaryOp { op, .. }) => !op.is_mutating(),
                _ => true,
            }
        })
    }

    // =========================================================================
    // Rewrite
    // =========================================================================

    fn apply(&mut self, shape: SwitchShape, root: NodeIndex) {
        let method = enclosing_method(self.arena, shape.block, root);
        let mut scope = collect_scope_names(self.arena, method);
        let block_pos = self.arena.get(shape.block).and_then(|n| n.pos);

        // Drop the discriminant from the head statement; it moves.
        self.arena.remove_from_parent(shape.discriminant);

        if shape.cases.is_empty() {
            let local = scope.unique(&sanitize_synthetic_name(&shape.temp));
            rename_references(self.arena, shape.block, &shape.temp, &local);
            let decl = make_declaration(self.arena, &local, shape.temp_type, shape.discriminant);
            if let Some(node) = self.arena.get_mut(decl) {
                node.pos = block_pos;
            }
            let mut stmts = vec![decl];
            stmts.extend(strip_trailing_gotos(
                self.arena,
                &shape.default_body,
                &shape.end_label,
            ));
            tracing::debug!(block = shape.block.0, local = %local, "collapsed default-only switch");
            self.replace_block(shape.block, stmts);
            self.remove_dead_temp_declaration(method, &shape.temp);
            return;
        }

        let mut prefix = Vec::new();
        let switch_value = if is_side_effect_free(self.arena, shape.discriminant) {
            for r in find_references(self.arena, shape.block, &shape.temp) {
                if self.arena.parent_of(self.arena.parent_of(r)) == shape.head {
                    continue;
                }
                let copy = self.arena.clone_subtree(shape.discriminant);
                self.arena.replace_in_parent(r, copy);
            }
            shape.discriminant
        } else {
            let local = scope.unique(&sanitize_synthetic_name(&shape.temp));
            rename_references(self.arena, shape.block, &shape.temp, &local);
            prefix.push(make_declaration(
                self.arena,
                &local,
                shape.temp_type,
                shape.discriminant,
            ));
            make_reference(self.arena, &local, shape.temp_type)
        };

        // Every jump to the end label leaves the switch.
        for idx in self.arena.descendants(shape.block) {
            if matches!(self.arena.kind(idx), Some(NodeKind::Goto { label }) if *label == shape.end_label)
            {
                self.arena.set_kind(idx, NodeKind::Break);
            }
        }

        let mut sections = Vec::new();
        let mut relocated = Vec::new();
        for case in &shape.cases {
            match &case.kind {
                CaseKind::Constant(labels) => {
                    for &label in labels {
                        self.arena.remove_from_parent(label);
                    }
                    let mut body = self.take_branch(case.then_branch);
                    if !ends_in_jump(self.arena, &body) {
                        body.push(self.arena.add(Node::new(NodeKind::Break)));
                    }
                    sections.push(self.arena.add(Node::new(NodeKind::SwitchSection {
                        labels: labels.to_vec(),
                        is_default: false,
                        statements: body,
                    })));
                }
                CaseKind::NonConstant => {
                    self.arena.remove_from_parent(case.if_stmt);
                    relocated.push(case.if_stmt);
                }
            }
        }

        let mut default_stmts = relocated.clone();
        for &stmt in &shape.default_body {
            self.arena.remove_from_parent(stmt);
            default_stmts.push(stmt);
        }
        if !default_stmts.is_empty() {
            if !ends_in_jump(self.arena, &default_stmts) {
                default_stmts.push(self.arena.add(Node::new(NodeKind::Break)));
            }
            sections.push(self.arena.add(Node::new(NodeKind::SwitchSection {
                labels: Vec::new(),
                is_default: true,
                statements: default_stmts,
            })));
        }

        let mut switch_node = Node::new(NodeKind::Switch {
            discriminant: switch_value,
            sections,
        });
        switch_node.pos = block_pos;
        let switch = self.arena.add(switch_node);
        tracing::debug!(
            block = shape.block.0,
            cases = shape.cases.len(),
            relocated = relocated.len(),
            "reconstructed switch"
        );

        prefix.push(switch);
        self.replace_block(shape.block, prefix);
        self.remove_dead_temp_declaration(method, &shape.temp);
    }

    /// Detach and return the statements of a case's then-branch.
    fn take_branch(&mut self, branch: NodeIndex) -> Vec<NodeIndex> {
        let stmts = branch_statements(self.arena, branch);
        if matches!(self.arena.kind(branch), Some(NodeKind::Block { .. })) {
            self.arena.set_statements(branch, Vec::new());
        } else {
            self.arena.remove_from_parent(branch);
        }
        stmts
    }

    /// Splice `stmts` into the block's parent list, or make them the block's
    /// only content when the block is not itself a list element.
    fn replace_block(&mut self, block: NodeIndex, stmts: Vec<NodeIndex>) {
        for &stmt in &stmts {
            self.arena.remove_from_parent(stmt);
        }
        match self.arena.statement_position(block) {
            Some((container, at)) => {
                let mut list = self.arena.statements(container).to_vec();
                list.splice(at..=at, stmts);
                self.arena.set_statements(container, list);
            }
            None => self.arena.set_statements(block, stmts),
        }
    }

    /// Remove an initializer-less declaration of the temp once nothing
    /// refers to it anymore.
    fn remove_dead_temp_declaration(&mut self, method: NodeIndex, temp: &str) {
        if !find_references(self.arena, method, temp).is_empty() {
            return;
        }
        let dead: Vec<NodeIndex> = self
            .arena
            .descendants(method)
            .into_iter()
            .filter(|&idx| {
                matches!(
                    self.arena.kind(idx),
                    Some(NodeKind::Declaration { name, initializer, .. })
                        if name == temp && initializer.is_none()
                )
            })
            .collect();
        for idx in dead {
            self.arena.remove_from_parent(idx);
        }
    }
}

/// Statements without the trailing `goto End` markers.
fn strip_trailing_gotos(arena: &NodeArena, stmts: &[NodeIndex], end_label: &str) -> Vec<NodeIndex> {
    let mut end = stmts.len();
    while end > 0
        && matches!(arena.kind(stmts[end - 1]), Some(NodeKind::Goto { label }) if label == end_label)
    {
        end -= 1;
    }
    stmts[..end].to_vec()
}
