//! Value-Type Member Assignment
//!
//! Assigning to a member of a value type reached through another value type
//! (`transform.position.x = 5`) cannot be written directly in C#: the inner
//! access yields a copy. Upstream lowers such writes into a macro call whose
//! arguments are the ordered sub-assignments over synthetic temporaries:
//!
//! ```text
//! $assignValueTypeMember$($v$1 = transform.position, $v$1.x = 5, transform.position = $v$1);
//! ```
//!
//! This pass turns the enclosing statement into a block with one real local
//! per temporary:
//!
//! ```text
//! { Vector3 v1 = transform.position; v1.x = 5; transform.position = v1; }
//! ```

use super::tree_utils::{
    as_assignment, collect_scope_names, enclosing_method, make_declaration, rename_references,
};
use crate::emit_context::EmitContext;
use indexmap::IndexMap;
use usc_ast::{Node, NodeArena, NodeIndex, NodeKind};
use usc_common::{is_synthetic_name, sanitize_synthetic_name};

pub const ASSIGN_VALUE_TYPE_MEMBER: &str = "$assignValueTypeMember$";

pub struct ValueTypeAssignmentExpander<'a> {
    arena: &'a mut NodeArena,
    ctx: &'a mut EmitContext,
}

impl<'a> ValueTypeAssignmentExpander<'a> {
    pub fn new(arena: &'a mut NodeArena, ctx: &'a mut EmitContext) -> Self {
        ValueTypeAssignmentExpander { arena, ctx }
    }

    #[tracing::instrument(level = "debug", skip(self), fields(file = %self.ctx.file_name))]
    pub fn run(mut self, root: NodeIndex) -> usize {
        let calls: Vec<NodeIndex> = self
            .arena
            .descendants(root)
            .into_iter()
            .filter(|&idx| {
                matches!(self.arena.kind(idx), Some(NodeKind::MacroCall { name, .. }) if name == ASSIGN_VALUE_TYPE_MEMBER)
            })
            .collect();

        let mut expanded = 0;
        for call in calls.into_iter().rev() {
            if self.expand(call, root) {
                expanded += 1;
            } else {
                self.ctx.report_unsupported(self.arena, call);
            }
        }
        expanded
    }

    fn expand(&mut self, call: NodeIndex, root: NodeIndex) -> bool {
        let stmt = self.arena.parent_of(call);
        if !matches!(self.arena.kind(stmt), Some(NodeKind::ExpressionStatement { .. })) {
            return false;
        }
        let Some(NodeKind::MacroCall { arguments, .. }) = self.arena.kind(call) else {
            return false;
        };
        let arguments = arguments.clone();
        let assignments: Option<Vec<(NodeIndex, NodeIndex)>> = arguments
            .iter()
            .map(|&arg| as_assignment(self.arena, arg))
            .collect();
        let Some(assignments) = assignments else {
            return false;
        };

        let mut scope = collect_scope_names(self.arena, enclosing_method(self.arena, stmt, root));
        let mut temps: IndexMap<String, String> = IndexMap::new();
        let mut statements = Vec::with_capacity(arguments.len());
        for (&arg, &(left, right)) in arguments.iter().zip(&assignments) {
            let first_write = match self.arena.kind(left) {
                Some(NodeKind::Reference { name })
                    if is_synthetic_name(name) && !temps.contains_key(name) =>
                {
                    Some(name.clone())
                }
                _ => None,
            };
            let Some(temp) = first_write else {
                statements.push(
                    self.arena
                        .add(Node::new(NodeKind::ExpressionStatement { expression: arg })),
                );
                continue;
            };
            let local = scope.unique(&sanitize_synthetic_name(&temp));
            let mut ty = self.arena.type_of(left);
            if ty.is_none() {
                ty = self.arena.type_of(right);
            }
            statements.push(make_declaration(self.arena, &local, ty, right));
            temps.insert(temp, local);
        }

        self.arena.set_kind(stmt, NodeKind::Block { statements });
        for (temp, local) in &temps {
            rename_references(self.arena, stmt, temp, local);
        }
        tracing::debug!(stmt = stmt.0, temps = temps.len(), "expanded value-type member assignment");
        true
    }
}
