//! Closure Capture Rewriting
//!
//! The upstream compiler implements closures by hoisting captured variables
//! into a compiler-generated record:
//!
//! ```text
//! class $Closure$1 { int x; int count; }
//! ...
//! $Closure$1 $ctx$1 = new $Closure$1();
//! $ctx$1.x = x;
//! $ctx$1.count = Compute();
//! Run(() => $ctx$1.x + $ctx$1.count);
//! ```
//!
//! C# closures capture variables natively, so the record is dissolved: every
//! `$ctx$1.field` access is replaced by the variable it stands for. A copy
//! from a bare name (parameter, field, source local, `this`, or another
//! context object) is substituted directly; any other copy becomes a real
//! local declared at the copy site.
//!
//! The construction may also be split from the declaration:
//! `$Closure$1 $ctx$1; $ctx$1 = new $Closure$1();`. Both statements go.

use super::tree_utils::{
    as_assignment_statement, collect_scope_names, find_references, make_declaration,
    make_reference, reference_name,
};
use crate::emit_context::EmitContext;
use indexmap::IndexMap;
use rustc_hash::{FxHashMap, FxHashSet};
use usc_ast::{Binding, BindingKind, Node, NodeArena, NodeIndex, NodeKind, TypeId};
use usc_common::{is_synthetic_name, sanitize_synthetic_name};

/// Field name to field type of one capture record.
type RecordFields = IndexMap<String, TypeId>;

struct ContextObject {
    decl: NodeIndex,
    /// Statement holding `new Record()`; `decl` itself unless split.
    construction: NodeIndex,
    /// Reference assigned by a split construction.
    assigned: NodeIndex,
    name: String,
    record_type: TypeId,
}

struct FieldCopy {
    stmt: NodeIndex,
    field: String,
    value: NodeIndex,
}

pub struct ClosureCaptureRewriter<'a> {
    arena: &'a mut NodeArena,
    ctx: &'a mut EmitContext,
    records: FxHashMap<TypeId, RecordFields>,
}

impl<'a> ClosureCaptureRewriter<'a> {
    pub fn new(arena: &'a mut NodeArena, ctx: &'a mut EmitContext) -> Self {
        ClosureCaptureRewriter {
            arena,
            ctx,
            records: FxHashMap::default(),
        }
    }

    /// Dissolve every capture record below `root`. Returns the number of
    /// context objects rewritten.
    #[tracing::instrument(level = "debug", skip(self), fields(file = %self.ctx.file_name))]
    pub fn run(mut self, root: NodeIndex) -> usize {
        self.records = self.collect_records(root);
        if self.records.is_empty() {
            return 0;
        }

        let methods: Vec<NodeIndex> = self
            .arena
            .descendants(root)
            .into_iter()
            .filter(|&idx| {
                matches!(self.arena.kind(idx), Some(NodeKind::Method { body, .. }) if body.is_some())
            })
            .collect();

        let mut rewritten = 0;
        for method in methods {
            // Latest first: a later context object may hold an earlier one.
            let contexts = self.find_context_objects(method);
            for context in contexts.iter().rev() {
                if self.rewrite(method, context) {
                    rewritten += 1;
                }
            }
        }

        self.remove_unused_records(root);
        rewritten
    }

    fn collect_records(&self, root: NodeIndex) -> FxHashMap<TypeId, RecordFields> {
        let mut records = FxHashMap::default();
        for idx in self.arena.descendants(root) {
            let Some(NodeKind::TypeDef {
                members,
                declared_type,
                compiler_generated: true,
                ..
            }) = self.arena.kind(idx)
            else {
                continue;
            };
            let fields: RecordFields = members
                .iter()
                .filter_map(|&m| match self.arena.kind(m) {
                    Some(NodeKind::Field {
                        name, field_type, ..
                    }) => Some((name.clone(), *field_type)),
                    _ => None,
                })
                .collect();
            records.insert(*declared_type, fields);
        }
        records
    }

    /// Locals initialized with a fresh capture record, in source order.
    fn find_context_objects(&self, method: NodeIndex) -> Vec<ContextObject> {
        self.arena
            .descendants(method)
            .into_iter()
            .filter_map(|idx| match self.arena.kind(idx)? {
                NodeKind::Declaration {
                    name, initializer, ..
                } => {
                    let record_type = self.fresh_record(*initializer)?;
                    Some(ContextObject {
                        decl: idx,
                        construction: idx,
                        assigned: NodeIndex::NONE,
                        name: name.clone(),
                        record_type,
                    })
                }
                NodeKind::ExpressionStatement { .. } => {
                    let (left, right) = as_assignment_statement(self.arena, idx)?;
                    let record_type = self.fresh_record(right)?;
                    let name = reference_name(self.arena, left)?;
                    let decl = self.sole_uninitialized_declaration(method, name)?;
                    Some(ContextObject {
                        decl,
                        construction: idx,
                        assigned: left,
                        name: name.to_string(),
                        record_type,
                    })
                }
                _ => None,
            })
            .collect()
    }

    /// Record type of a `new Record()` expression.
    fn fresh_record(&self, idx: NodeIndex) -> Option<TypeId> {
        match self.arena.kind(idx)? {
            NodeKind::ObjectCreation {
                created_type,
                arguments,
            } if arguments.is_empty() && self.records.contains_key(created_type) => {
                Some(*created_type)
            }
            _ => None,
        }
    }

    /// The only declaration of `name` in `method`, if it has no initializer.
    fn sole_uninitialized_declaration(&self, method: NodeIndex, name: &str) -> Option<NodeIndex> {
        let mut found = None;
        for idx in self.arena.descendants(method) {
            if let Some(NodeKind::Declaration {
                name: decl_name,
                initializer,
                ..
            }) = self.arena.kind(idx)
                && decl_name == name
            {
                if found.is_some() || initializer.is_some() {
                    return None;
                }
                found = Some(idx);
            }
        }
        found
    }

    /// Field name when `idx` is `context.field`.
    fn context_field(&self, idx: NodeIndex, context: &str) -> Option<String> {
        let NodeKind::MemberAccess { target, name } = self.arena.kind(idx)? else {
            return None;
        };
        match self.arena.kind(*target)? {
            NodeKind::Reference { name: target_name } if target_name == context => {
                Some(name.clone())
            }
            _ => None,
        }
    }

    fn rewrite(&mut self, method: NodeIndex, context: &ContextObject) -> bool {
        let Some(fields) = self.records.get(&context.record_type).cloned() else {
            return false;
        };
        let Some((container, at)) = self.arena.statement_position(context.construction) else {
            return false;
        };

        // Every use must be a field access on the context object.
        let mut read_fields = FxHashSet::default();
        for r in find_references(self.arena, method, &context.name) {
            if r == context.assigned {
                continue;
            }
            let access = self.arena.parent_of(r);
            match self.context_field(access, &context.name) {
                Some(field) if fields.contains_key(&field) => {
                    read_fields.insert(field);
                }
                _ => {
                    tracing::debug!(context = %context.name, "context object escapes, left in place");
                    return false;
                }
            }
        }
        let declarations = self
            .arena
            .descendants(method)
            .into_iter()
            .filter(|&idx| {
                matches!(self.arena.kind(idx), Some(NodeKind::Declaration { name, .. }) if *name == context.name)
            })
            .count();
        if declarations != 1 {
            return false;
        }

        // Field copies immediately following the construction.
        let mut copies = Vec::new();
        let mut copied = FxHashSet::default();
        let following = self.arena.statements(container)[at + 1..].to_vec();
        for stmt in following {
            let Some((left, right)) = as_assignment_statement(self.arena, stmt) else {
                break;
            };
            let Some(field) = self.context_field(left, &context.name) else {
                break;
            };
            if !copied.insert(field.clone()) {
                break;
            }
            copies.push(FieldCopy {
                stmt,
                field,
                value: right,
            });
        }

        let mut scope = collect_scope_names(self.arena, method);
        let mut table: IndexMap<String, NodeIndex> = IndexMap::new();
        for copy in copies {
            if self.is_bare(copy.value) {
                self.arena.remove_from_parent(copy.stmt);
                table.insert(copy.field, copy.value);
                continue;
            }
            let ty = fields.get(&copy.field).copied().unwrap_or(TypeId::NONE);
            let local = scope.unique(&sanitize_synthetic_name(&copy.field));
            self.arena.set_kind(
                copy.stmt,
                NodeKind::Declaration {
                    name: local.clone(),
                    decl_type: ty,
                    initializer: copy.value,
                },
            );
            if let Some(node) = self.arena.get_mut(copy.stmt) {
                node.ty = ty;
                node.binding = Some(Binding::local(ty));
            }
            table.insert(copy.field, make_reference(self.arena, &local, ty));
        }

        // Fields assigned only inside closures live at the construction site.
        let mut defaults = Vec::new();
        for (field, &ty) in &fields {
            if table.contains_key(field) || !read_fields.contains(field) {
                continue;
            }
            let local = scope.unique(&sanitize_synthetic_name(field));
            let init = self
                .arena
                .add(Node::new(NodeKind::DefaultValue { value_type: ty }).with_type(ty));
            defaults.push(make_declaration(self.arena, &local, ty, init));
            table.insert(field.clone(), make_reference(self.arena, &local, ty));
        }
        if let Some((container, at)) = self.arena.statement_position(context.construction) {
            self.arena.remove_from_parent(context.construction);
            self.arena.insert_statements(container, at, &defaults);
        }
        if context.decl != context.construction {
            self.arena.remove_from_parent(context.decl);
        }

        let mut substituted = 0usize;
        for idx in self.arena.descendants(method) {
            let Some(field) = self.context_field(idx, &context.name) else {
                continue;
            };
            let Some(&template) = table.get(&field) else {
                continue;
            };
            let replacement = self.arena.clone_subtree(template);
            let pos = self.arena.get(idx).and_then(|n| n.pos);
            if let Some(node) = self.arena.get_mut(replacement) {
                node.pos = pos;
            }
            self.arena.replace_in_parent(idx, replacement);
            substituted += 1;
        }

        tracing::debug!(
            context = %context.name,
            fields = table.len(),
            substituted,
            "dissolved capture record"
        );
        true
    }

    /// Copies that can be substituted for the field without a new local.
    fn is_bare(&self, value: NodeIndex) -> bool {
        let Some(node) = self.arena.get(value) else {
            return false;
        };
        let binding = node.binding.as_ref().map(|b| b.kind);
        match &node.kind {
            NodeKind::SelfReference { .. } => true,
            NodeKind::Reference { name } => match binding {
                Some(BindingKind::Parameter | BindingKind::Field) => true,
                Some(BindingKind::Local) if !is_synthetic_name(name) => true,
                // Another context object.
                _ => self.records.contains_key(&node.ty),
            },
            NodeKind::MemberAccess { target, .. } => {
                binding == Some(BindingKind::Field)
                    && (target.is_none()
                        || matches!(self.arena.kind(*target), Some(NodeKind::SelfReference { .. })))
            }
            _ => false,
        }
    }

    /// Remove capture records no node refers to anymore. A record can keep
    /// another alive through a field, so this runs to a fixpoint.
    fn remove_unused_records(&mut self, root: NodeIndex) {
        loop {
            let record_defs: Vec<(NodeIndex, TypeId)> = self
                .arena
                .descendants(root)
                .into_iter()
                .filter_map(|idx| match self.arena.kind(idx) {
                    Some(NodeKind::TypeDef {
                        declared_type,
                        compiler_generated: true,
                        ..
                    }) => Some((idx, *declared_type)),
                    _ => None,
                })
                .collect();

            let mut removed = false;
            for (def, ty) in record_defs {
                if !self.is_type_used(root, def, ty) {
                    tracing::debug!(record = %self.arena.types.display(ty), "removed capture record");
                    self.arena.remove_from_parent(def);
                    removed = true;
                }
            }
            if !removed {
                break;
            }
        }
    }

    /// Whether any node outside `def` mentions `ty`.
    fn is_type_used(&self, root: NodeIndex, def: NodeIndex, ty: TypeId) -> bool {
        let mut stack = vec![root];
        while let Some(idx) = stack.pop() {
            if idx == def {
                continue;
            }
            let Some(node) = self.arena.get(idx) else {
                continue;
            };
            let declared = match &node.kind {
                NodeKind::Declaration { decl_type, .. } => *decl_type == ty,
                NodeKind::Field { field_type, .. } => *field_type == ty,
                NodeKind::Parameter { param_type, .. } => *param_type == ty,
                NodeKind::ObjectCreation { created_type, .. } => *created_type == ty,
                NodeKind::Cast { target_type, .. } => *target_type == ty,
                _ => false,
            };
            if declared || node.ty == ty || node.binding.as_ref().is_some_and(|b| b.ty == ty) {
                return true;
            }
            stack.extend(self.arena.children(idx));
        }
        false
    }
}
