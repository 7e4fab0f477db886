//! Callable Type Normalization
//!
//! Anonymous function types have no C# spelling. Each signature is mapped to
//! the matching framework delegate: `System.Action<...>` for void returns,
//! `System.Func<..., R>` otherwise. The untyped `Function` becomes
//! `System.Delegate`. Arrays and generic instantiations over callables are
//! re-interned with normalized arguments.

use crate::emit_context::EmitContext;
use rustc_hash::FxHashMap;
use usc_ast::well_known;
use usc_ast::{NodeArena, NodeIndex, NodeKind, TypeFlags, TypeId, TypeTable};
use usc_common::limits::MAX_MEMBER_CHAIN_DEPTH;

pub struct CallableTypeNormalizer<'a> {
    arena: &'a mut NodeArena,
    ctx: &'a mut EmitContext,
    memo: FxHashMap<TypeId, TypeId>,
}

impl<'a> CallableTypeNormalizer<'a> {
    pub fn new(arena: &'a mut NodeArena, ctx: &'a mut EmitContext) -> Self {
        CallableTypeNormalizer {
            arena,
            ctx,
            memo: FxHashMap::default(),
        }
    }

    /// Normalize every type slot of the nodes below `root`. Returns the
    /// number of nodes changed.
    #[tracing::instrument(level = "debug", skip(self), fields(file = %self.ctx.file_name))]
    pub fn run(mut self, root: NodeIndex) -> usize {
        let mut types = std::mem::take(&mut self.arena.types);
        let mut changed = 0;
        for idx in self.arena.descendants(root) {
            let Some(node) = self.arena.get_mut(idx) else {
                continue;
            };
            let mut touched = false;
            let mut map = |slot: &mut TypeId| {
                let normalized = normalize(&mut types, &mut self.memo, *slot, 0);
                if normalized != *slot {
                    *slot = normalized;
                    touched = true;
                }
            };
            map(&mut node.ty);
            if let Some(binding) = &mut node.binding {
                map(&mut binding.ty);
                binding.param_types.iter_mut().for_each(&mut map);
            }
            for_each_type_slot(&mut node.kind, &mut map);
            if touched {
                changed += 1;
            }
        }
        self.arena.types = types;
        tracing::debug!(changed, signatures = self.memo.len(), "normalized callable types");
        changed
    }
}

/// Visit the declared-type slots of a node kind.
fn for_each_type_slot(kind: &mut NodeKind, f: &mut impl FnMut(&mut TypeId)) {
    match kind {
        NodeKind::TypeDef { base_types, .. } => base_types.iter_mut().for_each(f),
        NodeKind::Method { return_type, .. } | NodeKind::Closure { return_type, .. } => {
            f(return_type)
        }
        NodeKind::Field { field_type, .. } => f(field_type),
        NodeKind::Parameter { param_type, .. } => f(param_type),
        NodeKind::Declaration { decl_type, .. } => f(decl_type),
        NodeKind::Invocation { type_arguments, .. } => type_arguments.iter_mut().for_each(f),
        NodeKind::Cast { target_type, .. } => f(target_type),
        NodeKind::ObjectCreation { created_type, .. } => f(created_type),
        NodeKind::ArrayCreation { array_type, .. } => f(array_type),
        NodeKind::DefaultValue { value_type } => f(value_type),
        _ => {}
    }
}

/// Delegate type for `id`, memoized per type.
fn normalize(
    types: &mut TypeTable,
    memo: &mut FxHashMap<TypeId, TypeId>,
    id: TypeId,
    depth: u32,
) -> TypeId {
    if let Some(&known) = memo.get(&id) {
        return known;
    }
    let Some(info) = types.get(id).cloned() else {
        return id;
    };
    if depth > MAX_MEMBER_CHAIN_DEPTH {
        return id;
    }

    let result = if info.flags.contains(TypeFlags::CALLABLE) {
        match info.callable {
            Some(sig) => {
                let mut args: Vec<TypeId> = sig
                    .params
                    .iter()
                    .map(|&p| normalize(types, memo, p, depth + 1))
                    .collect();
                if sig.return_type.is_none() || sig.return_type == well_known::VOID {
                    types.generic("System.Action", args, TypeFlags::REFERENCE)
                } else {
                    args.push(normalize(types, memo, sig.return_type, depth + 1));
                    types.generic("System.Func", args, TypeFlags::REFERENCE)
                }
            }
            None => types.class("System.Delegate"),
        }
    } else if info.is_array() {
        let element = normalize(types, memo, info.element, depth + 1);
        if element == info.element {
            id
        } else {
            types.array_of(element, info.array_rank)
        }
    } else if !info.type_args.is_empty() {
        let args: Vec<TypeId> = info
            .type_args
            .iter()
            .map(|&a| normalize(types, memo, a, depth + 1))
            .collect();
        if args == info.type_args {
            id
        } else {
            let mut rebuilt = info;
            rebuilt.type_args = args;
            types.intern(rebuilt)
        }
    } else {
        id
    };
    memo.insert(id, result);
    result
}
