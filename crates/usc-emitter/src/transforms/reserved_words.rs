//! Reserved-word escaping.
//!
//! Source identifiers that are C# keywords (`object`, `base`, `event`, ...)
//! get the configured prefix, `@` by default, on declarations and on every
//! use so that both sides keep matching. Names of built-in types used as
//! static targets (`int.Parse`) are keywords on purpose and stay as written.

use crate::emit_context::EmitContext;
use once_cell::sync::Lazy;
use rustc_hash::FxHashSet;
use usc_ast::well_known::FIRST_USER_TYPE;
use usc_ast::{BindingKind, NodeArena, NodeIndex, NodeKind, TypeId};

static RESERVED_WORDS: Lazy<FxHashSet<&'static str>> = Lazy::new(|| {
    [
        "abstract", "as", "base", "bool", "break", "byte", "case", "catch", "char", "checked",
        "class", "const", "continue", "decimal", "default", "delegate", "do", "double", "else",
        "enum", "event", "explicit", "extern", "false", "finally", "fixed", "float", "for",
        "foreach", "goto", "if", "implicit", "in", "int", "interface", "internal", "is", "lock",
        "long", "namespace", "new", "null", "object", "operator", "out", "override", "params",
        "private", "protected", "public", "readonly", "ref", "return", "sbyte", "sealed",
        "short", "sizeof", "stackalloc", "static", "string", "struct", "switch", "this",
        "throw", "true", "try", "typeof", "uint", "ulong", "unchecked", "unsafe", "ushort",
        "using", "virtual", "void", "volatile", "while",
    ]
    .into_iter()
    .collect()
});

pub fn is_reserved_word(name: &str) -> bool {
    RESERVED_WORDS.contains(name)
}

pub struct ReservedWordRenamer<'a> {
    arena: &'a mut NodeArena,
    ctx: &'a mut EmitContext,
}

impl<'a> ReservedWordRenamer<'a> {
    pub fn new(arena: &'a mut NodeArena, ctx: &'a mut EmitContext) -> Self {
        ReservedWordRenamer { arena, ctx }
    }

    #[tracing::instrument(level = "debug", skip(self), fields(file = %self.ctx.file_name))]
    pub fn run(self, root: NodeIndex) -> usize {
        let prefix = self.ctx.options.reserved_word_prefix.clone();
        let mut renamed = 0;

        for idx in self.arena.descendants(root) {
            let Some(node) = self.arena.get_mut(idx) else {
                continue;
            };
            if let Some(binding) = &node.binding
                && binding.kind == BindingKind::Type
                && binding.ty.0 < FIRST_USER_TYPE
            {
                continue;
            }
            let name = match &mut node.kind {
                NodeKind::TypeDef { name, .. }
                | NodeKind::Method { name, .. }
                | NodeKind::Field { name, .. }
                | NodeKind::Parameter { name, .. }
                | NodeKind::Declaration { name, .. }
                | NodeKind::Reference { name }
                | NodeKind::MemberAccess { name, .. }
                | NodeKind::Label { name } => name,
                NodeKind::Goto { label } => label,
                _ => continue,
            };
            if is_reserved_word(name) {
                tracing::trace!(name = %name, "escaped reserved word");
                name.insert_str(0, &prefix);
                renamed += 1;
            }
        }

        // User type names are printed from the type table.
        let user_types: Vec<(TypeId, String)> = self
            .arena
            .types
            .user_types()
            .iter()
            .enumerate()
            .filter(|(_, info)| is_reserved_word(&info.name))
            .map(|(i, info)| {
                (
                    TypeId(FIRST_USER_TYPE + i as u32),
                    format!("{prefix}{}", info.name),
                )
            })
            .collect();
        for (id, name) in user_types {
            self.arena.types.rename(id, name);
            renamed += 1;
        }

        if renamed > 0 {
            tracing::debug!(renamed, "escaped reserved words");
        }
        renamed
    }
}
