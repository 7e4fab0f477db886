//! Top-level visibility fixup.

use usc_ast::{NodeArena, NodeIndex, NodeKind, Visibility};

/// C# rejects `private` and `protected` on namespace-level types; they
/// become `internal`. Returns the number of types changed.
pub fn fix_top_level_visibility(arena: &mut NodeArena, root: NodeIndex) -> usize {
    let members = match arena.kind(root) {
        Some(NodeKind::SourceFile { members, .. }) => members.clone(),
        _ => return 0,
    };
    let mut changed = 0;
    for member in members {
        if let Some(NodeKind::TypeDef { visibility, name, .. }) =
            arena.get_mut(member).map(|n| &mut n.kind)
            && matches!(visibility, Visibility::Private | Visibility::Protected)
        {
            tracing::debug!(type_name = %name, from = ?visibility, "top-level type made internal");
            *visibility = Visibility::Internal;
            changed += 1;
        }
    }
    changed
}
