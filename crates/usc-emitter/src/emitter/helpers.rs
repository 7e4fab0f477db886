use super::Printer;
use std::borrow::Cow;
use usc_ast::{Modifiers, NodeIndex, TypeId, Visibility};
use usc_common::names::SYNTHETIC_MARKER;
use usc_common::{is_synthetic_name, sanitize_synthetic_name};

impl<'a> Printer<'a> {
    // =========================================================================
    // Output Helpers (delegate to SourceWriter)
    // =========================================================================

    pub(super) fn write(&mut self, text: &str) {
        self.writer.write(text);
    }

    pub(super) fn write_line(&mut self) {
        self.writer.write_line();
    }

    pub(super) fn write_space(&mut self) {
        self.writer.write_space();
    }

    pub(super) fn increase_indent(&mut self) {
        self.writer.increase_indent();
    }

    pub(super) fn decrease_indent(&mut self) {
        self.writer.decrease_indent();
    }

    // =========================================================================
    // Types and modifiers
    // =========================================================================

    pub(super) fn type_name(&self, ty: TypeId) -> String {
        self.arena.types.display(ty)
    }

    pub(super) fn write_type(&mut self, ty: TypeId) {
        let name = self.type_name(ty);
        self.write(&type_text(&name));
    }

    /// Write an identifier. Synthetic names that survived the passes are
    /// made legal.
    pub(super) fn write_name(&mut self, name: &str) {
        let text = identifier(name);
        self.write(&text);
    }

    /// `public static ` and friends, each followed by a space.
    pub(super) fn write_modifiers(&mut self, visibility: Visibility, modifiers: Modifiers) {
        if let Some(keyword) = visibility.keyword() {
            self.write(keyword);
            self.write_space();
        }
        for (flag, keyword) in [
            (Modifiers::STATIC, "static"),
            (Modifiers::CONST, "const"),
            (Modifiers::ABSTRACT, "abstract"),
            (Modifiers::VIRTUAL, "virtual"),
            (Modifiers::SEALED, "sealed"),
            (Modifiers::OVERRIDE, "override"),
            (Modifiers::READONLY, "readonly"),
        ] {
            // `const` implies static in C#
            if flag == Modifiers::STATIC && modifiers.contains(Modifiers::CONST) {
                continue;
            }
            if modifiers.contains(flag) {
                self.write(keyword);
                self.write_space();
            }
        }
    }

    /// Write `items` separated by `, `.
    pub(super) fn write_comma_list(&mut self, items: &[NodeIndex], mut emit: impl FnMut(&mut Self, NodeIndex)) {
        for (i, &item) in items.iter().enumerate() {
            if i > 0 {
                self.write(", ");
            }
            emit(self, item);
        }
    }
}

fn identifier(name: &str) -> Cow<'_, str> {
    if is_synthetic_name(name) {
        Cow::Owned(sanitize_synthetic_name(name))
    } else {
        Cow::Borrowed(name)
    }
}

/// Sanitize every synthetic name inside a printed type such as
/// `List<$Closure$1>` or `$Closure$1[]`.
fn type_text(text: &str) -> Cow<'_, str> {
    if !is_synthetic_name(text) {
        return Cow::Borrowed(text);
    }
    let mut out = String::with_capacity(text.len());
    let mut word = String::new();
    for c in text.chars() {
        if c.is_alphanumeric() || c == '_' || c == SYNTHETIC_MARKER {
            word.push(c);
            continue;
        }
        out.push_str(&identifier(&word));
        word.clear();
        out.push(c);
    }
    out.push_str(&identifier(&word));
    Cow::Owned(out)
}
