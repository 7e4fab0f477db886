//! Source file, type and member emission.

use super::Printer;
use usc_ast::{NodeIndex, NodeKind, TypeDefKind, TypeId, well_known};

impl<'a> Printer<'a> {
    pub(super) fn emit_source_file(&mut self, root: NodeIndex) {
        let arena = self.arena;
        let Some(NodeKind::SourceFile { imports, members, .. }) = arena.kind(root) else {
            self.emit_statement(root);
            return;
        };
        for import in imports {
            self.write("using ");
            self.write(import);
            self.write(";");
            self.write_line();
        }
        for (i, &member) in members.iter().enumerate() {
            if i > 0 || !imports.is_empty() {
                self.write_line();
            }
            self.emit_statement(member);
        }
    }

    /// Types, methods and fields go through `emit_statement` for their
    /// comments and line ending; this writes the declaration itself.
    pub(super) fn emit_member_text(&mut self, idx: NodeIndex) {
        let arena = self.arena;
        let Some(node) = arena.get(idx) else {
            return;
        };
        match &node.kind {
            NodeKind::TypeDef {
                name,
                kind,
                visibility,
                modifiers,
                base_types,
                members,
                ..
            } => {
                self.write_modifiers(*visibility, *modifiers);
                self.write(kind.keyword());
                self.write(" ");
                self.write_name(name);
                self.write_base_types(base_types);
                self.write(" {");
                self.write_line();
                self.increase_indent();
                if *kind == TypeDefKind::Enum {
                    for &member in members {
                        self.emit_enum_member(member);
                    }
                } else {
                    self.emit_type_members(members);
                }
                self.decrease_indent();
                self.write("}");
            }
            NodeKind::Method {
                name,
                visibility,
                modifiers,
                params,
                return_type,
                body,
                is_constructor,
            } => {
                self.write_modifiers(*visibility, *modifiers);
                if !*is_constructor {
                    let ty = if return_type.is_none() {
                        well_known::VOID
                    } else {
                        *return_type
                    };
                    self.write_type(ty);
                    self.write(" ");
                }
                self.write_name(name);
                self.write("(");
                self.write_comma_list(params, |p, param| p.emit_parameter(param));
                self.write(")");
                if body.is_none() {
                    self.write(";");
                } else {
                    self.write(" ");
                    self.emit_body(*body);
                }
            }
            NodeKind::Field {
                name,
                visibility,
                modifiers,
                field_type,
                initializer,
            } => {
                self.write_modifiers(*visibility, *modifiers);
                self.write_type(*field_type);
                self.write(" ");
                self.write_name(name);
                if initializer.is_some() {
                    self.write(" = ");
                    self.emit_expression(*initializer);
                }
                self.write(";");
            }
            _ => self.ctx.report_unsupported(arena, idx),
        }
    }

    /// Members of a class, struct or interface: a blank line between
    /// members, except between consecutive fields.
    fn emit_type_members(&mut self, members: &[NodeIndex]) {
        let mut previous_was_field = None;
        for &member in members {
            let is_field = matches!(self.arena.kind(member), Some(NodeKind::Field { .. }));
            if let Some(previous) = previous_was_field
                && !(previous && is_field)
            {
                self.write_line();
            }
            self.emit_statement(member);
            previous_was_field = Some(is_field);
        }
    }

    /// `Name = value,` inside an enum body.
    fn emit_enum_member(&mut self, idx: NodeIndex) {
        let arena = self.arena;
        let Some(NodeKind::Field {
            name, initializer, ..
        }) = arena.kind(idx)
        else {
            self.ctx.report_unsupported(arena, idx);
            return;
        };
        self.writer.ensure_line_start();
        self.emit_leading_comments(idx);
        self.write_name(name);
        if initializer.is_some() {
            self.write(" = ");
            self.emit_expression(*initializer);
        }
        self.write(",");
        self.emit_right_comments(idx);
        self.write_line();
        self.emit_trailing_comments(idx);
    }

    /// `T name` of a method or closure parameter.
    pub(super) fn emit_parameter(&mut self, idx: NodeIndex) {
        let arena = self.arena;
        let Some(NodeKind::Parameter { name, param_type }) = arena.kind(idx) else {
            self.ctx.report_unsupported(arena, idx);
            return;
        };
        self.emit_leading_comments(idx);
        // Untyped closure parameters are inferred.
        if param_type.is_some() {
            self.write_type(*param_type);
            self.write(" ");
        }
        self.write_name(name);
        self.emit_right_comments(idx);
    }

    fn write_base_types(&mut self, base_types: &[TypeId]) {
        if base_types.is_empty() {
            return;
        }
        self.write(" : ");
        for (i, ty) in base_types.iter().enumerate() {
            if i > 0 {
                self.write(", ");
            }
            self.write_type(*ty);
        }
    }
}
