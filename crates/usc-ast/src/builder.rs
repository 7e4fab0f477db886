//! Programmatic tree construction.
//!
//! `TreeBuilder` is the embedding-side counterpart of the JSON interchange:
//! it creates nodes bottom-up with bindings and types filled in the way the
//! upstream analyzer would, then hands over a `ResolvedModule`.

use crate::arena::NodeArena;
use crate::base::{NodeIndex, TypeId};
use crate::interchange::ResolvedModule;
use crate::node::{Literal, Modifiers, Node, NodeKind, TypeDefKind, Visibility};
use crate::operators::{BinaryOperator, UnaryOperator};
use crate::symbols::{Binding, BindingKind};
use crate::types::{TypeTable, well_known};
use usc_common::SourceSpan;

pub struct TreeBuilder {
    arena: NodeArena,
    file_name: String,
    source_text: String,
    imports: Vec<String>,
    upstream_errors: Vec<String>,
}

impl TreeBuilder {
    pub fn new(file_name: impl Into<String>) -> Self {
        TreeBuilder {
            arena: NodeArena::new(),
            file_name: file_name.into(),
            source_text: String::new(),
            imports: Vec::new(),
            upstream_errors: Vec::new(),
        }
    }

    /// Raw source text the comment index is built from.
    pub fn with_source(mut self, text: impl Into<String>) -> Self {
        self.source_text = text.into();
        self
    }

    pub fn import(&mut self, namespace: impl Into<String>) {
        self.imports.push(namespace.into());
    }

    pub fn upstream_error(&mut self, message: impl Into<String>) {
        self.upstream_errors.push(message.into());
    }

    pub fn types(&mut self) -> &mut TypeTable {
        &mut self.arena.types
    }

    pub fn arena(&self) -> &NodeArena {
        &self.arena
    }

    pub fn arena_mut(&mut self) -> &mut NodeArena {
        &mut self.arena
    }

    fn add(&mut self, kind: NodeKind, ty: TypeId) -> NodeIndex {
        self.arena.add(Node::new(kind).with_type(ty))
    }

    fn add_bound(&mut self, kind: NodeKind, binding: Binding) -> NodeIndex {
        let ty = binding.ty;
        self.arena.add(Node::new(kind).with_type(ty).with_binding(binding))
    }

    /// Give `idx` a source position.
    pub fn at(&mut self, idx: NodeIndex, span: SourceSpan) -> NodeIndex {
        if let Some(node) = self.arena.get_mut(idx) {
            node.pos = Some(span);
        }
        idx
    }

    /// Position on a single line, columns `column..end_column`.
    pub fn at_line(&mut self, idx: NodeIndex, line: u32, column: u32, end_column: u32) -> NodeIndex {
        self.at(idx, SourceSpan::on_line(line, column, end_column))
    }

    // =========================================================================
    // Literals
    // =========================================================================

    pub fn int(&mut self, value: i64) -> NodeIndex {
        self.add(NodeKind::Literal(Literal::Int(value)), well_known::INT)
    }

    /// Integer literal with an explicit type (`1L`, `(byte) 1`).
    pub fn int_typed(&mut self, value: i64, ty: TypeId) -> NodeIndex {
        self.add(NodeKind::Literal(Literal::Int(value)), ty)
    }

    pub fn float(&mut self, value: f64) -> NodeIndex {
        self.add(NodeKind::Literal(Literal::Float(value)), well_known::DOUBLE)
    }

    pub fn bool(&mut self, value: bool) -> NodeIndex {
        self.add(NodeKind::Literal(Literal::Bool(value)), well_known::BOOL)
    }

    pub fn string(&mut self, value: impl Into<String>) -> NodeIndex {
        self.add(
            NodeKind::Literal(Literal::String(value.into())),
            well_known::STRING,
        )
    }

    pub fn char(&mut self, value: char) -> NodeIndex {
        self.add(NodeKind::Literal(Literal::Char(value)), well_known::CHAR)
    }

    pub fn null(&mut self) -> NodeIndex {
        self.add(NodeKind::Literal(Literal::Null), well_known::OBJECT)
    }

    // =========================================================================
    // Names
    // =========================================================================

    pub fn reference(&mut self, name: impl Into<String>, binding: Binding) -> NodeIndex {
        self.add_bound(NodeKind::Reference { name: name.into() }, binding)
    }

    pub fn local(&mut self, name: impl Into<String>, ty: TypeId) -> NodeIndex {
        self.reference(name, Binding::local(ty))
    }

    pub fn param_ref(&mut self, name: impl Into<String>, ty: TypeId) -> NodeIndex {
        self.reference(name, Binding::parameter(ty))
    }

    /// Unqualified field access (`this` implied).
    pub fn field_ref(&mut self, name: impl Into<String>, ty: TypeId) -> NodeIndex {
        self.member(NodeIndex::NONE, name, Binding::field(ty))
    }

    /// Reference to a type used as the target of static accesses.
    pub fn type_ref(&mut self, name: impl Into<String>, ty: TypeId) -> NodeIndex {
        self.reference(name, Binding::new(BindingKind::Type, ty))
    }

    pub fn member(&mut self, target: NodeIndex, name: impl Into<String>, binding: Binding) -> NodeIndex {
        self.add_bound(
            NodeKind::MemberAccess {
                target,
                name: name.into(),
            },
            binding,
        )
    }

    /// `Enum.Member`.
    pub fn enum_member(&mut self, enum_type: TypeId, name: impl Into<String>) -> NodeIndex {
        let type_name = self
            .arena
            .types
            .get(enum_type)
            .map(|t| t.name.clone())
            .unwrap_or_default();
        let target = self.type_ref(type_name, enum_type);
        self.member(target, name, Binding::static_field(enum_type))
    }

    pub fn this(&mut self, ty: TypeId) -> NodeIndex {
        self.add(NodeKind::SelfReference { is_base: false }, ty)
    }

    // =========================================================================
    // Expressions
    // =========================================================================

    pub fn binary(&mut self, op: BinaryOperator, left: NodeIndex, right: NodeIndex, ty: TypeId) -> NodeIndex {
        self.add(NodeKind::BinaryOp { op, left, right }, ty)
    }

    /// `left = right`, typed as the assigned location.
    pub fn assign(&mut self, left: NodeIndex, right: NodeIndex) -> NodeIndex {
        let ty = self.arena.type_of(left);
        self.binary(BinaryOperator::Assign, left, right, ty)
    }

    pub fn eq(&mut self, left: NodeIndex, right: NodeIndex) -> NodeIndex {
        self.binary(BinaryOperator::Equality, left, right, well_known::BOOL)
    }

    pub fn or(&mut self, left: NodeIndex, right: NodeIndex) -> NodeIndex {
        self.binary(BinaryOperator::LogicalOr, left, right, well_known::BOOL)
    }

    pub fn and(&mut self, left: NodeIndex, right: NodeIndex) -> NodeIndex {
        self.binary(BinaryOperator::LogicalAnd, left, right, well_known::BOOL)
    }

    pub fn unary(&mut self, op: UnaryOperator, operand: NodeIndex, ty: TypeId) -> NodeIndex {
        self.add(NodeKind::UnaryOp { op, operand }, ty)
    }

    pub fn not(&mut self, operand: NodeIndex) -> NodeIndex {
        self.unary(UnaryOperator::LogicalNot, operand, well_known::BOOL)
    }

    /// Reference to a method, carrying its signature.
    pub fn method_ref(&mut self, name: impl Into<String>, return_type: TypeId, params: Vec<TypeId>) -> NodeIndex {
        self.reference(name, Binding::method(return_type, params))
    }

    /// Invoke `target`; the result type comes from the target's binding.
    pub fn call(&mut self, target: NodeIndex, arguments: Vec<NodeIndex>) -> NodeIndex {
        let ty = self
            .arena
            .get(target)
            .and_then(|n| n.binding.as_ref())
            .map(|b| b.ty)
            .unwrap_or(TypeId::NONE);
        self.add(
            NodeKind::Invocation {
                target,
                arguments,
                type_arguments: Vec::new(),
            },
            ty,
        )
    }

    pub fn generic_call(&mut self, target: NodeIndex, arguments: Vec<NodeIndex>, type_arguments: Vec<TypeId>) -> NodeIndex {
        let idx = self.call(target, arguments);
        if let Some(NodeKind::Invocation {
            type_arguments: slot,
            ..
        }) = self.arena.get_mut(idx).map(|n| &mut n.kind)
        {
            *slot = type_arguments;
        }
        idx
    }

    pub fn element(&mut self, target: NodeIndex, indices: Vec<NodeIndex>, ty: TypeId) -> NodeIndex {
        self.add(NodeKind::ElementAccess { target, indices }, ty)
    }

    pub fn new_object(&mut self, created_type: TypeId, arguments: Vec<NodeIndex>) -> NodeIndex {
        self.add(
            NodeKind::ObjectCreation {
                created_type,
                arguments,
            },
            created_type,
        )
    }

    pub fn new_array(&mut self, array_type: TypeId, sizes: Vec<NodeIndex>) -> NodeIndex {
        self.add(
            NodeKind::ArrayCreation {
                array_type,
                sizes,
                elements: Vec::new(),
            },
            array_type,
        )
    }

    pub fn array_literal(&mut self, array_type: TypeId, elements: Vec<NodeIndex>) -> NodeIndex {
        self.add(
            NodeKind::ArrayCreation {
                array_type,
                sizes: Vec::new(),
                elements,
            },
            array_type,
        )
    }

    pub fn cast(&mut self, target_type: TypeId, expression: NodeIndex) -> NodeIndex {
        self.add(
            NodeKind::Cast {
                target_type,
                expression,
            },
            target_type,
        )
    }

    pub fn conditional(&mut self, condition: NodeIndex, when_true: NodeIndex, when_false: NodeIndex) -> NodeIndex {
        let ty = self.arena.type_of(when_true);
        self.add(
            NodeKind::Conditional {
                condition,
                when_true,
                when_false,
            },
            ty,
        )
    }

    /// Closure whose node type is the callable type of its signature.
    pub fn closure(&mut self, params: Vec<NodeIndex>, return_type: TypeId, body: NodeIndex) -> NodeIndex {
        let param_types: Vec<TypeId> = params
            .iter()
            .map(|&p| match self.arena.kind(p) {
                Some(NodeKind::Parameter { param_type, .. }) => *param_type,
                _ => well_known::OBJECT,
            })
            .collect();
        let ty = self.arena.types.callable(param_types, return_type);
        self.add(
            NodeKind::Closure {
                params,
                return_type,
                body,
            },
            ty,
        )
    }

    pub fn default_value(&mut self, value_type: TypeId) -> NodeIndex {
        self.add(NodeKind::DefaultValue { value_type }, value_type)
    }

    pub fn macro_call(&mut self, name: impl Into<String>, arguments: Vec<NodeIndex>) -> NodeIndex {
        self.add(
            NodeKind::MacroCall {
                name: name.into(),
                arguments,
            },
            well_known::VOID,
        )
    }

    pub fn unsupported(&mut self, description: impl Into<String>) -> NodeIndex {
        self.add(
            NodeKind::Unsupported {
                description: description.into(),
            },
            TypeId::NONE,
        )
    }

    // =========================================================================
    // Statements
    // =========================================================================

    pub fn expr_stmt(&mut self, expression: NodeIndex) -> NodeIndex {
        self.add(NodeKind::ExpressionStatement { expression }, TypeId::NONE)
    }

    pub fn decl(&mut self, name: impl Into<String>, decl_type: TypeId, initializer: NodeIndex) -> NodeIndex {
        let idx = self.add(
            NodeKind::Declaration {
                name: name.into(),
                decl_type,
                initializer,
            },
            decl_type,
        );
        if let Some(node) = self.arena.get_mut(idx) {
            node.binding = Some(Binding::local(decl_type));
        }
        idx
    }

    pub fn block(&mut self, statements: Vec<NodeIndex>) -> NodeIndex {
        self.add(NodeKind::Block { statements }, TypeId::NONE)
    }

    pub fn if_(&mut self, condition: NodeIndex, then_branch: NodeIndex, else_branch: NodeIndex) -> NodeIndex {
        self.add(
            NodeKind::If {
                condition,
                then_branch,
                else_branch,
            },
            TypeId::NONE,
        )
    }

    pub fn while_(&mut self, condition: NodeIndex, body: NodeIndex) -> NodeIndex {
        self.add(
            NodeKind::While {
                condition,
                body,
                do_while: false,
            },
            TypeId::NONE,
        )
    }

    pub fn do_while(&mut self, body: NodeIndex, condition: NodeIndex) -> NodeIndex {
        self.add(
            NodeKind::While {
                condition,
                body,
                do_while: true,
            },
            TypeId::NONE,
        )
    }

    pub fn for_(
        &mut self,
        initializers: Vec<NodeIndex>,
        condition: NodeIndex,
        incrementors: Vec<NodeIndex>,
        body: NodeIndex,
    ) -> NodeIndex {
        self.add(
            NodeKind::For {
                initializers,
                condition,
                incrementors,
                body,
            },
            TypeId::NONE,
        )
    }

    pub fn for_each(&mut self, variable: NodeIndex, iterable: NodeIndex, body: NodeIndex) -> NodeIndex {
        self.add(
            NodeKind::ForEach {
                variable,
                iterable,
                body,
            },
            TypeId::NONE,
        )
    }

    pub fn goto(&mut self, label: impl Into<String>) -> NodeIndex {
        self.add(NodeKind::Goto { label: label.into() }, TypeId::NONE)
    }

    pub fn label(&mut self, name: impl Into<String>) -> NodeIndex {
        self.add(NodeKind::Label { name: name.into() }, TypeId::NONE)
    }

    pub fn ret(&mut self, expression: NodeIndex) -> NodeIndex {
        self.add(NodeKind::Return { expression }, TypeId::NONE)
    }

    pub fn brk(&mut self) -> NodeIndex {
        self.add(NodeKind::Break, TypeId::NONE)
    }

    pub fn cont(&mut self) -> NodeIndex {
        self.add(NodeKind::Continue, TypeId::NONE)
    }

    pub fn throw(&mut self, expression: NodeIndex) -> NodeIndex {
        self.add(NodeKind::Throw { expression }, TypeId::NONE)
    }

    pub fn switch(&mut self, discriminant: NodeIndex, sections: Vec<NodeIndex>) -> NodeIndex {
        self.add(
            NodeKind::Switch {
                discriminant,
                sections,
            },
            TypeId::NONE,
        )
    }

    pub fn section(&mut self, labels: Vec<NodeIndex>, is_default: bool, statements: Vec<NodeIndex>) -> NodeIndex {
        self.add(
            NodeKind::SwitchSection {
                labels,
                is_default,
                statements,
            },
            TypeId::NONE,
        )
    }

    // =========================================================================
    // Declarations
    // =========================================================================

    pub fn param(&mut self, name: impl Into<String>, param_type: TypeId) -> NodeIndex {
        let idx = self.add(
            NodeKind::Parameter {
                name: name.into(),
                param_type,
            },
            param_type,
        );
        if let Some(node) = self.arena.get_mut(idx) {
            node.binding = Some(Binding::parameter(param_type));
        }
        idx
    }

    pub fn method(&mut self, name: impl Into<String>, params: Vec<NodeIndex>, return_type: TypeId, body: NodeIndex) -> NodeIndex {
        self.method_with(name, Visibility::Public, Modifiers::empty(), params, return_type, body)
    }

    pub fn method_with(
        &mut self,
        name: impl Into<String>,
        visibility: Visibility,
        modifiers: Modifiers,
        params: Vec<NodeIndex>,
        return_type: TypeId,
        body: NodeIndex,
    ) -> NodeIndex {
        self.add(
            NodeKind::Method {
                name: name.into(),
                visibility,
                modifiers,
                params,
                return_type,
                body,
                is_constructor: false,
            },
            return_type,
        )
    }

    pub fn constructor(&mut self, name: impl Into<String>, params: Vec<NodeIndex>, body: NodeIndex) -> NodeIndex {
        self.add(
            NodeKind::Method {
                name: name.into(),
                visibility: Visibility::Public,
                modifiers: Modifiers::empty(),
                params,
                return_type: TypeId::NONE,
                body,
                is_constructor: true,
            },
            TypeId::NONE,
        )
    }

    pub fn field(&mut self, name: impl Into<String>, field_type: TypeId, initializer: NodeIndex) -> NodeIndex {
        self.field_with(name, Visibility::Public, Modifiers::empty(), field_type, initializer)
    }

    pub fn field_with(
        &mut self,
        name: impl Into<String>,
        visibility: Visibility,
        modifiers: Modifiers,
        field_type: TypeId,
        initializer: NodeIndex,
    ) -> NodeIndex {
        self.add(
            NodeKind::Field {
                name: name.into(),
                visibility,
                modifiers,
                field_type,
                initializer,
            },
            field_type,
        )
    }

    pub fn class(&mut self, name: &str, members: Vec<NodeIndex>) -> NodeIndex {
        let declared = self.arena.types.class(name);
        self.type_def(name, TypeDefKind::Class, Visibility::Public, members, declared)
    }

    pub fn type_def(
        &mut self,
        name: &str,
        kind: TypeDefKind,
        visibility: Visibility,
        members: Vec<NodeIndex>,
        declared_type: TypeId,
    ) -> NodeIndex {
        self.add(
            NodeKind::TypeDef {
                name: name.to_string(),
                kind,
                visibility,
                modifiers: Modifiers::empty(),
                base_types: Vec::new(),
                members,
                declared_type,
                compiler_generated: false,
            },
            declared_type,
        )
    }

    /// Compiler-generated capture record class.
    pub fn capture_record(&mut self, name: &str, fields: Vec<NodeIndex>) -> NodeIndex {
        let idx = self.class(name, fields);
        if let Some(NodeKind::TypeDef {
            compiler_generated,
            visibility,
            ..
        }) = self.arena.get_mut(idx).map(|n| &mut n.kind)
        {
            *compiler_generated = true;
            *visibility = Visibility::Internal;
        }
        idx
    }

    pub fn source_file(&mut self, members: Vec<NodeIndex>) -> NodeIndex {
        let imports = std::mem::take(&mut self.imports);
        self.add(
            NodeKind::SourceFile {
                name: self.file_name.clone(),
                imports,
                members,
            },
            TypeId::NONE,
        )
    }

    /// Wrap up the module with `root` as its tree.
    pub fn finish(self, root: NodeIndex) -> ResolvedModule {
        ResolvedModule {
            file_name: self.file_name,
            source_text: self.source_text,
            root,
            arena: self.arena,
            upstream_errors: self.upstream_errors,
        }
    }
}
