//! Node definitions for the resolved tree.
//!
//! Nodes are stored in a `NodeArena` and reference their children by
//! `NodeIndex`. A node without a position is synthetic: it was introduced by
//! the upstream compiler or by a rewrite pass.

use crate::base::{NodeIndex, TypeId};
use crate::operators::{BinaryOperator, UnaryOperator};
use crate::symbols::Binding;
use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use usc_common::{AnchorSide, SourceSpan};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Visibility {
    #[default]
    Public,
    Protected,
    Internal,
    Private,
    /// No explicit modifier in the output.
    Unspecified,
}

impl Visibility {
    pub fn keyword(self) -> Option<&'static str> {
        match self {
            Visibility::Public => Some("public"),
            Visibility::Protected => Some("protected"),
            Visibility::Internal => Some("internal"),
            Visibility::Private => Some("private"),
            Visibility::Unspecified => None,
        }
    }
}

bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct Modifiers: u32 {
        const STATIC = 1 << 0;
        const ABSTRACT = 1 << 1;
        const VIRTUAL = 1 << 2;
        const OVERRIDE = 1 << 3;
        const SEALED = 1 << 4;
        const READONLY = 1 << 5;
        const CONST = 1 << 6;
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeDefKind {
    Class,
    Struct,
    Interface,
    Enum,
}

impl TypeDefKind {
    pub fn keyword(self) -> &'static str {
        match self {
            TypeDefKind::Class => "class",
            TypeDefKind::Struct => "struct",
            TypeDefKind::Interface => "interface",
            TypeDefKind::Enum => "enum",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Literal {
    Int(i64),
    Float(f64),
    Bool(bool),
    String(String),
    Char(char),
    Null,
}

/// A comment attached to a node by the attachment pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachedComment {
    /// Index into the module's `CommentIndex`.
    pub comment: u32,
    pub anchor: AnchorSide,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum NodeKind {
    // =========================================================================
    // Declarations
    // =========================================================================
    SourceFile {
        name: String,
        #[serde(default)]
        imports: Vec<String>,
        members: Vec<NodeIndex>,
    },
    TypeDef {
        name: String,
        kind: TypeDefKind,
        #[serde(default)]
        visibility: Visibility,
        #[serde(default)]
        modifiers: Modifiers,
        #[serde(default)]
        base_types: Vec<TypeId>,
        members: Vec<NodeIndex>,
        /// The type this definition declares.
        #[serde(default)]
        declared_type: TypeId,
        /// Invented by the upstream compiler (closure capture records).
        #[serde(default)]
        compiler_generated: bool,
    },
    Method {
        name: String,
        #[serde(default)]
        visibility: Visibility,
        #[serde(default)]
        modifiers: Modifiers,
        params: Vec<NodeIndex>,
        return_type: TypeId,
        /// `NONE` for abstract and interface methods.
        #[serde(default)]
        body: NodeIndex,
        #[serde(default)]
        is_constructor: bool,
    },
    Field {
        name: String,
        #[serde(default)]
        visibility: Visibility,
        #[serde(default)]
        modifiers: Modifiers,
        field_type: TypeId,
        #[serde(default)]
        initializer: NodeIndex,
    },
    Parameter {
        name: String,
        param_type: TypeId,
    },
    /// Local variable declaration statement.
    Declaration {
        name: String,
        decl_type: TypeId,
        #[serde(default)]
        initializer: NodeIndex,
    },

    // =========================================================================
    // Statements
    // =========================================================================
    Block {
        statements: Vec<NodeIndex>,
    },
    ExpressionStatement {
        expression: NodeIndex,
    },
    If {
        condition: NodeIndex,
        then_branch: NodeIndex,
        #[serde(default)]
        else_branch: NodeIndex,
    },
    While {
        condition: NodeIndex,
        body: NodeIndex,
        #[serde(default)]
        do_while: bool,
    },
    For {
        #[serde(default)]
        initializers: Vec<NodeIndex>,
        #[serde(default)]
        condition: NodeIndex,
        #[serde(default)]
        incrementors: Vec<NodeIndex>,
        body: NodeIndex,
    },
    ForEach {
        /// A `Declaration` without initializer.
        variable: NodeIndex,
        iterable: NodeIndex,
        body: NodeIndex,
    },
    Goto {
        label: String,
    },
    Label {
        name: String,
    },
    Return {
        #[serde(default)]
        expression: NodeIndex,
    },
    Break,
    Continue,
    Throw {
        #[serde(default)]
        expression: NodeIndex,
    },
    Switch {
        discriminant: NodeIndex,
        sections: Vec<NodeIndex>,
    },
    SwitchSection {
        /// Case constants; empty for the default section.
        labels: Vec<NodeIndex>,
        is_default: bool,
        statements: Vec<NodeIndex>,
    },

    // =========================================================================
    // Expressions
    // =========================================================================
    BinaryOp {
        op: BinaryOperator,
        left: NodeIndex,
        right: NodeIndex,
    },
    UnaryOp {
        op: UnaryOperator,
        operand: NodeIndex,
    },
    Invocation {
        target: NodeIndex,
        arguments: Vec<NodeIndex>,
        #[serde(default)]
        type_arguments: Vec<TypeId>,
    },
    MemberAccess {
        /// `NONE` for an implicit `this` or static-in-scope access.
        #[serde(default)]
        target: NodeIndex,
        name: String,
    },
    ElementAccess {
        target: NodeIndex,
        indices: Vec<NodeIndex>,
    },
    Reference {
        name: String,
    },
    /// `this` or `base`.
    SelfReference {
        #[serde(default)]
        is_base: bool,
    },
    Literal(Literal),
    Cast {
        target_type: TypeId,
        expression: NodeIndex,
    },
    Closure {
        params: Vec<NodeIndex>,
        return_type: TypeId,
        /// A `Block`, or an expression for expression-bodied closures.
        body: NodeIndex,
    },
    ObjectCreation {
        created_type: TypeId,
        arguments: Vec<NodeIndex>,
    },
    ArrayCreation {
        /// The array type being created.
        array_type: TypeId,
        /// Dimension sizes, one per rank; empty when `elements` is used.
        #[serde(default)]
        sizes: Vec<NodeIndex>,
        #[serde(default)]
        elements: Vec<NodeIndex>,
    },
    Conditional {
        condition: NodeIndex,
        when_true: NodeIndex,
        when_false: NodeIndex,
    },
    /// `default(T)`.
    DefaultValue {
        value_type: TypeId,
    },
    /// Macro-style call left in the tree by the upstream compiler.
    MacroCall {
        name: String,
        arguments: Vec<NodeIndex>,
    },
    /// Upstream construct with no counterpart in this model.
    Unsupported {
        description: String,
    },
}

impl NodeKind {
    /// Stable kind name used in diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::SourceFile { .. } => "SourceFile",
            NodeKind::TypeDef { .. } => "TypeDef",
            NodeKind::Method { .. } => "Method",
            NodeKind::Field { .. } => "Field",
            NodeKind::Parameter { .. } => "Parameter",
            NodeKind::Declaration { .. } => "Declaration",
            NodeKind::Block { .. } => "Block",
            NodeKind::ExpressionStatement { .. } => "ExpressionStatement",
            NodeKind::If { .. } => "If",
            NodeKind::While { .. } => "While",
            NodeKind::For { .. } => "For",
            NodeKind::ForEach { .. } => "ForEach",
            NodeKind::Goto { .. } => "Goto",
            NodeKind::Label { .. } => "Label",
            NodeKind::Return { .. } => "Return",
            NodeKind::Break => "Break",
            NodeKind::Continue => "Continue",
            NodeKind::Throw { .. } => "Throw",
            NodeKind::Switch { .. } => "Switch",
            NodeKind::SwitchSection { .. } => "SwitchSection",
            NodeKind::BinaryOp { .. } => "BinaryOp",
            NodeKind::UnaryOp { .. } => "UnaryOp",
            NodeKind::Invocation { .. } => "Invocation",
            NodeKind::MemberAccess { .. } => "MemberAccess",
            NodeKind::ElementAccess { .. } => "ElementAccess",
            NodeKind::Reference { .. } => "Reference",
            NodeKind::SelfReference { .. } => "SelfReference",
            NodeKind::Literal(_) => "Literal",
            NodeKind::Cast { .. } => "Cast",
            NodeKind::Closure { .. } => "Closure",
            NodeKind::ObjectCreation { .. } => "ObjectCreation",
            NodeKind::ArrayCreation { .. } => "ArrayCreation",
            NodeKind::Conditional { .. } => "Conditional",
            NodeKind::DefaultValue { .. } => "DefaultValue",
            NodeKind::MacroCall { .. } => "MacroCall",
            NodeKind::Unsupported { .. } => "Unsupported",
        }
    }

    /// Statements that unconditionally leave the current flow.
    pub fn is_jump(&self) -> bool {
        matches!(
            self,
            NodeKind::Return { .. }
                | NodeKind::Break
                | NodeKind::Continue
                | NodeKind::Throw { .. }
                | NodeKind::Goto { .. }
        )
    }

    /// Statement kinds that own a `break`/`continue` target.
    pub fn is_breakable(&self) -> bool {
        matches!(
            self,
            NodeKind::While { .. }
                | NodeKind::For { .. }
                | NodeKind::ForEach { .. }
                | NodeKind::Switch { .. }
        )
    }

    pub fn is_literal(&self) -> bool {
        matches!(self, NodeKind::Literal(_))
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub kind: NodeKind,
    /// `None` for synthetic nodes.
    #[serde(default)]
    pub pos: Option<SourceSpan>,
    #[serde(skip)]
    pub parent: NodeIndex,
    /// Static type of an expression.
    #[serde(default)]
    pub ty: TypeId,
    #[serde(default)]
    pub binding: Option<Binding>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub comments: Vec<AttachedComment>,
}

impl Node {
    pub fn new(kind: NodeKind) -> Self {
        Node {
            kind,
            pos: None,
            parent: NodeIndex::NONE,
            ty: TypeId::NONE,
            binding: None,
            comments: Vec::new(),
        }
    }

    pub fn with_pos(mut self, pos: SourceSpan) -> Self {
        self.pos = Some(pos);
        self
    }

    pub fn with_type(mut self, ty: TypeId) -> Self {
        self.ty = ty;
        self
    }

    pub fn with_binding(mut self, binding: Binding) -> Self {
        self.binding = Some(binding);
        self
    }

    pub fn is_synthetic(&self) -> bool {
        self.pos.is_none()
    }
}
