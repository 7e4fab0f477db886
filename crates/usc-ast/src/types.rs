//! Resolved types.
//!
//! Every module carries its own `TypeTable`. Well-known types are interned
//! first at fixed ids (see `well_known`), user types follow. Type identity is
//! `TypeId` equality: the table dedupes structurally equal entries.

use crate::base::TypeId;
use bitflags::bitflags;
use once_cell::sync::Lazy;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct TypeFlags: u32 {
        const NUMERIC = 1 << 0;
        const INTEGRAL = 1 << 1;
        const FLOATING = 1 << 2;
        const ENUM = 1 << 3;
        const ARRAY = 1 << 4;
        const REFERENCE = 1 << 5;
        const BOOLEAN = 1 << 6;
        const VALUE_TYPE = 1 << 7;
        const OBJECT = 1 << 8;
        const STRING = 1 << 9;
        const VOID = 1 << 10;
        const CALLABLE = 1 << 11;
    }
}

/// Numeric primitive kinds in rank order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum NumericKind {
    Byte,
    SByte,
    Short,
    UShort,
    Char,
    Int,
    UInt,
    Long,
    ULong,
    Float,
    Double,
    Decimal,
}

/// Implicit (widening) numeric conversions of the target language.
static WIDENING: Lazy<FxHashMap<NumericKind, &'static [NumericKind]>> = Lazy::new(|| {
    use NumericKind::*;
    let table: [(NumericKind, &'static [NumericKind]); 12] = [
        (SByte, &[Short, Int, Long, Float, Double, Decimal]),
        (
            Byte,
            &[Short, UShort, Int, UInt, Long, ULong, Float, Double, Decimal],
        ),
        (Short, &[Int, Long, Float, Double, Decimal]),
        (UShort, &[Int, UInt, Long, ULong, Float, Double, Decimal]),
        (Int, &[Long, Float, Double, Decimal]),
        (UInt, &[Long, ULong, Float, Double, Decimal]),
        (Long, &[Float, Double, Decimal]),
        (ULong, &[Float, Double, Decimal]),
        (
            Char,
            &[UShort, Int, UInt, Long, ULong, Float, Double, Decimal],
        ),
        (Float, &[Double]),
        (Double, &[]),
        (Decimal, &[]),
    ];
    table.into_iter().collect()
});

impl NumericKind {
    pub fn rank(self) -> u8 {
        self as u8
    }

    pub fn is_integral(self) -> bool {
        !self.is_floating()
    }

    pub fn is_floating(self) -> bool {
        matches!(
            self,
            NumericKind::Float | NumericKind::Double | NumericKind::Decimal
        )
    }

    /// Check whether converting `self` to `to` never loses information.
    pub fn is_widening_to(self, to: NumericKind) -> bool {
        self == to || WIDENING.get(&self).is_some_and(|targets| targets.contains(&to))
    }

    /// Check whether an `int` constant `value` converts to `self` without a
    /// cast. `char` never accepts an integer constant implicitly.
    pub fn fits_literal(self, value: i64) -> bool {
        use NumericKind::*;
        match self {
            Byte => (0..=u8::MAX as i64).contains(&value),
            SByte => (i8::MIN as i64..=i8::MAX as i64).contains(&value),
            Short => (i16::MIN as i64..=i16::MAX as i64).contains(&value),
            UShort => (0..=u16::MAX as i64).contains(&value),
            Char => false,
            Int => (i32::MIN as i64..=i32::MAX as i64).contains(&value),
            UInt => (0..=u32::MAX as i64).contains(&value),
            Long => true,
            ULong => value >= 0,
            Float | Double | Decimal => true,
        }
    }

    fn keyword(self) -> &'static str {
        use NumericKind::*;
        match self {
            Byte => "byte",
            SByte => "sbyte",
            Short => "short",
            UShort => "ushort",
            Char => "char",
            Int => "int",
            UInt => "uint",
            Long => "long",
            ULong => "ulong",
            Float => "float",
            Double => "double",
            Decimal => "decimal",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EnumMember {
    pub name: String,
    pub value: i64,
}

/// Signature of an anonymous callable type.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CallableSignature {
    pub params: Vec<TypeId>,
    pub return_type: TypeId,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeInfo {
    /// Target-language name without generic arguments or array suffix.
    pub name: String,
    pub flags: TypeFlags,
    #[serde(default)]
    pub numeric: Option<NumericKind>,
    /// Element type of an array.
    #[serde(default)]
    pub element: TypeId,
    #[serde(default)]
    pub array_rank: u8,
    #[serde(default)]
    pub type_args: Vec<TypeId>,
    #[serde(default)]
    pub enum_members: Vec<EnumMember>,
    #[serde(default)]
    pub callable: Option<CallableSignature>,
}

impl TypeInfo {
    pub fn named(name: impl Into<String>, flags: TypeFlags) -> Self {
        TypeInfo {
            name: name.into(),
            flags,
            numeric: None,
            element: TypeId::NONE,
            array_rank: 0,
            type_args: Vec::new(),
            enum_members: Vec::new(),
            callable: None,
        }
    }

    fn numeric(kind: NumericKind) -> Self {
        let class = if kind.is_floating() {
            TypeFlags::FLOATING
        } else {
            TypeFlags::INTEGRAL
        };
        TypeInfo {
            numeric: Some(kind),
            ..TypeInfo::named(
                kind.keyword(),
                TypeFlags::NUMERIC | TypeFlags::VALUE_TYPE | class,
            )
        }
    }

    pub fn is_numeric(&self) -> bool {
        self.flags.contains(TypeFlags::NUMERIC)
    }

    pub fn is_enum(&self) -> bool {
        self.flags.contains(TypeFlags::ENUM)
    }

    pub fn is_array(&self) -> bool {
        self.flags.contains(TypeFlags::ARRAY)
    }

    pub fn is_boolean(&self) -> bool {
        self.flags.contains(TypeFlags::BOOLEAN)
    }

    pub fn is_reference_type(&self) -> bool {
        self.flags
            .intersects(TypeFlags::REFERENCE | TypeFlags::ARRAY | TypeFlags::OBJECT | TypeFlags::STRING)
    }
}

/// Pre-interned types at fixed ids.
pub mod well_known {
    use crate::base::TypeId;

    pub const OBJECT: TypeId = TypeId(0);
    pub const VOID: TypeId = TypeId(1);
    pub const BOOL: TypeId = TypeId(2);
    pub const STRING: TypeId = TypeId(3);
    pub const CHAR: TypeId = TypeId(4);
    pub const BYTE: TypeId = TypeId(5);
    pub const SBYTE: TypeId = TypeId(6);
    pub const SHORT: TypeId = TypeId(7);
    pub const USHORT: TypeId = TypeId(8);
    pub const INT: TypeId = TypeId(9);
    pub const UINT: TypeId = TypeId(10);
    pub const LONG: TypeId = TypeId(11);
    pub const ULONG: TypeId = TypeId(12);
    pub const FLOAT: TypeId = TypeId(13);
    pub const DOUBLE: TypeId = TypeId(14);
    pub const DECIMAL: TypeId = TypeId(15);
    /// The untyped callable `Function`.
    pub const FUNCTION: TypeId = TypeId(16);

    /// First id available for user types.
    pub const FIRST_USER_TYPE: u32 = 17;
}

#[derive(Clone, Debug, Serialize)]
pub struct TypeTable {
    types: Vec<TypeInfo>,
    #[serde(skip)]
    lookup: FxHashMap<TypeInfo, TypeId>,
}

impl Default for TypeTable {
    fn default() -> Self {
        TypeTable::new()
    }
}

impl TypeTable {
    pub fn new() -> Self {
        let mut table = TypeTable {
            types: Vec::new(),
            lookup: FxHashMap::default(),
        };
        table.push(TypeInfo::named("object", TypeFlags::OBJECT | TypeFlags::REFERENCE));
        table.push(TypeInfo::named("void", TypeFlags::VOID));
        table.push(TypeInfo::named(
            "bool",
            TypeFlags::BOOLEAN | TypeFlags::VALUE_TYPE,
        ));
        table.push(TypeInfo::named(
            "string",
            TypeFlags::STRING | TypeFlags::REFERENCE,
        ));
        for kind in [
            NumericKind::Char,
            NumericKind::Byte,
            NumericKind::SByte,
            NumericKind::Short,
            NumericKind::UShort,
            NumericKind::Int,
            NumericKind::UInt,
            NumericKind::Long,
            NumericKind::ULong,
            NumericKind::Float,
            NumericKind::Double,
            NumericKind::Decimal,
        ] {
            table.push(TypeInfo::numeric(kind));
        }
        table.push(TypeInfo::named(
            "Function",
            TypeFlags::CALLABLE | TypeFlags::REFERENCE,
        ));
        debug_assert_eq!(table.types.len() as u32, well_known::FIRST_USER_TYPE);
        table
    }

    /// Append without deduplication, so that ids assigned by the upstream
    /// analyzer stay stable.
    pub(crate) fn push(&mut self, info: TypeInfo) -> TypeId {
        let id = TypeId(self.types.len() as u32);
        self.lookup.entry(info.clone()).or_insert(id);
        self.types.push(info);
        id
    }

    /// Rename a type in place, keeping its id.
    pub fn rename(&mut self, id: TypeId, name: impl Into<String>) {
        let Some(info) = self.types.get_mut(id.0 as usize) else {
            return;
        };
        if self.lookup.get(info) == Some(&id) {
            self.lookup.remove(info);
        }
        info.name = name.into();
        self.lookup.entry(info.clone()).or_insert(id);
    }

    /// Intern `info`, returning the existing id for an equal entry.
    pub fn intern(&mut self, info: TypeInfo) -> TypeId {
        if let Some(&id) = self.lookup.get(&info) {
            return id;
        }
        self.push(info)
    }

    pub fn get(&self, id: TypeId) -> Option<&TypeInfo> {
        if id.is_none() {
            return None;
        }
        self.types.get(id.0 as usize)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Types appended after the well-known ones.
    pub fn user_types(&self) -> &[TypeInfo] {
        self.types
            .get(well_known::FIRST_USER_TYPE as usize..)
            .unwrap_or(&[])
    }

    // =========================================================================
    // Constructors
    // =========================================================================

    pub fn class(&mut self, name: &str) -> TypeId {
        self.intern(TypeInfo::named(name, TypeFlags::REFERENCE))
    }

    pub fn value_type(&mut self, name: &str) -> TypeId {
        self.intern(TypeInfo::named(name, TypeFlags::VALUE_TYPE))
    }

    pub fn enum_type(&mut self, name: &str, members: &[(&str, i64)]) -> TypeId {
        let mut info = TypeInfo::named(name, TypeFlags::ENUM | TypeFlags::VALUE_TYPE);
        info.enum_members = members
            .iter()
            .map(|&(name, value)| EnumMember {
                name: name.to_string(),
                value,
            })
            .collect();
        self.intern(info)
    }

    pub fn array_of(&mut self, element: TypeId, rank: u8) -> TypeId {
        let mut info = TypeInfo::named("", TypeFlags::ARRAY | TypeFlags::REFERENCE);
        info.element = element;
        info.array_rank = rank.max(1);
        self.intern(info)
    }

    pub fn generic(&mut self, name: &str, args: Vec<TypeId>, flags: TypeFlags) -> TypeId {
        let mut info = TypeInfo::named(name, flags);
        info.type_args = args;
        self.intern(info)
    }

    /// Anonymous callable type `function(params): return_type`.
    pub fn callable(&mut self, params: Vec<TypeId>, return_type: TypeId) -> TypeId {
        let mut info = TypeInfo::named("", TypeFlags::CALLABLE | TypeFlags::REFERENCE);
        info.callable = Some(CallableSignature {
            params,
            return_type,
        });
        self.intern(info)
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn flags(&self, id: TypeId) -> TypeFlags {
        self.get(id).map(|t| t.flags).unwrap_or_default()
    }

    pub fn is_numeric(&self, id: TypeId) -> bool {
        self.flags(id).contains(TypeFlags::NUMERIC)
    }

    pub fn is_enum(&self, id: TypeId) -> bool {
        self.flags(id).contains(TypeFlags::ENUM)
    }

    pub fn is_boolean(&self, id: TypeId) -> bool {
        self.flags(id).contains(TypeFlags::BOOLEAN)
    }

    pub fn is_object(&self, id: TypeId) -> bool {
        self.flags(id).contains(TypeFlags::OBJECT)
    }

    pub fn is_array(&self, id: TypeId) -> bool {
        self.flags(id).contains(TypeFlags::ARRAY)
    }

    pub fn is_value_type(&self, id: TypeId) -> bool {
        self.flags(id).contains(TypeFlags::VALUE_TYPE)
    }

    pub fn is_reference_type(&self, id: TypeId) -> bool {
        self.get(id).is_some_and(TypeInfo::is_reference_type)
    }

    pub fn numeric_kind(&self, id: TypeId) -> Option<NumericKind> {
        self.get(id).and_then(|t| t.numeric)
    }

    /// Check whether converting `from` to `to` is an implicit widening
    /// numeric conversion. Identical types count as widening.
    pub fn is_widening(&self, from: TypeId, to: TypeId) -> bool {
        if from == to {
            return true;
        }
        match (self.numeric_kind(from), self.numeric_kind(to)) {
            (Some(f), Some(t)) => f.is_widening_to(t),
            _ => false,
        }
    }

    /// The enum member whose value is zero, if any.
    pub fn zero_enum_member(&self, id: TypeId) -> Option<&str> {
        self.get(id)?
            .enum_members
            .iter()
            .find(|m| m.value == 0)
            .map(|m| m.name.as_str())
    }

    /// Target-language spelling of a type: generic arguments, array ranks
    /// (`int[,]`) and callable signatures included.
    pub fn display(&self, id: TypeId) -> String {
        let mut out = String::new();
        self.write_display(id, &mut out, 0);
        out
    }

    fn write_display(&self, id: TypeId, out: &mut String, depth: u32) {
        let Some(info) = self.get(id) else {
            out.push_str("var");
            return;
        };
        if depth > usc_common::limits::MAX_MEMBER_CHAIN_DEPTH {
            out.push_str("object");
            return;
        }
        if info.is_array() {
            self.write_display(info.element, out, depth + 1);
            out.push('[');
            for _ in 1..info.array_rank {
                out.push(',');
            }
            out.push(']');
            return;
        }
        if let Some(sig) = &info.callable {
            // Only reachable for trees that skipped callable normalization.
            out.push_str(if sig.return_type == well_known::VOID || sig.return_type.is_none() {
                "System.Action"
            } else {
                "System.Func"
            });
            let mut args: Vec<TypeId> = sig.params.clone();
            if sig.return_type != well_known::VOID && sig.return_type.is_some() {
                args.push(sig.return_type);
            }
            self.write_type_args(&args, out, depth);
            return;
        }
        out.push_str(&info.name);
        self.write_type_args(&info.type_args, out, depth);
    }

    fn write_type_args(&self, args: &[TypeId], out: &mut String, depth: u32) {
        if args.is_empty() {
            return;
        }
        out.push('<');
        for (i, &arg) in args.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            self.write_display(arg, out, depth + 1);
        }
        out.push('>');
    }
}
