//! Index types shared by the arena and the type table.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Index of a node in a `NodeArena`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeIndex(pub u32);

impl NodeIndex {
    pub const NONE: NodeIndex = NodeIndex(u32::MAX);

    #[inline]
    pub fn is_none(self) -> bool {
        self == NodeIndex::NONE
    }

    #[inline]
    pub fn is_some(self) -> bool {
        !self.is_none()
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl Default for NodeIndex {
    fn default() -> Self {
        NodeIndex::NONE
    }
}

impl fmt::Debug for NodeIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_none() {
            f.write_str("NodeIndex(NONE)")
        } else {
            write!(f, "NodeIndex({})", self.0)
        }
    }
}

/// Index of a type in a `TypeTable`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeId(pub u32);

impl TypeId {
    pub const NONE: TypeId = TypeId(u32::MAX);

    #[inline]
    pub fn is_none(self) -> bool {
        self == TypeId::NONE
    }

    #[inline]
    pub fn is_some(self) -> bool {
        !self.is_none()
    }
}

impl Default for TypeId {
    fn default() -> Self {
        TypeId::NONE
    }
}

impl fmt::Debug for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_none() {
            f.write_str("TypeId(NONE)")
        } else {
            write!(f, "TypeId({})", self.0)
        }
    }
}
