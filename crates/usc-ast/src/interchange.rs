//! JSON interchange for resolved modules.
//!
//! The upstream analyzer dumps each module as a flat node arena:
//!
//! ```json
//! { "file_name": "Game.us", "source_text": "...", "root": 12,
//!   "nodes": [ { "kind": { "Reference": { "name": "x" } }, "ty": 9 }, ... ],
//!   "types": [ { "name": "Player", "flags": "REFERENCE" } ],
//!   "upstream_errors": [] }
//! ```
//!
//! `types` lists user types only; their ids start at
//! `well_known::FIRST_USER_TYPE`, in dump order. Parent links are not part of
//! the dump and are recomputed on load.

use crate::arena::NodeArena;
use crate::base::{NodeIndex, TypeId};
use crate::node::Node;
use crate::types::{TypeInfo, TypeTable};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum InterchangeError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("root {0:?} is not a node of the module")]
    MissingRoot(NodeIndex),
    #[error("node {parent:?} references missing child {child:?}")]
    DanglingChild { parent: NodeIndex, child: NodeIndex },
    #[error("node {node:?} references unknown type {ty:?}")]
    DanglingType { node: NodeIndex, ty: TypeId },
    #[error("node {0:?} is referenced by more than one parent")]
    SharedChild(NodeIndex),
}

/// One module handed over by the upstream analyzer.
#[derive(Clone, Debug)]
pub struct ResolvedModule {
    pub file_name: String,
    /// Raw source text, used for the comment index only.
    pub source_text: String,
    pub root: NodeIndex,
    pub arena: NodeArena,
    /// Compilation errors reported upstream.
    pub upstream_errors: Vec<String>,
}

#[derive(Serialize, Deserialize)]
struct ModuleDump {
    file_name: String,
    #[serde(default)]
    source_text: String,
    root: NodeIndex,
    nodes: Vec<Node>,
    #[serde(default)]
    types: Vec<TypeInfo>,
    #[serde(default)]
    upstream_errors: Vec<String>,
}

impl ResolvedModule {
    pub fn from_json(text: &str) -> Result<ResolvedModule, InterchangeError> {
        let dump: ModuleDump = serde_json::from_str(text)?;
        ResolvedModule::from_dump(dump)
    }

    pub fn read(path: &Path) -> Result<ResolvedModule, InterchangeError> {
        let text = std::fs::read_to_string(path)?;
        ResolvedModule::from_json(&text)
    }

    fn from_dump(dump: ModuleDump) -> Result<ResolvedModule, InterchangeError> {
        let mut types = TypeTable::new();
        for info in dump.types {
            types.push(info);
        }
        let mut arena = NodeArena::with_types(types);
        arena.nodes = dump.nodes;

        if arena.get(dump.root).is_none() {
            return Err(InterchangeError::MissingRoot(dump.root));
        }
        validate(&arena)?;
        arena.fix_parents(dump.root);
        debug!(
            file = %dump.file_name,
            nodes = arena.len(),
            types = arena.types.len(),
            "loaded resolved module"
        );

        Ok(ResolvedModule {
            file_name: dump.file_name,
            source_text: dump.source_text,
            root: dump.root,
            arena,
            upstream_errors: dump.upstream_errors,
        })
    }

    pub fn to_json(&self) -> Result<String, InterchangeError> {
        let dump = ModuleDump {
            file_name: self.file_name.clone(),
            source_text: self.source_text.clone(),
            root: self.root,
            nodes: self.arena.nodes.clone(),
            types: self.arena.types.user_types().to_vec(),
            upstream_errors: self.upstream_errors.clone(),
        };
        Ok(serde_json::to_string_pretty(&dump)?)
    }
}

/// Every child index must exist, every node has at most one parent, and
/// every type id on a node must be known.
fn validate(arena: &NodeArena) -> Result<(), InterchangeError> {
    let mut seen = vec![false; arena.len()];
    for (i, node) in arena.nodes.iter().enumerate() {
        let parent = NodeIndex(i as u32);
        let mut error = None;
        node.kind.for_each_child(&mut |child| {
            if error.is_some() {
                return;
            }
            match seen.get_mut(child.index()) {
                None => error = Some(InterchangeError::DanglingChild { parent, child }),
                Some(true) => error = Some(InterchangeError::SharedChild(child)),
                Some(flag) => *flag = true,
            }
        });
        if let Some(err) = error {
            return Err(err);
        }
        if node.ty.is_some() && arena.types.get(node.ty).is_none() {
            return Err(InterchangeError::DanglingType {
                node: parent,
                ty: node.ty,
            });
        }
    }
    Ok(())
}
