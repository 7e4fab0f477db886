//! Per-module diagnostics.
//!
//! Every module run owns one `ModuleDiagnostics`. Passes push into it while
//! they rewrite the tree; the caller merges records from several modules only
//! after each run has completed.

use crate::position::SourcePosition;
use serde::Serialize;
use std::fmt;

/// A construct with no rewrite or emission rule.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct UnsupportedConstruct {
    /// Node kind name, e.g. `MacroCall`.
    pub node_kind: String,
    /// Short textual form of the node.
    pub description: String,
    /// `None` for synthetic nodes.
    pub position: Option<SourcePosition>,
}

/// A comment that could not be associated with any node.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct OrphanComment {
    pub text: String,
    pub position: SourcePosition,
}

/// Non-fatal notes, such as upstream errors accepted in best-effort mode.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Warning {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<SourcePosition>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ModuleDiagnostics {
    pub unsupported: Vec<UnsupportedConstruct>,
    pub orphan_comments: Vec<OrphanComment>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<Warning>,
}

impl ModuleDiagnostics {
    pub fn new() -> Self {
        ModuleDiagnostics::default()
    }

    pub fn unsupported(
        &mut self,
        node_kind: impl Into<String>,
        description: impl Into<String>,
        position: Option<SourcePosition>,
    ) {
        self.unsupported.push(UnsupportedConstruct {
            node_kind: node_kind.into(),
            description: description.into(),
            position,
        });
    }

    pub fn orphan(&mut self, text: impl Into<String>, position: SourcePosition) {
        self.orphan_comments.push(OrphanComment {
            text: text.into(),
            position,
        });
    }

    pub fn warn(&mut self, message: impl Into<String>, position: Option<SourcePosition>) {
        self.warnings.push(Warning {
            message: message.into(),
            position,
        });
    }

    pub fn is_empty(&self) -> bool {
        self.unsupported.is_empty() && self.orphan_comments.is_empty() && self.warnings.is_empty()
    }

    pub fn len(&self) -> usize {
        self.unsupported.len() + self.orphan_comments.len() + self.warnings.len()
    }

    /// Append another record, keeping order.
    pub fn merge(&mut self, other: ModuleDiagnostics) {
        self.unsupported.extend(other.unsupported);
        self.orphan_comments.extend(other.orphan_comments);
        self.warnings.extend(other.warnings);
    }
}

impl fmt::Display for UnsupportedConstruct {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.position {
            Some(pos) => write!(
                f,
                "{pos}: unsupported {}: {}",
                self.node_kind, self.description
            ),
            None => write!(
                f,
                "<synthetic>: unsupported {}: {}",
                self.node_kind, self.description
            ),
        }
    }
}

impl fmt::Display for OrphanComment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: orphan comment {}", self.position, self.text)
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.position {
            Some(pos) => write!(f, "{pos}: {}", self.message),
            None => f.write_str(&self.message),
        }
    }
}
