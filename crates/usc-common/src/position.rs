//! Line/column positions.
//!
//! Lines and columns are 1-based. Columns count characters, not bytes, so
//! that distances computed by the comment attachment pass match what a
//! reader sees in an editor.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Source range of a node or comment, start inclusive, end exclusive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceSpan {
    pub line: u32,
    pub column: u32,
    pub end_line: u32,
    pub end_column: u32,
}

impl SourceSpan {
    pub const fn new(line: u32, column: u32, end_line: u32, end_column: u32) -> Self {
        SourceSpan {
            line,
            column,
            end_line,
            end_column,
        }
    }

    /// Span covering a single line.
    pub const fn on_line(line: u32, column: u32, end_column: u32) -> Self {
        SourceSpan::new(line, column, line, end_column)
    }

    /// Check whether `line` lies within this span (inclusive on both ends).
    pub fn contains_line(&self, line: u32) -> bool {
        line >= self.line && line <= self.end_line
    }

    pub fn is_single_line(&self) -> bool {
        self.line == self.end_line
    }
}

/// A position reported to the caller, qualified by file name.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourcePosition {
    pub file: String,
    pub line: u32,
    pub column: u32,
}

impl SourcePosition {
    pub fn new(file: impl Into<String>, line: u32, column: u32) -> Self {
        SourcePosition {
            file: file.into(),
            line,
            column,
        }
    }

    /// Position of the start of `span` in `file`.
    pub fn from_span(file: &str, span: SourceSpan) -> Self {
        SourcePosition::new(file, span.line, span.column)
    }
}

impl fmt::Display for SourcePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({},{})", self.file, self.line, self.column)
    }
}
