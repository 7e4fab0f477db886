//! Comment anchor index.
//!
//! Comments are not part of the resolved tree, so they are extracted
//! separately from the raw source text before any pass runs (synthetic nodes
//! produced later carry no position and could not be matched against
//! comments anyway). The attachment pass then associates each token with a
//! node of the final tree.

use crate::position::SourceSpan;
use serde::{Deserialize, Serialize};

/// Kind of comment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommentKind {
    /// `// comment`
    Line,
    /// `/* comment */`
    Block,
}

/// Where a comment sits relative to the node it is attached to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnchorSide {
    #[default]
    None,
    /// On an earlier line than the node.
    Above,
    /// On the node's line, before it.
    Left,
    /// On the node's line, after it.
    Right,
    /// After the last node of a scope.
    Trailing,
}

/// A comment token with its source range.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentToken {
    /// Full comment text including the delimiters.
    pub text: String,
    pub kind: CommentKind,
    pub span: SourceSpan,
}

impl CommentToken {
    pub fn line(&self) -> u32 {
        self.span.line
    }

    pub fn is_line_comment(&self) -> bool {
        self.kind == CommentKind::Line
    }
}

/// All comments of one source file, in source order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentIndex {
    pub comments: Vec<CommentToken>,
}

impl CommentIndex {
    pub fn new() -> Self {
        CommentIndex::default()
    }

    /// Tokenize `source` once and collect every line and block comment.
    ///
    /// String and character literals are skipped so that `//` inside a
    /// string is not mistaken for a comment. Unterminated block comments run
    /// to the end of the file.
    pub fn scan(source: &str) -> Self {
        let mut scanner = Scanner::new(source);
        let mut comments = Vec::new();

        while let Some(ch) = scanner.peek() {
            match ch {
                '/' if scanner.peek_second() == Some('/') => {
                    comments.push(scanner.scan_line_comment());
                }
                '/' if scanner.peek_second() == Some('*') => {
                    comments.push(scanner.scan_block_comment());
                }
                '"' | '\'' => scanner.skip_string(ch),
                _ => {
                    scanner.bump();
                }
            }
        }

        CommentIndex { comments }
    }

    pub fn len(&self) -> usize {
        self.comments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.comments.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&CommentToken> {
        self.comments.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CommentToken> {
        self.comments.iter()
    }
}

struct Scanner<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
    lookahead: Option<char>,
    line: u32,
    column: u32,
}

impl<'a> Scanner<'a> {
    fn new(source: &'a str) -> Self {
        Scanner {
            chars: source.chars().peekable(),
            lookahead: None,
            line: 1,
            column: 1,
        }
    }

    fn peek(&mut self) -> Option<char> {
        if let Some(ch) = self.lookahead {
            return Some(ch);
        }
        self.chars.peek().copied()
    }

    fn peek_second(&mut self) -> Option<char> {
        if self.lookahead.is_none() {
            self.lookahead = self.chars.next();
        }
        self.chars.peek().copied()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = match self.lookahead.take() {
            Some(ch) => Some(ch),
            None => self.chars.next(),
        }?;
        match ch {
            '\n' => {
                self.line += 1;
                self.column = 1;
            }
            // CRLF: the '\n' that follows does the line bookkeeping
            '\r' => {}
            _ => self.column += 1,
        }
        Some(ch)
    }

    fn scan_line_comment(&mut self) -> CommentToken {
        let (line, column) = (self.line, self.column);
        let mut text = String::new();
        while let Some(ch) = self.peek() {
            if ch == '\n' {
                break;
            }
            self.bump();
            if ch != '\r' {
                text.push(ch);
            }
        }
        CommentToken {
            text,
            kind: CommentKind::Line,
            span: SourceSpan::new(line, column, self.line, self.column),
        }
    }

    fn scan_block_comment(&mut self) -> CommentToken {
        let (line, column) = (self.line, self.column);
        let mut text = String::new();
        // Opening delimiter
        for _ in 0..2 {
            if let Some(ch) = self.bump() {
                text.push(ch);
            }
        }
        while let Some(ch) = self.bump() {
            if ch != '\r' {
                text.push(ch);
            }
            if ch == '*' && self.peek() == Some('/') {
                self.bump();
                text.push('/');
                break;
            }
        }
        CommentToken {
            text,
            kind: CommentKind::Block,
            span: SourceSpan::new(line, column, self.line, self.column),
        }
    }

    fn skip_string(&mut self, quote: char) {
        self.bump();
        while let Some(ch) = self.peek() {
            match ch {
                '\\' => {
                    self.bump();
                    self.bump();
                }
                '\n' => return,
                _ if ch == quote => {
                    self.bump();
                    return;
                }
                _ => {
                    self.bump();
                }
            }
        }
    }
}

/// Re-indent the continuation lines of a block comment.
///
/// The first line is written at the current output position; following
/// lines are stripped of their original indentation and prefixed with
/// `indent`, keeping a single space before a leading `*`.
pub fn format_block_comment(text: &str, indent: &str) -> String {
    let lines: Vec<&str> = text.lines().collect();
    if lines.len() <= 1 {
        return text.to_string();
    }

    let mut result = String::new();
    for (i, line) in lines.iter().enumerate() {
        if i == 0 {
            result.push_str(line.trim_end());
            continue;
        }
        result.push('\n');
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        result.push_str(indent);
        if trimmed.starts_with('*') {
            result.push(' ');
        }
        result.push_str(trimmed);
    }
    result
}
