//! Indentation-aware text buffer for the printer.
//!
//! Indentation is written lazily: `write_line` only sets a pending flag and
//! the indent is emitted with the first text of the next line, so blank
//! lines never carry trailing whitespace and consecutive writes never
//! double-indent.

use crate::emit_context::NewLine;

pub struct SourceWriter {
    output: String,
    indent_level: u32,
    indent_unit: String,
    new_line: &'static str,
    pending_indent: bool,
    /// Line comments waiting for the end of the current line.
    pending_line_comments: Vec<String>,
}

impl SourceWriter {
    pub fn new(indent_size: u32, new_line: NewLine) -> Self {
        SourceWriter {
            output: String::with_capacity(4096),
            indent_level: 0,
            indent_unit: " ".repeat(indent_size as usize),
            new_line: new_line.as_str(),
            pending_indent: true,
            pending_line_comments: Vec::new(),
        }
    }

    pub fn write(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if self.pending_indent {
            for _ in 0..self.indent_level {
                self.output.push_str(&self.indent_unit);
            }
            self.pending_indent = false;
        }
        self.output.push_str(text);
    }

    pub fn write_char(&mut self, ch: char) {
        let mut buf = [0u8; 4];
        self.write(ch.encode_utf8(&mut buf));
    }

    pub fn write_space(&mut self) {
        self.write(" ");
    }

    /// End the current line, flushing deferred line comments first.
    pub fn write_line(&mut self) {
        for comment in std::mem::take(&mut self.pending_line_comments) {
            if !self.pending_indent {
                self.output.push(' ');
            }
            self.write(&comment);
        }
        self.output.push_str(self.new_line);
        self.pending_indent = true;
    }

    /// Start a new line unless already at the start of one.
    pub fn ensure_line_start(&mut self) {
        if !self.pending_indent || !self.pending_line_comments.is_empty() {
            self.write_line();
        }
    }

    /// Emit a `//` comment at the end of the current line.
    pub fn defer_line_comment(&mut self, text: &str) {
        self.pending_line_comments.push(text.to_string());
    }

    pub fn increase_indent(&mut self) {
        self.indent_level += 1;
    }

    pub fn decrease_indent(&mut self) {
        self.indent_level = self.indent_level.saturating_sub(1);
    }

    /// Indent string of the current level.
    pub fn current_indent(&self) -> String {
        self.indent_unit.repeat(self.indent_level as usize)
    }

    pub fn is_at_line_start(&self) -> bool {
        self.pending_indent
    }

    pub fn len(&self) -> usize {
        self.output.len()
    }

    pub fn is_empty(&self) -> bool {
        self.output.is_empty()
    }

    /// Finish the text. A pending line comment still gets its line ended.
    pub fn finish(mut self) -> String {
        if !self.pending_line_comments.is_empty() {
            self.write_line();
        }
        self.output
    }
}

#[cfg(test)]
#[path = "../tests/source_writer.rs"]
mod tests;
