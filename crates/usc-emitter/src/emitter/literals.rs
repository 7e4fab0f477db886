use super::Printer;
use std::fmt::Write as _;
use usc_ast::well_known;
use usc_ast::{Literal, TypeId};

impl<'a> Printer<'a> {
    /// Write a literal with the suffix its static type needs (`10L`, `1.5f`).
    pub(super) fn emit_literal(&mut self, literal: &Literal, ty: TypeId) {
        match literal {
            Literal::Int(value) => {
                let suffix = match ty {
                    well_known::LONG => "L",
                    well_known::UINT => "U",
                    well_known::ULONG => "UL",
                    well_known::FLOAT => "f",
                    well_known::DOUBLE => "d",
                    well_known::DECIMAL => "m",
                    _ => "",
                };
                self.write(&format!("{value}{suffix}"));
            }
            Literal::Float(value) => {
                let text = match ty {
                    well_known::FLOAT if value.is_finite() => format!("{}f", format_float(*value)),
                    well_known::DECIMAL if value.is_finite() => format!("{}m", format_float(*value)),
                    _ => format_float(*value),
                };
                self.write(&text);
            }
            Literal::Bool(value) => self.write(if *value { "true" } else { "false" }),
            Literal::String(value) => self.write(&escape_string(value)),
            Literal::Char(value) => self.write(&escape_char(*value)),
            Literal::Null => self.write("null"),
        }
    }
}

/// C# spelling of a double: always with a decimal point or exponent.
pub fn format_float(value: f64) -> String {
    if value.is_nan() {
        return "double.NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 {
            "double.PositiveInfinity".to_string()
        } else {
            "double.NegativeInfinity".to_string()
        };
    }
    let text = format!("{value:?}");
    if text.contains(['.', 'e', 'E']) {
        text
    } else {
        format!("{text}.0")
    }
}

/// Double-quoted C# string literal.
pub fn escape_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for ch in value.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            other => push_escaped(&mut out, other),
        }
    }
    out.push('"');
    out
}

/// Single-quoted C# character literal.
pub fn escape_char(value: char) -> String {
    let mut out = String::with_capacity(4);
    out.push('\'');
    match value {
        '\'' => out.push_str("\\'"),
        other => push_escaped(&mut out, other),
    }
    out.push('\'');
    out
}

fn push_escaped(out: &mut String, ch: char) {
    match ch {
        '\\' => out.push_str("\\\\"),
        '\n' => out.push_str("\\n"),
        '\r' => out.push_str("\\r"),
        '\t' => out.push_str("\\t"),
        '\0' => out.push_str("\\0"),
        c if c.is_control() => {
            let _ = write!(out, "\\u{:04x}", c as u32);
        }
        c => out.push(c),
    }
}
