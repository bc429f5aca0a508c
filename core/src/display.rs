//! Human readable rendering of mappings and values.
//!
//! The block form is a debugging aid. It is deterministic but is not
//! meant to be parsed back.

use std::fmt::{self, Write};

use crate::attrdict::{AttrDict, MissingKey};
use crate::value::Value;

const INDENT_STEP: usize = 2;

impl AttrDict {
    /// Render as an indented, brace-delimited block, one entry per line.
    ///
    /// ```text
    /// AttrDict{
    ///   a: 1,
    ///   c: {
    ///     d: 3,
    ///   },
    ///   k: {},
    /// }
    /// ```
    pub fn to_display_string(&self) -> String {
        let mut out = String::new();
        out.push_str(match self.mode() {
            MissingKey::Strict => "AttrDict{\n",
            MissingKey::Default => "DefAttrDict{\n",
        });
        write_block(&mut out, self, INDENT_STEP);
        out.push('}');
        out
    }
}

fn write_block(out: &mut String, dict: &AttrDict, indent: usize) {
    for (key, value) in dict {
        push_indent(out, indent);
        out.push_str(key);
        out.push_str(": ");
        match value {
            Value::Map(child) if child.is_empty() => out.push_str("{},"),
            Value::Map(child) => {
                out.push_str("{\n");
                write_block(out, child, indent + INDENT_STEP);
                push_indent(out, indent);
                out.push_str("},");
            }
            other => {
                write_inline(out, other, false);
                out.push(',');
            }
        }
        out.push('\n');
    }
}

fn push_indent(out: &mut String, indent: usize) {
    out.extend(std::iter::repeat_n(' ', indent));
}

/// Single-line form. Strings are quoted only inside containers.
fn write_inline(out: &mut String, value: &Value, quoted: bool) {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(b) => {
            let _ = write!(out, "{b}");
        }
        Value::Int(i) => {
            let _ = write!(out, "{i}");
        }
        Value::Float(f) => {
            let _ = write!(out, "{f:?}");
        }
        Value::Str(s) if quoted => {
            let _ = write!(out, "{s:?}");
        }
        Value::Str(s) => out.push_str(s),
        Value::Seq(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_inline(out, item, true);
            }
            out.push(']');
        }
        Value::Map(dict) => {
            out.push('{');
            for (i, (key, item)) in dict.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                out.push_str(key);
                out.push_str(": ");
                write_inline(out, item, true);
            }
            out.push('}');
        }
        Value::Array(array) => write_inline(out, &array.to_nested(), quoted),
        Value::Opaque(name) => {
            let _ = write!(out, "<{name}>");
        }
    }
}

impl fmt::Display for AttrDict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_display_string())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        write_inline(&mut out, self, false);
        f.write_str(&out)
    }
}
