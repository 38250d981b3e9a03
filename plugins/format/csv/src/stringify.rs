use std::borrow::Cow;
use std::collections::HashSet;

use result_api::{Fields, FormatOptions, Value};

// ═══════════════════════════════════════════════════════════════
//  Flattening policy
// ═══════════════════════════════════════════════════════════════

/// How nested objects map onto columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Flattening {
    /// Objects stay in one cell as `{key=value, ...}`.
    #[default]
    Nested,
    /// One level of object fields becomes `parent.child` columns.
    Flat,
}

impl Flattening {
    pub fn from_options(options: &FormatOptions) -> Self {
        if options.flat { Flattening::Flat } else { Flattening::Nested }
    }

    /// Columns of one row as seen by the header and the cell lookup.
    ///
    /// Flat mode expands exactly one level: `name = {firstname, lastname}`
    /// yields `name.firstname`, `name.lastname`. Anything deeper stays inside
    /// those cells. An empty object keeps its own column.
    pub fn column_view<'a>(&self, columns: &'a Fields) -> Vec<(Cow<'a, str>, &'a Value)> {
        let mut view = Vec::with_capacity(columns.len());
        for (name, value) in columns.iter() {
            match (self, value) {
                (Flattening::Flat, Value::Object(sub)) if !sub.is_empty() => {
                    for (child, child_value) in sub.iter() {
                        view.push((Cow::Owned(format!("{name}.{child}")), child_value));
                    }
                }
                _ => view.push((Cow::Borrowed(name), value)),
            }
        }
        view
    }

    /// Columns that hold a non-empty object in at least one row. In flat
    /// mode such a column is represented by its dotted children only, so a
    /// `Null` under the same name in another row adds no column of its own.
    /// Always empty in nested mode.
    pub fn object_parents<'a>(&self, rows: &[&'a Fields]) -> HashSet<&'a str> {
        match self {
            Flattening::Nested => HashSet::new(),
            Flattening::Flat => rows
                .iter()
                .copied()
                .flat_map(Fields::iter)
                .filter(|(_, value)| value.as_object().is_some_and(|sub| !sub.is_empty()))
                .map(|(name, _)| name)
                .collect(),
        }
    }
}

// ═══════════════════════════════════════════════════════════════
//  Cell stringifier
// ═══════════════════════════════════════════════════════════════

/// Text of one cell before delimiting.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Cell {
    pub text: String,
    /// Rendered from a sequence or object; always quoted on output.
    pub structured: bool,
}

impl Cell {
    pub fn plain(text: impl Into<String>) -> Self {
        Self { text: text.into(), structured: false }
    }

    pub fn empty() -> Self {
        Self::default()
    }
}

/// Canonical text of a value.
///
/// - `Null` → empty
/// - `Scalar` → verbatim
/// - `Sequence` → `[a, b]`
/// - `Object` → `{k=v, k=v}`, keys in source order
pub fn stringify(value: &Value) -> Cell {
    let mut text = String::new();
    write_value(&mut text, value);
    Cell {
        text,
        structured: matches!(value, Value::Sequence(_) | Value::Object(_)),
    }
}

fn write_value(out: &mut String, value: &Value) {
    match value {
        Value::Null => {}
        Value::Scalar(s) => out.push_str(s),
        Value::Sequence(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_value(out, item);
            }
            out.push(']');
        }
        Value::Object(fields) => {
            out.push('{');
            for (i, (name, item)) in fields.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                out.push_str(name);
                out.push('=');
                write_value(out, item);
            }
            out.push('}');
        }
    }
}
