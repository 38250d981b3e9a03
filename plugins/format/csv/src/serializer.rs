use crate::stringify::Cell;

/// Field separator. Not configurable.
pub const FIELD_SEPARATOR: char = ',';

/// Line separator between the header and data lines. No trailing terminator.
pub const LINE_TERMINATOR: &str = "\n";

const QUOTE: char = '"';

// ═══════════════════════════════════════════════════════════════
//  Escaping
// ═══════════════════════════════════════════════════════════════

/// Whether plain text must be quoted to survive RFC 4180 parsing.
pub fn needs_quoting(text: &str) -> bool {
    text.contains([FIELD_SEPARATOR, QUOTE, '\n', '\r'])
}

/// Append `text` to `out`, quoting when needed or when `force` is set.
/// Inside quotes every `"` is doubled; nothing else is escaped.
pub fn escape_into(out: &mut String, text: &str, force: bool) {
    if force || needs_quoting(text) {
        out.push(QUOTE);
        for c in text.chars() {
            if c == QUOTE {
                out.push(QUOTE);
            }
            out.push(c);
        }
        out.push(QUOTE);
    } else {
        out.push_str(text);
    }
}

// ═══════════════════════════════════════════════════════════════
//  DelimitedWriter
// ═══════════════════════════════════════════════════════════════

/// Accumulates delimited lines into one text blob.
#[derive(Debug, Default)]
pub struct DelimitedWriter {
    out: String,
    lines: usize,
}

impl DelimitedWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write the header line. Names follow the plain-text quoting rule.
    pub fn write_header<'a>(&mut self, names: impl IntoIterator<Item = &'a str>) {
        self.start_line();
        for (i, name) in names.into_iter().enumerate() {
            if i > 0 {
                self.out.push(FIELD_SEPARATOR);
            }
            escape_into(&mut self.out, name, false);
        }
    }

    /// Write one data line. Structured cells are always quoted.
    ///
    /// A record made of a single empty cell is written as `""`: a bare empty
    /// line reads back as no record at all.
    pub fn write_record<'a>(&mut self, cells: impl IntoIterator<Item = &'a Cell>) {
        self.start_line();
        let start = self.out.len();
        let mut count = 0;
        for cell in cells {
            if count > 0 {
                self.out.push(FIELD_SEPARATOR);
            }
            escape_into(&mut self.out, &cell.text, cell.structured);
            count += 1;
        }
        if count == 1 && self.out.len() == start {
            self.out.push_str("\"\"");
        }
    }

    pub fn lines(&self) -> usize {
        self.lines
    }

    pub fn finish(self) -> String {
        self.out
    }

    fn start_line(&mut self) {
        if self.lines > 0 {
            self.out.push_str(LINE_TERMINATOR);
        }
        self.lines += 1;
    }
}
