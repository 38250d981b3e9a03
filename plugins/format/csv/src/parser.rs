use crate::serializer::FIELD_SEPARATOR;

// ═══════════════════════════════════════════════════════════════
//  RFC 4180 reader
// ═══════════════════════════════════════════════════════════════

/// Splits one RFC 4180 record into fields, honouring quoting.
///
/// `""` inside a quoted field reads back as `"`. Characters after a closing
/// quote and before the next separator are dropped (best effort). Only the
/// first logical record is returned; use [`CsvTable::parse`] for more.
pub fn parse_fields(line: &str) -> Vec<String> {
    parse_records(line).into_iter().next().unwrap_or_default()
}

/// Header and data rows of a parsed CSV artifact.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CsvTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl CsvTable {
    /// Parse a whole artifact. Line terminators inside quoted cells belong to
    /// the cell.
    pub fn parse(text: &str) -> Self {
        let mut records = parse_records(text).into_iter();
        let headers = records.next().unwrap_or_default();
        Self { headers, rows: records.collect() }
    }

    /// Value of `column` in data row `row`.
    pub fn get(&self, row: usize, column: &str) -> Option<&str> {
        let idx = self.headers.iter().position(|h| h == column)?;
        self.rows.get(row)?.get(idx).map(String::as_str)
    }
}

fn parse_records(text: &str) -> Vec<Vec<String>> {
    let mut records = Vec::new();
    if text.is_empty() {
        return records;
    }

    let mut record = Vec::new();
    let mut field = String::new();
    let mut chars = text.chars().peekable();

    loop {
        if chars.peek() == Some(&'"') {
            chars.next(); // opening quote
            while let Some(c) = chars.next() {
                if c == '"' {
                    if chars.peek() == Some(&'"') {
                        chars.next();
                        field.push('"');
                    } else {
                        break;
                    }
                } else {
                    field.push(c);
                }
            }
            // skip anything up to the next separator or line end
            while let Some(&c) = chars.peek() {
                if c == FIELD_SEPARATOR || c == '\n' || c == '\r' {
                    break;
                }
                chars.next();
            }
        } else {
            while let Some(&c) = chars.peek() {
                if c == FIELD_SEPARATOR || c == '\n' || c == '\r' {
                    break;
                }
                field.push(c);
                chars.next();
            }
        }

        record.push(std::mem::take(&mut field));

        match chars.next() {
            Some(c) if c == FIELD_SEPARATOR => {}
            Some('\r') => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                records.push(std::mem::take(&mut record));
                if chars.peek().is_none() {
                    break;
                }
            }
            Some(_) => {
                // '\n'
                records.push(std::mem::take(&mut record));
                if chars.peek().is_none() {
                    break;
                }
            }
            None => {
                records.push(std::mem::take(&mut record));
                break;
            }
        }
    }

    records
}
