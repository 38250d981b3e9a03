use std::borrow::Cow;
use std::collections::HashMap;

use result_api::{FormatError, FormatOptions, MetaColumn, ResultSet, RowMeta, Value};
use tracing::debug;

use crate::aggregation::expand_rows;
use crate::header::Header;
use crate::serializer::DelimitedWriter;
use crate::stringify::{stringify, Cell, Flattening};

// ═══════════════════════════════════════════════════════════════
//  CsvResultCodec
// ═══════════════════════════════════════════════════════════════

/// Renders a [`ResultSet`] as CSV text.
///
/// Stateless apart from its options: one codec can serve any number of
/// result sets, from any number of threads.
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvResultCodec {
    options: FormatOptions,
}

impl CsvResultCodec {
    pub fn new(options: FormatOptions) -> Self {
        Self { options }
    }

    /// Header line followed by one line per row.
    ///
    /// The header is derived from all rows before the first row is encoded,
    /// since a row only knows which columns it lacks once the full column
    /// list exists. Without rows, the declared columns name the header.
    pub fn encode(&self, result: &ResultSet) -> Result<String, FormatError> {
        let flattening = Flattening::from_options(&self.options);

        let rows = expand_rows(result.rows.iter().map(|r| &r.columns), &result.metrics);
        let seed = if rows.is_empty() { declared_columns(result) } else { Vec::new() };
        let header = Header::seeded(&seed, &rows, flattening, &self.options);
        if header.is_empty() {
            return Err(FormatError::logic(
                "CSV: result set has no columns (no data columns and no metadata columns enabled)",
            ));
        }

        let meta_columns = self.options.meta_columns();
        let mut writer = DelimitedWriter::new();
        writer.write_header(header.iter());

        let mut cells: Vec<Cell> = Vec::with_capacity(header.len());
        for (columns, row) in rows.iter().zip(&result.rows) {
            let by_name: HashMap<Cow<'_, str>, &Value> = flattening
                .column_view(columns)
                .into_iter()
                .rev() // first occurrence wins
                .collect();

            cells.clear();
            for name in header.data_names() {
                cells.push(by_name.get(name.as_str()).map(|v| stringify(v)).unwrap_or_default());
            }
            for meta in &meta_columns {
                cells.push(meta_cell(&row.meta, *meta));
            }
            writer.write_record(&cells);
        }

        debug!(columns = header.len(), lines = writer.lines(), "encoded CSV");
        Ok(writer.finish())
    }
}

/// Encode `result` with `options` in one call.
pub fn to_csv(result: &ResultSet, options: &FormatOptions) -> Result<String, FormatError> {
    CsvResultCodec::new(*options).encode(result)
}

/// Declared columns with multi-value metrics spelled out as `M.subkey`.
fn declared_columns(result: &ResultSet) -> Vec<String> {
    let mut names = Vec::with_capacity(result.columns.len());
    for column in &result.columns {
        match result.metric(column) {
            Some(spec) => {
                names.extend(spec.shape.sub_keys().into_iter().map(|k| format!("{column}.{k}")));
            }
            None => names.push(column.clone()),
        }
    }
    names
}

fn meta_cell(meta: &RowMeta, column: MetaColumn) -> Cell {
    let value = match column {
        MetaColumn::Score => meta.score.as_deref(),
        MetaColumn::Type => meta.doc_type.as_deref(),
        MetaColumn::Id => meta.id.as_deref(),
    };
    value.map(Cell::plain).unwrap_or_default()
}
