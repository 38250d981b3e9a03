use crate::metric::MetricSpec;
use crate::value::Fields;

/// Per-document metadata supplied alongside a row by the query layer.
/// Already rendered to text (`_score` in canonical float form).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RowMeta {
    pub id: Option<String>,
    pub doc_type: Option<String>,
    pub score: Option<String>,
}

/// One result record: ordered data columns plus document metadata.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Row {
    pub columns: Fields,
    pub meta: RowMeta,
}

impl Row {
    pub fn new(columns: Fields) -> Self {
        Self { columns, meta: RowMeta::default() }
    }

    pub fn with_meta(columns: Fields, meta: RowMeta) -> Self {
        Self { columns, meta }
    }
}

/// Fully materialized result of one executed query.
///
/// Rows may be sparse (different column sets). `metrics` declares which
/// columns hold multi-value aggregation outputs and how they expand.
/// `columns` are the columns the query asked for; they name the header when
/// no row is there to supply it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResultSet {
    pub rows: Vec<Row>,
    pub metrics: Vec<MetricSpec>,
    pub columns: Vec<String>,
}

impl ResultSet {
    pub fn new(rows: Vec<Row>) -> Self {
        Self { rows, ..Self::default() }
    }

    pub fn with_metrics(rows: Vec<Row>, metrics: Vec<MetricSpec>) -> Self {
        Self { rows, metrics, columns: Vec::new() }
    }

    pub fn with_columns(mut self, columns: Vec<String>) -> Self {
        self.columns = columns;
        self
    }

    pub fn metric(&self, column: &str) -> Option<&MetricSpec> {
        self.metrics.iter().find(|m| m.column() == column)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
