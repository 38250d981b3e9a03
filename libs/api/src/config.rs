use serde::Deserialize;

/// Synthetic per-document column appended after the data columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetaColumn {
    Score,
    Type,
    Id,
}

impl MetaColumn {
    pub fn name(&self) -> &'static str {
        match self {
            MetaColumn::Score => "_score",
            MetaColumn::Type => "_type",
            MetaColumn::Id => "_id",
        }
    }
}

impl std::fmt::Display for MetaColumn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Per-request formatting switches.
///
/// Immutable once built; passed explicitly to every stage that needs it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct FormatOptions {
    /// Expand one level of nested objects into `parent.child` columns.
    pub flat: bool,
    pub include_score: bool,
    pub include_type: bool,
    pub include_id: bool,
}

impl FormatOptions {
    pub fn flat() -> Self {
        Self { flat: true, ..Self::default() }
    }

    /// Enabled metadata columns, always in the order `_score, _type, _id`.
    pub fn meta_columns(&self) -> Vec<MetaColumn> {
        let mut cols = Vec::with_capacity(3);
        if self.include_score {
            cols.push(MetaColumn::Score);
        }
        if self.include_type {
            cols.push(MetaColumn::Type);
        }
        if self.include_id {
            cols.push(MetaColumn::Id);
        }
        cols
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn meta_columns_fixed_order() {
        let opts = FormatOptions {
            include_id: true,
            include_type: true,
            include_score: true,
            ..FormatOptions::default()
        };
        let names: Vec<_> = opts.meta_columns().iter().map(MetaColumn::name).collect();
        assert_eq!(names, vec!["_score", "_type", "_id"]);
    }

    #[test]
    fn deserialize_partial() {
        let opts: FormatOptions = serde_json::from_str(r#"{"flat": true, "include_id": true}"#).unwrap();
        assert!(opts.flat);
        assert!(opts.include_id);
        assert!(!opts.include_score);
    }
}
