use std::collections::HashSet;

use result_api::{Fields, FormatOptions, MetaColumn};
use tracing::debug;

use crate::stringify::Flattening;

// ═══════════════════════════════════════════════════════════════
//  Header
// ═══════════════════════════════════════════════════════════════

/// Ordered, de-duplicated column list shared by every row of a result set.
///
/// Data columns appear in first-seen order across rows (never sorted);
/// enabled metadata columns follow in the order `_score, _type, _id`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Header {
    names: Vec<String>,
    data_len: usize,
}

impl Header {
    /// Stable union of the column views of `rows`.
    ///
    /// When rows disagree on column order, the first row to mention a
    /// column decides its position.
    pub fn derive<'a>(
        rows: impl IntoIterator<Item = &'a Fields>,
        flattening: Flattening,
        options: &FormatOptions,
    ) -> Self {
        Self::seeded(&[], rows, flattening, options)
    }

    /// Like [`Header::derive`], with `seed` placed ahead of every column the
    /// rows contribute.
    pub fn seeded<'a>(
        seed: &[String],
        rows: impl IntoIterator<Item = &'a Fields>,
        flattening: Flattening,
        options: &FormatOptions,
    ) -> Self {
        let meta = options.meta_columns();
        let reserved: HashSet<&str> = meta.iter().map(MetaColumn::name).collect();

        let rows: Vec<&Fields> = rows.into_iter().collect();
        let parents = flattening.object_parents(&rows);

        let mut seen: HashSet<String> = HashSet::new();
        let mut names = Vec::new();
        let mut add = |name: &str| {
            if !reserved.contains(name) && seen.insert(name.to_string()) {
                names.push(name.to_string());
            }
        };

        for name in seed {
            add(name);
        }
        for row in &rows {
            for (name, value) in flattening.column_view(row) {
                if value.is_null() && parents.contains(name.as_ref()) {
                    continue;
                }
                add(&name);
            }
        }

        let data_len = names.len();
        names.extend(meta.iter().map(|m| m.name().to_string()));
        debug!(data_columns = data_len, meta_columns = meta.len(), "derived header");
        Self { names, data_len }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Data columns only, without the trailing metadata columns.
    pub fn data_names(&self) -> &[String] {
        &self.names[..self.data_len]
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use result_api::Value;

    fn row(names: &[&str]) -> Fields {
        names.iter().map(|n| (n.to_string(), Value::text("x"))).collect()
    }

    #[test]
    fn first_seen_order_is_kept() {
        let rows = [row(&["age", "firstname"]), row(&["address", "age", "gender"]), row(&["email"])];
        let header = Header::derive(&rows, Flattening::Nested, &FormatOptions::default());
        assert_eq!(header.names(), ["age", "firstname", "address", "gender", "email"]);
    }

    #[test]
    fn not_sorted() {
        let rows = [row(&["email", "firstname", "age", "gender", "address"])];
        let header = Header::derive(&rows, Flattening::Nested, &FormatOptions::default());
        assert_eq!(header.names(), ["email", "firstname", "age", "gender", "address"]);
    }

    #[test]
    fn metadata_columns_trail_in_fixed_order() {
        let rows = [row(&["age", "firstname"])];
        let options = FormatOptions { include_id: true, include_score: true, include_type: true, flat: false };
        let header = Header::derive(&rows, Flattening::Nested, &options);
        assert_eq!(header.names(), ["age", "firstname", "_score", "_type", "_id"]);
        assert_eq!(header.data_names(), ["age", "firstname"]);
    }

    #[test]
    fn data_column_named_like_metadata_is_listed_once() {
        let rows = [row(&["_id", "age"])];
        let options = FormatOptions { include_id: true, ..FormatOptions::default() };
        let header = Header::derive(&rows, Flattening::Nested, &options);
        assert_eq!(header.names(), ["age", "_id"]);
    }

    #[test]
    fn flat_mode_uses_dotted_names() {
        let name = Value::Object(Fields::new().with("firstname", "Jaime"));
        let rows = [Fields::new().with("name", name).with("house", "Lannister")];
        let header = Header::derive(&rows, Flattening::Flat, &FormatOptions::default());
        assert_eq!(header.names(), ["name.firstname", "house"]);
    }

    #[test]
    fn flat_mode_null_parent_adds_no_column() {
        let name = Value::Object(Fields::new().with("firstname", "Jaime"));
        let rows = [
            Fields::new().with("name", name).with("house", "Lannister"),
            Fields::new().with("name", Value::Null).with("house", "Stark"),
        ];
        let header = Header::derive(&rows, Flattening::Flat, &FormatOptions::default());
        assert_eq!(header.names(), ["name.firstname", "house"]);

        let nested = Header::derive(&rows, Flattening::Nested, &FormatOptions::default());
        assert_eq!(nested.names(), ["name", "house"]);
    }

    #[test]
    fn null_only_column_survives_flat_mode() {
        let rows = [Fields::new().with("note", Value::Null)];
        let header = Header::derive(&rows, Flattening::Flat, &FormatOptions::default());
        assert_eq!(header.names(), ["note"]);
    }

    #[test]
    fn seed_comes_first_and_is_not_repeated() {
        let seed = vec!["age".to_string(), "firstname".to_string()];
        let rows = [row(&["email", "age"])];
        let options = FormatOptions { include_id: true, ..FormatOptions::default() };
        let header = Header::seeded(&seed, &rows, Flattening::Nested, &options);
        assert_eq!(header.names(), ["age", "firstname", "email", "_id"]);
    }

    #[test]
    fn empty_rows_give_only_metadata() {
        let rows: [Fields; 0] = [];
        let options = FormatOptions { include_type: true, ..FormatOptions::default() };
        let header = Header::derive(&rows, Flattening::Nested, &options);
        assert_eq!(header.names(), ["_type"]);
    }
}
