use result_api::{Fields, MetricShape, MetricSpec, Value};
use tracing::debug;

// ═══════════════════════════════════════════════════════════════
//  Aggregation expansion
// ═══════════════════════════════════════════════════════════════

/// Rewrite every registered multi-value column of `columns` into its
/// `column.subKey` siblings, in place. Other columns keep their position.
pub fn expand_row(columns: &Fields, metrics: &[MetricSpec]) -> Fields {
    if metrics.is_empty() {
        return columns.clone();
    }

    let mut expanded = Fields::with_capacity(columns.len());
    for (name, value) in columns.iter() {
        let spec = metrics.iter().find(|m| m.column() == name);
        match (spec, value) {
            (Some(spec), Value::Object(sub)) => {
                for key in spec.shape.sub_keys() {
                    let sub_value = lookup_sub_key(&spec.shape, sub, &key).cloned().unwrap_or_default();
                    expanded.push(format!("{name}.{key}"), sub_value);
                }
            }
            (Some(_), _) => {
                debug!(column = name, "multi-value column without sub-structure, not expanded");
                expanded.push(name, value.clone());
            }
            (None, _) => expanded.push(name, value.clone()),
        }
    }
    expanded
}

/// [`expand_row`] over every row of a result set.
pub fn expand_rows<'a>(
    rows: impl IntoIterator<Item = &'a Fields>,
    metrics: &[MetricSpec],
) -> Vec<Fields> {
    rows.into_iter().map(|row| expand_row(row, metrics)).collect()
}

/// Percentile keys are matched by label first, then numerically so that a
/// source key `"10"` still fills the `10.0` column.
fn lookup_sub_key<'a>(shape: &MetricShape, sub: &'a Fields, key: &str) -> Option<&'a Value> {
    if let Some(v) = sub.get(key) {
        return Some(v);
    }
    let MetricShape::Percentiles(_) = shape else {
        return None;
    };
    let rank: f64 = key.parse().ok()?;
    sub.iter()
        .find(|(k, _)| k.parse::<f64>().is_ok_and(|r| r == rank))
        .map(|(_, v)| v)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats_value() -> Value {
        Value::Object(
            Fields::new()
                .with("count", "1000")
                .with("sum", "30171.0")
                .with("avg", "30.171")
                .with("min", "20.0")
                .with("max", "40.0"),
        )
    }

    #[test]
    fn stats_expand_in_canonical_order() {
        let row = Fields::new().with("gender", "m").with("STATS(age)", stats_value()).with("x", "1");
        let expanded = expand_row(&row, &[MetricSpec::stats("STATS(age)")]);
        assert_eq!(
            expanded.names().collect::<Vec<_>>(),
            vec![
                "gender",
                "STATS(age).count",
                "STATS(age).sum",
                "STATS(age).avg",
                "STATS(age).min",
                "STATS(age).max",
                "x"
            ]
        );
        assert_eq!(expanded.get("STATS(age).avg"), Some(&Value::text("30.171")));
    }

    #[test]
    fn alias_prefixes_sub_columns() {
        let spec = MetricSpec::stats("STATS(age)").with_alias("myAlias");
        let row = Fields::new().with("myAlias", stats_value());
        let expanded = expand_row(&row, &[spec]);
        assert_eq!(expanded.names().next(), Some("myAlias.count"));
    }

    #[test]
    fn missing_sub_key_is_null() {
        let row = Fields::new().with("s", Value::Object(Fields::new().with("count", "3")));
        let expanded = expand_row(&row, &[MetricSpec::stats("s")]);
        assert_eq!(expanded.len(), 5);
        assert!(expanded.get("s.max").unwrap().is_null());
    }

    #[test]
    fn percentile_keys_match_numerically() {
        let spec = MetricSpec::percentiles("p", Some(vec![10.0, 49.0]));
        let row = Fields::new().with(
            "p",
            Value::Object(Fields::new().with("10", "22.0").with("49.0", "30.0").with("99.0", "40.0")),
        );
        let expanded = expand_row(&row, &[spec]);
        assert_eq!(expanded.names().collect::<Vec<_>>(), vec!["p.10.0", "p.49.0"]);
        assert_eq!(expanded.get("p.10.0"), Some(&Value::text("22.0")));
    }

    #[test]
    fn scalar_in_registered_column_passes_through() {
        let row = Fields::new().with("s", "oops");
        let expanded = expand_row(&row, &[MetricSpec::stats("s")]);
        assert_eq!(expanded, row);
    }

    #[test]
    fn unregistered_object_passes_through() {
        let row = Fields::new().with("comment", Value::Object(Fields::new().with("likes", "10")));
        let expanded = expand_row(&row, &[MetricSpec::stats("other")]);
        assert_eq!(expanded, row);
    }
}
