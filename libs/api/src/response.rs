//! Builds a [`ResultSet`] from a document store search response.
//!
//! Two response kinds are recognized:
//! - aggregation responses (`aggregations` present and non-empty) — bucket
//!   aggregations become rows, metric aggregations become columns;
//! - plain searches — each entry of `hits.hits` becomes one row.

use serde_json::{Map, Value as Json};
use tracing::{debug, warn};

use crate::error::FormatError;
use crate::metric::{MetricShape, MetricSpec};
use crate::record::{ResultSet, Row, RowMeta};
use crate::util::{format_float, format_number, root_segment};
use crate::value::{Fields, Value};

/// Convert a parsed search response into rows.
///
/// `projection` is the query's select list. It only affects hit responses:
/// columns are ordered by it, unmatched columns follow in source order.
pub fn result_set_from_json(json: &Json, projection: &[String]) -> Result<ResultSet, FormatError> {
    let root = json
        .as_object()
        .ok_or_else(|| FormatError::format_err("search response: expected a JSON object"))?;

    if let Some(aggs) = root.get("aggregations").and_then(Json::as_object) {
        if !aggs.is_empty() {
            let result = AggregationWalker::default().walk(aggs);
            debug!(rows = result.len(), metrics = result.metrics.len(), "aggregation response");
            return Ok(result);
        }
    }

    let columns: Vec<String> = projection.iter().filter(|f| f.as_str() != "*").cloned().collect();
    let Some(hits) = root.get("hits") else {
        return Ok(ResultSet::default().with_columns(columns));
    };
    let hits = hits
        .get("hits")
        .and_then(Json::as_array)
        .ok_or_else(|| FormatError::format_err("search response: hits.hits is not an array"))?;

    let rows = hits
        .iter()
        .map(|hit| hit_to_row(hit, projection))
        .collect::<Result<Vec<_>, _>>()?;
    debug!(rows = rows.len(), "search response");
    Ok(ResultSet::new(rows).with_columns(columns))
}

// ═══════════════════════════════════════════════════════════════
//  Hits
// ═══════════════════════════════════════════════════════════════

fn hit_to_row(hit: &Json, projection: &[String]) -> Result<Row, FormatError> {
    let hit = hit
        .as_object()
        .ok_or_else(|| FormatError::format_err("search hit: expected a JSON object"))?;

    let meta = RowMeta {
        id: hit.get("_id").and_then(scalar_text),
        doc_type: hit.get("_type").and_then(scalar_text),
        score: hit.get("_score").and_then(Json::as_f64).map(format_float),
    };

    let mut columns = Fields::new();
    match hit.get("_source") {
        None | Some(Json::Null) => {}
        Some(Json::Object(source)) => {
            for (name, value) in source {
                columns.push(name.as_str(), Value::from(value));
            }
        }
        Some(_) => {
            return Err(FormatError::format_err(format!(
                "search hit {}: _source is not an object",
                meta.id.as_deref().unwrap_or("<no id>")
            )));
        }
    }

    // Script and docvalue fields come back as arrays, usually of one element.
    if let Some(fields) = hit.get("fields").and_then(Json::as_object) {
        for (name, value) in fields {
            let value = match value {
                Json::Array(items) if items.len() == 1 => Value::from(&items[0]),
                other => Value::from(other),
            };
            columns.push(name.as_str(), value);
        }
    }

    Ok(Row::with_meta(order_by_projection(columns, projection), meta))
}

fn order_by_projection(columns: Fields, projection: &[String]) -> Fields {
    if projection.is_empty() {
        return columns;
    }

    let mut remaining: Vec<(String, Value)> = columns.into_iter().collect();
    let mut ordered = Fields::with_capacity(remaining.len());
    for field in projection.iter().filter(|f| f.as_str() != "*") {
        let pos = remaining
            .iter()
            .position(|(name, _)| name == field)
            .or_else(|| {
                let root = root_segment(field);
                remaining.iter().position(|(name, _)| name == root)
            });
        if let Some(pos) = pos {
            let (name, value) = remaining.remove(pos);
            ordered.push(name, value);
        }
    }
    for (name, value) in remaining {
        ordered.push(name, value);
    }
    ordered
}

fn scalar_text(v: &Json) -> Option<String> {
    match v {
        Json::String(s) => Some(s.clone()),
        Json::Number(n) => Some(format_number(n)),
        _ => None,
    }
}

// ═══════════════════════════════════════════════════════════════
//  Aggregations
// ═══════════════════════════════════════════════════════════════

enum Agg<'a> {
    /// Multi-bucket aggregation: `(bucket key, bucket object)` pairs.
    Buckets(Vec<(Value, &'a Map<String, Json>)>),
    /// Filter/nested style aggregation: one implicit bucket, no key column.
    SingleBucket(&'a Map<String, Json>),
    Metric(Value, Option<MetricShape>),
    Unknown,
}

#[derive(Default)]
struct AggregationWalker {
    rows: Vec<Row>,
    metrics: Vec<MetricSpec>,
    /// Every aggregation name reached, in walk order.
    columns: Vec<String>,
}

type BucketAgg<'a> = (&'a str, Vec<(Value, &'a Map<String, Json>)>);

impl AggregationWalker {
    fn walk(mut self, aggs: &Map<String, Json>) -> ResultSet {
        self.collect(aggs.iter(), &Fields::new());
        ResultSet::with_metrics(self.rows, self.metrics).with_columns(self.columns)
    }

    /// Emit rows for one aggregation level. `prefix` carries the bucket keys
    /// of the enclosing levels.
    fn collect<'a>(&mut self, aggs: impl Iterator<Item = (&'a String, &'a Json)>, prefix: &Fields) {
        let mut row = prefix.clone();
        let mut bucket_aggs = Vec::new();
        self.collect_level(aggs, &mut row, &mut bucket_aggs);

        if bucket_aggs.is_empty() {
            self.rows.push(Row::new(row));
            return;
        }

        for (name, buckets) in bucket_aggs {
            for (key, bucket) in buckets {
                let mut bucket_prefix = row.clone();
                bucket_prefix.push(name, key);
                self.collect(sub_aggregations(bucket), &bucket_prefix);
            }
        }
    }

    /// Metric aggregations of one level go into `row`; bucket aggregations are
    /// returned through `bucket_aggs` for the caller to fan out.
    fn collect_level<'a>(
        &mut self,
        aggs: impl Iterator<Item = (&'a String, &'a Json)>,
        row: &mut Fields,
        bucket_aggs: &mut Vec<BucketAgg<'a>>,
    ) {
        for (name, agg) in aggs {
            let classified = classify(agg);
            if !matches!(classified, Agg::SingleBucket(_)) && !self.columns.contains(name) {
                self.columns.push(name.clone());
            }
            match classified {
                Agg::Buckets(buckets) => bucket_aggs.push((name.as_str(), buckets)),
                Agg::SingleBucket(inner) => {
                    self.collect_level(sub_aggregations(inner), row, bucket_aggs);
                }
                Agg::Metric(value, shape) => {
                    if let Some(shape) = shape {
                        self.register(name, shape);
                    }
                    row.push(name.as_str(), value);
                }
                Agg::Unknown => {
                    warn!(aggregation = %name, "unrecognized aggregation shape, passing through");
                    row.push(name.as_str(), Value::from(agg));
                }
            }
        }
    }

    fn register(&mut self, name: &str, shape: MetricShape) {
        if self.metrics.iter().all(|m| m.column() != name) {
            self.metrics.push(MetricSpec::new(name, shape));
        }
    }
}

/// Entries of a bucket that are themselves aggregations. Composite
/// aggregations put an object under `key`, which is not one.
fn sub_aggregations(bucket: &Map<String, Json>) -> impl Iterator<Item = (&String, &Json)> {
    bucket.iter().filter(|(k, v)| v.is_object() && k.as_str() != "key")
}

fn classify(agg: &Json) -> Agg<'_> {
    let Some(obj) = agg.as_object() else {
        return Agg::Unknown;
    };

    if let Some(buckets) = obj.get("buckets") {
        return match buckets {
            Json::Array(items) => Agg::Buckets(
                items
                    .iter()
                    .filter_map(Json::as_object)
                    .map(|b| (bucket_key(b), b))
                    .collect(),
            ),
            Json::Object(keyed) => Agg::Buckets(
                keyed
                    .iter()
                    .filter_map(|(k, b)| b.as_object().map(|b| (Value::text(k.as_str()), b)))
                    .collect(),
            ),
            _ => Agg::Unknown,
        };
    }

    if let Some(values) = obj.get("values") {
        return percentiles(values).unwrap_or(Agg::Unknown);
    }

    if let Some(value) = obj.get("value") {
        return Agg::Metric(metric_value(value), None);
    }

    if ["count", "sum", "avg", "min", "max"].iter().all(|k| obj.contains_key(*k)) {
        return stats(obj);
    }

    if obj.contains_key("doc_count") {
        return Agg::SingleBucket(obj);
    }

    Agg::Unknown
}

fn bucket_key(bucket: &Map<String, Json>) -> Value {
    match bucket.get("key_as_string").or_else(|| bucket.get("key")) {
        Some(Json::String(s)) => Value::text(s.as_str()),
        Some(Json::Number(n)) => Value::Scalar(format_number(n)),
        Some(other) => Value::from(other),
        None => Value::Null,
    }
}

/// Single-value metrics always carry floating semantics: a count of 2 reads `2.0`.
fn metric_value(v: &Json) -> Value {
    match v {
        Json::Number(n) => n.as_f64().map(Value::float).unwrap_or_else(|| Value::from(v)),
        other => Value::from(other),
    }
}

fn stats(obj: &Map<String, Json>) -> Agg<'_> {
    let mut fields = Fields::with_capacity(8);
    fields.push("count", obj.get("count").map(Value::from).unwrap_or_default());
    for key in ["sum", "avg", "min", "max"] {
        fields.push(key, obj.get(key).map(metric_value).unwrap_or_default());
    }

    let shape = if obj.contains_key("sum_of_squares") {
        for (source, target) in [
            ("sum_of_squares", "sumOfSquares"),
            ("variance", "variance"),
            ("std_deviation", "stdDeviation"),
        ] {
            fields.push(target, obj.get(source).map(metric_value).unwrap_or_default());
        }
        MetricShape::ExtendedStats
    } else {
        MetricShape::Stats
    };

    Agg::Metric(Value::Object(fields), Some(shape))
}

fn percentiles(values: &Json) -> Option<Agg<'static>> {
    let mut ranked: Vec<(f64, Value)> = match values {
        // keyed: {"1.0": 20.0, "5.0": 21.0, "1.0_as_string": "..."}
        Json::Object(map) => map
            .iter()
            .filter_map(|(k, v)| k.parse::<f64>().ok().map(|rank| (rank, metric_value(v))))
            .collect(),
        // non-keyed: [{"key": 1.0, "value": 20.0}]
        Json::Array(items) => items
            .iter()
            .filter_map(|item| {
                let rank = item.get("key")?.as_f64()?;
                Some((rank, item.get("value").map(metric_value).unwrap_or_default()))
            })
            .collect(),
        _ => return None,
    };
    ranked.sort_by(|a, b| a.0.total_cmp(&b.0));

    let ranks: Vec<f64> = ranked.iter().map(|(rank, _)| *rank).collect();
    let fields: Fields = ranked
        .into_iter()
        .map(|(rank, value)| (format_float(rank), value))
        .collect();
    Some(Agg::Metric(Value::Object(fields), Some(MetricShape::Percentiles(ranks))))
}
