use crate::util::format_float;

/// Percentile ranks requested when a query does not name any.
pub const DEFAULT_PERCENTS: [f64; 7] = [1.0, 5.0, 25.0, 50.0, 75.0, 95.0, 99.0];

const STATS_KEYS: [&str; 5] = ["count", "sum", "avg", "min", "max"];

const EXTENDED_STATS_KEYS: [&str; 8] = [
    "count",
    "sum",
    "avg",
    "min",
    "max",
    "sumOfSquares",
    "variance",
    "stdDeviation",
];

/// Shape of a multi-output metric. Determines its sub-columns and their order.
#[derive(Debug, Clone, PartialEq)]
pub enum MetricShape {
    Stats,
    ExtendedStats,
    /// Ranks in declared order.
    Percentiles(Vec<f64>),
}

impl MetricShape {
    /// Sub-column keys in output order. Percentile ranks use the canonical
    /// float label (`10` → `"10.0"`).
    pub fn sub_keys(&self) -> Vec<String> {
        match self {
            MetricShape::Stats => STATS_KEYS.iter().map(|k| k.to_string()).collect(),
            MetricShape::ExtendedStats => {
                EXTENDED_STATS_KEYS.iter().map(|k| k.to_string()).collect()
            }
            MetricShape::Percentiles(ranks) => ranks.iter().map(|r| format_float(*r)).collect(),
        }
    }
}

/// Declaration of one multi-value column in a result set.
///
/// The collaborator producing the rows registers these so the CSV layer can
/// expand `M` into `M.k1 .. M.kn` without guessing from the data.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricSpec {
    /// Canonical metric name, e.g. `STATS(age)`.
    pub name: String,
    pub alias: Option<String>,
    pub shape: MetricShape,
}

impl MetricSpec {
    pub fn new(name: impl Into<String>, shape: MetricShape) -> Self {
        Self { name: name.into(), alias: None, shape }
    }

    pub fn stats(name: impl Into<String>) -> Self {
        Self::new(name, MetricShape::Stats)
    }

    pub fn extended_stats(name: impl Into<String>) -> Self {
        Self::new(name, MetricShape::ExtendedStats)
    }

    /// `None` → [`DEFAULT_PERCENTS`].
    pub fn percentiles(name: impl Into<String>, ranks: Option<Vec<f64>>) -> Self {
        let ranks = ranks.unwrap_or_else(|| DEFAULT_PERCENTS.to_vec());
        Self::new(name, MetricShape::Percentiles(ranks))
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Output column name: the alias when present, otherwise the metric name.
    pub fn column(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }
}
