/// Canonical decimal text for a floating point number.
///
/// - integral values keep one decimal place: `2.0` → `"2.0"`, `507.0` → `"507.0"`
/// - everything else uses the shortest round-trip form: `30.171` → `"30.171"`
pub fn format_float(v: f64) -> String {
    if v.is_finite() && v.fract() == 0.0 {
        format!("{v:.1}")
    } else {
        format!("{v}")
    }
}

/// Canonical text for a JSON number: integers stay integral (`1000`),
/// floats go through [`format_float`].
pub fn format_number(n: &serde_json::Number) -> String {
    if let Some(i) = n.as_i64() {
        i.to_string()
    } else if let Some(u) = n.as_u64() {
        u.to_string()
    } else {
        n.as_f64().map(format_float).unwrap_or_else(|| n.to_string())
    }
}

/// First segment of a dotted field path: `"name.firstname"` → `"name"`.
pub fn root_segment(path: &str) -> &str {
    path.split('.').next().unwrap_or(path)
}
