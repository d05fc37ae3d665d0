//! KPI value formatting.

use serde_json::Value;

/// Display string for a raw KPI value.
///
/// Strings pass through. A numeric ratio under a `%` label renders as a
/// whole percentage; other integers verbatim; other floats with at most two
/// decimals.
pub fn format_kpi_value(label: &str, value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => {
            if let Some(f) = n.as_f64()
                && label.trim_end().ends_with('%')
                && (0.0..=1.0).contains(&f)
            {
                return format!("{}%", (f * 100.0).round() as i64);
            }
            if let Some(i) = n.as_i64() {
                return i.to_string();
            }
            if let Some(u) = n.as_u64() {
                return u.to_string();
            }
            n.as_f64().map(format_decimal).unwrap_or_default()
        }
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn format_decimal(f: f64) -> String {
    let s = format!("{f:.2}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    s.to_string()
}
