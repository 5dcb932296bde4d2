use serde_json::Value;

/// Request fields holding glob pattern lists.
pub const PATTERN_FIELDS: [&str; 2] = ["include_patterns", "exclude_patterns"];

/// One pattern per non-blank line.
pub fn split_patterns(raw: &str) -> Vec<String> {
    raw.lines()
        .map(str::trim)
        .filter(|pattern| !pattern.is_empty())
        .map(str::to_string)
        .collect()
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null | Value::Bool(false) => true,
        Value::String(raw) => raw.is_empty(),
        Value::Number(number) => number.as_f64() == Some(0.0),
        _ => false,
    }
}

/// Coerce pattern fields of a raw job request into arrays.
///
/// Newline-separated strings are split into patterns; any other non-array
/// value becomes an empty list. Absent or blank fields are left untouched.
pub fn normalize_pattern_fields(body: &mut Value) {
    let Some(fields) = body.as_object_mut() else {
        return;
    };

    for name in PATTERN_FIELDS {
        let Some(value) = fields.get_mut(name) else {
            continue;
        };
        if value.is_array() || is_blank(value) {
            continue;
        }

        let patterns = match value {
            Value::String(raw) => split_patterns(raw),
            _ => Vec::new(),
        };
        *value = Value::Array(patterns.into_iter().map(Value::String).collect());
    }
}
