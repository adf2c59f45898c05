// Lenient readers for loosely typed JSON coming from pages and workers

use serde_json::Value;

pub fn string(value: &Value) -> Option<String> {
    value
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Number or numeric string.
pub fn float(value: &Value) -> Option<f64> {
    let parsed: Option<f64> = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    parsed.filter(|f| f.is_finite())
}

pub fn uint(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Zero is how the workers say "unknown"
pub fn dimension(value: &Value) -> Option<u32> {
    uint(value)
        .filter(|v| *v > 0)
        .and_then(|v| u32::try_from(v).ok())
}

/// Collapse newlines and cut to `max_len` characters with an ellipsis.
pub fn truncate_text(s: &str, max_len: usize) -> String {
    let s = s.replace('\n', " ");
    let chars: Vec<char> = s.chars().collect();
    if chars.len() <= max_len {
        s
    } else if max_len <= 3 {
        // No room for the ellipsis
        chars[..max_len].iter().collect()
    } else {
        format!("{}...", chars[..max_len - 3].iter().collect::<String>())
    }
}
