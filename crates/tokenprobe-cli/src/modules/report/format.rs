use serde_json::Value;

pub(crate) const PREVIEW_CHARS: usize = 30;

pub(crate) fn preview(token: &str, length: usize) -> &str {
    match token.char_indices().nth(length) {
        Some((index, _)) => &token[..index],
        None => token,
    }
}

/// Renders a claim value compactly: arrays as `[a b]`, objects as `map[k:v]`.
pub(crate) fn format_claim_value(value: &Value) -> String {
    match value {
        Value::Null => "<nil>".to_string(),
        Value::Bool(flag) => flag.to_string(),
        Value::Number(number) => number.to_string(),
        Value::String(text) => text.clone(),
        Value::Array(items) => {
            let items: Vec<String> = items.iter().map(format_claim_value).collect();
            format!("[{}]", items.join(" "))
        }
        Value::Object(map) => {
            let entries: Vec<String> = map
                .iter()
                .map(|(key, value)| format!("{key}:{}", format_claim_value(value)))
                .collect();
            format!("map[{}]", entries.join(" "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn preview_truncates_on_char_boundary() {
        assert_eq!(preview("short", PREVIEW_CHARS), "short");
        let long = "x".repeat(45);
        assert_eq!(preview(&long, PREVIEW_CHARS).len(), 30);
        assert_eq!(preview("ééééé", 3), "ééé");
    }

    #[test]
    fn claim_values_render_compactly() {
        assert_eq!(format_claim_value(&json!("alice")), "alice");
        assert_eq!(format_claim_value(&json!(["admins", "devs"])), "[admins devs]");
        assert_eq!(format_claim_value(&json!({"a": 1, "b": [true]})), "map[a:1 b:[true]]");
        assert_eq!(format_claim_value(&Value::Null), "<nil>");
    }
}
