//! Utility functions and helpers.

pub mod http;
pub mod log;

/// Secrets shorter than this are fully hidden.
const MIN_REVEAL_LEN: usize = 12;

/// Mask a secret for display, keeping a short prefix and the length.
pub fn mask_secret(secret: &str) -> String {
    let len = secret.chars().count();
    if len < MIN_REVEAL_LEN {
        return "****".to_string();
    }
    let prefix: String = secret.chars().take(4).collect();
    format!("{prefix}...({len} chars)")
}

/// Parse a boolean flag that may arrive as a JSON bool or as text.
pub fn parse_flag(value: &serde_json::Value) -> Option<bool> {
    match value {
        serde_json::Value::Bool(b) => Some(*b),
        serde_json::Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_mask_secret() {
        assert_eq!(mask_secret("short"), "****");
        assert_eq!(mask_secret("abcdefghijklmnop"), "abcd...(16 chars)");
    }

    #[test]
    fn test_parse_flag() {
        assert_eq!(parse_flag(&json!(true)), Some(true));
        assert_eq!(parse_flag(&json!("False")), Some(false));
        assert_eq!(parse_flag(&json!(" true ")), Some(true));
        assert_eq!(parse_flag(&json!("yes")), None);
        assert_eq!(parse_flag(&json!(1)), None);
    }
}
