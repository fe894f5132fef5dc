//! JSON argument extraction shared by the device tools.

use shellgate_core::tools::registry::ToolError;

/// Extract a required string field.
pub(crate) fn required_str<'a>(args: &'a serde_json::Value, field: &str) -> Result<&'a str, ToolError> {
    args.get(field)
        .and_then(|v| v.as_str())
        .ok_or_else(|| ToolError::InvalidArgs(format!("missing required field: {field}")))
}

/// Extract a required, non-blank string field.
pub(crate) fn required_nonempty<'a>(
    args: &'a serde_json::Value,
    field: &str,
) -> Result<&'a str, ToolError> {
    let value = required_str(args, field)?;
    if value.trim().is_empty() {
        return Err(ToolError::InvalidArgs(format!("field must not be empty: {field}")));
    }
    Ok(value)
}

/// Extract an optional non-negative integer; floats are truncated.
pub(crate) fn optional_u64(args: &serde_json::Value, field: &str) -> Option<u64> {
    args.get(field)
        .and_then(|v| v.as_u64().or_else(|| v.as_f64().map(|f| f.max(0.0) as u64)))
}

pub(crate) fn optional_bool(args: &serde_json::Value, field: &str, default: bool) -> bool {
    args.get(field).and_then(|v| v.as_bool()).unwrap_or(default)
}

/// Extract a required, non-empty array of strings.
pub(crate) fn required_str_array(
    args: &serde_json::Value,
    field: &str,
) -> Result<Vec<String>, ToolError> {
    let items = args
        .get(field)
        .and_then(|v| v.as_array())
        .ok_or_else(|| ToolError::InvalidArgs(format!("missing required field: {field}")))?;

    if items.is_empty() {
        return Err(ToolError::InvalidArgs(format!(
            "{field} must list at least one path"
        )));
    }

    items
        .iter()
        .map(|v| {
            v.as_str()
                .map(str::to_string)
                .ok_or_else(|| ToolError::InvalidArgs(format!("{field} entries must be strings")))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn required_str_missing() {
        let err = required_str(&json!({}), "path").unwrap_err();
        assert!(matches!(err, ToolError::InvalidArgs(msg) if msg.contains("path")));
    }

    #[test]
    fn required_nonempty_rejects_blank() {
        assert!(required_nonempty(&json!({"command": "  "}), "command").is_err());
        assert_eq!(
            required_nonempty(&json!({"command": "ls"}), "command").unwrap(),
            "ls"
        );
    }

    #[test]
    fn optional_u64_accepts_floats() {
        assert_eq!(optional_u64(&json!({"t": 5}), "t"), Some(5));
        assert_eq!(optional_u64(&json!({"t": 2.9}), "t"), Some(2));
        assert_eq!(optional_u64(&json!({"t": "5"}), "t"), None);
        assert_eq!(optional_u64(&json!({}), "t"), None);
    }

    #[test]
    fn str_array_validation() {
        assert_eq!(
            required_str_array(&json!({"paths": ["/a", "/b"]}), "paths").unwrap(),
            vec!["/a", "/b"]
        );
        assert!(required_str_array(&json!({"paths": []}), "paths").is_err());
        assert!(required_str_array(&json!({"paths": [1]}), "paths").is_err());
        assert!(required_str_array(&json!({"paths": "/a"}), "paths").is_err());
    }

    #[test]
    fn optional_bool_default() {
        assert!(optional_bool(&json!({}), "x", true));
        assert!(!optional_bool(&json!({"x": false}), "x", true));
    }
}
