//! Caller-submitted custom records and request validation
//!
//! Request schema:
//! - `data`: object, required
//! - `metadata`: object, optional, with optional `source` (string),
//!   `tags` (array of strings) and `category` (string)
//!
//! Unknown keys are rejected at both levels. Validation stops at the first
//! violation and reports it in the form `"field" must be ...`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Metadata stored alongside a custom record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Submitting user (from the verified token)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    /// Submitter email, or user id when no email is present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
}

/// Persisted custom record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomRecord {
    pub id: Uuid,
    /// Creation time, epoch milliseconds
    pub timestamp: i64,
    pub data: Map<String, Value>,
    pub metadata: CustomMetadata,
}

impl CustomRecord {
    /// Build a new record for a validated request submitted by `user_id`
    pub fn new(request: StoreCustomRequest, user_id: &str, email: Option<&str>) -> Self {
        let mut metadata = request.metadata.unwrap_or_default();
        metadata.user_id = Some(user_id.to_string());
        metadata.created_by = Some(email.filter(|e| !e.is_empty()).unwrap_or(user_id).to_string());

        Self {
            id: Uuid::new_v4(),
            timestamp: fusion_common::time::now_millis(),
            data: request.data,
            metadata,
        }
    }
}

/// Validated body of a store request
#[derive(Debug, Clone, PartialEq)]
pub struct StoreCustomRequest {
    pub data: Map<String, Value>,
    pub metadata: Option<CustomMetadata>,
}

/// Parse and validate a raw request body
///
/// Returns the first validation message on failure.
pub fn parse_store_request(body: &[u8]) -> Result<StoreCustomRequest, String> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err("Request body is required".to_string());
    }

    let value: Value =
        serde_json::from_slice(body).map_err(|_| "Invalid JSON format".to_string())?;

    validate_store_request(value)
}

/// Validate an already-decoded request body
pub fn validate_store_request(value: Value) -> Result<StoreCustomRequest, String> {
    let Value::Object(mut root) = value else {
        return Err("\"value\" must be of type object".to_string());
    };

    let data = match root.remove("data") {
        None => return Err("\"data\" is required".to_string()),
        Some(Value::Object(data)) => data,
        Some(_) => return Err("\"data\" must be of type object".to_string()),
    };

    let metadata = match root.remove("metadata") {
        None => None,
        Some(Value::Object(metadata)) => Some(validate_metadata(metadata)?),
        Some(_) => return Err("\"metadata\" must be of type object".to_string()),
    };

    if let Some(key) = root.keys().next() {
        return Err(format!("\"{}\" is not allowed", key));
    }

    Ok(StoreCustomRequest { data, metadata })
}

fn validate_metadata(mut metadata: Map<String, Value>) -> Result<CustomMetadata, String> {
    let source = optional_string(&mut metadata, "source")?;

    let tags = match metadata.remove("tags") {
        None => None,
        Some(Value::Array(items)) => {
            let mut tags = Vec::with_capacity(items.len());
            for (index, item) in items.into_iter().enumerate() {
                match item {
                    Value::String(tag) if tag.is_empty() => {
                        return Err(format!(
                            "\"metadata.tags[{}]\" is not allowed to be empty",
                            index
                        ))
                    }
                    Value::String(tag) => tags.push(sanitize_string(&tag)),
                    _ => return Err(format!("\"metadata.tags[{}]\" must be a string", index)),
                }
            }
            Some(tags)
        }
        Some(_) => return Err("\"metadata.tags\" must be an array".to_string()),
    };

    let category = optional_string(&mut metadata, "category")?;

    if let Some(key) = metadata.keys().next() {
        return Err(format!("\"metadata.{}\" is not allowed", key));
    }

    Ok(CustomMetadata {
        source,
        tags,
        category,
        user_id: None,
        created_by: None,
    })
}

fn optional_string(map: &mut Map<String, Value>, key: &str) -> Result<Option<String>, String> {
    match map.remove(key) {
        None => Ok(None),
        Some(Value::String(s)) if s.is_empty() => {
            Err(format!("\"metadata.{}\" is not allowed to be empty", key))
        }
        Some(Value::String(s)) => Ok(Some(sanitize_string(&s))),
        Some(_) => Err(format!("\"metadata.{}\" must be a string", key)),
    }
}

/// Trim and strip characters that could break out of HTML attributes
pub fn sanitize_string(value: &str) -> String {
    value
        .trim()
        .chars()
        .filter(|c| !matches!(c, '<' | '>' | '"' | '\''))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_minimal_request() {
        let request = parse_store_request(br#"{"data": {"a": 1}}"#).unwrap();
        assert_eq!(request.data.get("a"), Some(&json!(1)));
        assert!(request.metadata.is_none());
    }

    #[test]
    fn test_full_metadata() {
        let request = validate_store_request(json!({
            "data": {"planet": "Hoth"},
            "metadata": {"source": " survey ", "tags": ["ice", "<b>cold</b>"], "category": "notes"}
        }))
        .unwrap();

        let metadata = request.metadata.unwrap();
        assert_eq!(metadata.source.as_deref(), Some("survey"));
        assert_eq!(metadata.tags, Some(vec!["ice".to_string(), "bcold/b".to_string()]));
        assert_eq!(metadata.category.as_deref(), Some("notes"));
    }

    #[test]
    fn test_body_errors() {
        assert_eq!(parse_store_request(b""), Err("Request body is required".to_string()));
        assert_eq!(parse_store_request(b"  \n"), Err("Request body is required".to_string()));
        assert_eq!(parse_store_request(b"{not json"), Err("Invalid JSON format".to_string()));
        assert_eq!(
            parse_store_request(b"[1, 2]"),
            Err("\"value\" must be of type object".to_string())
        );
    }

    #[test]
    fn test_data_errors() {
        assert_eq!(
            validate_store_request(json!({})),
            Err("\"data\" is required".to_string())
        );
        assert_eq!(
            validate_store_request(json!({"data": "text"})),
            Err("\"data\" must be of type object".to_string())
        );
        assert_eq!(
            validate_store_request(json!({"data": null})),
            Err("\"data\" must be of type object".to_string())
        );
    }

    #[test]
    fn test_metadata_errors() {
        assert_eq!(
            validate_store_request(json!({"data": {}, "metadata": []})),
            Err("\"metadata\" must be of type object".to_string())
        );
        assert_eq!(
            validate_store_request(json!({"data": {}, "metadata": {"source": 3}})),
            Err("\"metadata.source\" must be a string".to_string())
        );
        assert_eq!(
            validate_store_request(json!({"data": {}, "metadata": {"tags": "x"}})),
            Err("\"metadata.tags\" must be an array".to_string())
        );
        assert_eq!(
            validate_store_request(json!({"data": {}, "metadata": {"tags": ["ok", 5]}})),
            Err("\"metadata.tags[1]\" must be a string".to_string())
        );
        assert_eq!(
            validate_store_request(json!({"data": {}, "metadata": {"owner": "me"}})),
            Err("\"metadata.owner\" is not allowed".to_string())
        );
    }

    #[test]
    fn test_metadata_empty_strings_rejected() {
        assert_eq!(
            validate_store_request(json!({"data": {}, "metadata": {"source": ""}})),
            Err("\"metadata.source\" is not allowed to be empty".to_string())
        );
        assert_eq!(
            validate_store_request(json!({"data": {}, "metadata": {"category": ""}})),
            Err("\"metadata.category\" is not allowed to be empty".to_string())
        );
        assert_eq!(
            validate_store_request(json!({"data": {}, "metadata": {"tags": ["ok", ""]}})),
            Err("\"metadata.tags[1]\" is not allowed to be empty".to_string())
        );

        // Only the raw value is checked; sanitizing may still leave it empty
        let request =
            validate_store_request(json!({"data": {}, "metadata": {"source": "<>"}})).unwrap();
        assert_eq!(request.metadata.unwrap().source.as_deref(), Some(""));
    }

    #[test]
    fn test_unknown_top_level_key() {
        assert_eq!(
            validate_store_request(json!({"data": {}, "extra": 1})),
            Err("\"extra\" is not allowed".to_string())
        );
    }

    #[test]
    fn test_record_enrichment() {
        let request = validate_store_request(json!({"data": {"x": 1}})).unwrap();
        let record = CustomRecord::new(request.clone(), "user-1", Some("u@example.com"));
        assert_eq!(record.metadata.user_id.as_deref(), Some("user-1"));
        assert_eq!(record.metadata.created_by.as_deref(), Some("u@example.com"));

        let record = CustomRecord::new(request, "user-1", None);
        assert_eq!(record.metadata.created_by.as_deref(), Some("user-1"));
    }

    #[test]
    fn test_sanitize_string() {
        assert_eq!(sanitize_string("  <script>'x'\"  "), "scriptx");
        assert_eq!(sanitize_string("plain"), "plain");
    }
}
