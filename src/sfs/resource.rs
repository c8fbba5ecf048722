use crate::error::{Result, SfsError};
use serde::Serialize;
use serde_json::{Map, Value};

/// Snapshot of one server-side entity as returned by the API.
///
/// The attributes are kept as the JSON object the service sent; only the
/// fields the client itself relies on get typed accessors.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resource {
    #[serde(skip)]
    kind: &'static str,
    #[serde(flatten)]
    info: Map<String, Value>,
}

impl Resource {
    pub fn new(kind: &'static str, info: Map<String, Value>) -> Self {
        Self { kind, info }
    }

    /// Unwraps `{"<key>": {...}}` from a response body.
    pub fn from_body(kind: &'static str, body: Option<Value>, key: &str) -> Result<Self> {
        match take_key(body, key)? {
            Value::Object(info) => Ok(Self::new(kind, info)),
            other => Err(unexpected(key, &other)),
        }
    }

    /// Unwraps `{"<key>": [{...}, ...]}` from a response body.
    pub fn list_from_body(kind: &'static str, body: Option<Value>, key: &str) -> Result<Vec<Self>> {
        match take_key(body, key)? {
            Value::Array(items) => items
                .into_iter()
                .map(|item| match item {
                    Value::Object(info) => Ok(Self::new(kind, info)),
                    other => Err(unexpected(key, &other)),
                })
                .collect(),
            other => Err(unexpected(key, &other)),
        }
    }

    pub fn kind(&self) -> &'static str {
        self.kind
    }

    pub fn id(&self) -> Option<&str> {
        self.get_str("id")
    }

    pub fn name(&self) -> Option<&str> {
        self.get_str("name")
    }

    pub fn status(&self) -> Option<&str> {
        self.get_str("status")
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.info.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.info.get(key).and_then(Value::as_str)
    }

    pub fn attributes(&self) -> &Map<String, Value> {
        &self.info
    }

    /// Attribute rendered for display: strings verbatim, null as `None`,
    /// everything else as compact JSON.
    pub fn display_value(&self, key: &str) -> String {
        match self.info.get(key) {
            None | Some(Value::Null) => "None".to_string(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        }
    }

    pub fn into_attributes(self) -> Map<String, Value> {
        self.info
    }
}

fn take_key(body: Option<Value>, key: &str) -> Result<Value> {
    match body {
        Some(Value::Object(mut map)) => map
            .remove(key)
            .ok_or_else(|| SfsError::CommandError(format!("Response is missing '{}'", key))),
        Some(other) => Err(unexpected(key, &other)),
        None => Err(SfsError::CommandError(format!(
            "Expected '{}' in the response but the body was empty",
            key
        ))),
    }
}

fn unexpected(key: &str, value: &Value) -> SfsError {
    SfsError::CommandError(format!("Unexpected response shape for '{}': {}", key, value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unwraps_single_resource() {
        let body = json!({"share": {"id": "abc", "status": "available", "size": 1}});
        let share = Resource::from_body("share", Some(body), "share").unwrap();
        assert_eq!(share.id(), Some("abc"));
        assert_eq!(share.status(), Some("available"));
        assert_eq!(share.display_value("size"), "1");
        assert_eq!(share.display_value("name"), "None");
    }

    #[test]
    fn unwraps_resource_lists() {
        let body = json!({"shares": [{"id": "a"}, {"id": "b"}]});
        let shares = Resource::list_from_body("share", Some(body), "shares").unwrap();
        let ids: Vec<_> = shares.iter().filter_map(Resource::id).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn missing_key_is_an_error() {
        let body = json!({"snapshot": {}});
        assert!(Resource::from_body("share", Some(body), "share").is_err());
        assert!(Resource::from_body("share", None, "share").is_err());
    }

    #[test]
    fn serializes_as_plain_attributes() {
        let body = json!({"share": {"id": "abc"}});
        let share = Resource::from_body("share", Some(body), "share").unwrap();
        assert_eq!(serde_json::to_value(&share).unwrap(), json!({"id": "abc"}));
    }
}
