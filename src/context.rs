use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Which side of the service call a hook runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    #[default]
    Before,
    After,
}

/// The service operation a context belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    Find,
    Get,
    Create,
    Update,
    Patch,
    Remove,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Find => "find",
            Method::Get => "get",
            Method::Create => "create",
            Method::Update => "update",
            Method::Patch => "patch",
            Method::Remove => "remove",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Call parameters: the query plus origin metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Params {
    #[serde(default)]
    pub query: Map<String, Value>,
    /// Transport the call came in through (`rest`, `socketio`, ...). Absent for server calls.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Params {
    pub fn with_query(query: Map<String, Value>) -> Self {
        Self { query, ..Self::default() }
    }
}

/// Mutable record shared by every step of one operation.
///
/// Steps take the context by value and hand it back, so exactly one step owns it
/// at any time. The engine never clones it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Context {
    #[serde(default, rename = "type")]
    pub stage: Stage,
    pub method: Method,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default)]
    pub params: Params,
}

impl Context {
    pub fn new(stage: Stage, method: Method) -> Self {
        Self { stage, method, id: None, data: None, result: None, params: Params::default() }
    }

    pub fn before(method: Method) -> Self {
        Self::new(Stage::Before, method)
    }

    pub fn after(method: Method) -> Self {
        Self::new(Stage::After, method)
    }

    pub fn with_id(mut self, id: impl Into<Value>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn with_result(mut self, result: Value) -> Self {
        self.result = Some(result);
        self
    }

    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.params.provider = Some(provider.into());
        self
    }

    pub fn with_query(mut self, query: Map<String, Value>) -> Self {
        self.params.query = query;
        self
    }

    /// The provider tag, treating an empty string as absent.
    pub fn provider(&self) -> Option<&str> {
        self.params.provider.as_deref().filter(|p| !p.is_empty())
    }
}

/// JS-style truthiness of a JSON value.
pub fn is_truthy(v: &Value) -> bool {
    match v {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(false),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn deserializes_dispatch_shape() {
        let ctx: Context = serde_json::from_value(json!({
            "type": "after",
            "method": "get",
            "id": 7,
            "result": {"name": "a"},
            "params": {"query": {"x": 1}, "provider": "rest", "user": {"id": 1}}
        }))
        .unwrap();
        assert_eq!(ctx.stage, Stage::After);
        assert_eq!(ctx.method, Method::Get);
        assert_eq!(ctx.id, Some(json!(7)));
        assert_eq!(ctx.provider(), Some("rest"));
        assert_eq!(ctx.params.extra.get("user"), Some(&json!({"id": 1})));
    }

    #[test]
    fn empty_provider_reads_as_absent() {
        let ctx = Context::before(Method::Find).with_provider("");
        assert_eq!(ctx.provider(), None);
    }

    #[test]
    fn truthiness_follows_js() {
        assert!(!is_truthy(&json!(null)));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!("")));
        assert!(is_truthy(&json!([])));
        assert!(is_truthy(&json!({})));
        assert!(is_truthy(&json!("no")));
    }
}
