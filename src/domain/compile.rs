//! Compilation request and result types.
//!
//! `CompileBody` is the inbound wire shape of the gateway route.
//! `CompilationRequest` is what the template compiler receives; the two
//! differ in naming (`metaProperties` vs `downloadMetaProperties`, `source`
//! vs `downloadSource`) and the mapping happens only in
//! [`CompilationRequest::from_body`].

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::ApiKey;

/// Inbound JSON body of `POST /prompt/get-compiled`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompileBody {
    #[serde(default)]
    pub id: Option<String>,
    /// SDK spelling of `id`
    #[serde(default)]
    pub prompt_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub variables: Option<Map<String, Value>>,
    /// Any JSON value; coerced with [`is_truthy`]
    #[serde(default)]
    pub should_compile: Option<Value>,
    #[serde(default)]
    pub meta_properties: Option<Value>,
    #[serde(default)]
    pub source: Option<String>,
}

/// What the template compiler is asked to resolve
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompilationRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    pub api_key: ApiKey,
    #[serde(default)]
    pub variables: Map<String, Value>,
    #[serde(default)]
    pub should_compile: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub download_meta_properties: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub download_source: Option<String>,
}

impl CompilationRequest {
    /// Build a request for the named template with no variables
    pub fn named(name: impl Into<String>, api_key: ApiKey) -> Self {
        Self {
            id: None,
            name: Some(name.into()),
            version: None,
            api_key,
            variables: Map::new(),
            should_compile: false,
            download_meta_properties: None,
            download_source: None,
        }
    }

    /// Map an inbound body into a compiler request
    pub fn from_body(body: CompileBody, api_key: ApiKey) -> Self {
        Self {
            id: body.id.or(body.prompt_id),
            name: body.name,
            version: body.version,
            api_key,
            variables: body.variables.unwrap_or_default(),
            should_compile: body.should_compile.as_ref().is_some_and(is_truthy),
            download_meta_properties: body.meta_properties,
            download_source: body.source,
        }
    }

    pub fn with_variable(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.variables.insert(key.into(), value.into());
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn compiled(mut self) -> Self {
        self.should_compile = true;
        self
    }
}

/// JavaScript-style truthiness of a JSON value
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// The `{ err, res }` envelope returned by the gateway.
///
/// Both fields are always serialized, as `null` when absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompilationResult {
    #[serde(default)]
    pub err: Option<Value>,
    #[serde(default)]
    pub res: Option<Value>,
}

impl CompilationResult {
    pub fn success(res: Option<Value>) -> Self {
        Self { err: None, res }
    }

    pub fn failure(err: impl Into<Value>) -> Self {
        Self {
            err: Some(err.into()),
            res: None,
        }
    }

    /// True when `err` carries a truthy value
    pub fn is_failure(&self) -> bool {
        self.err.as_ref().is_some_and(is_truthy)
    }
}

/// A resolved prompt as produced by the local template compiler
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompiledPrompt {
    pub prompt_id: String,
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub meta_properties: Map<String, Value>,
    /// Raw template text
    pub prompt: String,
    /// Rendered text, present only when compilation was requested
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compiled_prompt: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn key() -> ApiKey {
        ApiKey::new("abc123").unwrap()
    }

    #[test]
    fn test_from_body_defaults() {
        let body: CompileBody = serde_json::from_value(json!({"name": "greeting"})).unwrap();
        let request = CompilationRequest::from_body(body, key());

        assert_eq!(request.name.as_deref(), Some("greeting"));
        assert!(request.id.is_none());
        assert!(request.variables.is_empty());
        assert!(!request.should_compile);
        assert!(request.download_source.is_none());
    }

    #[test]
    fn test_from_body_renames_download_fields() {
        let body: CompileBody = serde_json::from_value(json!({
            "id": "p-1",
            "metaProperties": {"team": "search"},
            "source": "python-sdk"
        }))
        .unwrap();
        let request = CompilationRequest::from_body(body, key());

        assert_eq!(request.download_meta_properties, Some(json!({"team": "search"})));
        assert_eq!(request.download_source.as_deref(), Some("python-sdk"));

        let wire = serde_json::to_value(&request).unwrap();
        assert!(wire.get("metaProperties").is_none());
        assert_eq!(wire["downloadSource"], "python-sdk");
    }

    #[test]
    fn test_prompt_id_alias() {
        let body: CompileBody = serde_json::from_value(json!({"promptId": "p-9"})).unwrap();
        let request = CompilationRequest::from_body(body, key());
        assert_eq!(request.id.as_deref(), Some("p-9"));

        let body: CompileBody = serde_json::from_value(json!({"id": "p-1", "promptId": "p-9"})).unwrap();
        let request = CompilationRequest::from_body(body, key());
        assert_eq!(request.id.as_deref(), Some("p-1"));
    }

    #[test]
    fn test_null_variables_default_to_empty() {
        let body: CompileBody = serde_json::from_value(json!({"name": "x", "variables": null})).unwrap();
        let request = CompilationRequest::from_body(body, key());
        assert!(request.variables.is_empty());
    }

    #[test]
    fn test_should_compile_coercion() {
        for (value, expected) in [
            (json!(true), true),
            (json!(false), false),
            (json!(1), true),
            (json!(0), false),
            (json!("yes"), true),
            (json!(""), false),
            (json!(null), false),
            (json!({}), true),
        ] {
            let body: CompileBody =
                serde_json::from_value(json!({"name": "x", "shouldCompile": value.clone()})).unwrap();
            let request = CompilationRequest::from_body(body, key());
            assert_eq!(request.should_compile, expected, "shouldCompile = {}", value);
        }
    }

    #[test]
    fn test_result_envelope_serializes_nulls() {
        let result = CompilationResult::default();
        assert_eq!(serde_json::to_value(&result).unwrap(), json!({"err": null, "res": null}));
        assert!(!result.is_failure());
    }

    #[test]
    fn test_result_failure_detection() {
        assert!(CompilationResult::failure("boom").is_failure());
        assert!(CompilationResult::failure(json!({"code": 1})).is_failure());
        assert!(!CompilationResult::failure("").is_failure());
        assert!(!CompilationResult::success(Some(json!({"prompt": "hi"}))).is_failure());
    }

    #[test]
    fn test_compiled_prompt_omits_missing_compiled_text() {
        let prompt = CompiledPrompt {
            prompt_id: "p-1".to_string(),
            name: "greeting".to_string(),
            version: "1.0.0".to_string(),
            tags: vec![],
            meta_properties: Map::new(),
            prompt: "Hello {{user}}".to_string(),
            compiled_prompt: None,
        };
        let wire = serde_json::to_value(&prompt).unwrap();
        assert_eq!(wire["promptId"], "p-1");
        assert!(wire.get("compiledPrompt").is_none());
    }
}
