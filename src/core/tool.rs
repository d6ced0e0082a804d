use std::sync::Arc;

use async_trait::async_trait;
use rmcp::model::{JsonObject, Tool as McpTool, ToolAnnotations};
use rmcp::ErrorData as McpError;
use serde::de::DeserializeOwned;

use crate::core::content::Envelope;

/// Capability declaration of one tool, fixed once the server is built.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolDescriptor {
    pub name: &'static str,
    pub title: String,
    pub description: String,
    pub input_schema: JsonObject,
    pub output_schema: Option<JsonObject>,
}

impl ToolDescriptor {
    /// Protocol form advertised in `tools/list`.
    pub fn to_mcp(&self) -> McpTool {
        let mut tool = McpTool::new(
            self.name,
            self.description.clone(),
            Arc::new(self.input_schema.clone()),
        );
        tool.output_schema = self.output_schema.clone().map(Arc::new);
        tool.annotations = Some(ToolAnnotations {
            title: Some(self.title.clone()),
            read_only_hint: Some(true),
            destructive_hint: Some(false),
            idempotent_hint: Some(true),
            open_world_hint: Some(true),
            ..Default::default()
        });
        tool
    }
}

/// Turns a `json!` literal into a schema object; anything else is an empty schema.
pub fn schema(value: serde_json::Value) -> JsonObject {
    match value {
        serde_json::Value::Object(map) => map,
        _ => JsonObject::new(),
    }
}

/// Decodes tool arguments; a mismatch is a protocol-level `invalid_params`.
pub fn decode_args<T: DeserializeOwned>(tool: &str, arguments: JsonObject) -> Result<T, McpError> {
    serde_json::from_value(serde_json::Value::Object(arguments)).map_err(|e| {
        McpError::invalid_params(format!("invalid arguments for {tool}: {e}"), None)
    })
}

/// Minimal metadata every tool must expose.
pub trait ToolSpec {
    fn descriptor(&self) -> &ToolDescriptor;

    fn name(&self) -> &'static str {
        self.descriptor().name
    }
}

/// `ToolSpec` + handler. Business failures travel inside the envelope;
/// `Err` is reserved for calls whose arguments cannot be interpreted.
#[async_trait]
pub trait Tool: ToolSpec + Send + Sync {
    async fn call(&self, arguments: JsonObject) -> Result<Envelope, McpError>;
}
