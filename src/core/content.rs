//! Tool response envelope.

use rmcp::model::{CallToolResult, Content};
use rmcp::ErrorData as McpError;
use serde::Serialize;
use serde_json::Value as JsonValue;

/// JSON object returned to the caller as a single text content block.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope(pub JsonValue);

impl Envelope {
    pub fn from_outcome<T: Serialize>(outcome: &T) -> Result<Self, McpError> {
        serde_json::to_value(outcome)
            .map(Envelope)
            .map_err(|e| McpError::internal_error(format!("encode response: {e}"), None))
    }

    pub fn into_call_result(self) -> CallToolResult {
        CallToolResult::success(vec![Content::text(self.0.to_string())])
    }
}

impl From<JsonValue> for Envelope {
    fn from(v: JsonValue) -> Self {
        Envelope(v)
    }
}
