//! Tool trait: the abstraction over agent capabilities.
//!
//! Tools are how the persona acts on its own state: adjusting modifiers,
//! writing relationship notes, tracking the user's goals.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use crate::error::ToolError;
use crate::provider::ToolDefinition;

/// A request to execute a tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    /// Unique call ID (matches the LLM's tool_call.id)
    pub id: String,

    /// Name of the tool to execute
    pub name: String,

    /// Arguments as a JSON value
    pub arguments: serde_json::Value,
}

/// The result of a tool execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    /// The call ID this result is for
    pub call_id: String,

    /// Whether the tool executed successfully
    pub success: bool,

    /// Human-readable message on success, error text on failure
    pub output: String,

    /// Optional structured data
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl ToolResult {
    /// A successful result with a message and structured data.
    pub fn success(message: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            call_id: String::new(),
            success: true,
            output: message.into(),
            data: Some(data),
        }
    }

    /// A failed result carrying only the error text.
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            call_id: String::new(),
            success: false,
            output: error.into(),
            data: None,
        }
    }

    /// The flat JSON object reported back to the model.
    ///
    /// `success` and `message` come first, then every data field is merged
    /// in at the top level.
    pub fn to_payload(&self) -> serde_json::Value {
        let mut map = serde_json::Map::new();
        map.insert("success".into(), serde_json::Value::Bool(self.success));
        if !self.output.is_empty() {
            map.insert("message".into(), serde_json::Value::String(self.output.clone()));
        }
        if let Some(serde_json::Value::Object(data)) = &self.data {
            for (k, v) in data {
                map.insert(k.clone(), v.clone());
            }
        }
        serde_json::Value::Object(map)
    }
}

/// The core Tool trait.
///
/// Each tool implements this trait and is registered in the ToolRegistry,
/// which exposes it to the agent loop.
#[async_trait]
pub trait Tool: Send + Sync {
    /// The unique name of this tool (e.g., "adjust_modifier").
    fn name(&self) -> &str;

    /// A description of what this tool does (sent to the LLM).
    fn description(&self) -> &str;

    /// JSON Schema describing this tool's parameters.
    fn parameters_schema(&self) -> serde_json::Value;

    /// Execute the tool with the given arguments.
    async fn execute(&self, arguments: serde_json::Value) -> std::result::Result<ToolResult, ToolError>;

    /// Convert this tool into a ToolDefinition for sending to the LLM.
    fn to_definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters_schema(),
        }
    }
}

/// Check call arguments against a tool's parameter schema.
///
/// Only the object shape is enforced: every `required` key must be present
/// and no key outside `properties` may appear. Value types are left to the
/// tool itself.
pub fn validate_arguments(
    schema: &serde_json::Value,
    arguments: &serde_json::Value,
) -> std::result::Result<(), ToolError> {
    let empty = serde_json::Map::new();
    let args = match arguments {
        serde_json::Value::Object(map) => map,
        serde_json::Value::Null => &empty,
        _ => {
            return Err(ToolError::InvalidArguments(
                "Arguments must be a JSON object".into(),
            ));
        }
    };

    if let Some(required) = schema["required"].as_array() {
        for name in required.iter().filter_map(|r| r.as_str()) {
            if !args.contains_key(name) {
                return Err(ToolError::InvalidArguments(format!(
                    "Missing required parameter: {name}"
                )));
            }
        }
    }

    if let Some(properties) = schema["properties"].as_object() {
        let mut unexpected: Vec<&str> = args
            .keys()
            .filter(|k| !properties.contains_key(k.as_str()))
            .map(|k| k.as_str())
            .collect();
        if !unexpected.is_empty() {
            unexpected.sort_unstable();
            return Err(ToolError::InvalidArguments(format!(
                "Unexpected parameters: {}",
                unexpected.join(", ")
            )));
        }
    }

    Ok(())
}

/// A registry of available tools.
///
/// The agent loop uses this to:
/// 1. Get tool definitions to send to the LLM
/// 2. Look up, validate, and execute tools when the LLM requests them
pub struct ToolRegistry {
    tools: HashMap<String, Box<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// Register a tool. Replaces any existing tool with the same name.
    pub fn register(&mut self, tool: Box<dyn Tool>) {
        let name = tool.name().to_string();
        self.tools.insert(name, tool);
    }

    /// Get a tool by name.
    pub fn get(&self, name: &str) -> Option<&dyn Tool> {
        self.tools.get(name).map(|t| t.as_ref())
    }

    /// Get all tool definitions (for sending to the LLM), ordered by name.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        let mut defs: Vec<ToolDefinition> = self.tools.values().map(|t| t.to_definition()).collect();
        defs.sort_by(|a, b| a.name.cmp(&b.name));
        defs
    }

    /// Validate and execute a tool call.
    pub async fn execute(&self, call: &ToolCall) -> std::result::Result<ToolResult, ToolError> {
        let tool = self.tools.get(&call.name).ok_or_else(|| ToolError::NotFound(call.name.clone()))?;
        validate_arguments(&tool.parameters_schema(), &call.arguments)?;
        let mut result = tool.execute(call.arguments.clone()).await?;
        result.call_id = call.id.clone();
        Ok(result)
    }

    /// List all registered tool names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tools.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}
