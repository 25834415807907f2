//! Tool definitions and tool calls

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::schema::Schema;

/// Tool the model may call, described by a JSON schema for its arguments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// JSON schema for the arguments object
    pub parameters: Value,
}

impl ToolDefinition {
    pub fn new(name: impl Into<String>, parameters: Value) -> Self {
        Self {
            name: name.into(),
            description: None,
            parameters,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Tool together with the schema used to validate its arguments.
#[derive(Debug, Clone)]
pub struct Tool<S> {
    pub name: String,
    pub description: Option<String>,
    pub schema: S,
}

impl<S: Schema> Tool<S> {
    pub fn new(name: impl Into<String>, schema: S) -> Self {
        Self {
            name: name.into(),
            description: None,
            schema,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Definition sent to the model.
    pub fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name.clone(),
            description: self.description.clone(),
            parameters: self.schema.json_schema(),
        }
    }
}

/// Raw tool call as returned by the model, before argument validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    /// Arguments as produced by the model
    pub args: Value,
}

impl ToolCall {
    pub fn new(id: impl Into<String>, args: Value) -> Self {
        Self { id: id.into(), args }
    }
}

/// Tool call whose arguments passed validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidatedToolCall<T> {
    pub id: String,
    pub name: String,
    pub args: T,
}
