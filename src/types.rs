//! Wire envelopes and convenience types for provider implementations.
//!
//! Responses from the service are decoded into typed structures here
//! instead of being poked at with unchecked casts; a missing or wrong-typed
//! field becomes a structured [`Decode`](crate::ProviderError::Decode)
//! error.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ProviderError;

/// An ordered field-name to value mapping exchanged with the service.
///
/// Built fresh per call from the resource's catalog entry and discarded
/// after the call returns.
pub type Envelope = serde_json::Map<String, Value>;

/// The identifier the service assigns on create.
///
/// RMON returns a numeric `id`, but some deployments front it with proxies
/// that stringify numbers, so both spellings are accepted.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum IdValue {
    /// Numeric identifier, the common case.
    Number(i64),
    /// Identifier already rendered as a string.
    Text(String),
}

impl IdValue {
    /// Render the identifier as the durable string handle retained between
    /// operations.
    pub fn handle(&self) -> String {
        match self {
            Self::Number(n) => n.to_string(),
            Self::Text(s) => s.clone(),
        }
    }
}

/// Response envelope of a successful create call.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatedResponse {
    /// The identifier assigned by the service.
    pub id: IdValue,
}

/// Response envelope of a successful login call.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionResponse {
    /// The bearer token for subsequent requests.
    pub access_token: String,
}

/// Decode a response body into a JSON object envelope.
pub fn decode_object(bytes: &[u8]) -> Result<Envelope, ProviderError> {
    let value: Value = serde_json::from_slice(bytes)
        .map_err(|e| ProviderError::Decode(format!("response is not valid JSON: {}", e)))?;
    match value {
        Value::Object(map) => Ok(map),
        other => Err(ProviderError::Decode(format!(
            "expected a JSON object, got {}",
            type_name(&other)
        ))),
    }
}

/// Decode a create response and extract the durable handle.
pub fn decode_created(bytes: &[u8]) -> Result<String, ProviderError> {
    let created: CreatedResponse = serde_json::from_slice(bytes).map_err(|_| {
        ProviderError::Decode(format!(
            "unable to find ID in response: {}",
            String::from_utf8_lossy(bytes)
        ))
    })?;
    Ok(created.id.handle())
}

pub(crate) fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// A change to a single attribute during a plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeChange {
    /// The path to the attribute that changed.
    pub path: String,
    /// The value before the change (None if creating).
    pub before: Option<Value>,
    /// The value after the change (None if deleting).
    pub after: Option<Value>,
}

impl AttributeChange {
    /// Create a new attribute change.
    pub fn new(path: impl Into<String>, before: Option<Value>, after: Option<Value>) -> Self {
        Self {
            path: path.into(),
            before,
            after,
        }
    }

    /// Create a change for a new attribute.
    pub fn added(path: impl Into<String>, value: Value) -> Self {
        Self::new(path, None, Some(value))
    }

    /// Create a change for a removed attribute.
    pub fn removed(path: impl Into<String>, value: Value) -> Self {
        Self::new(path, Some(value), None)
    }

    /// Create a change for a modified attribute.
    pub fn modified(path: impl Into<String>, before: Value, after: Value) -> Self {
        Self::new(path, Some(before), Some(after))
    }
}

/// The result of a plan operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanResult {
    /// The planned state after the operation.
    pub planned_state: Value,
    /// The list of attribute changes.
    pub changes: Vec<AttributeChange>,
    /// Whether the resource requires replacement.
    pub requires_replace: bool,
}

impl PlanResult {
    /// Create a plan result with no changes.
    pub fn no_change(state: Value) -> Self {
        Self {
            planned_state: state,
            changes: Vec::new(),
            requires_replace: false,
        }
    }

    /// Create a plan result with changes.
    pub fn with_changes(
        planned_state: Value,
        changes: Vec<AttributeChange>,
        requires_replace: bool,
    ) -> Self {
        Self {
            planned_state,
            changes,
            requires_replace,
        }
    }
}

/// An imported resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportedResource {
    /// The resource type.
    pub resource_type: String,
    /// The imported state.
    pub state: Value,
}

impl ImportedResource {
    /// Create a new imported resource.
    pub fn new(resource_type: impl Into<String>, state: Value) -> Self {
        Self {
            resource_type: resource_type.into(),
            state,
        }
    }
}
