//! Output schemas
//!
//! A [`Schema`] turns the loosely typed JSON produced by a model into a typed
//! value, rejecting values that do not conform.

use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;
use std::marker::PhantomData;

use crate::error::ModelError;

/// Validates model output and exposes the JSON schema sent to the model.
pub trait Schema: Send + Sync {
    type Output: Send + 'static;

    /// Check `value` and convert it, or describe why it does not conform.
    fn validate(&self, value: &Value) -> Result<Self::Output, String>;

    /// JSON schema description of the expected value.
    fn json_schema(&self) -> Value;
}

/// Accepts any JSON value unchanged.
#[derive(Debug, Clone, Default)]
pub struct UncheckedSchema {
    json_schema: Value,
}

impl UncheckedSchema {
    pub fn new(json_schema: Value) -> Self {
        Self { json_schema }
    }
}

impl Schema for UncheckedSchema {
    type Output = Value;

    fn validate(&self, value: &Value) -> Result<Value, String> {
        Ok(value.clone())
    }

    fn json_schema(&self) -> Value {
        self.json_schema.clone()
    }
}

/// Validates by deserializing into `T` with serde.
pub struct SerdeSchema<T> {
    json_schema: Value,
    _marker: PhantomData<fn() -> T>,
}

impl<T> SerdeSchema<T> {
    pub fn new(json_schema: Value) -> Self {
        Self {
            json_schema,
            _marker: PhantomData,
        }
    }
}

impl<T> Clone for SerdeSchema<T> {
    fn clone(&self) -> Self {
        Self::new(self.json_schema.clone())
    }
}

impl<T> fmt::Debug for SerdeSchema<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SerdeSchema")
            .field("type", &std::any::type_name::<T>())
            .field("json_schema", &self.json_schema)
            .finish()
    }
}

impl<T> Schema for SerdeSchema<T>
where
    T: DeserializeOwned + Send + 'static,
{
    type Output = T;

    fn validate(&self, value: &Value) -> Result<T, String> {
        T::deserialize(value).map_err(|e| e.to_string())
    }

    fn json_schema(&self) -> Value {
        self.json_schema.clone()
    }
}

/// Validates against a compiled JSON schema and returns the value unchanged.
pub struct JsonSchema {
    json_schema: Value,
    validator: jsonschema::Validator,
}

impl JsonSchema {
    pub fn new(json_schema: Value) -> Result<Self, ModelError> {
        let validator = jsonschema::validator_for(&json_schema)
            .map_err(|e| ModelError::InvalidConfiguration(format!("Invalid JSON Schema: {e}")))?;
        Ok(Self {
            json_schema,
            validator,
        })
    }
}

impl fmt::Debug for JsonSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonSchema")
            .field("json_schema", &self.json_schema)
            .finish()
    }
}

impl Schema for JsonSchema {
    type Output = Value;

    fn validate(&self, value: &Value) -> Result<Value, String> {
        let messages: Vec<String> = self
            .validator
            .iter_errors(value)
            .take(3)
            .map(|err| format!("{} at {}", err, err.instance_path))
            .collect();
        if messages.is_empty() {
            Ok(value.clone())
        } else {
            Err(messages.join("; "))
        }
    }

    fn json_schema(&self) -> Value {
        self.json_schema.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize, PartialEq)]
    struct City {
        name: String,
        population: u64,
    }

    #[test]
    fn serde_schema_validates() {
        let schema = SerdeSchema::<City>::new(json!({"type": "object"}));
        assert_eq!(
            schema.validate(&json!({"name": "Oslo", "population": 700000})),
            Ok(City {
                name: "Oslo".into(),
                population: 700_000
            })
        );
        assert!(schema.validate(&json!({"name": "Oslo"})).is_err());
        assert_eq!(schema.json_schema(), json!({"type": "object"}));
    }

    #[test]
    fn unchecked_accepts_anything() {
        let schema = UncheckedSchema::default();
        assert_eq!(schema.validate(&json!([1, "x"])), Ok(json!([1, "x"])));
    }

    #[test]
    fn json_schema_reports_violations() {
        let schema = JsonSchema::new(json!({
            "type": "object",
            "properties": { "age": { "type": "integer" } },
            "required": ["age"]
        }))
        .unwrap();

        assert_eq!(schema.validate(&json!({"age": 3})), Ok(json!({"age": 3})));
        let message = schema.validate(&json!({"age": "three"})).unwrap_err();
        assert!(message.contains("/age"), "{message}");
        assert!(schema.validate(&json!({})).is_err());
    }

    #[test]
    fn invalid_json_schema_is_rejected() {
        let err = JsonSchema::new(json!({"type": 12})).unwrap_err();
        assert!(matches!(err, ModelError::InvalidConfiguration(_)));
    }
}
