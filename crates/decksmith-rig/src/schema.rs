//! JSON schema generation and validation.
//!
//! Schemas are generated from Rust types via `schemars` and enforced with
//! `jsonschema` before a model response is deserialised.

use decksmith_core::{Error, Result};
use jsonschema::Validator;
use schemars::JsonSchema;
use schemars::generate::SchemaSettings;
use serde_json::Value;

/// Generates the draft-07 JSON schema for `T`.
pub fn schema_for<T: JsonSchema>() -> Result<Value> {
    let mut generator = SchemaSettings::draft07().into_generator();
    let schema = generator.root_schema_for::<T>();
    serde_json::to_value(&schema).map_err(|e| {
        Error::internal()
            .with_message(format!("failed to serialize schema: {e}"))
            .with_source(e)
    })
}

/// Compiled schema used to validate model output.
pub struct SchemaValidator {
    validator: Validator,
}

impl SchemaValidator {
    /// Compiles a schema.
    pub fn new(schema: &Value) -> Result<Self> {
        let validator = Validator::new(schema)
            .map_err(|e| Error::internal().with_message(format!("invalid JSON schema: {e}")))?;
        Ok(Self { validator })
    }

    /// Returns every validation error for `data`.
    pub fn errors(&self, data: &Value) -> Vec<String> {
        self.validator
            .iter_errors(data)
            .map(|e| e.to_string())
            .collect()
    }

    /// Fails with an `invalid_response` error listing schema violations.
    pub fn check(&self, data: &Value) -> Result<()> {
        let errors = self.errors(data);
        if errors.is_empty() {
            return Ok(());
        }

        Err(Error::invalid_response().with_message(format!(
            "response does not match schema: {}",
            errors.join("; ")
        )))
    }
}

impl std::fmt::Debug for SchemaValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaValidator").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use schemars::JsonSchema;
    use serde::Deserialize;
    use serde_json::json;

    use super::*;

    #[allow(dead_code)]
    #[derive(Debug, Deserialize, JsonSchema)]
    struct TestSlide {
        title: String,
        items: Vec<String>,
    }

    #[test]
    fn valid_object_passes() {
        let schema = schema_for::<TestSlide>().unwrap();
        let validator = SchemaValidator::new(&schema).unwrap();
        assert!(
            validator
                .check(&json!({"title": "Plan", "items": ["a"]}))
                .is_ok()
        );
    }

    #[test]
    fn missing_required_field_fails() {
        let schema = schema_for::<TestSlide>().unwrap();
        let validator = SchemaValidator::new(&schema).unwrap();
        let error = validator.check(&json!({"title": "Plan"})).unwrap_err();
        assert_eq!(error.kind(), decksmith_core::ErrorKind::InvalidResponse);
    }

    #[test]
    fn type_mismatch_fails() {
        let schema = schema_for::<TestSlide>().unwrap();
        let validator = SchemaValidator::new(&schema).unwrap();
        assert!(!validator.errors(&json!({"title": 1, "items": []})).is_empty());
    }
}
