//! Output schema for point decisions.

use jsonschema::Validator;
use serde_json::{json, Value};

use crate::error::{PointlessError, PointlessResult};
use crate::models::PointerResponse;

/// Schema name sent to providers that require one.
pub const SCHEMA_NAME: &str = "point_estimate";

/// JSON schema of a [`PointerResponse`].
pub fn pointer_response_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "points": {
                "type": "number",
                "description": "The points assigned to the story"
            },
            "explanation": {
                "type": "string",
                "description": "Explanation of why these points were assigned"
            }
        },
        "required": ["points", "explanation"],
        "additionalProperties": false
    })
}

/// A compiled output schema.
pub struct OutputSchema {
    name: &'static str,
    schema: Value,
    validator: Validator,
}

impl OutputSchema {
    /// Schema for point decisions.
    ///
    /// # Errors
    ///
    /// Returns an error if the schema fails to compile.
    pub fn pointer_response() -> PointlessResult<Self> {
        let schema = pointer_response_schema();
        let validator = Validator::new(&schema)
            .map_err(|e| PointlessError::InvalidResponse(format!("invalid output schema: {e}")))?;

        Ok(Self {
            name: SCHEMA_NAME,
            schema,
            validator,
        })
    }

    /// Schema name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Raw JSON schema.
    pub fn schema(&self) -> &Value {
        &self.schema
    }

    /// Check a value against the schema, reporting every violation.
    ///
    /// # Errors
    ///
    /// Returns [`PointlessError::InvalidResponse`] listing the violations.
    pub fn validate(&self, value: &Value) -> PointlessResult<()> {
        let errors: Vec<String> = self
            .validator
            .iter_errors(value)
            .map(|error| {
                let path = error.instance_path.to_string();
                if path.is_empty() {
                    error.to_string()
                } else {
                    format!("{path}: {error}")
                }
            })
            .collect();

        if errors.is_empty() {
            Ok(())
        } else {
            Err(PointlessError::InvalidResponse(errors.join("; ")))
        }
    }

    /// Validate and decode a model's output.
    ///
    /// # Errors
    ///
    /// Returns [`PointlessError::InvalidResponse`] if the value does not match
    /// the schema or the points are negative or not finite.
    pub fn parse(&self, value: Value) -> PointlessResult<PointerResponse> {
        self.validate(&value)?;
        let response: PointerResponse = serde_json::from_value(value)?;

        if !response.points.is_finite() || response.points < 0.0 {
            return Err(PointlessError::InvalidResponse(format!(
                "points must be a non-negative number, got {}",
                response.points
            )));
        }

        Ok(response)
    }
}

impl std::fmt::Debug for OutputSchema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutputSchema")
            .field("name", &self.name)
            .field("schema", &self.schema)
            .finish_non_exhaustive()
    }
}
