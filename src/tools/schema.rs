//! Argument validation against a tool's JSON schema
//!
//! Covers the subset of JSON Schema used in function declarations:
//! `required`, per-property `type`, string `enum`, and numeric `minimum` /
//! `maximum`. Type names compare case-insensitively so Gemini-style
//! `"STRING"` schemas work too. Unknown keywords and extra properties pass.

use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaViolation {
    #[error("missing required argument '{field}'")]
    MissingRequired { field: String },
    #[error("argument '{field}' should be {expected}, got {found}")]
    WrongType {
        field: String,
        expected: String,
        found: &'static str,
    },
    #[error("argument '{field}' must be one of {allowed}")]
    NotInEnum { field: String, allowed: String },
    #[error("argument '{field}' is out of range ({bound})")]
    OutOfRange { field: String, bound: String },
}

pub fn validate_args(schema: &Value, args: &Map<String, Value>) -> Result<(), SchemaViolation> {
    if let Some(required) = schema.get("required").and_then(Value::as_array) {
        for field in required.iter().filter_map(Value::as_str) {
            if args.get(field).map_or(true, Value::is_null) {
                return Err(SchemaViolation::MissingRequired {
                    field: field.to_string(),
                });
            }
        }
    }

    let Some(properties) = schema.get("properties").and_then(Value::as_object) else {
        return Ok(());
    };

    for (field, value) in args {
        let Some(property) = properties.get(field) else {
            continue;
        };
        if value.is_null() {
            continue;
        }
        check_property(field, property, value)?;
    }

    Ok(())
}

fn check_property(field: &str, property: &Value, value: &Value) -> Result<(), SchemaViolation> {
    if let Some(expected) = property.get("type").and_then(Value::as_str) {
        if !type_matches(expected, value) {
            return Err(SchemaViolation::WrongType {
                field: field.to_string(),
                expected: expected.to_ascii_lowercase(),
                found: json_type(value),
            });
        }
    }

    if let Some(allowed) = property.get("enum").and_then(Value::as_array) {
        if !allowed.contains(value) {
            return Err(SchemaViolation::NotInEnum {
                field: field.to_string(),
                allowed: Value::Array(allowed.clone()).to_string(),
            });
        }
    }

    if let Some(n) = value.as_f64() {
        if let Some(min) = property.get("minimum").and_then(Value::as_f64) {
            if n < min {
                return Err(SchemaViolation::OutOfRange {
                    field: field.to_string(),
                    bound: format!("minimum {min}"),
                });
            }
        }
        if let Some(max) = property.get("maximum").and_then(Value::as_f64) {
            if n > max {
                return Err(SchemaViolation::OutOfRange {
                    field: field.to_string(),
                    bound: format!("maximum {max}"),
                });
            }
        }
    }

    Ok(())
}

fn type_matches(expected: &str, value: &Value) -> bool {
    match expected.to_ascii_lowercase().as_str() {
        "string" => value.is_string(),
        // Models often send whole numbers as floats (5.0)
        "integer" => {
            value.is_i64() || value.is_u64() || value.as_f64().is_some_and(|f| f.fract().abs() < f64::EPSILON)
        }
        "number" => value.is_number(),
        "boolean" => value.is_boolean(),
        "object" => value.is_object(),
        "array" => value.is_array(),
        _ => true,
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
