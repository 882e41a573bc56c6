//! Trigger event validation.

use inspector_suppressor_core::ScanningPolicy;
use serde_json::Value;
use thiserror::Error;

pub const CODE_SCANNING_FIELD: &str = "LambdaCodeScanning";
pub const STANDARD_SCANNING_FIELD: &str = "LambdaStandardScanning";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyError {
    #[error("Missing required scanning configuration in event detail")]
    MissingDetail,
    #[error("Missing required scanning configuration in event detail: {field}")]
    MissingField { field: &'static str },
    #[error("Invalid scanning configuration in event detail: {field} must be a boolean, got {found}")]
    NotBoolean {
        field: &'static str,
        found: &'static str,
    },
}

/// Extracts the desired policy from `{"detail": {"LambdaCodeScanning": .., "LambdaStandardScanning": ..}}`.
///
/// Both fields must be present JSON booleans; `null`, absent and non-boolean values are rejected.
pub fn policy_from_event(event: &Value) -> Result<ScanningPolicy, PolicyError> {
    let Some(detail) = event.get("detail").filter(|detail| detail.is_object()) else {
        return Err(PolicyError::MissingDetail);
    };

    Ok(ScanningPolicy::new(
        required_bool(detail, CODE_SCANNING_FIELD)?,
        required_bool(detail, STANDARD_SCANNING_FIELD)?,
    ))
}

fn required_bool(detail: &Value, field: &'static str) -> Result<bool, PolicyError> {
    match detail.get(field) {
        None | Some(Value::Null) => Err(PolicyError::MissingField { field }),
        Some(Value::Bool(value)) => Ok(*value),
        Some(other) => Err(PolicyError::NotBoolean {
            field,
            found: json_type_name(other),
        }),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
#[path = "tests/policy.rs"]
mod tests;
