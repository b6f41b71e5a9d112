//! Tool argument validation against a tool's `inputSchema`
//!
//! 지원 키워드: `type`, `required`, `properties`, `additionalProperties: false`,
//! `enum`, `items`. 그 외 키워드는 무시합니다.

use serde_json::{Map, Value};

/// 인자 검증. 실패 시 `$.path: 이유`
pub fn validate_arguments(schema: &Value, args: &Value) -> Result<(), String> {
    validate(schema, args, "$")
}

fn validate(schema: &Value, value: &Value, path: &str) -> Result<(), String> {
    let Some(schema) = schema.as_object() else {
        return Ok(());
    };

    if let Some(expected) = schema.get("type") {
        check_type(expected, value, path)?;
    }

    if let Some(allowed) = schema.get("enum").and_then(Value::as_array) {
        if !allowed.contains(value) {
            return Err(format!("{}: value {} is not one of {}", path, value, Value::Array(allowed.clone())));
        }
    }

    if let Some(obj) = value.as_object() {
        validate_object(schema, obj, path)?;
    }

    if let (Some(items), Some(array)) = (schema.get("items"), value.as_array()) {
        for (i, item) in array.iter().enumerate() {
            validate(items, item, &format!("{}[{}]", path, i))?;
        }
    }

    Ok(())
}

fn validate_object(schema: &Map<String, Value>, obj: &Map<String, Value>, path: &str) -> Result<(), String> {
    if let Some(required) = schema.get("required").and_then(Value::as_array) {
        for key in required.iter().filter_map(Value::as_str) {
            if !obj.contains_key(key) {
                return Err(format!("{}: missing required property '{}'", path, key));
            }
        }
    }

    let properties = schema.get("properties").and_then(Value::as_object);
    if let Some(properties) = properties {
        for (key, sub) in properties {
            if let Some(v) = obj.get(key) {
                validate(sub, v, &format!("{}.{}", path, key))?;
            }
        }
    }

    if schema.get("additionalProperties") == Some(&Value::Bool(false)) {
        for key in obj.keys() {
            if !properties.is_some_and(|p| p.contains_key(key)) {
                return Err(format!("{}: unexpected property '{}'", path, key));
            }
        }
    }

    Ok(())
}

fn check_type(expected: &Value, value: &Value, path: &str) -> Result<(), String> {
    let matches = match expected {
        Value::String(t) => type_matches(t, value),
        Value::Array(types) => types
            .iter()
            .filter_map(Value::as_str)
            .any(|t| type_matches(t, value)),
        _ => true,
    };

    if matches {
        Ok(())
    } else {
        Err(format!("{}: expected {}, got {}", path, expected, type_name(value)))
    }
}

fn type_matches(expected: &str, value: &Value) -> bool {
    match expected {
        "object" => value.is_object(),
        "array" => value.is_array(),
        "string" => value.is_string(),
        "boolean" => value.is_boolean(),
        "null" => value.is_null(),
        "number" => value.is_number(),
        "integer" => {
            value.is_i64() || value.is_u64() || value.as_f64().is_some_and(|f| f.fract() == 0.0)
        }
        // 모르는 타입은 통과
        _ => true,
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
