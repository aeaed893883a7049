//! Identifier handling for untyped JSON graphs.

use serde_json::Value;

use crate::error::{GraphViolation, IdError};
use crate::id::{decode, encode, Id};

/// Entity kinds whose `<kind>_id` fields carry identifiers.
///
/// Free-text fields such as `external_id` or `lot_nr` are not identifiers and
/// must pass through untouched.
const ENTITY_KINDS: &[&str] = &["vendor", "filament", "spool"];

/// Whether a JSON object key names an identifier field.
pub fn is_identifier_key(key: &str) -> bool {
    key == "id"
        || key
            .strip_suffix("_id")
            .is_some_and(|kind| ENTITY_KINDS.contains(&kind))
}

/// Rewrite every identifier field in `value` into its string form.
///
/// Walks objects and arrays at any depth. Integer identifiers become strings,
/// string identifiers are validated and canonicalised, `null` is left alone.
/// Anything else in an identifier position fails.
pub fn encode_graph(value: &mut Value) -> Result<(), IdError> {
    match value {
        Value::Array(items) => {
            for item in items {
                encode_graph(item)?;
            }
        }
        Value::Object(map) => {
            for (key, child) in map.iter_mut() {
                if is_identifier_key(key) {
                    encode_identifier(child)?;
                } else {
                    encode_graph(child)?;
                }
            }
        }
        _ => {}
    }
    Ok(())
}

fn encode_identifier(value: &mut Value) -> Result<(), IdError> {
    let id = match value {
        Value::Null => return Ok(()),
        Value::String(text) => decode(text)?,
        Value::Number(n) => match (n.as_i64(), n.as_u64()) {
            (Some(raw), _) => Id::new(raw)?,
            (None, Some(raw)) => {
                return Err(IdError::invalid(raw.to_string(), "identifier out of range"))
            }
            (None, None) => {
                return Err(IdError::invalid(
                    n.to_string(),
                    "floating-point identifier",
                ))
            }
        },
        // Embedded entities sit under `vendor`/`filament`, never under an id key.
        other => {
            return Err(IdError::invalid(
                other.to_string(),
                "identifier must be a string or integer",
            ))
        }
    };
    *value = Value::String(encode(id));
    Ok(())
}

/// Check that every identifier field in `value` is a valid string id.
///
/// Returns the location of the first offending field.
pub fn verify_graph(value: &Value) -> Result<(), GraphViolation> {
    verify_at(value, &mut String::from("$"))
}

fn verify_at(value: &Value, path: &mut String) -> Result<(), GraphViolation> {
    match value {
        Value::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                let len = path.len();
                path.push_str(&format!("[{index}]"));
                verify_at(item, path)?;
                path.truncate(len);
            }
        }
        Value::Object(map) => {
            for (key, child) in map {
                let len = path.len();
                path.push('.');
                path.push_str(key);
                if is_identifier_key(key) {
                    check_identifier(child, path)?;
                } else {
                    verify_at(child, path)?;
                }
                path.truncate(len);
            }
        }
        _ => {}
    }
    Ok(())
}

fn check_identifier(value: &Value, path: &str) -> Result<(), GraphViolation> {
    let found = match value {
        Value::Null => return Ok(()),
        Value::String(text) if decode(text).is_ok() => return Ok(()),
        Value::String(text) => format!("malformed string {text:?}"),
        Value::Number(n) => format!("number {n}"),
        Value::Bool(b) => format!("boolean {b}"),
        Value::Array(_) => "array".to_string(),
        Value::Object(_) => "object".to_string(),
    };
    Err(GraphViolation {
        path: path.to_string(),
        found,
    })
}
