//! Turns a provider's raw reply into validated dialogue events.
//!
//! Providers are loose about the shape they return: replies arrive fenced in
//! Markdown, wrapped in an object, or with quotes escaped twice. Everything
//! here undoes those habits and then checks each element against
//! [`DialogueEvent`]. Nothing is coerced: a reply that cannot be read as a
//! script fails as a whole.

use serde_json::{Map, Value};

use super::{DialogueEvent, is_well_formed_target};
use crate::error::FormatError;

/// Wrapper keys checked before falling back to the first array-valued property.
const WRAPPER_KEYS: [&str; 4] = ["dialogues", "data", "result", "content"];

/// Fields whose over-escaped quotes are restored.
const SANITIZED_FIELDS: [&str; 3] = ["text", "question", "speaker"];

pub fn normalize(raw: &str) -> Result<Vec<DialogueEvent>, FormatError> {
    let json_text = strip_fences(raw);
    let value: Value = serde_json::from_str(json_text).map_err(FormatError::Unparseable)?;

    let mut items = unwrap(value)?;

    let before = Value::Array(items.clone());
    tracing::debug!(events = items.len(), before = %before, "sanitizing");
    items.iter_mut().for_each(sanitize);
    let after = Value::Array(items.clone());
    tracing::debug!(after = %after, "sanitized");

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            let event: DialogueEvent = serde_json::from_value(item)
                .map_err(|source| FormatError::InvalidEvent { index, source })?;
            event.validate(index)?;
            warn_on_malformed_targets(index, &event);
            Ok(event)
        })
        .collect()
}

/// Removes a surrounding Markdown code fence, with or without a `json` tag.
fn strip_fences(raw: &str) -> &str {
    let text = raw.trim();
    let text = match text.strip_prefix("```") {
        Some(rest) => match rest.get(..4) {
            Some(tag) if tag.eq_ignore_ascii_case("json") => &rest[4..],
            _ => rest,
        },
        None => text,
    };
    let text = text.trim_end();
    text.strip_suffix("```").unwrap_or(text).trim()
}

fn unwrap(value: Value) -> Result<Vec<Value>, FormatError> {
    match value {
        Value::Array(items) => Ok(items),
        Value::Object(map) => unwrap_object(map),
        other => Err(FormatError::ExpectedArray(kind(&other))),
    }
}

fn unwrap_object(mut map: Map<String, Value>) -> Result<Vec<Value>, FormatError> {
    let known = WRAPPER_KEYS
        .iter()
        .find(|key| map.get(**key).is_some_and(Value::is_array))
        .map(|key| (*key).to_owned());
    let key = match known {
        Some(key) => {
            tracing::debug!(key = %key, "unwrapping known wrapper key");
            key
        }
        None => {
            let key = map
                .iter()
                .find(|(_, value)| value.is_array())
                .map(|(key, _)| key.clone())
                .ok_or(FormatError::NoArrayFound)?;
            tracing::debug!(key = %key, "unwrapping first array-valued property");
            key
        }
    };

    match map.remove(&key) {
        Some(Value::Array(items)) => Ok(items),
        _ => Err(FormatError::NoArrayFound),
    }
}

fn sanitize(item: &mut Value) {
    let Value::Object(fields) = item else {
        return;
    };
    for field in SANITIZED_FIELDS {
        if let Some(Value::String(text)) = fields.get_mut(field) {
            // Each pass drops one backslash in front of a quote.
            while text.contains("\\\"") {
                *text = text.replace("\\\"", "\"");
            }
        }
    }
}

fn warn_on_malformed_targets(index: usize, event: &DialogueEvent) {
    if let DialogueEvent::Choice {
        target_sequences, ..
    } = event
    {
        for target in target_sequences
            .iter()
            .filter(|target| !is_well_formed_target(target))
        {
            tracing::warn!(
                index,
                target = %target,
                "target sequence is not <SCENE>/<SEQUENCE><LETTER>"
            );
        }
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
