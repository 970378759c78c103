//! Serialization back to the upstream wire format.
//!
//! Records serialize with their upstream keys by default. [`WireFields`]
//! carries an explicit table from Rust field name to upstream key so the
//! projection can also emit Rust names, and so absent fields can be dropped
//! independently of the key choice.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WireOptions {
    /// Emit upstream keys (`MemberId`) rather than Rust names (`member_id`).
    pub by_alias: bool,
    /// Omit fields whose value is absent.
    pub exclude_absent: bool,
}

impl WireOptions {
    /// Request parameters: upstream keys, absent fields omitted.
    pub const QUERY: Self = Self {
        by_alias: true,
        exclude_absent: true,
    };

    /// Response round-tripping: upstream keys, every field kept.
    pub const ROUND_TRIP: Self = Self {
        by_alias: true,
        exclude_absent: false,
    };
}

/// Per-field `(rust_name, upstream_key)` table for a record.
pub trait WireFields: Serialize {
    const FIELDS: &'static [(&'static str, &'static str)];

    fn wire_key(name: &str) -> Option<&'static str> {
        Self::FIELDS
            .iter()
            .find(|(field, _)| *field == name)
            .map(|(_, wire)| *wire)
    }

    fn to_wire(&self, options: WireOptions) -> Result<Map<String, Value>, ValidationError> {
        let value = serde_json::to_value(self)
            .map_err(|e| ValidationError::Malformed(format!("serialization failed: {e}")))?;
        let Value::Object(map) = value else {
            return Err(ValidationError::Malformed(
                "record did not serialize to an object".to_string(),
            ));
        };

        let mut out = Map::with_capacity(map.len());
        for (key, mut value) in map {
            if options.exclude_absent {
                if value.is_null() {
                    continue;
                }
                strip_nulls(&mut value);
            }
            let key = if options.by_alias {
                key
            } else {
                Self::FIELDS
                    .iter()
                    .find(|(_, wire)| *wire == key)
                    .map(|(name, _)| name.to_string())
                    .unwrap_or(key)
            };
            out.insert(key, value);
        }
        Ok(out)
    }
}

fn strip_nulls(value: &mut Value) {
    match value {
        Value::Object(map) => {
            map.retain(|_, v| !v.is_null());
            map.values_mut().for_each(strip_nulls);
        }
        Value::Array(items) => items.iter_mut().for_each(strip_nulls),
        _ => {}
    }
}

/// Render a wire map as HTTP query pairs.
///
/// Booleans become lowercase `true`/`false`, lists repeat their key once per
/// element and `null`s are skipped.
pub fn query_pairs(map: &Map<String, Value>) -> Vec<(String, String)> {
    let mut pairs = Vec::with_capacity(map.len());
    for (key, value) in map {
        match value {
            Value::Array(items) => {
                for item in items {
                    if let Some(rendered) = render_scalar(item) {
                        pairs.push((key.clone(), rendered));
                    }
                }
            }
            other => {
                if let Some(rendered) = render_scalar(other) {
                    pairs.push((key.clone(), rendered));
                }
            }
        }
    }
    pairs
}

fn render_scalar(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::Bool(b) => Some(if *b { "true" } else { "false" }.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) => Some(s.clone()),
        nested => Some(nested.to_string()),
    }
}

/// Shorthand for the usual request-parameter path.
pub fn to_query<T: WireFields>(params: &T) -> Result<Vec<(String, String)>, ValidationError> {
    Ok(query_pairs(&params.to_wire(WireOptions::QUERY)?))
}
