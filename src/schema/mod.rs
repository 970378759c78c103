//! Schema layer: typed contracts for every upstream resource.
//!
//! Upstream JSON is loosely typed and inconsistently cased. Every record in
//! this module declares its upstream key with `#[serde(rename = ..)]` and its
//! Rust field name with `#[serde(alias = ..)]`, so both spellings are
//! accepted on input. [`normalize`] is the single entry point that turns raw
//! JSON into a validated record:
//!
//! 1. every string value that is literally `"None"` becomes `null`
//! 2. serde decodes the record (unknown keys are ignored)
//! 3. [`Validate::validate`] checks ranges and cross-field constraints
//!
//! The reverse direction lives in [`wire`].

pub mod companies;
pub mod debates;
pub mod envelope;
pub mod interests;
pub mod members;
pub mod timestamp;
pub mod wire;

pub use envelope::{Item, Link, SearchResult};
pub use wire::{query_pairs, to_query, WireFields, WireOptions};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::ValidationError;

/// Upstream serializes some nulls as this literal string.
pub const NONE_SENTINEL: &str = "None";

/// Structural constraints checked after decoding.
pub trait Validate {
    fn validate(&self) -> Result<(), ValidationError> {
        Ok(())
    }
}

impl<T: Validate> Validate for Option<T> {
    fn validate(&self) -> Result<(), ValidationError> {
        match self {
            Some(inner) => inner.validate(),
            None => Ok(()),
        }
    }
}

impl<T: Validate> Validate for Vec<T> {
    fn validate(&self) -> Result<(), ValidationError> {
        self.iter().try_for_each(Validate::validate)
    }
}

/// Implements [`Validate`] with no constraints for records that carry none.
macro_rules! unconstrained {
    ($($ty:ty),+ $(,)?) => {
        $(impl $crate::schema::Validate for $ty {})+
    };
}
pub(crate) use unconstrained;

/// Decode and validate `raw` as `T`.
pub fn normalize<T>(mut raw: Value) -> Result<T, ValidationError>
where
    T: DeserializeOwned + Validate,
{
    scrub_none_sentinels(&mut raw);
    let record: T = serde_json::from_value(raw).map_err(classify_decode_error)?;
    record.validate()?;
    Ok(record)
}

/// Strip every `"None"` sentinel from the tree, in place.
///
/// An object member holding the sentinel is removed, so serde sees the key as
/// absent: required fields then report `missing field` and defaulted fields
/// take their default. Array elements and a bare sentinel become `null`.
pub fn scrub_none_sentinels(value: &mut Value) {
    match value {
        Value::String(s) if s == NONE_SENTINEL => *value = Value::Null,
        Value::Array(items) => items.iter_mut().for_each(scrub_none_sentinels),
        Value::Object(map) => {
            map.retain(|_, v| !is_sentinel(v));
            map.values_mut().for_each(scrub_none_sentinels);
        }
        _ => {}
    }
}

fn is_sentinel(value: &Value) -> bool {
    matches!(value, Value::String(s) if s == NONE_SENTINEL)
}

fn classify_decode_error(err: serde_json::Error) -> ValidationError {
    let message = err.to_string();
    if let Some(rest) = message.strip_prefix("missing field `") {
        if let Some(end) = rest.find('`') {
            return ValidationError::MissingRequiredField(rest[..end].to_string());
        }
    }
    ValidationError::Malformed(message)
}

/// Deserialize `null` (or an absent key, with `#[serde(default)]`) as `T::default()`.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Range check shared by every paging parameter.
pub(crate) fn check_range(
    field: &'static str,
    value: i64,
    min: i64,
    max: i64,
) -> Result<(), ValidationError> {
    if value < min || value > max {
        return Err(ValidationError::OutOfRange {
            field,
            value,
            min,
            max,
        });
    }
    Ok(())
}

pub(crate) fn check_min(field: &'static str, value: i64, min: i64) -> Result<(), ValidationError> {
    check_range(field, value, min, i64::MAX)
}

pub(crate) fn check_required_text(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::MissingRequiredField(field.to_string()));
    }
    Ok(())
}
