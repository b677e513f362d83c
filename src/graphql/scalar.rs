//! Date custom scalar
//!
//! Wire representation is a signed integer of milliseconds since the Unix
//! epoch, for both literals and variables. Any other literal kind coerces to
//! an absent value rather than an input error, so a malformed timestamp
//! propagates as a null field instead of aborting the query.

use async_graphql::{InputValueResult, Scalar, ScalarType, Value};
use chrono::{DateTime, Utc};

/// Convert a wire value into the internal temporal representation.
/// `None` only for millisecond values outside chrono's representable range.
pub fn parse_input(millis: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp_millis(millis)
}

/// Convert the internal temporal representation back to wire millis.
/// Lossless: `parse_input(serialize_output(x)) == Some(x)` for every value
/// produced by [`parse_input`].
pub fn serialize_output(value: &DateTime<Utc>) -> i64 {
    value.timestamp_millis()
}

/// Coerce a literal or variable value. Integer numbers parse; every other
/// kind yields `None`, never an error.
pub fn parse_literal(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::Number(n) => n.as_i64().and_then(parse_input),
        _ => None,
    }
}

/// Publication instant of a book as it crosses the wire.
///
/// The inner `Option` is the "coercion produced no value" state; it
/// serializes to null.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Date(pub Option<DateTime<Utc>>);

/// Date custom scalar type
#[Scalar]
impl ScalarType for Date {
    fn parse(value: Value) -> InputValueResult<Self> {
        Ok(Date(parse_literal(&value)))
    }

    fn to_value(&self) -> Value {
        match &self.0 {
            Some(instant) => Value::Number(serialize_output(instant).into()),
            None => Value::Null,
        }
    }
}
