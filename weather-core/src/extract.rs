//! Pulls the current conditions out of a weatherstack response.
//!
//! Expected shape:
//!
//! ```text
//! { "request": ..., "location": ...,
//!   "current": { "weather_descriptions": ["Sunny"], "wind_dir": "N",
//!                "precip": 0, "temperature": 18, ... } }
//! ```

use serde_json::{Map, Value};
use tracing::debug;

use crate::{
    error::{JsonKind, TransactionError},
    model::WeatherReading,
    payload::ParsedDocument,
};

const CURRENT: &str = "current";
const WEATHER_DESCRIPTIONS: &str = "weather_descriptions";
const WIND_DIR: &str = "wind_dir";
const PRECIP: &str = "precip";
const TEMPERATURE: &str = "temperature";

/// Extracts a [`WeatherReading`], consuming the document.
///
/// Stops at the first missing or mistyped field. The document is dropped
/// when this returns, whatever the outcome.
pub fn extract_reading(document: ParsedDocument) -> Result<WeatherReading, TransactionError> {
    let current = object_field(document.root(), CURRENT)?;

    let conditions = first_description(current)?;
    let wind_direction = string_field(current, WIND_DIR)?;
    let precipitation_percent = integer_field(current, PRECIP)?;
    let temperature_celsius = integer_field(current, TEMPERATURE)?;

    debug!(%conditions, %wind_direction, precipitation_percent, temperature_celsius, "extracted reading");

    Ok(WeatherReading {
        conditions,
        wind_direction,
        precipitation_percent,
        temperature_celsius,
    })
}

fn object_field<'a>(
    value: &'a Value,
    field: &'static str,
) -> Result<&'a Map<String, Value>, TransactionError> {
    // A root that is not an object cannot hold the key either.
    let value = value
        .as_object()
        .and_then(|obj| obj.get(field))
        .ok_or(TransactionError::FieldMissing(field))?;

    value.as_object().ok_or(TransactionError::FieldTypeMismatch {
        field,
        expected: JsonKind::Object,
    })
}

fn lookup<'a>(
    object: &'a Map<String, Value>,
    field: &'static str,
) -> Result<&'a Value, TransactionError> {
    object.get(field).ok_or(TransactionError::FieldMissing(field))
}

fn first_description(current: &Map<String, Value>) -> Result<String, TransactionError> {
    let descriptions = lookup(current, WEATHER_DESCRIPTIONS)?
        .as_array()
        .ok_or(TransactionError::FieldTypeMismatch {
            field: WEATHER_DESCRIPTIONS,
            expected: JsonKind::Array,
        })?;

    let first = descriptions
        .first()
        .ok_or(TransactionError::FieldMissing(WEATHER_DESCRIPTIONS))?;

    first
        .as_str()
        .map(str::to_owned)
        .ok_or(TransactionError::FieldTypeMismatch {
            field: WEATHER_DESCRIPTIONS,
            expected: JsonKind::String,
        })
}

fn string_field(
    current: &Map<String, Value>,
    field: &'static str,
) -> Result<String, TransactionError> {
    lookup(current, field)?
        .as_str()
        .map(str::to_owned)
        .ok_or(TransactionError::FieldTypeMismatch {
            field,
            expected: JsonKind::String,
        })
}

fn integer_field(
    current: &Map<String, Value>,
    field: &'static str,
) -> Result<i32, TransactionError> {
    lookup(current, field)?
        .as_f64()
        .map(saturating_int)
        .ok_or(TransactionError::FieldTypeMismatch {
            field,
            expected: JsonKind::Number,
        })
}

/// Truncates toward zero and clamps to the `i32` range.
fn saturating_int(n: f64) -> i32 {
    n as i32
}
