//! Candidate parsing for free-text search responses.
//!
//! The service answers with a JSON array of candidates, each carrying `lat`
//! and `lon` as decimal strings. Only the first candidate is used.

use gwcal_core::Coordinates;
use serde_json::Value;

use crate::error::ScraperError;

/// Parses a response body, rejecting anything that is not JSON.
pub(crate) fn parse_body(body: &str, query: &str) -> Result<Value, ScraperError> {
    serde_json::from_str::<Value>(body).map_err(|source| ScraperError::Deserialize {
        context: format!("geocode response for \"{query}\""),
        source,
    })
}

/// Coordinates of the first candidate, or `None` for an empty (or non-array)
/// response or a candidate whose coordinates do not parse.
pub(crate) fn first_candidate(value: &Value) -> Option<Coordinates> {
    let candidate = value.as_array()?.first()?;
    let lat = coordinate(candidate.get("lat")?)?;
    let lon = coordinate(candidate.get("lon")?)?;
    Some(Coordinates { lat, lon })
}

fn coordinate(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        Value::Number(n) => n.as_f64()?,
        _ => return None,
    };
    parsed.is_finite().then_some(parsed)
}
