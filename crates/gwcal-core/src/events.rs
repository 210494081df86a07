//! Calendar event records and the dataset snapshot written at the end of a run.
//!
//! Field names serialize as camelCase because the dataset is read by the map
//! front-end, which expects `fetchedAt`, `locationText`, `lat` and `lon`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One listing as extracted from the calendar page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEvent {
    /// `ev-<index>`, zero-based in document order.
    pub id: String,
    pub name: String,
    /// Free text as shown on the page; may be a single day or a range.
    pub date: String,
    /// `"<city>, <COUNTRY_CODE>"`, either part omitted when missing. Empty
    /// when neither is present.
    pub location_text: String,
    /// Upper-cased code taken from the flag image URL. Not part of the dataset.
    #[serde(skip)]
    pub country_code: Option<String>,
}

impl RawEvent {
    #[must_use]
    pub fn sequence_id(index: usize) -> String {
        format!("ev-{index}")
    }
}

/// WGS84 decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

/// A [`RawEvent`] plus coordinates when geocoding succeeded.
///
/// Missing coordinates are omitted from the JSON entirely, never written as
/// `null` or `0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedEvent {
    #[serde(flatten)]
    pub event: RawEvent,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lon: Option<f64>,
}

impl EnrichedEvent {
    #[must_use]
    pub fn new(event: RawEvent, coordinates: Option<Coordinates>) -> Self {
        Self {
            event,
            lat: coordinates.map(|c| c.lat),
            lon: coordinates.map(|c| c.lon),
        }
    }

    #[must_use]
    pub fn unenriched(event: RawEvent) -> Self {
        Self::new(event, None)
    }

    #[must_use]
    pub fn coordinates(&self) -> Option<Coordinates> {
        match (self.lat, self.lon) {
            (Some(lat), Some(lon)) => Some(Coordinates { lat, lon }),
            _ => None,
        }
    }
}

/// Full-replacement snapshot of one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    #[serde(with = "iso_millis")]
    pub fetched_at: DateTime<Utc>,
    #[serde(default)]
    pub events: Vec<EnrichedEvent>,
}

impl Dataset {
    #[must_use]
    pub fn new(fetched_at: DateTime<Utc>, events: Vec<EnrichedEvent>) -> Self {
        Self { fetched_at, events }
    }
}

/// `2026-10-19T08:00:00.000Z`: UTC, millisecond precision, `Z` suffix.
mod iso_millis {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub(super) fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub(super) fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}
