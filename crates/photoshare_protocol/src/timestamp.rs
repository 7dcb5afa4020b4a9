/*
 * SPDX-FileCopyrightText: 2026 Photoshare Project
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::time::{SystemTime, UNIX_EPOCH};

/// Numbers at or below this magnitude are epoch seconds, above it epoch milliseconds.
pub const SECONDS_MAGNITUDE_MAX: f64 = 1e12;

/// Point in time as epoch milliseconds.
///
/// Serializes as a plain integer. Deserializes from any of the shapes stored
/// documents carry (see [`normalize_millis`]), so a record written by an older
/// client with `{seconds, nanoseconds}` reads the same as one written with epoch ms.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(i64);

impl Timestamp {
    pub const EPOCH: Timestamp = Timestamp(0);

    pub fn from_millis(ms: i64) -> Self {
        Self(ms)
    }

    pub fn as_millis(self) -> i64 {
        self.0
    }

    pub fn now() -> Self {
        Self::from(SystemTime::now())
    }

    pub fn from_value(v: &Value) -> Self {
        Self(normalize_millis(v))
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(v: DateTime<Utc>) -> Self {
        Self(v.timestamp_millis())
    }
}

impl From<SystemTime> for Timestamp {
    fn from(v: SystemTime) -> Self {
        let ms = v
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as i64;
        Self(ms)
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.0)
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let v = Value::deserialize(deserializer)?;
        Ok(Self::from_value(&v))
    }
}

/// Epoch milliseconds for an optional timestamp, missing maps to 0 (oldest).
pub fn millis_or_epoch(ts: Option<Timestamp>) -> i64 {
    ts.map(Timestamp::as_millis).unwrap_or(0)
}

/// Normalizes every timestamp representation found in stored documents to epoch ms.
///
/// Accepted shapes:
/// - RFC 3339 strings (serialized native dates)
/// - store timestamp objects: `{seconds, nanoseconds}` or `{_seconds, _nanoseconds}`
/// - bare `{seconds}` objects
/// - numbers, epoch ms or epoch s (values `<= 1e12` are seconds)
/// - numeric strings, with the same magnitude rule
///
/// Anything else, including `null`, is 0.
pub fn normalize_millis(v: &Value) -> i64 {
    match v {
        Value::Number(n) => n.as_f64().map(number_to_millis).unwrap_or(0),
        Value::String(s) => string_to_millis(s),
        Value::Object(map) => {
            let secs = map
                .get("seconds")
                .or_else(|| map.get("_seconds"))
                .and_then(Value::as_f64);
            let Some(secs) = secs else { return 0 };
            if !secs.is_finite() {
                return 0;
            }
            let nanos = map
                .get("nanoseconds")
                .or_else(|| map.get("_nanoseconds"))
                .and_then(Value::as_f64)
                .filter(|n| n.is_finite())
                .unwrap_or(0.0);
            (secs * 1000.0 + nanos / 1_000_000.0).floor() as i64
        }
        _ => 0,
    }
}

fn number_to_millis(n: f64) -> i64 {
    if !n.is_finite() {
        return 0;
    }
    if n <= SECONDS_MAGNITUDE_MAX {
        (n * 1000.0).round() as i64
    } else {
        n.round() as i64
    }
}

fn string_to_millis(s: &str) -> i64 {
    let s = s.trim();
    if s.is_empty() {
        return 0;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return dt.timestamp_millis();
    }
    s.parse::<f64>().map(number_to_millis).unwrap_or(0)
}
