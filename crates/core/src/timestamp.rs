//! Timestamp normalization at the backend boundary.
//!
//! The hosted backend serializes timestamps as RFC 3339 strings, but older
//! documents (and some SDK surfaces) carry epoch milliseconds or a
//! `{seconds, nanos}` object. Everything is normalized to a single
//! `DateTime<Utc>` the moment it is read; nothing downstream re-interprets
//! raw wire values.

use chrono::{DateTime, SecondsFormat, TimeZone, Utc};
use serde_json::Value;

/// Normalize a wire-format timestamp value to `DateTime<Utc>`.
///
/// Accepts:
/// - RFC 3339 strings (`"2024-03-01T10:15:00.000Z"`)
/// - integer or float epoch milliseconds
/// - `{"seconds": i64, "nanos": u32}` objects
///
/// Returns `None` for anything else.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn normalize(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
        Value::Number(n) => {
            let millis = n.as_i64().or_else(|| n.as_f64().map(|f| f as i64))?;
            Utc.timestamp_millis_opt(millis).single()
        }
        Value::Object(map) => {
            let seconds = map.get("seconds").and_then(Value::as_i64)?;
            let nanos = map.get("nanos").and_then(Value::as_u64).unwrap_or(0) as u32;
            Utc.timestamp_opt(seconds, nanos).single()
        }
        _ => None,
    }
}

/// Render a timestamp in the canonical wire format (RFC 3339, millisecond
/// precision, `Z` suffix).
#[must_use]
pub fn to_wire(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Serde adapter for required timestamp fields.
///
/// Use with `#[serde(with = "readymix_core::timestamp::wire")]`.
pub mod wire {
    use chrono::{DateTime, Utc};
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};
    use serde_json::Value;

    /// Serialize as an RFC 3339 string.
    ///
    /// # Errors
    ///
    /// Propagates serializer errors.
    pub fn serialize<S>(dt: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&super::to_wire(*dt))
    }

    /// Deserialize from any recognized wire format.
    ///
    /// # Errors
    ///
    /// Fails when the value is not a recognized timestamp shape.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        super::normalize(&value).ok_or_else(|| D::Error::custom("unrecognized timestamp format"))
    }
}

/// Serde adapter for optional timestamp fields.
///
/// Use with `#[serde(with = "readymix_core::timestamp::wire_opt")]`.
pub mod wire_opt {
    use chrono::{DateTime, Utc};
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};
    use serde_json::Value;

    /// Serialize as an RFC 3339 string, or null when absent.
    ///
    /// # Errors
    ///
    /// Propagates serializer errors.
    pub fn serialize<S>(dt: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match dt {
            Some(dt) => serializer.serialize_str(&super::to_wire(*dt)),
            None => serializer.serialize_none(),
        }
    }

    /// Deserialize from any recognized wire format; null and missing map to
    /// `None`.
    ///
    /// # Errors
    ///
    /// Fails when the value is present but not a recognized timestamp shape.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<Value>::deserialize(deserializer)?;
        match value {
            None | Some(Value::Null) => Ok(None),
            Some(v) => super::normalize(&v)
                .map(Some)
                .ok_or_else(|| D::Error::custom("unrecognized timestamp format")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_normalize_rfc3339() {
        let dt = normalize(&json!("2024-03-01T10:15:00.000Z")).unwrap();
        assert_eq!(to_wire(dt), "2024-03-01T10:15:00.000Z");
    }

    #[test]
    fn test_normalize_rfc3339_with_offset() {
        let dt = normalize(&json!("2024-03-01T12:15:00+02:00")).unwrap();
        assert_eq!(to_wire(dt), "2024-03-01T10:15:00.000Z");
    }

    #[test]
    fn test_normalize_epoch_millis() {
        let dt = normalize(&json!(1_709_287_200_000_i64)).unwrap();
        assert_eq!(to_wire(dt), "2024-03-01T10:00:00.000Z");
    }

    #[test]
    fn test_normalize_seconds_nanos_object() {
        let dt = normalize(&json!({"seconds": 1_709_287_200, "nanos": 500_000_000})).unwrap();
        assert_eq!(to_wire(dt), "2024-03-01T10:00:00.500Z");
    }

    #[test]
    fn test_normalize_rejects_garbage() {
        assert!(normalize(&json!("yesterday")).is_none());
        assert!(normalize(&json!(true)).is_none());
        assert!(normalize(&json!(["2024"])).is_none());
        assert!(normalize(&json!({"sec": 12})).is_none());
    }

    #[test]
    fn test_wire_roundtrip_through_struct() {
        use chrono::{TimeZone, Utc};
        use serde::{Deserialize, Serialize};

        #[derive(Serialize, Deserialize)]
        struct Stamped {
            #[serde(with = "super::wire")]
            at: chrono::DateTime<Utc>,
            #[serde(default, with = "super::wire_opt")]
            maybe: Option<chrono::DateTime<Utc>>,
        }

        let stamped = Stamped {
            at: Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap(),
            maybe: None,
        };
        let json = serde_json::to_value(&stamped).unwrap();
        assert_eq!(json["at"], json!("2024-03-01T10:00:00.000Z"));

        // Millis on the wire still parse
        let parsed: Stamped =
            serde_json::from_value(json!({"at": 1_709_287_200_000_i64})).unwrap();
        assert_eq!(parsed.at, stamped.at);
        assert!(parsed.maybe.is_none());
    }
}
