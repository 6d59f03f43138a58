//! Documents and collection queries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use readymix_core::timestamp;

/// Reserved field names stamped by the service.
pub mod fields {
    /// Server-assigned creation time, set once on create.
    pub const CREATED_AT: &str = "created_at";
    /// Server-assigned modification time, refreshed on every write.
    pub const UPDATED_AT: &str = "updated_at";
}

/// A document as delivered by the backend: its assigned identifier plus the
/// raw JSON field map.
///
/// Field values are untyped here; the store layer converts them into domain
/// entities (and normalizes timestamps) immediately on read.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    /// Backend-assigned identifier, unique within the collection.
    pub id: String,
    /// Raw document fields.
    pub fields: Map<String, Value>,
}

impl Document {
    /// Server-assigned creation timestamp, if present and well-formed.
    #[must_use]
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.fields.get(fields::CREATED_AT).and_then(timestamp::normalize)
    }

    /// Server-assigned modification timestamp, if present and well-formed.
    #[must_use]
    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.fields.get(fields::UPDATED_AT).and_then(timestamp::normalize)
    }

    /// Flatten into a single JSON object with the `id` injected, the shape
    /// the store layer deserializes domain entities from.
    #[must_use]
    pub fn into_value(self) -> Value {
        let mut map = self.fields;
        map.insert("id".to_owned(), Value::String(self.id));
        Value::Object(map)
    }
}

/// Sort direction for ordered listings and subscriptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderDirection {
    Ascending,
    Descending,
}

impl OrderDirection {
    /// Wire token used in query strings.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ascending => "asc",
            Self::Descending => "desc",
        }
    }
}

/// An ordered view over one collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionQuery {
    /// Collection name, e.g. `"inquiries"`.
    pub collection: String,
    /// Field the listing is ordered by, e.g. `"created_at"`.
    pub order_by: String,
    /// Sort direction.
    pub direction: OrderDirection,
}

impl CollectionQuery {
    /// Convenience constructor.
    #[must_use]
    pub fn new(
        collection: impl Into<String>,
        order_by: impl Into<String>,
        direction: OrderDirection,
    ) -> Self {
        Self {
            collection: collection.into(),
            order_by: order_by.into(),
            direction,
        }
    }
}

/// Compare two wire field values for ordering purposes.
///
/// Timestamps compare chronologically whatever wire shape they use; numbers
/// compare numerically; everything else falls back to string comparison.
/// Missing values sort first in ascending order.
#[must_use]
pub fn compare_wire_values(a: Option<&Value>, b: Option<&Value>) -> std::cmp::Ordering {
    use std::cmp::Ordering;

    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => {
            if let (Some(ta), Some(tb)) = (timestamp::normalize(a), timestamp::normalize(b)) {
                return ta.cmp(&tb);
            }
            if let (Some(na), Some(nb)) = (a.as_f64(), b.as_f64()) {
                return na.partial_cmp(&nb).unwrap_or(Ordering::Equal);
            }
            a.to_string().cmp(&b.to_string())
        }
    }
}
