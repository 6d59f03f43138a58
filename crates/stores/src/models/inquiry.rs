//! Customer inquiries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use readymix_backend::Document;
use readymix_core::{Email, InquiryId, InquiryStatus, Priority, timestamp};

use crate::error::ValidationError;

/// A customer inquiry as read back from the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Inquiry {
    pub id: InquiryId,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub message: String,
    #[serde(default)]
    pub status: InquiryStatus,
    #[serde(default)]
    pub priority: Priority,
    #[serde(with = "timestamp::wire")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "timestamp::wire")]
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Inquiry {
    /// Convert a backend document into an inquiry.
    ///
    /// # Errors
    ///
    /// Fails when the document is missing required fields or carries
    /// malformed values; the sync layer skips such documents with a
    /// warning rather than failing the whole snapshot.
    pub fn from_document(document: Document) -> Result<Self, serde_json::Error> {
        serde_json::from_value(document.into_value())
    }
}

/// A public contact-form submission.
///
/// Status and priority are not part of this type at all: every new inquiry
/// is persisted as `not_contacted` / `medium` whatever the caller intended.
#[derive(Debug, Clone, Deserialize)]
pub struct NewInquiry {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub message: String,
}

impl NewInquiry {
    /// Check the create-side invariants.
    pub(crate) fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::MissingField { field: "name" });
        }
        if self.message.trim().is_empty() {
            return Err(ValidationError::MissingField { field: "message" });
        }
        Email::parse(self.email.trim())?;
        Ok(())
    }

    /// Wire fields for the create call, with the forced defaults applied.
    /// Timestamps are stamped server-side.
    pub(crate) fn into_fields(self) -> Map<String, Value> {
        let mut fields = Map::new();
        fields.insert("name".into(), Value::String(self.name.trim().to_owned()));
        fields.insert(
            "email".into(),
            Value::String(self.email.trim().to_lowercase()),
        );
        if let Some(phone) = self.phone.as_deref().map(str::trim).filter(|p| !p.is_empty()) {
            fields.insert("phone".into(), Value::String(phone.to_owned()));
        }
        fields.insert(
            "message".into(),
            Value::String(self.message.trim().to_owned()),
        );
        fields.insert(
            "status".into(),
            Value::String(InquiryStatus::NotContacted.to_string()),
        );
        fields.insert(
            "priority".into(),
            Value::String(Priority::Medium.to_string()),
        );
        fields
    }
}

/// Partial update to an inquiry.
///
/// Only set fields are written; the backend merges them and refreshes
/// `updated_at`. The store applies no field whitelist beyond this shape -
/// the service's rules have the final say.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InquiryPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<InquiryStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl InquiryPatch {
    /// Wire fields for the merge call; unset fields are simply absent.
    pub(crate) fn into_fields(self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        }
    }

    /// Whether the patch changes anything at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.phone.is_none()
            && self.message.is_none()
            && self.status.is_none()
            && self.priority.is_none()
            && self.notes.is_none()
    }
}
