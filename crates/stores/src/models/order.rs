//! Sales orders.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use readymix_backend::Document;
use readymix_core::{Email, OrderId, OrderStatus, Priority, timestamp};

use crate::error::ValidationError;

/// A sales order as read back from the backend.
///
/// One canonical schema: `project_type`, `requirements`, and
/// `estimated_value` are the field names on the wire; older synonyms from
/// migrated data do not appear here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub customer_name: String,
    pub customer_email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_phone: Option<String>,
    /// Concrete grade / job description, e.g. "M25 ready mix".
    pub project_type: String,
    /// Quantity in cubic meters.
    pub quantity: Decimal,
    /// Pour area, free-form (e.g. "240 sq m slab").
    pub area: String,
    /// Delivery site.
    pub location: String,
    /// Customer-stated requirements for the pour.
    pub requirements: String,
    #[serde(default, with = "timestamp::wire_opt", skip_serializing_if = "Option::is_none")]
    pub delivery_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_value: Option<Decimal>,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default)]
    pub priority: Priority,
    #[serde(with = "timestamp::wire")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "timestamp::wire")]
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,
}

impl Order {
    /// Convert a backend document into an order.
    ///
    /// # Errors
    ///
    /// Fails when the document is missing required fields or carries
    /// malformed values.
    pub fn from_document(document: Document) -> Result<Self, serde_json::Error> {
        serde_json::from_value(document.into_value())
    }
}

/// Input for creating an order.
///
/// Status and priority are absent by design; every new order is persisted
/// as `pending` / `medium`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOrder {
    pub customer_name: String,
    pub customer_email: String,
    #[serde(default)]
    pub customer_phone: Option<String>,
    pub project_type: String,
    pub quantity: Decimal,
    pub area: String,
    pub location: String,
    pub requirements: String,
    #[serde(default, with = "timestamp::wire_opt")]
    pub delivery_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub estimated_value: Option<Decimal>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub assigned_to: Option<String>,
}

impl NewOrder {
    /// Check the create-side invariants.
    pub(crate) fn validate(&self) -> Result<(), ValidationError> {
        for (field, value) in [
            ("customer_name", &self.customer_name),
            ("project_type", &self.project_type),
            ("area", &self.area),
            ("location", &self.location),
            ("requirements", &self.requirements),
        ] {
            if value.trim().is_empty() {
                return Err(ValidationError::MissingField { field });
            }
        }
        Email::parse(self.customer_email.trim())?;
        Ok(())
    }

    /// Wire fields for the create call, with the forced defaults applied.
    /// Timestamps are stamped server-side.
    pub(crate) fn into_fields(self) -> Map<String, Value> {
        let mut fields = match serde_json::to_value(&self) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        };
        fields.retain(|_, value| !value.is_null());
        fields.insert(
            "customer_email".into(),
            Value::String(self.customer_email.trim().to_lowercase()),
        );
        fields.insert(
            "status".into(),
            Value::String(OrderStatus::Pending.to_string()),
        );
        fields.insert(
            "priority".into(),
            Value::String(Priority::Medium.to_string()),
        );
        fields
    }
}

/// Partial update to an order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<OrderStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_value: Option<Decimal>,
    #[serde(
        default,
        with = "timestamp::wire_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub delivery_date: Option<DateTime<Utc>>,
}

impl OrderPatch {
    /// Wire fields for the merge call; unset fields are simply absent.
    pub(crate) fn into_fields(self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid() -> NewOrder {
        NewOrder {
            customer_name: "Ravi Constructions".into(),
            customer_email: "ravi@constructions.example".into(),
            customer_phone: Some("+91 91234 56789".into()),
            project_type: "M25 ready mix".into(),
            quantity: Decimal::new(125, 1), // 12.5 m3
            area: "240 sq m slab".into(),
            location: "Sector 21 site, Pune".into(),
            requirements: "Pump placement, retarder for 90 min haul".into(),
            delivery_date: None,
            estimated_value: Some(Decimal::new(86_500, 0)),
            notes: None,
            assigned_to: None,
        }
    }

    #[test]
    fn test_validate_accepts_good_input() {
        assert!(valid().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_each_missing_required_field() {
        for field in ["customer_name", "project_type", "area", "location", "requirements"] {
            let mut order = valid();
            match field {
                "customer_name" => order.customer_name = "  ".into(),
                "project_type" => order.project_type = String::new(),
                "area" => order.area = String::new(),
                "location" => order.location = String::new(),
                "requirements" => order.requirements = String::new(),
                _ => unreachable!(),
            }
            let err = order.validate().unwrap_err();
            assert!(
                matches!(err, ValidationError::MissingField { field: f } if f == field),
                "expected missing {field}, got {err}"
            );
        }
    }

    #[test]
    fn test_validate_rejects_bad_email() {
        let mut order = valid();
        order.customer_email = "ravi@nodot".into();
        assert!(matches!(
            order.validate(),
            Err(ValidationError::InvalidEmail(_))
        ));
    }

    #[test]
    fn test_into_fields_forces_defaults() {
        let fields = valid().into_fields();
        assert_eq!(fields["status"], json!("pending"));
        assert_eq!(fields["priority"], json!("medium"));
        assert_eq!(fields["customer_email"], json!("ravi@constructions.example"));
        // Unset optionals stay off the wire
        assert!(!fields.contains_key("delivery_date"));
        assert!(!fields.contains_key("notes"));
    }

    #[test]
    fn test_from_document() {
        let document = Document {
            id: "ord-1".into(),
            fields: match json!({
                "customer_name": "Ravi Constructions",
                "customer_email": "ravi@constructions.example",
                "project_type": "M25 ready mix",
                "quantity": "12.5",
                "area": "240 sq m slab",
                "location": "Sector 21 site, Pune",
                "requirements": "Pump placement",
                "status": "processing",
                "priority": "medium",
                "estimated_value": "86500",
                "created_at": "2024-03-01T10:00:00Z",
                "updated_at": "2024-03-01T12:00:00Z"
            }) {
                Value::Object(map) => map,
                _ => unreachable!(),
            },
        };

        let order = Order::from_document(document).unwrap();
        assert_eq!(order.id, OrderId::new("ord-1"));
        assert_eq!(order.status, OrderStatus::Processing);
        assert_eq!(order.quantity, Decimal::new(125, 1));
        assert_eq!(order.estimated_value, Some(Decimal::new(86_500, 0)));
    }

    #[test]
    fn test_patch_serializes_only_set_fields() {
        let patch = OrderPatch {
            status: Some(OrderStatus::Completed),
            assigned_to: Some("dispatch-2".into()),
            ..OrderPatch::default()
        };
        let fields = patch.into_fields();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields["status"], json!("completed"));
    }
}
