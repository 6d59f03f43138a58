//! Status and priority enums shared by the inquiry and order collections.

use serde::{Deserialize, Serialize};

/// Follow-up status of a customer inquiry.
///
/// Every newly submitted inquiry starts at `NotContacted`; staff move it
/// forward from the back-office.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum InquiryStatus {
    #[default]
    NotContacted,
    Contacted,
    InProgress,
    Completed,
}

/// Fulfillment status of a sales order.
///
/// Every newly created order starts at `Pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Processing,
    Completed,
    Cancelled,
}

/// Priority assigned to an inquiry or order.
///
/// Creation always starts at `Medium` regardless of caller input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

/// Role carried by an authenticated identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Full access to the back-office.
    #[default]
    Admin,
    /// Read-only staff account.
    User,
}

impl std::fmt::Display for InquiryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotContacted => write!(f, "not_contacted"),
            Self::Contacted => write!(f, "contacted"),
            Self::InProgress => write!(f, "in_progress"),
            Self::Completed => write!(f, "completed"),
        }
    }
}

impl std::str::FromStr for InquiryStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "not_contacted" => Ok(Self::NotContacted),
            "contacted" => Ok(Self::Contacted),
            "in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            _ => Err(format!("invalid inquiry status: {s}")),
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Processing => write!(f, "processing"),
            Self::Completed => write!(f, "completed"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "processing" => Ok(Self::Processing),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(format!("invalid order status: {s}")),
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
        }
    }
}

impl std::str::FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            _ => Err(format!("invalid priority: {s}")),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Admin => write!(f, "admin"),
            Self::User => write!(f, "user"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "user" => Ok(Self::User),
            _ => Err(format!("invalid role: {s}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        assert_eq!(InquiryStatus::default(), InquiryStatus::NotContacted);
        assert_eq!(OrderStatus::default(), OrderStatus::Pending);
        assert_eq!(Priority::default(), Priority::Medium);
        assert_eq!(Role::default(), Role::Admin);
    }

    #[test]
    fn test_serde_snake_case() {
        let json = serde_json::to_string(&InquiryStatus::NotContacted).unwrap();
        assert_eq!(json, "\"not_contacted\"");

        let parsed: InquiryStatus = serde_json::from_str("\"in_progress\"").unwrap();
        assert_eq!(parsed, InquiryStatus::InProgress);

        let json = serde_json::to_string(&OrderStatus::Cancelled).unwrap();
        assert_eq!(json, "\"cancelled\"");
    }

    #[test]
    fn test_display_from_str_roundtrip() {
        for status in [
            InquiryStatus::NotContacted,
            InquiryStatus::Contacted,
            InquiryStatus::InProgress,
            InquiryStatus::Completed,
        ] {
            assert_eq!(status.to_string().parse::<InquiryStatus>().unwrap(), status);
        }
        for priority in [Priority::Low, Priority::Medium, Priority::High] {
            assert_eq!(priority.to_string().parse::<Priority>().unwrap(), priority);
        }
    }

    #[test]
    fn test_from_str_rejects_unknown() {
        assert!("shipped".parse::<OrderStatus>().is_err());
        assert!("urgent".parse::<Priority>().is_err());
        assert!("owner".parse::<Role>().is_err());
    }
}
