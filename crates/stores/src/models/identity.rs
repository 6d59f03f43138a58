//! The authenticated identity.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use readymix_backend::{Document, Principal};
use readymix_core::{PrincipalId, Role};

/// Collection holding optional staff profile documents, keyed by the
/// principal's identifier.
pub const PROFILES_COLLECTION: &str = "profiles";

/// The signed-in principal merged with its optional profile document.
///
/// Exactly one of these exists while a session is active; none otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: PrincipalId,
    pub name: String,
    pub email: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

impl Identity {
    /// Merge the provider's principal with an optional profile document.
    ///
    /// Profile fields win over provider fields; everything falls back to a
    /// usable default, so a missing or unreadable profile still yields a
    /// working identity with role `admin`.
    #[must_use]
    pub(crate) fn from_parts(principal: Principal, profile: Option<&Document>) -> Self {
        let field = |key: &str| {
            profile
                .and_then(|doc| doc.fields.get(key))
                .and_then(Value::as_str)
        };

        let name = field("name")
            .map(str::to_owned)
            .or_else(|| principal.display_name.clone())
            .unwrap_or_else(|| "Admin".to_owned());
        let role = field("role")
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(Role::Admin);
        let avatar = field("avatar").map(str::to_owned).or(principal.avatar_url);

        Self {
            id: principal.id,
            name,
            email: principal.email,
            role,
            avatar,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn principal() -> Principal {
        Principal {
            id: PrincipalId::new("uid-1"),
            email: "ops@readymix.example".into(),
            display_name: Some("Priya".into()),
            avatar_url: Some("https://cdn.example/priya.png".into()),
        }
    }

    fn profile(fields: Value) -> Document {
        let Value::Object(map) = fields else {
            panic!("fields must be an object")
        };
        Document {
            id: "uid-1".into(),
            fields: map,
        }
    }

    #[test]
    fn test_profile_fields_win() {
        let doc = profile(json!({
            "name": "Priya N.",
            "role": "user",
            "avatar": "https://cdn.example/other.png"
        }));
        let identity = Identity::from_parts(principal(), Some(&doc));
        assert_eq!(identity.name, "Priya N.");
        assert_eq!(identity.role, Role::User);
        assert_eq!(identity.avatar.as_deref(), Some("https://cdn.example/other.png"));
    }

    #[test]
    fn test_missing_profile_falls_back_to_provider() {
        let identity = Identity::from_parts(principal(), None);
        assert_eq!(identity.name, "Priya");
        assert_eq!(identity.role, Role::Admin);
        assert_eq!(identity.avatar.as_deref(), Some("https://cdn.example/priya.png"));
        assert_eq!(identity.email, "ops@readymix.example");
    }

    #[test]
    fn test_bare_principal_defaults_to_admin() {
        let bare = Principal {
            id: PrincipalId::new("uid-2"),
            email: "x@readymix.example".into(),
            display_name: None,
            avatar_url: None,
        };
        let identity = Identity::from_parts(bare, None);
        assert_eq!(identity.name, "Admin");
        assert_eq!(identity.role, Role::Admin);
        assert!(identity.avatar.is_none());
    }

    #[test]
    fn test_unknown_role_defaults_to_admin() {
        let doc = profile(json!({"role": "superuser"}));
        let identity = Identity::from_parts(principal(), Some(&doc));
        assert_eq!(identity.role, Role::Admin);
    }
}
