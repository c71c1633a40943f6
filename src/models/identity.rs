use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use validator::Validate;

/// Role tag carried by an identity. The remote services emit Spring-style
/// `ROLE_HR` tags; bare `HR` is accepted as well.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    Admin,
    Hr,
    Accounts,
    Employee,
    Other(String),
}

impl From<String> for Role {
    fn from(tag: String) -> Self {
        let trimmed = tag.trim();
        let bare = trimmed.strip_prefix("ROLE_").unwrap_or(trimmed);
        match bare.to_ascii_uppercase().as_str() {
            "ADMIN" => Role::Admin,
            "HR" => Role::Hr,
            "ACCOUNTS" => Role::Accounts,
            "EMPLOYEE" | "USER" => Role::Employee,
            _ => Role::Other(trimmed.to_string()),
        }
    }
}

impl From<&str> for Role {
    fn from(tag: &str) -> Self {
        Role::from(tag.to_string())
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        role.to_string()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Admin => write!(f, "ROLE_ADMIN"),
            Role::Hr => write!(f, "ROLE_HR"),
            Role::Accounts => write!(f, "ROLE_ACCOUNTS"),
            Role::Employee => write!(f, "ROLE_USER"),
            Role::Other(tag) => write!(f, "{}", tag),
        }
    }
}

/// The authenticated user as returned by the auth endpoints.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub id: String,
    pub username: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default)]
    pub roles: Vec<Role>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<NaiveDateTime>,
}

fn default_enabled() -> bool {
    true
}

impl Identity {
    pub fn has_role(&self, role: &Role) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    /// Roles in first-seen order with duplicates removed.
    pub fn distinct_roles(&self) -> Vec<Role> {
        let mut seen: Vec<Role> = Vec::with_capacity(self.roles.len());
        for role in &self.roles {
            if !seen.contains(role) {
                seen.push(role.clone());
            }
        }
        seen
    }
}

#[derive(Serialize, Clone)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Serialize, Validate, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 3))]
    pub username: String,
    #[validate(length(min = 6))]
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
}

impl fmt::Debug for RegisterRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisterRequest")
            .field("email", &self.email)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: String,
    pub refresh_token: String,
    #[serde(rename = "type", default)]
    pub token_type: Option<String>,
    pub user: Identity,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_tags_are_normalized() {
        assert_eq!(Role::from("ROLE_HR"), Role::Hr);
        assert_eq!(Role::from("accounts"), Role::Accounts);
        assert_eq!(Role::from("ROLE_ADMIN"), Role::Admin);
        assert_eq!(Role::from("ROLE_USER"), Role::Employee);
        assert_eq!(
            Role::from("ROLE_MODERATOR"),
            Role::Other("ROLE_MODERATOR".to_string())
        );
    }

    #[test]
    fn auth_response_parses_spring_payload() {
        let body = r#"{
            "token": "access",
            "refreshToken": "refresh",
            "type": "Bearer",
            "user": {
                "id": "0b6f3c1e-9d1a-4d7e-8c55-0d7a8f3e2b10",
                "email": "jane@intellidesk.io",
                "username": "jane",
                "roles": ["ROLE_USER", "ROLE_ACCOUNTS"],
                "enabled": true,
                "createdAt": "2024-11-02T09:15:00"
            }
        }"#;
        let response: AuthResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.token_type.as_deref(), Some("Bearer"));
        assert_eq!(response.user.roles, vec![Role::Employee, Role::Accounts]);
        assert!(response.user.has_role(&Role::Accounts));
        assert!(response.user.created_at.is_some());
    }

    #[test]
    fn identity_survives_storage_serialization() {
        let identity = Identity {
            id: "u-1".into(),
            username: "sam".into(),
            email: "sam@intellidesk.io".into(),
            first_name: None,
            last_name: None,
            roles: vec![Role::Hr, Role::Other("ROLE_AUDITOR".into())],
            enabled: true,
            created_at: None,
        };
        let json = serde_json::to_string(&identity).unwrap();
        assert!(json.contains("\"ROLE_HR\""));
        let back: Identity = serde_json::from_str(&json).unwrap();
        assert_eq!(back, identity);
    }

    #[test]
    fn distinct_roles_keep_first_occurrence_order() {
        let identity = Identity {
            id: "u-2".into(),
            username: "kim".into(),
            email: "kim@intellidesk.io".into(),
            first_name: None,
            last_name: None,
            roles: vec![Role::Accounts, Role::Hr, Role::from("ACCOUNTS")],
            enabled: true,
            created_at: None,
        };
        assert_eq!(identity.distinct_roles(), vec![Role::Accounts, Role::Hr]);
    }

    #[test]
    fn register_request_rejects_short_username() {
        let request = RegisterRequest {
            email: "new@intellidesk.io".into(),
            username: "ab".into(),
            password: "secret1".into(),
            ..Default::default()
        };
        let errors = request.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("username"));
    }

    #[test]
    fn debug_output_hides_password() {
        let request = LoginRequest {
            username: "jane".into(),
            password: "hunter22".into(),
        };
        assert!(!format!("{:?}", request).contains("hunter22"));
    }
}
