//! Wire shapes of the response bodies. Success is judged on the body contents
//! here, not only the status code; an HTTP 200 whose body is missing the
//! success marker is a domain rejection explained by `message`.

use serde::{Deserialize, Serialize};

use crate::id::UserId;

use super::{Role, Username};

/// Body of the signup endpoint
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct SignupResponse {
    pub message: String,
    pub created: bool,
}

/// Body of the login endpoint. `user_id` and `token` are present only on
/// success.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct LoginResponse {
    pub message: String,
    #[serde(default)]
    pub user_id: Option<UserId>,
    #[serde(default)]
    pub token: Option<String>,
}

/// Body of the validation endpoint (returned on failure statuses as well,
/// with `user_id` absent)
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ValidateResponse {
    #[serde(default)]
    pub user_id: Option<UserId>,
    pub message: String,
}

/// Body of the role endpoint
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct RoleResponse {
    pub username: Username,
    pub id: UserId,
    pub role_name: String,
}

impl RoleResponse {
    /// The reported role as a tier; unknown names degrade to `user`
    #[must_use]
    pub fn role(&self) -> Role {
        Role::from_wire_name(&self.role_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_success_body_parses() {
        // Arrange - shape the login endpoint sends on success
        let body = r#"{"message":"Login successful","user_id":7,"token":"abc.def"}"#;

        // Act
        let actual: LoginResponse = serde_json::from_str(body).unwrap();

        // Assert
        assert_eq!(actual.user_id, Some(7.into()));
        assert_eq!(actual.token.as_deref(), Some("abc.def"));
    }

    #[test]
    fn login_rejection_body_parses_without_user_id() {
        // Arrange - HTTP 200 but no user id means the message explains why
        let body = r#"{"message":"User not found"}"#;

        // Act
        let actual: LoginResponse = serde_json::from_str(body).unwrap();

        // Assert
        assert_eq!(actual.user_id, None);
        assert_eq!(actual.message, "User not found");
    }

    #[test]
    fn validate_failure_body_has_null_user_id() {
        // Arrange
        let body = r#"{"user_id":null,"message":"Invalid token"}"#;

        // Act
        let actual: ValidateResponse = serde_json::from_str(body).unwrap();

        // Assert
        assert_eq!(actual.user_id, None);
    }

    #[test]
    fn role_body_derives_the_tier() {
        // Arrange
        let body = r#"{"username":"ann","id":3,"role_name":"admin"}"#;

        // Act
        let actual: RoleResponse = serde_json::from_str(body).unwrap();

        // Assert
        assert!(actual.role().is_admin());
    }
}
