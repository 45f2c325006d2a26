//! Models that represent user accounts, authentication payloads, and roles.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sqlx::FromRow;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
/// Database representation of a CRM user account.
pub struct User {
    /// Unique identifier for the user.
    pub id: i64,
    /// Email address used for OTP login. Unique.
    pub email: String,
    /// Human-readable full name.
    pub name: String,
    /// Optional contact number.
    pub phone: Option<String>,
    /// Role describing the user's privileges.
    pub role: UserRole,
    /// Inactive accounts cannot log in.
    pub is_active: bool,
    /// Timestamp of the last successful OTP verification.
    pub last_login: Option<DateTime<Utc>>,
    /// Creation timestamp for auditing.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp for auditing.
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, Default)]
#[sqlx(type_name = "TEXT", rename_all = "snake_case")]
/// Supported user roles stored in the database.
pub enum UserRole {
    /// Full administrative access, including audit surfaces.
    Admin,
    /// Sales team: leads, RFQs, templates.
    Sales,
    /// Support team: tickets.
    Support,
    /// Relationship manager: owns a customer book.
    Rm,
    /// Read-only access.
    #[default]
    Viewer,
}

impl UserRole {
    /// Returns the canonical snake_case representation of the role.
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::Sales => "sales",
            UserRole::Support => "support",
            UserRole::Rm => "rm",
            UserRole::Viewer => "viewer",
        }
    }
}

impl Serialize for UserRole {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for UserRole {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        match s.as_str() {
            "admin" => Ok(UserRole::Admin),
            "sales" => Ok(UserRole::Sales),
            "support" => Ok(UserRole::Support),
            "rm" | "RM" => Ok(UserRole::Rm),
            "viewer" => Ok(UserRole::Viewer),
            // tolerate legacy casings
            "Admin" | "ADMIN" => Ok(UserRole::Admin),
            "Sales" | "SALES" => Ok(UserRole::Sales),
            "Support" | "SUPPORT" => Ok(UserRole::Support),
            "Viewer" | "VIEWER" => Ok(UserRole::Viewer),
            other => Err(serde::de::Error::unknown_variant(
                other,
                &["admin", "sales", "support", "rm", "viewer"],
            )),
        }
    }
}

impl User {
    /// Returns `true` when the user holds the `Admin` role.
    pub fn is_admin(&self) -> bool {
        matches!(self.role, UserRole::Admin)
    }

    /// Returns `true` when the user's role appears in `allowed`.
    pub fn has_role(&self, allowed: &[UserRole]) -> bool {
        allowed.contains(&self.role)
    }
}

#[derive(Debug, Serialize, Deserialize, Validate)]
/// Payload for requesting a login OTP.
pub struct RequestOtpPayload {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
/// Payload for verifying a login OTP.
pub struct VerifyOtpPayload {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(equal = 6, message = "OTP must be 6 digits"))]
    pub otp: String,
}

#[derive(Debug, Serialize, Deserialize)]
/// Returned after a successful OTP verification.
pub struct LoginResponse {
    pub message: String,
    pub token: String,
    pub user: UserResponse,
}

#[derive(Debug, Serialize, Deserialize)]
/// Public-facing representation of a user returned by the API.
pub struct UserResponse {
    pub id: i64,
    pub email: String,
    pub name: String,
    pub role: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        UserResponse {
            id: user.id,
            email: user.email,
            name: user.name,
            role: user.role.as_str().to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Validate)]
/// Payload for creating a new user account (admin only).
pub struct CreateUser {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub role: UserRole,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
/// Payload for updating portions of an existing user.
pub struct UpdateUser {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    pub phone: Option<String>,
    pub role: Option<UserRole>,
    pub is_active: Option<bool>,
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn user_role_serde_accepts_and_emits_snake_case() {
        let admin: UserRole = serde_json::from_str("\"admin\"").unwrap();
        let rm: UserRole = serde_json::from_str("\"rm\"").unwrap();
        assert_eq!(admin, UserRole::Admin);
        assert_eq!(rm, UserRole::Rm);

        // Tolerate legacy casings
        let legacy: UserRole = serde_json::from_str("\"ADMIN\"").unwrap();
        assert_eq!(legacy, UserRole::Admin);

        let serialized = serde_json::to_value(UserRole::Support).unwrap();
        assert_eq!(serialized, Value::String("support".into()));
    }

    #[test]
    fn user_role_rejects_unknown_values() {
        let result: Result<UserRole, _> = serde_json::from_str("\"superuser\"");
        assert!(result.is_err());
    }

    #[test]
    fn has_role_matches_allowed_list() {
        let user = User {
            id: 1,
            email: "sales@example.com".into(),
            name: "Sales Person".into(),
            phone: None,
            role: UserRole::Sales,
            is_active: true,
            last_login: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert!(user.has_role(&[UserRole::Admin, UserRole::Sales]));
        assert!(!user.has_role(&[UserRole::Admin]));
        assert!(!user.is_admin());
    }
}
