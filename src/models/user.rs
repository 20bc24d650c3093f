// src/models/user.rs

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Account role. Drives which dashboard a user sees and which leaderboard they rank on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Teacher,
    Parent,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Teacher => "teacher",
            Role::Parent => "parent",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "student" => Ok(Role::Student),
            "teacher" => Ok(Role::Teacher),
            "parent" => Ok(Role::Parent),
            other => Err(format!("Unknown role '{}'", other)),
        }
    }
}

/// Represents the 'users' table.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,

    /// Argon2 password hash.
    /// Skipped during serialization to prevent leaking sensitive data.
    #[serde(skip)]
    pub password_hash: String,

    pub role: Role,
    pub points: i64,
    pub level: i64,
    pub badges: Vec<String>,
    pub streak: i64,
    pub avatar: Option<String>,

    /// Linked parent account, students only.
    pub parent_id: Option<i64>,

    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Insert payload for a new account. Ids and timestamps are assigned by the store.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub points: i64,
    pub level: i64,
    pub badges: Vec<String>,
    pub streak: i64,
    pub parent_id: Option<i64>,
}

/// DTO for registration.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(length(
        min = 2,
        max = 100,
        message = "Name must be between 2 and 100 characters"
    ))]
    pub name: String,
    #[validate(email(message = "Please provide a valid email"))]
    pub email: String,
    #[validate(length(
        min = 6,
        max = 128,
        message = "Password must be at least 6 characters long"
    ))]
    pub password: String,
    #[validate(custom(function = validate_role))]
    pub role: String,
    /// Email of an existing parent account to link a student to.
    #[validate(email(message = "Please provide a valid parent email"))]
    pub parent_email: Option<String>,
}

/// DTO for login.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(email(message = "Please provide a valid email"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Token plus the account it was issued for.
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthPayload {
    pub token: String,
    pub user: User,
}

fn validate_role(role: &str) -> Result<(), validator::ValidationError> {
    if role.parse::<Role>().is_err() {
        return Err(validator::ValidationError::new("invalid_role")
            .with_message("Role must be student, teacher, or parent".into()));
    }
    Ok(())
}

/// Trims and lowercases an email so lookups are case-insensitive.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(role: &str) -> RegisterRequest {
        RegisterRequest {
            name: "Alex Chen".into(),
            email: "alex@student.com".into(),
            password: "password123".into(),
            role: role.into(),
            parent_email: None,
        }
    }

    #[test]
    fn roles_round_trip_through_strings() {
        for role in [Role::Student, Role::Teacher, Role::Parent] {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
        assert!("admin".parse::<Role>().is_err());
    }

    #[test]
    fn register_rejects_unknown_role() {
        assert!(request("student").validate().is_ok());
        let errors = request("admin").validate().unwrap_err();
        assert!(errors.field_errors().contains_key("role"));
    }

    #[test]
    fn register_rejects_short_password_and_bad_email() {
        let mut req = request("teacher");
        req.password = "12345".into();
        req.email = "not-an-email".into();
        let errors = req.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("password"));
        assert!(fields.contains_key("email"));
    }

    #[test]
    fn password_hash_is_never_serialized() {
        let user = User {
            id: 1,
            name: "Alex".into(),
            email: "alex@student.com".into(),
            password_hash: "$argon2id$secret".into(),
            role: Role::Student,
            points: 100,
            level: 1,
            badges: vec!["Welcome".into()],
            streak: 0,
            avatar: None,
            parent_id: None,
            created_at: chrono::Utc::now(),
        };
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("passwordHash").is_none());
        assert_eq!(json["role"], "student");
        assert_eq!(json["points"], 100);
    }

    #[test]
    fn emails_are_normalized() {
        assert_eq!(normalize_email("  Alex@Student.COM "), "alex@student.com");
    }
}
