//! User entity with password helpers

use super::enums::Role;
use bcrypt::{DEFAULT_COST, hash, verify};
use serde::Serialize;

#[derive(Serialize, Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub user_id: i32,
    pub name: Option<String>,
    pub email: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub points: i32,
    pub team_id: Option<i32>,
    #[sqlx(try_from = "String")]
    pub role: Role,
}

impl User {
    /// Verify if target_password matches the stored hashed password
    pub fn verify_password(&self, target_password: &str) -> bool {
        verify(target_password, &self.password).unwrap_or(false)
    }

    /// Hash a password using bcrypt with default cost
    pub fn hash_password(password: &str) -> Result<String, bcrypt::BcryptError> {
        hash(password, DEFAULT_COST)
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_with_hash(password: &str) -> User {
        User {
            user_id: 1,
            name: Some("Alice".to_string()),
            email: "alice@example.com".to_string(),
            password: bcrypt::hash(password, 4).unwrap(),
            points: 0,
            team_id: None,
            role: Role::User,
        }
    }

    #[test]
    fn verify_password_accepts_matching_password() {
        let user = user_with_hash("Password123");
        assert!(user.verify_password("Password123"));
        assert!(!user.verify_password("password123"));
    }

    #[test]
    fn password_is_never_serialized() {
        let user = user_with_hash("Password123");
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password").is_none());
        assert_eq!(json["role"], "USER");
    }

    #[test]
    fn empty_hash_never_verifies() {
        let mut user = user_with_hash("x");
        user.password = String::new();
        assert!(!user.verify_password(""));
    }
}
