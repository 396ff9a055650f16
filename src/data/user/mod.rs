use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{self, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use chrono::{DateTime, Utc};
use regex::Regex;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::data::entity::Entity;
use crate::resp::problem::{problems, Problem};
use crate::role::Role;

pub mod db;

lazy_static! {
    static ref EMAIL_PATTERN: Regex = Regex::new(r".+@.+\..+").expect("valid email pattern");
    /// Hash with the same parameters as stored passwords, checked when no account matches.
    static ref UNMATCHED_LOGIN_HASH: Option<PasswordHash> = PasswordHash::new("unmatched-login").ok();
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email)
}

/// Argon2 PHC string of a user password.
#[derive(Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PasswordHash(String);

impl PasswordHash {
    pub fn new(password: impl AsRef<str>) -> Result<PasswordHash, Problem> {
        let salt = SaltString::generate(&mut OsRng);

        Argon2::default()
            .hash_password(password.as_ref().as_bytes(), &salt)
            .map(|hash| PasswordHash(hash.to_string()))
            .map_err(|e| problems::internal("Unable to hash password.", e))
    }

    pub fn verify(&self, password: impl AsRef<str>) -> bool {
        match password_hash::PasswordHash::new(&self.0) {
            Ok(parsed) => Argon2::default()
                .verify_password(password.as_ref().as_bytes(), &parsed)
                .is_ok(),
            Err(e) => {
                tracing::warn!("Stored password hash is unreadable: {}", e);
                false
            }
        }
    }

    /// Pays the cost of a verification for a login without an account. Never matches.
    pub fn verify_unmatched(password: impl AsRef<str>) -> bool {
        if let Some(hash) = UNMATCHED_LOGIN_HASH.as_ref() {
            hash.verify(password);
        }
        false
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PasswordHash(..)")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: Uuid,
    #[serde(rename = "userName")]
    pub user_name: String,
    #[serde(rename = "firstName", default)]
    pub first_name: Option<String>,
    #[serde(rename = "lastName", default)]
    pub last_name: Option<String>,
    pub email: String,
    #[schema(value_type = String, format = Password)]
    pub password: PasswordHash,
    #[serde(default)]
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for User {
    const COLLECTION: &'static str = "users";
    const NAME: &'static str = "User";

    fn id(&self) -> Uuid {
        self.id
    }
}

/// Public view of a user, without the password hash.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    #[serde(rename = "_id")]
    pub id: Uuid,
    #[serde(rename = "userName")]
    pub user_name: String,
    #[serde(rename = "firstName")]
    pub first_name: Option<String>,
    #[serde(rename = "lastName")]
    pub last_name: Option<String>,
    pub email: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        UserResponse {
            id: user.id,
            user_name: user.user_name,
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            role: user.role,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_pattern() {
        assert!(is_valid_email("shivam.jobs056@gmail.com"));
        assert!(is_valid_email("a@b.co"));
        assert!(!is_valid_email("shivam"));
        assert!(!is_valid_email("shivam@gmail"));
    }

    #[test]
    fn password_hash_verifies_only_its_password() {
        let hash = PasswordHash::new("password123").expect("hashable");

        assert_ne!(hash.as_str(), "password123");
        assert!(hash.as_str().starts_with("$argon2"));
        assert!(hash.verify("password123"));
        assert!(!hash.verify("password124"));
    }

    #[test]
    fn unmatched_login_hash_costs_like_a_stored_one() {
        let stored = PasswordHash::new("password123").expect("hashable");
        let unmatched = UNMATCHED_LOGIN_HASH.as_ref().expect("unmatched login hash");
        let params = |hash: &PasswordHash| {
            hash.as_str().split('$').take(4).collect::<Vec<_>>().join("$")
        };

        assert_eq!(params(unmatched), params(&stored));
        assert!(!PasswordHash::verify_unmatched("password123"));
        assert!(!PasswordHash::verify_unmatched("unmatched-login"));
    }

    #[test]
    fn same_password_gets_distinct_salts() {
        let a = PasswordHash::new("password123").expect("hashable");
        let b = PasswordHash::new("password123").expect("hashable");
        assert_ne!(a, b);
    }

    #[test]
    fn public_view_has_no_password() {
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            user_name: "shivam044".to_string(),
            first_name: None,
            last_name: None,
            email: "shivam.jobs056@gmail.com".to_string(),
            password: PasswordHash::new("password123").expect("hashable"),
            role: Role::default(),
            created_at: now,
            updated_at: now,
        };

        let json = serde_json::to_value(UserResponse::from(user)).expect("serializable");
        assert!(json.get("password").is_none());
        assert_eq!(json.get("role"), Some(&serde_json::Value::from("student")));
    }
}
