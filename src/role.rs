use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const DEFAULT_ROLE: &str = "student";

/// Free-form role tag carried by every user. Not a closed set.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct Role(String);

impl Role {
    pub fn new(role: impl ToString) -> Role {
        let role = role.to_string();
        if role.trim().is_empty() {
            Role::default()
        } else {
            Role(role)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::default::Default for Role {
    fn default() -> Self {
        Role(DEFAULT_ROLE.to_string())
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        role.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_role_falls_back_to_student() {
        assert_eq!(Role::new("  "), Role::default());
        assert_eq!(Role::default().as_str(), "student");
    }

    #[test]
    fn roles_are_not_restricted() {
        let role = Role::new("librarian");
        assert_eq!(role.to_string(), "librarian");
        assert_eq!(
            serde_json::to_string(&role).expect("serializable"),
            "\"librarian\""
        );
    }
}
