use bson::doc;
use chrono::Utc;
use utoipa::ToSchema;
use uuid::Uuid;

use super::{is_valid_email, PasswordHash, User};
use crate::data::repo::Repo;
use crate::resp::problem::Problem;
use crate::role::Role;

pub mod problem {
    use crate::resp::problem::{problems, Problem};

    #[inline]
    pub fn email_in_use() -> Problem {
        problems::conflict("Email already in use")
    }

    #[inline]
    pub fn bad_login() -> Problem {
        problems::bad_request("Invalid email or password")
    }

    #[inline]
    pub fn bad_email(email: impl ToString) -> Problem {
        problems::bad_request("Please enter a valid email").insert_str("email", email)
    }

    #[inline]
    pub fn missing_field(field: &str) -> Problem {
        problems::bad_request(format!("{} is required", field))
    }
}

#[derive(Clone, Deserialize, ToSchema)]
pub struct UserSignupData {
    #[serde(rename = "userName")]
    pub user_name: String,
    #[serde(rename = "firstName", default)]
    pub first_name: Option<String>,
    #[serde(rename = "lastName", default)]
    pub last_name: Option<String>,
    #[schema(format = "email")]
    pub email: String,
    #[schema(format = Password)]
    pub password: String,
    #[serde(default)]
    pub role: Option<String>,
}

impl std::fmt::Debug for UserSignupData {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "UserSignupData:{}", self.email)
    }
}

impl UserSignupData {
    pub fn validate(&self) -> Result<(), Problem> {
        if self.user_name.trim().is_empty() {
            return Err(problem::missing_field("userName"));
        }
        if !is_valid_email(&self.email) {
            return Err(problem::bad_email(&self.email));
        }
        if self.password.is_empty() {
            return Err(problem::missing_field("password"));
        }
        Ok(())
    }
}

#[derive(Clone, Deserialize, ToSchema)]
pub struct UserLoginData {
    #[schema(format = "email")]
    pub email: String,
    #[schema(format = Password)]
    pub password: String,
}

impl std::fmt::Debug for UserLoginData {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "UserLoginData:{}", self.email)
    }
}

/// Replacement profile fields. An omitted role keeps the stored one.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UserUpdateData {
    #[serde(rename = "userName")]
    pub user_name: String,
    #[serde(rename = "firstName", default)]
    pub first_name: Option<String>,
    #[serde(rename = "lastName", default)]
    pub last_name: Option<String>,
    pub email: String,
    #[serde(default)]
    pub role: Option<String>,
}

#[rocket::async_trait]
pub trait UserDbExt {
    async fn create_user(&self, signup: UserSignupData) -> Result<User, Problem>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, Problem>;

    /// Resolves a user by credentials. Unknown email and wrong password fail
    /// the same way.
    async fn check_credentials(&self, login: &UserLoginData) -> Result<User, Problem>;

    async fn update_user(&self, id: Uuid, update: UserUpdateData) -> Result<User, Problem>;
}

#[rocket::async_trait]
impl<'a> UserDbExt for Repo<'a> {
    async fn create_user(&self, signup: UserSignupData) -> Result<User, Problem> {
        signup.validate()?;

        if self.find_user_by_email(&signup.email).await?.is_some() {
            return Err(problem::email_in_use());
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            user_name: signup.user_name,
            first_name: signup.first_name,
            last_name: signup.last_name,
            email: signup.email,
            password: PasswordHash::new(&signup.password)?,
            role: signup.role.map(Role::new).unwrap_or_default(),
            created_at: now,
            updated_at: now,
        };

        match self.insert(&user).await {
            Ok(()) => {
                tracing::info!("Created user {}", user.id);
                Ok(user)
            }
            // Lost a race against a concurrent signup with the same email.
            Err(p) if p.status.code == 400 => Err(problem::email_in_use()),
            Err(p) => Err(p),
        }
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, Problem> {
        self.find_by(doc! { "email": email }).await
    }

    async fn check_credentials(&self, login: &UserLoginData) -> Result<User, Problem> {
        let user = match self.find_user_by_email(&login.email).await? {
            Some(user) => user,
            None => {
                PasswordHash::verify_unmatched(&login.password);
                return Err(problem::bad_login());
            }
        };

        if !user.password.verify(&login.password) {
            return Err(problem::bad_login());
        }
        Ok(user)
    }

    async fn update_user(&self, id: Uuid, update: UserUpdateData) -> Result<User, Problem> {
        self.get::<User>(id).await?;
        if !is_valid_email(&update.email) {
            return Err(problem::bad_email(&update.email));
        }
        if let Some(other) = self.find_user_by_email(&update.email).await? {
            if other.id != id {
                return Err(problem::email_in_use());
            }
        }

        let mut changes = doc! {
            "userName": update.user_name,
            "firstName": update.first_name,
            "lastName": update.last_name,
            "email": update.email,
        };
        if let Some(role) = update.role {
            changes.insert("role", Role::new(role).as_str());
        }

        match self.update::<User>(id, changes).await {
            Err(p) if p.status.code == 400 => Err(problem::email_in_use()),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::memory::MemoryStore;
    use rocket::http::Status;

    fn signup(email: &str) -> UserSignupData {
        UserSignupData {
            user_name: "shivam044".to_string(),
            first_name: None,
            last_name: None,
            email: email.to_string(),
            password: "password123".to_string(),
            role: Some("student".to_string()),
        }
    }

    #[rocket::async_test]
    async fn duplicate_email_is_rejected() {
        let store = MemoryStore::new();
        let repo = Repo::new(&store);

        repo.create_user(signup("shivam.jobs056@gmail.com"))
            .await
            .expect("first signup");
        let problem = repo
            .create_user(signup("shivam.jobs056@gmail.com"))
            .await
            .expect_err("second signup");

        assert_eq!(problem.status, Status::BadRequest);
        assert_eq!(problem.message, "Email already in use");
        assert_eq!(repo.count::<User>().await.expect("count"), 1);
    }

    #[rocket::async_test]
    async fn credentials_failures_are_indistinguishable() {
        let store = MemoryStore::new();
        let repo = Repo::new(&store);
        repo.create_user(signup("a@b.co")).await.expect("signup");

        let wrong_password = repo
            .check_credentials(&UserLoginData {
                email: "a@b.co".to_string(),
                password: "nope".to_string(),
            })
            .await
            .expect_err("wrong password");
        let unknown_email = repo
            .check_credentials(&UserLoginData {
                email: "x@y.co".to_string(),
                password: "password123".to_string(),
            })
            .await
            .expect_err("unknown email");

        assert_eq!(wrong_password, unknown_email);
        assert_eq!(wrong_password.message, "Invalid email or password");
    }

    #[rocket::async_test]
    async fn update_keeps_role_and_checks_email() {
        let store = MemoryStore::new();
        let repo = Repo::new(&store);
        let first = repo.create_user(signup("a@b.co")).await.expect("signup");
        repo.create_user(signup("c@d.co")).await.expect("signup");

        let update = |email: &str| UserUpdateData {
            user_name: "renamed".to_string(),
            first_name: Some("Shivam".to_string()),
            last_name: None,
            email: email.to_string(),
            role: None,
        };

        let taken = repo
            .update_user(first.id, update("c@d.co"))
            .await
            .expect_err("email taken");
        assert_eq!(taken.message, "Email already in use");

        let updated = repo
            .update_user(first.id, update("a@b.co"))
            .await
            .expect("own email is fine");
        assert_eq!(updated.user_name, "renamed");
        assert_eq!(updated.first_name.as_deref(), Some("Shivam"));
        assert_eq!(updated.role, first.role);
        assert!(updated.updated_at >= first.updated_at);
        assert!(updated.password.verify("password123"));
    }

    #[rocket::async_test]
    async fn updating_a_removed_user_is_not_found() {
        let store = MemoryStore::new();
        let repo = Repo::new(&store);
        let gone = repo.create_user(signup("a@b.co")).await.expect("signup");
        repo.create_user(signup("c@d.co")).await.expect("signup");
        repo.delete::<User>(gone.id).await.expect("delete");

        let problem = repo
            .update_user(
                gone.id,
                UserUpdateData {
                    user_name: "ghost".to_string(),
                    first_name: None,
                    last_name: None,
                    email: "c@d.co".to_string(),
                    role: None,
                },
            )
            .await
            .expect_err("user was removed");

        assert_eq!(problem.status, Status::NotFound);
        assert_eq!(problem.message, "User not found");
    }
}
