use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::State;

use super::crud::{body, record_id, JsonBody};
use super::Message;
use crate::data::entity::Entity;
use crate::data::store::Storage;
use crate::data::user::db::{UserDbExt, UserSignupData, UserUpdateData};
use crate::data::user::{User, UserResponse};
use crate::resp::auth::AuthUser;
use crate::resp::problem::Problem;

/// Create a user
///
/// Responds with the stored record; the password field holds the hash.
#[utoipa::path(
    request_body = UserSignupData,
    responses(
        (status = 201, description = "User created", body = User),
        (status = 400, description = "Invalid profile or email already in use", body = Problem),
    )
)]
#[post("/user", data = "<create_user>")]
#[tracing::instrument(skip(create_user))]
pub async fn user_create(
    create_user: JsonBody<'_, UserSignupData>,
    storage: &State<Storage>,
) -> Result<(Status, Json<User>), Problem> {
    let user = storage.repo().create_user(body(create_user)?).await?;
    Ok((Status::Created, Json(user)))
}

/// List all users
#[utoipa::path(
    responses(
        (status = 200, description = "Every user", body = Vec<UserResponse>),
        (status = 401, description = "Missing/expired token", body = Problem),
    ),
    security(("jwt" = []))
)]
#[get("/users")]
#[tracing::instrument]
pub async fn user_list(
    _auth: AuthUser,
    storage: &State<Storage>,
) -> Result<Json<Vec<UserResponse>>, Problem> {
    let users = storage.repo().list::<User>().await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

#[utoipa::path(
    params(
        ("id", description = "user ID")
    ),
    responses(
        (status = 200, description = "Information about existing user", body = UserResponse),
        (status = 401, description = "Missing/expired token", body = Problem),
        (status = 404, description = "User not found", body = Problem),
    ),
    security(("jwt" = []))
)]
#[get("/users/<id>")]
#[tracing::instrument]
pub async fn user_get(
    id: &str,
    _auth: AuthUser,
    storage: &State<Storage>,
) -> Result<Json<UserResponse>, Problem> {
    let user = storage.repo().get::<User>(record_id::<User>(id)?).await?;
    Ok(Json(UserResponse::from(user)))
}

/// Replace the profile of the signed-in user
#[utoipa::path(
    params(
        ("id", description = "user ID")
    ),
    request_body = UserUpdateData,
    responses(
        (status = 200, description = "Updated user", body = UserResponse),
        (status = 400, description = "Invalid profile or email already in use", body = Problem),
        (status = 401, description = "Missing/expired token", body = Problem),
        (status = 403, description = "Not the signed-in user", body = Problem),
        (status = 404, description = "User not found", body = Problem),
    ),
    security(("jwt" = []))
)]
#[put("/users/<id>", data = "<update>")]
#[tracing::instrument(skip(update))]
pub async fn user_update(
    id: &str,
    update: JsonBody<'_, UserUpdateData>,
    auth: AuthUser,
    storage: &State<Storage>,
) -> Result<Json<UserResponse>, Problem> {
    let id = record_id::<User>(id)?;
    auth.require_self(id)?;

    let user = storage.repo().update_user(id, body(update)?).await?;
    Ok(Json(UserResponse::from(user)))
}

/// Delete the signed-in user
///
/// Records referencing the user are left in place.
#[utoipa::path(
    params(
        ("id", description = "user ID")
    ),
    responses(
        (status = 200, description = "User deleted", body = Message),
        (status = 401, description = "Missing/expired token", body = Problem),
        (status = 403, description = "Not the signed-in user", body = Problem),
        (status = 404, description = "User not found", body = Problem),
    ),
    security(("jwt" = []))
)]
#[delete("/users/<id>")]
#[tracing::instrument]
pub async fn user_delete(
    id: &str,
    auth: AuthUser,
    storage: &State<Storage>,
) -> Result<Json<Message>, Problem> {
    let id = record_id::<User>(id)?;
    auth.require_self(id)?;

    let removed = storage.repo().delete::<User>(id).await?;
    tracing::info!("Deleted user {}", removed.id());
    Ok(Json(Message::deleted::<User>()))
}

///////////////////////
//       TESTS
///////////////////////

#[cfg(test)]
mod user_endpoints {
    use rocket::http::{ContentType, Status};
    use serde_json::{json, Value};
    use uuid::Uuid;

    use crate::data::entity::Entity;
    use crate::data::user::User;
    use crate::test_util::{bearer, client, sign_up};

    fn shivam() -> String {
        json!({
            "userName": "shivam044",
            "email": "shivam.jobs056@gmail.com",
            "password": "password123",
            "role": "student"
        })
        .to_string()
    }

    #[rocket::async_test]
    async fn create_delete_lifecycle() {
        let client = client().await;

        let response = client
            .post("/api/user")
            .header(ContentType::JSON)
            .body(shivam())
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Created);
        let created: User = response.into_json().await.expect("persisted user");
        assert_eq!(created.user_name, "shivam044");
        assert_ne!(created.password.as_str(), "password123");
        assert!(created.password.verify("password123"));
        assert_eq!(created.created_at, created.updated_at);

        let response = client
            .post("/api/user")
            .header(ContentType::JSON)
            .body(shivam())
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::BadRequest);
        let body: Value = response.into_json().await.expect("problem body");
        assert_eq!(body["message"], "Email already in use");

        let token = crate::test_util::token_for(created.id);
        let uri = format!("/api/users/{}", created.id);

        let response = client.delete(&uri).header(bearer(&token)).dispatch().await;
        assert_eq!(response.status(), Status::Ok);
        let body: Value = response.into_json().await.expect("message body");
        assert_eq!(body["message"], "User deleted successfully");

        let response = client.get(&uri).header(bearer(&token)).dispatch().await;
        assert_eq!(response.status(), Status::NotFound);
        let body: Value = response.into_json().await.expect("problem body");
        assert_eq!(body["message"], "User not found");
    }

    #[rocket::async_test]
    async fn invalid_email_is_rejected() {
        let client = client().await;

        let response = client
            .post("/api/user")
            .header(ContentType::JSON)
            .body(json!({ "userName": "x", "email": "nope", "password": "pw" }).to_string())
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::BadRequest);
    }

    #[rocket::async_test]
    async fn malformed_body_is_bad_request() {
        let client = client().await;

        let response = client
            .post("/api/user")
            .header(ContentType::JSON)
            .body("{ not json")
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::BadRequest);
        let body: Value = response.into_json().await.expect("problem body");
        assert_eq!(body["message"], "Invalid request body");
    }

    #[rocket::async_test]
    async fn listing_requires_a_token() {
        let client = client().await;

        let response = client.get("/api/users").dispatch().await;
        assert_eq!(response.status(), Status::Unauthorized);
        let body: Value = response.into_json().await.expect("problem body");
        assert_eq!(body["message"], "Unauthorized");

        let response = client
            .get("/api/users")
            .header(bearer("garbage"))
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Unauthorized);
    }

    #[rocket::async_test]
    async fn users_can_only_change_themselves() {
        let client = client().await;
        let (ada, ada_token) = sign_up(&client, "ada@example.com").await;
        let (grace, _) = sign_up(&client, "grace@example.com").await;

        let update = json!({ "userName": "ada", "email": "ada@example.com", "firstName": "Ada" });

        let response = client
            .put(format!("/api/users/{}", grace))
            .header(ContentType::JSON)
            .header(bearer(&ada_token))
            .body(update.to_string())
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Forbidden);
        let body: Value = response.into_json().await.expect("problem body");
        assert_eq!(body["message"], "User is not authorized");

        let response = client
            .delete(format!("/api/users/{}", grace))
            .header(bearer(&ada_token))
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Forbidden);

        let response = client
            .put(format!("/api/users/{}", ada))
            .header(ContentType::JSON)
            .header(bearer(&ada_token))
            .body(update.to_string())
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Ok);
        let body: Value = response.into_json().await.expect("user body");
        assert_eq!(body["firstName"], "Ada");
        assert!(body.get("password").is_none());
    }

    #[rocket::async_test]
    async fn unknown_or_malformed_ids_are_not_found() {
        let client = client().await;
        let (_, token) = sign_up(&client, "ada@example.com").await;

        for id in [Uuid::new_v4().to_string(), "not-a-uuid".to_string()] {
            let response = client
                .get(format!("/api/users/{}", id))
                .header(bearer(&token))
                .dispatch()
                .await;
            assert_eq!(response.status(), Status::NotFound);
            let body: Value = response.into_json().await.expect("problem body");
            assert_eq!(body["message"], format!("{} not found", User::NAME));
        }
    }
}
