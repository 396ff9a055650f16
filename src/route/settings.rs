use rocket::serde::json::Json;
use rocket::State;

use super::crud::{body, record_id, JsonBody};
use super::Message;
use crate::data::entity::Entity;
use crate::data::settings::{
    delete_settings, find_settings, upsert_settings, UserSettings, UserSettingsPayload,
};
use crate::data::store::Storage;
use crate::data::user::User;
use crate::resp::auth::AuthUser;
use crate::resp::problem::Problem;

/// Create or update the settings of the signed-in user
///
/// Sections left out of the body keep their current value.
#[utoipa::path(
    request_body = UserSettingsPayload,
    responses(
        (status = 200, description = "Stored settings", body = UserSettings),
        (status = 400, description = "Invalid request body", body = Problem),
        (status = 401, description = "Missing/expired token", body = Problem),
        (status = 403, description = "Settings belong to another user", body = Problem),
        (status = 404, description = "User not found", body = Problem),
    ),
    security(("jwt" = []))
)]
#[post("/user-settings", data = "<settings>")]
#[tracing::instrument]
pub async fn settings_upsert(
    settings: JsonBody<'_, UserSettingsPayload>,
    auth: AuthUser,
    storage: &State<Storage>,
) -> Result<Json<UserSettings>, Problem> {
    let settings = body(settings)?;
    if let Some(user_id) = settings.user_id {
        auth.require_self(user_id)?;
    }

    Ok(Json(upsert_settings(&storage.repo(), settings).await?))
}

#[utoipa::path(
    params(
        ("user_id", description = "user ID")
    ),
    responses(
        (status = 200, description = "Settings of the user", body = UserSettings),
        (status = 401, description = "Missing/expired token", body = Problem),
        (status = 403, description = "Settings belong to another user", body = Problem),
        (status = 404, description = "User settings not found", body = Problem),
    ),
    security(("jwt" = []))
)]
#[get("/user-settings/<user_id>")]
#[tracing::instrument]
pub async fn settings_get(
    user_id: &str,
    auth: AuthUser,
    storage: &State<Storage>,
) -> Result<Json<UserSettings>, Problem> {
    let user_id = record_id::<User>(user_id)?;
    auth.require_self(user_id)?;

    Ok(Json(find_settings(&storage.repo(), user_id).await?))
}

#[utoipa::path(
    params(
        ("user_id", description = "user ID")
    ),
    responses(
        (status = 200, description = "Settings deleted", body = Message),
        (status = 401, description = "Missing/expired token", body = Problem),
        (status = 403, description = "Settings belong to another user", body = Problem),
        (status = 404, description = "User settings not found", body = Problem),
    ),
    security(("jwt" = []))
)]
#[delete("/user-settings/<user_id>")]
#[tracing::instrument]
pub async fn settings_delete(
    user_id: &str,
    auth: AuthUser,
    storage: &State<Storage>,
) -> Result<Json<Message>, Problem> {
    let user_id = record_id::<User>(user_id)?;
    auth.require_self(user_id)?;

    let removed = delete_settings(&storage.repo(), user_id).await?;
    tracing::debug!("Deleted settings {}", removed.id());
    Ok(Json(Message::deleted::<UserSettings>()))
}

#[cfg(test)]
mod settings_endpoints {
    use rocket::http::Status;
    use serde_json::{json, Value};

    use crate::test_util::{bearer, client, post_json, sign_up};

    #[rocket::async_test]
    async fn upsert_merges_sections() {
        let client = client().await;
        let (uid, token) = sign_up(&client, "ada@example.com").await;
        let uri = format!("/api/user-settings/{}", uid);

        let response = client.get(&uri).header(bearer(&token)).dispatch().await;
        assert_eq!(response.status(), Status::NotFound);
        let body: Value = response.into_json().await.expect("problem body");
        assert_eq!(body["message"], "User settings not found");

        let response = post_json(
            &client,
            "/api/user-settings",
            &token,
            json!({ "userId": uid, "theme": "dark" }),
        )
        .await;
        assert_eq!(response.status(), Status::Ok);
        let created: Value = response.into_json().await.expect("settings");
        assert_eq!(created["theme"], "dark");
        assert_eq!(created["language"], "en");
        assert_eq!(created["notifications"]["email"], true);
        assert_eq!(created["privacy"]["profileVisibility"], "public");

        let response = post_json(
            &client,
            "/api/user-settings",
            &token,
            json!({ "userId": uid, "language": "fr", "privacy": { "profileVisibility": "private" } }),
        )
        .await;
        let updated: Value = response.into_json().await.expect("settings");
        assert_eq!(updated["_id"], created["_id"], "one record per user");
        assert_eq!(updated["theme"], "dark");
        assert_eq!(updated["language"], "fr");
        assert_eq!(updated["privacy"]["profileVisibility"], "private");

        let response = client.delete(&uri).header(bearer(&token)).dispatch().await;
        assert_eq!(response.status(), Status::Ok);
        let body: Value = response.into_json().await.expect("message");
        assert_eq!(body["message"], "User settings deleted successfully");

        let response = client.delete(&uri).header(bearer(&token)).dispatch().await;
        assert_eq!(response.status(), Status::NotFound);
    }

    #[rocket::async_test]
    async fn settings_of_others_are_off_limits() {
        let client = client().await;
        let (_, ada_token) = sign_up(&client, "ada@example.com").await;
        let (grace, _) = sign_up(&client, "grace@example.com").await;

        let response = post_json(
            &client,
            "/api/user-settings",
            &ada_token,
            json!({ "userId": grace, "theme": "dark" }),
        )
        .await;
        assert_eq!(response.status(), Status::Forbidden);

        let response = client
            .get(format!("/api/user-settings/{}", grace))
            .header(bearer(&ada_token))
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Forbidden);
    }
}
