use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::State;

use super::crud::{self, body, record_id, JsonBody};
use super::Message;
use crate::data::notification::{mark_read, Notification, NotificationPayload, NotificationView};
use crate::data::store::Storage;
use crate::resp::auth::AuthUser;
use crate::resp::problem::Problem;

/// Send a notification to a user
#[utoipa::path(
    request_body = NotificationPayload,
    responses(
        (status = 201, description = "Notification created", body = Notification),
        (status = 400, description = "Invalid request body", body = Problem),
        (status = 401, description = "Missing/expired token", body = Problem),
        (status = 404, description = "User not found", body = Problem),
    ),
    security(("jwt" = []))
)]
#[post("/notification", data = "<notification>")]
#[tracing::instrument]
pub async fn notification_create(
    notification: JsonBody<'_, NotificationPayload>,
    _auth: AuthUser,
    storage: &State<Storage>,
) -> Result<(Status, Json<Notification>), Problem> {
    crud::create::<Notification>(storage, body(notification)?).await
}

/// Notifications of the signed-in user
#[utoipa::path(
    responses(
        (status = 200, description = "Notifications addressed to the caller", body = Vec<NotificationView>),
        (status = 401, description = "Missing/expired token", body = Problem),
    ),
    security(("jwt" = []))
)]
#[get("/notifications")]
#[tracing::instrument]
pub async fn notification_list(
    auth: AuthUser,
    storage: &State<Storage>,
) -> Result<Json<Vec<NotificationView>>, Problem> {
    let repo = storage.repo();
    let notifications = repo.list_by_owner::<Notification>(auth.id).await?;
    Ok(Json(repo.views(notifications).await?))
}

#[utoipa::path(
    params(
        ("id", description = "notification ID")
    ),
    responses(
        (status = 200, description = "Notification with its recipient", body = NotificationView),
        (status = 401, description = "Missing/expired token", body = Problem),
        (status = 404, description = "Notification not found", body = Problem),
    ),
    security(("jwt" = []))
)]
#[get("/notifications/<id>")]
#[tracing::instrument]
pub async fn notification_get(
    id: &str,
    _auth: AuthUser,
    storage: &State<Storage>,
) -> Result<Json<NotificationView>, Problem> {
    crud::get::<Notification>(storage, id).await
}

#[utoipa::path(
    params(
        ("uid", description = "recipient user ID")
    ),
    responses(
        (status = 200, description = "Notifications of the user", body = Vec<NotificationView>),
        (status = 401, description = "Missing/expired token", body = Problem),
        (status = 404, description = "User not found", body = Problem),
    ),
    security(("jwt" = []))
)]
#[get("/notifications/user/<uid>")]
#[tracing::instrument]
pub async fn notification_list_by_user(
    uid: &str,
    _auth: AuthUser,
    storage: &State<Storage>,
) -> Result<Json<Vec<NotificationView>>, Problem> {
    crud::list_by_owner::<Notification>(storage, uid).await
}

/// Replace title, message and type of a notification
#[utoipa::path(
    params(
        ("id", description = "notification ID")
    ),
    request_body = NotificationPayload,
    responses(
        (status = 200, description = "Updated notification", body = Notification),
        (status = 400, description = "Invalid request body", body = Problem),
        (status = 401, description = "Missing/expired token", body = Problem),
        (status = 404, description = "Notification not found", body = Problem),
    ),
    security(("jwt" = []))
)]
#[put("/notifications/<id>", data = "<notification>")]
#[tracing::instrument]
pub async fn notification_update(
    id: &str,
    notification: JsonBody<'_, NotificationPayload>,
    _auth: AuthUser,
    storage: &State<Storage>,
) -> Result<Json<Notification>, Problem> {
    crud::replace::<Notification>(storage, id, body(notification)?).await
}

#[utoipa::path(
    params(
        ("id", description = "notification ID")
    ),
    responses(
        (status = 200, description = "Notification marked as read", body = Notification),
        (status = 401, description = "Missing/expired token", body = Problem),
        (status = 404, description = "Notification not found", body = Problem),
    ),
    security(("jwt" = []))
)]
#[put("/notifications/<id>/read")]
#[tracing::instrument]
pub async fn notification_mark_read(
    id: &str,
    _auth: AuthUser,
    storage: &State<Storage>,
) -> Result<Json<Notification>, Problem> {
    let id = record_id::<Notification>(id)?;
    Ok(Json(mark_read(&storage.repo(), id).await?))
}

#[utoipa::path(
    params(
        ("id", description = "notification ID")
    ),
    responses(
        (status = 200, description = "Notification deleted", body = Message),
        (status = 401, description = "Missing/expired token", body = Problem),
        (status = 404, description = "Notification not found", body = Problem),
    ),
    security(("jwt" = []))
)]
#[delete("/notifications/<id>")]
#[tracing::instrument]
pub async fn notification_delete(
    id: &str,
    _auth: AuthUser,
    storage: &State<Storage>,
) -> Result<Json<Message>, Problem> {
    crud::delete::<Notification>(storage, id).await
}
