use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::State;

use super::crud::{self, body, JsonBody};
use super::Message;
use crate::data::event::{Event, EventPayload, EventView};
use crate::data::store::Storage;
use crate::resp::auth::AuthUser;
use crate::resp::problem::Problem;

/// Create a calendar event
///
/// A `related_id` must come with a `relatedModel` naming where it points.
#[utoipa::path(
    request_body = EventPayload,
    responses(
        (status = 201, description = "Event created", body = Event),
        (status = 400, description = "Invalid request body or related model", body = Problem),
        (status = 401, description = "Missing/expired token", body = Problem),
        (status = 404, description = "User or related record not found", body = Problem),
    ),
    security(("jwt" = []))
)]
#[post("/event", data = "<event>")]
#[tracing::instrument]
pub async fn event_create(
    event: JsonBody<'_, EventPayload>,
    _auth: AuthUser,
    storage: &State<Storage>,
) -> Result<(Status, Json<Event>), Problem> {
    crud::create::<Event>(storage, body(event)?).await
}

#[utoipa::path(
    responses(
        (status = 200, description = "Every event", body = Vec<EventView>),
        (status = 401, description = "Missing/expired token", body = Problem),
    ),
    security(("jwt" = []))
)]
#[get("/events")]
#[tracing::instrument]
pub async fn event_list(
    _auth: AuthUser,
    storage: &State<Storage>,
) -> Result<Json<Vec<EventView>>, Problem> {
    crud::list::<Event>(storage).await
}

#[utoipa::path(
    params(
        ("id", description = "event ID")
    ),
    responses(
        (status = 200, description = "Event with its owner", body = EventView),
        (status = 401, description = "Missing/expired token", body = Problem),
        (status = 404, description = "Event not found", body = Problem),
    ),
    security(("jwt" = []))
)]
#[get("/events/<id>")]
#[tracing::instrument]
pub async fn event_get(
    id: &str,
    _auth: AuthUser,
    storage: &State<Storage>,
) -> Result<Json<EventView>, Problem> {
    crud::get::<Event>(storage, id).await
}

#[utoipa::path(
    params(
        ("uid", description = "owner user ID")
    ),
    responses(
        (status = 200, description = "Events of the user", body = Vec<EventView>),
        (status = 401, description = "Missing/expired token", body = Problem),
        (status = 404, description = "User not found", body = Problem),
    ),
    security(("jwt" = []))
)]
#[get("/events/user/<uid>")]
#[tracing::instrument]
pub async fn event_list_by_user(
    uid: &str,
    _auth: AuthUser,
    storage: &State<Storage>,
) -> Result<Json<Vec<EventView>>, Problem> {
    crud::list_by_owner::<Event>(storage, uid).await
}

#[utoipa::path(
    params(
        ("id", description = "event ID")
    ),
    request_body = EventPayload,
    responses(
        (status = 200, description = "Updated event", body = Event),
        (status = 400, description = "Invalid request body or related model", body = Problem),
        (status = 401, description = "Missing/expired token", body = Problem),
        (status = 404, description = "Event or related record not found", body = Problem),
    ),
    security(("jwt" = []))
)]
#[put("/events/<id>", data = "<event>")]
#[tracing::instrument]
pub async fn event_update(
    id: &str,
    event: JsonBody<'_, EventPayload>,
    _auth: AuthUser,
    storage: &State<Storage>,
) -> Result<Json<Event>, Problem> {
    crud::replace::<Event>(storage, id, body(event)?).await
}

#[utoipa::path(
    params(
        ("id", description = "event ID")
    ),
    responses(
        (status = 200, description = "Event deleted", body = Message),
        (status = 401, description = "Missing/expired token", body = Problem),
        (status = 404, description = "Event not found", body = Problem),
    ),
    security(("jwt" = []))
)]
#[delete("/events/<id>")]
#[tracing::instrument]
pub async fn event_delete(
    id: &str,
    _auth: AuthUser,
    storage: &State<Storage>,
) -> Result<Json<Message>, Problem> {
    crud::delete::<Event>(storage, id).await
}
