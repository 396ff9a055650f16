use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::State;

use super::crud::{self, body, JsonBody};
use super::Message;
use crate::data::store::Storage;
use crate::data::timetable::{TimeTable, TimeTablePayload, TimeTableView};
use crate::resp::auth::AuthUser;
use crate::resp::problem::Problem;

/// Add a timetable entry
#[utoipa::path(
    request_body = TimeTablePayload,
    responses(
        (status = 201, description = "Entry created", body = TimeTable),
        (status = 400, description = "Invalid request body", body = Problem),
        (status = 401, description = "Missing/expired token", body = Problem),
        (status = 404, description = "Owner, subject or teacher not found", body = Problem),
    ),
    security(("jwt" = []))
)]
#[post("/timetable", data = "<entry>")]
#[tracing::instrument]
pub async fn timetable_create(
    entry: JsonBody<'_, TimeTablePayload>,
    _auth: AuthUser,
    storage: &State<Storage>,
) -> Result<(Status, Json<TimeTable>), Problem> {
    crud::create::<TimeTable>(storage, body(entry)?).await
}

#[utoipa::path(
    responses(
        (status = 200, description = "Every timetable entry", body = Vec<TimeTableView>),
        (status = 401, description = "Missing/expired token", body = Problem),
    ),
    security(("jwt" = []))
)]
#[get("/timetable")]
#[tracing::instrument]
pub async fn timetable_list(
    _auth: AuthUser,
    storage: &State<Storage>,
) -> Result<Json<Vec<TimeTableView>>, Problem> {
    crud::list::<TimeTable>(storage).await
}

#[utoipa::path(
    params(
        ("id", description = "timetable entry ID")
    ),
    responses(
        (status = 200, description = "Entry with its owner, subject and teacher", body = TimeTableView),
        (status = 401, description = "Missing/expired token", body = Problem),
        (status = 404, description = "Timetable entry not found", body = Problem),
    ),
    security(("jwt" = []))
)]
#[get("/timetable/<id>")]
#[tracing::instrument]
pub async fn timetable_get(
    id: &str,
    _auth: AuthUser,
    storage: &State<Storage>,
) -> Result<Json<TimeTableView>, Problem> {
    crud::get::<TimeTable>(storage, id).await
}

#[utoipa::path(
    params(
        ("uid", description = "owner user ID")
    ),
    responses(
        (status = 200, description = "Timetable of the user", body = Vec<TimeTableView>),
        (status = 401, description = "Missing/expired token", body = Problem),
        (status = 404, description = "User not found", body = Problem),
    ),
    security(("jwt" = []))
)]
#[get("/timetable/user/<uid>")]
#[tracing::instrument]
pub async fn timetable_list_by_user(
    uid: &str,
    _auth: AuthUser,
    storage: &State<Storage>,
) -> Result<Json<Vec<TimeTableView>>, Problem> {
    crud::list_by_owner::<TimeTable>(storage, uid).await
}

#[utoipa::path(
    params(
        ("id", description = "timetable entry ID")
    ),
    request_body = TimeTablePayload,
    responses(
        (status = 200, description = "Updated entry", body = TimeTable),
        (status = 400, description = "Invalid request body", body = Problem),
        (status = 401, description = "Missing/expired token", body = Problem),
        (status = 404, description = "Entry or referenced record not found", body = Problem),
    ),
    security(("jwt" = []))
)]
#[put("/timetable/<id>", data = "<entry>")]
#[tracing::instrument]
pub async fn timetable_update(
    id: &str,
    entry: JsonBody<'_, TimeTablePayload>,
    _auth: AuthUser,
    storage: &State<Storage>,
) -> Result<Json<TimeTable>, Problem> {
    crud::replace::<TimeTable>(storage, id, body(entry)?).await
}

#[utoipa::path(
    params(
        ("id", description = "timetable entry ID")
    ),
    responses(
        (status = 200, description = "Entry deleted", body = Message),
        (status = 401, description = "Missing/expired token", body = Problem),
        (status = 404, description = "Timetable entry not found", body = Problem),
    ),
    security(("jwt" = []))
)]
#[delete("/timetable/<id>")]
#[tracing::instrument]
pub async fn timetable_delete(
    id: &str,
    _auth: AuthUser,
    storage: &State<Storage>,
) -> Result<Json<Message>, Problem> {
    crud::delete::<TimeTable>(storage, id).await
}
