use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::State;

use super::crud::{self, body, JsonBody};
use super::Message;
use crate::data::semester::{create_semester, Semester, SemesterPayload, SemesterView};
use crate::data::store::Storage;
use crate::resp::auth::AuthUser;
use crate::resp::problem::Problem;

/// Create a semester
///
/// Without a title the semester is named after the number of existing
/// semesters, e.g. "Semester 3".
#[utoipa::path(
    request_body = SemesterPayload,
    responses(
        (status = 201, description = "Semester created", body = Semester),
        (status = 400, description = "Invalid request body", body = Problem),
        (status = 401, description = "Missing/expired token", body = Problem),
        (status = 404, description = "User not found", body = Problem),
    ),
    security(("jwt" = []))
)]
#[post("/semester", data = "<semester>")]
#[tracing::instrument]
pub async fn semester_create(
    semester: JsonBody<'_, SemesterPayload>,
    _auth: AuthUser,
    storage: &State<Storage>,
) -> Result<(Status, Json<Semester>), Problem> {
    let semester = create_semester(&storage.repo(), body(semester)?).await?;
    Ok((Status::Created, Json(semester)))
}

#[utoipa::path(
    responses(
        (status = 200, description = "Every semester", body = Vec<SemesterView>),
        (status = 401, description = "Missing/expired token", body = Problem),
    ),
    security(("jwt" = []))
)]
#[get("/semesters")]
#[tracing::instrument]
pub async fn semester_list(
    _auth: AuthUser,
    storage: &State<Storage>,
) -> Result<Json<Vec<SemesterView>>, Problem> {
    crud::list::<Semester>(storage).await
}

#[utoipa::path(
    params(
        ("id", description = "semester ID")
    ),
    responses(
        (status = 200, description = "Semester with its owner", body = SemesterView),
        (status = 401, description = "Missing/expired token", body = Problem),
        (status = 404, description = "Semester not found", body = Problem),
    ),
    security(("jwt" = []))
)]
#[get("/semesters/<id>")]
#[tracing::instrument]
pub async fn semester_get(
    id: &str,
    _auth: AuthUser,
    storage: &State<Storage>,
) -> Result<Json<SemesterView>, Problem> {
    crud::get::<Semester>(storage, id).await
}

#[utoipa::path(
    params(
        ("uid", description = "owner user ID")
    ),
    responses(
        (status = 200, description = "Semesters of the user", body = Vec<SemesterView>),
        (status = 401, description = "Missing/expired token", body = Problem),
        (status = 404, description = "User not found", body = Problem),
    ),
    security(("jwt" = []))
)]
#[get("/semesters/user/<uid>")]
#[tracing::instrument]
pub async fn semester_list_by_user(
    uid: &str,
    _auth: AuthUser,
    storage: &State<Storage>,
) -> Result<Json<Vec<SemesterView>>, Problem> {
    crud::list_by_owner::<Semester>(storage, uid).await
}

/// Replace a semester
///
/// A missing title keeps the stored one.
#[utoipa::path(
    params(
        ("id", description = "semester ID")
    ),
    request_body = SemesterPayload,
    responses(
        (status = 200, description = "Updated semester", body = Semester),
        (status = 400, description = "Invalid request body", body = Problem),
        (status = 401, description = "Missing/expired token", body = Problem),
        (status = 404, description = "Semester not found", body = Problem),
    ),
    security(("jwt" = []))
)]
#[put("/semesters/<id>", data = "<semester>")]
#[tracing::instrument]
pub async fn semester_update(
    id: &str,
    semester: JsonBody<'_, SemesterPayload>,
    _auth: AuthUser,
    storage: &State<Storage>,
) -> Result<Json<Semester>, Problem> {
    crud::replace::<Semester>(storage, id, body(semester)?).await
}

#[utoipa::path(
    params(
        ("id", description = "semester ID")
    ),
    responses(
        (status = 200, description = "Semester deleted", body = Message),
        (status = 401, description = "Missing/expired token", body = Problem),
        (status = 404, description = "Semester not found", body = Problem),
    ),
    security(("jwt" = []))
)]
#[delete("/semesters/<id>")]
#[tracing::instrument]
pub async fn semester_delete(
    id: &str,
    _auth: AuthUser,
    storage: &State<Storage>,
) -> Result<Json<Message>, Problem> {
    crud::delete::<Semester>(storage, id).await
}
