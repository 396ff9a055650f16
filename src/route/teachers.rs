use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::State;

use super::crud::{self, body, record_id, JsonBody};
use super::Message;
use crate::data::store::Storage;
use crate::data::teacher::{create_teacher, replace_teacher, Teacher, TeacherPayload, TeacherView};
use crate::resp::auth::AuthUser;
use crate::resp::problem::Problem;

/// Create a teacher
#[utoipa::path(
    request_body = TeacherPayload,
    responses(
        (status = 201, description = "Teacher created", body = Teacher),
        (status = 400, description = "Invalid request body or school email already in use", body = Problem),
        (status = 401, description = "Missing/expired token", body = Problem),
        (status = 404, description = "User not found", body = Problem),
    ),
    security(("jwt" = []))
)]
#[post("/teacher", data = "<teacher>")]
#[tracing::instrument]
pub async fn teacher_create(
    teacher: JsonBody<'_, TeacherPayload>,
    _auth: AuthUser,
    storage: &State<Storage>,
) -> Result<(Status, Json<Teacher>), Problem> {
    let teacher = create_teacher(&storage.repo(), body(teacher)?).await?;
    Ok((Status::Created, Json(teacher)))
}

#[utoipa::path(
    responses(
        (status = 200, description = "Every teacher", body = Vec<TeacherView>),
        (status = 401, description = "Missing/expired token", body = Problem),
    ),
    security(("jwt" = []))
)]
#[get("/teachers")]
#[tracing::instrument]
pub async fn teacher_list(
    _auth: AuthUser,
    storage: &State<Storage>,
) -> Result<Json<Vec<TeacherView>>, Problem> {
    crud::list::<Teacher>(storage).await
}

#[utoipa::path(
    params(
        ("id", description = "teacher ID")
    ),
    responses(
        (status = 200, description = "Teacher with its owner", body = TeacherView),
        (status = 401, description = "Missing/expired token", body = Problem),
        (status = 404, description = "Teacher not found", body = Problem),
    ),
    security(("jwt" = []))
)]
#[get("/teachers/<id>")]
#[tracing::instrument]
pub async fn teacher_get(
    id: &str,
    _auth: AuthUser,
    storage: &State<Storage>,
) -> Result<Json<TeacherView>, Problem> {
    crud::get::<Teacher>(storage, id).await
}

#[utoipa::path(
    params(
        ("uid", description = "owner user ID")
    ),
    responses(
        (status = 200, description = "Teachers added by the user", body = Vec<TeacherView>),
        (status = 401, description = "Missing/expired token", body = Problem),
        (status = 404, description = "User not found", body = Problem),
    ),
    security(("jwt" = []))
)]
#[get("/teachers/user/<uid>")]
#[tracing::instrument]
pub async fn teacher_list_by_user(
    uid: &str,
    _auth: AuthUser,
    storage: &State<Storage>,
) -> Result<Json<Vec<TeacherView>>, Problem> {
    crud::list_by_owner::<Teacher>(storage, uid).await
}

#[utoipa::path(
    params(
        ("id", description = "teacher ID")
    ),
    request_body = TeacherPayload,
    responses(
        (status = 200, description = "Updated teacher", body = Teacher),
        (status = 400, description = "Invalid request body or school email already in use", body = Problem),
        (status = 401, description = "Missing/expired token", body = Problem),
        (status = 404, description = "Teacher not found", body = Problem),
    ),
    security(("jwt" = []))
)]
#[put("/teachers/<id>", data = "<teacher>")]
#[tracing::instrument]
pub async fn teacher_update(
    id: &str,
    teacher: JsonBody<'_, TeacherPayload>,
    _auth: AuthUser,
    storage: &State<Storage>,
) -> Result<Json<Teacher>, Problem> {
    let id = record_id::<Teacher>(id)?;
    let teacher = replace_teacher(&storage.repo(), id, body(teacher)?).await?;
    Ok(Json(teacher))
}

#[utoipa::path(
    params(
        ("id", description = "teacher ID")
    ),
    responses(
        (status = 200, description = "Teacher deleted", body = Message),
        (status = 401, description = "Missing/expired token", body = Problem),
        (status = 404, description = "Teacher not found", body = Problem),
    ),
    security(("jwt" = []))
)]
#[delete("/teachers/<id>")]
#[tracing::instrument]
pub async fn teacher_delete(
    id: &str,
    _auth: AuthUser,
    storage: &State<Storage>,
) -> Result<Json<Message>, Problem> {
    crud::delete::<Teacher>(storage, id).await
}
