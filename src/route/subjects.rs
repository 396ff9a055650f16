use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::State;

use super::crud::{self, body, JsonBody};
use super::Message;
use crate::data::store::Storage;
use crate::data::subject::{Subject, SubjectPayload, SubjectView};
use crate::resp::auth::AuthUser;
use crate::resp::problem::Problem;

/// Create a subject
#[utoipa::path(
    request_body = SubjectPayload,
    responses(
        (status = 201, description = "Subject created", body = Subject),
        (status = 400, description = "Invalid request body", body = Problem),
        (status = 401, description = "Missing/expired token", body = Problem),
        (status = 404, description = "Owner, teacher or semester not found", body = Problem),
    ),
    security(("jwt" = []))
)]
#[post("/subject", data = "<subject>")]
#[tracing::instrument]
pub async fn subject_create(
    subject: JsonBody<'_, SubjectPayload>,
    _auth: AuthUser,
    storage: &State<Storage>,
) -> Result<(Status, Json<Subject>), Problem> {
    crud::create::<Subject>(storage, body(subject)?).await
}

/// List all subjects
#[utoipa::path(
    responses(
        (status = 200, description = "Every subject", body = Vec<SubjectView>),
        (status = 401, description = "Missing/expired token", body = Problem),
    ),
    security(("jwt" = []))
)]
#[get("/subjects")]
#[tracing::instrument]
pub async fn subject_list(
    _auth: AuthUser,
    storage: &State<Storage>,
) -> Result<Json<Vec<SubjectView>>, Problem> {
    crud::list::<Subject>(storage).await
}

#[utoipa::path(
    params(
        ("id", description = "subject ID")
    ),
    responses(
        (status = 200, description = "Subject with its owner, teacher and semester", body = SubjectView),
        (status = 401, description = "Missing/expired token", body = Problem),
        (status = 404, description = "Subject not found", body = Problem),
    ),
    security(("jwt" = []))
)]
#[get("/subjects/<id>")]
#[tracing::instrument]
pub async fn subject_get(
    id: &str,
    _auth: AuthUser,
    storage: &State<Storage>,
) -> Result<Json<SubjectView>, Problem> {
    crud::get::<Subject>(storage, id).await
}

#[utoipa::path(
    params(
        ("uid", description = "owner user ID")
    ),
    responses(
        (status = 200, description = "Subjects of the user", body = Vec<SubjectView>),
        (status = 401, description = "Missing/expired token", body = Problem),
        (status = 404, description = "User not found", body = Problem),
    ),
    security(("jwt" = []))
)]
#[get("/subjects/user/<uid>")]
#[tracing::instrument]
pub async fn subject_list_by_user(
    uid: &str,
    _auth: AuthUser,
    storage: &State<Storage>,
) -> Result<Json<Vec<SubjectView>>, Problem> {
    crud::list_by_owner::<Subject>(storage, uid).await
}

/// Replace a subject
#[utoipa::path(
    params(
        ("id", description = "subject ID")
    ),
    request_body = SubjectPayload,
    responses(
        (status = 200, description = "Updated subject", body = Subject),
        (status = 400, description = "Invalid request body", body = Problem),
        (status = 401, description = "Missing/expired token", body = Problem),
        (status = 404, description = "Subject or referenced record not found", body = Problem),
    ),
    security(("jwt" = []))
)]
#[put("/subjects/<id>", data = "<subject>")]
#[tracing::instrument]
pub async fn subject_update(
    id: &str,
    subject: JsonBody<'_, SubjectPayload>,
    _auth: AuthUser,
    storage: &State<Storage>,
) -> Result<Json<Subject>, Problem> {
    crud::replace::<Subject>(storage, id, body(subject)?).await
}

#[utoipa::path(
    params(
        ("id", description = "subject ID")
    ),
    responses(
        (status = 200, description = "Subject deleted", body = Message),
        (status = 401, description = "Missing/expired token", body = Problem),
        (status = 404, description = "Subject not found", body = Problem),
    ),
    security(("jwt" = []))
)]
#[delete("/subjects/<id>")]
#[tracing::instrument]
pub async fn subject_delete(
    id: &str,
    _auth: AuthUser,
    storage: &State<Storage>,
) -> Result<Json<Message>, Problem> {
    crud::delete::<Subject>(storage, id).await
}
