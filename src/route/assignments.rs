use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::State;

use super::crud::{self, body, JsonBody};
use super::Message;
use crate::data::assignment::{Assignment, AssignmentPayload, AssignmentView};
use crate::data::store::Storage;
use crate::resp::auth::AuthUser;
use crate::resp::problem::Problem;

/// Create an assignment
#[utoipa::path(
    request_body = AssignmentPayload,
    responses(
        (status = 201, description = "Assignment created", body = Assignment),
        (status = 400, description = "Invalid request body", body = Problem),
        (status = 401, description = "Missing/expired token", body = Problem),
        (status = 404, description = "Owner, subject or grade not found", body = Problem),
    ),
    security(("jwt" = []))
)]
#[post("/assignment", data = "<assignment>")]
#[tracing::instrument]
pub async fn assignment_create(
    assignment: JsonBody<'_, AssignmentPayload>,
    _auth: AuthUser,
    storage: &State<Storage>,
) -> Result<(Status, Json<Assignment>), Problem> {
    crud::create::<Assignment>(storage, body(assignment)?).await
}

#[utoipa::path(
    responses(
        (status = 200, description = "Every assignment", body = Vec<AssignmentView>),
        (status = 401, description = "Missing/expired token", body = Problem),
    ),
    security(("jwt" = []))
)]
#[get("/assignments")]
#[tracing::instrument]
pub async fn assignment_list(
    _auth: AuthUser,
    storage: &State<Storage>,
) -> Result<Json<Vec<AssignmentView>>, Problem> {
    crud::list::<Assignment>(storage).await
}

#[utoipa::path(
    params(
        ("id", description = "assignment ID")
    ),
    responses(
        (status = 200, description = "Assignment with its owner, subject and grade", body = AssignmentView),
        (status = 401, description = "Missing/expired token", body = Problem),
        (status = 404, description = "Assignment not found", body = Problem),
    ),
    security(("jwt" = []))
)]
#[get("/assignments/<id>")]
#[tracing::instrument]
pub async fn assignment_get(
    id: &str,
    _auth: AuthUser,
    storage: &State<Storage>,
) -> Result<Json<AssignmentView>, Problem> {
    crud::get::<Assignment>(storage, id).await
}

#[utoipa::path(
    params(
        ("uid", description = "owner user ID")
    ),
    responses(
        (status = 200, description = "Assignments of the user", body = Vec<AssignmentView>),
        (status = 401, description = "Missing/expired token", body = Problem),
        (status = 404, description = "User not found", body = Problem),
    ),
    security(("jwt" = []))
)]
#[get("/assignments/user/<uid>")]
#[tracing::instrument]
pub async fn assignment_list_by_user(
    uid: &str,
    _auth: AuthUser,
    storage: &State<Storage>,
) -> Result<Json<Vec<AssignmentView>>, Problem> {
    crud::list_by_owner::<Assignment>(storage, uid).await
}

#[utoipa::path(
    params(
        ("id", description = "assignment ID")
    ),
    request_body = AssignmentPayload,
    responses(
        (status = 200, description = "Updated assignment", body = Assignment),
        (status = 400, description = "Invalid request body", body = Problem),
        (status = 401, description = "Missing/expired token", body = Problem),
        (status = 404, description = "Assignment or referenced record not found", body = Problem),
    ),
    security(("jwt" = []))
)]
#[put("/assignments/<id>", data = "<assignment>")]
#[tracing::instrument]
pub async fn assignment_update(
    id: &str,
    assignment: JsonBody<'_, AssignmentPayload>,
    _auth: AuthUser,
    storage: &State<Storage>,
) -> Result<Json<Assignment>, Problem> {
    crud::replace::<Assignment>(storage, id, body(assignment)?).await
}

#[utoipa::path(
    params(
        ("id", description = "assignment ID")
    ),
    responses(
        (status = 200, description = "Assignment deleted", body = Message),
        (status = 401, description = "Missing/expired token", body = Problem),
        (status = 404, description = "Assignment not found", body = Problem),
    ),
    security(("jwt" = []))
)]
#[delete("/assignments/<id>")]
#[tracing::instrument]
pub async fn assignment_delete(
    id: &str,
    _auth: AuthUser,
    storage: &State<Storage>,
) -> Result<Json<Message>, Problem> {
    crud::delete::<Assignment>(storage, id).await
}

#[cfg(test)]
mod assignment_endpoints {
    use rocket::http::{ContentType, Status};
    use serde_json::{json, Value};
    use uuid::Uuid;

    use crate::test_util::{bearer, client, post_json, sign_up};

    #[rocket::async_test]
    async fn links_grade_and_subject() {
        let client = client().await;
        let (uid, token) = sign_up(&client, "ada@example.com").await;

        let response = post_json(
            &client,
            "/api/subject",
            &token,
            json!({ "subjectTitle": "Physics", "uid": uid }),
        )
        .await;
        let subject: Value = response.into_json().await.expect("subject");

        let response = post_json(
            &client,
            "/api/grade",
            &token,
            json!({ "grade": 7, "outOf": 10, "uid": uid, "s_id": subject["_id"] }),
        )
        .await;
        let grade: Value = response.into_json().await.expect("grade");

        let response = post_json(
            &client,
            "/api/assignment",
            &token,
            json!({
                "name": "Lab report",
                "due_date": "2026-11-01T12:00:00Z",
                "uid": uid,
                "s_id": subject["_id"],
                "g_id": Uuid::new_v4()
            }),
        )
        .await;
        assert_eq!(response.status(), Status::NotFound);
        let body: Value = response.into_json().await.expect("problem body");
        assert_eq!(body["message"], "Grade not found");

        let response = post_json(
            &client,
            "/api/assignment",
            &token,
            json!({
                "name": "Lab report",
                "due_date": "2026-11-01T12:00:00Z",
                "uid": uid,
                "s_id": subject["_id"],
                "g_id": grade["_id"]
            }),
        )
        .await;
        assert_eq!(response.status(), Status::Created);
        let assignment: Value = response.into_json().await.expect("assignment");

        let response = client
            .get(format!(
                "/api/assignments/{}",
                assignment["_id"].as_str().expect("id")
            ))
            .header(bearer(&token))
            .dispatch()
            .await;
        let view: Value = response.into_json().await.expect("assignment view");
        assert_eq!(view["s_id"]["subjectTitle"], "Physics");
        assert_eq!(view["g_id"]["outOf"], 10.0);

        let response = client
            .put(format!(
                "/api/assignments/{}",
                assignment["_id"].as_str().expect("id")
            ))
            .header(ContentType::JSON)
            .header(bearer(&token))
            .body(json!({ "name": "Lab report v2", "uid": uid }).to_string())
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::BadRequest);
        let body: Value = response.into_json().await.expect("problem body");
        assert_eq!(body["message"], "s_id is required");

        let response = client
            .get("/api/assignments")
            .header(bearer(&token))
            .dispatch()
            .await;
        let all: Vec<Value> = response.into_json().await.expect("assignments");
        assert_eq!(all.len(), 1);
    }

    #[rocket::async_test]
    async fn missing_subject_persists_nothing() {
        let client = client().await;
        let (uid, token) = sign_up(&client, "ada@example.com").await;

        let response = post_json(
            &client,
            "/api/assignment",
            &token,
            json!({ "name": "Essay", "uid": uid, "s_id": Uuid::new_v4() }),
        )
        .await;
        assert_eq!(response.status(), Status::NotFound);

        let response = client
            .get(format!("/api/assignments/user/{}", uid))
            .header(bearer(&token))
            .dispatch()
            .await;
        let owned: Vec<Value> = response.into_json().await.expect("assignments");
        assert!(owned.is_empty());
    }
}
