use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::State;

use super::crud::{self, body, JsonBody};
use super::Message;
use crate::data::grade::{Grade, GradePayload, GradeView};
use crate::data::store::Storage;
use crate::resp::auth::AuthUser;
use crate::resp::problem::Problem;

/// Record a grade
///
/// The owner is checked first, then the subject and the optional assignment.
#[utoipa::path(
    request_body = GradePayload,
    responses(
        (status = 201, description = "Grade created", body = Grade),
        (status = 400, description = "Invalid request body", body = Problem),
        (status = 401, description = "Missing/expired token", body = Problem),
        (status = 404, description = "Owner, subject or assignment not found", body = Problem),
    ),
    security(("jwt" = []))
)]
#[post("/grade", data = "<grade>")]
#[tracing::instrument]
pub async fn grade_create(
    grade: JsonBody<'_, GradePayload>,
    _auth: AuthUser,
    storage: &State<Storage>,
) -> Result<(Status, Json<Grade>), Problem> {
    crud::create::<Grade>(storage, body(grade)?).await
}

#[utoipa::path(
    responses(
        (status = 200, description = "Every grade", body = Vec<GradeView>),
        (status = 401, description = "Missing/expired token", body = Problem),
    ),
    security(("jwt" = []))
)]
#[get("/grades")]
#[tracing::instrument]
pub async fn grade_list(
    _auth: AuthUser,
    storage: &State<Storage>,
) -> Result<Json<Vec<GradeView>>, Problem> {
    crud::list::<Grade>(storage).await
}

#[utoipa::path(
    params(
        ("id", description = "grade ID")
    ),
    responses(
        (status = 200, description = "Grade with its owner, subject and assignment", body = GradeView),
        (status = 401, description = "Missing/expired token", body = Problem),
        (status = 404, description = "Grade not found", body = Problem),
    ),
    security(("jwt" = []))
)]
#[get("/grades/<id>")]
#[tracing::instrument]
pub async fn grade_get(
    id: &str,
    _auth: AuthUser,
    storage: &State<Storage>,
) -> Result<Json<GradeView>, Problem> {
    crud::get::<Grade>(storage, id).await
}

#[utoipa::path(
    params(
        ("uid", description = "owner user ID")
    ),
    responses(
        (status = 200, description = "Grades of the user", body = Vec<GradeView>),
        (status = 401, description = "Missing/expired token", body = Problem),
        (status = 404, description = "User not found", body = Problem),
    ),
    security(("jwt" = []))
)]
#[get("/grades/user/<uid>")]
#[tracing::instrument]
pub async fn grade_list_by_user(
    uid: &str,
    _auth: AuthUser,
    storage: &State<Storage>,
) -> Result<Json<Vec<GradeView>>, Problem> {
    crud::list_by_owner::<Grade>(storage, uid).await
}

#[utoipa::path(
    params(
        ("id", description = "grade ID")
    ),
    request_body = GradePayload,
    responses(
        (status = 200, description = "Updated grade", body = Grade),
        (status = 400, description = "Invalid request body", body = Problem),
        (status = 401, description = "Missing/expired token", body = Problem),
        (status = 404, description = "Grade or referenced record not found", body = Problem),
    ),
    security(("jwt" = []))
)]
#[put("/grades/<id>", data = "<grade>")]
#[tracing::instrument]
pub async fn grade_update(
    id: &str,
    grade: JsonBody<'_, GradePayload>,
    _auth: AuthUser,
    storage: &State<Storage>,
) -> Result<Json<Grade>, Problem> {
    crud::replace::<Grade>(storage, id, body(grade)?).await
}

#[utoipa::path(
    params(
        ("id", description = "grade ID")
    ),
    responses(
        (status = 200, description = "Grade deleted", body = Message),
        (status = 401, description = "Missing/expired token", body = Problem),
        (status = 404, description = "Grade not found", body = Problem),
    ),
    security(("jwt" = []))
)]
#[delete("/grades/<id>")]
#[tracing::instrument]
pub async fn grade_delete(
    id: &str,
    _auth: AuthUser,
    storage: &State<Storage>,
) -> Result<Json<Message>, Problem> {
    crud::delete::<Grade>(storage, id).await
}

#[cfg(test)]
mod grade_endpoints {
    use rocket::http::{ContentType, Status};
    use serde_json::{json, Value};
    use uuid::Uuid;

    use crate::test_util::{bearer, client, post_json, sign_up};

    #[rocket::async_test]
    async fn subject_is_required() {
        let client = client().await;
        let (uid, token) = sign_up(&client, "ada@example.com").await;

        for grade in [
            json!({ "grade": 18, "outOf": 20, "uid": uid }),
            json!({ "grade": 18, "outOf": 20, "uid": uid, "s_id": Uuid::new_v4() }),
        ] {
            let response = post_json(&client, "/api/grade", &token, grade).await;
            assert_eq!(response.status(), Status::NotFound);
            let body: Value = response.into_json().await.expect("problem body");
            assert_eq!(body["message"], "Subject not found");
        }

        // The owner is checked before anything else.
        let response = post_json(
            &client,
            "/api/grade",
            &token,
            json!({ "grade": 18, "outOf": 20, "uid": Uuid::new_v4(), "s_id": Uuid::new_v4() }),
        )
        .await;
        let body: Value = response.into_json().await.expect("problem body");
        assert_eq!(body["message"], "User not found");
    }

    #[rocket::async_test]
    async fn grade_lifecycle() {
        let client = client().await;
        let (uid, token) = sign_up(&client, "ada@example.com").await;

        let response = post_json(
            &client,
            "/api/subject",
            &token,
            json!({ "subjectTitle": "Algebra", "uid": uid }),
        )
        .await;
        let subject: Value = response.into_json().await.expect("subject");

        let response = post_json(
            &client,
            "/api/grade",
            &token,
            json!({ "grade": 18, "outOf": 20, "uid": uid, "s_id": subject["_id"] }),
        )
        .await;
        assert_eq!(response.status(), Status::Created);
        let grade: Value = response.into_json().await.expect("grade");
        assert!(grade["date"].is_string(), "date defaults to now");
        assert_eq!(grade["created_at"], grade["updated_at"]);

        let uri = format!("/api/grades/{}", grade["_id"].as_str().expect("id"));
        let response = client.get(&uri).header(bearer(&token)).dispatch().await;
        let view: Value = response.into_json().await.expect("grade view");
        assert_eq!(view["s_id"]["subjectTitle"], "Algebra");
        assert_eq!(view["uid"]["email"], "ada@example.com");
        assert!(view["a_id"].is_null());

        let response = client
            .put(&uri)
            .header(ContentType::JSON)
            .header(bearer(&token))
            .body(json!({ "grade": 19, "outOf": 20, "notes": "regraded" }).to_string())
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::BadRequest, "subject stays required");
        let body: Value = response.into_json().await.expect("problem body");
        assert_eq!(body["message"], "s_id is required");

        let response = client
            .put(&uri)
            .header(ContentType::JSON)
            .header(bearer(&token))
            .body(
                json!({ "grade": 19, "outOf": 20, "notes": "regraded", "s_id": subject["_id"] })
                    .to_string(),
            )
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Ok);
        let updated: Value = response.into_json().await.expect("grade");
        assert_eq!(updated["grade"], 19.0);
        assert_eq!(updated["notes"], "regraded");

        let response = client
            .get(format!("/api/grades/user/{}", uid))
            .header(bearer(&token))
            .dispatch()
            .await;
        let grades: Vec<Value> = response.into_json().await.expect("grades");
        assert_eq!(grades.len(), 1);

        let response = client.delete(&uri).header(bearer(&token)).dispatch().await;
        let body: Value = response.into_json().await.expect("message");
        assert_eq!(body["message"], "Grade deleted successfully");

        let response = client.get(&uri).header(bearer(&token)).dispatch().await;
        assert_eq!(response.status(), Status::NotFound);
    }
}
