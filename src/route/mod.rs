use rocket::{Build, Request, Rocket, Route};

pub mod assignments;
pub mod auth;
pub mod crud;
pub mod events;
pub mod grades;
pub mod notifications;
pub mod semesters;
pub mod settings;
pub mod subjects;
pub mod teachers;
pub mod timetable;
pub mod users;

use assignments::*;
use auth::*;
use events::*;
use grades::*;
use notifications::*;
use semesters::*;
use settings::*;
use subjects::*;
use teachers::*;
use timetable::*;
use users::*;

use utoipa::{OpenApi, ToSchema};
use utoipa_swagger_ui::SwaggerUi;

use crate::data::entity::Entity;
use crate::{
    data::{
        assignment as ad, event as ed, grade as gd, notification as nd, projection as pd,
        semester as sd, settings as usd, subject as subd, teacher as td, timetable as ttd,
        user::db::{UserLoginData, UserSignupData, UserUpdateData},
        user::{User, UserResponse},
    },
    resp::{
        jwt::doc::JWTAuth,
        problem::{problems, Problem},
    },
    role::Role,
};

/// Plain `{ "message": ... }` response body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Message {
    pub message: String,
}

impl Message {
    pub fn new(message: impl ToString) -> Message {
        Message {
            message: message.to_string(),
        }
    }

    pub fn deleted<E: Entity>() -> Message {
        Message::new(format!("{} deleted successfully", E::NAME))
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(signin, signup, signout),
    components(schemas(TokenResponse, SignupResponse, UserLoginData, UserSignupData, Message)),
    modifiers(&AUTH_PREFIX)
)]
pub struct AuthDoc;

#[derive(OpenApi)]
#[openapi(
    paths(
        user_create,
        user_list,
        user_get,
        user_update,
        user_delete,
        subject_create,
        subject_list,
        subject_get,
        subject_list_by_user,
        subject_update,
        subject_delete,
        grade_create,
        grade_list,
        grade_get,
        grade_list_by_user,
        grade_update,
        grade_delete,
        assignment_create,
        assignment_list,
        assignment_get,
        assignment_list_by_user,
        assignment_update,
        assignment_delete,
        semester_create,
        semester_list,
        semester_get,
        semester_list_by_user,
        semester_update,
        semester_delete,
        teacher_create,
        teacher_list,
        teacher_get,
        teacher_list_by_user,
        teacher_update,
        teacher_delete,
        timetable_create,
        timetable_list,
        timetable_get,
        timetable_list_by_user,
        timetable_update,
        timetable_delete,
        notification_create,
        notification_list,
        notification_get,
        notification_list_by_user,
        notification_update,
        notification_mark_read,
        notification_delete,
        settings_upsert,
        settings_get,
        settings_delete,
        event_create,
        event_list,
        event_get,
        event_list_by_user,
        event_update,
        event_delete,
    ),
    components(schemas(
        Role,
        User,
        UserResponse,
        UserUpdateData,
        subd::Subject,
        subd::SubjectPayload,
        subd::SubjectView,
        gd::Grade,
        gd::GradePayload,
        gd::GradeView,
        ad::Assignment,
        ad::AssignmentPayload,
        ad::AssignmentView,
        sd::Semester,
        sd::SemesterPayload,
        sd::SemesterView,
        td::Teacher,
        td::TeacherPayload,
        td::TeacherView,
        ttd::TimeTable,
        ttd::TimeTablePayload,
        ttd::TimeTableView,
        nd::Notification,
        nd::NotificationType,
        nd::NotificationPayload,
        nd::NotificationView,
        usd::UserSettings,
        usd::UserSettingsPayload,
        usd::NotificationPreferences,
        usd::Privacy,
        usd::ProfileVisibility,
        ed::Event,
        ed::EventType,
        ed::EventPayload,
        ed::EventView,
        pd::UserSummary,
        pd::SubjectSummary,
        pd::AssignmentSummary,
        pd::TeacherSummary,
        pd::SemesterSummary,
        pd::GradeSummary,
        Message,
        Problem
    )),
    modifiers(&JWTAuth, &API_PREFIX)
)]
pub struct ApiDoc;

pub struct PathPrefix(pub &'static str);
static API_PREFIX: PathPrefix = PathPrefix("/api");
static AUTH_PREFIX: PathPrefix = PathPrefix("/auth");

impl utoipa::Modify for PathPrefix {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.paths.paths = std::mem::take(&mut openapi.paths.paths)
            .into_iter()
            .map(|(path, item)| (self.0.to_string() + path.as_ref(), item))
            .collect();
    }
}

/// Complete document served at `/api/openapi.json`.
pub fn openapi() -> utoipa::openapi::OpenApi {
    let mut doc = ApiDoc::openapi();
    doc.merge(AuthDoc::openapi());
    doc
}

pub fn auth_routes() -> Vec<Route> {
    routes![signin, signup, signout]
}

pub fn api_routes() -> Vec<Route> {
    routes![
        user_create,
        user_list,
        user_get,
        user_update,
        user_delete,
        subject_create,
        subject_list,
        subject_get,
        subject_list_by_user,
        subject_update,
        subject_delete,
        grade_create,
        grade_list,
        grade_get,
        grade_list_by_user,
        grade_update,
        grade_delete,
        assignment_create,
        assignment_list,
        assignment_get,
        assignment_list_by_user,
        assignment_update,
        assignment_delete,
        semester_create,
        semester_list,
        semester_get,
        semester_list_by_user,
        semester_update,
        semester_delete,
        teacher_create,
        teacher_list,
        teacher_get,
        teacher_list_by_user,
        teacher_update,
        teacher_delete,
        timetable_create,
        timetable_list,
        timetable_get,
        timetable_list_by_user,
        timetable_update,
        timetable_delete,
        notification_create,
        notification_list,
        notification_get,
        notification_list_by_user,
        notification_update,
        notification_mark_read,
        notification_delete,
        settings_upsert,
        settings_get,
        settings_delete,
        event_create,
        event_list,
        event_get,
        event_list_by_user,
        event_update,
        event_delete,
    ]
}

#[get("/")]
pub fn index() -> &'static str {
    "Academic Management Platform Backend is running"
}

///////////////////////
//      CATCHERS
///////////////////////

#[catch(401)]
fn unauthorized(req: &Request) -> Problem {
    req.local_cache(|| None::<Problem>)
        .clone()
        .unwrap_or_else(|| problems::unauthorized("No session token provided."))
}

#[catch(403)]
fn forbidden() -> Problem {
    problems::forbidden()
}

#[catch(404)]
fn not_found() -> Problem {
    problems::not_found("Resource")
}

#[catch(422)]
fn unprocessable() -> Problem {
    problems::invalid_body("Request body couldn't be processed.")
}

#[catch(500)]
fn internal_error() -> Problem {
    problems::internal("Internal server error", "unhandled failure")
}

#[catch(default)]
fn fallback(status: rocket::http::Status, _req: &Request) -> Problem {
    Problem::new(status, status.reason().unwrap_or("Request failed"))
}

pub fn mount_api(rocket: Rocket<Build>) -> Rocket<Build> {
    rocket
        .mount("/auth", auth_routes())
        .mount("/api", api_routes())
        .mount(
            "/",
            SwaggerUi::new("/swagger/<_..>").url("/api/openapi.json", openapi()),
        )
        .mount("/", routes![index])
        .register(
            "/",
            catchers![
                unauthorized,
                forbidden,
                not_found,
                unprocessable,
                internal_error,
                fallback
            ],
        )
}
