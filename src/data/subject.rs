use bson::{doc, Document};
use chrono::{DateTime, Utc};
use utoipa::ToSchema;
use uuid::Uuid;

use super::entity::{Entity, Kind, Owned, Record, Reference};
use super::projection::{populate, SemesterSummary, TeacherSummary, UserSummary};
use super::store::DocumentStore;
use crate::resp::problem::Problem;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Subject {
    #[serde(rename = "_id")]
    pub id: Uuid,
    #[serde(rename = "subjectTitle")]
    pub subject_title: String,
    #[serde(rename = "targetGrade")]
    pub target_grade: Option<f64>,
    pub room: Option<String>,
    pub uid: Uuid,
    pub t_uid: Option<Uuid>,
    pub semester_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SubjectPayload {
    #[serde(rename = "subjectTitle")]
    pub subject_title: String,
    #[serde(rename = "targetGrade")]
    pub target_grade: Option<f64>,
    pub room: Option<String>,
    pub uid: Option<Uuid>,
    pub t_uid: Option<Uuid>,
    pub semester_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SubjectView {
    #[serde(rename = "_id")]
    pub id: Uuid,
    #[serde(rename = "subjectTitle")]
    pub subject_title: String,
    #[serde(rename = "targetGrade")]
    pub target_grade: Option<f64>,
    pub room: Option<String>,
    pub uid: Option<UserSummary>,
    pub t_uid: Option<TeacherSummary>,
    pub semester_id: Option<SemesterSummary>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for Subject {
    const COLLECTION: &'static str = "subjects";
    const NAME: &'static str = "Subject";

    fn id(&self) -> Uuid {
        self.id
    }
}

impl Owned for Subject {
    const OWNER_FIELD: &'static str = "uid";
}

#[rocket::async_trait]
impl Record for Subject {
    type Payload = SubjectPayload;
    type View = SubjectView;

    fn owner(payload: &SubjectPayload) -> Option<Uuid> {
        payload.uid
    }

    fn references(payload: &SubjectPayload) -> Result<Vec<Reference>, Problem> {
        Ok(vec![
            Reference::optional(Kind::Teacher, payload.t_uid),
            Reference::optional(Kind::Semester, payload.semester_id),
        ])
    }

    fn build(
        id: Uuid,
        owner: Uuid,
        payload: SubjectPayload,
        now: DateTime<Utc>,
    ) -> Result<Self, Problem> {
        Ok(Subject {
            id,
            subject_title: payload.subject_title,
            target_grade: payload.target_grade,
            room: payload.room,
            uid: owner,
            t_uid: payload.t_uid,
            semester_id: payload.semester_id,
            created_at: now,
            updated_at: now,
        })
    }

    fn changes(payload: SubjectPayload) -> Result<Document, Problem> {
        Ok(doc! {
            "subjectTitle": payload.subject_title,
            "targetGrade": payload.target_grade,
            "room": payload.room,
            "t_uid": bson::to_bson(&payload.t_uid)?,
            "semester_id": bson::to_bson(&payload.semester_id)?,
        })
    }

    async fn populate(self, store: &dyn DocumentStore) -> Result<SubjectView, Problem> {
        Ok(SubjectView {
            uid: populate(store, Some(self.uid)).await?,
            t_uid: populate(store, self.t_uid).await?,
            semester_id: populate(store, self.semester_id).await?,
            id: self.id,
            subject_title: self.subject_title,
            target_grade: self.target_grade,
            room: self.room,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}
