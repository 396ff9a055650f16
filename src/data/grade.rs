use bson::{doc, Document};
use chrono::{DateTime, Utc};
use utoipa::ToSchema;
use uuid::Uuid;

use super::entity::{require, required_field, Entity, Kind, Owned, Record, Reference};
use super::projection::{populate, AssignmentSummary, SubjectSummary, UserSummary};
use super::store::DocumentStore;
use crate::resp::problem::Problem;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Grade {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub grade: f64,
    #[serde(rename = "outOf")]
    pub out_of: f64,
    pub notes: Option<String>,
    pub date: DateTime<Utc>,
    pub uid: Uuid,
    pub s_id: Uuid,
    pub a_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct GradePayload {
    pub grade: f64,
    #[serde(rename = "outOf")]
    pub out_of: f64,
    pub notes: Option<String>,
    /// Defaults to the time of the request.
    pub date: Option<DateTime<Utc>>,
    pub uid: Option<Uuid>,
    pub s_id: Option<Uuid>,
    pub a_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct GradeView {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub grade: f64,
    #[serde(rename = "outOf")]
    pub out_of: f64,
    pub notes: Option<String>,
    pub date: DateTime<Utc>,
    pub uid: Option<UserSummary>,
    pub s_id: Option<SubjectSummary>,
    pub a_id: Option<AssignmentSummary>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for Grade {
    const COLLECTION: &'static str = "grades";
    const NAME: &'static str = "Grade";

    fn id(&self) -> Uuid {
        self.id
    }
}

impl Owned for Grade {
    const OWNER_FIELD: &'static str = "uid";
}

#[rocket::async_trait]
impl Record for Grade {
    type Payload = GradePayload;
    type View = GradeView;

    fn owner(payload: &GradePayload) -> Option<Uuid> {
        payload.uid
    }

    fn references(payload: &GradePayload) -> Result<Vec<Reference>, Problem> {
        Ok(vec![
            Reference::required(Kind::Subject, payload.s_id),
            Reference::optional(Kind::Assignment, payload.a_id),
        ])
    }

    fn build(
        id: Uuid,
        owner: Uuid,
        payload: GradePayload,
        now: DateTime<Utc>,
    ) -> Result<Self, Problem> {
        Ok(Grade {
            id,
            grade: payload.grade,
            out_of: payload.out_of,
            notes: payload.notes,
            date: payload.date.unwrap_or(now),
            uid: owner,
            s_id: require(Kind::Subject, payload.s_id)?,
            a_id: payload.a_id,
            created_at: now,
            updated_at: now,
        })
    }

    fn changes(payload: GradePayload) -> Result<Document, Problem> {
        Ok(doc! {
            "grade": payload.grade,
            "outOf": payload.out_of,
            "notes": payload.notes,
            "date": bson::to_bson(&payload.date.unwrap_or_else(Utc::now))?,
            "s_id": bson::to_bson(&required_field("s_id", payload.s_id)?)?,
            "a_id": bson::to_bson(&payload.a_id)?,
        })
    }

    async fn populate(self, store: &dyn DocumentStore) -> Result<GradeView, Problem> {
        Ok(GradeView {
            uid: populate(store, Some(self.uid)).await?,
            s_id: populate(store, Some(self.s_id)).await?,
            a_id: populate(store, self.a_id).await?,
            id: self.id,
            grade: self.grade,
            out_of: self.out_of,
            notes: self.notes,
            date: self.date,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}
