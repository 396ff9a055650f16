use bson::{doc, Document};
use chrono::{DateTime, Utc};
use utoipa::ToSchema;
use uuid::Uuid;

use super::entity::{require, required_field, Entity, Kind, Owned, Record, Reference};
use super::projection::{populate, GradeSummary, SubjectSummary, UserSummary};
use super::store::DocumentStore;
use crate::resp::problem::Problem;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Assignment {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: String,
    pub due_date: Option<DateTime<Utc>>,
    pub uid: Uuid,
    pub s_id: Uuid,
    pub g_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct AssignmentPayload {
    pub name: String,
    pub due_date: Option<DateTime<Utc>>,
    pub uid: Option<Uuid>,
    pub s_id: Option<Uuid>,
    pub g_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AssignmentView {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: String,
    pub due_date: Option<DateTime<Utc>>,
    pub uid: Option<UserSummary>,
    pub s_id: Option<SubjectSummary>,
    pub g_id: Option<GradeSummary>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for Assignment {
    const COLLECTION: &'static str = "assignments";
    const NAME: &'static str = "Assignment";

    fn id(&self) -> Uuid {
        self.id
    }
}

impl Owned for Assignment {
    const OWNER_FIELD: &'static str = "uid";
}

#[rocket::async_trait]
impl Record for Assignment {
    type Payload = AssignmentPayload;
    type View = AssignmentView;

    fn owner(payload: &AssignmentPayload) -> Option<Uuid> {
        payload.uid
    }

    fn references(payload: &AssignmentPayload) -> Result<Vec<Reference>, Problem> {
        Ok(vec![
            Reference::required(Kind::Subject, payload.s_id),
            Reference::optional(Kind::Grade, payload.g_id),
        ])
    }

    fn build(
        id: Uuid,
        owner: Uuid,
        payload: AssignmentPayload,
        now: DateTime<Utc>,
    ) -> Result<Self, Problem> {
        Ok(Assignment {
            id,
            name: payload.name,
            due_date: payload.due_date,
            uid: owner,
            s_id: require(Kind::Subject, payload.s_id)?,
            g_id: payload.g_id,
            created_at: now,
            updated_at: now,
        })
    }

    fn changes(payload: AssignmentPayload) -> Result<Document, Problem> {
        Ok(doc! {
            "name": payload.name,
            "due_date": bson::to_bson(&payload.due_date)?,
            "s_id": bson::to_bson(&required_field("s_id", payload.s_id)?)?,
            "g_id": bson::to_bson(&payload.g_id)?,
        })
    }

    async fn populate(self, store: &dyn DocumentStore) -> Result<AssignmentView, Problem> {
        Ok(AssignmentView {
            uid: populate(store, Some(self.uid)).await?,
            s_id: populate(store, Some(self.s_id)).await?,
            g_id: populate(store, self.g_id).await?,
            id: self.id,
            name: self.name,
            due_date: self.due_date,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}
