use bson::{doc, Document};
use chrono::{DateTime, Utc};
use utoipa::ToSchema;
use uuid::Uuid;

use super::entity::{Entity, Kind, Owned, Record, Reference};
use super::projection::{populate, UserSummary};
use super::store::DocumentStore;
use crate::resp::problem::{problems, Problem};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum EventType {
    Assignment,
    Exam,
    Reminder,
}

/// Calendar entry, optionally linked to a subject, grade, assignment or user.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Event {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: EventType,
    pub description: Option<String>,
    pub date: DateTime<Utc>,
    pub user_id: Uuid,
    pub related_id: Option<Uuid>,
    #[serde(rename = "relatedModel")]
    pub related_model: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct EventPayload {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: EventType,
    pub description: Option<String>,
    pub date: DateTime<Utc>,
    pub user_id: Option<Uuid>,
    pub related_id: Option<Uuid>,
    /// One of `Subject`, `Grade`, `Assignment` or `User`.
    #[serde(rename = "relatedModel")]
    pub related_model: Option<String>,
}

impl EventPayload {
    fn related(&self) -> Result<Option<Kind>, Problem> {
        match (&self.related_id, &self.related_model) {
            (_, Some(model)) => Kind::related_model(model)
                .map(Some)
                .ok_or_else(invalid_related_model),
            (Some(_), None) => Err(invalid_related_model()),
            (None, None) => Ok(None),
        }
    }
}

#[inline]
fn invalid_related_model() -> Problem {
    problems::bad_request("Invalid related model")
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EventView {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: EventType,
    pub description: Option<String>,
    pub date: DateTime<Utc>,
    pub user_id: Option<UserSummary>,
    pub related_id: Option<Uuid>,
    #[serde(rename = "relatedModel")]
    pub related_model: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for Event {
    const COLLECTION: &'static str = "events";
    const NAME: &'static str = "Event";

    fn id(&self) -> Uuid {
        self.id
    }
}

impl Owned for Event {
    const OWNER_FIELD: &'static str = "user_id";
}

#[rocket::async_trait]
impl Record for Event {
    type Payload = EventPayload;
    type View = EventView;

    fn owner(payload: &EventPayload) -> Option<Uuid> {
        payload.user_id
    }

    fn references(payload: &EventPayload) -> Result<Vec<Reference>, Problem> {
        Ok(match (payload.related()?, payload.related_id) {
            (Some(kind), Some(id)) => vec![Reference::required(kind, Some(id))],
            _ => vec![],
        })
    }

    fn build(
        id: Uuid,
        owner: Uuid,
        payload: EventPayload,
        now: DateTime<Utc>,
    ) -> Result<Self, Problem> {
        Ok(Event {
            id,
            name: payload.name,
            kind: payload.kind,
            description: payload.description,
            date: payload.date,
            user_id: owner,
            related_id: payload.related_id,
            related_model: payload.related_model,
            created_at: now,
            updated_at: now,
        })
    }

    fn changes(payload: EventPayload) -> Result<Document, Problem> {
        Ok(doc! {
            "name": payload.name,
            "type": bson::to_bson(&payload.kind)?,
            "description": payload.description,
            "date": bson::to_bson(&payload.date)?,
            "related_id": bson::to_bson(&payload.related_id)?,
            "relatedModel": payload.related_model,
        })
    }

    async fn populate(self, store: &dyn DocumentStore) -> Result<EventView, Problem> {
        Ok(EventView {
            user_id: populate(store, Some(self.user_id)).await?,
            id: self.id,
            name: self.name,
            kind: self.kind,
            description: self.description,
            date: self.date,
            related_id: self.related_id,
            related_model: self.related_model,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}
