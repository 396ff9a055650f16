use bson::{doc, Document};
use chrono::{DateTime, Utc};
use utoipa::ToSchema;
use uuid::Uuid;

use super::entity::{require, required_field, Entity, Kind, Owned, Record, Reference};
use super::projection::{populate, SubjectSummary, TeacherSummary, UserSummary};
use super::store::DocumentStore;
use crate::resp::problem::Problem;

/// A weekly timetable slot.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TimeTable {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub day_of_week: String,
    pub start_time: String,
    pub end_time: String,
    #[serde(default)]
    pub room: String,
    #[serde(default)]
    pub note: String,
    pub uid: Uuid,
    pub subject_id: Uuid,
    pub t_uid: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct TimeTablePayload {
    #[schema(example = "Monday")]
    pub day_of_week: String,
    #[schema(example = "09:00 AM")]
    pub start_time: String,
    #[schema(example = "10:30 AM")]
    pub end_time: String,
    #[serde(default)]
    pub room: String,
    #[serde(default)]
    pub note: String,
    pub uid: Option<Uuid>,
    pub subject_id: Option<Uuid>,
    pub t_uid: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TimeTableView {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub day_of_week: String,
    pub start_time: String,
    pub end_time: String,
    pub room: String,
    pub note: String,
    pub uid: Option<UserSummary>,
    pub subject_id: Option<SubjectSummary>,
    pub t_uid: Option<TeacherSummary>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for TimeTable {
    const COLLECTION: &'static str = "timetables";
    const NAME: &'static str = "Timetable entry";

    fn id(&self) -> Uuid {
        self.id
    }
}

impl Owned for TimeTable {
    const OWNER_FIELD: &'static str = "uid";
}

#[rocket::async_trait]
impl Record for TimeTable {
    type Payload = TimeTablePayload;
    type View = TimeTableView;

    fn owner(payload: &TimeTablePayload) -> Option<Uuid> {
        payload.uid
    }

    fn references(payload: &TimeTablePayload) -> Result<Vec<Reference>, Problem> {
        Ok(vec![
            Reference::required(Kind::Subject, payload.subject_id),
            Reference::optional(Kind::Teacher, payload.t_uid),
        ])
    }

    fn build(
        id: Uuid,
        owner: Uuid,
        payload: TimeTablePayload,
        now: DateTime<Utc>,
    ) -> Result<Self, Problem> {
        Ok(TimeTable {
            id,
            day_of_week: payload.day_of_week,
            start_time: payload.start_time,
            end_time: payload.end_time,
            room: payload.room,
            note: payload.note,
            uid: owner,
            subject_id: require(Kind::Subject, payload.subject_id)?,
            t_uid: payload.t_uid,
            created_at: now,
            updated_at: now,
        })
    }

    fn changes(payload: TimeTablePayload) -> Result<Document, Problem> {
        Ok(doc! {
            "day_of_week": payload.day_of_week,
            "start_time": payload.start_time,
            "end_time": payload.end_time,
            "room": payload.room,
            "note": payload.note,
            "subject_id": bson::to_bson(&required_field("subject_id", payload.subject_id)?)?,
            "t_uid": bson::to_bson(&payload.t_uid)?,
        })
    }

    async fn populate(self, store: &dyn DocumentStore) -> Result<TimeTableView, Problem> {
        Ok(TimeTableView {
            uid: populate(store, Some(self.uid)).await?,
            subject_id: populate(store, Some(self.subject_id)).await?,
            t_uid: populate(store, self.t_uid).await?,
            id: self.id,
            day_of_week: self.day_of_week,
            start_time: self.start_time,
            end_time: self.end_time,
            room: self.room,
            note: self.note,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}
