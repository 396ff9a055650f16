use bson::{doc, Document};
use chrono::{DateTime, Utc};
use utoipa::ToSchema;
use uuid::Uuid;

use super::entity::{Entity, Owned, Record, Reference};
use super::projection::{populate, UserSummary};
use super::repo::Repo;
use super::store::DocumentStore;
use crate::resp::problem::Problem;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum NotificationType {
    #[default]
    Info,
    Reminder,
    Alert,
    Success,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Notification {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub title: String,
    pub message: String,
    #[serde(rename = "type", default)]
    pub kind: NotificationType,
    #[serde(default)]
    pub read: bool,
    pub uid: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body for creating or replacing a notification. The read flag is only set
/// through the mark-as-read operation.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct NotificationPayload {
    pub title: String,
    pub message: String,
    #[serde(rename = "type", default)]
    pub kind: NotificationType,
    pub uid: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NotificationView {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub title: String,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: NotificationType,
    pub read: bool,
    pub uid: Option<UserSummary>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for Notification {
    const COLLECTION: &'static str = "notifications";
    const NAME: &'static str = "Notification";

    fn id(&self) -> Uuid {
        self.id
    }
}

impl Owned for Notification {
    const OWNER_FIELD: &'static str = "uid";
}

#[rocket::async_trait]
impl Record for Notification {
    type Payload = NotificationPayload;
    type View = NotificationView;

    fn owner(payload: &NotificationPayload) -> Option<Uuid> {
        payload.uid
    }

    fn references(_: &NotificationPayload) -> Result<Vec<Reference>, Problem> {
        Ok(vec![])
    }

    fn build(
        id: Uuid,
        owner: Uuid,
        payload: NotificationPayload,
        now: DateTime<Utc>,
    ) -> Result<Self, Problem> {
        Ok(Notification {
            id,
            title: payload.title,
            message: payload.message,
            kind: payload.kind,
            read: false,
            uid: owner,
            created_at: now,
            updated_at: now,
        })
    }

    fn changes(payload: NotificationPayload) -> Result<Document, Problem> {
        Ok(doc! {
            "title": payload.title,
            "message": payload.message,
            "type": bson::to_bson(&payload.kind)?,
        })
    }

    async fn populate(self, store: &dyn DocumentStore) -> Result<NotificationView, Problem> {
        Ok(NotificationView {
            uid: populate(store, Some(self.uid)).await?,
            id: self.id,
            title: self.title,
            message: self.message,
            kind: self.kind,
            read: self.read,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Sets the read flag. Marking an already read notification is a no-op
/// besides the timestamp.
pub async fn mark_read(repo: &Repo<'_>, id: Uuid) -> Result<Notification, Problem> {
    repo.update::<Notification>(id, doc! { "read": true }).await
}
