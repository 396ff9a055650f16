use bson::{doc, Document};
use chrono::{DateTime, Utc};
use utoipa::ToSchema;
use uuid::Uuid;

use super::entity::{Entity, Owned, Record, Reference};
use super::projection::{populate, UserSummary};
use super::repo::Repo;
use super::store::DocumentStore;
use crate::resp::problem::Problem;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Semester {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub title: String,
    #[serde(rename = "startDate")]
    pub start_date: DateTime<Utc>,
    #[serde(rename = "endDate")]
    pub end_date: DateTime<Utc>,
    pub uid: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SemesterPayload {
    /// Assigned as "Semester N" when left out on creation.
    pub title: Option<String>,
    #[serde(rename = "startDate")]
    pub start_date: DateTime<Utc>,
    #[serde(rename = "endDate")]
    pub end_date: DateTime<Utc>,
    pub uid: Option<Uuid>,
}

impl SemesterPayload {
    fn explicit_title(&self) -> Option<&str> {
        self.title.as_deref().filter(|it| !it.trim().is_empty())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SemesterView {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub title: String,
    #[serde(rename = "startDate")]
    pub start_date: DateTime<Utc>,
    #[serde(rename = "endDate")]
    pub end_date: DateTime<Utc>,
    pub uid: Option<UserSummary>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for Semester {
    const COLLECTION: &'static str = "semesters";
    const NAME: &'static str = "Semester";

    fn id(&self) -> Uuid {
        self.id
    }
}

impl Owned for Semester {
    const OWNER_FIELD: &'static str = "uid";
}

#[rocket::async_trait]
impl Record for Semester {
    type Payload = SemesterPayload;
    type View = SemesterView;

    fn owner(payload: &SemesterPayload) -> Option<Uuid> {
        payload.uid
    }

    fn references(_: &SemesterPayload) -> Result<Vec<Reference>, Problem> {
        Ok(vec![])
    }

    fn build(
        id: Uuid,
        owner: Uuid,
        payload: SemesterPayload,
        now: DateTime<Utc>,
    ) -> Result<Self, Problem> {
        Ok(Semester {
            id,
            title: payload.explicit_title().unwrap_or_default().to_string(),
            start_date: payload.start_date,
            end_date: payload.end_date,
            uid: owner,
            created_at: now,
            updated_at: now,
        })
    }

    /// An omitted title keeps the stored one.
    fn changes(payload: SemesterPayload) -> Result<Document, Problem> {
        let mut changes = doc! {
            "startDate": bson::to_bson(&payload.start_date)?,
            "endDate": bson::to_bson(&payload.end_date)?,
        };
        if let Some(title) = payload.explicit_title() {
            changes.insert("title", title);
        }
        Ok(changes)
    }

    async fn populate(self, store: &dyn DocumentStore) -> Result<SemesterView, Problem> {
        Ok(SemesterView {
            uid: populate(store, Some(self.uid)).await?,
            id: self.id,
            title: self.title,
            start_date: self.start_date,
            end_date: self.end_date,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Creates a semester, numbering it after the existing ones when no title
/// was given.
pub async fn create_semester(
    repo: &Repo<'_>,
    mut payload: SemesterPayload,
) -> Result<Semester, Problem> {
    if payload.explicit_title().is_none() {
        let count = repo.count::<Semester>().await?;
        payload.title = Some(default_title(count));
    }
    repo.create::<Semester>(payload).await
}

#[inline]
fn default_title(existing: u64) -> String {
    format!("Semester {}", existing + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::memory::MemoryStore;
    use crate::data::user::User;
    use chrono::Duration;

    async fn owner(store: &MemoryStore) -> Uuid {
        let id = Uuid::new_v4();
        let user = doc! { "_id": bson::to_bson(&id).expect("uuid"), "email": format!("{}@b.co", id) };
        store
            .insert_one(User::COLLECTION, user)
            .await
            .expect("insert user");
        id
    }

    fn payload(uid: Uuid, title: Option<&str>) -> SemesterPayload {
        let start = Utc::now();
        SemesterPayload {
            title: title.map(str::to_string),
            start_date: start,
            end_date: start + Duration::days(120),
            uid: Some(uid),
        }
    }

    #[rocket::async_test]
    async fn untitled_semesters_are_numbered() {
        let store = MemoryStore::new();
        let repo = Repo::new(&store);
        let uid = owner(&store).await;

        let first = create_semester(&repo, payload(uid, None)).await.expect("first");
        let named = create_semester(&repo, payload(uid, Some("Fall")))
            .await
            .expect("named");
        let third = create_semester(&repo, payload(uid, Some("  ")))
            .await
            .expect("third");

        assert_eq!(first.title, "Semester 1");
        assert_eq!(named.title, "Fall");
        assert_eq!(third.title, "Semester 3");
    }

    #[rocket::async_test]
    async fn replace_without_title_keeps_it() {
        let store = MemoryStore::new();
        let repo = Repo::new(&store);
        let uid = owner(&store).await;
        let semester = create_semester(&repo, payload(uid, Some("Spring")))
            .await
            .expect("created");

        let replaced = repo
            .replace::<Semester>(semester.id, payload(uid, None))
            .await
            .expect("replaced");
        assert_eq!(replaced.title, "Spring");
        assert_eq!(replaced.uid, uid);
    }
}
