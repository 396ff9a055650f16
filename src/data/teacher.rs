use bson::{doc, Document};
use chrono::{DateTime, Utc};
use utoipa::ToSchema;
use uuid::Uuid;

use super::entity::{Entity, Owned, Record, Reference};
use super::projection::{populate, UserSummary};
use super::repo::Repo;
use super::store::DocumentStore;
use crate::resp::problem::{problems, Problem};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Teacher {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub school_email: String,
    pub uid: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct TeacherPayload {
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    #[schema(format = "email")]
    pub school_email: String,
    pub uid: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TeacherView {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub school_email: String,
    pub uid: Option<UserSummary>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for Teacher {
    const COLLECTION: &'static str = "teachers";
    const NAME: &'static str = "Teacher";

    fn id(&self) -> Uuid {
        self.id
    }
}

impl Owned for Teacher {
    const OWNER_FIELD: &'static str = "uid";
}

#[rocket::async_trait]
impl Record for Teacher {
    type Payload = TeacherPayload;
    type View = TeacherView;

    fn owner(payload: &TeacherPayload) -> Option<Uuid> {
        payload.uid
    }

    fn references(_: &TeacherPayload) -> Result<Vec<Reference>, Problem> {
        Ok(vec![])
    }

    fn build(
        id: Uuid,
        owner: Uuid,
        payload: TeacherPayload,
        now: DateTime<Utc>,
    ) -> Result<Self, Problem> {
        Ok(Teacher {
            id,
            first_name: payload.first_name,
            last_name: payload.last_name,
            phone: payload.phone,
            school_email: payload.school_email,
            uid: owner,
            created_at: now,
            updated_at: now,
        })
    }

    fn changes(payload: TeacherPayload) -> Result<Document, Problem> {
        Ok(doc! {
            "first_name": payload.first_name,
            "last_name": payload.last_name,
            "phone": payload.phone,
            "school_email": payload.school_email,
        })
    }

    async fn populate(self, store: &dyn DocumentStore) -> Result<TeacherView, Problem> {
        Ok(TeacherView {
            uid: populate(store, Some(self.uid)).await?,
            id: self.id,
            first_name: self.first_name,
            last_name: self.last_name,
            phone: self.phone,
            school_email: self.school_email,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[inline]
fn school_email_in_use() -> Problem {
    problems::conflict("School email already in use")
}

/// Fails when another teacher than `except` already uses `school_email`.
async fn ensure_school_email_free(
    repo: &Repo<'_>,
    school_email: &str,
    except: Option<Uuid>,
) -> Result<(), Problem> {
    let existing = repo
        .find_by::<Teacher>(doc! { "school_email": school_email })
        .await?;

    match existing {
        Some(teacher) if Some(teacher.id) != except => Err(school_email_in_use()),
        _ => Ok(()),
    }
}

fn duplicate_as_conflict(result: Result<Teacher, Problem>) -> Result<Teacher, Problem> {
    match result {
        Err(p) if p.status.code == 400 && p.internal.is_some() => Err(school_email_in_use()),
        other => other,
    }
}

pub async fn create_teacher(repo: &Repo<'_>, payload: TeacherPayload) -> Result<Teacher, Problem> {
    ensure_school_email_free(repo, &payload.school_email, None).await?;
    duplicate_as_conflict(repo.create::<Teacher>(payload).await)
}

pub async fn replace_teacher(
    repo: &Repo<'_>,
    id: Uuid,
    payload: TeacherPayload,
) -> Result<Teacher, Problem> {
    repo.get::<Teacher>(id).await?;
    ensure_school_email_free(repo, &payload.school_email, Some(id)).await?;
    duplicate_as_conflict(repo.replace::<Teacher>(id, payload).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::memory::MemoryStore;
    use crate::data::user::User;
    use rocket::http::Status;

    fn payload(uid: Uuid, school_email: &str) -> TeacherPayload {
        TeacherPayload {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            phone: "555-0100".to_string(),
            school_email: school_email.to_string(),
            uid: Some(uid),
        }
    }

    #[rocket::async_test]
    async fn school_email_is_unique() {
        let store = MemoryStore::new();
        let repo = Repo::new(&store);
        let uid = Uuid::new_v4();
        store
            .insert_one(
                User::COLLECTION,
                doc! { "_id": bson::to_bson(&uid).expect("uuid"), "email": "u@b.co" },
            )
            .await
            .expect("insert user");

        let first = create_teacher(&repo, payload(uid, "ada@school.edu"))
            .await
            .expect("first teacher");
        let second = create_teacher(&repo, payload(uid, "grace@school.edu"))
            .await
            .expect("second teacher");

        let dup = create_teacher(&repo, payload(uid, "ada@school.edu"))
            .await
            .expect_err("duplicate school email");
        assert_eq!(dup.status, Status::BadRequest);
        assert_eq!(dup.message, "School email already in use");

        let steal = replace_teacher(&repo, second.id, payload(uid, "ada@school.edu"))
            .await
            .expect_err("taken by first");
        assert_eq!(steal.message, "School email already in use");

        replace_teacher(&repo, first.id, payload(uid, "ada@school.edu"))
            .await
            .expect("keeping own email");
    }
}
