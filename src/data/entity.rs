use bson::Document;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;

use super::assignment::Assignment;
use super::grade::Grade;
use super::semester::Semester;
use super::store::{id_filter, DocumentStore};
use super::subject::Subject;
use super::teacher::Teacher;
use super::user::User;
use crate::resp::problem::{problems, Problem};

/// A document type stored in its own collection under a `_id` UUID.
pub trait Entity: Serialize + DeserializeOwned + Send + Sync + 'static {
    const COLLECTION: &'static str;
    /// Display name used in "not found" and "deleted" messages.
    const NAME: &'static str;

    fn id(&self) -> Uuid;
}

/// Entity belonging to a single user.
pub trait Owned: Entity {
    const OWNER_FIELD: &'static str;
}

/// Owned entity managed through the generic create/replace/read flow.
#[rocket::async_trait]
pub trait Record: Owned {
    /// Request body for both create and full replace.
    type Payload: Send + Sync;
    /// Read representation with referenced records projected in.
    type View: Serialize + Send;

    fn owner(payload: &Self::Payload) -> Option<Uuid>;

    /// References other than the owner, in the order they are checked.
    fn references(payload: &Self::Payload) -> Result<Vec<Reference>, Problem>;

    fn build(
        id: Uuid,
        owner: Uuid,
        payload: Self::Payload,
        now: DateTime<Utc>,
    ) -> Result<Self, Problem>;

    /// Values for every updatable field. Fields missing from the payload are
    /// present here as nulls. The owner is never part of it.
    fn changes(payload: Self::Payload) -> Result<Document, Problem>;

    async fn populate(self, store: &dyn DocumentStore) -> Result<Self::View, Problem>;
}

/// Collections a reference can point into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    User,
    Subject,
    Grade,
    Assignment,
    Semester,
    Teacher,
}

impl Kind {
    pub fn name(self) -> &'static str {
        match self {
            Kind::User => User::NAME,
            Kind::Subject => Subject::NAME,
            Kind::Grade => Grade::NAME,
            Kind::Assignment => Assignment::NAME,
            Kind::Semester => Semester::NAME,
            Kind::Teacher => Teacher::NAME,
        }
    }

    pub fn collection(self) -> &'static str {
        match self {
            Kind::User => User::COLLECTION,
            Kind::Subject => Subject::COLLECTION,
            Kind::Grade => Grade::COLLECTION,
            Kind::Assignment => Assignment::COLLECTION,
            Kind::Semester => Semester::COLLECTION,
            Kind::Teacher => Teacher::COLLECTION,
        }
    }

    /// Kinds an event may be related to, by model name.
    pub fn related_model(model: &str) -> Option<Kind> {
        match model {
            "Subject" => Some(Kind::Subject),
            "Grade" => Some(Kind::Grade),
            "Assignment" => Some(Kind::Assignment),
            "User" => Some(Kind::User),
            _ => None,
        }
    }
}

/// A foreign key to check before a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reference {
    pub kind: Kind,
    pub id: Option<Uuid>,
    pub required: bool,
}

impl Reference {
    pub fn required(kind: Kind, id: Option<Uuid>) -> Reference {
        Reference {
            kind,
            id,
            required: true,
        }
    }

    pub fn optional(kind: Kind, id: Option<Uuid>) -> Reference {
        Reference {
            kind,
            id,
            required: false,
        }
    }
}

/// Unwraps a required reference, failing the same way a dangling one does.
#[inline]
pub fn require(kind: Kind, id: Option<Uuid>) -> Result<Uuid, Problem> {
    id.ok_or_else(|| problems::not_found(kind.name()))
}

/// Unwraps a required reference field of an update body; leaving it out is a
/// validation failure.
#[inline]
pub fn required_field(field: &str, id: Option<Uuid>) -> Result<Uuid, Problem> {
    id.ok_or_else(|| problems::bad_request(format!("{} is required", field)))
}

/// Resolves every reference in order and stops at the first one that is
/// missing. Absent optional references are skipped.
pub async fn ensure_references(
    store: &dyn DocumentStore,
    references: &[Reference],
) -> Result<(), Problem> {
    for reference in references {
        let id = match reference.id {
            Some(it) => it,
            None if reference.required => return Err(problems::not_found(reference.kind.name())),
            None => continue,
        };

        let found = store
            .find_one(reference.kind.collection(), id_filter(id)?)
            .await?;
        if found.is_none() {
            tracing::debug!("{:?} reference {} does not resolve", reference.kind, id);
            return Err(problems::not_found(reference.kind.name()).insert_str("id", id));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::memory::MemoryStore;
    use bson::doc;
    use rocket::http::Status;

    async fn store_with_user(id: Uuid) -> MemoryStore {
        let store = MemoryStore::new();
        store
            .insert_one(
                User::COLLECTION,
                doc! { "_id": bson::to_bson(&id).expect("uuid"), "email": "a@b.co" },
            )
            .await
            .expect("insert");
        store
    }

    #[rocket::async_test]
    async fn resolved_and_absent_optional_references_pass() {
        let user = Uuid::new_v4();
        let store = store_with_user(user).await;

        let result = ensure_references(
            &store,
            &[
                Reference::required(Kind::User, Some(user)),
                Reference::optional(Kind::Teacher, None),
            ],
        )
        .await;
        assert!(result.is_ok());
    }

    #[rocket::async_test]
    async fn first_missing_reference_is_reported() {
        let user = Uuid::new_v4();
        let store = store_with_user(user).await;

        let problem = ensure_references(
            &store,
            &[
                Reference::required(Kind::User, Some(user)),
                Reference::required(Kind::Subject, Some(Uuid::new_v4())),
                Reference::optional(Kind::Assignment, Some(Uuid::new_v4())),
            ],
        )
        .await
        .expect_err("subject is missing");

        assert_eq!(problem.status, Status::NotFound);
        assert_eq!(problem.message, "Subject not found");
    }

    #[rocket::async_test]
    async fn absent_required_reference_is_not_found() {
        let store = MemoryStore::new();

        let problem = ensure_references(&store, &[Reference::required(Kind::User, None)])
            .await
            .expect_err("owner is required");
        assert_eq!(problem.message, "User not found");
    }

    #[test]
    fn related_models_are_restricted() {
        assert_eq!(Kind::related_model("Grade"), Some(Kind::Grade));
        assert_eq!(Kind::related_model("Teacher"), None);
        assert_eq!(Kind::related_model("subject"), None);
    }

    #[test]
    fn missing_update_field_is_a_validation_error() {
        let id = Uuid::new_v4();
        assert_eq!(required_field("s_id", Some(id)), Ok(id));

        let problem = required_field("subject_id", None).expect_err("field left out");
        assert_eq!(problem.status, Status::BadRequest);
        assert_eq!(problem.message, "subject_id is required");
    }
}
