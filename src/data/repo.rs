use bson::Document;
use chrono::Utc;
use uuid::Uuid;

use super::entity::{ensure_references, require, Entity, Kind, Owned, Record, Reference};
use super::store::{field_filter, id_filter, DocumentStore};
use crate::resp::problem::{problems, Problem};

/// Typed access to entity collections of a store.
#[derive(Clone, Copy)]
pub struct Repo<'a> {
    store: &'a dyn DocumentStore,
}

impl<'a> Repo<'a> {
    pub fn new(store: &'a dyn DocumentStore) -> Repo<'a> {
        Repo { store }
    }

    pub async fn find<E: Entity>(&self, id: Uuid) -> Result<Option<E>, Problem> {
        match self.store.find_one(E::COLLECTION, id_filter(id)?).await? {
            Some(document) => Ok(Some(bson::from_document(document)?)),
            None => Ok(None),
        }
    }

    /// Like [`Repo::find`], failing with 404 when the record is absent.
    pub async fn get<E: Entity>(&self, id: Uuid) -> Result<E, Problem> {
        self.find(id)
            .await?
            .ok_or_else(|| problems::not_found(E::NAME))
    }

    pub async fn find_by<E: Entity>(&self, filter: Document) -> Result<Option<E>, Problem> {
        match self.store.find_one(E::COLLECTION, filter).await? {
            Some(document) => Ok(Some(bson::from_document(document)?)),
            None => Ok(None),
        }
    }

    pub async fn list_by<E: Entity>(&self, filter: Document) -> Result<Vec<E>, Problem> {
        let documents = self.store.find(E::COLLECTION, filter).await?;
        let mut records = Vec::with_capacity(documents.len());
        for document in documents {
            records.push(bson::from_document(document)?);
        }
        Ok(records)
    }

    pub async fn list<E: Entity>(&self) -> Result<Vec<E>, Problem> {
        self.list_by(Document::new()).await
    }

    pub async fn ensure(&self, references: &[Reference]) -> Result<(), Problem> {
        ensure_references(self.store, references).await
    }

    /// Records owned by `owner`; 404 when the owner doesn't exist.
    pub async fn list_by_owner<E: Owned>(&self, owner: Uuid) -> Result<Vec<E>, Problem> {
        self.ensure(&[Reference::required(Kind::User, Some(owner))])
            .await?;
        self.list_by(field_filter(E::OWNER_FIELD, owner)?).await
    }

    pub async fn insert<E: Entity>(&self, record: &E) -> Result<(), Problem> {
        let document = bson::to_document(record)?;
        self.store.insert_one(E::COLLECTION, document).await?;
        Ok(())
    }

    /// Like [`Repo::insert`], but yields `false` when a unique key is already taken.
    pub async fn insert_unique<E: Entity>(&self, record: &E) -> Result<bool, Problem> {
        let document = bson::to_document(record)?;
        match self.store.insert_one(E::COLLECTION, document).await {
            Ok(()) => Ok(true),
            Err(e) if e.is_duplicate() => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Sets `changes` and refreshes `updated_at`.
    pub async fn update<E: Entity>(&self, id: Uuid, mut changes: Document) -> Result<E, Problem> {
        changes.insert("updated_at", bson::to_bson(&Utc::now())?);

        match self
            .store
            .update_one(E::COLLECTION, id_filter(id)?, changes)
            .await?
        {
            Some(document) => Ok(bson::from_document(document)?),
            None => Err(problems::not_found(E::NAME)),
        }
    }

    pub async fn delete<E: Entity>(&self, id: Uuid) -> Result<E, Problem> {
        match self.store.delete_one(E::COLLECTION, id_filter(id)?).await? {
            Some(document) => Ok(bson::from_document(document)?),
            None => Err(problems::not_found(E::NAME)),
        }
    }

    pub async fn count<E: Entity>(&self) -> Result<u64, Problem> {
        Ok(self.store.count(E::COLLECTION).await?)
    }

    /// Validates the owner and the other references, then persists a new record.
    pub async fn create<R: Record>(&self, payload: R::Payload) -> Result<R, Problem> {
        let owner = R::owner(&payload);
        let mut references = vec![Reference::required(Kind::User, owner)];
        references.extend(R::references(&payload)?);
        self.ensure(&references).await?;

        let owner = require(Kind::User, owner)?;
        let record = R::build(Uuid::new_v4(), owner, payload, Utc::now())?;
        self.insert(&record).await?;

        tracing::debug!("created {} {}", R::NAME, record.id());
        Ok(record)
    }

    /// Full replace of the updatable fields of an existing record.
    pub async fn replace<R: Record>(&self, id: Uuid, payload: R::Payload) -> Result<R, Problem> {
        let references = R::references(&payload)?;
        let changes = R::changes(payload)?;
        self.ensure(&references).await?;
        self.update(id, changes).await
    }

    pub async fn view<R: Record>(&self, record: R) -> Result<R::View, Problem> {
        record.populate(self.store).await
    }

    pub async fn views<R: Record>(&self, records: Vec<R>) -> Result<Vec<R::View>, Problem> {
        let mut views = Vec::with_capacity(records.len());
        for record in records {
            views.push(record.populate(self.store).await?);
        }
        Ok(views)
    }
}
