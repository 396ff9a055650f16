use std::ops::Deref;
use std::sync::Arc;

use bson::{doc, Bson, Document};
use uuid::Uuid;

use super::repo::Repo;
use crate::error::StoreError;

/// Document collections the backend reads and writes. Filters are plain
/// equality documents.
#[rocket::async_trait]
pub trait DocumentStore: Send + Sync {
    async fn find_one(&self, collection: &str, filter: Document)
        -> Result<Option<Document>, StoreError>;

    async fn find(&self, collection: &str, filter: Document) -> Result<Vec<Document>, StoreError>;

    async fn insert_one(&self, collection: &str, document: Document) -> Result<(), StoreError>;

    /// Sets `changes` on the first matching document and returns it as stored
    /// after the update.
    async fn update_one(
        &self,
        collection: &str,
        filter: Document,
        changes: Document,
    ) -> Result<Option<Document>, StoreError>;

    /// Removes the first matching document and returns it.
    async fn delete_one(&self, collection: &str, filter: Document)
        -> Result<Option<Document>, StoreError>;

    async fn count(&self, collection: &str) -> Result<u64, StoreError>;
}

/// Managed state handle over the configured store.
#[derive(Clone)]
pub struct Storage(Arc<dyn DocumentStore>);

impl Storage {
    pub fn new(store: impl DocumentStore + 'static) -> Storage {
        Storage(Arc::new(store))
    }

    pub fn repo(&self) -> Repo<'_> {
        Repo::new(self.0.as_ref())
    }
}

impl Deref for Storage {
    type Target = dyn DocumentStore;

    fn deref(&self) -> &Self::Target {
        self.0.as_ref()
    }
}

impl std::fmt::Debug for Storage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Storage")
    }
}

#[inline]
pub fn id_value(id: Uuid) -> Result<Bson, StoreError> {
    Ok(bson::to_bson(&id)?)
}

#[inline]
pub fn id_filter(id: Uuid) -> Result<Document, StoreError> {
    Ok(doc! { "_id": id_value(id)? })
}

#[inline]
pub fn field_filter(field: &str, id: Uuid) -> Result<Document, StoreError> {
    let mut filter = Document::new();
    filter.insert(field, id_value(id)?);
    Ok(filter)
}
