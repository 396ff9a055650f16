use std::collections::HashMap;

use bson::Document;
use tokio::sync::RwLock;

use super::mongo::UNIQUE_KEYS;
use super::store::DocumentStore;
use crate::error::StoreError;

/// Process-local store. Used by the tests and by `store: memory` runs.
///
/// Enforces the same unique keys as the database indexes.
#[derive(Debug)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, Vec<Document>>>,
    unique: Vec<(String, String)>,
}

impl MemoryStore {
    pub fn new() -> MemoryStore {
        MemoryStore {
            collections: RwLock::new(HashMap::new()),
            unique: UNIQUE_KEYS
                .iter()
                .map(|(c, f)| (c.to_string(), f.to_string()))
                .collect(),
        }
    }

    fn unique_fields<'a>(&'a self, collection: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.unique
            .iter()
            .filter(move |(c, _)| c == collection)
            .map(|(_, f)| f.as_str())
    }

    /// Whether `candidate` would collide with a document other than `skip`.
    fn collides(
        &self,
        collection: &str,
        documents: &[Document],
        candidate: &Document,
        skip: Option<usize>,
    ) -> bool {
        self.unique_fields(collection).any(|field| {
            let value = match candidate.get(field) {
                Some(it) => it,
                None => return false,
            };
            documents
                .iter()
                .enumerate()
                .filter(|(i, _)| Some(*i) != skip)
                .any(|(_, d)| d.get(field) == Some(value))
        })
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        MemoryStore::new()
    }
}

fn matches(document: &Document, filter: &Document) -> bool {
    filter
        .iter()
        .all(|(key, expected)| document.get(key) == Some(expected))
}

#[rocket::async_trait]
impl DocumentStore for MemoryStore {
    async fn find_one(
        &self,
        collection: &str,
        filter: Document,
    ) -> Result<Option<Document>, StoreError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.iter().find(|d| matches(d, &filter)))
            .cloned())
    }

    async fn find(&self, collection: &str, filter: Document) -> Result<Vec<Document>, StoreError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .filter(|d| matches(d, &filter))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn insert_one(&self, collection: &str, document: Document) -> Result<(), StoreError> {
        let mut collections = self.collections.write().await;
        let documents = collections.entry(collection.to_string()).or_default();

        if self.collides(collection, documents, &document, None) {
            return Err(StoreError::Duplicate(collection.to_string()));
        }
        documents.push(document);
        Ok(())
    }

    async fn update_one(
        &self,
        collection: &str,
        filter: Document,
        changes: Document,
    ) -> Result<Option<Document>, StoreError> {
        let mut collections = self.collections.write().await;
        let documents = match collections.get_mut(collection) {
            Some(it) => it,
            None => return Ok(None),
        };
        let index = match documents.iter().position(|d| matches(d, &filter)) {
            Some(it) => it,
            None => return Ok(None),
        };

        let mut updated = documents[index].clone();
        for (key, value) in changes {
            updated.insert(key, value);
        }
        if self.collides(collection, documents, &updated, Some(index)) {
            return Err(StoreError::Duplicate(collection.to_string()));
        }

        documents[index] = updated.clone();
        Ok(Some(updated))
    }

    async fn delete_one(
        &self,
        collection: &str,
        filter: Document,
    ) -> Result<Option<Document>, StoreError> {
        let mut collections = self.collections.write().await;
        let documents = match collections.get_mut(collection) {
            Some(it) => it,
            None => return Ok(None),
        };

        Ok(documents
            .iter()
            .position(|d| matches(d, &filter))
            .map(|index| documents.remove(index)))
    }

    async fn count(&self, collection: &str) -> Result<u64, StoreError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .map(|docs| docs.len() as u64)
            .unwrap_or(0))
    }
}
