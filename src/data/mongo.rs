use bson::{doc, Document};
use mongodb::options::{FindOneAndUpdateOptions, IndexOptions, ReturnDocument};
use mongodb::{Database, IndexModel};
use rocket::futures::TryStreamExt;

use super::entity::Entity;
use super::settings::UserSettings;
use super::store::DocumentStore;
use super::teacher::Teacher;
use super::user::User;
use crate::error::StoreError;

#[rocket::async_trait]
impl DocumentStore for Database {
    async fn find_one(
        &self,
        collection: &str,
        filter: Document,
    ) -> Result<Option<Document>, StoreError> {
        Ok(self
            .collection::<Document>(collection)
            .find_one(filter, None)
            .await?)
    }

    async fn find(&self, collection: &str, filter: Document) -> Result<Vec<Document>, StoreError> {
        let cursor = self
            .collection::<Document>(collection)
            .find(filter, None)
            .await?;

        Ok(cursor.try_collect().await?)
    }

    async fn insert_one(&self, collection: &str, document: Document) -> Result<(), StoreError> {
        self.collection::<Document>(collection)
            .insert_one(document, None)
            .await?;
        Ok(())
    }

    async fn update_one(
        &self,
        collection: &str,
        filter: Document,
        changes: Document,
    ) -> Result<Option<Document>, StoreError> {
        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();

        Ok(self
            .collection::<Document>(collection)
            .find_one_and_update(filter, doc! { "$set": changes }, options)
            .await?)
    }

    async fn delete_one(
        &self,
        collection: &str,
        filter: Document,
    ) -> Result<Option<Document>, StoreError> {
        Ok(self
            .collection::<Document>(collection)
            .find_one_and_delete(filter, None)
            .await?)
    }

    async fn count(&self, collection: &str) -> Result<u64, StoreError> {
        Ok(self
            .collection::<Document>(collection)
            .count_documents(None, None)
            .await?)
    }
}

/// Unique keys enforced by the database.
pub const UNIQUE_KEYS: &[(&str, &str)] = &[
    (User::COLLECTION, "email"),
    (Teacher::COLLECTION, "school_email"),
    (UserSettings::COLLECTION, "userId"),
];

pub async fn ensure_indexes(db: &Database) -> Result<(), mongodb::error::Error> {
    for (collection, field) in UNIQUE_KEYS {
        tracing::debug!("ensuring unique index on {}.{}", collection, field);

        let mut keys = Document::new();
        keys.insert(*field, 1);
        let index = IndexModel::builder()
            .keys(keys)
            .options(IndexOptions::builder().unique(true).build())
            .build();

        db.collection::<Document>(collection)
            .create_index(index, None)
            .await?;
    }
    Ok(())
}
