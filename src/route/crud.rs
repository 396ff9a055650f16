use rocket::http::Status;
use rocket::serde::json::{self, Json};
use uuid::Uuid;

use super::Message;
use crate::data::entity::{Entity, Record};
use crate::data::store::Storage;
use crate::data::user::User;
use crate::resp::problem::{problems, Problem};

/// JSON data guard that lets the handler answer malformed bodies itself.
pub type JsonBody<'r, T> = Result<Json<T>, json::Error<'r>>;

pub fn body<T>(data: JsonBody<'_, T>) -> Result<T, Problem> {
    match data {
        Ok(it) => Ok(it.into_inner()),
        Err(e) => {
            tracing::debug!("rejected request body: {}", e);
            Err(problems::invalid_body(e))
        }
    }
}

/// Parses a record id from the path. An unparseable id can't name an
/// existing record.
pub fn record_id<E: Entity>(raw: &str) -> Result<Uuid, Problem> {
    Uuid::parse_str(raw).map_err(|_| problems::not_found(E::NAME))
}

pub async fn create<R: Record>(
    storage: &Storage,
    payload: R::Payload,
) -> Result<(Status, Json<R>), Problem> {
    let record = storage.repo().create::<R>(payload).await?;
    Ok((Status::Created, Json(record)))
}

pub async fn get<R: Record>(storage: &Storage, id: &str) -> Result<Json<R::View>, Problem> {
    let repo = storage.repo();
    let record = repo.get::<R>(record_id::<R>(id)?).await?;
    Ok(Json(repo.view(record).await?))
}

pub async fn list<R: Record>(storage: &Storage) -> Result<Json<Vec<R::View>>, Problem> {
    let repo = storage.repo();
    let records = repo.list::<R>().await?;
    Ok(Json(repo.views(records).await?))
}

pub async fn list_by_owner<R: Record>(
    storage: &Storage,
    owner: &str,
) -> Result<Json<Vec<R::View>>, Problem> {
    let repo = storage.repo();
    let records = repo.list_by_owner::<R>(record_id::<User>(owner)?).await?;
    Ok(Json(repo.views(records).await?))
}

pub async fn replace<R: Record>(
    storage: &Storage,
    id: &str,
    payload: R::Payload,
) -> Result<Json<R>, Problem> {
    let id = record_id::<R>(id)?;
    Ok(Json(storage.repo().replace::<R>(id, payload).await?))
}

pub async fn delete<R: Record>(storage: &Storage, id: &str) -> Result<Json<Message>, Problem> {
    storage.repo().delete::<R>(record_id::<R>(id)?).await?;
    Ok(Json(Message::deleted::<R>()))
}
