use rocket::http::{ContentType, Header};
use rocket::local::asynchronous::{Client, LocalResponse};
use serde_json::Value;
use uuid::Uuid;

use crate::config::Config;
use crate::data::memory::MemoryStore;
use crate::data::store::Storage;
use crate::resp::jwt::SessionToken;
use crate::security::Security;

pub const TEST_SECRET: &str = "campus-test-secret";
pub const TEST_PASSWORD: &str = "password123";

/// Tracked client over a fresh in-memory store.
pub async fn client() -> Client {
    let rocket = crate::build(
        Config::for_tests(),
        Storage::new(MemoryStore::new()),
        Security::from_secret(TEST_SECRET),
    )
    .expect("valid rocket");

    Client::tracked(rocket).await.expect("valid rocket instance")
}

/// Registers a user and returns its id along with the issued token.
pub async fn sign_up(client: &Client, email: &str) -> (Uuid, String) {
    let user_name = email.split('@').next().unwrap_or(email);
    let response = client
        .post("/auth/signup")
        .header(ContentType::JSON)
        .body(
            serde_json::json!({
                "userName": user_name,
                "email": email,
                "password": TEST_PASSWORD
            })
            .to_string(),
        )
        .dispatch()
        .await;
    assert_eq!(response.status(), rocket::http::Status::Created);

    let body: Value = response.into_json().await.expect("signup response");
    let id = body["user"]["_id"]
        .as_str()
        .and_then(|it| Uuid::parse_str(it).ok())
        .expect("user id");
    let token = body["token"].as_str().expect("token").to_string();

    (id, token)
}

pub fn bearer(token: &str) -> Header<'static> {
    Header::new("Authorization", format!("Bearer {}", token))
}

pub fn token_for(user: Uuid) -> String {
    SessionToken::new(user, 3600)
        .encode_jwt(&Security::from_secret(TEST_SECRET))
        .expect("encodable token")
}

pub async fn post_json<'c>(
    client: &'c Client,
    uri: &str,
    token: &str,
    body: Value,
) -> LocalResponse<'c> {
    client
        .post(uri.to_string())
        .header(ContentType::JSON)
        .header(bearer(token))
        .body(body.to_string())
        .dispatch()
        .await
}
