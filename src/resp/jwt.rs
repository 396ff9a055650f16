use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rocket::http::Cookie;
use rocket::time::OffsetDateTime;
use uuid::Uuid;

use super::util::date_time_as_unix_seconds;
use crate::security::Security;

pub static AUTH_COOKIE_NAME: &str = "t";

/// Claims of a signed session token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionToken {
    #[serde(with = "date_time_as_unix_seconds")]
    iat: DateTime<Utc>,
    #[serde(with = "date_time_as_unix_seconds")]
    exp: DateTime<Utc>,
    #[serde(rename = "userId")]
    pub user: Uuid,
}

impl SessionToken {
    pub fn new(user: Uuid, lifetime_secs: i64) -> SessionToken {
        let now = Utc::now();
        SessionToken {
            iat: now,
            exp: now + Duration::seconds(lifetime_secs),
            user,
        }
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.exp
    }

    pub fn encode_jwt(&self, security: &Security) -> Result<String, jsonwebtoken::errors::Error> {
        let header = Header::new(Algorithm::HS256);
        let key = EncodingKey::from_secret(&security.jwt_secret);

        encode(&header, self, &key)
    }

    pub fn decode_jwt(
        token: &str,
        security: &Security,
    ) -> Result<SessionToken, jsonwebtoken::errors::Error> {
        decode::<SessionToken>(
            token,
            &DecodingKey::from_secret(&security.jwt_secret),
            &Validation::new(Algorithm::HS256),
        )
        .map(|data| data.claims)
    }

    /// Session cookie carrying an already encoded token.
    pub fn cookie(&self, encoded: String) -> Cookie<'static> {
        Cookie::build((AUTH_COOKIE_NAME, encoded))
            .expires(OffsetDateTime::from_unix_timestamp(self.exp.timestamp()).ok())
            .path("/")
            .http_only(true)
            .build()
    }
}

pub mod doc {
    use utoipa::openapi::security::*;

    #[derive(Clone, Copy)]
    pub struct JWTAuth;

    impl From<JWTAuth> for SecurityScheme {
        fn from(_: JWTAuth) -> SecurityScheme {
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            )
        }
    }

    impl utoipa::Modify for JWTAuth {
        fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
            let components = openapi.components.get_or_insert_with(Default::default);
            components.add_security_scheme("jwt", *self)
        }
    }
}
