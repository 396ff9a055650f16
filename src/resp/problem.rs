use std::io::Cursor;

use rocket::http::ContentType;
use rocket::http::Status;
use rocket::response::Responder;
use rocket::{response, Request, Response};
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt::{Display, Formatter};
use utoipa::ToSchema;

use crate::config::Config;
use crate::error::StoreError;

/// JSON error body returned by every failing endpoint.
///
/// Always carries a human readable `message` and the numeric `status`. The
/// underlying cause of an internal failure is kept out of the body unless the
/// server runs with `expose_internal_errors`.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Problem {
    #[serde(skip)]
    pub status: Status,
    pub message: String,
    pub detail: Option<String>,

    #[schema(value_type = Object)]
    pub body: Map<String, Value>,

    #[serde(skip)]
    pub internal: Option<String>,
}

impl Default for Problem {
    fn default() -> Self {
        Problem {
            status: Status::InternalServerError,
            message: "Problem".to_string(),
            detail: None,
            body: Map::new(),
            internal: None,
        }
    }
}

impl Problem {
    pub fn new(status: Status, message: impl ToString) -> Problem {
        Problem {
            status,
            message: message.to_string(),
            ..Default::default()
        }
    }

    pub fn detail(mut self, value: impl ToString) -> Problem {
        self.detail = Some(value.to_string());
        self
    }

    pub fn insert_str(mut self, key: impl ToString, value: impl ToString) -> Problem {
        self.body
            .insert(key.to_string(), Value::String(value.to_string()));
        self
    }

    pub fn internal(mut self, cause: impl ToString) -> Problem {
        self.internal = Some(cause.to_string());
        self
    }

    pub fn is_server_error(&self) -> bool {
        self.status.code >= 500
    }

    fn to_json(&self, expose_internal: bool) -> Map<String, Value> {
        let mut body = self.body.clone();

        body.insert(String::from("message"), Value::from(self.message.clone()));
        body.insert(String::from("status"), Value::from(self.status.code));
        if let Some(detail) = &self.detail {
            body.insert(String::from("detail"), Value::from(detail.clone()));
        }
        if expose_internal {
            if let Some(cause) = &self.internal {
                body.insert(String::from("error"), Value::from(cause.clone()));
            }
        }

        body
    }
}

impl Display for Problem {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.status, self.message)
    }
}

impl std::error::Error for Problem {}

impl<'r> Responder<'r, 'static> for Problem {
    fn respond_to(self, req: &'r Request<'_>) -> response::Result<'static> {
        if self.is_server_error() {
            tracing::error!(
                status = self.status.code,
                cause = self.internal.as_deref().unwrap_or("unknown"),
                "{} {}: {}",
                req.method(),
                req.uri(),
                self.message
            );
        }

        let expose_internal = self.is_server_error()
            && req
                .rocket()
                .state::<Config>()
                .map(|c| c.expose_internal_errors)
                .unwrap_or(false);

        let body_string = Value::Object(self.to_json(expose_internal)).to_string();

        Response::build()
            .status(self.status)
            .header(ContentType::new("application", "problem+json"))
            .raw_header("Content-Language", "en")
            .sized_body(body_string.len(), Cursor::new(body_string))
            .ok()
    }
}

pub mod problems {
    use crate::resp::problem::Problem;
    use rocket::http::Status;

    #[inline]
    pub fn not_found(entity: &str) -> Problem {
        Problem::new(Status::NotFound, format!("{} not found", entity))
    }

    #[inline]
    pub fn conflict(message: impl ToString) -> Problem {
        Problem::new(Status::BadRequest, message)
    }

    #[inline]
    pub fn bad_request(message: impl ToString) -> Problem {
        Problem::new(Status::BadRequest, message)
    }

    #[inline]
    pub fn unauthorized(detail: impl ToString) -> Problem {
        Problem::new(Status::Unauthorized, "Unauthorized").detail(detail)
    }

    #[inline]
    pub fn forbidden() -> Problem {
        Problem::new(Status::Forbidden, "User is not authorized")
    }

    #[inline]
    pub fn internal(message: impl ToString, cause: impl ToString) -> Problem {
        Problem::new(Status::InternalServerError, message).internal(cause)
    }

    #[inline]
    pub fn invalid_body(cause: impl ToString) -> Problem {
        Problem::new(Status::BadRequest, "Invalid request body").detail(cause)
    }
}

impl From<StoreError> for Problem {
    fn from(e: StoreError) -> Self {
        if e.is_duplicate() {
            return problems::conflict("Duplicate value for a unique field").internal(e);
        }

        match e {
            StoreError::Serialize(_) | StoreError::Deserialize(_) => problems::internal(
                "There was a problem with handling stored document data.",
                e,
            ),
            _ => problems::internal("Database failed while processing request.", e),
        }
    }
}

impl From<bson::ser::Error> for Problem {
    fn from(e: bson::ser::Error) -> Self {
        Problem::from(StoreError::from(e))
    }
}

impl From<bson::de::Error> for Problem {
    fn from(e: bson::de::Error) -> Self {
        Problem::from(StoreError::from(e))
    }
}

impl From<jsonwebtoken::errors::Error> for Problem {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;

        match e.kind() {
            ErrorKind::ExpiredSignature => problems::unauthorized("Expired JWT signature."),
            ErrorKind::InvalidSignature => problems::unauthorized("Invalid JWT signature."),
            _ => problems::unauthorized("Malformed JWT."),
        }
    }
}
