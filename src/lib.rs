#[macro_use]
extern crate rocket;
#[macro_use]
extern crate serde;
#[macro_use]
extern crate lazy_static;

use error::BackendError;
use mongodb::Client;
use rocket::http::Method;
use rocket::{Build, Rocket};
use rocket_cors::{AllowedHeaders, AllowedOrigins};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use crate::config::{Config, StoreKind};
use crate::data::memory::MemoryStore;
use crate::data::mongo::ensure_indexes;
use crate::data::store::Storage;
use crate::error::ConfigurationError;
use crate::resp::auth::Gatekeeper;
use crate::route::mount_api;
use crate::security::Security;

pub mod config;
pub mod data;
pub mod error;
pub mod resp;
pub mod role;
pub mod route;
pub mod security;
pub mod util;

#[cfg(test)]
mod test_util;

pub async fn create(log_level: Option<Level>) -> Result<Rocket<Build>, BackendError> {
    if let Some(l) = log_level {
        let subscriber = FmtSubscriber::builder().with_max_level(l).finish();

        if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
            eprintln!("Unable to set global logger: {}", err);
        };
    }

    tracing::info!("Reading .env file...");
    if dotenv::dotenv().is_err() {
        tracing::warn!("Unable to load .env file.");
    }

    tracing::info!("Loading configuration...");
    let c = match Config::load() {
        Ok(c) => {
            tracing::info!("Configuration loaded.");
            c
        }
        Err(ConfigurationError::NotFound(_)) => {
            let c = Config::default();
            c.validate()?;
            if c.save().is_err() {
                tracing::warn!("Unable to save generated configuration.");
            }
            c
        }
        Err(other) => {
            tracing::error!("Configuration error: {}", other);
            return Err(other.into());
        }
    };

    tracing::info!("Initializing security information...");
    let security = Security::load(&c)?;

    let storage = match c.store {
        StoreKind::MongoDb => {
            tracing::info!("Connecting to MongoDB: {}", c.mongodb_uri);
            let client = Client::with_uri_str(c.mongodb_uri.as_str()).await?;

            tracing::info!("Using MongoDB database: {}", c.mongodb_db);
            let db = client.database(c.mongodb_db.as_str());

            if let Err(e) = ensure_indexes(&db).await {
                tracing::error!("Unable to connect to MongoDB.");
                return Err(e.into());
            }
            Storage::new(db)
        }
        StoreKind::Memory => {
            tracing::warn!("Using the in-memory store; nothing will be persisted.");
            Storage::new(MemoryStore::new())
        }
    };

    build(c, storage, security)
}

/// Assembles the server around already initialized state.
pub fn build(
    config: Config,
    storage: Storage,
    security: Security,
) -> Result<Rocket<Build>, BackendError> {
    let figment = rocket::Config::figment()
        .merge(("port", config.port))
        .merge(("address", config.address));

    let gatekeeper = Gatekeeper::for_config(&config, security.clone());
    tracing::info!("Authenticating requests with {}", gatekeeper.name());

    tracing::info!("Starting HTTP server...");
    let mut r = rocket::custom(figment)
        .manage(gatekeeper)
        .manage(storage)
        .manage(security)
        .manage(config);

    tracing::info!("Setting up CORS...");
    let allowed_origins = AllowedOrigins::All;

    let cors = rocket_cors::CorsOptions {
        allowed_origins,
        allowed_methods: vec![Method::Get, Method::Put, Method::Post, Method::Delete]
            .into_iter()
            .map(From::from)
            .collect(),
        allowed_headers: AllowedHeaders::All,
        allow_credentials: true,
        ..Default::default()
    }
    .to_cors()?;

    r = r.attach(cors);
    r = mount_api(r);

    Ok(r)
}
