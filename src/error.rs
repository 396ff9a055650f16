use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("configuration file not found in '{0}'")]
    NotFound(PathBuf),
    #[error("no JWT signing secret configured and secret generation is disabled")]
    MissingSecret,
    #[error("invalid configuration value for '{0}': {1}")]
    Invalid(&'static str, String),
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum BackendError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    // External errors
    #[error(transparent)]
    Database(#[from] mongodb::error::Error),
    #[error(transparent)]
    Cors(#[from] rocket_cors::Error),
}

/// Failures at the document store boundary.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Database(#[from] mongodb::error::Error),
    #[error(transparent)]
    Serialize(#[from] bson::ser::Error),
    #[error(transparent)]
    Deserialize(#[from] bson::de::Error),
    #[error("duplicate value for unique key in '{0}'")]
    Duplicate(String),
}

impl StoreError {
    pub fn is_duplicate(&self) -> bool {
        match self {
            StoreError::Duplicate(_) => true,
            StoreError::Database(e) => is_duplicate_key(e),
            _ => false,
        }
    }
}

fn is_duplicate_key(e: &mongodb::error::Error) -> bool {
    use mongodb::error::{ErrorKind, WriteFailure};

    const DUPLICATE_KEY: i32 = 11000;

    match e.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(we)) => we.code == DUPLICATE_KEY,
        ErrorKind::Command(ce) => ce.code == DUPLICATE_KEY,
        _ => false,
    }
}
