use std::path::PathBuf;
use std::{env, fs};

use crate::config::Config;
use crate::error::ConfigurationError;

const JWT_SECRET: &str = "jwt.secret";

/// Shared secret used to sign and verify session tokens.
#[derive(Clone)]
pub struct Security {
    pub jwt_secret: Vec<u8>,
}

impl std::fmt::Debug for Security {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Security {{ jwt_secret: <{} bytes> }}", self.jwt_secret.len())
    }
}

#[inline]
fn security_dir() -> PathBuf {
    PathBuf::from(env::var("SECURITY_DIR").unwrap_or("./security".to_string()))
}

impl Security {
    pub fn from_secret(secret: impl AsRef<[u8]>) -> Security {
        Security {
            jwt_secret: secret.as_ref().to_vec(),
        }
    }

    pub fn load(config: &Config) -> Result<Security, ConfigurationError> {
        if let Some(secret) = &config.jwt_secret {
            tracing::info!("Using JWT secret from configuration.");
            return Ok(Security::from_secret(secret));
        }

        let dir = security_dir();
        let path = dir.join(JWT_SECRET);

        tracing::info!("Loading JWT secret...");
        match fs::read(&path) {
            Ok(secret) if !secret.is_empty() => {
                tracing::info!("JWT secret found and loaded.");
                return Ok(Security::from_secret(secret));
            }
            _ => tracing::info!("JWT secret not found in '{}'.", path.display()),
        }

        if cfg!(feature = "generate-security") {
            tracing::info!("Generating a new JWT secret.");
            let secret: [u8; 32] = rand::random();
            let tail: [u8; 32] = rand::random();
            let secret = [secret, tail].concat();

            fs::create_dir_all(&dir)?;
            fs::write(&path, &secret)?;

            Ok(Security::from_secret(secret))
        } else {
            Err(ConfigurationError::MissingSecret)
        }
    }
}
