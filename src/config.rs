use crate::error::ConfigurationError;
use crate::util;
use std::env;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::net::{IpAddr, Ipv4Addr};
use std::path::{Path, PathBuf};
use uuid::Uuid;

fn default_mongodb_uri() -> String {
    env::var("MONGODB_URI").unwrap_or("mongodb://localhost:27017".to_string())
}

fn default_mongodb_db() -> String {
    env::var("MONGODB_DB_NAME").unwrap_or("campus".to_string())
}

fn default_store() -> StoreKind {
    match env::var("STORE").as_deref() {
        Ok("memory") => StoreKind::Memory,
        _ => StoreKind::MongoDb,
    }
}

fn default_address() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

fn default_port() -> u16 {
    env::var("PORT")
        .ok()
        .and_then(|it| it.parse().ok())
        .unwrap_or(3001)
}

fn default_environment() -> Environment {
    match env::var("APP_ENV").as_deref() {
        Ok("development") | Ok("dev") => Environment::Development,
        _ => Environment::Production,
    }
}

fn default_jwt_secret() -> Option<String> {
    env::var("JWT_SECRET").ok().filter(|it| !it.is_empty())
}

fn default_token_lifetime() -> i64 {
    3600
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    MongoDb,
    Memory,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Production,
    Development,
}

/// Process configuration. Built once at startup and shared read-only.
#[derive(Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(skip)]
    file_path: PathBuf,

    #[serde(default = "default_mongodb_uri")]
    pub mongodb_uri: String,
    #[serde(default = "default_mongodb_db")]
    pub mongodb_db: String,
    #[serde(default = "default_store")]
    pub store: StoreKind,

    #[serde(default = "default_address")]
    pub address: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_environment")]
    pub environment: Environment,

    #[serde(default = "default_jwt_secret", skip_serializing)]
    pub jwt_secret: Option<String>,
    #[serde(default = "default_token_lifetime")]
    pub token_lifetime_secs: i64,

    /// Only honoured in development builds compiled with `insecure-dev-auth`.
    #[serde(default)]
    pub insecure_dev_auth: bool,
    #[serde(default)]
    pub dev_identity: Option<Uuid>,

    /// Include raw internal error text in 500 responses.
    #[serde(default)]
    pub expose_internal_errors: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            file_path: config_dir().join("settings.yml"),
            mongodb_uri: default_mongodb_uri(),
            mongodb_db: default_mongodb_db(),
            store: default_store(),
            address: default_address(),
            port: default_port(),
            environment: default_environment(),
            jwt_secret: default_jwt_secret(),
            token_lifetime_secs: default_token_lifetime(),
            insecure_dev_auth: false,
            dev_identity: None,
            expose_internal_errors: false,
        }
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("file_path", &self.file_path)
            .field("mongodb_uri", &self.mongodb_uri)
            .field("mongodb_db", &self.mongodb_db)
            .field("store", &self.store)
            .field("address", &self.address)
            .field("port", &self.port)
            .field("environment", &self.environment)
            .field(
                "jwt_secret",
                &self.jwt_secret.as_ref().map(|_| "<redacted>"),
            )
            .field("token_lifetime_secs", &self.token_lifetime_secs)
            .field("insecure_dev_auth", &self.insecure_dev_auth)
            .field("dev_identity", &self.dev_identity)
            .field("expose_internal_errors", &self.expose_internal_errors)
            .finish()
    }
}

#[inline]
fn config_dir() -> PathBuf {
    PathBuf::from(env::var("CONFIG_DIR").unwrap_or("./config".to_string()))
}

impl Config {
    pub fn load() -> Result<Config, ConfigurationError> {
        let config_file = util::find_first_subpath(
            config_dir(),
            &["settings.yml", "settings.yaml"],
            Path::exists,
        )
        .ok_or_else(|| ConfigurationError::NotFound(config_dir()))?;

        let file = File::open(&config_file)?;
        let mut config: Config = serde_yaml::from_reader(BufReader::new(file))?;
        config.file_path = config_file;
        config.validate()?;

        Ok(config)
    }

    pub fn save(&self) -> Result<(), ConfigurationError> {
        if let Some(parent) = self.file_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = File::create(&self.file_path)?;
        let mut out = BufWriter::new(file);
        serde_yaml::to_writer(&mut out, self)?;
        out.flush()?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.token_lifetime_secs <= 0 {
            return Err(ConfigurationError::Invalid(
                "token_lifetime_secs",
                "must be a positive number of seconds".to_string(),
            ));
        }
        Ok(())
    }

    pub fn is_development(&self) -> bool {
        self.environment == Environment::Development
    }

    /// Configuration used by the endpoint tests: in-memory store and a fixed secret.
    #[cfg(test)]
    pub fn for_tests() -> Config {
        Config {
            file_path: PathBuf::new(),
            mongodb_uri: String::new(),
            mongodb_db: String::new(),
            store: StoreKind::Memory,
            address: default_address(),
            port: 0,
            environment: Environment::Production,
            jwt_secret: Some("campus-test-secret".to_string()),
            token_lifetime_secs: default_token_lifetime(),
            insecure_dev_auth: false,
            dev_identity: None,
            expose_internal_errors: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_file_fields_override_defaults() {
        let config: Config = serde_yaml::from_str(
            "mongodb_db: school\nstore: memory\nenvironment: development\ntoken_lifetime_secs: 60\n",
        )
        .expect("valid settings");

        assert_eq!(config.mongodb_db, "school");
        assert_eq!(config.store, StoreKind::Memory);
        assert!(config.is_development());
        assert_eq!(config.token_lifetime_secs, 60);
        assert!(!config.insecure_dev_auth);
        assert!(!config.expose_internal_errors);
    }

    #[test]
    fn non_positive_token_lifetime_is_rejected() {
        let mut config = Config::for_tests();
        config.token_lifetime_secs = 0;

        assert!(matches!(
            config.validate(),
            Err(ConfigurationError::Invalid("token_lifetime_secs", _))
        ));
    }

    #[test]
    fn secret_is_never_written_back() {
        let config = Config::for_tests();
        let yaml = serde_yaml::to_string(&config).expect("serializable config");

        assert!(!yaml.contains("campus-test-secret"));
    }

    #[test]
    fn secret_is_redacted_in_debug_output() {
        let config = Config::for_tests();
        let printed = format!("{:?}", config);

        assert!(!printed.contains("campus-test-secret"));
        assert!(printed.contains("jwt_secret: Some(\"<redacted>\")"));
    }
}
