use std::env;
use std::sync::OnceLock;
use thiserror::Error;

/// Database used when `STUDENTS_DATABASE` is unset.
pub const DEFAULT_DATABASE: &str = "college";
/// Collection used when `STUDENTS_COLLECTION` is unset.
pub const DEFAULT_COLLECTION: &str = "students";
/// Route prefix used when `STUDENTS_ROUTE_PREFIX` is unset.
pub const DEFAULT_ROUTE_PREFIX: &str = "/students";

const DEFAULT_MONGODB_PORT: u16 = 27017;

/// Errors encountered while loading configuration from environment variables.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Required environment variable was not provided.
    #[error("Missing environment variable: {0}")]
    MissingVariable(String),
    /// Environment variable contained a value that could not be parsed.
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}

/// Runtime configuration for the student records server.
#[derive(Debug, Clone)]
pub struct Config {
    /// Storage backend serving the API.
    pub store_backend: StoreBackend,
    /// How to reach MongoDB; always present when the backend is MongoDB.
    pub mongodb: Option<MongoConnection>,
    /// Database holding the student collection.
    pub database_name: String,
    /// Collection holding student documents.
    pub collection_name: String,
    /// Normalized route prefix: empty, or a leading slash without a trailing one.
    pub route_prefix: String,
    /// Optional override for the HTTP server port.
    pub server_port: Option<u16>,
    /// Optional override for the log file location.
    pub log_file: Option<String>,
}

/// Where the MongoDB deployment lives.
///
/// Credentials stay typed and are handed to the driver as a `Credential`, so they never need
/// escaping into a URL and never appear in logs.
#[derive(Clone, PartialEq, Eq)]
pub enum MongoConnection {
    /// A full connection string from `MONGODB_URL` or `MONGODB_URI`.
    Url(String),
    /// A single host assembled from `MONGODB_HOST` and friends.
    Host {
        /// Hostname or address.
        host: String,
        /// TCP port.
        port: u16,
        /// Optional user to authenticate as.
        username: Option<String>,
        /// Password for `username`.
        password: Option<String>,
    },
}

impl std::fmt::Debug for MongoConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Url(_) => f.write_str("Url(..)"),
            Self::Host {
                host,
                port,
                username,
                ..
            } => f
                .debug_struct("Host")
                .field("host", host)
                .field("port", port)
                .field("username", username)
                .finish_non_exhaustive(),
        }
    }
}

/// Supported storage backends.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StoreBackend {
    /// MongoDB via the official driver.
    MongoDb,
    /// Process-local map; data is lost on exit.
    Memory,
}

impl Config {
    /// Load configuration from environment variables, performing validation along the way.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let store_backend = lookup("STUDENTS_STORE")
            .map(|value| {
                value
                    .parse()
                    .map_err(|()| ConfigError::InvalidValue("STUDENTS_STORE".into()))
            })
            .transpose()?
            .unwrap_or(StoreBackend::MongoDb);

        let mongodb = resolve_connection(&lookup)?;
        if store_backend == StoreBackend::MongoDb && mongodb.is_none() {
            return Err(ConfigError::MissingVariable("MONGODB_URL".into()));
        }

        Ok(Self {
            store_backend,
            mongodb,
            database_name: lookup("STUDENTS_DATABASE").unwrap_or_else(|| DEFAULT_DATABASE.into()),
            collection_name: lookup("STUDENTS_COLLECTION")
                .unwrap_or_else(|| DEFAULT_COLLECTION.into()),
            route_prefix: normalize_route_prefix(
                lookup("STUDENTS_ROUTE_PREFIX")
                    .as_deref()
                    .unwrap_or(DEFAULT_ROUTE_PREFIX),
            ),
            server_port: lookup("SERVER_PORT")
                .map(|value| {
                    value
                        .trim()
                        .parse()
                        .map_err(|_| ConfigError::InvalidValue("SERVER_PORT".into()))
                })
                .transpose()?,
            log_file: lookup("STUDENTS_LOG_FILE"),
        })
    }
}

/// Resolve how to reach MongoDB.
///
/// `MONGODB_URL` wins, then `MONGODB_URI`; otherwise `MONGODB_HOST`, `MONGODB_PORT`,
/// `MONGODB_USERNAME` and `MONGODB_PASSWORD` describe a single host.
fn resolve_connection<F>(lookup: &F) -> Result<Option<MongoConnection>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = lookup("MONGODB_URL").or_else(|| lookup("MONGODB_URI")) {
        return Ok(Some(MongoConnection::Url(url.trim().to_string())));
    }

    let Some(host) = lookup("MONGODB_HOST") else {
        return Ok(None);
    };
    let port: u16 = lookup("MONGODB_PORT")
        .map(|value| {
            value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue("MONGODB_PORT".into()))
        })
        .transpose()?
        .unwrap_or(DEFAULT_MONGODB_PORT);

    let username = lookup("MONGODB_USERNAME");
    let password = lookup("MONGODB_PASSWORD");
    if username.is_none() && password.is_some() {
        return Err(ConfigError::MissingVariable("MONGODB_USERNAME".into()));
    }

    Ok(Some(MongoConnection::Host {
        host: host.trim().to_string(),
        port,
        username,
        password,
    }))
}

/// Normalize a route prefix to a leading slash and no trailing slash; `/` becomes empty.
pub fn normalize_route_prefix(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{trimmed}")
    }
}

impl std::str::FromStr for StoreBackend {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mongodb" | "mongo" => Ok(Self::MongoDb),
            "memory" => Ok(Self::Memory),
            _ => Err(()),
        }
    }
}

/// Global configuration cache populated during process start.
pub static CONFIG: OnceLock<Config> = OnceLock::new();

/// Load configuration from `.env` and the environment and install it in the global cache.
pub fn init_config() -> Result<&'static Config, ConfigError> {
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;
    Ok(CONFIG.get_or_init(|| config))
}
