use std::env;
use std::fmt;
use std::net::SocketAddr;

pub const DEFAULT_IDENTITY_COOKIE: &str = "player_data";

/// Upper bound for `IDENTITY_MAX_AGE_SECS`, one hundred years.
pub const MAX_IDENTITY_AGE_SECS: i64 = 100 * 365 * 24 * 60 * 60;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    DynamoDb {
        users_table: String,
        games_table: String,
    },
    Memory,
}

/// Settings the session layer needs to mint and read identity cookies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentitySettings {
    pub jwt_secret: String,
    pub cookie_name: String,
    pub max_age_secs: Option<i64>,
}

impl IdentitySettings {
    pub fn new(jwt_secret: impl Into<String>) -> Self {
        IdentitySettings {
            jwt_secret: jwt_secret.into(),
            cookie_name: DEFAULT_IDENTITY_COOKIE.to_string(),
            max_age_secs: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub identity: IdentitySettings,
    pub storage: StorageBackend,
    /// Serve on this address instead of handing the router to the Lambda runtime.
    pub bind_addr: Option<SocketAddr>,
}

#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid { key: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "Missing required environment variable {}", key),
            ConfigError::Invalid { key, value } => {
                write!(f, "Invalid value for {}: {:?}", key, value)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl Config {
    pub fn from_env() -> Result<Config, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Config, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let require = |key: &'static str| get(key).ok_or(ConfigError::Missing(key));

        let jwt_secret = require("JWT_SECRET")?;
        let cookie_name = get("IDENTITY_COOKIE").unwrap_or_else(|| DEFAULT_IDENTITY_COOKIE.to_string());
        let max_age_secs = match get("IDENTITY_MAX_AGE_SECS") {
            Some(value) => match value.trim().parse::<i64>() {
                Ok(secs) if secs > 0 && secs <= MAX_IDENTITY_AGE_SECS => Some(secs),
                _ => {
                    return Err(ConfigError::Invalid {
                        key: "IDENTITY_MAX_AGE_SECS",
                        value,
                    })
                }
            },
            None => None,
        };

        let storage = match get("STORAGE_BACKEND").as_deref().map(str::trim) {
            None | Some("dynamodb") => StorageBackend::DynamoDb {
                users_table: require("USERS_TABLE")?,
                games_table: require("GAMES_TABLE")?,
            },
            Some("memory") => StorageBackend::Memory,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    key: "STORAGE_BACKEND",
                    value: other.to_string(),
                })
            }
        };

        let bind_addr = match get("BIND_ADDR") {
            Some(value) => Some(value.trim().parse::<SocketAddr>().map_err(|_| {
                ConfigError::Invalid {
                    key: "BIND_ADDR",
                    value: value.clone(),
                }
            })?),
            None => None,
        };

        Ok(Config {
            identity: IdentitySettings {
                jwt_secret,
                cookie_name,
                max_age_secs,
            },
            storage,
            bind_addr,
        })
    }
}
