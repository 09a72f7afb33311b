use std::env;

use log::LevelFilter;
use rating_party_core::AuthConfig;
use thiserror::Error;

/// Process configuration, read once from the environment at start-up
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    /// When absent the in-memory database is used
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub environment: Environment,
    pub log_level: LogLevel,
    pub auth: AuthConfig,
    /// Whether the admin passcode or signing secret fell back to a default
    pub uses_default_secrets: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Local,
    Production,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Info,
}

impl LogLevel {
    pub fn max_level(&self) -> LevelFilter {
        match self {
            Self::Debug => LevelFilter::Debug,
            Self::Info => LevelFilter::Info,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} has an invalid value {value:?}, {hint}")]
    Invalid {
        name: &'static str,
        value: String,
        hint: &'static str,
    },
    #[error("{name} must be set when APP_ENV is production")]
    MissingInProduction { name: &'static str },
}

impl Config {
    pub const DEFAULT_PORT: u16 = rating_party_server::DEFAULT_PORT;
    pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;
    pub const DEFAULT_ADMIN_PASSCODE: &'static str = "ivory";
    pub const DEFAULT_SIGNING_SECRET: &'static str = "ebony";

    /// Loads `.env` if present, then reads the configuration from the environment
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let environment = match var("APP_ENV").as_deref() {
            None | Some("local") => Environment::Local,
            Some("production") => Environment::Production,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    name: "APP_ENV",
                    value: other.to_string(),
                    hint: "expected local or production",
                })
            }
        };

        let log_level = match var("LOG_LEVEL").as_deref() {
            None | Some("info") => LogLevel::Info,
            Some("debug") => LogLevel::Debug,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    name: "LOG_LEVEL",
                    value: other.to_string(),
                    hint: "expected debug or info",
                })
            }
        };

        let port = match var("RATING_PARTY_PORT") {
            Some(value) => value.parse::<u16>().map_err(|_| ConfigError::Invalid {
                name: "RATING_PARTY_PORT",
                value,
                hint: "expected a port number",
            })?,
            None => Self::DEFAULT_PORT,
        };

        let database_max_connections = match var("DB_MAX_CONNECTIONS") {
            Some(value) => match value.parse::<u32>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(ConfigError::Invalid {
                        name: "DB_MAX_CONNECTIONS",
                        value,
                        hint: "expected a positive number",
                    })
                }
            },
            None => Self::DEFAULT_MAX_CONNECTIONS,
        };

        let admin_passcode = var("ADMIN_PASSCODE");
        let signing_secret = var("ADMIN_JWT_SECRET");

        if environment == Environment::Production {
            if admin_passcode.is_none() {
                return Err(ConfigError::MissingInProduction {
                    name: "ADMIN_PASSCODE",
                });
            }

            if signing_secret.is_none() {
                return Err(ConfigError::MissingInProduction {
                    name: "ADMIN_JWT_SECRET",
                });
            }
        }

        let uses_default_secrets = admin_passcode.is_none() || signing_secret.is_none();

        let auth = AuthConfig::new(
            admin_passcode.unwrap_or_else(|| Self::DEFAULT_ADMIN_PASSCODE.to_string()),
            signing_secret.unwrap_or_else(|| Self::DEFAULT_SIGNING_SECRET.to_string()),
        );

        Ok(Self {
            port,
            database_url: var("DATABASE_URL"),
            database_max_connections,
            environment,
            log_level,
            auth,
            uses_default_secrets,
        })
    }
}
