//! Layered configuration: built-in defaults, then an optional JSON file,
//! then the process environment (including `.env`). File keys are the
//! lower-case form of the environment variable names (`DB_PORT` -> `db_port`).

use std::env;

use config::{Environment, File, FileFormat, Source};
use serde::Deserialize;

use crate::distance::google::DEFAULT_DISTANCE_MATRIX_URL;
use crate::error::AppError;

const DEFAULT_CONFIG_FILE: &str = "config.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Postgres,
    Memory,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Compact,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DbConfig {
    #[serde(rename = "db_hostname")]
    pub hostname: String,
    #[serde(rename = "db_port")]
    pub port: u16,
    #[serde(rename = "db_user")]
    pub username: String,
    #[serde(rename = "db_password")]
    pub password: String,
    #[serde(rename = "db_schema")]
    pub schema: String,
    #[serde(rename = "db_max_connections")]
    pub max_connections: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MapConfig {
    #[serde(rename = "map_api_key")]
    pub api_key: String,
    #[serde(rename = "map_api_url")]
    pub api_url: String,
}

/// Keys that are not grouped under `DbConfig` or `MapConfig`.
#[derive(Debug, Deserialize)]
struct ServerSettings {
    http_port: u16,
    log_level: String,
    log_format: LogFormat,
    order_store: StoreBackend,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub http_port: u16,
    pub log_level: String,
    pub log_format: LogFormat,
    pub store: StoreBackend,
    pub db: DbConfig,
    pub map: MapConfig,
}

impl Config {
    pub fn load() -> Result<Self, AppError> {
        let _ = dotenvy::dotenv();

        let path = env::var("CONFIG_FILE").unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());

        Self::from_sources(
            File::new(&path, FileFormat::Json).required(false),
            Environment::default(),
        )
    }

    pub fn from_sources<S>(file: S, environment: Environment) -> Result<Self, AppError>
    where
        S: Source + Send + Sync + 'static,
    {
        let settings = config::Config::builder()
            .set_default("http_port", 8080)
            .and_then(|b| b.set_default("log_level", "info"))
            .and_then(|b| b.set_default("log_format", "compact"))
            .and_then(|b| b.set_default("order_store", "postgres"))
            .and_then(|b| b.set_default("db_hostname", "localhost"))
            .and_then(|b| b.set_default("db_port", 5432))
            .and_then(|b| b.set_default("db_user", "postgres"))
            .and_then(|b| b.set_default("db_password", ""))
            .and_then(|b| b.set_default("db_schema", "order-service"))
            .and_then(|b| b.set_default("db_max_connections", 10))
            .and_then(|b| b.set_default("map_api_key", ""))
            .and_then(|b| b.set_default("map_api_url", DEFAULT_DISTANCE_MATRIX_URL))
            .and_then(|b| b.add_source(file).add_source(environment).build())
            .map_err(invalid)?;

        let db: DbConfig = settings.clone().try_deserialize().map_err(invalid)?;
        let map: MapConfig = settings.clone().try_deserialize().map_err(invalid)?;
        let server: ServerSettings = settings.try_deserialize().map_err(invalid)?;

        Ok(Self {
            http_port: server.http_port,
            log_level: server.log_level,
            log_format: server.log_format,
            store: server.order_store,
            db,
            map,
        })
    }
}

fn invalid(err: config::ConfigError) -> AppError {
    AppError::Internal(format!("invalid configuration: {err}"))
}
