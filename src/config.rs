// region:    --- Imports
use crate::error::MarketError;
use std::path::PathBuf;
use std::str::FromStr;

// endregion: --- Imports

/// 서비스 설정
#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    /// 없으면 메모리 백엔드(데모 모드)로 동작
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub storage_dir: PathBuf,
    pub public_storage_url: String,
    pub session_dir: PathBuf,
    pub kafka_brokers: Option<String>,
    pub min_bid_increment: i64,
    pub body_limit_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            bind_addr: "0.0.0.0:3000".to_string(),
            database_url: None,
            db_max_connections: 5,
            storage_dir: PathBuf::from("data/storage"),
            public_storage_url: "http://localhost:3000/storage".to_string(),
            session_dir: PathBuf::from("data/sessions"),
            kafka_brokers: None,
            min_bid_increment: 1,
            body_limit_bytes: 1024 * 1024 * 20,
        }
    }
}

impl Config {
    /// 환경 변수(.env 포함)에서 설정 로드
    pub fn from_env() -> Result<Self, MarketError> {
        dotenvy::dotenv().ok();
        let defaults = Config::default();

        let config = Config {
            bind_addr: var("BIND_ADDR").unwrap_or(defaults.bind_addr),
            database_url: var("DATABASE_URL"),
            db_max_connections: parse_var("DB_MAX_CONNECTIONS", defaults.db_max_connections)?,
            storage_dir: var("STORAGE_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.storage_dir),
            public_storage_url: var("PUBLIC_STORAGE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.public_storage_url),
            session_dir: var("SESSION_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.session_dir),
            kafka_brokers: var("KAFKA_BROKERS"),
            min_bid_increment: parse_var("MIN_BID_INCREMENT", defaults.min_bid_increment)?,
            body_limit_bytes: parse_var("BODY_LIMIT_BYTES", defaults.body_limit_bytes)?,
        };

        if config.min_bid_increment < 1 {
            return Err(MarketError::Config(
                "MIN_BID_INCREMENT must be at least 1".to_string(),
            ));
        }
        Ok(config)
    }
}

fn var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_var<T>(key: &str, default: T) -> Result<T, MarketError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match var(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| MarketError::Config(format!("Invalid {}: {}", key, e))),
        None => Ok(default),
    }
}
