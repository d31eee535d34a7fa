//! Service configuration assembled from environment variables

use anyhow::Result;
use common::{cache::RedisConfig, database::DatabaseConfig};

use crate::{auth::TokenConfig, payment::PaymentConfig};

/// HTTP listener configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    /// # Environment Variables
    /// - `SERVER_HOST`: bind address (default: "0.0.0.0")
    /// - `SERVER_PORT`: bind port (default: 8080)
    pub fn from_env() -> Self {
        let host = std::env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = std::env::var("SERVER_PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(8080);

        ServerConfig { host, port }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    pub token: TokenConfig,
    pub payment: PaymentConfig,
}

impl AppConfig {
    /// Load every section; fails on the first missing required variable
    pub fn from_env() -> Result<Self> {
        Ok(AppConfig {
            server: ServerConfig::from_env(),
            database: DatabaseConfig::from_env()?,
            redis: RedisConfig::from_env()?,
            token: TokenConfig::from_env()?,
            payment: PaymentConfig::from_env()?,
        })
    }
}
