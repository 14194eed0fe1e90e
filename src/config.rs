use figment::{
    Figment,
    providers::{Env, Format, Toml},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub cors: CorsConfig,
    pub auth: AuthConfig,
    pub uploads: UploadsConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub address: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub json_format: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
    pub allow_credentials: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AuthConfig {
    /// HMAC secret used to sign and verify access tokens.
    pub secret: String,
    /// Lifetime of an issued access token, in hours.
    pub token_ttl_hours: i64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct UploadsConfig {
    /// Directory uploaded images are stored in, served under /uploads.
    pub dir: String,
    /// Public base URL used when building image URLs. When unset the
    /// request's own Host header is used instead.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "postgres://localhost/triply".to_string(),
            max_connections: 16,
            min_connections: 4,
            acquire_timeout: 5,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8000,
            address: "127.0.0.1".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
        }
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec!["http://localhost:3000".to_string(), "http://localhost:5173".to_string()],
            allow_credentials: true,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
            token_ttl_hours: 72,
        }
    }
}

impl Default for UploadsConfig {
    fn default() -> Self {
        Self {
            dir: "uploads".to_string(),
            base_url: None,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: DatabaseConfig::default(),
            server: ServerConfig::default(),
            logging: LoggingConfig::default(),
            cors: CorsConfig::default(),
            auth: AuthConfig::default(),
            uploads: UploadsConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from multiple sources in priority order:
    /// 1. Triply.toml (base configuration file)
    /// 2. Environment variables (prefixed with TRIPLY_)
    /// 3. DATABASE_URL / ACCESS_TOKEN_SECRET environment variables
    ///    (for compatibility with existing deployments)
    pub fn load() -> Result<Self, figment::Error> {
        let figment = Figment::new()
            // Start with defaults
            .merge(Toml::string(&toml::to_string(&Config::default()).unwrap()))
            // Layer on Triply.toml if it exists
            .merge(Toml::file("Triply.toml"))
            // Layer on environment variables (e.g., TRIPLY_DATABASE_URL)
            .merge(Env::prefixed("TRIPLY_").split("_"))
            // Special case: DATABASE_URL and ACCESS_TOKEN_SECRET
            .merge(Env::raw().only(&["DATABASE_URL"]).map(|_| "database.url".into()))
            .merge(Env::raw().only(&["ACCESS_TOKEN_SECRET"]).map(|_| "auth.secret".into()));

        figment.extract()
    }
}
