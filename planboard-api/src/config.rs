/// Configuration management for the API server
///
/// Configuration is loaded once at startup from environment variables into
/// an immutable struct carried in application state. Nothing reads the
/// environment after initialization and there is no global mutable state.
///
/// # Environment Variables
///
/// - `DATABASE_URL`: PostgreSQL connection string (required)
/// - `DATABASE_MAX_CONNECTIONS`: Pool size (default: 10)
/// - `API_HOST`: Host to bind to (default: 0.0.0.0)
/// - `API_PORT`: Port to bind to (default: 8080)
/// - `JWT_SECRET`: Secret key for token signing (required, >= 32 chars)
/// - `ACCESS_TOKEN_TTL`: Token lifetime in seconds (default: 172800 = 48h)
/// - `TOKEN_IN_COOKIE`: Also issue the token as an HTTP-only cookie
/// - `COOKIE_SECURE`, `COOKIE_SAMESITE`, `COOKIE_DOMAIN`: Cookie attributes
/// - `UPLOAD_DIR`: Directory for uploaded files (default: uploads)
/// - `CORS_ORIGINS`: Comma-separated allowed origins, or `*` (default)

use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// API server configuration
    pub api: ApiConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Token/cookie configuration
    pub auth: AuthConfig,

    /// Upload storage configuration
    pub uploads: UploadConfig,
}

/// API server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,

    /// Allowed CORS origins; `["*"]` means permissive
    pub cors_origins: Vec<String>,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in pool
    pub max_connections: u32,
}

/// SameSite attribute for the access-token cookie
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SameSite {
    Lax,
    Strict,
    None,
}

impl SameSite {
    /// Attribute value as written into the Set-Cookie header
    pub fn as_str(&self) -> &'static str {
        match self {
            SameSite::Lax => "Lax",
            SameSite::Strict => "Strict",
            SameSite::None => "None",
        }
    }
}

/// Token and cookie configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Secret key for token signing
    ///
    /// Must be at least 32 bytes. Generate with: `openssl rand -hex 32`
    pub jwt_secret: String,

    /// Token lifetime in seconds
    pub token_ttl_seconds: i64,

    /// Whether to also issue the token as an HTTP-only cookie
    pub token_in_cookie: bool,

    /// Cookie Secure attribute
    pub cookie_secure: bool,

    /// Cookie SameSite attribute
    pub cookie_same_site: SameSite,

    /// Cookie Domain attribute, if any
    pub cookie_domain: Option<String>,
}

/// Upload storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    /// Directory uploaded files are written to and served from
    pub dir: PathBuf,
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// Reads a `.env` file first when present (development convenience).
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let api_host = env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let api_port = env::var("API_PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse::<u16>()?;

        let cors_origins = env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let database_url = env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;

        let max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "10".to_string())
            .parse::<u32>()?;

        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| anyhow::anyhow!("JWT_SECRET environment variable is required"))?;

        if jwt_secret.len() < 32 {
            anyhow::bail!("JWT_SECRET must be at least 32 characters long");
        }

        let token_ttl_seconds = env::var("ACCESS_TOKEN_TTL")
            .unwrap_or_else(|_| "172800".to_string())
            .parse::<i64>()?;

        let token_in_cookie = env_flag("TOKEN_IN_COOKIE");
        let cookie_secure = env_flag("COOKIE_SECURE");

        let cookie_same_site = match env::var("COOKIE_SAMESITE")
            .unwrap_or_default()
            .to_lowercase()
            .as_str()
        {
            "strict" => SameSite::Strict,
            "none" => SameSite::None,
            _ => SameSite::Lax,
        };

        let cookie_domain = env::var("COOKIE_DOMAIN").ok().filter(|d| !d.is_empty());

        let upload_dir = env::var("UPLOAD_DIR").unwrap_or_else(|_| "uploads".to_string());

        Ok(Self {
            api: ApiConfig {
                host: api_host,
                port: api_port,
                cors_origins,
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections,
            },
            auth: AuthConfig {
                jwt_secret,
                token_ttl_seconds,
                token_in_cookie,
                cookie_secure,
                cookie_same_site,
                cookie_domain,
            },
            uploads: UploadConfig {
                dir: PathBuf::from(upload_dir),
            },
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }
}

fn env_flag(name: &str) -> bool {
    env::var(name)
        .map(|v| v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}
