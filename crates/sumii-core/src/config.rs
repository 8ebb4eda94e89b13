use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_BIND: &str = "0.0.0.0";
/// Document upload ceiling.
pub const MAX_DOCUMENT_BYTES: u64 = 10 * 1024 * 1024;
/// Event-stream poll cadence.
pub const NOTIFICATION_POLL_INTERVAL_SECS: u64 = 1;
/// Presigned download URL lifetime.
pub const PRESIGN_EXPIRY_DAYS: i64 = 7;
/// Email-delivery timeout.
pub const EMAIL_TIMEOUT_SECS: u64 = 10;
/// MIME types accepted for document upload; anything else is rejected before
/// it reaches blob storage.
pub const ALLOWED_DOCUMENT_MIME_TYPES: [&str; 5] =
    ["application/pdf", "image/jpeg", "image/png", "image/heic", "image/heif"];

/// Top-level config (`sumii.toml` + `SUMII_*` env overrides).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SumiiConfig {
    #[serde(default)]
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub agent: AgentConfig,
    #[serde(default)]
    pub ocr: OcrConfig,
    #[serde(default)]
    pub blob: BlobConfig,
    #[serde(default)]
    pub email: EmailConfig,
    #[serde(default)]
    pub anwalt: AnwaltConfig,
    #[serde(default)]
    pub webhooks: WebhooksConfig,
}

impl Default for SumiiConfig {
    fn default() -> Self {
        Self {
            gateway: GatewayConfig::default(),
            database: DatabaseConfig::default(),
            agent: AgentConfig::default(),
            ocr: OcrConfig::default(),
            blob: BlobConfig::default(),
            email: EmailConfig::default(),
            anwalt: AnwaltConfig::default(),
            webhooks: WebhooksConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_bind")]
    pub bind: String,
    /// HS256 signing secret for bearer tokens. This core only verifies, never
    /// issues, tokens.
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            bind: default_bind(),
            jwt_secret: default_jwt_secret(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

/// Remote-agent adapter connection settings. Empty `api_key` degrades the
/// adapter to an error-returning stub rather than panicking at startup
/// — every secret is optional in development, with a documented
/// degradation when unset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub library_id: Option<String>,
    #[serde(default)]
    pub org_id: Option<String>,
    #[serde(default = "default_initial_agent")]
    pub initial_agent: String,
    #[serde(default = "default_wrapup_label")]
    pub wrapup_label_contains: Vec<String>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            api_key: None,
            library_id: None,
            org_id: None,
            initial_agent: default_initial_agent(),
            wrapup_label_contains: default_wrapup_label(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct OcrConfig {
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlobConfig {
    #[serde(default = "default_bucket")]
    pub bucket: String,
    #[serde(default = "default_region")]
    pub region: String,
    #[serde(default)]
    pub endpoint_url: Option<String>,
}

impl Default for BlobConfig {
    fn default() -> Self {
        Self {
            bucket: default_bucket(),
            region: default_region(),
            endpoint_url: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct EmailConfig {
    #[serde(default)]
    pub smtp_host: Option<String>,
    #[serde(default)]
    pub smtp_user: Option<String>,
    #[serde(default)]
    pub smtp_password: Option<String>,
    #[serde(default = "default_from_address")]
    pub from_address: String,
    #[serde(default = "default_link_base_url")]
    pub link_base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AnwaltConfig {
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
}

/// Inbound webhook shared-secret auth.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhooksConfig {
    /// Empty string (the development default) accepts any header value.
    #[serde(default)]
    pub lawyer_response_secret: String,
}

impl Default for WebhooksConfig {
    fn default() -> Self {
        Self {
            lawyer_response_secret: String::new(),
        }
    }
}

fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_bind() -> String {
    DEFAULT_BIND.to_string()
}
fn default_jwt_secret() -> String {
    "change-me".to_string()
}
fn default_db_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.sumii/sumii.db", home)
}
fn default_initial_agent() -> String {
    "router".to_string()
}
fn default_wrapup_label() -> Vec<String> {
    vec!["wrap".to_string(), "up".to_string()]
}
fn default_bucket() -> String {
    "sumii-local".to_string()
}
fn default_region() -> String {
    "eu-central-1".to_string()
}
fn default_from_address() -> String {
    "no-reply@sumii.example".to_string()
}
fn default_link_base_url() -> String {
    "https://app.sumii.example".to_string()
}

impl SumiiConfig {
    /// Load config from a TOML file with `SUMII_*` env var overrides.
    pub fn load(config_path: Option<&str>) -> crate::error::Result<Self> {
        let path = config_path
            .map(String::from)
            .unwrap_or_else(default_config_path);

        let config: SumiiConfig = Figment::new()
            .merge(Toml::file(&path))
            .merge(Env::prefixed("SUMII_").split("_"))
            .extract()
            .map_err(|e| crate::error::SumiiError::Config(e.to_string()))?;

        Ok(config)
    }
}

fn default_config_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.sumii/sumii.toml", home)
}
