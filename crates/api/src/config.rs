//! Environment-driven configuration.

use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;

use colourmagic_infra::blob::CloudinaryConfig;
use colourmagic_infra::blob::cloudinary::DEFAULT_FOLDER;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_UPLOAD_TIMEOUT_SECS: u64 = 30;
/// 8 images plus form fields.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key} is required when {reason}")]
    Missing { key: &'static str, reason: &'static str },

    #[error("{key}={value:?} is invalid: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    /// Postgres-backed products when set; in-memory otherwise.
    pub database_url: Option<String>,
    /// Cloudinary uploads when set; in-memory blobs otherwise.
    pub cloudinary: Option<CloudinaryConfig>,
    pub max_upload_bytes: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            database_url: None,
            cloudinary: None,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let bind_raw = get("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr: SocketAddr = bind_raw.parse::<SocketAddr>().map_err(|e| ConfigError::Invalid {
            key: "BIND_ADDR",
            value: bind_raw.clone(),
            reason: e.to_string(),
        })?;

        let use_persistent = match get("USE_PERSISTENT_STORES") {
            None => false,
            Some(raw) => parse_bool(&raw).ok_or_else(|| ConfigError::Invalid {
                key: "USE_PERSISTENT_STORES",
                value: raw.clone(),
                reason: "expected true or false".to_string(),
            })?,
        };

        let database_url = if use_persistent {
            Some(get("DATABASE_URL").ok_or(ConfigError::Missing {
                key: "DATABASE_URL",
                reason: "USE_PERSISTENT_STORES=true",
            })?)
        } else {
            None
        };

        let upload_timeout = parse_number::<u64>(&get, "UPLOAD_TIMEOUT_SECS")?
            .unwrap_or(DEFAULT_UPLOAD_TIMEOUT_SECS);
        let max_upload_bytes =
            parse_number::<usize>(&get, "MAX_UPLOAD_BYTES")?.unwrap_or(DEFAULT_MAX_UPLOAD_BYTES);

        let cloudinary = match (
            get("CLOUDINARY_CLOUD_NAME"),
            get("CLOUDINARY_API_KEY"),
            get("CLOUDINARY_API_SECRET"),
        ) {
            (Some(cloud), Some(key), Some(secret)) => {
                let mut config = CloudinaryConfig::new(cloud, key, secret);
                config.folder = get("CLOUDINARY_FOLDER").unwrap_or_else(|| DEFAULT_FOLDER.to_string());
                if let Some(endpoint) = get("CLOUDINARY_ENDPOINT") {
                    config.endpoint = endpoint;
                }
                config.timeout = Duration::from_secs(upload_timeout);
                Some(config)
            }
            _ => None,
        };

        Ok(Self {
            bind_addr,
            database_url,
            cloudinary,
            max_upload_bytes,
        })
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

fn parse_number<T>(
    get: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    get(key)
        .map(|raw| {
            raw.trim().parse::<T>().map_err(|e| ConfigError::Invalid {
                key,
                value: raw.clone(),
                reason: e.to_string(),
            })
        })
        .transpose()
}
