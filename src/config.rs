// taskboard-service/src/config.rs
use derive_more::Display;
use std::env;
use std::path::PathBuf;

const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:9090";
const DEFAULT_STORAGE_DIR: &str = "./storage";
const DEFAULT_JWT_SECRET: &str = "taskboard_development_secret";
const DEFAULT_MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

// Who may attach files to, or delete files from, a task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachmentPolicy {
    // Any signed-in user
    AuthenticatedOnly,
    // Only users allowed to modify the owning task
    TaskMutators,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_address: String,
    pub storage_dir: PathBuf,
    pub jwt_secret: String,
    pub public_base_url: String,
    pub attachment_policy: AttachmentPolicy,
    // Body size cap for blob uploads
    pub max_upload_bytes: usize,
}

#[derive(Debug, Display, Clone, PartialEq)]
#[display(fmt = "Invalid value for {}: {:?}", key, value)]
pub struct ConfigError {
    pub key: &'static str,
    pub value: String,
}

impl std::error::Error for ConfigError {}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            storage_dir: PathBuf::from(DEFAULT_STORAGE_DIR),
            jwt_secret: DEFAULT_JWT_SECRET.to_string(),
            public_base_url: format!("http://{}", DEFAULT_BIND_ADDRESS),
            attachment_policy: AttachmentPolicy::AuthenticatedOnly,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl AppConfig {
    // Load from the process environment (after `dotenv` has populated it)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let bind_address =
            lookup("BIND_ADDRESS").unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string());

        let storage_dir = lookup("STORAGE_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STORAGE_DIR));

        let jwt_secret = lookup("JWT_SECRET").unwrap_or_else(|| DEFAULT_JWT_SECRET.to_string());

        let public_base_url = lookup("PUBLIC_BASE_URL")
            .unwrap_or_else(|| format!("http://{}", bind_address));

        let attachment_policy = match lookup("STRICT_ATTACHMENT_AUTH") {
            None => AttachmentPolicy::AuthenticatedOnly,
            Some(value) => match value.trim().to_lowercase().as_str() {
                "" | "0" | "false" | "no" => AttachmentPolicy::AuthenticatedOnly,
                "1" | "true" | "yes" => AttachmentPolicy::TaskMutators,
                _ => {
                    return Err(ConfigError {
                        key: "STRICT_ATTACHMENT_AUTH",
                        value,
                    })
                }
            },
        };

        let max_upload_bytes = match lookup("MAX_UPLOAD_BYTES") {
            None => DEFAULT_MAX_UPLOAD_BYTES,
            Some(value) => match value.trim().parse::<usize>() {
                Ok(limit) if limit > 0 => limit,
                _ => {
                    return Err(ConfigError {
                        key: "MAX_UPLOAD_BYTES",
                        value,
                    })
                }
            },
        };

        Ok(Self {
            bind_address,
            storage_dir,
            jwt_secret,
            public_base_url,
            attachment_policy,
            max_upload_bytes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.bind_address, "127.0.0.1:9090");
        assert_eq!(config.public_base_url, "http://127.0.0.1:9090");
        assert_eq!(config.attachment_policy, AttachmentPolicy::AuthenticatedOnly);
        assert_eq!(config.max_upload_bytes, 50 * 1024 * 1024);
    }

    #[test]
    fn test_overrides() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("BIND_ADDRESS", "0.0.0.0:8080"),
            ("STORAGE_DIR", "/var/lib/taskboard"),
            ("STRICT_ATTACHMENT_AUTH", "true"),
            ("MAX_UPLOAD_BYTES", "1048576"),
        ]))
        .unwrap();

        assert_eq!(config.public_base_url, "http://0.0.0.0:8080");
        assert_eq!(config.storage_dir, PathBuf::from("/var/lib/taskboard"));
        assert_eq!(config.attachment_policy, AttachmentPolicy::TaskMutators);
        assert_eq!(config.max_upload_bytes, 1024 * 1024);
    }

    #[test]
    fn test_rejects_bad_flag() {
        let err = AppConfig::from_lookup(lookup_from(&[("STRICT_ATTACHMENT_AUTH", "maybe")]))
            .unwrap_err();
        assert_eq!(err.key, "STRICT_ATTACHMENT_AUTH");
        assert_eq!(err.to_string(), "Invalid value for STRICT_ATTACHMENT_AUTH: \"maybe\"");
    }

    #[test]
    fn test_rejects_bad_upload_limit() {
        for bad in ["lots", "0", "-5"] {
            let err = AppConfig::from_lookup(lookup_from(&[("MAX_UPLOAD_BYTES", bad)])).unwrap_err();
            assert_eq!(err.key, "MAX_UPLOAD_BYTES");
        }
    }
}
