use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;

use crate::admin::AdminRecord;

/// Environment variable that overrides `auth.jwt_secret`.
pub const JWT_SECRET_ENV: &str = "BALANCE_ADMIN_JWT_SECRET";

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub log_dir: String,
    pub log_file: String,
    pub use_json: bool,
    pub rotation: String,
    pub gateway: GatewayConfig,
    /// PostgreSQL connection URL; in-memory storage when unset
    #[serde(default)]
    pub postgres_url: Option<String>,
    pub auth: AuthConfig,
    #[serde(default)]
    pub admin: AdminConfig,
    #[serde(default)]
    pub audit: AuditConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GatewayConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AdminConfig {
    /// Accept an admin row matched by email when no row carries the user id
    #[serde(default = "default_email_fallback")]
    pub email_fallback: bool,
    /// Administrators for the in-memory directory (ignored with Postgres)
    #[serde(default)]
    pub seed: Vec<SeedAdmin>,
}

fn default_email_fallback() -> bool {
    true
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            email_fallback: default_email_fallback(),
            seed: Vec::new(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SeedAdmin {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub email: Option<String>,
}

impl From<&SeedAdmin> for AdminRecord {
    fn from(seed: &SeedAdmin) -> Self {
        AdminRecord {
            user_id: seed.user_id.clone(),
            email: seed.email.clone(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AuditConfig {
    /// Capacity of the audit outbox channel
    pub queue_size: usize,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self { queue_size: 1024 }
    }
}

impl AppConfig {
    /// Load `config/{env}.yaml`, then apply environment overrides.
    pub fn load(env: &str) -> Result<Self> {
        let config_path = format!("config/{}.yaml", env);
        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path))?;
        let mut config = Self::from_yaml(&content)
            .with_context(|| format!("Failed to parse config file: {}", config_path))?;

        if let Ok(secret) = std::env::var(JWT_SECRET_ENV)
            && !secret.is_empty()
        {
            config.auth.jwt_secret = secret;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            !self.auth.jwt_secret.trim().is_empty(),
            "auth.jwt_secret must not be empty (or set {})",
            JWT_SECRET_ENV
        );
        anyhow::ensure!(self.audit.queue_size > 0, "audit.queue_size must be positive");
        Ok(())
    }

    pub fn seed_admins(&self) -> Vec<AdminRecord> {
        self.admin.seed.iter().map(AdminRecord::from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
log_level: info
log_dir: ./logs
log_file: balance_admin.log
use_json: false
rotation: daily
gateway:
  host: 0.0.0.0
  port: 8090
auth:
  jwt_secret: dev-secret
"#;

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_yaml(MINIMAL).unwrap();
        assert_eq!(config.gateway.port, 8090);
        assert!(config.postgres_url.is_none());
        assert!(config.admin.email_fallback);
        assert!(config.admin.seed.is_empty());
        assert_eq!(config.audit.queue_size, 1024);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_admin_section() {
        let yaml = format!(
            "{MINIMAL}admin:\n  email_fallback: false\n  seed:\n    - user_id: admin-1\n      email: ops@example.com\n    - email: legacy@example.com\n"
        );
        let config = AppConfig::from_yaml(&yaml).unwrap();
        assert!(!config.admin.email_fallback);

        let admins = config.seed_admins();
        assert_eq!(admins.len(), 2);
        assert_eq!(admins[0].user_id, "admin-1");
        assert_eq!(admins[1].user_id, "");
        assert_eq!(admins[1].email.as_deref(), Some("legacy@example.com"));
    }

    #[test]
    fn test_empty_secret_rejected() {
        let yaml = MINIMAL.replace("dev-secret", "\"\"");
        let config = AppConfig::from_yaml(&yaml).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_section_is_error() {
        assert!(AppConfig::from_yaml("log_level: info").is_err());
    }
}
