//! Process configuration read from environment variables.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, bail};

use armory_infra::DEFAULT_MAX_ATTEMPTS;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEV_JWT_SECRET: &str = "dev-secret";

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub bind_addr: SocketAddr,
    pub jwt_secret: String,
    /// Postgres when true, in-memory stores otherwise.
    pub use_persistent_stores: bool,
    pub database_url: Option<String>,
    /// JSON array of stock items inserted at startup.
    pub catalog_seed: Option<PathBuf>,
    pub reservation_max_attempts: u32,
}

impl ApiConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup (the environment in production).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let bind_addr = lookup("BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse()
            .context("BIND_ADDR must be a socket address")?;

        let jwt_secret = lookup("JWT_SECRET").unwrap_or_else(|| {
            tracing::warn!("JWT_SECRET not set; using insecure dev default");
            DEV_JWT_SECRET.to_string()
        });

        let use_persistent_stores = lookup("USE_PERSISTENT_STORES")
            .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        let database_url = lookup("DATABASE_URL").filter(|v| !v.trim().is_empty());
        if use_persistent_stores && database_url.is_none() {
            bail!("DATABASE_URL must be set when USE_PERSISTENT_STORES=true");
        }

        let reservation_max_attempts = match lookup("RESERVATION_MAX_ATTEMPTS") {
            Some(v) => v
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .context("RESERVATION_MAX_ATTEMPTS must be a positive integer")?,
            None => DEFAULT_MAX_ATTEMPTS,
        };

        Ok(Self {
            bind_addr,
            jwt_secret,
            use_persistent_stores,
            database_url,
            catalog_seed: lookup("CATALOG_SEED").map(PathBuf::from),
            reservation_max_attempts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> anyhow::Result<ApiConfig> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ApiConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_select_in_memory_stores() {
        let cfg = config(&[]).unwrap();
        assert_eq!(cfg.bind_addr.to_string(), DEFAULT_BIND_ADDR);
        assert!(!cfg.use_persistent_stores);
        assert_eq!(cfg.reservation_max_attempts, DEFAULT_MAX_ATTEMPTS);
        assert!(cfg.catalog_seed.is_none());
    }

    #[test]
    fn persistent_stores_need_a_database_url() {
        assert!(config(&[("USE_PERSISTENT_STORES", "true")]).is_err());
        let cfg = config(&[
            ("USE_PERSISTENT_STORES", "true"),
            ("DATABASE_URL", "postgres://localhost/armory"),
        ])
        .unwrap();
        assert!(cfg.use_persistent_stores);
    }

    #[test]
    fn max_attempts_must_be_positive() {
        assert!(config(&[("RESERVATION_MAX_ATTEMPTS", "0")]).is_err());
        assert!(config(&[("RESERVATION_MAX_ATTEMPTS", "lots")]).is_err());
        assert_eq!(
            config(&[("RESERVATION_MAX_ATTEMPTS", "5")]).unwrap().reservation_max_attempts,
            5
        );
    }
}
