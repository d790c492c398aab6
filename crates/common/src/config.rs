//! Application configuration.

use serde::Deserialize;
use std::path::Path;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Billing and Pro entitlement configuration.
    #[serde(default)]
    pub billing: BillingConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to bind to.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Public URL of this deployment.
    pub url: String,
}

/// Database connection configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// `PostgreSQL` connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

/// Billing configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct BillingConfig {
    /// Deployment-wide override that grants Pro to every signed-in viewer.
    #[serde(default)]
    pub force_pro_on: bool,
    /// Shared secret expected in the subscription webhook `Authorization` header.
    /// When unset, every webhook delivery is rejected.
    #[serde(default)]
    pub webhook_auth: Option<String>,
    /// `RevenueCat` secret API key used for canonical subscriber lookups.
    #[serde(default)]
    pub revenuecat_secret_api_key: Option<String>,
    /// `RevenueCat` REST API base URL.
    #[serde(default = "default_revenuecat_api_url")]
    pub revenuecat_api_url: String,
    /// Entitlement identifier that unlocks Pro.
    #[serde(default = "default_pro_entitlement_id")]
    pub pro_entitlement_id: String,
    /// Monthly Pro price in cents, used for the admin MRR estimate.
    #[serde(default = "default_pro_monthly_price_cents")]
    pub pro_monthly_price_cents: u32,
}

impl Default for BillingConfig {
    fn default() -> Self {
        Self {
            force_pro_on: false,
            webhook_auth: None,
            revenuecat_secret_api_key: None,
            revenuecat_api_url: default_revenuecat_api_url(),
            pro_entitlement_id: default_pro_entitlement_id(),
            pro_monthly_price_cents: default_pro_monthly_price_cents(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

const fn default_port() -> u16 {
    3000
}

const fn default_max_connections() -> u32 {
    100
}

const fn default_min_connections() -> u32 {
    5
}

fn default_revenuecat_api_url() -> String {
    "https://api.revenuecat.com".to_string()
}

fn default_pro_entitlement_id() -> String {
    "pro".to_string()
}

const fn default_pro_monthly_price_cents() -> u32 {
    499
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Configuration is loaded in the following order:
    /// 1. `.env` (if present, into the process environment)
    /// 2. `config/default.toml`
    /// 3. `config/{environment}.toml` (based on `PEPTALK_ENV`)
    /// 4. Environment variables with `PEPTALK__` prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();

        let env = std::env::var("PEPTALK_ENV").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("PEPTALK")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Load configuration from a specific file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(
                config::Environment::with_prefix("PEPTALK")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn parse(toml: &str) -> Config {
        config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn test_billing_section_is_optional() {
        let config = parse(
            r#"
            [server]
            url = "https://peptalk.example"

            [database]
            url = "postgres://localhost/peptalk"
            "#,
        );

        assert_eq!(config.server.port, 3000);
        assert_eq!(config.database.max_connections, 100);
        assert!(!config.billing.force_pro_on);
        assert!(config.billing.webhook_auth.is_none());
        assert_eq!(config.billing.pro_entitlement_id, "pro");
        assert_eq!(config.billing.pro_monthly_price_cents, 499);
    }

    #[test]
    fn test_force_pro_on_is_read_from_billing_section() {
        let config = parse(
            r#"
            [server]
            url = "https://peptalk.example"

            [database]
            url = "postgres://localhost/peptalk"

            [billing]
            force_pro_on = true
            webhook_auth = "whsec"
            "#,
        );

        assert!(config.billing.force_pro_on);
        assert_eq!(config.billing.webhook_auth.as_deref(), Some("whsec"));
        assert_eq!(config.billing.revenuecat_api_url, "https://api.revenuecat.com");
    }
}
