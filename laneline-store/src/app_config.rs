use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub payments: PaymentsConfig,
    pub mail: MailConfig,
    pub business_rules: BusinessRules,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PaymentsConfig {
    /// Provider secret key. Absent means the mock adapter is used.
    pub stripe_secret_key: Option<String>,
    /// Shared secret for webhook signature verification. Absent means
    /// signatures are not checked (logged as a warning at startup).
    pub webhook_secret: Option<String>,
    #[serde(default = "default_currency")]
    pub currency: String,
}

fn default_currency() -> String {
    "usd".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct MailConfig {
    #[serde(default)]
    pub enabled: bool,
    pub from_email: String,
    pub from_name: String,
    pub operator_email: String,
    pub smtp_host: Option<String>,
    pub smtp_port: Option<u16>,
    pub smtp_username: Option<String>,
    pub smtp_password: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BusinessRules {
    /// Shared key required by the admin endpoints.
    pub admin_key: String,
    #[serde(default = "default_slot_batch_size")]
    pub slot_batch_size: usize,
    /// How far past the requested start date slot generation reaches when no
    /// end date is given.
    #[serde(default = "default_generation_horizon_days")]
    pub generation_horizon_days: i64,
}

fn default_slot_batch_size() -> usize {
    100
}

fn default_generation_horizon_days() -> i64 {
    90
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            .add_source(config::File::with_name("config/local").required(false))
            // Eg. `LANELINE__SERVER__PORT=8080` overrides server.port
            .add_source(config::Environment::with_prefix("LANELINE").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
