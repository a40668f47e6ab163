use std::env;
use crate::domain::models::property::PropertyConfig;
use crate::domain::models::accounting::ChannelCommission;

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub jwt_secret_key: String, // Private key (PEM)
    pub jwt_public_key: String, // Public key (PEM)
    pub auth_issuer: String,
    pub lodgify_api_url: String,
    pub lodgify_api_key: Option<String>,
    pub ics_cache_ttl_secs: u64,
    pub calendar_timezone: String,
    pub properties: Vec<PropertyConfig>,
    pub channel_commissions: Vec<ChannelCommission>,
    pub management_commission_pct: u32,
    pub admin_username: Option<String>,
    pub admin_password: Option<String>,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            port: env::var("PORT").unwrap_or_else(|_| "3000".to_string()).parse().expect("PORT must be a number"),
            jwt_secret_key: env::var("JWT_SECRET_KEY").expect("JWT_SECRET_KEY must be set (Ed25519 Private Key)"),
            jwt_public_key: env::var("JWT_PUBLIC_KEY").expect("JWT_PUBLIC_KEY must be set (Ed25519 Public Key)"),
            auth_issuer: env::var("AUTH_ISSUER").unwrap_or_else(|_| "https://api.rental-calendar.local".to_string()),
            lodgify_api_url: env::var("LODGIFY_API_URL").unwrap_or_else(|_| "https://api.lodgify.com/v2".to_string()),
            lodgify_api_key: env::var("LODGIFY_API_KEY").ok().filter(|k| !k.trim().is_empty()),
            ics_cache_ttl_secs: env::var("ICS_CACHE_TTL_SECS").unwrap_or_else(|_| "1800".to_string()).parse().expect("ICS_CACHE_TTL_SECS must be a number"),
            calendar_timezone: env::var("CALENDAR_TIMEZONE").unwrap_or_else(|_| "UTC".to_string()),
            properties: env::var("PROPERTIES_JSON")
                .map(|raw| serde_json::from_str(&raw).expect("PROPERTIES_JSON must be a JSON array of properties"))
                .unwrap_or_default(),
            channel_commissions: env::var("CHANNEL_COMMISSIONS_JSON")
                .map(|raw| serde_json::from_str(&raw).expect("CHANNEL_COMMISSIONS_JSON must be a JSON array"))
                .unwrap_or_else(|_| ChannelCommission::defaults()),
            management_commission_pct: env::var("MANAGEMENT_COMMISSION_PCT").unwrap_or_else(|_| "20".to_string()).parse().expect("MANAGEMENT_COMMISSION_PCT must be a number"),
            admin_username: env::var("ADMIN_USERNAME").ok(),
            admin_password: env::var("ADMIN_PASSWORD").ok(),
        }
    }
}
