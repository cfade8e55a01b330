use std::env;
use std::net::SocketAddr;
use std::str::FromStr;

use chrono::{FixedOffset, Offset, Utc};

pub mod cors;
pub mod security;

pub use cors::create_cors_layer;
pub use security::create_security_headers_layer;

const DEFAULT_DATABASE_URL: &str = "postgres://localhost/checkin";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
pub const DEFAULT_ALLOWED_ORIGINS: &str = "http://localhost:3000,http://localhost:3001";

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub database_max_connections: u32,
    /// Offset used to decide which calendar day "today" is.
    pub event_utc_offset: FixedOffset,
    pub cors_allowed_origins: String,
    pub production: bool,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let offset_minutes: i32 = parse_or(&lookup, "EVENT_UTC_OFFSET_MINUTES", 0);
        let event_utc_offset = offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .unwrap_or_else(|| {
                tracing::warn!(offset_minutes, "Config: UTC offset out of range, using UTC");
                Utc.fix()
            });

        Self {
            database_url: lookup("DATABASE_URL")
                .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            bind_addr: parse_or(&lookup, "BIND_ADDR", SocketAddr::from(([0, 0, 0, 0], 3001))),
            database_max_connections: parse_or(
                &lookup,
                "DATABASE_MAX_CONNECTIONS",
                DEFAULT_MAX_CONNECTIONS,
            ),
            event_utc_offset,
            cors_allowed_origins: lookup("CORS_ALLOWED_ORIGINS")
                .unwrap_or_else(|| DEFAULT_ALLOWED_ORIGINS.to_string()),
            production: lookup("RUST_ENV")
                .map(|v| v.to_lowercase() == "production")
                .unwrap_or(false),
        }
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T
where
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(key, value = %raw, "Config: unparseable value, using default");
            default
        }),
        None => default,
    }
}
