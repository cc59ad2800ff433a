// src/config.rs
use crate::gemini_client::DEFAULT_BASE_URL;
use std::net::SocketAddr;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
const DEFAULT_TIMEOUT_SECS: u64 = 60;
const DEFAULT_OTP_TTL_SECS: u64 = 300;
const DEFAULT_OTP_RATE_LIMIT: u32 = 10;
const DEFAULT_WRITE_RATE_LIMIT: u32 = 30;
const DEFAULT_SESSION_IDLE_SECS: u64 = 3600;
const DEFAULT_MAX_SESSIONS: usize = 10_000;
const DEFAULT_MAX_LEADS: usize = 10_000;
/// Upper bound for `OTP_TTL_SECS` (one day).
pub const MAX_OTP_TTL_SECS: u64 = 86_400;
const DEV_JWT_SECRET: &str = "homeward_dev_secret";

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("{name} has an invalid value '{value}'")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub gemini_model: String,
    pub gemini_base_url: String,
    pub gemini_timeout: Duration,
    pub jwt_secret: String,
    pub otp_ttl: Duration,
    /// OTP requests allowed per client IP per minute
    pub otp_rate_limit: u32,
    /// Session and lead creations allowed per client IP per minute
    pub write_rate_limit: u32,
    pub session_idle: Duration,
    pub max_sessions: usize,
    pub max_leads: usize,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let jwt_secret = match get("JWT_SECRET") {
            Some(secret) => secret,
            None => {
                tracing::warn!("JWT_SECRET not set, using the development secret");
                DEV_JWT_SECRET.to_string()
            }
        };

        let otp_ttl_secs: u64 = parse("OTP_TTL_SECS", get("OTP_TTL_SECS"), Some(DEFAULT_OTP_TTL_SECS))?;
        if otp_ttl_secs == 0 || otp_ttl_secs > MAX_OTP_TTL_SECS {
            return Err(ConfigError::Invalid {
                name: "OTP_TTL_SECS",
                value: otp_ttl_secs.to_string(),
            });
        }

        let max_sessions: usize = parse("MAX_SESSIONS", get("MAX_SESSIONS"), Some(DEFAULT_MAX_SESSIONS))?;
        if max_sessions == 0 {
            return Err(ConfigError::Invalid {
                name: "MAX_SESSIONS",
                value: max_sessions.to_string(),
            });
        }

        Ok(Self {
            bind_addr: parse("BIND_ADDR", get("BIND_ADDR"), DEFAULT_BIND_ADDR.parse().ok())?,
            gemini_model: get("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            gemini_base_url: get("GEMINI_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            gemini_timeout: Duration::from_secs(parse(
                "GEMINI_TIMEOUT_SECS",
                get("GEMINI_TIMEOUT_SECS"),
                Some(DEFAULT_TIMEOUT_SECS),
            )?),
            jwt_secret,
            otp_ttl: Duration::from_secs(otp_ttl_secs),
            otp_rate_limit: parse("OTP_RATE_LIMIT", get("OTP_RATE_LIMIT"), Some(DEFAULT_OTP_RATE_LIMIT))?,
            write_rate_limit: parse("WRITE_RATE_LIMIT", get("WRITE_RATE_LIMIT"), Some(DEFAULT_WRITE_RATE_LIMIT))?,
            session_idle: Duration::from_secs(parse(
                "SESSION_IDLE_SECS",
                get("SESSION_IDLE_SECS"),
                Some(DEFAULT_SESSION_IDLE_SECS),
            )?),
            max_sessions,
            max_leads: parse("MAX_LEADS", get("MAX_LEADS"), Some(DEFAULT_MAX_LEADS))?,
        })
    }
}

fn parse<T: std::str::FromStr>(
    name: &'static str,
    raw: Option<String>,
    default: Option<T>,
) -> Result<T, ConfigError> {
    match raw {
        Some(value) => value.parse().map_err(|_| ConfigError::Invalid { name, value }),
        None => default.ok_or(ConfigError::Invalid {
            name,
            value: String::new(),
        }),
    }
}
