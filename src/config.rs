//! Runtime configuration parsed from environment variables.
//!
//! Every knob has a default, so an empty environment yields a working
//! development server. Malformed values are rejected rather than ignored.

use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_STORAGE_FILE: &str = ".fincairbnb-session.json";

pub const DEFAULT_LOGIN_LATENCY_MS: u64 = 800;
pub const DEFAULT_REGISTER_LATENCY_MS: u64 = 1200;
pub const DEFAULT_RESET_LATENCY_MS: u64 = 1500;
pub const DEFAULT_LOOKUP_LATENCY_MS: u64 = 300;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {var}: {value:?}")]
    Invalid { var: &'static str, value: String },
}

/// Artificial delays applied by the mock auth operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Latency {
    pub login: Duration,
    pub register: Duration,
    pub reset: Duration,
    pub lookup: Duration,
}

impl Latency {
    /// No delay anywhere.
    #[cfg(test)]
    #[must_use]
    pub const fn none() -> Self {
        Self { login: Duration::ZERO, register: Duration::ZERO, reset: Duration::ZERO, lookup: Duration::ZERO }
    }
}

impl Default for Latency {
    fn default() -> Self {
        Self {
            login: Duration::from_millis(DEFAULT_LOGIN_LATENCY_MS),
            register: Duration::from_millis(DEFAULT_REGISTER_LATENCY_MS),
            reset: Duration::from_millis(DEFAULT_RESET_LATENCY_MS),
            lookup: Duration::from_millis(DEFAULT_LOOKUP_LATENCY_MS),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub bind_addr: IpAddr,
    pub port: u16,
    /// Mark the token cookie `Secure`.
    pub cookie_secure: bool,
    pub latency: Latency,
    /// File backing the CLI session storage.
    pub storage_path: PathBuf,
    /// Optional directory of static assets served under `/assets`.
    pub assets_dir: Option<PathBuf>,
}

impl AppConfig {
    /// Load from the process environment.
    ///
    /// Reads `BIND_ADDR`, `PORT`, `COOKIE_SECURE`, `AUTH_*_LATENCY_MS`,
    /// `FINCAIRBNB_STORAGE` and `ASSETS_DIR`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when a variable is set but unparsable.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// See [`AppConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let latency = Latency {
            login: Duration::from_millis(parse_var(&lookup, "AUTH_LOGIN_LATENCY_MS", DEFAULT_LOGIN_LATENCY_MS)?),
            register: Duration::from_millis(parse_var(&lookup, "AUTH_REGISTER_LATENCY_MS", DEFAULT_REGISTER_LATENCY_MS)?),
            reset: Duration::from_millis(parse_var(&lookup, "AUTH_RESET_LATENCY_MS", DEFAULT_RESET_LATENCY_MS)?),
            lookup: Duration::from_millis(parse_var(&lookup, "AUTH_LOOKUP_LATENCY_MS", DEFAULT_LOOKUP_LATENCY_MS)?),
        };

        let cookie_secure = match lookup("COOKIE_SECURE") {
            Some(raw) => parse_bool(&raw).ok_or(ConfigError::Invalid { var: "COOKIE_SECURE", value: raw })?,
            None => false,
        };

        Ok(Self {
            bind_addr: parse_var(&lookup, "BIND_ADDR", IpAddr::from([0, 0, 0, 0]))?,
            port: parse_var(&lookup, "PORT", DEFAULT_PORT)?,
            cookie_secure,
            latency,
            storage_path: lookup("FINCAIRBNB_STORAGE").map_or_else(|| PathBuf::from(DEFAULT_STORAGE_FILE), PathBuf::from),
            assets_dir: lookup("ASSETS_DIR").filter(|v| !v.trim().is_empty()).map(PathBuf::from),
        })
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: IpAddr::from([0, 0, 0, 0]),
            port: DEFAULT_PORT,
            cookie_secure: false,
            latency: Latency::default(),
            storage_path: PathBuf::from(DEFAULT_STORAGE_FILE),
            assets_dir: None,
        }
    }
}

/// Parse a boolean flag value: `1/true/yes/on` or `0/false/no/off`.
#[must_use]
pub fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn parse_var<F, T>(lookup: &F, var: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(var) {
        Some(raw) => raw.trim().parse::<T>().map_err(|_| ConfigError::Invalid { var, value: raw }),
        None => Ok(default),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
