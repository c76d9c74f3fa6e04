// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! This module defines environment variable names, default values and the
//! [`Config`] loaded from the environment at startup. Loading fails fast:
//! a missing signing secret stops the process before it binds a socket.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `JWT_SECRET` | HMAC secret for signing session tokens | Required |
//! | `JWT_TTL_SECONDS` | Session token lifetime, 1s to 10 years (no `exp` claim when unset) | Unset |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `3001` |
//! | `COOKIE_SECURE` | Add the `Secure` attribute to the session cookie | `false` |
//! | `COOKIE_SAME_SITE` | `lax`, `strict` or `none` | Unset |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::time::Duration;

use crate::auth::cookie::{CookieSettings, SameSite};

/// Environment variable name for the token signing secret.
pub const JWT_SECRET_ENV: &str = "JWT_SECRET";

/// Environment variable name for the token lifetime in seconds.
pub const JWT_TTL_SECONDS_ENV: &str = "JWT_TTL_SECONDS";

pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const COOKIE_SECURE_ENV: &str = "COOKIE_SECURE";
pub const COOKIE_SAME_SITE_ENV: &str = "COOKIE_SAME_SITE";

/// Environment variable name for the log output format.
///
/// `json` selects structured JSON lines, anything else the pretty formatter.
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3001;
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

/// Longest accepted session token lifetime (ten years).
pub const MAX_TOKEN_TTL_SECS: u64 = 10 * 365 * 24 * 60 * 60;

/// Configuration errors raised while loading [`Config`].
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("JWT_SECRET is not defined")]
    MissingJwtSecret,

    #[error("invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },
}

/// Fully resolved server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub jwt_secret: String,
    pub token_ttl: Option<Duration>,
    pub host: String,
    pub port: u16,
    pub cookie: CookieSettings,
    pub json_logs: bool,
}

impl Config {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let jwt_secret = lookup(JWT_SECRET_ENV)
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::MissingJwtSecret)?;

        let token_ttl = match lookup(JWT_TTL_SECONDS_ENV) {
            Some(raw) => {
                let secs = raw
                    .trim()
                    .parse::<u64>()
                    .ok()
                    .filter(|secs| (1..=MAX_TOKEN_TTL_SECS).contains(secs))
                    .ok_or_else(|| ConfigError::InvalidValue {
                        name: JWT_TTL_SECONDS_ENV,
                        value: raw.clone(),
                    })?;
                Some(Duration::from_secs(secs))
            }
            None => None,
        };

        let host = lookup(HOST_ENV).unwrap_or_else(|| DEFAULT_HOST.to_string());

        let port: u16 = match lookup(PORT_ENV) {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
                name: PORT_ENV,
                value: raw.clone(),
            })?,
            None => DEFAULT_PORT,
        };

        let secure = match lookup(COOKIE_SECURE_ENV) {
            Some(raw) => parse_bool(&raw).ok_or(ConfigError::InvalidValue {
                name: COOKIE_SECURE_ENV,
                value: raw,
            })?,
            None => false,
        };

        let same_site = match lookup(COOKIE_SAME_SITE_ENV) {
            Some(raw) => Some(raw.parse::<SameSite>().map_err(|_| ConfigError::InvalidValue {
                name: COOKIE_SAME_SITE_ENV,
                value: raw.clone(),
            })?),
            None => None,
        };

        let json_logs = lookup(LOG_FORMAT_ENV)
            .map(|f| f.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        Ok(Self {
            jwt_secret,
            token_ttl,
            host,
            port,
            cookie: CookieSettings { secure, same_site },
            json_logs,
        })
    }

    /// Socket address string in `host:port` form.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
