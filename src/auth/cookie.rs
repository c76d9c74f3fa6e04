// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Session cookie reading and `Set-Cookie` header construction.

use std::str::FromStr;

use axum::http::{
    header::{COOKIE, SET_COOKIE},
    HeaderMap, HeaderValue,
};
use tracing::error;

use crate::error::ApiError;

/// Name of the cookie carrying the session token.
pub const SESSION_COOKIE_NAME: &str = "token";

/// `SameSite` cookie attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SameSite {
    Lax,
    Strict,
    None,
}

/// Parses a configuration value (case-insensitive).
impl FromStr for SameSite {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "lax" => Ok(SameSite::Lax),
            "strict" => Ok(SameSite::Strict),
            "none" => Ok(SameSite::None),
            other => Err(format!("unknown SameSite value: {other}")),
        }
    }
}

impl SameSite {
    fn as_str(&self) -> &'static str {
        match self {
            SameSite::Lax => "Lax",
            SameSite::Strict => "Strict",
            SameSite::None => "None",
        }
    }
}

/// Extra attributes applied to the session cookie.
///
/// The default adds nothing beyond `HttpOnly` and `Path=/`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CookieSettings {
    pub secure: bool,
    pub same_site: Option<SameSite>,
}

impl CookieSettings {
    fn append_attributes(&self, cookie: &mut String) {
        if self.secure {
            cookie.push_str("; Secure");
        }
        if let Some(same_site) = self.same_site {
            cookie.push_str("; SameSite=");
            cookie.push_str(same_site.as_str());
        }
    }

    /// Build the `Set-Cookie` value that stores `token`.
    pub fn session_cookie(&self, token: &str) -> String {
        let mut cookie = format!("{SESSION_COOKIE_NAME}={token}; Path=/; HttpOnly");
        self.append_attributes(&mut cookie);
        cookie
    }

    /// Build the `Set-Cookie` value that expires the session cookie.
    pub fn clear_cookie(&self) -> String {
        let mut cookie = format!(
            "{SESSION_COOKIE_NAME}=; Path=/; HttpOnly; Max-Age=0; Expires=Thu, 01 Jan 1970 00:00:00 GMT"
        );
        self.append_attributes(&mut cookie);
        cookie
    }
}

/// Get a cookie value by name from request headers.
///
/// Every `Cookie` header is searched; the first matching pair wins.
pub fn get_cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim())
}

/// Get the session token, treating an empty value as absent.
pub fn session_token(headers: &HeaderMap) -> Option<&str> {
    get_cookie(headers, SESSION_COOKIE_NAME).filter(|token| !token.is_empty())
}

/// Header map carrying a single `Set-Cookie` value.
///
/// A value that is not a valid header is a server fault, not a missing cookie.
pub fn set_cookie_headers(cookie: &str) -> Result<HeaderMap, ApiError> {
    let value = HeaderValue::from_str(cookie).map_err(|e| {
        error!(error = %e, "Session cookie is not a valid header value");
        ApiError::internal("Failed to build session cookie")
    })?;
    let mut headers = HeaderMap::new();
    headers.insert(SET_COOKIE, value);
    Ok(headers)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers_with_cookie(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.append(COOKIE, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn get_cookie_finds_value_among_pairs() {
        let headers = headers_with_cookie("theme=dark; token=abc.def.ghi; lang=en");
        assert_eq!(get_cookie(&headers, "token"), Some("abc.def.ghi"));
        assert_eq!(get_cookie(&headers, "lang"), Some("en"));
        assert_eq!(get_cookie(&headers, "missing"), None);
    }

    #[test]
    fn get_cookie_searches_multiple_headers() {
        let mut headers = headers_with_cookie("theme=dark");
        headers.append(COOKIE, HeaderValue::from_static("token=xyz"));
        assert_eq!(get_cookie(&headers, "token"), Some("xyz"));
    }

    #[test]
    fn empty_session_token_counts_as_absent() {
        let headers = headers_with_cookie("token=");
        assert_eq!(session_token(&headers), None);
        assert_eq!(session_token(&HeaderMap::new()), None);
    }

    #[test]
    fn cookie_name_must_match_exactly() {
        let headers = headers_with_cookie("xtoken=abc");
        assert_eq!(session_token(&headers), None);
    }

    #[test]
    fn default_session_cookie_is_http_only_without_extras() {
        let cookie = CookieSettings::default().session_cookie("abc");
        assert_eq!(cookie, "token=abc; Path=/; HttpOnly");
    }

    #[test]
    fn configured_attributes_are_appended() {
        let settings = CookieSettings {
            secure: true,
            same_site: Some(SameSite::Lax),
        };
        assert_eq!(
            settings.session_cookie("abc"),
            "token=abc; Path=/; HttpOnly; Secure; SameSite=Lax"
        );
    }

    #[test]
    fn clear_cookie_expires_immediately() {
        let cookie = CookieSettings::default().clear_cookie();
        assert!(cookie.starts_with("token=;"));
        assert!(cookie.contains("Max-Age=0"));
        assert!(cookie.contains("Expires=Thu, 01 Jan 1970 00:00:00 GMT"));
    }

    #[test]
    fn same_site_parses_case_insensitively() {
        assert_eq!("STRICT".parse::<SameSite>(), Ok(SameSite::Strict));
        assert_eq!(" none ".parse::<SameSite>(), Ok(SameSite::None));
        assert!("sometimes".parse::<SameSite>().is_err());
    }

    #[test]
    fn set_cookie_headers_carries_value() {
        let headers = set_cookie_headers("token=abc; Path=/; HttpOnly").unwrap();
        assert_eq!(
            headers.get(SET_COOKIE).unwrap(),
            "token=abc; Path=/; HttpOnly"
        );
    }

    #[test]
    fn invalid_cookie_value_is_a_server_error() {
        let err = set_cookie_headers("token=abc\r\nX-Injected: 1").unwrap_err();
        assert_eq!(err.status, axum::http::StatusCode::INTERNAL_SERVER_ERROR);
    }
}
