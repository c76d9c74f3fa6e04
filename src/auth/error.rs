// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication errors.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use super::token::TokenError;
use crate::error::ApiError;

/// Authentication failures surfaced to clients.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// No session cookie on a guarded request
    MissingCookie,
    /// Session cookie failed verification on a guarded request
    InvalidCookie(TokenError),
    /// Login for a username the store does not know
    UnknownUser,
    /// Login with the wrong password
    IncorrectPassword,
    /// Token could not be issued
    Token(TokenError),
}

impl AuthError {
    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MissingCookie | AuthError::InvalidCookie(_) => StatusCode::UNAUTHORIZED,
            AuthError::UnknownUser | AuthError::IncorrectPassword => StatusCode::FORBIDDEN,
            AuthError::Token(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::MissingCookie => write!(f, "No cookie, no access"),
            AuthError::InvalidCookie(_) => write!(f, "Wrong cookie, no access"),
            AuthError::UnknownUser => write!(f, "No user found with that email address"),
            AuthError::IncorrectPassword => write!(f, "Incorrect password"),
            AuthError::Token(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for AuthError {}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        ApiError::new(e.status_code(), e.to_string())
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        ApiError::from(self).into_response()
    }
}
