// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Session resolution from the request's session cookie.
//!
//! Use the [`CurrentSession`] extractor in handlers that want to know who is
//! calling without rejecting anonymous requests:
//!
//! ```rust,ignore
//! async fn my_handler(CurrentSession(session): CurrentSession) -> impl IntoResponse {
//!     match session {
//!         Session::Authenticated(user) => { /* ... */ }
//!         Session::Anonymous | Session::Invalid(_) => { /* ... */ }
//!     }
//! }
//! ```

use axum::{
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap},
};
use tracing::{error, warn};

use super::{cookie, token::TokenError};
use crate::error::ApiError;
use crate::models::User;
use crate::state::AppState;

/// Outcome of resolving a request's session cookie.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Session {
    /// Valid token whose user still exists
    Authenticated(User),
    /// No cookie, or a valid token whose user is gone
    Anonymous,
    /// Cookie present but the token did not verify
    Invalid(TokenError),
}

impl Session {
    /// Collapse to the user, if any.
    pub fn into_user(self) -> Option<User> {
        match self {
            Session::Authenticated(user) => Some(user),
            Session::Anonymous | Session::Invalid(_) => None,
        }
    }
}

/// Resolve the session carried by `headers`.
///
/// Only store failures are errors; token problems become [`Session::Invalid`].
pub async fn resolve_session(state: &AppState, headers: &HeaderMap) -> Result<Session, ApiError> {
    let Some(token) = cookie::session_token(headers) else {
        return Ok(Session::Anonymous);
    };

    let claims = match state.tokens.verify(token) {
        Ok(claims) => claims,
        Err(e) => {
            warn!(error = %e, "Session cookie rejected");
            return Ok(Session::Invalid(e));
        }
    };

    let user = state.store.find_by_id(claims.user_id).await.map_err(|e| {
        error!(error = %e, user_id = %claims.user_id, "Session user lookup failed");
        ApiError::internal(e.to_string())
    })?;

    Ok(match user {
        Some(record) => Session::Authenticated(record.into()),
        None => Session::Anonymous,
    })
}

/// Extractor resolving the caller's [`Session`].
pub struct CurrentSession(pub Session);

impl FromRequestParts<AppState> for CurrentSession {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        resolve_session(state, &parts.headers).await.map(CurrentSession)
    }
}
