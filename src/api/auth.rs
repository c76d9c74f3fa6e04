// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Registration, login, session lookup and logout endpoints.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use tracing::{error, info, warn};

use crate::{
    auth::{cookie::set_cookie_headers, AuthError, CurrentSession},
    error::ApiError,
    models::{CredentialsRequest, MessageResponse, User, UserRecord},
    state::AppState,
};

/// Issue a token for `user` and build the `Set-Cookie` headers carrying it.
fn session_cookie_for(state: &AppState, user: &UserRecord) -> Result<HeaderMap, ApiError> {
    let token = state.tokens.issue(user.id).map_err(|e| {
        error!(error = %e, user_id = %user.id, "Failed to issue session token");
        ApiError::from(AuthError::Token(e))
    })?;
    set_cookie_headers(&state.cookie.session_cookie(&token))
}

fn credentials(
    payload: Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<CredentialsRequest, ApiError> {
    payload
        .map(|Json(request)| request)
        .map_err(|rejection| ApiError::bad_request(rejection.body_text()))
}

/// Register a new user and start a session.
#[utoipa::path(
    post,
    path = "/auth/register",
    request_body = CredentialsRequest,
    tag = "Auth",
    responses(
        (status = 201, description = "User created; session cookie set", body = User),
        (status = 400, description = "Invalid input or username taken", body = MessageResponse),
    )
)]
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<(StatusCode, HeaderMap, Json<User>), ApiError> {
    let request = credentials(payload)?;

    let record = state
        .store
        .create_user(&request.username, &request.password)
        .await
        .map_err(|e| {
            warn!(error = %e, username = %request.username, "Registration rejected");
            ApiError::bad_request(e.to_string())
        })?;

    let headers = session_cookie_for(&state, &record)?;
    info!(user_id = %record.id, username = %record.username, "User registered");

    Ok((StatusCode::CREATED, headers, Json(record.into())))
}

/// Log in with username and password.
///
/// The username check runs before the password check, so the two failure
/// messages differ.
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = CredentialsRequest,
    tag = "Auth",
    responses(
        (status = 200, description = "Logged in; session cookie set", body = User),
        (status = 403, description = "Unknown user or incorrect password", body = MessageResponse),
    )
)]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<(HeaderMap, Json<User>), ApiError> {
    let request = credentials(payload)?;

    let record = state
        .store
        .find_by_username(&request.username)
        .await
        .map_err(|e| {
            error!(error = %e, "User lookup failed during login");
            ApiError::internal(e.to_string())
        })?
        .ok_or(AuthError::UnknownUser)?;

    let valid = state
        .store
        .verify_password(&record, &request.password)
        .await
        .map_err(|e| {
            error!(error = %e, user_id = %record.id, "Password verification failed");
            ApiError::internal(e.to_string())
        })?;
    if !valid {
        return Err(AuthError::IncorrectPassword.into());
    }

    let headers = session_cookie_for(&state, &record)?;
    info!(user_id = %record.id, "User logged in");

    Ok((headers, Json(record.into())))
}

/// Return the user behind the session cookie, or `null`.
///
/// A missing or invalid cookie is not an error here.
#[utoipa::path(
    get,
    path = "/auth/user",
    tag = "Auth",
    responses(
        (status = 200, description = "Current user, or null without a valid session", body = Option<User>),
    )
)]
pub async fn get_current_user(CurrentSession(session): CurrentSession) -> Json<Option<User>> {
    Json(session.into_user())
}

/// Clear the session cookie.
#[utoipa::path(
    get,
    path = "/auth/logout",
    tag = "Auth",
    responses(
        (status = 200, description = "Session cookie cleared", body = MessageResponse),
    )
)]
pub async fn logout(
    State(state): State<AppState>,
) -> Result<(HeaderMap, Json<MessageResponse>), ApiError> {
    let headers = set_cookie_headers(&state.cookie.clear_cookie())?;
    Ok((headers, Json(MessageResponse::new("Logged out successfully!"))))
}
