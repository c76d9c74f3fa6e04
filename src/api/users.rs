// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User endpoints (behind the session guard).

use axum::{extract::State, Json};
use tracing::error;

use crate::{error::ApiError, models::User, state::AppState};

/// List all users without their password hashes.
#[utoipa::path(
    get,
    path = "/api/users",
    tag = "Users",
    security(("session_cookie" = [])),
    responses(
        (status = 200, description = "All users", body = [User]),
        (status = 401, description = "Missing or invalid session cookie", body = crate::models::MessageResponse),
        (status = 500, description = "Store failure", body = crate::models::MessageResponse),
    )
)]
pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<User>>, ApiError> {
    let records = state.store.list_users().await.map_err(|e| {
        error!(error = %e, "Failed to list users");
        ApiError::internal(e.to_string())
    })?;

    Ok(Json(records.into_iter().map(User::from).collect()))
}
