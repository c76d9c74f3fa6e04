// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Guard middleware for protected route groups.
//!
//! ```rust,ignore
//! let api = Router::new()
//!     .route("/users", get(users::list_users))
//!     .route_layer(axum::middleware::from_fn_with_state(
//!         state.clone(),
//!         require_session,
//!     ));
//! ```
//!
//! The guard proves the token is valid; it does not check that the user it
//! names still exists. Handlers that need the user must look it up.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::warn;

use super::{cookie, AuthError};
use crate::state::AppState;

/// Reject requests without a valid session cookie.
///
/// On success the verified [`SessionClaims`](super::SessionClaims) are added
/// to the request extensions and the request is passed on unchanged.
pub async fn require_session(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let claims = {
        let Some(token) = cookie::session_token(request.headers()) else {
            return AuthError::MissingCookie.into_response();
        };

        match state.tokens.verify(token) {
            Ok(claims) => claims,
            Err(e) => {
                warn!(error = %e, path = %request.uri().path(), "Guard rejected session cookie");
                return AuthError::InvalidCookie(e).into_response();
            }
        }
    };

    request.extensions_mut().insert(claims);
    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    use axum::{
        body::{to_bytes, Body},
        http::{header::COOKIE, StatusCode},
        routing::get,
        Extension, Router,
    };
    use tower::ServiceExt;

    use crate::auth::{SessionClaims, TokenService};
    use crate::models::UserId;
    use crate::store::InMemoryStore;

    fn guarded_app(hits: Arc<AtomicUsize>) -> (Router, AppState) {
        let tokens = TokenService::new("test-secret", None).unwrap();
        let state = AppState::new(Arc::new(InMemoryStore::new()), tokens);

        let app = Router::new()
            .route(
                "/protected",
                get(move |Extension(claims): Extension<SessionClaims>| {
                    let hits = hits.clone();
                    async move {
                        hits.fetch_add(1, Ordering::SeqCst);
                        claims.user_id.to_string()
                    }
                }),
            )
            .route_layer(axum::middleware::from_fn_with_state(
                state.clone(),
                require_session,
            ));
        (app, state)
    }

    async fn call(app: Router, cookie: Option<String>) -> (StatusCode, String) {
        let mut builder = axum::http::Request::builder().uri("/protected");
        if let Some(cookie) = cookie {
            builder = builder.header(COOKIE, cookie);
        }
        let response = app.oneshot(builder.body(Body::empty()).unwrap()).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn missing_cookie_is_rejected() {
        let hits = Arc::new(AtomicUsize::new(0));
        let (app, _) = guarded_app(hits.clone());

        let (status, body) = call(app, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, r#"{"message":"No cookie, no access"}"#);
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn invalid_cookie_is_rejected() {
        let hits = Arc::new(AtomicUsize::new(0));
        let (app, _) = guarded_app(hits.clone());

        let (status, body) = call(app, Some("token=forged.token.value".to_string())).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, r#"{"message":"Wrong cookie, no access"}"#);
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn foreign_secret_is_rejected() {
        let hits = Arc::new(AtomicUsize::new(0));
        let (app, _) = guarded_app(hits.clone());
        let foreign = TokenService::new("someone-else", None)
            .unwrap()
            .issue(UserId(1))
            .unwrap();

        let (status, _) = call(app, Some(format!("token={foreign}"))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn valid_cookie_reaches_handler_once() {
        let hits = Arc::new(AtomicUsize::new(0));
        let (app, state) = guarded_app(hits.clone());
        let token = state.tokens.issue(UserId(9)).unwrap();

        let (status, body) = call(app, Some(format!("token={token}"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "9");
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }
}
