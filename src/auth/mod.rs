// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Cookie-carried JWT sessions for the auth endpoints and the `/api` guard.
//!
//! ## Auth Flow
//!
//! 1. Client registers or logs in with `{username, password}`
//! 2. Server issues an HS256 token bound to the user id and sets it in the
//!    HTTP-only `token` cookie
//! 3. Later requests carry the cookie:
//!    - `/auth/user` resolves it to a [`Session`]
//!    - `/api/*` passes through [`require_session`] first
//! 4. Logout clears the cookie; tokens are never stored server-side
//!
//! ## Security
//!
//! - Tokens are verified against the configured secret only (HS256)
//! - Non-object payloads are rejected
//! - Expiry is enforced only when `JWT_TTL_SECONDS` is configured

pub mod cookie;
pub mod error;
pub mod middleware;
pub mod session;
pub mod token;

pub use error::AuthError;
pub use middleware::require_session;
pub use session::{resolve_session, CurrentSession, Session};
pub use token::{SessionClaims, TokenError, TokenService};
