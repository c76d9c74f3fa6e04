// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Cookie Auth Server - Cookie/JWT session authentication
//!
//! This crate provides user registration, login, session lookup and logout
//! over HTTP, plus a guard middleware for protected route groups. Sessions
//! are stateless HS256 tokens carried in an HTTP-only `token` cookie.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers and router (Axum)
//! - `auth` - Token service, session cookie, session resolution, guard
//! - `store` - Credential store trait and in-memory implementation
//! - `password` - Argon2 password hashing

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod password;
pub mod state;
pub mod store;
