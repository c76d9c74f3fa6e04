// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::auth::{cookie::CookieSettings, TokenService};
use crate::config::{Config, ConfigError};
use crate::store::{CredentialStore, InMemoryStore};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn CredentialStore>,
    pub tokens: Arc<TokenService>,
    pub cookie: CookieSettings,
}

impl AppState {
    pub fn new(store: Arc<dyn CredentialStore>, tokens: TokenService) -> Self {
        Self {
            store,
            tokens: Arc::new(tokens),
            cookie: CookieSettings::default(),
        }
    }

    /// Build state from loaded configuration with an empty in-memory store.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let tokens = TokenService::new(&config.jwt_secret, config.token_ttl)?;
        Ok(Self::new(Arc::new(InMemoryStore::new()), tokens).with_cookie_settings(config.cookie))
    }

    pub fn with_cookie_settings(mut self, cookie: CookieSettings) -> Self {
        self.cookie = cookie;
        self
    }
}
