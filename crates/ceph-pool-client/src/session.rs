//! Login session and bearer-token lifecycle.
//!
//! The token moves through an explicit state machine:
//!
//! ```text
//!   ┌──────────────────┐   login ok    ┌──────────────────┐
//!   │ Unauthenticated  │──────────────▶│  Authenticated   │
//!   └──────────────────┘               └────────┬─────────┘
//!            ▲                                  │
//!            └──────── token rejected (401) ────┘
//! ```
//!
//! All transitions happen under one async mutex, so "check token, log in if
//! absent, read token" is a single atomic step for concurrent callers.

use std::fmt;

use chrono::{DateTime, Utc};
use reqwest::header::ACCEPT;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::error::{ClientError, Result};
use crate::http::{read_body, API_MEDIA_TYPE};

/// Request payload for `/api/auth`.
#[derive(Clone, Serialize)]
pub struct LoginRequest {
    /// API username.
    pub username: String,
    /// API password.
    pub password: String,
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Successful `/api/auth` response.
#[derive(Debug, Deserialize)]
struct LoginResponse {
    token: String,
}

/// Current state of the bearer token.
#[derive(Clone, Default)]
pub enum TokenState {
    /// No token held; the next call logs in.
    #[default]
    Unauthenticated,
    /// A token the remote has accepted so far.
    Authenticated {
        /// Bearer token.
        token: String,
        /// When the token was issued to us.
        acquired_at: DateTime<Utc>,
    },
}

impl TokenState {
    /// Returns true if a token is held.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated { .. })
    }
}

impl fmt::Debug for TokenState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unauthenticated => f.write_str("Unauthenticated"),
            Self::Authenticated { acquired_at, .. } => f
                .debug_struct("Authenticated")
                .field("token", &"<redacted>")
                .field("acquired_at", acquired_at)
                .finish(),
        }
    }
}

/// Credentials and token state for one API endpoint.
pub struct Session {
    base_url: String,
    credentials: LoginRequest,
    state: Mutex<TokenState>,
}

impl Session {
    /// Create an unauthenticated session.
    #[must_use]
    pub fn new(
        base_url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            credentials: LoginRequest {
                username: username.into(),
                password: password.into(),
            },
            state: Mutex::new(TokenState::Unauthenticated),
        }
    }

    /// Base URL of the API.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Get the login endpoint URL.
    #[must_use]
    pub fn login_url(&self) -> String {
        format!("{}/api/auth", self.base_url)
    }

    /// Snapshot of the token state.
    pub async fn state(&self) -> TokenState {
        self.state.lock().await.clone()
    }

    /// Returns the held token, logging in first if there is none.
    ///
    /// The lock is held across the login, so concurrent callers wait for one
    /// login instead of racing to issue their own.
    ///
    /// # Errors
    ///
    /// Returns the login error; the session stays unauthenticated.
    pub async fn token(&self, http: &reqwest::Client) -> Result<String> {
        let mut state = self.state.lock().await;
        if let TokenState::Authenticated { token, .. } = &*state {
            return Ok(token.clone());
        }

        let token = self.login(http).await?;
        *state = TokenState::Authenticated {
            token: token.clone(),
            acquired_at: Utc::now(),
        };
        Ok(token)
    }

    /// Log in unconditionally and replace any held token.
    ///
    /// # Errors
    ///
    /// Returns the login error. The previous token is dropped either way.
    pub async fn authenticate(&self, http: &reqwest::Client) -> Result<()> {
        let mut state = self.state.lock().await;
        *state = TokenState::Unauthenticated;

        let token = self.login(http).await?;
        *state = TokenState::Authenticated {
            token,
            acquired_at: Utc::now(),
        };
        Ok(())
    }

    /// Drop `rejected` if it is still the held token.
    ///
    /// A token another caller has already replaced is left alone.
    pub async fn invalidate(&self, rejected: &str) {
        let mut state = self.state.lock().await;
        if matches!(&*state, TokenState::Authenticated { token, .. } if token == rejected) {
            *state = TokenState::Unauthenticated;
        }
    }

    async fn login(&self, http: &reqwest::Client) -> Result<String> {
        let url = self.login_url();
        tracing::debug!(url = %url, username = %self.credentials.username, "Logging in to Ceph API");

        let response = http
            .post(&url)
            .header(ACCEPT, API_MEDIA_TYPE)
            .json(&self.credentials)
            .send()
            .await
            .map_err(|source| ClientError::Transport {
                operation: "authenticate",
                source,
            })?;

        let status = response.status();
        if !matches!(status.as_u16(), 200 | 201) {
            let body = read_body(response).await;
            tracing::error!(status = %status, "Ceph API login rejected");
            return Err(ClientError::Authentication {
                status: status.as_u16(),
                body,
            });
        }

        let login: LoginResponse = response.json().await.map_err(|e| ClientError::Decode {
            operation: "authenticate",
            message: e.to_string(),
        })?;

        tracing::debug!("Acquired Ceph API token");
        Ok(login.token)
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("base_url", &self.base_url)
            .field("credentials", &self.credentials)
            .finish_non_exhaustive()
    }
}
