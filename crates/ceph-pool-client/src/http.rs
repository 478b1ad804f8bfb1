//! HTTP client for the Ceph dashboard REST API.
//!
//! This module provides `HttpPoolClient`, the production [`PoolApi`]
//! implementation. Every substantive call lazily logs in, attaches the bearer
//! token, and maps the response status onto a typed [`ClientError`].

use reqwest::header::ACCEPT;
use reqwest::{RequestBuilder, Response, StatusCode};

use async_trait::async_trait;
use ceph_pool_core::validate_name;

use crate::api::{CreatePoolRequest, PoolApi, PoolProperty, PoolRecord};
use crate::config::ClientConfig;
use crate::error::{ClientError, ConfigError, Result};
use crate::session::Session;

/// Versioned media type the dashboard API expects.
pub const API_MEDIA_TYPE: &str = "application/vnd.ceph.api.v1.0+json";

/// HTTP client for the dashboard pool endpoints.
///
/// Cheap to share behind an `Arc`: the token lives in an internal
/// [`Session`] guarded for concurrent use.
#[derive(Debug)]
pub struct HttpPoolClient {
    http: reqwest::Client,
    session: Session,
}

impl HttpPoolClient {
    /// Create a client from a validated configuration.
    ///
    /// TLS certificate validation follows `config.accept_invalid_certs`.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Config` if the configuration is incomplete or
    /// the HTTP client cannot be built.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        config.validate()?;

        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .connect_timeout(config.connect_timeout())
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()
            .map_err(ConfigError::HttpClient)?;

        Ok(Self::with_client(http, config))
    }

    /// Create a client with a custom reqwest client.
    #[must_use]
    pub fn with_client(http: reqwest::Client, config: &ClientConfig) -> Self {
        Self {
            http,
            session: Session::new(config.base_url(), &config.username, &config.password),
        }
    }

    /// Get the base URL of the API.
    #[must_use]
    pub fn base_url(&self) -> &str {
        self.session.base_url()
    }

    /// The login session backing this client.
    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    fn pools_url(&self) -> String {
        format!("{}/api/pool", self.base_url())
    }

    /// URL of one pool, with `name` encoded as a single path segment.
    fn pool_url(&self, name: &str) -> Result<String> {
        validate_name(name)?;
        Ok(format!(
            "{}/api/pool/{}",
            self.base_url(),
            urlencoding::encode(name)
        ))
    }

    /// Send a request with the bearer token attached.
    ///
    /// A 401 means the held token is stale: it is dropped, a new one is
    /// acquired, and the request is sent once more. A second 401 is an
    /// authentication failure.
    async fn send_authenticated<F>(&self, operation: &'static str, build: F) -> Result<Response>
    where
        F: Fn(&reqwest::Client) -> RequestBuilder + Send + Sync,
    {
        let token = self.session.token(&self.http).await?;
        let response = Self::dispatch(operation, build(&self.http), &token).await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        tracing::warn!(operation, "Ceph API rejected bearer token, logging in again");
        self.session.invalidate(&token).await;

        let token = self.session.token(&self.http).await?;
        let response = Self::dispatch(operation, build(&self.http), &token).await?;
        if response.status() == StatusCode::UNAUTHORIZED {
            self.session.invalidate(&token).await;
            let body = read_body(response).await;
            return Err(ClientError::Authentication { status: 401, body });
        }

        Ok(response)
    }

    async fn dispatch(
        operation: &'static str,
        request: RequestBuilder,
        token: &str,
    ) -> Result<Response> {
        request
            .bearer_auth(token)
            .header(ACCEPT, API_MEDIA_TYPE)
            .send()
            .await
            .map_err(|source| ClientError::Transport { operation, source })
    }
}

/// Read a response body for an error message, tolerating read failures.
pub(crate) async fn read_body(response: Response) -> String {
    response.text().await.unwrap_or_default()
}

#[async_trait]
impl PoolApi for HttpPoolClient {
    async fn authenticate(&self) -> Result<()> {
        self.session.authenticate(&self.http).await
    }

    async fn create_pool(&self, request: &CreatePoolRequest) -> Result<()> {
        let url = self.pools_url();
        let response = self
            .send_authenticated("create pool", |http| http.post(&url).json(request))
            .await?;

        let status = response.status();
        if matches!(status.as_u16(), 200 | 201) {
            tracing::debug!(pool = %request.pool, status = %status, "Created pool");
            return Ok(());
        }

        let body = read_body(response).await;
        tracing::error!(pool = %request.pool, status = %status, body = %body, "Failed to create pool");
        Err(ClientError::PoolCreate {
            name: request.pool.clone(),
            status: status.as_u16(),
            body,
        })
    }

    async fn get_pool(&self, name: &str) -> Result<PoolRecord> {
        let url = self.pool_url(name)?;
        let response = self
            .send_authenticated("get pool", |http| http.get(&url))
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            tracing::debug!(pool = %name, "Pool not found");
            return Err(ClientError::PoolNotFound {
                name: name.to_string(),
            });
        }

        if status != StatusCode::OK {
            let body = read_body(response).await;
            tracing::error!(pool = %name, status = %status, body = %body, "Failed to get pool");
            return Err(ClientError::PoolRead {
                name: name.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<PoolRecord>()
            .await
            .map_err(|e| ClientError::Decode {
                operation: "get pool",
                message: e.to_string(),
            })
    }

    async fn delete_pool(&self, name: &str) -> Result<()> {
        let url = self.pool_url(name)?;
        let response = self
            .send_authenticated("delete pool", |http| http.delete(&url))
            .await?;

        let status = response.status();
        if matches!(status.as_u16(), 200 | 202 | 204) {
            tracing::debug!(pool = %name, status = %status, "Deleted pool");
            return Ok(());
        }

        let body = read_body(response).await;
        tracing::error!(pool = %name, status = %status, body = %body, "Failed to delete pool");
        Err(ClientError::PoolDelete {
            name: name.to_string(),
            status: status.as_u16(),
            body,
        })
    }

    async fn set_pool_property(
        &self,
        name: &str,
        property: PoolProperty,
        value: u32,
    ) -> Result<()> {
        let url = self.pool_url(name)?;
        let mut body = serde_json::Map::new();
        body.insert(property.as_str().to_string(), value.into());

        let response = self
            .send_authenticated("set pool property", |http| http.put(&url).json(&body))
            .await?;

        check_update(response, name, property.as_str()).await?;
        tracing::debug!(pool = %name, property = %property, value, "Updated pool property");
        Ok(())
    }

    async fn set_application(&self, name: &str, application: &str) -> Result<()> {
        let url = self.pool_url(name)?;
        let body = serde_json::json!({ "application_metadata": [application] });

        let response = self
            .send_authenticated("set application", |http| http.put(&url).json(&body))
            .await?;

        check_update(response, name, "application").await?;
        tracing::debug!(pool = %name, application, "Updated pool application");
        Ok(())
    }
}

async fn check_update(response: Response, name: &str, property: &str) -> Result<()> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }

    let body = read_body(response).await;
    tracing::error!(
        pool = %name,
        property,
        status = %status,
        body = %body,
        "Failed to update pool"
    );
    Err(ClientError::PropertyUpdate {
        name: name.to_string(),
        property: property.to_string(),
        status: status.as_u16(),
        body,
    })
}
