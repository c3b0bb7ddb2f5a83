//! The RMON API client.
//!
//! One [`Client`] is created per provider configuration and shared by every
//! concurrent resource operation. It owns the base URL, the credential
//! material, the retry policy, and the session token; everything else is
//! read-only after construction.
//!
//! # Authentication
//!
//! The login/password pair is presented once, lazily, on the first request:
//! the client POSTs to the login endpoint, caches the returned bearer token,
//! and reuses it. Refreshing is single-flight: concurrent callers finding
//! the token missing (or stale after a 401) serialize on a mutex, and only
//! the first one re-authenticates.
//!
//! # Retries
//!
//! Transport failures on GET, DELETE and PUT are retried with exponential
//! backoff up to the configured bound. POST is the one non-idempotent verb:
//! reissuing a create after an ambiguous failure can mint a duplicate
//! remote entity, so the client surfaces
//! [`ProviderError::Ambiguous`] instead and lets the caller decide. A POST
//! that never reached the wire (connection refused, DNS failure) is
//! unambiguous and retried like the safe verbs.

use reqwest::{Method, StatusCode};
use serde_json::Value;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, warn};

use crate::config::{ClientConfig, RetryConfig};
use crate::error::ProviderError;
use crate::types::SessionResponse;

/// Path of the session bootstrap endpoint.
pub const LOGIN_PATH: &str = "/api/v1.0/login";

/// An authenticated HTTP client for the RMON REST API.
///
/// Safe to share across tasks: all mutable state is the cached session
/// token behind a lock.
pub struct Client {
    http: reqwest::Client,
    base: String,
    login: String,
    password: String,
    retry: RetryConfig,
    token: RwLock<Option<String>>,
    refresh: Mutex<()>,
}

impl Client {
    /// Build a client from a validated configuration.
    ///
    /// Fails with a configuration error when the base URL is malformed or
    /// credentials are missing.
    pub fn new(config: ClientConfig) -> Result<Self, ProviderError> {
        config.validate()?;

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| ProviderError::Configuration(format!("failed to build client: {}", e)))?;

        Ok(Self {
            http,
            base: config.base_url.trim_end_matches('/').to_string(),
            login: config.login,
            password: config.password,
            retry: config.retry,
            token: RwLock::new(None),
            refresh: Mutex::new(()),
        })
    }

    /// The normalized base URL this client talks to.
    pub fn base_url(&self) -> &str {
        &self.base
    }

    /// Issue a GET and return the raw response body.
    pub async fn get(&self, path: &str) -> Result<Vec<u8>, ProviderError> {
        self.request(Method::GET, path, None).await
    }

    /// Issue a POST with a JSON body and return the raw response body.
    pub async fn post(&self, path: &str, body: &Value) -> Result<Vec<u8>, ProviderError> {
        self.request(Method::POST, path, Some(body)).await
    }

    /// Issue a PUT with a JSON body and return the raw response body.
    pub async fn put(&self, path: &str, body: &Value) -> Result<Vec<u8>, ProviderError> {
        self.request(Method::PUT, path, Some(body)).await
    }

    /// Issue a DELETE and return the raw response body.
    pub async fn delete(&self, path: &str) -> Result<Vec<u8>, ProviderError> {
        self.request(Method::DELETE, path, None).await
    }

    /// Perform an authenticated request against a path relative to the base
    /// URL and return the raw response bytes.
    ///
    /// The caller decodes the body: different endpoints return different
    /// shapes (object, array, or nothing at all for DELETE).
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Vec<u8>, ProviderError> {
        let url = format!("{}{}", self.base, path);
        let retry_budget = self.retry.max_attempts;

        let mut attempt: u32 = 0;
        let mut reauthenticated = false;

        loop {
            let token = self.session_token().await?;
            debug!(%method, %url, attempt, "rmon api request");

            let mut request = self.http.request(method.clone(), &url).bearer_auth(&token);
            if let Some(body) = body {
                request = request.json(body);
            }

            let response = match request.send().await {
                Ok(response) => response,
                Err(e) => {
                    // A POST that may have reached the service must not be
                    // reissued; a refused connection never left this host.
                    if method == Method::POST && !e.is_connect() {
                        return Err(ProviderError::Ambiguous { source: e });
                    }
                    if attempt >= retry_budget {
                        return Err(ProviderError::Transport {
                            attempts: attempt + 1,
                            source: e,
                        });
                    }
                    let delay = self.retry.delay_for(attempt);
                    warn!(
                        %method, %url,
                        attempt = attempt + 1,
                        budget = retry_budget,
                        ?delay,
                        error = %e,
                        "transport failure, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                    continue;
                }
            };

            let status = response.status();
            if status == StatusCode::UNAUTHORIZED && !reauthenticated {
                debug!(%url, "session token rejected, re-authenticating");
                self.invalidate_token(&token).await;
                reauthenticated = true;
                continue;
            }

            let bytes = response.bytes().await.map_err(|e| ProviderError::Transport {
                attempts: attempt + 1,
                source: e,
            })?;

            if !status.is_success() {
                return Err(ProviderError::Api {
                    status,
                    body: String::from_utf8_lossy(&bytes).into_owned(),
                });
            }

            return Ok(bytes.to_vec());
        }
    }

    /// Return the cached session token, logging in first if there is none.
    async fn session_token(&self) -> Result<String, ProviderError> {
        if let Some(token) = self.token.read().await.clone() {
            return Ok(token);
        }

        let _guard = self.refresh.lock().await;
        // Another caller may have logged in while we waited for the lock.
        if let Some(token) = self.token.read().await.clone() {
            return Ok(token);
        }

        let token = self.authenticate().await?;
        *self.token.write().await = Some(token.clone());
        Ok(token)
    }

    /// Drop the cached token if it still is the one that was rejected.
    async fn invalidate_token(&self, stale: &str) {
        let mut token = self.token.write().await;
        if token.as_deref() == Some(stale) {
            *token = None;
        }
    }

    /// Present the login/password pair and obtain a session token.
    async fn authenticate(&self) -> Result<String, ProviderError> {
        let url = format!("{}{}", self.base, LOGIN_PATH);
        debug!(%url, login = %self.login, "opening rmon session");

        let response = self
            .http
            .post(&url)
            .json(&serde_json::json!({
                "login": self.login,
                "password": self.password,
            }))
            .send()
            .await
            .map_err(|e| ProviderError::Transport {
                attempts: 1,
                source: e,
            })?;

        let status = response.status();
        let bytes = response.bytes().await.map_err(|e| ProviderError::Transport {
            attempts: 1,
            source: e,
        })?;

        if !status.is_success() {
            return Err(ProviderError::Api {
                status,
                body: String::from_utf8_lossy(&bytes).into_owned(),
            });
        }

        let session: SessionResponse = serde_json::from_slice(&bytes).map_err(|_| {
            ProviderError::Decode(format!(
                "login response lacks access_token: {}",
                String::from_utf8_lossy(&bytes)
            ))
        })?;
        Ok(session.access_token)
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("base", &self.base)
            .field("login", &self.login)
            .finish_non_exhaustive()
    }
}
