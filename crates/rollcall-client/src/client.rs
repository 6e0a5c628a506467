// SPDX-FileCopyrightText: 2026 Rollcall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the gym REST API.
//!
//! Provides [`ApiClient`] which handles URL construction, bearer
//! authentication, transient error retry, and mapping HTTP statuses onto
//! [`RollcallError`] variants.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Method, StatusCode};
use rollcall_config::model::ApiConfig;
use rollcall_core::{ClassId, RollcallError, SessionDate};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::auth::TokenSource;
use crate::types::ApiErrorBody;

/// Raw status detail kept as the source of user-facing transport errors.
#[derive(Debug, thiserror::Error)]
#[error("HTTP {status}: {body}")]
pub struct StatusError {
    pub status: u16,
    pub body: String,
}

/// What a request addresses, used to phrase the error when it fails.
#[derive(Debug, Clone)]
pub struct Target {
    entity: &'static str,
    id: String,
    lock_scope: Option<(ClassId, SessionDate)>,
}

impl Target {
    pub fn new(entity: &'static str, id: impl Into<String>) -> Self {
        Self {
            entity,
            id: id.into(),
            lock_scope: None,
        }
    }

    /// Marks the request as writing to `class_id` on `session_date`, so a
    /// lock rejection becomes [`RollcallError::Locked`].
    pub fn on_session(mut self, class_id: &ClassId, session_date: SessionDate) -> Self {
        self.lock_scope = Some((class_id.clone(), session_date));
        self
    }
}

/// HTTP client for the attendance API.
///
/// Manages the bearer token, connection pooling, and retry logic for
/// transient errors (429, 500, 502, 503).
#[derive(Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
    tokens: Arc<dyn TokenSource>,
    max_retries: u32,
    retry_delay: Duration,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("max_retries", &self.max_retries)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Creates a client from the `[api]` config section.
    pub fn new(config: &ApiConfig, tokens: Arc<dyn TokenSource>) -> Result<Self, RollcallError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("rollcall/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| RollcallError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            tokens,
            max_retries: config.max_retries,
            retry_delay: Duration::from_millis(config.retry_delay_ms),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `GET path` and decode the JSON body.
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        target: &Target,
    ) -> Result<T, RollcallError> {
        let body = self.execute(Method::GET, path, None, target).await?;
        decode(&body, path)
    }

    /// Send a JSON body and decode the JSON response.
    pub async fn send<B, T>(
        &self,
        method: Method,
        path: &str,
        body: &B,
        target: &Target,
    ) -> Result<T, RollcallError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let payload = encode(body)?;
        let text = self.execute(method, path, Some(&payload), target).await?;
        decode(&text, path)
    }

    /// Send a JSON body and ignore whatever the server acknowledges with.
    pub async fn send_ack<B>(
        &self,
        method: Method,
        path: &str,
        body: &B,
        target: &Target,
    ) -> Result<(), RollcallError>
    where
        B: Serialize + ?Sized,
    {
        let payload = encode(body)?;
        self.execute(method, path, Some(&payload), target).await?;
        Ok(())
    }

    /// Single unauthenticated request to the base URL, no retries.
    ///
    /// Any HTTP answer proves the service is reachable.
    pub async fn probe(&self) -> Result<StatusCode, RollcallError> {
        let response = self
            .client
            .get(&self.base_url)
            .send()
            .await
            .map_err(|e| RollcallError::transport(unreachable_message(&e), e))?;
        Ok(response.status())
    }

    async fn execute(
        &self,
        method: Method,
        path: &str,
        body: Option<&serde_json::Value>,
        target: &Target,
    ) -> Result<String, RollcallError> {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        let token = self.tokens.bearer_token().await?;

        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                warn!(attempt, %method, path, "retrying request after transient error");
                tokio::time::sleep(self.retry_delay).await;
            }

            let mut request = self.client.request(method.clone(), &url);
            if let Some(token) = &token {
                request = request.bearer_auth(token);
            }
            if let Some(body) = body {
                request = request.json(body);
            }

            let response = request
                .send()
                .await
                .map_err(|e| RollcallError::transport(unreachable_message(&e), e))?;

            let status = response.status();
            debug!(status = %status, attempt, %method, path, "response received");

            if status.is_success() {
                return response.text().await.map_err(|e| {
                    RollcallError::transport("the attendance service sent an unreadable response", e)
                });
            }

            let text = response.text().await.unwrap_or_default();

            if is_transient_error(status) && attempt < self.max_retries {
                warn!(status = %status, body = %text, "transient error, will retry");
                last_error = Some(map_status(status, text, target));
                continue;
            }

            return Err(map_status(status, text, target));
        }

        Err(last_error.unwrap_or_else(|| {
            RollcallError::Internal(format!("{method} {path} failed after retries"))
        }))
    }
}

/// Returns true for HTTP status codes that indicate transient errors worth retrying.
fn is_transient_error(status: StatusCode) -> bool {
    matches!(status.as_u16(), 429 | 500 | 502 | 503)
}

/// Translate a non-2xx response into the domain error the caller expects.
fn map_status(status: StatusCode, body: String, target: &Target) -> RollcallError {
    let parsed: ApiErrorBody = serde_json::from_str(&body).unwrap_or_default();
    let message = parsed.text().map(str::to_string);
    let mentions_lock = message
        .as_deref()
        .is_some_and(|m| m.to_ascii_lowercase().contains("lock"));

    match status.as_u16() {
        404 => RollcallError::not_found(target.entity, target.id.clone()),
        423 | 409 if status.as_u16() == 423 || mentions_lock => match &target.lock_scope {
            Some((class_id, session_date)) => RollcallError::Locked {
                class_id: class_id.clone(),
                session_date: *session_date,
            },
            None => RollcallError::Validation(
                message.unwrap_or_else(|| "attendance has been finalized".to_string()),
            ),
        },
        400 | 409 | 422 => RollcallError::Validation(
            message.unwrap_or_else(|| format!("request rejected (HTTP {})", status.as_u16())),
        ),
        401 | 403 => RollcallError::Transport {
            message: "not authorized by the attendance service, check api.token".to_string(),
            source: Some(Box::new(StatusError {
                status: status.as_u16(),
                body,
            })),
        },
        code => RollcallError::Transport {
            message: format!("the attendance service returned an error (HTTP {code}), please try again"),
            source: Some(Box::new(StatusError { status: code, body })),
        },
    }
}

fn unreachable_message(err: &reqwest::Error) -> &'static str {
    if err.is_timeout() {
        "the attendance service did not respond in time, please try again"
    } else {
        "could not reach the attendance service, check your connection"
    }
}

fn encode<B: Serialize + ?Sized>(body: &B) -> Result<serde_json::Value, RollcallError> {
    serde_json::to_value(body)
        .map_err(|e| RollcallError::Internal(format!("failed to encode request body: {e}")))
}

fn decode<T: DeserializeOwned>(body: &str, path: &str) -> Result<T, RollcallError> {
    serde_json::from_str(body).map_err(|e| {
        RollcallError::transport(
            format!("unexpected response from the attendance service ({path})"),
            e,
        )
    })
}
