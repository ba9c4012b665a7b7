//! Provider-scoped calls and the reauthorization protocol.
//!
//! Playback and catalogue calls go straight to the streaming provider's API,
//! authorized by a short-lived provider token that is independent of the
//! session's own tokens. When the provider rejects that token with a 401,
//! the call is recovered exactly once: the backend re-issues a token for the
//! connection (authenticated with the session bearer) and the original
//! request is replayed with it. A second failure of any kind surfaces to the
//! caller unchanged.

use anyhow::{Context, Result};
use chrono::Utc;
use reqwest::{Method, Response, StatusCode};
use serde_json::Value;
use tracing::debug;

use super::client::ApiClient;
use super::error::ApiError;

/// Production base URL of the streaming provider's Web API.
pub const DEFAULT_PROVIDER_BASE: &str = "https://api.spotify.com/v1";

/// Service identifier of the streaming provider connection.
pub const PROVIDER_SERVICE: &str = "spotify";

/// A provider request retained in full so it can be replayed verbatim with a
/// different bearer token.
#[derive(Debug, Clone)]
pub struct ProviderRequest {
    method: Method,
    url: String,
    body: Option<Value>,
}

impl ProviderRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            body: None,
        }
    }

    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Build one attempt of this request carrying `access_token`. The
    /// method, URL and body are identical across attempts; only the
    /// authorization differs.
    fn build(&self, client: &reqwest::Client, access_token: &str) -> reqwest::RequestBuilder {
        let mut request = client
            .request(self.method.clone(), &self.url)
            .bearer_auth(access_token);
        if let Some(ref body) = self.body {
            request = request.json(body);
        }
        request
    }
}

/// Outcome of a provider call: the response payload plus the token that
/// ended up authorizing it, for the caller to cache for subsequent calls.
#[derive(Debug, Clone)]
pub struct ProviderReply {
    pub response: Value,
    pub access_token: String,
}

/// Player PUTs answer 204 with no body.
async fn read_payload(response: Response) -> Result<Value> {
    let text = response
        .text()
        .await
        .context("Failed to read provider response")?;
    if text.is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(&text).context("Failed to parse provider response")
}

impl ApiClient {
    /// Issue a provider call, recovering from an expired token at most once.
    ///
    /// A 401 from the provider triggers a connection-token refresh through
    /// the backend followed by a single replay of the identical request.
    /// Any other first-attempt failure, and any failure of the refresh or
    /// the replay, propagates to the caller unchanged.
    pub async fn provider_call(
        &self,
        request: ProviderRequest,
        access_token: &str,
    ) -> Result<ProviderReply> {
        let response = request
            .build(&self.client, access_token)
            .send()
            .await
            .context("Failed to send provider request")?;

        let status = response.status();
        if status.is_success() {
            return Ok(ProviderReply {
                response: read_payload(response).await?,
                access_token: access_token.to_string(),
            });
        }

        if status != StatusCode::UNAUTHORIZED {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::from_status(status, &body).into());
        }

        debug!(url = %request.url, "Provider token expired, refreshing connection");
        let fresh = self.refresh_connection_token(PROVIDER_SERVICE).await?;

        let replay = request
            .build(&self.client, &fresh)
            .send()
            .await
            .context("Failed to replay provider request")?;

        let status = replay.status();
        if !status.is_success() {
            let body = replay.text().await.unwrap_or_default();
            return Err(ApiError::from_status(status, &body).into());
        }

        Ok(ProviderReply {
            response: read_payload(replay).await?,
            access_token: fresh,
        })
    }

    /// Fetch a catalogue item (track, album, playlist, ...) by id.
    pub async fn provider_item(
        &self,
        kind: &str,
        id: &str,
        access_token: &str,
    ) -> Result<ProviderReply> {
        let url = format!(
            "{}/{}/{}?ts={}",
            self.provider_base,
            kind,
            id,
            Utc::now().timestamp_millis()
        );
        self.provider_call(ProviderRequest::new(Method::GET, url), access_token)
            .await
    }

    /// Move playback to `device_id`.
    pub async fn transfer_playback(
        &self,
        device_id: &str,
        play: bool,
        access_token: &str,
    ) -> Result<ProviderReply> {
        let url = format!(
            "{}/me/player?ts={}",
            self.provider_base,
            Utc::now().timestamp_millis()
        );
        let body = serde_json::json!({ "device_ids": [device_id], "play": play });
        self.provider_call(ProviderRequest::new(Method::PUT, url).json(body), access_token)
            .await
    }

    /// Start playback of `uris` on `device_id`.
    pub async fn start_playback(
        &self,
        device_id: &str,
        uris: &[String],
        access_token: &str,
    ) -> Result<ProviderReply> {
        let url = format!("{}/me/player/play?device_id={}", self.provider_base, device_id);
        let body = serde_json::json!({ "uris": uris });
        self.provider_call(ProviderRequest::new(Method::PUT, url).json(body), access_token)
            .await
    }
}
