//! HTTP client for the Screenroom backend.
//!
//! This module provides the `ApiClient` struct for making authenticated
//! API requests: session management, the social graph, media sources,
//! theaters, notifications and OAuth connections.
//!
//! The API uses bearer token authentication; the token is read from the
//! shared `SessionStore` at call-build time, so a login or refresh is
//! visible to every subsequent request immediately.

use std::sync::Arc;

use anyhow::{Context, Result};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::auth::SessionStore;
use crate::config::ApiConfig;
use crate::models::{
    ApiResult, Connection, Friend, FriendRequest, MediaSource, Message, NewAccount, Notification,
    ParsedSource, SessionTokens, Subtitle, Theater, TheaterUpdate, UserProfile,
};

use super::error::ApiError;
use super::provider::DEFAULT_PROVIDER_BASE;
use super::request::{Body, Endpoint, Part};

// ============================================================================
// Constants
// ============================================================================

/// HTTP request timeout in seconds.
/// 30s allows for slow API responses while failing fast enough for good UX.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Header carrying the captcha response on login and registration.
const CAPTCHA_HEADER: &str = "h-captcha-response";

/// Header carrying a provider token when saving a provider-backed source.
const SERVICE_AUTHORIZATION_HEADER: &str = "Service-Authorization";

/// API client for the Screenroom backend.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    pub(crate) client: Client,
    pub(crate) base_url: String,
    pub(crate) provider_base: String,
    pub(crate) session: Arc<SessionStore>,
}

impl ApiClient {
    /// Create a new API client bound to `session`.
    pub fn new(config: &ApiConfig, session: Arc<SessionStore>) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url(),
            provider_base: DEFAULT_PROVIDER_BASE.to_string(),
            session,
        })
    }

    /// Point provider calls at a different base URL (used by tests).
    pub fn with_provider_base(mut self, base: impl Into<String>) -> Self {
        self.provider_base = base.into();
        self
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    // ===== Request primitive =====

    /// Issue one backend request described by `endpoint`.
    ///
    /// The session bearer is attached only when a token is present, so
    /// endpoints reachable anonymously never see a stale credential. A
    /// descriptor carrying its own `Authorization` header wins over the
    /// session bearer. Rejects on any non-2xx status with the status code
    /// and body preserved.
    pub(crate) async fn send(&self, endpoint: Endpoint) -> Result<Response> {
        let url = format!("{}{}", self.base_url, endpoint.path);
        let mut request = self.client.request(endpoint.method.clone(), &url);

        if !endpoint.query.is_empty() {
            request = request.query(&endpoint.query);
        }

        if !endpoint.has_authorization() {
            if let Some(token) = self.session.access_token() {
                request = request.bearer_auth(token);
            }
        }

        for (name, value) in &endpoint.headers {
            request = request.header(*name, value.as_str());
        }

        request = match &endpoint.body {
            Body::Empty => request,
            Body::Form(fields) => request.form(fields),
            Body::Json(value) => request.json(value),
            Body::Multipart(parts) => request.multipart(Endpoint::build_multipart(parts)),
        };

        debug!(method = %endpoint.method, path = %endpoint.path, "Sending API request");

        let response = request
            .send()
            .await
            .with_context(|| format!("Failed to send {} request to {}", endpoint.method, url))?;

        Self::check_response(response).await
    }

    /// Check if response is successful, returning an error with body if not.
    pub(crate) async fn check_response(response: Response) -> Result<Response> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body).into())
        }
    }

    /// Unwrap the standard `{ "result": ... }` envelope.
    async fn parse_result<T: DeserializeOwned>(response: Response) -> Result<T> {
        let envelope: ApiResult<T> = response
            .json()
            .await
            .context("Failed to parse API response")?;
        Ok(envelope.result)
    }

    // ===== Session =====

    /// Authenticate and commit the returned token pair.
    ///
    /// On failure the session store is left untouched.
    pub async fn login(
        &self,
        user: &str,
        pass: &str,
        captcha: Option<&str>,
    ) -> Result<SessionTokens> {
        let mut endpoint = Endpoint::post("/auth/@create")
            .form(vec![("user", user.to_string()), ("pass", pass.to_string())]);
        if let Some(captcha) = captcha {
            endpoint = endpoint.header(CAPTCHA_HEADER, captcha);
        }

        let response = self.send(endpoint).await?;
        let tokens: SessionTokens = Self::parse_result(response).await?;
        self.session
            .set_tokens(&tokens.token, &tokens.refreshed_token)?;
        Ok(tokens)
    }

    /// Create an account; a successful registration logs the user in.
    pub async fn register(&self, account: &NewAccount, captcha: Option<&str>) -> Result<SessionTokens> {
        let mut endpoint = Endpoint::post("/user/@create").form(vec![
            ("email", account.email.clone()),
            ("fullname", account.fullname.clone()),
            ("username", account.username.clone()),
            ("password", account.password.clone()),
            ("password_confirmation", account.password_confirmation.clone()),
        ]);
        if let Some(captcha) = captcha {
            endpoint = endpoint.header(CAPTCHA_HEADER, captcha);
        }

        let response = self.send(endpoint).await?;
        let tokens: SessionTokens = Self::parse_result(response).await?;
        self.session
            .set_tokens(&tokens.token, &tokens.refreshed_token)?;
        Ok(tokens)
    }

    /// Exchange the stored refresh token for a fresh pair.
    ///
    /// No retry is attempted here: an invalid refresh token surfaces as
    /// `Unauthorized` and the caller is expected to force a logout.
    pub async fn refresh_session_token(&self) -> Result<SessionTokens> {
        let refresh = self
            .session
            .refresh_token()
            .ok_or_else(|| anyhow::anyhow!("No refresh token in session"))?;

        let endpoint = Endpoint::put("/@auth/@create")
            .header("authorization", format!("Bearer {refresh}"))
            .json(serde_json::json!({}));

        let response = self.send(endpoint).await?;
        Self::parse_result(response).await
    }

    /// Drop the local session. No network round-trip is involved.
    pub fn logout(&self) -> Result<()> {
        self.session.clear()
    }

    /// Complete a third-party login handshake.
    ///
    /// `origin` mirrors the route the handshake started from: a callback
    /// reached from the dashboard links a connection to the current account
    /// and must not disturb the session; any other origin is a login and
    /// commits the returned pair.
    pub async fn oauth_callback(
        &self,
        service: &str,
        code: &str,
        origin: &str,
    ) -> Result<Option<SessionTokens>> {
        let endpoint = Endpoint::post(format!("/oauth/{service}/@callback"))
            .form(vec![("code", code.to_string())]);

        let response = self.send(endpoint).await?;

        if origin == "dashboard" {
            return Ok(None);
        }

        let tokens: SessionTokens = Self::parse_result(response).await?;
        self.session
            .set_tokens(&tokens.token, &tokens.refreshed_token)?;
        Ok(Some(tokens))
    }

    // ===== Profile =====

    /// Fetch the current user's profile.
    pub async fn fetch_user(&self) -> Result<UserProfile> {
        let response = self.send(Endpoint::get("/user/@me")).await?;
        Self::parse_result(response).await
    }

    /// Update the profile; `avatar` is an optional `(filename, bytes)` upload.
    pub async fn update_profile(
        &self,
        fullname: &str,
        avatar: Option<(String, Vec<u8>)>,
    ) -> Result<UserProfile> {
        let mut parts = vec![Part::text("fullname", fullname)];
        if let Some((filename, bytes)) = avatar {
            parts.push(Part::file("avatar", filename, bytes));
        }

        let response = self.send(Endpoint::put("/user/@me").multipart(parts)).await?;
        Self::parse_result(response).await
    }

    pub async fn update_password(
        &self,
        current_password: &str,
        new_password: &str,
        verify_new_password: &str,
    ) -> Result<()> {
        let parts = vec![
            Part::text("current_password", current_password),
            Part::text("new_password", new_password),
            Part::text("verify_new_password", verify_new_password),
        ];
        self.send(Endpoint::put("/user/@password").multipart(parts))
            .await?;
        Ok(())
    }

    pub async fn search_users(&self, keyword: &str) -> Result<Vec<UserProfile>> {
        let response = self
            .send(Endpoint::get("/user/@search").query("keyword", keyword))
            .await?;
        Self::parse_result(response).await
    }

    // ===== Friends and messages =====

    pub async fn friends(&self) -> Result<Vec<Friend>> {
        let response = self.send(Endpoint::get("/user/@friends")).await?;
        Self::parse_result(response).await
    }

    pub async fn pending_friend_requests(&self) -> Result<Vec<FriendRequest>> {
        let response = self.send(Endpoint::get("/user/@friends/pending")).await?;
        Self::parse_result(response).await
    }

    pub async fn friend(&self, friend_id: i64) -> Result<Friend> {
        let response = self
            .send(Endpoint::get(format!("/user/@friend/{friend_id}")))
            .await?;
        Self::parse_result(response).await
    }

    pub async fn send_friend_request(&self, friend_id: i64) -> Result<()> {
        self.send(Endpoint::get(format!("/user/@friend/{friend_id}/request")))
            .await?;
        Ok(())
    }

    pub async fn accept_friend_request(&self, request_id: i64) -> Result<()> {
        self.send(
            Endpoint::post("/user/@friend/accept")
                .form(vec![("request_id", request_id.to_string())]),
        )
        .await?;
        Ok(())
    }

    pub async fn messages(&self, receiver_id: i64) -> Result<Vec<Message>> {
        let response = self
            .send(Endpoint::get(format!("/user/@messages/{receiver_id}")))
            .await?;
        Self::parse_result(response).await
    }

    // ===== Media sources =====

    pub async fn media_sources(&self) -> Result<Vec<MediaSource>> {
        let response = self.send(Endpoint::get("/user/@media")).await?;
        Self::parse_result(response).await
    }

    /// Ask the backend to extract metadata from a raw source URI.
    pub async fn parse_media_source(&self, uri: &str) -> Result<ParsedSource> {
        let response = self
            .send(
                Endpoint::post("/user/@media/parse").form(vec![("source", uri.to_string())]),
            )
            .await?;
        Self::parse_result(response).await
    }

    /// Save a new media source. Provider-backed sources carry the provider
    /// token in the `Service-Authorization` header so the backend can
    /// resolve the entry on the user's behalf.
    ///
    /// A duplicate source is rejected by the backend with 409, surfaced as
    /// `ApiError::Conflict`.
    pub async fn save_media_source(
        &self,
        title: &str,
        uri: &str,
        provider_token: Option<&str>,
    ) -> Result<()> {
        let mut endpoint = Endpoint::post("/user/@media").form(vec![
            ("title", title.to_string()),
            ("source", uri.to_string()),
        ]);
        if let Some(token) = provider_token {
            endpoint = endpoint.header(SERVICE_AUTHORIZATION_HEADER, token);
        }
        self.send(endpoint).await?;
        Ok(())
    }

    pub async fn select_media_source(&self, source_id: i64) -> Result<()> {
        self.send(
            Endpoint::post("/user/@media/select")
                .form(vec![("source_id", source_id.to_string())]),
        )
        .await?;
        Ok(())
    }

    pub async fn remove_media_source(&self, source_id: i64) -> Result<()> {
        self.send(Endpoint::delete("/user/@media").query("source_id", source_id.to_string()))
            .await?;
        Ok(())
    }

    // ===== Theaters =====

    /// Fetch the caller's theater, or `user`'s theater when given.
    ///
    /// Public theaters are reachable anonymously; `send` omits the bearer
    /// when nobody is logged in.
    pub async fn theater(&self, user: Option<&str>) -> Result<Theater> {
        let path = match user {
            Some(user) => format!("/user/@theater/{user}"),
            None => "/user/@theater".to_string(),
        };
        let response = self.send(Endpoint::get(path)).await?;
        Self::parse_result(response).await
    }

    /// Apply the set fields of `update` to the caller's theater.
    pub async fn update_theater(&self, update: &TheaterUpdate) -> Result<()> {
        let mut parts = Vec::new();
        if let Some(ref description) = update.description {
            parts.push(Part::text("description", description.clone()));
        }
        if let Some(ref privacy) = update.privacy {
            parts.push(Part::text("privacy", privacy.clone()));
        }
        if let Some(ref access) = update.video_player_access {
            parts.push(Part::text("video_player_access", access.clone()));
        }

        self.send(Endpoint::put("/user/@theater").multipart(parts))
            .await?;
        Ok(())
    }

    pub async fn followed_theaters(&self) -> Result<Vec<Theater>> {
        let response = self.send(Endpoint::get("/user/@theaters")).await?;
        Self::parse_result(response).await
    }

    pub async fn follow_theater(&self, theater_id: i64) -> Result<()> {
        self.send(Endpoint::get(format!("/user/@theaters/{theater_id}/follow")))
            .await?;
        Ok(())
    }

    pub async fn unfollow_theater(&self, theater_id: i64) -> Result<()> {
        self.send(Endpoint::get(format!("/user/@theaters/{theater_id}/unfollow")))
            .await?;
        Ok(())
    }

    /// Fetch subtitles for a media source. Anonymous viewers read from the
    /// public theater route, members from their own.
    pub async fn subtitles(&self, media_source_id: i64) -> Result<Vec<Subtitle>> {
        let path = if self.session.is_logged_in() {
            format!("/user/@theaters/{media_source_id}/subtitles")
        } else {
            format!("/user/@theater/{media_source_id}/subtitles")
        };
        let response = self.send(Endpoint::get(path)).await?;
        Self::parse_result(response).await
    }

    pub async fn upload_subtitle(
        &self,
        media_source_id: i64,
        lang: &str,
        filename: &str,
        bytes: Vec<u8>,
    ) -> Result<()> {
        let parts = vec![
            Part::text("lang", lang),
            Part::file("subtitle", filename, bytes),
        ];
        self.send(
            Endpoint::post(format!("/user/@theaters/{media_source_id}/subtitles"))
                .multipart(parts),
        )
        .await?;
        Ok(())
    }

    // ===== Notifications =====

    pub async fn notifications(&self) -> Result<Vec<Notification>> {
        let response = self.send(Endpoint::get("/user/@notifications")).await?;
        Self::parse_result(response).await
    }

    pub async fn read_all_notifications(&self) -> Result<()> {
        self.send(Endpoint::put("/user/@notifications").json(serde_json::json!({})))
            .await?;
        Ok(())
    }

    // ===== Connections =====

    pub async fn connections(&self) -> Result<Vec<Connection>> {
        let response = self.send(Endpoint::get("/user/@connections")).await?;
        Self::parse_result(response).await
    }

    pub async fn connection(&self, service: &str) -> Result<Vec<Connection>> {
        let response = self
            .send(Endpoint::get(format!("/user/@connections/{service}")))
            .await?;
        Self::parse_result(response).await
    }

    /// Ask the backend to re-issue a provider token for `service`.
    ///
    /// Authenticated with the session's own bearer, not the expired provider
    /// token.
    pub async fn refresh_connection_token(&self, service: &str) -> Result<String> {
        let endpoint = Endpoint::put(format!("/user/@connections/{service}"))
            .json(serde_json::json!({}));
        let response = self.send(endpoint).await?;
        let connections: Vec<Connection> = Self::parse_result(response).await?;

        connections
            .into_iter()
            .next()
            .and_then(|c| c.access_token)
            .ok_or_else(|| {
                ApiError::InvalidResponse(
                    "connection refresh returned no access token".to_string(),
                )
                .into()
            })
    }
}
