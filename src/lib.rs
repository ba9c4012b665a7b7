//! Screenroom client library.
//!
//! Session and API-access layer for the Screenroom media/social platform:
//! holds the authentication state (access token, refresh token, current
//! user), injects authorization into outbound requests, and exposes the
//! backend's remote operations along with provider-scoped playback calls
//! that transparently recover from an expired provider token.
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use screenroom_client::auth::{MemoryStorage, SessionStore};
//! use screenroom_client::{ApiClient, ApiConfig};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let session = Arc::new(SessionStore::new(Arc::new(MemoryStorage::new()))?);
//! let client = ApiClient::new(&ApiConfig::default(), session)?;
//!
//! client.login("ada", "hunter2", None).await?;
//! let friends = client.friends().await?;
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod auth;
pub mod config;
pub mod models;

pub use api::{ApiClient, ApiError};
pub use auth::SessionStore;
pub use config::ApiConfig;
