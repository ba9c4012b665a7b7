//! REST API client module for the Screenroom backend and provider services.
//!
//! This module provides the `ApiClient` for communicating with the backend
//! (sessions, social graph, media sources, theaters, notifications, OAuth
//! connections) and with the streaming provider's API.
//!
//! Backend calls use bearer token authentication with the session's access
//! token; provider calls carry a provider-scoped token and recover from
//! expiry through a bounded reauthorize-and-replay step.

pub mod client;
pub mod error;
pub mod provider;
pub mod request;

pub use client::ApiClient;
pub use error::ApiError;
pub use provider::{ProviderReply, ProviderRequest};
pub use request::{Body, Endpoint, Part};
