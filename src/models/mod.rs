//! Data models for Screenroom API payloads.
//!
//! This module contains the data structures exchanged with the backend:
//!
//! - `UserProfile`, `SessionTokens`, `NewAccount`: identity and auth
//! - `Friend`, `FriendRequest`, `Message`, `Notification`: social graph
//! - `MediaSource`, `ParsedSource`: theater media entries
//! - `Theater`, `TheaterUpdate`, `Subtitle`: theater state
//! - `Connection`: linked third-party accounts

use serde::Deserialize;

pub mod connection;
pub mod media;
pub mod social;
pub mod theater;
pub mod user;

pub use connection::Connection;
pub use media::{MediaSource, ParsedSource};
pub use social::{Friend, FriendRequest, Message, Notification};
pub use theater::{Subtitle, Theater, TheaterUpdate};
pub use user::{NewAccount, SessionTokens, UserProfile};

/// Standard response envelope: the backend wraps every payload in `result`.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResult<T> {
    pub result: T,
}
