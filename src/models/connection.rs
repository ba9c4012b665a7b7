use serde::{Deserialize, Serialize};

/// A linked third-party account and its provider-scoped token.
///
/// The `access_token` here is independent of the session's own tokens; it
/// authorizes calls against the provider's API and is re-issued by
/// `PUT /user/@connections/{service}` when it expires.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Connection {
    pub service: Option<String>,
    pub access_token: Option<String>,
    pub expires_in: Option<i64>,
}
