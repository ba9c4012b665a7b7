use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: Option<i64>,
    pub username: Option<String>,
    pub fullname: Option<String>,
    pub email: Option<String>,
    pub avatar: Option<String>,
}

impl UserProfile {
    /// Preferred display name: full name when present, username otherwise.
    pub fn display_name(&self) -> &str {
        self.fullname
            .as_deref()
            .filter(|s| !s.is_empty())
            .or(self.username.as_deref())
            .unwrap_or("")
    }
}

/// Token pair issued by the auth endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionTokens {
    pub token: String,
    pub refreshed_token: String,
}

/// Registration form for `POST /user/@create`.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub email: String,
    pub fullname: String,
    pub username: String,
    pub password: String,
    pub password_confirmation: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_name_prefers_fullname() {
        let user = UserProfile {
            username: Some("ada".to_string()),
            fullname: Some("Ada Lovelace".to_string()),
            ..Default::default()
        };
        assert_eq!(user.display_name(), "Ada Lovelace");
    }

    #[test]
    fn display_name_falls_back_to_username() {
        let user = UserProfile {
            username: Some("ada".to_string()),
            fullname: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(user.display_name(), "ada");
    }

    #[test]
    fn session_tokens_parse_from_auth_payload() {
        let json = r#"{"token":"tok-1","refreshed_token":"ref-1"}"#;
        let tokens: SessionTokens = serde_json::from_str(json).expect("parse tokens");
        assert_eq!(tokens.token, "tok-1");
        assert_eq!(tokens.refreshed_token, "ref-1");
    }
}
