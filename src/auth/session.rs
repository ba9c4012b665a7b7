//! Session state: the single source of truth for the caller's identity.
//!
//! Tokens survive process restarts through a pluggable [`TokenStorage`]
//! back-end; the user profile is written durably as an advisory cache but
//! only the in-memory copy is authoritative.

use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::Result;

use crate::models::UserProfile;

use super::storage::{TokenStorage, ACCESS_TOKEN_KEY, REFRESHED_TOKEN_KEY, USER_KEY};

/// Collapse web-localStorage era sentinels to a real absence.
///
/// Browser clients that kept tokens in localStorage persisted the literal
/// string `"null"` (and sometimes `""`) where no token existed. Neither is a
/// credential and neither may ever be sent as one.
pub fn normalize_token(raw: &str) -> Option<&str> {
    if raw.is_empty() || raw == "null" {
        None
    } else {
        Some(raw)
    }
}

#[derive(Debug, Default)]
struct SessionState {
    access_token: Option<String>,
    refresh_token: Option<String>,
    user: Option<UserProfile>,
}

pub struct SessionStore {
    storage: Arc<dyn TokenStorage>,
    state: Mutex<SessionState>,
}

impl SessionStore {
    /// Create a store backed by `storage`, restoring any persisted tokens.
    ///
    /// The durable user copy is advisory only and is not restored.
    pub fn new(storage: Arc<dyn TokenStorage>) -> Result<Self> {
        let access_token = storage
            .get(ACCESS_TOKEN_KEY)?
            .and_then(|raw| normalize_token(&raw).map(str::to_string));
        let refresh_token = storage
            .get(REFRESHED_TOKEN_KEY)?
            .and_then(|raw| normalize_token(&raw).map(str::to_string));

        Ok(Self {
            storage,
            state: Mutex::new(SessionState {
                access_token,
                refresh_token,
                user: None,
            }),
        })
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().expect("session state mutex poisoned")
    }

    /// Current access token, if one is present.
    ///
    /// Stored values of `""` and `"null"` read as absent, so a stale
    /// sentinel is never handed out as a literal credential.
    pub fn access_token(&self) -> Option<String> {
        let state = self.lock();
        state
            .access_token
            .as_deref()
            .and_then(normalize_token)
            .map(str::to_string)
    }

    /// Current refresh token, if one is present.
    pub fn refresh_token(&self) -> Option<String> {
        let state = self.lock();
        state
            .refresh_token
            .as_deref()
            .and_then(normalize_token)
            .map(str::to_string)
    }

    pub fn is_logged_in(&self) -> bool {
        self.access_token().is_some()
    }

    /// Commit a new token pair to memory and durable storage.
    ///
    /// The lock is held for the full update, so readers see either the old
    /// pair or the new pair, never one of each.
    pub fn set_tokens(&self, access_token: &str, refresh_token: &str) -> Result<()> {
        let mut state = self.lock();
        self.storage.set(ACCESS_TOKEN_KEY, access_token)?;
        self.storage.set(REFRESHED_TOKEN_KEY, refresh_token)?;
        state.access_token = Some(access_token.to_string());
        state.refresh_token = Some(refresh_token.to_string());
        Ok(())
    }

    /// Drop the session. Safe to call when nothing is stored.
    pub fn clear(&self) -> Result<()> {
        let mut state = self.lock();
        self.storage.remove(ACCESS_TOKEN_KEY)?;
        self.storage.remove(REFRESHED_TOKEN_KEY)?;
        state.access_token = None;
        state.refresh_token = None;
        state.user = None;
        Ok(())
    }

    /// Store the user profile in memory and as an advisory durable copy.
    pub fn set_user(&self, profile: UserProfile) -> Result<()> {
        let mut state = self.lock();
        let encoded = serde_json::to_string(&profile)?;
        self.storage.set(USER_KEY, &encoded)?;
        state.user = Some(profile);
        Ok(())
    }

    pub fn user(&self) -> Option<UserProfile> {
        self.lock().user.clone()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::super::storage::MemoryStorage;
    use super::*;

    fn store_with(storage: Arc<MemoryStorage>) -> SessionStore {
        SessionStore::new(storage).expect("create session store")
    }

    #[test]
    fn normalize_token_table() {
        assert_eq!(normalize_token(""), None);
        assert_eq!(normalize_token("null"), None);
        assert_eq!(normalize_token("abc123"), Some("abc123"));
        // Only the exact sentinel is absent
        assert_eq!(normalize_token("null "), Some("null "));
        assert_eq!(normalize_token("NULL"), Some("NULL"));
    }

    #[test]
    fn sentinel_values_in_storage_read_as_absent() {
        for sentinel in ["", "null"] {
            let storage = Arc::new(MemoryStorage::new());
            storage.set(ACCESS_TOKEN_KEY, sentinel).unwrap();
            let store = store_with(storage);
            assert_eq!(store.access_token(), None);
            assert!(!store.is_logged_in());
        }
    }

    #[test]
    fn real_token_in_storage_is_restored() {
        let storage = Arc::new(MemoryStorage::new());
        storage.set(ACCESS_TOKEN_KEY, "tok-1").unwrap();
        storage.set(REFRESHED_TOKEN_KEY, "ref-1").unwrap();
        let store = store_with(storage);
        assert_eq!(store.access_token(), Some("tok-1".to_string()));
        assert_eq!(store.refresh_token(), Some("ref-1".to_string()));
        assert!(store.is_logged_in());
    }

    #[test]
    fn user_is_not_restored_from_storage() {
        let storage = Arc::new(MemoryStorage::new());
        storage.set(USER_KEY, r#"{"username":"ada"}"#).unwrap();
        let store = store_with(storage);
        assert!(store.user().is_none());
    }

    #[test]
    fn set_tokens_updates_memory_and_storage_together() {
        let storage = Arc::new(MemoryStorage::new());
        let store = store_with(storage.clone());

        store.set_tokens("tok-2", "ref-2").unwrap();

        assert_eq!(store.access_token(), Some("tok-2".to_string()));
        assert_eq!(store.refresh_token(), Some("ref-2".to_string()));
        assert_eq!(
            storage.get(ACCESS_TOKEN_KEY).unwrap(),
            Some("tok-2".to_string())
        );
        assert_eq!(
            storage.get(REFRESHED_TOKEN_KEY).unwrap(),
            Some("ref-2".to_string())
        );
    }

    #[test]
    fn login_state_follows_set_and_clear_transitions() {
        let storage = Arc::new(MemoryStorage::new());
        let store = store_with(storage);

        assert!(!store.is_logged_in());
        store.set_tokens("tok", "ref").unwrap();
        assert!(store.is_logged_in());
        store.clear().unwrap();
        assert!(!store.is_logged_in());
    }

    #[test]
    fn clear_is_idempotent() {
        let storage = Arc::new(MemoryStorage::new());
        let store = store_with(storage.clone());

        store.set_tokens("tok", "ref").unwrap();
        store.set_user(UserProfile {
            username: Some("ada".to_string()),
            ..Default::default()
        })
        .unwrap();

        store.clear().unwrap();
        store.clear().unwrap();

        assert_eq!(store.access_token(), None);
        assert_eq!(store.refresh_token(), None);
        assert!(store.user().is_none());
        assert_eq!(storage.get(ACCESS_TOKEN_KEY).unwrap(), None);
        assert_eq!(storage.get(REFRESHED_TOKEN_KEY).unwrap(), None);
    }

    #[test]
    fn set_user_writes_advisory_copy() {
        let storage = Arc::new(MemoryStorage::new());
        let store = store_with(storage.clone());

        store.set_user(UserProfile {
            username: Some("grace".to_string()),
            ..Default::default()
        })
        .unwrap();

        assert_eq!(
            store.user().and_then(|u| u.username),
            Some("grace".to_string())
        );
        assert!(storage.get(USER_KEY).unwrap().is_some());
    }
}
