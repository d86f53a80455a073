// Session repository over a KeyValueStorage backend
//
// The profile is stored as JSON text under `user`, the opaque credential
// under `token`. A `user` entry that is not a JSON object is discarded.

use std::sync::Arc;

use super::storage::{KeyValueStorage, MemoryStorage};
use crate::error::StorageError;
use crate::models::{Session, UserProfile};

pub const TOKEN_KEY: &str = "token";
pub const USER_KEY: &str = "user";
pub const REMEMBERED_EMAIL_KEY: &str = "rememberedEmail";

/// Injectable session repository used by every flow.
#[derive(Clone)]
pub struct SessionStore {
    storage: Arc<dyn KeyValueStorage>,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore").finish_non_exhaustive()
    }
}

impl SessionStore {
    pub fn new(storage: Arc<dyn KeyValueStorage>) -> Self {
        Self { storage }
    }

    /// Store backed by a fresh [`MemoryStorage`]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStorage::new()))
    }

    /// Current session; token and user are read independently
    pub fn get(&self) -> Result<Session, StorageError> {
        Ok(Session {
            token: self.token()?,
            user: self.user()?,
        })
    }

    /// Persist both halves, overwriting whatever was there
    pub fn set(&self, token: &str, user: &UserProfile) -> Result<(), StorageError> {
        self.set_token(token)?;
        self.set_user(user)
    }

    /// Remove token and user. The remembered email survives logout.
    pub fn clear(&self) -> Result<(), StorageError> {
        self.storage.remove_item(USER_KEY)?;
        self.storage.remove_item(TOKEN_KEY)?;
        tracing::debug!("session cleared");
        Ok(())
    }

    pub fn token(&self) -> Result<Option<String>, StorageError> {
        Ok(self.storage.get_item(TOKEN_KEY)?.filter(|t| !t.is_empty()))
    }

    pub fn set_token(&self, token: &str) -> Result<(), StorageError> {
        self.storage.set_item(TOKEN_KEY, token)
    }

    /// Stored profile. Anything but a JSON object is removed and reported as
    /// absent; fields inside the object are never checked.
    pub fn user(&self) -> Result<Option<UserProfile>, StorageError> {
        let Some(raw) = self.storage.get_item(USER_KEY)?.filter(|u| !u.is_empty()) else {
            return Ok(None);
        };
        match serde_json::from_str::<UserProfile>(&raw) {
            Ok(user) => Ok(Some(user)),
            Err(e) => {
                tracing::warn!(error = %e, "discarding unreadable stored user profile");
                self.storage.remove_item(USER_KEY)?;
                Ok(None)
            }
        }
    }

    pub fn set_user(&self, user: &UserProfile) -> Result<(), StorageError> {
        let raw = serde_json::to_string(user).map_err(|source| StorageError::Serialize {
            key: USER_KEY.to_string(),
            source,
        })?;
        self.storage.set_item(USER_KEY, &raw)
    }

    pub fn remembered_email(&self) -> Result<Option<String>, StorageError> {
        Ok(self
            .storage
            .get_item(REMEMBERED_EMAIL_KEY)?
            .filter(|e| !e.is_empty()))
    }

    pub fn remember_email(&self, email: &str) -> Result<(), StorageError> {
        self.storage.set_item(REMEMBERED_EMAIL_KEY, email)
    }

    pub fn forget_email(&self) -> Result<(), StorageError> {
        self.storage.remove_item(REMEMBERED_EMAIL_KEY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ada() -> UserProfile {
        UserProfile::default()
            .with("name", "Ada")
            .with("email", "ada@gmail.com")
    }

    #[test]
    fn test_empty_store_has_no_session() {
        let store = SessionStore::in_memory();
        let session = store.get().unwrap();
        assert_eq!(session, Session::default());
        assert!(!session.is_authenticated());
    }

    #[test]
    fn test_set_then_get() {
        let store = SessionStore::in_memory();
        store.set("tok-1", &ada()).unwrap();

        let session = store.get().unwrap();
        assert_eq!(session.token.as_deref(), Some("tok-1"));
        assert_eq!(session.user, Some(ada()));
        assert!(session.is_authenticated());
    }

    #[test]
    fn test_set_overwrites() {
        let store = SessionStore::in_memory();
        store.set("tok-1", &ada()).unwrap();
        let grace = UserProfile::default().with("name", "Grace");
        store.set("tok-2", &grace).unwrap();

        let session = store.get().unwrap();
        assert_eq!(session.token.as_deref(), Some("tok-2"));
        assert_eq!(session.user.unwrap().display_name(), "Grace");
    }

    #[test]
    fn test_clear_keeps_remembered_email() {
        let store = SessionStore::in_memory();
        store.set("tok-1", &ada()).unwrap();
        store.remember_email("ada@gmail.com").unwrap();

        store.clear().unwrap();

        assert_eq!(store.get().unwrap(), Session::default());
        assert_eq!(
            store.remembered_email().unwrap().as_deref(),
            Some("ada@gmail.com")
        );
        store.forget_email().unwrap();
        assert_eq!(store.remembered_email().unwrap(), None);
    }

    #[test]
    fn test_corrupt_user_is_discarded() {
        let storage = Arc::new(MemoryStorage::new());
        storage.set_item(USER_KEY, "{not json").unwrap();
        storage.set_item(TOKEN_KEY, "tok-1").unwrap();
        let store = SessionStore::new(storage.clone());

        let session = store.get().unwrap();
        assert_eq!(session.user, None);
        assert_eq!(session.token.as_deref(), Some("tok-1"));
        // the bad entry is gone, the token is untouched
        assert_eq!(storage.get_item(USER_KEY).unwrap(), None);
        assert_eq!(storage.len(), 1);
    }

    #[test]
    fn test_stored_profile_with_odd_fields_is_kept() {
        let storage = Arc::new(MemoryStorage::new());
        storage
            .set_item(USER_KEY, r#"{"name":["Ada"],"isVerified":1}"#)
            .unwrap();
        storage.set_item(TOKEN_KEY, "tok-1").unwrap();
        let store = SessionStore::new(storage);

        let session = store.get().unwrap();
        assert!(session.is_authenticated());
        assert_eq!(session.user.unwrap().display_name(), "User");
    }

    #[test]
    fn test_non_object_profile_is_discarded() {
        for raw in ["42", "\"Ada\"", "[1, 2]", "null"] {
            let storage = Arc::new(MemoryStorage::new());
            storage.set_item(USER_KEY, raw).unwrap();
            let store = SessionStore::new(storage.clone());

            assert_eq!(store.user().unwrap(), None, "{raw}");
            assert!(storage.is_empty());
        }
    }

    #[test]
    fn test_single_key_writes_leave_pair_partial() {
        let store = SessionStore::in_memory();
        store.set_token("tok-only").unwrap();
        let session = store.get().unwrap();
        assert!(session.token.is_some());
        assert!(session.user.is_none());
        assert!(!session.is_authenticated());
    }

    #[test]
    fn test_empty_values_are_absent() {
        let storage = Arc::new(MemoryStorage::new());
        storage.set_item(TOKEN_KEY, "").unwrap();
        storage.set_item(USER_KEY, "").unwrap();
        let store = SessionStore::new(storage);
        assert_eq!(store.get().unwrap(), Session::default());
    }
}
