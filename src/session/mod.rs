//! Session state: the single bearer token this client acts with.
//!
//! A `SessionStore` is owned by whoever drives the client and lent to the
//! layers that issue authenticated calls. `set_token` and `logout` are the only
//! mutators; a persistent store writes through to its [`TokenStorage`] inside
//! the mutator. Observers follow the authenticated state via [`subscribe`].
//!
//! [`subscribe`]: SessionStore::subscribe

pub mod storage;

pub use storage::{FileTokenStorage, MemoryTokenStorage, TokenStorage, SESSION_STORAGE_KEY};

use crate::error::ClientError;
use std::future::Future;
use tokio::sync::watch;

pub struct SessionStore {
    token: watch::Sender<Option<String>>,
    storage: Option<Box<dyn TokenStorage>>,
}

impl SessionStore {
    /// In-memory session that is lost when the process exits.
    pub fn new(initial: Option<String>) -> Self {
        let (token, _) = watch::channel(normalize(initial));
        Self {
            token,
            storage: None,
        }
    }

    /// Session restored from `storage` and saved back on every mutation.
    pub fn persistent(storage: impl TokenStorage + 'static) -> Result<Self, ClientError> {
        let restored = normalize(storage.load()?);
        if restored.is_some() {
            tracing::debug!("Restored persisted session token");
        }
        let (token, _) = watch::channel(restored);
        Ok(Self {
            token,
            storage: Some(Box::new(storage)),
        })
    }

    pub fn token(&self) -> Option<String> {
        self.token.borrow().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.borrow().is_some()
    }

    pub fn is_persistent(&self) -> bool {
        self.storage.is_some()
    }

    /// Replace the current token. Empty tokens count as signed out.
    ///
    /// The in-memory state and observers are always updated; a storage
    /// failure is returned afterwards.
    pub fn set_token(&mut self, token: Option<String>) -> Result<(), ClientError> {
        let token = normalize(token);
        let was_authenticated = self.is_authenticated();
        self.token.send_replace(token.clone());

        match (was_authenticated, token.is_some()) {
            (false, true) => tracing::info!("Session authenticated"),
            (true, false) => tracing::info!("Session cleared"),
            _ => tracing::debug!("Session token replaced"),
        }

        if let Some(storage) = &self.storage {
            storage.save(token.as_deref())?;
        }
        Ok(())
    }

    pub fn logout(&mut self) -> Result<(), ClientError> {
        self.set_token(None)
    }

    /// Watch the token. The receiver sees every `set_token`/`logout`.
    pub fn subscribe(&self) -> watch::Receiver<Option<String>> {
        self.token.subscribe()
    }

    /// Run `operation` with the current token.
    ///
    /// Without a token this fails with [`ClientError::Unauthenticated`] and
    /// `operation` is never invoked. Otherwise its result is returned as is.
    pub async fn authenticated_call<T, F, Fut>(&self, operation: F) -> Result<T, ClientError>
    where
        F: FnOnce(String) -> Fut,
        Fut: Future<Output = Result<T, ClientError>>,
    {
        let Some(token) = self.token() else {
            tracing::debug!("Rejected authenticated call: no session token");
            return Err(ClientError::Unauthenticated);
        };
        operation(token).await
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("authenticated", &self.is_authenticated())
            .field("persistent", &self.is_persistent())
            .finish()
    }
}

fn normalize(token: Option<String>) -> Option<String> {
    token
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tempfile::TempDir;

    #[tokio::test]
    async fn call_without_token_never_runs_operation() {
        let session = SessionStore::new(None);
        let calls = AtomicUsize::new(0);

        let result: Result<(), _> = session
            .authenticated_call(|_| async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
            .await;

        assert!(result.unwrap_err().is_unauthenticated());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn call_with_token_receives_it() {
        let session = SessionStore::new(Some("abc".into()));
        let seen = session
            .authenticated_call(|token| async move { Ok(token) })
            .await
            .unwrap();
        assert_eq!(seen, "abc");
    }

    #[tokio::test]
    async fn operation_failure_propagates_unchanged() {
        let session = SessionStore::new(Some("abc".into()));
        let err = session
            .authenticated_call(|_| async {
                Err::<(), _>(ClientError::Api {
                    status: 409,
                    message: Some("conflict".into()),
                })
            })
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(409));
        assert_eq!(err.message(), "conflict");
    }

    #[tokio::test]
    async fn logout_after_set_leaves_no_token() {
        let mut session = SessionStore::new(None);
        session.set_token(Some("x".into())).unwrap();
        assert!(session.is_authenticated());

        session.logout().unwrap();
        assert_eq!(session.token(), None);

        let err = session
            .authenticated_call(|t| async move { Ok(t) })
            .await
            .unwrap_err();
        assert!(err.is_unauthenticated());
    }

    #[test]
    fn blank_token_counts_as_signed_out() {
        let mut session = SessionStore::new(Some("   ".into()));
        assert!(!session.is_authenticated());
        session.set_token(Some(String::new())).unwrap();
        assert_eq!(session.token(), None);
        session.set_token(Some(" tok \n".into())).unwrap();
        assert_eq!(session.token().as_deref(), Some("tok"));
    }

    #[test]
    fn observers_see_every_change() {
        let mut session = SessionStore::new(None);
        let mut rx = session.subscribe();
        assert!(!rx.has_changed().unwrap());

        session.set_token(Some("t1".into())).unwrap();
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().as_deref(), Some("t1"));

        session.logout().unwrap();
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), None);
    }

    #[test]
    fn persistent_store_restores_and_writes_through() {
        let storage = Arc::new(MemoryTokenStorage::new(Some("saved".into())));
        let mut session = SessionStore::persistent(storage.clone()).unwrap();
        assert!(session.is_persistent());
        assert_eq!(session.token().as_deref(), Some("saved"));

        session.set_token(Some("fresh".into())).unwrap();
        assert_eq!(storage.stored().as_deref(), Some("fresh"));

        session.logout().unwrap();
        assert_eq!(storage.stored(), None);
        assert_eq!(storage.save_count(), 2);
    }

    #[test]
    fn file_backed_session_survives_restart() {
        let tmp = TempDir::new().unwrap();

        {
            let mut session = SessionStore::persistent(FileTokenStorage::in_dir(tmp.path())).unwrap();
            assert!(!session.is_authenticated());
            session.set_token(Some("durable".into())).unwrap();
        }

        let restored = SessionStore::persistent(FileTokenStorage::in_dir(tmp.path())).unwrap();
        assert_eq!(restored.token().as_deref(), Some("durable"));
    }

    #[test]
    fn unreadable_session_file_starts_signed_out() {
        let tmp = TempDir::new().unwrap();
        let storage = FileTokenStorage::in_dir(tmp.path());
        std::fs::create_dir(storage.path()).unwrap();

        let session = SessionStore::persistent(storage).unwrap();
        assert!(!session.is_authenticated());
    }

    struct FailingStorage;

    impl TokenStorage for FailingStorage {
        fn load(&self) -> Result<Option<String>, ClientError> {
            Ok(None)
        }

        fn save(&self, _token: Option<&str>) -> Result<(), ClientError> {
            Err(ClientError::Storage("disk full".into()))
        }
    }

    #[test]
    fn storage_failure_still_updates_memory() {
        let mut session = SessionStore::persistent(FailingStorage).unwrap();
        let err = session.set_token(Some("tok".into())).unwrap_err();
        assert!(matches!(err, ClientError::Storage(_)));
        assert_eq!(session.token().as_deref(), Some("tok"));
    }

    #[test]
    fn debug_output_hides_token() {
        let session = SessionStore::new(Some("secret-token".into()));
        let rendered = format!("{session:?}");
        assert!(!rendered.contains("secret-token"));
        assert!(rendered.contains("authenticated: true"));
    }
}
