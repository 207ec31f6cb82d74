//! Implements a struct that holds the state of the REST server.

use std::sync::{Arc, Mutex};

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use rusqlite::Connection;
use sha2::{Digest, Sha512};

use crate::{
    Error,
    backend::{
        DocumentStore, IdentityProvider, SqliteDocumentStore, SqliteIdentityProvider, StoreError,
    },
    config::AppConfig,
    navigation::ViewState,
    notification::Notifier,
    records::RecordStore,
    session::SessionManager,
};

/// The state of the REST server.
#[derive(Clone)]
pub struct AppState {
    /// Server settings.
    pub(crate) config: AppConfig,
    /// The key to be used for signing and encrypting private cookies.
    pub(crate) cookie_key: Key,
    /// Signs principals in and out.
    pub(crate) identity: Arc<dyn IdentityProvider>,
    /// Who is signed in.
    pub(crate) session: SessionManager,
    /// The signed-in principal's records.
    pub(crate) records: RecordStore,
    /// What is on screen.
    pub(crate) view: Arc<Mutex<ViewState>>,
    /// The toast slot.
    pub(crate) notifier: Arc<Mutex<Notifier>>,
}

impl AppState {
    /// Create a new [AppState] backed by a SQLite database.
    ///
    /// The identity provider and the document store share `db_connection`
    /// and create their tables if needed. The auth cookie key is derived
    /// from `cookie_secret`.
    ///
    /// # Errors
    /// Returns an error if the database cannot be initialized.
    pub fn new(
        db_connection: Connection,
        config: AppConfig,
        cookie_secret: &str,
    ) -> Result<Self, Error> {
        let connection = Arc::new(Mutex::new(db_connection));

        let identity = SqliteIdentityProvider::new(connection.clone(), config.password_hash_cost)?;
        let store = SqliteDocumentStore::new(connection).map_err(|error| match error {
            StoreError::Sql(error) => Error::from(error),
            StoreError::Lock => Error::LockError("database"),
            error => Error::TaskFailed(error.to_string()),
        })?;

        Ok(Self::with_backends(
            Arc::new(identity),
            Arc::new(store),
            config,
            create_cookie_key(cookie_secret),
        ))
    }

    /// Create a new [AppState] over any identity provider and document store.
    pub fn with_backends(
        identity: Arc<dyn IdentityProvider>,
        store: Arc<dyn DocumentStore>,
        config: AppConfig,
        cookie_key: Key,
    ) -> Self {
        let session = SessionManager::new();

        Self {
            config,
            cookie_key,
            identity,
            records: RecordStore::new(store, session.clone()),
            session,
            view: Arc::new(Mutex::new(ViewState::default())),
            notifier: Arc::new(Mutex::new(Notifier::new())),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.cookie_key.clone()
    }
}

/// Create a signing key for cookies from a `secret` string.
pub fn create_cookie_key(secret: &str) -> Key {
    let hash = Sha512::digest(secret);

    Key::from(&hash)
}
