//! An identity provider that keeps principals and the active session in SQLite.

use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::{Connection, OptionalExtension};
use tokio::sync::watch;

use crate::{
    Error,
    backend::{
        AuthError, AuthErrorCode, FederatedProvider, IdentityProvider, PasswordHash, Principal,
        PrincipalId,
    },
};

/// Code 2067 occurs when a UNIQUE constraint failed.
const SQLITE_CONSTRAINT_UNIQUE: i32 = 2067;

/// Principals are rows in the `principal` table and the active session is the
/// single row of `active_session`, so a signed-in session survives restarts.
pub struct SqliteIdentityProvider {
    connection: Arc<Mutex<Connection>>,
    hash_cost: u32,
    session: watch::Sender<Option<Principal>>,
}

impl SqliteIdentityProvider {
    /// Create the identity tables if needed and load the persisted session.
    ///
    /// `hash_cost` is the bcrypt cost for new password hashes.
    ///
    /// # Errors
    ///
    /// Returns an error if the tables cannot be created or read.
    pub fn new(connection: Arc<Mutex<Connection>>, hash_cost: u32) -> Result<Self, Error> {
        let active_principal = {
            let connection = connection
                .lock()
                .map_err(|_| Error::LockError("database"))?;
            create_identity_tables(&connection)?;
            get_active_principal(&connection)?
        };

        if let Some(principal) = &active_principal {
            tracing::info!("Restored session for {}", principal.email);
        }

        let (session, _) = watch::channel(active_principal);

        Ok(Self {
            connection,
            hash_cost,
            session,
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, AuthError> {
        self.connection.lock().map_err(|error| {
            tracing::error!("could not acquire database lock: {error}");
            AuthError::new(AuthErrorCode::Internal, "database lock poisoned")
        })
    }

    fn start_session(
        &self,
        connection: &Connection,
        principal: Principal,
    ) -> Result<Principal, AuthError> {
        connection
            .execute(
                "INSERT OR REPLACE INTO active_session (slot, principal_id) VALUES (1, ?1)",
                (principal.id.as_str(),),
            )
            .map_err(internal_error)?;

        self.session.send_replace(Some(principal.clone()));

        Ok(principal)
    }
}

impl IdentityProvider for SqliteIdentityProvider {
    fn sign_up(
        &self,
        email: &str,
        password: &str,
        display_name: Option<&str>,
    ) -> Result<Principal, AuthError> {
        let email = normalize_email(email);

        if !is_valid_email(&email) {
            return Err(AuthError::new(
                AuthErrorCode::InvalidEmail,
                format!("\"{email}\" is not an email address"),
            ));
        }

        let password_hash =
            PasswordHash::from_raw_password(password, self.hash_cost).map_err(|error| match error {
                Error::TooWeak(reason) => AuthError::new(AuthErrorCode::WeakPassword, reason),
                error => AuthError::new(AuthErrorCode::Internal, error.to_string()),
            })?;

        let display_name = display_name
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_owned);

        let connection = self.lock()?;

        connection
            .execute(
                "INSERT INTO principal (email, display_name, password_hash) VALUES (?1, ?2, ?3)",
                (&email, &display_name, password_hash.to_string()),
            )
            .map_err(|error| match error {
                rusqlite::Error::SqliteFailure(sql_error, _)
                    if sql_error.extended_code == SQLITE_CONSTRAINT_UNIQUE =>
                {
                    AuthError::new(
                        AuthErrorCode::EmailAlreadyInUse,
                        format!("{email} is already registered"),
                    )
                }
                error => internal_error(error),
            })?;

        let principal = Principal {
            id: PrincipalId::new(connection.last_insert_rowid().to_string()),
            email,
            display_name,
        };

        tracing::info!("Created account for {}", principal.email);

        self.start_session(&connection, principal)
    }

    fn sign_in(&self, email: &str, password: &str) -> Result<Principal, AuthError> {
        let email = normalize_email(email);

        if !is_valid_email(&email) {
            return Err(AuthError::new(
                AuthErrorCode::InvalidEmail,
                format!("\"{email}\" is not an email address"),
            ));
        }

        let connection = self.lock()?;

        let (principal, password_hash) = connection
            .prepare("SELECT id, email, display_name, password_hash FROM principal WHERE email = ?1")
            .and_then(|mut statement| {
                statement
                    .query_row((&email,), |row| {
                        let id: i64 = row.get(0)?;
                        let principal = Principal {
                            id: PrincipalId::new(id.to_string()),
                            email: row.get(1)?,
                            display_name: row.get(2)?,
                        };
                        let raw_password_hash: String = row.get(3)?;

                        Ok((principal, PasswordHash::new_unchecked(&raw_password_hash)))
                    })
                    .optional()
            })
            .map_err(internal_error)?
            .ok_or_else(|| {
                AuthError::new(
                    AuthErrorCode::UserNotFound,
                    format!("no principal with the email {email}"),
                )
            })?;

        let is_password_valid = password_hash
            .verify(password)
            .map_err(|error| AuthError::new(AuthErrorCode::Internal, error.to_string()))?;

        if !is_password_valid {
            return Err(AuthError::new(
                AuthErrorCode::WrongPassword,
                format!("incorrect password for {email}"),
            ));
        }

        self.start_session(&connection, principal)
    }

    fn sign_in_federated(&self, provider: FederatedProvider) -> Result<Principal, AuthError> {
        Err(AuthError::new(
            AuthErrorCode::OperationNotAllowed,
            format!("{provider:?} sign-in is not available on a self-hosted server"),
        ))
    }

    fn sign_out(&self) -> Result<(), AuthError> {
        let connection = self.lock()?;

        connection
            .execute("DELETE FROM active_session", ())
            .map_err(internal_error)?;

        self.session.send_replace(None);

        Ok(())
    }

    fn on_session_change(&self) -> watch::Receiver<Option<Principal>> {
        self.session.subscribe()
    }
}

fn internal_error(error: rusqlite::Error) -> AuthError {
    tracing::error!("an unhandled SQL error occurred: {error}");
    AuthError::new(AuthErrorCode::Internal, error.to_string())
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Whether `email` has a non-empty local part, an `@`, and a domain containing
/// a dot that is neither its first nor last character.
fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };

    !local.is_empty()
        && !email.chars().any(char::is_whitespace)
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}

/// Create the principal and active session tables.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
fn create_identity_tables(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS principal (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                email TEXT NOT NULL UNIQUE,
                display_name TEXT,
                password_hash TEXT NOT NULL
                )",
        (),
    )?;

    connection.execute(
        "CREATE TABLE IF NOT EXISTS active_session (
                slot INTEGER PRIMARY KEY CHECK (slot = 1),
                principal_id TEXT NOT NULL
                )",
        (),
    )?;

    Ok(())
}

fn get_active_principal(connection: &Connection) -> Result<Option<Principal>, rusqlite::Error> {
    connection
        .prepare(
            "SELECT principal.id, principal.email, principal.display_name
            FROM active_session
            INNER JOIN principal ON CAST(principal.id AS TEXT) = active_session.principal_id
            WHERE active_session.slot = 1",
        )?
        .query_row((), |row| {
            let id: i64 = row.get(0)?;

            Ok(Principal {
                id: PrincipalId::new(id.to_string()),
                email: row.get(1)?,
                display_name: row.get(2)?,
            })
        })
        .optional()
}

#[cfg(test)]
mod sqlite_identity_tests {
    use std::sync::{Arc, Mutex};

    use rusqlite::Connection;

    use crate::backend::{AuthErrorCode, FederatedProvider, IdentityProvider};

    use super::{SqliteIdentityProvider, is_valid_email};

    fn get_provider() -> SqliteIdentityProvider {
        let connection =
            Connection::open_in_memory().expect("Could not open in-memory SQLite database");

        SqliteIdentityProvider::new(Arc::new(Mutex::new(connection)), 4)
            .expect("Could not create identity provider")
    }

    #[test]
    fn sign_up_signs_in_new_principal() {
        let provider = get_provider();
        let receiver = provider.on_session_change();

        let principal = provider
            .sign_up("Jane@Example.com", "hunter22", Some("Jane Doe"))
            .unwrap();

        assert_eq!(principal.email, "jane@example.com");
        assert_eq!(principal.display_name.as_deref(), Some("Jane Doe"));
        assert_eq!(*receiver.borrow(), Some(principal));
    }

    #[test]
    fn sign_up_rejects_duplicate_email() {
        let provider = get_provider();
        provider.sign_up("jane@example.com", "hunter22", None).unwrap();

        let error = provider
            .sign_up("JANE@example.com", "hunter22", None)
            .unwrap_err();

        assert_eq!(error.code, AuthErrorCode::EmailAlreadyInUse);
    }

    #[test]
    fn sign_up_rejects_short_password() {
        let provider = get_provider();

        let error = provider.sign_up("jane@example.com", "12345", None).unwrap_err();

        assert_eq!(error.code, AuthErrorCode::WeakPassword);
        assert_eq!(
            error.user_message(),
            "Password should be at least 6 characters"
        );
    }

    #[test]
    fn sign_up_rejects_invalid_email() {
        let provider = get_provider();

        let error = provider.sign_up("not-an-email", "hunter22", None).unwrap_err();

        assert_eq!(error.code, AuthErrorCode::InvalidEmail);
    }

    #[test]
    fn sign_in_with_wrong_password_fails() {
        let provider = get_provider();
        provider.sign_up("jane@example.com", "hunter22", None).unwrap();

        let error = provider.sign_in("jane@example.com", "hunter23").unwrap_err();

        assert_eq!(error.code, AuthErrorCode::WrongPassword);
    }

    #[test]
    fn sign_in_with_unknown_email_fails() {
        let provider = get_provider();

        let error = provider.sign_in("nobody@example.com", "hunter22").unwrap_err();

        assert_eq!(error.code, AuthErrorCode::UserNotFound);
    }

    #[test]
    fn sign_in_is_case_insensitive_on_email() {
        let provider = get_provider();
        let created = provider.sign_up("jane@example.com", "hunter22", None).unwrap();
        provider.sign_out().unwrap();

        let principal = provider.sign_in("  JANE@EXAMPLE.COM ", "hunter22").unwrap();

        assert_eq!(principal, created);
    }

    #[test]
    fn sign_out_notifies_subscribers() {
        let provider = get_provider();
        provider.sign_up("jane@example.com", "hunter22", None).unwrap();
        let mut receiver = provider.on_session_change();

        provider.sign_out().unwrap();

        assert!(receiver.has_changed().unwrap());
        assert_eq!(*receiver.borrow_and_update(), None);
    }

    #[test]
    fn federated_sign_in_is_not_allowed() {
        let provider = get_provider();

        let error = provider
            .sign_in_federated(FederatedProvider::Google)
            .unwrap_err();

        assert_eq!(error.code, AuthErrorCode::OperationNotAllowed);
        assert_eq!(error.user_message(), "An error occurred. Please try again.");
    }

    #[test]
    fn session_survives_restart() {
        let connection = Arc::new(Mutex::new(
            Connection::open_in_memory().expect("Could not open in-memory SQLite database"),
        ));
        let provider = SqliteIdentityProvider::new(connection.clone(), 4).unwrap();
        let principal = provider.sign_up("jane@example.com", "hunter22", None).unwrap();
        drop(provider);

        let restarted = SqliteIdentityProvider::new(connection, 4).unwrap();

        assert_eq!(*restarted.on_session_change().borrow(), Some(principal));
    }

    #[test]
    fn validates_email_shape() {
        assert!(is_valid_email("a@b.co"));
        assert!(!is_valid_email("@b.co"));
        assert!(!is_valid_email("a@bco"));
        assert!(!is_valid_email("a@.co"));
        assert!(!is_valid_email("a b@c.co"));
        assert!(!is_valid_email("a@b@c.co"));
    }
}
