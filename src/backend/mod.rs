//! The external collaborators the app depends on: an identity provider and a
//! document store.
//!
//! Both are consumed through narrow traits so that the dashboard does not care
//! where accounts and records live. The SQLite implementations are thin
//! stand-ins that satisfy the traits for a single self-hosted process.

mod document_store;
mod identity;
mod password;
mod sqlite_identity;
mod sqlite_store;

pub use document_store::{
    DocumentId, DocumentQuery, DocumentStore, Order, OrderingToken, StoreError, StoredDocument,
};
pub use identity::{
    AuthError, AuthErrorCode, FederatedProvider, IdentityProvider, Principal, PrincipalId,
};
pub use password::{MIN_PASSWORD_LENGTH, PasswordHash, ValidatedPassword};
pub use sqlite_identity::SqliteIdentityProvider;
pub use sqlite_store::SqliteDocumentStore;
