//! The contract for the owner-scoped document store.

use std::fmt::Display;

use serde_json::{Map, Value};

use crate::backend::PrincipalId;

/// The identifier the store assigns to a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DocumentId(i64);

impl DocumentId {
    /// Wrap a raw identifier.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// The raw identifier.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for DocumentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A strictly increasing token the store stamps on every created document.
///
/// Later documents always compare greater than earlier ones, so the token
/// orders documents by creation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OrderingToken(i64);

impl OrderingToken {
    /// Wrap a raw token.
    pub fn new(token: i64) -> Self {
        Self(token)
    }
}

/// How to order query results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    /// Newest first.
    CreatedAtDescending,
    /// Oldest first.
    CreatedAtAscending,
}

/// Selects the documents of one owner in a collection.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentQuery {
    /// Only documents with exactly this owner are returned.
    pub owner_id: PrincipalId,
    /// The result order, unspecified when `None`.
    pub order: Option<Order>,
    /// The maximum number of results, unlimited when `None`.
    pub limit: Option<usize>,
}

impl DocumentQuery {
    /// Select every document owned by `owner_id`, in no particular order.
    pub fn owned_by(owner_id: PrincipalId) -> Self {
        Self {
            owner_id,
            order: None,
            limit: None,
        }
    }

    /// Order the results.
    pub fn order(mut self, order: Order) -> Self {
        self.order = Some(order);
        self
    }

    /// Cap the number of results.
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// A document as stored, with the fields the store stamps on creation.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    /// The store-assigned identifier.
    pub id: DocumentId,
    /// The principal that created the document.
    pub owner_id: PrincipalId,
    /// When the document was created, relative to other documents.
    pub created_at: OrderingToken,
    /// The document body.
    pub data: Map<String, Value>,
}

/// The errors a document store may report.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The underlying database failed.
    #[error("database error: {0}")]
    Sql(#[from] rusqlite::Error),

    /// A stored document is not valid JSON.
    #[error("invalid document JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The database lock was poisoned.
    #[error("could not acquire the database lock")]
    Lock,

    /// The store cannot be reached.
    #[error("document store unavailable: {0}")]
    Unavailable(String),
}

/// Stores JSON documents in named collections, scoped by owner.
///
/// Calls may block, so async callers should run them on the blocking thread
/// pool.
pub trait DocumentStore: Send + Sync {
    /// Store `data` in `collection`, stamping the owner and a fresh ordering
    /// token.
    fn create(
        &self,
        collection: &str,
        owner_id: &PrincipalId,
        data: Map<String, Value>,
    ) -> Result<StoredDocument, StoreError>;

    /// Get the documents in `collection` that match `query`.
    fn query(&self, collection: &str, query: &DocumentQuery)
    -> Result<Vec<StoredDocument>, StoreError>;
}
