use axum_extra::extract::cookie::Key;
use serde_json::{Map, Value};
use time::OffsetDateTime;

use crate::{
    AppConfig, AppState,
    app_state::create_cookie_key,
    backend::{
        DocumentId, DocumentQuery, DocumentStore, OrderingToken, PrincipalId, StoreError,
        StoredDocument,
    },
    records::{Category, Employee, PlaceholderMetrics, Transaction, TransactionType},
};

/// App state over an in-memory database with the cheapest bcrypt cost.
pub(crate) fn test_app_state() -> AppState {
    let connection =
        rusqlite::Connection::open_in_memory().expect("Could not open in-memory SQLite database");
    let config = AppConfig::default().with_password_hash_cost(4);

    AppState::new(connection, config, TEST_COOKIE_SECRET).expect("Could not create app state")
}

const TEST_COOKIE_SECRET: &str = "nafstenoas";

/// The cookie key [test_app_state] uses.
pub(crate) fn test_cookie_key() -> Key {
    create_cookie_key(TEST_COOKIE_SECRET)
}

/// A transaction whose type follows the sign of `amount`.
pub(crate) fn test_transaction(
    description: &str,
    amount: f64,
    category: Category,
    occurred_at: Option<OffsetDateTime>,
) -> Transaction {
    let kind = if amount >= 0.0 {
        TransactionType::Income
    } else {
        TransactionType::Expense
    };

    Transaction {
        id: DocumentId::new(1),
        owner_id: PrincipalId::new("1"),
        description: description.to_owned(),
        amount,
        category,
        kind,
        occurred_at,
        created_at: OrderingToken::new(1),
    }
}

pub(crate) fn test_employee(name: &str, salary: f64) -> Employee {
    Employee {
        id: DocumentId::new(1),
        owner_id: PrincipalId::new("1"),
        name: name.to_owned(),
        position: "Engineer".to_owned(),
        department: "Engineering".to_owned(),
        salary,
        email: "employee@example.com".to_owned(),
        metrics: PlaceholderMetrics::from_seed(42),
        created_at: OrderingToken::new(1),
    }
}

/// A document store that is always down.
pub(crate) struct FailingDocumentStore;

impl DocumentStore for FailingDocumentStore {
    fn create(
        &self,
        _collection: &str,
        _owner_id: &PrincipalId,
        _data: Map<String, Value>,
    ) -> Result<StoredDocument, StoreError> {
        Err(StoreError::Unavailable("offline".to_owned()))
    }

    fn query(
        &self,
        _collection: &str,
        _query: &DocumentQuery,
    ) -> Result<Vec<StoredDocument>, StoreError> {
        Err(StoreError::Unavailable("offline".to_owned()))
    }
}

/// A document store where one collection is down and the rest are served by
/// `inner`.
pub(crate) struct FailingCollectionStore<S> {
    pub inner: S,
    pub failing_collection: &'static str,
}

impl<S: DocumentStore> DocumentStore for FailingCollectionStore<S> {
    fn create(
        &self,
        collection: &str,
        owner_id: &PrincipalId,
        data: Map<String, Value>,
    ) -> Result<StoredDocument, StoreError> {
        if collection == self.failing_collection {
            return Err(StoreError::Unavailable("offline".to_owned()));
        }

        self.inner.create(collection, owner_id, data)
    }

    fn query(
        &self,
        collection: &str,
        query: &DocumentQuery,
    ) -> Result<Vec<StoredDocument>, StoreError> {
        if collection == self.failing_collection {
            return Err(StoreError::Unavailable("offline".to_owned()));
        }

        self.inner.query(collection, query)
    }
}
