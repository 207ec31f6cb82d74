//! Typed create and query operations over the transaction and employee
//! collections, scoped to the active session.

use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::{
    backend::{DocumentQuery, DocumentStore, Order, PrincipalId, StoreError, StoredDocument},
    records::{Employee, NewEmployee, NewTransaction, Transaction},
    session::SessionManager,
};

/// The collection transactions are stored in.
pub const TRANSACTIONS: &str = "transactions";
/// The collection employees are stored in.
pub const EMPLOYEES: &str = "employees";

/// The most transactions a query returns, newest first.
///
/// This is a recency window rather than pagination: older transactions are
/// not shown in lists and do not count towards the dashboard statistics.
pub const RECENCY_WINDOW: usize = 50;

/// Creating a record failed.
#[derive(Debug, thiserror::Error)]
pub enum WriteError {
    /// Nobody is signed in.
    #[error("no active session")]
    NoSession,

    /// The named field is NaN or infinite, which JSON cannot represent.
    #[error("the {0} must be a finite number")]
    NotFinite(&'static str),

    /// The document store rejected the write.
    #[error("the document store rejected the write: {0}")]
    Backend(#[from] StoreError),

    /// The record could not be encoded as a JSON object.
    #[error("could not encode the record: {0}")]
    Encode(#[from] serde_json::Error),

    /// The blocking task running the write failed.
    #[error("the write task failed: {0}")]
    Task(String),
}

/// Reading records failed.
#[derive(Debug, thiserror::Error)]
pub enum ReadError {
    /// The document store failed.
    #[error("the document store failed: {0}")]
    Backend(#[from] StoreError),

    /// The blocking task running the query failed.
    #[error("the read task failed: {0}")]
    Task(String),
}

/// Reads and writes the records of whoever is signed in.
///
/// Every store call runs on the blocking thread pool, so concurrent reads make
/// progress independently.
#[derive(Clone)]
pub struct RecordStore {
    store: Arc<dyn DocumentStore>,
    session: SessionManager,
}

impl RecordStore {
    /// Create a record store over `store`, gated by `session`.
    pub fn new(store: Arc<dyn DocumentStore>, session: SessionManager) -> Self {
        Self { store, session }
    }

    /// Store a transaction owned by the active principal.
    ///
    /// # Errors
    ///
    /// Returns [WriteError::NotFinite] if the amount is NaN or infinite,
    /// [WriteError::NoSession] if nobody is signed in, or another variant if
    /// the store rejects the write.
    pub async fn create_transaction(
        &self,
        transaction: NewTransaction,
    ) -> Result<Transaction, WriteError> {
        if !transaction.amount().is_finite() {
            return Err(WriteError::NotFinite("amount"));
        }

        let document = self
            .create(TRANSACTIONS, &transaction.into_document())
            .await?;

        Transaction::from_document(document).map_err(WriteError::from)
    }

    /// Store an employee owned by the active principal.
    ///
    /// # Errors
    ///
    /// Returns [WriteError::NotFinite] if the salary is infinite,
    /// [WriteError::NoSession] if nobody is signed in, or another variant if
    /// the store rejects the write.
    pub async fn create_employee(&self, employee: NewEmployee) -> Result<Employee, WriteError> {
        if !employee.salary().is_finite() {
            return Err(WriteError::NotFinite("salary"));
        }

        let document = self.create(EMPLOYEES, &employee.into_document()).await?;

        Employee::from_document(document).map_err(WriteError::from)
    }

    /// Get the active principal's [RECENCY_WINDOW] most recent transactions,
    /// newest first.
    ///
    /// Returns an empty list if nobody is signed in.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub async fn query_transactions(&self) -> Result<Vec<Transaction>, ReadError> {
        let Some(owner_id) = self.owner_id() else {
            return Ok(Vec::new());
        };

        let query = DocumentQuery::owned_by(owner_id)
            .order(Order::CreatedAtDescending)
            .limit(RECENCY_WINDOW);
        let documents = self.query(TRANSACTIONS, query).await?;

        Ok(decode_all(documents, TRANSACTIONS, Transaction::from_document))
    }

    /// Get all of the active principal's employees, in no particular order.
    ///
    /// Returns an empty list if nobody is signed in.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub async fn query_employees(&self) -> Result<Vec<Employee>, ReadError> {
        let Some(owner_id) = self.owner_id() else {
            return Ok(Vec::new());
        };

        let documents = self
            .query(EMPLOYEES, DocumentQuery::owned_by(owner_id))
            .await?;

        Ok(decode_all(documents, EMPLOYEES, Employee::from_document))
    }

    fn owner_id(&self) -> Option<PrincipalId> {
        self.session.current().map(|session| session.principal_id)
    }

    async fn create<T: Serialize>(
        &self,
        collection: &'static str,
        record: &T,
    ) -> Result<StoredDocument, WriteError> {
        let owner_id = self.owner_id().ok_or(WriteError::NoSession)?;
        let data = to_json_object(record)?;
        let store = self.store.clone();

        tokio::task::spawn_blocking(move || store.create(collection, &owner_id, data))
            .await
            .map_err(|error| WriteError::Task(error.to_string()))?
            .inspect_err(|error| tracing::error!("could not create {collection} document: {error}"))
            .map_err(WriteError::from)
    }

    async fn query(
        &self,
        collection: &'static str,
        query: DocumentQuery,
    ) -> Result<Vec<StoredDocument>, ReadError> {
        let store = self.store.clone();

        tokio::task::spawn_blocking(move || store.query(collection, &query))
            .await
            .map_err(|error| ReadError::Task(error.to_string()))?
            .inspect_err(|error| tracing::error!("could not query {collection}: {error}"))
            .map_err(ReadError::from)
    }
}

fn to_json_object<T: Serialize>(record: &T) -> Result<Map<String, Value>, serde_json::Error> {
    match serde_json::to_value(record)? {
        Value::Object(map) => Ok(map),
        _ => Err(serde::ser::Error::custom(
            "records must serialize to a JSON object",
        )),
    }
}

/// Decode every document, skipping and logging the ones that do not decode.
fn decode_all<T>(
    documents: Vec<StoredDocument>,
    collection: &str,
    decode: impl Fn(StoredDocument) -> Result<T, serde_json::Error>,
) -> Vec<T> {
    documents
        .into_iter()
        .filter_map(|document| {
            let id = document.id;

            decode(document)
                .inspect_err(|error| {
                    tracing::warn!("skipping undecodable {collection} document {id}: {error}")
                })
                .ok()
        })
        .collect()
}

#[cfg(test)]
mod record_store_tests {
    use std::sync::{Arc, Mutex};

    use rusqlite::Connection;
    use serde_json::{Value, json};
    use time::macros::datetime;

    use crate::{
        backend::{
            DocumentQuery, DocumentStore, Principal, PrincipalId, SqliteDocumentStore,
            StoreError,
        },
        records::{
            Category, NewEmployee, NewTransaction, PlaceholderMetrics, RECENCY_WINDOW,
            TransactionType,
        },
        session::SessionManager,
        test_utils::FailingDocumentStore,
    };

    use super::{EMPLOYEES, RecordStore, TRANSACTIONS, WriteError};

    fn principal(id: &str) -> Principal {
        Principal {
            id: PrincipalId::new(id),
            email: format!("user{id}@example.com"),
            display_name: None,
        }
    }

    fn get_store() -> (RecordStore, SessionManager, Arc<SqliteDocumentStore>) {
        let connection =
            Connection::open_in_memory().expect("Could not open in-memory SQLite database");
        let documents = Arc::new(
            SqliteDocumentStore::new(Arc::new(Mutex::new(connection)))
                .expect("Could not create document store"),
        );
        let session = SessionManager::new();
        let store = RecordStore::new(documents.clone(), session.clone());

        (store, session, documents)
    }

    fn coffee() -> NewTransaction {
        NewTransaction::new(
            "Coffee",
            4.50,
            Category::FoodAndDining,
            TransactionType::Expense,
            datetime!(2025-01-01 8:00 UTC),
        )
    }

    #[tokio::test]
    async fn create_without_session_fails() {
        let (store, _, _) = get_store();

        let result = store.create_transaction(coffee()).await;

        assert!(matches!(result, Err(WriteError::NoSession)));
    }

    #[tokio::test]
    async fn non_finite_amounts_are_rejected_before_writing() {
        let (store, session, documents) = get_store();
        let owner = principal("1");
        session.apply(Some(&owner));

        for amount in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let result = store
                .create_transaction(NewTransaction::new(
                    "Broken",
                    amount,
                    Category::Shopping,
                    TransactionType::Expense,
                    datetime!(2025-01-01 8:00 UTC),
                ))
                .await;

            assert!(matches!(result, Err(WriteError::NotFinite("amount"))));
        }

        let result = store
            .create_employee(NewEmployee::new(
                "Ada Lovelace",
                "Engineer",
                "R&D",
                f64::INFINITY,
                "ada@example.com",
                PlaceholderMetrics::from_seed(1),
            ))
            .await;
        assert!(matches!(result, Err(WriteError::NotFinite("salary"))));

        let raw = documents
            .query(TRANSACTIONS, &DocumentQuery::owned_by(owner.id.clone()))
            .unwrap();
        assert!(raw.is_empty(), "no document should be written");
        let raw = documents
            .query(EMPLOYEES, &DocumentQuery::owned_by(owner.id))
            .unwrap();
        assert!(raw.is_empty(), "no document should be written");
    }

    #[tokio::test]
    async fn queries_without_session_are_empty() {
        let (store, _, _) = get_store();

        assert!(store.query_transactions().await.unwrap().is_empty());
        assert!(store.query_employees().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn coffee_is_stored_as_negative_amount() {
        let (store, session, _) = get_store();
        session.apply(Some(&principal("1")));

        store.create_transaction(coffee()).await.unwrap();
        let transactions = store.query_transactions().await.unwrap();

        assert_eq!(transactions.len(), 1);
        assert_eq!(transactions[0].amount, -4.50);
        assert_eq!(transactions[0].owner_id, PrincipalId::new("1"));
    }

    #[tokio::test]
    async fn created_sign_follows_type() {
        let (store, session, _) = get_store();
        session.apply(Some(&principal("1")));

        for (typed, kind) in [
            (100.0, TransactionType::Income),
            (-100.0, TransactionType::Income),
            (100.0, TransactionType::Expense),
            (-100.0, TransactionType::Expense),
        ] {
            let created = store
                .create_transaction(NewTransaction::new(
                    "Test",
                    typed,
                    Category::Shopping,
                    kind,
                    datetime!(2025-01-01 8:00 UTC),
                ))
                .await
                .unwrap();

            match kind {
                TransactionType::Income => assert!(created.amount >= 0.0),
                TransactionType::Expense => assert!(created.amount <= 0.0),
            }
        }

        for transaction in store.query_transactions().await.unwrap() {
            match transaction.kind {
                TransactionType::Income => assert!(transaction.amount >= 0.0),
                TransactionType::Expense => assert!(transaction.amount <= 0.0),
            }
        }
    }

    #[tokio::test]
    async fn query_returns_fifty_most_recent_newest_first() {
        let (store, session, _) = get_store();
        session.apply(Some(&principal("1")));

        for i in 0..60 {
            store
                .create_transaction(NewTransaction::new(
                    format!("Transaction {i}"),
                    i as f64,
                    Category::Income,
                    TransactionType::Income,
                    datetime!(2025-01-01 8:00 UTC),
                ))
                .await
                .unwrap();
        }

        let transactions = store.query_transactions().await.unwrap();

        assert_eq!(transactions.len(), RECENCY_WINDOW);
        let descriptions: Vec<_> = transactions
            .iter()
            .map(|transaction| transaction.description.clone())
            .collect();
        let want: Vec<_> = (10..60)
            .rev()
            .map(|i| format!("Transaction {i}"))
            .collect();
        assert_eq!(descriptions, want);
        assert!(
            transactions
                .windows(2)
                .all(|pair| pair[0].created_at > pair[1].created_at)
        );
    }

    #[tokio::test]
    async fn records_are_scoped_to_their_owner() {
        let (store, session, _) = get_store();
        session.apply(Some(&principal("1")));
        store.create_transaction(coffee()).await.unwrap();
        store
            .create_employee(NewEmployee::new(
                "Jane Doe",
                "Engineer",
                "R&D",
                90_000.0,
                "jane@example.com",
                PlaceholderMetrics::from_seed(1),
            ))
            .await
            .unwrap();

        session.apply(Some(&principal("2")));

        assert!(store.query_transactions().await.unwrap().is_empty());
        assert!(store.query_employees().await.unwrap().is_empty());

        session.apply(Some(&principal("1")));

        assert_eq!(store.query_transactions().await.unwrap().len(), 1);
        assert_eq!(store.query_employees().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn undecodable_documents_are_skipped() {
        let (store, session, documents) = get_store();
        session.apply(Some(&principal("1")));
        let Value::Object(junk) = json!({"description": "no amount"}) else {
            unreachable!()
        };
        documents
            .create(TRANSACTIONS, &PrincipalId::new("1"), junk)
            .unwrap();
        store.create_transaction(coffee()).await.unwrap();

        let transactions = store.query_transactions().await.unwrap();

        assert_eq!(transactions.len(), 1);
        assert_eq!(transactions[0].description, "Coffee");
    }

    #[tokio::test]
    async fn backend_failures_become_errors() {
        let session = SessionManager::new();
        session.apply(Some(&principal("1")));
        let store = RecordStore::new(Arc::new(FailingDocumentStore), session);

        assert!(matches!(
            store.create_transaction(coffee()).await,
            Err(WriteError::Backend(StoreError::Unavailable(_)))
        ));
        assert!(store.query_transactions().await.is_err());
        assert!(store.query_employees().await.is_err());
    }
}
