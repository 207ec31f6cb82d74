//! A document store backed by a single SQLite table.

use std::sync::{Arc, Mutex};

use rusqlite::Connection;
use serde_json::{Map, Value};

use crate::backend::{
    DocumentId, DocumentQuery, DocumentStore, Order, OrderingToken, PrincipalId, StoreError,
    StoredDocument,
};

/// Documents live in the `document` table. The autoincrement row ID doubles
/// as the ordering token since SQLite never reuses or decreases it.
#[derive(Debug, Clone)]
pub struct SqliteDocumentStore {
    connection: Arc<Mutex<Connection>>,
}

impl SqliteDocumentStore {
    /// Create the document table if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the table cannot be created.
    pub fn new(connection: Arc<Mutex<Connection>>) -> Result<Self, StoreError> {
        {
            let connection = connection.lock().map_err(|_| StoreError::Lock)?;
            create_document_table(&connection)?;
        }

        Ok(Self { connection })
    }
}

impl DocumentStore for SqliteDocumentStore {
    fn create(
        &self,
        collection: &str,
        owner_id: &PrincipalId,
        data: Map<String, Value>,
    ) -> Result<StoredDocument, StoreError> {
        let text = serde_json::to_string(&data)?;

        let connection = self.connection.lock().map_err(|_| StoreError::Lock)?;
        connection.execute(
            "INSERT INTO document (collection, owner_id, data) VALUES (?1, ?2, ?3)",
            (collection, owner_id.as_str(), &text),
        )?;

        let id = connection.last_insert_rowid();

        Ok(StoredDocument {
            id: DocumentId::new(id),
            owner_id: owner_id.clone(),
            created_at: OrderingToken::new(id),
            data,
        })
    }

    fn query(
        &self,
        collection: &str,
        query: &DocumentQuery,
    ) -> Result<Vec<StoredDocument>, StoreError> {
        let order_clause = match query.order {
            Some(Order::CreatedAtDescending) => "ORDER BY id DESC",
            Some(Order::CreatedAtAscending) => "ORDER BY id ASC",
            None => "",
        };
        // A negative limit means no limit in SQLite.
        let limit = query
            .limit
            .map(|limit| i64::try_from(limit).unwrap_or(i64::MAX))
            .unwrap_or(-1);

        let connection = self.connection.lock().map_err(|_| StoreError::Lock)?;
        let mut statement = connection.prepare(&format!(
            "SELECT id, owner_id, data FROM document
            WHERE collection = ?1 AND owner_id = ?2
            {order_clause}
            LIMIT ?3"
        ))?;

        let rows = statement
            .query_map((collection, query.owner_id.as_str(), limit), |row| {
                let id: i64 = row.get(0)?;
                let owner_id: String = row.get(1)?;
                let data: String = row.get(2)?;

                Ok((id, owner_id, data))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(id, owner_id, data)| {
                Ok(StoredDocument {
                    id: DocumentId::new(id),
                    owner_id: PrincipalId::new(owner_id),
                    created_at: OrderingToken::new(id),
                    data: serde_json::from_str(&data)?,
                })
            })
            .collect()
    }
}

/// Create the document table and its lookup index.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
fn create_document_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS document (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                collection TEXT NOT NULL,
                owner_id TEXT NOT NULL,
                data TEXT NOT NULL
                )",
        (),
    )?;

    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_document_owner
            ON document(collection, owner_id, id)",
        (),
    )?;

    Ok(())
}
