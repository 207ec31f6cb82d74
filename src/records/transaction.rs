//! The transaction record and its document encoding.

use std::fmt::Display;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::OffsetDateTime;

use crate::backend::{DocumentId, OrderingToken, PrincipalId, StoredDocument};

/// What a transaction was for.
///
/// Unknown names are kept verbatim in [Category::Other] so that documents
/// written by other clients still round-trip.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Category {
    /// "Food & Dining"
    FoodAndDining,
    /// "Transportation"
    Transportation,
    /// "Shopping"
    Shopping,
    /// "Entertainment"
    Entertainment,
    /// "Utilities"
    Utilities,
    /// "Income"
    Income,
    /// Any other category name, including "Other".
    Other(String),
}

impl Category {
    /// The categories offered in the transaction form, in display order.
    pub const FORM_OPTIONS: [&'static str; 7] = [
        "Food & Dining",
        "Transportation",
        "Shopping",
        "Entertainment",
        "Utilities",
        "Income",
        "Other",
    ];

    /// The display name of the category.
    pub fn as_str(&self) -> &str {
        match self {
            Category::FoodAndDining => "Food & Dining",
            Category::Transportation => "Transportation",
            Category::Shopping => "Shopping",
            Category::Entertainment => "Entertainment",
            Category::Utilities => "Utilities",
            Category::Income => "Income",
            Category::Other(name) => name,
        }
    }
}

impl From<&str> for Category {
    fn from(value: &str) -> Self {
        match value {
            "Food & Dining" => Category::FoodAndDining,
            "Transportation" => Category::Transportation,
            "Shopping" => Category::Shopping,
            "Entertainment" => Category::Entertainment,
            "Utilities" => Category::Utilities,
            "Income" => Category::Income,
            other => Category::Other(other.to_owned()),
        }
    }
}

impl From<String> for Category {
    fn from(value: String) -> Self {
        Category::from(value.as_str())
    }
}

impl From<Category> for String {
    fn from(value: Category) -> Self {
        value.as_str().to_owned()
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Whether money came in or went out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// Money received.
    Income,
    /// Money spent.
    Expense,
}

impl TransactionType {
    /// Sign `amount` to agree with the type, ignoring the sign it was typed
    /// with: income is never negative and expenses are never positive.
    pub fn signed_amount(self, amount: f64) -> f64 {
        match self {
            TransactionType::Income => amount.abs(),
            TransactionType::Expense => -amount.abs(),
        }
    }

    /// The lowercase name used in forms and documents.
    pub fn as_str(self) -> &'static str {
        match self {
            TransactionType::Income => "income",
            TransactionType::Expense => "expense",
        }
    }
}

/// The body of a transaction document.
///
/// The owner and creation token are stamped by the store and kept outside the
/// body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(super) struct TransactionDocument {
    pub description: String,
    pub amount: f64,
    pub category: Category,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub date: Option<OffsetDateTime>,
}

/// A transaction that has not been stored yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    description: String,
    amount: f64,
    category: Category,
    kind: TransactionType,
    occurred_at: OffsetDateTime,
}

impl NewTransaction {
    /// Create a transaction whose amount is signed by `kind`.
    pub fn new(
        description: impl Into<String>,
        amount: f64,
        category: Category,
        kind: TransactionType,
        occurred_at: OffsetDateTime,
    ) -> Self {
        Self {
            description: description.into(),
            amount: kind.signed_amount(amount),
            category,
            kind,
            occurred_at,
        }
    }

    /// The signed amount that will be stored.
    pub fn amount(&self) -> f64 {
        self.amount
    }

    pub(super) fn into_document(self) -> TransactionDocument {
        TransactionDocument {
            description: self.description,
            amount: self.amount,
            category: self.category,
            kind: self.kind,
            date: Some(self.occurred_at),
        }
    }
}

/// An income or expense event, owned by the principal that recorded it.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    /// The store-assigned identifier.
    pub id: DocumentId,
    /// The principal that recorded the transaction.
    pub owner_id: PrincipalId,
    /// A short free-text description.
    pub description: String,
    /// Positive for income, negative for expenses.
    pub amount: f64,
    /// What the transaction was for.
    pub category: Category,
    /// Income or expense.
    pub kind: TransactionType,
    /// When the transaction happened, if recorded.
    pub occurred_at: Option<OffsetDateTime>,
    /// When the transaction was stored, relative to other records.
    pub created_at: OrderingToken,
}

impl Transaction {
    /// Decode a stored transaction document.
    ///
    /// # Errors
    ///
    /// Returns an error if the document body is not a transaction.
    pub fn from_document(document: StoredDocument) -> Result<Self, serde_json::Error> {
        let body: TransactionDocument = serde_json::from_value(Value::Object(document.data))?;

        Ok(Self {
            id: document.id,
            owner_id: document.owner_id,
            description: body.description,
            amount: body.amount,
            category: body.category,
            kind: body.kind,
            occurred_at: body.date,
            created_at: document.created_at,
        })
    }
}
