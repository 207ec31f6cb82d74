//! Transactions and employees, and the adapter that stores them for the
//! signed-in principal.

mod employee;
mod store;
mod transaction;

pub use employee::{Employee, NewEmployee, PlaceholderMetrics};
pub use store::{RECENCY_WINDOW, RecordStore, WriteError};

#[cfg(test)]
pub(crate) use store::EMPLOYEES;
pub use transaction::{Category, NewTransaction, Transaction, TransactionType};
