//! The employee record, its document encoding, and its placeholder metrics.

use std::ops::Range;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::OffsetDateTime;

use crate::backend::{DocumentId, OrderingToken, PrincipalId, StoredDocument};

/// The range placeholder performance scores are drawn from.
pub const PERFORMANCE_RANGE: Range<u8> = 85..100;
/// The range placeholder attendance scores are drawn from.
pub const ATTENDANCE_RANGE: Range<u8> = 90..100;

/// Stand-in performance and attendance scores.
///
/// These are seed values assigned when an employee is created. Nothing
/// measures them, and they must not be presented as real data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaceholderMetrics {
    /// A percentage in [PERFORMANCE_RANGE].
    pub performance: u8,
    /// A percentage in [ATTENDANCE_RANGE].
    pub attendance: u8,
}

impl PlaceholderMetrics {
    /// Derive metrics from `seed`. The same seed always gives the same metrics.
    pub fn from_seed(seed: u64) -> Self {
        let mut state = seed;
        let performance = pick(&mut state, PERFORMANCE_RANGE);
        let attendance = pick(&mut state, ATTENDANCE_RANGE);

        Self {
            performance,
            attendance,
        }
    }

    /// Derive metrics seeded from the current time.
    pub fn from_clock() -> Self {
        let nanos = OffsetDateTime::now_utc().unix_timestamp_nanos();

        Self::from_seed(nanos as u64)
    }
}

fn pick(state: &mut u64, range: Range<u8>) -> u8 {
    let span = u64::from(range.end - range.start);

    range.start + (splitmix64(state) % span) as u8
}

/// One step of the SplitMix64 generator.
fn splitmix64(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9E37_79B9_7F4A_7C15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(super) struct EmployeeDocument {
    pub name: String,
    pub position: String,
    pub department: String,
    pub salary: f64,
    pub email: String,
    pub performance: u8,
    pub attendance: u8,
}

/// An employee that has not been stored yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewEmployee {
    name: String,
    position: String,
    department: String,
    salary: f64,
    email: String,
    metrics: PlaceholderMetrics,
}

impl NewEmployee {
    /// Create an employee record. Negative salaries are clamped to zero.
    pub fn new(
        name: impl Into<String>,
        position: impl Into<String>,
        department: impl Into<String>,
        salary: f64,
        email: impl Into<String>,
        metrics: PlaceholderMetrics,
    ) -> Self {
        Self {
            name: name.into(),
            position: position.into(),
            department: department.into(),
            salary: salary.max(0.0),
            email: email.into(),
            metrics,
        }
    }

    /// The salary that will be stored.
    pub fn salary(&self) -> f64 {
        self.salary
    }

    pub(super) fn into_document(self) -> EmployeeDocument {
        EmployeeDocument {
            name: self.name,
            position: self.position,
            department: self.department,
            salary: self.salary,
            email: self.email,
            performance: self.metrics.performance,
            attendance: self.metrics.attendance,
        }
    }
}

/// A person on the payroll, owned by the principal that recorded them.
#[derive(Debug, Clone, PartialEq)]
pub struct Employee {
    /// The store-assigned identifier.
    pub id: DocumentId,
    /// The principal that recorded the employee.
    pub owner_id: PrincipalId,
    /// Full name.
    pub name: String,
    /// Job title.
    pub position: String,
    /// Department name.
    pub department: String,
    /// Yearly salary, never negative.
    pub salary: f64,
    /// Contact email address.
    pub email: String,
    /// Placeholder scores assigned at creation.
    pub metrics: PlaceholderMetrics,
    /// When the employee was stored, relative to other records.
    pub created_at: OrderingToken,
}

impl Employee {
    /// Decode a stored employee document.
    ///
    /// # Errors
    ///
    /// Returns an error if the document body is not an employee.
    pub fn from_document(document: StoredDocument) -> Result<Self, serde_json::Error> {
        let body: EmployeeDocument = serde_json::from_value(Value::Object(document.data))?;

        Ok(Self {
            id: document.id,
            owner_id: document.owner_id,
            name: body.name,
            position: body.position,
            department: body.department,
            salary: body.salary,
            email: body.email,
            metrics: PlaceholderMetrics {
                performance: body.performance,
                attendance: body.attendance,
            },
            created_at: document.created_at,
        })
    }
}
