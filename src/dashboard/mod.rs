//! Dashboard module
//!
//! Loads the signed-in principal's records into the dashboard regions and
//! renders the overview, transactions, employees and analytics sections,
//! along with the modals for adding records.

mod aggregation;
mod charts;
mod forms;
mod handlers;
mod loader;
mod render;

pub use aggregation::{DashboardStats, EmployeeStats};
pub use charts::DashboardChart;
pub use forms::{
    close_modal, create_employee, create_transaction, get_employee_modal, get_transaction_modal,
};
pub use handlers::{
    get_analytics_page, get_employees_page, get_overview_page, get_transactions_page,
};
pub use loader::{DashboardState, load_dashboard};
