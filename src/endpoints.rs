//! The URIs the server responds to.

/// The landing page, which forwards signed-in users to the dashboard.
pub const ROOT: &str = "/";
/// The sign-in page.
pub const LOG_IN_VIEW: &str = "/log_in";
/// The sign-up page.
pub const REGISTER_VIEW: &str = "/register";
/// The dashboard overview section.
pub const DASHBOARD_VIEW: &str = "/dashboard";
/// The dashboard section listing transactions.
pub const DASHBOARD_TRANSACTIONS_VIEW: &str = "/dashboard/transactions";
/// The dashboard section listing employees.
pub const DASHBOARD_EMPLOYEES_VIEW: &str = "/dashboard/employees";
/// The dashboard section with the analytics chart.
pub const DASHBOARD_ANALYTICS_VIEW: &str = "/dashboard/analytics";
/// The page to display when an internal server error occurs.
pub const INTERNAL_ERROR_VIEW: &str = "/error";
/// The route for static files.
pub const STATIC: &str = "/static";

/// The route for signing in with an email and password.
pub const LOG_IN_API: &str = "/api/log_in";
/// The route for creating an account.
pub const SIGN_UP_API: &str = "/api/sign_up";
/// The route for signing in with a federated identity provider.
pub const FEDERATED_LOG_IN_API: &str = "/api/federated_log_in";
/// The route for the client to log out the current user.
pub const LOG_OUT: &str = "/api/log_out";
/// The route that opens the add transaction modal.
pub const TRANSACTION_MODAL: &str = "/api/modals/transaction";
/// The route that opens the add employee modal.
pub const EMPLOYEE_MODAL: &str = "/api/modals/employee";
/// The route that closes whichever modal is open.
pub const CLOSE_MODAL: &str = "/api/modals/close";
/// The route to create transactions.
pub const TRANSACTIONS_API: &str = "/api/transactions";
/// The route to create employees.
pub const EMPLOYEES_API: &str = "/api/employees";
