//! The add-transaction and add-employee modals and the endpoints their forms
//! post to.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use serde::Deserialize;
use time::OffsetDateTime;

use crate::{
    Error,
    dashboard::{DashboardState, loader::load_dashboard},
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, BUTTON_SECONDARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE,
        loading_spinner,
    },
    navigation::Modal,
    notification::{Severity, post_toast},
    records::{
        Category, NewEmployee, NewTransaction, PlaceholderMetrics, TransactionType, WriteError,
    },
};

/// Render the open modal over the dashboard.
pub fn modal_view(modal: Modal) -> Markup {
    let (title, form) = match modal {
        Modal::AddTransaction => ("Add Transaction", transaction_form()),
        Modal::AddEmployee => ("Add Employee", employee_form()),
    };

    html!(
        div id="modal" class="fixed inset-0 z-40 flex items-center justify-center"
        {
            div
                class="modal-backdrop absolute inset-0"
                hx-get={ (endpoints::CLOSE_MODAL) "?source=backdrop" }
                hx-target="#modal-container"
                hx-trigger="click"
            {}

            div class="relative z-50 w-full max-w-md rounded-lg bg-white p-6 shadow-xl dark:bg-gray-800"
            {
                div class="flex items-center justify-between mb-4"
                {
                    h2 class="text-xl font-bold" { (title) }

                    button
                        type="button"
                        class="close-modal text-gray-500 hover:text-gray-700 dark:hover:text-gray-300"
                        hx-get=(endpoints::CLOSE_MODAL)
                        hx-target="#modal-container"
                    {
                        i class="fas fa-times" {}
                    }
                }

                (form)
            }
        }
    )
}

fn transaction_form() -> Markup {
    html!(
        form
            id="transaction-form"
            hx-post=(endpoints::TRANSACTIONS_API)
            hx-disabled-elt="#transaction-submit"
            hx-indicator="#indicator"
            hx-target-error="#alert-container"
            class="space-y-4"
        {
            div
            {
                label for="description" class=(FORM_LABEL_STYLE) { "Description" }
                input
                    type="text"
                    name="description"
                    id="description"
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="amount" class=(FORM_LABEL_STYLE) { "Amount" }
                input
                    type="number"
                    name="amount"
                    id="amount"
                    step="0.01"
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="category" class=(FORM_LABEL_STYLE) { "Category" }
                select name="category" id="category" required class=(FORM_TEXT_INPUT_STYLE)
                {
                    @for category in Category::FORM_OPTIONS {
                        option value=(category) { (category) }
                    }
                }
            }

            div
            {
                label for="type" class=(FORM_LABEL_STYLE) { "Type" }
                select name="type" id="type" required class=(FORM_TEXT_INPUT_STYLE)
                {
                    option value=(TransactionType::Expense.as_str()) { "Expense" }
                    option value=(TransactionType::Income.as_str()) { "Income" }
                }
            }

            (modal_buttons("transaction-submit", "Add Transaction"))
        }
    )
}

fn employee_form() -> Markup {
    html!(
        form
            id="employee-form"
            hx-post=(endpoints::EMPLOYEES_API)
            hx-disabled-elt="#employee-submit"
            hx-indicator="#indicator"
            hx-target-error="#alert-container"
            class="space-y-4"
        {
            @for (name, label, input_type) in [
                ("name", "Full Name", "text"),
                ("position", "Position", "text"),
                ("department", "Department", "text"),
                ("email", "Email", "email"),
            ] {
                div
                {
                    label for=(name) class=(FORM_LABEL_STYLE) { (label) }
                    input
                        type=(input_type)
                        name=(name)
                        id=(name)
                        required
                        class=(FORM_TEXT_INPUT_STYLE);
                }
            }

            div
            {
                label for="salary" class=(FORM_LABEL_STYLE) { "Salary" }
                input
                    type="number"
                    name="salary"
                    id="salary"
                    min="0"
                    step="0.01"
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            (modal_buttons("employee-submit", "Add Employee"))
        }
    )
}

fn modal_buttons(submit_id: &str, submit_text: &str) -> Markup {
    html!(
        div class="flex gap-2 pt-2"
        {
            button
                type="button"
                class=(BUTTON_SECONDARY_STYLE)
                hx-get=(endpoints::CLOSE_MODAL)
                hx-target="#modal-container"
            {
                "Cancel"
            }

            button type="submit" id=(submit_id) tabindex="0" class=(BUTTON_PRIMARY_STYLE)
            {
                span class="inline htmx-indicator" id="indicator"
                {
                    (loading_spinner())
                }
                (submit_text)
            }
        }
    )
}

/// Open the add-transaction modal.
pub async fn get_transaction_modal(State(state): State<DashboardState>) -> Response {
    open_modal(&state, Modal::AddTransaction)
}

/// Open the add-employee modal.
pub async fn get_employee_modal(State(state): State<DashboardState>) -> Response {
    open_modal(&state, Modal::AddEmployee)
}

fn open_modal(state: &DashboardState, modal: Modal) -> Response {
    let opened = match state.view.lock() {
        Ok(mut view) => view.open_modal(modal),
        Err(error) => {
            tracing::error!("could not lock view state: {error}");
            return Error::LockError("view state").into_alert_response();
        }
    };

    if !opened {
        tracing::debug!("ignoring request to open {modal:?} outside the dashboard");
        return html!().into_response();
    }

    modal_view(modal).into_response()
}

/// Where a request to close the modal came from.
#[derive(Debug, Default, Deserialize)]
pub struct CloseModalQuery {
    /// "backdrop" when the click landed outside the dialog.
    #[serde(default)]
    pub source: Option<String>,
}

/// Close the open modal.
///
/// Clicks on the backdrop only close the modal when they land on the backdrop
/// itself, which the request marks with `source=backdrop`.
pub async fn close_modal(
    State(state): State<DashboardState>,
    Query(query): Query<CloseModalQuery>,
) -> Response {
    match state.view.lock() {
        Ok(mut view) => {
            if query.source.as_deref() == Some("backdrop") {
                view.backdrop_click();
            } else {
                view.close_modal();
            }
        }
        Err(error) => {
            tracing::error!("could not lock view state: {error}");
            return Error::LockError("view state").into_alert_response();
        }
    }

    html!().into_response()
}

/// The fields of the add-transaction form.
#[derive(Debug, Deserialize)]
pub struct TransactionForm {
    /// What the transaction was for.
    pub description: String,
    /// The unsigned amount; the type decides the sign.
    pub amount: f64,
    /// The category's display name.
    pub category: String,
    /// Income or expense.
    #[serde(rename = "type")]
    pub kind: TransactionType,
}

/// Store a new transaction for the signed-in principal.
pub async fn create_transaction(
    State(state): State<DashboardState>,
    Form(form): Form<TransactionForm>,
) -> Response {
    let transaction = NewTransaction::new(
        form.description.trim(),
        form.amount,
        Category::from(form.category),
        form.kind,
        OffsetDateTime::now_utc(),
    );

    match state.records.create_transaction(transaction).await {
        Ok(transaction) => {
            tracing::info!("created transaction {}", transaction.id);
            finish_write(&state, "Transaction added successfully!").await
        }
        Err(error) => write_failed(&state, error, "Error adding transaction"),
    }
}

/// The fields of the add-employee form.
#[derive(Debug, Deserialize)]
pub struct EmployeeForm {
    /// Full name.
    pub name: String,
    /// Job title.
    pub position: String,
    /// Department name.
    pub department: String,
    /// Yearly salary.
    pub salary: f64,
    /// Contact email address.
    pub email: String,
}

/// Store a new employee for the signed-in principal.
pub async fn create_employee(
    State(state): State<DashboardState>,
    Form(form): Form<EmployeeForm>,
) -> Response {
    let employee = NewEmployee::new(
        form.name.trim(),
        form.position.trim(),
        form.department.trim(),
        form.salary,
        form.email.trim(),
        PlaceholderMetrics::from_clock(),
    );

    match state.records.create_employee(employee).await {
        Ok(employee) => {
            tracing::info!("created employee {}", employee.id);
            finish_write(&state, "Employee added successfully!").await
        }
        Err(error) => write_failed(&state, error, "Error adding employee"),
    }
}

/// Toast the success, close the modal, reload the dashboard and redirect to
/// the section that is on screen.
async fn finish_write(state: &DashboardState, message: &str) -> Response {
    post_toast(&state.notifier, message, Severity::Success);

    let endpoint = match state.view.lock() {
        Ok(mut view) => {
            view.close_modal();
            view.section().endpoint()
        }
        Err(error) => {
            tracing::error!("could not lock view state: {error}");
            return Error::LockError("view state").into_alert_response();
        }
    };

    load_dashboard(state).await;

    (HxRedirect(endpoint.to_owned()), StatusCode::SEE_OTHER).into_response()
}

fn write_failed(state: &DashboardState, error: WriteError, message: &str) -> Response {
    let (status, message) = match error {
        WriteError::NoSession => (StatusCode::UNAUTHORIZED, "Please login first".to_owned()),
        WriteError::NotFinite(field) => {
            tracing::warn!("{message}: {error}");
            (
                StatusCode::UNPROCESSABLE_ENTITY,
                format!("{message}: the {field} must be a number"),
            )
        }
        error => {
            tracing::error!("{message}: {error}");
            (StatusCode::INTERNAL_SERVER_ERROR, message.to_owned())
        }
    };

    let severity = match status {
        StatusCode::UNAUTHORIZED => Severity::Warning,
        _ => Severity::Error,
    };

    (status, post_toast(&state.notifier, message, severity).into_html()).into_response()
}


#[cfg(test)]
mod create_record_tests {
    use axum::{extract::State, http::StatusCode};
    use axum_extra::extract::Form;

    use crate::{
        backend::{Principal, PrincipalId},
        dashboard::DashboardState,
        endpoints,
        navigation::{Modal, Page, Section},
        notification::{Severity, current_toast},
        records::TransactionType,
        test_utils::{assert_hx_redirect, test_app_state},
    };

    use super::{EmployeeForm, TransactionForm, create_employee, create_transaction};

    fn signed_in_state() -> DashboardState {
        let state = DashboardState::from_app_state(&test_app_state());
        state.session.apply(Some(&Principal {
            id: PrincipalId::new("1"),
            email: "jane@example.com".to_owned(),
            display_name: None,
        }));
        state
    }

    fn coffee() -> TransactionForm {
        TransactionForm {
            description: "Coffee".to_owned(),
            amount: 4.5,
            category: "Food & Dining".to_owned(),
            kind: TransactionType::Expense,
        }
    }

    #[tokio::test]
    async fn stores_transaction_and_redirects_to_section() {
        let state = signed_in_state();
        {
            let mut view = state.view.lock().unwrap();
            view.show_page(Page::Dashboard);
            view.show_section(Section::Transactions);
            view.open_modal(Modal::AddTransaction);
        }

        let response = create_transaction(State(state.clone()), Form(coffee())).await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, endpoints::DASHBOARD_TRANSACTIONS_VIEW);
        assert_eq!(state.view.lock().unwrap().modal(), None);

        let transactions = state.records.query_transactions().await.unwrap();
        assert_eq!(transactions.len(), 1);
        assert_eq!(transactions[0].amount, -4.5);

        let toast = current_toast(&state.notifier).expect("no toast");
        assert_eq!(toast.message, "Transaction added successfully!");

        let view = state.view.lock().unwrap();
        assert_eq!(view.regions().transactions.as_ref().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn rejects_non_numeric_amount_without_storing() {
        let state = signed_in_state();

        let response = create_transaction(
            State(state.clone()),
            Form(TransactionForm {
                amount: f64::NAN,
                ..coffee()
            }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(response.headers().get("hx-redirect").is_none());
        assert!(state.records.query_transactions().await.unwrap().is_empty());

        let toast = current_toast(&state.notifier).expect("no toast");
        assert_eq!(
            toast.message,
            "Error adding transaction: the amount must be a number"
        );
        assert_eq!(toast.severity, Severity::Error);
    }

    #[tokio::test]
    async fn stores_employee() {
        let state = signed_in_state();

        let response = create_employee(
            State(state.clone()),
            Form(EmployeeForm {
                name: "Ada Lovelace".to_owned(),
                position: "Engineer".to_owned(),
                department: "R&D".to_owned(),
                salary: 120000.0,
                email: "ada@example.com".to_owned(),
            }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let employees = state.records.query_employees().await.unwrap();
        assert_eq!(employees.len(), 1);
        assert_eq!(employees[0].name, "Ada Lovelace");
        assert!((85..100).contains(&employees[0].metrics.performance));
    }

    #[tokio::test]
    async fn write_without_session_warns() {
        let state = DashboardState::from_app_state(&test_app_state());

        let response = create_transaction(State(state.clone()), Form(coffee())).await;

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let toast = current_toast(&state.notifier).expect("no toast");
        assert_eq!(toast.message, "Please login first");
    }
}
