//! Application router configuration with protected and unprotected route definitions.

use axum::{
    Router, middleware,
    routing::{get, post},
};
use tower_http::services::ServeDir;

use crate::{
    AppState,
    auth::{
        auth_guard, auth_guard_hx, get_landing_page, get_log_in_page, get_log_out,
        get_register_page, post_federated_log_in, post_log_in, post_sign_up,
    },
    dashboard::{
        close_modal, create_employee, create_transaction, get_analytics_page,
        get_employee_modal, get_employees_page, get_overview_page, get_transaction_modal,
        get_transactions_page,
    },
    endpoints,
    internal_server_error::get_internal_server_error_page,
    not_found::get_404_not_found,
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let unprotected_routes = Router::new()
        .route(endpoints::ROOT, get(get_landing_page))
        .route(endpoints::LOG_IN_VIEW, get(get_log_in_page))
        .route(endpoints::LOG_IN_API, post(post_log_in))
        .route(endpoints::FEDERATED_LOG_IN_API, post(post_federated_log_in))
        .route(endpoints::REGISTER_VIEW, get(get_register_page))
        .route(endpoints::SIGN_UP_API, post(post_sign_up))
        .route(endpoints::LOG_OUT, get(get_log_out))
        .route(
            endpoints::INTERNAL_ERROR_VIEW,
            get(get_internal_server_error_page),
        );

    let protected_routes = Router::new()
        .route(endpoints::DASHBOARD_VIEW, get(get_overview_page))
        .route(
            endpoints::DASHBOARD_TRANSACTIONS_VIEW,
            get(get_transactions_page),
        )
        .route(endpoints::DASHBOARD_EMPLOYEES_VIEW, get(get_employees_page))
        .route(endpoints::DASHBOARD_ANALYTICS_VIEW, get(get_analytics_page))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_guard));

    // htmx requests need the HX-REDIRECT header for auth redirects to work properly.
    let protected_routes = protected_routes.merge(
        Router::new()
            .route(endpoints::TRANSACTION_MODAL, get(get_transaction_modal))
            .route(endpoints::EMPLOYEE_MODAL, get(get_employee_modal))
            .route(endpoints::CLOSE_MODAL, get(close_modal))
            .route(endpoints::TRANSACTIONS_API, post(create_transaction))
            .route(endpoints::EMPLOYEES_API, post(create_employee))
            .route_layer(middleware::from_fn_with_state(state.clone(), auth_guard_hx)),
    );

    protected_routes
        .merge(unprotected_routes)
        .nest_service(endpoints::STATIC, ServeDir::new("static/"))
        .fallback(get_404_not_found)
        .with_state(state)
}
