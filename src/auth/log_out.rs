//! Log-out route handler that ends the session and redirects users.

use axum::{
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::PrivateCookieJar;

use crate::{
    auth::{
        AuthState,
        cookie::{holds_session, invalidate_auth_cookie},
        run_identity,
    },
    endpoints,
    navigation::Page,
    notification::{Severity, post_toast},
    session::handle_session_change,
};

/// End the session and redirect the client to the landing page.
///
/// Only the browser holding the session can end it; any other browser just
/// has its auth cookie cleared. If the identity provider refuses, the session
/// is kept and the client goes back to the dashboard with an error toast.
pub async fn get_log_out(State(state): State<AuthState>, jar: PrivateCookieJar) -> Response {
    if !holds_session(&jar, &state.dashboard.session) {
        return (invalidate_auth_cookie(jar), Redirect::to(endpoints::ROOT)).into_response();
    }

    if let Err(error) = run_identity(&state.identity, |identity| identity.sign_out()).await {
        tracing::error!("could not sign out: {error}");
        post_toast(
            &state.dashboard.notifier,
            "Error logging out",
            Severity::Error,
        );

        return Redirect::to(endpoints::DASHBOARD_VIEW).into_response();
    }

    handle_session_change(&state.dashboard, None).await;

    match state.dashboard.view.lock() {
        Ok(mut view) => {
            view.show_page(Page::Landing);
        }
        Err(error) => tracing::error!("could not lock view state: {error}"),
    }

    post_toast(
        &state.dashboard.notifier,
        "Logged out successfully",
        Severity::Success,
    );

    (invalidate_auth_cookie(jar), Redirect::to(endpoints::ROOT)).into_response()
}
