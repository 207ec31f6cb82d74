//! Authentication middleware that turns away requests from browsers that do
//! not hold the active session.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::PrivateCookieJar;
use axum_htmx::HxRedirect;

use crate::{
    auth::{AuthGuardState, cookie::holds_session},
    endpoints,
    notification::{Severity, post_toast},
};

/// The message shown when a protected route is requested while signed out.
pub const LOG_IN_FIRST_MSG: &str = "Please login first";

#[inline]
async fn auth_guard_internal(
    state: AuthGuardState,
    request: Request,
    next: Next,
    get_redirect: impl Fn(&str) -> Response,
) -> Response {
    let (mut parts, body) = request.into_parts();
    let is_holder = match PrivateCookieJar::from_request_parts(&mut parts, &state).await {
        Ok(jar) => holds_session(&jar, &state.session),
        Err(error) => {
            tracing::error!("Error getting cookie jar: {error:?}. Redirecting to log in page.");
            false
        }
    };

    if is_holder {
        return next.run(Request::from_parts(parts, body)).await;
    }

    tracing::debug!(
        "no session cookie for {}, redirecting to log in",
        parts.uri.path()
    );
    post_toast(&state.notifier, LOG_IN_FIRST_MSG, Severity::Warning);

    get_redirect(endpoints::LOG_IN_VIEW)
}

/// Middleware function that checks the auth cookie names the active session.
/// The request is executed normally if it does, otherwise a redirect to the
/// log-in page is returned.
pub async fn auth_guard(
    State(state): State<AuthGuardState>,
    request: Request,
    next: Next,
) -> Response {
    auth_guard_internal(state, request, next, |redirect_url| {
        Redirect::to(redirect_url).into_response()
    })
    .await
}

/// Middleware function that checks the auth cookie names the active session.
/// The request is executed normally if it does, otherwise a HTMX redirect to
/// the log-in page is returned.
pub async fn auth_guard_hx(
    State(state): State<AuthGuardState>,
    request: Request,
    next: Next,
) -> Response {
    auth_guard_internal(state, request, next, |redirect_url| {
        (HxRedirect(redirect_url.to_owned()), StatusCode::OK).into_response()
    })
    .await
}
