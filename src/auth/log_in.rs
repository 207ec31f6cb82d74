//! This file defines the routes for displaying the log-in page and handling
//! email and federated log-in requests.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::{Form, PrivateCookieJar};
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use serde::{Deserialize, Serialize};

use crate::{
    auth::{AuthState, cookie::set_auth_cookie, sign_in_with},
    backend::FederatedProvider,
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, BUTTON_SECONDARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE,
        LINK_STYLE, base_with_toast, loading_spinner, log_in_register, password_input,
    },
    navigation::Page,
    notification::{Severity, current_toast, post_toast},
};

fn log_in_form(email: &str, error_message: Option<&str>) -> Markup {
    html! {
        form
            id="log-in-form"
            hx-post=(endpoints::LOG_IN_API)
            hx-swap="outerHTML"
            hx-indicator="#indicator"
            hx-disabled-elt="#email, #password, #submit-button"
            class="space-y-4 md:space-y-6"
        {
            div
            {
                label for="email" class=(FORM_LABEL_STYLE) { "Email" }
                input
                    type="email"
                    name="email"
                    id="email"
                    value=(email)
                    placeholder="name@example.com"
                    autocomplete="email"
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            (password_input(0, None))

            @if let Some(error_message) = error_message
            {
                p class="text-red-500 text-base" { (error_message) }
            }

            button type="submit" id="submit-button" tabindex="0" class=(BUTTON_PRIMARY_STYLE)
            {
                span class="inline htmx-indicator" id="indicator"
                {
                    (loading_spinner())
                }
                "Log in"
            }

            p class="text-sm font-light text-gray-500 dark:text-gray-400"
            {
                "Don't have an account? "
                a href=(endpoints::REGISTER_VIEW) tabindex="0" class=(LINK_STYLE)
                {
                    "Register here"
                }
            }
        }
    }
}

/// The "Sign in with Google" button, shared by the log-in and register pages.
pub(super) fn federated_log_in_form() -> Markup {
    html! {
        div class="flex items-center gap-x-3 text-sm text-gray-500 dark:text-gray-400"
        {
            hr class="flex-1 border-gray-300 dark:border-gray-600";
            "or"
            hr class="flex-1 border-gray-300 dark:border-gray-600";
        }

        form
            id="federated-log-in-form"
            hx-post=(endpoints::FEDERATED_LOG_IN_API)
            hx-swap="none"
            hx-disabled-elt="#google-button"
        {
            button type="submit" id="google-button" tabindex="0" class=(BUTTON_SECONDARY_STYLE)
            {
                i class="fab fa-google mr-2" {}
                "Sign in with Google"
            }
        }
    }
}

/// Display the log-in page.
pub async fn get_log_in_page(State(state): State<AuthState>) -> Response {
    show_auth_page(&state);

    let form = html! {
        (log_in_form("", None))
        (federated_log_in_form())
    };
    let content = log_in_register("Log in to your account", &form);

    base_with_toast(
        "Log In",
        &[],
        &content,
        current_toast(&state.dashboard.notifier),
    )
    .into_response()
}

/// Mark the sign-in and sign-up forms as being on screen.
pub(super) fn show_auth_page(state: &AuthState) {
    match state.dashboard.view.lock() {
        Ok(mut view) => {
            view.show_page(Page::Auth);
        }
        Err(error) => tracing::error!("could not lock view state: {error}"),
    }
}

/// The raw data entered by the user in the log-in form.
///
/// The password is stored as a plain string. There is no need for validation
/// here since the identity provider checks it against the stored hash.
#[derive(Clone, Serialize, Deserialize)]
pub struct LogInData {
    /// Email entered during log-in.
    pub email: String,
    /// Password entered during log-in.
    pub password: String,
}

/// Handler for log-in requests via the POST method.
///
/// On a successful log-in the session starts, the auth cookie is set, a
/// welcome toast is posted and the client is redirected to the dashboard.
/// Otherwise, the form is returned with the provider's error message and an
/// error toast.
pub async fn post_log_in(
    State(state): State<AuthState>,
    jar: PrivateCookieJar,
    Form(user_data): Form<LogInData>,
) -> Response {
    let email = user_data.email.trim().to_owned();
    let password = user_data.password;

    let result = {
        let email = email.clone();
        sign_in_with(&state, move |identity| identity.sign_in(&email, &password)).await
    };

    match result {
        Ok(principal) => {
            post_toast(&state.dashboard.notifier, "Welcome back!", Severity::Success);

            (
                StatusCode::SEE_OTHER,
                HxRedirect(endpoints::DASHBOARD_VIEW.to_owned()),
                set_auth_cookie(jar, &principal.id),
            )
                .into_response()
        }
        Err(error) => {
            tracing::warn!("log-in failed: {error}");
            let message = error.user_message();
            let toast = post_toast(&state.dashboard.notifier, message, Severity::Error);

            html! {
                (log_in_form(&email, Some(message)))
                (toast.into_oob_html())
            }
            .into_response()
        }
    }
}

/// Handler for "Sign in with Google".
///
/// On failure only the error toast is returned, swapped in out-of-band.
pub async fn post_federated_log_in(
    State(state): State<AuthState>,
    jar: PrivateCookieJar,
) -> Response {
    let result = sign_in_with(&state, |identity| {
        identity.sign_in_federated(FederatedProvider::Google)
    })
    .await;

    match result {
        Ok(principal) => {
            post_toast(
                &state.dashboard.notifier,
                "Signed in with Google successfully!",
                Severity::Success,
            );

            (
                StatusCode::SEE_OTHER,
                HxRedirect(endpoints::DASHBOARD_VIEW.to_owned()),
                set_auth_cookie(jar, &principal.id),
            )
                .into_response()
        }
        Err(error) => {
            tracing::warn!("federated log-in failed: {error}");
            post_toast(
                &state.dashboard.notifier,
                error.user_message(),
                Severity::Error,
            )
            .into_oob_html()
            .into_response()
        }
    }
}
