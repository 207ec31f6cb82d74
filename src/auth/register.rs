//! The sign-up page and the endpoint that creates an account.

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
    auth::{
        AuthState,
        cookie::set_auth_cookie,
        log_in::{federated_log_in_form, show_auth_page},
        sign_in_with,
    },
    backend::MIN_PASSWORD_LENGTH,
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, LINK_STYLE,
        base_with_toast, loading_spinner, log_in_register, password_input,
    },
    notification::{Severity, current_toast, post_toast},
};

fn register_form(data: Option<&SignUpData>, error_message: Option<&str>) -> Markup {
    let email = data.map_or("", |data| data.email.as_str());
    let display_name = data
        .and_then(|data| data.display_name.as_deref())
        .unwrap_or_default();

    html! {
        form
            id="register-form"
            hx-post=(endpoints::SIGN_UP_API)
            hx-swap="outerHTML"
            hx-indicator="#indicator"
            hx-disabled-elt="#display_name, #email, #password, #submit-button"
            class="space-y-4 md:space-y-6"
        {
            div
            {
                label for="display_name" class=(FORM_LABEL_STYLE) { "Full Name" }
                input
                    type="text"
                    name="display_name"
                    id="display_name"
                    value=(display_name)
                    placeholder="Jane Doe"
                    autocomplete="name"
                    class=(FORM_TEXT_INPUT_STYLE);
            }

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

            (password_input(MIN_PASSWORD_LENGTH, None))

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
                "Create account"
            }

            p class="text-sm font-light text-gray-500 dark:text-gray-400"
            {
                "Already have an account? "
                a href=(endpoints::LOG_IN_VIEW) tabindex="0" class=(LINK_STYLE)
                {
                    "Log in here"
                }
            }
        }
    }
}

/// Display the sign-up page.
pub async fn get_register_page(State(state): State<AuthState>) -> Response {
    show_auth_page(&state);

    let form = html! {
        (register_form(None, None))
        (federated_log_in_form())
    };
    let content = log_in_register("Create your account", &form);

    base_with_toast(
        "Register",
        &[],
        &content,
        current_toast(&state.dashboard.notifier),
    )
    .into_response()
}

/// The raw data entered by the user in the sign-up form.
#[derive(Clone, Serialize, Deserialize)]
pub struct SignUpData {
    /// The name to greet the user by. Blank means none.
    #[serde(default)]
    pub display_name: Option<String>,
    /// Email to sign up with.
    pub email: String,
    /// Password to sign up with, checked by the identity provider.
    pub password: String,
}

/// Handler for sign-up requests via the POST method.
///
/// A new account is signed in straight away and the client is redirected to
/// the dashboard. Otherwise, the form is returned with the provider's error
/// message and an error toast.
pub async fn post_sign_up(
    State(state): State<AuthState>,
    jar: PrivateCookieJar,
    Form(user_data): Form<SignUpData>,
) -> Response {
    let user_data = SignUpData {
        display_name: user_data
            .display_name
            .map(|name| name.trim().to_owned())
            .filter(|name| !name.is_empty()),
        email: user_data.email.trim().to_owned(),
        password: user_data.password,
    };

    let result = {
        let user_data = user_data.clone();
        sign_in_with(&state, move |identity| {
            identity.sign_up(
                &user_data.email,
                &user_data.password,
                user_data.display_name.as_deref(),
            )
        })
        .await
    };

    match result {
        Ok(principal) => {
            tracing::info!("created account for {}", principal.email);
            post_toast(
                &state.dashboard.notifier,
                "Account created successfully!",
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
            tracing::warn!("sign-up failed: {error}");
            let message = error.user_message();
            let toast = post_toast(&state.dashboard.notifier, message, Severity::Error);

            html! {
                (register_form(Some(&user_data), Some(message)))
                (toast.into_oob_html())
            }
            .into_response()
        }
    }
}
