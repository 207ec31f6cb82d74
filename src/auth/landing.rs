//! The public landing page.

use axum::{
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::PrivateCookieJar;
use maud::{Markup, html};

use crate::{
    auth::{AuthState, cookie::holds_session},
    endpoints,
    html::{BUTTON_PRIMARY_STYLE, BUTTON_SECONDARY_STYLE, base_with_toast},
    navigation::Page,
    notification::current_toast,
};

const FEATURES: [(&str, &str, &str); 3] = [
    (
        "fa-exchange-alt",
        "Track transactions",
        "Record income and expenses and see where your money goes.",
    ),
    (
        "fa-users",
        "Manage employees",
        "Keep your team and payroll in one place.",
    ),
    (
        "fa-chart-pie",
        "See the big picture",
        "Balances, savings rate and monthly trends at a glance.",
    ),
];

fn landing_view() -> Markup {
    html! {
        main id="landing-page" class="flex flex-col items-center px-6 py-16 mx-auto max-w-screen-lg"
        {
            div class="flex items-center mb-6 text-4xl font-bold text-gray-900 dark:text-white"
            {
                i class="fas fa-chart-line mr-3 text-blue-600" {}
                "Finboard"
            }

            p class="mb-8 text-xl text-center text-gray-500 dark:text-gray-400"
            {
                "Personal and small business finances, in one dashboard."
            }

            div class="flex gap-4 mb-16"
            {
                a href=(endpoints::REGISTER_VIEW) id="get-started-btn" class={ "w-auto! " (BUTTON_PRIMARY_STYLE) }
                {
                    "Get Started"
                }
                a href=(endpoints::LOG_IN_VIEW) id="log-in-btn" class={ "w-auto! " (BUTTON_SECONDARY_STYLE) }
                {
                    "Log in"
                }
            }

            div class="grid grid-cols-1 md:grid-cols-3 gap-6 w-full"
            {
                @for (icon, title, description) in FEATURES {
                    div class="rounded-lg bg-white p-6 shadow dark:bg-gray-800"
                    {
                        i class={ "fas " (icon) " text-2xl text-blue-600 mb-3" } {}
                        h2 class="text-lg font-semibold mb-2 text-gray-900 dark:text-white" { (title) }
                        p class="text-gray-500 dark:text-gray-400" { (description) }
                    }
                }
            }
        }
    }
}

/// Display the landing page, or go straight to the dashboard when this
/// browser already holds the session.
pub async fn get_landing_page(State(state): State<AuthState>, jar: PrivateCookieJar) -> Response {
    if holds_session(&jar, &state.dashboard.session) {
        return Redirect::to(endpoints::DASHBOARD_VIEW).into_response();
    }

    match state.dashboard.view.lock() {
        Ok(mut view) => {
            view.show_page(Page::Landing);
        }
        Err(error) => tracing::error!("could not lock view state: {error}"),
    }

    base_with_toast(
        "Welcome",
        &[],
        &landing_view(),
        current_toast(&state.dashboard.notifier),
    )
    .into_response()
}

#[cfg(test)]
mod landing_page_tests {
    use axum::extract::{FromRef, State};
    use axum_extra::extract::PrivateCookieJar;
    use scraper::Selector;

    use crate::{
        auth::{AuthState, cookie::set_auth_cookie},
        backend::{Principal, PrincipalId},
        endpoints,
        navigation::Page,
        test_utils::{
            assert_redirect, assert_status_ok, assert_valid_html, parse_html_document,
            test_app_state, test_cookie_key,
        },
    };

    fn signed_in_state() -> AuthState {
        let state = AuthState::from_ref(&test_app_state());
        state.dashboard.session.apply(Some(&Principal {
            id: PrincipalId::new("1"),
            email: "jane@example.com".to_owned(),
            display_name: None,
        }));
        state
    }

    use super::get_landing_page;

    #[tokio::test]
    async fn shows_links_to_auth_pages() {
        let state = AuthState::from_ref(&test_app_state());

        let response =
            get_landing_page(State(state.clone()), PrivateCookieJar::new(test_cookie_key())).await;

        assert_status_ok(&response);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);

        let links: Vec<&str> = html
            .select(&Selector::parse("#landing-page a[href]").unwrap())
            .filter_map(|link| link.value().attr("href"))
            .collect();
        assert_eq!(links, [endpoints::REGISTER_VIEW, endpoints::LOG_IN_VIEW]);
        assert_eq!(state.dashboard.view.lock().unwrap().page(), Page::Landing);
    }

    #[tokio::test]
    async fn redirects_to_dashboard_when_signed_in() {
        let jar = set_auth_cookie(
            PrivateCookieJar::new(test_cookie_key()),
            &PrincipalId::new("1"),
        );

        let response = get_landing_page(State(signed_in_state()), jar).await;

        assert_redirect(&response, endpoints::DASHBOARD_VIEW);
    }

    #[tokio::test]
    async fn other_browsers_see_landing_page_while_someone_is_signed_in() {
        let response =
            get_landing_page(State(signed_in_state()), PrivateCookieJar::new(test_cookie_key()))
                .await;

        assert_status_ok(&response);
    }
}
