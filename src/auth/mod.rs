//! Signing up, in and out, the public pages that go with them, and the
//! middleware that keeps signed-out users off the dashboard.

use std::sync::{Arc, Mutex};

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;

use crate::{
    AppState,
    backend::{AuthError, AuthErrorCode, IdentityProvider, Principal},
    dashboard::DashboardState,
    notification::Notifier,
    session::{SessionManager, handle_session_change},
};

mod cookie;
mod landing;
mod log_in;
mod log_out;
mod middleware;
mod register;

pub use landing::get_landing_page;
pub use log_in::{get_log_in_page, post_federated_log_in, post_log_in};
pub use log_out::get_log_out;
pub use middleware::{auth_guard, auth_guard_hx};
pub use register::{get_register_page, post_sign_up};

/// The state needed to sign principals in and out.
#[derive(Clone)]
pub struct AuthState {
    /// Signs principals in and out.
    pub identity: Arc<dyn IdentityProvider>,
    /// Reacts to the session changing.
    pub dashboard: DashboardState,
}

impl FromRef<AppState> for AuthState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            identity: state.identity.clone(),
            dashboard: DashboardState::from_app_state(state),
        }
    }
}

/// The state needed for the auth middleware.
#[derive(Clone)]
pub struct AuthGuardState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// Who is signed in.
    pub session: SessionManager,
    /// Where the "log in first" warning is posted.
    pub notifier: Arc<Mutex<Notifier>>,
}

impl FromRef<AppState> for AuthGuardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            session: state.session.clone(),
            notifier: state.notifier.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<AuthGuardState> for Key {
    fn from_ref(state: &AuthGuardState) -> Self {
        state.cookie_key.clone()
    }
}

/// Run a blocking identity call on the blocking thread pool.
async fn run_identity<T, F>(identity: &Arc<dyn IdentityProvider>, call: F) -> Result<T, AuthError>
where
    T: Send + 'static,
    F: FnOnce(&dyn IdentityProvider) -> Result<T, AuthError> + Send + 'static,
{
    let identity = identity.clone();

    tokio::task::spawn_blocking(move || call(identity.as_ref()))
        .await
        .unwrap_or_else(|error| Err(AuthError::new(AuthErrorCode::Internal, error.to_string())))
}

/// Run a sign-in style identity call and, on success, start the session.
async fn sign_in_with<F>(state: &AuthState, call: F) -> Result<Principal, AuthError>
where
    F: FnOnce(&dyn IdentityProvider) -> Result<Principal, AuthError> + Send + 'static,
{
    let principal = run_identity(&state.identity, call).await?;
    handle_session_change(&state.dashboard, Some(&principal)).await;

    Ok(principal)
}
