//! The process-wide record of who is signed in.
//!
//! The identity provider announces every sign-in and sign-out on a watch
//! channel. [spawn_session_listener] follows that channel and feeds each
//! announcement through [handle_session_change], which is the only place the
//! [SessionManager] cell is written.

use std::sync::Arc;

use tokio::{sync::watch, task::JoinHandle};

use crate::{
    AppState,
    backend::{Principal, PrincipalId},
    dashboard::{DashboardState, load_dashboard},
    navigation::Page,
};

/// The signed-in principal as the dashboard sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// The identity provider's ID for the principal.
    pub principal_id: PrincipalId,
    /// The provider's display name, or the local part of the email.
    pub display_name: String,
    /// The principal's email address.
    pub email: String,
}

impl Session {
    /// Build a session for `principal`.
    pub fn from_principal(principal: &Principal) -> Self {
        let display_name = principal
            .display_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(ToOwned::to_owned)
            .unwrap_or_else(|| email_local_part(&principal.email).to_owned());

        Self {
            principal_id: principal.id.clone(),
            display_name,
            email: principal.email.clone(),
        }
    }
}

fn email_local_part(email: &str) -> &str {
    email.split_once('@').map_or(email, |(local, _)| local)
}

/// What applying an identity notification did to the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionTransition {
    /// A principal is now signed in, either from nothing or replacing
    /// another principal.
    SignedIn(Session),
    /// The previous principal signed out.
    SignedOut,
    /// The notification repeated the current state.
    Unchanged,
}

/// A cell holding the active session, if any.
///
/// Clones share the same cell.
#[derive(Debug, Clone)]
pub struct SessionManager {
    cell: Arc<watch::Sender<Option<Session>>>,
}

impl SessionManager {
    /// Create a manager with nobody signed in.
    pub fn new() -> Self {
        Self {
            cell: Arc::new(watch::Sender::new(None)),
        }
    }

    /// The active session.
    pub fn current(&self) -> Option<Session> {
        self.cell.borrow().clone()
    }

    /// Whether somebody is signed in.
    pub fn is_active(&self) -> bool {
        self.cell.borrow().is_some()
    }

    /// Watch the session for changes.
    pub fn subscribe(&self) -> watch::Receiver<Option<Session>> {
        self.cell.subscribe()
    }

    /// Record the principal from an identity notification.
    ///
    /// A notification naming the principal that is already signed in leaves
    /// the session untouched and does not wake subscribers.
    pub(crate) fn apply(&self, principal: Option<&Principal>) -> SessionTransition {
        let mut transition = SessionTransition::Unchanged;

        self.cell.send_if_modified(|current| {
            match (current.as_ref(), principal) {
                (Some(session), Some(principal)) if session.principal_id == principal.id => {
                    false
                }
                (None, None) => false,
                (_, Some(principal)) => {
                    let session = Session::from_principal(principal);
                    transition = SessionTransition::SignedIn(session.clone());
                    *current = Some(session);
                    true
                }
                (Some(_), None) => {
                    transition = SessionTransition::SignedOut;
                    *current = None;
                    true
                }
            }
        });

        transition
    }
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Apply an identity notification and react to the resulting transition.
///
/// Signing in moves the view to the dashboard and loads it. Signing out only
/// clears the session: whoever asked to sign out decides where to go next.
pub(crate) async fn handle_session_change(
    state: &DashboardState,
    principal: Option<&Principal>,
) -> SessionTransition {
    let transition = state.session.apply(principal);

    match &transition {
        SessionTransition::SignedIn(session) => {
            tracing::info!("{} signed in", session.principal_id);

            match state.view.lock() {
                // The dashboard is loaded below whether or not the page
                // changes, so the reload effect is not needed here.
                Ok(mut view) if view.page() != Page::Dashboard => {
                    view.show_page(Page::Dashboard);
                }
                Ok(_) => {}
                Err(error) => tracing::error!("could not lock view state: {error}"),
            }

            load_dashboard(state).await;
        }
        SessionTransition::SignedOut => tracing::info!("session ended"),
        SessionTransition::Unchanged => {
            tracing::debug!("session notification did not change the session")
        }
    }

    transition
}

/// Follow the identity provider's session notifications until the provider
/// is dropped.
///
/// The session that was active when the server started is handled first.
pub fn spawn_session_listener(state: AppState) -> JoinHandle<()> {
    let mut receiver = state.identity.on_session_change();
    let dashboard = DashboardState::from_app_state(&state);

    tokio::spawn(async move {
        let startup = receiver.borrow_and_update().clone();
        handle_session_change(&dashboard, startup.as_ref()).await;

        while receiver.changed().await.is_ok() {
            let principal = receiver.borrow_and_update().clone();
            handle_session_change(&dashboard, principal.as_ref()).await;
        }

        tracing::debug!("identity provider dropped, session listener stopping");
    })
}

#[cfg(test)]
mod session_tests {
    use std::sync::Arc;

    use crate::{
        backend::{IdentityProvider, Principal, PrincipalId},
        navigation::Page,
        test_utils::test_app_state,
    };

    use super::{
        Session, SessionManager, SessionTransition, handle_session_change, spawn_session_listener,
    };

    fn principal(id: &str, display_name: Option<&str>) -> Principal {
        Principal {
            id: PrincipalId::new(id),
            email: format!("jane.doe{id}@example.com"),
            display_name: display_name.map(ToOwned::to_owned),
        }
    }

    #[test]
    fn display_name_falls_back_to_email_local_part() {
        let session = Session::from_principal(&principal("1", None));

        assert_eq!(session.display_name, "jane.doe1");
    }

    #[test]
    fn blank_display_name_falls_back_to_email_local_part() {
        let session = Session::from_principal(&principal("1", Some("  ")));

        assert_eq!(session.display_name, "jane.doe1");
    }

    #[test]
    fn apply_reports_transitions() {
        let manager = SessionManager::new();
        let jane = principal("1", Some("Jane Doe"));

        assert_eq!(manager.apply(None), SessionTransition::Unchanged);
        assert_eq!(
            manager.apply(Some(&jane)),
            SessionTransition::SignedIn(Session::from_principal(&jane))
        );
        assert_eq!(manager.apply(Some(&jane)), SessionTransition::Unchanged);
        assert!(manager.is_active());
        assert_eq!(manager.apply(None), SessionTransition::SignedOut);
        assert!(!manager.is_active());
        assert_eq!(manager.current(), None);
    }

    #[test]
    fn switching_principals_signs_in_the_new_one() {
        let manager = SessionManager::new();
        manager.apply(Some(&principal("1", None)));

        let transition = manager.apply(Some(&principal("2", None)));

        assert!(matches!(
            transition,
            SessionTransition::SignedIn(session) if session.principal_id == PrincipalId::new("2")
        ));
    }

    #[test]
    fn clones_share_the_cell() {
        let manager = SessionManager::new();
        let clone = manager.clone();

        manager.apply(Some(&principal("1", None)));

        assert!(clone.is_active());
    }

    #[tokio::test]
    async fn repeated_notification_does_not_wake_subscribers() {
        let manager = SessionManager::new();
        let jane = principal("1", None);
        manager.apply(Some(&jane));
        let mut receiver = manager.subscribe();

        manager.apply(Some(&jane));

        assert!(!receiver.has_changed().unwrap());
    }

    #[tokio::test]
    async fn sign_in_moves_view_to_dashboard() {
        let state = test_app_state();
        let dashboard = crate::dashboard::DashboardState::from_app_state(&state);

        let transition = handle_session_change(&dashboard, Some(&principal("1", None))).await;

        assert!(matches!(transition, SessionTransition::SignedIn(_)));
        assert_eq!(state.view.lock().unwrap().page(), Page::Dashboard);
        let view = state.view.lock().unwrap();
        let regions = view.regions();
        assert!(regions.transactions.is_some());
        assert!(regions.employees.is_some());
        assert!(regions.stats.is_some());
        assert!(regions.charts.is_some());
    }

    #[tokio::test]
    async fn sign_out_does_not_navigate() {
        let state = test_app_state();
        let dashboard = crate::dashboard::DashboardState::from_app_state(&state);
        handle_session_change(&dashboard, Some(&principal("1", None))).await;

        let transition = handle_session_change(&dashboard, None).await;

        assert_eq!(transition, SessionTransition::SignedOut);
        assert_eq!(state.view.lock().unwrap().page(), Page::Dashboard);
        assert!(!state.session.is_active());
    }

    #[tokio::test]
    async fn listener_follows_identity_provider() {
        let state = test_app_state();
        let mut session = state.session.subscribe();
        let identity: Arc<dyn IdentityProvider> = state.identity.clone();
        let _listener = spawn_session_listener(state.clone());

        identity
            .sign_up("jane@example.com", "hunter22", Some("Jane Doe"))
            .unwrap();
        session
            .wait_for(|session| session.is_some())
            .await
            .unwrap();

        assert_eq!(
            state.session.current().map(|session| session.display_name),
            Some("Jane Doe".to_owned())
        );

        identity.sign_out().unwrap();
        session
            .wait_for(|session| session.is_none())
            .await
            .unwrap();

        assert!(!state.session.is_active());
    }
}
