//! The contract for the identity provider that issues principals and tracks
//! the active session.

use std::fmt::Display;

use tokio::sync::watch;

/// The identifier the identity provider assigns to a principal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PrincipalId(String);

impl PrincipalId {
    /// Wrap a raw identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The raw identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for PrincipalId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An authenticated user identity.
#[derive(Debug, Clone, PartialEq)]
pub struct Principal {
    /// The provider-issued identifier.
    pub id: PrincipalId,
    /// The email address the principal signed up with.
    pub email: String,
    /// The name given at sign-up, if any.
    pub display_name: Option<String>,
}

/// Third-party identity providers that can be used to sign in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FederatedProvider {
    /// Google accounts.
    Google,
}

/// The error codes an identity provider reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthErrorCode {
    /// `auth/email-already-in-use`
    EmailAlreadyInUse,
    /// `auth/invalid-email`
    InvalidEmail,
    /// `auth/weak-password`
    WeakPassword,
    /// `auth/user-not-found`
    UserNotFound,
    /// `auth/wrong-password`
    WrongPassword,
    /// `auth/popup-closed-by-user`
    PopupClosedByUser,
    /// `auth/operation-not-allowed`
    OperationNotAllowed,
    /// `auth/internal-error`
    Internal,
    /// Any other code, kept verbatim.
    Other(String),
}

/// Shown for every code without a dedicated message.
pub const DEFAULT_AUTH_ERROR_MESSAGE: &str = "An error occurred. Please try again.";

impl AuthErrorCode {
    /// Parse a provider error code such as `auth/wrong-password`.
    pub fn from_code(code: &str) -> Self {
        match code {
            "auth/email-already-in-use" => Self::EmailAlreadyInUse,
            "auth/invalid-email" => Self::InvalidEmail,
            "auth/weak-password" => Self::WeakPassword,
            "auth/user-not-found" => Self::UserNotFound,
            "auth/wrong-password" => Self::WrongPassword,
            "auth/popup-closed-by-user" => Self::PopupClosedByUser,
            "auth/operation-not-allowed" => Self::OperationNotAllowed,
            "auth/internal-error" => Self::Internal,
            other => Self::Other(other.to_owned()),
        }
    }

    /// The provider error code.
    pub fn as_str(&self) -> &str {
        match self {
            Self::EmailAlreadyInUse => "auth/email-already-in-use",
            Self::InvalidEmail => "auth/invalid-email",
            Self::WeakPassword => "auth/weak-password",
            Self::UserNotFound => "auth/user-not-found",
            Self::WrongPassword => "auth/wrong-password",
            Self::PopupClosedByUser => "auth/popup-closed-by-user",
            Self::OperationNotAllowed => "auth/operation-not-allowed",
            Self::Internal => "auth/internal-error",
            Self::Other(code) => code,
        }
    }

    /// The human-readable message to show the user for this code.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::EmailAlreadyInUse => "This email is already registered",
            Self::InvalidEmail => "Invalid email address",
            Self::WeakPassword => "Password should be at least 6 characters",
            Self::UserNotFound => "No account found with this email",
            Self::WrongPassword => "Incorrect password",
            Self::PopupClosedByUser => "Sign-in popup was closed",
            Self::OperationNotAllowed | Self::Internal | Self::Other(_) => {
                DEFAULT_AUTH_ERROR_MESSAGE
            }
        }
    }
}

impl Display for AuthErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An identity provider rejected a request.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{code}: {detail}")]
pub struct AuthError {
    /// The provider error code.
    pub code: AuthErrorCode,
    /// Details for the server log. Never shown to the user.
    pub detail: String,
}

impl AuthError {
    /// Create an error with a code and log details.
    pub fn new(code: AuthErrorCode, detail: impl Into<String>) -> Self {
        Self {
            code,
            detail: detail.into(),
        }
    }

    /// The message to show the user.
    pub fn user_message(&self) -> &'static str {
        self.code.user_message()
    }
}

/// Signs principals up, in and out, and reports session changes.
///
/// Calls may block, e.g. to hash a password, so async callers should run them
/// on the blocking thread pool.
pub trait IdentityProvider: Send + Sync {
    /// Create an account and sign it in.
    fn sign_up(
        &self,
        email: &str,
        password: &str,
        display_name: Option<&str>,
    ) -> Result<Principal, AuthError>;

    /// Sign in with an email and password.
    fn sign_in(&self, email: &str, password: &str) -> Result<Principal, AuthError>;

    /// Sign in through a third-party provider.
    fn sign_in_federated(&self, provider: FederatedProvider) -> Result<Principal, AuthError>;

    /// End the active session.
    fn sign_out(&self) -> Result<(), AuthError>;

    /// Subscribe to session changes.
    ///
    /// The receiver's current value is the session at the time of the call,
    /// so a new subscriber sees the persisted session from app start-up
    /// followed by every later transition.
    fn on_session_change(&self) -> watch::Receiver<Option<Principal>>;
}
