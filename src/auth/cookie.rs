//! Ties the active session to the browser that started it with a private
//! cookie.

use axum_extra::extract::{
    PrivateCookieJar,
    cookie::{Cookie, SameSite},
};
use time::{Duration, OffsetDateTime};

use crate::{backend::PrincipalId, session::SessionManager};

pub(crate) const COOKIE_PRINCIPAL_ID: &str = "principal_id";

/// Add the auth cookie for `principal_id` to the cookie jar.
///
/// The cookie lasts for the browser session and is encrypted, so its value
/// cannot be read or forged by the client.
pub(crate) fn set_auth_cookie(jar: PrivateCookieJar, principal_id: &PrincipalId) -> PrivateCookieJar {
    jar.add(
        Cookie::build((COOKIE_PRINCIPAL_ID, principal_id.to_string()))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Strict)
            .secure(true),
    )
}

/// Set the auth cookie to an invalid value and set its max age to zero, which should delete the cookie on the client side.
pub(crate) fn invalidate_auth_cookie(jar: PrivateCookieJar) -> PrivateCookieJar {
    jar.add(
        Cookie::build((COOKIE_PRINCIPAL_ID, "deleted"))
            .path("/")
            .expires(OffsetDateTime::UNIX_EPOCH)
            .max_age(Duration::ZERO)
            .http_only(true)
            .same_site(SameSite::Strict)
            .secure(true),
    )
}

pub(crate) fn get_principal_id_from_auth_cookie(jar: &PrivateCookieJar) -> Option<PrincipalId> {
    jar.get(COOKIE_PRINCIPAL_ID)
        .map(|cookie| PrincipalId::new(cookie.value_trimmed()))
}

/// Whether the browser holding `jar` is the one the active session belongs to.
pub(crate) fn holds_session(jar: &PrivateCookieJar, session: &SessionManager) -> bool {
    match (get_principal_id_from_auth_cookie(jar), session.current()) {
        (Some(cookie_id), Some(session)) => cookie_id == session.principal_id,
        _ => false,
    }
}
