//! Axum extractor for the signed-in user.

use axum::extract::{FromRef, FromRequestParts};
use axum_extra::extract::CookieJar;
use http::StatusCode;
use http::request::Parts;
use uuid::Uuid;

use crate::cookie::TAVOLA_SESSION;
use crate::token::validate_session_token;

/// Signing secret for session tokens, pulled out of the app state via
/// [`FromRef`]. The server's `AppState` implements `FromRef<AppState> for
/// SessionKey` so the extractor works against any state carrying it.
#[derive(Debug, Clone)]
pub struct SessionKey(pub String);

/// The authenticated user, extracted from the session cookie.
///
/// Returns 401 if the cookie is absent, expired, or fails validation.
#[derive(Debug, Clone)]
pub struct SessionUser {
    pub user_id: Uuid,
}

impl<S> FromRequestParts<S> for SessionUser
where
    S: Send + Sync,
    SessionKey: FromRef<S>,
{
    type Rejection = StatusCode;

    // axum-core 0.5 defines this as `fn -> impl Future + Send` (not `async fn`).
    // In Rust 1.82+ precise capturing, `async fn` captures lifetimes differently,
    // causing E0195. Fix: extract values synchronously, return a 'static async move block.
    fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let key = SessionKey::from_ref(state);
        let token = CookieJar::from_headers(&parts.headers)
            .get(TAVOLA_SESSION)
            .map(|c| c.value().to_owned());

        async move {
            let token = token.ok_or(StatusCode::UNAUTHORIZED)?;
            let info =
                validate_session_token(&token, &key.0).map_err(|_| StatusCode::UNAUTHORIZED)?;
            Ok(Self {
                user_id: info.user_id,
            })
        }
    }
}

/// Like [`SessionUser`], but never rejects: anonymous requests and bad
/// cookies extract as `MaybeSessionUser(None)`. Used on read endpoints where
/// visibility rules decide access, not the router.
#[derive(Debug, Clone)]
pub struct MaybeSessionUser(pub Option<SessionUser>);

impl<S> FromRequestParts<S> for MaybeSessionUser
where
    S: Send + Sync,
    SessionKey: FromRef<S>,
{
    type Rejection = std::convert::Infallible;

    fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let key = SessionKey::from_ref(state);
        let token = CookieJar::from_headers(&parts.headers)
            .get(TAVOLA_SESSION)
            .map(|c| c.value().to_owned());

        async move {
            let user = token
                .and_then(|t| validate_session_token(&t, &key.0).ok())
                .map(|info| SessionUser {
                    user_id: info.user_id,
                });
            Ok(Self(user))
        }
    }
}
