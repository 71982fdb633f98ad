use axum::{
    extract::{FromRequestParts, Request, State},
    http::{request::Parts, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;
use tracing::{debug, error, warn};

use crate::{
    models::user::{PublicUser, UserRole},
    responses::JsonResponse,
    routes::auth::error::AuthError,
    state::AppState,
    utils::cookies::ACCESS_COOKIE,
};

const ADMIN_ONLY: &str = "You are not authorized to access this route";

/// The authenticated user behind the request's access cookie.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthSession(pub PublicUser);

/// Resolves the access cookie to a user record.
///
/// A missing, malformed or forged token is `Unauthenticated`; a genuine but
/// expired one is `Expired`.
pub async fn resolve_session(headers: &HeaderMap, state: &AppState) -> Result<PublicUser, AuthError> {
    let jar = CookieJar::from_headers(headers);
    let token = jar
        .get(ACCESS_COOKIE)
        .map(|cookie| cookie.value())
        .filter(|value| !value.is_empty())
        .ok_or(AuthError::Unauthenticated)?;

    let claims = state.issuer.verify_access(token).map_err(|err| {
        debug!(%err, "rejected access token");
        AuthError::from(err)
    })?;

    match state.db.find_public_user_by_id(claims.sub).await {
        Ok(Some(user)) => Ok(user),
        Ok(None) => Err(AuthError::NotFound),
        Err(err) => {
            error!(?err, user_id = %claims.sub, "failed to load session user");
            Err(AuthError::Internal(err.to_string()))
        }
    }
}

impl FromRequestParts<AppState> for AuthSession {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // Already resolved by `require_session` for this request.
        if let Some(user) = parts.extensions.get::<PublicUser>() {
            return Ok(AuthSession(user.clone()));
        }

        let user = resolve_session(&parts.headers, state).await?;
        parts.extensions.insert(user.clone());
        Ok(AuthSession(user))
    }
}

/// Route layer that rejects the request unless it carries a valid session,
/// attaching the resolved [`PublicUser`] to the request extensions.
pub async fn require_session(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    match resolve_session(req.headers(), &state).await {
        Ok(user) => {
            req.extensions_mut().insert(user);
            next.run(req).await
        }
        Err(err) => err.into_response(),
    }
}

/// Route layer for admin-only routes. Must sit inside [`require_session`],
/// whose [`PublicUser`] extension it reads.
pub async fn require_admin(req: Request, next: Next) -> Response {
    let caller = req
        .extensions()
        .get::<PublicUser>()
        .map(|user| (user.id, user.role));
    match caller {
        Some((_, UserRole::Admin)) => next.run(req).await,
        Some((user_id, _)) => {
            warn!(%user_id, path = %req.uri().path(), "non-admin hit an admin route");
            JsonResponse::forbidden(ADMIN_ONLY).into_response()
        }
        None => AuthError::Unauthenticated.into_response(),
    }
}
