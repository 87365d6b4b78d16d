use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use tracing::warn;

use crate::auth::claims::{JwtKeys, Role};
use crate::auth::repo::User;
use crate::error::ApiError;
use crate::state::AppState;

/// Resolved caller on protected routes. The role comes from the token, not
/// from storage; a role change only takes effect once existing tokens expire.
pub struct AuthUser {
    pub user: User,
    pub role: Role,
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .ok_or(ApiError::Unauthenticated)?;

        let token = auth
            .strip_prefix("Bearer ")
            .or_else(|| auth.strip_prefix("bearer "))
            .ok_or(ApiError::Unauthenticated)?;

        let keys = JwtKeys::from_ref(state);
        let claims = keys.verify(token).map_err(|_| {
            warn!("invalid or expired token");
            ApiError::InvalidToken
        })?;

        // Stale tokens of deleted accounts stop here.
        let user = User::find_by_id(&state.db, claims.sub)
            .await?
            .ok_or(ApiError::UserNotFound)?;

        Ok(AuthUser {
            user,
            role: claims.role,
        })
    }
}

/// Admin-gated variant of [`AuthUser`].
pub struct AdminUser(pub AuthUser);

#[async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth = AuthUser::from_request_parts(parts, state).await?;
        if auth.role != Role::Admin {
            warn!(user_id = %auth.user.id, "non-admin hit admin route");
            return Err(ApiError::Forbidden);
        }
        Ok(AdminUser(auth))
    }
}
