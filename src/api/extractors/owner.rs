use axum::{
    extract::{FromRequestParts, FromRef},
    http::{request::Parts, StatusCode},
};
use crate::api::extractors::auth::AuthUser;
use crate::domain::models::user::User;
use crate::state::AppState;
use std::sync::Arc;
use tracing::warn;

/// An authenticated caller holding the `OWNER` role.
pub struct OwnerUser(pub User);

impl<S> FromRequestParts<S> for OwnerUser
where
    S: Send + Sync,
    Arc<AppState>: FromRef<S>,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let AuthUser(user) = AuthUser::from_request_parts(parts, state).await?;

        if !user.is_owner() {
            warn!("User {} attempted an owner-only action", user.id);
            return Err(StatusCode::FORBIDDEN);
        }

        Ok(OwnerUser(user))
    }
}
