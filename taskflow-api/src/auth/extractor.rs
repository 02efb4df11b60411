use std::ops::Deref;

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};

use crate::{
    app_state::AppState,
    domain::models::{User, UserId},
    routes::ApiError,
};

/// A custom Axum extractor that resolves the bearer token into the
/// authenticated [`User`]. Returns 401 Unauthorized when the header is
/// missing or malformed, the token does not verify, or its subject no
/// longer exists.
///
/// The user is re-read from storage on every request; nothing about the
/// identity is cached between requests.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: UserId,
    user: User,
}

impl AuthUser {
    pub fn into_user(self) -> User {
        self.user
    }
}

impl Deref for AuthUser {
    type Target = User;

    fn deref(&self) -> &Self::Target {
        &self.user
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);

        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or_else(|| ApiError::unauthorized("Not authenticated"))?;

        let user = app_state
            .identity
            .authenticate(token)
            .await
            .map_err(ApiError::from)?;

        Ok(AuthUser { id: user.id, user })
    }
}
