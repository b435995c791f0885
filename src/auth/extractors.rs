use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};

use super::jwt::JwtKeys;
use crate::error::{AppError, AuthError};

/// Validates the `authorization` header and yields the user id it names.
pub struct AuthUser(pub i64);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let keys = JwtKeys::from_ref(state);
        let raw = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .ok_or_else(|| AuthError::MalformedToken("missing authorization header".into()))?
            .to_str()
            .map_err(|_| AuthError::MalformedToken("authorization header is not text".into()))?;

        let claims = keys.validate(raw)?;
        let user_id = claims
            .subject_id()
            .parse::<i64>()
            .map_err(|_| AuthError::MalformedToken("token subject is not a user id".into()))?;

        Ok(AuthUser(user_id))
    }
}
