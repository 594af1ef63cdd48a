use super::error::Error;
use crate::state::ApiSecret;
use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use tracing::warn;

/// Proof that the caller presented the shared secret
pub(crate) struct Authorized;

#[async_trait]
impl<S> FromRequestParts<S> for Authorized
where
    ApiSecret: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let secret = ApiSecret::from_ref(state);

        let credential = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok());

        match credential {
            Some(credential) if secret.verify(credential) => Ok(Authorized),
            _ => {
                warn!(present = credential.is_some(), "rejected credential");
                Err(Error::Unauthorized)
            }
        }
    }
}
