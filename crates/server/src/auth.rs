use std::sync::Arc;

use axum::async_trait;
use axum::extract::{FromRef, FromRequestParts};
use axum::http::{header::AUTHORIZATION, request::Parts};
use service::auth::{authenticate, AuthRejection, Claims, TokenService};
use tracing::warn;

use crate::errors::ApiError;

/// Verified caller identity.
///
/// Taking this as a handler argument puts the route behind the bearer token
/// gate: a missing header answers 401, any other failure 403, and the handler
/// body never runs in either case.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    Arc<TokenService>: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let tokens = Arc::<TokenService>::from_ref(state);
        let verdict = match parts.headers.get(AUTHORIZATION).map(|v| v.to_str()) {
            None => authenticate(None, &tokens),
            Some(Ok(header)) => authenticate(Some(header), &tokens),
            // Present but not visible ASCII: cannot be a valid bearer token
            Some(Err(_)) => Err(AuthRejection::Forbidden),
        };
        match verdict {
            Ok(claims) => Ok(AuthUser(claims)),
            Err(reason) => {
                warn!(path = %parts.uri.path(), method = %parts.method, %reason, "request rejected by auth gate");
                Err(reason.into())
            }
        }
    }
}
