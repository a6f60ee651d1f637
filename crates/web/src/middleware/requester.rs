use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use model::order::Requester;

use crate::common::RouteErrorResponse;

/// Header through which the identity provider passes the caller's identity.
pub const REQUESTER_HEADER: &str = "x-requester";

/// The identity of the caller, taken from the `X-Requester` header. Requests
/// without it are answered with `401 Unauthorized`.
#[derive(Debug, Clone)]
pub struct Authenticated(pub Requester);

#[async_trait]
impl<S> FromRequestParts<S> for Authenticated
where
    S: Send + Sync,
{
    type Rejection = RouteErrorResponse;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(REQUESTER_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(Requester::new)
            .map(Authenticated)
            .ok_or_else(|| {
                RouteErrorResponse::unauthorized("Authentication credentials were not provided.")
                    .with_method(&parts.method)
                    .with_uri(parts.uri.path())
            })
    }
}
