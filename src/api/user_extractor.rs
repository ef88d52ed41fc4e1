use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap},
};

use crate::api::handlers::AppState;
use crate::error::CatalogError;
use crate::model::UserContext;

/// Axum extractor for the authenticated caller.
///
/// The identity provider in front of the service forwards the caller in headers:
/// - X-User-Id: Required user identifier
/// - X-User-Email: Optional user email
/// - X-User-Name: Optional user display name
///
/// Without `X-User-Id` the request is rejected with 403, unless `auth.dev_user` is configured.
#[async_trait]
impl<S> FromRequestParts<AppState<S>> for UserContext
where
    S: Send + Sync,
{
    type Rejection = CatalogError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState<S>,
    ) -> Result<Self, Self::Rejection> {
        let headers = &parts.headers;

        if let Some(user_id) = extract_header_value(headers, "x-user-id") {
            let user_email = extract_header_value(headers, "x-user-email");
            let user_name = extract_header_value(headers, "x-user-name");

            return Ok(UserContext::with_details(user_id, user_email, user_name));
        }

        match &state.auth.dev_user {
            Some(dev_user) => Ok(UserContext::new(dev_user.clone())),
            None => Err(CatalogError::Unauthorized),
        }
    }
}

/// Extract a non-blank header value as string
fn extract_header_value(headers: &HeaderMap, header_name: &str) -> Option<String> {
    headers
        .get(header_name)
        .and_then(|value| value.to_str().ok())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
