use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::{
    pkg::{internal::auth::Session, server::state::AppState},
    prelude::{Error, Result},
};

/// Resolves the `Authorization: Bearer <token>` header to a [`User`] and
/// stashes it in request extensions for the handlers behind this layer.
///
/// [`User`]: crate::pkg::internal::auth::User
pub async fn authenticate(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response> {
    let maybe_token = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty());
    let Some(token) = maybe_token else {
        tracing::warn!("bearer token missing, authentication denied");
        return Err(Error::Unauthorized);
    };
    let user = Session::resolve(&state, token).await?;
    request.extensions_mut().insert(Arc::new(user));
    Ok(next.run(request).await)
}
