use axum::middleware::from_fn_with_state;
use axum::routing::post;
use axum::{routing::get, Router};

use super::handlers;
use super::handlers::auth::{login, logout, me, register};
use super::handlers::probes::{healthz, livez};
use super::middlewares::authn;
use super::state::AppState;
use crate::prelude::Result;

pub async fn build_routes() -> Result<Router> {
    let state = AppState::new().await?;
    let app = Router::new()
        .route("/api/jobs", get(handlers::jobs::list).post(handlers::jobs::create))
        .route(
            "/api/jobs/{id}",
            get(handlers::jobs::retrieve)
                .put(handlers::jobs::update)
                .delete(handlers::jobs::remove),
        )
        .route("/api/auth/logout", post(logout))
        .route("/api/auth/me", get(me))
        .layer(from_fn_with_state(state.clone(), authn::authenticate))
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .route("/healthz", get(healthz))
        .route("/livez", get(livez))
        .with_state(state);

    Ok(app)
}
