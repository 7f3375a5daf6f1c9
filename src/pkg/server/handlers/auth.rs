use std::sync::Arc;

use axum::{extract::State, Extension, Json};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
    pkg::{
        internal::auth::{Role, Session, User},
        server::state::AppState,
    },
    prelude::Result,
};

#[derive(Deserialize, Validate)]
pub struct RegisterInput {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    #[validate(email(message = "not a valid email address"))]
    pub email: String,
    #[validate(length(min = 8, message = "password must be at least 8 characters"))]
    pub password: String,
    pub role: Role,
}

#[derive(Deserialize)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

#[derive(Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}

#[derive(Serialize, Deserialize)]
pub struct LogoutAck {
    pub acknowledged: bool,
}

pub async fn register(
    State(state): State<AppState>,
    Json(input): Json<RegisterInput>,
) -> Result<Json<User>> {
    input.validate()?;
    let user = User::create(&state, &input.name, &input.email, &input.password, input.role).await?;
    tracing::info!("registered user {} ({:?})", &user.user_id, &user.role);
    Ok(Json(user))
}

pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginInput>,
) -> Result<Json<LoginResponse>> {
    let user = User::verify_credentials(&state, &input.email, &input.password).await?;
    let session = Session::issue(&state, &user.user_id).await?;
    Ok(Json(LoginResponse {
        token: session.token.to_string(),
        user,
    }))
}

pub async fn logout(
    State(state): State<AppState>,
    Extension(user): Extension<Arc<User>>,
) -> Result<Json<LogoutAck>> {
    let revoked = Session::revoke_all(&state, &user.user_id).await?;
    tracing::info!("user {} logged out, {} session(s) revoked", &user.name, revoked);
    Ok(Json(LogoutAck { acknowledged: true }))
}

pub async fn me(Extension(user): Extension<Arc<User>>) -> Result<Json<User>> {
    Ok(Json(user.as_ref().clone()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_input_validation() {
        let input = RegisterInput {
            name: "Ada".into(),
            email: "not-an-email".into(),
            password: "short".into(),
            role: Role::Employer,
        };
        let errs = input.validate().unwrap_err();
        let fields = errs.field_errors();
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("password"));
        assert!(!fields.contains_key("name"));
    }
}
