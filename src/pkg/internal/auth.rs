use crate::{
    conf::settings,
    pkg::server::state::AppState,
    prelude::{Error, Result},
};
use chrono::{DateTime, Duration, Utc};
use rand::{distr::Alphanumeric, Rng};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use sqlx::prelude::{FromRow, Type};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Employer,
    Jobseeker,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Type)]
#[sqlx(type_name = "session_status", rename_all = "lowercase")]
pub enum SessionStatus {
    Active,
    Revoked,
}

#[derive(FromRow, Serialize, Deserialize, Debug, Clone)]
pub struct User {
    pub user_id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
}

/// Opaque bearer credential. One row per login; logout flips the status.
#[derive(FromRow, Debug)]
pub struct Session {
    pub token: Uuid,
    pub user_id: String,
    pub expiry: DateTime<Utc>,
    pub status: SessionStatus,
}

#[derive(FromRow)]
struct Credentials {
    user_id: String,
    password_hash: String,
}

impl User {
    pub fn is_employer(&self) -> bool {
        self.role == Role::Employer
    }

    pub fn ensure_employer(&self) -> Result<()> {
        if self.is_employer() {
            Ok(())
        } else {
            tracing::warn!("user {} is not an employer, denying", &self.user_id);
            Err(Error::EmployerOnly)
        }
    }

    pub async fn create(
        state: &AppState,
        name: &str,
        email: &str,
        password: &str,
        role: Role,
    ) -> Result<Self> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (user_id, name, email, password_hash, role)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING user_id, name, email, role
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(name)
        .bind(email)
        .bind(hash_password(password))
        .bind(role)
        .fetch_one(&*state.db_pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                Error::EmailTaken(email.to_string())
            }
            _ => e.into(),
        })?;
        Ok(user)
    }

    pub async fn retrieve(state: &AppState, user_id: &str) -> Result<Self> {
        Ok(sqlx::query_as::<_, User>(
            "select user_id, name, email, role from users where user_id = $1",
        )
        .bind(user_id)
        .fetch_one(&*state.db_pool)
        .await?)
    }

    /// Looks up the user by email and checks the password against the
    /// stored salted digest. Both failure modes collapse into
    /// [`Error::InvalidCredentials`] so the response does not leak which
    /// part was wrong.
    pub async fn verify_credentials(state: &AppState, email: &str, password: &str) -> Result<Self> {
        let creds = sqlx::query_as::<_, Credentials>(
            "select user_id, password_hash from users where email = $1",
        )
        .bind(email)
        .fetch_optional(&*state.db_pool)
        .await?;
        let Some(creds) = creds else {
            return Err(Error::InvalidCredentials);
        };
        if !verify_password(password, &creds.password_hash) {
            return Err(Error::InvalidCredentials);
        }
        User::retrieve(state, &creds.user_id).await
    }
}

impl Session {
    pub async fn issue(state: &AppState, user_id: &str) -> Result<Self> {
        let session = sqlx::query_as::<_, Session>(
            r#"
            INSERT INTO sessions (token, user_id, expiry)
            VALUES ($1, $2, $3)
            RETURNING token, user_id, expiry, status
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(Utc::now() + Duration::hours(settings.session_ttl_hours))
        .fetch_one(&*state.db_pool)
        .await?;
        tracing::debug!("issued session for user {}", user_id);
        Ok(session)
    }

    /// Resolves a bearer token to its user. Unknown, revoked and expired
    /// tokens all answer with [`Error::Unauthorized`].
    pub async fn resolve(state: &AppState, token_str: &str) -> Result<User> {
        let token = token_str
            .parse::<Uuid>()
            .map_err(|_| Error::Unauthorized)?;
        let session = sqlx::query_as::<_, Session>(
            r#"
            SELECT token, user_id, expiry, status
            FROM sessions
            WHERE token = $1
            AND status = $2
            AND expiry > now()
            "#,
        )
        .bind(token)
        .bind(SessionStatus::Active)
        .fetch_optional(&*state.db_pool)
        .await?;
        match session {
            Some(session) => User::retrieve(state, &session.user_id).await,
            None => Err(Error::Unauthorized),
        }
    }

    pub async fn revoke_all(state: &AppState, user_id: &str) -> Result<u64> {
        let result = sqlx::query(
            "update sessions set status = $1 where user_id = $2 and status = $3",
        )
        .bind(SessionStatus::Revoked)
        .bind(user_id)
        .bind(SessionStatus::Active)
        .execute(&*state.db_pool)
        .await?;
        Ok(result.rows_affected())
    }
}

const SALT_LEN: usize = 16;

pub fn hash_password(password: &str) -> String {
    let salt: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(SALT_LEN)
        .map(char::from)
        .collect();
    format!("{}${}", salt, digest_hex(&salt, password))
}

pub fn verify_password(password: &str, stored: &str) -> bool {
    match stored.split_once('$') {
        Some((salt, hash)) => digest_hex(salt, password) == hash,
        None => false,
    }
}

fn digest_hex(salt: &str, password: &str) -> String {
    Sha256::digest(format!("{salt}:{password}").as_bytes())
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_roundtrip() {
        let stored = hash_password("hunter22");
        assert!(verify_password("hunter22", &stored));
        assert!(!verify_password("hunter23", &stored));
    }

    #[test]
    fn test_password_salts_differ() {
        let a = hash_password("same");
        let b = hash_password("same");
        assert_ne!(a, b);
        assert!(verify_password("same", &a));
        assert!(verify_password("same", &b));
    }

    #[test]
    fn test_malformed_stored_hash_rejected() {
        assert!(!verify_password("anything", "no-separator-here"));
    }

    #[test]
    fn test_role_serde() {
        assert_eq!(
            serde_json::to_string(&Role::Employer).unwrap(),
            r#""employer""#
        );
        let role: Role = serde_json::from_str(r#""jobseeker""#).unwrap();
        assert_eq!(role, Role::Jobseeker);
        assert_ne!(role, Role::Employer);
    }
}
