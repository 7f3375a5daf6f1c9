use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
    pkg::{
        internal::{
            adaptors::jobs::{mutators::JobMutator, selectors::JobSelector, spec::JobEntry},
            auth::User,
        },
        server::state::{AppState, GetTxn},
    },
    prelude::{Error, Result},
};

/// Full job payload, used for both create and replace. Required-field
/// checks live here; the client deliberately does not duplicate them.
#[derive(Serialize, Deserialize, Validate, Debug, Clone)]
pub struct JobInput {
    #[validate(length(min = 1, message = "title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "description is required"))]
    pub description: String,
    #[validate(length(min = 1, message = "company is required"))]
    pub company: String,
    #[validate(length(min = 1, message = "location is required"))]
    pub location: String,
    #[serde(rename = "type", default)]
    pub job_type: String,
    #[validate(length(min = 1, message = "category is required"))]
    pub category: String,
    #[validate(range(min = 0, message = "salary must not be negative"))]
    pub salary: i64,
    #[serde(default)]
    pub requirements: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct DeleteAck {
    pub acknowledged: bool,
    pub job_id: String,
}

pub async fn list(
    State(state): State<AppState>,
    Extension(_user): Extension<Arc<User>>,
) -> Result<Json<Vec<JobEntry>>> {
    let mut tx = state.db_pool.begin_txn().await?;
    let jobs = JobSelector::new(&mut tx).get_all().await?;
    Ok(Json(jobs))
}

pub async fn retrieve(
    State(state): State<AppState>,
    Extension(_user): Extension<Arc<User>>,
    Path(job_id): Path<String>,
) -> Result<Json<JobEntry>> {
    let mut tx = state.db_pool.begin_txn().await?;
    let job = JobSelector::new(&mut tx)
        .get_by_id(&job_id)
        .await?
        .ok_or(Error::JobNotFound(job_id))?;
    Ok(Json(job))
}

pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<Arc<User>>,
    Json(input): Json<JobInput>,
) -> Result<Json<JobEntry>> {
    user.ensure_employer()?;
    input.validate()?;
    let mut tx = state.db_pool.begin_txn().await?;
    let job = JobMutator::new(&mut tx).create(&input, &user.user_id).await?;
    tx.commit().await?;
    tracing::info!("job {} created by {}", &job.job_id, &user.user_id);
    Ok(Json(job))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(user): Extension<Arc<User>>,
    Path(job_id): Path<String>,
    Json(input): Json<JobInput>,
) -> Result<Json<JobEntry>> {
    user.ensure_employer()?;
    input.validate()?;
    let mut tx = state.db_pool.begin_txn().await?;
    let job = JobMutator::new(&mut tx)
        .replace(&job_id, &input)
        .await?
        .ok_or(Error::JobNotFound(job_id))?;
    tx.commit().await?;
    tracing::info!("job {} replaced by {}", &job.job_id, &user.user_id);
    Ok(Json(job))
}

pub async fn remove(
    State(state): State<AppState>,
    Extension(user): Extension<Arc<User>>,
    Path(job_id): Path<String>,
) -> Result<Json<DeleteAck>> {
    user.ensure_employer()?;
    let mut tx = state.db_pool.begin_txn().await?;
    let deleted = JobMutator::new(&mut tx).delete(&job_id).await?;
    tx.commit().await?;
    if !deleted {
        return Err(Error::JobNotFound(job_id));
    }
    tracing::info!("job {} deleted by {}", &job_id, &user.user_id);
    Ok(Json(DeleteAck {
        acknowledged: true,
        job_id,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_input() -> JobInput {
        JobInput {
            title: "Backend Engineer".into(),
            description: "Build APIs".into(),
            company: "Acme".into(),
            location: "Remote".into(),
            job_type: "full-time".into(),
            category: "Engineering".into(),
            salary: 120000,
            requirements: vec!["3y exp".into()],
        }
    }

    #[test]
    fn test_valid_input_passes() {
        assert!(valid_input().validate().is_ok());
    }

    #[test]
    fn test_missing_required_field_is_named() {
        let mut input = valid_input();
        input.title = String::new();
        let errs = input.validate().unwrap_err();
        assert!(errs.field_errors().contains_key("title"));
        assert!(!errs.field_errors().contains_key("company"));
    }

    #[test]
    fn test_negative_salary_rejected() {
        let mut input = valid_input();
        input.salary = -1;
        let errs = input.validate().unwrap_err();
        assert!(errs.field_errors().contains_key("salary"));
    }

    #[test]
    fn test_empty_requirement_entries_are_legal() {
        let mut input = valid_input();
        input.requirements = vec![String::new(), "on-call rotation".into()];
        assert!(input.validate().is_ok());
    }

    #[test]
    fn test_wire_shape_uses_type_key() {
        let json = serde_json::to_value(valid_input()).unwrap();
        assert_eq!(json["type"], "full-time");
        assert!(json.get("job_type").is_none());
    }
}
