use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A persisted job posting. `requirements` keeps its order, and entries may
/// be empty strings; the form treats blanks as the author's problem.
#[derive(Serialize, Deserialize, FromRow, Debug, Clone)]
pub struct JobEntry {
    pub job_id: String,
    pub title: String,
    pub description: String,
    pub company: String,
    pub location: String,
    #[serde(rename = "type")]
    pub job_type: String,
    pub category: String,
    pub salary: i64,
    pub requirements: Vec<String>,
    pub posted_by: String,
    pub created_at: DateTime<Utc>,
}
