use sqlx::PgConnection;
use uuid::Uuid;

use crate::pkg::internal::adaptors::jobs::spec::JobEntry;
use crate::pkg::server::handlers::jobs::JobInput;
use crate::prelude::Result;

pub struct JobMutator<'a> {
    conn: &'a mut PgConnection,
}

impl<'a> JobMutator<'a> {
    pub fn new(conn: &'a mut PgConnection) -> Self {
        JobMutator { conn }
    }

    pub async fn create(&mut self, job: &JobInput, posted_by: &str) -> Result<JobEntry> {
        let row = sqlx::query_as::<_, JobEntry>(
            r#"
            INSERT INTO jobs (job_id, title, description, company, location,
                              job_type, category, salary, requirements, posted_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING job_id, title, description, company, location, job_type,
                      category, salary, requirements, posted_by, created_at
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(&job.title)
        .bind(&job.description)
        .bind(&job.company)
        .bind(&job.location)
        .bind(&job.job_type)
        .bind(&job.category)
        .bind(job.salary)
        .bind(&job.requirements)
        .bind(posted_by)
        .fetch_one(&mut *self.conn)
        .await?;
        Ok(row)
    }

    /// Full-record replace: every column is overwritten, including the whole
    /// requirements array. `posted_by` and `created_at` stay with the record.
    pub async fn replace(&mut self, job_id: &str, job: &JobInput) -> Result<Option<JobEntry>> {
        let row = sqlx::query_as::<_, JobEntry>(
            r#"
            UPDATE jobs
            SET title = $2, description = $3, company = $4, location = $5,
                job_type = $6, category = $7, salary = $8, requirements = $9
            WHERE job_id = $1
            RETURNING job_id, title, description, company, location, job_type,
                      category, salary, requirements, posted_by, created_at
            "#,
        )
        .bind(job_id)
        .bind(&job.title)
        .bind(&job.description)
        .bind(&job.company)
        .bind(&job.location)
        .bind(&job.job_type)
        .bind(&job.category)
        .bind(job.salary)
        .bind(&job.requirements)
        .fetch_optional(&mut *self.conn)
        .await?;
        Ok(row)
    }

    pub async fn delete(&mut self, job_id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM jobs WHERE job_id = $1")
            .bind(job_id)
            .execute(&mut *self.conn)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
