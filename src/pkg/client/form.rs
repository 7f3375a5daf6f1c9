use std::time::Duration;

use tokio::time::timeout;

use crate::{
    pkg::{
        client::{
            api::JobApi,
            session::{Access, GateDecision, SessionContext},
        },
        internal::adaptors::jobs::spec::JobEntry,
        server::handlers::jobs::JobInput,
    },
    prelude::{Error, Result},
};

/// Whether submit creates a new posting or replaces an existing one. Set
/// once during [`JobFormController::init`] from the route identifier and
/// consulted nowhere else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Update(String),
}

#[derive(Debug, Clone, Copy)]
pub enum JobField {
    Title,
    Description,
    Company,
    Location,
    Type,
    Category,
    Salary,
}

/// Where the view should go after an operation.
#[derive(Debug, PartialEq, Eq)]
pub enum Nav {
    Stay,
    ToJobList,
    ToLogin,
}

/// In-memory form state. Salary is kept as raw text and only parsed on
/// submit; everything else is the server's job to validate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobForm {
    pub title: String,
    pub description: String,
    pub company: String,
    pub location: String,
    pub job_type: String,
    pub category: String,
    pub salary: String,
    pub requirements: Vec<String>,
}

impl JobForm {
    /// Fresh form: all fields blank, one empty requirement row to type into.
    pub fn empty() -> Self {
        JobForm {
            requirements: vec![String::new()],
            ..Default::default()
        }
    }

    fn from_entry(job: &JobEntry) -> Self {
        JobForm {
            title: job.title.clone(),
            description: job.description.clone(),
            company: job.company.clone(),
            location: job.location.clone(),
            job_type: job.job_type.clone(),
            category: job.category.clone(),
            salary: job.salary.to_string(),
            requirements: job.requirements.clone(),
        }
    }

    fn to_input(&self) -> Result<JobInput> {
        let salary = self
            .salary
            .trim()
            .parse::<i64>()
            .map_err(|_| Error::InvalidSalary(self.salary.clone()))?;
        Ok(JobInput {
            title: self.title.clone(),
            description: self.description.clone(),
            company: self.company.clone(),
            location: self.location.clone(),
            job_type: self.job_type.clone(),
            category: self.category.clone(),
            salary,
            requirements: self.requirements.clone(),
        })
    }
}

/// Owns the form state and the listing panel below it, and dispatches
/// create-or-replace to the job API. One instance per active form view;
/// all mutation goes through `&mut self`, so there is no shared state to
/// coordinate.
pub struct JobFormController<A: JobApi> {
    api: A,
    mode: FormMode,
    pub form: JobForm,
    jobs: Vec<JobEntry>,
    busy: bool,
    request_timeout: Duration,
}

impl<A: JobApi> JobFormController<A> {
    pub fn new(api: A, request_timeout: Duration) -> Self {
        JobFormController {
            api,
            mode: FormMode::Create,
            form: JobForm::empty(),
            jobs: Vec::new(),
            busy: false,
            request_timeout,
        }
    }

    pub fn mode(&self) -> &FormMode {
        &self.mode
    }

    pub fn jobs(&self) -> &[JobEntry] {
        &self.jobs
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    /// Gate first: a missing session or a non-employer role redirects
    /// before any API call is issued. With a route identifier the form is
    /// populated from the stored record and submit becomes a full-record
    /// replace; without one the form resets to empty defaults. The job
    /// list for the panel below the form is always refetched.
    pub async fn init(
        &mut self,
        session: &SessionContext,
        route_id: Option<&str>,
    ) -> Result<Nav> {
        if session.gate(Access::Employer) == GateDecision::RedirectToLogin {
            tracing::warn!("job form reached without employer session, redirecting");
            return Ok(Nav::ToLogin);
        }
        match route_id {
            Some(job_id) => {
                let job = timeout(self.request_timeout, self.api.get(job_id)).await??;
                self.form = JobForm::from_entry(&job);
                self.mode = FormMode::Update(job_id.to_string());
            }
            None => {
                self.form = JobForm::empty();
                self.mode = FormMode::Create;
            }
        }
        self.jobs = timeout(self.request_timeout, self.api.list()).await??;
        Ok(Nav::Stay)
    }

    /// Merges one field into the record. No client-side validation here;
    /// the server's required-field checks are the authority.
    pub fn set_field(&mut self, field: JobField, value: &str) {
        let slot = match field {
            JobField::Title => &mut self.form.title,
            JobField::Description => &mut self.form.description,
            JobField::Company => &mut self.form.company,
            JobField::Location => &mut self.form.location,
            JobField::Type => &mut self.form.job_type,
            JobField::Category => &mut self.form.category,
            JobField::Salary => &mut self.form.salary,
        };
        *slot = value.to_string();
    }

    pub fn set_requirement(&mut self, index: usize, value: &str) -> Result<()> {
        let len = self.form.requirements.len();
        match self.form.requirements.get_mut(index) {
            Some(slot) => {
                *slot = value.to_string();
                Ok(())
            }
            None => Err(Error::RequirementIndex { index, len }),
        }
    }

    pub fn add_requirement(&mut self) {
        self.form.requirements.push(String::new());
    }

    pub fn remove_requirement(&mut self, index: usize) -> Result<()> {
        let len = self.form.requirements.len();
        if index >= len {
            return Err(Error::RequirementIndex { index, len });
        }
        self.form.requirements.remove(index);
        Ok(())
    }

    /// Dispatches the form as a creation or a full-record replace. A
    /// re-entrant submit is refused while one is in flight, and the call
    /// is bounded by the request timeout so the busy flag can never stay
    /// set behind a hung request. On failure the form stays populated for
    /// retry and the error goes back to the caller.
    pub async fn submit(&mut self) -> Result<Nav> {
        if self.busy {
            return Err(Error::Busy);
        }
        let input = self.form.to_input()?;
        self.busy = true;
        let outcome = match &self.mode {
            FormMode::Update(job_id) => {
                timeout(self.request_timeout, self.api.replace(job_id, &input)).await
            }
            FormMode::Create => timeout(self.request_timeout, self.api.create(&input)).await,
        };
        self.busy = false;
        let job = match outcome {
            Ok(Ok(job)) => job,
            Ok(Err(e)) => return Err(e),
            Err(elapsed) => return Err(elapsed.into()),
        };
        tracing::info!("job {} saved", &job.job_id);
        Ok(Nav::ToJobList)
    }

    /// Deletes the posting, then refetches the list from the server rather
    /// than filtering it locally, so the panel cannot drift from the store.
    pub async fn delete_job(&mut self, job_id: &str) -> Result<()> {
        let ack = timeout(self.request_timeout, self.api.delete(job_id)).await??;
        tracing::info!("job {} deleted", &ack.job_id);
        self.jobs = timeout(self.request_timeout, self.api.list()).await??;
        Ok(())
    }
}
