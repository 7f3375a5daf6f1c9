use std::time::Duration;

use async_trait::async_trait;
use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::{
    pkg::{
        internal::{adaptors::jobs::spec::JobEntry, auth::User},
        server::handlers::{
            auth::LogoutAck,
            jobs::{DeleteAck, JobInput},
        },
    },
    prelude::{Error, Result},
};

/// The job CRUD surface as the form controller sees it. The in-memory fake
/// in the controller tests implements this too.
#[async_trait]
pub trait JobApi: Send + Sync {
    async fn list(&self) -> Result<Vec<JobEntry>>;
    async fn get(&self, job_id: &str) -> Result<JobEntry>;
    async fn create(&self, job: &JobInput) -> Result<JobEntry>;
    async fn replace(&self, job_id: &str, job: &JobInput) -> Result<JobEntry>;
    async fn delete(&self, job_id: &str) -> Result<DeleteAck>;
}

/// Session boundary: token validation and termination. The token is passed
/// explicitly since a context validates it before holding on to it.
#[async_trait]
pub trait AuthApi: Send + Sync {
    async fn me(&self, token: &str) -> Result<User>;
    async fn logout(&self, token: &str) -> Result<()>;
}

#[derive(Deserialize)]
struct ApiErrorBody {
    code: String,
    error: String,
}

pub struct HttpClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl HttpClient {
    pub fn new(base_url: &str, request_timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(request_timeout).build()?;
        Ok(HttpClient {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
        })
    }

    pub fn with_token(mut self, token: &str) -> Self {
        self.token = Some(token.to_string());
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn bearer(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Non-2xx responses decode into [`Error::Api`] carrying the server's
    /// code and message, so callers can show something actionable.
    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json::<T>().await?);
        }
        match response.json::<ApiErrorBody>().await {
            Ok(body) => Err(Error::Api {
                status: status.as_u16(),
                code: body.code,
                message: body.error,
            }),
            Err(_) => Err(Error::Api {
                status: status.as_u16(),
                code: "ERR-API-000".to_string(),
                message: status.to_string(),
            }),
        }
    }
}

#[async_trait]
impl JobApi for HttpClient {
    async fn list(&self) -> Result<Vec<JobEntry>> {
        let response = self.bearer(self.http.get(self.url("/api/jobs"))).send().await?;
        Self::decode(response).await
    }

    async fn get(&self, job_id: &str) -> Result<JobEntry> {
        let response = self
            .bearer(self.http.get(self.url(&format!("/api/jobs/{job_id}"))))
            .send()
            .await?;
        Self::decode(response).await
    }

    async fn create(&self, job: &JobInput) -> Result<JobEntry> {
        let response = self
            .bearer(self.http.post(self.url("/api/jobs")).json(job))
            .send()
            .await?;
        Self::decode(response).await
    }

    async fn replace(&self, job_id: &str, job: &JobInput) -> Result<JobEntry> {
        let response = self
            .bearer(self.http.put(self.url(&format!("/api/jobs/{job_id}"))).json(job))
            .send()
            .await?;
        Self::decode(response).await
    }

    async fn delete(&self, job_id: &str) -> Result<DeleteAck> {
        let response = self
            .bearer(self.http.delete(self.url(&format!("/api/jobs/{job_id}"))))
            .send()
            .await?;
        Self::decode(response).await
    }
}

#[async_trait]
impl AuthApi for HttpClient {
    async fn me(&self, token: &str) -> Result<User> {
        let response = self
            .http
            .get(self.url("/api/auth/me"))
            .bearer_auth(token)
            .send()
            .await?;
        Self::decode(response).await
    }

    async fn logout(&self, token: &str) -> Result<()> {
        let response = self
            .http
            .post(self.url("/api/auth/logout"))
            .bearer_auth(token)
            .send()
            .await?;
        let _ack: LogoutAck = Self::decode(response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_is_stripped() {
        let client = HttpClient::new("http://localhost:8000/", Duration::from_secs(5)).unwrap();
        assert_eq!(client.url("/api/jobs"), "http://localhost:8000/api/jobs");
    }
}
