//! HTTP client for the Task Matrix tasks API.
//!
//! Endpoints (relative to the configured base URL, e.g.
//! `https://agency-task-matrix.vercel.app/api/tasks`):
//! - `POST {base}` - create one task
//! - `POST {base}/bulk` - create many tasks in one request
//! - `GET {base}?status=<filter>` - list tasks
//! - `PUT {base}/{id}` - partial update

use crate::models::{NewTask, RemoteTask, StatusFilter, TaskPatch};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// User-Agent sent with every request
const USER_AGENT: &str = concat!("taskmatrix/", env!("CARGO_PKG_VERSION"));

/// A failed request.
///
/// Callers treat every variant the same way ("request failed"); the
/// variants only shape the message.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Connection error, DNS failure, timeout
    #[error("request failed: {0}")]
    Transport(String),

    /// Server answered with a non-success status
    #[error("request failed: HTTP {code}: {body}")]
    Status { code: u16, body: String },

    /// Response body was not the expected JSON
    #[error("request failed: malformed response: {0}")]
    Decode(String),
}

/// Response of the bulk create endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BulkCreated {
    #[serde(default)]
    pub imported: usize,
    #[serde(default)]
    pub tasks: Vec<RemoteTask>,
}

#[derive(Serialize)]
struct BulkRequest<'a> {
    tasks: &'a [NewTask],
}

/// Operations the seeder, corrector and lister need from the remote store.
pub trait TaskApi {
    /// Create a single task and return the stored record.
    fn create_task(&self, task: &NewTask) -> Result<RemoteTask, ApiError>;

    /// Create many tasks in one request.
    fn bulk_create(&self, tasks: &[NewTask]) -> Result<BulkCreated, ApiError>;

    /// Fetch tasks matching a status filter.
    fn list_tasks(&self, status: StatusFilter) -> Result<Vec<RemoteTask>, ApiError>;

    /// Apply a partial update to the task with the given id.
    fn update_task(&self, id: &str, patch: &TaskPatch) -> Result<RemoteTask, ApiError>;
}

/// Blocking [`TaskApi`] implementation over HTTP.
pub struct HttpTaskApi {
    agent: ureq::Agent,
    base_url: String,
}

impl HttpTaskApi {
    /// Create a client for `base_url` with a per-request timeout.
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build();
        Self {
            agent,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn task_url(&self, id: &str) -> String {
        format!("{}/{}", self.base_url, id)
    }
}

impl TaskApi for HttpTaskApi {
    fn create_task(&self, task: &NewTask) -> Result<RemoteTask, ApiError> {
        tracing::debug!(url = %self.base_url, title = %task.title, "POST task");
        let response = self
            .agent
            .post(&self.base_url)
            .set("Content-Type", "application/json")
            .send_json(task);
        decode(response)
    }

    fn bulk_create(&self, tasks: &[NewTask]) -> Result<BulkCreated, ApiError> {
        let url = format!("{}/bulk", self.base_url);
        tracing::debug!(url = %url, count = tasks.len(), "POST bulk");
        let response = self
            .agent
            .post(&url)
            .set("Content-Type", "application/json")
            .send_json(BulkRequest { tasks });
        decode(response)
    }

    fn list_tasks(&self, status: StatusFilter) -> Result<Vec<RemoteTask>, ApiError> {
        tracing::debug!(url = %self.base_url, status = %status, "GET tasks");
        let response = self
            .agent
            .get(&self.base_url)
            .query("status", status.as_str())
            .call();
        decode(response)
    }

    fn update_task(&self, id: &str, patch: &TaskPatch) -> Result<RemoteTask, ApiError> {
        let url = self.task_url(id);
        tracing::debug!(url = %url, urgency = %patch.urgency, category = %patch.category, "PUT task");
        let response = self
            .agent
            .put(&url)
            .set("Content-Type", "application/json")
            .send_json(patch);
        decode(response)
    }
}

/// Turn a ureq outcome into a decoded body or an [`ApiError`].
fn decode<T: serde::de::DeserializeOwned>(
    response: Result<ureq::Response, ureq::Error>,
) -> Result<T, ApiError> {
    match response {
        Ok(resp) => resp
            .into_json()
            .map_err(|e| ApiError::Decode(e.to_string())),
        Err(ureq::Error::Status(code, resp)) => {
            let body = resp.into_string().unwrap_or_default();
            Err(ApiError::Status { code, body })
        }
        Err(e) => Err(ApiError::Transport(e.to_string())),
    }
}
