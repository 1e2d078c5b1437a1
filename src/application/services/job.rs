//! Job service

use std::sync::Arc;

use tracing::{debug, instrument};

use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::{Job, Since};
use crate::infrastructure::traits::{ApiError, GirderApi};

/// Job type of submission runs.
pub const DEFAULT_JOB_TYPE: &str = "sivacor_submission";

/// Filters for `job list`.
#[derive(Debug, Clone, PartialEq)]
pub struct JobQuery {
    /// Status codes, sent server-side (empty = any)
    pub statuses: Vec<i64>,
    /// Job types, sent server-side (empty = any)
    pub types: Vec<String>,
    /// Client-side lower bound on creation time
    pub since: Option<Since>,
}

impl Default for JobQuery {
    fn default() -> Self {
        Self {
            statuses: Vec::new(),
            types: vec![DEFAULT_JOB_TYPE.to_string()],
            since: None,
        }
    }
}

/// Service for job listings.
pub struct JobService {
    api: Arc<dyn GirderApi>,
}

impl JobService {
    /// Create a new job service.
    pub fn new(api: Arc<dyn GirderApi>) -> Self {
        Self { api }
    }

    #[instrument(skip(self))]
    pub fn list_jobs(&self, query: &JobQuery) -> ApplicationResult<Vec<Job>> {
        let jobs = self.api.list_jobs(&query.statuses, &query.types)?;
        let total = jobs.len();
        let jobs: Vec<Job> = match query.since {
            Some(since) => jobs
                .into_iter()
                .filter(|j| since.admits(j.created_at()))
                .collect(),
            None => jobs,
        };
        debug!("list_jobs: {} of {} jobs kept", jobs.len(), total);
        Ok(jobs)
    }

    /// Full job record.
    #[instrument(skip(self))]
    pub fn get_job(&self, id: &str) -> ApplicationResult<serde_json::Value> {
        self.api.get_job(id).map_err(|e| match e {
            ApiError::NotFound { .. } => ApplicationError::NotFound {
                kind: "job",
                id: id.to_string(),
            },
            other => other.into(),
        })
    }
}
