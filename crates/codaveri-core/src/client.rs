//! HTTP client for the remote execution API
//!
//! One invocation runs strictly in sequence: the request is submitted, the
//! returned job id is polled until the backend answers 200, and the completed
//! payload is projected down to its stdout. The backend reports "not ready"
//! through a non-200 status on the status endpoint, so any such status keeps
//! the poller waiting. Execution failures inside the sandbox arrive as normal
//! completed payloads.

use reqwest::{Client, RequestBuilder, Response, StatusCode};
use std::sync::Arc;
use std::time::Instant;

use crate::config::ExecutionConfig;
use crate::errors::CodaveriError;
use crate::languages;
use crate::request::ExecuteRequest;
use crate::response::{extract_output, ResponseExecute};

/// Outcome of a single status query
#[derive(Debug, Clone)]
pub enum PollStatus {
    Pending(StatusCode),
    Complete(ResponseExecute),
}

#[derive(Debug, Clone)]
pub struct ExecutionClient {
    client: Client,
    config: Arc<ExecutionConfig>,
}

impl ExecutionClient {
    pub fn new(config: ExecutionConfig) -> Result<Self, CodaveriError> {
        config.validate()?;

        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|e| {
            CodaveriError::ConfigError(format!("Failed to build HTTP client: {}", e))
        })?;

        Ok(Self {
            client,
            config: Arc::new(config),
        })
    }

    /// Run `code` remotely and return what it printed.
    ///
    /// An unknown language fails before any request is sent.
    pub async fn execute(&self, code: &str, language: &str) -> Result<String, CodaveriError> {
        let descriptor = languages::resolve(language)?;
        let request = ExecuteRequest::build(code, &descriptor);

        let job_id = self.submit(&request).await?;
        let result = self.poll(&job_id).await?;
        Ok(extract_output(&result))
    }

    /// Create an execution job and return its id. Never retried.
    pub async fn submit(&self, request: &ExecuteRequest) -> Result<String, CodaveriError> {
        log::info!(
            "Submitting {} execution ({} file(s))",
            request.language_version.language,
            request.files.len()
        );

        let response = self
            .with_headers(self.client.post(self.config.execute_url()))
            .json(request)
            .send()
            .await
            .map_err(|e| CodaveriError::Transport(format!("Submission request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let err = submission_error(response).await;
            log::error!("Execution submission rejected: {}", err);
            return Err(err);
        }

        let body = response
            .text()
            .await
            .map_err(|e| CodaveriError::Transport(format!("Failed to read submission response: {}", e)))?;
        let submitted: ResponseExecute = serde_json::from_str(&body).map_err(|e| {
            CodaveriError::Decode(format!("Invalid submission response ({}): {}", e, body))
        })?;

        log::info!("Execution job {} accepted", submitted.data.id);
        Ok(submitted.data.id)
    }

    /// Issue one status query for `job_id`
    pub async fn query(&self, job_id: &str) -> Result<PollStatus, CodaveriError> {
        let response = self
            .with_headers(self.client.get(self.config.execute_url()))
            .query(&[("id", job_id)])
            .send()
            .await
            .map_err(|e| CodaveriError::Transport(format!("Status request for {} failed: {}", job_id, e)))?;

        if response.status() != StatusCode::OK {
            return Ok(PollStatus::Pending(response.status()));
        }

        let result = response
            .json::<ResponseExecute>()
            .await
            .map_err(|e| CodaveriError::Decode(format!("Invalid result for {}: {}", job_id, e)))?;
        Ok(PollStatus::Complete(result))
    }

    /// Query `job_id` until it completes or the poll policy gives up
    pub async fn poll(&self, job_id: &str) -> Result<ResponseExecute, CodaveriError> {
        let policy = &self.config.poll;
        let interval = policy.interval();
        let deadline = policy.timeout();
        let started = Instant::now();
        let mut attempts: u32 = 0;

        loop {
            attempts += 1;
            match self.query(job_id).await? {
                PollStatus::Complete(result) => {
                    log::info!(
                        "Execution job {} completed after {} status queries ({:?})",
                        job_id,
                        attempts,
                        started.elapsed()
                    );
                    return Ok(result);
                }
                PollStatus::Pending(status) => {
                    log::debug!("Execution job {} not ready (HTTP {}), attempt {}", job_id, status, attempts);
                }
            }

            let elapsed = started.elapsed();
            let attempts_exhausted = policy.max_attempts.is_some_and(|max| attempts >= max);
            let deadline_passed = deadline.is_some_and(|d| elapsed + interval > d);
            if attempts_exhausted || deadline_passed {
                log::warn!(
                    "Giving up on execution job {} after {} status queries ({:?})",
                    job_id,
                    attempts,
                    elapsed
                );
                return Err(CodaveriError::PollTimeout {
                    job_id: job_id.to_string(),
                    attempts,
                    elapsed,
                });
            }

            tokio::time::sleep(interval).await;
        }
    }

    fn with_headers(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header("Content-Type", "application/json")
            .header("x-api-version", &self.config.api_version)
            .header("x-api-key", &self.config.api_key)
    }
}

async fn submission_error(response: Response) -> CodaveriError {
    let status = response.status();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    CodaveriError::SubmissionFailed {
        status: status.as_u16(),
        status_text: status.canonical_reason().unwrap_or("").to_string(),
        body,
    }
}
