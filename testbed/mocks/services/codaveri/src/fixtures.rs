use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Status and body returned for every submission when set
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitFailure {
    pub status: u16,
    pub body: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendFixture {
    #[serde(default = "default_job_id")]
    pub job_id: String,
    /// Status queries answered with 404 before the job reports completion
    #[serde(default)]
    pub pending_polls: usize,
    #[serde(default)]
    pub stdout: Option<String>,
    #[serde(default)]
    pub stderr: Option<String>,
    #[serde(default)]
    pub submit_failure: Option<SubmitFailure>,
    /// When set, requests with a different `x-api-key` get 401
    #[serde(default)]
    pub api_key: Option<String>,
    /// Answer submissions with `null` in place of the result arrays and message
    #[serde(default)]
    pub null_submit_fields: bool,
}

fn default_job_id() -> String {
    "mock-job".to_string()
}

impl Default for BackendFixture {
    fn default() -> Self {
        Self {
            job_id: default_job_id(),
            pending_polls: 0,
            stdout: None,
            stderr: None,
            submit_failure: None,
            api_key: None,
            null_submit_fields: false,
        }
    }
}

impl BackendFixture {
    pub fn from_yaml(yaml: &str) -> anyhow::Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn with_job_id(mut self, job_id: impl Into<String>) -> Self {
        self.job_id = job_id.into();
        self
    }

    pub fn with_pending_polls(mut self, pending_polls: usize) -> Self {
        self.pending_polls = pending_polls;
        self
    }

    pub fn with_stdout(mut self, stdout: impl Into<String>) -> Self {
        self.stdout = Some(stdout.into());
        self
    }

    pub fn with_stderr(mut self, stderr: impl Into<String>) -> Self {
        self.stderr = Some(stderr.into());
        self
    }

    pub fn rejecting(mut self, status: u16, body: impl Into<String>) -> Self {
        self.submit_failure = Some(SubmitFailure {
            status,
            body: body.into(),
        });
        self
    }

    pub fn requiring_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_null_submit_fields(mut self) -> Self {
        self.null_submit_fields = true;
        self
    }

    pub fn accepted_body(&self) -> Value {
        if self.null_submit_fields {
            return json!({
                "success": true,
                "message": null,
                "data": {
                    "id": self.job_id,
                    "IOResults": null,
                    "exprResults": null,
                    "transactionId": null
                }
            });
        }
        json!({
            "success": true,
            "message": "Execution started",
            "data": {
                "id": self.job_id,
                "IOResults": [],
                "exprResults": [],
                "transactionId": format!("tx-{}", self.job_id)
            }
        })
    }

    pub fn completed_body(&self) -> Value {
        let phase = |stdout: Option<&str>, stderr: Option<&str>| {
            let (code, status) = match stderr {
                Some(_) => (1, "RE"),
                None => (0, "OK"),
            };
            json!({
                "stdout": stdout.unwrap_or(""),
                "stderr": stderr.unwrap_or(""),
                "code": code,
                "output": format!("{}{}", stdout.unwrap_or(""), stderr.unwrap_or("")),
                "signal": null,
                "cpuTime": 0.01,
                "wallTime": 0.02,
                "memory": 8192,
                "message": "",
                "status": status
            })
        };

        json!({
            "success": true,
            "message": "Execution completed",
            "data": {
                "id": self.job_id,
                "IOResults": [{
                    "compile": phase(None, None),
                    "run": phase(self.stdout.as_deref(), self.stderr.as_deref()),
                    "testcase": {"index": 1, "visibility": "public", "input": "", "output": ""}
                }],
                "exprResults": [],
                "transactionId": format!("tx-{}", self.job_id)
            }
        })
    }
}
