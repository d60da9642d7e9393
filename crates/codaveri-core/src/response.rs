//! Backend response types and output extraction
//!
//! Both `POST /execute` and `GET /execute?id=` answer with the same envelope.
//! Only `data.id` is required; everything else is decoded leniently because
//! the submission answer carries no results yet and the completed answer may
//! omit phases that did not run (an interpreted language has no compile step).

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Returned to the caller when the run produced nothing on stdout
pub const NO_OUTPUT: &str = "No output";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PhaseOutput {
    pub stdout: Option<String>,
    pub stderr: Option<String>,
    pub code: Option<i64>,
    pub output: Option<String>,
    pub signal: Option<Value>,
    pub cpu_time: Option<f64>,
    pub wall_time: Option<f64>,
    pub memory: Option<f64>,
    pub message: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TestcaseEcho {
    pub index: Option<u32>,
    pub visibility: Option<String>,
    pub input: Option<String>,
    pub output: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IoResult {
    pub compile: Option<PhaseOutput>,
    pub run: Option<PhaseOutput>,
    pub testcase: Option<TestcaseEcho>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecuteData {
    pub id: String,
    #[serde(rename = "IOResults", default, deserialize_with = "null_as_default")]
    pub io_results: Vec<IoResult>,
    #[serde(rename = "exprResults", default, deserialize_with = "null_as_default")]
    pub expr_results: Vec<Value>,
    #[serde(rename = "transactionId", default)]
    pub transaction_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseExecute {
    #[serde(default, deserialize_with = "null_as_default")]
    pub success: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub message: String,
    pub data: ExecuteData,
}

/// Treat an explicit `null` the same as a missing key
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Project a completed execution down to the first test case's run stdout.
///
/// stderr, exit codes and compile diagnostics are not surfaced.
pub fn extract_output(result: &ResponseExecute) -> String {
    result
        .data
        .io_results
        .first()
        .and_then(|io| io.run.as_ref())
        .and_then(|run| run.stdout.as_deref())
        .filter(|stdout| !stdout.is_empty())
        .unwrap_or(NO_OUTPUT)
        .to_string()
}
