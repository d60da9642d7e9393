//! Error types for the remote execution pipeline
//!
//! Failures are grouped by where they originate: configuration, language
//! resolution, the submission call, the completion poll and the tool layer.
//! Only the submission and poll variants carry backend detail; a job that ran
//! but crashed is not an error at this level.

use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum CodaveriError {
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Unsupported language: {0}")]
    UnsupportedLanguage(String),
    #[error("API Error: {status} {status_text} - {body}")]
    SubmissionFailed {
        status: u16,
        status_text: String,
        body: String,
    },
    #[error("Execution {job_id} did not complete after {attempts} status queries ({elapsed:?})")]
    PollTimeout {
        job_id: String,
        attempts: u32,
        elapsed: Duration,
    },
    #[error("Transport error: {0}")]
    Transport(String),
    #[error("Failed to decode backend response: {0}")]
    Decode(String),
    #[error("Tool execution failed for '{tool_name}': {message}")]
    ToolError { tool_name: String, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submission_error_message_carries_status_and_body() {
        let err = CodaveriError::SubmissionFailed {
            status: 500,
            status_text: "Internal Server Error".to_string(),
            body: "quota exceeded".to_string(),
        };
        let message = err.to_string();
        assert!(message.contains("500"));
        assert!(message.contains("Internal Server Error"));
        assert!(message.contains("quota exceeded"));
    }

    #[test]
    fn test_unsupported_language_message() {
        let err = CodaveriError::UnsupportedLanguage("brainfuck".to_string());
        assert_eq!(err.to_string(), "Unsupported language: brainfuck");
    }
}
