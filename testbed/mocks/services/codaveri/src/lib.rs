//! Scripted stand-in for the Codaveri execution API
//!
//! Serves `POST /execute` and `GET /execute?id=` with the same envelope the
//! real backend uses. A [`BackendFixture`] decides how many status queries
//! answer 404 before the job completes, what the run printed, and whether
//! submissions are rejected. Every request is recorded so tests can assert on
//! exactly what a client sent.

pub mod fixtures;
pub mod handlers;
pub mod server;

pub use fixtures::{BackendFixture, SubmitFailure};
pub use server::{MockServer, RecordedHeaders, RunningMockServer};
