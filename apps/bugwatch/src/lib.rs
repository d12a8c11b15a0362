//! Bugwatch core library.
//!
//! Fetches bug records from a Bugzilla-style REST search endpoint and either
//! builds a severity-sorted triage report or mails bugs that a previous run
//! has not seen.
//!
//! High-level modules:
//! - `cli`: CLI argument parsing (binary uses this).
//! - `config`: Discovery and effective configuration resolution.
//! - `query`: Search queries and the HTTP client.
//! - `normalize`: Severity classification.
//! - `sort`: Report ordering.
//! - `output`: TSV/HTML/JSON rendering.
//! - `state`: Seen-id persistence and diffing.
//! - `notify`: Mail building and SMTP delivery.
//! - `pipeline`: The report and notify pipelines.
//! - `models`: Bug records and severity types.
pub mod cli;
pub mod config;
pub mod error;
pub mod models;
pub mod normalize;
pub mod notify;
pub mod output;
pub mod pipeline;
pub mod query;
pub mod sort;
pub mod state;
pub mod utils;

pub use error::{Error, Result};
