//! `sturdy-http` configures a resilient async HTTP client: a layered
//! request-processing pipeline with exponential-backoff retry for transient
//! failures (connection errors, server errors, and a configurable set of
//! client-error statuses).
//!
//! The usual entry point is [`SturdyClient`]:
//! - [`SturdyClient::new`] / [`SturdyClient::with_options`]: default
//!   pipeline over a configured `reqwest` transport
//! - [`SturdyClient::with_pipeline`]: bring your own [`Pipeline`], get just
//!   the retry stage on top
//!
//! The retry decision and backoff live in [`RetryPolicy`], independently
//! testable without a client or transport.

mod client;
mod error;
mod http_errors;
mod options;
mod pipeline;
mod retry;
mod transport;

pub use client::SturdyClient;
pub use error::SturdyError;
pub use http_errors::HttpErrorStage;
pub use options::ClientOptions;
pub use pipeline::{Next, Pipeline, Stage, Transport};
pub use retry::{RetryPolicy, RetryState};
pub use transport::HttpTransport;

pub type Result<T> = std::result::Result<T, SturdyError>;
