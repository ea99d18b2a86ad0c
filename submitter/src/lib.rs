#![deny(clippy::unwrap_used, clippy::panic)]

pub use attempt::{SimulateWarning, SubmissionAttempt, SubmissionState};
pub use error::SubmissionFailure;
pub use metrics::SubmitterMetrics;
pub use submitter::{SubmitsTransactions, SubmitterSettings, TransactionSubmitter};

mod attempt;
mod error;
mod metrics;
mod submitter;

#[cfg(test)]
mod tests;
