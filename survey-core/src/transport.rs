//! Submission transport seam.
//!
//! The report is never sent anywhere real. [`SimulatedTransport`] stands in
//! for the network round trip with a fixed delay and always succeeds; tests
//! substitute their own implementations to skip the wait or to fail.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::session::AutosaveSnapshot;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("Submission service unavailable: {0}")]
    Unavailable(String),

    #[error("Submission rejected: {0}")]
    Rejected(String),
}

/// Acknowledgement returned by a transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionReceipt {
    /// Number of form-data entries carried by the report.
    pub field_count: usize,
}

#[async_trait]
pub trait SubmissionTransport: Send + Sync {
    async fn submit(
        &self,
        report: &AutosaveSnapshot,
    ) -> Result<SubmissionReceipt, TransportError>;
}

/// Waits a fixed delay, then acknowledges the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulatedTransport {
    pub delay: Duration,
}

impl SimulatedTransport {
    pub const DEFAULT_DELAY: Duration = Duration::from_secs(2);

    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    /// No delay at all.
    pub fn immediate() -> Self {
        Self::new(Duration::ZERO)
    }
}

impl Default for SimulatedTransport {
    fn default() -> Self {
        Self::new(Self::DEFAULT_DELAY)
    }
}

#[async_trait]
impl SubmissionTransport for SimulatedTransport {
    async fn submit(
        &self,
        report: &AutosaveSnapshot,
    ) -> Result<SubmissionReceipt, TransportError> {
        debug!(delay_ms = self.delay.as_millis() as u64, "simulating submission");
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        Ok(SubmissionReceipt {
            field_count: report.len(),
        })
    }
}
