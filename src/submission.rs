//! Request submission with retry logic.
//!
//! The back end is simulated: [`SimulatedSubmitter`] waits a fixed delay,
//! assigns a request id and records the request in the tracking history.
//! [`SubmissionCoordinator`] wraps any submitter with exponential backoff
//! for transient failures and allows one submission at a time.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use backon::{ExponentialBuilder, Retryable};
use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::config::SubmissionConfig;
use crate::request::RequestDraft;
use crate::tracking::{RequestHistory, TrackedRequest};

/// Errors returned by a submission attempt
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubmissionError {
    /// The back end could not be reached; worth retrying
    #[error("service temporarily unavailable: {0}")]
    Unavailable(String),

    #[error("request rejected: {0}")]
    Rejected(String),

    #[error("a submission is already in progress")]
    AlreadyInFlight,
}

impl SubmissionError {
    pub fn is_transient(&self) -> bool {
        matches!(self, SubmissionError::Unavailable(_))
    }
}

/// Acknowledgement of an accepted request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionReceipt {
    pub request_id: String,
    pub submitted_at: DateTime<Utc>,
}

/// Back end that accepts completed requests
#[async_trait]
pub trait RequestSubmitter: Send + Sync {
    async fn submit(&self, draft: &RequestDraft) -> Result<SubmissionReceipt, SubmissionError>;
}

/// Generate a request id of the form `REQ-1A2B3C4D`
pub fn new_request_id() -> String {
    let hex = Uuid::new_v4().simple().to_string();
    format!("REQ-{}", hex[..8].to_uppercase())
}

/// In-process stand-in for the request back end
pub struct SimulatedSubmitter {
    delay: Duration,
    history: RequestHistory,
    failures_remaining: AtomicU32,
    attempts: AtomicU32,
}

impl SimulatedSubmitter {
    pub fn new(history: RequestHistory, config: &SubmissionConfig) -> Self {
        Self {
            delay: Duration::from_millis(config.delay_ms),
            history,
            failures_remaining: AtomicU32::new(config.simulate_failures),
            attempts: AtomicU32::new(0),
        }
    }

    /// Override the response delay
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Make the next `count` calls fail with a transient error
    pub fn fail_next(&self, count: u32) {
        self.failures_remaining.store(count, Ordering::SeqCst);
    }

    /// Number of calls received so far
    pub fn attempts(&self) -> u32 {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RequestSubmitter for SimulatedSubmitter {
    async fn submit(&self, draft: &RequestDraft) -> Result<SubmissionReceipt, SubmissionError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;

        let should_fail = self
            .failures_remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if should_fail {
            return Err(SubmissionError::Unavailable(
                "simulated outage".to_string(),
            ));
        }

        let receipt = SubmissionReceipt {
            request_id: new_request_id(),
            submitted_at: Utc::now(),
        };
        self.history
            .record(TrackedRequest::from_submission(
                &receipt.request_id,
                draft,
                receipt.submitted_at,
            ))
            .map_err(|err| SubmissionError::Unavailable(format!("failed to record request: {err}")))?;

        info!(request_id = %receipt.request_id, "Request accepted");
        Ok(receipt)
    }
}

/// Submits requests through a [`RequestSubmitter`] with retry
pub struct SubmissionCoordinator {
    submitter: Arc<dyn RequestSubmitter>,
    in_flight: AtomicBool,
    /// Maximum retry attempts
    max_retries: usize,
    /// Base delay for exponential backoff
    base_delay: Duration,
    /// Maximum delay between retries
    max_delay: Duration,
}

/// Clears the in-flight flag when the submission ends
struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl SubmissionCoordinator {
    pub fn new(submitter: Arc<dyn RequestSubmitter>, config: &SubmissionConfig) -> Self {
        Self::with_retry_config(
            submitter,
            config.max_retries,
            Duration::from_millis(config.retry_base_delay_ms),
            Duration::from_millis(config.retry_max_delay_ms),
        )
    }

    /// Create with custom retry settings
    pub fn with_retry_config(
        submitter: Arc<dyn RequestSubmitter>,
        max_retries: usize,
        base_delay: Duration,
        max_delay: Duration,
    ) -> Self {
        Self {
            submitter,
            in_flight: AtomicBool::new(false),
            max_retries,
            base_delay,
            max_delay,
        }
    }

    fn retry_strategy(&self) -> ExponentialBuilder {
        ExponentialBuilder::default()
            .with_min_delay(self.base_delay)
            .with_max_delay(self.max_delay)
            .with_max_times(self.max_retries)
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Submit a validated draft, retrying transient failures
    #[instrument(skip_all)]
    pub async fn submit(&self, draft: &RequestDraft) -> Result<SubmissionReceipt, SubmissionError> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(SubmissionError::AlreadyInFlight);
        }
        let _guard = InFlightGuard(&self.in_flight);

        let submitter = &self.submitter;
        let op = move || async move { submitter.submit(draft).await };

        let result = op
            .retry(self.retry_strategy())
            .when(SubmissionError::is_transient)
            .notify(|err, dur| {
                warn!("Retrying submission after {:?}: {}", dur, err);
            })
            .await;

        if let Err(err) = &result {
            warn!(error = %err, "Submission failed");
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn config(failures: u32) -> SubmissionConfig {
        SubmissionConfig {
            delay_ms: 0,
            max_retries: 3,
            retry_base_delay_ms: 1,
            retry_max_delay_ms: 5,
            simulate_failures: failures,
        }
    }

    fn setup(failures: u32) -> (RequestHistory, Arc<SimulatedSubmitter>, SubmissionCoordinator) {
        let history = RequestHistory::new(Arc::new(MemoryStore::new()));
        let submitter = Arc::new(SimulatedSubmitter::new(history.clone(), &config(failures)));
        let coordinator = SubmissionCoordinator::new(submitter.clone(), &config(failures));
        (history, submitter, coordinator)
    }

    #[test]
    fn test_request_id_format() {
        let id = new_request_id();
        assert_eq!(id.len(), 12);
        assert!(id.starts_with("REQ-"));
        assert!(id[4..].chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_only_unavailable_is_transient() {
        assert!(SubmissionError::Unavailable("x".into()).is_transient());
        assert!(!SubmissionError::Rejected("x".into()).is_transient());
        assert!(!SubmissionError::AlreadyInFlight.is_transient());
    }

    #[tokio::test]
    async fn test_submit_records_history() {
        let (history, submitter, coordinator) = setup(0);
        let draft = RequestDraft::default().toggle_category("Website");

        let receipt = coordinator.submit(&draft).await.unwrap();

        assert_eq!(submitter.attempts(), 1);
        let recorded = history.list();
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].id, receipt.request_id);
        assert_eq!(recorded[0].title, "Website");
        assert!(!coordinator.is_in_flight());
    }

    #[tokio::test]
    async fn test_transient_failures_are_retried() {
        let (history, submitter, coordinator) = setup(2);

        let result = coordinator.submit(&RequestDraft::default()).await;

        assert!(result.is_ok());
        assert_eq!(submitter.attempts(), 3);
        assert_eq!(history.list().len(), 1);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_retries() {
        let (history, submitter, coordinator) = setup(10);

        let result = coordinator.submit(&RequestDraft::default()).await;

        assert!(matches!(result, Err(SubmissionError::Unavailable(_))));
        assert_eq!(submitter.attempts(), 4);
        assert!(history.list().is_empty());
        assert!(!coordinator.is_in_flight());
    }

    struct RejectingSubmitter(AtomicU32);

    #[async_trait]
    impl RequestSubmitter for RejectingSubmitter {
        async fn submit(&self, _: &RequestDraft) -> Result<SubmissionReceipt, SubmissionError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Err(SubmissionError::Rejected("missing budget".into()))
        }
    }

    #[tokio::test]
    async fn test_rejection_is_not_retried() {
        let submitter = Arc::new(RejectingSubmitter(AtomicU32::new(0)));
        let coordinator = SubmissionCoordinator::new(submitter.clone(), &config(0));

        let result = coordinator.submit(&RequestDraft::default()).await;

        assert_eq!(
            result,
            Err(SubmissionError::Rejected("missing budget".into()))
        );
        assert_eq!(submitter.0.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_concurrent_submission_is_refused() {
        let history = RequestHistory::new(Arc::new(MemoryStore::new()));
        let submitter = Arc::new(
            SimulatedSubmitter::new(history, &config(0)).with_delay(Duration::from_millis(50)),
        );
        let coordinator = SubmissionCoordinator::new(submitter, &config(0));
        let draft = RequestDraft::default();

        let (first, second) = tokio::join!(coordinator.submit(&draft), async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            coordinator.submit(&draft).await
        });

        assert!(first.is_ok());
        assert_eq!(second, Err(SubmissionError::AlreadyInFlight));
    }
}
