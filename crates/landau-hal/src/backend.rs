//! Backend trait and configuration.
//!
//! The [`Backend`] trait covers the lifecycle of a job on a quantum backend:
//!
//! ```text
//!   capabilities() ──→ validate() ──→ submit() ──→ status() ──→ result()
//!    (sync, &ref)       (async)       (async)      (async)      (async)
//! ```
//!
//! | Method | Kind | Required | Returns |
//! |--------|------|----------|---------|
//! | `name()` | sync | yes | `&str` |
//! | `capabilities()` | sync | yes | `&Capabilities` |
//! | `availability()` | async | yes | `HalResult<BackendAvailability>` |
//! | `validate()` | async | yes | `HalResult<ValidationResult>` |
//! | `submit()` | async | yes | `HalResult<JobId>` |
//! | `status()` | async | yes | `HalResult<JobStatus>` |
//! | `result()` | async | yes | `HalResult<ExecutionResult>` |
//! | `cancel()` | async | yes | `HalResult<()>` |
//! | `properties()` | async | yes | `HalResult<BackendProperties>` |
//! | `wait()` | async | provided | `HalResult<ExecutionResult>` |
//! | `wait_with()` | async | provided | `HalResult<ExecutionResult>` |

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use landau_ir::Circuit;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::capability::Capabilities;
use crate::error::{HalError, HalResult};
use crate::job::{JobId, JobStatus};
use crate::properties::BackendProperties;
use crate::result::ExecutionResult;

/// Configuration for a backend instance.
#[derive(Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Name of the backend.
    pub name: String,
    /// API endpoint URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    /// Authentication token.
    #[serde(skip_serializing)]
    pub token: Option<String>,
    /// Additional configuration.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl BackendConfig {
    /// Create a new backend configuration.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            endpoint: None,
            token: None,
            extra: serde_json::Map::new(),
        }
    }

    /// Set the endpoint URL.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Set the authentication token.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Add extra configuration.
    #[must_use]
    pub fn with_extra(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    /// Read an extra value as `f64`.
    pub fn extra_f64(&self, key: &str) -> Option<f64> {
        self.extra.get(key).and_then(serde_json::Value::as_f64)
    }

    /// Read an extra value as `u64`.
    pub fn extra_u64(&self, key: &str) -> Option<u64> {
        self.extra.get(key).and_then(serde_json::Value::as_u64)
    }

    /// Read an extra value as a string.
    pub fn extra_str(&self, key: &str) -> Option<&str> {
        self.extra.get(key).and_then(serde_json::Value::as_str)
    }
}

impl fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendConfig")
            .field("name", &self.name)
            .field("endpoint", &self.endpoint)
            .field("token", &"[REDACTED]")
            .field("extra", &self.extra)
            .finish()
    }
}

/// How [`Backend::wait_with`] polls for completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitPolicy {
    /// Delay between status queries.
    pub poll_interval: Duration,
    /// Total time budget; `None` waits forever.
    pub timeout: Option<Duration>,
}

impl WaitPolicy {
    /// Poll every `poll_interval` for at most `timeout`.
    pub fn new(poll_interval: Duration, timeout: Option<Duration>) -> Self {
        Self {
            poll_interval,
            timeout,
        }
    }
}

impl Default for WaitPolicy {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(500),
            timeout: Some(Duration::from_secs(300)),
        }
    }
}

/// Trait for quantum backends.
///
/// - `capabilities()` is synchronous and infallible; implementations cache
///   capabilities at construction time.
/// - `submit()` returns a `JobId` whose initial status is `Queued`.
/// - `result()` is only valid once `status()` reports `Completed`.
/// - `wait()` polls every 500ms for up to 5 minutes.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Get the name of this backend.
    fn name(&self) -> &str;

    /// Get the capabilities of this backend.
    fn capabilities(&self) -> &Capabilities;

    /// Check whether the backend accepts jobs.
    async fn availability(&self) -> HalResult<BackendAvailability>;

    /// Validate a circuit against backend constraints.
    async fn validate(&self, circuit: &Circuit) -> HalResult<ValidationResult>;

    /// Submit a circuit for execution with `shots` repetitions.
    async fn submit(&self, circuit: &Circuit, shots: u32) -> HalResult<JobId>;

    /// Get the status of a job.
    async fn status(&self, job_id: &JobId) -> HalResult<JobStatus>;

    /// Get the result of a completed job.
    async fn result(&self, job_id: &JobId) -> HalResult<ExecutionResult>;

    /// Cancel a running job.
    async fn cancel(&self, job_id: &JobId) -> HalResult<()>;

    /// Fetch the current calibration data.
    async fn properties(&self) -> HalResult<BackendProperties>;

    /// Wait for a job to complete using the default [`WaitPolicy`].
    async fn wait(&self, job_id: &JobId) -> HalResult<ExecutionResult> {
        self.wait_with(job_id, &WaitPolicy::default()).await
    }

    /// Wait for a job to complete and return its result.
    ///
    /// Failed and cancelled jobs become errors. On timeout the job is left
    /// running on the backend.
    async fn wait_with(
        &self,
        job_id: &JobId,
        policy: &WaitPolicy,
    ) -> HalResult<ExecutionResult> {
        let started = tokio::time::Instant::now();

        loop {
            let status = self.status(job_id).await?;
            debug!(job_id = %job_id, status = %status, "polled job status");

            match status {
                JobStatus::Completed => return self.result(job_id).await,
                JobStatus::Failed(msg) => return Err(HalError::JobFailed(msg)),
                JobStatus::Cancelled => return Err(HalError::JobCancelled),
                JobStatus::Queued | JobStatus::Running => {}
            }

            if let Some(timeout) = policy.timeout {
                if started.elapsed() + policy.poll_interval > timeout {
                    return Err(HalError::Timeout(job_id.0.clone()));
                }
            }
            tokio::time::sleep(policy.poll_interval).await;
        }
    }
}

/// Backend availability information.
#[derive(Debug, Clone)]
pub struct BackendAvailability {
    /// Whether the backend is currently accepting jobs.
    pub is_available: bool,
    /// Number of jobs currently in queue (if known).
    pub queue_depth: Option<u32>,
    /// Human-readable status message.
    pub status_message: Option<String>,
}

impl BackendAvailability {
    /// Availability of a backend that never queues.
    pub fn always_available() -> Self {
        Self {
            is_available: true,
            queue_depth: Some(0),
            status_message: None,
        }
    }

    /// Availability of an offline backend.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            is_available: false,
            queue_depth: None,
            status_message: Some(reason.into()),
        }
    }
}

/// Result of circuit validation against backend constraints.
#[derive(Debug, Clone)]
pub enum ValidationResult {
    /// Circuit is valid and can be submitted directly.
    Valid,
    /// Circuit is invalid for this backend.
    Invalid {
        /// Reasons the circuit is invalid.
        reasons: Vec<String>,
    },
}

impl ValidationResult {
    /// Check if the circuit can be submitted as-is.
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationResult::Valid)
    }

    /// Turn an invalid result into [`HalError::InvalidCircuit`].
    pub fn into_result(self) -> HalResult<()> {
        match self {
            ValidationResult::Valid => Ok(()),
            ValidationResult::Invalid { reasons } => {
                Err(HalError::InvalidCircuit(reasons.join("; ")))
            }
        }
    }
}

/// Trait for creating backends from configuration.
pub trait BackendFactory: Backend + Sized {
    /// Create a backend from configuration.
    fn from_config(config: BackendConfig) -> HalResult<Self>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::properties::BackendProperties;
    use crate::result::Counts;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Completes after a fixed number of status polls.
    struct Countdown {
        caps: Capabilities,
        polls_left: AtomicU32,
        outcome: JobStatus,
    }

    impl Countdown {
        fn new(polls: u32, outcome: JobStatus) -> Self {
            Self {
                caps: Capabilities::simulator(1),
                polls_left: AtomicU32::new(polls),
                outcome,
            }
        }
    }

    #[async_trait]
    impl Backend for Countdown {
        fn name(&self) -> &str {
            "countdown"
        }

        fn capabilities(&self) -> &Capabilities {
            &self.caps
        }

        async fn availability(&self) -> HalResult<BackendAvailability> {
            Ok(BackendAvailability::always_available())
        }

        async fn validate(&self, _circuit: &Circuit) -> HalResult<ValidationResult> {
            Ok(ValidationResult::Valid)
        }

        async fn submit(&self, _circuit: &Circuit, _shots: u32) -> HalResult<JobId> {
            Ok(JobId::new("job"))
        }

        async fn status(&self, _job_id: &JobId) -> HalResult<JobStatus> {
            let left = self.polls_left.load(Ordering::SeqCst);
            if left == 0 {
                Ok(self.outcome.clone())
            } else {
                self.polls_left.store(left - 1, Ordering::SeqCst);
                Ok(JobStatus::Running)
            }
        }

        async fn result(&self, _job_id: &JobId) -> HalResult<ExecutionResult> {
            Ok(ExecutionResult::new(Counts::from_pairs([("0", 10)]), 10))
        }

        async fn cancel(&self, _job_id: &JobId) -> HalResult<()> {
            Ok(())
        }

        async fn properties(&self) -> HalResult<BackendProperties> {
            Ok(BackendProperties::ideal("countdown", 1))
        }
    }

    #[test]
    fn test_backend_config() {
        let config = BackendConfig::new("test")
            .with_endpoint("https://api.example.com")
            .with_token("secret-token")
            .with_extra("seed", serde_json::json!(42))
            .with_extra("p01", serde_json::json!(0.02));

        assert_eq!(config.name, "test");
        assert_eq!(config.extra_u64("seed"), Some(42));
        assert_eq!(config.extra_f64("p01"), Some(0.02));
        assert!(config.extra_str("seed").is_none());
        assert!(!format!("{config:?}").contains("secret-token"));
    }

    #[test]
    fn test_validation_result() {
        assert!(ValidationResult::Valid.into_result().is_ok());
        let invalid = ValidationResult::Invalid {
            reasons: vec!["too wide".into(), "too deep".into()],
        };
        assert!(!invalid.is_valid());
        let err = invalid.into_result().unwrap_err();
        assert!(err.to_string().contains("too wide; too deep"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_polls_until_complete() {
        let backend = Countdown::new(3, JobStatus::Completed);
        let result = backend.wait(&JobId::new("job")).await.unwrap();
        assert_eq!(result.counts.get("0"), 10);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_surfaces_failure() {
        let backend = Countdown::new(1, JobStatus::Failed("calibration drift".into()));
        let err = backend.wait(&JobId::new("job")).await.unwrap_err();
        assert!(matches!(err, HalError::JobFailed(ref m) if m == "calibration drift"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_times_out() {
        let backend = Countdown::new(u32::MAX, JobStatus::Completed);
        let policy = WaitPolicy::new(Duration::from_millis(100), Some(Duration::from_secs(1)));
        let err = backend
            .wait_with(&JobId::new("job"), &policy)
            .await
            .unwrap_err();
        assert!(matches!(err, HalError::Timeout(_)));
    }
}
