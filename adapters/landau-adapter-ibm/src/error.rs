//! Error types for the IBM Quantum adapter.

use landau_hal::HalError;
use thiserror::Error;

/// Result type for IBM operations.
pub type IbmResult<T> = Result<T, IbmError>;

/// Errors that can occur when using IBM Quantum.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum IbmError {
    /// Missing API token.
    #[error(
        "IBM Quantum credentials not found. Set IBM_API_KEY (with IBM_SERVICE_CRN) or IBM_QUANTUM_TOKEN."
    )]
    MissingToken,

    /// Token cannot be sent as a header.
    #[error("Invalid IBM Quantum API token")]
    InvalidToken,

    /// IAM token exchange failed.
    #[error("IAM token exchange failed: {0}")]
    IamTokenExchange(String),

    /// Missing service CRN.
    #[error("IBM_SERVICE_CRN environment variable is required when using IBM_API_KEY")]
    MissingServiceCrn,

    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// API returned an error.
    #[error("IBM Quantum API error: {message}")]
    ApiError {
        /// Error code from API.
        code: Option<String>,
        /// Error message.
        message: String,
    },

    /// Job not found.
    #[error("Job not found: {0}")]
    JobNotFound(String),

    /// Job failed.
    #[error("Job failed: {0}")]
    JobFailed(String),

    /// Job was cancelled.
    #[error("Job was cancelled: {0}")]
    JobCancelled(String),

    /// Circuit could not be converted to OpenQASM.
    #[error("Circuit conversion error: {0}")]
    CircuitError(String),

    /// Backend not available.
    #[error("Backend not available: {0}")]
    BackendUnavailable(String),

    /// JSON parsing error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Circuit too large for backend.
    #[error("Circuit requires {required} qubits but backend only has {available}")]
    TooManyQubits {
        /// Qubits needed.
        required: usize,
        /// Qubits available.
        available: usize,
    },

    /// Result payload did not match either sampler format.
    #[error("Malformed job result: {0}")]
    MalformedResult(String),

    /// Invalid parameter.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

impl From<IbmError> for HalError {
    fn from(e: IbmError) -> Self {
        match e {
            IbmError::MissingToken
            | IbmError::InvalidToken
            | IbmError::IamTokenExchange(_)
            | IbmError::MissingServiceCrn => HalError::AuthenticationFailed(e.to_string()),
            IbmError::HttpError(err) => HalError::Network(err),
            IbmError::JsonError(err) => HalError::Serialization(err),
            IbmError::JobNotFound(id) => HalError::JobNotFound(id),
            IbmError::JobFailed(msg) => HalError::JobFailed(msg),
            IbmError::JobCancelled(_) => HalError::JobCancelled,
            IbmError::BackendUnavailable(msg) => HalError::BackendUnavailable(msg),
            IbmError::CircuitError(msg) => HalError::InvalidCircuit(msg),
            IbmError::TooManyQubits {
                required,
                available,
            } => HalError::CircuitTooLarge(format!(
                "Circuit requires {required} qubits but backend only has {available}"
            )),
            IbmError::InvalidParameter(msg) => HalError::Configuration(msg),
            _ => HalError::Backend(e.to_string()),
        }
    }
}
