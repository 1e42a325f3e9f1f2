//! IBM Quantum backend implementation.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use rustc_hash::FxHashMap;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};

use landau_hal::{
    Backend, BackendAvailability, BackendConfig, BackendFactory, BackendProperties, Capabilities,
    Counts, ExecutionResult, HalError, HalResult, JobId, JobStatus, ValidationResult,
};
use landau_ir::Circuit;
use landau_qasm3::{GateBasis, emit};

use crate::api::{BackendInfo, IbmClient, JobResultResponse, JobStatusResponse, LEGACY_ENDPOINT};
use crate::error::{IbmError, IbmResult};

/// Default IBM Quantum device.
pub const DEFAULT_BACKEND: &str = "ibm_torino";

/// Qubit count assumed until the device configuration has been read.
const FALLBACK_QUBITS: u32 = 133;

/// How long to cache backend info before refreshing from the API.
const BACKEND_INFO_TTL: Duration = Duration::from_secs(5 * 60);

/// IBM Quantum backend adapter.
///
/// Circuits are emitted as OpenQASM 3 in the `rz`/`sx`/`x` basis and run
/// through the Sampler primitive.
pub struct IbmBackend {
    client: Arc<IbmClient>,
    target: String,
    capabilities: Capabilities,
    backend_info: Arc<RwLock<Option<(BackendInfo, Instant)>>>,
    /// Classical register width of each submitted job, used to pad results.
    clbit_widths: Arc<RwLock<FxHashMap<String, usize>>>,
}

impl IbmBackend {
    fn from_client(client: IbmClient, target: String, capabilities: Capabilities) -> Self {
        Self {
            client: Arc::new(client),
            target,
            capabilities,
            backend_info: Arc::new(RwLock::new(None)),
            clbit_widths: Arc::new(RwLock::new(FxHashMap::default())),
        }
    }

    /// Connect to `target` using credentials from the environment.
    ///
    /// `IBM_API_KEY` with `IBM_SERVICE_CRN` selects the Cloud API; otherwise
    /// `IBM_QUANTUM_TOKEN` selects the legacy endpoint.
    pub async fn connect(target: impl Into<String>) -> IbmResult<Self> {
        let target = target.into();

        let client = if let Ok(api_key) = std::env::var("IBM_API_KEY") {
            let service_crn =
                std::env::var("IBM_SERVICE_CRN").map_err(|_| IbmError::MissingServiceCrn)?;
            info!("connecting to IBM Cloud API (IAM key exchange)");
            IbmClient::connect(&api_key, &service_crn).await?
        } else if let Ok(token) = std::env::var("IBM_QUANTUM_TOKEN") {
            info!("connecting to legacy IBM Quantum endpoint");
            IbmClient::new(LEGACY_ENDPOINT, &token)?
        } else {
            return Err(IbmError::MissingToken);
        };

        let mut backend = Self::from_client(
            client,
            target.clone(),
            Capabilities::ibm(&target, FALLBACK_QUBITS, false),
        );

        match backend.get_backend_info().await {
            Ok(info) => backend.capabilities = capabilities_from_info(&info),
            Err(e) => warn!(backend = %target, error = %e, "could not read device configuration"),
        }
        Ok(backend)
    }

    /// Get the target backend name.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Names of all devices visible to these credentials.
    pub async fn list_backends(&self) -> IbmResult<Vec<String>> {
        self.client.list_backends().await
    }

    /// Get backend information, fetching from the API if not cached or stale.
    async fn get_backend_info(&self) -> IbmResult<BackendInfo> {
        {
            let cached = self.backend_info.read().await;
            if let Some((ref info, fetched_at)) = *cached {
                if fetched_at.elapsed() < BACKEND_INFO_TTL {
                    return Ok(info.clone());
                }
            }
        }

        let info = self.client.get_backend(&self.target).await?;
        *self.backend_info.write().await = Some((info.clone(), Instant::now()));
        Ok(info)
    }
}

fn capabilities_from_info(info: &BackendInfo) -> Capabilities {
    let mut caps = Capabilities::ibm(
        &info.name,
        u32::try_from(info.num_qubits).unwrap_or(u32::MAX),
        info.simulator,
    );
    if let Some(max_shots) = info.max_shots {
        caps.max_shots = max_shots;
    }
    caps
}

/// Decode a Sampler result into counts over `width` classical bits.
///
/// `width` is the circuit's register width when known; otherwise it is
/// inferred from the data.
fn results_to_counts(results: &JobResultResponse, width: Option<usize>) -> IbmResult<Counts> {
    let result = results
        .results
        .first()
        .ok_or_else(|| IbmError::MalformedResult("empty result list".into()))?;

    // V2: per-shot hex samples under the classical register name.
    if let Some(data) = &result.data {
        let register = data
            .get("c")
            .or_else(|| data.values().next())
            .ok_or_else(|| IbmError::MalformedResult("no classical register data".into()))?;
        let width = width.unwrap_or_else(|| infer_bit_width(&register.samples));
        return Ok(register
            .samples
            .iter()
            .map(|sample| (hex_to_binary(sample, width), 1))
            .collect());
    }

    // V1: aggregated counts, else quasi-distributions scaled by shots.
    if let Some(raw_counts) = &result.counts {
        return Ok(raw_counts
            .iter()
            .map(|(key, &count)| (hex_to_binary(key, width.unwrap_or(0)), count))
            .collect());
    }

    if let Some(dist) = result.quasi_dists.as_ref().and_then(|d| d.first()) {
        let shots = result
            .metadata
            .as_ref()
            .and_then(|m| m.get("shots"))
            .and_then(serde_json::Value::as_u64)
            .ok_or_else(|| IbmError::MalformedResult("quasi-distribution without shots".into()))?;
        return Ok(dist
            .iter()
            .filter_map(|(key, &prob)| {
                let count = (prob * shots as f64).max(0.0).round() as u64;
                (count > 0).then(|| (hex_to_binary(key, width.unwrap_or(0)), count))
            })
            .collect());
    }

    Err(IbmError::MalformedResult(
        "result carries neither samples nor counts".into(),
    ))
}

/// Smallest bit width holding every sample; at least 1.
fn infer_bit_width(samples: &[String]) -> usize {
    let max_val = samples
        .iter()
        .filter_map(|s| u64::from_str_radix(s.strip_prefix("0x").unwrap_or(s), 16).ok())
        .max()
        .unwrap_or(0);
    (64 - max_val.leading_zeros() as usize).max(1)
}

/// Hex to binary, zero-padded to `width`.
///
/// A zero width falls back to four bits per hex digit. Strings that are not
/// hex are returned as they are.
fn hex_to_binary(hex: &str, width: usize) -> String {
    let hex = hex.strip_prefix("0x").unwrap_or(hex);
    match u64::from_str_radix(hex, 16) {
        Ok(value) => {
            let width = if width > 0 { width } else { hex.len() * 4 };
            format!("{value:0>width$b}")
        }
        Err(_) => hex.to_string(),
    }
}

fn map_status(raw: &JobStatusResponse) -> JobStatus {
    if raw.is_queued() {
        JobStatus::Queued
    } else if raw.is_completed() {
        JobStatus::Completed
    } else if raw.is_failed() {
        JobStatus::Failed(
            raw.error_message()
                .unwrap_or_else(|| "Unknown error".to_string()),
        )
    } else if raw.is_cancelled() {
        JobStatus::Cancelled
    } else {
        JobStatus::Running
    }
}

/// Fail unless the job has results to fetch.
fn ensure_completed(raw: &JobStatusResponse) -> IbmResult<()> {
    match map_status(raw) {
        JobStatus::Completed => Ok(()),
        JobStatus::Failed(msg) => Err(IbmError::JobFailed(msg)),
        JobStatus::Cancelled => Err(IbmError::JobCancelled(raw.id.clone())),
        status => Err(IbmError::ApiError {
            code: None,
            message: format!("Job {} not yet completed ({status})", raw.id),
        }),
    }
}

#[async_trait]
impl Backend for IbmBackend {
    fn name(&self) -> &str {
        &self.target
    }

    fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    async fn availability(&self) -> HalResult<BackendAvailability> {
        match self.get_backend_info().await {
            Ok(info) if info.status.operational => Ok(BackendAvailability {
                is_available: true,
                queue_depth: info.status.pending_jobs,
                status_message: info.status.status_msg,
            }),
            Ok(info) => Ok(BackendAvailability::unavailable(
                info.status
                    .status_msg
                    .unwrap_or_else(|| "backend offline".to_string()),
            )),
            Err(e) => {
                warn!(backend = %self.target, error = %e, "availability check failed");
                Ok(BackendAvailability::unavailable("failed to query backend"))
            }
        }
    }

    async fn validate(&self, circuit: &Circuit) -> HalResult<ValidationResult> {
        let mut reasons = Vec::new();

        if circuit.num_qubits() > self.capabilities.num_qubits as usize {
            reasons.push(format!(
                "Circuit requires {} qubits but backend only has {}",
                circuit.num_qubits(),
                self.capabilities.num_qubits
            ));
        }
        if let Err(e) = emit(circuit, GateBasis::Native) {
            reasons.push(e.to_string());
        }

        if reasons.is_empty() {
            Ok(ValidationResult::Valid)
        } else {
            Ok(ValidationResult::Invalid { reasons })
        }
    }

    #[instrument(skip(self, circuit), fields(backend = %self.target, circuit = circuit.name()))]
    async fn submit(&self, circuit: &Circuit, shots: u32) -> HalResult<JobId> {
        if shots == 0 || shots > self.capabilities.max_shots {
            return Err(HalError::InvalidShots(format!(
                "{shots} shots requested, {} accepts 1..={}",
                self.target, self.capabilities.max_shots
            )));
        }

        let info = self.get_backend_info().await?;
        if circuit.num_qubits() > info.num_qubits {
            return Err(IbmError::TooManyQubits {
                required: circuit.num_qubits(),
                available: info.num_qubits,
            }
            .into());
        }
        if !info.status.operational {
            return Err(HalError::BackendUnavailable(
                info.status
                    .status_msg
                    .unwrap_or_else(|| "Backend offline".to_string()),
            ));
        }

        let qasm = emit(circuit, GateBasis::Native)
            .map_err(|e| IbmError::CircuitError(e.to_string()))?;
        debug!(lines = qasm.lines().count(), "emitted OpenQASM 3");

        let response = self
            .client
            .submit_sampler_job(&self.target, vec![qasm], shots)
            .await
            .map_err(|e| HalError::SubmissionFailed(e.to_string()))?;

        self.clbit_widths
            .write()
            .await
            .insert(response.id.clone(), circuit.num_clbits());
        info!(job_id = %response.id, shots, "job submitted");

        Ok(JobId(response.id))
    }

    async fn status(&self, job_id: &JobId) -> HalResult<JobStatus> {
        let raw = self.client.get_job_status(&job_id.0).await?;
        Ok(map_status(&raw))
    }

    async fn result(&self, job_id: &JobId) -> HalResult<ExecutionResult> {
        ensure_completed(&self.client.get_job_status(&job_id.0).await?)?;

        let results = self.client.get_job_results(&job_id.0).await?;
        let width = self.clbit_widths.read().await.get(&job_id.0).copied();
        let counts = results_to_counts(&results, width)?;
        let shots = u32::try_from(counts.total_shots()).unwrap_or(u32::MAX);

        Ok(ExecutionResult::new(counts, shots))
    }

    async fn cancel(&self, job_id: &JobId) -> HalResult<()> {
        self.client.cancel_job(&job_id.0).await?;
        Ok(())
    }

    async fn properties(&self) -> HalResult<BackendProperties> {
        let raw = self.client.get_properties(&self.target).await?;
        Ok(raw.into_backend_properties())
    }
}

impl BackendFactory for IbmBackend {
    /// Legacy-token construction. Recognized `extra` keys: `backend`,
    /// `instance`, `num_qubits`.
    fn from_config(config: BackendConfig) -> HalResult<Self> {
        let token = config.token.as_deref().ok_or(IbmError::MissingToken)?;
        let endpoint = config.endpoint.as_deref().unwrap_or(LEGACY_ENDPOINT);
        let target = config.extra_str("backend").unwrap_or(DEFAULT_BACKEND);
        let num_qubits = config
            .extra_u64("num_qubits")
            .map_or(FALLBACK_QUBITS, |n| u32::try_from(n).unwrap_or(u32::MAX));

        let mut client = IbmClient::new(endpoint, token)?;
        if let Some(instance) = config.extra_str("instance") {
            client = client.with_instance(instance);
        }

        Ok(Self::from_client(
            client,
            target.to_string(),
            Capabilities::ibm(target, num_qubits, false),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ClassicalRegisterData, SamplerResult};
    use std::collections::HashMap;

    fn v2(samples: &[&str]) -> JobResultResponse {
        let mut data = HashMap::new();
        data.insert(
            "c".to_string(),
            ClassicalRegisterData {
                samples: samples.iter().map(|s| (*s).to_string()).collect(),
            },
        );
        JobResultResponse {
            results: vec![SamplerResult {
                data: Some(data),
                quasi_dists: None,
                counts: None,
                metadata: None,
            }],
        }
    }

    #[test]
    fn test_hex_to_binary() {
        assert_eq!(hex_to_binary("0x0", 0), "0000");
        assert_eq!(hex_to_binary("0x3", 0), "0011");
        assert_eq!(hex_to_binary("0xff", 0), "11111111");
        assert_eq!(hex_to_binary("0x1", 5), "00001");
        assert_eq!(hex_to_binary("0x2", 2), "10");
        assert_eq!(hex_to_binary("zz", 2), "zz");
    }

    #[test]
    fn test_infer_bit_width() {
        assert_eq!(infer_bit_width(&["0x0".into(), "0x3".into()]), 2);
        assert_eq!(infer_bit_width(&["0x0".into(), "0x7".into()]), 3);
        assert_eq!(infer_bit_width(&["0x0".into(), "0x0".into()]), 1);
    }

    #[test]
    fn test_v2_samples_padded_to_register() {
        // Only clbit 0 ever reads 1 on a 3-bit register.
        let counts = results_to_counts(&v2(&["0x0", "0x1", "0x1", "0x0", "0x1"]), Some(3)).unwrap();
        assert_eq!(counts.get("001"), 3);
        assert_eq!(counts.get("000"), 2);
        assert_eq!(counts.total_shots(), 5);
    }

    #[test]
    fn test_v2_samples_inferred_width() {
        let counts = results_to_counts(&v2(&["0x0", "0x3", "0x3"]), None).unwrap();
        assert_eq!(counts.get("11"), 2);
        assert_eq!(counts.get("00"), 1);
    }

    #[test]
    fn test_v1_counts() {
        let results = JobResultResponse {
            results: vec![SamplerResult {
                data: None,
                quasi_dists: None,
                counts: Some(HashMap::from([
                    ("0x0".to_string(), 400),
                    ("0x1".to_string(), 600),
                ])),
                metadata: None,
            }],
        };
        let counts = results_to_counts(&results, Some(1)).unwrap();
        assert_eq!(counts.get("0"), 400);
        assert_eq!(counts.get("1"), 600);
    }

    #[test]
    fn test_v1_quasi_dists_need_shots() {
        let mut result = SamplerResult {
            data: None,
            quasi_dists: Some(vec![HashMap::from([
                ("0x0".to_string(), 0.25),
                ("0x1".to_string(), 0.75),
            ])]),
            counts: None,
            metadata: None,
        };
        let missing = JobResultResponse {
            results: vec![SamplerResult {
                data: None,
                quasi_dists: result.quasi_dists.clone(),
                counts: None,
                metadata: None,
            }],
        };
        assert!(matches!(
            results_to_counts(&missing, Some(1)),
            Err(IbmError::MalformedResult(_))
        ));

        result.metadata = Some(serde_json::json!({"shots": 1000}));
        let counts = results_to_counts(&JobResultResponse { results: vec![result] }, Some(1)).unwrap();
        assert_eq!(counts.get("0"), 250);
        assert_eq!(counts.get("1"), 750);
    }

    #[test]
    fn test_empty_results_rejected() {
        let empty = JobResultResponse { results: vec![] };
        assert!(results_to_counts(&empty, None).is_err());
    }

    #[test]
    fn test_v2_results_deserialization() {
        let json = r#"{
            "results": [{
                "data": {"c": {"samples": ["0x0", "0x1", "0x1"]}},
                "metadata": {"version": 2, "execution": {"execution_spans": []}}
            }]
        }"#;
        let response: JobResultResponse = serde_json::from_str(json).unwrap();
        let counts = results_to_counts(&response, Some(1)).unwrap();
        assert_eq!(counts.get("1"), 2);
    }

    #[test]
    fn test_status_mapping() {
        let parse = |json: &str| -> JobStatusResponse {
            serde_json::from_str(json).unwrap()
        };
        assert_eq!(map_status(&parse(r#"{"id": "j", "status": "Queued"}"#)), JobStatus::Queued);
        assert_eq!(map_status(&parse(r#"{"id": "j", "status": "Running"}"#)), JobStatus::Running);
        assert_eq!(
            map_status(&parse(r#"{"id": "j", "status": "Completed"}"#)),
            JobStatus::Completed
        );
        assert_eq!(
            map_status(&parse(
                r#"{"id": "j", "status": "Failed", "state": {"reason": "too deep"}}"#
            )),
            JobStatus::Failed("too deep".into())
        );
        assert_eq!(
            map_status(&parse(r#"{"id": "j", "status": "Cancelled"}"#)),
            JobStatus::Cancelled
        );
        assert_eq!(
            map_status(&parse(r#"{"id": "j", "status": "Initializing"}"#)),
            JobStatus::Queued
        );
    }

    #[test]
    fn test_terminal_statuses_become_errors() {
        let parse = |json: &str| -> JobStatusResponse { serde_json::from_str(json).unwrap() };

        assert!(ensure_completed(&parse(r#"{"id": "j", "status": "COMPLETED"}"#)).is_ok());

        let failed = ensure_completed(&parse(
            r#"{"id": "j", "status": "ERROR", "error": {"message": "bad qasm"}}"#,
        ));
        let hal: HalError = failed.unwrap_err().into();
        assert!(matches!(hal, HalError::JobFailed(msg) if msg == "bad qasm"));

        let cancelled = ensure_completed(&parse(r#"{"id": "j", "status": "Cancelled"}"#));
        assert!(matches!(cancelled, Err(IbmError::JobCancelled(id)) if id == "j"));
        let hal: HalError = ensure_completed(&parse(r#"{"id": "j", "status": "Cancelled"}"#))
            .unwrap_err()
            .into();
        assert!(matches!(hal, HalError::JobCancelled));

        assert!(matches!(
            ensure_completed(&parse(r#"{"id": "j", "status": "Running"}"#)),
            Err(IbmError::ApiError { code: None, .. })
        ));
    }

    #[test]
    fn test_from_config() {
        let config = BackendConfig::new("ibm")
            .with_endpoint("https://test.example.com")
            .with_token("test-token")
            .with_extra("backend", serde_json::json!("ibm_fez"))
            .with_extra("num_qubits", serde_json::json!(156));
        let backend = IbmBackend::from_config(config).unwrap();
        assert_eq!(backend.name(), "ibm_fez");
        assert_eq!(backend.capabilities().num_qubits, 156);
        assert!(backend.capabilities().gate_set.is_native("sx"));

        let missing = BackendConfig::new("ibm");
        assert!(matches!(
            IbmBackend::from_config(missing),
            Err(HalError::AuthenticationFailed(_))
        ));
    }

    #[tokio::test]
    async fn test_validate_rejects_wide_circuit() {
        let backend = IbmBackend::from_config(
            BackendConfig::new("ibm")
                .with_token("t")
                .with_extra("num_qubits", serde_json::json!(2)),
        )
        .unwrap();
        let circuit = Circuit::with_size("wide", 3, 3);
        assert!(!backend.validate(&circuit).await.unwrap().is_valid());

        let ok = Circuit::with_size("narrow", 1, 1);
        assert!(backend.validate(&ok).await.unwrap().is_valid());
    }
}
