//! IBM Quantum Platform REST client.
//!
//! Covers the calls a sweep needs:
//! - authentication via IAM key exchange, or a legacy bearer token
//! - backend configuration, status and calibration properties
//! - Sampler job submission, status polling, and result retrieval
//!
//! The Cloud API (`quantum.cloud.ibm.com/api`) and the legacy endpoint
//! (`api.quantum-computing.ibm.com`) share paths but differ in payloads.

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use landau_hal::{BackendProperties, QubitProperties};
use reqwest::{Client, Response, StatusCode, header};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{IbmError, IbmResult};

/// Default IBM Quantum Cloud API endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://quantum.cloud.ibm.com/api";

/// Legacy IBM Quantum API endpoint.
pub const LEGACY_ENDPOINT: &str = "https://api.quantum-computing.ibm.com";

const IAM_TOKEN_URL: &str = "https://iam.cloud.ibm.com/identity/token";

const IBM_API_VERSION: &str = "2026-02-01";

/// Cloudflare rejects the default reqwest user agent.
const USER_AGENT: &str = concat!("landau/", env!("CARGO_PKG_VERSION"));

/// IBM Quantum API client.
pub struct IbmClient {
    client: Client,
    endpoint: String,
    /// Hub/group/project, legacy mode only.
    instance: Option<String>,
    cloud_api: bool,
}

impl fmt::Debug for IbmClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IbmClient")
            .field("endpoint", &self.endpoint)
            .field("instance", &self.instance)
            .field("cloud_api", &self.cloud_api)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Deserialize)]
struct IamTokenResponse {
    access_token: String,
}

fn json_headers(bearer: &str) -> IbmResult<header::HeaderMap> {
    let mut headers = header::HeaderMap::new();
    headers.insert(
        header::AUTHORIZATION,
        header::HeaderValue::from_str(&format!("Bearer {bearer}"))
            .map_err(|_| IbmError::InvalidToken)?,
    );
    headers.insert(
        header::CONTENT_TYPE,
        header::HeaderValue::from_static("application/json"),
    );
    headers.insert(
        header::ACCEPT,
        header::HeaderValue::from_static("application/json"),
    );
    Ok(headers)
}

fn build_client(headers: header::HeaderMap) -> IbmResult<Client> {
    Ok(Client::builder()
        .user_agent(USER_AGENT)
        .default_headers(headers)
        .timeout(Duration::from_secs(60))
        .connect_timeout(Duration::from_secs(10))
        .build()?)
}

/// Turn a non-success response into an [`IbmError`].
///
/// `not_found` decides what a 404 means for the resource being requested.
async fn check(
    response: Response,
    context: &str,
    not_found: impl FnOnce() -> IbmError,
) -> IbmResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status == StatusCode::NOT_FOUND {
        return Err(not_found());
    }
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "no body".to_string());
    let (code, message) = match serde_json::from_str::<ApiErrorResponse>(&body) {
        Ok(err) if !err.message.is_empty() => (err.code, err.message),
        _ => (None, body),
    };
    Err(IbmError::ApiError {
        code,
        message: format!("{context} ({status}): {message}"),
    })
}

impl IbmClient {
    /// Connect with a legacy bearer token.
    pub fn new(endpoint: impl Into<String>, token: &str) -> IbmResult<Self> {
        Ok(Self {
            client: build_client(json_headers(token)?)?,
            endpoint: endpoint.into(),
            instance: None,
            cloud_api: false,
        })
    }

    /// Connect to the Cloud API by exchanging an API key for an IAM token.
    pub async fn connect(api_key: &str, service_crn: &str) -> IbmResult<Self> {
        let iam_client = Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        let response = iam_client
            .post(IAM_TOKEN_URL)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(format!(
                "grant_type=urn:ibm:params:oauth:grant-type:apikey&apikey={api_key}"
            ))
            .send()
            .await
            .map_err(|e| IbmError::IamTokenExchange(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "no body".to_string());
            return Err(IbmError::IamTokenExchange(format!(
                "IAM returned {status}: {body}"
            )));
        }

        let token: IamTokenResponse = response.json().await.map_err(|e| {
            IbmError::IamTokenExchange(format!("failed to parse IAM response: {e}"))
        })?;

        let mut headers = json_headers(&token.access_token)?;
        headers.insert(
            header::HeaderName::from_static("service-crn"),
            header::HeaderValue::from_str(service_crn)
                .map_err(|_| IbmError::InvalidParameter("invalid Service-CRN value".into()))?,
        );
        headers.insert(
            header::HeaderName::from_static("ibm-api-version"),
            header::HeaderValue::from_static(IBM_API_VERSION),
        );

        Ok(Self {
            client: build_client(headers)?,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            instance: None,
            cloud_api: true,
        })
    }

    /// Set the hub/group/project used for legacy job submission.
    #[must_use]
    pub fn with_instance(mut self, instance: impl Into<String>) -> Self {
        self.instance = Some(instance.into());
        self
    }

    /// Whether this client talks to the Cloud API.
    pub fn is_cloud_api(&self) -> bool {
        self.cloud_api
    }

    /// Names of the backends visible to this account.
    pub async fn list_backends(&self) -> IbmResult<Vec<String>> {
        let url = format!("{}/v1/backends", self.endpoint);
        let response = check(self.client.get(&url).send().await?, "list backends", || {
            IbmError::BackendUnavailable("backend listing".into())
        })
        .await?;

        if self.cloud_api {
            let devices: DevicesResponse = response.json().await?;
            Ok(devices.devices.into_iter().map(|d| d.name).collect())
        } else {
            let legacy: LegacyBackendsResponse = response.json().await?;
            Ok(legacy.backends.into_iter().map(|b| b.name).collect())
        }
    }

    /// Configuration and status of one backend.
    pub async fn get_backend(&self, name: &str) -> IbmResult<BackendInfo> {
        if !self.cloud_api {
            let url = format!("{}/v1/backends/{name}", self.endpoint);
            let response = check(self.client.get(&url).send().await?, "get backend", || {
                IbmError::BackendUnavailable(name.to_string())
            })
            .await?;
            return Ok(response.json().await?);
        }

        let url = format!("{}/v1/backends/{name}/configuration", self.endpoint);
        let response = check(
            self.client.get(&url).send().await?,
            "backend configuration",
            || IbmError::BackendUnavailable(name.to_string()),
        )
        .await?;
        let config: BackendConfigResponse = response.json().await?;

        let url = format!("{}/v1/backends/{name}/status", self.endpoint);
        let response = self.client.get(&url).send().await?;
        let status = if response.status().is_success() {
            let s: BackendStatusResponse = response.json().await?;
            BackendStatus {
                operational: s.state,
                status_msg: Some(s.status),
                pending_jobs: Some(u32::try_from(s.length_queue).unwrap_or(u32::MAX)),
            }
        } else {
            warn!(backend = name, status = %response.status(), "status query failed, assuming operational");
            BackendStatus {
                operational: true,
                status_msg: None,
                pending_jobs: None,
            }
        };

        Ok(BackendInfo {
            name: config.backend_name,
            num_qubits: config.n_qubits,
            status,
            basis_gates: config.basis_gates,
            simulator: config.simulator.unwrap_or(false),
            max_shots: config.max_shots,
        })
    }

    /// Latest calibration of one backend.
    pub async fn get_properties(&self, name: &str) -> IbmResult<PropertiesResponse> {
        let url = format!("{}/v1/backends/{name}/properties", self.endpoint);
        let response = check(
            self.client.get(&url).send().await?,
            "backend properties",
            || IbmError::BackendUnavailable(name.to_string()),
        )
        .await?;
        Ok(response.json().await?)
    }

    /// Submit OpenQASM 3 circuits to the Sampler primitive.
    ///
    /// The Cloud API takes V2 PUBs `(circuit, params, shots)`; the legacy
    /// endpoint takes the V1 parameter block.
    pub async fn submit_sampler_job(
        &self,
        backend: &str,
        circuits: Vec<String>,
        shots: u32,
    ) -> IbmResult<SubmitResponse> {
        let url = format!("{}/v1/jobs", self.endpoint);
        let body = sampler_request(backend, circuits, shots, self.cloud_api, self.instance.as_deref());
        debug!(backend, shots, cloud = self.cloud_api, "submitting sampler job");

        let response = check(
            self.client.post(&url).json(&body).send().await?,
            "job submission",
            || IbmError::BackendUnavailable(backend.to_string()),
        )
        .await?;
        Ok(response.json().await?)
    }

    /// Current status of a job.
    pub async fn get_job_status(&self, job_id: &str) -> IbmResult<JobStatusResponse> {
        let url = format!("{}/v1/jobs/{job_id}", self.endpoint);
        let response = check(self.client.get(&url).send().await?, "job status", || {
            IbmError::JobNotFound(job_id.to_string())
        })
        .await?;
        Ok(response.json().await?)
    }

    /// Results of a completed job.
    pub async fn get_job_results(&self, job_id: &str) -> IbmResult<JobResultResponse> {
        let url = format!("{}/v1/jobs/{job_id}/results", self.endpoint);
        let response = check(self.client.get(&url).send().await?, "job results", || {
            IbmError::JobNotFound(job_id.to_string())
        })
        .await?;
        Ok(response.json().await?)
    }

    /// Cancel a job.
    pub async fn cancel_job(&self, job_id: &str) -> IbmResult<()> {
        let url = format!("{}/v1/jobs/{job_id}/cancel", self.endpoint);
        check(self.client.post(&url).send().await?, "cancel job", || {
            IbmError::JobNotFound(job_id.to_string())
        })
        .await?;
        Ok(())
    }
}

fn sampler_request(
    backend: &str,
    circuits: Vec<String>,
    shots: u32,
    cloud_api: bool,
    instance: Option<&str>,
) -> serde_json::Value {
    if cloud_api {
        let pubs: Vec<serde_json::Value> = circuits
            .into_iter()
            .map(|c| serde_json::json!([c, {}, shots]))
            .collect();
        // Circuits arrive in the rz/sx basis; IBM only does qubit layout.
        serde_json::json!({
            "program_id": "sampler",
            "backend": backend,
            "params": {
                "version": 2,
                "pubs": pubs,
                "options": { "optimization_level": 1 }
            }
        })
    } else {
        let mut request = serde_json::json!({
            "program_id": "sampler",
            "backend": backend,
            "params": {
                "circuits": circuits,
                "shots": shots,
                "skip_transpilation": false
            }
        });
        if let Some(hub) = instance {
            request["hub"] = serde_json::json!(hub);
        }
        request
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct DevicesResponse {
    devices: Vec<DeviceEntry>,
}

#[derive(Debug, Deserialize)]
struct DeviceEntry {
    name: String,
}

#[derive(Debug, Deserialize)]
struct LegacyBackendsResponse {
    backends: Vec<BackendInfo>,
}

#[derive(Debug, Deserialize)]
struct BackendConfigResponse {
    backend_name: String,
    n_qubits: usize,
    #[serde(default)]
    basis_gates: Vec<String>,
    #[serde(default)]
    simulator: Option<bool>,
    #[serde(default)]
    max_shots: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct BackendStatusResponse {
    state: bool,
    #[serde(default)]
    status: String,
    #[serde(default)]
    length_queue: u64,
}

/// Backend information.
#[derive(Debug, Clone, Deserialize)]
pub struct BackendInfo {
    /// Backend name.
    pub name: String,
    /// Number of qubits.
    pub num_qubits: usize,
    /// Backend status.
    pub status: BackendStatus,
    /// Basis gates.
    #[serde(default)]
    pub basis_gates: Vec<String>,
    /// Whether this is a simulator.
    #[serde(default)]
    pub simulator: bool,
    /// Maximum number of shots.
    #[serde(default)]
    pub max_shots: Option<u32>,
}

/// Backend status.
#[derive(Debug, Clone, Deserialize)]
pub struct BackendStatus {
    /// Whether the backend is operational.
    pub operational: bool,
    /// Status message.
    #[serde(default)]
    pub status_msg: Option<String>,
    /// Number of pending jobs.
    #[serde(default)]
    pub pending_jobs: Option<u32>,
}

/// Calibration payload of `/v1/backends/{name}/properties`.
#[derive(Debug, Clone, Deserialize)]
pub struct PropertiesResponse {
    /// Backend name.
    pub backend_name: String,
    /// Calibration timestamp (RFC 3339).
    #[serde(default)]
    pub last_update_date: Option<String>,
    /// One list of measured quantities per physical qubit.
    #[serde(default)]
    pub qubits: Vec<Vec<Nduv>>,
}

/// A named, dated, unit-carrying value.
#[derive(Debug, Clone, Deserialize)]
pub struct Nduv {
    /// Quantity name, e.g. `T1` or `prob_meas1_prep0`.
    pub name: String,
    /// Measured value.
    pub value: f64,
    /// Unit, empty for dimensionless quantities.
    #[serde(default)]
    pub unit: String,
}

/// Convert a coherence time to microseconds.
fn to_microseconds(value: f64, unit: &str) -> f64 {
    match unit {
        "s" => value * 1e6,
        "ms" => value * 1e3,
        "ns" => value * 1e-3,
        _ => value,
    }
}

impl PropertiesResponse {
    /// Keep the per-qubit quantities a readout correction and a status
    /// listing use. Unknown names are ignored.
    pub fn into_backend_properties(self) -> BackendProperties {
        let last_update = self.last_update_date.as_deref().and_then(|s| {
            DateTime::parse_from_rfc3339(s)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|e| warn!(value = s, error = %e, "unparseable calibration date"))
                .ok()
        });

        let qubits = self
            .qubits
            .into_iter()
            .map(|entries| {
                let mut props = QubitProperties::default();
                for entry in entries {
                    match entry.name.as_str() {
                        "T1" => props.t1_us = Some(to_microseconds(entry.value, &entry.unit)),
                        "T2" => props.t2_us = Some(to_microseconds(entry.value, &entry.unit)),
                        "readout_error" => props.readout_error = Some(entry.value),
                        "prob_meas1_prep0" => props.prob_meas1_prep0 = Some(entry.value),
                        "prob_meas0_prep1" => props.prob_meas0_prep1 = Some(entry.value),
                        _ => {}
                    }
                }
                props
            })
            .collect();

        BackendProperties {
            backend_name: self.backend_name,
            last_update,
            qubits,
        }
    }
}

/// Job submission response.
#[derive(Debug, Deserialize)]
pub struct SubmitResponse {
    /// Job ID.
    pub id: String,
}

/// Job status response.
#[derive(Debug, Clone, Deserialize)]
pub struct JobStatusResponse {
    /// Job ID.
    pub id: String,
    /// Job status; the Cloud API uses mixed case.
    pub status: String,
    /// Error information (legacy API).
    #[serde(default)]
    pub error: Option<JobError>,
    /// State object with failure reason (Cloud API).
    #[serde(default)]
    pub state: Option<JobState>,
}

/// Job error information (legacy API).
#[derive(Debug, Clone, Deserialize)]
pub struct JobError {
    /// Error message.
    pub message: String,
}

/// Job state with reason (Cloud API).
#[derive(Debug, Clone, Deserialize)]
pub struct JobState {
    /// Reason for failure.
    #[serde(default)]
    pub reason: Option<String>,
}

impl JobStatusResponse {
    fn normalized_status(&self) -> String {
        self.status.to_uppercase()
    }

    /// Check if job is waiting to run.
    pub fn is_queued(&self) -> bool {
        matches!(self.normalized_status().as_str(), "QUEUED" | "INITIALIZING")
    }

    /// Check if job completed successfully.
    pub fn is_completed(&self) -> bool {
        self.normalized_status() == "COMPLETED"
    }

    /// Check if job failed.
    pub fn is_failed(&self) -> bool {
        matches!(self.normalized_status().as_str(), "FAILED" | "ERROR")
    }

    /// Check if job was cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.normalized_status() == "CANCELLED"
    }

    /// Failure reason, preferring the Cloud API field.
    pub fn error_message(&self) -> Option<String> {
        self.state
            .as_ref()
            .and_then(|s| s.reason.clone())
            .or_else(|| self.error.as_ref().map(|e| e.message.clone()))
    }
}

/// Job result response.
#[derive(Debug, Deserialize)]
pub struct JobResultResponse {
    /// One entry per submitted circuit.
    pub results: Vec<SamplerResult>,
}

/// Sampler result for one circuit.
#[derive(Debug, Deserialize)]
pub struct SamplerResult {
    /// V2: classical register name to per-shot samples.
    #[serde(default)]
    pub data: Option<HashMap<String, ClassicalRegisterData>>,
    /// V1: quasi-probability distributions.
    #[serde(default)]
    pub quasi_dists: Option<Vec<HashMap<String, f64>>>,
    /// V1: aggregated counts.
    #[serde(default)]
    pub counts: Option<HashMap<String, u64>>,
    /// Metadata; V1 puts the shot count here.
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
}

/// Classical register data from V2 Sampler results.
#[derive(Debug, Deserialize)]
pub struct ClassicalRegisterData {
    /// One hex string per shot, e.g. `"0x3"`.
    pub samples: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_status_mixed_case() {
        let status: JobStatusResponse = serde_json::from_str(
            r#"{"id": "j", "status": "Failed", "state": {"status": "Failed", "reason": "circuit too deep", "reason_code": 1513}}"#,
        )
        .unwrap();
        assert!(status.is_failed());
        assert!(!status.is_completed());
        assert_eq!(status.error_message().unwrap(), "circuit too deep");

        let legacy: JobStatusResponse = serde_json::from_str(
            r#"{"id": "j", "status": "ERROR", "error": {"message": "bad qasm"}}"#,
        )
        .unwrap();
        assert!(legacy.is_failed());
        assert_eq!(legacy.error_message().unwrap(), "bad qasm");

        let init: JobStatusResponse =
            serde_json::from_str(r#"{"id": "j", "status": "Initializing"}"#).unwrap();
        assert!(init.is_queued());
        assert!(!init.is_cancelled());
    }

    #[test]
    fn test_sampler_request_v2() {
        let body = sampler_request("ibm_torino", vec!["OPENQASM 3.0;".into()], 5000, true, None);
        assert_eq!(body["params"]["version"], 2);
        assert_eq!(body["params"]["pubs"][0][2], 5000);
        assert_eq!(body["params"]["pubs"][0][0], "OPENQASM 3.0;");
        assert!(body.get("hub").is_none());
    }

    #[test]
    fn test_sampler_request_legacy_with_hub() {
        let body = sampler_request(
            "ibmq_qasm",
            vec!["OPENQASM 3.0;".into()],
            100,
            false,
            Some("ibm-q/open/main"),
        );
        assert_eq!(body["params"]["shots"], 100);
        assert_eq!(body["hub"], "ibm-q/open/main");
    }

    #[test]
    fn test_devices_response_deserialization() {
        let json = r#"{"devices": [
            {"name": "ibm_fez", "status": {"name": "online"}},
            {"name": "ibm_torino", "status": {"name": "online"}}
        ]}"#;
        let resp: DevicesResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.devices[1].name, "ibm_torino");
    }

    #[test]
    fn test_backend_config_deserialization() {
        let json = r#"{
            "backend_name": "ibm_torino",
            "n_qubits": 133,
            "basis_gates": ["cz", "id", "rz", "sx", "x"],
            "simulator": false
        }"#;
        let config: BackendConfigResponse = serde_json::from_str(json).unwrap();
        assert_eq!(config.n_qubits, 133);
        assert_eq!(config.basis_gates.len(), 5);
        assert_eq!(config.max_shots, None);
    }

    #[test]
    fn test_properties_conversion() {
        let json = r#"{
            "backend_name": "ibm_torino",
            "last_update_date": "2026-03-01T08:15:00+00:00",
            "qubits": [
                [
                    {"date": "2026-03-01T08:00:00+00:00", "name": "T1", "unit": "us", "value": 182.5},
                    {"date": "2026-03-01T08:00:00+00:00", "name": "T2", "unit": "ns", "value": 95000.0},
                    {"date": "2026-03-01T08:00:00+00:00", "name": "readout_error", "unit": "", "value": 0.015},
                    {"date": "2026-03-01T08:00:00+00:00", "name": "prob_meas0_prep1", "unit": "", "value": 0.02},
                    {"date": "2026-03-01T08:00:00+00:00", "name": "prob_meas1_prep0", "unit": "", "value": 0.01},
                    {"date": "2026-03-01T08:00:00+00:00", "name": "frequency", "unit": "GHz", "value": 4.9}
                ],
                [
                    {"date": "2026-03-01T08:00:00+00:00", "name": "readout_error", "unit": "", "value": 0.03}
                ]
            ],
            "gates": []
        }"#;
        let response: PropertiesResponse = serde_json::from_str(json).unwrap();
        let props = response.into_backend_properties();

        assert_eq!(props.backend_name, "ibm_torino");
        assert!(props.last_update.is_some());
        assert_eq!(props.qubits.len(), 2);
        assert_eq!(props.qubits[0].t1_us, Some(182.5));
        assert!((props.qubits[0].t2_us.unwrap() - 95.0).abs() < 1e-9);

        let q0 = props.readout_error(0).unwrap();
        assert_eq!(q0.prob_meas1_prep0, 0.01);
        assert_eq!(q0.prob_meas0_prep1, 0.02);

        // Only the mean is reported for qubit 1.
        let q1 = props.readout_error(1).unwrap();
        assert_eq!(q1.prob_meas1_prep0, 0.03);
        assert_eq!(q1.prob_meas0_prep1, 0.03);
    }

    #[test]
    fn test_legacy_client_is_not_cloud() {
        let client = IbmClient::new(LEGACY_ENDPOINT, "test-token").unwrap();
        assert!(!client.is_cloud_api());
        assert!(!format!("{client:?}").contains("test-token"));
    }
}
