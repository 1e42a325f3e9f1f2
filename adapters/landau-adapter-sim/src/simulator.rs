//! Simulator backend implementation.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

use async_trait::async_trait;
use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rustc_hash::FxHashMap;
use tracing::{debug, instrument};
use uuid::Uuid;

use landau_hal::{
    Backend, BackendAvailability, BackendConfig, BackendFactory, BackendProperties, Capabilities,
    Counts, ExecutionResult, HalError, HalResult, Job, JobId, JobStatus, QubitProperties,
    ReadoutError, ValidationResult,
};
use landau_ir::{Circuit, InstructionKind};

use crate::statevector::Statevector;

const DEFAULT_MAX_QUBITS: u32 = 16;

/// Job data for the simulator.
struct SimJob {
    job: Job,
    result: Option<ExecutionResult>,
}

/// Local statevector backend.
///
/// Circuits run to completion inside `submit`. Measurement outcomes are
/// drawn from a seedable RNG and then passed through a per-qubit readout
/// channel that flips 0→1 with `prob_meas1_prep0` and 1→0 with
/// `prob_meas0_prep1`. The same rates are reported by `properties()`.
pub struct SimulatorBackend {
    config: BackendConfig,
    capabilities: Capabilities,
    readout: Vec<ReadoutError>,
    rng: Mutex<StdRng>,
    jobs: Arc<Mutex<FxHashMap<String, SimJob>>>,
}

impl SimulatorBackend {
    /// Create a noiseless simulator seeded from OS entropy.
    pub fn new() -> Self {
        Self::build(
            BackendConfig::new("simulator"),
            DEFAULT_MAX_QUBITS,
            StdRng::from_entropy(),
        )
    }

    /// Create a simulator with custom max qubits.
    pub fn with_max_qubits(max_qubits: u32) -> Self {
        Self::build(
            BackendConfig::new("simulator"),
            max_qubits,
            StdRng::from_entropy(),
        )
    }

    fn build(config: BackendConfig, max_qubits: u32, rng: StdRng) -> Self {
        let mut capabilities = Capabilities::simulator(max_qubits);
        capabilities.name.clone_from(&config.name);
        Self {
            config,
            capabilities,
            readout: vec![ReadoutError::ideal(); max_qubits as usize],
            rng: Mutex::new(rng),
            jobs: Arc::new(Mutex::new(FxHashMap::default())),
        }
    }

    /// Reseed the sampler for reproducible counts.
    #[must_use]
    pub fn with_seed(self, seed: u64) -> Self {
        *self.rng.lock().unwrap_or_else(PoisonError::into_inner) = StdRng::seed_from_u64(seed);
        self
    }

    /// Apply the same readout error to every qubit.
    #[must_use]
    pub fn with_readout_error(mut self, error: ReadoutError) -> Self {
        self.readout.fill(error);
        self.refresh_features();
        self
    }

    /// Apply a readout error to one qubit.
    #[must_use]
    pub fn with_qubit_readout_error(mut self, qubit: u32, error: ReadoutError) -> Self {
        if let Some(slot) = self.readout.get_mut(qubit as usize) {
            *slot = error;
        }
        self.refresh_features();
        self
    }

    fn refresh_features(&mut self) {
        let noisy = self.readout.iter().any(|e| *e != ReadoutError::ideal());
        self.capabilities.features.retain(|f| f != "readout_noise");
        if noisy {
            self.capabilities.features.push("readout_noise".into());
        }
    }

    fn check_circuit(&self, circuit: &Circuit) -> Vec<String> {
        let mut reasons = vec![];
        if circuit.num_qubits() > self.capabilities.num_qubits as usize {
            reasons.push(format!(
                "circuit has {} qubits but simulator only supports {}",
                circuit.num_qubits(),
                self.capabilities.num_qubits
            ));
        }

        let mut measured = vec![false; circuit.num_qubits()];
        for inst in circuit.instructions() {
            match inst.kind {
                InstructionKind::Measure => {
                    for q in &inst.qubits {
                        measured[q.index()] = true;
                    }
                }
                InstructionKind::Barrier => {}
                _ => {
                    if inst.qubits.iter().any(|q| measured[q.index()]) {
                        reasons.push(format!(
                            "'{}' on {} follows a measurement",
                            inst.name(),
                            inst.qubits[0]
                        ));
                    }
                }
            }
        }
        reasons
    }

    /// Run simulation synchronously.
    #[instrument(skip(self, circuit), fields(circuit = circuit.name()))]
    fn run_simulation(&self, circuit: &Circuit, shots: u32) -> HalResult<ExecutionResult> {
        let start = Instant::now();

        let mut sv = Statevector::new(circuit.num_qubits());
        for inst in circuit.instructions() {
            sv.apply(inst);
        }

        // (qubit, clbit) pairs; measurements are terminal, so one
        // distribution serves every shot.
        let measurements: Vec<(usize, usize)> = circuit
            .instructions()
            .iter()
            .filter(|inst| inst.is_measure())
            .flat_map(|inst| {
                inst.qubits
                    .iter()
                    .zip(&inst.clbits)
                    .map(|(q, c)| (q.index(), c.index()))
            })
            .collect();

        let dist = WeightedIndex::new(sv.probabilities())
            .map_err(|e| HalError::Backend(format!("invalid statevector: {e}")))?;
        let width = circuit.num_clbits();

        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        let mut tally: FxHashMap<Vec<u8>, u64> = FxHashMap::default();
        for _ in 0..shots {
            let outcome = dist.sample(&mut *rng);
            // Bit 0 is the rightmost character.
            let mut bits = vec![b'0'; width];
            for &(qubit, clbit) in &measurements {
                let ideal = (outcome >> qubit) & 1 == 1;
                let error = self.readout[qubit];
                let flipped = if ideal {
                    rng.gen_bool(error.prob_meas0_prep1)
                } else {
                    rng.gen_bool(error.prob_meas1_prep0)
                };
                if ideal != flipped {
                    bits[width - 1 - clbit] = b'1';
                }
            }
            *tally.entry(bits).or_insert(0) += 1;
        }
        drop(rng);

        let counts: Counts = tally
            .into_iter()
            .map(|(bits, n)| (String::from_utf8_lossy(&bits).into_owned(), n))
            .collect();

        let elapsed = start.elapsed();
        debug!(
            shots,
            outcomes = counts.len(),
            elapsed_us = elapsed.as_micros() as u64,
            "simulation complete"
        );

        Ok(ExecutionResult::new(counts, shots).with_execution_time(elapsed.as_millis() as u64))
    }

    fn with_job<T>(&self, job_id: &JobId, f: impl FnOnce(&mut SimJob) -> T) -> HalResult<T> {
        let mut jobs = self.jobs.lock().unwrap_or_else(PoisonError::into_inner);
        jobs.get_mut(&job_id.0)
            .map(f)
            .ok_or_else(|| HalError::JobNotFound(job_id.0.clone()))
    }
}

impl Default for SimulatorBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Backend for SimulatorBackend {
    fn name(&self) -> &str {
        &self.config.name
    }

    fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    async fn availability(&self) -> HalResult<BackendAvailability> {
        Ok(BackendAvailability::always_available())
    }

    async fn validate(&self, circuit: &Circuit) -> HalResult<ValidationResult> {
        let reasons = self.check_circuit(circuit);
        if reasons.is_empty() {
            Ok(ValidationResult::Valid)
        } else {
            Ok(ValidationResult::Invalid { reasons })
        }
    }

    #[instrument(skip(self, circuit), fields(circuit = circuit.name()))]
    async fn submit(&self, circuit: &Circuit, shots: u32) -> HalResult<JobId> {
        if shots == 0 || shots > self.capabilities.max_shots {
            return Err(HalError::InvalidShots(format!(
                "{shots} shots requested, simulator accepts 1..={}",
                self.capabilities.max_shots
            )));
        }
        if circuit.num_qubits() > self.capabilities.num_qubits as usize {
            return Err(HalError::CircuitTooLarge(format!(
                "Circuit has {} qubits but simulator only supports {}",
                circuit.num_qubits(),
                self.capabilities.num_qubits
            )));
        }
        self.validate(circuit).await?.into_result()?;

        let job_id = JobId::new(Uuid::new_v4().to_string());
        let job = Job::new(job_id.clone(), shots).with_backend(self.name());
        self.jobs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(job_id.0.clone(), SimJob { job, result: None });
        debug!(job_id = %job_id, "submitted job");

        let outcome = self.run_simulation(circuit, shots);
        self.with_job(&job_id, |sim_job| match outcome {
            Ok(result) => {
                sim_job.result = Some(result);
                sim_job.job.transition(JobStatus::Completed);
            }
            Err(e) => sim_job.job.transition(JobStatus::Failed(e.to_string())),
        })?;

        Ok(job_id)
    }

    async fn status(&self, job_id: &JobId) -> HalResult<JobStatus> {
        self.with_job(job_id, |sim_job| sim_job.job.status.clone())
    }

    async fn result(&self, job_id: &JobId) -> HalResult<ExecutionResult> {
        self.with_job(job_id, |sim_job| match (&sim_job.job.status, &sim_job.result) {
            (JobStatus::Completed, Some(result)) => Ok(result.clone()),
            (JobStatus::Failed(msg), _) => Err(HalError::JobFailed(msg.clone())),
            (JobStatus::Cancelled, _) => Err(HalError::JobCancelled),
            (status, _) => Err(HalError::Backend(format!(
                "job {} has no result in state {status}",
                sim_job.job.id
            ))),
        })?
    }

    async fn cancel(&self, job_id: &JobId) -> HalResult<()> {
        self.with_job(job_id, |sim_job| sim_job.job.transition(JobStatus::Cancelled))
    }

    async fn properties(&self) -> HalResult<BackendProperties> {
        Ok(BackendProperties {
            backend_name: self.config.name.clone(),
            last_update: None,
            qubits: self
                .readout
                .iter()
                .map(|e| QubitProperties::with_readout(*e))
                .collect(),
        })
    }
}

impl BackendFactory for SimulatorBackend {
    /// Recognized `extra` keys: `max_qubits`, `seed`, `prob_meas1_prep0`,
    /// `prob_meas0_prep1`.
    fn from_config(config: BackendConfig) -> HalResult<Self> {
        let max_qubits = config
            .extra_u64("max_qubits")
            .map_or(DEFAULT_MAX_QUBITS, |v| v as u32);
        let rng = match config.extra_u64("seed") {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let readout = ReadoutError::new(
            config.extra_f64("prob_meas1_prep0").unwrap_or(0.0),
            config.extra_f64("prob_meas0_prep1").unwrap_or(0.0),
        )?;

        Ok(Self::build(config, max_qubits, rng).with_readout_error(readout))
    }
}
