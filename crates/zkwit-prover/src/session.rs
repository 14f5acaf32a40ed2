//! The prover session.

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use tokio::sync::OnceCell;
use tracing::{debug, info, warn};
use zkwit_core::{
    execute, to_witness, Assignment, BackendKind, BackendParams, CompiledCircuit, Error,
    InputMap, PreparedCircuit, Proof, ProvingBackend, Result, WitnessDocument, WitnessValue,
};
use zkwit_honk::{HonkBackend, HonkKeys};
use zkwit_plonk::{PlonkBackend, PlonkKeys};

use crate::backend::BackendKeys;
use crate::config::ProverConfig;
use crate::state::ProverState;

/// A session over one compiled circuit.
///
/// Keys are derived lazily, at most once per backend, and shared by every
/// call on the session. `Prover` is `Send + Sync`; wrap it in an `Arc` to
/// prove from several tasks at once.
#[derive(Debug)]
pub struct Prover {
    circuit: Arc<PreparedCircuit>,
    config: ProverConfig,
    timeout: Option<Duration>,
    honk: OnceCell<Arc<HonkKeys>>,
    plonk: OnceCell<Arc<PlonkKeys>>,
    derivations: AtomicUsize,
    state: Mutex<ProverState>,
}

impl Prover {
    /// Decode and prepare `circuit`.
    ///
    /// # Errors
    /// [`Error::InvalidCircuit`] if the artifact does not decode or validate.
    pub fn new(circuit: &CompiledCircuit, config: ProverConfig) -> Result<Self> {
        Ok(Self::from_prepared(Arc::new(circuit.prepare()?), config))
    }

    /// Session over an already prepared circuit.
    #[must_use]
    pub fn from_prepared(circuit: Arc<PreparedCircuit>, config: ProverConfig) -> Self {
        Self {
            circuit,
            timeout: config.timeout(),
            config,
            honk: OnceCell::new(),
            plonk: OnceCell::new(),
            derivations: AtomicUsize::new(0),
            state: Mutex::new(ProverState::Uninitialized),
        }
    }

    /// The prepared circuit.
    #[must_use]
    pub fn circuit(&self) -> &PreparedCircuit {
        &self.circuit
    }

    /// Session configuration.
    #[must_use]
    pub const fn config(&self) -> &ProverConfig {
        &self.config
    }

    /// Deadline applied to each orchestrated call.
    #[must_use]
    pub const fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Replace the deadline taken from the config; `None` removes it.
    pub fn set_timeout(&mut self, timeout: Option<Duration>) {
        self.timeout = timeout;
    }

    /// Most recent lifecycle state.
    #[must_use]
    pub fn state(&self) -> ProverState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// How many key derivations have completed on this session.
    #[must_use]
    pub fn key_derivations(&self) -> usize {
        self.derivations.load(Ordering::Relaxed)
    }

    fn transition(&self, next: ProverState) {
        let mut st = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let prev = *st;
        if prev != next {
            info!(from = %prev, to = %next, "prover state");
            *st = next;
        }
    }

    fn has_keys(&self, kind: BackendKind) -> bool {
        match kind {
            BackendKind::Honk => self.honk.initialized(),
            BackendKind::Plonk => self.plonk.initialized(),
            _ => false,
        }
    }

    // A failed call leaves the session Ready only if it still holds keys.
    fn settle_after_failure(&self, kind: BackendKind) {
        if self.has_keys(kind) {
            self.transition(ProverState::Ready);
        }
    }

    fn ensure_enabled(&self, kind: BackendKind) -> Result<()> {
        if self.config.backends.enables(kind) {
            Ok(())
        } else {
            Err(Error::BackendNotEnabled(kind))
        }
    }

    /// Bound `fut` by the configured deadline.
    async fn bounded<T>(
        &self,
        operation: &'static str,
        fut: impl Future<Output = Result<T>>,
    ) -> Result<T> {
        match self.timeout {
            None => fut.await,
            Some(after) => tokio::time::timeout(after, fut).await.unwrap_or_else(|_| {
                warn!(operation, ?after, "deadline exceeded");
                Err(Error::Timeout { operation, after })
            }),
        }
    }

    async fn derive<B: ProvingBackend + 'static>(&self) -> Result<Arc<B::Keys>> {
        let circuit = Arc::clone(&self.circuit);
        let params: BackendParams = self.config.params(B::KIND);
        let started = Instant::now();
        let keys = blocking("derive_keys", move || B::derive_keys(circuit, &params)).await?;
        self.derivations.fetch_add(1, Ordering::Relaxed);
        info!(
            backend = %B::KIND,
            queries = ?params.queries,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "keys derived"
        );
        Ok(Arc::new(keys))
    }

    async fn keys(&self, kind: BackendKind) -> Result<BackendKeys> {
        self.ensure_enabled(kind)?;
        match kind {
            BackendKind::Honk => self
                .honk
                .get_or_try_init(|| self.derive::<HonkBackend>())
                .await
                .map(|k| BackendKeys::Honk(Arc::clone(k))),
            BackendKind::Plonk => self
                .plonk
                .get_or_try_init(|| self.derive::<PlonkBackend>())
                .await
                .map(|k| BackendKeys::Plonk(Arc::clone(k))),
            other => Err(Error::BackendNotEnabled(other)),
        }
    }

    /// Derive (or reuse) keys for `kind`.
    ///
    /// # Errors
    /// [`Error::BackendNotEnabled`], [`Error::Timeout`], or a backend failure.
    pub async fn prepare(&self, kind: BackendKind) -> Result<BackendKeys> {
        let keys = self.bounded("derive_keys", self.keys(kind)).await?;
        if self.state() == ProverState::Uninitialized {
            self.transition(ProverState::Ready);
        }
        Ok(keys)
    }

    /// Serialize, ABI-encode and solve `inputs` without proving.
    ///
    /// # Errors
    /// Any data error from serialization or solving.
    pub fn execute(&self, inputs: &InputMap) -> Result<Assignment> {
        let doc = to_witness(inputs, self.config.witness_encoding)?;
        self.execute_document(&doc)
    }

    /// ABI-encode and solve a serialized witness document.
    ///
    /// # Errors
    /// [`Error::UnsupportedShape`], [`Error::Encoding`] or [`Error::Witness`].
    pub fn execute_document(&self, doc: &WitnessDocument) -> Result<Assignment> {
        let initial = self.circuit.abi().encode(doc)?;
        let assignment = execute(self.circuit.program(), &initial)?;
        debug!(
            witnesses = assignment.values.len(),
            public = assignment.public_inputs.len(),
            "circuit executed"
        );
        Ok(assignment)
    }

    /// Render the return values carried by `proof`, if the circuit has any.
    #[must_use]
    pub fn decode_return(&self, proof: &Proof) -> Option<WitnessValue> {
        let n = self.circuit.program().return_values.len();
        let tail = proof.public_inputs.len().checked_sub(n)?;
        self.circuit
            .abi()
            .decode_return(&proof.public_inputs[tail..], self.config.witness_encoding)
    }

    /// Serialize `inputs`, solve the circuit and prove with `kind`.
    ///
    /// Everything up to solving runs synchronously before the first await,
    /// so data errors surface without touching a backend.
    ///
    /// # Errors
    /// Data errors unchanged, [`Error::BackendNotEnabled`], [`Error::Timeout`].
    pub async fn full_prove(&self, inputs: &InputMap, kind: BackendKind) -> Result<Proof> {
        self.ensure_enabled(kind)?;
        let assignment = self.execute(inputs)?;
        self.prove_assignment(assignment, kind).await
    }

    /// [`Prover::full_prove`] for an already serialized witness document.
    ///
    /// # Errors
    /// As [`Prover::full_prove`].
    pub async fn full_prove_document(
        &self,
        doc: &WitnessDocument,
        kind: BackendKind,
    ) -> Result<Proof> {
        self.ensure_enabled(kind)?;
        let assignment = self.execute_document(doc)?;
        self.prove_assignment(assignment, kind).await
    }

    async fn prove_assignment(&self, assignment: Assignment, kind: BackendKind) -> Result<Proof> {
        let started = Instant::now();
        let res = self
            .bounded("prove", async {
                let keys = self.keys(kind).await?;
                self.transition(ProverState::Proving);
                blocking("prove", move || keys.prove(&assignment)).await
            })
            .await;
        match &res {
            Ok(proof) => {
                self.transition(ProverState::Proved);
                info!(
                    backend = %kind,
                    bytes = proof.len(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "proof generated"
                );
            }
            Err(e) => {
                self.settle_after_failure(kind);
                warn!(backend = %kind, error = %e, "proving failed");
            }
        }
        res
    }

    /// Check `proof` with `kind`.
    ///
    /// # Errors
    /// [`Error::BackendMismatch`] when the proof carries another tag,
    /// [`Error::MalformedProof`] for undecodable bytes.
    pub async fn verify(&self, proof: &Proof, kind: BackendKind) -> Result<bool> {
        if proof.backend != kind {
            return Err(Error::BackendMismatch {
                proof: proof.backend,
                expected: kind,
            });
        }
        self.ensure_enabled(kind)?;
        let started = Instant::now();
        let proof = proof.clone();
        let res = self
            .bounded("verify", async {
                let keys = self.keys(kind).await?;
                self.transition(ProverState::Verifying);
                blocking("verify", move || keys.verify(&proof)).await
            })
            .await;
        match &res {
            Ok(ok) => {
                self.transition(if *ok {
                    ProverState::Verified
                } else {
                    ProverState::Rejected
                });
                info!(
                    backend = %kind,
                    valid = *ok,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "proof verified"
                );
            }
            Err(e) => {
                self.settle_after_failure(kind);
                warn!(backend = %kind, error = %e, "verification failed");
            }
        }
        res
    }
}

async fn blocking<T, F>(operation: &'static str, f: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| Error::Backend(format!("{operation}: {e}")))?
}
