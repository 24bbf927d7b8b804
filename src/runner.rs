//! Worker-thread execution of solvers with live state streaming.
//!
//! A solver's loop is sequential and CPU-bound; to keep an interactive
//! caller responsive, [`SolverRunner::spawn`] executes it on a dedicated
//! thread and publishes [`SolverState`] snapshots through a bounded
//! channel. Publication frequency is capped independently of iteration
//! frequency, intermediate states are dropped rather than blocking the
//! solver, and exactly one final state terminates every stream.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};

use crate::error::Result;
use crate::path::Path;
use crate::problem::DistanceOracle;
use crate::solver::{Solver, SolverState};

/// Options for a runner-managed solve.
#[derive(Debug, Clone)]
pub struct RunnerOptions {
    /// Capacity of the state channel.
    pub channel_capacity: usize,
    /// Upper bound on published states per second; `0` disables the cap.
    pub max_states_per_sec: u32,
}

impl Default for RunnerOptions {
    fn default() -> Self {
        Self {
            channel_capacity: 64,
            max_states_per_sec: 30,
        }
    }
}

impl RunnerOptions {
    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity;
        self
    }

    pub fn with_max_states_per_sec(mut self, rate: u32) -> Self {
        self.max_states_per_sec = rate;
        self
    }
}

/// Streaming and cancellation surface handed to a running solver.
///
/// A detached context streams nothing and is never cancelled; the runner
/// creates channel-backed ones.
pub struct RunContext {
    cancel: Option<Arc<AtomicBool>>,
    tx: Option<Sender<SolverState>>,
    min_interval: Duration,
    last_publish: Option<Instant>,
}

impl RunContext {
    /// A context for direct synchronous solving: no streaming, no
    /// cancellation.
    pub fn detached() -> Self {
        Self {
            cancel: None,
            tx: None,
            min_interval: Duration::ZERO,
            last_publish: None,
        }
    }

    fn attached(tx: Sender<SolverState>, cancel: Arc<AtomicBool>, max_states_per_sec: u32) -> Self {
        let min_interval = if max_states_per_sec == 0 {
            Duration::ZERO
        } else {
            Duration::from_secs(1) / max_states_per_sec
        };
        Self {
            cancel: Some(cancel),
            tx: Some(tx),
            min_interval,
            last_publish: None,
        }
    }

    /// Whether cooperative cancellation has been requested.
    ///
    /// Solvers check this once per iteration and return their best tour
    /// so far within one iteration of observing it.
    pub fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }

    /// Publishes an intermediate state.
    ///
    /// Rate-limited: calls closer together than the configured interval
    /// are ignored, and states are dropped when the channel is full, so
    /// solvers may call this every iteration without throttling the
    /// search.
    pub fn publish(&mut self, progress: f64, current: Option<&Path>, best: Option<&Path>) {
        self.publish_state(SolverState::intermediate(
            progress,
            current.cloned(),
            best.cloned(),
        ));
    }

    /// Publishes an intermediate state with a highlighted path.
    pub fn publish_with_highlight(
        &mut self,
        progress: f64,
        current: Option<&Path>,
        best: Option<&Path>,
        highlight: &Path,
    ) {
        let mut state = SolverState::intermediate(progress, current.cloned(), best.cloned());
        state.highlight = Some(highlight.clone());
        self.publish_state(state);
    }

    fn publish_state(&mut self, state: SolverState) {
        let Some(tx) = &self.tx else {
            return;
        };
        let now = Instant::now();
        if let Some(last) = self.last_publish {
            if now.duration_since(last) < self.min_interval {
                return;
            }
        }
        match tx.try_send(state) {
            Ok(()) => self.last_publish = Some(now),
            // A slow or departed consumer never stalls the solver.
            Err(TrySendError::Full(_)) | Err(TrySendError::Disconnected(_)) => {}
        }
    }
}

/// Handle to a solver running on a worker thread.
pub struct RunHandle {
    states: Receiver<SolverState>,
    cancel: Arc<AtomicBool>,
    worker: JoinHandle<Result<Path>>,
}

impl RunHandle {
    /// The state stream. Iterating the receiver yields snapshots until
    /// the single final state closes the channel.
    pub fn states(&self) -> &Receiver<SolverState> {
        &self.states
    }

    /// Requests cooperative cancellation.
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::Relaxed);
    }

    /// Waits for the solver to finish and returns its best tour.
    pub fn join(self) -> Result<Path> {
        match self.worker.join() {
            Ok(result) => result,
            Err(panic) => std::panic::resume_unwind(panic),
        }
    }
}

/// Spawns solvers onto dedicated worker threads.
pub struct SolverRunner;

impl SolverRunner {
    /// Runs `solver` against `oracle` on a worker thread.
    ///
    /// The oracle is shared read-only; each concurrent solve owns all of
    /// its other state. The returned handle exposes the state stream,
    /// cancellation, and the final result. The final state is sent
    /// blocking so it is never dropped.
    pub fn spawn(
        mut solver: Box<dyn Solver>,
        oracle: Arc<dyn DistanceOracle>,
        options: RunnerOptions,
    ) -> RunHandle {
        let (tx, rx) = bounded(options.channel_capacity.max(1));
        let cancel = Arc::new(AtomicBool::new(false));

        let worker_cancel = Arc::clone(&cancel);
        let worker = thread::spawn(move || {
            tracing::info!(solver = solver.name(), "solver run started");
            let mut ctx =
                RunContext::attached(tx.clone(), worker_cancel, options.max_states_per_sec);
            let result = solver.solve(oracle.as_ref(), &mut ctx);
            let best = result.as_ref().ok().cloned();
            // Exactly one final state terminates the stream, even after
            // cancellation or failure.
            let _ = tx.send(SolverState::finished(best));
            match &result {
                Ok(path) => tracing::info!(
                    solver = solver.name(),
                    distance = path.distance,
                    "solver run finished"
                ),
                Err(err) => tracing::info!(solver = solver.name(), %err, "solver run failed"),
            }
            result
        });

        RunHandle {
            states: rx,
            cancel,
            worker,
        }
    }
}

/// One row of a result log: the shape expected by tabular exporters.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StateRecord {
    /// Nanoseconds since the Unix epoch at which the state was observed.
    pub timestamp_ns: u128,
    /// Best tour at that moment, if any.
    pub best: Option<Path>,
    /// Tour being worked on at that moment, if any.
    pub current: Option<Path>,
}

/// Consumer-side collection of observed solver states.
#[derive(Debug, Clone, Default)]
pub struct StateLog {
    records: Vec<StateRecord>,
}

impl StateLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stamps and appends a record for an observed state.
    pub fn record(&mut self, state: &SolverState) {
        let timestamp_ns = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        self.records.push(StateRecord {
            timestamp_ns,
            best: state.best.clone(),
            current: state.current.clone(),
        });
    }

    pub fn records(&self) -> &[StateRecord] {
        &self.records
    }
}
