// Background worker: inside the active window, read device_states.json, score each
// device, and persist scoreboard.json. Sleeps between devices and between passes.

use std::sync::Arc;
use std::time::Duration;

use crate::config::{AggregationConfig, PersistMode};
use crate::engine::{DeviceOutcome, ScoreEngine};
use crate::schedule::{ActiveWindow, PassTime};
use crate::store::{DeviceStore, ScoreboardStore};
use tracing::{debug, info, instrument, warn};

/// Config for the aggregation worker.
#[derive(Debug, Clone)]
pub struct AggregationWorkerConfig {
    pub online_threshold_secs: u64,
    pub device_delay: Duration,
    pub pass_delay: Duration,
    pub persist: PersistMode,
    pub window: ActiveWindow,
}

impl TryFrom<&AggregationConfig> for AggregationWorkerConfig {
    type Error = anyhow::Error;

    fn try_from(config: &AggregationConfig) -> anyhow::Result<Self> {
        Ok(Self {
            online_threshold_secs: config.online_threshold_secs,
            device_delay: Duration::from_millis(config.device_delay_ms),
            pass_delay: Duration::from_millis(config.pass_delay_ms),
            persist: config.persist,
            window: config.active_window()?,
        })
    }
}

/// Stores and shutdown signal for the worker.
pub struct WorkerDeps {
    pub device_store: Arc<DeviceStore>,
    pub scoreboard_store: Arc<ScoreboardStore>,
    pub shutdown_rx: tokio::sync::oneshot::Receiver<()>,
}

/// Result of one loop iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassOutcome {
    /// Outside the active window; nothing read or written.
    Inactive,
    Completed(PassStats),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassStats {
    pub devices: usize,
    pub skipped: usize,
    pub counted: usize,
    pub cleared: usize,
    pub transitions: usize,
    /// Successful scoreboard writes.
    pub writes: usize,
}

impl PassStats {
    fn record(&mut self, outcome: DeviceOutcome) {
        self.devices += 1;
        match outcome {
            DeviceOutcome::Skipped => self.skipped += 1,
            DeviceOutcome::Counted { .. } => self.counted += 1,
            DeviceOutcome::Cleared { .. } => self.cleared += 1,
        }
        if outcome.is_transition() {
            self.transitions += 1;
        }
    }
}

/// Builds the engine from the stored scores (trees always start at zero).
pub async fn start_engine(
    scoreboard_store: &ScoreboardStore,
    config: &AggregationWorkerConfig,
) -> ScoreEngine {
    let initial = scoreboard_store.load_scores().await;
    info!(
        red = initial.red.score,
        green = initial.green.score,
        blue = initial.blue.score,
        "scores loaded"
    );
    ScoreEngine::new(initial, config.online_threshold_secs)
}

/// Spawns the aggregation worker. Returns a join handle; the task exits on shutdown.
pub fn spawn(
    engine: ScoreEngine,
    deps: WorkerDeps,
    config: AggregationWorkerConfig,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        run(engine, deps, config).await;
    })
}

#[instrument(skip_all, fields(persist = ?config.persist))]
async fn run(mut engine: ScoreEngine, deps: WorkerDeps, config: AggregationWorkerConfig) {
    let WorkerDeps {
        device_store,
        scoreboard_store,
        mut shutdown_rx,
    } = deps;
    let mut was_active: Option<bool> = None;

    loop {
        let now = PassTime::now();
        tokio::select! {
            outcome = run_one_pass(&mut engine, &device_store, &scoreboard_store, &config, now) => {
                let active = outcome != PassOutcome::Inactive;
                if was_active != Some(active) {
                    if active {
                        info!(at = %now.local, "entered active window");
                    } else {
                        info!(at = %now.local, "outside active window; scoring paused");
                    }
                    was_active = Some(active);
                }
                if let PassOutcome::Completed(stats) = outcome {
                    debug!(
                        devices = stats.devices,
                        counted = stats.counted,
                        cleared = stats.cleared,
                        skipped = stats.skipped,
                        transitions = stats.transitions,
                        writes = stats.writes,
                        "pass complete"
                    );
                }
            }
            _ = &mut shutdown_rx => {
                debug!("Aggregation worker shutting down");
                break;
            }
        }

        tokio::select! {
            _ = tokio::time::sleep(config.pass_delay) => {}
            _ = &mut shutdown_rx => {
                debug!("Aggregation worker shutting down");
                break;
            }
        }
    }
}

/// Runs one loop iteration at `now`: gate check, then one pass over the device store.
/// Used by the worker loop and directly by tests.
pub async fn run_one_pass(
    engine: &mut ScoreEngine,
    device_store: &DeviceStore,
    scoreboard_store: &ScoreboardStore,
    config: &AggregationWorkerConfig,
    now: PassTime,
) -> PassOutcome {
    if !config.window.contains(now.local) {
        return PassOutcome::Inactive;
    }

    let devices = device_store.load_or_empty().await;
    let mut stats = PassStats::default();

    match config.persist {
        PersistMode::PerDevice => {
            for (device_id, record) in &devices {
                let outcome = engine.process_device(device_id, record, now.epoch);
                log_outcome(device_id, outcome);
                stats.record(outcome);
                if persist(scoreboard_store, engine).await {
                    stats.writes += 1;
                }
                tokio::time::sleep(config.device_delay).await;
            }
        }
        PersistMode::PerPass => {
            for (device_id, record) in &devices {
                let outcome = engine.process_device(device_id, record, now.epoch);
                log_outcome(device_id, outcome);
                stats.record(outcome);
            }
            if !devices.is_empty() && persist(scoreboard_store, engine).await {
                stats.writes += 1;
            }
        }
    }

    PassOutcome::Completed(stats)
}

async fn persist(scoreboard_store: &ScoreboardStore, engine: &ScoreEngine) -> bool {
    match scoreboard_store.save(engine.scoreboard()).await {
        Ok(()) => true,
        Err(e) => {
            warn!(error = %e, operation = "save_scoreboard", "scoreboard write failed");
            false
        }
    }
}

fn log_outcome(device_id: &str, outcome: DeviceOutcome) {
    match outcome {
        DeviceOutcome::Skipped => {
            debug!(device_id, "skipping device with missing last_updated");
        }
        DeviceOutcome::Counted { color, previous } if previous != Some(color) => {
            debug!(device_id, %color, previous = ?previous, "device changed color");
        }
        DeviceOutcome::Cleared {
            previous: Some(previous),
        } => {
            debug!(device_id, %previous, "device offline or without color");
        }
        _ => {}
    }
}
