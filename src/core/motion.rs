//! Motion sources and the listener that feeds the coordinator
//!
//! The listener subscribes on activation and, on deactivation, unsubscribes
//! and cancels any pending shake reset so nothing fires after teardown.
//! A missing motion source is not an error: the app simply has no
//! flick/shake triggers.

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::core::config::MotionConfig;
use crate::core::coordinator::FlipCoordinator;
use crate::core::detector::MotionDetector;
use crate::types::{MotionError, MotionSample, MotionTrigger, ReasonCode};

/// Accelerometer capability
pub trait MotionSource: Send {
    fn is_available(&self) -> bool;

    /// Start delivering samples roughly every `interval`
    fn subscribe(&mut self, interval: Duration) -> Result<mpsc::Receiver<MotionSample>, MotionError>;

    fn unsubscribe(&mut self);
}

/// Device without an accelerometer
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableMotion;

impl MotionSource for UnavailableMotion {
    fn is_available(&self) -> bool {
        false
    }

    fn subscribe(&mut self, _interval: Duration) -> Result<mpsc::Receiver<MotionSample>, MotionError> {
        Err(MotionError::Unavailable)
    }

    fn unsubscribe(&mut self) {}
}

/// Samples pushed by an external producer (platform bridge, tests)
#[derive(Debug)]
pub struct ChannelMotion {
    rx: Option<mpsc::Receiver<MotionSample>>,
    subscribed: bool,
}

impl ChannelMotion {
    pub fn new(capacity: usize) -> (Self, mpsc::Sender<MotionSample>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { rx: Some(rx), subscribed: false }, tx)
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscribed
    }
}

impl MotionSource for ChannelMotion {
    fn is_available(&self) -> bool {
        true
    }

    fn subscribe(&mut self, _interval: Duration) -> Result<mpsc::Receiver<MotionSample>, MotionError> {
        let rx = self.rx.take().ok_or(MotionError::AlreadySubscribed)?;
        self.subscribed = true;
        Ok(rx)
    }

    fn unsubscribe(&mut self) {
        self.subscribed = false;
    }
}

/// Replays a fixed list of samples at the subscription interval
#[derive(Debug, Default)]
pub struct ScriptedMotion {
    samples: Vec<MotionSample>,
    feeder: Option<JoinHandle<()>>,
}

impl ScriptedMotion {
    pub fn new(samples: Vec<MotionSample>) -> Self {
        Self { samples, feeder: None }
    }

    /// Load a script: JSON lines `{"x":..,"y":..,"z":..}` or CSV `x,y,z`
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, MotionError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| MotionError::Script {
            path: path.display().to_string(),
            source,
        })?;
        Ok(Self::new(parse_script(&text)))
    }

    pub fn samples(&self) -> &[MotionSample] {
        &self.samples
    }
}

impl MotionSource for ScriptedMotion {
    fn is_available(&self) -> bool {
        !self.samples.is_empty()
    }

    fn subscribe(&mut self, interval: Duration) -> Result<mpsc::Receiver<MotionSample>, MotionError> {
        if self.feeder.is_some() {
            return Err(MotionError::AlreadySubscribed);
        }
        let (tx, rx) = mpsc::channel(16);
        let samples = self.samples.clone();
        self.feeder = Some(tokio::spawn(async move {
            for sample in samples {
                if tx.send(sample).await.is_err() {
                    break;
                }
                tokio::time::sleep(interval).await;
            }
        }));
        Ok(rx)
    }

    fn unsubscribe(&mut self) {
        if let Some(feeder) = self.feeder.take() {
            feeder.abort();
        }
    }
}

impl Drop for ScriptedMotion {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

/// Parse a motion script; blank and `#` lines skipped, bad lines warned
pub fn parse_script(text: &str) -> Vec<MotionSample> {
    text.lines()
        .enumerate()
        .filter_map(|(i, line)| {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                return None;
            }
            let parsed = if line.starts_with('{') {
                serde_json::from_str::<MotionSample>(line).ok()
            } else {
                let parts: Vec<f64> = line
                    .split(',')
                    .filter_map(|p| p.trim().parse::<f64>().ok())
                    .collect();
                match parts.as_slice() {
                    [x, y, z] if line.split(',').count() == 3 => Some(MotionSample::new(*x, *y, *z)),
                    _ => None,
                }
            };
            if parsed.is_none() {
                warn!(line = i + 1, "motion_script_line_skipped");
            }
            parsed
        })
        .collect()
}

#[derive(Debug, Default)]
struct TimerSlot {
    pending: Option<JoinHandle<()>>,
    generation: u64,
    closed: bool,
}

/// Cancel-and-reschedule delayed action. A new schedule replaces the
/// pending one; after `close` nothing runs again. An action may schedule
/// or cancel on its own timer but must not `close` it.
#[derive(Debug, Clone, Default)]
pub struct DebounceTimer {
    slot: Arc<Mutex<TimerSlot>>,
    /// Held while an action runs; `close` waits on it
    firing: Arc<Mutex<()>>,
}

fn lock_slot(slot: &Mutex<TimerSlot>) -> MutexGuard<'_, TimerSlot> {
    slot.lock().unwrap_or_else(|e| e.into_inner())
}

impl DebounceTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `action` after `delay`, replacing any pending action
    pub fn schedule<F>(&self, delay: Duration, action: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let mut slot = lock_slot(&self.slot);
        if slot.closed {
            return;
        }
        if let Some(pending) = slot.pending.take() {
            pending.abort();
        }
        slot.generation += 1;
        let generation = slot.generation;
        let shared = self.slot.clone();
        let firing = self.firing.clone();

        slot.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _firing = firing.lock().unwrap_or_else(|e| e.into_inner());
            {
                let mut slot = lock_slot(&shared);
                if slot.closed || slot.generation != generation {
                    return;
                }
                slot.pending = None;
            }
            action();
        }));
    }

    /// Drop the pending action, if any
    pub fn cancel(&self) {
        let mut slot = lock_slot(&self.slot);
        slot.generation += 1;
        if let Some(pending) = slot.pending.take() {
            pending.abort();
        }
    }

    /// Cancel and refuse further schedules
    pub fn close(&self) {
        {
            let mut slot = lock_slot(&self.slot);
            slot.closed = true;
            slot.generation += 1;
            if let Some(pending) = slot.pending.take() {
                pending.abort();
            }
        }
        // an action already past its check finishes before close returns
        drop(self.firing.lock().unwrap_or_else(|e| e.into_inner()));
    }

    pub fn is_pending(&self) -> bool {
        lock_slot(&self.slot).pending.is_some()
    }
}

/// Active subscription from a motion source into the coordinator
#[derive(Debug)]
pub struct MotionListener {
    task: Option<JoinHandle<()>>,
    shutdown: Option<oneshot::Sender<()>>,
    timer: DebounceTimer,
}

impl MotionListener {
    /// Subscribe `source` and start forwarding triggers. Must be called
    /// inside a tokio runtime. An unavailable or failing source yields an
    /// inactive listener.
    pub fn activate(mut source: Box<dyn MotionSource>, coordinator: FlipCoordinator, config: MotionConfig) -> Self {
        let timer = DebounceTimer::new();
        let inactive = |timer: DebounceTimer| Self { task: None, shutdown: None, timer };

        if !source.is_available() {
            info!(reason = ReasonCode::F403_MOTION_UNAVAILABLE.code(), "motion_unavailable");
            return inactive(timer);
        }
        let samples = match source.subscribe(config.sample_interval()) {
            Ok(rx) => rx,
            Err(e) => {
                warn!(reason = e.reason().code(), error = %e, "motion_subscribe_failed");
                return inactive(timer);
            }
        };

        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let task = tokio::spawn(run_listener(
            source,
            samples,
            shutdown_rx,
            coordinator,
            MotionDetector::new(config),
            timer.clone(),
        ));
        info!(interval_ms = config.sample_interval_ms, "motion_listener_active");

        Self {
            task: Some(task),
            shutdown: Some(shutdown_tx),
            timer,
        }
    }

    pub fn is_active(&self) -> bool {
        self.task.as_ref().map_or(false, |t| !t.is_finished())
    }

    /// Is a shake reset waiting on its debounce delay?
    pub fn reset_pending(&self) -> bool {
        self.timer.is_pending()
    }

    /// Unsubscribe, cancel any pending reset, wait for the loop to stop
    pub async fn deactivate(&mut self) {
        self.timer.close();
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                warn!(error = %e, "motion_listener_join_failed");
            }
        }
        debug!("motion_listener_inactive");
    }
}

impl Drop for MotionListener {
    fn drop(&mut self) {
        self.timer.close();
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

async fn run_listener(
    mut source: Box<dyn MotionSource>,
    mut samples: mpsc::Receiver<MotionSample>,
    mut shutdown: oneshot::Receiver<()>,
    coordinator: FlipCoordinator,
    mut detector: MotionDetector,
    timer: DebounceTimer,
) {
    let reset_delay = detector.config().shake_reset_delay();

    loop {
        let sample = tokio::select! {
            _ = &mut shutdown => break,
            sample = samples.recv() => match sample {
                Some(sample) => sample,
                None => {
                    debug!("motion_stream_ended");
                    break;
                }
            },
        };

        match detector.process(sample, Instant::now(), coordinator.is_flipping()) {
            Some(MotionTrigger::Flick) => {
                let dispatch = coordinator.request_flip();
                debug!(reason = dispatch.reason().code(), "flick_flip_requested");
            }
            Some(MotionTrigger::Shake) => {
                let coordinator = coordinator.clone();
                timer.schedule(reset_delay, move || {
                    coordinator.reset_display();
                });
            }
            None => {}
        }
    }

    source.unsubscribe();
}
