//! Flip Coordinator: Idle → Flipping → Idle
//!
//! Sequence for one flip:
//! - claim the phase guard (duplicate requests are ignored, not queued)
//! - medium impact cue
//! - pre-roll delay, then draw one random bit
//! - remaining delay, so request → settle always takes the total duration
//! - commit outcome, back to Idle
//! - append to history (failure is logged, the flip still counts)
//! - success cue
//!
//! Collaborator failures never propagate. If the sequence is interrupted
//! (panic, task abort) the phase is forced back to Idle.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::core::config::FlipTiming;
use crate::core::haptics::{HapticCue, Haptics, NoHaptics};
use crate::core::history::HistoryLog;
use crate::types::{
    CoinMode, DisplayState, Dispatch, FlipError, FlipPhase, FlipState, HistoryEntry, Intent,
    Outcome, ReasonCode, Side,
};

/// Source of the random bit
pub trait CoinToss: Send + Sync {
    /// true → first face (Heads / A)
    fn toss(&self) -> bool;
}

/// Uniform pseudo-random toss
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomToss;

impl CoinToss for RandomToss {
    fn toss(&self) -> bool {
        rand::random::<bool>()
    }
}

/// What a settled flip produced
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlipRecord {
    pub outcome: Outcome,
    pub entry: HistoryEntry,
    /// Whether the history write succeeded
    pub saved: bool,
}

/// How a flip request ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum FlipResult {
    /// Another flip was running
    Ignored,
    /// Outcome committed
    Settled(FlipRecord),
    /// Sequence failed, phase forced back to Idle
    FailSafe,
}

impl FlipResult {
    pub fn record(&self) -> Option<&FlipRecord> {
        match self {
            FlipResult::Settled(r) => Some(r),
            _ => None,
        }
    }
}

/// Response to a dispatched intent
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "response", rename_all = "snake_case")]
pub enum IntentResponse {
    Dispatched { dispatch: Dispatch },
    History { entries: Vec<HistoryEntry> },
    HistoryCleared { ok: bool },
    Status { state: DisplayState },
    Help,
    Quit,
}

struct Inner {
    state: watch::Sender<FlipState>,
    history: HistoryLog,
    haptics: Arc<dyn Haptics>,
    toss: Arc<dyn CoinToss>,
    timing: FlipTiming,
}

/// Builder for [`FlipCoordinator`]
pub struct FlipCoordinatorBuilder {
    history: HistoryLog,
    haptics: Arc<dyn Haptics>,
    toss: Arc<dyn CoinToss>,
    timing: FlipTiming,
    initial: FlipState,
}

impl FlipCoordinatorBuilder {
    pub fn haptics(mut self, haptics: Arc<dyn Haptics>) -> Self {
        self.haptics = haptics;
        self
    }

    pub fn toss(mut self, toss: Arc<dyn CoinToss>) -> Self {
        self.toss = toss;
        self
    }

    pub fn timing(mut self, timing: FlipTiming) -> Self {
        self.timing = timing;
        self
    }

    pub fn mode(mut self, mode: CoinMode) -> Self {
        self.initial.mode = mode;
        self
    }

    pub fn label(mut self, side: Side, text: &str) -> Self {
        self.initial.set_label(side, text);
        self
    }

    pub fn build(self) -> FlipCoordinator {
        let (state, _) = watch::channel(self.initial);
        FlipCoordinator {
            inner: Arc::new(Inner {
                state,
                history: self.history,
                haptics: self.haptics,
                toss: self.toss,
                timing: self.timing,
            }),
        }
    }
}

/// Owns flip state; cheap to clone, all clones share one state
#[derive(Clone)]
pub struct FlipCoordinator {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for FlipCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlipCoordinator")
            .field("state", &*self.inner.state.borrow())
            .field("timing", &self.inner.timing)
            .finish()
    }
}

/// Releases the phase guard if the flip sequence never reaches commit
struct PhaseGuard<'a> {
    state: &'a watch::Sender<FlipState>,
    armed: bool,
}

impl<'a> PhaseGuard<'a> {
    fn new(state: &'a watch::Sender<FlipState>) -> Self {
        Self { state, armed: true }
    }

    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for PhaseGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.state.send_modify(|s| s.phase = FlipPhase::Idle);
            error!(reason = ReasonCode::F102_FLIP_FAILSAFE_RESET.code(), "flip_failsafe_reset");
        }
    }
}

/// Run a collaborator call, turning a panic into an error
fn contained<T>(f: impl FnOnce() -> T) -> Result<T, FlipError> {
    catch_unwind(AssertUnwindSafe(f)).map_err(|payload| {
        let msg = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".to_string());
        FlipError::Panicked(msg)
    })
}

impl FlipCoordinator {
    /// Defaults: no haptics, random toss, constant timing
    pub fn builder(history: HistoryLog) -> FlipCoordinatorBuilder {
        FlipCoordinatorBuilder {
            history,
            haptics: Arc::new(NoHaptics),
            toss: Arc::new(RandomToss),
            timing: FlipTiming::default(),
            initial: FlipState::default(),
        }
    }

    pub fn new(history: HistoryLog) -> Self {
        Self::builder(history).build()
    }

    /// Snapshot of the current state
    pub fn state(&self) -> FlipState {
        self.inner.state.borrow().clone()
    }

    /// Is a flip in progress?
    pub fn is_flipping(&self) -> bool {
        self.inner.state.borrow().is_flipping()
    }

    /// Published view for the presentation surface
    pub fn display(&self) -> DisplayState {
        DisplayState::from_state(&self.inner.state.borrow())
    }

    /// Receive every state change
    pub fn subscribe(&self) -> watch::Receiver<FlipState> {
        self.inner.state.subscribe()
    }

    pub fn history(&self) -> &HistoryLog {
        &self.inner.history
    }

    pub fn timing(&self) -> FlipTiming {
        self.inner.timing
    }

    /// Apply `op` unless a flip is running. Shared precondition of every
    /// state-mutating intent.
    fn guarded(&self, intent: &'static str, op: impl FnOnce(&mut FlipState) -> ReasonCode) -> Dispatch {
        let mut dispatch = Dispatch::Ignored(ReasonCode::F200_FLIP_IN_PROGRESS);
        self.inner.state.send_if_modified(|s| {
            if s.is_flipping() {
                return false;
            }
            dispatch = Dispatch::Accepted(op(s));
            true
        });

        if let Dispatch::Ignored(reason) = dispatch {
            debug!(intent, reason = reason.code(), "intent_ignored");
        }
        dispatch
    }

    /// Best-effort tactile cue
    fn cue(&self, cue: HapticCue) {
        match contained(|| self.inner.haptics.pulse(cue)) {
            Ok(Ok(())) => {}
            Ok(Err(e)) => debug!(%cue, reason = e.reason().code(), error = %e, "haptic_failed"),
            Err(e) => warn!(%cue, reason = ReasonCode::F600_HAPTIC_FAILED.code(), error = %e, "haptic_failed"),
        }
    }

    fn claim(&self) -> Dispatch {
        self.guarded("flip", |s| {
            s.phase = FlipPhase::Flipping;
            ReasonCode::F100_FLIP_STARTED
        })
    }

    /// Run one flip to completion on the current task
    pub async fn flip(&self) -> FlipResult {
        if !self.claim().is_accepted() {
            return FlipResult::Ignored;
        }
        self.run_claimed().await
    }

    /// Claim the guard and run the flip on its own task
    pub fn spawn_flip(&self) -> Option<JoinHandle<FlipResult>> {
        if !self.claim().is_accepted() {
            return None;
        }
        let this = self.clone();
        Some(tokio::spawn(async move { this.run_claimed().await }))
    }

    /// Fire-and-forget flip request; must be called inside a tokio runtime
    pub fn request_flip(&self) -> Dispatch {
        match self.spawn_flip() {
            Some(_) => Dispatch::Accepted(ReasonCode::F100_FLIP_STARTED),
            None => Dispatch::Ignored(ReasonCode::F200_FLIP_IN_PROGRESS),
        }
    }

    async fn run_claimed(&self) -> FlipResult {
        let inner = &self.inner;
        let mut guard = PhaseGuard::new(&inner.state);
        info!(reason = ReasonCode::F100_FLIP_STARTED.code(), "flip_started");

        self.cue(HapticCue::MediumImpact);
        tokio::time::sleep(inner.timing.preroll()).await;

        let mode = inner.state.borrow().mode;
        let first_face = match contained(|| inner.toss.toss()) {
            Ok(bit) => bit,
            Err(e) => {
                error!(reason = e.reason().code(), error = %e, "flip_toss_failed");
                return FlipResult::FailSafe;
            }
        };
        let outcome = Outcome::from_toss(mode, first_face);

        tokio::time::sleep(inner.timing.remaining()).await;

        let mut label = String::new();
        inner.state.send_modify(|s| {
            s.last_outcome = Some(outcome);
            s.phase = FlipPhase::Idle;
            label = s.resolve_label(outcome);
        });
        guard.disarm();

        let entry = HistoryEntry::now(label);
        let saved = match contained(|| inner.history.append(entry.clone())) {
            Ok(Ok(())) => true,
            Ok(Err(e)) => {
                warn!(reason = ReasonCode::F501_HISTORY_WRITE_FAILED.code(), error = %e, "history_write_failed");
                false
            }
            Err(e) => {
                warn!(reason = ReasonCode::F501_HISTORY_WRITE_FAILED.code(), error = %e, "history_write_failed");
                false
            }
        };

        self.cue(HapticCue::SuccessNotification);
        info!(
            reason = ReasonCode::F101_FLIP_SETTLED.code(),
            %outcome,
            label = %entry.label,
            saved,
            "flip_settled"
        );

        FlipResult::Settled(FlipRecord { outcome, entry, saved })
    }

    /// Clear the displayed outcome; history is untouched
    pub fn reset_display(&self) -> Dispatch {
        let dispatch = self.guarded("reset", |s| {
            s.last_outcome = None;
            ReasonCode::F300_DISPLAY_RESET
        });
        if dispatch.is_accepted() {
            self.cue(HapticCue::LightImpact);
            info!(reason = ReasonCode::F300_DISPLAY_RESET.code(), "display_reset");
        }
        dispatch
    }

    /// Switch faces; clears the displayed outcome
    pub fn set_mode(&self, mode: CoinMode) -> Dispatch {
        let dispatch = self.guarded("set_mode", |s| {
            s.mode = mode;
            s.last_outcome = None;
            ReasonCode::F301_MODE_CHANGED
        });
        if dispatch.is_accepted() {
            info!(reason = ReasonCode::F301_MODE_CHANGED.code(), %mode, "mode_changed");
        }
        dispatch
    }

    /// Store a custom label (truncated, never trimmed). Allowed mid-flip:
    /// labels only affect display and logging.
    pub fn set_label(&self, side: Side, text: &str) -> Dispatch {
        let mut truncated = false;
        self.inner.state.send_modify(|s| truncated = s.set_label(side, text));

        let reason = if truncated {
            ReasonCode::F303_LABEL_TRUNCATED
        } else {
            ReasonCode::F302_LABEL_SET
        };
        debug!(?side, reason = reason.code(), "label_set");
        Dispatch::Accepted(reason)
    }

    /// History view
    pub fn open_history(&self) -> Vec<HistoryEntry> {
        self.inner.history.read_all()
    }

    /// Wipe the history log; false if storage refused
    pub fn clear_history(&self) -> bool {
        match self.inner.history.clear() {
            Ok(()) => {
                info!(reason = ReasonCode::F502_HISTORY_CLEARED.code(), "history_cleared");
                true
            }
            Err(e) => {
                warn!(reason = ReasonCode::F503_HISTORY_CLEAR_FAILED.code(), error = %e, "history_clear_failed");
                false
            }
        }
    }

    /// Route a surface intent. Flips are spawned so the surface keeps
    /// receiving input while the coin is in the air.
    pub fn dispatch(&self, intent: Intent) -> IntentResponse {
        let dispatch = match intent {
            Intent::Flip => self.request_flip(),
            Intent::Reset => self.reset_display(),
            Intent::SetMode { mode } => self.set_mode(mode),
            Intent::SetLabel { side, text } => self.set_label(side, &text),
            Intent::OpenHistory => {
                return IntentResponse::History { entries: self.open_history() };
            }
            Intent::ClearHistory => {
                return IntentResponse::HistoryCleared { ok: self.clear_history() };
            }
            Intent::Status => return IntentResponse::Status { state: self.display() },
            Intent::Help => return IntentResponse::Help,
            Intent::Quit => return IntentResponse::Quit,
        };
        IntentResponse::Dispatched { dispatch }
    }
}
