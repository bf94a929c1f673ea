//! Integration tests for Slice 3
//!
//! Motion stream → detector → coordinator: flick flips, shake resets after
//! the debounce delay, teardown cancels pending resets.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use coinflip::core::{
    ChannelMotion, CoinToss, FlipCoordinator, FlipTiming, HapticCue, Haptics, HistoryLog,
    MemoryStore, MotionConfig, MotionListener, ScriptedMotion, UnavailableMotion,
};
use coinflip::types::{HapticError, MotionSample, Outcome};
use coinflip::SHAKE_RESET_DELAY_MS;
use tokio::sync::mpsc;

struct Fixed(bool);

impl CoinToss for Fixed {
    fn toss(&self) -> bool {
        self.0
    }
}

#[derive(Default)]
struct RecordingHaptics(Mutex<Vec<HapticCue>>);

impl RecordingHaptics {
    fn count(&self, cue: HapticCue) -> usize {
        self.0.lock().unwrap().iter().filter(|c| **c == cue).count()
    }
}

impl Haptics for RecordingHaptics {
    fn pulse(&self, cue: HapticCue) -> Result<(), HapticError> {
        self.0.lock().unwrap().push(cue);
        Ok(())
    }
}

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

/// Short flips so cooldowns can be observed without a flip in progress
fn quick_coordinator(haptics: Arc<RecordingHaptics>) -> FlipCoordinator {
    FlipCoordinator::builder(HistoryLog::new(Arc::new(MemoryStore::new())))
        .toss(Arc::new(Fixed(true)))
        .haptics(haptics)
        .timing(FlipTiming { total_ms: 200, preroll_ms: 50 })
        .build()
}

fn listen(c: &FlipCoordinator, config: MotionConfig) -> (MotionListener, mpsc::Sender<MotionSample>) {
    let (source, tx) = ChannelMotion::new(32);
    let listener = MotionListener::activate(Box::new(source), c.clone(), config);
    (listener, tx)
}

async fn send_at(tx: &mpsc::Sender<MotionSample>, sample: MotionSample) {
    tx.send(sample).await.unwrap();
    // let the listener consume it
    tokio::time::sleep(ms(1)).await;
}

fn flick() -> MotionSample {
    MotionSample::new(0.0, 0.9, 0.0)
}

fn level() -> MotionSample {
    MotionSample::new(0.0, 0.0, 0.0)
}

fn shake() -> MotionSample {
    MotionSample::new(1.5, 0.0, 1.0)
}

/// Two flicks 500ms apart: only the first requests a flip
#[tokio::test(start_paused = true)]
async fn test_flick_cooldown_scenario() {
    let haptics = Arc::new(RecordingHaptics::default());
    let c = quick_coordinator(haptics.clone());
    let (mut listener, tx) = listen(&c, MotionConfig::default());
    assert!(listener.is_active());

    send_at(&tx, flick()).await;
    assert!(c.is_flipping());

    tokio::time::sleep(ms(249)).await;
    send_at(&tx, level()).await;
    tokio::time::sleep(ms(249)).await;
    assert!(!c.is_flipping());

    // second yDelta=0.9, ~500ms after the first, no flip in progress
    send_at(&tx, flick()).await;
    assert!(!c.is_flipping());

    tokio::time::sleep(ms(1000)).await;
    assert_eq!(c.open_history().len(), 1);
    assert_eq!(haptics.count(HapticCue::MediumImpact), 1);

    listener.deactivate().await;
}

#[tokio::test(start_paused = true)]
async fn test_flick_after_cooldown_flips_again() {
    let c = quick_coordinator(Arc::new(RecordingHaptics::default()));
    let (mut listener, tx) = listen(&c, MotionConfig::default());

    send_at(&tx, flick()).await;
    tokio::time::sleep(ms(500)).await;
    send_at(&tx, level()).await;
    tokio::time::sleep(ms(4000)).await;
    send_at(&tx, flick()).await;
    tokio::time::sleep(ms(500)).await;

    assert_eq!(c.open_history().len(), 2);
    listener.deactivate().await;
}

#[tokio::test(start_paused = true)]
async fn test_shake_resets_after_debounce_delay() {
    let haptics = Arc::new(RecordingHaptics::default());
    let c = quick_coordinator(haptics.clone());
    c.flip().await;
    assert_eq!(c.state().last_outcome, Some(Outcome::Heads));

    let (mut listener, tx) = listen(&c, MotionConfig::default());
    send_at(&tx, shake()).await;

    assert!(listener.reset_pending());
    assert_eq!(c.state().last_outcome, Some(Outcome::Heads));

    tokio::time::sleep(ms(SHAKE_RESET_DELAY_MS + 10)).await;
    assert_eq!(c.state().last_outcome, None);
    assert!(!listener.reset_pending());
    assert_eq!(haptics.count(HapticCue::LightImpact), 1);
    // history untouched by reset
    assert_eq!(c.open_history().len(), 1);

    listener.deactivate().await;
}

/// Rapid qualifying shakes inside the delay coalesce into one reset
#[tokio::test(start_paused = true)]
async fn test_rapid_shakes_coalesce() {
    let haptics = Arc::new(RecordingHaptics::default());
    let c = quick_coordinator(haptics.clone());
    let config = MotionConfig { shake_cooldown_ms: 0, ..MotionConfig::default() };
    let (mut listener, tx) = listen(&c, config);

    send_at(&tx, shake()).await;
    tokio::time::sleep(ms(30)).await;
    send_at(&tx, shake()).await;
    tokio::time::sleep(ms(30)).await;
    send_at(&tx, shake()).await;
    tokio::time::sleep(ms(500)).await;

    assert_eq!(haptics.count(HapticCue::LightImpact), 1);
    listener.deactivate().await;
}

#[tokio::test(start_paused = true)]
async fn test_deactivate_cancels_pending_reset() {
    let haptics = Arc::new(RecordingHaptics::default());
    let c = quick_coordinator(haptics.clone());
    c.flip().await;

    let (mut listener, tx) = listen(&c, MotionConfig::default());
    send_at(&tx, shake()).await;
    assert!(listener.reset_pending());

    listener.deactivate().await;
    assert!(!listener.is_active());

    tokio::time::sleep(ms(1000)).await;
    assert_eq!(c.state().last_outcome, Some(Outcome::Heads));
    assert_eq!(haptics.count(HapticCue::LightImpact), 0);

    // samples after teardown go nowhere
    assert!(tx.send(flick()).await.is_err());
}

#[tokio::test(start_paused = true)]
async fn test_dropping_listener_cancels_pending_reset() {
    let haptics = Arc::new(RecordingHaptics::default());
    let c = quick_coordinator(haptics.clone());
    c.flip().await;

    let (listener, tx) = listen(&c, MotionConfig::default());
    send_at(&tx, shake()).await;
    drop(listener);

    tokio::time::sleep(ms(1000)).await;
    assert_eq!(c.state().last_outcome, Some(Outcome::Heads));
}

#[tokio::test(start_paused = true)]
async fn test_shake_during_flip_is_noop() {
    let haptics = Arc::new(RecordingHaptics::default());
    let c = FlipCoordinator::builder(HistoryLog::new(Arc::new(MemoryStore::new())))
        .toss(Arc::new(Fixed(false)))
        .haptics(haptics.clone())
        .build();
    let (mut listener, tx) = listen(&c, MotionConfig::default());

    let flip = c.spawn_flip().expect("accepted");
    send_at(&tx, shake()).await;
    tokio::time::sleep(ms(500)).await;
    assert!(c.is_flipping());

    flip.await.unwrap();
    assert_eq!(c.state().last_outcome, Some(Outcome::Tails));
    assert_eq!(haptics.count(HapticCue::LightImpact), 0);

    listener.deactivate().await;
}

#[tokio::test(start_paused = true)]
async fn test_non_finite_samples_are_ignored() {
    let c = quick_coordinator(Arc::new(RecordingHaptics::default()));
    let (mut listener, tx) = listen(&c, MotionConfig::default());

    send_at(&tx, MotionSample::new(f64::NAN, 9.0, 0.0)).await;
    send_at(&tx, MotionSample::new(0.0, f64::INFINITY, 0.0)).await;
    tokio::time::sleep(ms(500)).await;

    assert!(c.open_history().is_empty());
    assert_eq!(c.state().last_outcome, None);
    listener.deactivate().await;
}

#[tokio::test(start_paused = true)]
async fn test_unavailable_motion_is_silent() {
    let c = quick_coordinator(Arc::new(RecordingHaptics::default()));
    let mut listener = MotionListener::activate(Box::new(UnavailableMotion), c.clone(), MotionConfig::default());

    assert!(!listener.is_active());
    assert!(matches!(c.flip().await, coinflip::core::FlipResult::Settled(_)));
    listener.deactivate().await;
}

#[tokio::test(start_paused = true)]
async fn test_scripted_motion_drives_a_flip() {
    let c = quick_coordinator(Arc::new(RecordingHaptics::default()));
    let source = ScriptedMotion::new(vec![level(), level(), flick(), level()]);
    let mut listener = MotionListener::activate(Box::new(source), c.clone(), MotionConfig::default());

    tokio::time::sleep(ms(1000)).await;
    assert_eq!(c.open_history().len(), 1);
    listener.deactivate().await;
}
