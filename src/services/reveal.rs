//! Reveal animation — timed, incremental display of a finished reply.
//!
//! DESIGN
//! ======
//! Each reveal gets one `CancellationToken` shared by two tasks:
//! - the reveal ticker pushes one grapheme per `tick` into the sink, and
//!   when the reply is fully shown commits `{question, answer}` to the
//!   history store exactly once;
//! - the audio gate plays the typing sound at most once per
//!   `audio_spacing` while graphemes remain, and only when audio is enabled.
//!
//! Starting a new reveal cancels the previous token, as does dropping the
//! `Revealer`. A cancelled reveal emits nothing further and never commits.
//! Units are delivered under an emit lock that cancellation also takes, so
//! once `cancel()` returns the old ticker cannot touch the sink again. A
//! completed reveal cancels its own token, which also stops the audio gate.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use unicode_segmentation::UnicodeSegmentation;

use super::history::{HistoryRecord, HistoryStore};

pub const DEFAULT_TICK_MS: u64 = 30;
pub const DEFAULT_AUDIO_SPACING_MS: u64 = 200;

// =============================================================================
// CONFIG
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RevealConfig {
    /// Interval between revealed graphemes.
    pub tick: Duration,
    /// Minimum spacing between typing sounds.
    pub audio_spacing: Duration,
    pub audio_enabled: bool,
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            tick: Duration::from_millis(DEFAULT_TICK_MS),
            audio_spacing: Duration::from_millis(DEFAULT_AUDIO_SPACING_MS),
            audio_enabled: false,
        }
    }
}

impl RevealConfig {
    /// Read `REVEAL_TICK_MS`, `REVEAL_AUDIO_SPACING_MS` and `REVEAL_AUDIO`.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            tick: Duration::from_millis(env_parse("REVEAL_TICK_MS", DEFAULT_TICK_MS).max(1)),
            audio_spacing: Duration::from_millis(env_parse("REVEAL_AUDIO_SPACING_MS", DEFAULT_AUDIO_SPACING_MS).max(1)),
            audio_enabled: env_parse("REVEAL_AUDIO", false),
        }
    }
}

pub(crate) fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

// =============================================================================
// SEAMS
// =============================================================================

/// Receives each revealed unit of output.
pub trait RevealSink: Send + Sync {
    fn on_unit(&self, unit: &str);
}

/// Short audio cue played while a reply is being revealed.
pub trait TypingSound: Send + Sync {
    fn play(&self);
}

/// A typing sound that plays nothing.
pub struct Silent;

impl TypingSound for Silent {
    fn play(&self) {}
}

// =============================================================================
// HANDLE
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealOutcome {
    Completed,
    Cancelled,
}

/// Caller's view of one running reveal.
#[derive(Clone)]
pub struct RevealHandle {
    token: CancellationToken,
    emit: Arc<Mutex<()>>,
    done: watch::Receiver<Option<RevealOutcome>>,
}

impl RevealHandle {
    /// Stop the reveal. Idempotent; has no effect once it completed.
    pub fn cancel(&self) {
        cancel_emitting(&self.emit, &self.token);
    }

    /// True once the reveal was cancelled or has finished.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Outcome so far, `None` while still revealing.
    #[must_use]
    pub fn outcome(&self) -> Option<RevealOutcome> {
        *self.done.borrow()
    }

    /// Wait for the reveal to finish either way.
    pub async fn finished(&self) -> RevealOutcome {
        let mut done = self.done.clone();
        let outcome = done.wait_for(Option::is_some).await.map(|o| *o);
        match outcome {
            Ok(Some(outcome)) => outcome,
            // Sender dropped without reporting: the task did not finish.
            Ok(None) | Err(_) => RevealOutcome::Cancelled,
        }
    }
}

// =============================================================================
// REVEALER
// =============================================================================

/// Owns at most one live reveal at a time.
pub struct Revealer {
    config: RevealConfig,
    sink: Arc<dyn RevealSink>,
    sound: Arc<dyn TypingSound>,
    history: Arc<dyn HistoryStore>,
    current: Mutex<Option<CancellationToken>>,
    emit: Arc<Mutex<()>>,
}

struct RevealJob {
    question: String,
    answer: String,
    units: Vec<String>,
    remaining: Arc<AtomicUsize>,
    tick: Duration,
    sink: Arc<dyn RevealSink>,
    history: Arc<dyn HistoryStore>,
    emit: Arc<Mutex<()>>,
}

impl Revealer {
    #[must_use]
    pub fn new(
        config: RevealConfig,
        sink: Arc<dyn RevealSink>,
        sound: Arc<dyn TypingSound>,
        history: Arc<dyn HistoryStore>,
    ) -> Self {
        Self { config, sink, sound, history, current: Mutex::new(None), emit: Arc::default() }
    }

    #[must_use]
    pub fn config(&self) -> RevealConfig {
        self.config
    }

    /// Begin revealing `answer`, superseding any reveal still running.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(&self, question: &str, answer: &str) -> RevealHandle {
        let token = CancellationToken::new();
        if let Some(previous) = self.lock_current().replace(token.clone()) {
            if !previous.is_cancelled() {
                debug!("reveal: superseding previous reveal");
            }
            cancel_emitting(&self.emit, &previous);
        }

        let units: Vec<String> = answer.graphemes(true).map(str::to_owned).collect();
        let remaining = Arc::new(AtomicUsize::new(units.len()));
        info!(units = units.len(), "reveal: started");

        if self.config.audio_enabled && !units.is_empty() {
            tokio::spawn(run_audio_gate(
                self.config.audio_spacing,
                Arc::clone(&self.sound),
                Arc::clone(&remaining),
                token.clone(),
            ));
        }

        let (done_tx, done_rx) = watch::channel(None);
        let job = RevealJob {
            question: question.to_string(),
            answer: answer.to_string(),
            units,
            remaining,
            tick: self.config.tick,
            sink: Arc::clone(&self.sink),
            history: Arc::clone(&self.history),
            emit: Arc::clone(&self.emit),
        };
        tokio::spawn(run_reveal(job, token.clone(), done_tx));

        RevealHandle { token, emit: Arc::clone(&self.emit), done: done_rx }
    }

    /// Tear down the live reveal, if any.
    pub fn cancel(&self) {
        if let Some(token) = self.lock_current().take() {
            cancel_emitting(&self.emit, &token);
        }
    }

    fn lock_current(&self) -> std::sync::MutexGuard<'_, Option<CancellationToken>> {
        self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Cancel while no unit is mid-delivery.
fn cancel_emitting(emit: &Mutex<()>, token: &CancellationToken) {
    let _emit = emit.lock().unwrap_or_else(PoisonError::into_inner);
    token.cancel();
}

impl Drop for Revealer {
    fn drop(&mut self) {
        self.cancel();
    }
}

// =============================================================================
// TASKS
// =============================================================================

async fn run_reveal(job: RevealJob, token: CancellationToken, done: watch::Sender<Option<RevealOutcome>>) {
    let outcome = reveal_units(&job, &token).await;
    if outcome == RevealOutcome::Completed {
        let record = HistoryRecord { question: job.question, answer: job.answer };
        match job.history.add(record) {
            Ok(()) => info!("reveal: exchange committed"),
            Err(e) => warn!(error = %e, "reveal: history commit failed"),
        }
        token.cancel();
    } else {
        debug!(remaining = job.remaining.load(Ordering::Acquire), "reveal: cancelled");
    }
    done.send_replace(Some(outcome));
}

async fn reveal_units(job: &RevealJob, token: &CancellationToken) -> RevealOutcome {
    let mut ticker = tokio::time::interval(job.tick);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick of an interval fires immediately; the first unit waits one period.
    ticker.tick().await;

    let mut units = job.units.iter();
    loop {
        tokio::select! {
            biased;
            () = token.cancelled() => return RevealOutcome::Cancelled,
            _ = ticker.tick() => {}
        }

        {
            let _emit = job.emit.lock().unwrap_or_else(PoisonError::into_inner);
            if token.is_cancelled() {
                return RevealOutcome::Cancelled;
            }
            if let Some(unit) = units.next() {
                job.sink.on_unit(unit);
                job.remaining.fetch_sub(1, Ordering::AcqRel);
            }
        }
        if job.remaining.load(Ordering::Acquire) == 0 {
            break;
        }
    }

    if token.is_cancelled() { RevealOutcome::Cancelled } else { RevealOutcome::Completed }
}

async fn run_audio_gate(
    spacing: Duration,
    sound: Arc<dyn TypingSound>,
    remaining: Arc<AtomicUsize>,
    token: CancellationToken,
) {
    let mut ticker = tokio::time::interval(spacing);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            biased;
            () = token.cancelled() => return,
            _ = ticker.tick() => {}
        }

        if remaining.load(Ordering::Acquire) == 0 {
            return;
        }
        sound.play();
    }
}

#[cfg(test)]
#[path = "reveal_test.rs"]
mod tests;
