//! Playback state machine over an execution trace.
//!
//! States:
//!
//! - `Idle`: no trace loaded; every transport operation is a no-op.
//! - `Ready`: trace loaded, not playing.
//! - `Playing`: a recurring timer advances the index once per interval.
//!
//! The controller never sleeps or spawns; it asks a [`Scheduler`] for
//! recurring timers and is told about each firing through
//! [`PlaybackController::on_tick`]. Every transition that stops or restarts
//! playback cancels the previous timer first, so at most one timer is live.

use std::time::Duration;

use serde::Serialize;
use stepview_core::{ExecutionStep, ExecutionTrace};
use tracing::debug;

use crate::error::PlaybackError;

pub const MIN_SPEED: f64 = 0.1;
pub const MAX_SPEED: f64 = 10.0;

/// Interval between ticks at speed 1.
pub const BASE_INTERVAL: Duration = Duration::from_millis(1000);

/// Identifies one scheduled recurring timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct TimerId(u64);

impl TimerId {
    pub fn new(value: u64) -> Self {
        TimerId(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

/// Source of recurring timers.
///
/// A scheduled timer keeps firing until cancelled; each firing must be
/// delivered to [`PlaybackController::on_tick`] with its id.
pub trait Scheduler {
    fn schedule(&mut self, interval: Duration) -> TimerId;

    fn cancel(&mut self, id: TimerId);
}

/// Playback speed multiplier.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct Speed(f64);

impl Speed {
    pub const NORMAL: Speed = Speed(1.0);

    pub fn new(multiplier: f64) -> Result<Self, PlaybackError> {
        if multiplier.is_finite() && (MIN_SPEED..=MAX_SPEED).contains(&multiplier) {
            Ok(Speed(multiplier))
        } else {
            Err(PlaybackError::InvalidSpeed(multiplier))
        }
    }

    pub fn multiplier(&self) -> f64 {
        self.0
    }

    /// Tick interval: one second divided by the multiplier.
    pub fn interval(&self) -> Duration {
        BASE_INTERVAL.div_f64(self.0)
    }
}

impl Default for Speed {
    fn default() -> Self {
        Speed::NORMAL
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Idle,
    Ready,
    Playing,
}

/// What a timer firing did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The index moved forward by one.
    Advanced,
    /// The end was already reached; playback stopped.
    Stopped,
    /// The tick came from a timer that is no longer live.
    Ignored,
}

/// Observable playback state.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackSnapshot {
    pub phase: Phase,
    pub current_step_index: usize,
    pub is_playing: bool,
    pub speed: Speed,
    pub step_count: usize,
    /// False when no trace or an empty trace is loaded.
    pub controls_enabled: bool,
    pub can_step_backward: bool,
    pub can_step_forward: bool,
    pub current_step: Option<ExecutionStep>,
}

impl Default for PlaybackSnapshot {
    fn default() -> Self {
        PlaybackSnapshot {
            phase: Phase::Idle,
            current_step_index: 0,
            is_playing: false,
            speed: Speed::NORMAL,
            step_count: 0,
            controls_enabled: false,
            can_step_backward: false,
            can_step_forward: false,
            current_step: None,
        }
    }
}

pub struct PlaybackController<S: Scheduler> {
    scheduler: S,
    trace: Option<ExecutionTrace>,
    index: usize,
    speed: Speed,
    timer: Option<TimerId>,
}

impl<S: Scheduler> PlaybackController<S> {
    pub fn new(scheduler: S) -> Self {
        PlaybackController {
            scheduler,
            trace: None,
            index: 0,
            speed: Speed::NORMAL,
            timer: None,
        }
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn trace(&self) -> Option<&ExecutionTrace> {
        self.trace.as_ref()
    }

    pub fn phase(&self) -> Phase {
        match (&self.trace, self.timer) {
            (None, _) => Phase::Idle,
            (Some(_), Some(_)) => Phase::Playing,
            (Some(_), None) => Phase::Ready,
        }
    }

    pub fn current_index(&self) -> usize {
        self.index
    }

    pub fn is_playing(&self) -> bool {
        self.timer.is_some()
    }

    pub fn speed(&self) -> Speed {
        self.speed
    }

    pub fn current_step(&self) -> Option<&ExecutionStep> {
        self.trace.as_ref().and_then(|trace| trace.get(self.index))
    }

    /// True when a non-empty trace is loaded.
    pub fn controls_enabled(&self) -> bool {
        self.trace.as_ref().is_some_and(|trace| !trace.is_empty())
    }

    fn last_index(&self) -> usize {
        self.trace.as_ref().map_or(0, ExecutionTrace::last_index)
    }

    /// Replaces the trace wholesale and rewinds to the first step.
    pub fn load_trace(&mut self, trace: ExecutionTrace) {
        self.stop_timer();
        debug!(steps = trace.len(), "trace loaded");
        self.trace = Some(trace);
        self.index = 0;
    }

    pub fn step_forward(&mut self) {
        if self.controls_enabled() {
            self.index = (self.index + 1).min(self.last_index());
        }
    }

    pub fn step_backward(&mut self) {
        if self.controls_enabled() {
            self.index = self.index.saturating_sub(1);
        }
    }

    pub fn jump_to_start(&mut self) {
        if self.controls_enabled() {
            self.index = 0;
        }
    }

    pub fn jump_to_end(&mut self) {
        if self.controls_enabled() {
            self.index = self.last_index();
        }
    }

    /// Starts playback. Calling it while playing restarts the timer.
    pub fn play(&mut self) {
        if !self.controls_enabled() {
            return;
        }
        self.stop_timer();
        self.start_timer();
    }

    pub fn pause(&mut self) {
        self.stop_timer();
    }

    pub fn toggle(&mut self) {
        if self.is_playing() {
            self.pause();
        } else {
            self.play();
        }
    }

    /// Changes the speed. While playing the timer is replaced, so the new
    /// interval applies from the next tick.
    pub fn set_speed(&mut self, speed: Speed) {
        self.speed = speed;
        if self.is_playing() {
            self.stop_timer();
            self.start_timer();
        }
    }

    /// Handles a firing of timer `id`.
    pub fn on_tick(&mut self, id: TimerId) -> TickOutcome {
        if self.timer != Some(id) {
            return TickOutcome::Ignored;
        }
        if self.index >= self.last_index() {
            self.stop_timer();
            debug!(index = self.index, "playback reached the end");
            return TickOutcome::Stopped;
        }
        self.index += 1;
        TickOutcome::Advanced
    }

    pub fn snapshot(&self) -> PlaybackSnapshot {
        let enabled = self.controls_enabled();
        PlaybackSnapshot {
            phase: self.phase(),
            current_step_index: self.index,
            is_playing: self.is_playing(),
            speed: self.speed,
            step_count: self.trace.as_ref().map_or(0, ExecutionTrace::len),
            controls_enabled: enabled,
            can_step_backward: enabled && self.index > 0,
            can_step_forward: enabled && self.index < self.last_index(),
            current_step: self.current_step().cloned(),
        }
    }

    fn start_timer(&mut self) {
        let interval = self.speed.interval();
        let id = self.scheduler.schedule(interval);
        debug!(timer = id.value(), ?interval, "playback timer scheduled");
        self.timer = Some(id);
    }

    fn stop_timer(&mut self) {
        if let Some(id) = self.timer.take() {
            self.scheduler.cancel(id);
            debug!(timer = id.value(), "playback timer cancelled");
        }
    }
}
