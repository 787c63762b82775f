//! Runs a [`PlaybackController`] inside a tokio task.
//!
//! Commands from the [`PlaybackHandle`] and ticks from live timers are
//! handled one at a time by the same task, so controller state is only ever
//! touched from one place. Every change is published on a `watch` channel.

use std::collections::HashMap;
use std::time::Duration;

use stepview_core::ExecutionTrace;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::debug;

use crate::controller::{PlaybackController, PlaybackSnapshot, Scheduler, Speed, TickOutcome, TimerId};
use crate::error::PlaybackError;

const COMMAND_BUFFER: usize = 32;

#[derive(Debug, Clone)]
pub enum Command {
    Load(ExecutionTrace),
    StepForward,
    StepBackward,
    JumpToStart,
    JumpToEnd,
    Play,
    Pause,
    Toggle,
    SetSpeed(Speed),
}

struct Request {
    command: Command,
    reply: oneshot::Sender<PlaybackSnapshot>,
}

/// Recurring timers as tokio tasks that report ticks over a channel.
///
/// Dropping the scheduler aborts every timer it started.
pub struct TokioScheduler {
    next: u64,
    timers: HashMap<TimerId, JoinHandle<()>>,
    ticks: mpsc::UnboundedSender<TimerId>,
}

impl TokioScheduler {
    pub fn new(ticks: mpsc::UnboundedSender<TimerId>) -> Self {
        TokioScheduler {
            next: 0,
            timers: HashMap::new(),
            ticks,
        }
    }

    pub fn live_timers(&self) -> usize {
        self.timers.len()
    }
}

impl Scheduler for TokioScheduler {
    fn schedule(&mut self, interval: Duration) -> TimerId {
        self.next += 1;
        let id = TimerId::new(self.next);
        let ticks = self.ticks.clone();
        let handle = tokio::spawn(async move {
            // first tick one full interval from now, not immediately
            let mut ticker = interval_at(Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if ticks.send(id).is_err() {
                    break;
                }
            }
        });
        self.timers.insert(id, handle);
        id
    }

    fn cancel(&mut self, id: TimerId) {
        if let Some(handle) = self.timers.remove(&id) {
            handle.abort();
        }
    }
}

impl Drop for TokioScheduler {
    fn drop(&mut self) {
        for (_, handle) in self.timers.drain() {
            handle.abort();
        }
    }
}

/// Owner's handle to a running playback task.
///
/// Dropping the handle stops the task and all of its timers.
pub struct PlaybackHandle {
    commands: mpsc::Sender<Request>,
    snapshots: watch::Receiver<PlaybackSnapshot>,
    task: JoinHandle<()>,
}

/// Spawns a playback task with nothing loaded.
pub fn spawn() -> PlaybackHandle {
    let (command_tx, command_rx) = mpsc::channel(COMMAND_BUFFER);
    let (tick_tx, tick_rx) = mpsc::unbounded_channel();
    let controller = PlaybackController::new(TokioScheduler::new(tick_tx));
    let (snapshot_tx, snapshot_rx) = watch::channel(controller.snapshot());

    let task = tokio::spawn(run(controller, command_rx, tick_rx, snapshot_tx));

    PlaybackHandle {
        commands: command_tx,
        snapshots: snapshot_rx,
        task,
    }
}

async fn run(
    mut controller: PlaybackController<TokioScheduler>,
    mut commands: mpsc::Receiver<Request>,
    mut ticks: mpsc::UnboundedReceiver<TimerId>,
    snapshots: watch::Sender<PlaybackSnapshot>,
) {
    loop {
        tokio::select! {
            request = commands.recv() => {
                let Some(Request { command, reply }) = request else {
                    break;
                };
                apply(&mut controller, command);
                let snapshot = controller.snapshot();
                snapshots.send_replace(snapshot.clone());
                let _ = reply.send(snapshot);
            }
            Some(id) = ticks.recv() => {
                let outcome = controller.on_tick(id);
                if outcome != TickOutcome::Ignored {
                    snapshots.send_replace(controller.snapshot());
                }
            }
        }
    }
    debug!("playback task finished");
}

fn apply(controller: &mut PlaybackController<TokioScheduler>, command: Command) {
    match command {
        Command::Load(trace) => controller.load_trace(trace),
        Command::StepForward => controller.step_forward(),
        Command::StepBackward => controller.step_backward(),
        Command::JumpToStart => controller.jump_to_start(),
        Command::JumpToEnd => controller.jump_to_end(),
        Command::Play => controller.play(),
        Command::Pause => controller.pause(),
        Command::Toggle => controller.toggle(),
        Command::SetSpeed(speed) => controller.set_speed(speed),
    }
}

impl PlaybackHandle {
    /// Applies `command` and returns the resulting state.
    pub async fn send(&self, command: Command) -> Result<PlaybackSnapshot, PlaybackError> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(Request { command, reply })
            .await
            .map_err(|_| PlaybackError::Stopped)?;
        response.await.map_err(|_| PlaybackError::Stopped)
    }

    pub async fn load(&self, trace: ExecutionTrace) -> Result<PlaybackSnapshot, PlaybackError> {
        self.send(Command::Load(trace)).await
    }

    pub async fn step_forward(&self) -> Result<PlaybackSnapshot, PlaybackError> {
        self.send(Command::StepForward).await
    }

    pub async fn step_backward(&self) -> Result<PlaybackSnapshot, PlaybackError> {
        self.send(Command::StepBackward).await
    }

    pub async fn jump_to_start(&self) -> Result<PlaybackSnapshot, PlaybackError> {
        self.send(Command::JumpToStart).await
    }

    pub async fn jump_to_end(&self) -> Result<PlaybackSnapshot, PlaybackError> {
        self.send(Command::JumpToEnd).await
    }

    pub async fn play(&self) -> Result<PlaybackSnapshot, PlaybackError> {
        self.send(Command::Play).await
    }

    pub async fn pause(&self) -> Result<PlaybackSnapshot, PlaybackError> {
        self.send(Command::Pause).await
    }

    pub async fn toggle(&self) -> Result<PlaybackSnapshot, PlaybackError> {
        self.send(Command::Toggle).await
    }

    /// Validates `multiplier` and applies it.
    pub async fn set_speed(&self, multiplier: f64) -> Result<PlaybackSnapshot, PlaybackError> {
        let speed = Speed::new(multiplier)?;
        self.send(Command::SetSpeed(speed)).await
    }

    /// Latest published state.
    pub fn snapshot(&self) -> PlaybackSnapshot {
        self.snapshots.borrow().clone()
    }

    /// Receiver notified on every state change, including timer ticks.
    pub fn subscribe(&self) -> watch::Receiver<PlaybackSnapshot> {
        self.snapshots.clone()
    }
}

impl Drop for PlaybackHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::Phase;
    use stepview_core::ExecutionStep;

    fn trace_of(len: usize) -> ExecutionTrace {
        (0..len)
            .map(|line| ExecutionStep::new(line, format!("line {line}")))
            .collect::<Vec<_>>()
            .into()
    }

    async fn sleep_ms(ms: u64) {
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn timer_drives_playback_to_the_end() {
        let handle = spawn();
        handle.load(trace_of(3)).await.unwrap();
        let started = handle.play().await.unwrap();
        assert_eq!(started.phase, Phase::Playing);

        sleep_ms(1500).await;
        assert_eq!(handle.snapshot().current_step_index, 1);

        sleep_ms(2000).await;
        let finished = handle.snapshot();
        assert_eq!(finished.current_step_index, 2);
        assert!(!finished.is_playing);
        assert_eq!(finished.phase, Phase::Ready);
    }

    #[tokio::test(start_paused = true)]
    async fn speed_change_takes_effect_without_overlap() {
        let handle = spawn();
        handle.load(trace_of(10)).await.unwrap();
        handle.play().await.unwrap();

        sleep_ms(1500).await;
        assert_eq!(handle.snapshot().current_step_index, 1);

        handle.set_speed(2.0).await.unwrap();
        // ticks at +500ms and +1000ms only
        sleep_ms(1100).await;
        assert_eq!(handle.snapshot().current_step_index, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn pause_and_reload_stop_the_timer() {
        let handle = spawn();
        handle.load(trace_of(5)).await.unwrap();
        handle.play().await.unwrap();
        sleep_ms(1100).await;

        let paused = handle.pause().await.unwrap();
        assert_eq!(paused.current_step_index, 1);
        sleep_ms(3000).await;
        assert_eq!(handle.snapshot().current_step_index, 1);

        handle.play().await.unwrap();
        let reloaded = handle.load(trace_of(4)).await.unwrap();
        assert_eq!(reloaded.current_step_index, 0);
        assert!(!reloaded.is_playing);
        sleep_ms(3000).await;
        assert_eq!(handle.snapshot().current_step_index, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn subscribers_see_timer_ticks() {
        let handle = spawn();
        let mut updates = handle.subscribe();
        handle.load(trace_of(3)).await.unwrap();
        handle.play().await.unwrap();
        updates.borrow_and_update();

        updates.changed().await.unwrap();
        assert_eq!(updates.borrow().current_step_index, 1);
    }

    #[tokio::test]
    async fn invalid_speed_is_rejected_before_sending() {
        let handle = spawn();
        assert_eq!(handle.set_speed(0.0).await, Err(PlaybackError::InvalidSpeed(0.0)));
        assert_eq!(handle.snapshot().speed, Speed::NORMAL);
    }

    #[tokio::test]
    async fn manual_navigation_through_the_handle() {
        let handle = spawn();
        assert_eq!(handle.step_forward().await.unwrap().phase, Phase::Idle);

        handle.load(trace_of(3)).await.unwrap();
        assert_eq!(handle.jump_to_end().await.unwrap().current_step_index, 2);
        assert_eq!(handle.step_forward().await.unwrap().current_step_index, 2);
        assert_eq!(handle.jump_to_start().await.unwrap().current_step_index, 0);
        assert_eq!(handle.step_backward().await.unwrap().current_step_index, 0);
    }
}
