//! Timeline playback over execution traces.
//!
//! [`PlaybackController`] is the synchronous state machine; [`spawn`] runs
//! one inside a tokio task driven by real timers.

pub mod controller;
pub mod driver;
pub mod error;

pub use controller::{
    Phase, PlaybackController, PlaybackSnapshot, Scheduler, Speed, TickOutcome, TimerId, MAX_SPEED, MIN_SPEED,
};
pub use driver::{spawn, Command, PlaybackHandle, TokioScheduler};
pub use error::PlaybackError;
