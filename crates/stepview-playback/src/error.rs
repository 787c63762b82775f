use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlaybackError {
    #[error("speed multiplier must be a number between 0.1 and 10, got {0}")]
    InvalidSpeed(f64),

    #[error("playback has stopped")]
    Stopped,
}
