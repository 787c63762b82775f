//! HTTP handler modules.
//!
//! Handlers parse requests, delegate to the code assistant or a session's
//! playback task, and return JSON. No trace logic lives here.

pub mod code;
pub mod health;
pub mod sessions;
