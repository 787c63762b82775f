//! HTTP/JSON API for stepview.
//!
//! Serves trace generation, code insights and timer-driven playback sessions
//! over the synthesis and playback crates. Also hosts the environment
//! configuration and the reqwest chat transport shared with the CLI.

pub mod config;
pub mod error;
pub mod handlers;
pub mod llm_provider;
pub mod router;
pub mod schema;
pub mod session;
pub mod state;
