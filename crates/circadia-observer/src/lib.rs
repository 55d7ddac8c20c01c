//! Observer API server for the Circadia playback simulation.
//!
//! This crate provides an Axum HTTP server that exposes:
//!
//! - **`WebSocket` endpoint** (`/ws/frames`) streaming every resolved
//!   frame, clock readout and highlight change via
//!   [`tokio::sync::broadcast`]
//! - **REST endpoints** for reading the playback snapshot (clock, last
//!   frame, day selector, subjects)
//! - **Control REST endpoints** forwarding play, pause, seek, jump,
//!   scrub, hover and highlight input to the playback driver
//! - **Minimal HTML page** (`GET /`) showing the clock and API links
//!
//! # Architecture
//!
//! The observer never touches the simulation core. Reads are served from
//! an in-memory [`PlaybackSnapshot`] that the engine's frame sink keeps
//! current; writes become [`PlaybackCommand`]s on the driver's channel.
//!
//! [`PlaybackSnapshot`]: state::PlaybackSnapshot
//! [`PlaybackCommand`]: circadia_core::runner::PlaybackCommand

pub mod control;
pub mod error;
pub mod handlers;
pub mod router;
pub mod server;
pub mod startup;
pub mod state;
pub mod ws;

pub use router::build_router;
pub use server::{start_server, ServerConfig, ServerError};
pub use state::{AppState, FrameBroadcast, PlaybackSnapshot};
