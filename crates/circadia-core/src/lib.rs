//! Playback clock, motion integrator, and day/night phase for the
//! Circadia simulation.
//!
//! A single authoritative clock drives everything: each resolved minute
//! looks up the recorded samples, advances every sampled subject's motion
//! state, classifies the minute as day or night, and hands a finished
//! [`Frame`] to the renderer.
//!
//! # Modules
//!
//! - [`config`] -- Configuration loading from `circadia-config.yaml` into
//!   strongly-typed structs.
//! - [`daylight`] -- Pure day/night illumination from elapsed minutes.
//! - [`motion`] -- Activity-driven velocity integrator and the
//!   [`RandomSource`] seam.
//! - [`sample_index`] -- Per-minute lookup over the loaded dataset.
//! - [`playback`] -- The playback state machine (play, pause, hover,
//!   scrubbing).
//! - [`readout`] -- Time label, cycle number and day selector options.
//! - [`simulation`] -- [`SimulationCore`], the owned object behind the
//!   whole control boundary.
//! - [`scheduler`] -- Cooperative, cancelable autoplay tick scheduling.
//! - [`runner`] -- Async driver loop, [`FrameSink`] and
//!   [`PlaybackCommand`].
//!
//! [`Frame`]: circadia_types::Frame
//! [`RandomSource`]: motion::RandomSource
//! [`SimulationCore`]: simulation::SimulationCore
//! [`FrameSink`]: runner::FrameSink
//! [`PlaybackCommand`]: runner::PlaybackCommand

pub mod config;
pub mod daylight;
pub mod motion;
pub mod playback;
pub mod readout;
pub mod runner;
pub mod sample_index;
pub mod scheduler;
pub mod simulation;
