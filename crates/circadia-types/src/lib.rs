//! Shared type definitions for the Circadia playback simulation.
//!
//! This crate is the single source of truth for every value that crosses
//! a crate boundary: the immutable input samples, the frames the core
//! emits for rendering, and the clock readout that drives the scrubber,
//! time label and day selector. Types flow downstream to `TypeScript`
//! via `ts-rs` for the browser renderer.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe identifier wrapper for tracked subjects
//! - [`enums`] -- Enumeration types (sex, playback state, light phase)
//! - [`structs`] -- Samples, frames, readouts and day selector options

pub mod enums;
pub mod ids;
pub mod structs;

pub use enums::{LightPhase, PlaybackState, Sex};
pub use ids::EntityId;
pub use structs::{ClockReadout, DayOption, Frame, FrameEntity, Position, Sample};

/// Simulated time in whole minutes from the start of the recording.
pub type Minute = u32;
