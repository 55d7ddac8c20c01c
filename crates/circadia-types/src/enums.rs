//! Enumeration types for the Circadia playback simulation.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Subjects
// ---------------------------------------------------------------------------

/// Static sex attribute of a subject. Display only; never mutated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum Sex {
    /// Male subject.
    Male,
    /// Female subject.
    Female,
}

impl Sex {
    /// Human-readable label used by tooltips.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Male => "Male",
            Self::Female => "Female",
        }
    }
}

// ---------------------------------------------------------------------------
// Playback
// ---------------------------------------------------------------------------

/// State of the playback state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum PlaybackState {
    /// Initial state, and the state after a reset. Not advancing.
    #[default]
    Stopped,
    /// Autoplay is advancing the clock one tick per frame.
    Playing,
    /// Explicitly paused, by the toggle, a day jump or a hover.
    Paused,
    /// The user is dragging the time control. Not advancing, but every
    /// input value still resolves a frame.
    Scrubbing,
}

impl PlaybackState {
    /// Whether autoplay ticks should be scheduled in this state.
    pub const fn is_playing(self) -> bool {
        matches!(self, Self::Playing)
    }
}

// ---------------------------------------------------------------------------
// Day / night
// ---------------------------------------------------------------------------

/// Light status label shown next to the main view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum LightPhase {
    /// Lights on (day).
    On,
    /// Lights off (night).
    Off,
}

impl LightPhase {
    /// Map a day/night flag onto the light label.
    pub const fn from_is_day(is_day: bool) -> Self {
        if is_day { Self::On } else { Self::Off }
    }

    /// Text shown in the light status badge.
    pub const fn label(self) -> &'static str {
        match self {
            Self::On => "Light ON",
            Self::Off => "Light OFF",
        }
    }
}
