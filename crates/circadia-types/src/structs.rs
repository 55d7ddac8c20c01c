//! Core data structs: input samples and the values the core emits.
//!
//! [`Sample`] is the immutable input record. [`Frame`] is the fully
//! resolved snapshot handed to the renderer once per resolved time that
//! has data, and [`ClockReadout`] is the clock/UI state published on
//! every resolution, with or without data.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{LightPhase, PlaybackState, Sex};
use crate::ids::EntityId;
use crate::Minute;

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// One observation of one subject at one discrete time step.
///
/// Field names follow the recorded dataset (`temp`, `act`); the long
/// spellings are accepted on input as well.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Sample {
    /// Subject the observation belongs to.
    pub id: EntityId,
    /// Static sex attribute of the subject.
    pub sex: Sex,
    /// Minute offset from the start of the recording.
    pub time: Minute,
    /// Core body temperature (roughly 35-39 degrees Celsius).
    #[serde(rename = "temp", alias = "temperature")]
    pub temperature: f64,
    /// Activity level (roughly 0-100).
    #[serde(rename = "act", alias = "activity")]
    pub activity: f64,
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// A point in the main plotting area.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Position {
    /// Horizontal coordinate in plot units.
    pub x: f64,
    /// Vertical coordinate in plot units.
    pub y: f64,
}

/// One subject as it appears in a [`Frame`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct FrameEntity {
    /// Subject identifier; renderers diff on this.
    pub id: EntityId,
    /// Static sex attribute.
    pub sex: Sex,
    /// Position in the main view after this frame's motion step.
    pub position: Position,
    /// Temperature sample at the frame time (drives color).
    pub temperature: f64,
    /// Activity sample at the frame time (scatter view y axis).
    pub activity: f64,
}

/// A fully resolved snapshot ready for rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Frame {
    /// Simulated minute this frame was resolved for.
    pub time: Minute,
    /// Day/night classification (`illumination > 0.5`).
    pub is_day: bool,
    /// Continuous day/night intensity in `[0, 1]`.
    pub illumination: f64,
    /// Background opacity factor, `max(illumination, 1 - illumination)`.
    pub background_intensity: f64,
    /// Subjects with a sample at `time`, in identifier order.
    pub entities: Vec<FrameEntity>,
}

impl Frame {
    /// Find a subject in this frame by identifier.
    pub fn entity(&self, id: &EntityId) -> Option<&FrameEntity> {
        self.entities.iter().find(|e| &e.id == id)
    }
}

/// Clock and control state published on every resolution.
///
/// Drives the numeric time readout, the scrubber position, the day
/// selector and the light badge. Unlike [`Frame`] it is emitted even
/// when the resolved minute has no samples.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ClockReadout {
    /// Current simulated minute (scrubber position).
    pub time: Minute,
    /// One-based index of the current light cycle.
    pub cycle_number: u32,
    /// Start minute of the current day (day selector value).
    pub day_start: Minute,
    /// Continuous day/night intensity in `[0, 1]`.
    pub illumination: f64,
    /// Day/night classification (`illumination > 0.5`).
    pub is_day: bool,
    /// Light badge label.
    pub light: LightPhase,
    /// Background opacity factor, `max(illumination, 1 - illumination)`.
    pub background_intensity: f64,
    /// Playback state after the transition that produced this readout.
    pub state: PlaybackState,
    /// Display text following the number, e.g. `" minutes, light-off cycle 1"`.
    pub label: String,
}

/// One entry of the "jump to day" selector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct DayOption {
    /// Zero-based day index, as accepted by a day jump.
    pub day: u32,
    /// Display label (`"Day 1"` for day index 0).
    pub label: String,
    /// Start minute of the day.
    pub start: Minute,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn sample_reads_dataset_field_names() {
        let raw = r#"{"id":"f1","sex":"female","time":12,"temp":36.8,"act":14.5}"#;
        let sample: Sample = serde_json::from_str(raw).unwrap();
        assert_eq!(sample.id, EntityId::from("f1"));
        assert_eq!(sample.time, 12);
        assert!((sample.temperature - 36.8).abs() < 1e-9);
        assert!((sample.activity - 14.5).abs() < 1e-9);
    }

    #[test]
    fn sample_accepts_long_field_names() {
        let raw = r#"{"id":"m4","sex":"male","time":0,"temperature":37.1,"activity":0}"#;
        let sample: Sample = serde_json::from_str(raw).unwrap();
        assert_eq!(sample.sex, Sex::Male);
        assert!((sample.temperature - 37.1).abs() < 1e-9);
    }

    #[test]
    fn frame_entity_lookup() {
        let frame = Frame {
            time: 5,
            is_day: false,
            illumination: 0.0,
            background_intensity: 1.0,
            entities: vec![FrameEntity {
                id: EntityId::from("f2"),
                sex: Sex::Female,
                position: Position { x: 10.0, y: 20.0 },
                temperature: 36.5,
                activity: 3.0,
            }],
        };
        assert!(frame.entity(&EntityId::from("f2")).is_some());
        assert!(frame.entity(&EntityId::from("m1")).is_none());
    }
}
