//! Day/night phase derived from elapsed simulated time.
//!
//! Every day is one full sine cycle of `cycle_length` minutes. The phase
//! angle is offset by pi so the recording opens in darkness:
//!
//! ```text
//! angle        = (time mod cycle_length) / cycle_length * 2pi
//! illumination = (sin(angle - pi) + 1) / 2
//! ```
//!
//! Illumination is a continuous value in `[0, 1]`. A minute is day only
//! when illumination is strictly greater than [`DAY_THRESHOLD`]; the exact
//! crossing counts as night. Everything that labels or colors day and
//! night must go through [`is_day_illumination`] so every view applies
//! the same tie-break.

use std::f64::consts::{PI, TAU};

use circadia_types::Minute;

/// Illumination above which a minute counts as day.
pub const DAY_THRESHOLD: f64 = 0.5;

/// Classify an illumination value. The boundary itself is night.
pub fn is_day_illumination(illumination: f64) -> bool {
    illumination > DAY_THRESHOLD
}

/// Background opacity factor for an illumination value.
///
/// The background is strongest at full day and at full night and fades
/// towards the crossings: `max(illumination, 1 - illumination)`.
pub fn background_intensity(illumination: f64) -> f64 {
    illumination.max(1.0 - illumination)
}

/// Pure day/night phase calculator for a fixed cycle length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayNightPhase {
    cycle_length: Minute,
}

impl DayNightPhase {
    /// Create a calculator for the given cycle length.
    ///
    /// A zero cycle length is treated as a single minute so the function
    /// stays total; configuration validation rejects it before this point.
    pub fn new(cycle_length: Minute) -> Self {
        Self {
            cycle_length: cycle_length.max(1),
        }
    }

    /// Minutes in one day/night period.
    pub const fn cycle_length(&self) -> Minute {
        self.cycle_length
    }

    /// Illumination in `[0, 1]` at the given minute (0 = night, 1 = day).
    pub fn illumination(&self, time: Minute) -> f64 {
        let within = time.checked_rem(self.cycle_length).unwrap_or(0);
        let angle = f64::from(within) / f64::from(self.cycle_length) * TAU;
        let raw = f64::midpoint((angle - PI).sin(), 1.0);
        raw.clamp(0.0, 1.0)
    }

    /// Whether the given minute is classified as day.
    pub fn is_day(&self, time: Minute) -> bool {
        is_day_illumination(self.illumination(time))
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    const DAY: Minute = 1440;

    #[test]
    fn recording_opens_at_night() {
        let phase = DayNightPhase::new(DAY);
        assert!(!phase.is_day(0));
        assert!(!phase.is_day(1));
        assert!(!phase.is_day(360));
    }

    #[test]
    fn illumination_stays_in_unit_interval() {
        let phase = DayNightPhase::new(DAY);
        for t in 0..(DAY * 3) {
            let i = phase.illumination(t);
            assert!((0.0..=1.0).contains(&i), "illumination {i} at minute {t}");
        }
    }

    #[test]
    fn illumination_is_periodic() {
        let phase = DayNightPhase::new(DAY);
        for t in (0..DAY).step_by(7) {
            assert_eq!(phase.illumination(t), phase.illumination(t + DAY));
            assert_eq!(phase.illumination(t), phase.illumination(t + 5 * DAY));
        }
    }

    #[test]
    fn darkest_and_brightest_minutes() {
        let phase = DayNightPhase::new(DAY);
        assert!(phase.illumination(360) < 1e-12);
        assert!((phase.illumination(1080) - 1.0).abs() < 1e-12);
        assert!(phase.is_day(1080));
    }

    #[test]
    fn exact_crossing_is_night() {
        let phase = DayNightPhase::new(DAY);
        // Half way through the cycle the sine argument is exactly zero.
        assert_eq!(phase.illumination(720), 0.5);
        assert!(!phase.is_day(720));
        assert!(phase.is_day(721));
        assert!(!is_day_illumination(DAY_THRESHOLD));
    }

    #[test]
    fn background_peaks_at_extremes() {
        assert_eq!(background_intensity(0.0), 1.0);
        assert_eq!(background_intensity(1.0), 1.0);
        assert_eq!(background_intensity(0.5), 0.5);
        assert_eq!(background_intensity(0.25), 0.75);
    }

    #[test]
    fn zero_cycle_is_total() {
        let phase = DayNightPhase::new(0);
        assert_eq!(phase.cycle_length(), 1);
        let i = phase.illumination(42);
        assert!((0.0..=1.0).contains(&i));
    }
}
