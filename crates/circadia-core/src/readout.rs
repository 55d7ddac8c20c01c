//! Clock readout and day selector helpers.
//!
//! These derive the user-facing clock state from a minute: the display
//! label next to the scrubber, the one-based cycle number, the start of
//! the current day (the value the day selector is synchronized to) and
//! the selector's option list.

use circadia_types::{ClockReadout, DayOption, LightPhase, Minute, PlaybackState};

use crate::daylight::{self, DayNightPhase};

/// One-based index of the light cycle containing `time`.
pub fn cycle_number(time: Minute, cycle_length: Minute) -> u32 {
    time.checked_div(cycle_length)
        .unwrap_or(0)
        .saturating_add(1)
}

/// Start minute of the day containing `time`.
pub fn day_start(time: Minute, cycle_length: Minute) -> Minute {
    let day = time.checked_div(cycle_length).unwrap_or(0);
    day.saturating_mul(cycle_length)
}

/// Text shown after the minute number, e.g. `" minutes, light-on cycle 2"`.
pub fn time_label(time: Minute, is_day: bool, cycle_length: Minute) -> String {
    let unit = if time == 1 { "minute" } else { "minutes" };
    let period = if is_day { "light-on cycle" } else { "light-off cycle" };
    format!(" {unit}, {period} {}", cycle_number(time, cycle_length))
}

/// The "jump to day" options for a recording spanning
/// `min_time..=max_time`.
///
/// Lists up to `ceil(max_time / cycle_length)` days; option `i`
/// (one-based) starts at `(i - 1) * cycle_length`. Days starting before
/// `min_time` are left out since a jump there would be rejected.
pub fn day_options(min_time: Minute, max_time: Minute, cycle_length: Minute) -> Vec<DayOption> {
    let total_days = max_time.div_ceil(cycle_length.max(1));
    (0..total_days)
        .map(|day| DayOption {
            day,
            label: format!("Day {}", day.saturating_add(1)),
            start: day.saturating_mul(cycle_length),
        })
        .filter(|option| option.start >= min_time)
        .collect()
}

/// Assemble the full readout for a minute and playback state.
pub fn build(time: Minute, state: PlaybackState, phase: &DayNightPhase) -> ClockReadout {
    let illumination = phase.illumination(time);
    let is_day = daylight::is_day_illumination(illumination);
    let cycle_length = phase.cycle_length();
    ClockReadout {
        time,
        cycle_number: cycle_number(time, cycle_length),
        day_start: day_start(time, cycle_length),
        illumination,
        is_day,
        light: LightPhase::from_is_day(is_day),
        background_intensity: daylight::background_intensity(illumination),
        state,
        label: time_label(time, is_day, cycle_length),
    }
}
