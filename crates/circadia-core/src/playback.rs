//! Playback state machine.
//!
//! Tracks which of [`PlaybackState`]'s four states the player is in,
//! plus the two pieces of transient memory needed to undo a temporary
//! interruption: whether autoplay was running when the pointer entered
//! the plots, and which state a scrub started from.
//!
//! The machine knows nothing about time. [`SimulationCore`] pairs it with
//! the clock and decides when a transition also resolves a frame.
//!
//! | From \ Call | `play` | `pause` | `toggle` | `hover_enter` | `hover_leave` |
//! |-------------|--------|---------|----------|---------------|---------------|
//! | Stopped | Playing | - | Playing | - | - |
//! | Playing | - | Paused | Paused | Paused (remembered) | - |
//! | Paused | Playing | - | Playing | - | Playing if remembered |
//! | Scrubbing | Playing | - | Playing | - | Playing on `end_scrub` if remembered |
//!
//! Explicit user commands (`play`, `pause`, `toggle`, day jumps, reset)
//! forget a pending hover resume, so leaving the plots afterwards never
//! overrides what the user asked for.
//!
//! [`SimulationCore`]: crate::simulation::SimulationCore

use circadia_types::PlaybackState;
use tracing::debug;

/// The playback state machine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaybackMachine {
    state: PlaybackState,
    was_playing_before_hover: bool,
    state_before_scrub: Option<PlaybackState>,
}

impl PlaybackMachine {
    /// A machine in the initial `Stopped` state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state.
    pub const fn state(&self) -> PlaybackState {
        self.state
    }

    /// Whether a hover pause is waiting to be undone.
    pub const fn was_playing_before_hover(&self) -> bool {
        self.was_playing_before_hover
    }

    /// Start autoplay. Returns whether the state changed.
    pub fn play(&mut self) -> bool {
        self.was_playing_before_hover = false;
        self.state_before_scrub = None;
        self.set(PlaybackState::Playing)
    }

    /// Stop autoplay if it is running. Returns whether the state changed.
    pub fn pause(&mut self) -> bool {
        self.was_playing_before_hover = false;
        if self.state == PlaybackState::Playing {
            self.set(PlaybackState::Paused)
        } else {
            false
        }
    }

    /// Flip between playing and not playing.
    pub fn toggle(&mut self) -> bool {
        if self.state == PlaybackState::Playing {
            self.pause()
        } else {
            self.play()
        }
    }

    /// Navigation interrupts autoplay: `Playing` becomes `Paused`, every
    /// other state is kept.
    pub fn interrupt(&mut self) -> bool {
        self.was_playing_before_hover = false;
        if self.state == PlaybackState::Playing {
            self.set(PlaybackState::Paused)
        } else {
            false
        }
    }

    /// Return to the initial state, forgetting all transient memory.
    pub fn reset(&mut self) -> bool {
        self.was_playing_before_hover = false;
        self.state_before_scrub = None;
        self.set(PlaybackState::Stopped)
    }

    /// The pointer entered the plots: pause autoplay and remember it.
    pub fn hover_enter(&mut self) -> bool {
        if self.state == PlaybackState::Playing {
            self.was_playing_before_hover = true;
            self.set(PlaybackState::Paused)
        } else {
            false
        }
    }

    /// The pointer left the plots: resume autoplay if a hover paused it.
    ///
    /// During a scrub the resume is handed to the scrub instead, so
    /// releasing the time control returns to `Playing`.
    pub fn hover_leave(&mut self) -> bool {
        if !self.was_playing_before_hover {
            return false;
        }
        self.was_playing_before_hover = false;
        match self.state {
            PlaybackState::Paused => self.set(PlaybackState::Playing),
            PlaybackState::Scrubbing => {
                self.state_before_scrub = Some(PlaybackState::Playing);
                false
            }
            PlaybackState::Stopped | PlaybackState::Playing => false,
        }
    }

    /// The user grabbed the time control.
    pub fn begin_scrub(&mut self) -> bool {
        if self.state == PlaybackState::Scrubbing {
            return false;
        }
        self.state_before_scrub = Some(self.state);
        self.set(PlaybackState::Scrubbing)
    }

    /// The user released the time control: go back to the state the
    /// scrub started from.
    pub fn end_scrub(&mut self) -> bool {
        if self.state != PlaybackState::Scrubbing {
            return false;
        }
        let previous = self.state_before_scrub.take().unwrap_or(PlaybackState::Paused);
        self.set(previous)
    }

    fn set(&mut self, next: PlaybackState) -> bool {
        if self.state == next {
            return false;
        }
        debug!(from = ?self.state, to = ?next, "Playback transition");
        self.state = next;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn playing() -> PlaybackMachine {
        let mut m = PlaybackMachine::new();
        m.play();
        m
    }

    #[test]
    fn starts_stopped() {
        assert_eq!(PlaybackMachine::new().state(), PlaybackState::Stopped);
    }

    #[test]
    fn play_and_pause() {
        let mut m = PlaybackMachine::new();
        assert!(m.play());
        assert!(!m.play());
        assert_eq!(m.state(), PlaybackState::Playing);
        assert!(m.pause());
        assert_eq!(m.state(), PlaybackState::Paused);
        assert!(!m.pause());
        assert!(m.play());
        assert_eq!(m.state(), PlaybackState::Playing);
    }

    #[test]
    fn pause_from_stopped_is_noop() {
        let mut m = PlaybackMachine::new();
        assert!(!m.pause());
        assert_eq!(m.state(), PlaybackState::Stopped);
    }

    #[test]
    fn toggle_flips() {
        let mut m = PlaybackMachine::new();
        m.toggle();
        assert_eq!(m.state(), PlaybackState::Playing);
        m.toggle();
        assert_eq!(m.state(), PlaybackState::Paused);
        m.toggle();
        assert_eq!(m.state(), PlaybackState::Playing);
    }

    #[test]
    fn hover_round_trip_restores_playing() {
        let mut m = playing();
        assert!(m.hover_enter());
        assert_eq!(m.state(), PlaybackState::Paused);
        assert!(m.was_playing_before_hover());
        assert!(m.hover_leave());
        assert_eq!(m.state(), PlaybackState::Playing);
        assert!(!m.was_playing_before_hover());
    }

    #[test]
    fn hover_round_trip_keeps_paused() {
        let mut m = playing();
        m.pause();
        assert!(!m.hover_enter());
        assert!(!m.hover_leave());
        assert_eq!(m.state(), PlaybackState::Paused);
    }

    #[test]
    fn explicit_pause_during_hover_wins() {
        let mut m = playing();
        m.hover_enter();
        m.pause();
        assert!(!m.hover_leave());
        assert_eq!(m.state(), PlaybackState::Paused);
    }

    #[test]
    fn toggle_during_hover_then_leave_stays_playing() {
        let mut m = playing();
        m.hover_enter();
        m.toggle();
        assert_eq!(m.state(), PlaybackState::Playing);
        assert!(!m.hover_leave());
        assert_eq!(m.state(), PlaybackState::Playing);
    }

    #[test]
    fn interrupt_only_affects_playing() {
        let mut m = playing();
        assert!(m.interrupt());
        assert_eq!(m.state(), PlaybackState::Paused);

        let mut stopped = PlaybackMachine::new();
        assert!(!stopped.interrupt());
        assert_eq!(stopped.state(), PlaybackState::Stopped);
    }

    #[test]
    fn scrub_returns_to_previous_state() {
        let mut m = playing();
        assert!(m.begin_scrub());
        assert!(!m.begin_scrub());
        assert_eq!(m.state(), PlaybackState::Scrubbing);
        assert!(m.end_scrub());
        assert_eq!(m.state(), PlaybackState::Playing);

        let mut stopped = PlaybackMachine::new();
        stopped.begin_scrub();
        stopped.end_scrub();
        assert_eq!(stopped.state(), PlaybackState::Stopped);
    }

    #[test]
    fn hover_leave_during_scrub_resumes_after_release() {
        let mut m = playing();
        m.hover_enter();
        m.begin_scrub();
        assert!(!m.hover_leave());
        assert_eq!(m.state(), PlaybackState::Scrubbing);
        assert!(!m.was_playing_before_hover());
        m.end_scrub();
        assert_eq!(m.state(), PlaybackState::Playing);
    }

    #[test]
    fn hover_leave_during_scrub_from_paused_stays_paused() {
        let mut m = playing();
        m.pause();
        m.hover_enter();
        m.begin_scrub();
        m.hover_leave();
        m.end_scrub();
        assert_eq!(m.state(), PlaybackState::Paused);
    }

    #[test]
    fn end_scrub_without_scrub_is_noop() {
        let mut m = PlaybackMachine::new();
        assert!(!m.end_scrub());
        assert_eq!(m.state(), PlaybackState::Stopped);
    }

    #[test]
    fn play_ends_scrub() {
        let mut m = PlaybackMachine::new();
        m.begin_scrub();
        m.play();
        assert_eq!(m.state(), PlaybackState::Playing);
        assert!(!m.end_scrub());
    }

    #[test]
    fn reset_forgets_everything() {
        let mut m = playing();
        m.hover_enter();
        assert!(m.reset());
        assert_eq!(m.state(), PlaybackState::Stopped);
        assert!(!m.hover_leave());
        assert_eq!(m.state(), PlaybackState::Stopped);
    }
}
