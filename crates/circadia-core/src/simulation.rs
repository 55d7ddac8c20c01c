//! The simulation core: one owned object behind the whole control
//! boundary.
//!
//! [`SimulationCore`] owns the playback clock, the motion states, the
//! sample index and the state machine. Every control call goes through
//! it, and every change of the current minute goes through a single
//! `resolve`, which
//!
//! 1. computes the illumination for the minute,
//! 2. looks up the samples recorded at exactly that minute,
//! 3. advances the motion state of each sampled subject,
//! 4. assembles a [`Frame`] (only when at least one sample exists), and
//! 5. produces the [`ClockReadout`] for the scrubber, label and selector.
//!
//! Minutes without samples still move the clock and the readout; the
//! previous frame simply stays on screen.

use circadia_types::{ClockReadout, DayOption, EntityId, Frame, FrameEntity, Minute, PlaybackState};
use tracing::debug;

use crate::config::{ConfigError, CoreConfig};
use crate::daylight::{self, DayNightPhase};
use crate::motion::{MotionIntegrator, MotionState, RandomSource};
use crate::playback::PlaybackMachine;
use crate::readout;
use crate::sample_index::SampleIndex;

/// Errors that can occur when constructing the core.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// The fixed parameters are unusable.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: ConfigError,
    },

    /// The dataset could not be indexed.
    #[error("dataset error: {source}")]
    Dataset {
        /// The underlying dataset error.
        #[from]
        source: crate::sample_index::DatasetError,
    },
}

/// Output of one resolution of the current minute.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    /// Clock state after the resolution; always present.
    pub readout: ClockReadout,
    /// The new frame, or `None` when no subject has a sample at this
    /// minute and the previous frame stays current.
    pub frame: Option<Frame>,
}

/// The owned simulation core.
#[derive(Debug)]
pub struct SimulationCore<S> {
    config: CoreConfig,
    index: SampleIndex,
    phase: DayNightPhase,
    motion: MotionIntegrator<S>,
    machine: PlaybackMachine,
    current_time: Minute,
    last_frame: Option<Frame>,
}

impl<S: RandomSource> SimulationCore<S> {
    /// Build a core over an indexed dataset.
    ///
    /// The clock starts at the first recorded minute in the `Stopped`
    /// state, with every subject at rest at a random position. No frame
    /// is resolved until the first control call or [`refresh`].
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Config`] if the parameters do not validate.
    ///
    /// [`refresh`]: Self::refresh
    pub fn new(config: CoreConfig, index: SampleIndex, rng: S) -> Result<Self, CoreError> {
        config.validate()?;
        let phase = DayNightPhase::new(config.cycle_length);
        let motion = MotionIntegrator::from_config(index.entities().keys().cloned(), &config, rng);
        let current_time = index.min_time();
        debug!(
            subjects = index.entities().len(),
            min_time = index.min_time(),
            max_time = index.max_time(),
            "Simulation core initialized"
        );
        Ok(Self {
            config,
            index,
            phase,
            motion,
            machine: PlaybackMachine::new(),
            current_time,
            last_frame: None,
        })
    }

    // -----------------------------------------------------------------------
    // Control boundary
    // -----------------------------------------------------------------------

    /// Start autoplay. Returns whether the state changed.
    pub fn play(&mut self) -> bool {
        self.machine.play()
    }

    /// Stop autoplay. Returns whether the state changed.
    pub fn pause(&mut self) -> bool {
        self.machine.pause()
    }

    /// Flip between playing and not playing.
    pub fn toggle(&mut self) -> bool {
        self.machine.toggle()
    }

    /// Move the clock to `time` and resolve it, keeping the state.
    ///
    /// Out-of-range minutes are rejected: nothing changes and `None` is
    /// returned.
    pub fn seek(&mut self, time: Minute) -> Option<Resolution> {
        if !self.index.in_range(time) {
            debug!(time, "Seek outside recorded range ignored");
            return None;
        }
        Some(self.resolve(time))
    }

    /// Seek to the start of zero-based day `day` and interrupt autoplay.
    ///
    /// Rejected like [`seek`](Self::seek) when the day starts outside the
    /// recorded range; the state is then left untouched as well.
    pub fn jump_to_day(&mut self, day: u32) -> Option<Resolution> {
        let Some(time) = day.checked_mul(self.config.cycle_length) else {
            debug!(day, "Day jump overflows the minute range");
            return None;
        };
        if !self.index.in_range(time) {
            debug!(day, time, "Day jump outside recorded range ignored");
            return None;
        }
        self.machine.interrupt();
        Some(self.resolve(time))
    }

    /// Stop, rewind to the first minute and re-place every subject at a
    /// fresh random position with zero velocity.
    ///
    /// The returned frame shows the fresh positions at the first minute;
    /// no motion step is applied, so every velocity stays at zero.
    pub fn reset(&mut self) -> Resolution {
        self.machine.reset();
        self.motion.reset_all();
        self.current_time = self.index.min_time();
        let frame = self.assemble_frame(self.current_time);
        if let Some(frame) = &frame {
            self.last_frame = Some(frame.clone());
        }
        Resolution {
            readout: self.readout(),
            frame,
        }
    }

    /// The pointer entered the plots.
    pub fn hover_enter(&mut self) -> bool {
        self.machine.hover_enter()
    }

    /// The pointer left the plots.
    pub fn hover_leave(&mut self) -> bool {
        self.machine.hover_leave()
    }

    /// The user grabbed the time control.
    pub fn begin_scrub(&mut self) -> bool {
        self.machine.begin_scrub()
    }

    /// A value from the time control while dragging. Enters `Scrubbing`
    /// first if the drag was not announced.
    pub fn scrub(&mut self, time: Minute) -> Option<Resolution> {
        if !self.index.in_range(time) {
            debug!(time, "Scrub outside recorded range ignored");
            return None;
        }
        self.machine.begin_scrub();
        Some(self.resolve(time))
    }

    /// The user released the time control.
    pub fn end_scrub(&mut self) -> bool {
        self.machine.end_scrub()
    }

    /// One autoplay tick: advance by the tick size, wrapping past the
    /// last recorded minute back to the first. Does nothing unless
    /// playing.
    pub fn tick(&mut self) -> Option<Resolution> {
        if !self.machine.state().is_playing() {
            return None;
        }
        let next = self
            .current_time
            .checked_add(self.config.tick_minutes)
            .filter(|t| *t <= self.index.max_time())
            .unwrap_or_else(|| self.index.min_time());
        Some(self.resolve(next))
    }

    /// Resolve the current minute again (used for the first frame).
    pub fn refresh(&mut self) -> Resolution {
        self.resolve(self.current_time)
    }

    // -----------------------------------------------------------------------
    // Resolution
    // -----------------------------------------------------------------------

    fn resolve(&mut self, time: Minute) -> Resolution {
        self.current_time = time;

        for sample in self.index.lookup(time) {
            self.motion.step(&sample.id, sample.activity);
        }

        let frame = self.assemble_frame(time);
        match &frame {
            Some(frame) => self.last_frame = Some(frame.clone()),
            None => debug!(time, "No samples at minute, keeping previous frame"),
        }

        Resolution {
            readout: self.readout(),
            frame,
        }
    }

    fn assemble_frame(&self, time: Minute) -> Option<Frame> {
        let samples = self.index.lookup(time);
        if samples.is_empty() {
            return None;
        }
        let illumination = self.phase.illumination(time);
        let entities = samples
            .iter()
            .filter_map(|sample| {
                let position = self.motion.position_of(&sample.id)?;
                Some(FrameEntity {
                    id: sample.id.clone(),
                    sex: sample.sex,
                    position,
                    temperature: sample.temperature,
                    activity: sample.activity,
                })
            })
            .collect();
        Some(Frame {
            time,
            is_day: daylight::is_day_illumination(illumination),
            illumination,
            background_intensity: daylight::background_intensity(illumination),
            entities,
        })
    }

    // -----------------------------------------------------------------------
    // Read access
    // -----------------------------------------------------------------------

    /// Clock readout for the current minute and state, without resolving.
    pub fn readout(&self) -> ClockReadout {
        readout::build(self.current_time, self.machine.state(), &self.phase)
    }

    /// Current playback state.
    pub const fn state(&self) -> PlaybackState {
        self.machine.state()
    }

    /// Current simulated minute.
    pub const fn current_time(&self) -> Minute {
        self.current_time
    }

    /// First recorded minute.
    pub const fn min_time(&self) -> Minute {
        self.index.min_time()
    }

    /// Last recorded minute.
    pub const fn max_time(&self) -> Minute {
        self.index.max_time()
    }

    /// The most recent frame, if any minute with data has been resolved.
    pub const fn last_frame(&self) -> Option<&Frame> {
        self.last_frame.as_ref()
    }

    /// Options for the "jump to day" selector.
    pub fn day_options(&self) -> Vec<DayOption> {
        readout::day_options(self.index.min_time(), self.index.max_time(), self.config.cycle_length)
    }

    /// Current position of a subject.
    pub fn position_of(&self, id: &EntityId) -> Option<circadia_types::Position> {
        self.motion.position_of(id)
    }

    /// Full motion state of a subject.
    pub fn motion_state(&self, id: &EntityId) -> Option<&MotionState> {
        self.motion.state_of(id)
    }

    /// The sample index the core reads from.
    pub const fn index(&self) -> &SampleIndex {
        &self.index
    }

    /// The fixed parameters the core was built with.
    pub const fn config(&self) -> &CoreConfig {
        &self.config
    }

    /// The day/night calculator in use.
    pub const fn phase(&self) -> &DayNightPhase {
        &self.phase
    }
}
