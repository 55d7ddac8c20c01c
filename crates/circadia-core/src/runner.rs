//! Async playback driver with a command channel.
//!
//! [`run_playback`] owns the [`SimulationCore`] for its whole lifetime.
//! Control input arrives as [`PlaybackCommand`]s over an mpsc channel and
//! autoplay ticks come from a [`TickScheduler`]. Both are awaited in one
//! biased `select!`, so:
//!
//! - commands always win over a tick that is due at the same moment,
//! - no two ticks ever run concurrently, and
//! - a pause that lands between two ticks cancels the next one.
//!
//! Everything the core resolves is handed to a [`FrameSink`], the seam
//! the renderer (or the observer) plugs into. A sink that could not
//! deliver an update gets [`FrameSink::flush`] retried on a timer until
//! it reports success.

use circadia_types::{ClockReadout, EntityId, Frame, Minute, PlaybackState};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::motion::RandomSource;
use crate::scheduler::TickScheduler;
use crate::simulation::{Resolution, SimulationCore};

/// Capacity of the playback command channel.
pub const COMMAND_CAPACITY: usize = 64;

/// A control-boundary call routed to the driver task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackCommand {
    /// Start autoplay.
    Play,
    /// Stop autoplay.
    Pause,
    /// Flip between playing and not playing.
    Toggle,
    /// Move the clock to a minute.
    Seek(Minute),
    /// Move the clock to the start of a zero-based day and pause.
    JumpToDay(u32),
    /// Stop, rewind and re-place every subject.
    Reset,
    /// The time control was grabbed.
    BeginScrub,
    /// A time control value while dragging.
    Scrub(Minute),
    /// The time control was released.
    EndScrub,
    /// The pointer entered the plots.
    HoverEnter,
    /// The pointer left the plots.
    HoverLeave,
    /// Emphasize one subject in both views, or clear the emphasis.
    Highlight(Option<EntityId>),
    /// Stop the driver.
    Shutdown,
}

/// Create the playback command channel.
pub fn command_channel() -> (mpsc::Sender<PlaybackCommand>, mpsc::Receiver<PlaybackCommand>) {
    mpsc::channel(COMMAND_CAPACITY)
}

/// Receiver of everything the core resolves.
///
/// Implementations render, broadcast or record. They only ever read
/// the values handed to them.
pub trait FrameSink: Send {
    /// A new frame was resolved.
    fn on_frame(&mut self, frame: &Frame);

    /// The clock state changed (time, state or both).
    fn on_clock(&mut self, readout: &ClockReadout);

    /// The highlighted subject changed.
    fn on_highlight(&mut self, _id: Option<&EntityId>) {}

    /// Write out anything held back earlier. Returns `true` once nothing
    /// is pending; the driver keeps retrying until then, even while
    /// autoplay is stopped.
    fn flush(&mut self) -> bool {
        true
    }
}

/// A sink that drops everything.
pub struct NoOpSink;

impl FrameSink for NoOpSink {
    fn on_frame(&mut self, _frame: &Frame) {}

    fn on_clock(&mut self, _readout: &ClockReadout) {}
}

/// Why the driver stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunEndReason {
    /// A [`PlaybackCommand::Shutdown`] was received.
    Shutdown,
    /// Every command sender was dropped.
    ChannelClosed,
}

/// Totals reported when the driver stops.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Why the driver stopped.
    pub end_reason: RunEndReason,
    /// Autoplay ticks executed.
    pub ticks: u64,
    /// Commands applied (excluding the shutdown itself).
    pub commands: u64,
    /// Frames handed to the sink.
    pub frames: u64,
    /// Clock time when the driver stopped.
    pub final_time: Minute,
    /// Playback state when the driver stopped.
    pub final_state: PlaybackState,
}

#[derive(Debug, Default)]
struct Counters {
    ticks: u64,
    commands: u64,
    frames: u64,
}

/// Drive the core until shutdown.
///
/// The current minute is resolved once up front so the sink starts with
/// a frame and a readout. After that the loop waits on the command
/// channel and the tick schedule, applying whichever comes first and
/// re-arming or canceling the next tick from the resulting state.
pub async fn run_playback<S: RandomSource + Send>(
    core: &mut SimulationCore<S>,
    commands: &mut mpsc::Receiver<PlaybackCommand>,
    sink: &mut dyn FrameSink,
    scheduler: &mut TickScheduler,
) -> RunSummary {
    let mut counters = Counters::default();

    info!(
        min_time = core.min_time(),
        max_time = core.max_time(),
        interval_ms = u64::try_from(scheduler.interval().as_millis()).unwrap_or(u64::MAX),
        "Playback driver starting"
    );

    let first = core.refresh();
    publish(&first, sink, &mut counters);

    let mut flush_retry = TickScheduler::new(scheduler.interval());

    let end_reason = loop {
        if core.state().is_playing() {
            scheduler.schedule();
        } else {
            scheduler.cancel();
        }
        if sink.flush() {
            flush_retry.cancel();
        } else {
            flush_retry.schedule();
        }

        tokio::select! {
            biased;

            command = commands.recv() => match command {
                None => break RunEndReason::ChannelClosed,
                Some(PlaybackCommand::Shutdown) => break RunEndReason::Shutdown,
                Some(command) => {
                    counters.commands = counters.commands.saturating_add(1);
                    apply(core, command, sink, &mut counters);
                }
            },

            () = scheduler.fired() => {
                if let Some(resolution) = core.tick() {
                    counters.ticks = counters.ticks.saturating_add(1);
                    publish(&resolution, sink, &mut counters);
                }
            }

            // The flush itself happens at the top of the loop.
            () = flush_retry.fired() => {}
        }
    };

    scheduler.cancel();
    if !sink.flush() {
        warn!("Frame sink still had undelivered updates at shutdown");
    }

    let summary = RunSummary {
        end_reason,
        ticks: counters.ticks,
        commands: counters.commands,
        frames: counters.frames,
        final_time: core.current_time(),
        final_state: core.state(),
    };
    info!(
        reason = ?summary.end_reason,
        ticks = summary.ticks,
        commands = summary.commands,
        frames = summary.frames,
        final_time = summary.final_time,
        "Playback driver stopped"
    );
    summary
}

fn apply<S: RandomSource>(
    core: &mut SimulationCore<S>,
    command: PlaybackCommand,
    sink: &mut dyn FrameSink,
    counters: &mut Counters,
) {
    debug!(?command, "Applying playback command");
    let state_changed = match command {
        PlaybackCommand::Play => core.play(),
        PlaybackCommand::Pause => core.pause(),
        PlaybackCommand::Toggle => core.toggle(),
        PlaybackCommand::HoverEnter => core.hover_enter(),
        PlaybackCommand::HoverLeave => core.hover_leave(),
        PlaybackCommand::BeginScrub => core.begin_scrub(),
        PlaybackCommand::EndScrub => core.end_scrub(),
        PlaybackCommand::Seek(time) => return publish_opt(core.seek(time), sink, counters),
        PlaybackCommand::Scrub(time) => return publish_opt(core.scrub(time), sink, counters),
        PlaybackCommand::JumpToDay(day) => {
            return publish_opt(core.jump_to_day(day), sink, counters);
        }
        PlaybackCommand::Reset => {
            let resolution = core.reset();
            return publish(&resolution, sink, counters);
        }
        PlaybackCommand::Highlight(id) => {
            sink.on_highlight(id.as_ref());
            return;
        }
        PlaybackCommand::Shutdown => false,
    };
    if state_changed {
        sink.on_clock(&core.readout());
    }
}

fn publish_opt(resolution: Option<Resolution>, sink: &mut dyn FrameSink, counters: &mut Counters) {
    if let Some(resolution) = resolution {
        publish(&resolution, sink, counters);
    }
}

fn publish(resolution: &Resolution, sink: &mut dyn FrameSink, counters: &mut Counters) {
    if let Some(frame) = &resolution.frame {
        counters.frames = counters.frames.saturating_add(1);
        sink.on_frame(frame);
    }
    sink.on_clock(&resolution.readout);
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]
mod tests {
    use std::time::Duration;

    use circadia_types::{Sample, Sex};
    use rand::rngs::SmallRng;

    use super::*;
    use crate::config::CoreConfig;
    use crate::motion::RngSource;
    use crate::sample_index::SampleIndex;

    #[derive(Default)]
    struct RecordingSink {
        frames: Vec<Frame>,
        clocks: Vec<ClockReadout>,
        highlights: Vec<Option<EntityId>>,
    }

    impl FrameSink for RecordingSink {
        fn on_frame(&mut self, frame: &Frame) {
            self.frames.push(frame.clone());
        }

        fn on_clock(&mut self, readout: &ClockReadout) {
            self.clocks.push(readout.clone());
        }

        fn on_highlight(&mut self, id: Option<&EntityId>) {
            self.highlights.push(id.cloned());
        }
    }

    fn core() -> SimulationCore<RngSource<SmallRng>> {
        let samples = (0..=30)
            .map(|t| Sample {
                id: EntityId::from("m1"),
                sex: Sex::Male,
                time: t,
                temperature: 37.0,
                activity: 40.0,
            })
            .collect();
        let index = SampleIndex::new(samples).unwrap();
        SimulationCore::new(CoreConfig::default(), index, RngSource::seeded(11)).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_while_playing_and_wraps() {
        let mut core = core();
        let (tx, mut rx) = command_channel();
        let mut sink = RecordingSink::default();
        let mut scheduler = TickScheduler::from_millis(100);

        tokio::spawn(async move {
            tx.send(PlaybackCommand::Play).await.unwrap();
            tokio::time::sleep(Duration::from_millis(750)).await;
            tx.send(PlaybackCommand::Shutdown).await.unwrap();
        });

        let summary = run_playback(&mut core, &mut rx, &mut sink, &mut scheduler).await;

        assert_eq!(summary.end_reason, RunEndReason::Shutdown);
        assert_eq!(summary.ticks, 7);
        let times: Vec<Minute> = sink.frames.iter().map(|f| f.time).collect();
        assert_eq!(times, vec![0, 5, 10, 15, 20, 25, 30, 0]);
        assert!(times.iter().all(|t| *t <= 30));
    }

    #[tokio::test(start_paused = true)]
    async fn hover_stops_further_ticks() {
        let mut core = core();
        let (tx, mut rx) = command_channel();
        let mut sink = RecordingSink::default();
        let mut scheduler = TickScheduler::from_millis(100);

        tokio::spawn(async move {
            tx.send(PlaybackCommand::Play).await.unwrap();
            tokio::time::sleep(Duration::from_millis(250)).await;
            tx.send(PlaybackCommand::HoverEnter).await.unwrap();
            tokio::time::sleep(Duration::from_secs(2)).await;
            tx.send(PlaybackCommand::Shutdown).await.unwrap();
        });

        let summary = run_playback(&mut core, &mut rx, &mut sink, &mut scheduler).await;

        assert_eq!(summary.ticks, 2);
        assert_eq!(summary.final_state, PlaybackState::Paused);
        assert_eq!(summary.final_time, 10);
    }

    #[tokio::test(start_paused = true)]
    async fn closed_channel_ends_run() {
        let mut core = core();
        let (tx, mut rx) = command_channel();
        tx.send(PlaybackCommand::Seek(12)).await.unwrap();
        tx.send(PlaybackCommand::Highlight(Some(EntityId::from("m1"))))
            .await
            .unwrap();
        drop(tx);
        let mut sink = RecordingSink::default();
        let mut scheduler = TickScheduler::from_millis(100);

        let summary = run_playback(&mut core, &mut rx, &mut sink, &mut scheduler).await;

        assert_eq!(summary.end_reason, RunEndReason::ChannelClosed);
        assert_eq!(summary.commands, 2);
        assert_eq!(summary.final_time, 12);
        assert_eq!(sink.highlights, vec![Some(EntityId::from("m1"))]);
        assert_eq!(sink.clocks.last().unwrap().time, 12);
    }

    /// Refuses to write a paused readout a fixed number of times.
    struct StubbornSink {
        paused_refusals: u32,
        retries: u32,
        pending: Option<PlaybackState>,
        delivered: Vec<PlaybackState>,
    }

    impl FrameSink for StubbornSink {
        fn on_frame(&mut self, _frame: &Frame) {}

        fn on_clock(&mut self, readout: &ClockReadout) {
            self.pending = Some(readout.state);
            self.flush();
        }

        fn flush(&mut self) -> bool {
            let Some(state) = self.pending else {
                return true;
            };
            if state == PlaybackState::Paused && self.paused_refusals > 0 {
                self.paused_refusals -= 1;
                self.retries += 1;
                return false;
            }
            self.delivered.push(state);
            self.pending = None;
            true
        }
    }

    #[tokio::test(start_paused = true)]
    async fn held_back_pause_is_written_without_further_ticks() {
        let mut core = core();
        let (tx, mut rx) = command_channel();
        let mut sink = StubbornSink {
            paused_refusals: 4,
            retries: 0,
            pending: None,
            delivered: Vec::new(),
        };
        let mut scheduler = TickScheduler::from_millis(100);

        tokio::spawn(async move {
            tx.send(PlaybackCommand::Play).await.unwrap();
            tokio::time::sleep(Duration::from_millis(250)).await;
            tx.send(PlaybackCommand::Pause).await.unwrap();
            tokio::time::sleep(Duration::from_secs(2)).await;
            tx.send(PlaybackCommand::Shutdown).await.unwrap();
        });

        let summary = run_playback(&mut core, &mut rx, &mut sink, &mut scheduler).await;

        assert_eq!(summary.final_state, PlaybackState::Paused);
        assert_eq!(summary.ticks, 2);
        assert_eq!(sink.retries, 4);
        assert!(sink.pending.is_none());
        assert_eq!(sink.delivered.last(), Some(&PlaybackState::Paused));
    }

    #[tokio::test(start_paused = true)]
    async fn noop_sink_counts_frames() {
        let mut core = core();
        let (tx, mut rx) = command_channel();
        tx.send(PlaybackCommand::Reset).await.unwrap();
        tx.send(PlaybackCommand::JumpToDay(9)).await.unwrap();
        tx.send(PlaybackCommand::Shutdown).await.unwrap();
        let mut scheduler = TickScheduler::from_millis(100);

        let summary = run_playback(&mut core, &mut rx, &mut NoOpSink, &mut scheduler).await;

        // Initial refresh plus the reset frame; the day jump is rejected.
        assert_eq!(summary.frames, 2);
        assert_eq!(summary.final_state, PlaybackState::Stopped);
    }

    #[tokio::test(start_paused = true)]
    async fn state_only_commands_publish_clock() {
        let mut core = core();
        let (tx, mut rx) = command_channel();
        tx.send(PlaybackCommand::Toggle).await.unwrap();
        tx.send(PlaybackCommand::Pause).await.unwrap();
        tx.send(PlaybackCommand::Shutdown).await.unwrap();
        let mut sink = RecordingSink::default();
        let mut scheduler = TickScheduler::from_millis(100);

        let summary = run_playback(&mut core, &mut rx, &mut sink, &mut scheduler).await;

        let states: Vec<PlaybackState> = sink.clocks.iter().map(|c| c.state).collect();
        assert_eq!(
            states,
            vec![PlaybackState::Stopped, PlaybackState::Playing, PlaybackState::Paused]
        );
        assert_eq!(summary.ticks, 0);
    }
}
