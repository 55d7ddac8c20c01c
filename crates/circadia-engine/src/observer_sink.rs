//! Frame sink that feeds the Observer API.
//!
//! Every frame, readout and highlight change is broadcast to connected
//! `WebSocket` clients immediately and written into the REST snapshot.
//! Snapshot writes use `try_write` so the driver never waits on a REST
//! reader; an update that finds the lock busy is kept pending and folded
//! into the next successful write. The driver retries [`FrameSink::flush`]
//! on its own timer while anything is pending, so a held-back pause still
//! lands without another tick.

use std::sync::Arc;

use chrono::Utc;
use circadia_core::runner::FrameSink;
use circadia_observer::state::{AppState, FrameBroadcast};
use circadia_types::{ClockReadout, EntityId, Frame};
use tracing::debug;

#[derive(Debug, Default)]
struct Pending {
    frame: Option<Frame>,
    clock: Option<ClockReadout>,
    highlight: Option<Option<EntityId>>,
}

/// Sink that bridges the playback driver to the Observer API.
pub struct ObserverSink {
    state: Arc<AppState>,
    pending: Pending,
}

impl ObserverSink {
    /// Create a sink backed by the given app state.
    pub fn new(state: Arc<AppState>) -> Self {
        Self {
            state,
            pending: Pending::default(),
        }
    }
}

impl Pending {
    const fn is_empty(&self) -> bool {
        self.frame.is_none() && self.clock.is_none() && self.highlight.is_none()
    }
}

impl FrameSink for ObserverSink {
    fn on_frame(&mut self, frame: &Frame) {
        let receivers = self.state.broadcast(FrameBroadcast::Frame(frame.clone()));
        debug!(
            time = frame.time,
            entities = frame.entities.len(),
            receivers,
            "Frame broadcast sent"
        );
        self.pending.frame = Some(frame.clone());
        self.flush();
    }

    fn on_clock(&mut self, readout: &ClockReadout) {
        self.state.broadcast(FrameBroadcast::Clock(readout.clone()));
        self.pending.clock = Some(readout.clone());
        self.flush();
    }

    fn on_highlight(&mut self, id: Option<&EntityId>) {
        let id = id.cloned();
        self.state.broadcast(FrameBroadcast::Highlight { id: id.clone() });
        self.pending.highlight = Some(id);
        self.flush();
    }

    fn flush(&mut self) -> bool {
        if self.pending.is_empty() {
            return true;
        }
        let Ok(mut snap) = self.state.snapshot.try_write() else {
            debug!("Snapshot busy, deferring update");
            return false;
        };
        let pending = std::mem::take(&mut self.pending);
        if let Some(frame) = pending.frame {
            snap.frame = Some(frame);
        }
        if let Some(clock) = pending.clock {
            snap.clock = Some(clock);
        }
        if let Some(highlight) = pending.highlight {
            snap.highlighted = highlight;
        }
        snap.updated_at = Some(Utc::now());
        true
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use circadia_types::{LightPhase, PlaybackState};

    use super::*;

    fn frame(time: u32) -> Frame {
        Frame {
            time,
            is_day: false,
            illumination: 0.0,
            background_intensity: 1.0,
            entities: Vec::new(),
        }
    }

    fn clock(time: u32, state: PlaybackState) -> ClockReadout {
        ClockReadout {
            time,
            cycle_number: 1,
            day_start: 0,
            illumination: 0.0,
            is_day: false,
            light: LightPhase::Off,
            background_intensity: 1.0,
            state,
            label: String::from(" minutes, light-off cycle 1"),
        }
    }

    #[tokio::test]
    async fn frames_reach_snapshot_and_subscribers() {
        let state = Arc::new(AppState::new());
        let mut rx = state.subscribe();
        let mut sink = ObserverSink::new(Arc::clone(&state));

        sink.on_frame(&frame(5));

        assert!(matches!(rx.recv().await.unwrap(), FrameBroadcast::Frame(f) if f.time == 5));
        let snap = state.snapshot.read().await;
        assert_eq!(snap.frame.as_ref().unwrap().time, 5);
        assert!(snap.updated_at.is_some());
    }

    #[tokio::test]
    async fn busy_snapshot_catches_up_on_next_write() {
        let state = Arc::new(AppState::new());
        let mut sink = ObserverSink::new(Arc::clone(&state));

        {
            let _reader = state.snapshot.read().await;
            sink.on_clock(&clock(10, PlaybackState::Playing));
            sink.on_highlight(Some(&EntityId::from("f1")));
        }
        assert!(state.snapshot.read().await.clock.is_none());

        sink.on_frame(&frame(10));

        let snap = state.snapshot.read().await;
        assert_eq!(snap.clock.as_ref().unwrap().time, 10);
        assert_eq!(snap.frame.as_ref().unwrap().time, 10);
        assert_eq!(snap.highlighted, Some(EntityId::from("f1")));
    }

    #[tokio::test]
    async fn held_back_pause_lands_on_retry() {
        let state = Arc::new(AppState::new());
        let mut sink = ObserverSink::new(Arc::clone(&state));
        sink.on_clock(&clock(10, PlaybackState::Playing));

        {
            let _reader = state.snapshot.read().await;
            sink.on_clock(&clock(10, PlaybackState::Paused));
            assert!(!sink.flush());
        }
        assert_eq!(
            state.snapshot.read().await.clock.as_ref().unwrap().state,
            PlaybackState::Playing
        );

        assert!(sink.flush());
        assert_eq!(
            state.snapshot.read().await.clock.as_ref().unwrap().state,
            PlaybackState::Paused
        );
        assert!(sink.flush());
    }
}
