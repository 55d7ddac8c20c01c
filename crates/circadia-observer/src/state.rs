//! Shared application state for the Observer API server.
//!
//! [`AppState`] holds the broadcast channel for frame messages, the
//! in-memory [`PlaybackSnapshot`] served by the REST endpoints, and the
//! sender half of the playback driver's command channel.

use std::collections::BTreeMap;
use std::sync::Arc;

use circadia_core::runner::PlaybackCommand;
use chrono::{DateTime, Utc};
use circadia_types::{ClockReadout, DayOption, EntityId, Frame, Minute, Sex};
use tokio::sync::{RwLock, broadcast, mpsc};

use crate::error::ObserverError;

/// Capacity of the broadcast channel for frame messages.
///
/// If a subscriber falls behind by more than this many messages it will
/// receive a [`broadcast::error::RecvError::Lagged`] and skip to the
/// newest message.
const BROADCAST_CAPACITY: usize = 256;

/// JSON message pushed over the `WebSocket`, tagged by `type`.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FrameBroadcast {
    /// A newly resolved frame.
    Frame(Frame),
    /// The clock moved or the playback state changed.
    Clock(ClockReadout),
    /// The emphasized subject changed.
    Highlight {
        /// The subject to emphasize, or `None` to clear.
        id: Option<EntityId>,
    },
}

/// In-memory view of the playback served by REST endpoints.
#[derive(Debug, Clone, Default)]
pub struct PlaybackSnapshot {
    /// Most recent clock readout.
    pub clock: Option<ClockReadout>,
    /// Most recent frame with data.
    pub frame: Option<Frame>,
    /// First recorded minute.
    pub min_time: Minute,
    /// Last recorded minute.
    pub max_time: Minute,
    /// Minutes per light cycle.
    pub cycle_length: Minute,
    /// Options for the "jump to day" selector.
    pub days: Vec<DayOption>,
    /// Every known subject and its sex.
    pub entities: BTreeMap<EntityId, Sex>,
    /// The currently emphasized subject.
    pub highlighted: Option<EntityId>,
    /// Wall-clock time of the last update from the driver.
    pub updated_at: Option<DateTime<Utc>>,
}

impl PlaybackSnapshot {
    /// Whether `time` lies inside the recorded range.
    pub const fn in_range(&self, time: Minute) -> bool {
        time >= self.min_time && time <= self.max_time
    }
}

/// Shared state for the Axum application.
///
/// Wrapped in [`Arc`] and injected via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    /// Broadcast sender for frame messages.
    pub tx: broadcast::Sender<FrameBroadcast>,
    /// The current playback snapshot.
    pub snapshot: Arc<RwLock<PlaybackSnapshot>>,
    /// Command sender of the playback driver (absent when read-only).
    pub commands: Option<mpsc::Sender<PlaybackCommand>>,
}

impl AppState {
    /// Create a read-only application state with an empty snapshot.
    pub fn new() -> Self {
        Self::build(PlaybackSnapshot::default(), None)
    }

    /// Create an application state wired to a playback driver.
    pub fn with_commands(
        snapshot: PlaybackSnapshot,
        commands: mpsc::Sender<PlaybackCommand>,
    ) -> Self {
        Self::build(snapshot, Some(commands))
    }

    fn build(snapshot: PlaybackSnapshot, commands: Option<mpsc::Sender<PlaybackCommand>>) -> Self {
        let (tx, _) = broadcast::channel(BROADCAST_CAPACITY);
        Self {
            tx,
            snapshot: Arc::new(RwLock::new(snapshot)),
            commands,
        }
    }

    /// Subscribe to the frame broadcast channel.
    pub fn subscribe(&self) -> broadcast::Receiver<FrameBroadcast> {
        self.tx.subscribe()
    }

    /// Publish a message to all connected clients.
    ///
    /// Returns the number of receivers that received the message, which
    /// is 0 when no clients are connected.
    pub fn broadcast(&self, message: FrameBroadcast) -> usize {
        self.tx.send(message).unwrap_or(0)
    }

    /// Forward a command to the playback driver.
    ///
    /// # Errors
    ///
    /// Returns [`ObserverError::Unavailable`] if no driver is attached or
    /// the driver has stopped.
    pub async fn send(&self, command: PlaybackCommand) -> Result<(), ObserverError> {
        let commands = self
            .commands
            .as_ref()
            .ok_or_else(|| ObserverError::Unavailable("playback driver not attached".to_owned()))?;
        commands
            .send(command)
            .await
            .map_err(|e| ObserverError::Unavailable(format!("playback driver stopped: {e}")))
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
