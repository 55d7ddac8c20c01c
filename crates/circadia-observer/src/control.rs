//! Control REST handlers: the network form of the playback control
//! boundary.
//!
//! Each endpoint validates its input against the snapshot and forwards a
//! [`PlaybackCommand`] to the driver task. The driver applies commands in
//! arrival order, so a response means "queued", not "applied".
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/api/playback/play` | Start autoplay |
//! | `POST` | `/api/playback/pause` | Stop autoplay |
//! | `POST` | `/api/playback/toggle` | Flip play/pause |
//! | `POST` | `/api/playback/reset` | Stop, rewind, re-place subjects |
//! | `POST` | `/api/playback/seek` | Move the clock (`{"time": N}`) |
//! | `POST` | `/api/playback/jump` | Jump to a zero-based day (`{"day": N}`) |
//! | `POST` | `/api/playback/scrub/begin` | Grab the time control |
//! | `POST` | `/api/playback/scrub` | Drag the time control (`{"time": N}`) |
//! | `POST` | `/api/playback/scrub/end` | Release the time control |
//! | `POST` | `/api/hover/enter` | Pointer entered the plots |
//! | `POST` | `/api/hover/leave` | Pointer left the plots |
//! | `POST` | `/api/entities/{id}/highlight` | Emphasize a subject |
//! | `DELETE` | `/api/entities/{id}/highlight` | Clear the emphasis |

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use circadia_core::runner::PlaybackCommand;
use circadia_types::{EntityId, Minute};
use tracing::debug;

use crate::error::ObserverError;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /api/playback/seek` and `/api/playback/scrub`.
#[derive(Debug, serde::Deserialize)]
pub struct TimeRequest {
    /// Target minute.
    pub time: Minute,
}

/// Request body for `POST /api/playback/jump`.
#[derive(Debug, serde::Deserialize)]
pub struct JumpRequest {
    /// Zero-based day index.
    pub day: u32,
}

/// Generic success response.
#[derive(Debug, serde::Serialize)]
struct ControlResponse {
    /// Whether the command was queued.
    ok: bool,
    /// Human-readable message.
    message: String,
}

async fn forward(
    state: &AppState,
    command: PlaybackCommand,
    message: impl Into<String>,
) -> Result<Json<ControlResponse>, ObserverError> {
    debug!(?command, "Forwarding playback command");
    state.send(command).await?;
    Ok(Json(ControlResponse {
        ok: true,
        message: message.into(),
    }))
}

async fn checked_time(state: &AppState, time: Minute) -> Result<Minute, ObserverError> {
    let snapshot = state.snapshot.read().await;
    if snapshot.in_range(time) {
        Ok(time)
    } else {
        Err(ObserverError::InvalidRequest(format!(
            "time {time} outside recorded range {}..={}",
            snapshot.min_time, snapshot.max_time
        )))
    }
}

async fn known_entity(state: &AppState, id: String) -> Result<EntityId, ObserverError> {
    let id = EntityId::new(id);
    if state.snapshot.read().await.entities.contains_key(&id) {
        Ok(id)
    } else {
        Err(ObserverError::NotFound(format!("entity {id} not found")))
    }
}

// ---------------------------------------------------------------------------
// Play / pause / toggle / reset
// ---------------------------------------------------------------------------

/// Start autoplay.
pub async fn play(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ObserverError> {
    forward(&state, PlaybackCommand::Play, "Playback started").await
}

/// Stop autoplay.
pub async fn pause(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ObserverError> {
    forward(&state, PlaybackCommand::Pause, "Playback paused").await
}

/// Flip between playing and not playing.
pub async fn toggle(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ObserverError> {
    forward(&state, PlaybackCommand::Toggle, "Playback toggled").await
}

/// Stop, rewind to the first minute and re-place every subject.
pub async fn reset(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ObserverError> {
    forward(&state, PlaybackCommand::Reset, "Playback reset").await
}

// ---------------------------------------------------------------------------
// Seek / jump
// ---------------------------------------------------------------------------

/// Move the clock to a minute inside the recorded range.
pub async fn seek(
    State(state): State<Arc<AppState>>,
    Json(body): Json<TimeRequest>,
) -> Result<impl IntoResponse, ObserverError> {
    let time = checked_time(&state, body.time).await?;
    forward(&state, PlaybackCommand::Seek(time), format!("Seeking to minute {time}")).await
}

/// Jump to the start of a zero-based day and pause.
pub async fn jump(
    State(state): State<Arc<AppState>>,
    Json(body): Json<JumpRequest>,
) -> Result<impl IntoResponse, ObserverError> {
    let start = {
        let snapshot = state.snapshot.read().await;
        body.day
            .checked_mul(snapshot.cycle_length)
            .filter(|start| snapshot.in_range(*start))
    };
    let Some(start) = start else {
        return Err(ObserverError::InvalidRequest(format!(
            "day {} starts outside the recorded range",
            body.day
        )));
    };
    forward(
        &state,
        PlaybackCommand::JumpToDay(body.day),
        format!("Jumping to day {} (minute {start})", body.day.saturating_add(1)),
    )
    .await
}

// ---------------------------------------------------------------------------
// Scrubbing
// ---------------------------------------------------------------------------

/// The time control was grabbed.
pub async fn begin_scrub(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ObserverError> {
    forward(&state, PlaybackCommand::BeginScrub, "Scrubbing").await
}

/// A time control value while dragging.
pub async fn scrub(
    State(state): State<Arc<AppState>>,
    Json(body): Json<TimeRequest>,
) -> Result<impl IntoResponse, ObserverError> {
    let time = checked_time(&state, body.time).await?;
    forward(&state, PlaybackCommand::Scrub(time), format!("Scrubbed to minute {time}")).await
}

/// The time control was released.
pub async fn end_scrub(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ObserverError> {
    forward(&state, PlaybackCommand::EndScrub, "Scrubbing ended").await
}

// ---------------------------------------------------------------------------
// Hover
// ---------------------------------------------------------------------------

/// The pointer entered the plots; autoplay pauses until it leaves.
pub async fn hover_enter(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ObserverError> {
    forward(&state, PlaybackCommand::HoverEnter, "Hover entered").await
}

/// The pointer left the plots; autoplay resumes if hover paused it.
pub async fn hover_leave(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ObserverError> {
    forward(&state, PlaybackCommand::HoverLeave, "Hover left").await
}

// ---------------------------------------------------------------------------
// Highlight
// ---------------------------------------------------------------------------

/// Emphasize one subject in both views.
pub async fn highlight(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ObserverError> {
    let id = known_entity(&state, id).await?;
    let message = format!("Highlighting {id}");
    forward(&state, PlaybackCommand::Highlight(Some(id)), message).await
}

/// Clear the emphasis if it is on this subject.
pub async fn clear_highlight(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ObserverError> {
    let id = known_entity(&state, id).await?;
    if state.snapshot.read().await.highlighted.as_ref() != Some(&id) {
        return Ok(Json(ControlResponse {
            ok: true,
            message: format!("{id} was not highlighted"),
        }));
    }
    forward(&state, PlaybackCommand::Highlight(None), format!("Cleared highlight on {id}")).await
}
