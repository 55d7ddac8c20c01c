//! Read-only REST endpoint handlers for the Observer server.
//!
//! All handlers read from the in-memory [`PlaybackSnapshot`] via the
//! shared [`AppState`].
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/` | Minimal HTML status page |
//! | `GET` | `/api/playback/status` | Clock readout, bounds and subject count |
//! | `GET` | `/api/frame` | Last resolved frame |
//! | `GET` | `/api/days` | Day selector options |
//! | `GET` | `/api/entities` | List all subjects |
//! | `GET` | `/api/entities/{id}` | One subject with its latest sample |
//!
//! [`PlaybackSnapshot`]: crate::state::PlaybackSnapshot

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::response::{Html, IntoResponse};
use circadia_types::EntityId;

use crate::error::ObserverError;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// GET / -- minimal HTML status page
// ---------------------------------------------------------------------------

/// Serve a minimal HTML page showing the clock and API links.
pub async fn index(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let snapshot = state.snapshot.read().await;
    let (time, label, playback, light) = snapshot.clock.as_ref().map_or_else(
        || (0, String::new(), String::from("Stopped"), String::from("-")),
        |clock| {
            (
                clock.time,
                clock.label.clone(),
                format!("{:?}", clock.state),
                clock.light.label().to_owned(),
            )
        },
    );
    let subjects = snapshot.entities.len();
    let days = snapshot.days.len();

    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <title>Circadia Observer</title>
    <style>
        body {{
            background: #0d1117;
            color: #c9d1d9;
            font-family: 'Fira Code', 'Consolas', monospace;
            padding: 2rem;
            max-width: 800px;
            margin: 0 auto;
        }}
        h1 {{ color: #58a6ff; margin-bottom: 0.25rem; }}
        .metric {{
            display: inline-block;
            background: #161b22;
            border: 1px solid #30363d;
            border-radius: 6px;
            padding: 1rem 1.5rem;
            margin: 0.5rem 0.5rem 0.5rem 0;
            min-width: 120px;
        }}
        .metric .label {{ color: #8b949e; font-size: 0.85rem; }}
        .metric .value {{ color: #58a6ff; font-size: 1.5rem; font-weight: bold; }}
        a {{ color: #58a6ff; text-decoration: none; }}
        ul {{ list-style: none; padding: 0; }}
        li {{ padding: 0.3rem 0; }}
    </style>
</head>
<body>
    <h1>Circadia Observer</h1>
    <p>{time}{label}</p>

    <div>
        <div class="metric">
            <div class="label">Minute</div>
            <div class="value">{time}</div>
        </div>
        <div class="metric">
            <div class="label">Playback</div>
            <div class="value">{playback}</div>
        </div>
        <div class="metric">
            <div class="label">Light</div>
            <div class="value">{light}</div>
        </div>
        <div class="metric">
            <div class="label">Subjects</div>
            <div class="value">{subjects}</div>
        </div>
        <div class="metric">
            <div class="label">Days</div>
            <div class="value">{days}</div>
        </div>
    </div>

    <h2>API Endpoints</h2>
    <ul>
        <li><a href="/api/playback/status">/api/playback/status</a> -- Clock and bounds</li>
        <li><a href="/api/frame">/api/frame</a> -- Last resolved frame</li>
        <li><a href="/api/days">/api/days</a> -- Day selector options</li>
        <li><a href="/api/entities">/api/entities</a> -- Subjects</li>
    </ul>

    <h2>WebSocket</h2>
    <ul>
        <li><code>ws://host:port/ws/frames</code> -- Live frame stream</li>
    </ul>
</body>
</html>"#
    ))
}

// ---------------------------------------------------------------------------
// GET /api/playback/status
// ---------------------------------------------------------------------------

/// Return the current clock readout together with the recorded range.
pub async fn status(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let snapshot = state.snapshot.read().await;
    Json(serde_json::json!({
        "clock": snapshot.clock,
        "min_time": snapshot.min_time,
        "max_time": snapshot.max_time,
        "cycle_length": snapshot.cycle_length,
        "entity_count": snapshot.entities.len(),
        "highlighted": snapshot.highlighted,
        "controllable": state.commands.is_some(),
        "updated_at": snapshot.updated_at.map(|t| t.to_rfc3339()),
    }))
}

// ---------------------------------------------------------------------------
// GET /api/frame
// ---------------------------------------------------------------------------

/// Return the last resolved frame.
pub async fn get_frame(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ObserverError> {
    let snapshot = state.snapshot.read().await;
    let frame = snapshot
        .frame
        .clone()
        .ok_or_else(|| ObserverError::NotFound("no frame resolved yet".to_owned()))?;
    Ok(Json(frame))
}

// ---------------------------------------------------------------------------
// GET /api/days
// ---------------------------------------------------------------------------

/// Return the "jump to day" options and the currently selected day start.
pub async fn list_days(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let snapshot = state.snapshot.read().await;
    Json(serde_json::json!({
        "selected": snapshot.clock.as_ref().map(|c| c.day_start),
        "days": snapshot.days,
    }))
}

// ---------------------------------------------------------------------------
// GET /api/entities
// ---------------------------------------------------------------------------

/// List every subject with its sex.
pub async fn list_entities(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let snapshot = state.snapshot.read().await;
    let entities: Vec<serde_json::Value> = snapshot
        .entities
        .iter()
        .map(|(id, sex)| {
            serde_json::json!({
                "id": id,
                "sex": sex,
                "highlighted": snapshot.highlighted.as_ref() == Some(id),
            })
        })
        .collect();

    Json(serde_json::json!({
        "count": entities.len(),
        "entities": entities,
    }))
}

// ---------------------------------------------------------------------------
// GET /api/entities/{id}
// ---------------------------------------------------------------------------

/// Return one subject with its entry in the current frame, if any.
///
/// The frame entry carries the latest temperature, activity and
/// position; it is `null` when the subject had no sample at the last
/// resolved minute with data.
pub async fn get_entity(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ObserverError> {
    let id = EntityId::new(id);
    let snapshot = state.snapshot.read().await;
    let sex = snapshot
        .entities
        .get(&id)
        .ok_or_else(|| ObserverError::NotFound(format!("entity {id} not found")))?;
    let current = snapshot.frame.as_ref().and_then(|frame| frame.entity(&id));

    Ok(Json(serde_json::json!({
        "id": id,
        "sex": sex,
        "highlighted": snapshot.highlighted.as_ref() == Some(&id),
        "frame_time": snapshot.frame.as_ref().map(|f| f.time),
        "current": current,
    })))
}
