use crate::use_cases::{GameEvent, WorldUpdate};
use axum::extract::ws::Utf8Bytes;
use tokio::sync::{broadcast, mpsc, watch};

#[derive(Clone)]
pub struct AppState {
    // Joins, leaves and commands flowing from the network into the world task.
    pub input_tx: mpsc::Sender<GameEvent>,
    // World updates produced by the world task (domain structs).
    pub world_tx: broadcast::Sender<WorldUpdate>,
    // Serialized `{"state": ...}` frames, shared across all connections.
    pub world_bytes_tx: broadcast::Sender<Utf8Bytes>,
    // Latest serialized frame for lag recovery.
    pub world_latest_tx: watch::Sender<Utf8Bytes>,
    // Flipped to `true` once the server starts shutting down.
    pub shutdown_tx: watch::Sender<bool>,
}
