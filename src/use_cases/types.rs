// Use-case level inputs/outputs for the world task.

use crate::domain::{Command, PlayerId, View};
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::time::MissedTickBehavior;

#[derive(Debug)]
pub enum GameEvent {
    // Spawn a player; the reply carries its id, or `None` when the field is full.
    Join {
        reply: oneshot::Sender<Option<PlayerId>>,
    },
    Leave {
        player_id: PlayerId,
    },
    Command {
        player_id: PlayerId,
        command: Command,
    },
}

#[derive(Debug, Clone)]
pub struct WorldUpdate {
    pub tick: u64,
    pub view: View,
}

/// Scheduler settings for the world task.
#[derive(Debug, Clone, Copy)]
pub struct WorldSettings {
    /// Fixed period between two ticks.
    pub tick_period: Duration,
    /// What to do when ticks fall behind wall-clock time.
    pub missed_tick_behavior: MissedTickBehavior,
}
