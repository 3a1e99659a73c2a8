use super::types::{GameEvent, WorldSettings, WorldUpdate};
use crate::domain::Engine;
use crate::domain::ports::Clock;
use std::sync::Arc;
use tokio::sync::mpsc::error::TryRecvError;
use tokio::sync::{Notify, broadcast, mpsc};
use tracing::{debug, info, warn};

/// Drives the engine on a fixed period until `shutdown` fires or every event
/// sender is gone. The engine is handed back untouched after the last tick.
pub async fn world_task(
    mut engine: Engine,
    mut input_rx: mpsc::Receiver<GameEvent>,
    world_tx: broadcast::Sender<WorldUpdate>,
    clock: Arc<dyn Clock>,
    settings: WorldSettings,
    shutdown: Arc<Notify>,
) -> Engine {
    let mut tick: u64 = 0;

    let mut interval = tokio::time::interval(settings.tick_period);
    interval.set_missed_tick_behavior(settings.missed_tick_behavior);

    info!(
        tick_period_ms = settings.tick_period.as_millis() as u64,
        width = engine.grid().width(),
        height = engine.grid().height(),
        "world task started"
    );

    loop {
        tokio::select! {
            _ = shutdown.notified() => {
                info!(tick, "world task stopping");
                break;
            }
            _ = interval.tick() => {}
        }

        let now = clock.now_millis();

        // Commands only touch intent fields, so applying them all before the
        // tick keeps grid mutation inside `Engine::tick`.
        let mut inputs_closed = false;
        loop {
            match input_rx.try_recv() {
                Ok(ev) => apply_event(&mut engine, ev, now),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    inputs_closed = true;
                    break;
                }
            }
        }

        engine.tick(now);
        tick += 1;

        // No subscribers is not an error; the next client will get the next tick.
        let _ = world_tx.send(WorldUpdate {
            tick,
            view: engine.project(),
        });

        if inputs_closed {
            info!(tick, "input channel closed; world task exiting");
            break;
        }
    }

    engine
}

fn apply_event(engine: &mut Engine, ev: GameEvent, now: u64) {
    match ev {
        GameEvent::Join { reply } => {
            let player_id = match engine.add_player() {
                Ok(id) => Some(id),
                Err(e) => {
                    warn!(error = %e, "join rejected");
                    None
                }
            };
            if reply.send(player_id).is_err() {
                // Requester went away before hearing back.
                if let Some(player_id) = player_id {
                    debug!(player_id, "join reply dropped; despawning");
                    engine.remove_player(player_id);
                }
            }
        }
        GameEvent::Leave { player_id } => {
            engine.remove_player(player_id);
        }
        GameEvent::Command { player_id, command } => {
            engine.handle_command(player_id, command, now);
        }
    }
}
