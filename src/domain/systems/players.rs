use crate::domain::entities::{Player, PlayerId};
use crate::domain::grid::Grid;
use std::collections::BTreeMap;

/// Advances every player one cell in its facing direction, gated by the move
/// cooldown. Blocked or out-of-bounds steps are skipped silently.
pub fn tick_players(
    grid: &mut Grid,
    players: &mut BTreeMap<PlayerId, Player>,
    now: u64,
    move_period_ms: u64,
) {
    for player in players.values_mut() {
        // Facing persists between commands, so every tick is a move attempt.
        let Some((x, y)) = player.direction.step(player.x, player.y) else {
            continue;
        };
        if !grid.is_passable(x, y) {
            continue;
        }
        if player
            .last_move_at
            .is_some_and(|last| now.saturating_sub(last) < move_period_ms)
        {
            continue;
        }

        grid.set_player(player.x, player.y, None);
        player.x = x;
        player.y = y;
        grid.set_player(x, y, Some(player.id));
        player.last_move_at = Some(now);
    }
}

/// Removes a player from the live set and nulls its cell reference.
pub fn despawn_player(
    grid: &mut Grid,
    players: &mut BTreeMap<PlayerId, Player>,
    player_id: PlayerId,
) -> Option<Player> {
    let player = players.remove(&player_id)?;
    if grid.cell(player.x, player.y).and_then(|c| c.player) == Some(player_id) {
        grid.set_player(player.x, player.y, None);
    }
    Some(player)
}
