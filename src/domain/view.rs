// Read-only projection of the grid and live entities, mirroring grid dimensions.

use super::entities::{Bullet, BulletId, Direction, Player, PlayerId};
use super::grid::{Grid, Terrain};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Occupant {
    Player {
        player_id: PlayerId,
        direction: Direction,
    },
    // Bullets report their shooter, not their own id.
    Bullet {
        owner_id: PlayerId,
        direction: Direction,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewCell {
    pub terrain: Terrain,
    pub occupant: Option<Occupant>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct View {
    pub width: usize,
    pub height: usize,
    /// Indexed `[y][x]`.
    pub rows: Vec<Vec<ViewCell>>,
}

impl View {
    pub fn cell(&self, x: usize, y: usize) -> Option<&ViewCell> {
        self.rows.get(y).and_then(|row| row.get(x))
    }
}

/// Builds the view from entity state. Players are written first and bullets
/// after, so a bullet wins when both sit on the same cell.
pub fn project(
    grid: &Grid,
    players: &BTreeMap<PlayerId, Player>,
    bullets: &BTreeMap<BulletId, Bullet>,
) -> View {
    let mut rows: Vec<Vec<ViewCell>> = grid
        .rows()
        .map(|row| {
            row.iter()
                .map(|cell| ViewCell {
                    terrain: cell.terrain,
                    occupant: None,
                })
                .collect()
        })
        .collect();

    for player in players.values() {
        if let Some(cell) = rows.get_mut(player.y).and_then(|r| r.get_mut(player.x)) {
            cell.occupant = Some(Occupant::Player {
                player_id: player.id,
                direction: player.direction,
            });
        }
    }

    for bullet in bullets.values() {
        if let Some(cell) = rows.get_mut(bullet.y).and_then(|r| r.get_mut(bullet.x)) {
            cell.occupant = Some(Occupant::Bullet {
                owner_id: bullet.owner_id,
                direction: bullet.direction,
            });
        }
    }

    View {
        width: grid.width(),
        height: grid.height(),
        rows,
    }
}
