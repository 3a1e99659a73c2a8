use crate::domain::entities::{Bullet, BulletId, Player, PlayerId};
use crate::domain::grid::{Grid, Terrain};
use crate::domain::systems::players::despawn_player;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info};

#[derive(Debug, Clone, Copy)]
pub struct BulletConfig {
    pub lifetime_ms: u64,
    pub move_period_ms: u64,
}

/// Runs the bullet pass of a tick: lifetime, impact at the current cell,
/// bounds, cooldown-gated advance. Dead bullets are dropped from the map
/// once iteration is over.
pub fn tick_bullets(
    grid: &mut Grid,
    players: &mut BTreeMap<PlayerId, Player>,
    bullets: &mut BTreeMap<BulletId, Bullet>,
    now: u64,
    cfg: BulletConfig,
) {
    let mut for_deletion: BTreeSet<BulletId> = BTreeSet::new();

    for bullet in bullets.values_mut() {
        // Already destroyed by another bullet earlier in this pass.
        if for_deletion.contains(&bullet.id) {
            continue;
        }

        if now.saturating_sub(bullet.created_at) >= cfg.lifetime_ms {
            release_cell(grid, bullet);
            debug!(bullet_id = bullet.id, "bullet expired");
            for_deletion.insert(bullet.id);
            continue;
        }

        if resolve_impact(grid, players, bullet) {
            for_deletion.insert(bullet.id);
            continue;
        }

        // Leaving the field is not an impact: nothing else is touched.
        let next = bullet
            .direction
            .step(bullet.x, bullet.y)
            .filter(|&(x, y)| grid.in_bounds(x, y));
        let Some((x, y)) = next else {
            release_cell(grid, bullet);
            for_deletion.insert(bullet.id);
            continue;
        };

        if bullet
            .last_move_at
            .is_some_and(|last| now.saturating_sub(last) < cfg.move_period_ms)
        {
            continue;
        }

        // Two bullets meeting in one cell destroy each other.
        if let Some(other) = grid.cell(x, y).and_then(|c| c.bullet) {
            release_cell(grid, bullet);
            grid.set_bullet(x, y, None);
            debug!(bullet_id = bullet.id, other_id = other, "bullets collided");
            for_deletion.insert(bullet.id);
            for_deletion.insert(other);
            continue;
        }

        release_cell(grid, bullet);
        bullet.x = x;
        bullet.y = y;
        grid.set_bullet(x, y, Some(bullet.id));
        bullet.last_move_at = Some(now);

        // Resolve on entry so no bullet is left inside a wall between ticks.
        if resolve_impact(grid, players, bullet) {
            for_deletion.insert(bullet.id);
        }
    }

    bullets.retain(|id, _| !for_deletion.contains(id));
}

/// Applies a wall or player hit at the bullet's current cell.
///
/// Returns true when the bullet is spent. The cell is left empty either way.
fn resolve_impact(
    grid: &mut Grid,
    players: &mut BTreeMap<PlayerId, Player>,
    bullet: &Bullet,
) -> bool {
    let Some(cell) = grid.cell(bullet.x, bullet.y) else {
        return true;
    };

    if cell.terrain == Terrain::Wall {
        grid.clear(bullet.x, bullet.y);
        debug!(
            bullet_id = bullet.id,
            x = bullet.x,
            y = bullet.y,
            "wall destroyed"
        );
        return true;
    }

    if let Some(victim_id) = cell.player {
        despawn_player(grid, players, victim_id);
        grid.clear(bullet.x, bullet.y);
        info!(
            victim_id,
            shooter_id = bullet.owner_id,
            bullet_id = bullet.id,
            "player hit"
        );
        return true;
    }

    false
}

fn release_cell(grid: &mut Grid, bullet: &Bullet) {
    if grid.cell(bullet.x, bullet.y).and_then(|c| c.bullet) == Some(bullet.id) {
        grid.set_bullet(bullet.x, bullet.y, None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::Direction;

    const CFG: BulletConfig = BulletConfig {
        lifetime_ms: 5000,
        move_period_ms: 100,
    };

    fn fire(
        grid: &mut Grid,
        bullets: &mut BTreeMap<BulletId, Bullet>,
        id: u64,
        at: (usize, usize),
        direction: Direction,
        created_at: u64,
    ) {
        bullets.insert(
            id,
            Bullet {
                id,
                owner_id: 99,
                x: at.0,
                y: at.1,
                direction,
                created_at,
                last_move_at: None,
            },
        );
        grid.set_bullet(at.0, at.1, Some(id));
    }

    #[test]
    fn advances_at_bullet_cadence() {
        let mut grid = Grid::empty(10, 1).expect("grid");
        let mut players = BTreeMap::new();
        let mut bullets = BTreeMap::new();
        fire(&mut grid, &mut bullets, 0, (0, 0), Direction::Right, 0);

        tick_bullets(&mut grid, &mut players, &mut bullets, 0, CFG);
        tick_bullets(&mut grid, &mut players, &mut bullets, 50, CFG);
        assert_eq!(bullets[&0].x, 1);
        tick_bullets(&mut grid, &mut players, &mut bullets, 100, CFG);
        assert_eq!(bullets[&0].x, 2);
        assert_eq!(grid.cell(2, 0).and_then(|c| c.bullet), Some(0));
        assert_eq!(grid.cell(1, 0).and_then(|c| c.bullet), None);
    }

    #[test]
    fn expires_at_lifetime_and_frees_cell() {
        let mut grid = Grid::empty(3, 3).expect("grid");
        let mut players = BTreeMap::new();
        let mut bullets = BTreeMap::new();
        // Facing up from row 0: would leave the grid, so place it where it stays put.
        fire(&mut grid, &mut bullets, 0, (1, 2), Direction::Up, 100);
        if let Some(b) = bullets.get_mut(&0) {
            b.last_move_at = Some(5099);
        }

        tick_bullets(&mut grid, &mut players, &mut bullets, 5099, CFG);
        assert!(bullets.contains_key(&0));
        tick_bullets(&mut grid, &mut players, &mut bullets, 5100, CFG);
        assert!(bullets.is_empty());
        assert!(grid.iter().all(|(_, _, c)| c.bullet.is_none()));
    }

    #[test]
    fn leaving_the_grid_is_silent() {
        let mut grid = Grid::empty(2, 1).expect("grid");
        let mut players = BTreeMap::new();
        let mut bullets = BTreeMap::new();
        fire(&mut grid, &mut bullets, 0, (1, 0), Direction::Right, 0);

        tick_bullets(&mut grid, &mut players, &mut bullets, 10, CFG);
        assert!(bullets.is_empty());
        assert!(grid.is_passable(1, 0));
    }

    #[test]
    fn entering_a_wall_destroys_both() {
        let mut grid = Grid::empty(3, 1).expect("grid");
        grid.set_terrain(1, 0, Terrain::Wall);
        let mut players = BTreeMap::new();
        let mut bullets = BTreeMap::new();
        fire(&mut grid, &mut bullets, 0, (0, 0), Direction::Right, 0);

        tick_bullets(&mut grid, &mut players, &mut bullets, 0, CFG);
        assert!(bullets.is_empty());
        assert!(grid.is_passable(1, 0));
    }

    #[test]
    fn head_on_bullets_annihilate() {
        let mut grid = Grid::empty(5, 1).expect("grid");
        let mut players = BTreeMap::new();
        let mut bullets = BTreeMap::new();
        fire(&mut grid, &mut bullets, 0, (1, 0), Direction::Right, 0);
        fire(&mut grid, &mut bullets, 1, (2, 0), Direction::Left, 0);

        tick_bullets(&mut grid, &mut players, &mut bullets, 0, CFG);
        assert!(bullets.is_empty());
        assert!(grid.iter().all(|(_, _, c)| c.bullet.is_none()));
    }

    #[test]
    fn hitting_a_player_removes_player_and_bullet() {
        let mut grid = Grid::empty(3, 1).expect("grid");
        let mut players = BTreeMap::new();
        players.insert(5, Player::new(5, 2, 0));
        grid.set_player(2, 0, Some(5));
        let mut bullets = BTreeMap::new();
        fire(&mut grid, &mut bullets, 0, (1, 0), Direction::Right, 0);

        tick_bullets(&mut grid, &mut players, &mut bullets, 0, CFG);
        assert!(players.is_empty());
        assert!(bullets.is_empty());
        assert!(grid.is_passable(2, 0));
        assert!(grid.is_passable(1, 0));
    }
}
