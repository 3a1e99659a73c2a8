// Authoritative simulation: owns the grid and the entity arenas and advances
// them one tick at a time. Time is passed in explicitly as milliseconds.

use super::entities::{Bullet, BulletId, Command, IdAllocator, Player, PlayerId};
use super::errors::{ConfigError, EngineError};
use super::grid::{Grid, Terrain};
use super::systems::bullets::{self, BulletConfig};
use super::systems::players;
use super::tuning::EngineConfig;
use super::view::{self, View};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

pub struct Engine {
    config: EngineConfig,
    grid: Grid,
    players: BTreeMap<PlayerId, Player>,
    bullets: BTreeMap<BulletId, Bullet>,
    player_ids: IdAllocator,
    bullet_ids: IdAllocator,
    rng: ChaCha8Rng,
}

impl Engine {
    /// Validates the config and rolls a fresh random field.
    pub fn new(config: EngineConfig, mut rng: ChaCha8Rng) -> Result<Self, ConfigError> {
        config.validate()?;
        let grid = Grid::initialize(
            config.field_width,
            config.field_height,
            config.wall_probability,
            &mut rng,
        )?;
        Ok(Self::assemble(config, grid, rng))
    }

    /// Seeds the RNG from `config.seed`, or from entropy when unset.
    pub fn from_config(config: EngineConfig) -> Result<Self, ConfigError> {
        let rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        Self::new(config, rng)
    }

    /// Uses a caller-built grid; its dimensions override the configured ones.
    pub fn with_grid(mut config: EngineConfig, grid: Grid) -> Result<Self, ConfigError> {
        config.field_width = grid.width();
        config.field_height = grid.height();
        config.validate()?;
        let rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        Ok(Self::assemble(config, grid, rng))
    }

    /// Replaces the id allocators, e.g. to make ids predictable in tests.
    pub fn with_ids(mut self, player_ids: IdAllocator, bullet_ids: IdAllocator) -> Self {
        self.player_ids = player_ids;
        self.bullet_ids = bullet_ids;
        self
    }

    fn assemble(config: EngineConfig, grid: Grid, rng: ChaCha8Rng) -> Self {
        Self {
            config,
            grid,
            players: BTreeMap::new(),
            bullets: BTreeMap::new(),
            player_ids: IdAllocator::starting_at(1),
            bullet_ids: IdAllocator::starting_at(0),
            rng,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn players(&self) -> &BTreeMap<PlayerId, Player> {
        &self.players
    }

    pub fn bullets(&self) -> &BTreeMap<BulletId, Bullet> {
        &self.bullets
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(&id)
    }

    pub fn bullet(&self, id: BulletId) -> Option<&Bullet> {
        self.bullets.get(&id)
    }

    /// Spawns a player on a random free cell.
    pub fn add_player(&mut self) -> Result<PlayerId, EngineError> {
        let (x, y) = self.find_spawn_cell()?;
        let id = self.player_ids.next_id();
        self.insert_player(id, x, y);
        info!(player_id = id, x, y, "player joined");
        Ok(id)
    }

    /// Spawns a player on a given cell. `None` if the cell is not passable.
    pub fn spawn_player_at(&mut self, x: usize, y: usize) -> Option<PlayerId> {
        if !self.grid.is_passable(x, y) {
            return None;
        }
        let id = self.player_ids.next_id();
        self.insert_player(id, x, y);
        Some(id)
    }

    fn insert_player(&mut self, id: PlayerId, x: usize, y: usize) {
        self.players.insert(id, Player::new(id, x, y));
        self.grid.set_player(x, y, Some(id));
    }

    /// Returns false if the player was already gone. Its bullets keep flying.
    pub fn remove_player(&mut self, id: PlayerId) -> bool {
        let removed = players::despawn_player(&mut self.grid, &mut self.players, id).is_some();
        if removed {
            info!(player_id = id, "player left");
        }
        removed
    }

    // Bounded random search; after `spawn_attempts` misses, a wall with nobody
    // on it is cleared instead. A full scan backs that up so this terminates.
    fn find_spawn_cell(&mut self) -> Result<(usize, usize), EngineError> {
        let (width, height) = (self.grid.width(), self.grid.height());

        for _ in 0..self.config.spawn_attempts {
            let (x, y) = (self.rng.gen_range(0..width), self.rng.gen_range(0..height));
            if self.grid.is_passable(x, y) {
                return Ok((x, y));
            }
        }

        for _ in 0..self.config.spawn_attempts {
            let (x, y) = (self.rng.gen_range(0..width), self.rng.gen_range(0..height));
            if self.grid.cell(x, y).is_some_and(|c| !c.has_entity()) {
                self.force_clear(x, y);
                return Ok((x, y));
            }
        }

        let free = self
            .grid
            .iter()
            .find(|(_, _, cell)| !cell.has_entity())
            .map(|(x, y, _)| (x, y));
        match free {
            Some((x, y)) => {
                self.force_clear(x, y);
                Ok((x, y))
            }
            None => Err(EngineError::GridFull),
        }
    }

    fn force_clear(&mut self, x: usize, y: usize) {
        if self.grid.cell(x, y).is_some_and(|c| c.terrain == Terrain::Wall) {
            warn!(x, y, "no free spawn cell found; clearing wall");
            self.grid.set_terrain(x, y, Terrain::Empty);
        }
    }

    /// Applies a client intent. Unknown players are ignored.
    pub fn handle_command(&mut self, player_id: PlayerId, command: Command, now: u64) {
        if !self.players.contains_key(&player_id) {
            debug!(player_id, ?command, "command for unknown player ignored");
            return;
        }

        match command {
            // Only facing changes here; the tick performs the step.
            Command::Move(direction) => {
                if let Some(player) = self.players.get_mut(&player_id) {
                    player.direction = direction;
                }
            }
            Command::Shoot => self.shoot(player_id, now),
        }
    }

    fn shoot(&mut self, player_id: PlayerId, now: u64) {
        let shoot_period_ms = self.config.shoot_period_ms();
        let Some(player) = self.players.get_mut(&player_id) else {
            return;
        };
        if player
            .last_shot_at
            .is_some_and(|last| now.saturating_sub(last) < shoot_period_ms)
        {
            return;
        }

        // Failed spawns leave the reload untouched.
        let Some((x, y)) = player
            .direction
            .step(player.x, player.y)
            .filter(|&(x, y)| self.grid.in_bounds(x, y))
        else {
            return;
        };
        if self.grid.cell(x, y).is_some_and(|c| c.bullet.is_some()) {
            return;
        }

        let id = self.bullet_ids.next_id();
        self.bullets.insert(
            id,
            Bullet {
                id,
                owner_id: player_id,
                x,
                y,
                direction: player.direction,
                created_at: now,
                last_move_at: None,
            },
        );
        self.grid.set_bullet(x, y, Some(id));
        player.last_shot_at = Some(now);
        debug!(player_id, bullet_id = id, x, y, "bullet spawned");
    }

    /// One simulation step: the bullet pass, then the player pass.
    pub fn tick(&mut self, now: u64) {
        if !self.bullets.is_empty() {
            bullets::tick_bullets(
                &mut self.grid,
                &mut self.players,
                &mut self.bullets,
                now,
                BulletConfig {
                    lifetime_ms: self.config.bullet_lifetime_ms(),
                    move_period_ms: self.config.bullet_move_period_ms(),
                },
            );
        }
        if !self.players.is_empty() {
            players::tick_players(
                &mut self.grid,
                &mut self.players,
                now,
                self.config.move_period_ms(),
            );
        }
    }

    pub fn project(&self) -> View {
        view::project(&self.grid, &self.players, &self.bullets)
    }
}
