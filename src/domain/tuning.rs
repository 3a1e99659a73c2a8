use super::errors::ConfigError;
use std::time::Duration;

/// Gameplay tuning for one engine instance.
///
/// Fixed at initialization. Runtime/server settings (ports, channel sizes)
/// live in the frameworks layer.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Period of the fixed-step scheduler.
    pub tick_period: Duration,

    /// Field size in cells.
    pub field_width: usize,
    pub field_height: usize,

    /// Minimum time between two player steps. Bullets step twice as often.
    pub move_period: Duration,

    /// Reload time between two successful shots.
    pub shoot_period: Duration,

    /// Age at which a bullet is despawned.
    pub bullet_lifetime: Duration,

    /// Chance for each cell to start as a wall.
    pub wall_probability: f64,

    /// Random draws tried when spawning a player before a wall is force-cleared.
    pub spawn_attempts: u32,

    /// Seed for terrain and spawn placement; `None` seeds from entropy.
    pub seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tick_period: Duration::from_millis(1000 / 30),
            field_width: 32,
            field_height: 18,
            move_period: Duration::from_millis(200),
            shoot_period: Duration::from_millis(1000),
            bullet_lifetime: Duration::from_millis(5000),
            wall_probability: 0.5,
            spawn_attempts: 15,
            seed: None,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.field_width == 0 || self.field_height == 0 {
            return Err(ConfigError::ZeroDimension {
                width: self.field_width,
                height: self.field_height,
            });
        }
        if self.tick_period.is_zero() {
            return Err(ConfigError::ZeroTickPeriod);
        }
        if self.move_period.is_zero() {
            return Err(ConfigError::ZeroMovePeriod);
        }
        if !(0.0..=1.0).contains(&self.wall_probability) {
            return Err(ConfigError::WallProbability(self.wall_probability));
        }
        if self.spawn_attempts == 0 {
            return Err(ConfigError::ZeroSpawnAttempts);
        }
        Ok(())
    }

    pub(crate) fn move_period_ms(&self) -> u64 {
        millis(self.move_period)
    }

    pub(crate) fn bullet_move_period_ms(&self) -> u64 {
        millis(self.move_period) / 2
    }

    pub(crate) fn shoot_period_ms(&self) -> u64 {
        millis(self.shoot_period)
    }

    pub(crate) fn bullet_lifetime_ms(&self) -> u64 {
        millis(self.bullet_lifetime)
    }
}

fn millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}
