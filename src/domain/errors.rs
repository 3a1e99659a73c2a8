// Domain-level errors. Player-triggered invalid actions are silent no-ops and
// never show up here.

use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    ZeroDimension { width: usize, height: usize },
    ZeroTickPeriod,
    ZeroMovePeriod,
    WallProbability(f64),
    ZeroSpawnAttempts,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ZeroDimension { width, height } => {
                write!(f, "field dimensions must be positive (got {width}x{height})")
            }
            ConfigError::ZeroTickPeriod => write!(f, "tick period must be positive"),
            ConfigError::ZeroMovePeriod => write!(f, "move period must be positive"),
            ConfigError::WallProbability(p) => {
                write!(f, "wall probability must be within [0, 1] (got {p})")
            }
            ConfigError::ZeroSpawnAttempts => write!(f, "spawn attempts must be positive"),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    // Every cell already hosts a player or a bullet.
    GridFull,
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::GridFull => write!(f, "no free cell left to spawn a player"),
        }
    }
}

impl std::error::Error for EngineError {}
