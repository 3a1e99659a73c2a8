// Domain layer: core simulation types and rules.

pub mod engine;
pub mod entities;
pub mod errors;
pub mod grid;
pub mod ports;
pub mod systems;
pub mod tuning;
pub mod view;

pub use engine::Engine;
pub use entities::{Bullet, BulletId, Command, Direction, IdAllocator, Player, PlayerId};
pub use errors::{ConfigError, EngineError};
pub use grid::{Cell, Grid, Terrain};
pub use tuning::EngineConfig;
pub use view::{Occupant, View, ViewCell};
