// Per-tick update passes. Bullets run before players.

pub mod bullets;
pub mod players;
