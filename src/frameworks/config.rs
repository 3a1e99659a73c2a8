use crate::domain::EngineConfig;
use std::{env, str::FromStr, time::Duration};
use tokio::time::MissedTickBehavior;

// Runtime/server settings read from the environment. Unset or unparseable
// values fall back to defaults.

pub const INPUT_CHANNEL_CAPACITY: usize = 1024;
pub const WORLD_BROADCAST_CAPACITY: usize = 128;

pub const DEFAULT_PORT: u16 = 8080;

pub fn http_port() -> u16 {
    http_port_from(env_lookup)
}

pub fn engine_config() -> EngineConfig {
    engine_config_from(env_lookup)
}

pub fn missed_tick_behavior() -> MissedTickBehavior {
    missed_tick_behavior_from(env_lookup)
}

fn env_lookup(key: &str) -> Option<String> {
    env::var(key).ok()
}

fn parsed<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    lookup(key).and_then(|v| v.trim().parse().ok())
}

fn millis(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<Duration> {
    parsed::<u64>(lookup, key).map(Duration::from_millis)
}

pub(crate) fn http_port_from(lookup: impl Fn(&str) -> Option<String>) -> u16 {
    parsed(&lookup, "GAME_SERVER_PORT").unwrap_or(DEFAULT_PORT)
}

pub(crate) fn engine_config_from(lookup: impl Fn(&str) -> Option<String>) -> EngineConfig {
    let defaults = EngineConfig::default();
    EngineConfig {
        tick_period: millis(&lookup, "TICK_PERIOD_MS").unwrap_or(defaults.tick_period),
        field_width: parsed(&lookup, "FIELD_WIDTH").unwrap_or(defaults.field_width),
        field_height: parsed(&lookup, "FIELD_HEIGHT").unwrap_or(defaults.field_height),
        move_period: millis(&lookup, "MOVE_PERIOD_MS").unwrap_or(defaults.move_period),
        shoot_period: millis(&lookup, "SHOOT_PERIOD_MS").unwrap_or(defaults.shoot_period),
        bullet_lifetime: millis(&lookup, "BULLET_LIFETIME_MS")
            .unwrap_or(defaults.bullet_lifetime),
        wall_probability: parsed(&lookup, "WALL_PROBABILITY")
            .unwrap_or(defaults.wall_probability),
        spawn_attempts: parsed(&lookup, "SPAWN_ATTEMPTS").unwrap_or(defaults.spawn_attempts),
        seed: parsed(&lookup, "WORLD_SEED").or(defaults.seed),
    }
}

// `burst` catches up on missed ticks, `delay` shifts the schedule, `skip`
// (default) drops them and stays on the original grid of instants.
pub(crate) fn missed_tick_behavior_from(
    lookup: impl Fn(&str) -> Option<String>,
) -> MissedTickBehavior {
    match lookup("TICK_DRIFT")
        .map(|v| v.trim().to_ascii_lowercase())
        .as_deref()
    {
        Some("burst") => MissedTickBehavior::Burst,
        Some("delay") => MissedTickBehavior::Delay,
        _ => MissedTickBehavior::Skip,
    }
}
