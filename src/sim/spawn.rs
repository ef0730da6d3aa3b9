//! Spawn director: enemy batches, the periodic boss and health packs
//!
//! Pacing is driven entirely by match time. Enemies arrive in batches from
//! just outside a random arena edge, the boss is announced on every 180 s
//! boundary and materialises after a short warning.

use glam::Vec2;
use rand::Rng;

use super::enemy::{Boss, Enemy, EnemyKind};
use super::event::{GameEvent, SoundEffect};
use super::pickup::HealthPack;
use super::schedule::ScheduledAction;
use super::state::MatchState;
use crate::consts::*;

/// Earliest match time at which Bears can appear (seconds)
pub const BEAR_UNLOCK_SECS: f32 = 120.0;
pub const BEAR_CHANCE: f32 = 0.25;
/// Earliest match time at which Whales can appear (seconds)
pub const WHALE_UNLOCK_SECS: f32 = 240.0;
pub const WHALE_CHANCE: f32 = 0.15;

/// Health pack placement padding
const PACK_SIDE_PADDING: f32 = 60.0;
const PACK_TOP_PADDING: f32 = 120.0;

/// Seconds between enemy batches at match time `game_time`
pub fn spawn_interval(game_time: f32) -> f32 {
    (3.5 - game_time / 90.0).max(0.6)
}

/// Enemies per batch on `wave`
pub fn enemies_per_batch(wave: u32) -> u32 {
    (2.0 + wave as f32 * 1.3).floor() as u32
}

/// Difficulty tier for a match time
pub fn wave_for(game_time: f32) -> u32 {
    (game_time.max(0.0) / WAVE_SECS).floor() as u32 + 1
}

/// True when `game_time` has just crossed a boss boundary
pub fn boss_boundary_crossed(game_time: f32, elapsed_secs: f32) -> bool {
    game_time > 0.0
        && (game_time / BOSS_INTERVAL_SECS).floor()
            > ((game_time - elapsed_secs) / BOSS_INTERVAL_SECS).floor()
}

/// Variant for a new enemy. The Whale roll is independent and wins over Bear.
pub fn roll_kind<R: Rng>(game_time: f32, rng: &mut R) -> EnemyKind {
    let mut kind = EnemyKind::PaperHands;
    if game_time > BEAR_UNLOCK_SECS && rng.random::<f32>() < BEAR_CHANCE {
        kind = EnemyKind::Bear;
    }
    if game_time > WHALE_UNLOCK_SECS && rng.random::<f32>() < WHALE_CHANCE {
        kind = EnemyKind::Whale;
    }
    kind
}

/// Point `margin` outside edge `edge` (0 top, 1 right, 2 bottom, 3 left).
///
/// `along` in [0, 1] places the point along that edge.
pub fn edge_point(edge: u32, along: f32, arena: Vec2, margin: f32) -> Vec2 {
    match edge % 4 {
        0 => Vec2::new(along * arena.x, -margin),
        1 => Vec2::new(arena.x + margin, along * arena.y),
        2 => Vec2::new(along * arena.x, arena.y + margin),
        _ => Vec2::new(-margin, along * arena.y),
    }
}

/// Run the director for this tick; timers must already include `elapsed_secs`
pub fn update(state: &mut MatchState, elapsed_secs: f32) {
    if state.spawn_timer > spawn_interval(state.game_time) {
        spawn_enemies(state);
        state.spawn_timer = 0.0;
    }

    if !state.boss_spawned
        && state.bosses.is_empty()
        && boss_boundary_crossed(state.game_time, elapsed_secs)
    {
        trigger_boss(state);
    }

    update_health_packs(state);
}

/// Spawn one batch sized by the current wave
pub fn spawn_enemies(state: &mut MatchState) {
    let count = enemies_per_batch(state.wave);
    let arena = state.arena_size();
    for _ in 0..count {
        let edge = state.rng.random_range(0..4);
        let along = state.rng.random::<f32>();
        let pos = edge_point(edge, along, arena, ENEMY_SPAWN_MARGIN);
        let kind = roll_kind(state.game_time, &mut state.rng);
        let speed_roll = state.rng.random::<f32>();
        let id = state.next_entity_id();
        let enemy = Enemy::new(id, kind, pos, state.player.pos, state.wave, speed_roll);
        state.enemies.push(enemy);
    }
    log::debug!(
        "Spawned {} enemies at {:.1}s (wave {}, {} alive)",
        count,
        state.game_time,
        state.wave,
        state.enemies.len()
    );
}

/// Announce the boss and schedule its arrival
pub fn trigger_boss(state: &mut MatchState) {
    state.boss_spawned = true;
    state.boss_warning = true;
    state.push_event(GameEvent::Sound(SoundEffect::BossWarning));
    state.push_event(GameEvent::BossWarning);
    state.schedule(ScheduledAction::EndBossWarning, BOSS_WARNING_MS);
    state.schedule(ScheduledAction::SpawnBoss, BOSS_SPAWN_DELAY_MS);
    log::info!("Boss incoming at {:.1}s", state.game_time);
}

/// Place the boss just outside the midpoint of a random edge
pub fn spawn_boss(state: &mut MatchState) {
    let edge = state.rng.random_range(0..4);
    let pos = edge_point(edge, 0.5, state.arena_size(), BOSS_SPAWN_MARGIN);
    let id = state.next_entity_id();
    let boss = Boss::new(id, pos, state.player.pos, state.wave, state.clock_ms);
    log::info!("Boss spawned with {} hp (wave {})", boss.max_hp, state.wave);
    state.bosses.push(boss);
    state.push_event(GameEvent::BossSpawned);
}

fn update_health_packs(state: &mut MatchState) {
    let hp = state.player.hp(&state.stats);
    let need_healing = hp < state.stats.max_hp * HEALTH_PACK_LOW_HP_FRACTION;
    let first_time = !state.first_health_pack_spawned && need_healing;
    let regular =
        state.first_health_pack_spawned && state.health_pack_timer > state.next_health_pack_at;

    if first_time || regular {
        spawn_health_pack(state);
        state.health_pack_timer = 0.0;
        state.next_health_pack_at = state.rng.random_range(25.0..40.0);
        if first_time {
            state.first_health_pack_spawned = true;
        }
    }
}

/// Drop a health pack somewhere inside the padded arena, unless the cap is reached
pub fn spawn_health_pack(state: &mut MatchState) {
    if state.health_packs.len() >= MAX_HEALTH_PACKS {
        return;
    }
    let arena = state.arena_size();
    let x = PACK_SIDE_PADDING + state.rng.random::<f32>() * (arena.x - PACK_SIDE_PADDING * 2.0);
    let y = PACK_TOP_PADDING
        + state.rng.random::<f32>() * (arena.y - PACK_TOP_PADDING - PACK_SIDE_PADDING);
    let pack = HealthPack::new(Vec2::new(x, y), state.stats.max_hp);
    log::debug!("Health pack at ({:.0}, {:.0}) heals {}", x, y, pack.heal_amount);
    state.health_packs.push(pack);
}
