//! Fixed timestep simulation tick
//!
//! Core game loop that advances the match deterministically.

use glam::Vec2;

use super::state::{MatchState, Phase};
use super::{collision, enemy, pickup, player, projectile, schedule, spawn};
use crate::consts::*;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Movement intent; vectors longer than 1 are normalized
    pub movement: Vec2,
    /// Leave the ready screen
    pub start: bool,
    /// Pause toggle
    pub pause: bool,
    /// Upgrade chosen from the open offers
    pub upgrade_choice: Option<usize>,
}

/// Advance the match by `dt` frames (1.0 = one 60 Hz frame)
pub fn tick(state: &mut MatchState, input: &TickInput, dt: f32) {
    if input.start && state.phase == Phase::Ready {
        state.start();
    }

    // Handle pause toggle
    if input.pause {
        match state.phase {
            Phase::Playing => {
                state.phase = Phase::Paused;
                return;
            }
            Phase::Paused => state.phase = Phase::Playing,
            _ => {}
        }
    }

    if state.phase == Phase::LevelUp {
        if let Some(choice) = input.upgrade_choice {
            state.commit_upgrade(choice);
        }
    }

    // Only active play advances the world
    if state.phase != Phase::Playing {
        return;
    }

    // Large deltas (background tab, debugger) are clamped, never skipped through
    let dt = if dt.is_finite() {
        dt.clamp(0.0, state.tuning.max_frame_dt)
    } else {
        0.0
    };
    let elapsed = dt / FRAMES_PER_SECOND;

    state.clock_ms += dt as f64 * 1000.0 / FRAMES_PER_SECOND as f64;
    state.game_time += elapsed;
    state.spawn_timer += elapsed;
    state.health_pack_timer += elapsed;
    state.combo_timer += elapsed;

    state.decay_combo();

    let wave = spawn::wave_for(state.game_time);
    if wave != state.wave {
        log::info!("Wave {} at {:.1}s", wave, state.game_time);
        state.wave = wave;
    }

    schedule::run_due(state);
    spawn::update(state, elapsed);

    player::update(state, input.movement, dt);
    projectile::update_projectiles(state, dt);
    enemy::update_hostiles(state, dt);
    projectile::update_enemy_projectiles(state, dt);
    pickup::update_pickups(state, dt);
    state.particles.retain_mut(|p| {
        p.update(dt);
        p.is_alive()
    });

    collision::resolve(state);
    projectile::prune_out_of_bounds(state);

    log::trace!(
        "t={:.3}s enemies={} bosses={} shots={} orbs={} particles={}",
        state.game_time,
        state.enemies.len(),
        state.bosses.len(),
        state.projectiles.len(),
        state.xp_orbs.len(),
        state.particles.len()
    );
}
