//! FUD Arena - simulation core of a top-down survival arena game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (entities, spawning, collisions, progression)
//! - `host`: Contract with the presentation layer (render, audio, input, modals)
//! - `tuning`: Data-driven game balance

pub mod host;
pub mod sim;
pub mod tuning;

pub use host::{EntityView, Host, run_frame};
pub use tuning::Tuning;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Simulation frames per second; `dt == 1.0` is one frame at this rate
    pub const FRAMES_PER_SECOND: f32 = 60.0;
    /// Largest frame-scale delta a single tick will accept
    pub const DEFAULT_MAX_FRAME_DT: f32 = 6.0;

    /// Arena dimensions (screen space, origin top-left)
    pub const ARENA_WIDTH: f32 = 1280.0;
    pub const ARENA_HEIGHT: f32 = 720.0;

    /// Player
    pub const PLAYER_SIZE: f32 = 48.0;
    /// Invulnerability window after an accepted hit
    pub const IFRAME_MS: f64 = 300.0;
    /// Quiet period before the shield starts regenerating
    pub const SHIELD_REGEN_DELAY_MS: f64 = 2000.0;
    /// Total angular spread per shot (radians), centered on the aim angle
    pub const SHOT_SPREAD: f32 = 0.4;

    /// Player projectiles
    pub const PROJECTILE_SIZE: f32 = 10.0;
    pub const CRIT_PROJECTILE_SIZE: f32 = 15.0;
    /// Frames before a homing shot starts steering
    pub const HOMING_DELAY_FRAMES: f32 = 10.0;
    pub const HOMING_TURN_RATE: f32 = 0.1;
    pub const EXPLOSION_RADIUS: f32 = 80.0;
    pub const EXPLOSION_DAMAGE_FACTOR: f32 = 0.6;
    /// Projectiles are pruned once this far outside the arena
    pub const OUT_OF_BOUNDS_MARGIN: f32 = 50.0;

    /// Enemy projectiles (boss ring)
    pub const ENEMY_PROJECTILE_SIZE: f32 = 10.0;
    pub const ENEMY_PROJECTILE_SPEED: f32 = 3.0;

    /// Freeze shots
    pub const FREEZE_FRAMES: f32 = 180.0;
    pub const FREEZE_SLOW_FACTOR: f32 = 0.3;

    /// Combo
    pub const COMBO_MAX: u32 = 50;
    pub const COMBO_DECAY_SECS: f32 = 5.0;
    pub const COMBO_MASTER_DECAY_SECS: f32 = 8.0;
    pub const COMBO_MASTER_XP_BONUS: f32 = 1.25;
    pub const COMBO_MILESTONE: u32 = 5;

    /// Pacing
    pub const WAVE_SECS: f32 = 45.0;
    pub const BOSS_INTERVAL_SECS: f32 = 180.0;
    pub const BOSS_WARNING_MS: f64 = 3000.0;
    pub const BOSS_SPAWN_DELAY_MS: f64 = 2000.0;
    pub const ENEMY_SPAWN_MARGIN: f32 = 60.0;
    pub const BOSS_SPAWN_MARGIN: f32 = 100.0;

    /// Pickups
    pub const XP_ORB_BASE_SIZE: f32 = 16.0;
    pub const XP_ORB_SPEED: f32 = 5.0;
    pub const HEALTH_PACK_SIZE: f32 = 28.0;
    pub const HEALTH_PACK_HEAL_FRACTION: f32 = 0.25;
    pub const HEALTH_PACK_LOW_HP_FRACTION: f32 = 0.7;
    pub const MAX_HEALTH_PACKS: usize = 4;

    /// Progression
    pub const LEVEL_THRESHOLD_GROWTH: f64 = 1.4;

    /// Particle cap
    pub const MAX_PARTICLES: usize = 512;
}

/// Wrap an angle into (-π, π]
#[inline]
pub fn wrap_angle(mut angle: f32) -> f32 {
    use std::f32::consts::{PI, TAU};
    if !angle.is_finite() {
        return 0.0;
    }
    while angle > PI {
        angle -= TAU;
    }
    while angle <= -PI {
        angle += TAU;
    }
    angle
}

/// Angle of the vector pointing from `from` to `to`
#[inline]
pub fn angle_to(from: Vec2, to: Vec2) -> f32 {
    (to.y - from.y).atan2(to.x - from.x)
}

/// Euclidean distance between two points
#[inline]
pub fn distance(a: Vec2, b: Vec2) -> f32 {
    a.distance(b)
}

/// Unit vector for an angle
#[inline]
pub fn direction(angle: f32) -> Vec2 {
    Vec2::new(angle.cos(), angle.sin())
}

/// Move `current` toward `target` by a fraction of the shortest angular delta.
///
/// `factor` is usually `turn_rate * dt`; values in (0, 1] never overshoot.
#[inline]
pub fn turn_toward(current: f32, target: f32, factor: f32) -> f32 {
    let delta = wrap_angle(target - current);
    wrap_angle(current + delta * factor)
}
