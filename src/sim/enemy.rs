//! Enemies and the boss
//!
//! Variants differ only by the stat profile looked up from [`ENEMY_TABLE`] at
//! spawn time; steering and damage code is shared. The boss adds a ranged ring
//! attack on a cooldown.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::collision::Aabb;
use super::event::GameEvent;
use super::particle::ParticleKind;
use super::pickup::XpOrb;
use super::projectile::EnemyProjectile;
use super::state::MatchState;
use crate::consts::*;
use crate::{angle_to, direction, turn_toward};

/// Regular enemy variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyKind {
    PaperHands,
    Bear,
    Whale,
}

/// Stat profile for an enemy variant
#[derive(Debug, Clone, Copy)]
pub struct EnemyParams {
    pub base_speed: f32,
    /// Random extra speed in [0, speed_jitter)
    pub speed_jitter: f32,
    pub base_hp: f32,
    pub hp_per_wave: f32,
    pub damage: f32,
    pub xp_value: u32,
    pub score_value: u64,
    pub size: f32,
}

static ENEMY_TABLE: [EnemyParams; 3] = [
    EnemyParams { base_speed: 2.2, speed_jitter: 0.8, base_hp: 12.0, hp_per_wave: 3.0, damage: 4.0, xp_value: 1, score_value: 10, size: 32.0 },      // PaperHands
    EnemyParams { base_speed: 1.2, speed_jitter: 0.4, base_hp: 60.0, hp_per_wave: 15.0, damage: 12.0, xp_value: 5, score_value: 50, size: 40.0 },    // Bear
    EnemyParams { base_speed: 0.8, speed_jitter: 0.3, base_hp: 120.0, hp_per_wave: 25.0, damage: 20.0, xp_value: 10, score_value: 100, size: 52.0 }, // Whale
];

impl EnemyKind {
    pub fn params(self) -> &'static EnemyParams {
        match self {
            EnemyKind::PaperHands => &ENEMY_TABLE[0],
            EnemyKind::Bear => &ENEMY_TABLE[1],
            EnemyKind::Whale => &ENEMY_TABLE[2],
        }
    }
}

/// Shared turn rate for regular enemies (fraction of the angle gap per frame)
pub const ENEMY_TURN_RATE: f32 = 0.06;

/// Boss stat profile
pub const BOSS_SPEED: f32 = 0.8;
pub const BOSS_TURN_RATE: f32 = 0.1;
pub const BOSS_BASE_HP: f32 = 500.0;
pub const BOSS_HP_PER_WAVE: f32 = 100.0;
pub const BOSS_DAMAGE: f32 = 25.0;
pub const BOSS_XP_VALUE: u32 = 50;
pub const BOSS_SCORE_VALUE: u64 = 1000;
pub const BOSS_ATTACK_COOLDOWN_MS: f64 = 2000.0;
pub const BOSS_SIZE: f32 = 72.0;
pub const BOSS_RING_SIZE: u32 = 8;
/// Orbs dropped by a boss and how far they scatter from its center
pub const BOSS_ORB_COUNT: u32 = 5;
pub const BOSS_ORB_SCATTER: f32 = 30.0;

/// Turn toward `target`, then advance along the heading
fn steer(pos: &mut Vec2, heading: &mut f32, target: Vec2, turn_rate: f32, speed: f32, dt: f32) {
    let desired = angle_to(*pos, target);
    *heading = turn_toward(*heading, desired, (turn_rate * dt).min(1.0));
    *pos += direction(*heading) * speed * dt;
}

/// A regular enemy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub id: u32,
    pub kind: EnemyKind,
    pub pos: Vec2,
    pub heading: f32,
    pub turn_rate: f32,
    pub base_speed: f32,
    pub hp: f32,
    pub max_hp: f32,
    pub damage: f32,
    pub xp_value: u32,
    pub score_value: u64,
    pub size: f32,
    /// +1 facing right, -1 facing left
    pub facing: f32,
    pub last_hit_ms: Option<f64>,
    /// Frames of slow remaining
    pub freeze_remaining: f32,
}

impl Enemy {
    /// Build an enemy from its variant profile.
    ///
    /// `speed_roll` in [0, 1) picks a speed inside the variant's jitter range.
    pub fn new(
        id: u32,
        kind: EnemyKind,
        pos: Vec2,
        player_pos: Vec2,
        wave: u32,
        speed_roll: f32,
    ) -> Self {
        let p = kind.params();
        let hp = p.base_hp + wave as f32 * p.hp_per_wave;
        Self {
            id,
            kind,
            pos,
            heading: angle_to(pos, player_pos),
            turn_rate: ENEMY_TURN_RATE,
            base_speed: p.base_speed + speed_roll.clamp(0.0, 1.0) * p.speed_jitter,
            hp,
            max_hp: hp,
            damage: p.damage,
            xp_value: p.xp_value,
            score_value: p.score_value,
            size: p.size,
            facing: 1.0,
            last_hit_ms: None,
            freeze_remaining: 0.0,
        }
    }

    #[inline]
    pub fn is_frozen(&self) -> bool {
        self.freeze_remaining > 0.0
    }

    /// Current movement speed including any freeze slow
    pub fn speed(&self) -> f32 {
        if self.is_frozen() {
            self.base_speed * FREEZE_SLOW_FACTOR
        } else {
            self.base_speed
        }
    }

    /// Freeze for `duration` frames; repeated freezes refresh, never stack
    pub fn freeze(&mut self, duration: f32) {
        self.freeze_remaining = self.freeze_remaining.max(duration);
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::from_center(self.pos, Vec2::splat(self.size))
    }

    /// Seek the player with damped turning
    pub fn update(&mut self, player_pos: Vec2, dt: f32) {
        let speed = self.speed();
        if self.freeze_remaining > 0.0 {
            self.freeze_remaining = (self.freeze_remaining - dt).max(0.0);
        }
        steer(&mut self.pos, &mut self.heading, player_pos, self.turn_rate, speed, dt);

        let horizontal = self.heading.cos();
        if horizontal > 0.0 {
            self.facing = 1.0;
        } else if horizontal < 0.0 {
            self.facing = -1.0;
        }
    }
}

/// The periodic boss
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Boss {
    pub id: u32,
    pub pos: Vec2,
    pub heading: f32,
    pub turn_rate: f32,
    pub base_speed: f32,
    pub hp: f32,
    pub max_hp: f32,
    pub damage: f32,
    pub xp_value: u32,
    pub score_value: u64,
    pub size: f32,
    pub facing: f32,
    pub last_hit_ms: Option<f64>,
    pub attack_cooldown_ms: f64,
    pub last_attack_ms: f64,
    /// Projectiles per special attack
    pub ring_size: u32,
}

impl Boss {
    pub fn new(id: u32, pos: Vec2, player_pos: Vec2, wave: u32, now_ms: f64) -> Self {
        let hp = BOSS_BASE_HP + wave as f32 * BOSS_HP_PER_WAVE;
        Self {
            id,
            pos,
            heading: angle_to(pos, player_pos),
            turn_rate: BOSS_TURN_RATE,
            base_speed: BOSS_SPEED,
            hp,
            max_hp: hp,
            damage: BOSS_DAMAGE,
            xp_value: BOSS_XP_VALUE,
            score_value: BOSS_SCORE_VALUE,
            size: BOSS_SIZE,
            facing: 1.0,
            last_hit_ms: None,
            attack_cooldown_ms: BOSS_ATTACK_COOLDOWN_MS,
            last_attack_ms: now_ms,
            ring_size: BOSS_RING_SIZE,
        }
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::from_center(self.pos, Vec2::splat(self.size))
    }

    /// Move toward the player. Returns true when the special attack is due.
    pub fn update(&mut self, player_pos: Vec2, dt: f32, now_ms: f64) -> bool {
        steer(&mut self.pos, &mut self.heading, player_pos, self.turn_rate, self.base_speed, dt);
        self.facing = if self.heading.cos() > 0.0 { 1.0 } else { -1.0 };

        if now_ms - self.last_attack_ms > self.attack_cooldown_ms {
            self.last_attack_ms = now_ms;
            return true;
        }
        false
    }

    /// Symmetric ring of outward projectiles at half contact damage
    pub fn special_attack(&self) -> Vec<EnemyProjectile> {
        let n = self.ring_size.max(1);
        (0..n)
            .map(|i| {
                let angle = i as f32 / n as f32 * std::f32::consts::TAU;
                let speed = ENEMY_PROJECTILE_SPEED;
                EnemyProjectile::new(self.pos, direction(angle), speed, self.damage / 2.0)
            })
            .collect()
    }
}

/// Per-tick movement for every enemy and boss, plus boss ring attacks
pub fn update_hostiles(state: &mut MatchState, dt: f32) {
    let target = state.player.pos;
    let now = state.clock_ms;

    for enemy in &mut state.enemies {
        enemy.update(target, dt);
    }

    let mut volleys = Vec::new();
    for boss in &mut state.bosses {
        if boss.update(target, dt, now) {
            volleys.extend(boss.special_attack());
        }
    }
    state.enemy_projectiles.extend(volleys);
}

/// Apply damage to the enemy at `index`; on death reward the player and remove it.
///
/// Returns true if the enemy died.
pub fn damage_enemy(state: &mut MatchState, index: usize, amount: f32, from_aura: bool) -> bool {
    let now = state.clock_ms;
    let Some(enemy) = state.enemies.get_mut(index) else {
        return false;
    };
    enemy.hp -= amount;
    enemy.last_hit_ms = Some(now);
    let pos = enemy.pos;
    let dead = enemy.hp <= 0.0;

    if !from_aura {
        let label_pos = pos - Vec2::new(0.0, 20.0);
        state.emit_particles(ParticleKind::DamageNumber, label_pos, 1, Some(amount));
    }
    if !dead {
        return false;
    }

    let enemy = state.enemies.remove(index);
    state.register_kill(enemy.score_value);
    state.emit_particles(ParticleKind::Explosion, pos, 6, None);
    let bob = state.rng.random_range(0.0..std::f32::consts::TAU);
    state.xp_orbs.push(XpOrb::new(pos, enemy.xp_value, bob));
    state.push_event(GameEvent::EnemyKilled { kind: enemy.kind });
    true
}

/// Apply damage to the boss at `index`; on death drop scattered orbs and clear the boss flag.
///
/// Returns true if the boss died.
pub fn damage_boss(state: &mut MatchState, index: usize, amount: f32, from_aura: bool) -> bool {
    let now = state.clock_ms;
    let Some(boss) = state.bosses.get_mut(index) else {
        return false;
    };
    boss.hp -= amount;
    boss.last_hit_ms = Some(now);
    let pos = boss.pos;
    let dead = boss.hp <= 0.0;

    if !from_aura {
        let label_pos = pos - Vec2::new(0.0, 30.0);
        state.emit_particles(ParticleKind::DamageNumber, label_pos, 1, Some(amount));
    }
    if !dead {
        return false;
    }

    let boss = state.bosses.remove(index);
    state.register_kill(boss.score_value);
    state.emit_particles(ParticleKind::Explosion, pos, 20, None);
    for _ in 0..BOSS_ORB_COUNT {
        let offset = Vec2::new(
            state.rng.random_range(-BOSS_ORB_SCATTER..BOSS_ORB_SCATTER),
            state.rng.random_range(-BOSS_ORB_SCATTER..BOSS_ORB_SCATTER),
        );
        let bob = state.rng.random_range(0.0..std::f32::consts::TAU);
        state.xp_orbs.push(XpOrb::new(pos + offset, boss.xp_value, bob));
    }
    state.boss_spawned = false;
    state.push_event(GameEvent::BossDefeated);
    log::info!("Boss defeated at {:.1}s (score {})", state.game_time, state.score);
    true
}
