//! Player entity and its per-tick behavior
//!
//! All tunables live in [`PlayerStats`], which the match owns. The [`Player`]
//! itself only tracks pose and the timestamps used for firing and i-frames.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::collision::Aabb;
use super::enemy;
use super::event::{GameEvent, SoundEffect};
use super::particle::ParticleKind;
use super::projectile::{Projectile, TargetId};
use super::state::MatchState;
use crate::consts::*;
use crate::{angle_to, direction, distance};

/// Periodic damage field around the player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DamageAura {
    pub active: bool,
    pub damage: f32,
    pub range: f32,
    pub cooldown_ms: f64,
    pub last_tick_ms: f64,
}

impl Default for DamageAura {
    fn default() -> Self {
        Self {
            active: false,
            damage: 0.0,
            range: 0.0,
            cooldown_ms: 800.0,
            last_tick_ms: 0.0,
        }
    }
}

/// Regenerating damage buffer consumed before hp
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shield {
    pub active: bool,
    pub hp: f32,
    pub max_hp: f32,
    /// Shield points per second once regeneration kicks in
    pub regen_rate: f32,
    pub last_regen_ms: f64,
}

impl Default for Shield {
    fn default() -> Self {
        Self {
            active: false,
            hp: 0.0,
            max_hp: 0.0,
            regen_rate: 5.0,
            last_regen_ms: 0.0,
        }
    }
}

/// Every tunable the player reads, mutated by upgrades
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerStats {
    /// Movement speed (px/frame)
    pub speed: f32,
    pub max_hp: f32,
    pub hp: f32,
    pub level: u32,
    pub xp: u32,
    pub xp_to_next_level: u32,
    pub attack_cooldown_ms: f64,
    /// Projectile speed (px/frame)
    pub projectile_speed: f32,
    pub projectile_damage: f32,
    pub projectile_count: u32,
    pub magnet_range: f32,
    pub crit_chance: f32,
    pub crit_multiplier: f32,
    /// Extra enemies each projectile may pass through
    pub piercing: u32,
    pub homing_shots: bool,
    pub explosive_shots: bool,
    pub freeze_shots: bool,
    pub combo_master: bool,
    pub damage_aura: DamageAura,
    pub shield: Shield,
}

impl Default for PlayerStats {
    fn default() -> Self {
        Self {
            speed: 3.0,
            max_hp: 100.0,
            hp: 100.0,
            level: 1,
            xp: 0,
            xp_to_next_level: 15,
            attack_cooldown_ms: 600.0,
            projectile_speed: 6.0,
            projectile_damage: 15.0,
            projectile_count: 1,
            magnet_range: 120.0,
            crit_chance: 0.05,
            crit_multiplier: 2.0,
            piercing: 0,
            homing_shots: false,
            explosive_shots: false,
            freeze_shots: false,
            combo_master: false,
            damage_aura: DamageAura::default(),
            shield: Shield::default(),
        }
    }
}

impl PlayerStats {
    /// Force hp and shield back into their valid ranges
    pub fn clamp(&mut self) {
        self.max_hp = self.max_hp.max(1.0);
        self.hp = self.hp.clamp(0.0, self.max_hp);
        self.shield.max_hp = self.shield.max_hp.max(0.0);
        self.shield.hp = self.shield.hp.clamp(0.0, self.shield.max_hp);
        self.crit_chance = self.crit_chance.clamp(0.0, 1.0);
        self.projectile_count = self.projectile_count.max(1);
        self.xp_to_next_level = self.xp_to_next_level.max(1);
    }
}

/// What an accepted hit did
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DamageReport {
    /// Amount soaked by the shield
    pub absorbed: f32,
    /// Amount taken off hp
    pub to_hp: f32,
    pub shield_broken: bool,
    pub died: bool,
}

/// The player's avatar
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec2,
    /// +1 facing right, -1 facing left
    pub facing: f32,
    pub size: f32,
    pub last_attack_ms: Option<f64>,
    pub last_hit_ms: Option<f64>,
}

impl Player {
    pub fn new(pos: Vec2) -> Self {
        Self {
            pos,
            facing: 1.0,
            size: PLAYER_SIZE,
            last_attack_ms: None,
            last_hit_ms: None,
        }
    }

    /// Current hp (the stats record is the single source of truth)
    #[inline]
    pub fn hp(&self, stats: &PlayerStats) -> f32 {
        stats.hp
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::from_center(self.pos, Vec2::splat(self.size))
    }

    /// Whether a hit at `now_ms` falls inside the post-hit invulnerability window
    pub fn in_iframes(&self, now_ms: f64) -> bool {
        self.last_hit_ms
            .is_some_and(|last| now_ms - last <= IFRAME_MS)
    }

    /// Apply incoming damage: shield first, remainder to hp.
    ///
    /// Returns `None` when the hit is ignored (i-frames or a non-positive amount).
    pub fn apply_damage(
        &mut self,
        stats: &mut PlayerStats,
        amount: f32,
        now_ms: f64,
    ) -> Option<DamageReport> {
        if !amount.is_finite() || amount <= 0.0 || self.in_iframes(now_ms) {
            return None;
        }

        let mut remaining = amount;
        let mut absorbed = 0.0;
        let mut shield_broken = false;
        if stats.shield.active && stats.shield.hp > 0.0 {
            absorbed = remaining.min(stats.shield.hp);
            stats.shield.hp = (stats.shield.hp - absorbed).max(0.0);
            remaining -= absorbed;
            stats.shield.last_regen_ms = now_ms;
            shield_broken = stats.shield.hp <= 0.0;
        }

        let before = stats.hp;
        if remaining > 0.0 {
            stats.hp = (stats.hp - remaining).max(0.0);
        }
        let to_hp = before - stats.hp;

        self.last_hit_ms = Some(now_ms);

        Some(DamageReport {
            absorbed,
            to_hp,
            shield_broken,
            died: to_hp > 0.0 && stats.hp <= 0.0,
        })
    }
}

/// Per-tick player behavior: movement, shield regen, auto-fire, damage aura
pub fn update(state: &mut MatchState, intent: Vec2, dt: f32) {
    let now = state.clock_ms;

    // Movement
    let mut dir = if intent.is_finite() { intent } else { Vec2::ZERO };
    if dir.length_squared() > 1.0 {
        dir = dir.normalize();
    }
    if dir != Vec2::ZERO {
        state.player.pos += dir * state.stats.speed * dt;
        if state.rng.random::<f32>() < 0.3 {
            let feet = state.player.pos + Vec2::new(0.0, state.player.size / 2.0);
            state.emit_particles(ParticleKind::Dust, feet, 1, None);
        }
    }
    if dir.x > 0.1 {
        state.player.facing = 1.0;
    } else if dir.x < -0.1 {
        state.player.facing = -1.0;
    }

    // Arena bounds
    let half = state.player.size / 2.0;
    let arena = state.arena_size();
    state.player.pos.x = state.player.pos.x.min(arena.x - half).max(half);
    state.player.pos.y = state.player.pos.y.min(arena.y - half).max(half);

    // Shield regeneration after a quiet period
    let shield = &mut state.stats.shield;
    if shield.active
        && shield.hp < shield.max_hp
        && now - shield.last_regen_ms > SHIELD_REGEN_DELAY_MS
    {
        shield.hp = (shield.hp + shield.regen_rate * dt / FRAMES_PER_SECOND).min(shield.max_hp);
    }

    // Auto-fire
    let ready = state
        .player
        .last_attack_ms
        .is_none_or(|last| now - last > state.stats.attack_cooldown_ms);
    if ready {
        shoot(state);
        state.player.last_attack_ms = Some(now);
    }

    // Damage aura
    let aura = &state.stats.damage_aura;
    if aura.active && now - aura.last_tick_ms > aura.cooldown_ms {
        aura_tick(state);
        state.stats.damage_aura.last_tick_ms = now;
    }
}

/// Damage every hostile inside the aura
fn aura_tick(state: &mut MatchState) {
    let center = state.player.pos;
    let damage = state.stats.damage_aura.damage;
    let range = state.stats.damage_aura.range;

    for i in (0..state.enemies.len()).rev() {
        let Some(e) = state.enemies.get(i) else { continue };
        if distance(center, e.pos) < range + e.size / 2.0 {
            enemy::damage_enemy(state, i, damage, true);
        }
    }
    for i in (0..state.bosses.len()).rev() {
        let Some(b) = state.bosses.get(i) else { continue };
        if distance(center, b.pos) < range + b.size / 2.0 {
            enemy::damage_boss(state, i, damage, true);
        }
    }
}

/// Nearest enemy or boss to `from` by Euclidean distance
pub fn find_nearest_hostile(state: &MatchState, from: Vec2) -> Option<(TargetId, Vec2)> {
    let mut nearest = None;
    let mut nearest_dist = f32::INFINITY;

    for e in &state.enemies {
        let d = distance(from, e.pos);
        if d < nearest_dist {
            nearest_dist = d;
            nearest = Some((TargetId::Enemy(e.id), e.pos));
        }
    }
    for b in &state.bosses {
        let d = distance(from, b.pos);
        if d < nearest_dist {
            nearest_dist = d;
            nearest = Some((TargetId::Boss(b.id), b.pos));
        }
    }
    nearest
}

/// Fire a volley at the nearest hostile; silently does nothing without a target
pub fn shoot(state: &mut MatchState) {
    let origin = state.player.pos;
    let Some((target, target_pos)) = find_nearest_hostile(state, origin) else {
        return;
    };

    state.push_event(GameEvent::Sound(SoundEffect::Shot));

    let aim = angle_to(origin, target_pos);
    let half_spread = SHOT_SPREAD / 2.0;
    let homing = state.stats.homing_shots.then_some(target);

    for _ in 0..state.stats.projectile_count {
        let spread = state.rng.random_range(-half_spread..half_spread);
        let is_crit = state.rng.random::<f32>() < state.stats.crit_chance;
        let damage = if is_crit {
            state.stats.projectile_damage * state.stats.crit_multiplier
        } else {
            state.stats.projectile_damage
        };
        let id = state.next_entity_id();
        state.projectiles.push(Projectile::new(
            id,
            origin,
            direction(aim + spread),
            state.stats.projectile_speed,
            damage,
            is_crit,
            state.stats.piercing,
            homing,
        ));
    }
}
