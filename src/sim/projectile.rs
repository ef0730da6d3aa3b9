//! Player projectiles and boss projectiles

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::collision::Aabb;
use super::particle::ParticleKind;
use super::state::MatchState;
use crate::consts::*;
use crate::{angle_to, direction, turn_toward};

/// Non-owning reference to a hostile, re-resolved by id every tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TargetId {
    Enemy(u32),
    Boss(u32),
}

/// A player-owned projectile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub id: u32,
    pub pos: Vec2,
    /// Unit direction
    pub dir: Vec2,
    pub speed: f32,
    pub damage: f32,
    pub is_crit: bool,
    /// Extra hits allowed before the projectile is consumed
    pub pierce_remaining: u32,
    /// Homing target chosen at spawn; never re-acquired
    pub target: Option<TargetId>,
    /// Frames alive
    pub lifetime: f32,
    /// Hostiles already damaged by this projectile
    #[serde(default)]
    pub hit_ids: Vec<TargetId>,
}

impl Projectile {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: u32,
        pos: Vec2,
        dir: Vec2,
        speed: f32,
        damage: f32,
        is_crit: bool,
        pierce: u32,
        target: Option<TargetId>,
    ) -> Self {
        Self {
            id,
            pos,
            dir: dir.normalize_or(Vec2::X),
            speed,
            damage,
            is_crit,
            pierce_remaining: pierce,
            target,
            lifetime: 0.0,
            hit_ids: Vec::new(),
        }
    }

    pub fn size(&self) -> f32 {
        if self.is_crit {
            CRIT_PROJECTILE_SIZE
        } else {
            PROJECTILE_SIZE
        }
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::from_center(self.pos, Vec2::splat(self.size()))
    }

    /// Advance one step. `target_pos` is the resolved homing target, if it still exists.
    pub fn update(&mut self, target_pos: Option<Vec2>, dt: f32) {
        self.lifetime += dt;

        if let Some(target_pos) = target_pos {
            if self.lifetime > HOMING_DELAY_FRAMES {
                let current = self.dir.y.atan2(self.dir.x);
                let desired = angle_to(self.pos, target_pos);
                self.dir = direction(turn_toward(current, desired, HOMING_TURN_RATE));
            }
        }

        self.pos += self.dir * self.speed * dt;
    }

    pub fn already_hit(&self, target: TargetId) -> bool {
        self.hit_ids.contains(&target)
    }
}

/// A projectile fired by the boss
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnemyProjectile {
    pub pos: Vec2,
    pub dir: Vec2,
    pub speed: f32,
    pub damage: f32,
}

impl EnemyProjectile {
    pub fn new(pos: Vec2, dir: Vec2, speed: f32, damage: f32) -> Self {
        Self {
            pos,
            dir: dir.normalize_or(Vec2::X),
            speed,
            damage,
        }
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::from_center(self.pos, Vec2::splat(ENEMY_PROJECTILE_SIZE))
    }

    pub fn update(&mut self, dt: f32) {
        self.pos += self.dir * self.speed * dt;
    }
}

/// True once `pos` is more than the pruning margin outside the arena
pub fn is_out_of_bounds(pos: Vec2, arena: Vec2) -> bool {
    pos.x < -OUT_OF_BOUNDS_MARGIN
        || pos.x > arena.x + OUT_OF_BOUNDS_MARGIN
        || pos.y < -OUT_OF_BOUNDS_MARGIN
        || pos.y > arena.y + OUT_OF_BOUNDS_MARGIN
}

/// Move every projectile; homing shots steer toward their target if it is still alive
pub fn update_projectiles(state: &mut MatchState, dt: f32) {
    let homing = state.stats.homing_shots;
    let mut trails = Vec::new();

    for i in 0..state.projectiles.len() {
        let target_pos = if homing {
            state.projectiles[i]
                .target
                .and_then(|t| state.resolve_target(t))
        } else {
            None
        };
        let p = &mut state.projectiles[i];
        p.update(target_pos, dt);
        if p.is_crit {
            trails.push(p.pos);
        }
    }

    for pos in trails {
        if state.rng.random::<f32>() < 0.5 {
            state.emit_particles(ParticleKind::Trail, pos, 1, None);
        }
    }
}

/// Move every boss projectile
pub fn update_enemy_projectiles(state: &mut MatchState, dt: f32) {
    for p in &mut state.enemy_projectiles {
        p.update(dt);
    }
}

/// Drop projectiles that have left the arena
pub fn prune_out_of_bounds(state: &mut MatchState) {
    let arena = state.arena_size();
    state.projectiles.retain(|p| !is_out_of_bounds(p.pos, arena));
    state
        .enemy_projectiles
        .retain(|p| !is_out_of_bounds(p.pos, arena));
}
