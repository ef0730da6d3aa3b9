//! Collision detection and resolution
//!
//! Every entity is treated as an axis-aligned box around its center. Resolution
//! runs once per tick in a fixed order: player shots vs hostiles, boss shots vs
//! player, bodies vs player, then pickups.

use glam::Vec2;

use super::enemy;
use super::event::{GameEvent, SoundEffect};
use super::particle::ParticleKind;
use super::projectile::{Projectile, TargetId};
use super::state::{MatchState, Phase};
use crate::consts::*;
use crate::distance;

/// Axis-aligned bounding box in screen space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    /// Box of `size` centered on `center`
    pub fn from_center(center: Vec2, size: Vec2) -> Self {
        let half = size.abs() / 2.0;
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// Strict overlap; touching edges do not collide
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
    }
}

/// Run every collision pass for this tick, stopping as soon as the player dies
pub fn resolve(state: &mut MatchState) {
    let passes: [fn(&mut MatchState); 5] = [
        projectiles_vs_hostiles,
        enemy_projectiles_vs_player,
        hostiles_vs_player,
        xp_orbs_vs_player,
        health_packs_vs_player,
    ];
    for pass in passes {
        if state.phase == Phase::GameOver {
            return;
        }
        pass(state);
    }
}

/// Outcome of a projectile touching one hostile
enum HitResult {
    /// Projectile keeps flying
    Pierced,
    /// Projectile is spent
    Consumed,
}

/// Record the hit, spend pierce, explode when exhausted
fn register_projectile_hit(
    state: &mut MatchState,
    proj_index: usize,
    target: TargetId,
) -> HitResult {
    let Some(p) = state.projectiles.get_mut(proj_index) else {
        return HitResult::Consumed;
    };
    p.hit_ids.push(target);
    if p.pierce_remaining == 0 {
        let spent = state.projectiles.remove(proj_index);
        explode(state, &spent);
        HitResult::Consumed
    } else {
        p.pierce_remaining -= 1;
        HitResult::Pierced
    }
}

/// Splash damage from a spent projectile when explosive shots are unlocked
fn explode(state: &mut MatchState, projectile: &Projectile) {
    if !state.stats.explosive_shots {
        return;
    }
    let center = projectile.pos;
    let splash = projectile.damage * EXPLOSION_DAMAGE_FACTOR;

    for i in (0..state.enemies.len()).rev() {
        if distance(center, state.enemies[i].pos) < EXPLOSION_RADIUS {
            enemy::damage_enemy(state, i, splash, false);
        }
    }
    for i in (0..state.bosses.len()).rev() {
        if distance(center, state.bosses[i].pos) < EXPLOSION_RADIUS {
            enemy::damage_boss(state, i, splash, false);
        }
    }
    state.emit_particles(ParticleKind::Explosion, center, 8, None);
}

/// Pass 1: player projectiles against enemies, then bosses if no enemy was hit
fn projectiles_vs_hostiles(state: &mut MatchState) {
    for pi in (0..state.projectiles.len()).rev() {
        let mut hit = false;

        for ei in (0..state.enemies.len()).rev() {
            let (Some(p), Some(e)) = (state.projectiles.get(pi), state.enemies.get(ei)) else {
                continue;
            };
            let target = TargetId::Enemy(e.id);
            if p.already_hit(target) || !p.bounds().overlaps(&e.bounds()) {
                continue;
            }
            let damage = p.damage;

            // Freeze first: the enemy may be removed by the damage
            if state.stats.freeze_shots {
                state.enemies[ei].freeze(FREEZE_FRAMES);
            }
            enemy::damage_enemy(state, ei, damage, false);
            hit = true;

            if let HitResult::Consumed = register_projectile_hit(state, pi, target) {
                break;
            }
        }

        if hit {
            continue;
        }

        for bi in (0..state.bosses.len()).rev() {
            let (Some(p), Some(b)) = (state.projectiles.get(pi), state.bosses.get(bi)) else {
                continue;
            };
            let target = TargetId::Boss(b.id);
            if p.already_hit(target) || !p.bounds().overlaps(&b.bounds()) {
                continue;
            }
            let damage = p.damage;
            enemy::damage_boss(state, bi, damage, false);

            if let HitResult::Consumed = register_projectile_hit(state, pi, target) {
                break;
            }
        }
    }
}

/// Pass 2: boss projectiles against the player
fn enemy_projectiles_vs_player(state: &mut MatchState) {
    let player_box = state.player.bounds();
    let mut i = 0;
    while i < state.enemy_projectiles.len() {
        if state.enemy_projectiles[i].bounds().overlaps(&player_box) {
            let shot = state.enemy_projectiles.remove(i);
            state.damage_player(shot.damage);
        } else {
            i += 1;
        }
    }
}

/// Pass 3: contact damage from every overlapping enemy and boss
fn hostiles_vs_player(state: &mut MatchState) {
    let player_box = state.player.bounds();

    let contacts: Vec<f32> = state
        .enemies
        .iter()
        .filter(|e| e.bounds().overlaps(&player_box))
        .map(|e| e.damage)
        .chain(
            state
                .bosses
                .iter()
                .filter(|b| b.bounds().overlaps(&player_box))
                .map(|b| b.damage),
        )
        .collect();

    // The i-frame gate inside damage_player lets only the first land
    for damage in contacts {
        state.damage_player(damage);
    }
}

/// Pass 4: collect XP orbs
fn xp_orbs_vs_player(state: &mut MatchState) {
    for i in (0..state.xp_orbs.len()).rev() {
        let player_box = state.player.bounds();
        if state.xp_orbs[i].bounds().overlaps(&player_box) {
            let orb = state.xp_orbs.remove(i);
            state.add_xp(orb.value);
        }
    }
}

/// Pass 5: collect health packs
fn health_packs_vs_player(state: &mut MatchState) {
    let player_box = state.player.bounds();
    for i in (0..state.health_packs.len()).rev() {
        if !state.health_packs[i].bounds().overlaps(&player_box) {
            continue;
        }
        let pack = state.health_packs.remove(i);
        let before = state.player.hp(&state.stats);
        state.stats.hp = (before + pack.heal_amount).min(state.stats.max_hp);
        let healed = state.stats.hp - before;

        let pos = state.player.pos;
        state.emit_particles(ParticleKind::LevelUp, pos, 5, None);
        state.push_event(GameEvent::Sound(SoundEffect::Heal));
        state.push_event(GameEvent::HealthPackCollected { healed });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::enemy::{Boss, Enemy, EnemyKind};
    use crate::sim::pickup::{HealthPack, XpOrb};
    use crate::sim::projectile::EnemyProjectile;

    fn playing_state() -> MatchState {
        let mut state = MatchState::new(42);
        state.phase = Phase::Playing;
        state
    }

    fn tough_enemy(state: &mut MatchState, pos: Vec2) -> u32 {
        let id = state.next_entity_id();
        let mut e = Enemy::new(id, EnemyKind::Whale, pos, state.player.pos, 1, 0.0);
        e.hp = 10_000.0;
        e.max_hp = 10_000.0;
        state.enemies.push(e);
        id
    }

    fn shot(state: &mut MatchState, pos: Vec2, pierce: u32) {
        let id = state.next_entity_id();
        state
            .projectiles
            .push(Projectile::new(id, pos, Vec2::X, 6.0, 10.0, false, pierce, None));
    }

    #[test]
    fn test_aabb_overlap() {
        let a = Aabb::from_center(Vec2::ZERO, Vec2::splat(10.0));
        let b = Aabb::from_center(Vec2::new(9.0, 0.0), Vec2::splat(10.0));
        let c = Aabb::from_center(Vec2::new(10.0, 0.0), Vec2::splat(10.0));
        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c));
    }

    #[test]
    fn test_non_piercing_shot_consumed() {
        let mut state = playing_state();
        let pos = Vec2::new(200.0, 200.0);
        tough_enemy(&mut state, pos);
        shot(&mut state, pos, 0);

        resolve(&mut state);
        assert!(state.projectiles.is_empty());
        assert_eq!(state.enemies[0].hp, 10_000.0 - 10.0);
    }

    #[test]
    fn test_pierce_n_hits_n_plus_one() {
        let mut state = playing_state();
        state.player.pos = Vec2::new(1000.0, 600.0);
        // Five stacked enemies; a pierce-2 shot should damage exactly three
        let pos = Vec2::new(200.0, 200.0);
        for _ in 0..5 {
            tough_enemy(&mut state, pos);
        }
        shot(&mut state, pos, 2);

        resolve(&mut state);
        let damaged = state.enemies.iter().filter(|e| e.hp < e.max_hp).count();
        assert_eq!(damaged, 3);
        assert!(state.projectiles.is_empty());
    }

    #[test]
    fn test_piercing_shot_never_rehits_same_enemy() {
        let mut state = playing_state();
        state.player.pos = Vec2::new(1000.0, 600.0);
        let pos = Vec2::new(200.0, 200.0);
        tough_enemy(&mut state, pos);
        shot(&mut state, pos, 3);

        for _ in 0..3 {
            resolve(&mut state);
        }
        assert_eq!(state.enemies[0].hp, 10_000.0 - 10.0);
        assert_eq!(state.projectiles.len(), 1);
        assert_eq!(state.projectiles[0].pierce_remaining, 2);
    }

    #[test]
    fn test_boss_only_checked_when_no_enemy_hit() {
        let mut state = playing_state();
        state.player.pos = Vec2::new(1000.0, 600.0);
        let pos = Vec2::new(200.0, 200.0);
        tough_enemy(&mut state, pos);
        let id = state.next_entity_id();
        state.bosses.push(Boss::new(id, pos, state.player.pos, 1, 0.0));
        shot(&mut state, pos, 5);

        resolve(&mut state);
        assert_eq!(state.bosses[0].hp, state.bosses[0].max_hp);
    }

    #[test]
    fn test_freeze_shots_apply_even_when_piercing() {
        let mut state = playing_state();
        state.stats.freeze_shots = true;
        state.player.pos = Vec2::new(1000.0, 600.0);
        let pos = Vec2::new(200.0, 200.0);
        tough_enemy(&mut state, pos);
        shot(&mut state, pos, 4);

        resolve(&mut state);
        assert_eq!(state.enemies[0].freeze_remaining, FREEZE_FRAMES);
    }

    #[test]
    fn test_explosive_splash_hits_neighbors() {
        let mut state = playing_state();
        state.stats.explosive_shots = true;
        state.player.pos = Vec2::new(1000.0, 600.0);
        let pos = Vec2::new(200.0, 200.0);
        tough_enemy(&mut state, pos + Vec2::new(60.0, 0.0)); // inside splash, not touching
        tough_enemy(&mut state, pos);
        tough_enemy(&mut state, pos + Vec2::new(300.0, 0.0)); // far away
        shot(&mut state, pos, 0);

        resolve(&mut state);
        // Direct hit + splash on the target, splash on the neighbor, nothing far away
        assert_eq!(state.enemies[1].hp, 10_000.0 - 10.0 - 6.0);
        assert_eq!(state.enemies[0].hp, 10_000.0 - 6.0);
        assert_eq!(state.enemies[2].hp, 10_000.0);
    }

    #[test]
    fn test_simultaneous_contacts_only_first_registers() {
        let mut state = playing_state();
        let pos = state.player.pos;
        tough_enemy(&mut state, pos);
        tough_enemy(&mut state, pos);

        resolve(&mut state);
        assert_eq!(state.stats.hp, 80.0);
    }

    #[test]
    fn test_enemy_projectile_hits_player() {
        let mut state = playing_state();
        let pos = state.player.pos;
        state
            .enemy_projectiles
            .push(EnemyProjectile::new(pos, Vec2::X, 3.0, 12.5));

        resolve(&mut state);
        assert!(state.enemy_projectiles.is_empty());
        assert_eq!(state.stats.hp, 87.5);
    }

    #[test]
    fn test_pickups_collected() {
        let mut state = playing_state();
        state.stats.hp = 50.0;
        let pos = state.player.pos;
        state.xp_orbs.push(XpOrb::new(pos, 3, 0.0));
        state.health_packs.push(HealthPack::new(pos, 100.0));

        resolve(&mut state);
        assert!(state.xp_orbs.is_empty());
        assert!(state.health_packs.is_empty());
        assert_eq!(state.stats.xp, 3);
        assert_eq!(state.stats.hp, 75.0);
    }

    #[test]
    fn test_heal_capped_at_max() {
        let mut state = playing_state();
        state.stats.hp = 95.0;
        let pos = state.player.pos;
        state.health_packs.push(HealthPack::new(pos, 100.0));

        resolve(&mut state);
        assert_eq!(state.stats.hp, 100.0);
        assert!(state
            .events
            .contains(&GameEvent::HealthPackCollected { healed: 5.0 }));
    }

    #[test]
    fn test_death_stops_remaining_passes() {
        let mut state = playing_state();
        state.stats.hp = 1.0;
        let pos = state.player.pos;
        tough_enemy(&mut state, pos);
        state.xp_orbs.push(XpOrb::new(pos, 20, 0.0));
        state.health_packs.push(HealthPack::new(pos, 100.0));

        resolve(&mut state);
        assert_eq!(state.phase, Phase::GameOver);
        assert_eq!(state.stats.level, 1);
        assert_eq!(state.stats.hp, 0.0);
        assert_eq!(state.summary().map(|s| s.level), Some(state.stats.level));
        // Pickups stay on the floor
        assert_eq!(state.xp_orbs.len(), 1);
        assert_eq!(state.health_packs.len(), 1);

        let game_over = state
            .events
            .iter()
            .position(|e| matches!(e, GameEvent::GameOver(_)))
            .unwrap();
        assert!(state.events[game_over + 1..].is_empty());
    }
}
