//! XP orbs and health packs

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::Aabb;
use super::state::MatchState;
use crate::consts::*;
use crate::{angle_to, direction, distance};

/// Vertical bob amplitude per frame (px)
const BOB_AMPLITUDE: f32 = 0.5;
/// Frames per radian of bob phase
const BOB_PERIOD: f32 = 20.0;

/// Experience dropped by a dead hostile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct XpOrb {
    pub pos: Vec2,
    pub value: u32,
    pub bob_offset: f32,
    pub time: f32,
    /// Latched once the player comes within magnet range
    pub seeking: bool,
}

impl XpOrb {
    pub fn new(pos: Vec2, value: u32, bob_offset: f32) -> Self {
        Self {
            pos,
            value,
            bob_offset,
            time: 0.0,
            seeking: false,
        }
    }

    /// Bigger orbs for bigger rewards
    pub fn size(&self) -> f32 {
        XP_ORB_BASE_SIZE * (0.8 + self.value as f32 * 0.1).min(3.0)
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::from_center(self.pos, Vec2::splat(self.size()))
    }

    pub fn update(&mut self, player_pos: Vec2, magnet_range: f32, dt: f32) {
        self.time += dt / BOB_PERIOD;
        self.pos.y += (self.time + self.bob_offset).sin() * BOB_AMPLITUDE;

        if !self.seeking && distance(self.pos, player_pos) < magnet_range {
            self.seeking = true;
        }
        if self.seeking {
            let step = XP_ORB_SPEED * dt;
            let gap = distance(self.pos, player_pos);
            if gap <= step {
                self.pos = player_pos;
            } else {
                self.pos += direction(angle_to(self.pos, player_pos)) * step;
            }
        }
    }
}

/// Heals a fixed share of max hp on pickup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthPack {
    pub pos: Vec2,
    pub heal_amount: f32,
    pub time: f32,
}

impl HealthPack {
    pub fn new(pos: Vec2, max_hp: f32) -> Self {
        Self {
            pos,
            heal_amount: max_hp * HEALTH_PACK_HEAL_FRACTION,
            time: 0.0,
        }
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::from_center(self.pos, Vec2::splat(HEALTH_PACK_SIZE))
    }

    pub fn update(&mut self, dt: f32) {
        self.time += dt / BOB_PERIOD;
        self.pos.y += self.time.sin() * BOB_AMPLITUDE;
    }
}

/// Animate pickups and pull orbs toward the player
pub fn update_pickups(state: &mut MatchState, dt: f32) {
    let player_pos = state.player.pos;
    let magnet = state.stats.magnet_range;
    for orb in &mut state.xp_orbs {
        orb.update(player_pos, magnet, dt);
    }
    for pack in &mut state.health_packs {
        pack.update(dt);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_orb_ignores_player_outside_magnet() {
        let mut orb = XpOrb::new(Vec2::new(0.0, 0.0), 1, 0.0);
        orb.update(Vec2::new(500.0, 0.0), 120.0, 1.0);
        assert!(!orb.seeking);
        assert!(orb.pos.x.abs() < 1e-6);
    }

    #[test]
    fn test_orb_seeks_and_latches() {
        let mut orb = XpOrb::new(Vec2::new(0.0, 0.0), 1, 0.0);
        orb.update(Vec2::new(100.0, 0.0), 120.0, 1.0);
        assert!(orb.seeking);
        assert!(orb.pos.x > 4.0);

        // Player dashes away; orb keeps chasing
        let before = orb.pos.x;
        orb.update(Vec2::new(1000.0, 0.0), 120.0, 1.0);
        assert!(orb.pos.x > before);
    }

    #[test]
    fn test_orb_does_not_overshoot() {
        let mut orb = XpOrb::new(Vec2::new(0.0, 0.0), 1, 0.0);
        orb.seeking = true;
        orb.update(Vec2::new(2.0, 0.0), 120.0, 1.0);
        assert_eq!(orb.pos, Vec2::new(2.0, 0.0));
    }

    #[test]
    fn test_health_pack_heal_amount() {
        let pack = HealthPack::new(Vec2::ZERO, 120.0);
        assert_eq!(pack.heal_amount, 30.0);
    }
}
