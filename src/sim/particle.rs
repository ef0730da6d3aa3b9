//! Cosmetic particles
//!
//! Particles carry no gameplay effect, but their lifecycle (spawn, tick,
//! expire) is owned by the simulation so the host only has to draw them.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Visual variant of a particle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParticleKind {
    Explosion,
    Blood,
    Dust,
    DamageNumber,
    XpGain,
    LevelUp,
    ShieldBreak,
    Trail,
}

impl ParticleKind {
    /// Lifetime in frames
    pub fn lifetime(self) -> f32 {
        match self {
            ParticleKind::Dust => 30.0,
            ParticleKind::DamageNumber => 90.0,
            ParticleKind::XpGain | ParticleKind::LevelUp => 120.0,
            _ => 60.0,
        }
    }

    /// Whether the particle falls
    pub fn has_gravity(self) -> bool {
        matches!(self, ParticleKind::Blood | ParticleKind::Explosion)
    }
}

/// Downward acceleration for falling particles (px/frame²)
const PARTICLE_GRAVITY: f32 = 0.2;

/// A particle for visual effects
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub kind: ParticleKind,
    /// Remaining life in frames
    pub life: f32,
    pub max_life: f32,
    /// Damage or XP amount shown by number particles
    pub label: Option<f32>,
}

impl Particle {
    /// Spawn a particle with the kind's initial velocity profile
    pub fn spawn<R: Rng>(kind: ParticleKind, pos: Vec2, label: Option<f32>, rng: &mut R) -> Self {
        let mut vel = Vec2::new(rng.random_range(-2.0..2.0), rng.random_range(-2.0..2.0));
        match kind {
            ParticleKind::Explosion => {
                vel = Vec2::new(rng.random_range(-4.0..4.0), rng.random_range(-4.0..4.0));
            }
            ParticleKind::Blood => vel.y = rng.random_range(1.0..3.0),
            ParticleKind::Dust => vel.y = -rng.random_range(0.0..2.0),
            ParticleKind::DamageNumber => vel.y = -2.0,
            ParticleKind::XpGain => vel.y = -1.0,
            ParticleKind::LevelUp => {
                vel = Vec2::new(rng.random_range(-3.0..3.0), -rng.random_range(2.0..6.0));
            }
            ParticleKind::ShieldBreak | ParticleKind::Trail => {}
        }
        let life = kind.lifetime();
        Self {
            pos,
            vel,
            kind,
            life,
            max_life: life,
            label,
        }
    }

    pub fn update(&mut self, dt: f32) {
        self.pos += self.vel * dt;
        self.life -= dt;
        if self.kind.has_gravity() {
            self.vel.y += PARTICLE_GRAVITY * dt;
        }
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.life > 0.0
    }

    /// Fade factor for rendering (1 = fresh, 0 = expired)
    pub fn alpha(&self) -> f32 {
        if self.max_life <= 0.0 {
            0.0
        } else {
            (self.life / self.max_life).clamp(0.0, 1.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_particle_expires() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut p = Particle::spawn(ParticleKind::Dust, Vec2::ZERO, None, &mut rng);
        assert_eq!(p.max_life, 30.0);
        for _ in 0..29 {
            p.update(1.0);
        }
        assert!(p.is_alive());
        p.update(1.0);
        assert!(!p.is_alive());
        assert_eq!(p.alpha(), 0.0);
    }

    #[test]
    fn test_blood_falls() {
        let mut rng = Pcg32::seed_from_u64(7);
        let mut p = Particle::spawn(ParticleKind::Blood, Vec2::ZERO, None, &mut rng);
        let vy = p.vel.y;
        p.update(1.0);
        assert!(p.vel.y > vy);
    }

    #[test]
    fn test_damage_number_rises_with_label() {
        let mut rng = Pcg32::seed_from_u64(3);
        let p = Particle::spawn(ParticleKind::DamageNumber, Vec2::ZERO, Some(15.0), &mut rng);
        assert_eq!(p.vel.y, -2.0);
        assert_eq!(p.label, Some(15.0));
    }
}
