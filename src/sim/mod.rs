//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Frame-scaled timestep, clamped per tick
//! - Seeded RNG only
//! - Stable iteration order (insertion order, order-preserving removal)
//! - No rendering, audio or platform dependencies

pub mod collision;
pub mod enemy;
pub mod event;
pub mod particle;
pub mod pickup;
pub mod player;
pub mod projectile;
pub mod schedule;
pub mod spawn;
pub mod state;
pub mod tick;
pub mod upgrade;

pub use collision::Aabb;
pub use enemy::{Boss, Enemy, EnemyKind, EnemyParams};
pub use event::{GameEvent, SoundEffect};
pub use particle::{Particle, ParticleKind};
pub use pickup::{HealthPack, XpOrb};
pub use player::{DamageAura, Player, PlayerStats, Shield};
pub use projectile::{EnemyProjectile, Projectile, TargetId};
pub use schedule::{ScheduledAction, ScheduledEvent};
pub use state::{GameSummary, MatchState, Phase};
pub use tick::{TickInput, tick};
pub use upgrade::{Rarity, UPGRADE_POOL, UpgradeId};
