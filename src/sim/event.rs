//! Events produced by the simulation for the host to consume
//!
//! The sim never talks to audio or UI directly; it queues events and the host
//! drains them after each tick.

use serde::{Deserialize, Serialize};

use super::enemy::EnemyKind;
use super::state::GameSummary;

/// Sound effect cues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SoundEffect {
    /// Player auto-fire volley
    Shot,
    /// Enemy or boss killed
    EnemyDeath,
    /// XP collected
    Xp,
    /// Player leveled up
    LevelUp,
    /// Health pack collected
    Heal,
    /// Combo hit a milestone
    Combo,
    /// Boss incoming
    BossWarning,
    /// Run ended
    GameOver,
}

/// Something the presentation layer may want to react to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    Sound(SoundEffect),
    ComboMilestone { combo: u32 },
    LevelUp { level: u32 },
    BossWarning,
    BossSpawned,
    BossDefeated,
    EnemyKilled { kind: EnemyKind },
    PlayerDamaged { amount: f32 },
    ShieldBroken,
    HealthPackCollected { healed: f32 },
    GameOver(GameSummary),
}
