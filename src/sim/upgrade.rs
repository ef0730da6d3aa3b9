//! Level-up upgrades and the weighted offer draw

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::player::PlayerStats;

/// Attack cooldown floor reachable through Rapid Fire
pub const MIN_ATTACK_COOLDOWN_MS: f64 = 100.0;
pub const MAX_PROJECTILE_COUNT: u32 = 8;
pub const MAX_PIERCING: u32 = 10;
pub const MAX_CRIT_CHANCE: f32 = 0.5;
/// Offers shown per level-up
pub const OFFERS_PER_LEVEL: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rarity {
    Common,
    Uncommon,
    Rare,
    Epic,
}

impl Rarity {
    /// Relative draw weight
    pub fn weight(self) -> f32 {
        match self {
            Rarity::Common => 50.0,
            Rarity::Uncommon => 25.0,
            Rarity::Rare => 15.0,
            Rarity::Epic => 10.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UpgradeId {
    Damage,
    RapidFire,
    Swiftness,
    Vitality,
    Magnet,
    Velocity,
    Multishot,
    Piercing,
    CritChance,
    Shield,
    Homing,
    Explosive,
    Freeze,
    CritPower,
    DamageAura,
    ComboMaster,
}

/// Every upgrade in draw order
pub const UPGRADE_POOL: [UpgradeId; 16] = [
    UpgradeId::Damage,
    UpgradeId::RapidFire,
    UpgradeId::Swiftness,
    UpgradeId::Vitality,
    UpgradeId::Magnet,
    UpgradeId::Velocity,
    UpgradeId::Multishot,
    UpgradeId::Piercing,
    UpgradeId::CritChance,
    UpgradeId::Shield,
    UpgradeId::Homing,
    UpgradeId::Explosive,
    UpgradeId::Freeze,
    UpgradeId::CritPower,
    UpgradeId::DamageAura,
    UpgradeId::ComboMaster,
];

impl UpgradeId {
    pub fn rarity(self) -> Rarity {
        use UpgradeId::*;
        match self {
            Damage | RapidFire | Swiftness | Vitality | Magnet | Velocity => Rarity::Common,
            Multishot | Piercing | CritChance | Shield => Rarity::Uncommon,
            Homing | Explosive | Freeze | CritPower => Rarity::Rare,
            DamageAura | ComboMaster => Rarity::Epic,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            UpgradeId::Damage => "Sharper Takes",
            UpgradeId::RapidFire => "Rapid Fire",
            UpgradeId::Swiftness => "Swiftness",
            UpgradeId::Vitality => "Vitality",
            UpgradeId::Magnet => "Magnet",
            UpgradeId::Velocity => "Velocity",
            UpgradeId::Multishot => "Multishot",
            UpgradeId::Piercing => "Piercing",
            UpgradeId::CritChance => "Lucky Shot",
            UpgradeId::Shield => "Cold Storage",
            UpgradeId::Homing => "Homing Shots",
            UpgradeId::Explosive => "Explosive Shots",
            UpgradeId::Freeze => "Freeze Shots",
            UpgradeId::CritPower => "Critical Power",
            UpgradeId::DamageAura => "Damage Aura",
            UpgradeId::ComboMaster => "Combo Master",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            UpgradeId::Damage => "+5 projectile damage",
            UpgradeId::RapidFire => "Attack 15% faster",
            UpgradeId::Swiftness => "+0.5 movement speed",
            UpgradeId::Vitality => "+20 max HP and heal 20",
            UpgradeId::Magnet => "+40 pickup range",
            UpgradeId::Velocity => "+1.5 projectile speed",
            UpgradeId::Multishot => "+1 projectile per volley",
            UpgradeId::Piercing => "Projectiles pass through one more enemy",
            UpgradeId::CritChance => "+5% critical hit chance",
            UpgradeId::Shield => "Regenerating shield, or a stronger one",
            UpgradeId::Homing => "Projectiles steer toward their target",
            UpgradeId::Explosive => "Projectiles explode when spent",
            UpgradeId::Freeze => "Hits slow enemies for 3 seconds",
            UpgradeId::CritPower => "+0.5x critical damage",
            UpgradeId::DamageAura => "Damage nearby enemies, or widen the aura",
            UpgradeId::ComboMaster => "Slower combo decay and +25% XP",
        }
    }
}

/// Whether `id` may still be offered given the current stats
pub fn is_available(id: UpgradeId, stats: &PlayerStats) -> bool {
    match id {
        UpgradeId::RapidFire => stats.attack_cooldown_ms > MIN_ATTACK_COOLDOWN_MS,
        UpgradeId::Multishot => stats.projectile_count < MAX_PROJECTILE_COUNT,
        UpgradeId::Piercing => stats.piercing < MAX_PIERCING,
        // Small tolerance so accumulated float steps still hit the cap
        UpgradeId::CritChance => stats.crit_chance < MAX_CRIT_CHANCE - 1e-4,
        UpgradeId::Homing => !stats.homing_shots,
        UpgradeId::Explosive => !stats.explosive_shots,
        UpgradeId::Freeze => !stats.freeze_shots,
        UpgradeId::ComboMaster => !stats.combo_master,
        _ => true,
    }
}

/// Pick an index with probability proportional to its weight.
///
/// Walks the items in order subtracting weights from a uniform roll in
/// `[0, total)`; the first item that takes the roll to zero or below wins.
/// Float drift falls back to the last item. Returns `None` for an empty slice.
pub fn weighted_pick<T, R: Rng>(
    items: &[T],
    weight: impl Fn(&T) -> f32,
    rng: &mut R,
) -> Option<usize> {
    if items.is_empty() {
        return None;
    }
    let total: f32 = items.iter().map(|i| weight(i).max(0.0)).sum();
    let mut roll = rng.random::<f32>() * total;
    for (i, item) in items.iter().enumerate() {
        roll -= weight(item).max(0.0);
        if roll <= 0.0 {
            return Some(i);
        }
    }
    Some(items.len() - 1)
}

/// Draw up to three distinct offers from the upgrades still available
pub fn roll_offers<R: Rng>(stats: &PlayerStats, rng: &mut R) -> Vec<UpgradeId> {
    let mut candidates: Vec<UpgradeId> = UPGRADE_POOL
        .iter()
        .copied()
        .filter(|id| is_available(*id, stats))
        .collect();

    let mut offers = Vec::with_capacity(OFFERS_PER_LEVEL);
    while offers.len() < OFFERS_PER_LEVEL {
        let Some(index) = weighted_pick(&candidates, |id| id.rarity().weight(), rng) else {
            break;
        };
        offers.push(candidates.remove(index));
    }
    offers
}

/// Apply an upgrade to the player's stats
pub fn apply(id: UpgradeId, stats: &mut PlayerStats) {
    match id {
        UpgradeId::Damage => stats.projectile_damage += 5.0,
        UpgradeId::RapidFire => {
            let faster = stats.attack_cooldown_ms * 0.85;
            stats.attack_cooldown_ms = faster.max(MIN_ATTACK_COOLDOWN_MS);
        }
        UpgradeId::Swiftness => stats.speed += 0.5,
        UpgradeId::Vitality => {
            stats.max_hp += 20.0;
            stats.hp += 20.0;
        }
        UpgradeId::Magnet => stats.magnet_range += 40.0,
        UpgradeId::Velocity => stats.projectile_speed += 1.5,
        UpgradeId::Multishot => {
            stats.projectile_count = (stats.projectile_count + 1).min(MAX_PROJECTILE_COUNT);
        }
        UpgradeId::Piercing => stats.piercing = (stats.piercing + 1).min(MAX_PIERCING),
        UpgradeId::CritChance => {
            stats.crit_chance = (stats.crit_chance + 0.05).min(MAX_CRIT_CHANCE);
        }
        UpgradeId::Shield => {
            let shield = &mut stats.shield;
            if shield.active {
                shield.max_hp += 15.0;
                shield.hp += 15.0;
                shield.regen_rate += 2.0;
            } else {
                shield.active = true;
                shield.max_hp = 20.0;
                shield.hp = 20.0;
            }
        }
        UpgradeId::Homing => stats.homing_shots = true,
        UpgradeId::Explosive => stats.explosive_shots = true,
        UpgradeId::Freeze => stats.freeze_shots = true,
        UpgradeId::CritPower => stats.crit_multiplier += 0.5,
        UpgradeId::DamageAura => {
            let aura = &mut stats.damage_aura;
            if aura.active {
                aura.damage += 4.0;
                aura.range += 20.0;
            } else {
                aura.active = true;
                aura.damage = 8.0;
                aura.range = 100.0;
            }
        }
        UpgradeId::ComboMaster => stats.combo_master = true,
    }
    stats.clamp();
    log::debug!("Applied upgrade {:?} ({:?})", id, id.rarity());
}
