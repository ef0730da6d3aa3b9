//! Match state and session bookkeeping
//!
//! Everything a running match needs lives in [`MatchState`]: the seeded RNG,
//! clocks, entity collections, score and combo, pending level-up offers and the
//! deferred timer queue. There are no globals.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::enemy::{Boss, Enemy};
use super::event::{GameEvent, SoundEffect};
use super::particle::{Particle, ParticleKind};
use super::pickup::{HealthPack, XpOrb};
use super::player::{Player, PlayerStats};
use super::projectile::{EnemyProjectile, Projectile, TargetId};
use super::schedule::{Schedule, ScheduledAction, ScheduledEvent};
use super::upgrade::{self, UpgradeId};
use crate::consts::*;
use crate::tuning::Tuning;

/// Current phase of the match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// Waiting for the start input
    Ready,
    /// Active gameplay
    Playing,
    /// Paused by the player
    Paused,
    /// Waiting for an upgrade choice
    LevelUp,
    /// Run ended
    GameOver,
}

/// Final stats shown when the run ends
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSummary {
    pub time_secs: f32,
    pub kills: u32,
    pub score: u64,
    pub level: u32,
    pub max_combo: u32,
}

/// Complete match state (deterministic for a given seed and input stream)
#[derive(Debug, Clone)]
pub struct MatchState {
    /// Seed the RNG was created from
    pub seed: u64,
    pub rng: Pcg32,
    /// Bumped on every restart; stale timers are discarded against it
    pub generation: u32,
    pub phase: Phase,
    /// Simulation clock driving every timestamp-based timer
    pub clock_ms: f64,
    /// Seconds of active play
    pub game_time: f32,
    pub wave: u32,
    pub kill_count: u32,
    pub score: u64,
    /// Score and XP multiplier, always in [1, COMBO_MAX]
    pub combo: u32,
    pub max_combo: u32,
    /// Seconds since the last kill or decay step
    pub combo_timer: f32,
    /// Seconds since the last enemy batch
    pub spawn_timer: f32,
    /// Seconds since the last health pack spawn
    pub health_pack_timer: f32,
    /// Delay before the next regular health pack (seconds)
    pub next_health_pack_at: f32,
    pub first_health_pack_spawned: bool,
    /// Set from the boss trigger until the boss dies
    pub boss_spawned: bool,
    /// Boss warning banner visible
    pub boss_warning: bool,
    pub stats: PlayerStats,
    pub player: Player,
    pub enemies: Vec<Enemy>,
    pub bosses: Vec<Boss>,
    pub projectiles: Vec<Projectile>,
    pub enemy_projectiles: Vec<EnemyProjectile>,
    pub xp_orbs: Vec<XpOrb>,
    pub health_packs: Vec<HealthPack>,
    /// Visual particles (not gameplay-affecting)
    pub particles: Vec<Particle>,
    pub scheduled: Schedule,
    /// Upgrades on offer while in `Phase::LevelUp`
    pub offers: Vec<UpgradeId>,
    /// Level-ups earned while an offer was already open
    pub pending_level_ups: u32,
    /// Choice received from the host, committed on the next tick
    pub queued_choice: Option<usize>,
    /// Events queued for the host since the last drain
    pub events: Vec<GameEvent>,
    pub tuning: Tuning,
    pub summary: Option<GameSummary>,
    /// Next entity ID
    next_id: u32,
}

impl MatchState {
    /// Create a match with default tuning
    pub fn new(seed: u64) -> Self {
        Self::with_tuning(seed, Tuning::default())
    }

    pub fn with_tuning(seed: u64, tuning: Tuning) -> Self {
        let tuning = tuning.sanitized();
        let mut rng = Pcg32::seed_from_u64(seed);
        let next_health_pack_at = rng.random_range(20.0..30.0);
        let mut stats = tuning.base_stats.clone();
        stats.clamp();
        let player = Player::new(tuning.arena_size() / 2.0);

        Self {
            seed,
            rng,
            generation: 0,
            phase: Phase::Ready,
            clock_ms: 0.0,
            game_time: 0.0,
            wave: 1,
            kill_count: 0,
            score: 0,
            combo: 1,
            max_combo: 1,
            combo_timer: 0.0,
            spawn_timer: 0.0,
            health_pack_timer: 0.0,
            next_health_pack_at,
            first_health_pack_spawned: false,
            boss_spawned: false,
            boss_warning: false,
            stats,
            player,
            enemies: Vec::new(),
            bosses: Vec::new(),
            projectiles: Vec::new(),
            enemy_projectiles: Vec::new(),
            xp_orbs: Vec::new(),
            health_packs: Vec::new(),
            particles: Vec::new(),
            scheduled: Schedule::default(),
            offers: Vec::new(),
            pending_level_ups: 0,
            queued_choice: None,
            events: Vec::new(),
            tuning,
            summary: None,
            next_id: 1,
        }
    }

    /// Leave the ready screen
    pub fn start(&mut self) -> bool {
        if self.phase != Phase::Ready {
            return false;
        }
        self.phase = Phase::Playing;
        log::info!("Match started (seed {})", self.seed);
        true
    }

    /// Reset to a fresh match and start playing immediately.
    ///
    /// Pending timers carry over and are discarded when they fall due.
    pub fn restart(&mut self) {
        let seed = self.rng.random::<u64>();
        let generation = self.generation.wrapping_add(1);
        let scheduled = std::mem::take(&mut self.scheduled);
        let tuning = self.tuning.clone();

        *self = Self::with_tuning(seed, tuning);
        self.generation = generation;
        self.scheduled = scheduled;
        self.phase = Phase::Playing;
        log::info!("Match restarted (seed {}, generation {})", seed, generation);
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn arena_size(&self) -> Vec2 {
        self.tuning.arena_size()
    }

    pub fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Take every event queued since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Queue a deferred action `delay_ms` from now
    pub fn schedule(&mut self, action: ScheduledAction, delay_ms: f64) {
        self.scheduled.push(ScheduledEvent {
            due_ms: self.clock_ms + delay_ms,
            generation: self.generation,
            action,
        });
    }

    /// Spawn `count` particles, dropping the oldest past the cap
    pub fn emit_particles(
        &mut self,
        kind: ParticleKind,
        pos: Vec2,
        count: u32,
        label: Option<f32>,
    ) {
        for _ in 0..count {
            let particle = Particle::spawn(kind, pos, label, &mut self.rng);
            self.particles.push(particle);
        }
        let cap = self.tuning.max_particles;
        if self.particles.len() > cap {
            let excess = self.particles.len() - cap;
            self.particles.drain(..excess);
        }
    }

    /// Current position of a hostile, if it is still alive
    pub fn resolve_target(&self, target: TargetId) -> Option<Vec2> {
        match target {
            TargetId::Enemy(id) => self.enemies.iter().find(|e| e.id == id).map(|e| e.pos),
            TargetId::Boss(id) => self.bosses.iter().find(|b| b.id == id).map(|b| b.pos),
        }
    }

    /// Book a kill: count it, advance the combo, then score at the new multiplier
    pub fn register_kill(&mut self, score_value: u64) {
        self.kill_count += 1;
        self.advance_combo();
        self.score += score_value * self.combo as u64;
        self.push_event(GameEvent::Sound(SoundEffect::EnemyDeath));
    }

    pub fn advance_combo(&mut self) {
        self.combo = (self.combo + 1).min(COMBO_MAX);
        self.max_combo = self.max_combo.max(self.combo);
        self.combo_timer = 0.0;

        if self.combo % COMBO_MILESTONE == 0 {
            self.push_event(GameEvent::Sound(SoundEffect::Combo));
            self.push_event(GameEvent::ComboMilestone { combo: self.combo });
        }
    }

    /// Seconds without a kill before the combo drops a step
    pub fn combo_window(&self) -> f32 {
        if self.stats.combo_master {
            COMBO_MASTER_DECAY_SECS
        } else {
            COMBO_DECAY_SECS
        }
    }

    /// Drop the combo by one once the decay window has passed
    pub fn decay_combo(&mut self) {
        if self.combo_timer > self.combo_window() {
            self.combo = self.combo.saturating_sub(1).max(1);
            self.combo_timer = 0.0;
        }
    }

    /// Route damage to the player. Returns true if the hit was accepted.
    pub fn damage_player(&mut self, amount: f32) -> bool {
        if self.phase == Phase::GameOver {
            return false;
        }
        let now = self.clock_ms;
        let Some(report) = self.player.apply_damage(&mut self.stats, amount, now) else {
            return false;
        };

        let pos = self.player.pos;
        if report.shield_broken {
            self.emit_particles(ParticleKind::ShieldBreak, pos, 8, None);
            self.push_event(GameEvent::ShieldBroken);
        }
        if report.to_hp > 0.0 {
            self.emit_particles(ParticleKind::Blood, pos, 3, None);
        }
        self.push_event(GameEvent::PlayerDamaged {
            amount: report.absorbed + report.to_hp,
        });

        if report.died {
            self.end_game();
        }
        true
    }

    /// Grant experience scaled by combo (and Combo Master).
    ///
    /// The level threshold is checked once per call, so a single huge gain
    /// levels up at most once and carries the surplus.
    pub fn add_xp(&mut self, amount: u32) {
        if self.phase == Phase::GameOver {
            return;
        }
        let base = if self.stats.combo_master {
            (amount as f32 * COMBO_MASTER_XP_BONUS).floor() as u32
        } else {
            amount
        };
        let gain = base * self.combo;
        self.stats.xp += gain;

        self.push_event(GameEvent::Sound(SoundEffect::Xp));
        let pos = self.player.pos - Vec2::new(0.0, 20.0);
        self.emit_particles(ParticleKind::XpGain, pos, 1, Some(gain as f32));

        if self.stats.xp >= self.stats.xp_to_next_level {
            self.level_up();
        }
    }

    pub fn level_up(&mut self) {
        if self.phase == Phase::GameOver {
            return;
        }
        self.stats.xp = self.stats.xp.saturating_sub(self.stats.xp_to_next_level);
        self.stats.level += 1;
        self.stats.xp_to_next_level =
            ((self.stats.xp_to_next_level as f64 * LEVEL_THRESHOLD_GROWTH).floor() as u32).max(1);

        let pos = self.player.pos;
        self.emit_particles(ParticleKind::LevelUp, pos, 15, None);
        self.push_event(GameEvent::Sound(SoundEffect::LevelUp));
        self.push_event(GameEvent::LevelUp {
            level: self.stats.level,
        });
        log::info!("Level {} reached at {:.1}s", self.stats.level, self.game_time);

        match self.phase {
            Phase::Playing => self.open_offers(),
            Phase::LevelUp => self.pending_level_ups += 1,
            _ => {}
        }
    }

    /// Roll offers and block on the choice; nothing left to offer keeps playing
    fn open_offers(&mut self) {
        self.offers = upgrade::roll_offers(&self.stats, &mut self.rng);
        if self.offers.is_empty() {
            log::debug!("No upgrades left to offer");
            self.pending_level_ups = 0;
            self.phase = Phase::Playing;
        } else {
            self.phase = Phase::LevelUp;
        }
    }

    /// Apply the chosen offer and resume, or open the next queued level-up.
    ///
    /// Returns `None` without changing anything when not choosing or the index is out of range.
    pub fn commit_upgrade(&mut self, index: usize) -> Option<UpgradeId> {
        if self.phase != Phase::LevelUp {
            return None;
        }
        let id = *self.offers.get(index)?;
        upgrade::apply(id, &mut self.stats);
        self.offers.clear();

        if self.pending_level_ups > 0 {
            self.pending_level_ups -= 1;
            self.open_offers();
        } else {
            self.phase = Phase::Playing;
        }
        Some(id)
    }

    /// End the run and publish the summary
    pub fn end_game(&mut self) {
        if self.phase == Phase::GameOver {
            return;
        }
        self.phase = Phase::GameOver;
        self.offers.clear();
        let summary = GameSummary {
            time_secs: self.game_time,
            kills: self.kill_count,
            score: self.score,
            level: self.stats.level,
            max_combo: self.max_combo,
        };
        log::info!(
            "Game over after {:.1}s: {} kills, score {}, level {}, max combo x{}",
            summary.time_secs,
            summary.kills,
            summary.score,
            summary.level,
            summary.max_combo
        );
        self.push_event(GameEvent::Sound(SoundEffect::GameOver));
        self.push_event(GameEvent::GameOver(summary.clone()));
        self.summary = Some(summary);
    }

    pub fn summary(&self) -> Option<&GameSummary> {
        self.summary.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn playing() -> MatchState {
        let mut state = MatchState::new(11);
        state.start();
        state
    }

    #[test]
    fn test_new_match_defaults() {
        let state = MatchState::new(1);
        assert_eq!(state.phase, Phase::Ready);
        assert_eq!(state.combo, 1);
        assert_eq!(state.wave, 1);
        assert_eq!(state.player.pos, Vec2::new(640.0, 360.0));
        assert!((20.0..30.0).contains(&state.next_health_pack_at));
    }

    #[test]
    fn test_start_only_from_ready() {
        let mut state = MatchState::new(1);
        assert!(state.start());
        assert!(!state.start());
        assert_eq!(state.phase, Phase::Playing);
    }

    #[test]
    fn test_combo_caps_at_max() {
        let mut state = playing();
        for _ in 0..100 {
            state.register_kill(10);
        }
        assert_eq!(state.combo, COMBO_MAX);
        assert_eq!(state.max_combo, COMBO_MAX);
    }

    #[test]
    fn test_combo_milestone_events() {
        let mut state = playing();
        for _ in 0..4 {
            state.advance_combo();
        }
        assert_eq!(state.combo, 5);
        assert!(state.events.contains(&GameEvent::ComboMilestone { combo: 5 }));
        assert!(state.events.contains(&GameEvent::Sound(SoundEffect::Combo)));
    }

    #[test]
    fn test_combo_decays_one_step_per_window() {
        let mut state = playing();
        state.combo = 4;
        state.combo_timer = 5.0;
        state.decay_combo();
        assert_eq!(state.combo, 4);

        state.combo_timer = 5.01;
        state.decay_combo();
        assert_eq!(state.combo, 3);
        assert_eq!(state.combo_timer, 0.0);

        state.combo = 1;
        state.combo_timer = 6.0;
        state.decay_combo();
        assert_eq!(state.combo, 1);
    }

    #[test]
    fn test_combo_master_widens_window() {
        let mut state = playing();
        state.stats.combo_master = true;
        state.combo = 3;
        state.combo_timer = 7.0;
        state.decay_combo();
        assert_eq!(state.combo, 3);
    }

    #[test]
    fn test_add_xp_levels_up_and_opens_offers() {
        let mut state = playing();
        state.add_xp(16);
        assert_eq!(state.stats.level, 2);
        assert_eq!(state.stats.xp, 1);
        assert_eq!(state.stats.xp_to_next_level, 21);
        assert_eq!(state.phase, Phase::LevelUp);
        assert_eq!(state.offers.len(), 3);
        assert!(state.events.contains(&GameEvent::LevelUp { level: 2 }));
    }

    #[test]
    fn test_add_xp_checks_threshold_once() {
        let mut state = playing();
        state.add_xp(100);
        assert_eq!(state.stats.level, 2);
        assert_eq!(state.stats.xp, 85);
    }

    #[test]
    fn test_add_xp_scales_with_combo_and_master() {
        let mut state = playing();
        state.combo = 3;
        state.stats.combo_master = true;
        state.add_xp(2);
        // floor(2 * 1.25) = 2, times combo 3
        assert_eq!(state.stats.xp, 6);
    }

    #[test]
    fn test_commit_upgrade() {
        let mut state = playing();
        state.add_xp(15);
        let offered = state.offers.clone();

        assert_eq!(state.commit_upgrade(7), None);
        assert_eq!(state.phase, Phase::LevelUp);

        let chosen = state.commit_upgrade(1);
        assert_eq!(chosen, Some(offered[1]));
        assert_eq!(state.phase, Phase::Playing);
        assert!(state.offers.is_empty());
        assert_eq!(state.commit_upgrade(0), None);
    }

    #[test]
    fn test_level_up_during_offer_is_queued() {
        let mut state = playing();
        state.add_xp(15);
        assert_eq!(state.phase, Phase::LevelUp);

        state.add_xp(21);
        assert_eq!(state.stats.level, 3);
        assert_eq!(state.pending_level_ups, 1);

        state.commit_upgrade(0);
        assert_eq!(state.phase, Phase::LevelUp);
        assert_eq!(state.pending_level_ups, 0);
        assert_eq!(state.offers.len(), 3);

        state.commit_upgrade(0);
        assert_eq!(state.phase, Phase::Playing);
    }

    #[test]
    fn test_damage_player_game_over() {
        let mut state = playing();
        state.kill_count = 7;
        assert!(state.damage_player(150.0));
        assert_eq!(state.phase, Phase::GameOver);
        let summary = state.summary().unwrap().clone();
        assert_eq!(summary.kills, 7);
        assert!(state.events.contains(&GameEvent::GameOver(summary)));

        // Ignored once the match is over
        state.clock_ms += 10_000.0;
        assert!(!state.damage_player(10.0));
    }

    #[test]
    fn test_xp_ignored_after_game_over() {
        let mut state = playing();
        state.damage_player(150.0);
        state.drain_events();

        state.add_xp(100);
        state.level_up();
        assert_eq!(state.stats.xp, 0);
        assert_eq!(state.stats.level, 1);
        assert_eq!(state.phase, Phase::GameOver);
        assert!(state.offers.is_empty());
        assert!(state.events.is_empty());
    }

    #[test]
    fn test_shield_break_event() {
        let mut state = playing();
        state.stats.shield.active = true;
        state.stats.shield.hp = 10.0;
        state.stats.shield.max_hp = 20.0;
        state.clock_ms = 5000.0;
        state.damage_player(15.0);
        assert_eq!(state.stats.shield.hp, 0.0);
        assert_eq!(state.stats.hp, 95.0);
        assert!(state.events.contains(&GameEvent::ShieldBroken));
    }

    #[test]
    fn test_particle_cap_drops_oldest() {
        let mut tuning = Tuning::default();
        tuning.max_particles = 10;
        let mut state = MatchState::with_tuning(3, tuning);
        state.emit_particles(ParticleKind::Dust, Vec2::ZERO, 8, None);
        state.emit_particles(ParticleKind::Explosion, Vec2::ZERO, 5, None);
        assert_eq!(state.particles.len(), 10);
        assert_eq!(state.particles[0].kind, ParticleKind::Dust);
        assert_eq!(state.particles[5].kind, ParticleKind::Explosion);
    }

    #[test]
    fn test_restart_resets_and_bumps_generation() {
        let mut state = playing();
        state.score = 500;
        state.kill_count = 12;
        state.schedule(ScheduledAction::SpawnBoss, 2000.0);

        state.restart();
        assert_eq!(state.generation, 1);
        assert_eq!(state.phase, Phase::Playing);
        assert_eq!(state.score, 0);
        assert_eq!(state.kill_count, 0);
        assert_eq!(state.scheduled.len(), 1);
    }

    #[test]
    fn test_drain_events() {
        let mut state = playing();
        state.push_event(GameEvent::BossWarning);
        assert_eq!(state.drain_events(), vec![GameEvent::BossWarning]);
        assert!(state.events.is_empty());
    }

    proptest! {
        #[test]
        fn prop_combo_stays_in_bounds(ops in proptest::collection::vec(any::<bool>(), 0..200)) {
            let mut state = playing();
            for kill in ops {
                let before = state.combo;
                if kill {
                    state.advance_combo();
                    prop_assert!(state.combo >= before);
                } else {
                    state.combo_timer = 10.0;
                    state.decay_combo();
                    prop_assert_eq!(state.combo, before.saturating_sub(1).max(1));
                }
                prop_assert!((1..=COMBO_MAX).contains(&state.combo));
            }
        }
    }
}
