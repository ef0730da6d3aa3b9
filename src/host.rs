//! Contract with the presentation layer
//!
//! The simulation never draws, plays audio or reads devices itself. A [`Host`]
//! supplies input and receives everything the frame produced: queued events,
//! one [`EntityView`] per live entity, and the level-up modal.

use glam::Vec2;

use crate::sim::event::{GameEvent, SoundEffect};
use crate::sim::upgrade::UpgradeId;
use crate::sim::{
    Boss, Enemy, EnemyProjectile, GameSummary, HealthPack, MatchState, Particle, Phase, Player,
    PlayerStats, Projectile, TickInput, XpOrb, tick,
};

/// Read-only view of one live entity for drawing
#[derive(Debug, Clone, Copy)]
pub enum EntityView<'a> {
    Player {
        player: &'a Player,
        stats: &'a PlayerStats,
    },
    Enemy(&'a Enemy),
    Boss(&'a Boss),
    Projectile(&'a Projectile),
    EnemyProjectile(&'a EnemyProjectile),
    XpOrb(&'a XpOrb),
    HealthPack(&'a HealthPack),
    Particle(&'a Particle),
}

/// Menu-level requests from the host
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Controls {
    pub start: bool,
    pub pause: bool,
}

/// Presentation layer driven by [`run_frame`]
pub trait Host {
    fn render(&mut self, view: EntityView<'_>);
    fn play_sound(&mut self, sfx: SoundEffect);
    fn read_movement_intent(&mut self) -> Vec2;
    /// Show the offers; return the chosen index once the player has picked
    fn on_level_up(&mut self, offers: &[UpgradeId]) -> Option<usize>;
    fn on_game_over(&mut self, summary: &GameSummary);
    fn notify_combo_milestone(&mut self, combo: u32);

    /// Start and pause requests. Hosts without menus keep the default.
    fn read_controls(&mut self) -> Controls {
        Controls::default()
    }

    /// Every event, after the dedicated callbacks have run
    fn on_event(&mut self, _event: &GameEvent) {}
}

/// Run one presentation frame: input, tick, events, render, level-up modal.
///
/// A level-up answer is committed on the following frame.
pub fn run_frame<H: Host + ?Sized>(state: &mut MatchState, host: &mut H, dt: f32) {
    let controls = host.read_controls();
    let input = TickInput {
        movement: host.read_movement_intent(),
        start: controls.start,
        pause: controls.pause,
        upgrade_choice: state.queued_choice.take(),
    };

    tick(state, &input, dt);

    for event in state.drain_events() {
        dispatch(host, &event);
    }

    render(state, host);

    if state.phase == Phase::LevelUp {
        state.queued_choice = host.on_level_up(&state.offers);
    }
}

fn dispatch<H: Host + ?Sized>(host: &mut H, event: &GameEvent) {
    match event {
        GameEvent::Sound(sfx) => host.play_sound(*sfx),
        GameEvent::ComboMilestone { combo } => host.notify_combo_milestone(*combo),
        GameEvent::GameOver(summary) => host.on_game_over(summary),
        _ => {}
    }
    host.on_event(event);
}

/// Hand every live entity to the host, back to front
pub fn render<H: Host + ?Sized>(state: &MatchState, host: &mut H) {
    for pack in &state.health_packs {
        host.render(EntityView::HealthPack(pack));
    }
    for orb in &state.xp_orbs {
        host.render(EntityView::XpOrb(orb));
    }
    for enemy in &state.enemies {
        host.render(EntityView::Enemy(enemy));
    }
    for boss in &state.bosses {
        host.render(EntityView::Boss(boss));
    }
    host.render(EntityView::Player {
        player: &state.player,
        stats: &state.stats,
    });
    for p in &state.projectiles {
        host.render(EntityView::Projectile(p));
    }
    for p in &state.enemy_projectiles {
        host.render(EntityView::EnemyProjectile(p));
    }
    for p in &state.particles {
        host.render(EntityView::Particle(p));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::enemy::EnemyKind;

    #[derive(Default)]
    struct RecordingHost {
        controls: Controls,
        intent: Vec2,
        choice: Option<usize>,
        sounds: Vec<SoundEffect>,
        milestones: Vec<u32>,
        offers_seen: Vec<Vec<UpgradeId>>,
        summary: Option<GameSummary>,
        events: Vec<GameEvent>,
        players: usize,
        enemies: usize,
        orbs: usize,
    }

    impl Host for RecordingHost {
        fn render(&mut self, view: EntityView<'_>) {
            match view {
                EntityView::Player { .. } => self.players += 1,
                EntityView::Enemy(_) => self.enemies += 1,
                EntityView::XpOrb(_) => self.orbs += 1,
                _ => {}
            }
        }

        fn play_sound(&mut self, sfx: SoundEffect) {
            self.sounds.push(sfx);
        }

        fn read_movement_intent(&mut self) -> Vec2 {
            self.intent
        }

        fn on_level_up(&mut self, offers: &[UpgradeId]) -> Option<usize> {
            self.offers_seen.push(offers.to_vec());
            self.choice
        }

        fn on_game_over(&mut self, summary: &GameSummary) {
            self.summary = Some(summary.clone());
        }

        fn notify_combo_milestone(&mut self, combo: u32) {
            self.milestones.push(combo);
        }

        fn read_controls(&mut self) -> Controls {
            std::mem::take(&mut self.controls)
        }

        fn on_event(&mut self, event: &GameEvent) {
            self.events.push(event.clone());
        }
    }

    fn started(host: &mut RecordingHost) -> MatchState {
        let mut state = MatchState::new(17);
        host.controls.start = true;
        run_frame(&mut state, host, 1.0);
        state
    }

    #[test]
    fn test_start_and_render() {
        let mut host = RecordingHost::default();
        let mut state = started(&mut host);
        assert_eq!(state.phase, Phase::Playing);
        assert_eq!(host.players, 1);

        let id = state.next_entity_id();
        let target = state.player.pos;
        let pos = Vec2::new(100.0, 100.0);
        state.enemies.push(Enemy::new(id, EnemyKind::Bear, pos, target, 1, 0.0));
        run_frame(&mut state, &mut host, 1.0);
        assert_eq!(host.players, 2);
        assert_eq!(host.enemies, 1);

        // Cooldown started on the first frame; the next volley needs a target
        for _ in 0..40 {
            run_frame(&mut state, &mut host, 1.0);
        }
        assert!(host.sounds.contains(&SoundEffect::Shot));
    }

    #[test]
    fn test_movement_intent_moves_player() {
        let mut host = RecordingHost::default();
        let mut state = started(&mut host);
        let before = state.player.pos;
        host.intent = Vec2::new(1.0, 0.0);
        run_frame(&mut state, &mut host, 1.0);
        assert_eq!(state.player.pos.x, before.x + state.stats.speed);
    }

    #[test]
    fn test_level_up_choice_commits_next_frame() {
        let mut host = RecordingHost::default();
        let mut state = started(&mut host);
        state.add_xp(15);
        host.choice = Some(0);

        run_frame(&mut state, &mut host, 1.0);
        assert_eq!(host.offers_seen.len(), 1);
        assert_eq!(state.phase, Phase::LevelUp);
        assert_eq!(state.queued_choice, Some(0));

        run_frame(&mut state, &mut host, 1.0);
        assert_eq!(state.phase, Phase::Playing);
        assert_eq!(state.queued_choice, None);
    }

    #[test]
    fn test_level_up_waits_for_answer() {
        let mut host = RecordingHost::default();
        let mut state = started(&mut host);
        state.add_xp(15);

        for _ in 0..5 {
            run_frame(&mut state, &mut host, 1.0);
        }
        assert_eq!(state.phase, Phase::LevelUp);
        assert_eq!(host.offers_seen.len(), 5);
    }

    #[test]
    fn test_events_dispatched() {
        let mut host = RecordingHost::default();
        let mut state = started(&mut host);
        for _ in 0..4 {
            state.advance_combo();
        }
        state.damage_player(500.0);
        run_frame(&mut state, &mut host, 1.0);

        assert_eq!(host.milestones, vec![5]);
        assert!(host.sounds.contains(&SoundEffect::Combo));
        assert!(host.sounds.contains(&SoundEffect::GameOver));
        let summary = host.summary.expect("game over reported");
        assert_eq!(summary.max_combo, 5);
        assert!(host.events.iter().any(|e| matches!(e, GameEvent::PlayerDamaged { .. })));
        assert!(state.events.is_empty());
    }

    #[test]
    fn test_pause_control() {
        let mut host = RecordingHost::default();
        let mut state = started(&mut host);
        host.controls.pause = true;
        run_frame(&mut state, &mut host, 1.0);
        assert_eq!(state.phase, Phase::Paused);
        let clock = state.clock_ms;
        run_frame(&mut state, &mut host, 1.0);
        assert_eq!(state.clock_ms, clock);
    }
}
