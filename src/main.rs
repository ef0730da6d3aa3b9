//! FUD Arena headless runner
//!
//! Plays one match with a simple autopilot and prints the final summary as JSON.
//!
//! Usage: `fud-arena [TUNING.json] [--seed N] [--minutes M]`

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use glam::Vec2;

    use fud_arena::host::{Controls, EntityView, Host, run_frame};
    use fud_arena::sim::upgrade::UpgradeId;
    use fud_arena::sim::{GameEvent, GameSummary, MatchState, Phase, SoundEffect};
    use fud_arena::{Tuning, consts::FRAMES_PER_SECOND};

    /// Command-line options
    pub struct Options {
        pub tuning: Option<String>,
        pub seed: u64,
        pub minutes: f32,
    }

    impl Options {
        pub fn parse(args: impl Iterator<Item = String>) -> Self {
            let mut options = Self {
                tuning: None,
                seed: 0x5EED,
                minutes: 10.0,
            };
            let mut args = args;
            while let Some(arg) = args.next() {
                match arg.as_str() {
                    "--seed" => match args.next().map(|v| v.parse()) {
                        Some(Ok(seed)) => options.seed = seed,
                        _ => log::warn!("--seed expects an integer; keeping {}", options.seed),
                    },
                    "--minutes" => match args.next().map(|v| v.parse()) {
                        Some(Ok(m)) => options.minutes = m,
                        _ => log::warn!("--minutes expects a number; keeping {}", options.minutes),
                    },
                    other => options.tuning = Some(other.to_string()),
                }
            }
            options
        }
    }

    /// Kites away from nearby hostiles and takes the rarest upgrade on offer
    #[derive(Default)]
    struct Autopilot {
        started: bool,
        threats: Vec<Vec2>,
        player_pos: Vec2,
        shots: u32,
        summary: Option<GameSummary>,
    }

    impl Host for Autopilot {
        fn render(&mut self, view: EntityView<'_>) {
            match view {
                EntityView::Player { player, .. } => self.player_pos = player.pos,
                EntityView::Enemy(e) => self.threats.push(e.pos),
                EntityView::Boss(b) => self.threats.push(b.pos),
                EntityView::EnemyProjectile(p) => self.threats.push(p.pos),
                _ => {}
            }
        }

        fn play_sound(&mut self, sfx: SoundEffect) {
            if sfx == SoundEffect::Shot {
                self.shots += 1;
            }
        }

        fn read_movement_intent(&mut self) -> Vec2 {
            let pos = self.player_pos;
            let push: Vec2 = self
                .threats
                .drain(..)
                .filter(|t| t.distance(pos) < 200.0)
                .map(|t| (pos - t).normalize_or_zero() / (t.distance(pos) + 1.0))
                .sum();
            push.normalize_or_zero()
        }

        fn on_level_up(&mut self, offers: &[UpgradeId]) -> Option<usize> {
            offers
                .iter()
                .enumerate()
                .max_by(|(_, a), (_, b)| b.rarity().weight().total_cmp(&a.rarity().weight()))
                .map(|(i, id)| {
                    log::info!("Autopilot picks {} ({})", id.title(), id.description());
                    i
                })
        }

        fn on_game_over(&mut self, summary: &GameSummary) {
            self.summary = Some(summary.clone());
        }

        fn notify_combo_milestone(&mut self, combo: u32) {
            log::debug!("Combo x{}", combo);
        }

        fn read_controls(&mut self) -> Controls {
            let start = !self.started;
            self.started = true;
            Controls { start, pause: false }
        }

        fn on_event(&mut self, event: &GameEvent) {
            match event {
                GameEvent::BossSpawned => log::info!("Autopilot sees the boss"),
                GameEvent::ShieldBroken => log::debug!("Shield down"),
                _ => {}
            }
        }
    }

    pub fn run(options: Options) -> Result<(), serde_json::Error> {
        let tuning = match &options.tuning {
            Some(path) => Tuning::load(path),
            None => Tuning::default(),
        };
        let mut state = MatchState::with_tuning(options.seed, tuning);
        let mut pilot = Autopilot::default();

        let max_frames = (options.minutes.max(0.0) * 60.0 * FRAMES_PER_SECOND) as u64;
        for _ in 0..max_frames {
            run_frame(&mut state, &mut pilot, 1.0);
            if state.phase == Phase::GameOver {
                break;
            }
        }
        if state.phase != Phase::GameOver {
            state.end_game();
            for event in state.drain_events() {
                if let GameEvent::GameOver(summary) = event {
                    pilot.on_game_over(&summary);
                }
            }
        }

        log::info!("{} volleys fired", pilot.shots);
        if let Some(summary) = &pilot.summary {
            println!("{}", serde_json::to_string_pretty(summary)?);
        }
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("FUD Arena (headless) starting...");

    let options = headless::Options::parse(std::env::args().skip(1));
    if let Err(e) = headless::run(options) {
        log::error!("Failed to write summary: {}", e);
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // Library-only on wasm; hosts embed the simulation directly
}
